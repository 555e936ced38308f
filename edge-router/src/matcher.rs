use crate::config::MatcherConfig;

/// Decides which requests reach the routing core at all.
///
/// Exclusion list evaluated before the routing core: API paths are always
/// routed, while framework internals, well-known files and static assets
/// skip the core and are forwarded untouched.
pub struct RouteMatcher {
    config: MatcherConfig,
}

impl RouteMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn should_route(&self, path: &str) -> bool {
        if self
            .config
            .always_route_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return true;
        }
        if self
            .config
            .skip_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return false;
        }
        if self.config.skip_exact.iter().any(|p| p == path) {
            return false;
        }
        !self.has_static_extension(path)
    }

    fn has_static_extension(&self, path: &str) -> bool {
        let file = path.rsplit('/').next().unwrap_or(path);
        match file.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => {
                let ext = ext.to_ascii_lowercase();
                self.config.static_extensions.iter().any(|e| *e == ext)
            }
            _ => false,
        }
    }
}
