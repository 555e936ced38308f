use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("main_domain cannot be empty")]
    EmptyMainDomain,

    #[error("main_domain must not carry the wildcard dot: {0}")]
    DottedMainDomain(String),

    #[error("path prefix must start with '/': {0}")]
    RelativePathPrefix(String),

    #[error("reserved label cannot be empty")]
    EmptyReservedLabel,
}

/// Router configuration, loaded once at startup and read-only afterwards.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Main listener for incoming requests
    pub listener: Listener,
    /// Admin listener for health and readiness endpoints
    pub admin_listener: Listener,
    /// Host/path classification rules
    pub routing: RoutingConfig,
    /// App server every rewrite is forwarded to
    pub upstream: UpstreamConfig,
    /// Identity-provider integration; the auth gate is off when absent
    pub auth: Option<AuthConfig>,
    /// Which requests reach the routing core at all
    #[serde(default)]
    pub matcher: MatcherConfig,
}

impl Config {
    /// Validates the router configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;
        self.routing.validate()?;
        if let Some(auth) = &self.auth {
            auth.validate()?;
        }
        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// Host/path classification rules. The defaults reproduce the deployment's
/// built-in reserved set; both lists stay configurable so more labels or
/// internal prefixes can be reserved without code changes.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RoutingConfig {
    /// Canonical root domain serving the primary application, e.g.
    /// "example.com". Subdomain labels are derived against this value.
    pub main_domain: String,
    /// Internal path prefixes that must never be reachable from outside
    #[serde(default = "default_blocked_path_prefixes")]
    pub blocked_path_prefixes: Vec<String>,
    /// Subdomain labels that alias the main application, compared
    /// case-insensitively
    #[serde(default = "default_reserved_labels")]
    pub reserved_labels: Vec<String>,
}

impl RoutingConfig {
    pub fn is_reserved_label(&self, label: &str) -> bool {
        self.reserved_labels
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(label))
    }

    pub fn is_blocked_path(&self, path: &str) -> bool {
        self.blocked_path_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.main_domain.is_empty() {
            return Err(ValidationError::EmptyMainDomain);
        }
        if self.main_domain.starts_with('.') {
            return Err(ValidationError::DottedMainDomain(self.main_domain.clone()));
        }
        for prefix in &self.blocked_path_prefixes {
            if !prefix.starts_with('/') {
                return Err(ValidationError::RelativePathPrefix(prefix.clone()));
            }
        }
        for label in &self.reserved_labels {
            if label.is_empty() {
                return Err(ValidationError::EmptyReservedLabel);
            }
        }
        Ok(())
    }
}

fn default_blocked_path_prefixes() -> Vec<String> {
    vec!["/sub_domains".to_string()]
}

fn default_reserved_labels() -> Vec<String> {
    vec!["app".to_string(), "www".to_string()]
}

/// Upstream app server configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UpstreamConfig {
    /// URL of the app server
    ///
    /// Note: Uses the `url::Url` type so invalid URLs are rejected during
    /// config deserialization.
    pub url: Url,
    /// Timeout for the whole forward cycle, body collection included
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Identity-provider integration for the tenant auth gate
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AuthConfig {
    /// Endpoint that verifies the caller's session
    pub verify_url: Url,
    /// Paths of the authentication flow itself; never gated
    #[serde(default = "default_auth_path_prefixes")]
    pub auth_path_prefixes: Vec<String>,
}

impl AuthConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        for prefix in &self.auth_path_prefixes {
            if !prefix.starts_with('/') {
                return Err(ValidationError::RelativePathPrefix(prefix.clone()));
            }
        }
        Ok(())
    }
}

fn default_auth_path_prefixes() -> Vec<String> {
    vec![
        "/sign-in".to_string(),
        "/sign-up".to_string(),
        "/sso-callback".to_string(),
    ]
}

/// Exclusion rules evaluated before the routing core runs
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MatcherConfig {
    /// Prefixes routed unconditionally, static-looking or not
    #[serde(default = "default_always_route_prefixes")]
    pub always_route_prefixes: Vec<String>,
    /// Prefixes that bypass the core entirely
    #[serde(default = "default_skip_prefixes")]
    pub skip_prefixes: Vec<String>,
    /// Exact paths that bypass the core
    #[serde(default = "default_skip_exact")]
    pub skip_exact: Vec<String>,
    /// File extensions treated as static assets (lowercase, no dot)
    #[serde(default = "default_static_extensions")]
    pub static_extensions: Vec<String>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            always_route_prefixes: default_always_route_prefixes(),
            skip_prefixes: default_skip_prefixes(),
            skip_exact: default_skip_exact(),
            static_extensions: default_static_extensions(),
        }
    }
}

fn default_always_route_prefixes() -> Vec<String> {
    vec!["/api".to_string(), "/trpc".to_string()]
}

fn default_skip_prefixes() -> Vec<String> {
    vec!["/_next".to_string(), "/.well-known".to_string()]
}

fn default_skip_exact() -> Vec<String> {
    vec![
        "/favicon.ico".to_string(),
        "/sitemap.xml".to_string(),
        "/robots.txt".to_string(),
    ]
}

fn default_static_extensions() -> Vec<String> {
    [
        "html", "htm", "css", "js", "jpg", "jpeg", "webp", "png", "gif", "svg", "ttf", "woff",
        "woff2", "ico", "csv", "doc", "docx", "xls", "xlsx", "zip", "webmanifest",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            listener: Listener {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            admin_listener: Listener {
                host: "127.0.0.1".to_string(),
                port: 3001,
            },
            routing: RoutingConfig {
                main_domain: "example.com".to_string(),
                blocked_path_prefixes: default_blocked_path_prefixes(),
                reserved_labels: default_reserved_labels(),
            },
            upstream: UpstreamConfig {
                url: Url::parse("http://127.0.0.1:4000").unwrap(),
                timeout_secs: 30,
            },
            auth: None,
            matcher: MatcherConfig::default(),
        }
    }

    #[test]
    fn parse_valid_config() {
        let yaml = r#"
listener:
    host: "0.0.0.0"
    port: 3000
admin_listener:
    host: "127.0.0.1"
    port: 3001
routing:
    main_domain: example.com
upstream:
    url: "http://127.0.0.1:4000"
auth:
    verify_url: "http://127.0.0.1:4100/v1/sessions/verify"
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.listener.port, 3000);
        assert_eq!(config.routing.main_domain, "example.com");
        // Defaults fill in the reserved sets and the matcher.
        assert_eq!(config.routing.blocked_path_prefixes, vec!["/sub_domains"]);
        assert_eq!(config.routing.reserved_labels, vec!["app", "www"]);
        assert_eq!(config.upstream.timeout_secs, 30);
        let auth = config.auth.unwrap();
        assert_eq!(
            auth.auth_path_prefixes,
            vec!["/sign-in", "/sign-up", "/sso-callback"]
        );
        assert!(config.matcher.static_extensions.contains(&"css".to_string()));
    }

    #[test]
    fn reserved_sets_are_configurable() {
        let yaml = r#"
listener: {host: "0.0.0.0", port: 3000}
admin_listener: {host: "127.0.0.1", port: 3001}
routing:
    main_domain: example.com
    blocked_path_prefixes: ["/sub_domains", "/internal"]
    reserved_labels: ["app", "www", "admin"]
upstream:
    url: "http://127.0.0.1:4000"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.routing.is_blocked_path("/internal/ops"));
        assert!(config.routing.is_reserved_label("Admin"));
    }

    #[test]
    fn validation_errors() {
        let mut config = base_config();
        config.listener.port = 0;
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::InvalidPort
        ));

        let mut config = base_config();
        config.routing.main_domain = String::new();
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::EmptyMainDomain
        ));

        let mut config = base_config();
        config.routing.main_domain = ".example.com".to_string();
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::DottedMainDomain(_)
        ));

        let mut config = base_config();
        config.routing.blocked_path_prefixes = vec!["sub_domains".to_string()];
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::RelativePathPrefix(_)
        ));

        let mut config = base_config();
        config.routing.reserved_labels = vec![String::new()];
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::EmptyReservedLabel
        ));

        let mut config = base_config();
        config.auth = Some(AuthConfig {
            verify_url: Url::parse("http://127.0.0.1:4100").unwrap(),
            auth_path_prefixes: vec!["sign-in".to_string()],
        });
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::RelativePathPrefix(_)
        ));
    }

    #[test]
    fn deserialization_errors() {
        // Invalid upstream URL
        assert!(
            serde_yaml::from_str::<Config>(
                r#"
listener: {host: "0.0.0.0", port: 3000}
admin_listener: {host: "127.0.0.1", port: 3001}
routing: {main_domain: example.com}
upstream: {url: "not-a-url"}
"#
            )
            .is_err()
        );

        // Missing required field
        assert!(
            serde_yaml::from_str::<Config>(
                r#"
listener: {host: "0.0.0.0"}
"#
            )
            .is_err()
        );
    }
}
