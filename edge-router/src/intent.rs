use crate::config::RoutingConfig;
use crate::host::HostClass;

/// The classified outcome of a request, driving rewrite construction.
///
/// Exactly one intent is produced per routed request; requests matching
/// none fall through untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoutingIntent {
    /// Main application: the root domain and its reserved aliases.
    MainApp,
    /// Internal path requested from outside; served the app's 404 page.
    Blocked,
    /// Tenant site on a subdomain, identified by its label.
    Tenant(String),
}

impl RoutingIntent {
    pub fn kind(&self) -> &'static str {
        match self {
            RoutingIntent::MainApp => "main_app",
            RoutingIntent::Blocked => "blocked",
            RoutingIntent::Tenant(_) => "tenant",
        }
    }
}

/// Maps a classified host and request path to a routing intent.
///
/// Checks run in fixed priority order and the first match wins; the
/// ordering is part of the contract. The main-app check negates the
/// blocked-prefix test so a blocked path on the main domain falls to the
/// blocked check instead of riding along as `MainApp`. A `/404` request on
/// a non-reserved subdomain matches nothing and returns `None`; callers
/// pass those through rather than treating them as errors.
pub fn resolve(host: &HostClass, path: &str, rules: &RoutingConfig) -> Option<RoutingIntent> {
    let blocked = rules.is_blocked_path(path);

    if rules.is_reserved_label(&host.tenant_label) || (host.is_main_domain && !blocked) {
        return Some(RoutingIntent::MainApp);
    }
    if blocked {
        return Some(RoutingIntent::Blocked);
    }
    if path != "/404" {
        return Some(RoutingIntent::Tenant(host.tenant_label.clone()));
    }
    None
}
