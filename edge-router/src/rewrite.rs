use crate::intent::RoutingIntent;
use url::Url;

/// Internal path prefix the main application is mounted under.
pub const MAIN_APP_PREFIX: &str = "/root-app";
/// Internal path prefix tenant sites are mounted under.
pub const TENANT_PREFIX: &str = "/sub_domains";

/// Builds the internal target URL for a routing intent.
///
/// This is a rewrite, not a redirect: the client-visible URL never changes
/// and the target is applied server-side. `MainApp` and `Tenant` targets
/// keep the original query string so downstream handlers see their search
/// parameters (invitation tokens among them) unchanged. `Blocked` targets
/// are built from the bare origin and carry neither path nor query.
pub fn rewrite_target(intent: &RoutingIntent, original: &Url) -> Url {
    let mut target = original.clone();
    match intent {
        RoutingIntent::MainApp => {
            target.set_path(&format!("{MAIN_APP_PREFIX}{}", original.path()));
        }
        RoutingIntent::Blocked => {
            target.set_path(&format!("{MAIN_APP_PREFIX}/404"));
            target.set_query(None);
        }
        RoutingIntent::Tenant(label) => {
            target.set_path(&format!("{TENANT_PREFIX}/{label}{}", original.path()));
        }
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn main_app_prepends_prefix() {
        let target = rewrite_target(&RoutingIntent::MainApp, &url("http://example.com/pricing"));
        assert_eq!(target.path(), "/root-app/pricing");
        assert_eq!(target.query(), None);
    }

    #[test]
    fn main_app_root_path() {
        let target = rewrite_target(&RoutingIntent::MainApp, &url("http://www.example.com/"));
        assert_eq!(target.path(), "/root-app/");
    }

    #[test]
    fn tenant_mounts_under_label() {
        let target = rewrite_target(
            &RoutingIntent::Tenant("acme".to_string()),
            &url("http://acme.example.com/dashboard?tab=1"),
        );
        assert_eq!(target.path(), "/sub_domains/acme/dashboard");
        assert_eq!(target.query(), Some("tab=1"));
    }

    #[test]
    fn query_string_survives_main_app_rewrite() {
        let target = rewrite_target(
            &RoutingIntent::MainApp,
            &url("http://example.com/join?invite=tok_123&ref=mail"),
        );
        assert_eq!(target.path(), "/root-app/join");
        assert_eq!(target.query(), Some("invite=tok_123&ref=mail"));
    }

    #[test]
    fn blocked_discards_path_and_query() {
        let target = rewrite_target(
            &RoutingIntent::Blocked,
            &url("http://example.com/sub_domains/secret?leak=1"),
        );
        assert_eq!(target.path(), "/root-app/404");
        assert_eq!(target.query(), None);
    }

    #[test]
    fn rewrite_is_deterministic() {
        let original = url("http://acme.example.com/a/b?x=1");
        let intent = RoutingIntent::Tenant("acme".to_string());
        assert_eq!(
            rewrite_target(&intent, &original),
            rewrite_target(&intent, &original)
        );
    }
}
