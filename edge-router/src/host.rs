//! Host-header classification.
//!
//! Derives the tenant label once per request; nothing here can fail. A
//! Host value the deployment doesn't recognize (a foreign domain, a value
//! still carrying its port) keeps the full string as its label and is
//! routed as an ordinary tenant, leaving "tenant not found" to the layer
//! behind the rewrite.

/// Outcome of classifying a Host header against the main domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostClass {
    /// Host with the wildcard suffix (".<main_domain>") stripped.
    pub tenant_label: String,
    /// Exact, case-sensitive equality with the configured main domain.
    pub is_main_domain: bool,
}

/// Splits a Host header value into a tenant label and a main-domain flag.
pub fn classify(host: &str, main_domain: &str) -> HostClass {
    let is_main_domain = host == main_domain;
    let wildcard = format!(".{main_domain}");
    let tenant_label = host
        .strip_suffix(wildcard.as_str())
        .unwrap_or(host)
        .to_string();

    HostClass {
        tenant_label,
        is_main_domain,
    }
}
