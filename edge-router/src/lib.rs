//! Request-time router for a multi-tenant deployment.
//!
//! One "main" application is served from the root domain (and its reserved
//! aliases); tenant sites are served from arbitrary subdomains of that same
//! domain, resolved per request without per-tenant configuration. The
//! pipeline classifies the Host header, resolves a routing intent, gates
//! tenant traffic behind an external session verifier, rewrites the path to
//! its internal mount point, and forwards to the app upstream.

pub mod auth;
pub mod config;
mod errors;
mod host;
mod intent;
mod matcher;
pub mod metrics_defs;
mod proxy;
mod rewrite;
mod service;

pub use errors::EdgeRouterError;
pub use host::{HostClass, classify};
pub use intent::{RoutingIntent, resolve};
pub use rewrite::{MAIN_APP_PREFIX, TENANT_PREFIX, rewrite_target};
pub use service::RouterService;

use shared::admin_service::AdminService;

/// Runs the router and admin listeners until either fails.
pub async fn run(config: config::Config) -> Result<(), EdgeRouterError> {
    let router = RouterService::new(config.clone());
    let router_task = shared::http::serve(&config.listener.host, config.listener.port, router);
    let admin_task = shared::http::serve(
        &config.admin_listener.host,
        config.admin_listener.port,
        AdminService::new(|| true),
    );

    tokio::try_join!(router_task, admin_task)?;
    Ok(())
}
