//! Tenant auth gate.
//!
//! The routing core only decides *that* gating is required; verifying the
//! session is delegated to an external identity provider behind the
//! [`SessionVerifier`] trait. The call is the single suspension point in
//! the pipeline and holds no shared state across the await.

use async_trait::async_trait;
use http::HeaderMap;
use http::header::{AUTHORIZATION, COOKIE};
use hyper::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::AuthConfig;

/// Verified identity attached to a gated request.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Session {
    pub user_id: String,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("no verified session")]
    Unauthenticated,

    #[error("identity provider answered {0}")]
    Provider(StatusCode),

    #[error("identity provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Per-request view handed to the verifier.
pub struct AuthContext<'a> {
    pub path: &'a str,
    pub tenant_label: &'a str,
    pub headers: &'a HeaderMap,
}

#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn require_session(&self, ctx: &AuthContext<'_>) -> Result<Session, AuthError>;
}

/// Paths of the sign-in/sign-up/callback flow are never gated.
pub fn is_auth_route(path: &str, config: &AuthConfig) -> bool {
    config
        .auth_path_prefixes
        .iter()
        .any(|prefix| path.starts_with(prefix.as_str()))
}

/// Verifier backed by an HTTP identity provider.
pub struct HttpSessionVerifier {
    client: reqwest::Client,
    verify_url: Url,
}

impl HttpSessionVerifier {
    pub fn new(verify_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            verify_url,
        }
    }
}

#[async_trait]
impl SessionVerifier for HttpSessionVerifier {
    async fn require_session(&self, ctx: &AuthContext<'_>) -> Result<Session, AuthError> {
        let mut request = self
            .client
            .get(self.verify_url.clone())
            .query(&[("tenant", ctx.tenant_label), ("path", ctx.path)]);

        // The provider authenticates from the caller's own credentials.
        for name in [COOKIE, AUTHORIZATION] {
            if let Some(value) = ctx.headers.get(&name) {
                request = request.header(name.clone(), value.clone());
            }
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<Session>().await?)
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(AuthError::Unauthenticated)
        } else {
            Err(AuthError::Provider(status))
        }
    }
}
