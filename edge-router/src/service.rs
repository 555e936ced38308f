use crate::auth::{AuthContext, AuthError, HttpSessionVerifier, SessionVerifier, is_auth_route};
use crate::config::Config;
use crate::errors::EdgeRouterError;
use crate::host::classify;
use crate::intent::{RoutingIntent, resolve};
use crate::matcher::RouteMatcher;
use crate::metrics_defs::{
    REQUEST_DURATION, REQUESTS_PASSED_THROUGH, REQUESTS_ROUTED, SESSIONS_REJECTED,
};
use crate::proxy::Upstream;
use crate::rewrite::rewrite_target;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::HOST;
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use shared::http::error_response;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Hyper service evaluating the routing pipeline once per request:
/// matcher → host classification → intent resolution → auth gate →
/// rewrite → forward.
///
/// Requests are independent; everything the pipeline reads is immutable
/// after construction.
#[derive(Clone)]
pub struct RouterService {
    inner: Arc<Inner>,
}

struct Inner {
    config: Config,
    matcher: RouteMatcher,
    upstream: Upstream,
    verifier: Option<Arc<dyn SessionVerifier>>,
}

impl RouterService {
    pub fn new(config: Config) -> Self {
        let verifier = config.auth.as_ref().map(|auth| {
            Arc::new(HttpSessionVerifier::new(auth.verify_url.clone())) as Arc<dyn SessionVerifier>
        });
        Self::with_verifier(config, verifier)
    }

    /// Service with an injected verifier; tests use this to swap in a
    /// canned one.
    pub fn with_verifier(config: Config, verifier: Option<Arc<dyn SessionVerifier>>) -> Self {
        let matcher = RouteMatcher::new(config.matcher.clone());
        let upstream = Upstream::new(&config.upstream);
        Self {
            inner: Arc::new(Inner {
                config,
                matcher,
                upstream,
                verifier,
            }),
        }
    }

    #[cfg(test)]
    pub(crate) async fn handle(
        &self,
        req: Request<Bytes>,
    ) -> Result<Response<BoxBody<Bytes, EdgeRouterError>>, EdgeRouterError> {
        self.inner.handle(req).await
    }
}

impl Inner {
    async fn handle(
        &self,
        req: Request<Bytes>,
    ) -> Result<Response<BoxBody<Bytes, EdgeRouterError>>, EdgeRouterError> {
        let started = Instant::now();

        // A request without a Host header counts as the main domain.
        let host = req
            .headers()
            .get(HOST)
            .and_then(|h| h.to_str().ok())
            .unwrap_or(&self.config.routing.main_domain)
            .to_string();
        let path = req.uri().path().to_string();
        let path_and_query = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| path.clone());

        if !self.matcher.should_route(&path) {
            return self.pass_through(req, &path_and_query).await;
        }

        let original = match Url::parse(&format!("http://{host}{path_and_query}")) {
            Ok(url) => url,
            Err(e) => {
                // Hosts the URL parser rejects outright degrade to
                // pass-through instead of an error.
                tracing::warn!(%host, error = %e, "unparseable request URL; passing through");
                return self.pass_through(req, &path_and_query).await;
            }
        };

        let class = classify(&host, &self.config.routing.main_domain);
        let Some(intent) = resolve(&class, &path, &self.config.routing) else {
            tracing::info!(%host, %path, "no routing intent; passing request through");
            shared::counter!(REQUESTS_PASSED_THROUGH).increment(1);
            return self.pass_through(req, &path_and_query).await;
        };
        tracing::debug!(%host, %path, intent = intent.kind(), "resolved routing intent");

        if let RoutingIntent::Tenant(label) = &intent
            && let (Some(verifier), Some(auth)) = (&self.verifier, &self.config.auth)
            && !is_auth_route(&path, auth)
        {
            let ctx = AuthContext {
                path: &path,
                tenant_label: label,
                headers: req.headers(),
            };
            match verifier.require_session(&ctx).await {
                Ok(session) => {
                    tracing::debug!(tenant = %label, user = %session.user_id, "session verified");
                }
                Err(AuthError::Unauthenticated) => {
                    shared::counter!(SESSIONS_REJECTED).increment(1);
                    return Ok(error_response(StatusCode::UNAUTHORIZED));
                }
                Err(e) => {
                    tracing::error!(tenant = %label, error = %e, "session verification failed");
                    return Ok(error_response(StatusCode::SERVICE_UNAVAILABLE));
                }
            }
        }

        let target = rewrite_target(&intent, &original);
        shared::counter!(REQUESTS_ROUTED, "intent" => intent.kind()).increment(1);

        let response = self
            .upstream
            .forward(req, target.path(), target.query())
            .await?;
        shared::histogram!(REQUEST_DURATION).record(started.elapsed().as_secs_f64());
        Ok(boxed(response))
    }

    /// Forwards the request with its original path and query untouched.
    async fn pass_through(
        &self,
        req: Request<Bytes>,
        path_and_query: &str,
    ) -> Result<Response<BoxBody<Bytes, EdgeRouterError>>, EdgeRouterError> {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path_and_query, None),
        };
        let response = self.upstream.forward(req, path, query).await?;
        Ok(boxed(response))
    }
}

fn boxed(response: Response<Bytes>) -> Response<BoxBody<Bytes, EdgeRouterError>> {
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, Full::new(body).map_err(|e| match e {}).boxed())
}

impl Service<Request<Incoming>> for RouterService {
    type Response = Response<BoxBody<Bytes, EdgeRouterError>>;
    type Error = EdgeRouterError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let inner = self.inner.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let bytes = match body.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => {
                    tracing::warn!(error = %e, "could not read request body");
                    return Ok(error_response(StatusCode::BAD_REQUEST));
                }
            };
            let req = Request::from_parts(parts, bytes);

            match inner.handle(req).await {
                Ok(response) => Ok(response),
                Err(e) => {
                    tracing::error!(error = %e, "request failed");
                    Ok(error_response(StatusCode::BAD_GATEWAY))
                }
            }
        })
    }
}
