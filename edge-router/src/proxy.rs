use crate::config::UpstreamConfig;
use crate::errors::EdgeRouterError;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Request, Response};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use shared::http::{add_via, strip_hop_by_hop};
use std::time::Duration;
use tokio::time::timeout;

/// The single app upstream every request is served from.
///
/// Rewrites are applied here: the request goes out with the computed
/// internal path and query grafted onto the upstream base URL, while the
/// client-facing URL never changes.
#[derive(Clone)]
pub struct Upstream {
    client: Client<HttpConnector, Full<Bytes>>,
    base: url::Url,
    timeout_secs: u64,
}

impl Upstream {
    pub fn new(config: &UpstreamConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            base: config.url.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    fn name(&self) -> &str {
        self.base.host_str().unwrap_or(self.base.as_str())
    }

    /// Forwards a request, serving it from `path`/`query` instead of the
    /// path the client asked for. Hop-by-hop headers are stripped and a Via
    /// entry added in both directions.
    ///
    /// The timeout covers the whole cycle including body collection, so
    /// this is unsuitable for streaming responses.
    pub async fn forward(
        &self,
        request: Request<Bytes>,
        path: &str,
        query: Option<&str>,
    ) -> Result<Response<Bytes>, EdgeRouterError> {
        let mut uri = self.base.clone();
        uri.set_path(path);
        uri.set_query(query);

        let (mut parts, body) = request.into_parts();
        strip_hop_by_hop(&mut parts.headers, parts.version);
        add_via(&mut parts.headers, parts.version);

        let mut builder = Request::builder().method(parts.method).uri(uri.as_str());
        for (name, value) in parts.headers.iter() {
            builder = builder.header(name, value);
        }
        let upstream_request = builder.body(Full::new(body)).map_err(|e| {
            EdgeRouterError::Internal(format!("could not build upstream request: {e}"))
        })?;

        let response = timeout(
            Duration::from_secs(self.timeout_secs),
            self.client.request(upstream_request),
        )
        .await
        .map_err(|_| EdgeRouterError::UpstreamTimeout(self.name().to_string()))?
        .map_err(|e| {
            EdgeRouterError::UpstreamRequestFailed(self.name().to_string(), e.to_string())
        })?;

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers, parts.version);
        add_via(&mut parts.headers, parts.version);

        let bytes = body
            .collect()
            .await
            .map(|collected| collected.to_bytes())
            .map_err(|e| EdgeRouterError::ResponseBody(self.name().to_string(), e.to_string()))?;

        Ok(Response::from_parts(parts, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{CONNECTION, HOST, VIA};
    use hyper::body::Incoming;
    use hyper::service::service_fn;
    use hyper::{Request, Response, StatusCode};
    use hyper_util::rt::TokioIo;
    use std::convert::Infallible;
    use tokio::net::TcpListener;
    use url::Url;

    // Echoes the requested path+query in the body and the Host header back
    // in an x-seen-host header.
    async fn echo(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
        let path_and_query = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default();
        let seen_host = req
            .headers()
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let mut response = Response::new(Full::new(Bytes::from(path_and_query)));
        if let Ok(value) = seen_host.parse() {
            response.headers_mut().insert("x-seen-host", value);
        }
        Ok(response)
    }

    async fn start_echo_upstream() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                let io = TokioIo::new(stream);
                tokio::spawn(async move {
                    let _ = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new())
                        .serve_connection(io, service_fn(echo))
                        .await;
                });
            }
        });

        port
    }

    fn upstream_for(port: u16) -> Upstream {
        Upstream::new(&UpstreamConfig {
            url: Url::parse(&format!("http://127.0.0.1:{port}")).unwrap(),
            timeout_secs: 5,
        })
    }

    #[tokio::test]
    async fn forwards_with_grafted_path_and_query() {
        let port = start_echo_upstream().await;
        let upstream = upstream_for(port);

        let request = Request::builder()
            .uri("http://acme.example.com/dashboard?tab=1")
            .header(HOST, "acme.example.com")
            .header(CONNECTION, "keep-alive")
            .body(Bytes::new())
            .unwrap();

        let response = upstream
            .forward(request, "/sub_domains/acme/dashboard", Some("tab=1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.body().as_ref(),
            b"/sub_domains/acme/dashboard?tab=1"
        );
        // The original Host header travels with the request.
        assert_eq!(
            response.headers().get("x-seen-host").unwrap(),
            "acme.example.com"
        );
        // Via added, hop-by-hop removed on the way back.
        assert!(response.headers().contains_key(VIA));
        assert!(!response.headers().contains_key(CONNECTION));
    }

    #[tokio::test]
    async fn unreachable_upstream_fails() {
        // Nothing listens on this port.
        let upstream = Upstream::new(&UpstreamConfig {
            url: Url::parse("http://127.0.0.1:9").unwrap(),
            timeout_secs: 1,
        });

        let request = Request::builder()
            .uri("http://example.com/")
            .body(Bytes::new())
            .unwrap();

        let err = upstream.forward(request, "/", None).await.unwrap_err();
        assert!(matches!(
            err,
            EdgeRouterError::UpstreamRequestFailed(_, _) | EdgeRouterError::UpstreamTimeout(_)
        ));
    }
}
