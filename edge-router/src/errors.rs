use thiserror::Error;

/// Errors raised while routing or forwarding a request.
#[derive(Error, Debug)]
pub enum EdgeRouterError {
    #[error("failed to read response body from {0}: {1}")]
    ResponseBody(String, String),

    #[error("upstream request failed for {0}: {1}")]
    UpstreamRequestFailed(String, String),

    #[error("upstream timeout for {0}")]
    UpstreamTimeout(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
