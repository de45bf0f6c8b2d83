use thiserror::Error;

/// Failure talking to the content API
///
/// Never retried or translated; callers decide whether the whole render
/// fails.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("content API returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
    #[error("malformed payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("content API did not advertise a master ref")]
    NoMasterRef,
    #[error("unrecognized page token: {0}")]
    InvalidToken(String),
}
