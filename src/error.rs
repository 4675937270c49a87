use thiserror::Error;

/// Closed set of failure kinds, so call sites can decide retry-vs-fatal per
/// kind instead of collapsing every failure into one bucket.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("auth error: {0}")]
    Auth(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for MonitorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return MonitorError::Parse(err.to_string());
        }

        match err.status() {
            Some(status)
                if status == reqwest::StatusCode::UNAUTHORIZED
                    || status == reqwest::StatusCode::FORBIDDEN =>
            {
                MonitorError::Auth(err.to_string())
            }
            _ => MonitorError::Transport(err),
        }
    }
}
