use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("controller answered {status} on {endpoint}")]
    Status {
        endpoint: &'static str,
        status: u16,
    },
    #[error("controller request timed out")]
    Timeout,
    #[error("controller unreachable: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for LinkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LinkError::Timeout
        } else {
            LinkError::Transport(e.to_string())
        }
    }
}
