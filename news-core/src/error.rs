use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("headline endpoint returned status {0}")]
    Status(u16),
    #[error("headline endpoint reported an error: {0}")]
    Api(String),
    #[error("article payload parsing error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("cache store error: {0}")]
    Store(String),
    #[error("sync task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("sync engine stopped")]
    Stopped,
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Store(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON in config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid endpoint: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
