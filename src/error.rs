use thiserror::Error;

#[derive(Error, Debug)]
pub enum CibusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Data API error: {0}")]
    Store(String),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Interrupted by user")]
    Interrupted,
}

pub type Result<T> = std::result::Result<T, CibusError>;
