// ABOUTME: Error types for remote calls, article loading, and fatal CLI failures
// ABOUTME: Per-article errors are recoverable; crate-level Error maps to exit codes

use std::path::PathBuf;
use thiserror::Error;

/// Failure talking to the article store or the image host.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Connection error: {0}")]
    Connection(#[from] reqwest::Error),
}

impl RemoteError {
    /// Classifies a non-success HTTP status the way the dev.to API reports failures.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 | 422 => RemoteError::BadRequest(message),
            401 => RemoteError::Auth(format!(
                "Unable to authenticate request, check `DEVTO_API_KEY` ({})",
                message
            )),
            _ => RemoteError::Server { status, message },
        }
    }
}

/// Failure turning one local markdown file into an article.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed front matter in {path}: {message}")]
    FrontMatter { path: PathBuf, message: String },

    #[error("Missing required `title` in {path}")]
    MissingTitle { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl Error {
    /// Every fatal error exits 1; clap itself exits 2 on malformed arguments.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Auth(_) | Error::Remote(_) | Error::Input(_) => 1,
            Error::Filesystem(_) | Error::Yaml(_) | Error::Logging(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
