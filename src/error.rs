//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.
//! HTTP-facing errors live in [`crate::api::error`] and wrap these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(reqwest::Error),

    #[error("Text generation provider error: {0}")]
    AiProvider(String),

    /// Carries the message already extracted for the caller.
    #[error("Image generation provider error: {0}")]
    ImageProvider(String),

    #[error("Upstream request timed out: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err.to_string())
        } else {
            Error::Http(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
