// src/error.rs

//! Unified error handling for the catalog library.

use std::fmt;

use thiserror::Error;

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed facet input or session parameters.
    ///
    /// Raised synchronously and never reaches a data source.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A page fetch failed. Retryable.
    #[error("Fetch error for {context}: {message}")]
    Fetch { context: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error with context.
    pub fn fetch(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch { .. } | Self::Json(_) | Self::Io(_) => true,
            #[cfg(feature = "http")]
            Self::Http(_) => true,
            Self::Toml(_) | Self::Url(_) | Self::Config(_) | Self::Validation(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_not_retryable() {
        assert!(!AppError::validation("min > max").is_retryable());
    }

    #[test]
    fn test_fetch_is_retryable() {
        let err = AppError::fetch("books page 2", "connection reset");
        assert!(err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Fetch error for books page 2: connection reset"
        );
    }
}
