//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use std::fmt;
use thiserror::Error;

/// The two remote generation services the tool talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Description,
    Portrait,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Description => write!(f, "text-generation endpoint"),
            Endpoint::Portrait => write!(f, "image-generation endpoint"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure or non-2xx status from either endpoint.
    #[error("Bad response from {endpoint}: {reason}")]
    RemoteCallFailed { endpoint: Endpoint, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] ::image::ImageError),

    #[error("Base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generic error: {0}")]
    Generic(String),
}

impl Error {
    pub fn remote(endpoint: Endpoint, reason: impl Into<String>) -> Self {
        Error::RemoteCallFailed {
            endpoint,
            reason: reason.into(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Error::RemoteCallFailed { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
