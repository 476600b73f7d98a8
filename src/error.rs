use std::path::PathBuf;

use thiserror::Error;

/// Failures from the document store or key-value store backends
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed store file {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("failed to encode {what}: {message}")]
    Encode { what: &'static str, message: String },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        StoreError::Malformed {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn encode(what: &'static str, err: impl std::fmt::Display) -> Self {
        StoreError::Encode {
            what,
            message: err.to_string(),
        }
    }
}

/// Reasons the add-experience form cannot produce a draft
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Title is required")]
    MissingTitle,

    #[error("Pick a location on the map")]
    MissingLocation,
}

/// Geolocation lookup failures. Always recovered by the fallback location.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocateError {
    #[error("geolocation unsupported")]
    Unsupported,

    #[error("geolocation denied")]
    Denied,
}
