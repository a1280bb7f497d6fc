//! Error handler for directory payloads.

use std::path::PathBuf;

use thiserror::Error;

use crate::user::Violations;

pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Enum representing crate errors.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Payload could not be decoded; no [`crate::DirectoryUser`] exists.
    #[error("malformed directory payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("cannot read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Payload decoded but is semantically inconsistent.
    #[error(transparent)]
    Validation(#[from] Violations),
}

impl DirectoryError {
    /// Violations carried by a [`DirectoryError::Validation`].
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            DirectoryError::Validation(violations) => Some(violations),
            _ => None,
        }
    }
}
