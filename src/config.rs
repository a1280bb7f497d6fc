//! Configuration manager for directory payload inspection.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DirectoryError, Result};
use crate::user::ValidationPolicy;

const DEFAULT_CONFIG_PATH: &str = "directory.yaml";

/// What callers do with a user failing validation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Reject the identity.
    #[default]
    Fatal,
    /// Log violations and keep the identity.
    Advisory,
}

impl Policy {
    /// Whether a run that found `failures` invalid payloads is rejected.
    pub fn rejects(self, failures: usize) -> bool {
        self == Policy::Fatal && failures > 0
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Handling of validation failures.
    pub policy: Policy,
    /// Related to validation rules.
    pub validation: ValidationPolicy,
    #[serde(skip)]
    path: PathBuf,
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Reads the file set with [`Configuration::path`], or `directory.yaml`
    /// when no path was given.
    ///
    /// A missing or unreadable file falls back to the default
    /// configuration.
    pub fn read(self) -> Self {
        let file_path = if self.path.as_os_str().is_empty() {
            Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        } else {
            self.path.clone()
        };

        match Self::load(&file_path) {
            Ok(config) => {
                tracing::debug!(
                    path = %file_path.display(),
                    "configuration loaded"
                );
                config.path(file_path)
            },
            Err(err) => self.error(err),
        }
    }

    /// Reads configuration at `path`, failing on any error.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| DirectoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Configuration = serde_yaml::from_reader(file)?;

        // group addresses are compared without case.
        for group in [
            &mut config.validation.bot_operators_group,
            &mut config.validation.bot_service_admins_group,
        ] {
            if let Some(email) = group.take() {
                let email = email.trim().to_lowercase();
                *group = (!email.is_empty()).then_some(email);
            }
        }

        Ok(config)
    }

    /// Return a default configuration as fallback.
    fn error(self, err: impl std::error::Error) -> Self {
        tracing::error!(
            error = %err,
            "configuration file not loaded, using defaults"
        );
        Self {
            path: self.path,
            ..Default::default()
        }
    }
}
