//! Language preferences.

use serde::{Deserialize, Serialize};

use crate::wire;

/// One language preference of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryLanguage {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    language_code: String,
    #[serde(
        default,
        deserialize_with = "wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    preference: Option<String>,
}

impl DirectoryLanguage {
    /// Create a new [`DirectoryLanguage`] without preference strength.
    pub fn new(language_code: impl Into<String>) -> Self {
        Self {
            language_code: language_code.into(),
            preference: None,
        }
    }

    /// Update `preference` of [`DirectoryLanguage`], e.g. `preferred`.
    pub fn with_preference(mut self, preference: impl Into<String>) -> Self {
        self.preference = wire::non_empty(preference.into());
        self
    }

    pub fn language_code(&self) -> &str {
        &self.language_code
    }

    pub fn preference(&self) -> Option<&str> {
        self.preference.as_deref()
    }
}
