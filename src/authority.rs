//! Catalog of authorities granted to directory users.
//!
//! The list of authorities a user holds is resolved upstream from the
//! directory data. This module only knows which codes exist and what they
//! mean.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every permission code known to the application.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
pub enum Authority {
    /// User is logged in and configured on the remote directory.
    #[serde(rename = "AUTHENTICATED")]
    Authenticated,
    /// User is a super admin in the current context.
    #[serde(rename = "ROOT")]
    Root,
    /// User belongs to the Bot Operators group.
    #[serde(rename = "BOT_OPERATOR")]
    BotOperator,
    /// User has a Telegram ID and an active operator status.
    #[serde(rename = "ENABLED_BOT_OPERATOR")]
    EnabledBotOperator,
    /// User belongs to the Bot Service Administrators group.
    #[serde(rename = "BOT_SERVICE_ADMIN")]
    BotServiceAdmin,
    /// User is enrolled in 2-step verification.
    #[serde(rename = "2FA_ENROLLED")]
    EnrolledIn2Sv,
}

impl Authority {
    /// The whole catalog, in declaration order.
    pub const ALL: [Authority; 6] = [
        Authority::Authenticated,
        Authority::Root,
        Authority::BotOperator,
        Authority::EnabledBotOperator,
        Authority::BotServiceAdmin,
        Authority::EnrolledIn2Sv,
    ];

    /// Wire code of the authority.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Authority::Authenticated => "AUTHENTICATED",
            Authority::Root => "ROOT",
            Authority::BotOperator => "BOT_OPERATOR",
            Authority::EnabledBotOperator => "ENABLED_BOT_OPERATOR",
            Authority::BotServiceAdmin => "BOT_SERVICE_ADMIN",
            Authority::EnrolledIn2Sv => "2FA_ENROLLED",
        }
    }

    /// Human readable meaning of the authority.
    pub const fn description(&self) -> &'static str {
        match self {
            Authority::Authenticated => {
                "logged in and present in the directory"
            },
            Authority::Root => "super administrator in this context",
            Authority::BotOperator => "member of the Bot Operators group",
            Authority::EnabledBotOperator => {
                "configured to actively operate as bot operator"
            },
            Authority::BotServiceAdmin => {
                "member of the Bot Service Administrators group"
            },
            Authority::EnrolledIn2Sv => "enrolled in 2-step verification",
        }
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Code is not part of the [`Authority`] catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown authority code {0:?}")]
pub struct UnknownAuthority(pub String);

impl FromStr for Authority {
    type Err = UnknownAuthority;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Authority::ALL
            .into_iter()
            .find(|authority| authority.as_str() == code)
            .ok_or_else(|| UnknownAuthority(code.to_owned()))
    }
}

/// Check whether `code` belongs to the catalog.
pub fn is_known(code: &str) -> bool {
    code.parse::<Authority>().is_ok()
}

/// Raw authority code as received on the wire.
///
/// Unknown codes are kept as-is so validation can name them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthorityCode {
    Known(Authority),
    Unknown(String),
}

impl AuthorityCode {
    /// Returns the wire code as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            AuthorityCode::Known(authority) => authority.as_str(),
            AuthorityCode::Unknown(code) => code,
        }
    }
}

impl From<String> for AuthorityCode {
    fn from(code: String) -> Self {
        match code.parse() {
            Ok(authority) => AuthorityCode::Known(authority),
            Err(UnknownAuthority(code)) => AuthorityCode::Unknown(code),
        }
    }
}

impl From<AuthorityCode> for String {
    fn from(code: AuthorityCode) -> Self {
        match code {
            AuthorityCode::Known(authority) => authority.as_str().to_owned(),
            AuthorityCode::Unknown(code) => code,
        }
    }
}

impl From<Authority> for AuthorityCode {
    fn from(authority: Authority) -> Self {
        AuthorityCode::Known(authority)
    }
}

impl fmt::Display for AuthorityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authority granted to a [`crate::DirectoryUser`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectoryAuthority {
    code: AuthorityCode,
}

impl DirectoryAuthority {
    /// Create a [`DirectoryAuthority`] from a catalog entry.
    pub fn new(authority: Authority) -> Self {
        Self {
            code: AuthorityCode::Known(authority),
        }
    }

    /// Create a [`DirectoryAuthority`] from an untrusted raw code.
    pub fn from_code(code: impl Into<String>) -> Self {
        Self {
            code: AuthorityCode::from(code.into()),
        }
    }

    pub fn code(&self) -> &AuthorityCode {
        &self.code
    }

    /// Typed authority, `None` when the code is outside the catalog.
    pub fn authority(&self) -> Option<Authority> {
        match self.code {
            AuthorityCode::Known(authority) => Some(authority),
            AuthorityCode::Unknown(_) => None,
        }
    }
}

impl From<Authority> for DirectoryAuthority {
    fn from(authority: Authority) -> Self {
        Self::new(authority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_codes() {
        for authority in Authority::ALL {
            assert!(is_known(authority.as_str()));
            assert_eq!(authority.as_str().parse(), Ok(authority));
        }

        assert_eq!(Authority::EnrolledIn2Sv.to_string(), "2FA_ENROLLED");
        assert!(!is_known("FOOBAR"));
        // Codes are case sensitive.
        assert!(!is_known("root"));
        assert_eq!(
            "FOOBAR".parse::<Authority>(),
            Err(UnknownAuthority("FOOBAR".into()))
        );
    }

    #[test]
    fn test_authority_serde() {
        let json = serde_json::to_string(&Authority::EnabledBotOperator)
            .unwrap();
        assert_eq!(json, r#""ENABLED_BOT_OPERATOR""#);

        let authority: Authority = serde_json::from_str(r#""2FA_ENROLLED""#)
            .unwrap();
        assert_eq!(authority, Authority::EnrolledIn2Sv);

        assert!(serde_json::from_str::<Authority>(r#""FOOBAR""#).is_err());
    }

    #[test]
    fn test_directory_authority_keeps_unknown_code() {
        let authority: DirectoryAuthority =
            serde_json::from_str(r#"{"code":"FOOBAR"}"#).unwrap();

        assert_eq!(authority.authority(), None);
        assert_eq!(authority.code(), &AuthorityCode::Unknown("FOOBAR".into()));
        assert_eq!(
            serde_json::to_value(&authority).unwrap(),
            serde_json::json!({ "code": "FOOBAR" })
        );

        let root: DirectoryAuthority =
            serde_json::from_str(r#"{"code":"ROOT"}"#).unwrap();
        assert_eq!(root, DirectoryAuthority::new(Authority::Root));
        assert_eq!(root.authority(), Some(Authority::Root));
    }

    #[test]
    fn test_directory_authority_requires_code() {
        assert!(serde_json::from_str::<DirectoryAuthority>("{}").is_err());
    }
}
