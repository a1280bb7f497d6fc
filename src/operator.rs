//! Bot operator linkage.

use std::num::NonZeroI64;

use serde::{Deserialize, Serialize};

use crate::wire;

/// Bot operation metadata of a user.
///
/// A user without linkage carries no [`OperatorInfo`] at all; a present but
/// empty value means linked but inactive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorInfo {
    #[serde(
        default,
        with = "wire::telegram_id",
        skip_serializing_if = "Option::is_none"
    )]
    telegram_id: Option<NonZeroI64>,
    #[serde(default, skip_serializing_if = "wire::is_false")]
    active_telegram_operator: bool,
}

impl OperatorInfo {
    /// Create a new [`OperatorInfo`]. A `telegram_id` of `0` means no
    /// Telegram account is linked.
    pub fn new(telegram_id: i64, active_telegram_operator: bool) -> Self {
        Self {
            telegram_id: NonZeroI64::new(telegram_id),
            active_telegram_operator,
        }
    }

    pub fn telegram_id(&self) -> Option<NonZeroI64> {
        self.telegram_id
    }

    pub fn is_active_telegram_operator(&self) -> bool {
        self.active_telegram_operator
    }

    /// Linked to a Telegram account and flagged active.
    pub fn is_enabled(&self) -> bool {
        self.telegram_id.is_some() && self.active_telegram_operator
    }
}
