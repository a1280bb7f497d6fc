//! Identity projection of users sourced from an enterprise directory,
//! annotated with the authorities granted by the application.
//!
//! Values are built once, from the directory response and the authority
//! resolution step, and never mutated afterwards. They can be shared
//! between threads freely.

#![forbid(unsafe_code)]
#![deny(unused_mut)]

pub mod authority;
pub mod config;
pub mod error;
pub mod group;
pub mod language;
pub mod operator;
pub mod user;
pub mod wire;

pub use authority::{Authority, AuthorityCode, DirectoryAuthority};
pub use error::{DirectoryError, Result};
pub use group::DirectoryGroup;
pub use language::DirectoryLanguage;
pub use operator::OperatorInfo;
pub use user::{
    DirectoryUser, DirectoryUserBuilder, ValidationPolicy, ValidationResult,
    Violation, Violations,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_values_are_shareable() {
        assert_send_sync::<DirectoryUser>();
        assert_send_sync::<Violations>();
    }
}
