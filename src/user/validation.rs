//! Consistency rules of a [`DirectoryUser`].

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{
    Validate, ValidateEmail, ValidationErrors, ValidationErrorsKind,
};

use crate::authority::{Authority, AuthorityCode};
use crate::user::DirectoryUser;

/// Maximum encoded size of the languages list, per provider convention.
pub const MAX_LANGUAGES_BYTES: usize = 1024;

/// Match E.164 phone numbers.
static E164: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+[1-9][0-9]{1,14}$").expect("E.164 pattern must compile")
});

pub type ValidationResult = std::result::Result<(), Violations>;

/// Requirement of `ENABLED_BOT_OPERATOR` the user does not meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorRequirement {
    BotOperatorAuthority,
    OperatorInfo,
    TelegramId,
    ActiveOperator,
}

impl fmt::Display for OperatorRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperatorRequirement::BotOperatorAuthority => {
                "BOT_OPERATOR is not granted"
            },
            OperatorRequirement::OperatorInfo => "operator info is missing",
            OperatorRequirement::TelegramId => "no Telegram account is linked",
            OperatorRequirement::ActiveOperator => "operator is not active",
        })
    }
}

/// One inconsistency found on a [`DirectoryUser`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("unknown authority code {code:?}")]
    UnknownAuthorityCode { code: String },

    #[error("authority code {code:?} is granted more than once")]
    DuplicateAuthorityCode { code: String },

    #[error("{}", suspension_message(.suspended))]
    InconsistentSuspensionState { suspended: bool },

    #[error("ENABLED_BOT_OPERATOR granted but {}", join(.unmet, ", "))]
    InconsistentOperatorState { unmet: Vec<OperatorRequirement> },

    #[error("{authority} granted but {requirement}")]
    UnmetAuthorityPrecondition {
        authority: Authority,
        requirement: String,
    },

    #[error("primary email is required for users that are not archived")]
    MissingRequiredIdentity,

    #[error("invalid `{field}`: {message}")]
    InvalidField { field: String, message: String },
}

fn suspension_message(suspended: &bool) -> &'static str {
    if *suspended {
        "suspended user has no suspension reason"
    } else {
        "suspension reason set on a user that is not suspended"
    }
}

fn join<T: fmt::Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Every [`Violation`] found by a single validation pass.
///
/// Never empty: a clean pass returns `Ok(())`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} violation(s): {}", .0.len(), join(.0, "; "))]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Violation] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Violation> {
        self.0
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Tunable part of [`DirectoryUser::validate_with`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// Check provider conventions on field values (email syntax, lengths,
    /// E.164 phone numbers...).
    pub field_checks: bool,
    /// Email of the Bot Operators group. When set, `BOT_OPERATOR` requires
    /// membership.
    pub bot_operators_group: Option<String>,
    /// Email of the Bot Service Administrators group. When set,
    /// `BOT_SERVICE_ADMIN` requires membership.
    pub bot_service_admins_group: Option<String>,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            field_checks: true,
            bot_operators_group: None,
            bot_service_admins_group: None,
        }
    }
}

impl DirectoryUser {
    /// Check every invariant with the default [`ValidationPolicy`].
    ///
    /// All violations are collected, the value is never modified.
    pub fn validate(&self) -> ValidationResult {
        self.validate_with(&ValidationPolicy::default())
    }

    /// Check every invariant under `policy`.
    pub fn validate_with(&self, policy: &ValidationPolicy) -> ValidationResult {
        let mut violations = Vec::new();

        self.check_suspension(&mut violations);
        self.check_identity(&mut violations);
        self.check_authorities(policy, &mut violations);
        if policy.field_checks {
            self.check_fields(&mut violations);
        }

        tracing::debug!(
            user_id = %self.id,
            violations = violations.len(),
            "directory user validated"
        );

        if violations.is_empty() {
            Ok(())
        } else {
            Err(Violations(violations))
        }
    }

    fn check_suspension(&self, violations: &mut Vec<Violation>) {
        if self.suspended != self.suspension_reason.is_some() {
            violations.push(Violation::InconsistentSuspensionState {
                suspended: self.suspended,
            });
        }
    }

    fn check_identity(&self, violations: &mut Vec<Violation>) {
        let has_email = self
            .primary_email
            .as_deref()
            .is_some_and(|email| !email.trim().is_empty());

        if !self.archived && !has_email {
            violations.push(Violation::MissingRequiredIdentity);
        }
    }

    fn check_authorities(
        &self,
        policy: &ValidationPolicy,
        violations: &mut Vec<Violation>,
    ) {
        let mut seen = HashSet::new();
        for granted in &self.authorities {
            let code = granted.code();
            if !seen.insert(code) {
                violations.push(Violation::DuplicateAuthorityCode {
                    code: code.to_string(),
                });
            } else if let AuthorityCode::Unknown(code) = code {
                violations.push(Violation::UnknownAuthorityCode {
                    code: code.clone(),
                });
            }
        }

        if self.has_authority(Authority::EnabledBotOperator) {
            let unmet = self.unmet_operator_requirements();
            if !unmet.is_empty() {
                violations.push(Violation::InconsistentOperatorState { unmet });
            }
        }

        let mut require =
            |authority: Authority, met: bool, requirement: String| {
                if self.has_authority(authority) && !met {
                    violations.push(Violation::UnmetAuthorityPrecondition {
                        authority,
                        requirement,
                    });
                }
            };

        require(Authority::Root, self.is_admin, "isAdmin is not set".into());
        require(
            Authority::EnrolledIn2Sv,
            self.is_enrolled_in_2sv,
            "isEnrolledIn2Sv is not set".into(),
        );
        if let Some(group) = &policy.bot_operators_group {
            require(
                Authority::BotOperator,
                self.is_member_of(group),
                format!("user is not a member of {group}"),
            );
        }
        if let Some(group) = &policy.bot_service_admins_group {
            require(
                Authority::BotServiceAdmin,
                self.is_member_of(group),
                format!("user is not a member of {group}"),
            );
        }
    }

    fn unmet_operator_requirements(&self) -> Vec<OperatorRequirement> {
        let mut unmet = Vec::new();

        if !self.has_authority(Authority::BotOperator) {
            unmet.push(OperatorRequirement::BotOperatorAuthority);
        }
        match &self.operator_info {
            None => unmet.push(OperatorRequirement::OperatorInfo),
            Some(info) => {
                if info.telegram_id().is_none() {
                    unmet.push(OperatorRequirement::TelegramId);
                }
                if !info.is_active_telegram_operator() {
                    unmet.push(OperatorRequirement::ActiveOperator);
                }
            },
        }

        unmet
    }

    fn check_fields(&self, violations: &mut Vec<Violation>) {
        let mut invalid = Vec::new();
        let mut reject = |field: String, message: &str| {
            invalid.push(Violation::InvalidField {
                field,
                message: message.to_owned(),
            });
        };

        if let Err(errors) = Validate::validate(self) {
            collect_field_errors("", &errors, &mut reject);
        }

        let mut aliases = HashSet::new();
        for (index, alias) in self.aliases.iter().enumerate() {
            let field = format!("aliases[{index}]");
            if !alias.validate_email() {
                reject(field, "alias must be a valid address");
            } else if !aliases.insert(alias.to_lowercase()) {
                reject(field, "alias is listed more than once");
            } else if self
                .primary_email
                .as_deref()
                .is_some_and(|email| email.eq_ignore_ascii_case(alias))
            {
                reject(field, "alias repeats the primary email");
            }
        }

        if let Some(path) = &self.org_unit_path {
            if !path.starts_with('/') {
                reject("orgUnitPath".into(), "path must start with `/`");
            }
        }

        if let Some(phone) = &self.recovery_phone {
            if !E164.is_match(phone) {
                reject(
                    "recoveryPhone".into(),
                    "phone number must be in E.164 format",
                );
            }
        }

        if let Ok(encoded) = serde_json::to_vec(&self.languages) {
            if encoded.len() > MAX_LANGUAGES_BYTES {
                reject("languages".into(), "languages exceed 1KB once encoded");
            }
        }

        for (index, group) in self.groups.iter().enumerate() {
            if !group.overlapping_aliases().is_empty() {
                reject(
                    format!("groups[{index}].nonEditableAliases"),
                    "aliases and non-editable aliases must be disjoint",
                );
            }
        }

        invalid.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
        violations.extend(invalid);
    }
}

/// Flatten `validator` errors into dotted camelCase paths.
fn collect_field_errors(
    prefix: &str,
    errors: &ValidationErrors,
    reject: &mut impl FnMut(String, &str),
) {
    for (field, kind) in errors.errors() {
        let field = camel_case(field);
        let path = match (prefix.is_empty(), field == "__all__") {
            (_, true) => prefix.to_owned(),
            (true, false) => field,
            (false, false) => format!("{prefix}.{field}"),
        };

        match kind {
            ValidationErrorsKind::Field(issues) => {
                for issue in issues {
                    let message = issue
                        .message
                        .as_deref()
                        .map_or_else(|| issue.code.to_string(), str::to_owned);
                    reject(path.clone(), &message);
                }
            },
            ValidationErrorsKind::Struct(inner) => {
                collect_field_errors(&path, inner, reject);
            },
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_errors(
                        &format!("{path}[{index}]"),
                        inner,
                        reject,
                    );
                }
            },
        }
    }
}

fn camel_case(field: &str) -> String {
    if field.starts_with("__") {
        return field.to_owned();
    }

    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
