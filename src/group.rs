//! Directory groups a user belongs to.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::wire;

/// Provider limit on group descriptions, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 4096;

/// Group a [`crate::DirectoryUser`] belongs to.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate,
)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryGroup {
    #[serde(
        default,
        deserialize_with = "wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    #[validate(email(message = "group email must be a valid address"))]
    email: String,
    #[serde(
        default,
        deserialize_with = "wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    name: Option<String>,
    #[serde(
        default,
        deserialize_with = "wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(
        max = 4096,
        message = "description exceeds 4096 characters"
    ))]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "wire::is_false")]
    admin_created: bool,
    #[serde(
        default,
        deserialize_with = "wire::null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    aliases: Vec<String>,
    #[serde(
        default,
        deserialize_with = "wire::null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    non_editable_aliases: Vec<String>,
    #[serde(
        default,
        with = "wire::string_count",
        skip_serializing_if = "wire::is_zero"
    )]
    direct_members_count: u64,
    #[serde(
        default,
        deserialize_with = "wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    kind: Option<String>,
    #[serde(
        default,
        deserialize_with = "wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    etag: Option<String>,
}

impl DirectoryGroup {
    /// Create a new [`DirectoryGroup`] identified by its email.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    /// Update `id` of [`DirectoryGroup`].
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = wire::non_empty(id.into());
        self
    }

    /// Update display `name` of [`DirectoryGroup`].
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = wire::non_empty(name.into());
        self
    }

    /// Update `description` of [`DirectoryGroup`].
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = wire::non_empty(description.into());
        self
    }

    /// Mark the group as created by an administrator.
    pub fn with_admin_created(mut self, admin_created: bool) -> Self {
        self.admin_created = admin_created;
        self
    }

    /// Update editable `aliases` of [`DirectoryGroup`].
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Update provider managed `non_editable_aliases` of [`DirectoryGroup`].
    pub fn with_non_editable_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.non_editable_aliases =
            aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Update `direct_members_count` of [`DirectoryGroup`].
    pub fn with_direct_members_count(mut self, count: u64) -> Self {
        self.direct_members_count = count;
        self
    }

    /// Update resource `kind` of [`DirectoryGroup`].
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = wire::non_empty(kind.into());
        self
    }

    /// Update `etag` of [`DirectoryGroup`].
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = wire::non_empty(etag.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_admin_created(&self) -> bool {
        self.admin_created
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn non_editable_aliases(&self) -> &[String] {
        &self.non_editable_aliases
    }

    /// Users directly in the group; members of nested groups are not
    /// counted.
    pub fn direct_members_count(&self) -> u64 {
        self.direct_members_count
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    /// Whether `email` addresses this group, by primary email or alias.
    pub fn answers_to(&self, email: &str) -> bool {
        std::iter::once(&self.email)
            .chain(&self.aliases)
            .chain(&self.non_editable_aliases)
            .any(|address| address.eq_ignore_ascii_case(email))
    }

    /// Addresses present in both alias lists.
    pub(crate) fn overlapping_aliases(&self) -> Vec<&str> {
        self.aliases
            .iter()
            .filter(|alias| {
                self.non_editable_aliases
                    .iter()
                    .any(|other| other.eq_ignore_ascii_case(alias))
            })
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn operators() -> DirectoryGroup {
        DirectoryGroup::new("bot-operators@example.com")
            .with_id("03x8tuzt3hqdv5v")
            .with_name("Bot Operators")
            .with_admin_created(true)
            .with_aliases(["operators@example.com"])
            .with_direct_members_count(12)
            .with_kind("admin#directory#group")
    }

    #[test]
    fn test_group_wire_form() {
        let value = serde_json::to_value(operators()).unwrap();

        assert_eq!(
            value,
            json!({
                "id": "03x8tuzt3hqdv5v",
                "email": "bot-operators@example.com",
                "name": "Bot Operators",
                "adminCreated": true,
                "aliases": ["operators@example.com"],
                "directMembersCount": "12",
                "kind": "admin#directory#group",
            })
        );

        let group: DirectoryGroup = serde_json::from_value(value).unwrap();
        assert_eq!(group, operators());
    }

    #[test]
    fn test_group_ignores_unknown_fields() {
        let group: DirectoryGroup = serde_json::from_value(json!({
            "email": "staff@example.com",
            "description": "",
            "nonEditableAliases": null,
            "directMembersCount": "3",
            "unexpected": { "nested": true },
        }))
        .unwrap();

        assert_eq!(
            group,
            DirectoryGroup::new("staff@example.com")
                .with_direct_members_count(3)
        );
    }

    #[test]
    fn test_answers_to() {
        let group = operators().with_non_editable_aliases(["ops@example.net"]);

        assert!(group.answers_to("BOT-OPERATORS@example.com"));
        assert!(group.answers_to("operators@example.com"));
        assert!(group.answers_to("ops@example.net"));
        assert!(!group.answers_to("admins@example.com"));
    }

    #[test]
    fn test_group_field_validation() {
        assert!(operators().validate().is_ok());

        let group = DirectoryGroup::new("not an email")
            .with_description("x".repeat(MAX_DESCRIPTION_LENGTH + 1));
        let errors = group.validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("description"));
    }

    #[test]
    fn test_overlapping_aliases() {
        let group = operators()
            .with_non_editable_aliases(["Operators@example.com", "x@y.io"]);
        assert_eq!(group.overlapping_aliases(), vec!["operators@example.com"]);
    }
}
