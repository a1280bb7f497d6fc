mod builder;
mod validation;

pub use builder::*;
pub use validation::*;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::authority::{Authority, DirectoryAuthority};
use crate::error::Result;
use crate::group::DirectoryGroup;
use crate::language::DirectoryLanguage;
use crate::operator::OperatorInfo;
use crate::wire;

/// User as resolved from the remote directory.
///
/// Shaped after the Google Directory Admin user resource, flattened and
/// annotated with the authorities granted by the application. Values are
/// immutable: use [`DirectoryUser::into_builder`] to derive an updated copy.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate,
)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    id: String,
    #[serde(
        default,
        deserialize_with = "wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(email(message = "primary email must be a valid address"))]
    primary_email: Option<String>,
    #[serde(
        default,
        deserialize_with = "wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    full_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    given_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    family_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "wire::null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    aliases: Vec<String>,
    #[serde(
        default,
        deserialize_with = "wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    org_unit_path: Option<String>,
    #[serde(default, skip_serializing_if = "wire::is_false")]
    archived: bool,
    #[serde(default, skip_serializing_if = "wire::is_false")]
    suspended: bool,
    #[serde(
        default,
        deserialize_with = "wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    suspension_reason: Option<String>,
    #[serde(
        default,
        deserialize_with = "wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    creation_time: Option<String>,
    #[serde(
        default,
        deserialize_with = "wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    deletion_time: Option<String>,
    #[serde(default, skip_serializing_if = "wire::is_false")]
    is_admin: bool,
    #[serde(default, skip_serializing_if = "wire::is_false")]
    is_delegated_admin: bool,
    #[serde(
        default,
        rename = "isEnrolledIn2Sv",
        skip_serializing_if = "wire::is_false"
    )]
    is_enrolled_in_2sv: bool,
    #[serde(
        default,
        rename = "isEnforcedIn2Sv",
        skip_serializing_if = "wire::is_false"
    )]
    is_enforced_in_2sv: bool,
    #[serde(
        default,
        deserialize_with = "wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(email(message = "recovery email must be a valid address"))]
    recovery_email: Option<String>,
    #[serde(
        default,
        deserialize_with = "wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    recovery_phone: Option<String>,
    #[serde(
        default,
        deserialize_with = "wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(url(message = "thumbnail photo url must be a valid URL"))]
    thumbnail_photo_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    thumbnail_photo_etag: Option<String>,
    #[serde(
        default,
        deserialize_with = "wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    etag: Option<String>,
    #[serde(
        default,
        deserialize_with = "wire::null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    languages: Vec<DirectoryLanguage>,
    /// Always on the wire: an empty list means "known, no membership".
    #[serde(default, deserialize_with = "wire::null_as_empty")]
    #[validate(nested)]
    groups: Vec<DirectoryGroup>,
    /// Always on the wire, like `groups`.
    #[serde(default, deserialize_with = "wire::null_as_empty")]
    authorities: Vec<DirectoryAuthority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    operator_info: Option<OperatorInfo>,
}

impl DirectoryUser {
    /// Start building a new [`DirectoryUser`].
    pub fn builder() -> DirectoryUserBuilder<Missing> {
        DirectoryUserBuilder::new()
    }

    /// Reopen the value for a functional update.
    pub fn into_builder(self) -> DirectoryUserBuilder<Present<String>> {
        DirectoryUserBuilder::from_user(self)
    }

    /// Decode a user from its JSON wire form.
    ///
    /// The result is well formed but not validated; see
    /// [`DirectoryUser::parse`].
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Decode a user from an untrusted payload and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DirectoryError::Json`] on malformed input and
    /// [`crate::DirectoryError::Validation`] with every violation found
    /// otherwise.
    pub fn parse(input: &str) -> Result<Self> {
        let user = Self::from_json(input)?;

        if let Err(violations) = user.validate() {
            tracing::warn!(
                user_id = %user.id,
                violations = violations.len(),
                "rejected directory user"
            );
            return Err(violations.into());
        }

        Ok(user)
    }

    /// Encode the user into its JSON wire form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Primary address, unique and never an alias of another user.
    pub fn primary_email(&self) -> Option<&str> {
        self.primary_email.as_deref()
    }

    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    pub fn given_name(&self) -> Option<&str> {
        self.given_name.as_deref()
    }

    pub fn family_name(&self) -> Option<&str> {
        self.family_name.as_deref()
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Organization unit, `/` being the top-level one.
    pub fn org_unit_path(&self) -> Option<&str> {
        self.org_unit_path.as_deref()
    }

    pub fn is_archived(&self) -> bool {
        self.archived
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn suspension_reason(&self) -> Option<&str> {
        self.suspension_reason.as_deref()
    }

    pub fn creation_time(&self) -> Option<&str> {
        self.creation_time.as_deref()
    }

    pub fn deletion_time(&self) -> Option<&str> {
        self.deletion_time.as_deref()
    }

    /// Super administrator on the directory. Provider authoritative.
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn is_delegated_admin(&self) -> bool {
        self.is_delegated_admin
    }

    pub fn is_enrolled_in_2sv(&self) -> bool {
        self.is_enrolled_in_2sv
    }

    pub fn is_enforced_in_2sv(&self) -> bool {
        self.is_enforced_in_2sv
    }

    pub fn recovery_email(&self) -> Option<&str> {
        self.recovery_email.as_deref()
    }

    pub fn recovery_phone(&self) -> Option<&str> {
        self.recovery_phone.as_deref()
    }

    pub fn thumbnail_photo_url(&self) -> Option<&str> {
        self.thumbnail_photo_url.as_deref()
    }

    pub fn thumbnail_photo_etag(&self) -> Option<&str> {
        self.thumbnail_photo_etag.as_deref()
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn languages(&self) -> &[DirectoryLanguage] {
        &self.languages
    }

    pub fn groups(&self) -> &[DirectoryGroup] {
        &self.groups
    }

    pub fn authorities(&self) -> &[DirectoryAuthority] {
        &self.authorities
    }

    pub fn operator_info(&self) -> Option<&OperatorInfo> {
        self.operator_info.as_ref()
    }

    /// Check a granted authority. Permission checks must go through here
    /// rather than the raw directory flags.
    pub fn has_authority(&self, authority: Authority) -> bool {
        self.authorities
            .iter()
            .any(|granted| granted.authority() == Some(authority))
    }

    /// Granted authorities that belong to the catalog.
    pub fn known_authorities(&self) -> impl Iterator<Item = Authority> + '_ {
        self.authorities.iter().filter_map(DirectoryAuthority::authority)
    }

    /// Group answering to `email`, by address or alias.
    pub fn group(&self, email: &str) -> Option<&DirectoryGroup> {
        self.groups.iter().find(|group| group.answers_to(email))
    }

    pub fn is_member_of(&self, group_email: &str) -> bool {
        self.group(group_email).is_some()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// Fully populated and consistent user.
    pub(crate) fn operator() -> DirectoryUser {
        DirectoryUser::builder()
            .id("104257886510214587321")
            .primary_email("jane.doe@example.com")
            .full_name("Jane Doe")
            .given_name("Jane")
            .family_name("Doe")
            .aliases(["jdoe@example.com"])
            .org_unit_path("/Operations")
            .creation_time("2021-03-04T10:15:00.000Z")
            .enrolled_in_2sv(true)
            .enforced_in_2sv(true)
            .thumbnail_photo_url("https://lh3.example.com/photo.jpg")
            .thumbnail_photo_etag("\"photo-etag\"")
            .etag("\"user-etag\"")
            .language(
                DirectoryLanguage::new("en-GB").with_preference("preferred"),
            )
            .group(
                DirectoryGroup::new("bot-operators@example.com")
                    .with_id("03x8tuzt3hqdv5v")
                    .with_name("Bot Operators")
                    .with_direct_members_count(4),
            )
            .authority(Authority::Authenticated)
            .authority(Authority::BotOperator)
            .authority(Authority::EnabledBotOperator)
            .authority(Authority::EnrolledIn2Sv)
            .operator_info(OperatorInfo::new(123456789, true))
            .build()
    }

    #[test]
    fn test_round_trip() {
        let user = operator();
        let json = user.to_json().unwrap();

        assert_eq!(DirectoryUser::from_json(&json).unwrap(), user);
    }

    #[test]
    fn test_empty_collections_survive_round_trip() {
        let user = DirectoryUser::builder()
            .id("1")
            .primary_email("john@example.com")
            .build();
        let value = serde_json::to_value(&user).unwrap();

        assert_eq!(
            value,
            json!({
                "id": "1",
                "primaryEmail": "john@example.com",
                "groups": [],
                "authorities": [],
            })
        );

        let decoded: DirectoryUser = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, user);
        assert!(decoded.groups().is_empty());
        assert!(decoded.authorities().is_empty());
    }

    #[test]
    fn test_zero_values_are_omitted() {
        let user = operator()
            .into_builder()
            .archived(false)
            .suspended(false)
            .admin(false)
            .full_name("")
            .build();
        let value = serde_json::to_value(&user).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "archived",
            "suspended",
            "suspensionReason",
            "isAdmin",
            "isDelegatedAdmin",
            "fullName",
            "deletionTime",
            "recoveryEmail",
        ] {
            assert!(!object.contains_key(key), "{key} should be omitted");
        }
        assert_eq!(object["isEnrolledIn2Sv"], json!(true));
        assert_eq!(object["isEnforcedIn2Sv"], json!(true));
        assert_eq!(object["groups"][0]["directMembersCount"], json!("4"));
        assert_eq!(
            object["operatorInfo"],
            json!({ "telegramId": 123456789, "activeTelegramOperator": true })
        );
    }

    #[test]
    fn test_absent_fields_read_as_zero_values() {
        let explicit: DirectoryUser = serde_json::from_value(json!({
            "id": "1",
            "primaryEmail": "john@example.com",
            "archived": false,
            "suspensionReason": "",
            "aliases": null,
            "groups": null,
            "authorities": [],
        }))
        .unwrap();
        let omitted: DirectoryUser = serde_json::from_value(json!({
            "id": "1",
            "primaryEmail": "john@example.com",
        }))
        .unwrap();

        assert_eq!(explicit, omitted);
        assert_eq!(omitted.suspension_reason(), None);
        assert!(!omitted.is_archived());
    }

    #[test]
    fn test_operator_info_absence_is_distinct_from_empty() {
        let absent = DirectoryUser::from_json(r#"{"id":"1"}"#).unwrap();
        let empty =
            DirectoryUser::from_json(r#"{"id":"1","operatorInfo":{}}"#)
                .unwrap();
        let null =
            DirectoryUser::from_json(r#"{"id":"1","operatorInfo":null}"#)
                .unwrap();

        assert_eq!(absent.operator_info(), None);
        assert_eq!(null.operator_info(), None);
        assert_eq!(empty.operator_info(), Some(&OperatorInfo::default()));
        assert!(empty.to_json().unwrap().contains(r#""operatorInfo":{}"#));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let user = DirectoryUser::from_json(
            r#"{
                "id": "1",
                "primaryEmail": "john@example.com",
                "kind": "admin#directory#user",
                "customSchemas": { "Bot": { "telegram": 1 } },
                "authorities": [{ "code": "AUTHENTICATED", "granted": true }]
            }"#,
        )
        .unwrap();

        assert_eq!(user.id(), "1");
        assert!(user.has_authority(Authority::Authenticated));
    }

    #[test]
    fn test_malformed_payload() {
        let err = DirectoryUser::from_json(r#"{"id":"1","archived":"yes"}"#)
            .unwrap_err();
        assert!(matches!(err, crate::DirectoryError::Json(_)));

        let err = DirectoryUser::from_json(
            r#"{"id":"1","groups":[{"directMembersCount":"-4"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, crate::DirectoryError::Json(_)));
    }

    #[test]
    fn test_authority_lookup() {
        let user = operator();

        assert!(user.has_authority(Authority::EnabledBotOperator));
        assert!(!user.has_authority(Authority::Root));
        assert_eq!(
            user.known_authorities().collect::<Vec<_>>(),
            vec![
                Authority::Authenticated,
                Authority::BotOperator,
                Authority::EnabledBotOperator,
                Authority::EnrolledIn2Sv,
            ]
        );
    }

    #[test]
    fn test_group_lookup() {
        let user = operator();

        assert!(user.is_member_of("bot-operators@example.com"));
        assert!(!user.is_member_of("bot-admins@example.com"));
        assert_eq!(
            user.group("BOT-OPERATORS@example.com")
                .and_then(DirectoryGroup::name),
            Some("Bot Operators")
        );
    }

    #[test]
    fn test_parse_rejects_inconsistent_user() {
        let err = DirectoryUser::parse(
            r#"{"id":"1","primaryEmail":"john@example.com","suspensionReason":"spam"}"#,
        )
        .unwrap_err();

        let violations = err.violations().unwrap();
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            violations.as_slice()[0],
            Violation::InconsistentSuspensionState { suspended: false }
        ));

        let json = operator().to_json().unwrap();
        assert_eq!(DirectoryUser::parse(&json).unwrap(), operator());
    }
}
