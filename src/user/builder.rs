//! Typed builder for DirectoryUser.

use crate::authority::DirectoryAuthority;
use crate::group::DirectoryGroup;
use crate::language::DirectoryLanguage;
use crate::operator::OperatorInfo;
use crate::user::DirectoryUser;
use crate::wire::non_empty;

/// [`DirectoryUser`] builder.
///
/// Empty strings given to setters are stored as absent values.
#[derive(Debug, Clone)]
pub struct DirectoryUserBuilder<Id> {
    id: Id,
    user: DirectoryUser,
}

/// Value is missing on [`DirectoryUserBuilder`].
#[derive(Debug, Clone)]
pub struct Missing;

/// Value is present on [`DirectoryUserBuilder`].
#[derive(Debug, Clone)]
pub struct Present<T>(pub T);

impl DirectoryUserBuilder<Missing> {
    /// Create a new [`DirectoryUserBuilder`].
    pub fn new() -> Self {
        Self {
            id: Missing,
            user: DirectoryUser::default(),
        }
    }

    /// Update `id` field on [`DirectoryUserBuilder`].
    pub fn id(
        self,
        id: impl Into<String>,
    ) -> DirectoryUserBuilder<Present<String>> {
        DirectoryUserBuilder {
            id: Present(id.into()),
            user: self.user,
        }
    }
}

impl Default for DirectoryUserBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryUserBuilder<Present<String>> {
    pub(crate) fn from_user(mut user: DirectoryUser) -> Self {
        let id = std::mem::take(&mut user.id);
        Self {
            id: Present(id),
            user,
        }
    }

    /// Build the [`DirectoryUser`].
    ///
    /// The value is not validated, call [`DirectoryUser::validate`] before
    /// trusting it.
    pub fn build(self) -> DirectoryUser {
        DirectoryUser {
            id: self.id.0,
            ..self.user
        }
    }
}

impl<Id> DirectoryUserBuilder<Id> {
    /// Update `primary_email` field on [`DirectoryUserBuilder`].
    pub fn primary_email(mut self, email: impl Into<String>) -> Self {
        self.user.primary_email = non_empty(email.into());
        self
    }

    /// Update `full_name` field on [`DirectoryUserBuilder`].
    pub fn full_name(mut self, name: impl Into<String>) -> Self {
        self.user.full_name = non_empty(name.into());
        self
    }

    /// Update `given_name` field on [`DirectoryUserBuilder`].
    pub fn given_name(mut self, name: impl Into<String>) -> Self {
        self.user.given_name = non_empty(name.into());
        self
    }

    /// Update `family_name` field on [`DirectoryUserBuilder`].
    pub fn family_name(mut self, name: impl Into<String>) -> Self {
        self.user.family_name = non_empty(name.into());
        self
    }

    /// Replace alias email addresses.
    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Update `org_unit_path` field on [`DirectoryUserBuilder`].
    pub fn org_unit_path(mut self, path: impl Into<String>) -> Self {
        self.user.org_unit_path = non_empty(path.into());
        self
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.user.archived = archived;
        self
    }

    pub fn suspended(mut self, suspended: bool) -> Self {
        self.user.suspended = suspended;
        self
    }

    /// Update `suspension_reason` field on [`DirectoryUserBuilder`].
    pub fn suspension_reason(mut self, reason: impl Into<String>) -> Self {
        self.user.suspension_reason = non_empty(reason.into());
        self
    }

    /// Mark the user suspended for `reason`.
    pub fn suspend(self, reason: impl Into<String>) -> Self {
        self.suspended(true).suspension_reason(reason)
    }

    /// Clear suspension state and reason.
    pub fn reinstate(mut self) -> Self {
        self.user.suspended = false;
        self.user.suspension_reason = None;
        self
    }

    pub fn creation_time(mut self, time: impl Into<String>) -> Self {
        self.user.creation_time = non_empty(time.into());
        self
    }

    pub fn deletion_time(mut self, time: impl Into<String>) -> Self {
        self.user.deletion_time = non_empty(time.into());
        self
    }

    pub fn admin(mut self, is_admin: bool) -> Self {
        self.user.is_admin = is_admin;
        self
    }

    pub fn delegated_admin(mut self, is_delegated_admin: bool) -> Self {
        self.user.is_delegated_admin = is_delegated_admin;
        self
    }

    pub fn enrolled_in_2sv(mut self, enrolled: bool) -> Self {
        self.user.is_enrolled_in_2sv = enrolled;
        self
    }

    pub fn enforced_in_2sv(mut self, enforced: bool) -> Self {
        self.user.is_enforced_in_2sv = enforced;
        self
    }

    pub fn recovery_email(mut self, email: impl Into<String>) -> Self {
        self.user.recovery_email = non_empty(email.into());
        self
    }

    /// Update `recovery_phone` field, expected in E.164 format.
    pub fn recovery_phone(mut self, phone: impl Into<String>) -> Self {
        self.user.recovery_phone = non_empty(phone.into());
        self
    }

    pub fn thumbnail_photo_url(mut self, url: impl Into<String>) -> Self {
        self.user.thumbnail_photo_url = non_empty(url.into());
        self
    }

    pub fn thumbnail_photo_etag(mut self, etag: impl Into<String>) -> Self {
        self.user.thumbnail_photo_etag = non_empty(etag.into());
        self
    }

    pub fn etag(mut self, etag: impl Into<String>) -> Self {
        self.user.etag = non_empty(etag.into());
        self
    }

    /// Append a language preference.
    pub fn language(mut self, language: DirectoryLanguage) -> Self {
        self.user.languages.push(language);
        self
    }

    /// Replace language preferences.
    pub fn languages(
        mut self,
        languages: impl IntoIterator<Item = DirectoryLanguage>,
    ) -> Self {
        self.user.languages = languages.into_iter().collect();
        self
    }

    /// Append a group membership.
    pub fn group(mut self, group: DirectoryGroup) -> Self {
        self.user.groups.push(group);
        self
    }

    /// Replace group memberships.
    pub fn groups(
        mut self,
        groups: impl IntoIterator<Item = DirectoryGroup>,
    ) -> Self {
        self.user.groups = groups.into_iter().collect();
        self
    }

    /// Append a granted authority.
    pub fn authority(
        mut self,
        authority: impl Into<DirectoryAuthority>,
    ) -> Self {
        self.user.authorities.push(authority.into());
        self
    }

    /// Replace granted authorities with the resolver output.
    pub fn authorities<I, A>(mut self, authorities: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<DirectoryAuthority>,
    {
        self.user.authorities =
            authorities.into_iter().map(Into::into).collect();
        self
    }

    /// Link the user to bot operation.
    pub fn operator_info(mut self, info: OperatorInfo) -> Self {
        self.user.operator_info = Some(info);
        self
    }

    /// Remove bot operation linkage.
    pub fn without_operator_info(mut self) -> Self {
        self.user.operator_info = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::Authority;

    #[test]
    fn test_builder_normalizes_empty_strings() {
        let user = DirectoryUser::builder()
            .id("1")
            .primary_email("")
            .suspension_reason("")
            .org_unit_path("/")
            .build();

        assert_eq!(user.id(), "1");
        assert_eq!(user.primary_email(), None);
        assert_eq!(user.suspension_reason(), None);
        assert_eq!(user.org_unit_path(), Some("/"));
    }

    #[test]
    fn test_functional_update() {
        let user = crate::user::tests::operator();
        let suspended = user
            .clone()
            .into_builder()
            .suspend("policy violation")
            .build();

        assert!(!user.is_suspended());
        assert!(suspended.is_suspended());
        assert_eq!(suspended.suspension_reason(), Some("policy violation"));
        assert_eq!(suspended.id(), user.id());
        assert_eq!(suspended.groups(), user.groups());

        let reinstated = suspended.into_builder().reinstate().build();
        assert_eq!(reinstated, user);
    }

    #[test]
    fn test_authorities_from_raw_codes() {
        let user = DirectoryUser::builder()
            .id("1")
            .authorities([
                DirectoryAuthority::from_code("ROOT"),
                DirectoryAuthority::from_code("FOOBAR"),
            ])
            .build();

        assert!(user.has_authority(Authority::Root));
        assert_eq!(user.known_authorities().count(), 1);
        assert_eq!(user.authorities()[1].code().as_str(), "FOOBAR");
    }
}
