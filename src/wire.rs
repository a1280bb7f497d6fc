//! Wire representation helpers.
//!
//! In memory, absence is explicit (`Option`). On the wire, a field at its
//! zero value is omitted, and an omitted field reads back as its zero
//! value.

use std::num::NonZeroI64;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::Result;
use crate::user::DirectoryUser;

/// `skip_serializing_if` predicate for flags.
pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

/// `skip_serializing_if` predicate for counters.
pub(crate) fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// Drop empty strings, they mean "absent" on the wire.
pub(crate) fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Read an optional string, `""` and `null` both become `None`.
pub(crate) fn empty_as_none<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.and_then(non_empty))
}

/// Read a list that the producer may have sent as `null`.
pub(crate) fn null_as_empty<'de, D, T>(
    deserializer: D,
) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Telegram identifiers, where `0` means "no linkage".
pub(crate) mod telegram_id {
    use super::*;

    pub fn serialize<S>(
        value: &Option<NonZeroI64>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.map_or(0, NonZeroI64::get).serialize(serializer)
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> std::result::Result<Option<NonZeroI64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<i64>::deserialize(deserializer)?.and_then(NonZeroI64::new))
    }
}

/// Member counters travel as decimal strings to survive JSON number
/// precision limits.
pub(crate) mod string_count {
    use serde::de::Error as _;

    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCount {
        Text(String),
        Number(u64),
    }

    pub fn serialize<S>(
        value: &u64,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> std::result::Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<RawCount>::deserialize(deserializer)? {
            None => Ok(0),
            Some(RawCount::Number(count)) => Ok(count),
            Some(RawCount::Text(text)) if text.is_empty() => Ok(0),
            Some(RawCount::Text(text)) => text.parse().map_err(|_| {
                D::Error::custom(format_args!(
                    "expected a non-negative integer, found {text:?}"
                ))
            }),
        }
    }
}

/// Directory payload, keeping the shape it was received in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    One(Box<DirectoryUser>),
    Many(Vec<DirectoryUser>),
}

impl Payload {
    /// Decode a payload holding either one user object or an array of
    /// users.
    ///
    /// No validation happens here.
    pub fn parse(input: &str) -> Result<Self> {
        let payload = match serde_json::from_str::<Value>(input)? {
            Value::Array(items) => Payload::Many(
                items
                    .into_iter()
                    .map(serde_json::from_value)
                    .collect::<std::result::Result<Vec<_>, _>>()?,
            ),
            value => Payload::One(Box::new(serde_json::from_value(value)?)),
        };

        tracing::trace!(count = payload.len(), "directory payload decoded");
        Ok(payload)
    }

    pub fn len(&self) -> usize {
        match self {
            Payload::One(_) => 1,
            Payload::Many(users) => users.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_users(self) -> Vec<DirectoryUser> {
        match self {
            Payload::One(user) => vec![*user],
            Payload::Many(users) => users,
        }
    }
}

/// Decode every user of a payload, see [`Payload::parse`].
pub fn parse_users(input: &str) -> Result<Vec<DirectoryUser>> {
    Payload::parse(input).map(Payload::into_users)
}
