//! Loosely-typed scalar fields from the exported chat schema.
//!
//! The exporter writes several "optional string" fields as the literal
//! `false` when they have no value (avatar URLs, inline-roll signatures).
//! [`MaybeText`] captures every encoding seen at decode time so that the
//! rest of the crate only ever sees a plain `&str`.

use serde::{Deserialize, Deserializer};

// ===== MaybeText =====

/// A field that is a string when present and something else when absent.
///
/// Decoding never fails: a string lands in [`MaybeText::Text`], the boolean
/// sentinel in [`MaybeText::Flag`], and anything else the exporter might emit
/// (numbers, objects) in [`MaybeText::Unexpected`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MaybeText {
    /// A real string value.
    Text(String),
    /// The `false` sentinel meaning "no value".
    Flag(bool),
    /// Any other JSON encoding.
    Unexpected(serde_json::Value),
}

impl MaybeText {
    /// The sentinel written by the exporter for "absent".
    pub const ABSENT: MaybeText = MaybeText::Flag(false);

    /// The string value, or `""` for every non-string encoding.
    pub fn as_str(&self) -> &str {
        match self {
            MaybeText::Text(s) => s,
            MaybeText::Flag(_) | MaybeText::Unexpected(_) => "",
        }
    }
}

/// Normalize an optional polymorphic field to a string slice.
///
/// Missing fields and `null` decode to `None`; both read as `""`.
pub fn text_or_empty(value: Option<&MaybeText>) -> &str {
    value.map(MaybeText::as_str).unwrap_or("")
}

/// Deserialize `null` as the type's default value.
///
/// The exporter emits `null` for some string and list fields that are
/// normally present; these read the same as a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
