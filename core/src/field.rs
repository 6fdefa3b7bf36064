//! Tri-state values for partially submitted records.
//!
//! Grid inline edits only send the columns that changed, and blank cells arrive
//! as `""` rather than `null`. [`Field`] keeps those cases apart so an update can
//! skip untouched columns, clear blanked ones, and write the rest.
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use w2kit_core::Field;
//!
//! #[derive(Deserialize, Serialize)]
//! struct Change {
//!     id: i64,
//!     #[serde(default, skip_serializing_if = "Field::is_missing")]
//!     quantity: Field<i32>,
//! }
//!
//! let change: Change = serde_json::from_str(r#"{"id": 1, "quantity": ""}"#)?;
//! assert!(change.quantity.is_null());
//!
//! let untouched: Change = serde_json::from_str(r#"{"id": 2}"#)?;
//! assert_eq!(serde_json::to_string(&untouched)?, r#"{"id":2}"#);
//! # Ok::<(), serde_json::Error>(())
//! ```

use serde::de::{self, Deserialize, DeserializeOwned, Deserializer};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A record member that may be absent, explicitly blank, or set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Field<T> {
    /// Not present in the payload.
    #[default]
    Missing,
    /// Present as `null` or `""`.
    Null,
    /// Present with a value.
    Value(T),
}

impl<T> Field<T> {
    /// A provided member: `None` becomes [`Field::Null`].
    #[must_use]
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Value)
    }

    /// Whether the member was absent. Use with `skip_serializing_if`.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Whether the member was present at all.
    #[must_use]
    pub const fn is_provided(&self) -> bool {
        !self.is_missing()
    }

    /// Whether the member was present but blank.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the value, if set.
    #[must_use]
    pub const fn as_ref(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Missing | Self::Null => None,
        }
    }

    /// The value, if set. Missing and null both become `None`.
    #[must_use]
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Missing | Self::Null => None,
        }
    }

    /// Transform the value, keeping missing and null as they are.
    #[must_use]
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Field<U> {
        match self {
            Self::Value(value) => Field::Value(f(value)),
            Self::Null => Field::Null,
            Self::Missing => Field::Missing,
        }
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(value) => value.serialize(serializer),
            Self::Missing | Self::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Only reached when the member is present; absence comes from `#[serde(default)]`.
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Self::Null),
            Value::String(text) if text.is_empty() => Ok(Self::Null),
            value => T::deserialize(value).map(Self::Value).map_err(de::Error::custom),
        }
    }
}
