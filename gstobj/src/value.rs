// SPDX-FileCopyrightText: 2025 2025 Contributors to the gstobj project.
// SPDX-License-Identifier: Apache-2.0

//! Owned copies of native typed values.

use std::{fmt, time::Duration};

/// A property value copied out of the native object system.
///
/// Values never alias native memory: strings are copied and the native
/// container is released before a [`Value`] is handed to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `gboolean`.
    Bool(bool),
    /// Any signed integer fundamental (`gint`, `glong`, `gint64`).
    Int(i64),
    /// Any unsigned integer fundamental (`guint`, `gulong`, `guint64`).
    UInt(u64),
    /// `gfloat` or `gdouble`.
    Float(f64),
    /// `gchararray`. A null string is copied as empty.
    String(String),
    /// Any other type, kept as its type name and serialized contents.
    Other {
        /// Native type name, e.g. `GstCaps`.
        type_name: String,
        /// Human readable contents as produced by the native library.
        contents: String,
    },
}

impl Value {
    /// Returns the native type name this value corresponds to.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Bool(_) => "gboolean",
            Value::Int(_) => "gint64",
            Value::UInt(_) => "guint64",
            Value::Float(_) => "gdouble",
            Value::String(_) => "gchararray",
            Value::Other { type_name, .. } => type_name,
        }
    }

    /// The boolean, if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The integer as `i64`, if it is one and fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            Value::UInt(value) => i64::try_from(*value).ok(),
            _ => None,
        }
    }

    /// The integer as `u64`, if it is one and is not negative.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(value) => Some(*value),
            Value::Int(value) => u64::try_from(*value).ok(),
            _ => None,
        }
    }

    /// The floating point value, if this is a [`Value::Float`].
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// The string, if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    /// Parses `text` into a value of the same kind as `self`.
    ///
    /// Returns `None` when the text does not convert, or when `self` is an
    /// [`Value::Other`] whose type has no string form on this side.
    pub(crate) fn parse_as(&self, text: &str) -> Option<Value> {
        let text_trimmed = text.trim();
        match self {
            Value::Bool(_) => parse_bool(text_trimmed).map(Value::Bool),
            Value::Int(_) => text_trimmed.parse().ok().map(Value::Int),
            Value::UInt(_) => text_trimmed.parse().ok().map(Value::UInt),
            Value::Float(_) => text_trimmed.parse().ok().map(Value::Float),
            Value::String(_) => Some(Value::String(text.to_string())),
            Value::Other { .. } => None,
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::UInt(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::String(value) => f.write_str(value),
            Value::Other { contents, .. } => f.write_str(contents),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::UInt(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::UInt(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

/// Converts a duration to native clock time in nanoseconds.
///
/// The all-ones value means "no time" to the native library, so out-of-range
/// durations clamp to the largest valid clock time instead.
pub(crate) fn clock_time(timestamp: Duration) -> u64 {
    u64::try_from(timestamp.as_nanos())
        .unwrap_or(u64::MAX)
        .min(gstobj_sys::GST_CLOCK_TIME_NONE - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_follows_existing_kind() {
        assert_eq!(Value::Bool(false).parse_as("Yes"), Some(Value::Bool(true)));
        assert_eq!(Value::Int(0).parse_as(" -12 "), Some(Value::Int(-12)));
        assert_eq!(Value::UInt(0).parse_as("-12"), None);
        assert_eq!(Value::Float(0.0).parse_as("0.5"), Some(Value::Float(0.5)));
        assert_eq!(
            Value::String(String::new()).parse_as(" padded "),
            Some(Value::String(" padded ".to_string()))
        );
        assert_eq!(Value::Int(0).parse_as("five"), None);
    }

    #[test]
    fn other_values_do_not_parse() {
        let caps = Value::Other {
            type_name: "GstCaps".to_string(),
            contents: "video/x-raw".to_string(),
        };
        assert_eq!(caps.parse_as("audio/x-raw"), None);
        assert_eq!(caps.type_name(), "GstCaps");
        assert_eq!(caps.to_string(), "video/x-raw");
    }

    #[test]
    fn clock_time_never_reaches_none() {
        assert_eq!(clock_time(Duration::ZERO), 0);
        assert_eq!(clock_time(Duration::from_millis(5)), 5_000_000);
        assert_eq!(clock_time(Duration::MAX), u64::MAX - 1);
    }

    #[test]
    fn integer_accessors_cross_sign() {
        assert_eq!(Value::UInt(7).as_i64(), Some(7));
        assert_eq!(Value::Int(-1).as_u64(), None);
        assert_eq!(Value::from("x").as_str(), Some("x"));
    }
}
