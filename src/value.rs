//! Dynamic value representation for decoded Marshal data.
//!
//! This module provides the [`Value`] enum, the single output type of the
//! decoder. Every decoded value is an independently owned tree: the decoder
//! produces no shared references and no cycles.
//!
//! ## Core Types
//!
//! - [`Value`]: nil, booleans, integers (fixed and arbitrary precision), floats,
//!   text, raw bytes, arrays, hashes and compiled regexps
//! - [`MarshalMap`]: the insertion-ordered map used for hashes
//! - [`Pattern`]: a regexp translated for the `regex` crate
//!
//! ## Usage Patterns
//!
//! ### Inspecting Decoded Data
//!
//! ```rust
//! use serde_marshal::{load_slice, Value};
//!
//! // Marshal.dump([1, "a"])
//! let bytes = b"\x04\x08[\x07i\x06I\"\x06a\x06:\x06ET";
//! let value = load_slice(bytes).unwrap();
//!
//! let items = value.as_array().unwrap();
//! assert_eq!(items[0].as_i64(), Some(1));
//! assert_eq!(items[1].as_str(), Some("a"));
//! ```
//!
//! ### Extracting Values
//!
//! ```rust
//! use serde_marshal::Value;
//! use std::convert::TryFrom;
//!
//! let value = Value::from(42);
//! let num: i64 = i64::try_from(value).unwrap();
//! assert_eq!(num, 42);
//! ```
//!
//! ### Converting to Other Formats
//!
//! `Value` implements [`serde::Serialize`], so a decoded tree can be handed to
//! any Serde serializer:
//!
//! ```rust
//! use serde_marshal::marshal;
//!
//! let value = marshal!({ "id": 7, "tags": ["a", "b"] });
//! let json = serde_json::to_string(&value).unwrap();
//! assert_eq!(json, r#"{"id":7,"tags":["a","b"]}"#);
//! ```

use crate::{MarshalMap, Pattern};
use num_bigint::BigInt;
use serde::{Serialize, Serializer};
use std::fmt;

/// A dynamically-typed representation of a decoded Marshal value.
///
/// # Examples
///
/// ```rust
/// use serde_marshal::Value;
///
/// let nil = Value::Nil;
/// let num = Value::Integer(42);
/// let text = Value::String("hello".to_string());
///
/// assert!(nil.is_nil());
/// assert!(num.is_integer());
/// assert!(text.is_string());
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Integer(i64),
    /// An integer outside the `i64` range.
    BigInt(BigInt),
    Float(f64),
    String(String),
    /// A string whose bytes are not valid UTF-8, kept verbatim.
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Hash(MarshalMap),
    Regex(Pattern),
}

impl Value {
    /// Returns `true` if the value is nil.
    #[inline]
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Returns `true` for integers that fit `i64`.
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_bigint(&self) -> bool {
        matches!(self, Value::BigInt(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_bytes(&self) -> bool {
        matches!(self, Value::Bytes(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_hash(&self) -> bool {
        matches!(self, Value::Hash(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_regex(&self) -> bool {
        matches!(self, Value::Regex(_))
    }

    /// If the value is a boolean, returns it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is an `i64` integer, returns it. Otherwise returns `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_marshal::Value;
    ///
    /// assert_eq!(Value::Integer(42).as_i64(), Some(42));
    /// assert_eq!(Value::Float(42.0).as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// If the value is numeric, returns it as `f64`. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            Value::BigInt(bi) => Some(bi),
            _ => None,
        }
    }

    /// If the value is text, returns a reference to it. Otherwise returns `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_marshal::Value;
    ///
    /// assert_eq!(Value::from("hello").as_str(), Some("hello"));
    /// assert_eq!(Value::Bytes(vec![0xff]).as_str(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the raw bytes of a string value, valid UTF-8 or not.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::String(s) => Some(s.as_bytes()),
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_hash(&self) -> Option<&MarshalMap> {
        match self {
            Value::Hash(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_regex(&self) -> Option<&Pattern> {
        match self {
            Value::Regex(p) => Some(p),
            _ => None,
        }
    }

    /// Normalizes a decoded hash key to text.
    ///
    /// Text passes through (invalid UTF-8 is replaced lossily), integers become
    /// their decimal form, and every other value becomes the empty string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_marshal::Value;
    ///
    /// assert_eq!(Value::from("name").into_key(), "name");
    /// assert_eq!(Value::Integer(-3).into_key(), "-3");
    /// assert_eq!(Value::Bool(true).into_key(), "");
    /// ```
    #[must_use]
    pub fn into_key(self) -> String {
        match self {
            Value::String(s) => s,
            Value::Bytes(b) => String::from_utf8_lossy(&b).into_owned(),
            Value::Integer(i) => i.to_string(),
            Value::BigInt(bi) => bi.to_string(),
            _ => String::new(),
        }
    }
}

fn fmt_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        write!(f, "NaN")
    } else if value.is_infinite() {
        write!(f, "{}Infinity", if value < 0.0 { "-" } else { "" })
    } else {
        write!(f, "{:?}", value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::BigInt(bi) => write!(f, "{}", bi),
            Value::Float(fl) => fmt_float(f, *fl),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Bytes(b) => write!(f, "{:?}", String::from_utf8_lossy(b)),
            Value::Array(arr) => {
                write!(f, "[")?;
                for (i, item) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Hash(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?} => {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Regex(p) => write!(f, "{}", p),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Nil => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::BigInt(bi) => serializer.serialize_str(&bi.to_string()),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Bytes(b) => serializer.serialize_bytes(b),
            Value::Array(arr) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for element in arr {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Value::Hash(obj) => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(obj.len()))?;
                for (k, v) in obj.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Regex(p) => serializer.serialize_str(p.as_str()),
        }
    }
}

// TryFrom implementations for extracting values from Value
impl TryFrom<Value> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Integer(i) => Ok(i),
            _ => Err(crate::Error::custom(format!(
                "expected integer, found {:?}",
                value
            ))),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value.as_f64().ok_or_else(|| {
            crate::Error::custom(format!("expected number, found {:?}", value))
        })
    }
}

impl TryFrom<Value> for bool {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            _ => Err(crate::Error::custom(format!(
                "expected bool, found {:?}",
                value
            ))),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            _ => Err(crate::Error::custom(format!(
                "expected string, found {:?}",
                value
            ))),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        match i64::try_from(&value) {
            Ok(small) => Value::Integer(small),
            Err(_) => Value::BigInt(value),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<u8>> for Value {
    /// Text if the bytes are valid UTF-8, raw bytes otherwise.
    fn from(value: Vec<u8>) -> Self {
        match String::from_utf8(value) {
            Ok(s) => Value::String(s),
            Err(e) => Value::Bytes(e.into_bytes()),
        }
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<MarshalMap> for Value {
    fn from(value: MarshalMap) -> Self {
        Value::Hash(value)
    }
}

impl From<Pattern> for Value {
    fn from(value: Pattern) -> Self {
        Value::Regex(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RegexOptions;

    #[test]
    fn test_tryfrom_i64() {
        let result: i64 = TryFrom::try_from(Value::Integer(42)).unwrap();
        assert_eq!(result, 42);
        assert!(i64::try_from(Value::String("test".to_string())).is_err());
        assert!(i64::try_from(Value::Float(1.0)).is_err());
    }

    #[test]
    fn test_tryfrom_f64() {
        let result: f64 = TryFrom::try_from(Value::Float(3.5)).unwrap();
        assert_eq!(result, 3.5);
        let result: f64 = TryFrom::try_from(Value::Integer(42)).unwrap();
        assert_eq!(result, 42.0);
        assert!(f64::try_from(Value::Nil).is_err());
    }

    #[test]
    fn test_tryfrom_bool_and_string() {
        assert!(bool::try_from(Value::Bool(true)).unwrap());
        assert!(bool::try_from(Value::Integer(1)).is_err());
        assert_eq!(String::try_from(Value::from("hi")).unwrap(), "hi");
        assert!(String::try_from(Value::Bytes(vec![0xff])).is_err());
    }

    #[test]
    fn test_from_bytes_splits_on_utf8() {
        assert_eq!(Value::from(b"abc".to_vec()), Value::from("abc"));
        assert_eq!(
            Value::from(vec![0xe9u8, 0x74]),
            Value::Bytes(vec![0xe9, 0x74])
        );
    }

    #[test]
    fn test_from_bigint_narrows() {
        assert_eq!(Value::from(BigInt::from(5)), Value::Integer(5));
        let big = BigInt::from(i64::MAX) * 4;
        assert!(Value::from(big).is_bigint());
    }

    #[test]
    fn test_into_key() {
        assert_eq!(Value::from("k").into_key(), "k");
        assert_eq!(Value::Integer(1).into_key(), "1");
        assert_eq!(
            Value::BigInt(BigInt::from(u64::MAX) * 2).into_key(),
            "36893488147419103230"
        );
        assert_eq!(Value::Bytes(vec![b'a', 0xff]).into_key(), "a\u{fffd}");
        assert_eq!(Value::Nil.into_key(), "");
        assert_eq!(Value::Float(1.5).into_key(), "");
        assert_eq!(Value::Array(vec![]).into_key(), "");
    }

    #[test]
    fn test_display() {
        let mut map = MarshalMap::new();
        map.insert("a".to_string(), Value::Float(1.0));
        let value = Value::Array(vec![
            Value::Nil,
            Value::Integer(-2),
            Value::from("x"),
            Value::Hash(map),
            Value::Float(f64::NEG_INFINITY),
        ]);
        assert_eq!(
            value.to_string(),
            r#"[nil, -2, "x", {"a" => 1.0}, -Infinity]"#
        );

        let pattern = Pattern::translate("a", RegexOptions::IGNORECASE).unwrap();
        assert_eq!(Value::Regex(pattern).to_string(), "/a/i");
    }

    #[test]
    fn test_serialize_json() {
        let value = Value::Array(vec![
            Value::Nil,
            Value::Bool(false),
            Value::BigInt(BigInt::from(u64::MAX) * 2),
        ]);
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"[null,false,"36893488147419103230"]"#
        );
    }
}
