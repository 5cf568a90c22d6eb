//! # serde_marshal
//!
//! A reader for Ruby's Marshal binary format (version 4.8) that decodes into a
//! dynamic, Serde-compatible value model.
//!
//! ## What is Marshal?
//!
//! Marshal is Ruby's built-in object serialization format: a two-byte version
//! header followed by one tagged value. It is what `Marshal.dump` writes and
//! what caches, session stores and job queues often hold on disk or in Redis.
//!
//! ## Key Features
//!
//! - **Read-only**: bytes in, [`Value`] trees out
//! - **Core types**: nil, booleans, fixnums, bignums, floats, strings, symbols,
//!   arrays, hashes and regexps
//! - **Exact bignums**: arbitrary precision via `num-bigint`, with an opt-in
//!   64-bit wrap-around mode
//! - **Regexps**: translated to the `regex` crate's syntax and compiled
//! - **Serde Compatible**: decode straight into `#[derive(Deserialize)]` types
//! - **Hardened**: truncated input is an error, never a panic; nesting depth
//!   is bounded
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_marshal::{load_slice, Value};
//!
//! // Marshal.dump(nil)
//! assert_eq!(load_slice(b"\x04\x080").unwrap(), Value::Nil);
//!
//! // Marshal.dump({1 => "a"})
//! let value = load_slice(b"\x04\x08{\x06i\x06I\"\x06a\x06:\x06ET").unwrap();
//! assert_eq!(value.as_hash().unwrap().get("1"), Some(&Value::from("a")));
//! ```
//!
//! ### Typed Deserialization
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_marshal::from_slice;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Point { x: i32, y: i32 }
//!
//! // Marshal.dump({"x" => 1, "y" => 2})
//! let bytes = b"\x04\x08{\x07I\"\x06x\x06:\x06ETi\x06I\"\x06y\x06;\x00Ti\x07";
//! let point: Point = from_slice(bytes).unwrap();
//! assert_eq!(point, Point { x: 1, y: 2 });
//! ```
//!
//! ## Limitations
//!
//! Class instances, structs, user-defined dumps and object links are not
//! supported and are reported as format errors. Hash keys are narrowed to text
//! and string encodings are discarded; see the [`format`] module.

pub mod bignum;
pub mod cursor;
pub mod de;
pub mod decoder;
pub mod error;
pub mod fixnum;
pub mod format;
pub mod macros;
pub mod map;
pub mod options;
pub mod regexp;
pub mod symbols;
pub mod value;

pub use de::ValueDeserializer;
pub use decoder::Decoder;
pub use error::{Error, Result};
pub use format::MARSHAL_VERSION;
pub use map::MarshalMap;
pub use options::{BignumMode, DecodeOptions, UnknownTagPolicy};
pub use regexp::{Pattern, RegexOptions};
pub use value::Value;

use serde::de::{DeserializeOwned, IntoDeserializer};
use std::io;

/// Decode one Marshal value from a reader.
///
/// Reads the version header and exactly one value; anything after it is left
/// in the reader unread (up to two bytes of lookahead aside).
///
/// # Examples
///
/// ```rust
/// use serde_marshal::{load, Value};
/// use std::io::Cursor;
///
/// let value = load(Cursor::new(b"\x04\x08T")).unwrap();
/// assert_eq!(value, Value::Bool(true));
/// ```
///
/// # Errors
///
/// Returns an error if the header is wrong, the data is malformed or
/// truncated, or the reader fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn load<R>(reader: R) -> Result<Value>
where
    R: io::Read,
{
    load_with_options(reader, &DecodeOptions::default())
}

/// Decode one Marshal value from a reader with custom options.
///
/// # Errors
///
/// Returns an error if the header is wrong, the data is malformed or
/// truncated, or the reader fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn load_with_options<R>(reader: R, options: &DecodeOptions) -> Result<Value>
where
    R: io::Read,
{
    Decoder::with_options(reader, options.clone()).load()
}

/// Decode one Marshal value from a byte slice.
///
/// # Examples
///
/// ```rust
/// use serde_marshal::{load_slice, Value};
///
/// assert_eq!(load_slice(b"\x04\x08i\x7f").unwrap(), Value::Integer(122));
/// assert!(load_slice(b"\x04\x07i\x7f").unwrap_err().is_format());
/// ```
///
/// # Errors
///
/// Returns an error if the header is wrong or the data is malformed or
/// truncated.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn load_slice(bytes: &[u8]) -> Result<Value> {
    load(bytes)
}

/// Convert a decoded [`Value`] into any `T: Deserialize`.
///
/// # Examples
///
/// ```rust
/// use serde_marshal::{from_value, marshal};
///
/// let pair: (i64, String) = from_value(marshal!([7, "seven"])).unwrap();
/// assert_eq!(pair, (7, "seven".to_string()));
/// ```
///
/// # Errors
///
/// Returns an error if the value's shape does not match `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(value.into_deserializer())
}

/// Deserialize an instance of type `T` from Marshal bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid Marshal data or cannot be
/// deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(load_slice(bytes)?)
}

/// Deserialize an instance of type `T` from an I/O stream of Marshal data.
///
/// # Errors
///
/// Returns an error if reading fails, the data is not valid Marshal, or it
/// cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    from_value(load(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_load_nil() {
        assert_eq!(load_slice(&[0x04, 0x08, 0x30]).unwrap(), Value::Nil);
    }

    #[test]
    fn test_version_header_constant() {
        assert_eq!(MARSHAL_VERSION, [0x04, 0x08]);
        let mut bytes = MARSHAL_VERSION.to_vec();
        bytes.push(b'0');
        assert_eq!(load_slice(&bytes).unwrap(), Value::Nil);
    }

    #[test]
    fn test_load_booleans() {
        assert_eq!(load_slice(b"\x04\x08T").unwrap(), Value::Bool(true));
        assert_eq!(load_slice(b"\x04\x08F").unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_options_are_applied() {
        let options = DecodeOptions::new().with_unknown_tags(UnknownTagPolicy::Skip);
        assert_eq!(
            load_with_options(&b"\x04\x08S"[..], &options).unwrap(),
            Value::Nil
        );
        assert!(load_slice(b"\x04\x08S").unwrap_err().is_format());
    }

    #[test]
    fn test_from_slice_struct() {
        let bytes = b"\x04\x08{\x07:\x06xi\x06:\x06yi\x07";
        let point: Point = from_slice(bytes).unwrap();
        assert_eq!(point, Point { x: 1, y: 2 });
    }

    #[test]
    fn test_from_reader() {
        let numbers: Vec<i64> = from_reader(&b"\x04\x08[\x07i\x06i\xfa"[..]).unwrap();
        assert_eq!(numbers, vec![1, -1]);
    }

    #[test]
    fn test_from_slice_propagates_decode_errors() {
        let err = from_slice::<Point>(b"\x04\x08{\x07").unwrap_err();
        assert!(err.is_eof());
    }
}
