//! Marshal decoding.
//!
//! This module provides the [`Decoder`], which reads the version header and
//! then one tagged value, recursing into containers as it goes. All state of a
//! load (read position, symbol table, nesting depth) lives in the decoder, so
//! independent decoders never interfere.
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde_marshal::{load_slice, Value};
//!
//! let value = load_slice(b"\x04\x08[\x08i\x06i\x07i\x08").unwrap();
//! assert_eq!(
//!     value,
//!     Value::Array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
//! );
//! ```
//!
//! A [`Decoder`] can also be kept around to read several dumps that were
//! written back to back:
//!
//! ```rust
//! use serde_marshal::{Decoder, Value};
//!
//! let bytes: &[u8] = b"\x04\x08T\x04\x08i\x7f";
//! let mut decoder = Decoder::new(bytes);
//! assert_eq!(decoder.load().unwrap(), Value::Bool(true));
//! assert_eq!(decoder.load().unwrap(), Value::Integer(122));
//! ```

use crate::bignum::read_bignum;
use crate::cursor::ByteCursor;
use crate::fixnum::{read_fixnum, read_length};
use crate::format::{self, *};
use crate::options::UnknownTagPolicy;
use crate::regexp::{Pattern, RegexOptions};
use crate::symbols::SymbolTable;
use crate::{DecodeOptions, Error, MarshalMap, Result, Value};
use std::io::Read;

/// Upper bound for the eager allocation made from an untrusted element count.
const PREALLOC_ELEMENTS: usize = 1024;

/// The Marshal decoder.
///
/// Created via [`Decoder::new`] or [`Decoder::with_options`]; each call to
/// [`load`](Self::load) reads one version header and one value with a fresh
/// symbol table.
pub struct Decoder<R> {
    cursor: ByteCursor<R>,
    symbols: SymbolTable,
    options: DecodeOptions,
    depth: usize,
}

impl<R: Read> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, DecodeOptions::default())
    }

    pub fn with_options(reader: R, options: DecodeOptions) -> Self {
        Decoder {
            cursor: ByteCursor::new(reader),
            symbols: SymbolTable::new(),
            options,
            depth: 0,
        }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Returns the underlying reader.
    ///
    /// A decoder may have looked up to two bytes past the last value it
    /// returned; those bytes are not given back.
    pub fn into_inner(self) -> R {
        self.cursor.into_inner()
    }

    /// Reads the version header and exactly one value.
    ///
    /// Bytes after the value are left unread.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed or truncated field; see [`Error`].
    pub fn load(&mut self) -> Result<Value> {
        self.symbols = SymbolTable::new();
        self.depth = 0;

        let start = self.cursor.position();
        tracing::debug!(offset = start, "loading marshal value");

        self.validate_version()?;
        let value = self.read_value()?;

        tracing::debug!(
            bytes = self.cursor.position() - start,
            symbols = self.symbols.len(),
            "loaded marshal value"
        );
        Ok(value)
    }

    fn validate_version(&mut self) -> Result<()> {
        let offset = self.cursor.position();
        let version = self.cursor.read_array::<2>("marshal version")?;
        if version != MARSHAL_VERSION {
            return Err(Error::format(
                offset,
                format!(
                    "unsupported marshal version {}.{}, wanted {}.{}",
                    version[0], version[1], MARSHAL_VERSION[0], MARSHAL_VERSION[1]
                ),
            ));
        }
        Ok(())
    }

    /// Reads one tag byte and decodes the value it introduces.
    fn read_value(&mut self) -> Result<Value> {
        let offset = self.cursor.position();
        let tag = self.cursor.read_u8("type tag")?;
        tracing::trace!(offset, tag = %char::from(tag), kind = format::tag_name(tag), "dispatch");

        match tag {
            TYPE_NIL => Ok(Value::Nil),
            TYPE_TRUE => Ok(Value::Bool(true)),
            TYPE_FALSE => Ok(Value::Bool(false)),
            TYPE_FIXNUM => read_fixnum(&mut self.cursor).map(Value::Integer),
            TYPE_BIGNUM => read_bignum(&mut self.cursor, self.options.bignum),
            TYPE_FLOAT => self.read_float(),
            TYPE_STRING => self.read_bytes_field("string").map(Value::from),
            TYPE_ARRAY => self.nested(Self::read_array),
            TYPE_HASH => self.nested(|de| de.read_hash(false)),
            TYPE_HASH_DEF => self.nested(|de| de.read_hash(true)),
            TYPE_SYMBOL => self.read_symbol().map(Value::String),
            TYPE_SYMLINK => self.read_symlink().map(Value::String),
            TYPE_REGEXP => self.read_regexp(),
            TYPE_IVAR => self.nested(Self::read_ivar),
            other => self.unknown_tag(other, offset),
        }
    }

    fn unknown_tag(&mut self, tag: u8, offset: u64) -> Result<Value> {
        match self.options.unknown_tags {
            UnknownTagPolicy::Reject => Err(Error::format(
                offset,
                format!(
                    "unsupported type tag {:#04x} ({:?}, {})",
                    tag,
                    char::from(tag),
                    format::tag_name(tag)
                ),
            )),
            UnknownTagPolicy::Skip => {
                tracing::warn!(offset, tag = %char::from(tag), "unsupported type tag, decoded as nil");
                Ok(Value::Nil)
            }
        }
    }

    /// Runs `f` one nesting level deeper, enforcing the depth limit.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.options.max_depth {
            return Err(Error::depth_limit(
                self.cursor.position(),
                self.options.max_depth,
            ));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Reads a fixnum length followed by that many raw bytes.
    fn read_bytes_field(&mut self, what: &str) -> Result<Vec<u8>> {
        let len = read_length(&mut self.cursor, what)?;
        self.cursor.read_bytes(len, what)
    }

    /// Reads a length-prefixed field that must be UTF-8 text.
    fn read_text(&mut self, what: &str) -> Result<String> {
        let offset = self.cursor.position();
        let bytes = self.read_bytes_field(what)?;
        String::from_utf8(bytes)
            .map_err(|e| Error::format(offset, format!("{what} is not valid UTF-8: {e}")))
    }

    /// `I` wrapper: a string with an encoding list, or any other value.
    fn read_ivar(&mut self) -> Result<Value> {
        if self.cursor.peek_u8("ivar value tag")? == TYPE_STRING {
            self.cursor.read_u8("ivar value tag")?;
            let bytes = self.read_bytes_field("string")?;
            self.strip_encoding()?;
            return Ok(Value::from(bytes));
        }

        let value = self.read_value()?;
        self.strip_trailing_encoding(true)?;
        Ok(value)
    }

    /// Strips an encoding list if the next two bytes start one.
    ///
    /// Inside an `I` wrapper a list is expected, so a lone `0x06` at the end
    /// of input is a cut-off list. Elsewhere it is left unread.
    fn strip_trailing_encoding(&mut self, in_ivar: bool) -> Result<bool> {
        let offset = self.cursor.position();
        let marker = self.cursor.peek(2)?;
        if in_ivar && marker == &ENCODING_SYMBOL[..1] {
            return Err(Error::unexpected_eof(offset + 1, "encoding signature"));
        }
        let present = marker == &ENCODING_SYMBOL[..] || marker == &ENCODING_SYMLINK[..];
        if present {
            self.strip_encoding()?;
        }
        Ok(present)
    }

    /// Consumes a one-entry encoding list and discards it.
    ///
    /// Symbol keys are interned like any other symbol so later links keep
    /// their indices.
    fn strip_encoding(&mut self) -> Result<()> {
        let offset = self.cursor.position();
        let signature = self.cursor.read_array::<2>("encoding signature")?;
        let name = match signature {
            ENCODING_SYMBOL => self.read_symbol()?,
            ENCODING_SYMLINK => self.read_symlink()?,
            other => {
                return Err(Error::format(
                    offset,
                    format!("unsupported string encoding signature {:02x?}", other),
                ))
            }
        };

        match name.as_str() {
            IVAR_SHORT_ENCODING => {
                let flag_offset = self.cursor.position();
                match self.cursor.read_u8("encoding flag")? {
                    TYPE_TRUE => tracing::debug!(encoding = "UTF-8", "discarded encoding"),
                    TYPE_FALSE => tracing::debug!(encoding = "US-ASCII", "discarded encoding"),
                    other => {
                        return Err(Error::format(
                            flag_offset,
                            format!("encoding flag must be true or false, found {:#04x}", other),
                        ))
                    }
                }
            }
            IVAR_ENCODING => {
                let value_offset = self.cursor.position();
                match self.nested(Self::read_value)? {
                    encoding @ (Value::String(_) | Value::Bytes(_)) => {
                        tracing::debug!(encoding = %encoding, "discarded encoding");
                    }
                    other => {
                        return Err(Error::format(
                            value_offset,
                            format!("encoding name must be a string, found {}", other),
                        ))
                    }
                }
            }
            other => {
                return Err(Error::format(
                    offset,
                    format!("unsupported string encoding ivar {:?}", other),
                ))
            }
        }
        Ok(())
    }

    /// `:` payload: a new symbol, appended to the symbol table.
    fn read_symbol(&mut self) -> Result<String> {
        let symbol = self.read_text("symbol")?;
        self.symbols.intern(symbol.clone());
        Ok(symbol)
    }

    /// `;` payload: an index into the symbol table.
    fn read_symlink(&mut self) -> Result<String> {
        let offset = self.cursor.position();
        let index = read_fixnum(&mut self.cursor)?;
        self.symbols.resolve(index, offset).map(str::to_string)
    }

    fn read_array(&mut self) -> Result<Value> {
        let len = read_length(&mut self.cursor, "array length")?;
        let mut items = Vec::with_capacity(len.min(PREALLOC_ELEMENTS));
        for _ in 0..len {
            items.push(self.read_value()?);
        }
        Ok(Value::Array(items))
    }

    fn read_hash(&mut self, has_default: bool) -> Result<Value> {
        let len = read_length(&mut self.cursor, "hash size")?;
        let mut map = MarshalMap::with_capacity(len.min(PREALLOC_ELEMENTS));
        for _ in 0..len {
            let key = self.read_value()?;
            let value = self.read_value()?;
            map.insert_decoded(key, value);
        }

        if has_default {
            let default = self.read_value()?;
            tracing::debug!(default = %default, "discarded hash default value");
        }
        Ok(Value::Hash(map))
    }

    fn read_float(&mut self) -> Result<Value> {
        let offset = self.cursor.position();
        let mut bytes = self.read_bytes_field("float")?;
        // Old dumps append raw mantissa bytes after a NUL.
        if let Some(nul) = bytes.iter().position(|b| *b == 0) {
            bytes.truncate(nul);
        }

        let text = String::from_utf8(bytes)
            .map_err(|_| Error::format(offset, "float text is not valid UTF-8"))?;
        let value = match text.as_str() {
            "inf" => f64::INFINITY,
            "-inf" => f64::NEG_INFINITY,
            "nan" => f64::NAN,
            other => other
                .parse::<f64>()
                .map_err(|e| Error::format(offset, format!("invalid float {:?}: {}", other, e)))?,
        };
        Ok(Value::Float(value))
    }

    fn read_regexp(&mut self) -> Result<Value> {
        let offset = self.cursor.position();
        let source = self.read_text("regexp source")?;
        let options = RegexOptions::from_byte(self.cursor.read_u8("regexp options")?);
        self.strip_trailing_encoding(false)?;

        Pattern::translate(&source, options)
            .map(Value::Regex)
            .map_err(|e| Error::format(offset, format!("regexp /{}/ does not compile: {}", source, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BignumMode;

    fn load(payload: &[u8]) -> Result<Value> {
        let mut bytes = MARSHAL_VERSION.to_vec();
        bytes.extend_from_slice(payload);
        Decoder::new(&bytes[..]).load()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(load(b"0").unwrap(), Value::Nil);
        assert_eq!(load(b"T").unwrap(), Value::Bool(true));
        assert_eq!(load(b"F").unwrap(), Value::Bool(false));
        assert_eq!(load(b"i\x00").unwrap(), Value::Integer(0));
        assert_eq!(load(b"i\xfa").unwrap(), Value::Integer(-1));
    }

    #[test]
    fn test_bad_version() {
        let err = Decoder::new(&b"\x04\x07\x30"[..]).load().unwrap_err();
        assert!(err.is_format());
        assert_eq!(err.offset(), Some(0));
    }

    #[test]
    fn test_short_version() {
        assert!(Decoder::new(&b"\x04"[..]).load().unwrap_err().is_eof());
    }

    #[test]
    fn test_binary_string() {
        assert_eq!(load(b"\"\x08abc").unwrap(), Value::from("abc"));
        assert_eq!(load(b"\"\x00").unwrap(), Value::from(""));
        assert_eq!(
            load(b"\"\x07\xff\xfe").unwrap(),
            Value::Bytes(vec![0xff, 0xfe])
        );
    }

    #[test]
    fn test_string_of_length_29_is_not_misread() {
        // 0x22 is both the string tag and the length byte for 29
        let mut payload = b"\"\x22".to_vec();
        payload.extend(std::iter::repeat(b'x').take(29));
        assert_eq!(load(&payload).unwrap(), Value::from("x".repeat(29)));
    }

    #[test]
    fn test_encoded_strings() {
        assert_eq!(load(b"I\"\x06a\x06:\x06ET").unwrap(), Value::from("a"));
        assert_eq!(load(b"I\"\x06a\x06:\x06EF").unwrap(), Value::from("a"));
        assert_eq!(
            load(b"I\"\x06a\x06:\x0dencoding\"\x0eShift_JIS").unwrap(),
            Value::from("a")
        );
    }

    #[test]
    fn test_unsupported_encoding_signature() {
        let err = load(b"I\"\x06a\x07:\x06ET").unwrap_err();
        assert!(err.is_format());
        assert!(err.to_string().contains("unsupported string encoding signature"));
    }

    #[test]
    fn test_encoding_name_must_be_a_string() {
        let err = load(b"I\"\x06a\x06:\x0dencoding[\x00").unwrap_err();
        assert!(err.is_format());
        assert_eq!(err.offset(), Some(17));
        assert!(err.to_string().contains("encoding name must be a string"));

        let err = load(b"I\"\x06a\x06:\x0dencodingi\x06").unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_bad_encoding_flag() {
        assert!(load(b"I\"\x06a\x06:\x06Ei\x06").unwrap_err().is_format());
    }

    #[test]
    fn test_encoding_symbol_is_interned() {
        // ["a", "b"]: the second string links back to :E at index 0
        let value = load(b"[\x07I\"\x06a\x06:\x06ETI\"\x06b\x06;\x00T").unwrap();
        assert_eq!(value, Value::Array(vec![Value::from("a"), Value::from("b")]));

        // a symbol link to :E as a value
        let value = load(b"[\x07I\"\x06a\x06:\x06ET;\x00").unwrap();
        assert_eq!(value, Value::Array(vec![Value::from("a"), Value::from("E")]));
    }

    #[test]
    fn test_symbols_and_links() {
        let value = load(b"[\x08:\x08foo:\x08bar;\x00").unwrap();
        assert_eq!(
            value,
            Value::Array(vec![
                Value::from("foo"),
                Value::from("bar"),
                Value::from("foo")
            ])
        );
    }

    #[test]
    fn test_symlink_out_of_range() {
        let err = load(b"[\x07:\x08foo;\x06").unwrap_err();
        assert!(err.is_format());
        assert!(err.to_string().contains("out of range"));
        assert!(load(b";\x00").unwrap_err().is_format());
    }

    #[test]
    fn test_symbol_table_reset_between_loads() {
        let bytes: &[u8] = b"\x04\x08:\x08foo\x04\x08;\x00";
        let mut decoder = Decoder::new(bytes);
        assert_eq!(decoder.load().unwrap(), Value::from("foo"));
        assert!(decoder.load().unwrap_err().is_format());
    }

    #[test]
    fn test_hash_key_normalization() {
        let value = load(b"{\x08i\x06\"\x06a:\x06bT0F").unwrap();
        let map = value.as_hash().unwrap();
        assert_eq!(map.get("1"), Some(&Value::from("a")));
        assert_eq!(map.get("b"), Some(&Value::Bool(true)));
        assert_eq!(map.get(""), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_hash_last_write_wins() {
        let value = load(b"{\x07i\x06i\x06\"\x061i\x07").unwrap();
        let map = value.as_hash().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("1"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_hash_with_default() {
        let value = load(b"}\x06i\x06i\x07i\x08").unwrap();
        let map = value.as_hash().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("1"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_floats() {
        assert_eq!(load(b"f\x081.5").unwrap(), Value::Float(1.5));
        assert_eq!(load(b"f\x08inf").unwrap(), Value::Float(f64::INFINITY));
        assert_eq!(load(b"f\x09-inf").unwrap(), Value::Float(f64::NEG_INFINITY));
        assert!(load(b"f\x08nan").unwrap().as_f64().unwrap().is_nan());
        assert_eq!(load(b"f\x0b1.1\x00\x9a\x99").unwrap(), Value::Float(1.1));
        assert!(load(b"f\x08abc").unwrap_err().is_format());
    }

    #[test]
    fn test_regexp() {
        let value = load(b"I/\x08abc\x01\x06:\x06EF").unwrap();
        let pattern = value.as_regex().unwrap();
        assert_eq!(pattern.as_str(), "(?i)abc");
        assert!(pattern.regex().is_match("ABC"));

        let value = load(b"/\x06a\x04").unwrap();
        assert_eq!(value.as_regex().unwrap().as_str(), "(?s)a");
    }

    #[test]
    fn test_bare_regexp_leaves_trailing_byte_unread() {
        let bytes: &[u8] = b"\x04\x08/\x06a\x00\x06";
        let mut decoder = Decoder::new(bytes);
        let value = decoder.load().unwrap();
        assert_eq!(value.as_regex().unwrap().source(), "a");
        assert_eq!(decoder.position(), 6);

        // the same byte inside an `I` wrapper is a cut-off encoding list
        let err = load(b"I/\x06a\x00\x06").unwrap_err();
        assert!(err.is_eof());
    }

    #[test]
    fn test_regexp_compile_failure() {
        let err = load(b"/\x06(\x00").unwrap_err();
        assert!(err.is_format());
        assert!(err.to_string().contains("does not compile"));
    }

    #[test]
    fn test_ivar_wrapped_symbol() {
        // :é with its UTF-8 encoding list
        let value = load(b"[\x07I:\x07\xc3\xa9\x06:\x06ET;\x00").unwrap();
        assert_eq!(value, Value::Array(vec![Value::from("é"), Value::from("é")]));
    }

    #[test]
    fn test_unknown_tag() {
        let err = load(b"o:\x08Foo\x00").unwrap_err();
        assert!(err.is_format());
        assert!(err.to_string().contains("object"));

        let options = DecodeOptions::new().with_unknown_tags(UnknownTagPolicy::Skip);
        let bytes = b"\x04\x08@\x00";
        let value = Decoder::with_options(&bytes[..], options).load().unwrap();
        assert_eq!(value, Value::Nil);
    }

    #[test]
    fn test_depth_limit() {
        let options = DecodeOptions::new().with_max_depth(2);
        let ok = b"\x04\x08[\x06[\x060";
        assert!(Decoder::with_options(&ok[..], options.clone()).load().is_ok());

        let deep = b"\x04\x08[\x06[\x06[\x060";
        let err = Decoder::with_options(&deep[..], options).load().unwrap_err();
        assert!(matches!(err, Error::DepthLimitExceeded { limit: 2, .. }));
    }

    #[test]
    fn test_nested_ivars_hit_depth_limit() {
        let mut bytes = MARSHAL_VERSION.to_vec();
        bytes.extend(std::iter::repeat(b'I').take(10_000));
        let err = Decoder::new(&bytes[..]).load().unwrap_err();
        assert!(matches!(err, Error::DepthLimitExceeded { .. }));
    }

    #[test]
    fn test_bignum_modes() {
        let payload = b"l+\x0a\x00\x00\x00\x00\x00\x00\x00\x00\x01\x00";
        assert!(load(payload).unwrap().is_bigint());

        let mut bytes = MARSHAL_VERSION.to_vec();
        bytes.extend_from_slice(payload);
        let options = DecodeOptions::new().with_bignum_mode(BignumMode::Truncate);
        let value = Decoder::with_options(&bytes[..], options).load().unwrap();
        assert_eq!(value, Value::Integer(0));
    }

    #[test]
    fn test_trailing_bytes_left_unread() {
        let bytes: &[u8] = b"\x04\x08i\x06rest";
        let mut decoder = Decoder::new(bytes);
        assert_eq!(decoder.load().unwrap(), Value::Integer(1));
        assert_eq!(decoder.position(), 4);
        assert_eq!(decoder.into_inner(), b"rest");
    }

    #[test]
    fn test_truncation_never_panics() {
        let full: &[u8] = b"\x04\x08{\x06I\"\x06k\x06:\x06ET[\x08I/\x06a\x01\x06;\x00Ti\x02\xe8\x03f\x081.5";
        assert!(Decoder::new(full).load().is_ok());
        for end in 0..full.len() {
            let err = Decoder::new(&full[..end]).load().unwrap_err();
            assert!(err.is_eof(), "prefix of {end} bytes: {err}");
        }
    }
}
