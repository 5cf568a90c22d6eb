//! Marshal Format Reference
//!
//! This module documents the subset of Ruby's Marshal binary format (version 4.8)
//! that this library decodes, and holds the wire constants the decoder matches on.
//!
//! # Overview
//!
//! A Marshal stream is a two-byte version header followed by exactly one value.
//! Every value starts with a single ASCII type tag; containers recursively hold
//! further tagged values. Symbols are interned on first sight and later referred
//! to by index, so a stream must be read strictly in order.
//!
//! # Header
//!
//! | Byte | Meaning |
//! |------|---------|
//! | `0x04` | major version |
//! | `0x08` | minor version |
//!
//! Any other pair is rejected before a payload byte is read.
//!
//! # Type Tags
//!
//! | Tag | Meaning | Payload |
//! |-----|---------|---------|
//! | `0` | nil | none |
//! | `T` / `F` | true / false | none |
//! | `i` | fixnum | fixnum |
//! | `l` | bignum | sign byte, word count (fixnum), `2 * words` magnitude bytes |
//! | `f` | float | length-prefixed decimal text, or `inf` / `-inf` / `nan` |
//! | `"` | string | fixnum length + raw bytes |
//! | `[` | array | fixnum count + N values |
//! | `{` | hash | fixnum pair count + 2N values |
//! | `}` | hash with default | as `{`, then one default value |
//! | `:` | symbol | length-prefixed text, appended to the symbol table |
//! | `;` | symbol link | fixnum index into the symbol table |
//! | `/` | regexp | length-prefixed source + option byte |
//! | `I` | instance variables | wrapped value + ivar list (string encodings only) |
//!
//! # Fixnums
//!
//! Integers and all lengths share one variable-length encoding. The first byte
//! `c` is read as a signed 8-bit value:
//!
//! | `c` | Value |
//! |-----|-------|
//! | `0` | 0 |
//! | `5..=127` | `c - 5` |
//! | `1..=4` | next `c` bytes, little-endian, unsigned |
//! | `-128..=-5` | `c + 5` |
//! | `-4..=-1` | next `-c` bytes, little-endian, sign-extended from all ones |
//!
//! ```text
//! 00          0
//! 06          1
//! 7f          122
//! 01 7b       123
//! fa          -1
//! ff 84       -124
//! 02 e8 03    1000
//! ```
//!
//! # Strings and Encodings
//!
//! A string with a character encoding is wrapped in `I` and followed by a
//! one-entry instance variable list naming that encoding:
//!
//! ```text
//! I " 06 61 06 3a 06 45 54      "a" (UTF-8: E => true)
//! I " 06 61 06 3b 00 46         "a" (US-ASCII: E => false, symbol link 0)
//! ```
//!
//! The list always starts with the count `06` (one entry). A `:` key is a new
//! symbol and is interned; a `;` key is a link to an earlier symbol. The
//! encoding is consumed and discarded; decoded text keeps its raw bytes.
//!
//! # Regular Expressions
//!
//! The option byte is a bit set:
//!
//! | Bit | Ruby | Translation |
//! |-----|------|-------------|
//! | `1` | `i` | `(?i)` |
//! | `2` | `x` | ignored |
//! | `4` | `m` | `(?s)` |
//!
//! Higher bits carry encoding flags and are ignored. `^` and `$` keep Ruby's
//! line-anchor meaning: patterns are always compiled in multi-line mode. A regexp dumped by Ruby is
//! normally wrapped in `I` and followed by the same encoding list as a string.
//!
//! # Hash Keys
//!
//! Decoded hashes are keyed by text: string keys are kept, integer keys become
//! their decimal form, and every other key becomes the empty string. Later pairs
//! overwrite earlier pairs with the same key.

/// Marshal format version accepted by the decoder.
pub const MARSHAL_VERSION: [u8; 2] = [0x04, 0x08];

pub(crate) const TYPE_NIL: u8 = b'0';
pub(crate) const TYPE_TRUE: u8 = b'T';
pub(crate) const TYPE_FALSE: u8 = b'F';
pub(crate) const TYPE_FIXNUM: u8 = b'i';
pub(crate) const TYPE_BIGNUM: u8 = b'l';
pub(crate) const TYPE_FLOAT: u8 = b'f';
pub(crate) const TYPE_STRING: u8 = b'"';
pub(crate) const TYPE_REGEXP: u8 = b'/';
pub(crate) const TYPE_ARRAY: u8 = b'[';
pub(crate) const TYPE_HASH: u8 = b'{';
pub(crate) const TYPE_HASH_DEF: u8 = b'}';
pub(crate) const TYPE_SYMBOL: u8 = b':';
pub(crate) const TYPE_SYMLINK: u8 = b';';
pub(crate) const TYPE_IVAR: u8 = b'I';

/// Encoding list holding one new symbol key (`06 :`).
pub(crate) const ENCODING_SYMBOL: [u8; 2] = [0x06, TYPE_SYMBOL];
/// Encoding list holding one symbol-link key (`06 ;`).
pub(crate) const ENCODING_SYMLINK: [u8; 2] = [0x06, TYPE_SYMLINK];

pub(crate) const BIGNUM_POSITIVE: u8 = b'+';
pub(crate) const BIGNUM_NEGATIVE: u8 = b'-';

/// Ivar naming a UTF-8 (`T`) or US-ASCII (`F`) string.
pub(crate) const IVAR_SHORT_ENCODING: &str = "E";
/// Ivar naming any other encoding by its string name.
pub(crate) const IVAR_ENCODING: &str = "encoding";

/// Human-readable name of a tag byte, for logs and error messages.
pub(crate) fn tag_name(tag: u8) -> &'static str {
    match tag {
        TYPE_NIL => "nil",
        TYPE_TRUE => "true",
        TYPE_FALSE => "false",
        TYPE_FIXNUM => "fixnum",
        TYPE_BIGNUM => "bignum",
        TYPE_FLOAT => "float",
        TYPE_STRING => "string",
        TYPE_REGEXP => "regexp",
        TYPE_ARRAY => "array",
        TYPE_HASH => "hash",
        TYPE_HASH_DEF => "hash with default",
        TYPE_SYMBOL => "symbol",
        TYPE_SYMLINK => "symbol link",
        TYPE_IVAR => "ivar",
        b'o' => "object",
        b'@' => "object link",
        b'u' | b'U' => "user-defined",
        b'S' => "struct",
        b'c' | b'm' | b'M' => "class or module",
        b'e' | b'C' | b'd' => "extended object",
        _ => "unknown",
    }
}
