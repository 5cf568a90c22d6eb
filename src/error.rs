//! Error types for Marshal decoding.
//!
//! Every decoder in this crate returns the first failure it meets straight to
//! its caller. There is no partial-result recovery: a single malformed field
//! aborts the whole decode.
//!
//! ## Error Categories
//!
//! - **Unexpected end of input**: the stream ended in the middle of a field
//! - **Format errors**: the bytes are readable but do not describe a valid value
//!   (bad version header, unknown tag, bad bignum sign, out-of-range symbol
//!   backreference, unparsable float or regex, ...)
//! - **Depth limit**: containers nested deeper than [`DecodeOptions::max_depth`]
//! - **I/O errors**: failures reported by the underlying byte source
//!
//! Errors carry the byte offset (counted from the first version byte) at which
//! the problem was detected.
//!
//! ## Examples
//!
//! ```rust
//! use serde_marshal::{load_slice, Error};
//!
//! let err = load_slice(&[0x04, 0x07, b'0']).unwrap_err();
//! assert!(err.is_format());
//! assert!(err.to_string().contains("unsupported marshal version"));
//!
//! let err = load_slice(&[0x04, 0x08, b'i']).unwrap_err();
//! assert!(matches!(err, Error::UnexpectedEof { offset: 3, .. }));
//! ```
//!
//! [`DecodeOptions::max_depth`]: crate::DecodeOptions::max_depth

use std::fmt;
use std::io;
use thiserror::Error;

/// Represents all possible errors that can occur while decoding Marshal data.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error reported by the byte source
    #[error("IO error: {0}")]
    Io(String),

    /// The stream ended before a field was complete
    #[error("Unexpected end of input at offset {offset}: expected {expected}")]
    UnexpectedEof { offset: u64, expected: String },

    /// Structurally readable but invalid Marshal data
    #[error("Invalid marshal data at offset {offset}: {msg}")]
    Format { offset: u64, msg: String },

    /// Containers nested deeper than the configured limit
    #[error("Nesting depth limit of {limit} exceeded at offset {offset}")]
    DepthLimitExceeded { offset: u64, limit: usize },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a format error for data that is readable but invalid.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_marshal::Error;
    ///
    /// let err = Error::format(7, "unexpected bignum sign byte 0x3f");
    /// assert!(err.to_string().contains("offset 7"));
    /// ```
    pub fn format<T: fmt::Display>(offset: u64, msg: T) -> Self {
        Error::Format {
            offset,
            msg: msg.to_string(),
        }
    }

    /// Creates an unexpected end-of-input error.
    pub fn unexpected_eof(offset: u64, expected: &str) -> Self {
        Error::UnexpectedEof {
            offset,
            expected: expected.to_string(),
        }
    }

    /// Creates a depth-limit error.
    pub fn depth_limit(offset: u64, limit: usize) -> Self {
        Error::DepthLimitExceeded { offset, limit }
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_marshal::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for failures of the underlying reader.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Maps an [`io::Error`] raised while reading `expected`.
    ///
    /// A short read becomes [`Error::UnexpectedEof`]; every other kind is
    /// propagated as [`Error::Io`].
    pub(crate) fn from_io(err: &io::Error, offset: u64, expected: &str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::unexpected_eof(offset, expected)
        } else {
            Error::io(&err.to_string())
        }
    }

    /// Returns `true` if the input ended in the middle of a field.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::UnexpectedEof { .. })
    }

    /// Returns `true` for invalid-but-readable data.
    #[must_use]
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format { .. })
    }

    /// Byte offset at which the error was detected, if known.
    #[must_use]
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::UnexpectedEof { offset, .. }
            | Error::Format { offset, .. }
            | Error::DepthLimitExceeded { offset, .. } => Some(*offset),
            Error::Io(_) | Error::Custom(_) => None,
        }
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
