//! Configuration options for Marshal decoding.
//!
//! This module provides types to tune how the decoder treats the parts of the
//! format where more than one reasonable behavior exists:
//!
//! - [`DecodeOptions`]: Main configuration struct
//! - [`BignumMode`]: Exact arbitrary-precision bignums or 64-bit wrap-around
//! - [`UnknownTagPolicy`]: Fail on unrecognized type tags or skip them as nil
//!
//! ## Examples
//!
//! ```rust
//! use serde_marshal::{load_with_options, BignumMode, DecodeOptions, Value};
//!
//! // 2**64 as a bignum: sign '+', 5 words, 10 magnitude bytes
//! let bytes = [0x04, 0x08, b'l', b'+', 0x0a, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0];
//!
//! let exact = load_with_options(&bytes[..], &DecodeOptions::new()).unwrap();
//! assert!(exact.is_bigint());
//!
//! let options = DecodeOptions::new().with_bignum_mode(BignumMode::Truncate);
//! let wrapped = load_with_options(&bytes[..], &options).unwrap();
//! assert_eq!(wrapped, Value::Integer(0));
//! ```

/// How bignum (`l`) payloads are turned into integers.
///
/// - **Arbitrary**: Default, exact. Values that fit `i64` become
///   [`Value::Integer`](crate::Value::Integer), wider ones
///   [`Value::BigInt`](crate::Value::BigInt).
/// - **Truncate**: Only the low 8 magnitude bytes are kept and negation wraps,
///   matching readers that reconstruct bignums into a native 64-bit integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BignumMode {
    #[default]
    Arbitrary,
    Truncate,
}

/// What the dispatcher does with a type tag it does not understand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum UnknownTagPolicy {
    /// Fail with a format error.
    #[default]
    Reject,
    /// Log a warning and decode the tag as nil without consuming a payload.
    Skip,
}

/// Default container nesting limit.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Configuration options for Marshal decoding.
///
/// # Examples
///
/// ```rust
/// use serde_marshal::{BignumMode, DecodeOptions, UnknownTagPolicy};
///
/// let options = DecodeOptions::new()
///     .with_bignum_mode(BignumMode::Truncate)
///     .with_unknown_tags(UnknownTagPolicy::Skip)
///     .with_max_depth(32);
/// assert_eq!(options.max_depth, 32);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeOptions {
    pub bignum: BignumMode,
    pub unknown_tags: UnknownTagPolicy,
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            bignum: BignumMode::default(),
            unknown_tags: UnknownTagPolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodeOptions {
    /// Creates default options (exact bignums, unknown tags rejected, depth 128).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_marshal::{BignumMode, DecodeOptions, UnknownTagPolicy};
    ///
    /// let options = DecodeOptions::new();
    /// assert_eq!(options.bignum, BignumMode::Arbitrary);
    /// assert_eq!(options.unknown_tags, UnknownTagPolicy::Reject);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how bignums are reconstructed.
    #[must_use]
    pub fn with_bignum_mode(mut self, mode: BignumMode) -> Self {
        self.bignum = mode;
        self
    }

    /// Sets the policy for unrecognized type tags.
    #[must_use]
    pub fn with_unknown_tags(mut self, policy: UnknownTagPolicy) -> Self {
        self.unknown_tags = policy;
        self
    }

    /// Sets the maximum container nesting depth.
    ///
    /// A depth of 0 still allows scalar top-level values but rejects any array
    /// or hash.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
