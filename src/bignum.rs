//! Bignum decoding.
//!
//! A bignum is a sign byte (`+` or `-`), a fixnum word count and `2 * words`
//! little-endian magnitude bytes.

use crate::cursor::ByteCursor;
use crate::fixnum::read_fixnum;
use crate::format::{BIGNUM_NEGATIVE, BIGNUM_POSITIVE};
use crate::options::BignumMode;
use crate::{Error, Result, Value};
use num_bigint::{BigInt, Sign};
use std::io::Read;

/// Reads a bignum payload (the part after the `l` tag).
pub fn read_bignum<R: Read>(cursor: &mut ByteCursor<R>, mode: BignumMode) -> Result<Value> {
    let sign_offset = cursor.position();
    let sign = match cursor.read_u8("bignum sign")? {
        BIGNUM_POSITIVE => Sign::Plus,
        BIGNUM_NEGATIVE => Sign::Minus,
        other => {
            return Err(Error::format(
                sign_offset,
                format!("unexpected bignum sign byte {other:#04x}"),
            ))
        }
    };

    let len_offset = cursor.position();
    let words = read_fixnum(cursor)?;
    let len = usize::try_from(words)
        .ok()
        .and_then(|w| w.checked_mul(2))
        .ok_or_else(|| Error::format(len_offset, format!("invalid bignum length {words}")))?;
    let magnitude = cursor.read_bytes(len, "bignum magnitude")?;

    Ok(match mode {
        BignumMode::Arbitrary => {
            let value = BigInt::from_bytes_le(sign, &magnitude);
            match i64::try_from(&value) {
                Ok(small) => Value::Integer(small),
                Err(_) => Value::BigInt(value),
            }
        }
        BignumMode::Truncate => Value::Integer(truncate(sign, &magnitude)),
    })
}

/// Folds the magnitude into 64 bits, dropping everything above the eighth byte.
fn truncate(sign: Sign, magnitude: &[u8]) -> i64 {
    if magnitude.len() > 8 && magnitude[8..].iter().any(|b| *b != 0) {
        tracing::warn!(
            bytes = magnitude.len(),
            "bignum wider than 64 bits truncated"
        );
    }

    let mut n: u64 = 0;
    for (i, b) in magnitude.iter().take(8).enumerate() {
        n |= u64::from(*b) << (8 * i);
    }

    let n = n as i64;
    if sign == Sign::Minus {
        n.wrapping_neg()
    } else {
        n
    }
}
