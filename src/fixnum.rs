//! Fixnum decoding.
//!
//! Marshal stores integers, lengths, counts and symbol indices with the same
//! variable-length signed encoding. See the [`format`](crate::format) module for
//! the byte layout.

use crate::cursor::ByteCursor;
use crate::{Error, Result};
use std::io::Read;

/// Offset applied to single-byte fixnums.
const FIXNUM_OFFSET: i64 = 5;

/// Reads one fixnum.
pub fn read_fixnum<R: Read>(cursor: &mut ByteCursor<R>) -> Result<i64> {
    let c = i64::from(cursor.read_u8("fixnum")? as i8);

    if c == 0 {
        return Ok(0);
    }

    if c > 0 {
        if c > 4 {
            return Ok(c - FIXNUM_OFFSET);
        }

        let mut n: i64 = 0;
        for i in 0..c {
            let b = cursor.read_u8("fixnum magnitude byte")?;
            n |= i64::from(b) << (8 * i);
        }
        Ok(n)
    } else {
        if c < -4 {
            return Ok(c + FIXNUM_OFFSET);
        }

        // Start from all ones and overwrite one byte at a time so the result
        // stays sign-extended.
        let mut n: i64 = -1;
        for i in 0..-c {
            n &= !(0xFF << (8 * i));
            let b = cursor.read_u8("fixnum magnitude byte")?;
            n |= i64::from(b) << (8 * i);
        }
        Ok(n)
    }
}

/// Reads a fixnum used as a length or count, rejecting negative values.
pub fn read_length<R: Read>(cursor: &mut ByteCursor<R>, what: &str) -> Result<usize> {
    let start = cursor.position();
    let n = read_fixnum(cursor)?;
    usize::try_from(n).map_err(|_| Error::format(start, format!("negative {what} {n}")))
}
