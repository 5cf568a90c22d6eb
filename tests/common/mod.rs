//! Test-only helpers for building Marshal payloads by hand.

#![allow(dead_code)]

use serde_marshal::MARSHAL_VERSION;

/// Encodes a fixnum the way Ruby's `w_long` does.
///
/// Only values that fit in four magnitude bytes are supported, which covers
/// everything Ruby writes with the `i` tag.
pub fn fixnum(value: i64) -> Vec<u8> {
    assert!(
        (i64::from(i32::MIN)..=i64::from(i32::MAX)).contains(&value),
        "fixnum out of 32-bit range: {value}"
    );

    if value == 0 {
        return vec![0];
    }
    if 0 < value && value < 123 {
        return vec![(value + 5) as u8];
    }
    if -124 < value && value < 0 {
        return vec![((value - 5) & 0xff) as u8];
    }

    let mut out = vec![0u8];
    let mut x = value;
    for i in 1..=4u8 {
        out.push((x & 0xff) as u8);
        x >>= 8;
        if x == 0 {
            out[0] = i;
            break;
        }
        if x == -1 {
            out[0] = (-(i as i8)) as u8;
            break;
        }
    }
    out
}

/// Prefixes `payload` with the version header.
pub fn dump(payload: &[u8]) -> Vec<u8> {
    let mut bytes = MARSHAL_VERSION.to_vec();
    bytes.extend_from_slice(payload);
    bytes
}

/// A bare `"` string with no encoding list.
pub fn raw_string(bytes: &[u8]) -> Vec<u8> {
    let mut out = vec![b'"'];
    out.extend(fixnum(bytes.len() as i64));
    out.extend_from_slice(bytes);
    out
}

/// A fixnum value with its `i` tag.
pub fn integer(value: i64) -> Vec<u8> {
    let mut out = vec![b'i'];
    out.extend(fixnum(value));
    out
}

/// An array of already-encoded elements.
pub fn array(elements: &[Vec<u8>]) -> Vec<u8> {
    let mut out = vec![b'['];
    out.extend(fixnum(elements.len() as i64));
    for element in elements {
        out.extend_from_slice(element);
    }
    out
}
