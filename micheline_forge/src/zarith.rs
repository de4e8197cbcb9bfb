//! Signed arbitrary-precision integers in the chain's variable-length form.
//!
//! The first byte holds magnitude bits 0..5, the sign in bit 6 and a
//! continuation flag in bit 7. Every following byte holds the next seven
//! magnitude bits plus its own continuation flag.

use num_bigint::{BigInt, BigUint, Sign};

use crate::errors::{ForgeError, ForgeResult};

const CONTINUATION: u8 = 0x80;
const SIGN: u8 = 0x40;
const FIRST_MASK: u8 = 0x3f;
const NEXT_MASK: u8 = 0x7f;

/// Extracts `count` bits of `bytes` (little-endian) starting at bit `start`.
fn take_bits(bytes: &[u8], total_bits: u64, start: u64, count: u64) -> u8 {
    let mut out = 0u8;
    for k in 0..count {
        let i = start + k;
        if i >= total_bits {
            break;
        }
        let bit = (bytes[(i / 8) as usize] >> (i % 8)) & 1;
        out |= bit << k;
    }
    out
}

/// Encodes `value` without the leading `0x00` node tag.
pub fn encode_int(value: &BigInt) -> Vec<u8> {
    let magnitude = value.magnitude();
    let bytes = magnitude.to_bytes_le();
    let total_bits = magnitude.bits();

    let mut out = Vec::with_capacity((total_bits / 7 + 1) as usize);
    let mut first = take_bits(&bytes, total_bits, 0, 6);
    if value.sign() == Sign::Minus {
        first |= SIGN;
    }
    let mut pos = 6u64;
    if pos < total_bits {
        first |= CONTINUATION;
    }
    out.push(first);

    while pos < total_bits {
        let mut group = take_bits(&bytes, total_bits, pos, 7);
        pos += 7;
        if pos < total_bits {
            group |= CONTINUATION;
        }
        out.push(group);
    }
    out
}

/// Decodes one integer from the start of `data`, returning it with the number of bytes consumed.
pub fn decode_int(data: &[u8]) -> ForgeResult<(BigInt, usize)> {
    let first = *data.first().ok_or(ForgeError::TooFewBytes {
        needed: 1,
        available: 0,
    })?;
    let negative = first & SIGN != 0;
    let mut magnitude = BigUint::from(first & FIRST_MASK);
    let mut shift = 6usize;
    let mut consumed = 1usize;
    let mut more = first & CONTINUATION != 0;

    while more {
        let byte = *data.get(consumed).ok_or(ForgeError::TooFewBytes {
            needed: consumed + 1,
            available: data.len(),
        })?;
        magnitude |= BigUint::from(byte & NEXT_MASK) << shift;
        shift += 7;
        consumed += 1;
        more = byte & CONTINUATION != 0;
    }

    let sign = if negative { Sign::Minus } else { Sign::Plus };
    Ok((BigInt::from_biguint(sign, magnitude), consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(value: i64) -> String {
        hex::encode(encode_int(&BigInt::from(value)))
    }

    #[test]
    fn encodes_boundaries() {
        assert_eq!(enc(0), "00");
        assert_eq!(enc(-1), "41");
        assert_eq!(enc(63), "3f");
        assert_eq!(enc(64), "8001");
        assert_eq!(enc(-64), "c001");
        assert_eq!(enc(1_000_000), "80897a");
    }

    #[test]
    fn decodes_and_reports_length() {
        let (value, used) = decode_int(&[0xba, 0x9a, 0xf7, 0xea, 0x06, 0xff]).unwrap();
        assert_eq!(value, BigInt::from(917431994));
        assert_eq!(used, 5);
    }

    #[test]
    fn negative_zero_decodes_as_zero() {
        let (value, _) = decode_int(&[0x40]).unwrap();
        assert_eq!(value, BigInt::from(0));
    }

    #[test]
    fn continuation_past_end_is_an_error() {
        assert_eq!(
            decode_int(&[0x80, 0x80]),
            Err(ForgeError::TooFewBytes {
                needed: 3,
                available: 2
            })
        );
        assert!(decode_int(&[]).is_err());
    }
}
