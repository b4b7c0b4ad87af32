//! Varint and zigzag primitives.
//!
//! Values are base-128 groups, least significant first, with the high bit
//! of each byte set while more bytes follow. A 32-bit value needs at most
//! [`VARINT_LIMIT`] bytes.

/// Maximum encoded length of a 32-bit varint.
pub const VARINT_LIMIT: usize = 5;

/// Outcome of decoding one varint from a byte slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Varint {
    /// Decoded value and the number of bytes it occupied.
    Value(u32, usize),
    /// The slice ended while the continuation bit was still set.
    Incomplete,
    /// The fifth byte still carried the continuation bit.
    Malformed,
}

/// Decode one varint from the start of `bytes`.
///
/// Bits beyond the 32nd in the fifth byte are discarded.
#[inline]
pub fn decode_varint32(bytes: &[u8]) -> Varint {
    let mut value: u32 = 0;
    for (i, &byte) in bytes.iter().take(VARINT_LIMIT).enumerate() {
        value |= u32::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Varint::Value(value, i + 1);
        }
    }
    if bytes.len() < VARINT_LIMIT {
        Varint::Incomplete
    } else {
        Varint::Malformed
    }
}

/// Append the varint encoding of `value` to `out`.
pub fn encode_varint32(mut value: u32, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Number of bytes `value` occupies once varint encoded.
pub fn encoded_len(value: u32) -> usize {
    match value {
        0..=0x7f => 1,
        0x80..=0x3fff => 2,
        0x4000..=0x1f_ffff => 3,
        0x20_0000..=0xfff_ffff => 4,
        _ => 5,
    }
}

/// Map a zigzag-coded value back to its signed form.
#[inline]
pub fn zigzag_decode(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// Map a signed value to its zigzag form.
#[inline]
pub fn zigzag_encode(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}
