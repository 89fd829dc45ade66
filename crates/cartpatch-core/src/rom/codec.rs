//! Fixed-width integer codec over byte slices.
//!
//! IPS streams store offsets and lengths big-endian; cartridge address fields are
//! little-endian 32-bit words. Both are decoded here explicitly so nothing depends
//! on host byte order.

/// Read an unsigned big-endian integer of `width` bytes (1..=4) at `pos`.
pub fn read_be(bytes: &[u8], pos: usize, width: usize) -> Option<u32> {
    debug_assert!((1..=4).contains(&width));
    let end = pos.checked_add(width)?;
    let field = bytes.get(pos..end)?;
    Some(field.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b)))
}

/// Encode the low `width` bytes of `value` big-endian.
pub fn be_bytes(value: u32, width: usize) -> Vec<u8> {
    debug_assert!((1..=4).contains(&width));
    value.to_be_bytes()[4 - width..].to_vec()
}

pub fn read_u32_le(bytes: &[u8], pos: usize) -> Option<u32> {
    let end = pos.checked_add(4)?;
    let field: [u8; 4] = bytes.get(pos..end)?.try_into().ok()?;
    Some(u32::from_le_bytes(field))
}

/// Read the 24-bit little-endian value at `pos` (the low three bytes of an address word).
pub fn read_u24_le(bytes: &[u8], pos: usize) -> Option<u32> {
    let end = pos.checked_add(3)?;
    let field = bytes.get(pos..end)?;
    Some(u32::from_le_bytes([field[0], field[1], field[2], 0]))
}

pub fn u24_le_bytes(value: u32) -> [u8; 3] {
    let [b0, b1, b2, _] = value.to_le_bytes();
    [b0, b1, b2]
}
