//! Bit helpers used by the memo header and the data flags byte.

/// Returns the bits of `byte` selected by `mask`, shifted down to bit 0.
pub fn get_bits(byte: u8, mask: u8) -> u8 {
    if mask == 0 {
        return 0;
    }
    (byte & mask) >> mask.trailing_zeros()
}

/// Replaces the bits of `byte` selected by `mask` with `value`.
///
/// `value` is shifted up to the lowest set bit of `mask`; anything that lands
/// outside the mask is dropped.
pub fn set_bits(byte: u8, mask: u8, value: u8) -> u8 {
    if mask == 0 {
        return byte;
    }
    let shifted = value.checked_shl(mask.trailing_zeros()).unwrap_or(0);
    (byte & !mask) | (shifted & mask)
}

/// Whether bit `position` (0 = LSB) is set.
pub fn is_bit_set(byte: u8, position: u8) -> bool {
    position < 8 && byte & (1 << position) != 0
}

/// Sets bit `position` (0 = LSB). Positions past 7 are ignored.
pub fn set_bit(byte: &mut u8, position: u8) {
    if position < 8 {
        *byte |= 1 << position;
    }
}
