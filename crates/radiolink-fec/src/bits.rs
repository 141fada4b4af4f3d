//! Bit-level access to byte buffers.
//!
//! Bit positions are counted from the most significant bit of byte 0, which
//! is the order codewords and line-coded symbols are emitted on the wire.

/// Read bit `pos` of `data`.
///
/// # Panics
///
/// Panics if `pos / 8` is outside `data`.
pub fn get_bit(data: &[u8], pos: usize) -> bool {
    (data[pos / 8] >> (7 - pos % 8)) & 1 == 1
}

/// Set bit `pos` of `data` to `value`.
///
/// # Panics
///
/// Panics if `pos / 8` is outside `data`.
pub fn set_bit(data: &mut [u8], pos: usize, value: bool) {
    let mask = 1u8 << (7 - pos % 8);
    if value {
        data[pos / 8] |= mask;
    } else {
        data[pos / 8] &= !mask;
    }
}

/// Invert bit `pos` of `data`.
pub fn flip_bit(data: &mut [u8], pos: usize) {
    data[pos / 8] ^= 1u8 << (7 - pos % 8);
}

/// Number of differing bits between `a` and `b` over their common prefix.
pub fn hamming_distance(a: &[u8], b: &[u8]) -> usize {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x ^ y).count_ones() as usize)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_bit_is_msb_first() {
        let data = [0b1000_0001, 0b0100_0000];
        assert!(get_bit(&data, 0));
        assert!(!get_bit(&data, 1));
        assert!(get_bit(&data, 7));
        assert!(get_bit(&data, 9));
        assert!(!get_bit(&data, 15));
    }

    #[test]
    fn set_bit_sets_and_clears() {
        let mut data = [0u8; 2];
        set_bit(&mut data, 3, true);
        set_bit(&mut data, 15, true);
        assert_eq!(data, [0b0001_0000, 0b0000_0001]);

        set_bit(&mut data, 3, false);
        assert_eq!(data, [0, 1]);
    }

    #[test]
    fn flip_bit_toggles() {
        let mut data = [0xFFu8];
        flip_bit(&mut data, 0);
        assert_eq!(data, [0x7F]);
        flip_bit(&mut data, 0);
        assert_eq!(data, [0xFF]);
    }

    #[test]
    fn hamming_distance_counts_bits_not_bytes() {
        assert_eq!(hamming_distance(b"abc", b"abc"), 0);
        assert_eq!(hamming_distance(&[0x00, 0x0F], &[0x01, 0x00]), 5);
        assert_eq!(hamming_distance(&[0xFF], &[0x00, 0xFF]), 8);
    }

    #[test]
    #[should_panic]
    fn get_bit_out_of_range_panics() {
        get_bit(&[0u8], 8);
    }
}
