include!(concat!(env!("OUT_DIR"), "/parity_table.rs"));

// Hamming 8/4 decoding, 0xff marks bytes with more than one flipped bit
static HAMMING84: [u8; 256] = [
    0x01, 0xff, 0xff, 0x08, 0xff, 0x0c, 0x04, 0xff, 0xff, 0x08, 0x08, 0x08, 0x06, 0xff, 0xff, 0x08,
    0xff, 0x0a, 0x02, 0xff, 0x06, 0xff, 0xff, 0x0f, 0x06, 0xff, 0xff, 0x08, 0x06, 0x06, 0x06, 0xff,
    0xff, 0x0a, 0x04, 0xff, 0x04, 0xff, 0x04, 0x04, 0x00, 0xff, 0xff, 0x08, 0xff, 0x0d, 0x04, 0xff,
    0x0a, 0x0a, 0xff, 0x0a, 0xff, 0x0a, 0x04, 0xff, 0xff, 0x0a, 0x03, 0xff, 0x06, 0xff, 0xff, 0x0e,
    0x01, 0x01, 0x01, 0xff, 0x01, 0xff, 0xff, 0x0f, 0x01, 0xff, 0xff, 0x08, 0xff, 0x0d, 0x05, 0xff,
    0x01, 0xff, 0xff, 0x0f, 0xff, 0x0f, 0x0f, 0x0f, 0xff, 0x0b, 0x03, 0xff, 0x06, 0xff, 0xff, 0x0f,
    0x01, 0xff, 0xff, 0x09, 0xff, 0x0d, 0x04, 0xff, 0xff, 0x0d, 0x03, 0xff, 0x0d, 0x0d, 0xff, 0x0d,
    0xff, 0x0a, 0x03, 0xff, 0x07, 0xff, 0xff, 0x0f, 0x03, 0xff, 0x03, 0x03, 0xff, 0x0d, 0x03, 0xff,
    0xff, 0x0c, 0x02, 0xff, 0x0c, 0x0c, 0xff, 0x0c, 0x00, 0xff, 0xff, 0x08, 0xff, 0x0c, 0x05, 0xff,
    0x02, 0xff, 0x02, 0x02, 0xff, 0x0c, 0x02, 0xff, 0xff, 0x0b, 0x02, 0xff, 0x06, 0xff, 0xff, 0x0e,
    0x00, 0xff, 0xff, 0x09, 0xff, 0x0c, 0x04, 0xff, 0x00, 0x00, 0x00, 0xff, 0x00, 0xff, 0xff, 0x0e,
    0xff, 0x0a, 0x02, 0xff, 0x07, 0xff, 0xff, 0x0e, 0x00, 0xff, 0xff, 0x0e, 0xff, 0x0e, 0x0e, 0x0e,
    0x01, 0xff, 0xff, 0x09, 0xff, 0x0c, 0x05, 0xff, 0xff, 0x0b, 0x05, 0xff, 0x05, 0xff, 0x05, 0x05,
    0xff, 0x0b, 0x02, 0xff, 0x07, 0xff, 0xff, 0x0f, 0x0b, 0x0b, 0xff, 0x0b, 0xff, 0x0b, 0x05, 0xff,
    0xff, 0x09, 0x09, 0x09, 0x07, 0xff, 0xff, 0x09, 0x00, 0xff, 0xff, 0x09, 0xff, 0x0d, 0x05, 0xff,
    0x07, 0xff, 0xff, 0x09, 0x07, 0x07, 0x07, 0xff, 0xff, 0x0b, 0x03, 0xff, 0x07, 0xff, 0xff, 0x0e,
];

/// Decodes a Hamming 8/4 protected byte into its nibble, correcting a single
/// flipped bit. Returns `None` when the byte cannot be corrected.
pub fn hamming84_decode(b: u8) -> Option<u8> {
    match HAMMING84[b as usize] {
        0xff => None,
        n => Some(n),
    }
}

/// Returns the byte without its top bit, and whether the whole byte has odd
/// parity.
pub fn byte_parity(b: u8) -> (u8, bool) {
    (b & 0x7f, PARITY[b as usize] == 1)
}

#[cfg(test)]
const CODEWORDS: [u8; 16] = [
    0xa8, 0x40, 0x92, 0x7a, 0x26, 0xce, 0x1c, 0xf4,
    0x0b, 0xe3, 0x31, 0xd9, 0x85, 0x6d, 0xbf, 0x57,
];

#[test]
fn test_hamming84_codewords() {
    for (nibble, c) in CODEWORDS.iter().enumerate() {
        assert_eq!(hamming84_decode(*c), Some(nibble as u8));

        for i in 0..8 {
            assert_eq!(hamming84_decode(*c ^ (1_u8 << i)), Some(nibble as u8), "{c:#04x} bit {i}");
        }
    }
}

#[test]
fn test_hamming84_invalid() {
    let correctable = |b: u8| CODEWORDS.iter().any(|c| (c ^ b).count_ones() <= 1);

    let mut valid = 0;
    for b in 0..=255_u8 {
        assert_eq!(hamming84_decode(b).is_some(), correctable(b), "{b:#04x}");
        valid += hamming84_decode(b).is_some() as usize;
    }
    assert_eq!(valid, 16 * 9);

    assert_eq!(hamming84_decode(0x01), None);
    assert_eq!(hamming84_decode(0x00), Some(0x01));
}

#[test]
fn test_byte_parity() {
    assert_eq!(byte_parity(0x00), (0x00, false));
    assert_eq!(byte_parity(0x01), (0x01, true));
    assert_eq!(byte_parity(0x03), (0x03, false));
    assert_eq!(byte_parity(0x80), (0x00, true));
    assert_eq!(byte_parity(0xff), (0x7f, false));
    assert_eq!(byte_parity(0xd5), (0x55, true));

    for b in 0..=255_u8 {
        assert_eq!(byte_parity(b), (b & 0x7f, b.count_ones() % 2 == 1));
    }
}
