//! Property-based tests for the bit writer and lookup tables.

use proptest::prelude::*;
use smolbits::{byte_parity, hamming84_decode, BitsWriter, BitsWriterOptions, ByteOrder, Error};

fn writer(order: ByteOrder) -> BitsWriter<Vec<u8>> {
    BitsWriter::with_options(Vec::new(), BitsWriterOptions { byte_order: order, ..Default::default() })
}

/// Expands bytes into a '0'/'1' string, most significant bit first.
fn to_bit_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:08b}")).collect()
}

proptest! {
    /// write_bytes_n emits exactly n bytes: a prefix of the input, then padding
    #[test]
    fn prop_bytes_n_length(
        bytes in prop::collection::vec(any::<u8>(), 0..32),
        n in 0usize..48,
        pad in any::<u8>(),
    ) {
        let mut w = writer(ByteOrder::BigEndian);
        w.write_bytes_n(&bytes, n, pad).unwrap();
        let out = w.into_inner();

        prop_assert_eq!(out.len(), n);
        let kept = bytes.len().min(n);
        prop_assert_eq!(&out[..kept], &bytes[..kept]);
        prop_assert!(out[kept..].iter().all(|b| *b == pad));
    }

    /// A bit string padded to a byte equals the byte with those top bits
    #[test]
    fn prop_bit_string_matches_byte(v in any::<u8>(), len in 0usize..=8) {
        let top = v & !(0xff_u16 >> len) as u8;
        let all = format!("{v:08b}");
        let s = &all[..len];

        let mut w = writer(ByteOrder::BigEndian);
        w.write(s).unwrap();
        for _ in len..8 {
            w.write(false).unwrap();
        }

        prop_assert_eq!(w.into_inner(), vec![top]);
    }

    /// Big endian output read MSB first, little endian read LSB first, give x back
    #[test]
    fn prop_u32_round_trip(x in any::<u32>(), lead in 0usize..8) {
        let mut be = writer(ByteOrder::BigEndian);
        be.write(x).unwrap();
        prop_assert_eq!(u32::from_be_bytes(be.get_ref().as_slice().try_into().unwrap()), x);

        let mut le = writer(ByteOrder::LittleEndian);
        le.write(x).unwrap();
        prop_assert_eq!(u32::from_le_bytes(le.get_ref().as_slice().try_into().unwrap()), x);

        // the same bytes appear shifted when bits are already pending
        let mut shifted = writer(ByteOrder::BigEndian);
        shifted.write_n(0_u8, lead).unwrap();
        shifted.write(x).unwrap();
        shifted.write_n(0_u8, 8 - lead).unwrap();
        let bits = to_bit_string(shifted.get_ref());
        prop_assert_eq!(&bits[lead..lead + 32], format!("{x:032b}"));
    }

    /// write_n writes the low n bits of v, most significant first
    #[test]
    fn prop_write_n_low_bits(
        v in any::<u64>(),
        n in 0usize..=80,
        lead in prop::collection::vec(any::<bool>(), 0..8),
    ) {
        let mut w = writer(ByteOrder::BigEndian);
        for b in lead.iter() {
            w.write(*b).unwrap();
        }
        w.write_n(v, n).unwrap();

        let total = lead.len() + n;
        prop_assert_eq!(w.pending_bits() as usize, total % 8);
        prop_assert_eq!(w.get_ref().len(), total / 8);

        let pad = (8 - total % 8) % 8;
        w.write_n(0_u8, pad).unwrap();
        let bits = to_bit_string(w.get_ref());

        let expected: String = (0..n)
            .rev()
            .map(|i| if i < 64 && v >> i & 1 == 1 { '1' } else { '0' })
            .collect();
        prop_assert_eq!(&bits[lead.len()..total], expected);
    }

    /// Unsupported kinds never touch the writer
    #[test]
    fn prop_signed_rejected(v in any::<i64>(), lead in 0usize..8) {
        let mut w = writer(ByteOrder::BigEndian);
        w.write_n(0_u8, lead).unwrap();

        let is_unsupported = matches!(w.write(v), Err(Error::UnsupportedType { .. }));
        prop_assert!(is_unsupported);
        prop_assert_eq!(w.pending_bits() as usize, lead);
        prop_assert!(w.get_ref().is_empty());
    }

    /// Parity matches popcount, and the payload drops the top bit
    #[test]
    fn prop_parity(b in any::<u8>()) {
        let (masked, odd) = byte_parity(b);
        prop_assert_eq!(masked, b & 0x7f);
        prop_assert_eq!(odd, b.count_ones() % 2 == 1);
    }

    /// Successful decodes always yield a nibble
    #[test]
    fn prop_hamming_nibble_range(b in any::<u8>()) {
        if let Some(n) = hamming84_decode(b) {
            prop_assert!(n <= 0xf);
        }
    }
}

#[test]
fn u16_byte_order_example() {
    let mut be = writer(ByteOrder::BigEndian);
    be.write(0x1234_u16).unwrap();
    assert_eq!(be.into_inner(), [0x12, 0x34]);

    let mut le = writer(ByteOrder::LittleEndian);
    le.write(0x1234_u16).unwrap();
    assert_eq!(le.into_inner(), [0x34, 0x12]);
}
