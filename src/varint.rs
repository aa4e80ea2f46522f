//! Protobuf primitive codec: LEB128 varints and zigzag signed varints.

/// Appends `n` as a base-128 varint, low groups first, continuation bit
/// set on all but the last byte. At most 10 bytes for a 64-bit value.
pub fn append_uvarint(buf: &mut Vec<u8>, mut n: u64) {
    while n >= 0x80 {
        buf.push(n as u8 | 0x80);
        n >>= 7;
    }
    buf.push(n as u8);
}

/// Appends `n` zigzag-mapped and then varint-encoded, so small-magnitude
/// negative values stay short.
pub fn append_svarint(buf: &mut Vec<u8>, n: i64) {
    append_uvarint(buf, ((n << 1) ^ (n >> 63)) as u64);
}

#[cfg(test)]
mod varint_test {
    use super::*;
    use quick_protobuf::BytesReader;

    fn decode_uvarint(bytes: &[u8]) -> u64 {
        let mut reader = BytesReader::from_bytes(bytes);
        let n = reader.read_uint64(bytes).unwrap();
        assert!(reader.is_eof());
        n
    }

    fn decode_svarint(bytes: &[u8]) -> i64 {
        let mut reader = BytesReader::from_bytes(bytes);
        let n = reader.read_sint64(bytes).unwrap();
        assert!(reader.is_eof());
        n
    }

    #[test]
    fn uvarint_round_trip() {
        for &n in &[0u64, 1, 127, 128, 300, 16_383, 16_384, u64::max_value()] {
            let mut buf = Vec::new();
            append_uvarint(&mut buf, n);
            assert_eq!(decode_uvarint(&buf), n, "n = {}", n);
        }
    }

    #[test]
    fn uvarint_wire_sizes() {
        let mut buf = Vec::new();
        append_uvarint(&mut buf, 127);
        assert_eq!(buf, [0x7f]);

        buf.clear();
        append_uvarint(&mut buf, 128);
        assert_eq!(buf, [0x80, 0x01]);

        buf.clear();
        append_uvarint(&mut buf, u64::max_value());
        assert_eq!(buf.len(), 10);
    }

    #[test]
    fn svarint_round_trip() {
        let cases = [
            0i64,
            1,
            -1,
            63,
            -64,
            i64::max_value(),
            i64::min_value(),
        ];
        for &n in &cases {
            let mut buf = Vec::new();
            append_svarint(&mut buf, n);
            assert_eq!(decode_svarint(&buf), n, "n = {}", n);
        }
    }

    #[test]
    fn svarint_keeps_small_negatives_short() {
        let mut buf = Vec::new();
        append_svarint(&mut buf, -1);
        assert_eq!(buf, [0x01]);

        buf.clear();
        append_svarint(&mut buf, -64);
        assert_eq!(buf, [0x7f]);
    }
}
