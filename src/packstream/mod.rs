//! The self-describing `PackStream` value codec (§4.B): a closed `Value` sum type plus a
//! smallest-width packer and a marker-dispatching unpacker.

pub(crate) mod marker;
mod pack;
mod unpack;
mod value;

pub use pack::Packer;
pub use unpack::Unpacker;
pub use value::{Map, Value};

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(v: Value) -> Value {
        let mut packer = Packer::new();
        packer.pack(&v).unwrap();
        let bytes = packer.into_bytes();
        let mut unpacker = Unpacker::new(&bytes);
        let out = unpacker.unpack().unwrap();
        assert_eq!(unpacker.remaining(), 0);
        out
    }

    #[test]
    fn null_roundtrips() {
        assert_eq!(roundtrip(Value::Null), Value::Null);
    }

    #[test]
    fn integer_boundaries_roundtrip() {
        for v in [
            -17_i64, -16, -1, 0, 127, 128, -129, 32767, -32768, 32768, -32769,
            i32::MAX as i64, i32::MIN as i64, (i32::MAX as i64) + 1,
            i64::MAX, i64::MIN,
        ] {
            assert_eq!(roundtrip(Value::Integer(v)), Value::Integer(v));
        }
    }

    #[test]
    fn integer_overflow_is_rejected_before_packing() {
        let err = Value::integer_checked(i128::from(i64::MAX) + 1).unwrap_err();
        assert!(matches!(err, crate::error::BoltError::IntegerOutOfRange(_)));
    }

    #[test]
    fn tiny_integer_uses_one_byte() {
        let mut packer = Packer::new();
        packer.pack(&Value::Integer(42)).unwrap();
        assert_eq!(packer.into_bytes(), vec![42]);
    }

    #[test]
    fn int8_marker_for_minus_17() {
        let mut packer = Packer::new();
        packer.pack(&Value::Integer(-17)).unwrap();
        assert_eq!(packer.into_bytes(), vec![0xC8, 0xEF]);
    }

    #[test]
    fn strings_of_various_lengths_roundtrip() {
        for len in [0usize, 15, 16, 255, 256, 65535, 65536] {
            let s = "x".repeat(len);
            assert_eq!(roundtrip(Value::String(s.clone())), Value::String(s));
        }
    }

    #[test]
    fn non_ascii_string_uses_byte_length_not_char_count() {
        // "héllo" is 5 chars but 6 UTF-8 bytes (é is 2 bytes), so it must use the tiny-string
        // marker for length 6, not 5.
        let s = "héllo".to_string();
        let mut packer = Packer::new();
        packer.pack(&Value::String(s.clone())).unwrap();
        let bytes = packer.into_bytes();
        assert_eq!(bytes[0], 0x80 + 6);
        assert_eq!(roundtrip(Value::String(s.clone())), Value::String(s));
    }

    #[test]
    fn nested_list_and_map_roundtrip() {
        let mut map = Map::new();
        map.insert("a", Value::Integer(1));
        map.insert(
            "b",
            Value::List(vec![
                Value::Null,
                Value::String("héllo".into()),
                Value::Integer(-17),
                Value::Integer(2_147_483_648),
            ]),
        );
        let v = Value::Map(map);
        assert_eq!(roundtrip(v.clone()), v);
    }

    #[test]
    fn duplicate_map_key_keeps_last_value_at_first_position() {
        let mut map = Map::new();
        map.insert("a", Value::Integer(1));
        map.insert("b", Value::Integer(2));
        map.insert("a", Value::Integer(3));
        assert_eq!(map.get("a"), Some(&Value::Integer(3)));
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn encoder_emits_both_entries_of_a_raw_duplicate_key_map_and_decoder_keeps_last() {
        // Map::insert dedupes before pack_map ever sees a duplicate key, so this exercises the
        // wire-level encoder/decoder boundary directly via the raw constructor.
        let map = Map::from_raw_entries_allow_duplicates(vec![
            ("a".to_string(), Value::Integer(1)),
            ("a".to_string(), Value::Integer(2)),
        ]);

        let mut packer = Packer::new();
        packer.pack(&Value::Map(map)).unwrap();
        let bytes = packer.into_bytes();
        assert_eq!(bytes[0], 0xA2); // tiny map, 2 entries: both were emitted onto the wire

        let mut unpacker = Unpacker::new(&bytes);
        let decoded = unpacker.unpack().unwrap();
        match decoded {
            Value::Map(map) => {
                assert_eq!(map.len(), 1);
                assert_eq!(map.get("a"), Some(&Value::Integer(2)));
            }
            other => panic!("expected a map, got {other:?}"),
        }
    }

    #[test]
    fn golden_hex_fixture() {
        // pack({"a": 1, "b": [null, "héllo", -17, 2147483648]})
        let mut map = Map::new();
        map.insert("a", Value::Integer(1));
        map.insert(
            "b",
            Value::List(vec![
                Value::Null,
                Value::String("héllo".into()),
                Value::Integer(-17),
                Value::Integer(2_147_483_648),
            ]),
        );
        let mut packer = Packer::new();
        packer.pack(&Value::Map(map)).unwrap();
        let bytes = packer.into_bytes();
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        assert_eq!(
            hex,
            concat!(
                "a2",             // tiny map, 2 entries
                "81", "61",       // "a"
                "01",             // 1
                "81", "62",       // "b"
                "94",             // tiny list, 4 entries
                "c0",             // null
                "86", "68c3a96c6c6f", // "héllo" (6 utf-8 bytes)
                "c8", "ef",       // -17
                "cb", "0000000080000000", // 2147483648 (exceeds i32 range, needs i64)
            )
        );
    }

    #[test]
    fn map_length_markers_are_distinct_from_list_markers() {
        assert_ne!(marker::MAP_8, marker::LIST_8);
        assert_ne!(marker::MAP_16, marker::LIST_16);
        assert_ne!(marker::MAP_32, marker::LIST_32);
        assert_eq!(marker::MAP_8, 0xD8);
        assert_eq!(marker::MAP_16, 0xD9);
        assert_eq!(marker::MAP_32, 0xDA);
    }

    #[test]
    fn unknown_marker_is_rejected() {
        let bytes = [0xC1_u8]; // not in the marker table for this core
        let mut unpacker = Unpacker::new(&bytes);
        let err = unpacker.unpack().unwrap_err();
        assert!(matches!(err, crate::error::BoltError::UnknownMarker { marker: 0xC1 }));
    }

    #[test]
    fn truncated_value_is_rejected() {
        let bytes = [0xD0_u8, 0x05, b'h', b'i']; // string header says 5 bytes, only 2 present
        let mut unpacker = Unpacker::new(&bytes);
        let err = unpacker.unpack().unwrap_err();
        assert!(matches!(err, crate::error::BoltError::Truncated { .. }));
    }

    #[test]
    fn bad_utf8_is_rejected() {
        let bytes = [0x81_u8, 0xFF]; // tiny string, length 1, invalid utf-8 byte
        let mut unpacker = Unpacker::new(&bytes);
        let err = unpacker.unpack().unwrap_err();
        assert!(matches!(err, crate::error::BoltError::BadUtf8 { .. }));
    }

    #[test]
    fn non_string_map_key_is_rejected() {
        // tiny map with 1 entry whose "key" is the integer 1, not a string
        let bytes = [0xA1_u8, 0x01, 0x02];
        let mut unpacker = Unpacker::new(&bytes);
        let err = unpacker.unpack().unwrap_err();
        assert!(matches!(err, crate::error::BoltError::UnsupportedKey));
    }
}
