use std::collections::{HashMap, HashSet};

use bitstream::{BitReader, BitWriter};
use codec::{FixedString, StrategyRegistry};
use proptest::prelude::*;

fn registry() -> StrategyRegistry {
    let mut registry = StrategyRegistry::with_defaults();
    registry
        .bind_sequence::<u32>()
        .bind_sequence::<String>()
        .bind_set::<i16>()
        .bind_map::<u8, Vec<u32>>()
        .bind_fixed_string::<16>()
        .bind_optional::<i64>();
    registry
}

fn roundtrip<T: Default + 'static>(registry: &StrategyRegistry, value: &T) -> T {
    let mut buf = vec![0u8; 8192];
    let mut writer = BitWriter::new(&mut buf);
    registry.write(&mut writer, value).unwrap();
    let used = writer.finish();
    let mut reader = BitReader::new(&buf[..used]);
    let decoded = registry.decode(&mut reader).unwrap();
    assert!(reader.is_empty());
    decoded
}

fn apply_delta<T: 'static>(registry: &StrategyRegistry, current: &T, previous: &T) -> T {
    let mut buf = vec![0u8; 8192];
    let mut writer = BitWriter::new(&mut buf);
    registry.write_delta(&mut writer, current, previous).unwrap();
    let used = writer.finish();
    let mut target = registry.duplicate(previous).unwrap();
    let mut reader = BitReader::new(&buf[..used]);
    registry.read_delta(&mut reader, &mut target).unwrap();
    assert!(reader.is_empty());
    target
}

fn fixed_string() -> impl Strategy<Value = FixedString<16>> {
    proptest::collection::vec(any::<u8>(), 0..=16).prop_map(|bytes| {
        let mut value = FixedString::<16>::new();
        value.set_bytes(&bytes).unwrap();
        value
    })
}

fn scores() -> impl Strategy<Value = HashMap<u8, Vec<u32>>> {
    proptest::collection::hash_map(any::<u8>(), proptest::collection::vec(any::<u32>(), 0..6), 0..12)
}

proptest! {
    #[test]
    fn sequence_roundtrip(value in proptest::collection::vec(any::<u32>(), 0..64)) {
        let registry = registry();
        prop_assert_eq!(roundtrip(&registry, &value), value);
    }

    #[test]
    fn text_sequence_roundtrip(value in proptest::collection::vec(".{0,12}", 0..8)) {
        let registry = registry();
        prop_assert_eq!(roundtrip(&registry, &value), value);
    }

    #[test]
    fn sequence_delta(
        previous in proptest::collection::vec(any::<u32>(), 0..40),
        current in proptest::collection::vec(any::<u32>(), 0..40),
    ) {
        let registry = registry();
        prop_assert_eq!(apply_delta(&registry, &current, &previous), current);
    }

    #[test]
    fn sequence_sparse_delta(
        previous in proptest::collection::vec(any::<u32>(), 1..40),
        index in any::<prop::sample::Index>(),
        replacement in any::<u32>(),
    ) {
        let registry = registry();
        let mut current = previous.clone();
        current[index.index(previous.len())] = replacement;
        prop_assert_eq!(apply_delta(&registry, &current, &previous), current);
    }

    #[test]
    fn set_delta(
        previous in proptest::collection::hash_set(any::<i16>(), 0..32),
        current in proptest::collection::hash_set(any::<i16>(), 0..32),
    ) {
        let registry = registry();
        prop_assert_eq!(apply_delta(&registry, &current, &previous), current);
    }

    #[test]
    fn map_delta(previous in scores(), current in scores()) {
        let registry = registry();
        prop_assert_eq!(apply_delta(&registry, &current, &previous), current);
    }

    #[test]
    fn fixed_string_delta(previous in fixed_string(), current in fixed_string()) {
        let registry = registry();
        prop_assert_eq!(apply_delta(&registry, &current, &previous), current);
    }

    #[test]
    fn optional_delta(previous in any::<Option<i64>>(), current in any::<Option<i64>>()) {
        let registry = registry();
        prop_assert_eq!(apply_delta(&registry, &current, &previous), current);
    }

    #[test]
    fn duplicates_are_independent(
        mut sequence in proptest::collection::vec(any::<u32>(), 0..16),
        mut set in proptest::collection::hash_set(any::<i16>(), 0..16),
        mut map in scores(),
    ) {
        let registry = registry();

        let sequence_copy = registry.duplicate(&sequence).unwrap();
        let set_copy: HashSet<i16> = registry.duplicate(&set).unwrap();
        let map_copy = registry.duplicate(&map).unwrap();
        prop_assert!(registry.are_equal(&sequence, &sequence_copy));
        prop_assert!(registry.are_equal(&set, &set_copy));
        prop_assert!(registry.are_equal(&map, &map_copy));

        let before = (sequence.clone(), set.clone(), map.clone());
        sequence.push(1);
        set.insert(i16::MIN);
        set.insert(i16::MAX);
        map.entry(0).or_default().push(9);

        prop_assert_eq!(sequence_copy, before.0);
        prop_assert_eq!(set_copy, before.1);
        prop_assert_eq!(map_copy, before.2);
    }

    #[test]
    fn decode_arbitrary_bytes_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
        let registry = registry();
        let _ = registry.decode::<Vec<String>>(&mut BitReader::new(&bytes));
        let _ = registry.decode::<HashMap<u8, Vec<u32>>>(&mut BitReader::new(&bytes));
        let mut target = FixedString::<16>::new();
        let _ = registry.read_delta(&mut BitReader::new(&bytes), &mut target);
        let mut sequence = vec![1u32, 2, 3];
        let _ = registry.read_delta(&mut BitReader::new(&bytes), &mut sequence);
    }
}
