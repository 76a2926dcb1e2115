use std::collections::{HashMap, HashSet};

use bitstream::{BitReader, BitWriter};
use codec::{CodecError, CodecLimits, FixedString, StrategyRegistry, Topology, UserCallbacks};

fn write_full<T: 'static>(registry: &StrategyRegistry, value: &T) -> Vec<u8> {
    let mut buf = vec![0u8; 1024];
    let mut writer = BitWriter::new(&mut buf);
    registry.write(&mut writer, value).unwrap();
    let used = writer.finish();
    buf.truncate(used);
    buf
}

fn write_delta<T: 'static>(registry: &StrategyRegistry, value: &T, previous: &T) -> Vec<u8> {
    let mut buf = vec![0u8; 1024];
    let mut writer = BitWriter::new(&mut buf);
    registry.write_delta(&mut writer, value, previous).unwrap();
    let used = writer.finish();
    buf.truncate(used);
    buf
}

/// Applies `current - previous` to a duplicate of `previous`.
fn delta_roundtrip<T: 'static>(registry: &StrategyRegistry, current: &T, previous: &T) -> T {
    let bytes = write_delta(registry, current, previous);
    let mut target = registry.duplicate(previous).unwrap();
    let mut reader = BitReader::new(&bytes);
    registry.read_delta(&mut reader, &mut target).unwrap();
    assert!(reader.is_empty());
    target
}

#[test]
fn scalar_write_then_read() {
    let registry = StrategyRegistry::with_defaults();
    let bytes = write_full(&registry, &5i32);
    let mut reader = BitReader::new(&bytes);
    assert_eq!(registry.decode::<i32>(&mut reader).unwrap(), 5);
}

#[test]
fn sequence_single_element_change() {
    let mut registry = StrategyRegistry::with_defaults();
    registry.bind_sequence::<u32>();

    let original: Vec<u32> = (0..10).collect();
    let mut current = original.clone();
    current[3] = 99;

    let decoded = delta_roundtrip(&registry, &current, &original);
    assert_eq!(decoded, vec![0, 1, 2, 99, 4, 5, 6, 7, 8, 9]);
    let delta_len = write_delta(&registry, &current, &original).len();
    assert!(delta_len < write_full(&registry, &current).len());
}

#[test]
fn set_add_and_remove() {
    let mut registry = StrategyRegistry::with_defaults();
    registry.bind_set::<char>();

    let previous: HashSet<char> = ['A', 'B', 'C'].into_iter().collect();
    let current: HashSet<char> = ['A', 'C', 'D'].into_iter().collect();

    let decoded = delta_roundtrip(&registry, &current, &previous);
    assert_eq!(decoded, current);
}

#[test]
fn fixed_string_prefers_delta_and_shortens() {
    let mut registry = StrategyRegistry::with_defaults();
    registry.bind_fixed_string::<32>();

    let hello = FixedString::<32>::try_from("HELLO").unwrap();
    let hellx = FixedString::<32>::try_from("HELLX").unwrap();
    let hi = FixedString::<32>::try_from("HI").unwrap();

    let delta = write_delta(&registry, &hellx, &hello);
    assert_eq!(delta[0], 0, "delta form expected");
    assert_eq!(delta_roundtrip(&registry, &hellx, &hello), hellx);

    let shortened = delta_roundtrip(&registry, &hi, &hello);
    assert_eq!(shortened.len(), 2);
    assert_eq!(shortened.as_str(), Some("HI"));
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Heading {
    degrees: u16,
}

#[test]
fn unregistered_type_fails_until_callbacks_registered() {
    let mut registry = StrategyRegistry::with_defaults();
    let value = Heading { degrees: 270 };

    let mut buf = [0u8; 16];
    let err = registry
        .write(&mut BitWriter::new(&mut buf), &value)
        .unwrap_err();
    match &err {
        CodecError::MissingStrategy { type_name } => assert!(type_name.contains("Heading")),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().contains("Heading"));

    registry.register_user(UserCallbacks::new(
        |writer: &mut BitWriter<'_>, value: &Heading| {
            writer.write_u16_aligned(value.degrees)?;
            Ok(())
        },
        |reader: &mut BitReader<'_>, value: &mut Heading| {
            value.degrees = reader.read_u16_aligned()?;
            Ok(())
        },
        Heading::clone,
    ));

    let bytes = write_full(&registry, &value);
    let mut reader = BitReader::new(&bytes);
    assert_eq!(registry.decode::<Heading>(&mut reader).unwrap(), value);
    assert_eq!(registry.duplicate(&value).unwrap(), value);
}

#[test]
fn optimized_mode_reports_pass_through_once() {
    let mut registry = StrategyRegistry::with_defaults();
    registry.bind_sequence::<u32>();
    registry.mode().set_topology(Topology::DistributedAuthority);

    let value = vec![3u32, 1, 4];
    for _ in 0..3 {
        let bytes = write_full(&registry, &value);
        let mut reader = BitReader::new(&bytes);
        assert_eq!(registry.decode::<Vec<u32>>(&mut reader).unwrap(), value);
    }
    // u32 elements have a specialized path, the sequence itself does not
    assert_eq!(registry.mode().diagnostics_emitted(), 1);
}

#[test]
fn optimized_mode_map_delta_roundtrips_and_reports_once() {
    let mut registry = StrategyRegistry::with_defaults();
    registry.bind_map::<u8, u32>();

    let previous: HashMap<u8, u32> = HashMap::from([(1, 10), (2, 20), (3, 30)]);
    let current: HashMap<u8, u32> = HashMap::from([(1, 10), (2, 21), (3, 30)]);
    let standard = write_delta(&registry, &current, &previous);

    registry.mode().set_topology(Topology::DistributedAuthority);
    for _ in 0..3 {
        let optimized = write_delta(&registry, &current, &previous);
        // tag, added 0, removed 0, changed 1, key 2, value 21
        assert_eq!(optimized, vec![0, 0, 0, 1, 2, 21]);
        assert_eq!(optimized, standard);
        assert_eq!(delta_roundtrip(&registry, &current, &previous), current);
    }
    // key and value scalars have a specialized path, the map does not
    assert_eq!(registry.mode().diagnostics_emitted(), 1);
}

#[test]
fn optimized_and_standard_paths_share_wire_format() {
    let mut registry = StrategyRegistry::with_defaults();
    registry.bind_sequence::<i64>();
    let value = vec![-1i64, 0, i64::MAX];

    let standard = write_full(&registry, &value);
    registry.mode().set_topology(Topology::DistributedAuthority);
    let optimized = write_full(&registry, &value);
    assert_eq!(standard, optimized);
}

#[test]
fn delta_fallback_matches_full_encoding() {
    let registry = StrategyRegistry::with_defaults();
    let full = write_full(&registry, &"replicated".to_string());
    let delta = write_delta(&registry, &"replicated".to_string(), &String::new());
    assert_eq!(full, delta);
}

#[test]
fn nested_containers_resolve_late() {
    let mut registry = StrategyRegistry::with_limits(CodecLimits::for_testing());
    registry.bind_sequence::<Option<String>>();
    registry.bind_defaults();
    registry.bind_optional::<String>();

    let previous = vec![Some("a".to_string()), None, Some("c".to_string())];
    let current = vec![Some("a".to_string()), Some("b".to_string()), Some("c".to_string())];
    assert_eq!(delta_roundtrip(&registry, &current, &previous), current);
}

#[test]
fn oversized_collection_is_rejected_on_read() {
    let mut sender = StrategyRegistry::with_limits(CodecLimits::unlimited());
    sender.bind_defaults().bind_sequence::<u8>();
    let bytes = write_full(&sender, &vec![7u8; 100]);

    let mut receiver = StrategyRegistry::with_limits(CodecLimits::for_testing());
    receiver.bind_defaults().bind_sequence::<u8>();
    let mut reader = BitReader::new(&bytes);
    let err = receiver.decode::<Vec<u8>>(&mut reader).unwrap_err();
    assert!(matches!(err, CodecError::LimitsExceeded { actual: 100, .. }));
}
