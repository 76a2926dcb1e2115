#![no_main]

use std::collections::{HashMap, HashSet};

use bitstream::BitReader;
use codec::{CodecLimits, FixedString, ReplicatedSlot, StrategyRegistry};
use libfuzzer_sys::fuzz_target;

fn registry() -> StrategyRegistry {
    let mut registry = StrategyRegistry::with_limits(CodecLimits::for_testing());
    registry
        .bind_defaults()
        .bind_sequence::<u32>()
        .bind_sequence::<String>()
        .bind_set::<i32>()
        .bind_map::<u16, Option<String>>()
        .bind_optional::<String>()
        .bind_fixed_string::<32>();
    registry
}

fuzz_target!(|data: &[u8]| {
    let registry = registry();

    let _ = registry.decode::<Vec<u32>>(&mut BitReader::new(data));
    let _ = registry.decode::<Vec<String>>(&mut BitReader::new(data));
    let _ = registry.decode::<HashSet<i32>>(&mut BitReader::new(data));
    let _ = registry.decode::<HashMap<u16, Option<String>>>(&mut BitReader::new(data));

    let mut sequence = vec![1u32, 2, 3, 4];
    let _ = registry.read_delta(&mut BitReader::new(data), &mut sequence);
    let mut map = HashMap::from([(1u16, Some("a".to_string())), (2, None)]);
    let _ = registry.read_delta(&mut BitReader::new(data), &mut map);
    let mut text = FixedString::<32>::try_from("HELLO").unwrap_or_default();
    let _ = registry.read_delta(&mut BitReader::new(data), &mut text);

    let mut slot = ReplicatedSlot::new(Vec::<String>::new());
    let mut reader = BitReader::new(data);
    while !reader.is_empty() {
        if slot.apply(&registry, &mut reader).is_err() {
            break;
        }
    }
});
