use std::collections::HashMap;

use bitstream::{BitReader, BitWriter};
use codec::{
    skip_framed, CodecLimits, CodecResult, NetworkSerializable, ReplicatedSlot, StrategyRegistry,
};

#[derive(Debug, Default, Clone, PartialEq)]
struct Inventory {
    owner: String,
    items: HashMap<u16, u32>,
    hotbar: Vec<u16>,
}

impl NetworkSerializable for Inventory {
    fn write_to(&self, registry: &StrategyRegistry, writer: &mut BitWriter<'_>) -> CodecResult<()> {
        registry.write(writer, &self.owner)?;
        registry.write(writer, &self.items)?;
        registry.write(writer, &self.hotbar)
    }

    fn read_from(
        &mut self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
    ) -> CodecResult<()> {
        registry.read(reader, &mut self.owner)?;
        registry.read(reader, &mut self.items)?;
        registry.read(reader, &mut self.hotbar)
    }
}

fn registry() -> StrategyRegistry {
    let mut registry = StrategyRegistry::with_limits(CodecLimits::for_testing());
    registry
        .bind_defaults()
        .bind_custom::<Inventory>()
        .bind_map::<u16, u32>()
        .bind_sequence::<u16>()
        .bind_sequence::<u32>();
    registry
}

fn transmit<T: 'static>(registry: &StrategyRegistry, slot: &ReplicatedSlot<T>) -> Vec<u8> {
    let mut buf = [0u8; 1024];
    let mut writer = BitWriter::new(&mut buf);
    slot.write(registry, &mut writer).unwrap();
    let used = writer.finish();
    buf[..used].to_vec()
}

#[test]
fn custom_value_replicates_across_ticks() {
    let registry = registry();
    let mut sender = ReplicatedSlot::new(Inventory {
        owner: "ada".into(),
        items: HashMap::from([(1, 10), (2, 3)]),
        hotbar: vec![1, 2],
    });
    let mut receiver = ReplicatedSlot::new(Inventory::default());

    for tick in 0..5u32 {
        if sender.is_dirty(&registry) {
            let bytes = transmit(&registry, &sender);
            receiver
                .apply(&registry, &mut BitReader::new(&bytes))
                .unwrap();
            sender.commit(&registry).unwrap();
            receiver.commit(&registry).unwrap();
        }
        assert_eq!(receiver.value(), sender.value());

        let inventory = sender.value_mut();
        inventory.items.insert(3, tick);
        inventory.hotbar.push(3);
    }
}

#[test]
fn lost_baseline_resyncs_with_full_payload() {
    let registry = registry();
    let mut sender = ReplicatedSlot::new(vec![1u32, 2, 3, 4]);
    let mut receiver = ReplicatedSlot::new(Vec::<u32>::new());

    let bytes = transmit(&registry, &sender);
    receiver
        .apply(&registry, &mut BitReader::new(&bytes))
        .unwrap();
    sender.commit(&registry).unwrap();
    receiver.commit(&registry).unwrap();

    // the receiver dropped a delta and reports it; the sender resyncs
    sender.value_mut()[0] = 100;
    let _lost = transmit(&registry, &sender);
    sender.commit(&registry).unwrap();
    sender.value_mut()[1] = 200;

    sender.invalidate_baseline();
    receiver.invalidate_baseline();
    let bytes = transmit(&registry, &sender);
    receiver
        .apply(&registry, &mut BitReader::new(&bytes))
        .unwrap();
    assert_eq!(receiver.value(), &vec![100, 200, 3, 4]);
}

#[test]
fn unknown_slots_can_be_skipped() {
    let registry = registry();
    let first = ReplicatedSlot::new(vec![9u16; 8]);
    let second = ReplicatedSlot::new("tail".to_string());

    let mut buf = [0u8; 256];
    let mut writer = BitWriter::new(&mut buf);
    first.write(&registry, &mut writer).unwrap();
    second.write(&registry, &mut writer).unwrap();
    let used = writer.finish();

    let mut reader = BitReader::new(&buf[..used]);
    assert_eq!(reader.read_u8_aligned().unwrap(), 1);
    skip_framed(&mut reader, registry.limits()).unwrap();

    let mut receiver = ReplicatedSlot::new(String::new());
    receiver.apply(&registry, &mut reader).unwrap();
    assert_eq!(receiver.value(), "tail");
    assert!(reader.is_empty());
}
