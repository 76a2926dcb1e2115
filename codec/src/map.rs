//! Key/value maps (`HashMap<K, V>`).

use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;

use bitstream::{BitReader, BitWriter};

use crate::error::{CodecError, CodecResult, LimitKind, ValueReason};
use crate::registry::StrategyRegistry;
use crate::strategy::{read_len, write_len, DeltaForm, Equality, Strategy};
use crate::types::TypeTag;

/// Strategy for `HashMap<K, V>`.
///
/// Full: `[count][(key, value)..]`.
///
/// Delta: `[tag][added count][(key, value)..][removed count][key..]
/// [changed count][(key, value delta)..]`. Added entries carry full values,
/// changed entries a nested value delta. Sent only while fewer entries were
/// touched than the map now holds.
#[derive(Debug)]
pub struct MapStrategy<K, V>(PhantomData<fn() -> (K, V)>);

impl<K, V> MapStrategy<K, V> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<K, V> Default for MapStrategy<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Strategy<HashMap<K, V>> for MapStrategy<K, V>
where
    K: Eq + Hash + Default + 'static,
    V: Default + 'static,
{
    fn type_tag(&self) -> TypeTag {
        TypeTag::Map
    }

    fn write(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &HashMap<K, V>,
    ) -> CodecResult<()> {
        write_len(registry, writer, LimitKind::CollectionLen, value.len())?;
        for (key, entry) in value {
            registry.write(writer, key)?;
            registry.write(writer, entry)?;
        }
        Ok(())
    }

    fn read(
        &self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut HashMap<K, V>,
    ) -> CodecResult<()> {
        let count = read_len(registry, reader, LimitKind::CollectionLen)?;
        value.clear();
        // every element takes at least one byte
        value.reserve(count.min(reader.bytes_remaining()));
        for _ in 0..count {
            let key: K = registry.decode(reader)?;
            let entry: V = registry.decode(reader)?;
            value.insert(key, entry);
        }
        Ok(())
    }

    fn write_delta(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &HashMap<K, V>,
        previous: &HashMap<K, V>,
    ) -> CodecResult<()> {
        let mut added = Vec::new();
        let mut changed = Vec::new();
        for (key, entry) in value {
            match previous.get(key) {
                None => added.push((key, entry)),
                Some(old) if !registry.are_equal(entry, old) => changed.push((key, entry, old)),
                Some(_) => {}
            }
        }
        let removed: Vec<&K> = previous.keys().filter(|key| !value.contains_key(*key)).collect();

        let touched = added.len() + removed.len() + changed.len();
        if touched >= value.len() {
            tracing::trace!(len = value.len(), touched, "map delta falls back to full");
            DeltaForm::Full.write(writer)?;
            return self.write(registry, writer, value);
        }

        DeltaForm::Delta.write(writer)?;
        write_len(registry, writer, LimitKind::CollectionLen, added.len())?;
        for (key, entry) in added {
            registry.write(writer, key)?;
            registry.write(writer, entry)?;
        }
        write_len(registry, writer, LimitKind::CollectionLen, removed.len())?;
        for key in removed {
            registry.write(writer, key)?;
        }
        write_len(registry, writer, LimitKind::CollectionLen, changed.len())?;
        for (key, entry, old) in changed {
            registry.write(writer, key)?;
            registry.write_delta(writer, entry, old)?;
        }
        Ok(())
    }

    fn read_delta(
        &self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut HashMap<K, V>,
    ) -> CodecResult<()> {
        match DeltaForm::read(reader)? {
            DeltaForm::Full => self.read(registry, reader, value),
            DeltaForm::Delta => {
                let added = read_len(registry, reader, LimitKind::CollectionLen)?;
                for _ in 0..added {
                    let key: K = registry.decode(reader)?;
                    let entry: V = registry.decode(reader)?;
                    value.insert(key, entry);
                }
                let removed = read_len(registry, reader, LimitKind::CollectionLen)?;
                for _ in 0..removed {
                    let key: K = registry.decode(reader)?;
                    value.remove(&key);
                }
                let changed = read_len(registry, reader, LimitKind::CollectionLen)?;
                for _ in 0..changed {
                    let key: K = registry.decode(reader)?;
                    let entry = value.get_mut(&key).ok_or(CodecError::InvalidValue {
                        type_name: registry.type_name::<HashMap<K, V>>(),
                        reason: ValueReason::UnknownDeltaKey,
                    })?;
                    registry.read_delta(reader, entry)?;
                }
                Ok(())
            }
        }
    }

    fn duplicate(
        &self,
        registry: &StrategyRegistry,
        value: &HashMap<K, V>,
    ) -> CodecResult<HashMap<K, V>> {
        value
            .iter()
            .map(|(key, entry)| -> CodecResult<(K, V)> {
                Ok((registry.duplicate(key)?, registry.duplicate(entry)?))
            })
            .collect()
    }
}

/// Same key set, and per-key value equality through the value type's binding.
#[derive(Debug)]
pub struct MapEquality<K, V>(PhantomData<fn() -> (K, V)>);

impl<K, V> MapEquality<K, V> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<K, V> Default for MapEquality<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Equality<HashMap<K, V>> for MapEquality<K, V>
where
    K: Eq + Hash + 'static,
    V: 'static,
{
    fn are_equal(
        &self,
        registry: &StrategyRegistry,
        a: &HashMap<K, V>,
        b: &HashMap<K, V>,
    ) -> bool {
        a.len() == b.len()
            && a.iter().all(|(key, entry)| {
                b.get(key)
                    .is_some_and(|other| registry.are_equal(entry, other))
            })
    }
}
