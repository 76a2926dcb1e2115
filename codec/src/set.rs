//! Unordered sets (`HashSet<E>`).

use std::collections::HashSet;
use std::hash::Hash;
use std::marker::PhantomData;

use bitstream::{BitReader, BitWriter};

use crate::error::{CodecResult, LimitKind};
use crate::registry::StrategyRegistry;
use crate::strategy::{read_len, write_len, DeltaForm, Equality, Strategy};
use crate::types::TypeTag;

/// Strategy for `HashSet<E>`.
///
/// Full: `[count][element..]` in iteration order.
/// Delta: `[tag][added count][added..][removed count][removed..]`, sent only
/// while fewer elements were added and removed than the set now holds.
#[derive(Debug)]
pub struct SetStrategy<E>(PhantomData<fn() -> E>);

impl<E> SetStrategy<E> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E> Default for SetStrategy<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn write_elements<'a, E: 'static>(
    registry: &StrategyRegistry,
    writer: &mut BitWriter<'_>,
    len: usize,
    elements: impl Iterator<Item = &'a E>,
) -> CodecResult<()> {
    write_len(registry, writer, LimitKind::CollectionLen, len)?;
    for element in elements {
        registry.write(writer, element)?;
    }
    Ok(())
}

impl<E: Eq + Hash + Default + 'static> Strategy<HashSet<E>> for SetStrategy<E> {
    fn type_tag(&self) -> TypeTag {
        TypeTag::Set
    }

    fn write(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &HashSet<E>,
    ) -> CodecResult<()> {
        write_elements(registry, writer, value.len(), value.iter())
    }

    fn read(
        &self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut HashSet<E>,
    ) -> CodecResult<()> {
        let count = read_len(registry, reader, LimitKind::CollectionLen)?;
        value.clear();
        // every element takes at least one byte
        value.reserve(count.min(reader.bytes_remaining()));
        for _ in 0..count {
            value.insert(registry.decode(reader)?);
        }
        Ok(())
    }

    fn write_delta(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &HashSet<E>,
        previous: &HashSet<E>,
    ) -> CodecResult<()> {
        let added: Vec<&E> = value.difference(previous).collect();
        let removed: Vec<&E> = previous.difference(value).collect();

        if added.len() + removed.len() >= value.len() {
            tracing::trace!(
                len = value.len(),
                added = added.len(),
                removed = removed.len(),
                "set delta falls back to full"
            );
            DeltaForm::Full.write(writer)?;
            return self.write(registry, writer, value);
        }

        DeltaForm::Delta.write(writer)?;
        write_elements(registry, writer, added.len(), added.into_iter())?;
        write_elements(registry, writer, removed.len(), removed.into_iter())
    }

    fn read_delta(
        &self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut HashSet<E>,
    ) -> CodecResult<()> {
        match DeltaForm::read(reader)? {
            DeltaForm::Full => self.read(registry, reader, value),
            DeltaForm::Delta => {
                let added = read_len(registry, reader, LimitKind::CollectionLen)?;
                for _ in 0..added {
                    value.insert(registry.decode(reader)?);
                }
                let removed = read_len(registry, reader, LimitKind::CollectionLen)?;
                for _ in 0..removed {
                    let element: E = registry.decode(reader)?;
                    value.remove(&element);
                }
                Ok(())
            }
        }
    }

    fn duplicate(
        &self,
        registry: &StrategyRegistry,
        value: &HashSet<E>,
    ) -> CodecResult<HashSet<E>> {
        value
            .iter()
            .map(|element| registry.duplicate(element))
            .collect()
    }
}

/// Order-independent equality: same count, then membership.
#[derive(Debug)]
pub struct SetEquality<E>(PhantomData<fn() -> E>);

impl<E> SetEquality<E> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E> Default for SetEquality<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Eq + Hash + 'static> Equality<HashSet<E>> for SetEquality<E> {
    fn are_equal(&self, _registry: &StrategyRegistry, a: &HashSet<E>, b: &HashSet<E>) -> bool {
        a.len() == b.len() && a.iter().all(|element| b.contains(element))
    }
}
