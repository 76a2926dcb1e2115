//! Ordered sequences (`Vec<E>`).

use std::marker::PhantomData;

use bitstream::{BitReader, BitWriter};

use crate::change_set::ChangeBits;
use crate::error::{CodecError, CodecResult, LimitKind, ValueReason};
use crate::registry::StrategyRegistry;
use crate::strategy::{read_len, write_len, DeltaForm, Equality, Strategy};
use crate::types::TypeTag;

/// Strategy for `Vec<E>`, dispatching elements through the registry.
///
/// Full: `[count][element..]`.
///
/// Delta: `[tag][count][change bits][element..]`. The bit vector spans the new
/// count and flags every index whose element differs from the previous value,
/// plus every appended index. Flagged indices inside the previous length carry
/// a nested element delta, appended ones a full element. Truncation is implied
/// by the count. When at least nine in ten elements changed the full encoding
/// is sent instead.
#[derive(Debug)]
pub struct SequenceStrategy<E>(PhantomData<fn() -> E>);

impl<E> SequenceStrategy<E> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E> Default for SequenceStrategy<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Default + 'static> Strategy<Vec<E>> for SequenceStrategy<E> {
    fn type_tag(&self) -> TypeTag {
        TypeTag::Sequence
    }

    fn write(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &Vec<E>,
    ) -> CodecResult<()> {
        write_len(registry, writer, LimitKind::CollectionLen, value.len())?;
        for element in value {
            registry.write(writer, element)?;
        }
        Ok(())
    }

    fn read(
        &self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut Vec<E>,
    ) -> CodecResult<()> {
        let count = read_len(registry, reader, LimitKind::CollectionLen)?;
        value.truncate(count);
        for element in value.iter_mut() {
            registry.read(reader, element)?;
        }
        while value.len() < count {
            value.push(registry.decode(reader)?);
        }
        Ok(())
    }

    fn write_delta(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &Vec<E>,
        previous: &Vec<E>,
    ) -> CodecResult<()> {
        let changes = ChangeBits::from_fn(value.len(), |i| {
            previous
                .get(i)
                .map_or(true, |old| !registry.are_equal(&value[i], old))
        });

        // Same threshold as a 0.9 ratio, without floating point.
        if changes.count() * 10 >= value.len() * 9 {
            tracing::trace!(
                len = value.len(),
                changes = changes.count(),
                "sequence delta falls back to full"
            );
            DeltaForm::Full.write(writer)?;
            return self.write(registry, writer, value);
        }

        DeltaForm::Delta.write(writer)?;
        write_len(registry, writer, LimitKind::CollectionLen, value.len())?;
        changes.write(writer)?;
        for index in changes.iter_set() {
            match previous.get(index) {
                Some(old) => registry.write_delta(writer, &value[index], old)?,
                None => registry.write(writer, &value[index])?,
            }
        }
        Ok(())
    }

    fn read_delta(
        &self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut Vec<E>,
    ) -> CodecResult<()> {
        match DeltaForm::read(reader)? {
            DeltaForm::Full => self.read(registry, reader, value),
            DeltaForm::Delta => {
                let count = read_len(registry, reader, LimitKind::CollectionLen)?;
                let changes = ChangeBits::read(reader, count)?;
                value.truncate(count);
                for index in changes.iter_set() {
                    if index < value.len() {
                        registry.read_delta(reader, &mut value[index])?;
                    } else if index == value.len() {
                        value.push(registry.decode(reader)?);
                    } else {
                        return Err(CodecError::InvalidValue {
                            type_name: registry.type_name::<Vec<E>>(),
                            reason: ValueReason::DeltaIndexOutOfRange {
                                index,
                                len: value.len(),
                            },
                        });
                    }
                }
                if value.len() != count {
                    return Err(CodecError::InvalidValue {
                        type_name: registry.type_name::<Vec<E>>(),
                        reason: ValueReason::DeltaIndexOutOfRange {
                            index: count - 1,
                            len: value.len(),
                        },
                    });
                }
                Ok(())
            }
        }
    }

    fn duplicate(&self, registry: &StrategyRegistry, value: &Vec<E>) -> CodecResult<Vec<E>> {
        value
            .iter()
            .map(|element| registry.duplicate(element))
            .collect()
    }
}

/// Order-sensitive, element-wise equality.
#[derive(Debug)]
pub struct SequenceEquality<E>(PhantomData<fn() -> E>);

impl<E> SequenceEquality<E> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E> Default for SequenceEquality<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> Equality<Vec<E>> for SequenceEquality<E> {
    fn are_equal(&self, registry: &StrategyRegistry, a: &Vec<E>, b: &Vec<E>) -> bool {
        a.len() == b.len()
            && a.iter()
                .zip(b)
                .all(|(left, right)| registry.are_equal(left, right))
    }
}
