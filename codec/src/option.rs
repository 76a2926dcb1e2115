//! Nullable values (`Option<T>`).

use std::marker::PhantomData;

use bitstream::{BitReader, BitWriter};

use crate::error::{CodecError, CodecResult, TagKind, ValueReason};
use crate::registry::StrategyRegistry;
use crate::strategy::{DeltaForm, Equality, Strategy};
use crate::types::TypeTag;

const ABSENT: u8 = 0;
const PRESENT: u8 = 1;

/// Strategy for `Option<T>`.
///
/// Full: `[presence][inner]`. Delta: a nested inner delta when both sides
/// are present, otherwise the full encoding, behind a full/delta tag.
#[derive(Debug)]
pub struct OptionStrategy<T>(PhantomData<fn() -> T>);

impl<T> OptionStrategy<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for OptionStrategy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default + 'static> Strategy<Option<T>> for OptionStrategy<T> {
    fn type_tag(&self) -> TypeTag {
        TypeTag::Optional
    }

    fn write(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &Option<T>,
    ) -> CodecResult<()> {
        match value {
            None => writer.write_u8_aligned(ABSENT)?,
            Some(inner) => {
                writer.write_u8_aligned(PRESENT)?;
                registry.write(writer, inner)?;
            }
        }
        Ok(())
    }

    fn read(
        &self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut Option<T>,
    ) -> CodecResult<()> {
        match reader.read_u8_aligned()? {
            ABSENT => *value = None,
            PRESENT => match value {
                Some(inner) => registry.read(reader, inner)?,
                None => *value = Some(registry.decode(reader)?),
            },
            found => {
                return Err(CodecError::InvalidTag {
                    kind: TagKind::Presence,
                    found,
                })
            }
        }
        Ok(())
    }

    fn write_delta(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &Option<T>,
        previous: &Option<T>,
    ) -> CodecResult<()> {
        if let (Some(inner), Some(old)) = (value, previous) {
            DeltaForm::Delta.write(writer)?;
            return registry.write_delta(writer, inner, old);
        }
        DeltaForm::Full.write(writer)?;
        self.write(registry, writer, value)
    }

    fn read_delta(
        &self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut Option<T>,
    ) -> CodecResult<()> {
        match DeltaForm::read(reader)? {
            DeltaForm::Full => self.read(registry, reader, value),
            DeltaForm::Delta => {
                let inner = value.as_mut().ok_or(CodecError::InvalidValue {
                    type_name: registry.type_name::<Option<T>>(),
                    reason: ValueReason::MissingDeltaBaseline,
                })?;
                registry.read_delta(reader, inner)
            }
        }
    }

    fn duplicate(&self, registry: &StrategyRegistry, value: &Option<T>) -> CodecResult<Option<T>> {
        value
            .as_ref()
            .map(|inner| registry.duplicate(inner))
            .transpose()
    }
}

/// Both absent is equal; one absent is unequal; otherwise the inner binding decides.
#[derive(Debug)]
pub struct OptionEquality<T>(PhantomData<fn() -> T>);

impl<T> OptionEquality<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for OptionEquality<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Equality<Option<T>> for OptionEquality<T> {
    fn are_equal(&self, registry: &StrategyRegistry, a: &Option<T>, b: &Option<T>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(left), Some(right)) => registry.are_equal(left, right),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> StrategyRegistry {
        let mut registry = StrategyRegistry::with_defaults();
        registry
            .bind_sequence::<u32>()
            .bind_optional::<Vec<u32>>()
            .bind_optional::<u32>();
        registry
    }

    fn delta_apply<T: 'static>(registry: &StrategyRegistry, value: &T, receiver: &mut T, previous: &T) -> u8 {
        let mut buf = [0u8; 256];
        let mut writer = BitWriter::new(&mut buf);
        registry.write_delta(&mut writer, value, previous).unwrap();
        let used = writer.finish();
        registry
            .read_delta(&mut BitReader::new(&buf[..used]), receiver)
            .unwrap();
        buf[0]
    }

    #[test]
    fn presence_transitions_are_full() {
        let registry = registry();
        let mut receiver: Option<u32> = None;
        assert_eq!(delta_apply(&registry, &Some(4), &mut receiver, &None), 1);
        assert_eq!(receiver, Some(4));
        assert_eq!(delta_apply(&registry, &None, &mut receiver, &Some(4)), 1);
        assert_eq!(receiver, None);
    }

    #[test]
    fn present_on_both_sides_nests_inner_delta() {
        let registry = registry();
        let previous: Option<Vec<u32>> = Some((0..10).collect());
        let mut value = previous.clone();
        if let Some(items) = value.as_mut() {
            items[0] = 77;
        }
        let mut receiver = previous.clone();
        assert_eq!(delta_apply(&registry, &value, &mut receiver, &previous), 0);
        assert_eq!(receiver, value);
    }

    #[test]
    fn equality_is_symmetric_on_absence() {
        let registry = registry();
        assert!(registry.are_equal::<Option<u32>>(&None, &None));
        assert!(!registry.are_equal(&Some(1u32), &None));
        assert!(!registry.are_equal(&None, &Some(1u32)));
        assert!(registry.are_equal(&Some(1u32), &Some(1)));
    }

    #[test]
    fn invalid_presence_byte() {
        let registry = registry();
        let mut out: Option<u32> = None;
        let err = registry
            .read(&mut BitReader::new(&[9]), &mut out)
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidTag {
                kind: TagKind::Presence,
                found: 9
            }
        );
    }

    #[test]
    fn delta_into_absent_value_is_rejected() {
        let registry = registry();
        let mut out: Option<u32> = None;
        let err = registry
            .read_delta(&mut BitReader::new(&[0, 5]), &mut out)
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidValue {
                reason: ValueReason::MissingDeltaBaseline,
                ..
            }
        ));
    }
}
