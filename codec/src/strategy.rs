//! Serializer and equality strategy contracts.

use bitstream::{BitReader, BitWriter};

use crate::error::{CodecError, CodecResult, LimitKind, TagKind};
use crate::registry::StrategyRegistry;
use crate::types::TypeTag;

/// Per-category serializer bound to one concrete type.
///
/// Every operation receives the registry it was resolved from, so container
/// strategies dispatch their elements through the registry at call time and
/// pick up the element's current binding and the current mode.
///
/// The `*_optimized` entry points are used in distributed-authority mode.
/// Their defaults pass through to the standard entry points, so a strategy
/// without a specialized path still works in either mode. Override them
/// together with [`Strategy::is_optimized`].
pub trait Strategy<T>: Send + Sync {
    /// Category tag written by [`StrategyRegistry::write_tagged`].
    fn type_tag(&self) -> TypeTag;

    /// Whether the optimized entry points are specialized rather than pass-through.
    fn is_optimized(&self) -> bool {
        false
    }

    /// Writes a full, self-contained encoding of `value`.
    fn write(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &T,
    ) -> CodecResult<()>;

    /// Decodes a full encoding into `value`, reusing its storage where possible.
    fn read(
        &self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut T,
    ) -> CodecResult<()>;

    /// Writes the difference between `value` and `previous`.
    ///
    /// Strategies without a delta algorithm write the full encoding.
    fn write_delta(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &T,
        previous: &T,
    ) -> CodecResult<()> {
        let _ = previous;
        self.write(registry, writer, value)
    }

    /// Applies an encoding produced by [`Strategy::write_delta`] to `value`.
    fn read_delta(
        &self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut T,
    ) -> CodecResult<()> {
        self.read(registry, reader, value)
    }

    /// Returns a copy of `value` that shares no mutable storage with it.
    fn duplicate(&self, registry: &StrategyRegistry, value: &T) -> CodecResult<T>;

    fn write_optimized(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &T,
    ) -> CodecResult<()> {
        self.write(registry, writer, value)
    }

    fn read_optimized(
        &self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut T,
    ) -> CodecResult<()> {
        self.read(registry, reader, value)
    }

    fn write_delta_optimized(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &T,
        previous: &T,
    ) -> CodecResult<()> {
        self.write_delta(registry, writer, value, previous)
    }

    fn duplicate_optimized(&self, registry: &StrategyRegistry, value: &T) -> CodecResult<T> {
        self.duplicate(registry, value)
    }

    fn read_delta_optimized(
        &self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut T,
    ) -> CodecResult<()> {
        self.read_delta(registry, reader, value)
    }
}

/// Per-category sameness test used for change detection.
pub trait Equality<T>: Send + Sync {
    fn are_equal(&self, registry: &StrategyRegistry, a: &T, b: &T) -> bool;
}

/// Which representation a delta payload carries.
///
/// Written as the first byte of every tagged delta: `1` is a full encoding,
/// `0` is an incremental one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaForm {
    Full,
    Delta,
}

impl DeltaForm {
    const FULL: u8 = 1;
    const DELTA: u8 = 0;

    pub fn write(self, writer: &mut BitWriter<'_>) -> CodecResult<()> {
        let raw = match self {
            Self::Full => Self::FULL,
            Self::Delta => Self::DELTA,
        };
        writer.write_u8_aligned(raw)?;
        Ok(())
    }

    pub fn read(reader: &mut BitReader<'_>) -> CodecResult<Self> {
        match reader.read_u8_aligned()? {
            Self::FULL => Ok(Self::Full),
            Self::DELTA => Ok(Self::Delta),
            found => Err(CodecError::InvalidTag {
                kind: TagKind::DeltaForm,
                found,
            }),
        }
    }
}

/// Writes a collection or text length as a varint, checked against the limits.
pub(crate) fn write_len(
    registry: &StrategyRegistry,
    writer: &mut BitWriter<'_>,
    kind: LimitKind,
    len: usize,
) -> CodecResult<()> {
    registry.limits().check(kind, len)?;
    let len = u32::try_from(len).map_err(|_| CodecError::LimitsExceeded {
        kind,
        limit: u32::MAX as usize,
        actual: len,
    })?;
    writer.write_varu32(len)?;
    Ok(())
}

/// Reads a length written by [`write_len`], rejecting values above the limits.
pub(crate) fn read_len(
    registry: &StrategyRegistry,
    reader: &mut BitReader<'_>,
    kind: LimitKind,
) -> CodecResult<usize> {
    let len = reader.read_varu32()? as usize;
    registry.limits().check(kind, len)?;
    Ok(len)
}
