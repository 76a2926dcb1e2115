//! Types that serialize themselves.

use std::marker::PhantomData;

use bitstream::{BitError, BitReader, BitWriter};

use crate::error::{CodecError, CodecResult};
use crate::registry::StrategyRegistry;
use crate::strategy::Strategy;
use crate::types::TypeTag;
use crate::user::{read_user_delta, write_user_delta};

/// A type that writes and reads its own encoding.
///
/// Implementations typically encode their fields through the registry:
///
/// ```
/// use bitstream::{BitReader, BitWriter};
/// use codec::{CodecResult, NetworkSerializable, StrategyRegistry};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Player {
///     name: String,
///     score: u32,
/// }
///
/// impl NetworkSerializable for Player {
///     fn write_to(&self, registry: &StrategyRegistry, writer: &mut BitWriter<'_>) -> CodecResult<()> {
///         registry.write(writer, &self.name)?;
///         registry.write(writer, &self.score)
///     }
///
///     fn read_from(&mut self, registry: &StrategyRegistry, reader: &mut BitReader<'_>) -> CodecResult<()> {
///         registry.read(reader, &mut self.name)?;
///         registry.read(reader, &mut self.score)
///     }
/// }
///
/// let mut registry = StrategyRegistry::with_defaults();
/// registry.bind_custom::<Player>();
/// ```
pub trait NetworkSerializable {
    fn write_to(&self, registry: &StrategyRegistry, writer: &mut BitWriter<'_>)
        -> CodecResult<()>;

    fn read_from(
        &mut self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
    ) -> CodecResult<()>;
}

const DUPLICATE_SCRATCH_BYTES: usize = 256;

/// Strategy for managed [`NetworkSerializable`] types.
///
/// Duplicates are produced by encoding the value into scratch space and
/// decoding it into a fresh value. Delta uses user delta callbacks registered
/// for the type when present, and the full encoding otherwise.
#[derive(Debug)]
pub struct CustomStrategy<T>(PhantomData<fn() -> T>);

impl<T> CustomStrategy<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for CustomStrategy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: NetworkSerializable + Default + 'static> Strategy<T> for CustomStrategy<T> {
    fn type_tag(&self) -> TypeTag {
        TypeTag::Custom
    }

    fn write(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &T,
    ) -> CodecResult<()> {
        value.write_to(registry, writer)
    }

    fn read(
        &self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut T,
    ) -> CodecResult<()> {
        value.read_from(registry, reader)
    }

    fn write_delta(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &T,
        previous: &T,
    ) -> CodecResult<()> {
        write_user_delta(registry, writer, value, previous, |w| {
            value.write_to(registry, w)
        })
    }

    fn read_delta(
        &self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut T,
    ) -> CodecResult<()> {
        read_user_delta(registry, reader, value, |r, v| v.read_from(registry, r))
    }

    fn duplicate(&self, registry: &StrategyRegistry, value: &T) -> CodecResult<T> {
        let max = registry.limits().max_frame_bytes;
        let mut capacity = DUPLICATE_SCRATCH_BYTES.min(max);
        loop {
            let mut scratch = vec![0u8; capacity];
            let mut writer = BitWriter::new(&mut scratch);
            match value.write_to(registry, &mut writer) {
                Ok(()) => {
                    let used = writer.finish();
                    let mut copy = T::default();
                    copy.read_from(registry, &mut BitReader::new(&scratch[..used]))?;
                    return Ok(copy);
                }
                Err(CodecError::Bitstream(BitError::BufferOverflow { .. })) if capacity < max => {
                    capacity = capacity.saturating_mul(2).min(max);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Strategy for self-contained [`NetworkSerializable`] types.
///
/// The `Copy` bound guarantees the value owns no references, so a duplicate
/// is a plain copy.
#[derive(Debug)]
pub struct UnmanagedCustomStrategy<T>(PhantomData<fn() -> T>);

impl<T> UnmanagedCustomStrategy<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for UnmanagedCustomStrategy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: NetworkSerializable + Copy + 'static> Strategy<T> for UnmanagedCustomStrategy<T> {
    fn type_tag(&self) -> TypeTag {
        TypeTag::Custom
    }

    fn write(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &T,
    ) -> CodecResult<()> {
        value.write_to(registry, writer)
    }

    fn read(
        &self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut T,
    ) -> CodecResult<()> {
        value.read_from(registry, reader)
    }

    fn write_delta(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &T,
        previous: &T,
    ) -> CodecResult<()> {
        write_user_delta(registry, writer, value, previous, |w| {
            value.write_to(registry, w)
        })
    }

    fn read_delta(
        &self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut T,
    ) -> CodecResult<()> {
        read_user_delta(registry, reader, value, |r, v| v.read_from(registry, r))
    }

    fn duplicate(&self, _registry: &StrategyRegistry, value: &T) -> CodecResult<T> {
        Ok(*value)
    }
}
