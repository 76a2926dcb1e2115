//! Packed encodings for fixed-width scalars.
//!
//! Integers are written as LEB128 varints, with signed values zigzag-mapped
//! first, so small magnitudes cost a single byte. `bool` is a one-byte 0/1
//! and `char` is a varint code point.

use std::marker::PhantomData;

use bitstream::{BitReader, BitWriter};

use crate::error::{CodecError, CodecResult, ValueReason};
use crate::registry::StrategyRegistry;
use crate::strategy::Strategy;
use crate::types::TypeTag;

/// A scalar with a compact variable-length encoding.
pub trait PackedScalar: Copy + PartialEq + Default + 'static {
    const TAG: TypeTag;

    fn pack(self, writer: &mut BitWriter<'_>) -> CodecResult<()>;

    fn unpack(reader: &mut BitReader<'_>) -> CodecResult<Self>;
}

macro_rules! packed_unsigned {
    ($($ty:ty => $tag:ident),* $(,)?) => {
        $(
            impl PackedScalar for $ty {
                const TAG: TypeTag = TypeTag::$tag;

                fn pack(self, writer: &mut BitWriter<'_>) -> CodecResult<()> {
                    writer.write_varu64(u64::from(self))?;
                    Ok(())
                }

                fn unpack(reader: &mut BitReader<'_>) -> CodecResult<Self> {
                    let raw = reader.read_varu64()?;
                    Self::try_from(raw).map_err(|_| CodecError::InvalidValue {
                        type_name: stringify!($ty),
                        reason: ValueReason::UnsignedOutOfRange { value: raw },
                    })
                }
            }
        )*
    };
}

macro_rules! packed_signed {
    ($($ty:ty => $tag:ident),* $(,)?) => {
        $(
            impl PackedScalar for $ty {
                const TAG: TypeTag = TypeTag::$tag;

                fn pack(self, writer: &mut BitWriter<'_>) -> CodecResult<()> {
                    writer.write_vars64(i64::from(self))?;
                    Ok(())
                }

                fn unpack(reader: &mut BitReader<'_>) -> CodecResult<Self> {
                    let raw = reader.read_vars64()?;
                    Self::try_from(raw).map_err(|_| CodecError::InvalidValue {
                        type_name: stringify!($ty),
                        reason: ValueReason::SignedOutOfRange { value: raw },
                    })
                }
            }
        )*
    };
}

packed_unsigned!(u8 => U8, u16 => U16, u32 => U32, u64 => U64);
packed_signed!(i8 => I8, i16 => I16, i32 => I32, i64 => I64);

impl PackedScalar for bool {
    const TAG: TypeTag = TypeTag::Bool;

    fn pack(self, writer: &mut BitWriter<'_>) -> CodecResult<()> {
        writer.write_u8_aligned(u8::from(self))?;
        Ok(())
    }

    fn unpack(reader: &mut BitReader<'_>) -> CodecResult<Self> {
        match reader.read_u8_aligned()? {
            0 => Ok(false),
            1 => Ok(true),
            found => Err(CodecError::InvalidValue {
                type_name: "bool",
                reason: ValueReason::InvalidBool {
                    found: u64::from(found),
                },
            }),
        }
    }
}

impl PackedScalar for char {
    const TAG: TypeTag = TypeTag::Char;

    fn pack(self, writer: &mut BitWriter<'_>) -> CodecResult<()> {
        writer.write_varu32(u32::from(self))?;
        Ok(())
    }

    fn unpack(reader: &mut BitReader<'_>) -> CodecResult<Self> {
        let raw = reader.read_varu32()?;
        Self::from_u32(raw).ok_or(CodecError::InvalidValue {
            type_name: "char",
            reason: ValueReason::InvalidChar { found: raw },
        })
    }
}

/// Strategy for [`PackedScalar`] types.
///
/// The packed form is already the compact form, so both entry-point families
/// share it and the strategy reports a specialized optimized path. A delta
/// of an atomic scalar is its full encoding.
#[derive(Debug)]
pub struct ScalarStrategy<T>(PhantomData<fn() -> T>);

impl<T> ScalarStrategy<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for ScalarStrategy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PackedScalar> Strategy<T> for ScalarStrategy<T> {
    fn type_tag(&self) -> TypeTag {
        T::TAG
    }

    fn is_optimized(&self) -> bool {
        true
    }

    fn write(
        &self,
        _registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &T,
    ) -> CodecResult<()> {
        value.pack(writer)
    }

    fn read(
        &self,
        _registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut T,
    ) -> CodecResult<()> {
        *value = T::unpack(reader)?;
        Ok(())
    }

    fn duplicate(&self, _registry: &StrategyRegistry, value: &T) -> CodecResult<T> {
        Ok(*value)
    }
}
