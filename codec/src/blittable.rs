//! Raw fixed-size encodings for plain-data values.

use std::marker::PhantomData;

use bitstream::{BitReader, BitWriter};

use crate::error::CodecResult;
use crate::registry::StrategyRegistry;
use crate::strategy::{Equality, Strategy};
use crate::types::TypeTag;

/// A plain-data value with a fixed byte image.
///
/// `store` must fill exactly `SIZE` bytes and `load` must accept any `SIZE`
/// bytes produced by `store`. The image is little-endian for numbers.
pub trait Blittable: Copy + 'static {
    const SIZE: usize;
    const TAG: TypeTag = TypeTag::Blittable;

    fn store(&self, out: &mut [u8]);

    fn load(bytes: &[u8]) -> Self;
}

macro_rules! blittable_number {
    ($($ty:ty $(=> $tag:ident)?),* $(,)?) => {
        $(
            impl Blittable for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();
                $(const TAG: TypeTag = TypeTag::$tag;)?

                fn store(&self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_le_bytes());
                }

                fn load(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    Self::from_le_bytes(raw)
                }
            }
        )*
    };
}

blittable_number!(
    f32 => F32,
    f64 => F64,
    u8,
    u16,
    u32,
    u64,
    i8,
    i16,
    i32,
    i64,
);

impl<B: Blittable, const N: usize> Blittable for [B; N] {
    const SIZE: usize = B::SIZE * N;

    fn store(&self, out: &mut [u8]) {
        for (item, chunk) in self.iter().zip(out.chunks_exact_mut(B::SIZE)) {
            item.store(chunk);
        }
    }

    fn load(bytes: &[u8]) -> Self {
        std::array::from_fn(|i| B::load(&bytes[i * B::SIZE..(i + 1) * B::SIZE]))
    }
}

/// Writes the value's byte image as a raw region. Duplicates are copies.
#[derive(Debug)]
pub struct BlittableStrategy<T>(PhantomData<fn() -> T>);

impl<T> BlittableStrategy<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for BlittableStrategy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Blittable> Strategy<T> for BlittableStrategy<T> {
    fn type_tag(&self) -> TypeTag {
        T::TAG
    }

    fn write(
        &self,
        _registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &T,
    ) -> CodecResult<()> {
        writer.write_region(T::SIZE, |region| value.store(region))?;
        Ok(())
    }

    fn read(
        &self,
        _registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut T,
    ) -> CodecResult<()> {
        *value = T::load(reader.read_bytes_aligned(T::SIZE)?);
        Ok(())
    }

    fn duplicate(&self, _registry: &StrategyRegistry, value: &T) -> CodecResult<T> {
        Ok(*value)
    }
}

const INLINE_IMAGE_BYTES: usize = 64;

/// Compares byte images, ignoring any `PartialEq` the type defines.
///
/// `NaN` images compare equal to themselves and `0.0` differs from `-0.0`.
#[derive(Debug)]
pub struct BytewiseEquality<T>(PhantomData<fn() -> T>);

impl<T> BytewiseEquality<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for BytewiseEquality<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Blittable> Equality<T> for BytewiseEquality<T> {
    fn are_equal(&self, _registry: &StrategyRegistry, a: &T, b: &T) -> bool {
        if T::SIZE <= INLINE_IMAGE_BYTES {
            let mut left = [0u8; INLINE_IMAGE_BYTES];
            let mut right = [0u8; INLINE_IMAGE_BYTES];
            a.store(&mut left[..T::SIZE]);
            b.store(&mut right[..T::SIZE]);
            left[..T::SIZE] == right[..T::SIZE]
        } else {
            let mut left = vec![0u8; T::SIZE];
            let mut right = vec![0u8; T::SIZE];
            a.store(&mut left);
            b.store(&mut right);
            left == right
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    struct Vec3 {
        x: f32,
        y: f32,
        z: f32,
    }

    impl Blittable for Vec3 {
        const SIZE: usize = 12;

        fn store(&self, out: &mut [u8]) {
            [self.x, self.y, self.z].store(out);
        }

        fn load(bytes: &[u8]) -> Self {
            let [x, y, z] = <[f32; 3]>::load(bytes);
            Self { x, y, z }
        }
    }

    #[test]
    fn struct_roundtrip_is_raw_region() {
        let registry = StrategyRegistry::new();
        let strategy = BlittableStrategy::<Vec3>::new();
        let value = Vec3 {
            x: 1.0,
            y: -2.5,
            z: 3.25,
        };

        let mut buf = [0u8; 32];
        let mut writer = BitWriter::new(&mut buf);
        strategy.write(&registry, &mut writer, &value).unwrap();
        assert_eq!(writer.finish(), 12);
        assert_eq!(&buf[..4], &1.0f32.to_le_bytes());

        let mut out = Vec3::default();
        strategy
            .read(&registry, &mut BitReader::new(&buf[..12]), &mut out)
            .unwrap();
        assert_eq!(out, value);
    }

    #[test]
    fn bytewise_equality_ignores_partial_eq() {
        let registry = StrategyRegistry::new();
        let eq = BytewiseEquality::<f32>::new();
        assert!(eq.are_equal(&registry, &f32::NAN, &f32::NAN));
        assert!(!eq.are_equal(&registry, &0.0, &-0.0));
        assert!(eq.are_equal(&registry, &1.5, &1.5));
    }

    #[test]
    fn large_images_compare_on_heap() {
        let registry = StrategyRegistry::new();
        let eq = BytewiseEquality::<[u64; 16]>::new();
        let a = [7u64; 16];
        let mut b = a;
        assert!(eq.are_equal(&registry, &a, &b));
        b[15] = 8;
        assert!(!eq.are_equal(&registry, &a, &b));
    }

    #[test]
    fn truncated_region_is_an_error() {
        let registry = StrategyRegistry::new();
        let mut out = 0.0f64;
        let result =
            BlittableStrategy::<f64>::new().read(&registry, &mut BitReader::new(&[0; 7]), &mut out);
        assert!(result.is_err());
    }

    #[test]
    fn float_tags() {
        assert_eq!(BlittableStrategy::<f32>::new().type_tag(), TypeTag::F32);
        assert_eq!(BlittableStrategy::<u16>::new().type_tag(), TypeTag::Blittable);
    }
}
