//! Shared references (`Arc<T>`).

use std::marker::PhantomData;
use std::sync::Arc;

use bitstream::{BitReader, BitWriter};

use crate::error::CodecResult;
use crate::registry::StrategyRegistry;
use crate::strategy::Strategy;
use crate::types::TypeTag;

/// Strategy for `Arc<T>`, encoded as the pointee.
///
/// Reads decode in place when the handle is the only owner and otherwise
/// swap in a fresh allocation, so a baseline sharing the old allocation is
/// never altered. Duplicates share the allocation for the same reason, which
/// keeps them equal under [`IdentityEquality`](crate::IdentityEquality).
#[derive(Debug)]
pub struct SharedStrategy<T>(PhantomData<fn() -> T>);

impl<T> SharedStrategy<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for SharedStrategy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default + 'static> Strategy<Arc<T>> for SharedStrategy<T> {
    fn type_tag(&self) -> TypeTag {
        TypeTag::Shared
    }

    fn write(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &Arc<T>,
    ) -> CodecResult<()> {
        registry.write::<T>(writer, value)
    }

    fn read(
        &self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut Arc<T>,
    ) -> CodecResult<()> {
        match Arc::get_mut(value) {
            Some(inner) => registry.read(reader, inner),
            None => {
                *value = Arc::new(registry.decode(reader)?);
                Ok(())
            }
        }
    }

    fn duplicate(&self, _registry: &StrategyRegistry, value: &Arc<T>) -> CodecResult<Arc<T>> {
        Ok(Arc::clone(value))
    }
}
