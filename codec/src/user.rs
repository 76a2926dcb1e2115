//! User callbacks and the fallback strategy for unclassified types.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use bitstream::{BitReader, BitWriter};

use crate::error::{CodecError, CodecResult};
use crate::registry::StrategyRegistry;
use crate::strategy::{DeltaForm, Strategy};
use crate::types::TypeTag;

type WriteFn<T> = Arc<dyn Fn(&mut BitWriter<'_>, &T) -> CodecResult<()> + Send + Sync>;
type ReadFn<T> = Arc<dyn Fn(&mut BitReader<'_>, &mut T) -> CodecResult<()> + Send + Sync>;
type DuplicateFn<T> = Arc<dyn Fn(&T) -> T + Send + Sync>;
type WriteDeltaFn<T> =
    Arc<dyn Fn(&mut BitWriter<'_>, &T, &T) -> CodecResult<()> + Send + Sync>;
type EqualsFn<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Manually registered serialization callbacks for one type.
///
/// Write, read and duplicate are required. Delta callbacks are optional and
/// only used when both are present; otherwise delta operations send the full
/// encoding. Without an `equals` callback every comparison reports a change.
pub struct UserCallbacks<T> {
    write: WriteFn<T>,
    read: ReadFn<T>,
    duplicate: DuplicateFn<T>,
    delta: Option<(WriteDeltaFn<T>, ReadFn<T>)>,
    equals: Option<EqualsFn<T>>,
}

impl<T> UserCallbacks<T> {
    pub fn new<W, R, D>(write: W, read: R, duplicate: D) -> Self
    where
        W: Fn(&mut BitWriter<'_>, &T) -> CodecResult<()> + Send + Sync + 'static,
        R: Fn(&mut BitReader<'_>, &mut T) -> CodecResult<()> + Send + Sync + 'static,
        D: Fn(&T) -> T + Send + Sync + 'static,
    {
        Self {
            write: Arc::new(write),
            read: Arc::new(read),
            duplicate: Arc::new(duplicate),
            delta: None,
            equals: None,
        }
    }

    /// Adds delta callbacks. `write_delta` receives the value and the previous value.
    #[must_use]
    pub fn with_delta<W, R>(mut self, write_delta: W, read_delta: R) -> Self
    where
        W: Fn(&mut BitWriter<'_>, &T, &T) -> CodecResult<()> + Send + Sync + 'static,
        R: Fn(&mut BitReader<'_>, &mut T) -> CodecResult<()> + Send + Sync + 'static,
    {
        self.delta = Some((Arc::new(write_delta), Arc::new(read_delta)));
        self
    }

    #[must_use]
    pub fn with_equals<E>(mut self, equals: E) -> Self
    where
        E: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        self.equals = Some(Arc::new(equals));
        self
    }

    #[must_use]
    pub const fn has_delta(&self) -> bool {
        self.delta.is_some()
    }

    pub(crate) fn equals(&self, a: &T, b: &T) -> Option<bool> {
        self.equals.as_ref().map(|equals| equals(a, b))
    }
}

impl<T> Clone for UserCallbacks<T> {
    fn clone(&self) -> Self {
        Self {
            write: Arc::clone(&self.write),
            read: Arc::clone(&self.read),
            duplicate: Arc::clone(&self.duplicate),
            delta: self.delta.clone(),
            equals: self.equals.clone(),
        }
    }
}

impl<T> fmt::Debug for UserCallbacks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCallbacks")
            .field("has_delta", &self.delta.is_some())
            .field("has_equals", &self.equals.is_some())
            .finish_non_exhaustive()
    }
}

/// Writes a tagged delta using the registered user delta callbacks, or a
/// tagged full encoding produced by `full` when none are registered.
pub(crate) fn write_user_delta<T, F>(
    registry: &StrategyRegistry,
    writer: &mut BitWriter<'_>,
    value: &T,
    previous: &T,
    full: F,
) -> CodecResult<()>
where
    T: 'static,
    F: FnOnce(&mut BitWriter<'_>) -> CodecResult<()>,
{
    match registry
        .user_callbacks::<T>()
        .and_then(|callbacks| callbacks.delta.as_ref())
    {
        Some((write_delta, _)) => {
            DeltaForm::Delta.write(writer)?;
            write_delta(writer, value, previous)
        }
        None => {
            DeltaForm::Full.write(writer)?;
            full(writer)
        }
    }
}

/// Reads a payload written by [`write_user_delta`].
pub(crate) fn read_user_delta<T, F>(
    registry: &StrategyRegistry,
    reader: &mut BitReader<'_>,
    value: &mut T,
    full: F,
) -> CodecResult<()>
where
    T: 'static,
    F: FnOnce(&mut BitReader<'_>, &mut T) -> CodecResult<()>,
{
    match DeltaForm::read(reader)? {
        DeltaForm::Full => full(reader, value),
        DeltaForm::Delta => {
            let (_, read_delta) = registry
                .user_callbacks::<T>()
                .and_then(|callbacks| callbacks.delta.as_ref())
                .ok_or(CodecError::MissingStrategy {
                    type_name: registry.type_name::<T>(),
                })?;
            read_delta(reader, value)
        }
    }
}

/// Strategy used for every type with no binding.
///
/// Looks up user callbacks when invoked, so callbacks registered after the
/// first resolution are still honored. With no callbacks every operation
/// fails with [`CodecError::MissingStrategy`].
#[derive(Debug)]
pub struct FallbackStrategy<T>(PhantomData<fn() -> T>);

impl<T> FallbackStrategy<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for FallbackStrategy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> FallbackStrategy<T> {
    fn callbacks<'r>(&self, registry: &'r StrategyRegistry) -> CodecResult<&'r UserCallbacks<T>> {
        registry
            .user_callbacks::<T>()
            .ok_or(CodecError::MissingStrategy {
                type_name: registry.type_name::<T>(),
            })
    }
}

impl<T: 'static> Strategy<T> for FallbackStrategy<T> {
    fn type_tag(&self) -> TypeTag {
        TypeTag::User
    }

    fn write(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &T,
    ) -> CodecResult<()> {
        (self.callbacks(registry)?.write)(writer, value)
    }

    fn read(
        &self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut T,
    ) -> CodecResult<()> {
        (self.callbacks(registry)?.read)(reader, value)
    }

    fn write_delta(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &T,
        previous: &T,
    ) -> CodecResult<()> {
        let write = Arc::clone(&self.callbacks(registry)?.write);
        write_user_delta(registry, writer, value, previous, |w| write(w, value))
    }

    fn read_delta(
        &self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut T,
    ) -> CodecResult<()> {
        let read = Arc::clone(&self.callbacks(registry)?.read);
        read_user_delta(registry, reader, value, |r, v| read(r, v))
    }

    fn duplicate(&self, registry: &StrategyRegistry, value: &T) -> CodecResult<T> {
        Ok((self.callbacks(registry)?.duplicate)(value))
    }
}
