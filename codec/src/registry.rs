//! Type strategy registry and dispatch entry points.

use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use bitstream::{BitReader, BitWriter};

use crate::blittable::{Blittable, BlittableStrategy, BytewiseEquality};
use crate::custom::{CustomStrategy, NetworkSerializable, UnmanagedCustomStrategy};
use crate::equality::{DelegatedEquality, IdentityEquality};
use crate::error::{CodecError, CodecResult};
use crate::limits::CodecLimits;
use crate::map::{MapEquality, MapStrategy};
use crate::mode::ModeSelector;
use crate::option::{OptionEquality, OptionStrategy};
use crate::scalar::{PackedScalar, ScalarStrategy};
use crate::sequence::{SequenceEquality, SequenceStrategy};
use crate::set::{SetEquality, SetStrategy};
use crate::shared::SharedStrategy;
use crate::strategy::{Equality, Strategy};
use crate::text::{FixedString, FixedStringStrategy, TextStrategy};
use crate::user::{FallbackStrategy, UserCallbacks};

/// The serializer and equality pair bound to one type.
struct Entry<T> {
    serializer: Arc<dyn Strategy<T>>,
    equality: Arc<dyn Equality<T>>,
}

struct Binding {
    type_name: &'static str,
    entry: Box<dyn Any + Send + Sync>,
}

/// Table binding each concrete type to its active strategy pair.
///
/// Binding takes `&mut self` and codec calls take `&self`, so all bindings
/// are in place before the registry is shared with replication code. A type
/// without a binding resolves to [`FallbackStrategy`], which defers to user
/// callbacks registered with [`StrategyRegistry::register_user`].
///
/// Container strategies dispatch their elements back through the registry,
/// so an element type must be bound (or have user callbacks) before its
/// container is used, but not necessarily before the container is bound.
pub struct StrategyRegistry {
    bindings: HashMap<TypeId, Binding>,
    user: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    limits: CodecLimits,
    mode: ModeSelector,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bound: Vec<_> = self.bindings.values().map(|b| b.type_name).collect();
        bound.sort_unstable();
        f.debug_struct("StrategyRegistry")
            .field("bound", &bound)
            .field("user_callbacks", &self.user.len())
            .field("limits", &self.limits)
            .field("mode", &self.mode)
            .finish()
    }
}

impl StrategyRegistry {
    /// Creates an empty registry with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(CodecLimits::default())
    }

    #[must_use]
    pub fn with_limits(limits: CodecLimits) -> Self {
        Self {
            bindings: HashMap::new(),
            user: HashMap::new(),
            limits,
            mode: ModeSelector::default(),
        }
    }

    /// Creates a registry with every primitive scalar, `f32`, `f64` and
    /// `String` bound.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.bind_defaults();
        registry
    }

    /// Binds every primitive scalar, `f32`, `f64` and `String`.
    pub fn bind_defaults(&mut self) -> &mut Self {
        self.bind_scalar::<bool>()
            .bind_scalar::<u8>()
            .bind_scalar::<u16>()
            .bind_scalar::<u32>()
            .bind_scalar::<u64>()
            .bind_scalar::<i8>()
            .bind_scalar::<i16>()
            .bind_scalar::<i32>()
            .bind_scalar::<i64>()
            .bind_scalar::<char>()
            .bind_blittable::<f32>()
            .bind_blittable::<f64>()
            .bind_text()
    }

    #[must_use]
    pub const fn limits(&self) -> &CodecLimits {
        &self.limits
    }

    pub fn set_limits(&mut self, limits: CodecLimits) {
        self.limits = limits;
    }

    #[must_use]
    pub const fn mode(&self) -> &ModeSelector {
        &self.mode
    }

    /// Binds `serializer` and `equality` to `T`, replacing any previous binding.
    pub fn bind<T, S, E>(&mut self, serializer: S, equality: E) -> &mut Self
    where
        T: 'static,
        S: Strategy<T> + 'static,
        E: Equality<T> + 'static,
    {
        let entry: Entry<T> = Entry {
            serializer: Arc::new(serializer),
            equality: Arc::new(equality),
        };
        let type_name = type_name::<T>();
        let previous = self.bindings.insert(
            TypeId::of::<T>(),
            Binding {
                type_name,
                entry: Box::new(entry),
            },
        );
        tracing::debug!(
            type_name,
            rebound = previous.is_some(),
            "bound replication strategy"
        );
        self
    }

    pub fn bind_scalar<T: PackedScalar>(&mut self) -> &mut Self {
        self.bind::<T, _, _>(ScalarStrategy::new(), DelegatedEquality::new())
    }

    pub fn bind_blittable<T: Blittable>(&mut self) -> &mut Self {
        self.bind::<T, _, _>(BlittableStrategy::new(), BytewiseEquality::new())
    }

    pub fn bind_text(&mut self) -> &mut Self {
        self.bind::<String, _, _>(TextStrategy, DelegatedEquality::new())
    }

    pub fn bind_fixed_string<const N: usize>(&mut self) -> &mut Self {
        self.bind::<FixedString<N>, _, _>(FixedStringStrategy, DelegatedEquality::new())
    }

    /// Binds `Option<T>`. `T` itself must be bound separately.
    pub fn bind_optional<T: Default + 'static>(&mut self) -> &mut Self {
        self.bind::<Option<T>, _, _>(OptionStrategy::new(), OptionEquality::new())
    }

    /// Binds `Arc<T>` with identity equality. `T` itself must be bound separately.
    pub fn bind_shared<T: Default + 'static>(&mut self) -> &mut Self {
        self.bind::<Arc<T>, _, _>(SharedStrategy::new(), IdentityEquality::new())
    }

    /// Binds `Vec<E>`. `E` itself must be bound separately.
    pub fn bind_sequence<E: Default + 'static>(&mut self) -> &mut Self {
        self.bind::<Vec<E>, _, _>(SequenceStrategy::new(), SequenceEquality::new())
    }

    /// Binds `HashSet<E>`. `E` itself must be bound separately.
    pub fn bind_set<E: Eq + Hash + Default + 'static>(&mut self) -> &mut Self {
        self.bind::<HashSet<E>, _, _>(SetStrategy::new(), SetEquality::new())
    }

    /// Binds `HashMap<K, V>`. `K` and `V` must be bound separately.
    pub fn bind_map<K, V>(&mut self) -> &mut Self
    where
        K: Eq + Hash + Default + 'static,
        V: Default + 'static,
    {
        self.bind::<HashMap<K, V>, _, _>(MapStrategy::new(), MapEquality::new())
    }

    /// Binds a type that serializes itself. Duplicates are made by a
    /// serialize/deserialize round trip.
    pub fn bind_custom<T>(&mut self) -> &mut Self
    where
        T: NetworkSerializable + Default + PartialEq + 'static,
    {
        self.bind::<T, _, _>(CustomStrategy::new(), DelegatedEquality::new())
    }

    /// Binds a self-contained type that serializes itself. Duplicates are
    /// plain copies.
    pub fn bind_custom_unmanaged<T>(&mut self) -> &mut Self
    where
        T: NetworkSerializable + Copy + PartialEq + 'static,
    {
        self.bind::<T, _, _>(UnmanagedCustomStrategy::new(), DelegatedEquality::new())
    }

    /// Registers manual callbacks for `T`, replacing earlier ones.
    ///
    /// Unbound types serialize through these callbacks. Custom strategies also
    /// consult them for delta callbacks.
    pub fn register_user<T: 'static>(&mut self, callbacks: UserCallbacks<T>) -> &mut Self {
        tracing::debug!(
            type_name = type_name::<T>(),
            has_delta = callbacks.has_delta(),
            "registered user serialization callbacks"
        );
        self.user.insert(TypeId::of::<T>(), Box::new(callbacks));
        self
    }

    /// Returns `true` if a strategy is bound for `T`.
    #[must_use]
    pub fn is_bound<T: 'static>(&self) -> bool {
        self.bindings.contains_key(&TypeId::of::<T>())
    }

    /// Returns the name used for `T` in diagnostics and errors.
    #[must_use]
    pub fn type_name<T: 'static>(&self) -> &'static str {
        self.bindings
            .get(&TypeId::of::<T>())
            .map_or_else(type_name::<T>, |binding| binding.type_name)
    }

    /// Returns the serializer for `T`, or a fallback strategy when unbound.
    #[must_use]
    pub fn resolve<T: 'static>(&self) -> Arc<dyn Strategy<T>> {
        self.entry::<T>().map_or_else(
            || Arc::new(FallbackStrategy::<T>::new()) as Arc<dyn Strategy<T>>,
            |entry| Arc::clone(&entry.serializer),
        )
    }

    pub(crate) fn user_callbacks<T: 'static>(&self) -> Option<&UserCallbacks<T>> {
        self.user
            .get(&TypeId::of::<T>())
            .and_then(|callbacks| callbacks.downcast_ref::<UserCallbacks<T>>())
    }

    /// Writes a full encoding of `value`.
    pub fn write<T: 'static>(&self, writer: &mut BitWriter<'_>, value: &T) -> CodecResult<()> {
        self.dispatch(|strategy: &dyn Strategy<T>| {
            if self.use_optimized(strategy) {
                strategy.write_optimized(self, writer, value)
            } else {
                strategy.write(self, writer, value)
            }
        })
    }

    /// Decodes a full encoding into `value`.
    pub fn read<T: 'static>(&self, reader: &mut BitReader<'_>, value: &mut T) -> CodecResult<()> {
        self.dispatch(|strategy: &dyn Strategy<T>| {
            if self.use_optimized(strategy) {
                strategy.read_optimized(self, reader, value)
            } else {
                strategy.read(self, reader, value)
            }
        })
    }

    /// Decodes a full encoding into a fresh value.
    pub fn decode<T: Default + 'static>(&self, reader: &mut BitReader<'_>) -> CodecResult<T> {
        let mut value = T::default();
        self.read(reader, &mut value)?;
        Ok(value)
    }

    /// Writes the difference between `value` and `previous`.
    pub fn write_delta<T: 'static>(
        &self,
        writer: &mut BitWriter<'_>,
        value: &T,
        previous: &T,
    ) -> CodecResult<()> {
        self.dispatch(|strategy: &dyn Strategy<T>| {
            if self.use_optimized(strategy) {
                strategy.write_delta_optimized(self, writer, value, previous)
            } else {
                strategy.write_delta(self, writer, value, previous)
            }
        })
    }

    /// Applies a delta to `value`, which must equal the sender's previous value.
    pub fn read_delta<T: 'static>(
        &self,
        reader: &mut BitReader<'_>,
        value: &mut T,
    ) -> CodecResult<()> {
        self.dispatch(|strategy: &dyn Strategy<T>| {
            if self.use_optimized(strategy) {
                strategy.read_delta_optimized(self, reader, value)
            } else {
                strategy.read_delta(self, reader, value)
            }
        })
    }

    /// Returns an independent copy of `value`.
    pub fn duplicate<T: 'static>(&self, value: &T) -> CodecResult<T> {
        self.dispatch(|strategy: &dyn Strategy<T>| {
            if self.use_optimized(strategy) {
                strategy.duplicate_optimized(self, value)
            } else {
                strategy.duplicate(self, value)
            }
        })
    }

    /// Compares two values with the equality strategy bound to `T`.
    ///
    /// Unbound types use the registered `equals` callback and otherwise
    /// report a change.
    #[must_use]
    pub fn are_equal<T: 'static>(&self, a: &T, b: &T) -> bool {
        match self.entry::<T>() {
            Some(entry) => entry.equality.are_equal(self, a, b),
            None => self
                .user_callbacks::<T>()
                .and_then(|callbacks| callbacks.equals(a, b))
                .unwrap_or(false),
        }
    }

    /// Writes the strategy's type tag followed by a full encoding.
    pub fn write_tagged<T: 'static>(
        &self,
        writer: &mut BitWriter<'_>,
        value: &T,
    ) -> CodecResult<()> {
        let tag = self.dispatch(|strategy: &dyn Strategy<T>| strategy.type_tag());
        writer.write_u8_aligned(tag.as_u8())?;
        self.write(writer, value)
    }

    /// Reads a payload written by [`StrategyRegistry::write_tagged`].
    ///
    /// Fails with [`CodecError::TypeTagMismatch`] when the peer's strategy
    /// category differs from the local binding.
    pub fn read_tagged<T: 'static>(
        &self,
        reader: &mut BitReader<'_>,
        value: &mut T,
    ) -> CodecResult<()> {
        let expected = self.dispatch(|strategy: &dyn Strategy<T>| strategy.type_tag());
        let found = reader.read_u8_aligned()?;
        if found != expected.as_u8() {
            return Err(CodecError::TypeTagMismatch {
                type_name: self.type_name::<T>(),
                expected,
                found,
            });
        }
        self.read(reader, value)
    }

    fn entry<T: 'static>(&self) -> Option<&Entry<T>> {
        self.bindings
            .get(&TypeId::of::<T>())
            .and_then(|binding| binding.entry.downcast_ref::<Entry<T>>())
    }

    fn dispatch<T: 'static, R>(&self, f: impl FnOnce(&dyn Strategy<T>) -> R) -> R {
        match self.entry::<T>() {
            Some(entry) => f(entry.serializer.as_ref()),
            None => f(&FallbackStrategy::<T>::new()),
        }
    }

    /// Reads the mode flag and reports pass-through strategies in optimized mode.
    ///
    /// Unbound types without user callbacks are not reported; the call is
    /// about to fail with [`CodecError::MissingStrategy`].
    fn use_optimized<T: 'static>(&self, strategy: &dyn Strategy<T>) -> bool {
        if !self.mode.is_distributed_authority() {
            return false;
        }
        let serializable = self.is_bound::<T>() || self.user_callbacks::<T>().is_some();
        if serializable && !strategy.is_optimized() {
            self.mode
                .note_unoptimized(TypeId::of::<T>(), self.type_name::<T>());
        }
        true
    }
}
