//! General-purpose equality strategies.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::registry::StrategyRegistry;
use crate::strategy::Equality;

/// Defers to the type's own `PartialEq`.
#[derive(Debug)]
pub struct DelegatedEquality<T>(PhantomData<fn() -> T>);

impl<T> DelegatedEquality<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for DelegatedEquality<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> Equality<T> for DelegatedEquality<T> {
    fn are_equal(&self, _registry: &StrategyRegistry, a: &T, b: &T) -> bool {
        a == b
    }
}

/// Pointer identity for shared references.
///
/// Two handles are equal only when they point at the same allocation, even if
/// the pointees compare equal.
#[derive(Debug)]
pub struct IdentityEquality<T>(PhantomData<fn() -> T>);

impl<T> IdentityEquality<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for IdentityEquality<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Equality<Arc<T>> for IdentityEquality<T> {
    fn are_equal(&self, _registry: &StrategyRegistry, a: &Arc<T>, b: &Arc<T>) -> bool {
        Arc::ptr_eq(a, b)
    }
}
