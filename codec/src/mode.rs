//! Topology-driven entry-point selection.

use std::any::TypeId;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::types::Topology;

/// Process-wide switch between the standard and optimized entry points.
///
/// The flag is read on every codec call and never cached. When optimized mode
/// meets a strategy without a specialized path, the registry asks the
/// selector to report it; each type is reported at most once.
#[derive(Debug)]
pub struct ModeSelector {
    distributed_authority: AtomicBool,
    report_unoptimized: AtomicBool,
    reported: Mutex<HashSet<TypeId>>,
}

impl Default for ModeSelector {
    fn default() -> Self {
        Self::new(Topology::default())
    }
}

impl ModeSelector {
    #[must_use]
    pub fn new(topology: Topology) -> Self {
        Self {
            distributed_authority: AtomicBool::new(topology.is_distributed_authority()),
            report_unoptimized: AtomicBool::new(true),
            reported: Mutex::new(HashSet::new()),
        }
    }

    /// Returns the current topology.
    #[must_use]
    pub fn topology(&self) -> Topology {
        if self.is_distributed_authority() {
            Topology::DistributedAuthority
        } else {
            Topology::ClientServer
        }
    }

    pub fn set_topology(&self, topology: Topology) {
        self.distributed_authority
            .store(topology.is_distributed_authority(), Ordering::Release);
        tracing::debug!(?topology, "replication topology changed");
    }

    #[must_use]
    pub fn is_distributed_authority(&self) -> bool {
        self.distributed_authority.load(Ordering::Acquire)
    }

    /// Enables or silences the unoptimized-binding diagnostic.
    pub fn set_report_unoptimized(&self, enabled: bool) {
        self.report_unoptimized.store(enabled, Ordering::Relaxed);
    }

    /// Number of distinct types reported as lacking an optimized path.
    #[must_use]
    pub fn diagnostics_emitted(&self) -> usize {
        self.reported
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Records that `type_name` ran through a pass-through optimized entry point.
    ///
    /// Returns `true` when this call emitted the diagnostic.
    pub(crate) fn note_unoptimized(&self, type_id: TypeId, type_name: &'static str) -> bool {
        if !self.report_unoptimized.load(Ordering::Relaxed) {
            return false;
        }
        let first = self
            .reported
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(type_id);
        if first {
            tracing::warn!(
                type_name,
                "strategy for `{type_name}` has no distributed-authority optimized path; \
                 using the standard encoding"
            );
        }
        first
    }
}
