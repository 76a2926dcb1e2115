//! A replicated value paired with its baseline snapshot.

use bitstream::{BitReader, BitWriter};

use crate::error::{CodecError, CodecResult, TagKind};
use crate::frame::{read_framed, write_framed};
use crate::registry::StrategyRegistry;

const PAYLOAD_FULL: u8 = 1;
const PAYLOAD_DELTA: u8 = 0;

/// Owns a live value and the snapshot it was last synchronized from.
///
/// The sender writes a delta against the baseline when one exists and a full
/// payload otherwise, then calls [`ReplicatedSlot::commit`] once the payload
/// is sent. The receiver applies payloads to its live value and commits after
/// a successful apply. [`ReplicatedSlot::invalidate_baseline`] drops the
/// baseline so the next write resynchronizes with a full payload.
///
/// Wire form: `[kind][frame]`, where kind `1` is full and `0` is delta.
#[derive(Debug, Clone)]
pub struct ReplicatedSlot<T> {
    value: T,
    baseline: Option<T>,
}

impl<T: 'static> ReplicatedSlot<T> {
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            value,
            baseline: None,
        }
    }

    #[must_use]
    pub const fn value(&self) -> &T {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
    }

    #[must_use]
    pub const fn baseline(&self) -> Option<&T> {
        self.baseline.as_ref()
    }

    /// Returns `true` when the value differs from the baseline or no baseline exists.
    #[must_use]
    pub fn is_dirty(&self, registry: &StrategyRegistry) -> bool {
        self.baseline
            .as_ref()
            .map_or(true, |baseline| !registry.are_equal(&self.value, baseline))
    }

    /// Writes the value, as a delta against the baseline when there is one.
    ///
    /// Returns the frame body length.
    pub fn write(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
    ) -> CodecResult<usize> {
        match &self.baseline {
            Some(baseline) => {
                writer.write_u8_aligned(PAYLOAD_DELTA)?;
                write_framed(writer, registry.limits(), |w| {
                    registry.write_delta(w, &self.value, baseline)
                })
            }
            None => {
                writer.write_u8_aligned(PAYLOAD_FULL)?;
                write_framed(writer, registry.limits(), |w| registry.write(w, &self.value))
            }
        }
    }

    /// Applies a payload produced by [`ReplicatedSlot::write`] to the live value.
    pub fn apply(
        &mut self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
    ) -> CodecResult<()> {
        let value = &mut self.value;
        match reader.read_u8_aligned()? {
            PAYLOAD_FULL => read_framed(reader, registry.limits(), |r| registry.read(r, value)),
            PAYLOAD_DELTA => {
                read_framed(reader, registry.limits(), |r| registry.read_delta(r, value))
            }
            found => Err(CodecError::InvalidTag {
                kind: TagKind::SlotPayload,
                found,
            }),
        }
    }

    /// Snapshots the live value as the new baseline.
    pub fn commit(&mut self, registry: &StrategyRegistry) -> CodecResult<()> {
        self.baseline = Some(registry.duplicate(&self.value)?);
        Ok(())
    }

    /// Drops the baseline so the next write is a full payload.
    pub fn invalidate_baseline(&mut self) {
        if self.baseline.take().is_some() {
            tracing::debug!(
                type_name = std::any::type_name::<T>(),
                "baseline invalidated, next write is full"
            );
        }
    }
}
