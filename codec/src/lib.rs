//! Type-driven value replication codec.
//!
//! Every replicated type is bound in a [`StrategyRegistry`] to a serializer
//! and an equality comparator. The registry then writes, reads, deltas,
//! duplicates and compares values of that type without the caller knowing
//! how the type is encoded.
//!
//! # Features
//!
//! - Packed scalar, raw blittable and text encodings
//! - Element-wise deltas for sequences, sets, maps and fixed-capacity strings
//! - Optional and shared (`Arc`) wrappers
//! - Self-describing types through [`NetworkSerializable`]
//! - Callback registration for types the crate knows nothing about
//! - Per-topology selection between default and optimized entry points
//! - [`ReplicatedSlot`] for baseline tracking with full resync
//!
//! # Design Principles
//!
//! - **Bounded decoding** - Every length read from the wire is checked
//!   against [`CodecLimits`] before anything is allocated.
//! - **Late binding** - Containers resolve their element strategies at call
//!   time, so binding order does not matter.
//! - **Deterministic** - The same value and baseline produce the same bytes,
//!   except for `HashSet` and `HashMap`, which are written in iteration order.
//!
//! # Example
//!
//! ```
//! use bitstream::{BitReader, BitWriter};
//! use codec::StrategyRegistry;
//!
//! let mut registry = StrategyRegistry::with_defaults();
//! registry.bind_sequence::<u32>();
//!
//! let mut buf = [0u8; 64];
//! let mut writer = BitWriter::new(&mut buf);
//! registry.write(&mut writer, &vec![1u32, 2, 3]).unwrap();
//! let used = writer.finish();
//!
//! let mut reader = BitReader::new(&buf[..used]);
//! let decoded: Vec<u32> = registry.decode(&mut reader).unwrap();
//! assert_eq!(decoded, vec![1, 2, 3]);
//! ```

mod blittable;
mod change_set;
mod custom;
mod equality;
mod error;
mod frame;
mod limits;
mod map;
mod mode;
mod option;
mod registry;
mod scalar;
mod sequence;
mod set;
mod shared;
mod slot;
mod strategy;
mod text;
mod types;
mod user;

pub use blittable::{Blittable, BlittableStrategy, BytewiseEquality};
pub use custom::{CustomStrategy, NetworkSerializable, UnmanagedCustomStrategy};
pub use equality::{DelegatedEquality, IdentityEquality};
pub use error::{CodecError, CodecResult, LimitKind, TagKind, ValueReason};
pub use frame::{read_framed, skip_framed, write_framed};
pub use limits::CodecLimits;
pub use map::{MapEquality, MapStrategy};
pub use mode::ModeSelector;
pub use option::{OptionEquality, OptionStrategy};
pub use registry::StrategyRegistry;
pub use scalar::{PackedScalar, ScalarStrategy};
pub use sequence::{SequenceEquality, SequenceStrategy};
pub use set::{SetEquality, SetStrategy};
pub use shared::SharedStrategy;
pub use slot::ReplicatedSlot;
pub use strategy::{DeltaForm, Equality, Strategy};
pub use text::{FixedString, FixedStringStrategy, TextStrategy};
pub use types::{Topology, TypeTag};
pub use user::{FallbackStrategy, UserCallbacks};
