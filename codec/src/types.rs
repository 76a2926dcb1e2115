//! Core types for the codec.

/// Wire identifier for the category of a bound strategy.
///
/// Tagged payloads carry this byte so a receiver can detect that its peer
/// bound a different strategy to the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    Bool = 1,
    U8 = 2,
    U16 = 3,
    U32 = 4,
    U64 = 5,
    I8 = 6,
    I16 = 7,
    I32 = 8,
    I64 = 9,
    Char = 10,
    F32 = 11,
    F64 = 12,
    Blittable = 13,
    Text = 14,
    FixedText = 15,
    Optional = 16,
    Shared = 17,
    Sequence = 18,
    Set = 19,
    Map = 20,
    Custom = 21,
    User = 22,
}

impl TypeTag {
    const ALL: [Self; 22] = [
        Self::Bool,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::Char,
        Self::F32,
        Self::F64,
        Self::Blittable,
        Self::Text,
        Self::FixedText,
        Self::Optional,
        Self::Shared,
        Self::Sequence,
        Self::Set,
        Self::Map,
        Self::Custom,
        Self::User,
    ];

    /// Returns the wire byte for this tag.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parses a wire byte, returning `None` for unknown tags.
    #[must_use]
    pub fn from_u8(raw: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_u8() == raw)
    }
}

/// Network topology driving entry-point selection.
///
/// `DistributedAuthority` selects the bandwidth-optimized entry points of
/// every bound strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Topology {
    #[default]
    ClientServer,
    DistributedAuthority,
}

impl Topology {
    /// Returns `true` for the distributed-authority topology.
    #[must_use]
    pub const fn is_distributed_authority(self) -> bool {
        matches!(self, Self::DistributedAuthority)
    }
}
