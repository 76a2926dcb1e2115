//! Error types for cursor operations.

use std::fmt;

/// Result type for bitstream operations.
pub type BitResult<T> = Result<T, BitError>;

/// Errors that can occur while reading or writing a bounded buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitError {
    /// Attempted to read past the end of the input.
    UnexpectedEof {
        /// Number of bits requested.
        requested: usize,
        /// Number of bits available.
        available: usize,
    },

    /// Attempted to write past the end of the output buffer.
    BufferOverflow {
        /// Bit position the write would have reached.
        attempted: usize,
        /// Capacity of the output buffer in bits.
        capacity: usize,
    },

    /// Invalid bit count for the operation.
    InvalidBitCount {
        /// The invalid bit count provided.
        bits: u8,
        /// Maximum allowed bits for this operation.
        max_bits: u8,
    },

    /// Value exceeds the range representable by the specified number of bits.
    ValueOutOfRange {
        /// The value that was out of range.
        value: u64,
        /// Number of bits available.
        bits: u8,
    },

    /// Byte-aligned access attempted at a non-aligned position.
    MisalignedAccess {
        /// The current bit position.
        bit_position: usize,
    },

    /// Varint encoding is longer than the target integer allows.
    InvalidVarint,

    /// Seek target lies outside the addressable range.
    SeekOutOfRange {
        /// Requested bit position.
        position: usize,
        /// Largest valid bit position.
        limit: usize,
    },
}

impl fmt::Display for BitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof {
                requested,
                available,
            } => {
                write!(
                    f,
                    "attempted to read {requested} bits but only {available} bits available"
                )
            }
            Self::BufferOverflow {
                attempted,
                capacity,
            } => {
                write!(
                    f,
                    "attempted to write up to bit {attempted} but buffer capacity is {capacity} bits"
                )
            }
            Self::InvalidBitCount { bits, max_bits } => {
                write!(f, "invalid bit count {bits}, maximum allowed is {max_bits}")
            }
            Self::ValueOutOfRange { value, bits } => {
                write!(f, "value {value} cannot be represented in {bits} bits")
            }
            Self::MisalignedAccess { bit_position } => {
                write!(f, "byte-aligned access at unaligned bit position {bit_position}")
            }
            Self::InvalidVarint => write!(f, "varint is too long for the target integer"),
            Self::SeekOutOfRange { position, limit } => {
                write!(f, "seek to bit {position} is outside 0..={limit}")
            }
        }
    }
}

impl std::error::Error for BitError {}
