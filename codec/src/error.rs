//! Error types for codec operations.

use std::fmt;

use crate::types::TypeTag;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding, decoding, or duplicating values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Cursor error, including capacity and end-of-input failures.
    Bitstream(bitstream::BitError),

    /// No strategy is bound for the type and no user callbacks are registered.
    MissingStrategy {
        /// Name of the offending type.
        type_name: &'static str,
    },

    /// The type tag on the wire disagrees with the locally bound strategy.
    TypeTagMismatch {
        /// Name of the type being decoded.
        type_name: &'static str,
        /// Tag reported by the local strategy.
        expected: TypeTag,
        /// Raw tag byte found on the wire.
        found: u8,
    },

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// A discriminator byte had an unrecognised value.
    InvalidTag { kind: TagKind, found: u8 },

    /// A length exceeds the fixed capacity of the destination.
    InvalidLength { len: usize, capacity: usize },

    /// A frame body had unread bytes after decoding.
    TrailingFrameData {
        /// Number of unread bytes.
        remaining_bytes: usize,
    },

    /// Decoded data is not a valid value of the type.
    InvalidValue {
        type_name: &'static str,
        reason: ValueReason,
    },
}

/// Specific limit that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    CollectionLen,
    FrameBytes,
    TextBytes,
}

/// Discriminator that failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Full/delta choice at the head of a delta payload.
    DeltaForm,
    /// Presence byte of a nullable value.
    Presence,
    /// Payload kind written by a replicated slot.
    SlotPayload,
}

/// Details for invalid value errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueReason {
    UnsignedOutOfRange { value: u64 },
    SignedOutOfRange { value: i64 },
    InvalidBool { found: u64 },
    InvalidChar { found: u32 },
    InvalidUtf8,
    /// A positional delta skipped past the end of the destination.
    DeltaIndexOutOfRange { index: usize, len: usize },
    /// A map delta changed a key the destination does not hold.
    UnknownDeltaKey,
    /// A nested delta arrived for a value that is currently absent.
    MissingDeltaBaseline,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bitstream(e) => write!(f, "bitstream error: {e}"),
            Self::MissingStrategy { type_name } => {
                write!(
                    f,
                    "no serialization strategy for type `{type_name}`: bind a category \
                     strategy for it on the registry (bind_scalar, bind_sequence, \
                     bind_custom, ...) or register user callbacks with register_user"
                )
            }
            Self::TypeTagMismatch {
                type_name,
                expected,
                found,
            } => {
                write!(
                    f,
                    "type tag mismatch for `{type_name}`: expected {expected:?} ({}), found {found}",
                    expected.as_u8()
                )
            }
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::InvalidTag { kind, found } => {
                write!(f, "invalid {kind} tag {found}")
            }
            Self::InvalidLength { len, capacity } => {
                write!(f, "length {len} exceeds fixed capacity {capacity}")
            }
            Self::TrailingFrameData { remaining_bytes } => {
                write!(f, "trailing data in frame: {remaining_bytes} bytes")
            }
            Self::InvalidValue { type_name, reason } => {
                write!(f, "invalid value for `{type_name}`: {reason}")
            }
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CollectionLen => "collection length",
            Self::FrameBytes => "frame bytes",
            Self::TextBytes => "text bytes",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DeltaForm => "delta form",
            Self::Presence => "presence",
            Self::SlotPayload => "slot payload",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for ValueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsignedOutOfRange { value } => {
                write!(f, "unsigned value {value} does not fit the target type")
            }
            Self::SignedOutOfRange { value } => {
                write!(f, "signed value {value} does not fit the target type")
            }
            Self::InvalidBool { found } => write!(f, "boolean encoded as {found}"),
            Self::InvalidChar { found } => {
                write!(f, "0x{found:X} is not a unicode scalar value")
            }
            Self::InvalidUtf8 => write!(f, "text is not valid UTF-8"),
            Self::DeltaIndexOutOfRange { index, len } => {
                write!(f, "delta index {index} is past the end of length {len}")
            }
            Self::UnknownDeltaKey => write!(f, "delta changes a key that is not present"),
            Self::MissingDeltaBaseline => {
                write!(f, "delta received for a value with no baseline")
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bitstream(e) => Some(e),
            _ => None,
        }
    }
}

impl From<bitstream::BitError> for CodecError {
    fn from(err: bitstream::BitError) -> Self {
        Self::Bitstream(err)
    }
}
