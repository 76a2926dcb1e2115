//! Limits for codec-level decoding.

use crate::error::{CodecError, CodecResult, LimitKind};

/// Codec-specific limits enforced while encoding and decoding values.
///
/// Counts and lengths read from the wire are checked against these before
/// anything is allocated, so a hostile peer cannot force large allocations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodecLimits {
    /// Maximum number of elements in a sequence, set, or map.
    pub max_collection_len: usize,
    /// Maximum number of bytes in a length-prefixed frame body.
    pub max_frame_bytes: usize,
    /// Maximum number of UTF-8 bytes in a text value.
    pub max_text_bytes: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_collection_len: 4096,
            max_frame_bytes: 64 * 1024,
            max_text_bytes: 4096,
        }
    }
}

impl CodecLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_collection_len: 64,
            max_frame_bytes: 4096,
            max_text_bytes: 256,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_collection_len: usize::MAX,
            max_frame_bytes: usize::MAX,
            max_text_bytes: usize::MAX,
        }
    }

    /// Returns the configured limit for `kind`.
    #[must_use]
    pub const fn limit(&self, kind: LimitKind) -> usize {
        match kind {
            LimitKind::CollectionLen => self.max_collection_len,
            LimitKind::FrameBytes => self.max_frame_bytes,
            LimitKind::TextBytes => self.max_text_bytes,
        }
    }

    pub(crate) fn check(&self, kind: LimitKind, actual: usize) -> CodecResult<()> {
        let limit = self.limit(kind);
        if actual > limit {
            return Err(CodecError::LimitsExceeded {
                kind,
                limit,
                actual,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_are_reasonable() {
        let limits = CodecLimits::default();
        assert!(limits.max_collection_len >= 1024);
        assert!(limits.max_frame_bytes >= 1024);
    }

    #[test]
    fn testing_limits_smaller() {
        let test_limits = CodecLimits::for_testing();
        let default_limits = CodecLimits::default();
        assert!(test_limits.max_collection_len < default_limits.max_collection_len);
        assert!(test_limits.max_frame_bytes < default_limits.max_frame_bytes);
    }

    #[test]
    fn unlimited_limits() {
        let limits = CodecLimits::unlimited();
        assert_eq!(limits.max_collection_len, usize::MAX);
        assert_eq!(limits.limit(LimitKind::FrameBytes), usize::MAX);
    }

    #[test]
    fn check_reports_kind_and_counts() {
        let limits = CodecLimits::for_testing();
        assert!(limits.check(LimitKind::CollectionLen, 64).is_ok());
        assert_eq!(
            limits.check(LimitKind::CollectionLen, 65),
            Err(CodecError::LimitsExceeded {
                kind: LimitKind::CollectionLen,
                limit: 64,
                actual: 65,
            })
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn limits_roundtrip_through_serde() {
        let limits = CodecLimits {
            max_collection_len: 7,
            max_frame_bytes: 1200,
            max_text_bytes: 33,
        };
        let json = serde_json::to_string(&limits).unwrap();
        let back: CodecLimits = serde_json::from_str(&json).unwrap();
        assert_eq!(back, limits);
    }
}
