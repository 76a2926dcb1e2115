//! Text strategies: growable `String` and fixed-capacity `FixedString`.

use std::fmt;

use bitstream::{BitReader, BitWriter};

use crate::change_set::ChangeBits;
use crate::error::{CodecError, CodecResult, LimitKind, ValueReason};
use crate::registry::StrategyRegistry;
use crate::strategy::{read_len, write_len, DeltaForm, Strategy};
use crate::types::TypeTag;

/// `String` as `[len][utf-8 bytes]`. Reads reuse the destination's allocation.
#[derive(Debug, Default)]
pub struct TextStrategy;

impl Strategy<String> for TextStrategy {
    fn type_tag(&self) -> TypeTag {
        TypeTag::Text
    }

    fn write(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &String,
    ) -> CodecResult<()> {
        write_len(registry, writer, LimitKind::TextBytes, value.len())?;
        writer.write_bytes_aligned(value.as_bytes())?;
        Ok(())
    }

    fn read(
        &self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut String,
    ) -> CodecResult<()> {
        let len = read_len(registry, reader, LimitKind::TextBytes)?;
        let bytes = reader.read_bytes_aligned(len)?;
        let text = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidValue {
            type_name: "String",
            reason: ValueReason::InvalidUtf8,
        })?;
        value.clear();
        value.push_str(text);
        Ok(())
    }

    fn duplicate(&self, _registry: &StrategyRegistry, value: &String) -> CodecResult<String> {
        Ok(value.clone())
    }
}

/// Text stored inline in `N` bytes with a logical length.
///
/// Bytes past the logical length are ignored by equality and never sent.
#[derive(Clone, Copy)]
pub struct FixedString<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> FixedString<N> {
    pub const CAPACITY: usize = N;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [0; N],
            len: 0,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Returns the contents as text, or `None` if they are not valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }

    /// Replaces the contents with `bytes`.
    pub fn set_bytes(&mut self, bytes: &[u8]) -> CodecResult<()> {
        if bytes.len() > N {
            return Err(CodecError::InvalidLength {
                len: bytes.len(),
                capacity: N,
            });
        }
        self.bytes[..bytes.len()].copy_from_slice(bytes);
        self.len = bytes.len();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Changes the logical length without touching storage.
    fn set_len(&mut self, len: usize) -> CodecResult<()> {
        if len > N {
            return Err(CodecError::InvalidLength { len, capacity: N });
        }
        self.len = len;
        Ok(())
    }
}

impl<const N: usize> Default for FixedString<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PartialEq for FixedString<N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<const N: usize> Eq for FixedString<N> {}

impl<const N: usize> TryFrom<&str> for FixedString<N> {
    type Error = CodecError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        let mut out = Self::new();
        out.set_bytes(text.as_bytes())?;
        Ok(out)
    }
}

impl<const N: usize> fmt::Debug for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(text) => write!(f, "FixedString<{N}>({text:?})"),
            None => write!(f, "FixedString<{N}>({:?})", self.as_bytes()),
        }
    }
}

/// Strategy for [`FixedString`].
///
/// Full: `[len][bytes]`. Delta: `[tag][len][change bits][changed bytes]`,
/// one bit per position of the new length, set where the byte differs from
/// the previous value or lies past its end. The delta is only used when the
/// change bits plus changed bytes are no larger than the bytes themselves.
#[derive(Debug, Default)]
pub struct FixedStringStrategy;

impl<const N: usize> Strategy<FixedString<N>> for FixedStringStrategy {
    fn type_tag(&self) -> TypeTag {
        TypeTag::FixedText
    }

    fn write(
        &self,
        _registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &FixedString<N>,
    ) -> CodecResult<()> {
        writer.write_varu64(value.len as u64)?;
        writer.write_bytes_aligned(value.as_bytes())?;
        Ok(())
    }

    fn read(
        &self,
        _registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut FixedString<N>,
    ) -> CodecResult<()> {
        let len = read_fixed_len::<N>(reader)?;
        value.set_bytes(reader.read_bytes_aligned(len)?)
    }

    fn write_delta(
        &self,
        registry: &StrategyRegistry,
        writer: &mut BitWriter<'_>,
        value: &FixedString<N>,
        previous: &FixedString<N>,
    ) -> CodecResult<()> {
        let current = value.as_bytes();
        let before = previous.as_bytes();
        let changes = ChangeBits::from_fn(current.len(), |i| before.get(i) != Some(&current[i]));

        if changes.encoded_bytes() + changes.count() > current.len() {
            tracing::trace!(
                len = current.len(),
                changes = changes.count(),
                "fixed string delta larger than full encoding"
            );
            DeltaForm::Full.write(writer)?;
            return self.write(registry, writer, value);
        }

        DeltaForm::Delta.write(writer)?;
        writer.write_varu64(current.len() as u64)?;
        changes.write(writer)?;
        for index in changes.iter_set() {
            writer.write_u8_aligned(current[index])?;
        }
        Ok(())
    }

    fn read_delta(
        &self,
        registry: &StrategyRegistry,
        reader: &mut BitReader<'_>,
        value: &mut FixedString<N>,
    ) -> CodecResult<()> {
        match DeltaForm::read(reader)? {
            DeltaForm::Full => self.read(registry, reader, value),
            DeltaForm::Delta => {
                let len = read_fixed_len::<N>(reader)?;
                let changes = ChangeBits::read(reader, len)?;
                value.set_len(len)?;
                for index in changes.iter_set() {
                    value.bytes[index] = reader.read_u8_aligned()?;
                }
                Ok(())
            }
        }
    }

    fn duplicate(
        &self,
        _registry: &StrategyRegistry,
        value: &FixedString<N>,
    ) -> CodecResult<FixedString<N>> {
        Ok(*value)
    }
}

fn read_fixed_len<const N: usize>(reader: &mut BitReader<'_>) -> CodecResult<usize> {
    let raw = reader.read_varu64()?;
    let len = usize::try_from(raw).unwrap_or(usize::MAX);
    if len > N {
        return Err(CodecError::InvalidLength { len, capacity: N });
    }
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    type Text32 = FixedString<32>;

    fn delta_bytes(value: &Text32, previous: &Text32) -> Vec<u8> {
        let registry = StrategyRegistry::new();
        let mut buf = [0u8; 64];
        let mut writer = BitWriter::new(&mut buf);
        FixedStringStrategy
            .write_delta(&registry, &mut writer, value, previous)
            .unwrap();
        let used = writer.finish();
        buf[..used].to_vec()
    }

    #[test]
    fn fixed_string_basics() {
        let text = Text32::try_from("HELLO").unwrap();
        assert_eq!(text.len(), 5);
        assert_eq!(text.as_str(), Some("HELLO"));
        assert_eq!(Text32::CAPACITY, 32);
        assert!(Text32::new().is_empty());
        assert_eq!(format!("{text:?}"), "FixedString<32>(\"HELLO\")");
    }

    #[test]
    fn fixed_string_rejects_overflow() {
        let err = FixedString::<4>::try_from("HELLO").unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidLength {
                len: 5,
                capacity: 4
            }
        );
    }

    #[test]
    fn equality_ignores_bytes_past_len() {
        let mut a = Text32::try_from("HELLO").unwrap();
        a.set_bytes(b"HI").unwrap();
        let b = Text32::try_from("HI").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn single_change_uses_delta() {
        let previous = Text32::try_from("HELLO").unwrap();
        let value = Text32::try_from("HELLX").unwrap();
        let bytes = delta_bytes(&value, &previous);
        // tag, len, one bit-vector byte, one changed byte
        assert_eq!(bytes, vec![0, 5, 0b0000_1000, b'X']);
    }

    #[test]
    fn full_rewrite_uses_full() {
        let previous = Text32::try_from("ABCD").unwrap();
        let value = Text32::try_from("WXYZ").unwrap();
        let bytes = delta_bytes(&value, &previous);
        assert_eq!(bytes[0], 1);
        assert_eq!(&bytes[1..], &[4, b'W', b'X', b'Y', b'Z']);
    }

    #[test]
    fn delta_only_touches_flagged_positions() {
        let registry = StrategyRegistry::new();
        let previous = Text32::try_from("HELLO").unwrap();
        let value = Text32::try_from("HI").unwrap();
        let bytes = delta_bytes(&value, &previous);
        assert_eq!(bytes[0], 0);

        let mut receiver = previous;
        FixedStringStrategy
            .read_delta(&registry, &mut BitReader::new(&bytes), &mut receiver)
            .unwrap();
        assert_eq!(receiver.len(), 2);
        assert_eq!(receiver.as_str(), Some("HI"));
        // storage past the logical length is left alone
        assert_eq!(&receiver.bytes[2..5], b"LLO");
    }

    #[test]
    fn read_rejects_length_above_capacity() {
        let registry = StrategyRegistry::new();
        let mut out = FixedString::<2>::new();
        let err = FixedStringStrategy
            .read(&registry, &mut BitReader::new(&[3, b'a', b'b', b'c']), &mut out)
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidLength {
                len: 3,
                capacity: 2
            }
        );
    }

    #[test]
    fn string_roundtrip_reuses_allocation() {
        let registry = StrategyRegistry::new();
        let mut buf = [0u8; 32];
        let mut writer = BitWriter::new(&mut buf);
        TextStrategy
            .write(&registry, &mut writer, &"héllo".to_string())
            .unwrap();
        let used = writer.finish();

        let mut out = String::with_capacity(64);
        let capacity = out.capacity();
        TextStrategy
            .read(&registry, &mut BitReader::new(&buf[..used]), &mut out)
            .unwrap();
        assert_eq!(out, "héllo");
        assert_eq!(out.capacity(), capacity);
    }

    #[test]
    fn string_rejects_invalid_utf8() {
        let registry = StrategyRegistry::new();
        let mut out = String::new();
        let err = TextStrategy
            .read(&registry, &mut BitReader::new(&[2, 0xC3, 0x28]), &mut out)
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidValue {
                reason: ValueReason::InvalidUtf8,
                ..
            }
        ));
    }
}
