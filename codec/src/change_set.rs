//! Positional change bit vectors used by delta encodings.

use bitstream::{BitReader, BitWriter};

use crate::error::CodecResult;

/// One bit per position, set where the position changed.
///
/// On the wire the bits are packed most significant first and padded to a
/// byte boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ChangeBits {
    bits: Vec<bool>,
    count: usize,
}

impl ChangeBits {
    pub(crate) fn from_fn(len: usize, mut changed: impl FnMut(usize) -> bool) -> Self {
        let bits: Vec<bool> = (0..len).map(&mut changed).collect();
        let count = bits.iter().filter(|bit| **bit).count();
        Self { bits, count }
    }

    /// Number of set bits.
    pub(crate) const fn count(&self) -> usize {
        self.count
    }

    /// Bytes taken by the packed vector on the wire.
    pub(crate) fn encoded_bytes(&self) -> usize {
        self.bits.len().div_ceil(8)
    }

    pub(crate) fn iter_set(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(index, bit)| bit.then_some(index))
    }

    pub(crate) fn write(&self, writer: &mut BitWriter<'_>) -> CodecResult<()> {
        for bit in &self.bits {
            writer.write_bit(*bit)?;
        }
        writer.align_to_byte()?;
        Ok(())
    }

    pub(crate) fn read(reader: &mut BitReader<'_>, len: usize) -> CodecResult<Self> {
        // Checked up front so a bogus length cannot drive the allocation.
        let packed_bits = len.div_ceil(8).saturating_mul(8);
        if reader.bits_remaining() < packed_bits {
            return Err(bitstream::BitError::UnexpectedEof {
                requested: packed_bits,
                available: reader.bits_remaining(),
            }
            .into());
        }
        let mut bits = Vec::with_capacity(len);
        let mut count = 0;
        for _ in 0..len {
            let bit = reader.read_bit()?;
            count += usize::from(bit);
            bits.push(bit);
        }
        reader.align_to_byte()?;
        Ok(Self { bits, count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_iterates_set_positions() {
        let bits = ChangeBits::from_fn(10, |i| i % 3 == 0);
        assert_eq!(bits.count(), 4);
        assert_eq!(bits.encoded_bytes(), 2);
        assert_eq!(bits.iter_set().collect::<Vec<_>>(), vec![0, 3, 6, 9]);
    }

    #[test]
    fn wire_form_is_padded() {
        let bits = ChangeBits::from_fn(3, |i| i == 1);
        let mut buf = [0xFFu8; 2];
        let mut writer = BitWriter::new(&mut buf);
        bits.write(&mut writer).unwrap();
        assert_eq!(writer.finish(), 1);
        assert_eq!(buf[0], 0b0100_0000);

        let mut reader = BitReader::new(&buf[..1]);
        let decoded = ChangeBits::read(&mut reader, 3).unwrap();
        assert_eq!(decoded, bits);
        assert!(reader.is_empty());
    }

    #[test]
    fn empty_vector_takes_no_bytes() {
        let bits = ChangeBits::from_fn(0, |_| true);
        assert_eq!(bits.encoded_bytes(), 0);
        let mut buf = [0u8; 1];
        let mut writer = BitWriter::new(&mut buf);
        bits.write(&mut writer).unwrap();
        assert_eq!(writer.finish(), 0);
    }

    #[test]
    fn read_rejects_length_beyond_input() {
        let mut reader = BitReader::new(&[0xFF]);
        assert!(ChangeBits::read(&mut reader, 9).is_err());
    }
}
