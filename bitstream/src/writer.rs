//! Bounded bit-level writer over a caller-provided buffer.

use crate::error::{BitError, BitResult};

/// A bit-level writer that encodes into a caller-provided byte slice.
///
/// Every write checks the remaining capacity first and fails with
/// [`BitError::BufferOverflow`] instead of truncating. The writer supports
/// seeking back to an already written position so a length prefix can be
/// reserved, the payload written, and the prefix patched afterwards.
#[derive(Debug)]
pub struct BitWriter<'a> {
    buf: &'a mut [u8],
    bit_pos: usize,
    /// Furthest bit position ever written.
    high_water: usize,
}

impl<'a> BitWriter<'a> {
    /// Creates a writer over `buf`. Existing contents are overwritten as
    /// bits are written.
    #[must_use]
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            bit_pos: 0,
            high_water: 0,
        }
    }

    /// Returns the capacity of the underlying buffer in bits.
    #[must_use]
    pub fn capacity_bits(&self) -> usize {
        self.buf.len().saturating_mul(8)
    }

    /// Returns the current bit position.
    #[must_use]
    pub const fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Returns the number of bits written so far (the furthest position reached).
    #[must_use]
    pub const fn bits_written(&self) -> usize {
        self.high_water
    }

    /// Returns the number of bits that can still be written from the current position.
    #[must_use]
    pub fn bits_remaining(&self) -> usize {
        self.capacity_bits().saturating_sub(self.bit_pos)
    }

    /// Moves the write position to `bit_position`.
    ///
    /// Only positions inside the already written range are valid, so a seek can
    /// never expose stale bytes of the caller's buffer.
    pub fn seek(&mut self, bit_position: usize) -> BitResult<()> {
        if bit_position > self.high_water {
            return Err(BitError::SeekOutOfRange {
                position: bit_position,
                limit: self.high_water,
            });
        }
        self.bit_pos = bit_position;
        Ok(())
    }

    /// Writes a single bit.
    pub fn write_bit(&mut self, value: bool) -> BitResult<()> {
        self.ensure_capacity(1)?;
        let byte_idx = self.bit_pos / 8;
        let mask = 1u8 << (7 - (self.bit_pos % 8));
        if value {
            self.buf[byte_idx] |= mask;
        } else {
            self.buf[byte_idx] &= !mask;
        }
        self.advance(1);
        Ok(())
    }

    /// Writes the low `bits` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u64, bits: u8) -> BitResult<()> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        if bits == 0 {
            return Ok(());
        }
        if bits < 64 && value >= (1u64 << bits) {
            return Err(BitError::ValueOutOfRange { value, bits });
        }
        self.ensure_capacity(bits as usize)?;
        for i in (0..bits).rev() {
            self.write_bit((value >> i) & 1 == 1)?;
        }
        Ok(())
    }

    /// Pads with zero bits up to the next byte boundary.
    pub fn align_to_byte(&mut self) -> BitResult<()> {
        let rem = self.bit_pos % 8;
        if rem == 0 {
            return Ok(());
        }
        let pad = 8 - rem;
        self.ensure_capacity(pad)?;
        for _ in 0..pad {
            self.write_bit(false)?;
        }
        Ok(())
    }

    /// Writes a byte-aligned `u8`.
    pub fn write_u8_aligned(&mut self, value: u8) -> BitResult<()> {
        self.write_aligned_bytes(&[value])
    }

    /// Writes a byte-aligned `u16` (little-endian).
    pub fn write_u16_aligned(&mut self, value: u16) -> BitResult<()> {
        self.write_aligned_bytes(&value.to_le_bytes())
    }

    /// Writes a byte-aligned `u32` (little-endian).
    pub fn write_u32_aligned(&mut self, value: u32) -> BitResult<()> {
        self.write_aligned_bytes(&value.to_le_bytes())
    }

    /// Writes a byte-aligned `u64` (little-endian).
    pub fn write_u64_aligned(&mut self, value: u64) -> BitResult<()> {
        self.write_aligned_bytes(&value.to_le_bytes())
    }

    /// Writes a byte-aligned LEB128 varint `u32`.
    pub fn write_varu32(&mut self, value: u32) -> BitResult<()> {
        self.write_varu64(u64::from(value))
    }

    /// Writes a byte-aligned zigzag varint `i32`.
    pub fn write_vars32(&mut self, value: i32) -> BitResult<()> {
        self.write_varu32(((value << 1) ^ (value >> 31)) as u32)
    }

    /// Writes a byte-aligned LEB128 varint `u64`.
    ///
    /// Small magnitudes take fewer bytes: values below 128 take one byte.
    pub fn write_varu64(&mut self, value: u64) -> BitResult<()> {
        self.ensure_aligned()?;
        let len = varu64_len(value);
        self.ensure_capacity(len * 8)?;
        let mut remaining = value;
        loop {
            let byte = (remaining & 0x7F) as u8;
            remaining >>= 7;
            if remaining == 0 {
                self.put_byte(byte);
                return Ok(());
            }
            self.put_byte(byte | 0x80);
        }
    }

    /// Writes a byte-aligned zigzag varint `i64`.
    pub fn write_vars64(&mut self, value: i64) -> BitResult<()> {
        self.write_varu64(((value << 1) ^ (value >> 63)) as u64)
    }

    /// Writes a raw byte region at a byte-aligned position.
    pub fn write_bytes_aligned(&mut self, bytes: &[u8]) -> BitResult<()> {
        self.write_aligned_bytes(bytes)
    }

    /// Reserves `len` aligned bytes and lets `fill` write them in place.
    ///
    /// The region is zeroed before `fill` runs.
    pub fn write_region<F>(&mut self, len: usize, fill: F) -> BitResult<()>
    where
        F: FnOnce(&mut [u8]),
    {
        self.ensure_aligned()?;
        self.ensure_capacity(len.saturating_mul(8))?;
        let start = self.bit_pos / 8;
        let region = &mut self.buf[start..start + len];
        region.fill(0);
        fill(region);
        self.advance(len * 8);
        Ok(())
    }

    /// Finishes writing and returns the number of bytes used.
    ///
    /// A trailing partial byte is counted; its unused low bits are zero.
    #[must_use]
    pub fn finish(self) -> usize {
        let rem = self.high_water % 8;
        if rem != 0 {
            self.buf[self.high_water / 8] &= 0xFF << (8 - rem);
        }
        self.high_water.div_ceil(8)
    }

    fn write_aligned_bytes(&mut self, bytes: &[u8]) -> BitResult<()> {
        self.ensure_aligned()?;
        self.ensure_capacity(bytes.len().saturating_mul(8))?;
        let start = self.bit_pos / 8;
        self.buf[start..start + bytes.len()].copy_from_slice(bytes);
        self.advance(bytes.len() * 8);
        Ok(())
    }

    fn put_byte(&mut self, byte: u8) {
        self.buf[self.bit_pos / 8] = byte;
        self.advance(8);
    }

    fn advance(&mut self, bits: usize) {
        self.bit_pos += bits;
        if self.bit_pos > self.high_water {
            self.high_water = self.bit_pos;
        }
    }

    fn ensure_aligned(&self) -> BitResult<()> {
        if self.bit_pos % 8 != 0 {
            return Err(BitError::MisalignedAccess {
                bit_position: self.bit_pos,
            });
        }
        Ok(())
    }

    fn ensure_capacity(&self, bits: usize) -> BitResult<()> {
        let capacity = self.capacity_bits();
        let end = self.bit_pos.saturating_add(bits);
        if end > capacity {
            return Err(BitError::BufferOverflow {
                attempted: end,
                capacity,
            });
        }
        Ok(())
    }
}

/// Returns the encoded length of a LEB128 varint in bytes.
#[must_use]
pub const fn varu64_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    if bits == 0 {
        1
    } else {
        bits.div_ceil(7)
    }
}
