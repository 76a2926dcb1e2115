//! Length-prefixed frames.
//!
//! A frame is `[u32 body length][body]`. The length is reserved before the
//! body is written and patched afterwards, so the body is encoded once,
//! straight into the output buffer.

use bitstream::{BitReader, BitWriter};

use crate::error::{CodecError, CodecResult, LimitKind};
use crate::limits::CodecLimits;

/// Writes `write_body` as a length-prefixed frame and returns the body length.
pub fn write_framed<F>(
    writer: &mut BitWriter<'_>,
    limits: &CodecLimits,
    write_body: F,
) -> CodecResult<usize>
where
    F: FnOnce(&mut BitWriter<'_>) -> CodecResult<()>,
{
    writer.align_to_byte()?;
    let prefix = writer.bit_position();
    writer.write_u32_aligned(0)?;
    let body_start = writer.bit_position();

    write_body(writer)?;
    writer.align_to_byte()?;
    let body_end = writer.bit_position();

    let body_len = (body_end - body_start) / 8;
    limits.check(LimitKind::FrameBytes, body_len)?;
    let len_u32 = u32::try_from(body_len).map_err(|_| CodecError::LimitsExceeded {
        kind: LimitKind::FrameBytes,
        limit: u32::MAX as usize,
        actual: body_len,
    })?;

    writer.seek(prefix)?;
    writer.write_u32_aligned(len_u32)?;
    writer.seek(body_end)?;
    Ok(body_len)
}

/// Reads a frame, handing `read_body` a reader over exactly the body.
///
/// The body must consume every byte of the frame.
pub fn read_framed<'a, F, R>(
    reader: &mut BitReader<'a>,
    limits: &CodecLimits,
    read_body: F,
) -> CodecResult<R>
where
    F: FnOnce(&mut BitReader<'a>) -> CodecResult<R>,
{
    let body = read_frame_body(reader, limits)?;
    let mut body_reader = BitReader::new(body);
    let out = read_body(&mut body_reader)?;
    body_reader.align_to_byte()?;
    if !body_reader.is_empty() {
        return Err(CodecError::TrailingFrameData {
            remaining_bytes: body_reader.bytes_remaining(),
        });
    }
    Ok(out)
}

/// Skips a frame without decoding it and returns the body length.
pub fn skip_framed(reader: &mut BitReader<'_>, limits: &CodecLimits) -> CodecResult<usize> {
    read_frame_body(reader, limits).map(<[u8]>::len)
}

fn read_frame_body<'a>(reader: &mut BitReader<'a>, limits: &CodecLimits) -> CodecResult<&'a [u8]> {
    reader.align_to_byte()?;
    let len = reader.read_u32_aligned()? as usize;
    limits.check(LimitKind::FrameBytes, len)?;
    Ok(reader.read_bytes_aligned(len)?)
}
