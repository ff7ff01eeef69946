//! RIFF / VP8X / ANIM / ANMF chunk writers.
//!
//! VP8L payloads arrive already even-padded, so chunk sizes here are even
//! and no additional padding bytes are emitted.

use alloc::vec::Vec;

use crate::vec_writer::VecWriter;

/// VP8X flag bit: file contains an ANIM chunk.
const VP8X_ANIMATION: u8 = 1 << 1;
/// VP8X flag bit: file contains alpha.
const VP8X_ALPHA: u8 = 1 << 4;

/// Fixed VP8X payload size.
const VP8X_PAYLOAD_SIZE: u32 = 10;
/// Fixed ANIM payload size (background color + loop count).
const ANIM_PAYLOAD_SIZE: u32 = 6;
/// ANMF header fields preceding the embedded bitstream chunk.
const ANMF_HEADER_SIZE: u32 = 16;

/// One encoded animation frame ready for framing.
pub(crate) struct FrameChunk {
    /// Even-padded VP8L payload.
    pub payload: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Display duration in milliseconds.
    pub duration_ms: u32,
    /// Disposal method wire value (0 or 1).
    pub dispose: u8,
}

/// Animation-level container parameters.
pub(crate) struct AnimationParams {
    /// Background color, BGRA byte order.
    pub background_color: u32,
    /// Loop count; 0 loops forever.
    pub loop_count: u16,
}

/// Wrap a single VP8L payload in a WebP file.
pub(crate) fn assemble_single(
    payload: &[u8],
    width: u32,
    height: u32,
    has_alpha: bool,
    extended: bool,
) -> Vec<u8> {
    debug_assert_eq!(payload.len() % 2, 0);

    if !extended {
        let mut out = Vec::with_capacity(20 + payload.len());
        out.write_all(b"RIFF");
        out.write_u32_le(12 + payload.len() as u32);
        out.write_all(b"WEBP");
        write_vp8l_chunk(&mut out, payload);
        return out;
    }

    let riff_size = 4 + (8 + VP8X_PAYLOAD_SIZE) + 8 + payload.len() as u32;
    let mut out = Vec::with_capacity(riff_size as usize + 8);
    out.write_all(b"RIFF");
    out.write_u32_le(riff_size);
    out.write_all(b"WEBP");

    let flags = if has_alpha { VP8X_ALPHA } else { 0 };
    write_vp8x_chunk(&mut out, flags, width, height);
    write_vp8l_chunk(&mut out, payload);

    out
}

/// Assemble an animated WebP from encoded frames.
pub(crate) fn assemble_animation(
    frames: &[FrameChunk],
    canvas_width: u32,
    canvas_height: u32,
    has_alpha: bool,
    params: AnimationParams,
) -> Vec<u8> {
    let mut riff_size = 4 + (8 + VP8X_PAYLOAD_SIZE) + (8 + ANIM_PAYLOAD_SIZE);
    for frame in frames {
        riff_size += 8 + anmf_payload_size(frame);
    }

    let mut out = Vec::with_capacity(riff_size as usize + 8);
    out.write_all(b"RIFF");
    out.write_u32_le(riff_size);
    out.write_all(b"WEBP");

    let mut flags = VP8X_ANIMATION;
    if has_alpha {
        flags |= VP8X_ALPHA;
    }
    write_vp8x_chunk(&mut out, flags, canvas_width, canvas_height);

    out.write_all(b"ANIM");
    out.write_u32_le(ANIM_PAYLOAD_SIZE);
    out.write_u32_le(params.background_color);
    out.write_u16_le(params.loop_count);

    for frame in frames {
        write_anmf_chunk(&mut out, frame);
    }

    out
}

fn anmf_payload_size(frame: &FrameChunk) -> u32 {
    ANMF_HEADER_SIZE + 8 + frame.payload.len() as u32
}

fn write_vp8x_chunk(out: &mut Vec<u8>, flags: u8, width: u32, height: u32) {
    out.write_all(b"VP8X");
    out.write_u32_le(VP8X_PAYLOAD_SIZE);
    out.write_all(&[flags, 0, 0, 0]);
    out.write_u24_le(width - 1);
    out.write_u24_le(height - 1);
}

fn write_vp8l_chunk(out: &mut Vec<u8>, payload: &[u8]) {
    out.write_all(b"VP8L");
    out.write_u32_le(payload.len() as u32);
    out.write_all(payload);
}

fn write_anmf_chunk(out: &mut Vec<u8>, frame: &FrameChunk) {
    out.write_all(b"ANMF");
    out.write_u32_le(anmf_payload_size(frame));

    // Offsets are stored in 2-pixel units; frames render at the origin.
    out.write_u24_le(0);
    out.write_u24_le(0);
    out.write_u24_le(frame.width - 1);
    out.write_u24_le(frame.height - 1);
    out.write_u24_le(frame.duration_ms.min((1 << 24) - 1));
    // Bit 0: disposal method. Bit 1: blend method (0 = alpha blend).
    out.push(frame.dispose & 1);

    write_vp8l_chunk(out, &frame.payload);
}
