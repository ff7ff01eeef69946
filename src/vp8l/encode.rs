//! VP8L bitstream assembly: recursive sub-image writer and top-level
//! frame encoding.

use alloc::vec::Vec;

use super::backward_refs::{compute_backward_refs, prefix_encode};
use super::bitwriter::BitWriter;
use super::histogram::Histograms;
use super::huffman::{build_huffman_codes, write_huffman_codes, HuffmanCode};
use super::transforms::{
    apply_color_transform, apply_palette_transform, apply_predict_transform,
    apply_subtract_green_transform,
};
use super::types::{
    argb_alpha, argb_blue, argb_green, argb_red, make_argb, subsample_size, PixOrCopy,
    MAX_CODE_DEPTH, NUM_LITERAL_CODES,
};
use crate::api::EncodeError;

/// Transform selection for one frame.
///
/// Indexed input uses color indexing alone; everything else gets the
/// predictor and subtract-green passes. The color transform is wired but
/// not part of either default set.
#[derive(Debug, Clone, Copy)]
pub struct TransformSet {
    predict: bool,
    color: bool,
    subtract_green: bool,
    color_indexing: bool,
}

impl TransformSet {
    /// Default transform set for the given input kind.
    pub fn for_input(indexed: bool) -> Self {
        Self {
            predict: !indexed,
            color: false,
            subtract_green: !indexed,
            color_indexing: indexed,
        }
    }
}

/// Encode one frame into a standalone VP8L payload.
///
/// Returns the payload (already even-padded for RIFF) and whether any
/// input pixel carried an alpha value below 255.
pub fn encode_frame(
    rgba: &[u8],
    width: usize,
    height: usize,
    transforms: TransformSet,
    cache_bits: u8,
) -> Result<(Vec<u8>, bool), EncodeError> {
    let mut pixels: Vec<u32> = rgba
        .chunks_exact(4)
        .map(|p| make_argb(p[3], p[0], p[1], p[2]))
        .collect();
    let has_alpha = pixels.iter().any(|&p| argb_alpha(p) < 255);

    let mut w = BitWriter::with_capacity(width * height / 2 + 64);
    write_bitstream_header(&mut w, width, height, has_alpha);

    let mut effective_width = width;

    if transforms.color_indexing {
        w.write_bits(1, 1);
        w.write_bits(3, 2);

        let palette = apply_palette_transform(&mut pixels, width, height)?;
        effective_width = palette.packed_width;

        w.write_bits(palette.palette.len() as u64 - 1, 8);
        write_image_data(&mut w, &palette.palette, palette.palette.len(), false, cache_bits);
    }

    if transforms.subtract_green {
        w.write_bits(1, 1);
        w.write_bits(2, 2);

        apply_subtract_green_transform(&mut pixels);
    }

    if transforms.color {
        w.write_bits(1, 1);
        w.write_bits(1, 2);

        let (bits, bw, _bh, blocks) = apply_color_transform(&mut pixels, width, height);
        w.write_bits(u64::from(bits) - 2, 3);
        write_image_data(&mut w, &blocks, bw, false, cache_bits);
    }

    if transforms.predict {
        w.write_bits(1, 1);
        w.write_bits(0, 2);

        let (bits, blocks) = apply_predict_transform(&mut pixels, width, height);
        let block_width = subsample_size(width, bits);
        w.write_bits(u64::from(bits) - 2, 3);
        write_image_data(&mut w, &blocks, block_width, false, cache_bits);
    }

    w.write_bits(0, 1); // end of transforms

    write_image_data(&mut w, &pixels, effective_width, true, cache_bits);

    w.align_byte();
    let mut payload = w.finish();
    if payload.len() % 2 != 0 {
        payload.push(0x00);
    }

    Ok((payload, has_alpha))
}

/// Write the VP8L signature and frame geometry.
fn write_bitstream_header(w: &mut BitWriter, width: usize, height: usize, has_alpha: bool) {
    w.write_bits(0x2f, 8);
    w.write_bits(width as u64 - 1, 14);
    w.write_bits(height as u64 - 1, 14);
    w.write_bits(u64::from(has_alpha), 1);
    w.write_bits(0, 3); // version
}

/// Emit one (sub-)image: color-cache declaration, token stream, and its
/// five Huffman tables.
///
/// `is_top` distinguishes the main image, which carries the (absent)
/// meta-Huffman bit; block images and palettes skip it.
fn write_image_data(
    w: &mut BitWriter,
    pixels: &[u32],
    width: usize,
    is_top: bool,
    cache_bits: u8,
) {
    if cache_bits > 0 {
        w.write_bits(1, 1);
        w.write_bits(u64::from(cache_bits), 4);
    } else {
        w.write_bits(0, 1);
    }

    if is_top {
        w.write_bits(0, 1); // single Huffman group
    }

    let refs = compute_backward_refs(pixels, width, cache_bits);
    let histos = Histograms::from_refs(&refs, cache_bits);

    let codes = [
        build_huffman_codes(&histos.literal, MAX_CODE_DEPTH),
        build_huffman_codes(&histos.red, MAX_CODE_DEPTH),
        build_huffman_codes(&histos.blue, MAX_CODE_DEPTH),
        build_huffman_codes(&histos.alpha, MAX_CODE_DEPTH),
        build_huffman_codes(&histos.distance, MAX_CODE_DEPTH),
    ];
    for table in &codes {
        write_huffman_codes(w, table);
    }

    write_token_stream(w, &refs, &codes);
}

/// Second pass over the tokens: emit codes and raw extra bits.
fn write_token_stream(w: &mut BitWriter, refs: &[PixOrCopy], codes: &[Vec<HuffmanCode>; 5]) {
    for token in refs {
        match *token {
            PixOrCopy::Literal(argb) => {
                w.write_code(codes[0][argb_green(argb) as usize]);
                w.write_code(codes[1][argb_red(argb) as usize]);
                w.write_code(codes[2][argb_blue(argb) as usize]);
                w.write_code(codes[3][argb_alpha(argb) as usize]);
            }
            PixOrCopy::CacheIdx(idx) => {
                w.write_code(codes[0][256 + 24 + idx as usize]);
            }
            PixOrCopy::Copy { len, dist_code } => {
                let (len_code, len_extra_bits, len_extra) = prefix_encode(u32::from(len));
                w.write_code(codes[0][NUM_LITERAL_CODES + len_code as usize]);
                if len_extra_bits > 0 {
                    w.write_bits(u64::from(len_extra), len_extra_bits);
                }

                let (dist_prefix, dist_extra_bits, dist_extra) = prefix_encode(dist_code);
                w.write_code(codes[4][dist_prefix as usize]);
                if dist_extra_bits > 0 {
                    w.write_bits(u64::from(dist_extra), dist_extra_bits);
                }
            }
        }
    }
}
