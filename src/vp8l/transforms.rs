//! Image transforms for VP8L encoding.
//!
//! Four reversible pre-passes over the pixel array. Each writes a small
//! header into the bitstream (handled by the image writer) and may produce
//! an auxiliary sub-image: a per-tile block image or a palette.

use alloc::vec;
use alloc::vec::Vec;

use super::types::{argb_alpha, argb_blue, argb_green, argb_red, make_argb, sub_pixels, subsample_size};
use crate::api::EncodeError;

/// Tile side exponent for the predictor and color transforms.
pub const TRANSFORM_TILE_BITS: u8 = 4;

/// Predictor applied uniformly to every tile ("left").
pub const UNIFORM_PREDICTOR: u8 = 1;

/// Apply the subtract-green transform in place: R -= G, B -= G.
pub fn apply_subtract_green_transform(pixels: &mut [u32]) {
    for pixel in pixels.iter_mut() {
        let a = argb_alpha(*pixel);
        let r = argb_red(*pixel);
        let g = argb_green(*pixel);
        let b = argb_blue(*pixel);
        *pixel = make_argb(a, r.wrapping_sub(g), g, b.wrapping_sub(g));
    }
}

/// Average two pixels channel-wise.
#[inline]
fn average2(a: u32, b: u32) -> u32 {
    make_argb(
        ((u16::from(argb_alpha(a)) + u16::from(argb_alpha(b))) / 2) as u8,
        ((u16::from(argb_red(a)) + u16::from(argb_red(b))) / 2) as u8,
        ((u16::from(argb_green(a)) + u16::from(argb_green(b))) / 2) as u8,
        ((u16::from(argb_blue(a)) + u16::from(argb_blue(b))) / 2) as u8,
    )
}

#[inline]
fn clamp_channel(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

/// Paeth-like select: prefer the neighbor closer to L + T - TL, ties to top.
fn select(t: u32, l: u32, tl: u32) -> u32 {
    let pa = i32::from(argb_alpha(l)) + i32::from(argb_alpha(t)) - i32::from(argb_alpha(tl));
    let pr = i32::from(argb_red(l)) + i32::from(argb_red(t)) - i32::from(argb_red(tl));
    let pg = i32::from(argb_green(l)) + i32::from(argb_green(t)) - i32::from(argb_green(tl));
    let pb = i32::from(argb_blue(l)) + i32::from(argb_blue(t)) - i32::from(argb_blue(tl));

    let dist_l = (pa - i32::from(argb_alpha(l))).abs()
        + (pr - i32::from(argb_red(l))).abs()
        + (pg - i32::from(argb_green(l))).abs()
        + (pb - i32::from(argb_blue(l))).abs();
    let dist_t = (pa - i32::from(argb_alpha(t))).abs()
        + (pr - i32::from(argb_red(t))).abs()
        + (pg - i32::from(argb_green(t))).abs()
        + (pb - i32::from(argb_blue(t))).abs();

    if dist_l < dist_t {
        l
    } else {
        t
    }
}

fn clamp_add_subtract_full(t: u32, l: u32, tl: u32) -> u32 {
    make_argb(
        clamp_channel(i32::from(argb_alpha(l)) + i32::from(argb_alpha(t)) - i32::from(argb_alpha(tl))),
        clamp_channel(i32::from(argb_red(l)) + i32::from(argb_red(t)) - i32::from(argb_red(tl))),
        clamp_channel(i32::from(argb_green(l)) + i32::from(argb_green(t)) - i32::from(argb_green(tl))),
        clamp_channel(i32::from(argb_blue(l)) + i32::from(argb_blue(t)) - i32::from(argb_blue(tl))),
    )
}

fn clamp_add_subtract_half(t: u32, l: u32, tl: u32) -> u32 {
    let avg = average2(l, t);
    make_argb(
        clamp_channel(
            i32::from(argb_alpha(avg)) + (i32::from(argb_alpha(avg)) - i32::from(argb_alpha(tl))) / 2,
        ),
        clamp_channel(
            i32::from(argb_red(avg)) + (i32::from(argb_red(avg)) - i32::from(argb_red(tl))) / 2,
        ),
        clamp_channel(
            i32::from(argb_green(avg)) + (i32::from(argb_green(avg)) - i32::from(argb_green(tl))) / 2,
        ),
        clamp_channel(
            i32::from(argb_blue(avg)) + (i32::from(argb_blue(avg)) - i32::from(argb_blue(tl))) / 2,
        ),
    )
}

/// Predict the pixel at (x, y) with one of the 14 VP8L filters.
///
/// Border rules override the filter index: the origin predicts opaque
/// black, the first row predicts left, the first column predicts top.
pub fn predict_pixel(pixels: &[u32], width: usize, x: usize, y: usize, prediction: u8) -> u32 {
    if x == 0 && y == 0 {
        return 0xff00_0000;
    } else if x == 0 {
        return pixels[(y - 1) * width + x];
    } else if y == 0 {
        return pixels[y * width + (x - 1)];
    }

    let t = pixels[(y - 1) * width + x];
    let l = pixels[y * width + (x - 1)];
    let tl = pixels[(y - 1) * width + (x - 1)];
    // At the right edge this wraps to the first pixel of the current row,
    // matching the decoder's flat-buffer indexing.
    let tr = pixels[(y - 1) * width + (x + 1)];

    match prediction {
        0 => 0xff00_0000,
        1 => l,
        2 => t,
        3 => tr,
        4 => tl,
        5 => average2(average2(l, tr), t),
        6 => average2(l, tl),
        7 => average2(l, t),
        8 => average2(tl, t),
        9 => average2(t, tr),
        10 => average2(average2(l, tl), average2(t, tr)),
        11 => select(t, l, tl),
        12 => clamp_add_subtract_full(t, l, tl),
        _ => clamp_add_subtract_half(t, l, tl),
    }
}

/// Apply the predictor transform, replacing pixels with residuals.
///
/// Every tile uses the same predictor; residuals are taken against the
/// original neighbor values. Returns the tile-grid block image (one pixel
/// per tile, predictor index in the green channel).
pub fn apply_predict_transform(pixels: &mut [u32], width: usize, height: usize) -> (u8, Vec<u32>) {
    let tile_bits = TRANSFORM_TILE_BITS;
    let bw = subsample_size(width, tile_bits);
    let bh = subsample_size(height, tile_bits);

    let mut blocks = vec![0u32; bw * bh];
    let mut deltas = vec![0u32; width * height];

    let mode = UNIFORM_PREDICTOR;
    for by in 0..bh {
        for bx in 0..bw {
            let mx = ((bx + 1) << tile_bits).min(width);
            let my = ((by + 1) << tile_bits).min(height);

            for ty in (by << tile_bits)..my {
                for tx in (bx << tile_bits)..mx {
                    let predicted = predict_pixel(pixels, width, tx, ty, mode);
                    let off = ty * width + tx;
                    deltas[off] = sub_pixels(pixels[off], predicted);
                }
            }

            blocks[by * bw + bx] = make_argb(255, 0, mode, 0);
        }
    }

    pixels.copy_from_slice(&deltas);

    (tile_bits, blocks)
}

/// Per-tile coefficients of the color transform, 5-bit fixed point.
#[derive(Debug, Clone, Copy)]
pub struct ColorTransformElement {
    /// Red-to-blue correlation.
    pub red_to_blue: u8,
    /// Green-to-blue correlation.
    pub green_to_blue: u8,
    /// Green-to-red correlation.
    pub green_to_red: u8,
}

/// Coefficients used whenever the color transform is enabled.
pub const FIXED_CTE: ColorTransformElement = ColorTransformElement {
    red_to_blue: 1,
    green_to_blue: 2,
    green_to_red: 3,
};

#[inline]
fn color_delta(coeff: u8, channel: u8) -> u8 {
    ((i32::from(coeff as i8) * i32::from(channel as i8)) >> 5) as u8
}

/// Apply the cross-color transform with the fixed per-tile coefficients.
///
/// Returns the tile bits, grid dimensions, and the block image carrying
/// the coefficients.
pub fn apply_color_transform(
    pixels: &mut [u32],
    width: usize,
    height: usize,
) -> (u8, usize, usize, Vec<u32>) {
    let tile_bits = TRANSFORM_TILE_BITS;
    let bw = subsample_size(width, tile_bits);
    let bh = subsample_size(height, tile_bits);

    let cte = FIXED_CTE;
    for pixel in pixels.iter_mut() {
        let a = argb_alpha(*pixel);
        let r = argb_red(*pixel);
        let g = argb_green(*pixel);
        let b = argb_blue(*pixel);

        // Blue sees the original red; order is fixed by the format.
        let mut new_b = b.wrapping_sub(color_delta(cte.green_to_blue, g));
        new_b = new_b.wrapping_sub(color_delta(cte.red_to_blue, r));
        let new_r = r.wrapping_sub(color_delta(cte.green_to_red, g));

        *pixel = make_argb(a, new_r, g, new_b);
    }

    let blocks = vec![
        make_argb(255, cte.red_to_blue, cte.green_to_blue, cte.green_to_red);
        bw * bh
    ];

    (tile_bits, bw, bh, blocks)
}

/// Index packing parameters for a palette size: (pixels per packed byte,
/// bits per index).
fn palette_packing(palette_len: usize) -> (usize, u8) {
    if palette_len <= 2 {
        (8, 1)
    } else if palette_len <= 4 {
        (4, 2)
    } else if palette_len <= 16 {
        (2, 4)
    } else {
        (1, 8)
    }
}

/// Result of the color-indexing transform.
#[derive(Debug)]
pub struct PaletteTransform {
    /// Delta-encoded palette, ready to be written as a 1-row sub-image.
    pub palette: Vec<u32>,
    /// Width of the raster after index packing.
    pub packed_width: usize,
}

/// Apply the color-indexing transform.
///
/// Builds the palette in first-appearance order, replaces pixels with
/// `(0, index, 0, 255)`, bit-packs indices into the green channel when the
/// palette is small (shrinking the effective width, rows padded
/// independently), and delta-encodes the palette in place.
pub fn apply_palette_transform(
    pixels: &mut Vec<u32>,
    width: usize,
    height: usize,
) -> Result<PaletteTransform, EncodeError> {
    let mut palette: Vec<u32> = Vec::new();
    for &p in pixels.iter() {
        if !palette.contains(&p) {
            if palette.len() >= 256 {
                return Err(EncodeError::TooManyColors);
            }
            palette.push(p);
        }
    }

    for pixel in pixels.iter_mut() {
        let idx = palette.iter().position(|&c| c == *pixel).unwrap() as u8;
        *pixel = make_argb(255, 0, idx, 0);
    }

    let (pack, index_bits) = palette_packing(palette.len());
    let packed_width = if pack > 1 {
        let packed_width = width.div_ceil(pack);
        let mut packed = vec![0u32; packed_width * height];
        for y in 0..height {
            for px in 0..packed_width {
                let mut bundle = 0u8;
                for k in 0..pack {
                    let x = px * pack + k;
                    if x >= width {
                        break;
                    }
                    let idx = argb_green(pixels[y * width + x]);
                    bundle |= idx << (k as u8 * index_bits);
                }
                packed[y * packed_width + px] = make_argb(255, 0, bundle, 0);
            }
        }
        *pixels = packed;
        packed_width
    } else {
        width
    };

    for i in (1..palette.len()).rev() {
        palette[i] = sub_pixels(palette[i], palette[i - 1]);
    }

    Ok(PaletteTransform {
        palette,
        packed_width,
    })
}
