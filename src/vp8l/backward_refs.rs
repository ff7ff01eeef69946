//! Backward-reference finding and prefix coding.
//!
//! Converts a pixel raster into the VP8L token stream: literal RGBA groups,
//! LZ77 copies with remapped distances, and color-cache hits.

use alloc::vec;
use alloc::vec::Vec;

use super::color_cache::ColorCache;
use super::types::{pixel_hash, PixOrCopy};

/// Hash table bits for the match-finder chain heads.
const HASH_BITS: u8 = 14;
const HASH_SIZE: usize = 1 << HASH_BITS;

/// Sliding-window limit for match distances.
const WINDOW_SIZE: usize = (1 << 20) - 120;
/// Maximum match length.
const MAX_LENGTH: usize = 4096;
/// Minimum profitable match length.
const MIN_LENGTH: usize = 3;
/// Maximum hash-chain candidates examined per position.
const MAX_CHAIN_STEPS: usize = 8;

/// Triple-hash mix multipliers.
const HASH_MULT_A: u32 = 0x9e37_79b9;
const HASH_MULT_B: u32 = 0x85eb_ca6b;

/// Reverse lookup table: `(yoffset * 16 + 8 - xoffset)` (or the mirrored
/// form for negative x offsets) to a short-distance code. The 255 cells are
/// unreachable from valid offsets. Fixed by the VP8L format.
#[rustfmt::skip]
const PLANE_TO_CODE_LUT: [u8; 128] = [
    96,  73,  55,  39,  23, 13, 5,  1,  255, 255, 255, 255, 255, 255, 255, 255,
    101, 78,  58,  42,  26, 16, 8,  2,  0,   3,   9,   17,  27,  43,  59,  79,
    102, 86,  62,  46,  32, 20, 10, 6,  4,   7,   11,  21,  33,  47,  63,  87,
    105, 90,  70,  52,  37, 28, 18, 14, 12,  15,  19,  29,  38,  53,  71,  91,
    110, 99,  82,  66,  48, 35, 30, 24, 22,  25,  31,  36,  49,  67,  83,  100,
    115, 108, 94,  76,  64, 50, 44, 40, 34,  41,  45,  51,  65,  77,  95,  109,
    118, 113, 103, 92,  80, 68, 60, 56, 54,  57,  61,  69,  81,  93,  104, 114,
    119, 116, 111, 106, 97, 88, 84, 74, 72,  75,  85,  89,  98,  107, 112, 117,
];

/// Remap a linear distance to a distance code.
///
/// Offsets within an 8-pixel 2-D neighborhood get the low 120 codes; all
/// other distances map to `dist + 120`.
pub fn distance_to_code(xsize: usize, dist: usize) -> u32 {
    let yoffset = dist / xsize;
    let xoffset = dist - yoffset * xsize;

    if xoffset <= 8 && yoffset < 8 {
        u32::from(PLANE_TO_CODE_LUT[yoffset * 16 + 8 - xoffset]) + 1
    } else if xoffset > xsize.saturating_sub(8) && yoffset < 7 {
        u32::from(PLANE_TO_CODE_LUT[(yoffset + 1) * 16 + 8 + (xsize - xoffset)]) + 1
    } else {
        (dist + 120) as u32
    }
}

/// Prefix-code a positive value into (code, extra-bit count, extra value).
///
/// The code travels through a Huffman table; the extra value is emitted as
/// raw bits.
pub fn prefix_encode(n: u32) -> (u32, u8, u32) {
    debug_assert!(n >= 1);
    let code = if n <= 5 {
        n - 1
    } else {
        let mut rem = n - 1;
        let mut shift = 0;
        while rem > 3 {
            rem >>= 1;
            shift += 1;
        }
        if rem == 2 {
            2 + 2 * shift
        } else {
            3 + 2 * shift
        }
    };

    let extra_bits = prefix_extra_bits(code);
    let extra = if extra_bits == 0 {
        0
    } else {
        let shift = (code - 2) >> 1;
        let base = (2 + (code & 1)) << shift;
        n - base - 1
    };

    (code, extra_bits, extra)
}

/// Number of raw extra bits carried by a prefix code.
#[inline]
pub fn prefix_extra_bits(code: u32) -> u8 {
    if code < 4 {
        0
    } else {
        ((code - 2) >> 1) as u8
    }
}

/// Hash a pixel triple into a chain bucket.
#[inline]
fn triple_hash(p0: u32, p1: u32, p2: u32) -> usize {
    let h = pixel_hash(p0, HASH_BITS)
        ^ pixel_hash(p1, HASH_BITS).wrapping_mul(HASH_MULT_A)
        ^ pixel_hash(p2, HASH_BITS).wrapping_mul(HASH_MULT_B);
    (h as usize) & (HASH_SIZE - 1)
}

/// Convert a pixel raster into the token stream.
///
/// Greedy chained-hash LZ77 over 3-pixel keys: at each position the most
/// recent positions sharing the triple hash are tried (up to 8, within the
/// sliding window), the longest forward extension wins, and runs shorter
/// than 3 fall back to literal or cache-hit emission. The color cache is
/// updated for every pixel a match covers so it stays coherent with the
/// decoder.
pub fn compute_backward_refs(
    pixels: &[u32],
    width: usize,
    cache_bits: u8,
) -> Vec<PixOrCopy> {
    let n = pixels.len();
    let mut refs = Vec::with_capacity(n);
    let mut cache = (cache_bits > 0).then(|| ColorCache::new(cache_bits));

    // head holds 1-based positions (0 = empty); prev chains them backwards.
    let mut head = vec![0u32; HASH_SIZE];
    let mut prev = vec![0u32; n];

    let mut i = 0;
    while i < n {
        let mut best_len = 0usize;
        let mut best_dist = 0usize;

        if i + 2 < n {
            let bucket = triple_hash(pixels[i], pixels[i + 1], pixels[i + 2]);
            let mut candidate = head[bucket];
            prev[i] = candidate;
            head[bucket] = (i + 1) as u32;

            let limit = MAX_LENGTH.min(n - i);
            for _ in 0..MAX_CHAIN_STEPS {
                if candidate == 0 {
                    break;
                }
                let pos = (candidate - 1) as usize;
                let dist = i - pos;
                if dist >= WINDOW_SIZE {
                    break;
                }

                let mut len = 0;
                while len < limit && pixels[pos + len] == pixels[i + len] {
                    len += 1;
                }
                if len > best_len {
                    best_len = len;
                    best_dist = dist;
                }

                candidate = prev[pos];
            }
        }

        if best_len >= MIN_LENGTH {
            refs.push(PixOrCopy::Copy {
                len: best_len as u16,
                dist_code: distance_to_code(width, best_dist),
            });
            if let Some(cache) = cache.as_mut() {
                for k in 0..best_len {
                    cache.insert(pixels[i + k]);
                }
            }
            i += best_len;
        } else {
            let argb = pixels[i];
            match cache.as_mut() {
                Some(cache) => {
                    if let Some(idx) = cache.lookup(argb) {
                        refs.push(PixOrCopy::CacheIdx(idx));
                    } else {
                        cache.insert(argb);
                        refs.push(PixOrCopy::Literal(argb));
                    }
                }
                None => refs.push(PixOrCopy::Literal(argb)),
            }
            i += 1;
        }
    }

    refs
}
