//! VP8L (lossless WebP) bitstream encoder.
//!
//! Implements the VP8L format as specified in:
//! <https://developers.google.com/speed/webp/docs/webp_lossless_bitstream_specification>

mod backward_refs;
mod bitwriter;
mod color_cache;
mod encode;
mod histogram;
mod huffman;
mod transforms;
pub(crate) mod types;

pub(crate) use encode::{encode_frame, TransformSet};
pub(crate) use types::DEFAULT_CACHE_BITS;
