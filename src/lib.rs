//! Native lossless WebP (VP8L) encoding.
//!
//! This crate writes the VP8L lossless bitstream together with the thin RIFF
//! container framing required for a standalone `.webp` file, including the
//! extended (VP8X) container and ANIM/ANMF animation chunks. Decoded output
//! is bit-identical to the input pixels on any conformant WebP decoder.
//!
//! The encoder implements the chained VP8L image transforms (predictor,
//! color, subtract-green, color indexing), an LZ77 back-reference match
//! finder with the short-distance remapping table, the color cache, and
//! length-limited canonical prefix codes, all emitted LSB-first through a
//! single bit sink.
//!
//! # Encoding a single image
//!
//! ```rust
//! use picowebp::{encode, EncoderOptions, Picture};
//!
//! let rgba = vec![255u8; 4 * 4 * 4]; // 4x4 opaque white
//! let picture = Picture::from_rgba(&rgba, 4, 4)?;
//! let webp = encode(&picture, &EncoderOptions::default())?;
//! assert_eq!(&webp[..4], b"RIFF");
//! # Ok::<(), picowebp::EncodeError>(())
//! ```
//!
//! # Encoding an animation
//!
//! ```rust
//! use picowebp::{encode_animation, Animation, Disposal, EncoderOptions, Picture};
//!
//! let red = vec![[255u8, 0, 0, 255]; 16].concat();
//! let blue = vec![[0u8, 0, 255, 255]; 16].concat();
//! let animation = Animation {
//!     frames: vec![
//!         Picture::from_rgba(&red, 4, 4)?,
//!         Picture::from_rgba(&blue, 4, 4)?,
//!     ],
//!     durations_ms: vec![100, 100],
//!     disposals: vec![Disposal::None, Disposal::None],
//!     loop_count: 0,
//!     background_color: 0,
//! };
//! let webp = encode_animation(&animation, &EncoderOptions::default())?;
//! assert_eq!(&webp[12..16], b"VP8X");
//! # Ok::<(), picowebp::EncodeError>(())
//! ```
//!
//! # no_std support
//!
//! The crate works in `no_std + alloc` environments:
//!
//! ```toml
//! [dependencies]
//! picowebp = { version = "...", default-features = false }
//! ```
//!
//! Only the `*_to_writer` entry points require `std` (for `std::io::Write`).

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

extern crate alloc;

mod api;
mod mux;
mod vec_writer;
mod vp8l;

pub use api::{
    encode, encode_animation, Animation, Disposal, EncodeError, EncoderOptions, Picture,
};

#[cfg(feature = "std")]
pub use api::{encode_animation_to_writer, encode_to_writer};
