//! Public encoding API: input types, options, errors, and entry points.

use alloc::vec::Vec;

use thiserror::Error;

use crate::mux::{assemble_animation, assemble_single, AnimationParams, FrameChunk};
use crate::vp8l::{encode_frame, TransformSet, DEFAULT_CACHE_BITS};

/// Largest width or height the WebP format can express.
const MAX_DIMENSION: u32 = 1 << 14;

/// Error that can occur during encoding.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// Width or height is zero.
    #[error("image has no pixels")]
    EmptyImage,

    /// Width or height exceeds the 16384 format limit.
    #[error("image dimensions {width}x{height} exceed the WebP limit of 16384")]
    ImageTooLarge {
        /// Rejected width.
        width: u32,
        /// Rejected height.
        height: u32,
    },

    /// The buffer is not straight-alpha 8-bit RGBA of the declared size.
    #[error("pixel buffer is not {expected} bytes of straight-alpha RGBA (got {got})")]
    UnsupportedPixelFormat {
        /// Required buffer length (width * height * 4).
        expected: usize,
        /// Provided buffer length.
        got: usize,
    },

    /// Color indexing was requested but the input has more than 256 colors.
    #[error("palette transform requested but input has more than 256 colors")]
    TooManyColors,

    /// Animation frame, duration, and disposal counts disagree.
    #[error(
        "animation arrays disagree: {frames} frames, {durations} durations, {disposals} disposals"
    )]
    MismatchedAnimation {
        /// Number of frames.
        frames: usize,
        /// Number of durations.
        durations: usize,
        /// Number of disposals.
        disposals: usize,
    },

    /// The animation contains no frames.
    #[error("animation has no frames")]
    EmptyAnimation,

    /// The output sink reported an error.
    #[cfg(feature = "std")]
    #[error("writing output failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A borrowed straight-alpha RGBA raster to encode.
#[derive(Debug, Clone, Copy)]
pub struct Picture<'a> {
    rgba: &'a [u8],
    width: u32,
    height: u32,
    indexed: bool,
}

impl<'a> Picture<'a> {
    /// Wrap an RGBA buffer (4 bytes per pixel, row-major).
    pub fn from_rgba(rgba: &'a [u8], width: u32, height: u32) -> Result<Self, EncodeError> {
        Self::new(rgba, width, height, false)
    }

    /// Wrap an RGBA buffer that came from a paletted source.
    ///
    /// The encoder applies the color-indexing transform instead of the
    /// predictor pipeline; encoding fails with [`EncodeError::TooManyColors`]
    /// when the buffer holds more than 256 distinct colors.
    pub fn from_indexed_rgba(rgba: &'a [u8], width: u32, height: u32) -> Result<Self, EncodeError> {
        Self::new(rgba, width, height, true)
    }

    fn new(rgba: &'a [u8], width: u32, height: u32, indexed: bool) -> Result<Self, EncodeError> {
        if width == 0 || height == 0 {
            return Err(EncodeError::EmptyImage);
        }
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(EncodeError::ImageTooLarge { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(EncodeError::UnsupportedPixelFormat {
                expected,
                got: rgba.len(),
            });
        }
        Ok(Self {
            rgba,
            width,
            height,
            indexed,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// How a frame's canvas area is treated after its duration elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposal {
    /// Leave the canvas as rendered.
    #[default]
    None,
    /// Restore the frame rectangle to the background color.
    Background,
}

impl Disposal {
    fn wire_value(self) -> u8 {
        match self {
            Disposal::None => 0,
            Disposal::Background => 1,
        }
    }
}

/// An animation: frames plus per-frame timing and disposal.
#[derive(Debug, Clone)]
pub struct Animation<'a> {
    /// Frames in display order.
    pub frames: Vec<Picture<'a>>,
    /// Per-frame durations in milliseconds (clamped to 2^24 - 1 on the
    /// wire).
    pub durations_ms: Vec<u32>,
    /// Per-frame disposal methods.
    pub disposals: Vec<Disposal>,
    /// Number of loops; 0 means loop forever.
    pub loop_count: u16,
    /// Canvas background color in BGRA byte order.
    pub background_color: u32,
}

/// Encoder options.
///
/// `use_extended_format` wraps a single frame in a VP8X container, needed
/// when metadata chunks will be appended downstream. Animations always use
/// the extended container.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncoderOptions {
    /// Emit a VP8X header even for single-frame output.
    pub use_extended_format: bool,
}

/// Encode a single picture into a complete WebP file.
pub fn encode(picture: &Picture<'_>, options: &EncoderOptions) -> Result<Vec<u8>, EncodeError> {
    let (payload, has_alpha) = encode_frame(
        picture.rgba,
        picture.width as usize,
        picture.height as usize,
        TransformSet::for_input(picture.indexed),
        DEFAULT_CACHE_BITS,
    )?;

    Ok(assemble_single(
        &payload,
        picture.width,
        picture.height,
        has_alpha,
        options.use_extended_format,
    ))
}

/// Encode an animation into a complete WebP file.
///
/// Frames render at the canvas origin; the canvas takes the largest frame
/// width and height so every frame fits.
pub fn encode_animation(
    animation: &Animation<'_>,
    _options: &EncoderOptions,
) -> Result<Vec<u8>, EncodeError> {
    if animation.frames.is_empty() {
        return Err(EncodeError::EmptyAnimation);
    }
    if animation.durations_ms.len() != animation.frames.len()
        || animation.disposals.len() != animation.frames.len()
    {
        return Err(EncodeError::MismatchedAnimation {
            frames: animation.frames.len(),
            durations: animation.durations_ms.len(),
            disposals: animation.disposals.len(),
        });
    }

    let mut chunks = Vec::with_capacity(animation.frames.len());
    let mut has_alpha = false;
    for ((frame, &duration_ms), &dispose) in animation
        .frames
        .iter()
        .zip(&animation.durations_ms)
        .zip(&animation.disposals)
    {
        let (payload, frame_alpha) = encode_frame(
            frame.rgba,
            frame.width as usize,
            frame.height as usize,
            TransformSet::for_input(frame.indexed),
            DEFAULT_CACHE_BITS,
        )?;
        has_alpha |= frame_alpha;
        chunks.push(FrameChunk {
            payload,
            width: frame.width,
            height: frame.height,
            duration_ms,
            dispose: dispose.wire_value(),
        });
    }

    let canvas_width = animation.frames.iter().map(|f| f.width).max().unwrap();
    let canvas_height = animation.frames.iter().map(|f| f.height).max().unwrap();
    Ok(assemble_animation(
        &chunks,
        canvas_width,
        canvas_height,
        has_alpha,
        AnimationParams {
            background_color: animation.background_color,
            loop_count: animation.loop_count,
        },
    ))
}

/// Encode a single picture into a `std::io::Write` sink.
#[cfg(feature = "std")]
pub fn encode_to_writer<W: std::io::Write>(
    mut writer: W,
    picture: &Picture<'_>,
    options: &EncoderOptions,
) -> Result<(), EncodeError> {
    let bytes = encode(picture, options)?;
    writer.write_all(&bytes)?;
    Ok(())
}

/// Encode an animation into a `std::io::Write` sink.
#[cfg(feature = "std")]
pub fn encode_animation_to_writer<W: std::io::Write>(
    mut writer: W,
    animation: &Animation<'_>,
    options: &EncoderOptions,
) -> Result<(), EncodeError> {
    let bytes = encode_animation(animation, options)?;
    writer.write_all(&bytes)?;
    Ok(())
}
