//! Container framing tests.
//!
//! Byte-level checks of the RIFF, VP8X, ANIM, and ANMF layout, plus
//! decoding of the VP8L payload embedded in each animation frame.

use std::io::Cursor;

use image_webp::WebPDecoder;
use picowebp::{
    encode, encode_animation, Animation, Disposal, EncodeError, EncoderOptions, Picture,
};

fn solid_rgba(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    rgba.iter()
        .copied()
        .cycle()
        .take((width * height * 4) as usize)
        .collect()
}

fn le32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes(bytes[..4].try_into().unwrap())
}

fn le24(bytes: &[u8]) -> u32 {
    u32::from(bytes[0]) | u32::from(bytes[1]) << 8 | u32::from(bytes[2]) << 16
}

#[test]
fn simple_file_layout() {
    let rgba = solid_rgba(4, 4, [1, 2, 3, 255]);
    let picture = Picture::from_rgba(&rgba, 4, 4).unwrap();
    let webp = encode(&picture, &EncoderOptions::default()).unwrap();

    assert_eq!(&webp[0..4], b"RIFF");
    assert_eq!(le32(&webp[4..]) as usize, webp.len() - 8);
    assert_eq!(&webp[8..12], b"WEBP");
    assert_eq!(&webp[12..16], b"VP8L");
    let payload_len = le32(&webp[16..]) as usize;
    assert_eq!(payload_len, webp.len() - 20);
    // RIFF chunks are even-sized.
    assert_eq!(payload_len % 2, 0);
    assert_eq!(webp[20], 0x2F);
}

#[test]
fn extended_file_layout() {
    let rgba = solid_rgba(10, 6, [1, 2, 3, 200]);
    let picture = Picture::from_rgba(&rgba, 10, 6).unwrap();
    let options = EncoderOptions {
        use_extended_format: true,
    };
    let webp = encode(&picture, &options).unwrap();

    assert_eq!(&webp[12..16], b"VP8X");
    assert_eq!(le32(&webp[16..]), 10);
    // Alpha flag only; no animation bit.
    assert_eq!(webp[20], 1 << 4);
    assert_eq!(&webp[21..24], &[0, 0, 0]);
    assert_eq!(le24(&webp[24..]), 9); // width - 1
    assert_eq!(le24(&webp[27..]), 5); // height - 1
    assert_eq!(&webp[30..34], b"VP8L");
}

#[test]
fn extended_flag_without_alpha() {
    let rgba = solid_rgba(4, 4, [5, 6, 7, 255]);
    let picture = Picture::from_rgba(&rgba, 4, 4).unwrap();
    let options = EncoderOptions {
        use_extended_format: true,
    };
    let webp = encode(&picture, &options).unwrap();
    assert_eq!(webp[20], 0);
}

/// Extract (x, y, w, h, duration, flags, vp8l_payload) for every ANMF chunk.
fn parse_anmf_frames(webp: &[u8]) -> Vec<(u32, u32, u32, u32, u32, u8, Vec<u8>)> {
    let mut frames = Vec::new();
    let mut pos = 12;
    while pos + 8 <= webp.len() {
        let tag = &webp[pos..pos + 4];
        let size = le32(&webp[pos + 4..]) as usize;
        let body = &webp[pos + 8..pos + 8 + size];
        if tag == b"ANMF" {
            let vp8l_size = le32(&body[20..]) as usize;
            frames.push((
                le24(&body[0..]) * 2,
                le24(&body[3..]) * 2,
                le24(&body[6..]) + 1,
                le24(&body[9..]) + 1,
                le24(&body[12..]),
                body[15],
                body[24..24 + vp8l_size].to_vec(),
            ));
        }
        pos += 8 + size + (size & 1);
    }
    frames
}

#[test]
fn animation_layout_and_frame_payloads() {
    let red = solid_rgba(6, 4, [250, 0, 0, 255]);
    let green = solid_rgba(6, 4, [0, 250, 0, 255]);
    let animation = Animation {
        frames: vec![
            Picture::from_rgba(&red, 6, 4).unwrap(),
            Picture::from_rgba(&green, 6, 4).unwrap(),
        ],
        durations_ms: vec![125, 80],
        disposals: vec![Disposal::None, Disposal::Background],
        loop_count: 5,
        background_color: 0xFF00_00FF,
    };
    let webp = encode_animation(&animation, &EncoderOptions::default()).unwrap();

    assert_eq!(&webp[0..4], b"RIFF");
    assert_eq!(le32(&webp[4..]) as usize, webp.len() - 8);
    assert_eq!(&webp[8..12], b"WEBP");

    // VP8X with the animation bit set.
    assert_eq!(&webp[12..16], b"VP8X");
    assert_ne!(webp[20] & (1 << 1), 0);
    assert_eq!(le24(&webp[24..]), 5);
    assert_eq!(le24(&webp[27..]), 3);

    // ANIM carries background color and loop count.
    assert_eq!(&webp[30..34], b"ANIM");
    assert_eq!(le32(&webp[34..]), 6);
    assert_eq!(le32(&webp[38..]), 0xFF00_00FF);
    assert_eq!(u16::from_le_bytes(webp[42..44].try_into().unwrap()), 5);

    let frames = parse_anmf_frames(&webp);
    assert_eq!(frames.len(), 2);

    let expected = [(&red, 125u32, 0u8), (&green, 80, 1)];
    for ((x, y, w, h, duration, flags, payload), (rgba, exp_duration, exp_flags)) in
        frames.iter().zip(expected)
    {
        assert_eq!((*x, *y), (0, 0));
        assert_eq!((*w, *h), (6, 4));
        assert_eq!(*duration, exp_duration);
        assert_eq!(*flags, exp_flags);

        // Each embedded payload is an independently decodable VP8L stream.
        let mut single = Vec::new();
        single.extend_from_slice(b"RIFF");
        single.extend_from_slice(&(12 + payload.len() as u32).to_le_bytes());
        single.extend_from_slice(b"WEBP");
        single.extend_from_slice(b"VP8L");
        single.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        single.extend_from_slice(payload);

        let mut decoder = WebPDecoder::new(Cursor::new(&single)).unwrap();
        let mut buf = vec![0u8; decoder.output_buffer_size().unwrap()];
        decoder.read_image(&mut buf).unwrap();
        let decoded: Vec<u8> = if decoder.has_alpha() {
            buf
        } else {
            buf.chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect()
        };
        assert_eq!(&decoded, rgba);
    }
}

#[test]
fn animation_duration_clamps_to_24_bits() {
    let rgba = solid_rgba(2, 2, [1, 1, 1, 255]);
    let animation = Animation {
        frames: vec![Picture::from_rgba(&rgba, 2, 2).unwrap()],
        durations_ms: vec![u32::MAX],
        disposals: vec![Disposal::None],
        loop_count: 0,
        background_color: 0,
    };
    let webp = encode_animation(&animation, &EncoderOptions::default()).unwrap();
    let frames = parse_anmf_frames(&webp);
    assert_eq!(frames[0].4, (1 << 24) - 1);
}

#[test]
fn animation_validation_errors() {
    let rgba = solid_rgba(2, 2, [1, 1, 1, 255]);
    let frame = Picture::from_rgba(&rgba, 2, 2).unwrap();

    let empty = Animation {
        frames: vec![],
        durations_ms: vec![],
        disposals: vec![],
        loop_count: 0,
        background_color: 0,
    };
    assert!(matches!(
        encode_animation(&empty, &EncoderOptions::default()),
        Err(EncodeError::EmptyAnimation)
    ));

    let mismatched = Animation {
        frames: vec![frame, frame],
        durations_ms: vec![100],
        disposals: vec![Disposal::None, Disposal::None],
        loop_count: 0,
        background_color: 0,
    };
    assert!(matches!(
        encode_animation(&mismatched, &EncoderOptions::default()),
        Err(EncodeError::MismatchedAnimation { .. })
    ));
}

#[cfg(feature = "std")]
#[test]
fn writer_sink_receives_same_bytes() {
    let rgba = solid_rgba(5, 5, [9, 8, 7, 255]);
    let picture = Picture::from_rgba(&rgba, 5, 5).unwrap();

    let direct = encode(&picture, &EncoderOptions::default()).unwrap();
    let mut sink = Vec::new();
    picowebp::encode_to_writer(&mut sink, &picture, &EncoderOptions::default()).unwrap();
    assert_eq!(direct, sink);
}
