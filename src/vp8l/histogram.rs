//! Symbol histograms for the five VP8L Huffman alphabets.

use alloc::vec;
use alloc::vec::Vec;

use super::backward_refs::prefix_encode;
use super::types::{
    argb_alpha, argb_blue, argb_green, argb_red, PixOrCopy, NUM_DISTANCE_CODES, NUM_LENGTH_CODES,
    NUM_LITERAL_CODES,
};

/// Size of the main (green) alphabet for a given cache size.
#[inline]
pub fn literal_alphabet_size(cache_bits: u8) -> usize {
    let cache = if cache_bits > 0 { 1usize << cache_bits } else { 0 };
    NUM_LITERAL_CODES + NUM_LENGTH_CODES + cache
}

/// Frequency counts over the five token alphabets.
pub struct Histograms {
    /// Green literals + length prefixes + cache indices.
    pub literal: Vec<u32>,
    /// Red literals.
    pub red: Vec<u32>,
    /// Blue literals.
    pub blue: Vec<u32>,
    /// Alpha literals.
    pub alpha: Vec<u32>,
    /// Distance prefixes.
    pub distance: Vec<u32>,
}

impl Histograms {
    fn new(cache_bits: u8) -> Self {
        Self {
            literal: vec![0; literal_alphabet_size(cache_bits)],
            red: vec![0; NUM_LITERAL_CODES],
            blue: vec![0; NUM_LITERAL_CODES],
            alpha: vec![0; NUM_LITERAL_CODES],
            distance: vec![0; NUM_DISTANCE_CODES],
        }
    }

    /// Count every token of a stream.
    pub fn from_refs(refs: &[PixOrCopy], cache_bits: u8) -> Self {
        let mut h = Self::new(cache_bits);
        for token in refs {
            match *token {
                PixOrCopy::Literal(argb) => {
                    h.literal[argb_green(argb) as usize] += 1;
                    h.red[argb_red(argb) as usize] += 1;
                    h.blue[argb_blue(argb) as usize] += 1;
                    h.alpha[argb_alpha(argb) as usize] += 1;
                }
                PixOrCopy::CacheIdx(idx) => {
                    h.literal[NUM_LITERAL_CODES + NUM_LENGTH_CODES + idx as usize] += 1;
                }
                PixOrCopy::Copy { len, dist_code } => {
                    let (len_code, _, _) = prefix_encode(u32::from(len));
                    let (dist_prefix, _, _) = prefix_encode(dist_code);
                    h.literal[NUM_LITERAL_CODES + len_code as usize] += 1;
                    h.distance[dist_prefix as usize] += 1;
                }
            }
        }
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vp8l::types::make_argb;

    #[test]
    fn test_literal_alphabet_size() {
        assert_eq!(literal_alphabet_size(0), 280);
        assert_eq!(literal_alphabet_size(4), 296);
        assert_eq!(literal_alphabet_size(11), 280 + 2048);
    }

    #[test]
    fn test_counts_per_alphabet() {
        let refs = [
            PixOrCopy::Literal(make_argb(255, 10, 20, 30)),
            PixOrCopy::Literal(make_argb(255, 10, 20, 30)),
            PixOrCopy::CacheIdx(3),
            PixOrCopy::Copy {
                len: 7,
                dist_code: 1,
            },
        ];
        let h = Histograms::from_refs(&refs, 4);

        assert_eq!(h.literal[20], 2); // green 20
        assert_eq!(h.red[10], 2);
        assert_eq!(h.blue[30], 2);
        assert_eq!(h.alpha[255], 2);
        assert_eq!(h.literal[256 + 24 + 3], 1); // cache hit
        assert_eq!(h.literal[256 + 5], 1); // length 7 -> prefix 5
        assert_eq!(h.distance[0], 1); // distance code 1 -> prefix 0
        assert_eq!(h.literal.iter().sum::<u32>(), 4);
    }
}
