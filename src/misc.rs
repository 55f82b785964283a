#![allow(dead_code)]
//! Small free-standing helpers and value types shared across the decoder.
use std::fmt;

/// Zig-zag index `i` -> raster index, the table used by `inverse_zigzag`.
#[rustfmt::skip]
pub const UN_ZIGZAG: [usize; 64] = [
    0,  1,  8,  16, 9,  2,  3, 10,
    17, 24, 32, 25, 18, 11, 4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13, 6,  7,  14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// Output colour space of a decoded image.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ColorSpace {
    /// Red, Green, Blue.
    RGB,
    /// Single-channel luminance.
    Grayscale,
}

impl ColorSpace {
    pub const fn num_components(self) -> usize {
        match self {
            Self::RGB => 3,
            Self::Grayscale => 1,
        }
    }
}

/// Which kind of frame header (SOF marker) produced this image.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum SofMarker {
    BaselineDct,
    ProgressiveDctHuffman,
}

impl SofMarker {
    pub fn is_progressive(self) -> bool {
        matches!(self, Self::ProgressiveDctHuffman)
    }
}

impl fmt::Debug for SofMarker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::BaselineDct => write!(f, "Baseline DCT, Huffman coding"),
            Self::ProgressiveDctHuffman => write!(f, "Progressive DCT, Huffman coding"),
        }
    }
}

/// `magnitude_to_value(m, i)` from the glossary: decode a JPEG
/// sign-magnitude (category, bits) pair into a signed coefficient.
#[inline]
pub fn magnitude_to_value(magnitude: u8, indice: i32) -> i32 {
    if magnitude == 0 {
        return 0;
    }
    let half = 1i32 << (magnitude - 1);
    if indice < half {
        indice - (1i32 << magnitude) + 1
    } else {
        indice
    }
}

/// Elementwise multiply a zig-zag-ordered coefficient block by a
/// zig-zag-ordered quantization table, saturating each product to the
/// `i16` range (§4.5 CoefficientStage::inverse_quantize).
#[inline]
pub fn dequantize(block: &[i32; 64], qt: &[u8; 64]) -> [i32; 64] {
    let mut out = [0i32; 64];
    for i in 0..64 {
        let product = block[i] * i32::from(qt[i]);
        out[i] = product.clamp(i32::from(i16::MIN), i32::from(i16::MAX));
    }
    out
}

/// Permute a zig-zag ordered block into raster order using [`UN_ZIGZAG`].
#[inline]
pub fn inverse_zigzag(block: &[i32; 64]) -> [i32; 64] {
    let mut out = [0i32; 64];
    for (i, &coeff) in block.iter().enumerate() {
        out[UN_ZIGZAG[i]] = coeff;
    }
    out
}
