//! A baseline and progressive JPEG decoder.
//!
//! The entry point is [`image::Decoder`]; [`output::write_netpbm`] turns
//! its result into a PGM/PPM file.
pub mod bitstream;
pub mod color_convert;
pub mod components;
pub mod errors;
pub mod headers;
pub mod huffman;
pub mod idct;
pub mod image;
pub mod marker;
pub mod mcu;
pub mod mcu_prog;
pub mod misc;
pub mod output;
pub mod upsampler;
pub mod worker;

pub use errors::DecodeErrors;
pub use image::{DecodedImage, Decoder};
pub use misc::ColorSpace;
