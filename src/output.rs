//! PGM/PPM writers (§6 External Interfaces).
//!
//! Both formats share the same ASCII header shape: a magic number, the
//! `width height` pair, and a maxval line, followed by raw binary
//! samples with no padding between rows.
use std::io::{self, Write};

use crate::image::DecodedImage;
use crate::misc::ColorSpace;

/// Write a decoded image as a binary PGM (`P5`, grayscale) or PPM (`P6`,
/// RGB) file, picking the format from the image's own colour space.
pub fn write_netpbm<W: Write>(image: &DecodedImage, mut out: W) -> io::Result<()> {
    let magic = match image.colorspace {
        ColorSpace::Grayscale => "P5",
        ColorSpace::RGB => "P6",
    };
    write!(out, "{magic}\n{} {}\n255\n", image.width, image.height)?;
    out.write_all(&image.pixels)
}
