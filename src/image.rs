//! Top-level decoder orchestration: header parsing, scan dispatch,
//! post-entropy decode and image assembly (§4.8, §3 JpegDesc/Image8).
use crate::bitstream::BitReader;
use crate::color_convert::{convert_row_grayscale, convert_row_rgb};
use crate::components::ComponentId;
use crate::errors::DecodeErrors;
use crate::headers::{
    next_marker, next_progressive_scan, parse_app0, parse_dht, parse_dqt, parse_sof, parse_sos,
    skip_segment, table_for, FrameInfo,
};
use crate::huffman::HuffmanTable;
use crate::idct::IdctAlgorithm;
use crate::marker::Marker;
use crate::mcu::{decode_sequential_scan, new_component_storage, ComponentBlocks};
use crate::mcu_prog::{
    decode_first_ac_scan, decode_first_dc_scan, decode_refine_ac_scan, decode_refine_dc_scan,
    remap_mcus, ProgressiveScanKind,
};
use crate::misc::ColorSpace;
use crate::upsampler::upsample_component;
use crate::worker::{assemble_plane, decode_blocks};

/// A fully decoded, colour-converted raster ready for output (§3 Image8).
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    pub colorspace: ColorSpace,
    /// Row-major samples: one byte per pixel for `Grayscale`, three
    /// (R,G,B) for `RGB`.
    pub pixels: Vec<u8>,
}

pub struct Decoder {
    reader: BitReader,
    workers: usize,
    idct: IdctAlgorithm,
}

impl Decoder {
    pub fn new(data: Vec<u8>) -> Decoder {
        Decoder {
            reader: BitReader::new(data),
            workers: 1,
            idct: IdctAlgorithm::Loeffler,
        }
    }

    /// Enable the worker pool with the given number of workers (typically
    /// `num_cpus::get()`); `1` keeps decoding serial.
    pub fn with_workers(mut self, workers: usize) -> Decoder {
        self.workers = workers.max(1);
        self
    }

    pub fn with_idct(mut self, idct: IdctAlgorithm) -> Decoder {
        self.idct = idct;
        self
    }

    pub fn decode(&mut self) -> Result<DecodedImage, DecodeErrors> {
        let opening = next_marker(&mut self.reader)?;
        if opening != Marker::Soi {
            return Err(DecodeErrors::Structural(
                "file does not start with an SOI marker".to_string(),
            ));
        }
        log::info!("SOI");

        let mut quant_tables: [Option<[u8; 64]>; 4] = Default::default();
        let mut dc_tables: [Option<HuffmanTable>; 4] = Default::default();
        let mut ac_tables: [Option<HuffmanTable>; 4] = Default::default();
        let mut frame: Option<FrameInfo> = None;

        loop {
            let marker = next_marker(&mut self.reader)?;
            match marker {
                Marker::App(0) => parse_app0(&mut self.reader)?,
                Marker::App(n) => {
                    return Err(DecodeErrors::Unsupported(format!(
                        "APP{n} segments are not supported (only APP0/JFIF is)"
                    )))
                }
                Marker::Com => skip_segment(&mut self.reader)?,
                Marker::Dqt => parse_dqt(&mut self.reader, &mut quant_tables)?,
                Marker::Dht => parse_dht(&mut self.reader, &mut dc_tables, &mut ac_tables)?,
                Marker::Sof(byte) => {
                    let parsed = parse_sof(&mut self.reader, byte)?;
                    log::info!(
                        "SOF: {:?} {}x{} {} component(s)",
                        parsed.sof,
                        parsed.width,
                        parsed.height,
                        parsed.components.len()
                    );
                    frame = Some(parsed);
                }
                Marker::Sos => break,
                Marker::Eoi => {
                    return Err(DecodeErrors::Structural(
                        "EOI encountered before any scan data".to_string(),
                    ))
                }
                other => {
                    other.require_supported()?;
                }
            }
        }

        let mut frame = frame.ok_or_else(|| {
            DecodeErrors::Structural("SOS encountered before a frame header (SOF)".to_string())
        })?;

        let mcu_maps: Vec<Vec<usize>> = frame
            .components
            .iter()
            .map(|c| remap_mcus(c.block_width, c.block_height, c.horizontal_sample, c.vertical_sample))
            .collect();

        let mut blocks: Vec<ComponentBlocks> = new_component_storage(&frame.components);

        if frame.sof.is_progressive() {
            self.decode_progressive(&mut frame, &dc_tables, &ac_tables, &mcu_maps, &mut blocks)?;
        } else {
            let scan = parse_sos(&mut self.reader, &frame)?;
            log::debug!(
                "SOS (sequential): components={:?} tables dc={:?} ac={:?}",
                scan.component_indices,
                scan.dc_table,
                scan.ac_table
            );
            decode_sequential_scan(
                &mut self.reader,
                &mut frame,
                &scan,
                &dc_tables,
                &ac_tables,
                &mut blocks,
            )?;
            let closing = next_marker(&mut self.reader)?;
            closing.require_supported()?;
            if closing != Marker::Eoi {
                log::warn!("expected EOI after the only scan, saw {closing:?} instead");
            }
        }

        self.assemble(&frame, &quant_tables, &mcu_maps, blocks)
    }

    fn decode_progressive(
        &mut self,
        frame: &mut FrameInfo,
        dc_tables: &[Option<HuffmanTable>; 4],
        ac_tables: &[Option<HuffmanTable>; 4],
        mcu_maps: &[Vec<usize>],
        blocks: &mut [ComponentBlocks],
    ) -> Result<(), DecodeErrors> {
        // `dc_tables`/`ac_tables` may still grow via DHT redefinitions
        // between scans, so keep our own mutable copies.
        let mut dc_tables = dc_tables.clone();
        let mut ac_tables = ac_tables.clone();

        let mut scan = parse_sos(&mut self.reader, frame)?;
        loop {
            let kind = ProgressiveScanKind::classify(&scan);
            log::debug!(
                "progressive scan {:?}: ss={} se={} ah={} al={}",
                kind,
                scan.spectral_start,
                scan.spectral_end,
                scan.successive_high,
                scan.successive_low
            );

            match kind {
                ProgressiveScanKind::FirstDc => {
                    decode_first_dc_scan(&mut self.reader, frame, &scan, &dc_tables, blocks)?;
                }
                ProgressiveScanKind::RefineDc => {
                    decode_refine_dc_scan(&mut self.reader, frame, &scan, blocks)?;
                }
                ProgressiveScanKind::FirstAc => {
                    let comp_idx = scan.component_indices[0];
                    let ac_table = table_for(&ac_tables, scan.ac_table[0])?;
                    decode_first_ac_scan(
                        &mut self.reader,
                        ac_table,
                        &mut blocks[comp_idx],
                        &mcu_maps[comp_idx],
                        scan.spectral_start,
                        scan.spectral_end,
                        scan.successive_low,
                    )?;
                }
                ProgressiveScanKind::RefineAc => {
                    let comp_idx = scan.component_indices[0];
                    let ac_table = table_for(&ac_tables, scan.ac_table[0])?;
                    decode_refine_ac_scan(
                        &mut self.reader,
                        ac_table,
                        &mut blocks[comp_idx],
                        &mcu_maps[comp_idx],
                        scan.spectral_start,
                        scan.spectral_end,
                        scan.successive_low,
                    )?;
                }
            }

            if next_progressive_scan(&mut self.reader, &mut dc_tables, &mut ac_tables)? {
                scan = parse_sos(&mut self.reader, frame)?;
            } else {
                break;
            }
        }
        Ok(())
    }

    fn assemble(
        &self,
        frame: &FrameInfo,
        quant_tables: &[Option<[u8; 64]>; 4],
        mcu_maps: &[Vec<usize>],
        blocks: Vec<ComponentBlocks>,
    ) -> Result<DecodedImage, DecodeErrors> {
        let idct_fn = self.idct.function();
        let full_width = frame.mcus_per_row * frame.max_h * 8;
        let full_height = frame.mcus_per_column * frame.max_v * 8;

        let mut planes: Vec<(Vec<u8>, usize, usize)> = Vec::with_capacity(frame.components.len());
        for (c, comp) in frame.components.iter().enumerate() {
            let qt = quant_tables[usize::from(comp.quantization_table_number)].ok_or_else(|| {
                DecodeErrors::Structural(format!(
                    "component references undefined quantization table {}",
                    comp.quantization_table_number
                ))
            })?;
            let spatial = decode_blocks(&blocks[c], &qt, idct_fn, self.workers);
            let plane = assemble_plane(&spatial, &mcu_maps[c], comp.block_width, comp.block_height);
            let native_width = comp.block_width * 8;
            let native_height = comp.block_height * 8;

            let h_ratio = frame.max_h / comp.horizontal_sample;
            let v_ratio = frame.max_v / comp.vertical_sample;
            if comp.horizontal_sample * h_ratio != frame.max_h
                || comp.vertical_sample * v_ratio != frame.max_v
            {
                return Err(DecodeErrors::Unsupported(format!(
                    "component sampling factors {}x{} do not evenly divide the frame maximum {}x{}",
                    comp.horizontal_sample, comp.vertical_sample, frame.max_h, frame.max_v
                )));
            }
            let (upsampled, up_w, up_h) =
                upsample_component(&plane, native_width, native_height, h_ratio, v_ratio);
            debug_assert_eq!(up_w, full_width);
            debug_assert_eq!(up_h, full_height);
            planes.push((upsampled, up_w, up_h));
        }

        let width = usize::from(frame.width);
        let height = usize::from(frame.height);

        let pixels = match frame.components.len() {
            1 => crop_and_convert_gray(&planes[0].0, planes[0].1, width, height),
            3 => {
                let y_idx = component_index(frame, ComponentId::Y)?;
                let cb_idx = component_index(frame, ComponentId::Cb)?;
                let cr_idx = component_index(frame, ComponentId::Cr)?;
                crop_and_convert_rgb(
                    &planes[y_idx].0,
                    &planes[cb_idx].0,
                    &planes[cr_idx].0,
                    planes[y_idx].1,
                    width,
                    height,
                )
            }
            other => {
                return Err(DecodeErrors::Unsupported(format!(
                    "{other}-component frames are unsupported"
                )))
            }
        };

        let colorspace = if frame.components.len() == 1 {
            ColorSpace::Grayscale
        } else {
            ColorSpace::RGB
        };

        Ok(DecodedImage {
            width,
            height,
            colorspace,
            pixels,
        })
    }
}

fn component_index(frame: &FrameInfo, id: ComponentId) -> Result<usize, DecodeErrors> {
    frame
        .components
        .iter()
        .position(|c| c.component_id == id)
        .ok_or_else(|| DecodeErrors::Structural(format!("colour frame is missing a {id:?} component")))
}

fn crop_and_convert_gray(plane: &[u8], stride: usize, width: usize, height: usize) -> Vec<u8> {
    let mut out = vec![0u8; width * height];
    for y in 0..height {
        let src = &plane[y * stride..y * stride + width];
        out[y * width..(y + 1) * width].copy_from_slice(src);
    }
    out
}

#[allow(clippy::too_many_arguments)]
fn crop_and_convert_rgb(
    y_plane: &[u8],
    cb_plane: &[u8],
    cr_plane: &[u8],
    stride: usize,
    width: usize,
    height: usize,
) -> Vec<u8> {
    let mut out = vec![0u8; width * height * 3];
    for row in 0..height {
        let y_row = &y_plane[row * stride..row * stride + width];
        let cb_row = &cb_plane[row * stride..row * stride + width];
        let cr_row = &cr_plane[row * stride..row * stride + width];
        let out_row = &mut out[row * width * 3..(row + 1) * width * 3];
        convert_row_rgb(y_row, cb_row, cr_row, out_row);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_and_convert_gray_drops_padding() {
        // 8x8 plane, only top-left 3x2 pixels are "real".
        let plane = vec![7u8; 64];
        let out = crop_and_convert_gray(&plane, 8, 3, 2);
        assert_eq!(out, vec![7u8; 6]);
    }

    #[test]
    fn grayscale_passthrough_matches_y() {
        let y = [10u8, 20, 30, 40];
        let mut out = [0u8; 4];
        convert_row_grayscale(&y, &[], &[], &mut out);
        assert_eq!(out, y);
    }
}
