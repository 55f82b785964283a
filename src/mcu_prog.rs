//! Progressive block extraction (§4.4 "Progressive").
//!
//! Four scan kinds, dispatched once at scan start rather than scattered
//! across conditionals (§9 Design Notes): first DC, DC refinement, first
//! AC and AC refinement. AC scans are non-interleaved (one component per
//! scan) and address blocks through [`remap_mcus`], since storage stays
//! MCU-interleaved from the DC scans but an AC scan walks its component's
//! blocks in plain raster order.
use std::ops::RangeInclusive;

use crate::bitstream::BitReader;
use crate::errors::DecodeErrors;
use crate::headers::{self, FrameInfo, ScanHeader};
use crate::huffman::HuffmanTable;
use crate::mcu::ComponentBlocks;
use crate::misc::magnitude_to_value;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ProgressiveScanKind {
    FirstDc,
    RefineDc,
    FirstAc,
    RefineAc,
}

impl ProgressiveScanKind {
    pub fn classify(scan: &ScanHeader) -> ProgressiveScanKind {
        match (scan.spectral_start, scan.successive_high) {
            (0, 0) => ProgressiveScanKind::FirstDc,
            (0, _) => ProgressiveScanKind::RefineDc,
            (_, 0) => ProgressiveScanKind::FirstAc,
            (_, _) => ProgressiveScanKind::RefineAc,
        }
    }
}

/// Build the permutation from a component's own raster-block index to its
/// MCU-interleaved storage index (§4.8), a direct port of the reference
/// program's `remap_mcus`: it walks the block grid row by row, stepping
/// by `h*v` at each MCU-column boundary and by `block_width*v` at each
/// MCU-row boundary.
pub fn remap_mcus(block_width: usize, block_height: usize, h: usize, v: usize) -> Vec<usize> {
    let line_offset = h * v;
    let col_offset = block_width * v;

    let mut index_map = vec![0usize; block_width * block_height];
    let mut bloc_offset = 0usize;
    let mut cur_index = 0usize;
    let mut index = 0usize;
    let mut curh_blocs = 0usize;

    while curh_blocs < block_height {
        let mut curw_blocs = 0usize;
        let mut curw_mcu = 0usize;
        while curw_blocs < block_width {
            if curw_mcu == h {
                cur_index += line_offset;
                curw_mcu = 0;
            }
            index_map[index] = cur_index + curw_mcu;
            curw_blocs += 1;
            curw_mcu += 1;
            index += 1;
        }
        curh_blocs += 1;
        let curh_mcu = (curh_blocs - 1) % v + 1;
        if curh_mcu < v {
            cur_index = bloc_offset + h;
        } else {
            bloc_offset += col_offset;
            cur_index += h;
        }
    }
    index_map
}

/// First DC scan: exactly the baseline DC decode (Huffman magnitude +
/// differential), scaled by `<< al` into `block[0]`. Builds component
/// storage from scratch, in MCU order, since this is always the first
/// scan of a progressive image.
pub fn decode_first_dc_scan(
    reader: &mut BitReader,
    frame: &mut FrameInfo,
    scan: &ScanHeader,
    dc_tables: &[Option<HuffmanTable>; 4],
    blocks: &mut [ComponentBlocks],
) -> Result<(), DecodeErrors> {
    for c in &mut frame.components {
        c.dc_pred = 0;
    }
    let mcu_count = frame.mcus_per_row * frame.mcus_per_column;

    for _ in 0..mcu_count {
        for (scan_pos, &comp_idx) in scan.component_indices.iter().enumerate() {
            let dc_table = headers::table_for(dc_tables, scan.dc_table[scan_pos])?;
            let blocks_per_mcu = frame.components[comp_idx].blocks_per_mcu;
            for _ in 0..blocks_per_mcu {
                let magnitude = dc_table.decode(reader)?;
                if magnitude > 15 {
                    return Err(DecodeErrors::Entropy(format!(
                        "DC magnitude category {magnitude} is impossible"
                    )));
                }
                let bits = if magnitude == 0 {
                    0
                } else {
                    reader.read_bits(magnitude, true)? as i32
                };
                let diff = magnitude_to_value(magnitude, bits);
                frame.components[comp_idx].dc_pred += diff;
                let mut block = [0i32; 64];
                block[0] = frame.components[comp_idx].dc_pred << scan.successive_low;
                blocks[comp_idx].push(block);
            }
        }
    }
    Ok(())
}

/// DC refinement scan: one correction bit per block, no Huffman symbol.
pub fn decode_refine_dc_scan(
    reader: &mut BitReader,
    frame: &FrameInfo,
    scan: &ScanHeader,
    blocks: &mut [ComponentBlocks],
) -> Result<(), DecodeErrors> {
    let mcu_count = frame.mcus_per_row * frame.mcus_per_column;
    let mut next_index: Vec<usize> = vec![0; frame.components.len()];

    for _ in 0..mcu_count {
        for &comp_idx in &scan.component_indices {
            let blocks_per_mcu = frame.components[comp_idx].blocks_per_mcu;
            for _ in 0..blocks_per_mcu {
                let pos = next_index[comp_idx];
                next_index[comp_idx] += 1;
                let bit = reader.read_bit(true)?;
                if bit == 1 {
                    blocks[comp_idx][pos][0] |= 1 << scan.successive_low;
                }
            }
        }
    }
    Ok(())
}

fn apply_one_correction(reader: &mut BitReader, coeff: &mut i32, al: u8) -> Result<(), DecodeErrors> {
    let bit = reader.read_bit(true)?;
    if bit == 1 {
        if *coeff > 0 {
            *coeff += 1 << al;
        } else {
            *coeff -= 1 << al;
        }
    }
    Ok(())
}

fn apply_all_corrections(
    reader: &mut BitReader,
    block: &mut [i32; 64],
    range: RangeInclusive<usize>,
    al: u8,
) -> Result<(), DecodeErrors> {
    for k in range {
        if block[k] != 0 {
            apply_one_correction(reader, &mut block[k], al)?;
        }
    }
    Ok(())
}

/// ZH case of AC refinement: skip exactly `run_length` zero positions
/// (applying a correction bit to every non-zero position passed over),
/// then write `new_value` at the next zero position found.
fn zh_place(
    reader: &mut BitReader,
    block: &mut [i32; 64],
    k: &mut usize,
    se: usize,
    mut run_length: i32,
    new_value: i32,
    al: u8,
) -> Result<(), DecodeErrors> {
    loop {
        if *k > se {
            return Err(DecodeErrors::Entropy(
                "AC refinement ran past the spectral end before placing a new coefficient"
                    .to_string(),
            ));
        }
        if block[*k] != 0 {
            apply_one_correction(reader, &mut block[*k], al)?;
            *k += 1;
        } else if run_length > 0 {
            run_length -= 1;
            *k += 1;
        } else {
            block[*k] = new_value;
            *k += 1;
            return Ok(());
        }
    }
}

/// ZRL case of AC refinement: walk exactly 16 zero positions, applying a
/// correction bit to every non-zero position passed over, writing
/// nothing. Never stops early even if fewer than 16 zero positions would
/// otherwise seem to remain before `se` (resolved Open Question, see
/// DESIGN.md) — a legally-encoded ZRL always has the room.
fn zrl_skip(
    reader: &mut BitReader,
    block: &mut [i32; 64],
    k: &mut usize,
    se: usize,
    al: u8,
) -> Result<(), DecodeErrors> {
    let mut remaining = 16i32;
    while remaining > 0 {
        if *k > se {
            return Err(DecodeErrors::Entropy(
                "ZRL refinement walk ran past the spectral end".to_string(),
            ));
        }
        if block[*k] != 0 {
            apply_one_correction(reader, &mut block[*k], al)?;
        } else {
            remaining -= 1;
        }
        *k += 1;
    }
    Ok(())
}

/// Decode one block's worth of AC refinement symbols. Returns the number
/// of *additional* subsequent blocks an EOBn run covers, or `None` if the
/// block's band was consumed by ordinary ZH/ZRL symbols.
fn decode_refine_ac_block(
    reader: &mut BitReader,
    ac_table: &HuffmanTable,
    block: &mut [i32; 64],
    ss: usize,
    se: usize,
    al: u8,
) -> Result<Option<u32>, DecodeErrors> {
    let mut k = ss;
    while k <= se {
        let symbol = ac_table.decode(reader)?;
        let run_length = symbol >> 4;
        let magnitude = symbol & 0x0F;

        match magnitude {
            1 => {
                let bit = reader.read_bit(true)?;
                let new_value = if bit == 1 { 1i32 << al } else { -(1i32 << al) };
                zh_place(reader, block, &mut k, se, i32::from(run_length), new_value, al)?;
            }
            0 if run_length < 15 => {
                let extra = if run_length == 0 {
                    0
                } else {
                    reader.read_bits(run_length, true)?
                };
                let total_skip = (1u32 << run_length) + extra;
                apply_all_corrections(reader, block, k..=se, al)?;
                return Ok(Some(total_skip - 1));
            }
            0 => {
                zrl_skip(reader, block, &mut k, se, al)?;
            }
            other => {
                return Err(DecodeErrors::Entropy(format!(
                    "AC refinement magnitude {other} must be 0 or 1"
                )))
            }
        }
    }
    Ok(None)
}

/// First AC scan: non-interleaved, one component, §4.4 "First AC".
pub fn decode_first_ac_scan(
    reader: &mut BitReader,
    ac_table: &HuffmanTable,
    blocks: &mut ComponentBlocks,
    mcu_map: &[usize],
    ss: u8,
    se: u8,
    al: u8,
) -> Result<(), DecodeErrors> {
    let (ss, se) = (ss as usize, se as usize);
    let mut eobrun: u32 = 0;

    for raster_idx in 0..blocks.len() {
        let storage_idx = mcu_map[raster_idx];
        if eobrun > 0 {
            eobrun -= 1;
            continue;
        }

        let block = &mut blocks[storage_idx];
        let mut k = ss;
        while k <= se {
            let symbol = ac_table.decode(reader)?;
            let run_length = symbol >> 4;
            let magnitude = symbol & 0x0F;

            if magnitude == 0 {
                if run_length < 15 {
                    let extra = if run_length == 0 {
                        0
                    } else {
                        reader.read_bits(run_length, true)?
                    };
                    eobrun = (1u32 << run_length) + extra - 1;
                    break;
                }
                k += 16;
                continue;
            }
            if magnitude > 15 {
                return Err(DecodeErrors::Entropy(format!(
                    "AC magnitude category {magnitude} is impossible"
                )));
            }
            k += usize::from(run_length);
            if k > se {
                return Err(DecodeErrors::Entropy(
                    "AC run advanced past the spectral end".to_string(),
                ));
            }
            let bits = reader.read_bits(magnitude, true)? as i32;
            block[k] = magnitude_to_value(magnitude, bits) << al;
            k += 1;
        }
    }
    Ok(())
}

/// AC refinement scan: non-interleaved, one component, §4.4 "Refinement AC".
pub fn decode_refine_ac_scan(
    reader: &mut BitReader,
    ac_table: &HuffmanTable,
    blocks: &mut ComponentBlocks,
    mcu_map: &[usize],
    ss: u8,
    se: u8,
    al: u8,
) -> Result<(), DecodeErrors> {
    let (ss, se) = (ss as usize, se as usize);
    let mut eobrun: u32 = 0;

    for raster_idx in 0..blocks.len() {
        let storage_idx = mcu_map[raster_idx];
        if eobrun > 0 {
            apply_all_corrections(reader, &mut blocks[storage_idx], ss..=se, al)?;
            eobrun -= 1;
            continue;
        }
        if let Some(extra) = decode_refine_ac_block(reader, ac_table, &mut blocks[storage_idx], ss, se, al)? {
            eobrun = extra;
        }
    }
    Ok(())
}
