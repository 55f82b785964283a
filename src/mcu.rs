//! Sequential (baseline) block extraction (§4.4, "Sequential (baseline)").
use crate::bitstream::BitReader;
use crate::components::Component;
use crate::errors::DecodeErrors;
use crate::headers::{self, FrameInfo, ScanHeader};
use crate::huffman::HuffmanTable;
use crate::misc::magnitude_to_value;

/// One component's coefficient blocks, pre-upsampling, in MCU-interleaved
/// storage order (§3 Image16).
pub type ComponentBlocks = Vec<[i32; 64]>;

/// Read the differential DC value for one block: a Huffman-coded
/// magnitude followed by that many raw bits.
fn read_dc_diff(reader: &mut BitReader, table: &HuffmanTable) -> Result<i32, DecodeErrors> {
    let magnitude = table.decode(reader)?;
    if magnitude > 15 {
        return Err(DecodeErrors::Entropy(format!(
            "DC magnitude category {magnitude} is impossible (max is 15)"
        )));
    }
    let bits = if magnitude == 0 {
        0
    } else {
        reader.read_bits(magnitude, true)? as i32
    };
    Ok(magnitude_to_value(magnitude, bits))
}

/// Decode one full AC band (positions 1..64) for a baseline block.
fn read_ac_band(
    reader: &mut BitReader,
    table: &HuffmanTable,
    block: &mut [i32; 64],
) -> Result<(), DecodeErrors> {
    let mut k = 1usize;
    while k < 64 {
        let symbol = table.decode(reader)?;
        let run_length = symbol >> 4;
        let magnitude = symbol & 0x0F;

        if symbol == 0x00 {
            break; // EOB
        }
        if symbol == 0xF0 {
            k += 16;
            continue;
        }
        if magnitude > 15 {
            return Err(DecodeErrors::Entropy(format!(
                "AC magnitude category {magnitude} is impossible (max is 15)"
            )));
        }
        k += usize::from(run_length);
        if k >= 64 {
            return Err(DecodeErrors::Entropy(
                "AC run advanced past the end of the block".to_string(),
            ));
        }
        let bits = reader.read_bits(magnitude, true)? as i32;
        block[k] = magnitude_to_value(magnitude, bits);
        k += 1;
    }
    Ok(())
}

fn decode_one_block(
    reader: &mut BitReader,
    dc_table: &HuffmanTable,
    ac_table: &HuffmanTable,
    dc_pred: &mut i32,
) -> Result<[i32; 64], DecodeErrors> {
    let mut block = [0i32; 64];
    let diff = read_dc_diff(reader, dc_table)?;
    *dc_pred += diff;
    block[0] = *dc_pred;
    read_ac_band(reader, ac_table, &mut block)?;
    Ok(block)
}

/// Decode an entire baseline scan body into per-component block storage,
/// MCU by MCU in raster order, honouring the component interleave order
/// the scan header declared.
pub fn decode_sequential_scan(
    reader: &mut BitReader,
    frame: &mut FrameInfo,
    scan: &ScanHeader,
    dc_tables: &[Option<HuffmanTable>; 4],
    ac_tables: &[Option<HuffmanTable>; 4],
    blocks: &mut [ComponentBlocks],
) -> Result<(), DecodeErrors> {
    for c in &mut frame.components {
        c.dc_pred = 0;
    }

    let mcu_count = frame.mcus_per_row * frame.mcus_per_column;

    for _ in 0..mcu_count {
        for (scan_pos, &comp_idx) in scan.component_indices.iter().enumerate() {
            let dc_table = headers::table_for(dc_tables, scan.dc_table[scan_pos])?;
            let ac_table = headers::table_for(ac_tables, scan.ac_table[scan_pos])?;
            let blocks_per_mcu = frame.components[comp_idx].blocks_per_mcu;

            for _ in 0..blocks_per_mcu {
                let mut pred = frame.components[comp_idx].dc_pred;
                let block = decode_one_block(reader, dc_table, ac_table, &mut pred)?;
                frame.components[comp_idx].dc_pred = pred;
                blocks[comp_idx].push(block);
            }
        }
    }
    Ok(())
}

pub fn new_component_storage(components: &[Component]) -> Vec<ComponentBlocks> {
    components
        .iter()
        .map(|c| Vec::with_capacity(c.block_width * c.block_height))
        .collect()
}
