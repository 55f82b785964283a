//! Per-component frame state (§3 JpegDesc, per-component fields).
use crate::errors::DecodeErrors;

/// The canonical real-world identity of a component, inferred from its
/// frame-header id byte (1=Y, 2=Cb, 3=Cr — the only ids this decoder
/// accepts, since CMYK/4-component frames are a Non-goal).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ComponentId {
    Y,
    Cb,
    Cr,
}

#[derive(Debug, Clone)]
pub struct Component {
    pub id: u8,
    pub component_id: ComponentId,
    pub horizontal_sample: usize,
    pub vertical_sample: usize,
    pub quantization_table_number: u8,
    pub dc_huffman_table: usize,
    pub ac_huffman_table: usize,
    /// Running DC predictor, reset to 0 at the start of every scan.
    pub dc_pred: i32,
    /// Number of 8x8 blocks this component contributes to one MCU.
    pub blocks_per_mcu: usize,
    /// Width, in blocks, of this component's (possibly sub-sampled) plane.
    pub block_width: usize,
    /// Height, in blocks, of this component's (possibly sub-sampled) plane.
    pub block_height: usize,
}

impl Component {
    /// Build a component from the three raw SOF bytes: `(id, h<<4|v, qt_idx)`.
    pub fn new(raw: [u8; 3]) -> Result<Component, DecodeErrors> {
        let [id, hv, qt_idx] = raw;
        let component_id = match id {
            1 => ComponentId::Y,
            2 => ComponentId::Cb,
            3 => ComponentId::Cr,
            other => {
                return Err(DecodeErrors::Unsupported(format!(
                    "component id {other} is not one of Y/Cb/Cr (CMYK frames are unsupported)"
                )))
            }
        };

        let h = (hv >> 4) as usize;
        let v = (hv & 0x0F) as usize;
        if !(1..=4).contains(&h) || !(1..=4).contains(&v) {
            return Err(DecodeErrors::Structural(format!(
                "component {id} has out-of-range sampling factors {h}x{v}"
            )));
        }
        if qt_idx > 3 {
            return Err(DecodeErrors::Structural(format!(
                "component {id} references quantization table {qt_idx} (max is 3)"
            )));
        }

        Ok(Component {
            id,
            component_id,
            horizontal_sample: h,
            vertical_sample: v,
            quantization_table_number: qt_idx,
            dc_huffman_table: 0,
            ac_huffman_table: 0,
            dc_pred: 0,
            blocks_per_mcu: h * v,
            block_width: 0,
            block_height: 0,
        })
    }
}
