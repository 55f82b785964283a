//! Marker-segment parsing: DQT, DHT, SOF, SOS and the marker scanner that
//! walks the byte stream between them (§4.3 SegmentParser).
use crate::bitstream::BitReader;
use crate::components::Component;
use crate::errors::DecodeErrors;
use crate::huffman::HuffmanTable;
use crate::marker::{self, Marker};
use crate::misc::SofMarker;

pub struct FrameInfo {
    pub sof: SofMarker,
    pub precision: u8,
    pub height: u16,
    pub width: u16,
    pub components: Vec<Component>,
    pub mcus_per_row: usize,
    pub mcus_per_column: usize,
    pub max_h: usize,
    pub max_v: usize,
}

pub struct ScanHeader {
    /// Index into `FrameInfo::components` for each component in this scan,
    /// in the order they appear in the SOS segment.
    pub component_indices: Vec<usize>,
    pub dc_table: Vec<usize>,
    pub ac_table: Vec<usize>,
    pub spectral_start: u8,
    pub spectral_end: u8,
    pub successive_high: u8,
    pub successive_low: u8,
}

/// Scan forward for the next `0xFF xx` marker, tolerating the `0xFF`
/// fill bytes and stray stuffed zero bytes a writer may leave between
/// segments.
///
/// If a scan just ended mid-entropy-decode, the bit reader will already
/// have cached the terminating marker (its id byte sits unread at the
/// current position) — consume that first rather than re-scanning, since
/// the byte stream at this position is no longer `0xFF`-prefixed.
pub fn next_marker(reader: &mut BitReader) -> Result<Marker, DecodeErrors> {
    if let Some(marker) = reader.take_marker() {
        reader.skip_bytes(1)?;
        return Ok(marker);
    }
    loop {
        let b = reader.read_u8()?;
        if b != 0xFF {
            continue;
        }
        let mut b2 = reader.read_u8()?;
        while b2 == 0xFF {
            b2 = reader.read_u8()?;
        }
        if b2 == 0x00 {
            continue;
        }
        return Ok(Marker::from_byte(b2));
    }
}

pub fn skip_segment(reader: &mut BitReader) -> Result<(), DecodeErrors> {
    let len = reader.read_u16_be()?;
    if len < 2 {
        return Err(DecodeErrors::Structural(
            "marker segment length is too small to contain its own length field".to_string(),
        ));
    }
    reader.skip_bytes(usize::from(len) - 2)
}

/// Parse an APP0 segment, verifying the `JFIF\0` identifier before
/// skipping whatever thumbnail/density fields follow it. Any other APPn
/// segment is not a JFIF identifier block and is rejected by the caller
/// before this is ever reached.
pub fn parse_app0(reader: &mut BitReader) -> Result<(), DecodeErrors> {
    let len = reader.read_u16_be()?;
    if len < 7 {
        return Err(DecodeErrors::Structural(
            "APP0 segment is too short to hold a JFIF identifier".to_string(),
        ));
    }
    let mut identifier = [0u8; 5];
    for slot in &mut identifier {
        *slot = reader.read_u8()?;
    }
    if &identifier != b"JFIF\0" {
        return Err(DecodeErrors::Structural(
            "APP0 segment identifier is not 'JFIF\\0'".to_string(),
        ));
    }
    reader.skip_bytes(usize::from(len) - 2 - 5)
}

/// Parse a DQT segment, which may carry more than one table. Redefining a
/// table id replaces it outright: stale coefficients are never left
/// reachable under a new table id.
pub fn parse_dqt(
    reader: &mut BitReader,
    tables: &mut [Option<[u8; 64]>; 4],
) -> Result<(), DecodeErrors> {
    let len = reader.read_u16_be()?;
    if len < 2 {
        return Err(DecodeErrors::Structural("DQT segment too short".to_string()));
    }
    let mut remaining = usize::from(len) - 2;

    while remaining > 0 {
        let pq_tq = reader.read_u8()?;
        remaining -= 1;
        let pq = pq_tq >> 4;
        let tq = usize::from(pq_tq & 0x0F);
        if tq > 3 {
            return Err(DecodeErrors::Structural(format!(
                "DQT references table id {tq} (max is 3)"
            )));
        }
        if pq != 0 {
            return Err(DecodeErrors::Unsupported(
                "16-bit quantization tables are not supported".to_string(),
            ));
        }
        if remaining < 64 {
            return Err(DecodeErrors::Structural(
                "DQT segment length doesn't match its table count".to_string(),
            ));
        }
        let mut table = [0u8; 64];
        for slot in &mut table {
            *slot = reader.read_u8()?;
        }
        remaining -= 64;
        tables[tq] = Some(table);
    }
    Ok(())
}

/// Parse a DHT segment, which may carry more than one table. Redefining a
/// table id replaces it.
pub fn parse_dht(
    reader: &mut BitReader,
    dc_tables: &mut [Option<HuffmanTable>; 4],
    ac_tables: &mut [Option<HuffmanTable>; 4],
) -> Result<(), DecodeErrors> {
    let len = reader.read_u16_be()?;
    if len < 2 {
        return Err(DecodeErrors::Structural("DHT segment too short".to_string()));
    }
    let mut remaining = usize::from(len) - 2;

    while remaining > 0 {
        let tc_th = reader.read_u8()?;
        remaining -= 1;
        let tc = tc_th >> 4;
        let th = usize::from(tc_th & 0x0F);
        if th > 3 {
            return Err(DecodeErrors::Structural(format!(
                "DHT references table id {th} (max is 3)"
            )));
        }
        if remaining < 16 {
            return Err(DecodeErrors::Structural(
                "DHT segment too short for its 16 length counts".to_string(),
            ));
        }
        let mut counts = [0u8; 16];
        for slot in &mut counts {
            *slot = reader.read_u8()?;
        }
        remaining -= 16;

        let total: usize = counts.iter().map(|&c| c as usize).sum();
        if remaining < total {
            return Err(DecodeErrors::Structural(
                "DHT segment length doesn't match its symbol count".to_string(),
            ));
        }
        let mut symbols = vec![0u8; total];
        for slot in &mut symbols {
            *slot = reader.read_u8()?;
        }
        remaining -= total;

        let table = HuffmanTable::build(&counts, &symbols)?;
        match tc {
            0 => dc_tables[th] = Some(table),
            1 => ac_tables[th] = Some(table),
            other => {
                return Err(DecodeErrors::Structural(format!(
                    "DHT table class {other} is neither DC (0) nor AC (1)"
                )))
            }
        }
    }
    Ok(())
}

pub fn parse_sof(reader: &mut BitReader, marker_byte: u8) -> Result<FrameInfo, DecodeErrors> {
    let _len = reader.read_u16_be()?;
    let precision = reader.read_u8()?;
    if precision != 8 {
        return Err(DecodeErrors::Unsupported(format!(
            "sample precision {precision} bits is unsupported (only 8-bit samples are)"
        )));
    }
    let height = reader.read_u16_be()?;
    let width = reader.read_u16_be()?;
    if height == 0 || width == 0 {
        return Err(DecodeErrors::Structural(
            "frame header declares a zero image dimension".to_string(),
        ));
    }

    let nc = reader.read_u8()?;
    if nc != 1 && nc != 3 {
        return Err(DecodeErrors::Unsupported(format!(
            "{nc}-component frames are unsupported (only grayscale and YCbCr are)"
        )));
    }

    let mut components = Vec::with_capacity(usize::from(nc));
    for _ in 0..nc {
        let id = reader.read_u8()?;
        let hv = reader.read_u8()?;
        let qt = reader.read_u8()?;
        components.push(Component::new([id, hv, qt])?);
    }

    let blocks_per_mcu: usize = components.iter().map(|c| c.blocks_per_mcu).sum();
    if blocks_per_mcu > 10 {
        return Err(DecodeErrors::Unsupported(format!(
            "frame's combined sampling factors imply {blocks_per_mcu} blocks per MCU (max is 10)"
        )));
    }

    let sof = match marker_byte {
        marker::SOF0 => SofMarker::BaselineDct,
        marker::SOF2 => SofMarker::ProgressiveDctHuffman,
        other => {
            return Err(DecodeErrors::Unsupported(format!(
                "SOF marker 0xFF{other:02X} uses an encoding other than baseline or progressive Huffman"
            )))
        }
    };

    let max_h = components.iter().map(|c| c.horizontal_sample).max().unwrap_or(1);
    let max_v = components.iter().map(|c| c.vertical_sample).max().unwrap_or(1);
    let mcus_per_row = (usize::from(width) + 8 * max_h - 1) / (8 * max_h);
    let mcus_per_column = (usize::from(height) + 8 * max_v - 1) / (8 * max_v);

    for c in &mut components {
        c.block_width = mcus_per_row * c.horizontal_sample;
        c.block_height = mcus_per_column * c.vertical_sample;
    }

    Ok(FrameInfo {
        sof,
        precision,
        height,
        width,
        components,
        mcus_per_row,
        mcus_per_column,
        max_h,
        max_v,
    })
}

/// After a scan body has been consumed, flush the reader, handle any
/// number of DHT redefinitions, and stop at the next `SOS` (`Ok(true)`) or
/// `EOI` (`Ok(false)`). Any other marker in between is fatal.
pub fn next_progressive_scan(
    reader: &mut BitReader,
    dc_tables: &mut [Option<HuffmanTable>; 4],
    ac_tables: &mut [Option<HuffmanTable>; 4],
) -> Result<bool, DecodeErrors> {
    reader.reset_scan_state();
    loop {
        let marker = next_marker(reader)?;
        match marker {
            Marker::Dht => parse_dht(reader, dc_tables, ac_tables)?,
            Marker::Sos => return Ok(true),
            Marker::Eoi => return Ok(false),
            other => {
                return Err(DecodeErrors::Structural(format!(
                    "unexpected marker {other:?} between progressive scans"
                )))
            }
        }
    }
}

/// Look up a Huffman table slot, erroring if the scan references one that
/// was never defined by a DHT segment.
pub fn table_for(
    tables: &[Option<HuffmanTable>; 4],
    index: usize,
) -> Result<&HuffmanTable, DecodeErrors> {
    tables
        .get(index)
        .and_then(Option::as_ref)
        .ok_or_else(|| {
            DecodeErrors::Structural(format!("scan references undefined Huffman table {index}"))
        })
}

pub fn parse_sos(reader: &mut BitReader, frame: &FrameInfo) -> Result<ScanHeader, DecodeErrors> {
    let _len = reader.read_u16_be()?;
    let ns = reader.read_u8()?;
    if ns == 0 || usize::from(ns) > frame.components.len() {
        return Err(DecodeErrors::Structural(format!(
            "scan header names {ns} components but the frame has {}",
            frame.components.len()
        )));
    }

    let mut component_indices = Vec::with_capacity(usize::from(ns));
    let mut dc_table = Vec::with_capacity(usize::from(ns));
    let mut ac_table = Vec::with_capacity(usize::from(ns));

    for _ in 0..ns {
        let cs = reader.read_u8()?;
        let td_ta = reader.read_u8()?;
        let idx = frame
            .components
            .iter()
            .position(|c| c.id == cs)
            .ok_or_else(|| {
                DecodeErrors::Structural(format!("scan references unknown component id {cs}"))
            })?;
        component_indices.push(idx);
        dc_table.push(usize::from(td_ta >> 4));
        ac_table.push(usize::from(td_ta & 0x0F));
    }

    let ss = reader.read_u8()?;
    let se = reader.read_u8()?;
    let ah_al = reader.read_u8()?;
    let ah = ah_al >> 4;
    let al = ah_al & 0x0F;

    if ss > 63 || se > 63 || ss > se {
        return Err(DecodeErrors::Structural(format!(
            "scan header has invalid spectral selection ss={ss} se={se}"
        )));
    }
    if !frame.sof.is_progressive() && (ss != 0 || se != 63 || ah != 0 || al != 0) {
        return Err(DecodeErrors::Structural(
            "baseline scan must cover the full spectrum with no successive approximation"
                .to_string(),
        ));
    }

    Ok(ScanHeader {
        component_indices,
        dc_table,
        ac_table,
        spectral_start: ss,
        spectral_end: se,
        successive_high: ah,
        successive_low: al,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_app0_accepts_valid_jfif_identifier() {
        let mut payload = b"JFIF\0".to_vec();
        payload.extend_from_slice(&[1, 2, 0, 0, 96, 0, 96, 0, 0]);
        let len = (payload.len() + 2) as u16;
        let mut bytes = len.to_be_bytes().to_vec();
        bytes.extend(payload);
        let mut reader = BitReader::new(bytes);
        assert!(parse_app0(&mut reader).is_ok());
    }

    #[test]
    fn parse_app0_rejects_non_jfif_identifier() {
        let mut payload = b"Exif\0".to_vec();
        payload.extend_from_slice(&[0; 9]);
        let len = (payload.len() + 2) as u16;
        let mut bytes = len.to_be_bytes().to_vec();
        bytes.extend(payload);
        let mut reader = BitReader::new(bytes);
        assert!(parse_app0(&mut reader).is_err());
    }

    #[test]
    fn parse_app0_rejects_segment_too_short_for_identifier() {
        let len: u16 = 4;
        let mut bytes = len.to_be_bytes().to_vec();
        bytes.extend_from_slice(&[0, 0]);
        let mut reader = BitReader::new(bytes);
        assert!(parse_app0(&mut reader).is_err());
    }

    #[test]
    fn parse_sof_rejects_combined_sampling_factors_over_ten() {
        // Three components, each sampled 2x2 -> 4 blocks/MCU each, 12 total (max is 10).
        let mut payload = vec![8u8];
        payload.extend_from_slice(&8u16.to_be_bytes());
        payload.extend_from_slice(&8u16.to_be_bytes());
        payload.push(3);
        for id in 1..=3u8 {
            payload.push(id);
            payload.push(0x22);
            payload.push(0);
        }
        let len = (payload.len() + 2) as u16;
        let mut bytes = len.to_be_bytes().to_vec();
        bytes.extend(payload);
        let mut reader = BitReader::new(bytes);
        assert!(parse_sof(&mut reader, marker::SOF0).is_err());
    }
}
