//! Hand-assembled synthetic JPEG byte streams for the integration tests.
//!
//! There are no fixture images in this workspace, so every test builds its
//! own minimal, deterministic bitstream instead of decoding real photos.
#![allow(dead_code)]

/// MSB-first bit packer with JPEG byte-stuffing and the standard
/// pad-with-ones convention at end of segment.
pub struct BitWriter {
    bytes: Vec<u8>,
    cur: u8,
    nbits: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        BitWriter {
            bytes: Vec::new(),
            cur: 0,
            nbits: 0,
        }
    }

    pub fn push_bits(&mut self, value: u32, n: u8) {
        for i in (0..n).rev() {
            let bit = ((value >> i) & 1) as u8;
            self.cur = (self.cur << 1) | bit;
            self.nbits += 1;
            if self.nbits == 8 {
                self.flush_byte();
            }
        }
    }

    fn flush_byte(&mut self) {
        self.bytes.push(self.cur);
        if self.cur == 0xFF {
            self.bytes.push(0x00);
        }
        self.cur = 0;
        self.nbits = 0;
    }

    pub fn finish(mut self) -> Vec<u8> {
        if self.nbits > 0 {
            let pad = 8 - self.nbits;
            self.cur = (self.cur << pad) | ((1u8 << pad) - 1);
            self.flush_byte();
        }
        self.bytes
    }
}

/// A minimal valid JFIF APP0 segment: identifier, version 1.2, no density
/// info, no thumbnail.
pub fn app0_jfif() -> Vec<u8> {
    let mut payload = b"JFIF\0".to_vec();
    payload.extend_from_slice(&[1, 2, 0, 0, 1, 0, 1, 0, 0]);
    segment(0xE0, &payload)
}

fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFF, marker];
    let len = (payload.len() + 2) as u16;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(payload);
    out
}

pub fn dqt_all_ones(id: u8) -> Vec<u8> {
    let mut payload = vec![id];
    payload.extend(std::iter::repeat(1u8).take(64));
    segment(0xDB, &payload)
}

/// A DHT segment with `counts[len-1] = symbols.len()` for a single length
/// `len`, assigning consecutive canonical codes of that one length.
pub fn dht_flat(class_and_id: u8, len: u8, symbols: &[u8]) -> Vec<u8> {
    let mut payload = vec![class_and_id];
    let mut counts = [0u8; 16];
    counts[usize::from(len) - 1] = symbols.len() as u8;
    payload.extend_from_slice(&counts);
    payload.extend_from_slice(symbols);
    segment(0xC4, &payload)
}

pub fn sof(marker: u8, width: u16, height: u16, components: &[(u8, u8, u8)]) -> Vec<u8> {
    let mut payload = vec![8u8];
    payload.extend_from_slice(&height.to_be_bytes());
    payload.extend_from_slice(&width.to_be_bytes());
    payload.push(components.len() as u8);
    for &(id, hv, qt) in components {
        payload.push(id);
        payload.push(hv);
        payload.push(qt);
    }
    segment(marker, &payload)
}

pub fn sos(components: &[(u8, u8)], ss: u8, se: u8, ah_al: u8) -> Vec<u8> {
    let mut payload = vec![components.len() as u8];
    for &(cs, tdta) in components {
        payload.push(cs);
        payload.push(tdta);
    }
    payload.push(ss);
    payload.push(se);
    payload.push(ah_al);
    segment(0xDA, &payload)
}

/// One 1-bit DC code ("0") for magnitude 0, one 1-bit AC code ("0") for
/// EOB — the minimal Huffman pair every test below reuses.
fn flat_tables() -> Vec<u8> {
    let mut data = dht_flat(0x00, 1, &[0]);
    data.extend(dht_flat(0x10, 1, &[0x00]));
    data
}

/// Same image as [`baseline_gray_8x8`], preceded by a valid JFIF APP0
/// segment, exercising the APP0-identifier-verification path.
pub fn baseline_gray_8x8_with_jfif() -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    data.extend(app0_jfif());
    data.extend(&baseline_gray_8x8()[2..]);
    data
}

/// An 8x8, single-MCU grayscale baseline JPEG whose sole block is a flat
/// DC=0 coefficient grid, decoding to uniform mid-gray (128).
pub fn baseline_gray_8x8() -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    data.extend(dqt_all_ones(0));
    data.extend(flat_tables());
    data.extend(sof(0xC0, 8, 8, &[(1, 0x11, 0)]));
    data.extend(sos(&[(1, 0x00)], 0, 63, 0x00));

    let mut bw = BitWriter::new();
    bw.push_bits(0, 1); // DC: magnitude 0
    bw.push_bits(0, 1); // AC: EOB
    data.extend(bw.finish());

    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

/// 8x8, single-MCU YCbCr baseline JPEG, no subsampling, every component's
/// block flat DC=0 — decodes to uniform (128,128,128) RGB.
pub fn baseline_color_8x8() -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    data.extend(dqt_all_ones(0));
    data.extend(flat_tables());
    data.extend(sof(
        0xC0,
        8,
        8,
        &[(1, 0x11, 0), (2, 0x11, 0), (3, 0x11, 0)],
    ));
    data.extend(sos(&[(1, 0x00), (2, 0x00), (3, 0x00)], 0, 63, 0x00));

    let mut bw = BitWriter::new();
    for _ in 0..3 {
        bw.push_bits(0, 1);
        bw.push_bits(0, 1);
    }
    data.extend(bw.finish());

    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

/// A non-multiple-of-8 grayscale image (5x5): one padded 8x8 block, flat
/// DC=0, exercising the crop-to-declared-dimensions path.
pub fn baseline_gray_5x5() -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    data.extend(dqt_all_ones(0));
    data.extend(flat_tables());
    data.extend(sof(0xC0, 5, 5, &[(1, 0x11, 0)]));
    data.extend(sos(&[(1, 0x00)], 0, 63, 0x00));

    let mut bw = BitWriter::new();
    bw.push_bits(0, 1);
    bw.push_bits(0, 1);
    data.extend(bw.finish());

    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

/// A 16x8 grayscale image: two horizontally adjacent MCUs (blocks 0 and
/// 1), with distinct DC values so a block-placement bug (e.g. swapping
/// the two blocks, or overwriting one with the other) is observable.
///
/// DC Huffman table: 1-bit code "0" -> magnitude 0 (diff 0), 2-bit code
/// "10" -> magnitude 1 (diff -1 or +1, from the following raw bit).
pub fn two_mcu_gray_16x8() -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    data.extend(dqt_all_ones(0));
    data.extend(dht_flat(0x00, 1, &[0]));
    // second code gets length 2 via a second count-table entry
    let mut dc_payload = vec![0x00u8];
    let mut counts = [0u8; 16];
    counts[0] = 1; // one 1-bit code
    counts[1] = 1; // one 2-bit code
    dc_payload.extend_from_slice(&counts);
    dc_payload.extend_from_slice(&[0, 1]); // symbols: magnitude 0, magnitude 1
    data.extend(segment(0xC4, &dc_payload));
    data.extend(dht_flat(0x10, 1, &[0x00]));
    data.extend(sof(0xC0, 16, 8, &[(1, 0x11, 0)]));
    data.extend(sos(&[(1, 0x00)], 0, 63, 0x00));

    let mut bw = BitWriter::new();
    // Block 0: DC code "0" (magnitude 0, diff 0), AC EOB.
    bw.push_bits(0, 1);
    bw.push_bits(0, 1);
    // Block 1: DC code "10" (magnitude 1) + raw bit 1 (diff +1), AC EOB.
    bw.push_bits(0b10, 2);
    bw.push_bits(1, 1);
    bw.push_bits(0, 1);
    data.extend(bw.finish());

    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

/// A 16x16 4:2:0-subsampled YCbCr image: luma sampled 2x2 (four blocks
/// per MCU), chroma 1x1 (one block each), single MCU overall. Every
/// block is flat DC=0, so after remap + upsample + colour-convert the
/// whole frame should come out uniform (128,128,128).
pub fn subsampled_color_16x16() -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    data.extend(dqt_all_ones(0));
    data.extend(flat_tables());
    data.extend(sof(
        0xC0,
        16,
        16,
        &[(1, 0x22, 0), (2, 0x11, 0), (3, 0x11, 0)],
    ));
    data.extend(sos(&[(1, 0x00), (2, 0x00), (3, 0x00)], 0, 63, 0x00));

    let mut bw = BitWriter::new();
    // One MCU: 4 luma blocks, 1 Cb block, 1 Cr block, each DC=0 + EOB.
    for _ in 0..(4 + 1 + 1) {
        bw.push_bits(0, 1);
        bw.push_bits(0, 1);
    }
    data.extend(bw.finish());

    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

/// A 16x8 4:2:2-style subsampled YCbCr image: luma sampled 2x1 (two
/// blocks per MCU, side by side), chroma 1x1. Every block flat DC=0.
pub fn subsampled_color_16x8_h2v1() -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    data.extend(dqt_all_ones(0));
    data.extend(flat_tables());
    data.extend(sof(
        0xC0,
        16,
        8,
        &[(1, 0x21, 0), (2, 0x11, 0), (3, 0x11, 0)],
    ));
    data.extend(sos(&[(1, 0x00), (2, 0x00), (3, 0x00)], 0, 63, 0x00));

    let mut bw = BitWriter::new();
    for _ in 0..(2 + 1 + 1) {
        bw.push_bits(0, 1);
        bw.push_bits(0, 1);
    }
    data.extend(bw.finish());

    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

/// An 8x8 progressive grayscale image exercising all four progressive
/// scan kinds: first DC, DC refinement, first AC, and AC refinement. The
/// AC refinement scan decodes a single run/magnitude symbol that both
/// corrects an already-nonzero coefficient (NZH) and places a new one at
/// the following zero position (ZH) in the same walk, matching how a real
/// encoder interleaves the two within one EOBn-free symbol.
pub fn progressive_gray_8x8_with_refinement() -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    data.extend(dqt_all_ones(0));
    data.extend(dht_flat(0x00, 1, &[0])); // DC: "0" -> magnitude 0
    data.extend(dht_flat(0x10, 2, &[0x31, 0x00])); // AC: "00" -> run3/mag1, "01" -> EOB
    data.extend(sof(0xC2, 8, 8, &[(1, 0x11, 0)]));

    // First DC: al=1, magnitude 0 -> block[0] = 0.
    data.extend(sos(&[(1, 0x00)], 0, 0, 0x01));
    let mut bw = BitWriter::new();
    bw.push_bits(0, 1);
    data.extend(bw.finish());

    // DC refinement: al=0, one correction bit set -> block[0] = 1.
    data.extend(sos(&[(1, 0x00)], 0, 0, 0x10));
    let mut bw = BitWriter::new();
    bw.push_bits(1, 1);
    data.extend(bw.finish());

    // First AC: al=1. Symbol 0x31 (run3/mag1) places +1<<1=2 at zigzag
    // index 4, then EOB.
    data.extend(sos(&[(1, 0x00)], 1, 63, 0x01));
    let mut bw = BitWriter::new();
    bw.push_bits(0b00, 2); // symbol 0x31
    bw.push_bits(1, 1); // sign bit: positive
    bw.push_bits(0b01, 2); // symbol 0x00 (EOB)
    data.extend(bw.finish());

    // AC refinement: al=0. Symbol 0x31 walks 3 zero positions, applies a
    // correction to the nonzero coefficient at index 4 (NZH, 2 -> 3), then
    // places a new coefficient at index 5 (ZH), followed by EOB.
    data.extend(sos(&[(1, 0x00)], 1, 63, 0x10));
    let mut bw = BitWriter::new();
    bw.push_bits(0b00, 2); // symbol 0x31
    bw.push_bits(1, 1); // sign bit for the new ZH coefficient: positive
    bw.push_bits(1, 1); // correction bit for the NZH coefficient at index 4
    bw.push_bits(0b01, 2); // symbol 0x00 (EOB)
    data.extend(bw.finish());

    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

/// An 8x8 progressive grayscale image split across a first-DC scan and a
/// first-AC scan (no refinement passes) — the minimal legal progressive
/// stream. Both scans reuse the flat DC=0/EOB Huffman tables, so the
/// result is the same uniform mid-gray image as [`baseline_gray_8x8`].
pub fn progressive_gray_8x8() -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    data.extend(dqt_all_ones(0));
    data.extend(flat_tables());
    data.extend(sof(0xC2, 8, 8, &[(1, 0x11, 0)]));

    data.extend(sos(&[(1, 0x00)], 0, 0, 0x00));
    let mut bw = BitWriter::new();
    bw.push_bits(0, 1); // DC magnitude 0
    data.extend(bw.finish());

    data.extend(sos(&[(1, 0x00)], 1, 63, 0x00));
    let mut bw = BitWriter::new();
    bw.push_bits(0, 1); // AC EOB
    data.extend(bw.finish());

    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}
