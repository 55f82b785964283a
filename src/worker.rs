//! Post-entropy parallel stage: inverse quantization, inverse zig-zag and
//! IDCT (§5 Concurrency & Resource Model).
//!
//! Entropy decoding itself is inherently sequential (DC prediction
//! chains, progressive bit planes) and never touches this module. Once a
//! component's coefficient grid is fully populated, decoding each block
//! to spatial samples is embarrassingly parallel, so it is split across a
//! `scoped_threadpool::Pool` sized by the caller (typically
//! `num_cpus::get()`), each worker owning a disjoint contiguous slice of
//! blocks with its own stack-local scratch. Below `2*workers` blocks the
//! pool isn't worth spinning up and decoding runs serially on the caller.
use crate::idct::IdctFn;
use crate::misc::{dequantize, inverse_zigzag};

fn decode_one_block(block: &[i32; 64], qt: &[u8; 64], idct: IdctFn) -> [u8; 64] {
    let dequantized = dequantize(block, qt);
    let raster = inverse_zigzag(&dequantized);
    idct(&raster)
}

/// Decode every coefficient block in a component to an 8x8 spatial-domain
/// block, in the same order as the input slice (storage order, not
/// necessarily raster order — see [`assemble_plane`]).
pub fn decode_blocks(
    blocks: &[[i32; 64]],
    qt: &[u8; 64],
    idct: IdctFn,
    workers: usize,
) -> Vec<[u8; 64]> {
    let n = blocks.len();
    let workers = workers.max(1);

    if workers == 1 || n < 2 * workers {
        return blocks.iter().map(|b| decode_one_block(b, qt, idct)).collect();
    }

    let mut out = vec![[0u8; 64]; n];
    let chunk_size = (n + workers - 1) / workers;
    let mut pool = scoped_threadpool::Pool::new(workers as u32);

    pool.scoped(|scope| {
        for (in_chunk, out_chunk) in blocks.chunks(chunk_size).zip(out.chunks_mut(chunk_size)) {
            scope.execute(move || {
                for (block, spatial) in in_chunk.iter().zip(out_chunk.iter_mut()) {
                    *spatial = decode_one_block(block, qt, idct);
                }
            });
        }
    });

    out
}

/// Lay decoded blocks, addressed through `mcu_map` (storage index for
/// each raster-block position), into one contiguous plane of samples at
/// `block_width*8` x `block_height*8` resolution (§4.8 Image Assembly).
pub fn assemble_plane(
    blocks: &[[u8; 64]],
    mcu_map: &[usize],
    block_width: usize,
    block_height: usize,
) -> Vec<u8> {
    let width = block_width * 8;
    let mut plane = vec![0u8; width * block_height * 8];

    for raster_idx in 0..block_width * block_height {
        let storage_idx = mcu_map[raster_idx];
        let block = &blocks[storage_idx];
        let by = raster_idx / block_width;
        let bx = raster_idx % block_width;
        for row in 0..8 {
            let dst_start = (by * 8 + row) * width + bx * 8;
            plane[dst_start..dst_start + 8].copy_from_slice(&block[row * 8..row * 8 + 8]);
        }
    }
    plane
}
