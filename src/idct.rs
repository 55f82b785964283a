//! The 8x8 inverse DCT (§4.6 IdctStage), in two interchangeable flavours
//! selected through a function pointer the way the rest of the pipeline
//! swaps its per-stage implementations.
use std::f64::consts::{PI, SQRT_2};

/// A block of 64 dequantized, raster-ordered coefficients in, 64 clamped
/// spatial-domain samples out.
pub type IdctFn = fn(&[i32; 64]) -> [u8; 64];

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IdctAlgorithm {
    /// The direct separable-sum definition of the inverse DCT. Slow, but
    /// its correctness is obvious by inspection, which makes it a good
    /// fixture for testing the fast path against.
    Reference,
    /// The Loeffler/Ligtenberg/Moschytz sparse factorization: the same
    /// even/odd butterfly split used by every "fast" JPEG IDCT in the
    /// wild.
    Loeffler,
}

impl IdctAlgorithm {
    pub fn function(self) -> IdctFn {
        match self {
            IdctAlgorithm::Reference => idct_reference,
            IdctAlgorithm::Loeffler => idct_loeffler,
        }
    }
}

fn clamp_round(sample: f64) -> u8 {
    sample.round().clamp(0.0, 255.0) as u8
}

/// `C(0) = 1/sqrt(2)`, `C(u) = 1` otherwise.
fn c(u: usize) -> f64 {
    if u == 0 {
        1.0 / SQRT_2
    } else {
        1.0
    }
}

/// The textbook IDCT: `S(x,y) = 1/4 * sum_u sum_v C(u)C(v) F(u,v) cos(...) cos(...)`.
pub fn idct_reference(block: &[i32; 64]) -> [u8; 64] {
    let mut cos_table = [[0f64; 8]; 8];
    for (x, row) in cos_table.iter_mut().enumerate() {
        for (u, cell) in row.iter_mut().enumerate() {
            *cell = (((2 * x + 1) * u) as f64 * PI / 16.0).cos();
        }
    }

    let mut out = [0u8; 64];
    for y in 0..8 {
        for x in 0..8 {
            let mut sum = 0.0f64;
            for v in 0..8 {
                for u in 0..8 {
                    let coeff = f64::from(block[v * 8 + u]);
                    sum += c(u) * c(v) * coeff * cos_table[x][u] * cos_table[y][v];
                }
            }
            out[y * 8 + x] = clamp_round(0.25 * sum + 128.0);
        }
    }
    out
}

/// One 1-D inverse DCT pass via the Loeffler/Ligtenberg/Moschytz even/odd
/// butterfly split (the same factorization underlying every classic fast
/// float JPEG IDCT). Output is 8x too large relative to the normalized
/// transform; callers apply the compensating `1/8` scale once, after both
/// the row and the column pass.
fn loeffler_pass(s: &[f64; 8]) -> [f64; 8] {
    let (s0, s1, s2, s3, s4, s5, s6, s7) = (s[0], s[1], s[2], s[3], s[4], s[5], s[6], s[7]);

    // Even part.
    let tmp10 = s0 + s4;
    let tmp11 = s0 - s4;
    let tmp13 = s2 + s6;
    let tmp12 = (s2 - s6) * SQRT_2 - tmp13;
    let e0 = tmp10 + tmp13;
    let e3 = tmp10 - tmp13;
    let e1 = tmp11 + tmp12;
    let e2 = tmp11 - tmp12;

    // Odd part.
    let z13 = s5 + s3;
    let z10 = s5 - s3;
    let z11 = s1 + s7;
    let z12 = s1 - s7;

    let o7 = z11 + z13;
    let o11 = (z11 - z13) * SQRT_2;

    let z5 = (z10 + z12) * 1.847_759_065_f64;
    let o10 = 1.082_392_200_f64 * z12 - z5;
    let o12 = -2.613_125_930_f64 * z10 + z5;

    let o6 = o12 - o7;
    let o5 = o11 - o6;
    let o4 = o10 + o5;

    [
        e0 + o7,
        e1 + o6,
        e2 + o5,
        e3 - o4,
        e3 + o4,
        e2 - o5,
        e1 - o6,
        e0 - o7,
    ]
}

pub fn idct_loeffler(block: &[i32; 64]) -> [u8; 64] {
    let mut rows = [[0f64; 8]; 8];
    for (r, row) in rows.iter_mut().enumerate() {
        let input: [f64; 8] = std::array::from_fn(|c| f64::from(block[r * 8 + c]));
        *row = loeffler_pass(&input);
    }

    let mut cols = [[0f64; 8]; 8];
    for col_idx in 0..8 {
        let input: [f64; 8] = std::array::from_fn(|r| rows[r][col_idx]);
        let out = loeffler_pass(&input);
        for (r, v) in out.into_iter().enumerate() {
            cols[r][col_idx] = v;
        }
    }

    let mut out = [0u8; 64];
    for y in 0..8 {
        for x in 0..8 {
            out[y * 8 + x] = clamp_round(cols[y][x] * 0.125 + 128.0);
        }
    }
    out
}
