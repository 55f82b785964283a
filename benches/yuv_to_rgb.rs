//! Benchmark the fixed-point YCbCr -> RGB conversion, single pixel vs. a
//! full row.
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jpegrs::color_convert::{convert_row_rgb, ycbcr_to_rgb};

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("YCbCr to RGB (single pixel)", |b| {
        b.iter(|| black_box(ycbcr_to_rgb(black_box(69), black_box(69), black_box(76))))
    });

    let y = vec![69u8; 1024];
    let cb = vec![69u8; 1024];
    let cr = vec![76u8; 1024];
    let mut out = vec![0u8; 1024 * 3];
    c.bench_function("YCbCr to RGB (1024-pixel row)", |b| {
        b.iter(|| {
            convert_row_rgb(
                black_box(&y),
                black_box(&cb),
                black_box(&cr),
                black_box(&mut out),
            )
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
