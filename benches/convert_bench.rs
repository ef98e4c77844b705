// Conversion Benchmarks
// Performance benchmarks for the indexed-to-color conversion paths

use criterion::{criterion_group, criterion_main, Criterion};
use retroframe::filter::{double_pixels, ConvertOptions, FrameConverter, Zoom};
use retroframe::palette::{ColorTable, GamePalette};
use retroframe::{IndexedFramebuffer, VISIBLE_HEIGHT, VISIBLE_WIDTH};
use std::hint::black_box;

/// Helper function to create a framebuffer full of dither patterns,
/// the worst case for the analyzer
fn dithered_framebuffer() -> IndexedFramebuffer {
    let mut fb = IndexedFramebuffer::new();
    fb.dither_pattern();
    fb
}

/// Benchmark whole-frame conversion at 1x
/// This is the main per-frame cost of the pipeline
fn bench_convert_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_frame");
    group.sample_size(30); // Whole-frame conversions are slow to sample

    let fb = dithered_framebuffer();
    let table = ColorTable::build(&GamePalette::grayscale());

    group.bench_function("no_filter_1_worker", |b| {
        let mut converter = FrameConverter::<u32>::new(1);
        let mut out = vec![0u32; VISIBLE_WIDTH * VISIBLE_HEIGHT];
        let opts = ConvertOptions {
            filter_dithering: false,
            zoom: Zoom::X1,
        };

        b.iter(|| {
            converter.convert_frame(&fb, &table, &mut out, opts);
            black_box(&out);
        });
    });

    group.bench_function("dithering_1_worker", |b| {
        let mut converter = FrameConverter::<u32>::new(1);
        let mut out = vec![0u32; VISIBLE_WIDTH * VISIBLE_HEIGHT];
        let opts = ConvertOptions {
            filter_dithering: true,
            zoom: Zoom::X1,
        };

        b.iter(|| {
            converter.convert_frame(&fb, &table, &mut out, opts);
            black_box(&out);
        });
    });

    group.bench_function("dithering_4_workers", |b| {
        let mut converter = FrameConverter::<u32>::new(4);
        let mut out = vec![0u32; VISIBLE_WIDTH * VISIBLE_HEIGHT];
        let opts = ConvertOptions {
            filter_dithering: true,
            zoom: Zoom::X1,
        };

        b.iter(|| {
            converter.convert_frame(&fb, &table, &mut out, opts);
            black_box(&out);
        });
    });

    group.finish();
}

/// Benchmark the 2x pixel-doubled path
fn bench_convert_zoomed(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_zoomed");
    group.sample_size(20);

    let fb = dithered_framebuffer();
    let table = ColorTable::build(&GamePalette::grayscale());

    group.bench_function("dithering_2x_4_workers", |b| {
        let mut converter = FrameConverter::<u32>::new(4);
        let mut out = vec![0u32; VISIBLE_WIDTH * VISIBLE_HEIGHT * 4];
        let opts = ConvertOptions {
            filter_dithering: true,
            zoom: Zoom::X2,
        };

        b.iter(|| {
            converter.convert_frame(&fb, &table, &mut out, opts);
            black_box(&out);
        });
    });

    group.bench_function("double_pixels_only", |b| {
        let src = vec![0xFFAA5500u32; VISIBLE_WIDTH * VISIBLE_HEIGHT];
        let mut dst = vec![0u32; VISIBLE_WIDTH * VISIBLE_HEIGHT * 4];

        b.iter(|| {
            double_pixels(&src, &mut dst, VISIBLE_WIDTH, 0, VISIBLE_HEIGHT);
            black_box(&dst);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_convert_frame, bench_convert_zoomed);
criterion_main!(benches);
