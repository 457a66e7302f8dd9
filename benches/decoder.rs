//! Benchmark suite for the service-data decoder.
//!
//! Isolates decoding and reading rendering from the async pipeline.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use ble_thermo_exporter::decode;

/// Extended payload: 10.00°C, 2.00%, 3172 mV, 75%, counter 5, flags 0x01
fn extended_payload() -> Vec<u8> {
    vec![
        0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0xE8, 0x03, 0xC8, 0x00, 0x64, 0x0C, 0x4B, 0x05, 0x01,
    ]
}

/// Compact payload: 10.0°C, 50%, 75%, 3172 mV, counter 5
fn compact_payload() -> Vec<u8> {
    vec![
        0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x00, 0x64, 0x32, 0x4B, 0x0C, 0x64, 0x05,
    ]
}

/// Benchmark decoding of each payload format, plus a rejected length
fn bench_decode_formats(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_format");
    group.throughput(Throughput::Elements(1));

    let extended = extended_payload();
    group.bench_function("extended", |b| {
        b.iter(|| black_box(decode(black_box(&extended))))
    });

    let compact = compact_payload();
    group.bench_function("compact", |b| {
        b.iter(|| black_box(decode(black_box(&compact))))
    });

    let rejected = vec![0u8; 14];
    group.bench_function("rejected", |b| {
        b.iter(|| black_box(decode(black_box(&rejected))))
    });

    group.finish();
}

/// Benchmark the diagnostic line and device id label rendering
fn bench_render_reading(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_reading");
    group.throughput(Throughput::Elements(1));

    let extended = decode(&extended_payload()).unwrap();
    group.bench_function("log_line_extended", |b| {
        b.iter(|| black_box(black_box(&extended).to_string()))
    });

    let compact = decode(&compact_payload()).unwrap();
    group.bench_function("log_line_compact", |b| {
        b.iter(|| black_box(black_box(&compact).to_string()))
    });

    group.bench_function("device_id_label", |b| {
        b.iter(|| black_box(black_box(&extended.device_id).to_string()))
    });

    group.finish();
}

criterion_group!(benches, bench_decode_formats, bench_render_reading);
criterion_main!(benches);
