//! Console rendering benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use mochi_console::{ConsoleRegistry, MemoryDisplay, ScreenId};

fn bench_render_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("console");

    // Enough text to scroll the bottom screen several times
    let text = "The quick brown fox jumps over the lazy dog.\n".repeat(200);
    group.throughput(Throughput::Bytes(text.len() as u64));

    group.bench_function("scrolling_text", |b| {
        let mut display = MemoryDisplay::default();
        let mut registry = ConsoleRegistry::new();
        registry.init(&mut display, ScreenId::Bottom, None);
        b.iter(|| black_box(registry.write(&mut display, None, black_box(text.as_bytes()))))
    });

    group.finish();
}

fn bench_render_colored(c: &mut Criterion) {
    let mut group = c.benchmark_group("console");

    let colored = "\x1b[31;1mred\x1b[0m \x1b[44mblue\x1b[0m \x1b[7mrev\x1b[27m\n".repeat(200);
    group.throughput(Throughput::Bytes(colored.len() as u64));

    group.bench_function("colored_text", |b| {
        let mut display = MemoryDisplay::default();
        let mut registry = ConsoleRegistry::new();
        registry.init(&mut display, ScreenId::Top, None);
        b.iter(|| black_box(registry.write(&mut display, None, black_box(colored.as_bytes()))))
    });

    group.finish();
}

fn bench_clear(c: &mut Criterion) {
    let mut display = MemoryDisplay::default();
    let mut registry = ConsoleRegistry::new();
    registry.init(&mut display, ScreenId::Top, None);

    c.bench_function("console/clear", |b| {
        b.iter(|| registry.clear(&mut display, None))
    });
}

criterion_group!(benches, bench_render_text, bench_render_colored, bench_clear);
criterion_main!(benches);
