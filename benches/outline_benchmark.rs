//! Benchmarks for heuristic outline extraction.
//!
//! Run with: cargo bench
//!
//! These benchmarks exercise both extraction paths (heading walk and
//! sentence chunking) at various input sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use deckify::heuristic_outline;

/// Markdown with `section_count` headings of a few bullets each.
fn structured_markdown(section_count: usize) -> String {
    let mut text = String::new();
    for i in 0..section_count {
        text.push_str(&format!("# Section heading number {}\n", i));
        text.push_str("- the first point on this slide\n");
        text.push_str("- a second, slightly longer point with [a link](http://example.com)\n");
        text.push_str("- ![diagram](diagram.png) and a third point\n\n");
    }
    text
}

/// Plain prose with no structure at all.
fn plain_prose(sentence_count: usize) -> String {
    "The quarterly numbers continue to trend upward across every region we track. "
        .repeat(sentence_count)
}

fn bench_structured(c: &mut Criterion) {
    let mut group = c.benchmark_group("heuristic_structured");

    for section_count in [10, 100, 1000] {
        let text = structured_markdown(section_count);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(section_count),
            &text,
            |b, text| b.iter(|| heuristic_outline(black_box(text), "benchmark", false)),
        );
    }

    group.finish();
}

fn bench_chunked(c: &mut Criterion) {
    let mut group = c.benchmark_group("heuristic_chunked");

    for sentence_count in [10, 100, 1000] {
        let text = plain_prose(sentence_count);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(sentence_count),
            &text,
            |b, text| b.iter(|| heuristic_outline(black_box(text), "", false)),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_structured, bench_chunked);
criterion_main!(benches);
