//! Criterion benchmarks for book normalization and reference parsing.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tftools::booknm::{alias_table, to_canonical};
use tftools::corpus::CorpusBuilder;
use tftools::refs::Resolver;
use tftools::similarity::ratio;

fn bench_normalize(c: &mut Criterion) {
    let table = alias_table();
    let mut group = c.benchmark_group("normalize");

    // exact hit, roman prefix, fuzzy fallback
    for alias in ["Genesis", "II Kings", "Deuteronomie"] {
        group.bench_with_input(BenchmarkId::new("uncached", alias), &alias, |b, alias| {
            b.iter(|| table.lookup(black_box(alias), false))
        });
        group.bench_with_input(BenchmarkId::new("cached", alias), &alias, |b, alias| {
            b.iter(|| to_canonical(black_box(alias), false))
        });
    }

    group.finish();
}

fn bench_ratio(c: &mut Criterion) {
    c.bench_function("ratio/short", |b| {
        b.iter(|| ratio(black_box("deuteronomie"), black_box("deuteronomy")))
    });
}

fn bench_reference_list(c: &mut Criterion) {
    let mut builder = CorpusBuilder::new();
    builder.book("Genesis");
    for chapter in 1..=50 {
        builder.simple_chapter(chapter, 30);
    }
    builder.book("Exodus");
    for chapter in 1..=40 {
        builder.simple_chapter(chapter, 30);
    }
    let resolver = Resolver::new(builder.build());

    let mut group = c.benchmark_group("reference_list");

    for spec in ["Gen 1:1", "Gen 1:30-2:3; 3:1", "Gen 12; Exod 3:1-15", "Gen 48:1 - Exod 2:10"] {
        group.bench_with_input(BenchmarkId::from_parameter(spec), &spec, |b, spec| {
            b.iter(|| resolver.parse_reference_list(black_box(spec)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_ratio, bench_reference_list);
criterion_main!(benches);
