//! Benchmarks for chatvault parsing and assembly.
//!
//! Run with: `cargo bench`
//! Run specific group: `cargo bench --bench parsing -- grammar`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chatvault::config::{AssemblerConfig, ParserConfig};
use chatvault::core::output::{MemorySink, to_jsonl};
use chatvault::core::{SenderTable, SystemSender, assemble_room, sanitize};
use chatvault::import::{Importer, RoomSource};
use chatvault::parser::{LogParser, Parser};
use chatvault::parsing::{German, parse_structure, reduce};

// =============================================================================
// Test Data Generators
// =============================================================================

fn generate_log(count: usize) -> String {
    let mut log = String::from("01.01.21, 00:00 - Anna hat die Gruppe „Eiergilde“ erstellt\n");
    for i in 0..count {
        let sender = if i % 2 == 0 { "Anna" } else { "Ben" };
        let day = i / 1440 % 28 + 1;
        let hour = i / 60 % 24;
        let minute = i % 60;
        let header = format!("{day:02}.01.21, {hour:02}:{minute:02} - ");
        match i % 10 {
            0 => log.push_str(&format!("{header}{sender}: IMG-{i:04}.jpg (Datei angehängt)\nBildunterschrift {i}\n")),
            1 => log.push_str(&format!("{header}{sender}: <Medien ausgeschlossen>\n")),
            2 => log.push_str(&format!("{header}Anna hat Gast {i} hinzugefügt\n")),
            3 => log.push_str(&format!("{header}{sender}: Nachricht {i}\nmit zweiter Zeile\n")),
            _ => log.push_str(&format!("{header}{sender}: Nachricht Nummer {i}\n")),
        }
    }
    log
}

// =============================================================================
// Parsing Benchmarks
// =============================================================================

fn bench_grammar(c: &mut Criterion) {
    let mut group = c.benchmark_group("grammar");

    for size in [100_usize, 1_000, 10_000] {
        let log = generate_log(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &log, |b, log| {
            b.iter(|| {
                let tree = parse_structure(black_box(log), &German).unwrap();
                black_box(tree.len())
            });
        });
    }
    group.finish();
}

fn bench_parse_and_reduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_and_reduce");
    let config = ParserConfig::default();

    for size in [100_usize, 1_000, 10_000] {
        let log = generate_log(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &log, |b, log| {
            b.iter(|| {
                let tree = parse_structure(black_box(log), &German).unwrap();
                black_box(reduce(tree, &config).unwrap())
            });
        });
    }
    group.finish();
}

// =============================================================================
// Processing Benchmarks
// =============================================================================

fn bench_sanitize(c: &mut Criterion) {
    let mut group = c.benchmark_group("sanitize");
    let parser = LogParser::new();

    for size in [1_000_usize, 10_000] {
        let records = parser.parse_str(&generate_log(size)).unwrap();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| black_box(sanitize(records.clone())));
        });
    }
    group.finish();
}

fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble");
    let parser = LogParser::new();
    let system = SystemSender::generate();
    let config = AssemblerConfig::default();

    for size in [1_000_usize, 10_000] {
        let records = sanitize(parser.parse_str(&generate_log(size)).unwrap());
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| {
                let room = assemble_room(
                    black_box(records),
                    "Eiergilde",
                    &SenderTable::new(),
                    &system,
                    &config,
                )
                .unwrap();
                black_box(room)
            });
        });
    }
    group.finish();
}

fn bench_output_jsonl(c: &mut Criterion) {
    let records = sanitize(LogParser::new().parse_str(&generate_log(10_000)).unwrap());
    let room = assemble_room(
        &records,
        "Eiergilde",
        &SenderTable::new(),
        &SystemSender::generate(),
        &AssemblerConfig::default(),
    )
    .unwrap()
    .unwrap();

    c.bench_function("output_jsonl_10000", |b| {
        b.iter(|| black_box(to_jsonl(black_box(&room)).unwrap()));
    });
}

// =============================================================================
// Full Pipeline Benchmark
// =============================================================================

fn bench_full_import(c: &mut Criterion) {
    let sources: Vec<RoomSource> = (0..8)
        .map(|i| RoomSource::from_string(format!("Raum {i}"), generate_log(2_000)))
        .collect();

    c.bench_function("full_import_8x2000", |b| {
        b.iter(|| {
            let mut importer = Importer::new(MemorySink::new());
            black_box(importer.import(black_box(&sources)).unwrap())
        });
    });
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(
    benches,
    bench_grammar,
    bench_parse_and_reduce,
    bench_sanitize,
    bench_assemble,
    bench_output_jsonl,
    bench_full_import,
);

criterion_main!(benches);
