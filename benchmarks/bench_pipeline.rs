use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use loglens::parsers::{EntryParser, PatternParser, StandardParser};
use loglens::{AnalysisContext, Pipeline, PipelineOptions};

fn synthetic_log(lines: usize) -> Vec<u8> {
    let mut out = String::with_capacity(lines * 60);
    for i in 0..lines {
        let (minute, second) = ((i / 60) % 60, i % 60);
        match i % 6 {
            0 => out.push_str(&format!(
                "[2026-01-05 10:{:02}:{:02}] [ERROR] Database connection failed on shard {}\n",
                minute,
                second,
                i % 17
            )),
            1 => out.push_str(&format!(
                "[2026-01-05 10:{:02}:{:02}] [WARNING] Slow query detected ({} ms)\n",
                minute,
                second,
                i % 900
            )),
            2 => out.push_str("malformed line without brackets\n"),
            _ => out.push_str(&format!(
                "[2026-01-05 10:{:02}:{:02}] [INFO] Request {} served\n",
                minute, second, i
            )),
        }
    }
    out.into_bytes()
}

fn bench_standard_parser(c: &mut Criterion) {
    let parser = StandardParser::new();
    let line = b"[2026-01-05 10:30:15] [ERROR] Database connection failed";
    c.bench_function("standard_parse_line", |b| {
        b.iter(|| black_box(parser.parse(black_box(line), 1).is_ok()));
    });
}

fn bench_pattern_parser(c: &mut Criterion) {
    let parser = PatternParser::new("[%D %T] [%L] %M");
    let line = b"[2026-01-05 10:30:15] [ERROR] Database connection failed";
    c.bench_function("pattern_parse_line", |b| {
        b.iter(|| black_box(parser.parse(black_box(line), 1).is_ok()));
    });
}

fn bench_pipeline_workers(c: &mut Criterion) {
    let data = synthetic_log(200_000);
    let context = AnalysisContext::new().with_keyword(Some("shard".to_string()));

    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.sample_size(10);

    let cores = num_cpus::get().max(2);
    for workers in [1, cores] {
        let pipeline = Pipeline::new(context.clone()).with_options(PipelineOptions {
            workers: Some(workers),
            small_input_threshold: 0,
            ..PipelineOptions::default()
        });
        group.bench_with_input(BenchmarkId::new("workers", workers), &data, |b, data| {
            b.iter(|| black_box(pipeline.run_bytes(data, |_| true).result.total_lines));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_standard_parser,
    bench_pattern_parser,
    bench_pipeline_workers
);
criterion_main!(benches);
