use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use gridiron_picks::analysis::build_game_id;
use gridiron_picks::extract::{confidence_value, extract_prediction, score_numbers};

fn bench_full_report_extract(c: &mut Criterion) {
    c.bench_function("full_report_extract", |b| {
        b.iter(|| {
            let prediction = extract_prediction(
                black_box("Philadelphia Eagles"),
                black_box("New York Giants"),
                black_box("New York Giants"),
                black_box(2025),
                black_box(FULL_REPORT),
            );
            black_box(prediction.key_factors.len());
        })
    });
}

fn bench_vague_report_defaults(c: &mut Criterion) {
    c.bench_function("vague_report_defaults", |b| {
        b.iter(|| {
            let prediction = extract_prediction(
                black_box("Philadelphia Eagles"),
                black_box("New York Giants"),
                black_box("Philadelphia Eagles"),
                black_box(2025),
                black_box(VAGUE_REPORT),
            );
            black_box(prediction.predicted_winner.len());
        })
    });
}

fn bench_score_projection(c: &mut Criterion) {
    c.bench_function("score_projection", |b| {
        b.iter(|| {
            let pair = score_numbers(black_box("New York Giants 27, Philadelphia Eagles 21"));
            black_box(pair.0 + pair.1);
        })
    });
}

fn bench_confidence_projection(c: &mut Criterion) {
    c.bench_function("confidence_projection", |b| {
        b.iter(|| {
            black_box(confidence_value(black_box("82%")));
        })
    });
}

fn bench_game_id_build(c: &mut Criterion) {
    c.bench_function("game_id_build", |b| {
        b.iter(|| {
            let id = build_game_id(
                black_box("Philadelphia Eagles"),
                black_box("New York Giants"),
                black_box(7),
            );
            black_box(id.len());
        })
    });
}

criterion_group!(
    perf,
    bench_full_report_extract,
    bench_vague_report_defaults,
    bench_score_projection,
    bench_confidence_projection,
    bench_game_id_build
);
criterion_main!(perf);

static FULL_REPORT: &str = include_str!("../tests/fixtures/full_report.txt");
static VAGUE_REPORT: &str = include_str!("../tests/fixtures/vague_report.txt");
