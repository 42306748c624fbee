extern crate criterion;
extern crate vector_delta;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vector_delta::indicators::gapfill_delta::{
    gapfill_delta, gapfill_delta_batch_par_slice, gapfill_delta_batch_slice, GapfillDeltaBatchRange,
    GapfillDeltaInput, GapfillDeltaParams, USECS_PER_SEC,
};
use std::time::Duration;

const SAMPLES: usize = 100_000;

/// Synthetic counter sampled every ~10 s with periodic scrape gaps.
fn synthetic_counter() -> (Vec<i64>, Vec<f64>) {
    let mut timestamps = Vec::with_capacity(SAMPLES);
    let mut values = Vec::with_capacity(SAMPLES);
    let mut t = 2_000_000_000 * USECS_PER_SEC;
    let mut v = 1.0e9;
    for i in 0..SAMPLES {
        timestamps.push(t);
        values.push(v);
        let gap = if i % 97 == 0 { 180 } else { 10 + (i % 3) as i64 };
        t -= gap * USECS_PER_SEC;
        v -= (i % 17) as f64;
    }
    (timestamps, values)
}

fn benchmark_gapfill_delta(c: &mut Criterion) {
    let (timestamps, values) = synthetic_counter();
    let end = timestamps[0];
    let start = timestamps[SAMPLES - 1];

    let mut group = c.benchmark_group("Gapfill Delta");
    group.measurement_time(Duration::new(8, 0));
    group.warm_up_time(Duration::new(4, 0));

    for &step_s in &[10i64, 60, 300] {
        group.bench_function(BenchmarkId::new("single", step_s), |b| {
            let input = GapfillDeltaInput::from_slices(
                &timestamps,
                &values,
                start,
                end,
                GapfillDeltaParams {
                    step: Some(step_s * USECS_PER_SEC),
                    range: Some(300 * USECS_PER_SEC),
                },
            );
            b.iter(|| gapfill_delta(black_box(&input)).expect("Failed to calculate gapfill_delta"))
        });
    }

    let sweep = GapfillDeltaBatchRange {
        step: (60 * USECS_PER_SEC, 300 * USECS_PER_SEC, 60 * USECS_PER_SEC),
        range: (120 * USECS_PER_SEC, 900 * USECS_PER_SEC, 120 * USECS_PER_SEC),
    };

    group.bench_function(BenchmarkId::new("batch", 0), |b| {
        b.iter(|| {
            gapfill_delta_batch_slice(black_box(&timestamps), black_box(&values), start, end, &sweep)
                .expect("Failed to calculate gapfill_delta batch")
        })
    });

    group.bench_function(BenchmarkId::new("batch_par", 0), |b| {
        b.iter(|| {
            gapfill_delta_batch_par_slice(black_box(&timestamps), black_box(&values), start, end, &sweep)
                .expect("Failed to calculate gapfill_delta batch")
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_gapfill_delta);
criterion_main!(benches);
