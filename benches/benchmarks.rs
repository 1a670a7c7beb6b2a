use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_distr::{Distribution, Exp};
use std::fs;
use std::io::Write;
use transits::prelude::*;

pub fn theory_benchmark(c: &mut Criterion) {
    c.bench_function("exact_median", |b| {
        b.iter(|| theory::exact_median(black_box(1500.0), black_box(100.0), 30.0, 2.5))
    });
    c.bench_function("approximate_median_50", |b| {
        b.iter(|| theory::approximate_median(black_box(50), 1500.0, black_box(100.0), 30.0, 2.5))
    });
}

pub fn ingest_benchmark(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let layout = Layout::new(dir.path());
    let exp = Exp::new(1.0 / 480.0).unwrap();
    let mut rng = rand::rngs::StdRng::seed_from_u64(73);
    let diffs = vec![0.01, 0.02, 0.03, 0.04];
    for &d in diffs.iter() {
        let folder = layout.inner_dir(d);
        fs::create_dir_all(&folder).unwrap();
        for run in 0..20 {
            let mut file = fs::File::create(folder.join(format!("run_{}.txt", run))).unwrap();
            writeln!(file, "bench").unwrap();
            writeln!(file, "who,{}", TICK_COLUMN).unwrap();
            for who in 0..1000 {
                writeln!(file, "{},{:.0}", who, exp.sample(&mut rng)).unwrap();
            }
        }
    }

    c.bench_function("aggregate_by_parameter", |b| {
        b.iter(|| aggregate_by_parameter(black_box(&diffs), |d| layout.inner_dir(d)))
    });
}

criterion_group!(benches, theory_benchmark, ingest_benchmark);
criterion_main!(benches);
