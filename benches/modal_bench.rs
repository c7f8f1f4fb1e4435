use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flow_modes::*;

fn bench_pod(c: &mut Criterion) {
    let mut group = c.benchmark_group("pod");

    for &(nx, n_snapshots) in &[(8, 50), (16, 100), (32, 50)] {
        let data = generate_test_data(nx, nx, n_snapshots, true).unwrap();
        let n_dof = data.nrows();

        group.bench_function(format!("{n_dof}x{n_snapshots}_k4"), |b| {
            b.iter(|| pod(black_box(&data), black_box(4)).unwrap())
        });
    }

    group.finish();
}

fn bench_dmd(c: &mut Criterion) {
    let mut group = c.benchmark_group("dmd");

    for &(nx, n_snapshots) in &[(8, 50), (16, 100), (32, 50)] {
        let data = generate_test_data(nx, nx, n_snapshots, true).unwrap();
        let n_dof = data.nrows();

        group.bench_function(format!("{n_dof}x{n_snapshots}_r2"), |b| {
            b.iter(|| dmd(black_box(&data), black_box(2)).unwrap())
        });
    }

    group.finish();
}

fn bench_reconstruct(c: &mut Criterion) {
    let data = generate_test_data(32, 32, 50, true).unwrap();
    let result = dmd(&data, 2).unwrap();
    let times: Vec<f64> = (0..200).map(|t| t as f64 * 0.25).collect();

    c.bench_function("dmd_reconstruct_2048x200", |b| {
        b.iter(|| result.reconstruct(black_box(&times)))
    });
}

criterion_group!(benches, bench_pod, bench_dmd, bench_reconstruct);
criterion_main!(benches);
