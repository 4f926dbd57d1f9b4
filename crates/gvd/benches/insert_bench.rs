//! Criterion benchmarks for incremental construction.
//! Focus sizes: n in {10, 100, 1000} point sites; polygons with {16, 64} vertices.
//! Results: by default under target/criterion.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use gvd::{Point, VoronoiDiagram};
use nalgebra::vector;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_points(n: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| vector![rng.gen_range(-0.7..0.7), rng.gen_range(-0.7..0.7)]).collect()
}

/// Star-shaped polygon: sorted angles, radius in [0.3, 0.7].
fn random_polygon(n: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut angles: Vec<f64> = (0..n).map(|_| rng.gen::<f64>() * std::f64::consts::TAU).collect();
    angles.sort_by(f64::total_cmp);
    angles
        .into_iter()
        .map(|a| {
            let r = rng.gen_range(0.3..0.7);
            vector![r * a.cos(), r * a.sin()]
        })
        .collect()
}

fn bench_points(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_point_sites");
    for &n in &[10usize, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter_batched(
                || random_points(n, 11),
                |pts| {
                    let mut vd = VoronoiDiagram::new();
                    for p in pts {
                        let _ = vd.insert_point_site(p);
                    }
                    vd
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_polygon(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_polygon");
    for &n in &[16usize, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter_batched(
                || random_polygon(n, 12),
                |pts| {
                    let mut vd = VoronoiDiagram::new();
                    let ids: Vec<_> = pts.iter().filter_map(|&p| vd.insert_point_site(p).ok()).collect();
                    for i in 0..ids.len() {
                        let _ = vd.insert_line_site(ids[i], ids[(i + 1) % ids.len()]);
                    }
                    vd
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_points, bench_polygon);
criterion_main!(benches);
