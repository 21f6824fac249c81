use criterion::*;
use stencil19::{CoefficientStore, Filter, GridShape};

fn laplacian_like(shape: GridShape) -> CoefficientStore {
    let mut s000 = shape.zeros();
    s000.fill(19.0);
    let off = std::array::from_fn(|_| {
        let mut a = shape.zeros();
        a.fill(-1.0);
        a
    });
    CoefficientStore::new(shape, s000, off, 0.0).unwrap()
}

fn apply_small(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply");
    for &n in &[8, 16, 32] {
        group.bench_with_input(BenchmarkId::new("apply", n), &n, |b, &n| {
            let shape = GridShape::new(n, n, n);
            let filter = Filter::new(laplacian_like(shape), false);
            let x = shape.zeros();
            let mut y = shape.zeros();
            b.iter(|| {
                filter.apply(&x, &mut y).unwrap();
            })
        });
    }
}

fn factorize_small(c: &mut Criterion) {
    let mut group = c.benchmark_group("factorize");
    for &n in &[8, 16, 32] {
        group.bench_with_input(BenchmarkId::new("ensure_factors", n), &n, |b, &n| {
            let shape = GridShape::new(n, n, n);
            b.iter_batched(
                || Filter::new(laplacian_like(shape), false),
                |filter| {
                    filter.ensure_factors().unwrap();
                },
                BatchSize::SmallInput,
            )
        });
    }
}

fn apply_approximate_inverse_small(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_approximate_inverse");
    for &n in &[8, 16, 32] {
        group.bench_with_input(BenchmarkId::new("apply_approximate_inverse", n), &n, |b, &n| {
            let shape = GridShape::new(n, n, n);
            let filter = Filter::new(laplacian_like(shape), false);
            filter.ensure_factors().unwrap();
            let bvec = shape.zeros();
            let mut x = shape.zeros();
            b.iter(|| {
                filter.apply_approximate_inverse(&bvec, &mut x).unwrap();
            })
        });
    }
}

criterion_group!(stencil, apply_small, factorize_small, apply_approximate_inverse_small);
criterion_main!(stencil);
