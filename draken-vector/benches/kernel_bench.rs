use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use draken_types::CompareOp;
use draken_vector::{Int64Vector, StringVector};
use rand::prelude::*;

fn bench_compare(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let values: Vec<i64> = (0..65_536).map(|_| rng.gen_range(-1_000..1_000)).collect();
    let vector = Int64Vector::from_values(values);

    c.bench_function("int64_compare_scalar_64k", |b| {
        b.iter(|| vector.compare_scalar(CompareOp::Gt, 0))
    });

    let other = vector.take(&(0..65_536).rev().map(|i| i as i32).collect::<Vec<_>>()).unwrap();
    c.bench_function("int64_compare_vector_64k", |b| {
        b.iter(|| vector.compare_vector(CompareOp::Eq, &other).unwrap())
    });
}

fn bench_take(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(11);
    let vector = Int64Vector::from_values((0..65_536).collect());
    let strings = StringVector::from_slices(
        (0..65_536)
            .map(|i| format!("value-{i}"))
            .collect::<Vec<_>>(),
    );
    let indices: Vec<i32> = (0..65_536).map(|_| rng.gen_range(0..65_536)).collect();

    c.bench_function("int64_take_64k", |b| {
        b.iter_batched(
            || indices.clone(),
            |idx| vector.take(&idx).unwrap(),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("string_take_64k", |b| {
        b.iter_batched(
            || indices.clone(),
            |idx| strings.take(&idx).unwrap(),
            BatchSize::SmallInput,
        )
    });
}

fn bench_hash(c: &mut Criterion) {
    let vector = Int64Vector::from_values((0..65_536).collect());
    let strings = StringVector::from_slices(
        (0..65_536)
            .map(|i| format!("value-{i}"))
            .collect::<Vec<_>>(),
    );

    c.bench_function("int64_hash_64k", |b| b.iter(|| vector.hash()));
    c.bench_function("string_hash_64k", |b| b.iter(|| strings.hash()));
}

criterion_group!(benches, bench_compare, bench_take, bench_hash);
criterion_main!(benches);
