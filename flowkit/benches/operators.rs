// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flowkit::{Emit, Flow};
use std::hint::black_box;
use tokio::runtime::Builder;

fn ints(n: i32) -> Flow<i32> {
    Flow::new(move |_scope, emit: Emit<i32>| {
        Box::pin(async move {
            for v in 0..n {
                emit.emit(v).await?;
            }
            Ok(())
        })
    })
}

async fn drain<T: Send + 'static>(flow: Flow<T>) {
    let emit = Emit::new(|v: T| {
        black_box(v);
        async move { Ok(()) }
    });
    flow.run(emit).await.unwrap();
}

fn bench_map_filter(c: &mut Criterion) {
    let rt = Builder::new_multi_thread().enable_all().build().unwrap();
    let mut group = c.benchmark_group("map_filter");
    let n = 10_000;
    group.throughput(Throughput::Elements(n as u64));
    group.bench_function("map_then_filter", |b| {
        b.iter(|| rt.block_on(drain(ints(n).map(|v| v * 2).filter(|v| v % 3 == 0))));
    });
    group.finish();
}

fn bench_map_par(c: &mut Criterion) {
    let rt = Builder::new_multi_thread().enable_all().build().unwrap();
    let mut group = c.benchmark_group("map_par_parallelism");
    let n = 2_000;
    group.throughput(Throughput::Elements(n as u64));
    for parallelism in [1usize, 4, 16] {
        group.bench_with_input(
            BenchmarkId::from_parameter(parallelism),
            &parallelism,
            |b, &parallelism| {
                b.iter(|| {
                    rt.block_on(drain(
                        ints(n)
                            .map_par(parallelism, |v| async move { Ok(v) })
                            .unwrap(),
                    ))
                });
            },
        );
    }
    group.finish();
}

fn bench_grouped(c: &mut Criterion) {
    let rt = Builder::new_multi_thread().enable_all().build().unwrap();
    let mut group = c.benchmark_group("grouped");
    let n = 10_000;
    group.throughput(Throughput::Elements(n as u64));
    group.bench_function("grouped_64", |b| {
        b.iter(|| rt.block_on(drain(ints(n).grouped(64).unwrap())));
    });
    group.finish();
}

criterion_group!(benches, bench_map_filter, bench_map_par, bench_grouped);
criterion_main!(benches);
