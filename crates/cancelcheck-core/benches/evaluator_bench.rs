//! Benchmarks for the per-operation hot path.

use std::sync::Arc;

use cancelcheck_core::prelude::*;
use cancelcheck_core::host::abort_process;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn active_backend(handler: Arc<CancellationStats>, threshold: u32) -> (Backend, BackendInterface) {
    let mut backend = Backend::pre_init(
        HostServices::builder()
            .panic(abort_process)
            .output(Box::new(std::io::sink()))
            .cancellation_handler(handler)
            .with_std_primitives()
            .build()
            .expect("complete services"),
    );
    backend.configure(&CheckCancellationConf {
        threshold_b32: threshold,
        threshold_b64: threshold,
    });
    let table = backend.init();
    (backend, table)
}

fn bench_dispatch(c: &mut Criterion) {
    let stats = Arc::new(CancellationStats::new());
    let (backend, table) = active_backend(stats, 30);
    let ctx = backend.context();
    let add_double = table.add_double.expect("add_double");
    let add_float = table.add_float.expect("add_float");
    let mul_double = table.mul_double.expect("mul_double");
    let fma_double = table.fma_double.expect("fma_double");

    let mut group = c.benchmark_group("dispatch");

    group.bench_function("add_double_no_event", |bench| {
        bench.iter(|| {
            let (a, b) = (black_box(1.5_f64), black_box(2.25_f64));
            let mut r = a + b;
            add_double(a, b, &mut r, ctx);
            r
        });
    });

    group.bench_function("add_double_event", |bench| {
        let (backend, table) = active_backend(Arc::new(CancellationStats::new()), 0);
        let add = table.add_double.expect("add_double");
        bench.iter(|| {
            let (a, b) = (black_box(1.000_000_1_f64), black_box(-1.0_f64));
            let mut r = a + b;
            add(a, b, &mut r, backend.context());
            r
        });
    });

    group.bench_function("add_float_no_event", |bench| {
        bench.iter(|| {
            let (a, b) = (black_box(1.5_f32), black_box(2.25_f32));
            let mut r = a + b;
            add_float(a, b, &mut r, ctx);
            r
        });
    });

    group.bench_function("mul_double", |bench| {
        bench.iter(|| {
            let mut r = 0.0;
            mul_double(black_box(1.5), black_box(2.25), &mut r, ctx);
            r
        });
    });

    group.bench_function("fma_double", |bench| {
        bench.iter(|| {
            let (a, b, c) = (black_box(1.5_f64), black_box(2.0_f64), black_box(-2.9_f64));
            let mut r = a.mul_add(b, c);
            fma_double(a, b, c, &mut r, ctx);
            r
        });
    });

    group.finish();
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
