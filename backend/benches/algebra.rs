use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use num_complex::Complex32;
use sigvec_backend::{CplxVec, CplxVec2d, VectorFactory, implementation::sim::SimDevice};
use sigvec_sampling::source::Source;

fn factories() -> Vec<(&'static str, VectorFactory)> {
    vec![
        ("host", VectorFactory::host()),
        ("sim", VectorFactory::accelerated(SimDevice::open_default().unwrap())),
    ]
}

fn filled(factory: &VectorFactory, n: usize, source: &mut Source) -> CplxVec {
    let mut v: CplxVec = factory.create_cplx(n).unwrap();
    source.fill_uniform_f32(v.data_mut().unwrap(), -1.0, 1.0);
    v
}

pub fn bench_axpy(c: &mut Criterion) {
    let mut group = c.benchmark_group("cplx_axpy");

    fn runner(factory: &VectorFactory, n: usize) -> impl FnMut() + use<> {
        let mut source: Source = Source::new([0u8; 32]);
        let mut y: CplxVec = filled(factory, n, &mut source);
        let x: CplxVec = filled(factory, n, &mut source);
        let factory: VectorFactory = factory.clone();
        move || {
            y.axpy_cplx(Complex32::new(0.5, 0.25), &x).unwrap();
            factory.sync_concurrent().unwrap();
            black_box(());
        }
    }

    for (name, factory) in factories().iter() {
        for log_n in [10, 12, 14, 16] {
            let id: BenchmarkId = BenchmarkId::new(*name, 1 << log_n);
            let mut runner = runner(factory, 1 << log_n);
            group.bench_with_input(id, &(), |b, _| b.iter(&mut runner));
        }
    }

    group.finish();
}

pub fn bench_dot(c: &mut Criterion) {
    let mut group = c.benchmark_group("cplx_dot");

    fn runner(factory: &VectorFactory, n: usize) -> impl FnMut() + use<> {
        let mut source: Source = Source::new([1u8; 32]);
        let a: CplxVec = filled(factory, n, &mut source);
        let b: CplxVec = filled(factory, n, &mut source);
        move || {
            black_box(a.dot(&b).unwrap());
        }
    }

    for (name, factory) in factories().iter() {
        for log_n in [10, 12, 14, 16] {
            let id: BenchmarkId = BenchmarkId::new(*name, 1 << log_n);
            let mut runner = runner(factory, 1 << log_n);
            group.bench_with_input(id, &(), |b, _| b.iter(&mut runner));
        }
    }

    group.finish();
}

pub fn bench_paste_freq(c: &mut Criterion) {
    let mut group = c.benchmark_group("paste_freq");

    fn runner(factory: &VectorFactory, n: usize) -> impl FnMut() + use<> {
        let mut source: Source = Source::new([2u8; 32]);
        let mut src: CplxVec2d = factory.create_cplx_2d(n, n).unwrap();
        source.fill_uniform_f32(src.data_mut().unwrap(), -1.0, 1.0);
        let mut dst: CplxVec2d = factory.create_cplx_2d(2 * n, 2 * n).unwrap();
        let factory: VectorFactory = factory.clone();
        move || {
            dst.paste_freq(&src, 0, 0).unwrap();
            factory.sync_concurrent().unwrap();
            black_box(());
        }
    }

    for (name, factory) in factories().iter() {
        for log_n in [6, 8, 10] {
            let id: BenchmarkId = BenchmarkId::new(*name, format!("{0}x{0}", 1 << log_n));
            let mut runner = runner(factory, 1 << log_n);
            group.bench_with_input(id, &(), |b, _| b.iter(&mut runner));
        }
    }

    group.finish();
}

criterion_group!(benches, bench_axpy, bench_dot, bench_paste_freq);

criterion_main!(benches);
