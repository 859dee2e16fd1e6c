use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
};

use num_complex::Complex32;
use sigvec_backend::{
    CplxVec, CplxVec2d, CplxVec3d, RealVec, VecError, VectorFactory,
    fft::{PlanPool, ReferenceProvider, RustFftProvider, ShapedPlan, TransformPlan, TransformProvider},
    hal::{
        api::{Coherent, FourierTransform},
        layouts::{CoherenceState, CopyMode, Device, DeviceConfig, DeviceStatsSnapshot, PlanShape},
    },
    implementation::sim::SimDevice,
};
use sigvec_sampling::source::Source;

fn sub_test<F: FnOnce()>(name: &str, f: F) {
    println!("Running {}", name);
    f();
}

fn fresh_device() -> Arc<Device> {
    SimDevice::open_default().unwrap()
}

fn uniform(source: &mut Source, len: usize) -> Vec<f32> {
    let mut data: Vec<f32> = vec![0.0; len];
    source.fill_uniform_f32(&mut data, -1.0, 1.0);
    data
}

#[test]
fn zero_sized_vectors_are_rejected() {
    for factory in [VectorFactory::host(), VectorFactory::accelerated(fresh_device())] {
        assert_eq!(factory.create_real(0).unwrap_err(), VecError::InvalidSize(0));
        assert_eq!(factory.create_cplx(0).unwrap_err(), VecError::InvalidSize(0));
        assert_eq!(factory.create_cplx_2d(0, 4).unwrap_err(), VecError::InvalidSize(0));
        assert_eq!(factory.create_cplx_3d(4, 4, 0).unwrap_err(), VecError::InvalidSize(0));
    }
}

#[test]
fn oversized_vectors_are_resource_errors() {
    for factory in [VectorFactory::host(), VectorFactory::accelerated(fresh_device())] {
        sub_test(&format!("{:?}", factory.backend_tag()), || {
            assert!(matches!(factory.create_real(usize::MAX / 2), Err(VecError::ResourceExhausted { .. })));
            assert!(matches!(
                factory.create_cplx(usize::MAX / 2 + 1),
                Err(VecError::ResourceExhausted { .. })
            ));
            assert!(matches!(factory.create_cplx_2d(3, 1 << 63), Err(VecError::ResourceExhausted { .. })));
            assert!(matches!(
                factory.create_cplx_3d(1 << 32, 1 << 32, 2),
                Err(VecError::ResourceExhausted { .. })
            ));
            assert!(factory.create_cplx_2d(4, 4).is_ok());
        });
    }
}

#[test]
fn repeated_reads_do_not_transfer() {
    let device: Arc<Device> = fresh_device();
    let factory: VectorFactory = VectorFactory::accelerated(device.clone());
    let mut x: CplxVec = factory.create_cplx(64).unwrap();
    x.add_const(Complex32::new(1.0, -1.0)).unwrap();
    assert_eq!(x.coherence_state().unwrap(), Some(CoherenceState::DeviceAuthoritative));

    let before: DeviceStatsSnapshot = device.stats();
    assert_eq!(x.data().unwrap()[0], 1.0);
    assert_eq!(x.data().unwrap()[1], -1.0);
    assert_eq!(x.get(63).unwrap(), Complex32::new(1.0, -1.0));
    let after: DeviceStatsSnapshot = device.stats();

    assert_eq!(after.downloads - before.downloads, 1);
    assert_eq!(after.uploads, before.uploads);
    assert_eq!(x.coherence_state().unwrap(), Some(CoherenceState::Synced));
}

#[test]
fn host_writes_upload_once() {
    let device: Arc<Device> = fresh_device();
    let factory: VectorFactory = VectorFactory::accelerated(device.clone());
    let mut x: RealVec = factory.create_real(16).unwrap();
    let y: RealVec = factory.create_real(16).unwrap();

    x.data_mut().unwrap().fill(2.0);
    x.set(3, 5.0).unwrap();
    assert_eq!(x.coherence_state().unwrap(), Some(CoherenceState::HostAuthoritative));

    let before: DeviceStatsSnapshot = device.stats();
    x.make_coherent().unwrap();
    x.make_coherent().unwrap();
    assert_eq!(device.stats().uploads - before.uploads, 1);
    assert_eq!(x.coherence_state().unwrap(), Some(CoherenceState::Synced));

    assert_eq!(x.dot(&y).unwrap(), 0.0);
    assert_eq!(x.sum_elements().unwrap(), 35.0);
    assert_eq!(device.stats().uploads - before.uploads, 1);
}

#[test]
fn operands_from_two_devices_are_rejected() {
    let a: VectorFactory = VectorFactory::accelerated(fresh_device());
    let b: VectorFactory = VectorFactory::accelerated(fresh_device());

    let mut x: RealVec = a.create_real(8).unwrap();
    let y: RealVec = b.create_real(8).unwrap();
    let z: RealVec = VectorFactory::host().create_real(8).unwrap();

    assert!(matches!(x.axpy(1.0, &y), Err(VecError::Consistency(_))));
    assert!(matches!(x.add(&[&z, &y]), Err(VecError::Consistency(_))));

    let mut h: RealVec = VectorFactory::host().create_real(8).unwrap();
    let w: RealVec = a.create_real(8).unwrap();
    assert!(matches!(h.add(&[&w, &y]), Err(VecError::Consistency(_))));
}

#[test]
fn mixed_backend_add_matches_same_backend() {
    let mut source: Source = Source::new([0u8; 32]);
    let a: Vec<f32> = uniform(&mut source, 2 * 16 * 16);
    let b: Vec<f32> = uniform(&mut source, 2 * 16 * 16);

    let host: VectorFactory = VectorFactory::host();
    let sim: VectorFactory = VectorFactory::accelerated(fresh_device());

    let image = |factory: &VectorFactory, data: &[f32]| -> CplxVec2d {
        let mut v: CplxVec2d = factory.create_cplx_2d(16, 16).unwrap();
        v.data_mut().unwrap().copy_from_slice(data);
        v
    };

    let mut want: CplxVec2d = image(&host, &a);
    let other: CplxVec2d = image(&host, &b);
    want.add(&[&*other]).unwrap();

    sub_test("device destination, host operand", || {
        let mut have: CplxVec2d = image(&sim, &a);
        let other: CplxVec2d = image(&host, &b);
        have.add(&[&*other]).unwrap();
        assert_eq!(&*have.data().unwrap(), &*want.data().unwrap());
    });

    sub_test("host destination, device operand", || {
        let mut have: CplxVec2d = image(&host, &a);
        let other: CplxVec2d = image(&sim, &b);
        have.add(&[&*other]).unwrap();
        assert_eq!(&*have.data().unwrap(), &*want.data().unwrap());
    });
}

#[test]
fn paste_freq_is_identical_on_device_and_host() {
    let mut source: Source = Source::new([1u8; 32]);
    let data: Vec<f32> = uniform(&mut source, 2 * 6 * 4);

    let run = |factory: &VectorFactory| -> Vec<f32> {
        let mut src: CplxVec2d = factory.create_cplx_2d(6, 4).unwrap();
        src.data_mut().unwrap().copy_from_slice(&data);
        let mut dst: CplxVec2d = factory.create_cplx_2d(12, 8).unwrap();
        dst.paste_freq(&src, 1, -1).unwrap();
        dst.data().unwrap().to_vec()
    };

    let have: Vec<f32> = run(&VectorFactory::accelerated(fresh_device()));
    let want: Vec<f32> = run(&VectorFactory::host());
    assert_eq!(have, want);
    assert_eq!(have.iter().filter(|v| **v != 0.0).count(), data.iter().filter(|v| **v != 0.0).count());
}

#[test]
fn pixels_beyond_staging_capacity_are_rejected() {
    let device: Arc<Device> = SimDevice::open(DeviceConfig {
        staging_bytes: 64,
        copy_mode: CopyMode::Staged,
        ..DeviceConfig::default()
    })
    .unwrap();
    let factory: VectorFactory = VectorFactory::accelerated(device.clone());
    assert_eq!(device.max_pixels(), 8);

    let mut fits: CplxVec2d = factory.create_cplx_2d(4, 2).unwrap();
    fits.set_from_16bit_pixels(&[7; 8]).unwrap();
    assert_eq!(fits.get_xy(3, 1).unwrap(), Complex32::new(7.0, 0.0));

    let mut too_large: CplxVec2d = factory.create_cplx_2d(4, 4).unwrap();
    assert_eq!(
        too_large.set_from_16bit_pixels(&[7; 16]).unwrap_err(),
        VecError::ResourceExhausted {
            resource: "staging buffer",
            requested: 128,
            available: 64,
        }
    );

    let mut host: CplxVec2d = VectorFactory::host().create_cplx_2d(4, 4).unwrap();
    host.set_from_16bit_pixels(&[7; 16]).unwrap();
}

#[test]
fn volume_reductions_into_device_images_are_unsupported() {
    let mut vol: CplxVec3d = VectorFactory::host().create_cplx_3d(4, 4, 3).unwrap();
    vol.set_xyz(1, 2, 0, Complex32::new(1.0, 0.0)).unwrap();
    let mut img: CplxVec2d = VectorFactory::accelerated(fresh_device()).create_cplx_2d(4, 4).unwrap();

    assert!(matches!(img.slice(&vol, 0), Err(VecError::Unsupported(_))));
    assert!(matches!(img.project(&vol, 0, 2), Err(VecError::Unsupported(_))));
    assert!(matches!(img.project_all(&vol), Err(VecError::Unsupported(_))));

    let mut wrong_shape: CplxVec2d = VectorFactory::accelerated(fresh_device()).create_cplx_2d(2, 8).unwrap();
    assert!(matches!(wrong_shape.project_all(&vol), Err(VecError::Unsupported(_))));
    assert!(img.data().unwrap().iter().all(|v| *v == 0.0));
}

#[test]
fn fft_round_trip_on_every_provider() {
    let providers: Vec<Box<dyn TransformProvider>> = vec![Box::new(ReferenceProvider), Box::new(RustFftProvider)];
    let mut source: Source = Source::new([2u8; 32]);

    for provider in providers.iter() {
        if provider.probe().is_err() {
            continue;
        }
        for n in [8usize, 64, 256] {
            sub_test(&format!("{} n={}", provider.name(), n), || {
                let data: Vec<Complex32> = uniform(&mut source, 2 * n)
                    .chunks_exact(2)
                    .map(|c| Complex32::new(c[0], c[1]))
                    .collect();
                let mut plan: Box<dyn TransformPlan> = provider.create_plan(PlanShape::d1(n).unwrap()).unwrap();
                let mut work: Vec<Complex32> = data.clone();
                plan.transform(&mut work, false).unwrap();
                plan.transform(&mut work, true).unwrap();
                for (have, want) in work.iter().zip(data.iter()) {
                    assert!((*have / n as f32 - *want).norm() < 1e-5);
                }
            });
        }
    }

    let device: Arc<Device> = fresh_device();
    let factory: VectorFactory = VectorFactory::accelerated(device.clone());
    for n in [8usize, 64, 256] {
        let data: Vec<f32> = uniform(&mut source, 2 * n);
        let mut x: CplxVec = factory.create_cplx(n).unwrap();
        x.data_mut().unwrap().copy_from_slice(&data);
        x.fft(false).unwrap();
        x.fft(true).unwrap();
        x.scal(1.0 / n as f32).unwrap();
        for (have, want) in x.data().unwrap().iter().zip(data.iter()) {
            assert!((have - want).abs() < 1e-5);
        }
    }
    assert_eq!(device.stats().transforms, 6);
}

struct TrackedPlan {
    shape: PlanShape,
    busy: Arc<AtomicBool>,
}

impl ShapedPlan for TrackedPlan {
    fn plan_shape(&self) -> PlanShape {
        self.shape
    }
}

#[test]
fn pool_never_hands_out_a_plan_twice() {
    let pool: PlanPool<TrackedPlan> = PlanPool::new();
    let shape: PlanShape = PlanShape::d2(8, 8).unwrap();
    let overlaps: AtomicUsize = AtomicUsize::new(0);

    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..200 {
                    let plan = pool
                        .lease(shape, |s| {
                            Ok(TrackedPlan {
                                shape: s,
                                busy: Arc::new(AtomicBool::new(false)),
                            })
                        })
                        .unwrap();
                    if plan.busy.swap(true, Ordering::SeqCst) {
                        overlaps.fetch_add(1, Ordering::SeqCst);
                    }
                    thread::yield_now();
                    plan.busy.store(false, Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    assert!(pool.built(shape) >= 1 && pool.built(shape) <= 8);
    assert_eq!(pool.idle(shape), pool.built(shape));
}
