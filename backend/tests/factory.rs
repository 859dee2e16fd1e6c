use sigvec_backend::{
    VecError, VectorFactory,
    factory::{basic, current, install},
    hal::layouts::BackendTag,
    implementation::sim::SimDevice,
};

// Runs as its own test binary: the current factory is process-wide.
#[test]
fn install_once_then_current() {
    assert_eq!(current().backend_tag(), BackendTag::Host);
    assert!(std::ptr::eq(current(), basic()));

    let device = SimDevice::open_default().unwrap();
    let id = device.id();
    install(VectorFactory::accelerated(device)).unwrap();
    assert_eq!(current().backend_tag(), BackendTag::Device(id));

    let again: VecError = install(VectorFactory::host()).unwrap_err();
    assert!(again.is_internal());
    assert_eq!(current().backend_tag(), BackendTag::Device(id));
    assert_eq!(basic().backend_tag(), BackendTag::Host);

    let v = current().create_real(4).unwrap();
    assert_eq!(current().create_array_cplx(3, 4).unwrap().len(), 3);
    current().sync_concurrent().unwrap();
    assert_eq!(v.data().unwrap().to_vec(), vec![0.0; 4]);
}
