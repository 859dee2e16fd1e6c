
/// Instantiates each generic test against a reference factory and a factory
/// under test. Every vector the reference side produces is the expected value.
macro_rules! cross_backend_test_suite {
    (
        mod $modname:ident,
        factory_ref = $factory_ref:expr,
        factory_test = $factory_test:expr,
        tests = {
            $( $(#[$attr:meta])* $test_name:ident => $impl:path ),+ $(,)?
        }
    ) => {
        mod $modname {
            use once_cell::sync::Lazy;

            #[allow(unused_imports)]
            use crate::{VectorFactory, implementation::sim::SimDevice};

            static FACTORY_REF: Lazy<VectorFactory> = Lazy::new(|| $factory_ref);
            static FACTORY_TEST: Lazy<VectorFactory> = Lazy::new(|| $factory_test);

            $(
                $(#[$attr])*
                #[test]
                fn $test_name() {
                    ($impl)(&*FACTORY_REF, &*FACTORY_TEST);
                }
            )+
        }
    };
}

cross_backend_test_suite! {
    mod host_host,
    factory_ref = VectorFactory::host(),
    factory_test = VectorFactory::host(),
    tests = {
        test_duplicate_copy => super::generics::test_duplicate_copy,
        test_zero_norm2 => super::generics::test_zero_norm2,
        test_axpy_distributes => super::generics::test_axpy_distributes,
        test_add_matches => super::generics::test_add_matches,
        test_cplx_elementwise => super::generics::test_cplx_elementwise,
        test_real_elementwise => super::generics::test_real_elementwise,
        test_reductions => super::generics::test_reductions,
        test_paste => super::generics::test_paste,
        test_paste_freq => super::generics::test_paste_freq,
        test_pixels => super::generics::test_pixels,
        test_fft_round_trip => super::generics::test_fft_round_trip,
        test_fft2d_matches => super::generics::test_fft2d_matches,
        test_fourier_shift => super::generics::test_fourier_shift,
    }
}

cross_backend_test_suite! {
    mod host_sim,
    factory_ref = VectorFactory::host(),
    factory_test = VectorFactory::accelerated(SimDevice::open_default().unwrap()),
    tests = {
        test_duplicate_copy => super::generics::test_duplicate_copy,
        test_zero_norm2 => super::generics::test_zero_norm2,
        test_axpy_distributes => super::generics::test_axpy_distributes,
        test_add_matches => super::generics::test_add_matches,
        test_cplx_elementwise => super::generics::test_cplx_elementwise,
        test_real_elementwise => super::generics::test_real_elementwise,
        test_reductions => super::generics::test_reductions,
        test_paste => super::generics::test_paste,
        test_paste_freq => super::generics::test_paste_freq,
        test_pixels => super::generics::test_pixels,
        test_fft_round_trip => super::generics::test_fft_round_trip,
        test_fft2d_matches => super::generics::test_fft2d_matches,
        test_fourier_shift => super::generics::test_fourier_shift,
    }
}

cross_backend_test_suite! {
    mod sim_sim,
    factory_ref = VectorFactory::accelerated(SimDevice::open_default().unwrap()),
    factory_test = VectorFactory::accelerated(SimDevice::open_default().unwrap()),
    tests = {
        test_add_matches => super::generics::test_add_matches,
        test_paste_freq => super::generics::test_paste_freq,
        test_cross_device_rejected => super::generics::test_cross_device_rejected,
    }
}
