//! Portable slice kernels.
//!
//! Every accelerator primitive has a `*_ref` counterpart here operating on
//! host `f32` slices; complex data is interleaved `(re, im)`. They run the
//! mixed-backend fallback path and are also the kernels the emulated
//! accelerator executes, so both paths agree bit for bit.

mod cplx;
mod fft;
mod real;
mod spatial;

pub use cplx::*;
pub use fft::*;
pub use real::*;
pub use spatial::*;

use num_complex::Complex64;

use crate::hal::layouts::{Elem, Reduction};

/// Dispatches a scalar reduction. Real results are returned in `re`.
pub fn reduce_ref(elem: Elem, op: Reduction, a: &[f32], b: Option<&[f32]>) -> Complex64 {
    match (elem, op) {
        (Elem::Real, Reduction::Norm2) => Complex64::new(real_norm2_ref(a), 0.0),
        (Elem::Real, Reduction::Sum) => Complex64::new(real_sum_ref(a), 0.0),
        (Elem::Real, Reduction::Dot) => Complex64::new(real_dot_ref(a, b.unwrap_or(a)), 0.0),
        (Elem::Cplx, Reduction::Norm2) => Complex64::new(cplx_norm2_ref(a), 0.0),
        (Elem::Cplx, Reduction::Sum) => cplx_sum_ref(a),
        (Elem::Cplx, Reduction::Dot) => cplx_dot_ref(a, b.unwrap_or(a)),
    }
}
