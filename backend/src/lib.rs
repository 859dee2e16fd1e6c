//! # sigvec-backend
//!
//! A backend-polymorphic vector-algebra engine for scientific signal
//! processing: real and complex single-precision vectors (1D, 2D, 3D) that
//! live either in host memory or mirrored into the memory space of an
//! accelerator, plus a shared, shape-keyed pool of FFT execution plans.
//!
//! ## Core Concepts
//!
//! **Backend tag:** every vector is bound at construction to exactly one
//! backend, reported by [`hal::layouts::BackendTag`]. Operations whose
//! operands all live on the same [`hal::layouts::Device`] run as device
//! kernels; any other combination runs the portable [`mod@reference`] kernels on
//! synchronized host buffers. Mixing vectors of two different device
//! contexts is rejected with [`VecError::Consistency`].
//!
//! **Coherence:** device-backed vectors track which side holds the
//! authoritative data with two dirty flags ([`hal::layouts::Coherence`]).
//! Copies happen lazily, on the first access that needs the other side.
//!
//! **Plan pool:** FFT plans are expensive to build and cheap to reuse. They
//! are checked out of a [`fft::PlanPool`] keyed by [`hal::layouts::PlanShape`]
//! and returned after each transform.
//!
//! ## Architecture
//!
//! 1. **[`hal::api`]** -- traits shared by every vector kind.
//! 2. **[`hal::oep`]** -- unsafe extension-point traits an accelerator
//!    implements (memory, kernels, transforms).
//! 3. **[`hal::delegates`]** -- safe [`hal::layouts::Device`] methods that
//!    validate arguments and forward to the [`hal::oep`] traits.
//! 4. **[`mod@reference`]** -- portable slice kernels. They are the fallback path
//!    and the kernels the emulated accelerator executes.
//!
//! [`vector`] builds the user-facing vector types on top, [`factory`] hands
//! them out, and [`implementation::sim`] provides an emulated accelerator
//! with its own memory space and an asynchronous in-order command queue.

pub mod error;
pub mod factory;
pub mod fft;
pub mod hal;
pub mod implementation;
pub mod reference;
pub mod vector;

#[cfg(test)]
mod tests;

pub use error::{Result, VecError};
pub use factory::VectorFactory;
pub use num_complex::{Complex32, Complex64};
pub use vector::{CplxVec, CplxVec2d, CplxVec3d, Part, RealVec};

/// Allocates a zero-initialized host buffer of `len` floats.
///
/// Allocation failure is reported as [`VecError::ResourceExhausted`]
/// instead of aborting the process.
pub fn alloc_host(len: usize) -> Result<Vec<f32>> {
    let mut data: Vec<f32> = Vec::new();
    data.try_reserve_exact(len).map_err(|_| VecError::ResourceExhausted {
        resource: "host vector",
        requested: len.saturating_mul(size_of::<f32>()),
        available: 0,
    })?;
    data.resize(len, 0.0);
    Ok(data)
}
