use num_complex::Complex64;

use crate::{
    error::Result,
    hal::layouts::{DevicePtr, Elem, PlanHandle, PlanShape, Reduction},
};

/// # THIS TRAIT IS AN OPEN EXTENSION POINT (unsafe)
/// * See [crate::hal::delegates] for the safe wrappers on [crate::hal::layouts::Device].
/// * See [crate::hal::oep] for safety contract.
///
/// Lengths are in `f32` words.
pub unsafe trait DeviceMemoryImpl: Send + Sync {
    fn alloc_impl(&self, len: usize) -> Result<DevicePtr>;

    /// Releases an allocation. Must not fail; an accelerator that is gone
    /// has nothing left to release.
    unsafe fn free_impl(&self, ptr: DevicePtr);

    unsafe fn upload_impl(&self, dst: DevicePtr, src: &[f32]) -> Result<()>;

    /// Writes `src[i] + 0i` into complex element `i` of `dst`.
    unsafe fn upload_u16_impl(&self, dst: DevicePtr, src: &[u16]) -> Result<()>;

    unsafe fn download_impl(&self, src: DevicePtr, dst: &mut [f32]) -> Result<()>;

    /// Blocks until every issued command has completed.
    fn sync_impl(&self) -> Result<()>;
}

/// # THIS TRAIT IS AN OPEN EXTENSION POINT (unsafe)
/// * Each method maps to one native kernel. See the `*_ref` kernels in
///   [crate::reference] for reference code.
/// * See [crate::hal::oep] for safety contract.
///
/// `n` counts elements of kind `elem`; complex scalars are passed as
/// separate `re`/`im` floats. Real kernels ignore `im`.
#[allow(clippy::too_many_arguments)]
pub unsafe trait DeviceKernelImpl: Send + Sync {
    /// Sets `len` words of `dst` to zero.
    unsafe fn zero_impl(&self, dst: DevicePtr, len: usize) -> Result<()>;

    /// Copies `len` words from `src` to `dst`.
    unsafe fn copy_impl(&self, dst: DevicePtr, src: DevicePtr, len: usize) -> Result<()>;

    /// See [crate::reference::cplx_from_real_ref].
    unsafe fn copy_real_to_cplx_impl(&self, dst: DevicePtr, src: DevicePtr, n: usize) -> Result<()>;

    /// See [crate::reference::vec_add_inplace_ref]. `len` is in words.
    unsafe fn add_impl(&self, dst: DevicePtr, src: DevicePtr, len: usize) -> Result<()>;

    /// `dst += (re + i im) * x`
    unsafe fn axpy_impl(&self, elem: Elem, dst: DevicePtr, x: DevicePtr, n: usize, re: f32, im: f32) -> Result<()>;

    unsafe fn scal_impl(&self, elem: Elem, dst: DevicePtr, n: usize, re: f32, im: f32) -> Result<()>;

    unsafe fn add_const_impl(&self, elem: Elem, dst: DevicePtr, n: usize, re: f32, im: f32) -> Result<()>;

    /// `dst *= a`, conjugating complex `a` if `conj`.
    unsafe fn times_impl(&self, elem: Elem, dst: DevicePtr, a: DevicePtr, n: usize, conj: bool) -> Result<()>;

    /// Complex `dst` times real `a`.
    unsafe fn times_real_impl(&self, dst: DevicePtr, a: DevicePtr, n: usize) -> Result<()>;

    /// `dst += a^2` for real data, `dst += |a|^2` for complex data.
    unsafe fn add_sqr_impl(&self, elem: Elem, dst: DevicePtr, a: DevicePtr, n: usize) -> Result<()>;

    unsafe fn reciproc_impl(&self, elem: Elem, dst: DevicePtr, n: usize) -> Result<()>;

    unsafe fn conj_impl(&self, dst: DevicePtr, n: usize) -> Result<()>;

    /// See [crate::reference::reduce_ref].
    unsafe fn reduce_impl(
        &self,
        elem: Elem,
        op: Reduction,
        a: DevicePtr,
        b: Option<DevicePtr>,
        n: usize,
    ) -> Result<Complex64>;

    /// See [crate::reference::paste_ref].
    unsafe fn paste_impl(
        &self,
        dst: DevicePtr,
        dst_w: usize,
        dst_h: usize,
        src: DevicePtr,
        src_w: usize,
        src_h: usize,
        x: usize,
        y: usize,
        zero: bool,
    ) -> Result<()>;

    /// See [crate::reference::paste_freq_ref].
    unsafe fn paste_freq_impl(
        &self,
        dst: DevicePtr,
        dst_w: usize,
        dst_h: usize,
        src: DevicePtr,
        src_w: usize,
        src_h: usize,
        x_offset: isize,
        y_offset: isize,
    ) -> Result<()>;

    /// See [crate::reference::fourier_shift_ref].
    unsafe fn fourier_shift_impl(&self, dst: DevicePtr, n: usize, kx: f64, ky: f64) -> Result<()>;
}

/// # THIS TRAIT IS AN OPEN EXTENSION POINT (unsafe)
/// * See [crate::reference::ReferencePlan] for reference code.
/// * See [crate::hal::oep] for safety contract.
pub unsafe trait DeviceTransformImpl: Send + Sync {
    fn create_plan_impl(&self, shape: PlanShape) -> Result<PlanHandle>;

    unsafe fn destroy_plan_impl(&self, plan: PlanHandle);

    /// In-place transform of `buf`. The inverse is unnormalized.
    unsafe fn fft_impl(&self, plan: PlanHandle, buf: DevicePtr, inverse: bool) -> Result<()>;
}

/// A complete accelerator backend.
pub trait Accelerator: DeviceMemoryImpl + DeviceKernelImpl + DeviceTransformImpl {
    fn name(&self) -> &str;
}
