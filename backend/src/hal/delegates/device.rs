use num_complex::{Complex32, Complex64};
use tracing::debug;

use crate::{
    error::{Result, VecError},
    fft::PlanLease,
    hal::layouts::{CopyMode, Device, DeviceBuffer, DevicePlan, Elem, PlanShape, Reduction},
};

impl Device {
    fn check_owned(&self, buf: &DeviceBuffer) -> Result<()> {
        if buf.device() != self.id {
            return Err(VecError::consistency(format!(
                "buffer of device {} used on device {}",
                buf.device().as_u64(),
                self.id.as_u64()
            )));
        }
        Ok(())
    }

    fn check_pair(&self, a: &DeviceBuffer, b: &DeviceBuffer, b_words: usize) -> Result<()> {
        self.check_owned(a)?;
        self.check_owned(b)?;
        if b.len() != b_words {
            return Err(VecError::consistency(format!(
                "kernel operand holds {} words, expected {}",
                b.len(),
                b_words
            )));
        }
        Ok(())
    }

    /// Allocates `len` zeroed words of device memory.
    pub fn alloc(&self, len: usize) -> Result<DeviceBuffer> {
        let ptr = self.accel.alloc_impl(len)?;
        let buf: DeviceBuffer = DeviceBuffer {
            ptr,
            len,
            device: self.id,
            accel: self.accel.clone(),
        };
        unsafe { self.accel.zero_impl(buf.ptr, len)? };
        Ok(buf)
    }

    pub fn upload(&self, dst: &DeviceBuffer, src: &[f32]) -> Result<()> {
        self.check_owned(dst)?;
        if src.len() != dst.len() {
            return Err(VecError::SizeMismatch {
                expected: dst.len(),
                actual: src.len(),
            });
        }
        debug!(device = self.id.as_u64(), bytes = size_of_val(src), "host -> device");
        match self.config.copy_mode {
            CopyMode::Direct => unsafe { self.accel.upload_impl(dst.ptr, src)? },
            CopyMode::Staged => {
                let mut staging = self.staging.lock();
                let staged: &[f32] = staging.stage_f32(src)?;
                unsafe { self.accel.upload_impl(dst.ptr, staged)? }
            }
        }
        self.stats.upload();
        Ok(())
    }

    pub fn download(&self, src: &DeviceBuffer, dst: &mut [f32]) -> Result<()> {
        self.check_owned(src)?;
        if src.len() != dst.len() {
            return Err(VecError::SizeMismatch {
                expected: src.len(),
                actual: dst.len(),
            });
        }
        debug!(device = self.id.as_u64(), bytes = size_of_val(dst), "device -> host");
        match self.config.copy_mode {
            CopyMode::Direct => unsafe { self.accel.download_impl(src.ptr, dst)? },
            CopyMode::Staged => {
                let mut staging = self.staging.lock();
                let region: &mut [f32] = staging.region_f32(dst.len())?;
                unsafe { self.accel.download_impl(src.ptr, region)? };
                dst.copy_from_slice(region);
            }
        }
        self.stats.download();
        Ok(())
    }

    /// Converts 16-bit samples into the complex buffer `dst`, always through
    /// the staging buffer. Inputs longer than [`Device::max_pixels`] are
    /// rejected.
    pub fn upload_u16(&self, dst: &DeviceBuffer, px: &[u16]) -> Result<()> {
        self.check_owned(dst)?;
        if 2 * px.len() != dst.len() {
            return Err(VecError::SizeMismatch {
                expected: dst.len() / 2,
                actual: px.len(),
            });
        }
        if px.len() > self.max_pixels() {
            return Err(VecError::ResourceExhausted {
                resource: "staging buffer",
                requested: px.len() * 8,
                available: self.config.staging_bytes,
            });
        }
        let mut staging = self.staging.lock();
        let staged: &[u16] = staging.stage_u16(px)?;
        unsafe { self.accel.upload_u16_impl(dst.ptr, staged)? };
        self.stats.upload();
        Ok(())
    }

    /// Blocks until all work issued to this device has completed.
    pub fn sync(&self) -> Result<()> {
        self.accel.sync_impl()
    }

    pub fn zero(&self, dst: &DeviceBuffer) -> Result<()> {
        self.check_owned(dst)?;
        unsafe { self.accel.zero_impl(dst.ptr, dst.len())? };
        self.stats.kernel();
        Ok(())
    }

    pub fn copy(&self, dst: &DeviceBuffer, src: &DeviceBuffer) -> Result<()> {
        self.check_pair(dst, src, dst.len())?;
        unsafe { self.accel.copy_impl(dst.ptr, src.ptr, dst.len())? };
        self.stats.kernel();
        Ok(())
    }

    pub fn copy_real_to_cplx(&self, dst: &DeviceBuffer, src: &DeviceBuffer) -> Result<()> {
        self.check_pair(dst, src, dst.len() / 2)?;
        unsafe { self.accel.copy_real_to_cplx_impl(dst.ptr, src.ptr, src.len())? };
        self.stats.kernel();
        Ok(())
    }

    pub fn add(&self, dst: &DeviceBuffer, src: &DeviceBuffer) -> Result<()> {
        self.check_pair(dst, src, dst.len())?;
        unsafe { self.accel.add_impl(dst.ptr, src.ptr, dst.len())? };
        self.stats.kernel();
        Ok(())
    }

    pub fn axpy(&self, elem: Elem, dst: &DeviceBuffer, alpha: Complex32, x: &DeviceBuffer) -> Result<()> {
        self.check_pair(dst, x, dst.len())?;
        let n: usize = dst.len() / elem.floats();
        unsafe { self.accel.axpy_impl(elem, dst.ptr, x.ptr, n, alpha.re, alpha.im)? };
        self.stats.kernel();
        Ok(())
    }

    pub fn scal(&self, elem: Elem, dst: &DeviceBuffer, alpha: Complex32) -> Result<()> {
        self.check_owned(dst)?;
        let n: usize = dst.len() / elem.floats();
        unsafe { self.accel.scal_impl(elem, dst.ptr, n, alpha.re, alpha.im)? };
        self.stats.kernel();
        Ok(())
    }

    pub fn add_const(&self, elem: Elem, dst: &DeviceBuffer, c: Complex32) -> Result<()> {
        self.check_owned(dst)?;
        let n: usize = dst.len() / elem.floats();
        unsafe { self.accel.add_const_impl(elem, dst.ptr, n, c.re, c.im)? };
        self.stats.kernel();
        Ok(())
    }

    pub fn times(&self, elem: Elem, dst: &DeviceBuffer, a: &DeviceBuffer, conj: bool) -> Result<()> {
        self.check_pair(dst, a, dst.len())?;
        let n: usize = dst.len() / elem.floats();
        unsafe { self.accel.times_impl(elem, dst.ptr, a.ptr, n, conj)? };
        self.stats.kernel();
        Ok(())
    }

    pub fn times_real(&self, dst: &DeviceBuffer, a: &DeviceBuffer) -> Result<()> {
        self.check_pair(dst, a, dst.len() / 2)?;
        unsafe { self.accel.times_real_impl(dst.ptr, a.ptr, a.len())? };
        self.stats.kernel();
        Ok(())
    }

    pub fn add_sqr(&self, elem: Elem, dst: &DeviceBuffer, a: &DeviceBuffer) -> Result<()> {
        self.check_pair(dst, a, dst.len())?;
        let n: usize = dst.len() / elem.floats();
        unsafe { self.accel.add_sqr_impl(elem, dst.ptr, a.ptr, n)? };
        self.stats.kernel();
        Ok(())
    }

    pub fn reciproc(&self, elem: Elem, dst: &DeviceBuffer) -> Result<()> {
        self.check_owned(dst)?;
        let n: usize = dst.len() / elem.floats();
        unsafe { self.accel.reciproc_impl(elem, dst.ptr, n)? };
        self.stats.kernel();
        Ok(())
    }

    pub fn conj(&self, dst: &DeviceBuffer) -> Result<()> {
        self.check_owned(dst)?;
        unsafe { self.accel.conj_impl(dst.ptr, dst.len() / 2)? };
        self.stats.kernel();
        Ok(())
    }

    pub fn reduce(&self, elem: Elem, op: Reduction, a: &DeviceBuffer, b: Option<&DeviceBuffer>) -> Result<Complex64> {
        self.check_owned(a)?;
        if let Some(b) = b {
            self.check_pair(a, b, a.len())?;
        }
        let n: usize = a.len() / elem.floats();
        let res: Complex64 = unsafe { self.accel.reduce_impl(elem, op, a.ptr, b.map(|b| b.ptr), n)? };
        self.stats.kernel();
        Ok(res)
    }

    /// Bounds are validated by the caller.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn paste(
        &self,
        dst: &DeviceBuffer,
        dst_dims: (usize, usize),
        src: &DeviceBuffer,
        src_dims: (usize, usize),
        x: usize,
        y: usize,
        zero: bool,
    ) -> Result<()> {
        self.check_pair(dst, src, 2 * src_dims.0 * src_dims.1)?;
        unsafe {
            self.accel
                .paste_impl(dst.ptr, dst_dims.0, dst_dims.1, src.ptr, src_dims.0, src_dims.1, x, y, zero)?
        };
        self.stats.kernel();
        Ok(())
    }

    pub(crate) fn paste_freq(
        &self,
        dst: &DeviceBuffer,
        dst_dims: (usize, usize),
        src: &DeviceBuffer,
        src_dims: (usize, usize),
        x_offset: isize,
        y_offset: isize,
    ) -> Result<()> {
        self.check_pair(dst, src, 2 * src_dims.0 * src_dims.1)?;
        unsafe {
            self.accel.paste_freq_impl(
                dst.ptr, dst_dims.0, dst_dims.1, src.ptr, src_dims.0, src_dims.1, x_offset, y_offset,
            )?
        };
        self.stats.kernel();
        Ok(())
    }

    pub(crate) fn fourier_shift(&self, dst: &DeviceBuffer, n: usize, kx: f64, ky: f64) -> Result<()> {
        self.check_owned(dst)?;
        unsafe { self.accel.fourier_shift_impl(dst.ptr, n, kx, ky)? };
        self.stats.kernel();
        Ok(())
    }

    fn create_plan(&self, shape: PlanShape) -> Result<DevicePlan> {
        let handle = self.accel.create_plan_impl(shape)?;
        debug!(device = self.id.as_u64(), ?shape, "device plan created");
        Ok(DevicePlan {
            handle,
            shape,
            accel: self.accel.clone(),
        })
    }

    /// In-place unnormalized transform of `buf` with a plan leased from this
    /// device's pool.
    pub fn fft(&self, shape: PlanShape, buf: &DeviceBuffer, inverse: bool) -> Result<()> {
        self.check_owned(buf)?;
        if buf.len() != 2 * shape.len() {
            return Err(VecError::SizeMismatch {
                expected: 2 * shape.len(),
                actual: buf.len(),
            });
        }
        let plan: PlanLease<'_, DevicePlan> = self.plans.lease(shape, |s| self.create_plan(s))?;
        unsafe { self.accel.fft_impl(plan.handle(), buf.ptr, inverse)? };
        self.stats.transform();
        Ok(())
    }
}
