use std::{
    cell::Ref,
    fmt,
    ops::{Deref, DerefMut},
    sync::Arc,
};

use num_complex::Complex32;

use crate::{
    error::{Result, VecError},
    hal::{
        api::{Coherent, FourierTransform, VectorInfos},
        layouts::{BackendTag, CoherenceState, Device, DeviceBuffer, PlanShape},
    },
    reference::{cplx_from_u16_ref, fourier_shift_ref, paste_freq_ref, paste_ref, project_ref, slice_ref},
    vector::{CplxVec, CplxVec3d, Route, check_coord, checked_words},
};

/// Complex image of `width x height` elements; `(x, y)` lives at
/// `x + y * width`.
///
/// Dereferences to [`CplxVec`] for the element-wise algebra.
pub struct CplxVec2d {
    pub(crate) inner: CplxVec,
    pub(crate) width: usize,
    pub(crate) height: usize,
}

impl CplxVec2d {
    pub(crate) fn alloc(device: Option<&Arc<Device>>, width: usize, height: usize) -> Result<Self> {
        Ok(Self {
            inner: CplxVec::alloc(device, checked_words(&[width, height])?)?,
            width,
            height,
        })
    }

    pub fn duplicate(&self) -> Result<Self> {
        Ok(Self {
            inner: self.inner.duplicate()?,
            width: self.width,
            height: self.height,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    fn check_xy(&self, x: usize, y: usize) -> Result<usize> {
        check_coord("column", x, self.width)?;
        check_coord("row", y, self.height)?;
        Ok(x + y * self.width)
    }

    pub fn get_xy(&self, x: usize, y: usize) -> Result<Complex32> {
        let i: usize = self.check_xy(x, y)?;
        self.inner.get(i)
    }

    pub fn set_xy(&mut self, x: usize, y: usize, z: Complex32) -> Result<()> {
        let i: usize = self.check_xy(x, y)?;
        self.inner.set(i, z)
    }

    /// Copies `src` into this image at `(x, y)`, zeroing everything else
    /// first if `zero`.
    pub fn paste(&mut self, src: &CplxVec2d, x: usize, y: usize, zero: bool) -> Result<()> {
        if x + src.width > self.width {
            return Err(VecError::OutOfBounds {
                what: "paste column",
                index: x + src.width,
                limit: self.width,
            });
        }
        if y + src.height > self.height {
            return Err(VecError::OutOfBounds {
                what: "paste row",
                index: y + src.height,
                limit: self.height,
            });
        }
        let (dw, dh, sw, sh) = (self.width, self.height, src.width, src.height);
        let kernel = |d: &Device, dst: &DeviceBuffer, s: &DeviceBuffer| d.paste(dst, (dw, dh), s, (sw, sh), x, y, zero);
        let host = |res: &mut [f32], s: &[f32]| paste_ref(res, dw, dh, s, sw, sh, x, y, zero);
        if zero {
            self.inner.buf.overwrite(&src.inner.buf, kernel, host)
        } else {
            self.inner.buf.binary(&src.inner.buf, kernel, host)
        }
    }

    /// Remaps the centered-DC image `src` into FFT-native ordering, shifted
    /// by the offsets. Bins not covered by `src` are zero.
    pub fn paste_freq(&mut self, src: &CplxVec2d, x_offset: isize, y_offset: isize) -> Result<()> {
        let (dw, dh, sw, sh) = (self.width, self.height, src.width, src.height);
        self.inner.buf.overwrite(
            &src.inner.buf,
            |d, dst, s| d.paste_freq(dst, (dw, dh), s, (sw, sh), x_offset, y_offset),
            |res, s| paste_freq_ref(res, dw, dh, s, sw, sh, x_offset, y_offset),
        )
    }

    /// Loads raw 16-bit samples as `pixel + 0i`. On a device the samples go
    /// through the staging buffer, and inputs larger than it can hold are
    /// rejected.
    pub fn set_from_16bit_pixels(&mut self, px: &[u16]) -> Result<()> {
        if px.len() != self.inner.n {
            return Err(VecError::SizeMismatch {
                expected: self.inner.n,
                actual: px.len(),
            });
        }
        let buf = &mut self.inner.buf;
        match buf.route(&[])? {
            Route::Device => {
                let store = buf.store()?;
                store.device.upload_u16(&store.mem, px)?;
                buf.device_overwritten()
            }
            Route::Host => {
                cplx_from_u16_ref(buf.host_overwrite()?, px);
                Ok(())
            }
        }
    }

    pub fn fft2d(&mut self, inverse: bool) -> Result<()> {
        let shape: PlanShape = PlanShape::d2(self.width, self.height)?;
        self.inner.transform(shape, inverse)
    }

    /// Multiplies `(x, y)` by `exp(2 pi i (kx x + ky y) / n)`, shifting the
    /// spectrum by `(kx, ky)` bins. Square images only.
    pub fn fourier_shift(&mut self, kx: f64, ky: f64) -> Result<()> {
        if self.width != self.height {
            return Err(VecError::NotSquare {
                width: self.width,
                height: self.height,
            });
        }
        let n: usize = self.width;
        self.inner.buf.unary(
            |d, dst| d.fourier_shift(dst, n, kx, ky),
            |res| fourier_shift_ref(res, n, kx, ky),
        )
    }

    fn check_volume(&self, src: &CplxVec3d, op: &'static str) -> Result<()> {
        if self.inner.buf.device().is_some() {
            return Err(VecError::Unsupported(op));
        }
        if src.width != self.width || src.height != self.height {
            return Err(VecError::SizeMismatch {
                expected: self.inner.n,
                actual: src.width * src.height,
            });
        }
        self.inner.buf.route(&[&src.inner.buf])?;
        Ok(())
    }

    /// Copies plane `z` of `src`. Host-backed images only.
    pub fn slice(&mut self, src: &CplxVec3d, z: usize) -> Result<()> {
        self.check_volume(src, "slice into an accelerator-backed vector")?;
        check_coord("plane", z, src.depth)?;
        let data: Ref<'_, [f32]> = src.inner.buf.host()?;
        slice_ref(self.inner.buf.host_overwrite()?, &data, src.width, src.height, z);
        Ok(())
    }

    /// Sums planes `start..end` of `src`. Host-backed images only.
    pub fn project(&mut self, src: &CplxVec3d, start: usize, end: usize) -> Result<()> {
        self.check_volume(src, "projection into an accelerator-backed vector")?;
        if end > src.depth {
            return Err(VecError::OutOfBounds {
                what: "plane",
                index: end,
                limit: src.depth,
            });
        }
        if start > end {
            return Err(VecError::OutOfBounds {
                what: "projection start",
                index: start,
                limit: end,
            });
        }
        let data: Ref<'_, [f32]> = src.inner.buf.host()?;
        project_ref(self.inner.buf.host_overwrite()?, &data, src.width, src.height, start, end);
        Ok(())
    }

    /// Sums every plane of `src`.
    pub fn project_all(&mut self, src: &CplxVec3d) -> Result<()> {
        self.project(src, 0, src.depth)
    }
}

impl Deref for CplxVec2d {
    type Target = CplxVec;

    fn deref(&self) -> &CplxVec {
        &self.inner
    }
}

impl DerefMut for CplxVec2d {
    fn deref_mut(&mut self) -> &mut CplxVec {
        &mut self.inner
    }
}

impl FourierTransform for CplxVec2d {
    fn fft(&mut self, inverse: bool) -> Result<()> {
        self.fft2d(inverse)
    }
}

impl VectorInfos for CplxVec2d {
    fn vector_size(&self) -> usize {
        self.inner.n
    }

    fn backend_tag(&self) -> BackendTag {
        self.inner.buf.tag()
    }
}

impl Coherent for CplxVec2d {
    fn make_coherent(&self) -> Result<()> {
        self.inner.buf.make_coherent()
    }

    fn coherence_state(&self) -> Result<Option<CoherenceState>> {
        self.inner.buf.coherence_state()
    }
}

impl fmt::Debug for CplxVec2d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CplxVec2d")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("backend", &self.inner.buf.tag())
            .finish()
    }
}
