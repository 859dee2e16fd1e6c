use std::{cell::Ref, fmt, sync::Arc};

use num_complex::{Complex32, Complex64};

use crate::{
    error::{Result, VecError, check_sizes},
    fft::host_transform,
    hal::{
        api::{Coherent, FourierTransform, VectorInfos},
        layouts::{BackendTag, CoherenceState, Device, Elem, Part, PlanShape, Reduction},
    },
    reference::{
        as_cplx, as_cplx_mut, cplx_add_const_ref, cplx_add_sqr_ref, cplx_axpy_ref, cplx_conj_ref, cplx_from_real_ref,
        cplx_reciproc_ref, cplx_scal_ref, cplx_times_real_ref, cplx_times_ref, reduce_ref, vec_add_inplace_ref,
        vec_copy_ref,
    },
    vector::{Buffer, RealVec, Route, check_index, checked_words, format_first_10},
};

/// Complex single-precision vector, stored as interleaved `(re, im)` pairs.
pub struct CplxVec {
    pub(crate) n: usize,
    pub(crate) buf: Buffer,
}

impl CplxVec {
    pub(crate) fn alloc(device: Option<&Arc<Device>>, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(VecError::InvalidSize(n));
        }
        Ok(Self {
            n,
            buf: Buffer::alloc(device, checked_words(&[n, 2])?)?,
        })
    }

    pub fn duplicate(&self) -> Result<Self> {
        let mut dup: Self = Self::alloc(self.buf.device(), self.n)?;
        dup.copy(self)?;
        Ok(dup)
    }

    fn duplicate_part(&self, part: Part) -> Result<RealVec> {
        let mut dup: RealVec = RealVec::alloc(self.buf.device(), self.n)?;
        dup.copy_part(self, part)?;
        Ok(dup)
    }

    pub fn duplicate_real(&self) -> Result<RealVec> {
        self.duplicate_part(Part::Real)
    }

    pub fn duplicate_imag(&self) -> Result<RealVec> {
        self.duplicate_part(Part::Imag)
    }

    pub fn duplicate_magnitude(&self) -> Result<RealVec> {
        self.duplicate_part(Part::Magnitude)
    }

    pub fn duplicate_phase(&self) -> Result<RealVec> {
        self.duplicate_part(Part::Phase)
    }

    /// Interleaved host data of `2 * n` words.
    pub fn data(&self) -> Result<Ref<'_, [f32]>> {
        self.buf.host()
    }

    pub fn data_mut(&mut self) -> Result<&mut [f32]> {
        self.buf.host_mut()
    }

    pub fn get(&self, i: usize) -> Result<Complex32> {
        check_index(i, self.n)?;
        Ok(as_cplx(&self.buf.host()?)[i])
    }

    pub fn set(&mut self, i: usize, z: Complex32) -> Result<()> {
        check_index(i, self.n)?;
        as_cplx_mut(self.buf.host_mut()?)[i] = z;
        Ok(())
    }

    pub fn copy(&mut self, x: &CplxVec) -> Result<()> {
        check_sizes(self.n, [x.n])?;
        self.buf.overwrite(&x.buf, |d, dst, src| d.copy(dst, src), vec_copy_ref)
    }

    /// `self = x + 0i`
    pub fn copy_real(&mut self, x: &RealVec) -> Result<()> {
        check_sizes(self.n, [x.n])?;
        self.buf.overwrite(&x.buf, |d, dst, src| d.copy_real_to_cplx(dst, src), cplx_from_real_ref)
    }

    pub fn zero(&mut self) -> Result<()> {
        self.buf.zero()
    }

    pub fn add(&mut self, xs: &[&CplxVec]) -> Result<()> {
        check_sizes(self.n, xs.iter().map(|x| x.n))?;
        self.buf.route(&xs.iter().map(|x| &x.buf).collect::<Vec<_>>())?;
        for x in xs {
            self.buf.binary(&x.buf, |d, dst, src| d.add(dst, src), vec_add_inplace_ref)?;
        }
        Ok(())
    }

    /// `self += a * x`
    pub fn axpy(&mut self, a: f32, x: &CplxVec) -> Result<()> {
        self.axpy_cplx(Complex32::new(a, 0.0), x)
    }

    pub fn axpy_cplx(&mut self, a: Complex32, x: &CplxVec) -> Result<()> {
        check_sizes(self.n, [x.n])?;
        self.buf.binary(
            &x.buf,
            |d, dst, src| d.axpy(Elem::Cplx, dst, a, src),
            |res, src| cplx_axpy_ref(res, a, src),
        )
    }

    pub fn reciproc(&mut self) -> Result<()> {
        self.buf.unary(|d, dst| d.reciproc(Elem::Cplx, dst), cplx_reciproc_ref)
    }

    pub fn add_const(&mut self, c: Complex32) -> Result<()> {
        self.buf
            .unary(|d, dst| d.add_const(Elem::Cplx, dst, c), |res| cplx_add_const_ref(res, c))
    }

    pub fn scal(&mut self, a: f32) -> Result<()> {
        self.scal_cplx(Complex32::new(a, 0.0))
    }

    pub fn scal_cplx(&mut self, a: Complex32) -> Result<()> {
        self.buf.unary(|d, dst| d.scal(Elem::Cplx, dst, a), |res| cplx_scal_ref(res, a))
    }

    pub fn conj(&mut self) -> Result<()> {
        self.buf.unary(|d, dst| d.conj(dst), cplx_conj_ref)
    }

    /// `<self, self>`
    pub fn norm2(&self) -> Result<f64> {
        Ok(self.reduction(Reduction::Norm2, None)?.re)
    }

    /// `<conj(self), y>`
    pub fn dot(&self, y: &CplxVec) -> Result<Complex64> {
        check_sizes(self.n, [y.n])?;
        self.reduction(Reduction::Dot, Some(y))
    }

    pub fn sum_elements(&self) -> Result<Complex64> {
        self.reduction(Reduction::Sum, None)
    }

    fn reduction(&self, op: Reduction, y: Option<&CplxVec>) -> Result<Complex64> {
        self.buf.reduce(
            y.map(|y| &y.buf),
            |d, a, b| d.reduce(Elem::Cplx, op, a, b),
            |a, b| reduce_ref(Elem::Cplx, op, a, b),
        )
    }

    /// `self *= x`, or `self *= conj(x)` if `conj`.
    pub fn times(&mut self, x: &CplxVec, conj: bool) -> Result<()> {
        check_sizes(self.n, [x.n])?;
        self.buf.binary(
            &x.buf,
            |d, dst, src| d.times(Elem::Cplx, dst, src, conj),
            |res, src| cplx_times_ref(res, src, conj),
        )
    }

    pub fn times_conj(&mut self, x: &CplxVec) -> Result<()> {
        self.times(x, true)
    }

    pub fn times_real(&mut self, x: &RealVec) -> Result<()> {
        check_sizes(self.n, [x.n])?;
        self.buf.binary(&x.buf, |d, dst, src| d.times_real(dst, src), cplx_times_real_ref)
    }

    /// `self += |x|^2`
    pub fn add_sqr(&mut self, x: &CplxVec) -> Result<()> {
        check_sizes(self.n, [x.n])?;
        self.buf.binary(&x.buf, |d, dst, src| d.add_sqr(Elem::Cplx, dst, src), cplx_add_sqr_ref)
    }

    pub fn first_10_elem(&self) -> Result<String> {
        Ok(format_first_10(as_cplx(&self.buf.host()?).iter()))
    }

    /// In-place transform over `shape`, on the device when device-backed.
    pub(crate) fn transform(&mut self, shape: PlanShape, inverse: bool) -> Result<()> {
        match self.buf.route(&[])? {
            Route::Device => {
                let store = self.buf.store()?;
                self.buf.ensure_device_current()?;
                store.device.fft(shape, &store.mem, inverse)?;
                self.buf.device_written()
            }
            Route::Host => host_transform(shape, self.buf.host_mut()?, inverse),
        }
    }
}

impl FourierTransform for CplxVec {
    fn fft(&mut self, inverse: bool) -> Result<()> {
        self.transform(PlanShape::d1(self.n)?, inverse)
    }
}

impl VectorInfos for CplxVec {
    fn vector_size(&self) -> usize {
        self.n
    }

    fn backend_tag(&self) -> BackendTag {
        self.buf.tag()
    }
}

impl Coherent for CplxVec {
    fn make_coherent(&self) -> Result<()> {
        self.buf.make_coherent()
    }

    fn coherence_state(&self) -> Result<Option<CoherenceState>> {
        self.buf.coherence_state()
    }
}

impl fmt::Debug for CplxVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CplxVec")
            .field("n", &self.n)
            .field("backend", &self.buf.tag())
            .finish()
    }
}
