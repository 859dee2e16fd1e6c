use std::{cell::Ref, fmt, sync::Arc};

use num_complex::Complex32;

use crate::{
    error::{Result, VecError, check_sizes},
    hal::{
        api::{Coherent, VectorInfos},
        layouts::{BackendTag, CoherenceState, Device, Elem, Part, Reduction},
    },
    reference::{
        cplx_part_ref, real_add_const_ref, real_add_sqr_ref, real_avr_ref, real_axpy_ref, real_max_ref, real_median_ref,
        real_min_ref, real_n_largest_idx_ref, real_normalize_ref, real_reciproc_ref, real_scal_ref, real_times_ref,
        reduce_ref, vec_add_inplace_ref, vec_copy_ref,
    },
    vector::{Buffer, CplxVec, check_index, checked_words, format_first_10},
};

/// Real single-precision vector of fixed size.
pub struct RealVec {
    pub(crate) n: usize,
    pub(crate) buf: Buffer,
}

impl RealVec {
    pub(crate) fn alloc(device: Option<&Arc<Device>>, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(VecError::InvalidSize(n));
        }
        Ok(Self {
            n,
            buf: Buffer::alloc(device, checked_words(&[n])?)?,
        })
    }

    /// Deep copy on the same backend.
    pub fn duplicate(&self) -> Result<Self> {
        let mut dup: Self = Self::alloc(self.buf.device(), self.n)?;
        dup.copy(self)?;
        Ok(dup)
    }

    /// Current host data. Two reads without a write in between never copy.
    pub fn data(&self) -> Result<Ref<'_, [f32]>> {
        self.buf.host()
    }

    /// Writable host data; the host copy becomes authoritative.
    pub fn data_mut(&mut self) -> Result<&mut [f32]> {
        self.buf.host_mut()
    }

    pub fn get(&self, i: usize) -> Result<f32> {
        check_index(i, self.n)?;
        Ok(self.buf.host()?[i])
    }

    pub fn set(&mut self, i: usize, v: f32) -> Result<()> {
        check_index(i, self.n)?;
        self.buf.host_mut()?[i] = v;
        Ok(())
    }

    pub fn copy(&mut self, x: &RealVec) -> Result<()> {
        check_sizes(self.n, [x.n])?;
        self.buf.overwrite(&x.buf, |d, dst, src| d.copy(dst, src), vec_copy_ref)
    }

    /// Copies one real projection of `x`. Runs on the host.
    pub fn copy_part(&mut self, x: &CplxVec, part: Part) -> Result<()> {
        check_sizes(self.n, [x.n])?;
        self.buf.route(&[&x.buf])?;
        let src: Ref<'_, [f32]> = x.buf.host()?;
        cplx_part_ref(self.buf.host_overwrite()?, &src, part);
        Ok(())
    }

    pub fn copy_magnitude(&mut self, x: &CplxVec) -> Result<()> {
        self.copy_part(x, Part::Magnitude)
    }

    pub fn copy_phase(&mut self, x: &CplxVec) -> Result<()> {
        self.copy_part(x, Part::Phase)
    }

    pub fn zero(&mut self) -> Result<()> {
        self.buf.zero()
    }

    /// `self += x` for every `x` in `xs`. All sizes are checked first.
    pub fn add(&mut self, xs: &[&RealVec]) -> Result<()> {
        check_sizes(self.n, xs.iter().map(|x| x.n))?;
        self.buf.route(&xs.iter().map(|x| &x.buf).collect::<Vec<_>>())?;
        for x in xs {
            self.buf.binary(&x.buf, |d, dst, src| d.add(dst, src), vec_add_inplace_ref)?;
        }
        Ok(())
    }

    /// `self += a * x`
    pub fn axpy(&mut self, a: f32, x: &RealVec) -> Result<()> {
        check_sizes(self.n, [x.n])?;
        self.buf.binary(
            &x.buf,
            |d, dst, src| d.axpy(Elem::Real, dst, Complex32::new(a, 0.0), src),
            |res, src| real_axpy_ref(res, a, src),
        )
    }

    pub fn add_const(&mut self, c: f32) -> Result<()> {
        self.buf.unary(
            |d, dst| d.add_const(Elem::Real, dst, Complex32::new(c, 0.0)),
            |res| real_add_const_ref(res, c),
        )
    }

    pub fn scal(&mut self, a: f32) -> Result<()> {
        self.buf.unary(
            |d, dst| d.scal(Elem::Real, dst, Complex32::new(a, 0.0)),
            |res| real_scal_ref(res, a),
        )
    }

    pub fn dot(&self, y: &RealVec) -> Result<f64> {
        check_sizes(self.n, [y.n])?;
        self.reduction(Reduction::Dot, Some(y))
    }

    /// `<self, self>`
    pub fn norm2(&self) -> Result<f64> {
        self.reduction(Reduction::Norm2, None)
    }

    pub fn sum_elements(&self) -> Result<f64> {
        self.reduction(Reduction::Sum, None)
    }

    fn reduction(&self, op: Reduction, y: Option<&RealVec>) -> Result<f64> {
        self.buf.reduce(
            y.map(|y| &y.buf),
            |d, a, b| d.reduce(Elem::Real, op, a, b).map(|z| z.re),
            |a, b| reduce_ref(Elem::Real, op, a, b).re,
        )
    }

    /// `self *= x`, elementwise.
    pub fn times(&mut self, x: &RealVec) -> Result<()> {
        check_sizes(self.n, [x.n])?;
        self.buf.binary(&x.buf, |d, dst, src| d.times(Elem::Real, dst, src, false), real_times_ref)
    }

    pub fn reciproc(&mut self) -> Result<()> {
        self.buf.unary(|d, dst| d.reciproc(Elem::Real, dst), real_reciproc_ref)
    }

    /// `self += x^2`
    pub fn add_sqr(&mut self, x: &RealVec) -> Result<()> {
        check_sizes(self.n, [x.n])?;
        self.buf.binary(&x.buf, |d, dst, src| d.add_sqr(Elem::Real, dst, src), real_add_sqr_ref)
    }

    /// Rescales to `[0, 1]`.
    pub fn normalize(&mut self) -> Result<()> {
        self.normalize_range(0.0, 1.0)
    }

    /// Rescales `[min, max]` onto `[vmin, vmax]`. Runs on the host.
    pub fn normalize_range(&mut self, vmin: f32, vmax: f32) -> Result<()> {
        real_normalize_ref(self.buf.host_mut()?, vmin, vmax);
        Ok(())
    }

    /// Indices of the `n` elements of largest magnitude, largest first.
    pub fn n_largest_idx(&self, n: usize) -> Result<Vec<usize>> {
        Ok(real_n_largest_idx_ref(&self.buf.host()?, n))
    }

    pub fn avr(&self) -> Result<f64> {
        Ok(real_avr_ref(&self.buf.host()?))
    }

    pub fn median(&self) -> Result<f64> {
        Ok(real_median_ref(&self.buf.host()?))
    }

    pub fn min(&self) -> Result<f32> {
        Ok(real_min_ref(&self.buf.host()?))
    }

    pub fn max(&self) -> Result<f32> {
        Ok(real_max_ref(&self.buf.host()?))
    }

    pub fn first_10_elem(&self) -> Result<String> {
        Ok(format_first_10(self.buf.host()?.iter()))
    }
}

impl VectorInfos for RealVec {
    fn vector_size(&self) -> usize {
        self.n
    }

    fn backend_tag(&self) -> BackendTag {
        self.buf.tag()
    }
}

impl Coherent for RealVec {
    fn make_coherent(&self) -> Result<()> {
        self.buf.make_coherent()
    }

    fn coherence_state(&self) -> Result<Option<CoherenceState>> {
        self.buf.coherence_state()
    }
}

impl fmt::Debug for RealVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealVec")
            .field("n", &self.n)
            .field("backend", &self.buf.tag())
            .finish()
    }
}
