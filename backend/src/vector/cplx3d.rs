use std::{
    fmt,
    ops::{Deref, DerefMut},
    sync::Arc,
};

use num_complex::Complex32;

use crate::{
    error::Result,
    hal::{
        api::{Coherent, FourierTransform, VectorInfos},
        layouts::{BackendTag, CoherenceState, Device, PlanShape},
    },
    vector::{CplxVec, check_coord, checked_words},
};

/// Complex volume of `width x height x depth` elements; `(x, y, z)` lives
/// at `x + width * (y + height * z)`.
pub struct CplxVec3d {
    pub(crate) inner: CplxVec,
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) depth: usize,
}

impl CplxVec3d {
    pub(crate) fn alloc(device: Option<&Arc<Device>>, width: usize, height: usize, depth: usize) -> Result<Self> {
        Ok(Self {
            inner: CplxVec::alloc(device, checked_words(&[width, height, depth])?)?,
            width,
            height,
            depth,
        })
    }

    pub fn duplicate(&self) -> Result<Self> {
        Ok(Self {
            inner: self.inner.duplicate()?,
            width: self.width,
            height: self.height,
            depth: self.depth,
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

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn check_xyz(&self, x: usize, y: usize, z: usize) -> Result<usize> {
        check_coord("column", x, self.width)?;
        check_coord("row", y, self.height)?;
        check_coord("plane", z, self.depth)?;
        Ok(x + self.width * (y + self.height * z))
    }

    pub fn get_xyz(&self, x: usize, y: usize, z: usize) -> Result<Complex32> {
        let i: usize = self.check_xyz(x, y, z)?;
        self.inner.get(i)
    }

    pub fn set_xyz(&mut self, x: usize, y: usize, z: usize, v: Complex32) -> Result<()> {
        let i: usize = self.check_xyz(x, y, z)?;
        self.inner.set(i, v)
    }

    pub fn fft3d(&mut self, inverse: bool) -> Result<()> {
        let shape: PlanShape = PlanShape::d3(self.width, self.height, self.depth)?;
        self.inner.transform(shape, inverse)
    }
}

impl Deref for CplxVec3d {
    type Target = CplxVec;

    fn deref(&self) -> &CplxVec {
        &self.inner
    }
}

impl DerefMut for CplxVec3d {
    fn deref_mut(&mut self) -> &mut CplxVec {
        &mut self.inner
    }
}

impl FourierTransform for CplxVec3d {
    fn fft(&mut self, inverse: bool) -> Result<()> {
        self.fft3d(inverse)
    }
}

impl VectorInfos for CplxVec3d {
    fn vector_size(&self) -> usize {
        self.inner.n
    }

    fn backend_tag(&self) -> BackendTag {
        self.inner.buf.tag()
    }
}

impl Coherent for CplxVec3d {
    fn make_coherent(&self) -> Result<()> {
        self.inner.buf.make_coherent()
    }

    fn coherence_state(&self) -> Result<Option<CoherenceState>> {
        self.inner.buf.coherence_state()
    }
}

impl fmt::Debug for CplxVec3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CplxVec3d")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("depth", &self.depth)
            .field("backend", &self.inner.buf.tag())
            .finish()
    }
}
