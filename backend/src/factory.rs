//! Creation of vectors bound to one backend, and the process-wide factory
//! designation.

use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};

use crate::{
    error::{Result, VecError},
    hal::layouts::{BackendTag, Device},
    vector::{CplxVec, CplxVec2d, CplxVec3d, RealVec},
};

/// Hands out zero-initialized vectors bound to one backend.
///
/// Cheap to clone; clones share the device context.
#[derive(Clone, Debug, Default)]
pub struct VectorFactory {
    device: Option<Arc<Device>>,
}

impl VectorFactory {
    /// Factory for host-only vectors.
    pub fn host() -> Self {
        Self { device: None }
    }

    /// Factory for vectors mirrored on `device`.
    pub fn accelerated(device: Arc<Device>) -> Self {
        Self { device: Some(device) }
    }

    #[inline]
    pub fn device(&self) -> Option<&Arc<Device>> {
        self.device.as_ref()
    }

    pub fn backend_tag(&self) -> BackendTag {
        match &self.device {
            Some(device) => BackendTag::Device(device.id()),
            None => BackendTag::Host,
        }
    }

    /// Fails with [`VecError::InvalidSize`] for `n == 0` and with
    /// [`VecError::ResourceExhausted`] if either side cannot allocate.
    pub fn create_real(&self, n: usize) -> Result<RealVec> {
        RealVec::alloc(self.device.as_ref(), n)
    }

    pub fn create_cplx(&self, n: usize) -> Result<CplxVec> {
        CplxVec::alloc(self.device.as_ref(), n)
    }

    pub fn create_cplx_2d(&self, width: usize, height: usize) -> Result<CplxVec2d> {
        CplxVec2d::alloc(self.device.as_ref(), width, height)
    }

    pub fn create_cplx_3d(&self, width: usize, height: usize, depth: usize) -> Result<CplxVec3d> {
        CplxVec3d::alloc(self.device.as_ref(), width, height, depth)
    }

    /// `count` real vectors of `n` elements each.
    pub fn create_array_real(&self, count: usize, n: usize) -> Result<Vec<RealVec>> {
        (0..count).map(|_| self.create_real(n)).collect()
    }

    pub fn create_array_cplx(&self, count: usize, n: usize) -> Result<Vec<CplxVec>> {
        (0..count).map(|_| self.create_cplx(n)).collect()
    }

    /// Blocks until all work queued by vectors of this factory has completed.
    pub fn sync_concurrent(&self) -> Result<()> {
        match &self.device {
            Some(device) => device.sync(),
            None => Ok(()),
        }
    }
}

static BASIC: Lazy<VectorFactory> = Lazy::new(VectorFactory::host);
static CURRENT: OnceCell<VectorFactory> = OnceCell::new();

/// The host-only default factory.
pub fn basic() -> &'static VectorFactory {
    &BASIC
}

/// Designates the process-wide current factory. Succeeds once.
pub fn install(factory: VectorFactory) -> Result<()> {
    CURRENT
        .set(factory)
        .map_err(|_| VecError::consistency("a current vector factory is already installed"))
}

/// The installed factory, or [`basic`] if none was installed.
pub fn current() -> &'static VectorFactory {
    CURRENT.get().unwrap_or(&BASIC)
}
