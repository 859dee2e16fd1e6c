use std::{fmt, num::NonZeroU64, sync::Arc};

use crate::hal::{
    layouts::{DeviceId, PlanShape},
    oep::Accelerator,
};

/// Opaque handle to an allocation in accelerator memory.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DevicePtr(NonZeroU64);

impl DevicePtr {
    #[inline]
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    #[inline]
    pub fn as_raw(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for DevicePtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DevicePtr({:#x})", self.0)
    }
}

/// Opaque handle to an accelerator-side transform context.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlanHandle(NonZeroU64);

impl PlanHandle {
    #[inline]
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    #[inline]
    pub fn as_raw(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for PlanHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlanHandle({:#x})", self.0)
    }
}

/// Exclusively owned accelerator allocation of `len` floats.
///
/// The allocation is released when the buffer is dropped.
pub struct DeviceBuffer {
    pub(crate) ptr: DevicePtr,
    pub(crate) len: usize,
    pub(crate) device: DeviceId,
    pub(crate) accel: Arc<dyn Accelerator>,
}

impl DeviceBuffer {
    #[inline]
    pub fn ptr(&self) -> DevicePtr {
        self.ptr
    }

    /// Length in `f32` words.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn device(&self) -> DeviceId {
        self.device
    }
}

impl fmt::Debug for DeviceBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("device", &self.device)
            .finish()
    }
}

impl Drop for DeviceBuffer {
    fn drop(&mut self) {
        unsafe { self.accel.free_impl(self.ptr) }
    }
}

/// Exclusively owned accelerator transform plan for one [`PlanShape`].
pub struct DevicePlan {
    pub(crate) handle: PlanHandle,
    pub(crate) shape: PlanShape,
    pub(crate) accel: Arc<dyn Accelerator>,
}

impl DevicePlan {
    #[inline]
    pub fn handle(&self) -> PlanHandle {
        self.handle
    }

    #[inline]
    pub fn shape(&self) -> PlanShape {
        self.shape
    }
}

impl fmt::Debug for DevicePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DevicePlan")
            .field("handle", &self.handle)
            .field("shape", &self.shape)
            .finish()
    }
}

impl Drop for DevicePlan {
    fn drop(&mut self) {
        unsafe { self.accel.destroy_plan_impl(self.handle) }
    }
}
