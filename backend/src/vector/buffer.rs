use std::{
    cell::{Cell, Ref, RefCell},
    sync::Arc,
};

use crate::{
    alloc_host,
    error::{Result, VecError},
    hal::layouts::{BackendTag, Coherence, CoherenceState, Device, DeviceBuffer, DeviceId, Transfer},
    reference::vec_zero_ref,
};

/// Accelerator-side half of a device-backed buffer.
pub(crate) struct DeviceStore {
    pub(crate) device: Arc<Device>,
    pub(crate) mem: DeviceBuffer,
    coherence: Cell<Coherence>,
}

/// Where an operation runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Route {
    /// Portable kernels on synchronized host buffers.
    Host,
    /// Native kernels; every participant lives on the same device.
    Device,
}

/// Storage of one vector: a host buffer, mirrored on a device if the
/// vector is device-backed.
///
/// Host data sits behind a `RefCell` so read-only operations can pull the
/// device copy back lazily. Buffers are `Send` but not `Sync`.
pub(crate) struct Buffer {
    host: RefCell<Vec<f32>>,
    store: Option<DeviceStore>,
}

impl Buffer {
    /// Allocates `len` zeroed words on the host and, if given, on `device`.
    pub(crate) fn alloc(device: Option<&Arc<Device>>, len: usize) -> Result<Self> {
        let host: Vec<f32> = alloc_host(len)?;
        let store: Option<DeviceStore> = match device {
            Some(device) => Some(DeviceStore {
                mem: device.alloc(len)?,
                device: device.clone(),
                coherence: Cell::new(Coherence::synced()),
            }),
            None => None,
        };
        Ok(Self {
            host: RefCell::new(host),
            store,
        })
    }

    #[inline]
    pub(crate) fn tag(&self) -> BackendTag {
        match &self.store {
            Some(store) => BackendTag::Device(store.device.id()),
            None => BackendTag::Host,
        }
    }

    #[inline]
    pub(crate) fn device(&self) -> Option<&Arc<Device>> {
        self.store.as_ref().map(|s| &s.device)
    }

    pub(crate) fn store(&self) -> Result<&DeviceStore> {
        self.store
            .as_ref()
            .ok_or_else(|| VecError::consistency("device kernel on a host-only vector"))
    }

    pub(crate) fn coherence_state(&self) -> Result<Option<CoherenceState>> {
        match &self.store {
            Some(store) => store.coherence.get().state().map(Some),
            None => Ok(None),
        }
    }

    /// Uploads the host buffer if it is authoritative.
    pub(crate) fn ensure_device_current(&self) -> Result<()> {
        if let Some(store) = &self.store {
            let mut c: Coherence = store.coherence.get();
            if c.state()? == CoherenceState::HostAuthoritative {
                store.device.upload(&store.mem, &self.host.borrow())?;
                c.uploaded();
                store.coherence.set(c);
            }
        }
        Ok(())
    }

    /// Downloads the device buffer if it is authoritative.
    pub(crate) fn ensure_host_current(&self) -> Result<()> {
        if let Some(store) = &self.store {
            let mut c: Coherence = store.coherence.get();
            if c.state()? == CoherenceState::DeviceAuthoritative {
                store.device.download(&store.mem, &mut self.host.borrow_mut())?;
                c.downloaded();
                store.coherence.set(c);
            }
        }
        Ok(())
    }

    /// Resolves whichever side is stale. Only affects when copies happen.
    pub(crate) fn make_coherent(&self) -> Result<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        match store.coherence.get().pending_transfer()? {
            Some(Transfer::HostToDevice) => self.ensure_device_current(),
            Some(Transfer::DeviceToHost) => self.ensure_host_current(),
            None => Ok(()),
        }
    }

    /// Current host data.
    pub(crate) fn host(&self) -> Result<Ref<'_, [f32]>> {
        self.ensure_host_current()?;
        Ok(Ref::map(self.host.borrow(), Vec::as_slice))
    }

    /// Current host data, for writing. The host becomes authoritative.
    pub(crate) fn host_mut(&mut self) -> Result<&mut [f32]> {
        self.ensure_host_current()?;
        if let Some(store) = &self.store {
            let mut c: Coherence = store.coherence.get();
            c.host_written()?;
            store.coherence.set(c);
        }
        Ok(self.host.get_mut())
    }

    /// Host data about to be fully replaced; skips the download.
    pub(crate) fn host_overwrite(&mut self) -> Result<&mut [f32]> {
        if let Some(store) = &self.store {
            let mut c: Coherence = store.coherence.get();
            c.state()?;
            c.host_overwritten();
            store.coherence.set(c);
        }
        Ok(self.host.get_mut())
    }

    pub(crate) fn device_written(&self) -> Result<()> {
        let store: &DeviceStore = self.store()?;
        let mut c: Coherence = store.coherence.get();
        c.device_written()?;
        store.coherence.set(c);
        Ok(())
    }

    pub(crate) fn device_overwritten(&self) -> Result<()> {
        let store: &DeviceStore = self.store()?;
        let mut c: Coherence = store.coherence.get();
        c.state()?;
        c.device_overwritten();
        store.coherence.set(c);
        Ok(())
    }

    /// Picks the execution route for an operation on `self` and `operands`.
    ///
    /// Participants spread over two device contexts are rejected; a native
    /// kernel runs only if every participant lives on `self`'s device.
    pub(crate) fn route(&self, operands: &[&Buffer]) -> Result<Route> {
        let mut seen: Option<DeviceId> = self.tag().device();
        let mut all_on_device: bool = seen.is_some();
        for op in operands {
            match (op.tag().device(), seen) {
                (Some(id), Some(other)) if id != other => {
                    return Err(VecError::consistency(format!(
                        "operands from device contexts {} and {}",
                        other.as_u64(),
                        id.as_u64()
                    )));
                }
                (Some(id), None) => seen = Some(id),
                (Some(_), Some(_)) => {}
                (None, _) => all_on_device = false,
            }
        }
        Ok(if all_on_device && self.store.is_some() {
            Route::Device
        } else {
            Route::Host
        })
    }

    /// Sets every word to zero without reading the previous content.
    pub(crate) fn zero(&mut self) -> Result<()> {
        match self.route(&[])? {
            Route::Device => {
                let store: &DeviceStore = self.store()?;
                store.device.zero(&store.mem)?;
                self.device_overwritten()
            }
            Route::Host => {
                vec_zero_ref(self.host_overwrite()?);
                Ok(())
            }
        }
    }

    /// In-place update of `self` with no operand.
    pub(crate) fn unary<K, H>(&mut self, kernel: K, host: H) -> Result<()>
    where
        K: FnOnce(&Device, &DeviceBuffer) -> Result<()>,
        H: FnOnce(&mut [f32]),
    {
        match self.route(&[])? {
            Route::Device => {
                let store: &DeviceStore = self.store()?;
                self.ensure_device_current()?;
                kernel(&store.device, &store.mem)?;
                self.device_written()
            }
            Route::Host => {
                host(self.host_mut()?);
                Ok(())
            }
        }
    }

    /// In-place update of `self` reading `x`.
    pub(crate) fn binary<K, H>(&mut self, x: &Buffer, kernel: K, host: H) -> Result<()>
    where
        K: FnOnce(&Device, &DeviceBuffer, &DeviceBuffer) -> Result<()>,
        H: FnOnce(&mut [f32], &[f32]),
    {
        match self.route(&[x])? {
            Route::Device => {
                let store: &DeviceStore = self.store()?;
                self.ensure_device_current()?;
                x.ensure_device_current()?;
                kernel(&store.device, &store.mem, &x.store()?.mem)?;
                self.device_written()
            }
            Route::Host => {
                let src: Ref<'_, [f32]> = x.host()?;
                host(self.host_mut()?, &src);
                Ok(())
            }
        }
    }

    /// Replaces the content of `self` with a function of `x`; the previous
    /// content of `self` is never read.
    pub(crate) fn overwrite<K, H>(&mut self, x: &Buffer, kernel: K, host: H) -> Result<()>
    where
        K: FnOnce(&Device, &DeviceBuffer, &DeviceBuffer) -> Result<()>,
        H: FnOnce(&mut [f32], &[f32]),
    {
        match self.route(&[x])? {
            Route::Device => {
                let store: &DeviceStore = self.store()?;
                x.ensure_device_current()?;
                kernel(&store.device, &store.mem, &x.store()?.mem)?;
                self.device_overwritten()
            }
            Route::Host => {
                let src: Ref<'_, [f32]> = x.host()?;
                host(self.host_overwrite()?, &src);
                Ok(())
            }
        }
    }

    /// Scalar reduction over `self` and optionally `y`.
    pub(crate) fn reduce<T, K, H>(&self, y: Option<&Buffer>, kernel: K, host: H) -> Result<T>
    where
        K: FnOnce(&Device, &DeviceBuffer, Option<&DeviceBuffer>) -> Result<T>,
        H: FnOnce(&[f32], Option<&[f32]>) -> T,
    {
        let operands: Vec<&Buffer> = y.into_iter().collect();
        match self.route(&operands)? {
            Route::Device => {
                let store: &DeviceStore = self.store()?;
                self.ensure_device_current()?;
                let y_mem: Option<&DeviceBuffer> = match y {
                    Some(y) => {
                        y.ensure_device_current()?;
                        Some(&y.store()?.mem)
                    }
                    None => None,
                };
                kernel(&store.device, &store.mem, y_mem)
            }
            Route::Host => {
                let a: Ref<'_, [f32]> = self.host()?;
                match y {
                    Some(y) => {
                        let b: Ref<'_, [f32]> = y.host()?;
                        Ok(host(&a, Some(&b)))
                    }
                    None => Ok(host(&a, None)),
                }
            }
        }
    }
}
