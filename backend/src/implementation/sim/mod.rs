//! Emulated accelerator.
//!
//! Device memory lives in a worker thread that executes commands in issue
//! order. Kernel launches and uploads return immediately; downloads,
//! reductions and fences block until the worker has caught up, which gives
//! the read-after-write ordering of an in-order command queue.

mod worker;

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, AtomicUsize, Ordering},
        mpsc::{self, Sender},
    },
    thread::{self, JoinHandle},
};

use num_complex::{Complex32, Complex64};
use parking_lot::Mutex;
use sigvec_utils::Map;
use tracing::debug;
use worker::{Command, Kernel, Worker};

use crate::{
    error::{Result, VecError},
    hal::{
        layouts::{Device, DeviceConfig, DevicePtr, Elem, PlanHandle, PlanShape, Reduction},
        oep::{Accelerator, DeviceKernelImpl, DeviceMemoryImpl, DeviceTransformImpl},
    },
};

pub struct SimDevice {
    name: String,
    tx: Option<Sender<Command>>,
    worker: Option<JoinHandle<()>>,
    next_handle: AtomicU64,
    used_bytes: AtomicUsize,
    memory_limit: usize,
    allocations: Mutex<Map<u64, usize>>,
}

impl SimDevice {
    pub fn new(name: &str, memory_limit: usize) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<Command>();
        let worker: JoinHandle<()> = thread::Builder::new()
            .name(format!("sim-{name}"))
            .spawn(move || Worker::default().run(rx))
            .map_err(|_| VecError::DeviceLost(name.to_string()))?;
        Ok(Self {
            name: name.to_string(),
            tx: Some(tx),
            worker: Some(worker),
            next_handle: AtomicU64::new(1),
            used_bytes: AtomicUsize::new(0),
            memory_limit,
            allocations: Mutex::new(Map::new()),
        })
    }

    /// Starts an emulated accelerator and wraps it in a device context.
    pub fn open(config: DeviceConfig) -> Result<Arc<Device>> {
        let sim: SimDevice = SimDevice::new(&config.name, config.memory_limit_bytes)?;
        Device::new(Arc::new(sim), config)
    }

    pub fn open_default() -> Result<Arc<Device>> {
        Self::open(DeviceConfig::default())
    }

    /// Bytes of device memory currently allocated.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes.load(Ordering::Relaxed)
    }

    fn lost(&self) -> VecError {
        VecError::DeviceLost(self.name.clone())
    }

    fn send(&self, cmd: Command) -> Result<()> {
        match &self.tx {
            Some(tx) => tx.send(cmd).map_err(|_| self.lost()),
            None => Err(self.lost()),
        }
    }

    fn launch(&self, kernel: Kernel) -> Result<()> {
        self.send(Command::Kernel(kernel))
    }

    fn next_handle(&self) -> u64 {
        self.next_handle.fetch_add(1, Ordering::Relaxed)
    }
}

impl Drop for SimDevice {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

unsafe impl DeviceMemoryImpl for SimDevice {
    fn alloc_impl(&self, len: usize) -> Result<DevicePtr> {
        let bytes: usize = len.saturating_mul(size_of::<f32>());
        let used: usize = self.used_bytes.fetch_add(bytes, Ordering::Relaxed);
        if used.saturating_add(bytes) > self.memory_limit {
            self.used_bytes.fetch_sub(bytes, Ordering::Relaxed);
            return Err(VecError::ResourceExhausted {
                resource: "device memory",
                requested: bytes,
                available: self.memory_limit.saturating_sub(used),
            });
        }
        let handle: u64 = self.next_handle();
        if let Err(err) = self.send(Command::Alloc { handle, len }) {
            self.used_bytes.fetch_sub(bytes, Ordering::Relaxed);
            return Err(err);
        }
        self.allocations.lock().insert(handle, bytes);
        debug!(device = %self.name, handle, bytes, "device alloc");
        DevicePtr::from_raw(handle).ok_or_else(|| VecError::consistency("null device handle"))
    }

    unsafe fn free_impl(&self, ptr: DevicePtr) {
        if let Some(bytes) = self.allocations.lock().remove(&ptr.as_raw()) {
            self.used_bytes.fetch_sub(bytes, Ordering::Relaxed);
        }
        let _ = self.send(Command::Free { handle: ptr.as_raw() });
    }

    unsafe fn upload_impl(&self, dst: DevicePtr, src: &[f32]) -> Result<()> {
        self.send(Command::Upload {
            dst: dst.as_raw(),
            data: src.to_vec(),
        })
    }

    unsafe fn upload_u16_impl(&self, dst: DevicePtr, src: &[u16]) -> Result<()> {
        self.send(Command::UploadU16 {
            dst: dst.as_raw(),
            px: src.to_vec(),
        })
    }

    unsafe fn download_impl(&self, src: DevicePtr, dst: &mut [f32]) -> Result<()> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::Download {
            src: src.as_raw(),
            len: dst.len(),
            reply,
        })?;
        let data: Vec<f32> = rx
            .recv()
            .map_err(|_| self.lost())?
            .ok_or_else(|| VecError::consistency(format!("download from unknown buffer {src:?}")))?;
        dst.copy_from_slice(&data);
        Ok(())
    }

    fn sync_impl(&self) -> Result<()> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::Fence { reply })?;
        rx.recv().map_err(|_| self.lost())
    }
}

unsafe impl DeviceKernelImpl for SimDevice {
    unsafe fn zero_impl(&self, dst: DevicePtr, len: usize) -> Result<()> {
        self.launch(Kernel::Zero { dst: dst.as_raw(), len })
    }

    unsafe fn copy_impl(&self, dst: DevicePtr, src: DevicePtr, len: usize) -> Result<()> {
        self.launch(Kernel::Copy {
            dst: dst.as_raw(),
            src: src.as_raw(),
            len,
        })
    }

    unsafe fn copy_real_to_cplx_impl(&self, dst: DevicePtr, src: DevicePtr, n: usize) -> Result<()> {
        self.launch(Kernel::CopyRealToCplx {
            dst: dst.as_raw(),
            src: src.as_raw(),
            n,
        })
    }

    unsafe fn add_impl(&self, dst: DevicePtr, src: DevicePtr, len: usize) -> Result<()> {
        self.launch(Kernel::Add {
            dst: dst.as_raw(),
            src: src.as_raw(),
            len,
        })
    }

    unsafe fn axpy_impl(&self, elem: Elem, dst: DevicePtr, x: DevicePtr, n: usize, re: f32, im: f32) -> Result<()> {
        self.launch(Kernel::Axpy {
            elem,
            dst: dst.as_raw(),
            x: x.as_raw(),
            len: n * elem.floats(),
            alpha: Complex32::new(re, im),
        })
    }

    unsafe fn scal_impl(&self, elem: Elem, dst: DevicePtr, n: usize, re: f32, im: f32) -> Result<()> {
        self.launch(Kernel::Scal {
            elem,
            dst: dst.as_raw(),
            len: n * elem.floats(),
            alpha: Complex32::new(re, im),
        })
    }

    unsafe fn add_const_impl(&self, elem: Elem, dst: DevicePtr, n: usize, re: f32, im: f32) -> Result<()> {
        self.launch(Kernel::AddConst {
            elem,
            dst: dst.as_raw(),
            len: n * elem.floats(),
            c: Complex32::new(re, im),
        })
    }

    unsafe fn times_impl(&self, elem: Elem, dst: DevicePtr, a: DevicePtr, n: usize, conj: bool) -> Result<()> {
        self.launch(Kernel::Times {
            elem,
            dst: dst.as_raw(),
            a: a.as_raw(),
            len: n * elem.floats(),
            conj,
        })
    }

    unsafe fn times_real_impl(&self, dst: DevicePtr, a: DevicePtr, n: usize) -> Result<()> {
        self.launch(Kernel::TimesReal {
            dst: dst.as_raw(),
            a: a.as_raw(),
            n,
        })
    }

    unsafe fn add_sqr_impl(&self, elem: Elem, dst: DevicePtr, a: DevicePtr, n: usize) -> Result<()> {
        self.launch(Kernel::AddSqr {
            elem,
            dst: dst.as_raw(),
            a: a.as_raw(),
            len: n * elem.floats(),
        })
    }

    unsafe fn reciproc_impl(&self, elem: Elem, dst: DevicePtr, n: usize) -> Result<()> {
        self.launch(Kernel::Reciproc {
            elem,
            dst: dst.as_raw(),
            len: n * elem.floats(),
        })
    }

    unsafe fn conj_impl(&self, dst: DevicePtr, n: usize) -> Result<()> {
        self.launch(Kernel::Conj {
            dst: dst.as_raw(),
            len: 2 * n,
        })
    }

    unsafe fn reduce_impl(
        &self,
        elem: Elem,
        op: Reduction,
        a: DevicePtr,
        b: Option<DevicePtr>,
        n: usize,
    ) -> Result<Complex64> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::Reduce {
            elem,
            op,
            a: a.as_raw(),
            b: b.map(DevicePtr::as_raw),
            len: n * elem.floats(),
            reply,
        })?;
        rx.recv()
            .map_err(|_| self.lost())?
            .ok_or_else(|| VecError::consistency("reduction over unknown buffer"))
    }

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
    ) -> Result<()> {
        self.launch(Kernel::Paste {
            dst: dst.as_raw(),
            dst_dims: (dst_w, dst_h),
            src: src.as_raw(),
            src_dims: (src_w, src_h),
            at: (x, y),
            zero,
        })
    }

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
    ) -> Result<()> {
        self.launch(Kernel::PasteFreq {
            dst: dst.as_raw(),
            dst_dims: (dst_w, dst_h),
            src: src.as_raw(),
            src_dims: (src_w, src_h),
            offset: (x_offset, y_offset),
        })
    }

    unsafe fn fourier_shift_impl(&self, dst: DevicePtr, n: usize, kx: f64, ky: f64) -> Result<()> {
        self.launch(Kernel::FourierShift {
            dst: dst.as_raw(),
            n,
            kx,
            ky,
        })
    }
}

unsafe impl DeviceTransformImpl for SimDevice {
    fn create_plan_impl(&self, shape: PlanShape) -> Result<PlanHandle> {
        let handle: u64 = self.next_handle();
        self.send(Command::CreatePlan { handle, shape })?;
        PlanHandle::from_raw(handle).ok_or_else(|| VecError::consistency("null plan handle"))
    }

    unsafe fn destroy_plan_impl(&self, plan: PlanHandle) {
        let _ = self.send(Command::DestroyPlan { handle: plan.as_raw() });
    }

    unsafe fn fft_impl(&self, plan: PlanHandle, buf: DevicePtr, inverse: bool) -> Result<()> {
        self.send(Command::Fft {
            plan: plan.as_raw(),
            buf: buf.as_raw(),
            inverse,
        })
    }
}

impl Accelerator for SimDevice {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        error::VecError,
        factory::VectorFactory,
        hal::layouts::{CopyMode, Device, DeviceConfig},
        implementation::sim::SimDevice,
        vector::RealVec,
    };

    #[test]
    fn memory_limit_is_enforced() {
        let dev: Arc<Device> = SimDevice::open(DeviceConfig {
            memory_limit_bytes: 64,
            ..DeviceConfig::default()
        })
        .unwrap();
        let f: VectorFactory = VectorFactory::accelerated(dev);
        let a: RealVec = f.create_real(16).unwrap();
        assert!(matches!(
            f.create_real(1),
            Err(VecError::ResourceExhausted {
                resource: "device memory",
                ..
            })
        ));
        drop(a);
        assert!(f.create_real(16).is_ok());
    }

    #[test]
    fn staged_copies_respect_capacity() {
        let dev: Arc<Device> = SimDevice::open(DeviceConfig {
            staging_bytes: 32,
            copy_mode: CopyMode::Staged,
            ..DeviceConfig::default()
        })
        .unwrap();
        let f: VectorFactory = VectorFactory::accelerated(dev);

        let mut small: RealVec = f.create_real(8).unwrap();
        small.data_mut().unwrap().fill(2.0);
        small.scal(3.0).unwrap();
        assert_eq!(&*small.data().unwrap(), &[6.0; 8]);

        let mut big: RealVec = f.create_real(9).unwrap();
        big.data_mut().unwrap().fill(1.0);
        assert!(matches!(
            big.scal(2.0),
            Err(VecError::ResourceExhausted {
                resource: "staging buffer",
                ..
            })
        ));
    }

    #[test]
    fn kernels_run_asynchronously_in_order() {
        let dev: Arc<Device> = SimDevice::open_default().unwrap();
        let f: VectorFactory = VectorFactory::accelerated(dev.clone());
        let mut a: RealVec = f.create_real(1024).unwrap();
        for _ in 0..100 {
            a.add_const(1.0).unwrap();
        }
        f.sync_concurrent().unwrap();
        assert_eq!(a.sum_elements().unwrap(), 102400.0);
        assert_eq!(dev.stats().downloads, 0);
    }
}
