use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::Result,
    fft::PlanPool,
    hal::{
        layouts::{DevicePlan, StagingBuffer},
        oep::Accelerator,
    },
};

static NEXT_DEVICE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a device context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(u64);

impl DeviceId {
    fn next() -> Self {
        Self(NEXT_DEVICE_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Backend a vector is bound to for its whole lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendTag {
    Host,
    Device(DeviceId),
}

impl BackendTag {
    #[inline]
    pub fn device(self) -> Option<DeviceId> {
        match self {
            BackendTag::Host => None,
            BackendTag::Device(id) => Some(id),
        }
    }
}

/// How host <-> device copies are transported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyMode {
    /// Arbitrary-size regions are copied directly.
    #[default]
    Direct,
    /// Every copy goes through the bounded staging buffer.
    Staged,
}

/// Configuration of an accelerator context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub name: String,
    pub memory_limit_bytes: usize,
    pub staging_bytes: usize,
    pub copy_mode: CopyMode,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: "sim0".to_string(),
            memory_limit_bytes: 256 << 20,
            staging_bytes: 16 << 20,
            copy_mode: CopyMode::Direct,
        }
    }
}

/// Transfer and launch counters of a device context.
#[derive(Default)]
pub struct DeviceStats {
    uploads: AtomicUsize,
    downloads: AtomicUsize,
    kernels: AtomicUsize,
    transforms: AtomicUsize,
}

/// Point-in-time copy of [`DeviceStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeviceStatsSnapshot {
    pub uploads: usize,
    pub downloads: usize,
    pub kernels: usize,
    pub transforms: usize,
}

impl DeviceStats {
    pub(crate) fn upload(&self) {
        self.uploads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn download(&self) {
        self.downloads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn kernel(&self) {
        self.kernels.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn transform(&self) {
        self.transforms.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DeviceStatsSnapshot {
        DeviceStatsSnapshot {
            uploads: self.uploads.load(Ordering::Relaxed),
            downloads: self.downloads.load(Ordering::Relaxed),
            kernels: self.kernels.load(Ordering::Relaxed),
            transforms: self.transforms.load(Ordering::Relaxed),
        }
    }
}

/// An accelerator context: one memory space, one staging buffer and one
/// pool of accelerator-side FFT plans, shared by every vector created on it.
pub struct Device {
    pub(crate) id: DeviceId,
    pub(crate) config: DeviceConfig,
    pub(crate) accel: Arc<dyn Accelerator>,
    pub(crate) staging: Mutex<StagingBuffer>,
    pub(crate) plans: PlanPool<DevicePlan>,
    pub(crate) stats: DeviceStats,
}

impl Device {
    pub fn new(accel: Arc<dyn Accelerator>, config: DeviceConfig) -> Result<Arc<Self>> {
        let staging: StagingBuffer = StagingBuffer::new(config.staging_bytes)?;
        let id: DeviceId = DeviceId::next();
        info!(
            device = %config.name,
            id = id.as_u64(),
            accelerator = accel.name(),
            staging_bytes = config.staging_bytes,
            copy_mode = ?config.copy_mode,
            "device context created"
        );
        Ok(Arc::new(Self {
            id,
            config,
            accel,
            staging: Mutex::new(staging),
            plans: PlanPool::new(),
            stats: DeviceStats::default(),
        }))
    }

    #[inline]
    pub fn id(&self) -> DeviceId {
        self.id
    }

    #[inline]
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    #[inline]
    pub fn stats(&self) -> DeviceStatsSnapshot {
        self.stats.snapshot()
    }

    #[inline]
    pub fn plans(&self) -> &PlanPool<DevicePlan> {
        &self.plans
    }

    /// Largest element count `set_from_16bit_pixels` accepts on this device.
    #[inline]
    pub fn max_pixels(&self) -> usize {
        self.config.staging_bytes / 8
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("name", &self.config.name)
            .field("accelerator", &self.accel.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{CopyMode, DeviceConfig};

    #[test]
    fn config_defaults_fill_missing_fields() {
        let cfg: DeviceConfig = serde_json::from_str(r#"{"name":"gpu1","copy_mode":"staged"}"#).unwrap();
        assert_eq!(cfg.name, "gpu1");
        assert_eq!(cfg.copy_mode, CopyMode::Staged);
        assert_eq!(cfg.staging_bytes, DeviceConfig::default().staging_bytes);

        let json: String = serde_json::to_string(&cfg).unwrap();
        let back: DeviceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
