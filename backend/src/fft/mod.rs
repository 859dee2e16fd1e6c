//! FFT plan pool and pluggable transform providers.

mod pool;
mod provider;
mod reference;
mod registry;
mod rust_fft;

pub use pool::*;
pub use provider::{TransformPlan, TransformProvider};
pub use reference::ReferenceProvider;
pub use registry::*;
pub use rust_fft::*;

use once_cell::sync::Lazy;

use crate::{error::Result, hal::layouts::PlanShape, reference::as_cplx_mut};

static HOST_PLANS: Lazy<PlanPool<Box<dyn TransformPlan>>> = Lazy::new(PlanPool::new);

/// Pool of host-side plans shared by every host-backed vector.
pub fn host_plans() -> &'static PlanPool<Box<dyn TransformPlan>> {
    &HOST_PLANS
}

/// In-place unnormalized transform of interleaved complex `data` with the
/// active provider.
pub fn host_transform(shape: PlanShape, data: &mut [f32], inverse: bool) -> Result<()> {
    let provider = registry().active()?;
    let mut plan = HOST_PLANS.lease(shape, |s| provider.create_plan(s))?;
    plan.transform(as_cplx_mut(data), inverse)
}
