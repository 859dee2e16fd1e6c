use num_complex::Complex32;

use crate::{
    error::{Result, VecError},
    fft::ShapedPlan,
    hal::layouts::PlanShape,
};

/// An executable host-side transform for one [`PlanShape`].
pub trait TransformPlan: Send {
    fn shape(&self) -> PlanShape;

    /// In-place transform. The inverse is unnormalized: forward followed by
    /// inverse scales the input by the element count.
    fn transform(&mut self, data: &mut [Complex32], inverse: bool) -> Result<()>;
}

impl ShapedPlan for Box<dyn TransformPlan> {
    fn plan_shape(&self) -> PlanShape {
        self.shape()
    }
}

/// A pluggable FFT implementation.
pub trait TransformProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Checks that every prerequisite of this provider is available.
    /// Fails with [`VecError::DependencyResolution`] otherwise.
    fn probe(&self) -> Result<()>;

    fn create_plan(&self, shape: PlanShape) -> Result<Box<dyn TransformPlan>>;
}

pub(crate) fn check_len(shape: PlanShape, data: &[Complex32]) -> Result<()> {
    if data.len() != shape.len() {
        return Err(VecError::SizeMismatch {
            expected: shape.len(),
            actual: data.len(),
        });
    }
    Ok(())
}

/// Transforms a unit impulse and checks for the flat spectrum.
pub(crate) fn impulse_self_test(provider: &dyn TransformProvider) -> Result<()> {
    let shape: PlanShape = PlanShape::d1(8)?;
    let mut plan: Box<dyn TransformPlan> = provider.create_plan(shape)?;
    let mut data: Vec<Complex32> = vec![Complex32::new(0.0, 0.0); 8];
    data[0] = Complex32::new(1.0, 0.0);
    plan.transform(&mut data, false)?;
    if data.iter().all(|z| (z.re - 1.0).abs() < 1e-6 && z.im.abs() < 1e-6) {
        Ok(())
    } else {
        Err(VecError::DependencyResolution {
            provider: provider.name(),
            missing: "a working forward transform".to_string(),
        })
    }
}
