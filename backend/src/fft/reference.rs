use num_complex::Complex32;

use crate::{
    error::Result,
    fft::{TransformPlan, TransformProvider, provider::check_len},
    hal::layouts::PlanShape,
    reference::ReferencePlan,
};

/// Portable radix-2 / direct-DFT provider. Always available.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReferenceProvider;

impl TransformPlan for ReferencePlan {
    fn shape(&self) -> PlanShape {
        ReferencePlan::shape(self)
    }

    fn transform(&mut self, data: &mut [Complex32], inverse: bool) -> Result<()> {
        check_len(ReferencePlan::shape(self), data)?;
        self.execute(data, inverse);
        Ok(())
    }
}

impl TransformProvider for ReferenceProvider {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn probe(&self) -> Result<()> {
        Ok(())
    }

    fn create_plan(&self, shape: PlanShape) -> Result<Box<dyn TransformPlan>> {
        Ok(Box::new(ReferencePlan::new(shape)))
    }
}
