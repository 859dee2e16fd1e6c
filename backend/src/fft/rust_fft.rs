#[cfg(feature = "rustfft")]
use std::sync::Arc;

use num_complex::Complex32;
#[cfg(feature = "rustfft")]
use rustfft::{Fft, FftDirection, FftPlanner};

#[cfg(feature = "rustfft")]
use crate::{fft::provider::check_len, reference::for_each_line};
use crate::{
    error::Result,
    fft::{TransformPlan, TransformProvider},
    hal::layouts::PlanShape,
};

/// Provider backed by the `rustfft` planner.
#[derive(Clone, Copy, Debug, Default)]
pub struct RustFftProvider;

#[cfg(feature = "rustfft")]
struct Axis {
    stride: usize,
    fwd: Arc<dyn Fft<f32>>,
    inv: Arc<dyn Fft<f32>>,
}

/// Separable multi-dimensional transform, one rustfft instance per axis.
#[cfg(feature = "rustfft")]
pub struct RustFftPlan {
    shape: PlanShape,
    axes: Vec<Axis>,
    line: Vec<Complex32>,
    scratch: Vec<Complex32>,
}

#[cfg(feature = "rustfft")]
impl RustFftPlan {
    fn new(shape: PlanShape) -> Self {
        let mut planner: FftPlanner<f32> = FftPlanner::new();
        let mut axes: Vec<Axis> = Vec::new();
        let mut stride: usize = 1;
        let mut scratch_len: usize = 0;
        for n in shape.axes() {
            if n > 1 {
                let fwd: Arc<dyn Fft<f32>> = planner.plan_fft(n, FftDirection::Forward);
                let inv: Arc<dyn Fft<f32>> = planner.plan_fft(n, FftDirection::Inverse);
                scratch_len = scratch_len
                    .max(fwd.get_inplace_scratch_len())
                    .max(inv.get_inplace_scratch_len());
                axes.push(Axis { stride, fwd, inv });
            }
            stride *= n;
        }
        let max_axis: usize = shape.axes().into_iter().max().unwrap_or(1);
        Self {
            shape,
            axes,
            line: vec![Complex32::new(0.0, 0.0); max_axis],
            scratch: vec![Complex32::new(0.0, 0.0); scratch_len],
        }
    }
}

#[cfg(feature = "rustfft")]
impl TransformPlan for RustFftPlan {
    fn shape(&self) -> PlanShape {
        self.shape
    }

    fn transform(&mut self, data: &mut [Complex32], inverse: bool) -> Result<()> {
        check_len(self.shape, data)?;
        let total: usize = data.len();
        for axis in &self.axes {
            let fft: &Arc<dyn Fft<f32>> = if inverse { &axis.inv } else { &axis.fwd };
            let n: usize = fft.len();
            if axis.stride == 1 {
                fft.process_with_scratch(data, &mut self.scratch);
                continue;
            }
            let line: &mut [Complex32] = &mut self.line[..n];
            let scratch: &mut [Complex32] = &mut self.scratch;
            for_each_line(total, n, axis.stride, |start| {
                for i in 0..n {
                    line[i] = data[start + i * axis.stride];
                }
                fft.process_with_scratch(line, scratch);
                for i in 0..n {
                    data[start + i * axis.stride] = line[i];
                }
            });
        }
        Ok(())
    }
}

impl TransformProvider for RustFftProvider {
    fn name(&self) -> &'static str {
        "rustfft"
    }

    #[cfg(feature = "rustfft")]
    fn probe(&self) -> Result<()> {
        crate::fft::provider::impulse_self_test(self)
    }

    #[cfg(not(feature = "rustfft"))]
    fn probe(&self) -> Result<()> {
        Err(unavailable())
    }

    #[cfg(feature = "rustfft")]
    fn create_plan(&self, shape: PlanShape) -> Result<Box<dyn TransformPlan>> {
        Ok(Box::new(RustFftPlan::new(shape)))
    }

    #[cfg(not(feature = "rustfft"))]
    fn create_plan(&self, _shape: PlanShape) -> Result<Box<dyn TransformPlan>> {
        Err(unavailable())
    }
}

#[cfg(not(feature = "rustfft"))]
fn unavailable() -> crate::error::VecError {
    crate::error::VecError::DependencyResolution {
        provider: "rustfft",
        missing: "cargo feature `rustfft`".to_string(),
    }
}

#[cfg(all(test, feature = "rustfft"))]
mod tests {
    use num_complex::Complex32;

    use super::RustFftProvider;
    use crate::{
        fft::{ReferenceProvider, TransformPlan, TransformProvider},
        hal::layouts::PlanShape,
    };

    #[test]
    fn agrees_with_reference_in_3d() {
        let shape: PlanShape = PlanShape::d3(4, 6, 2).unwrap();
        let input: Vec<Complex32> = (0..shape.len())
            .map(|i| Complex32::new((i % 5) as f32, (i % 3) as f32 - 1.0))
            .collect();
        let mut a: Vec<Complex32> = input.clone();
        let mut b: Vec<Complex32> = input;
        let mut fast: Box<dyn TransformPlan> = RustFftProvider.create_plan(shape).unwrap();
        let mut slow: Box<dyn TransformPlan> = ReferenceProvider.create_plan(shape).unwrap();
        fast.transform(&mut a, false).unwrap();
        slow.transform(&mut b, false).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).norm() < 1e-3, "{x} != {y}");
        }
        assert!(RustFftProvider.probe().is_ok());
    }
}
