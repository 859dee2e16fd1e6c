use std::fmt;

use crate::error::{Result, VecError};

/// Shape key of an FFT plan: rank plus `width x height x depth` in complex
/// elements. Unused axes are 1.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlanShape {
    rank: u8,
    width: usize,
    height: usize,
    depth: usize,
}

impl PlanShape {
    pub fn d1(n: usize) -> Result<Self> {
        Self::new(1, n, 1, 1)
    }

    pub fn d2(width: usize, height: usize) -> Result<Self> {
        Self::new(2, width, height, 1)
    }

    pub fn d3(width: usize, height: usize, depth: usize) -> Result<Self> {
        Self::new(3, width, height, depth)
    }

    fn new(rank: u8, width: usize, height: usize, depth: usize) -> Result<Self> {
        if width == 0 || height == 0 || depth == 0 {
            return Err(VecError::InvalidShape(format!(
                "{width}x{height}x{depth} has an empty axis"
            )));
        }
        Ok(Self {
            rank,
            width,
            height,
            depth,
        })
    }

    #[inline]
    pub fn rank(&self) -> u8 {
        self.rank
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

    /// Axis lengths, fastest-varying first.
    #[inline]
    pub fn axes(&self) -> [usize; 3] {
        [self.width, self.height, self.depth]
    }

    /// Number of complex elements a buffer of this shape holds.
    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height * self.depth
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for PlanShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rank {
            1 => write!(f, "PlanShape({})", self.width),
            2 => write!(f, "PlanShape({}x{})", self.width, self.height),
            _ => write!(f, "PlanShape({}x{}x{})", self.width, self.height, self.depth),
        }
    }
}
