/// Element kind of a device buffer, as seen by a kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Elem {
    Real,
    /// Interleaved `(re, im)` pairs.
    Cplx,
}

impl Elem {
    /// Number of `f32` words per element.
    #[inline]
    pub fn floats(self) -> usize {
        match self {
            Elem::Real => 1,
            Elem::Cplx => 2,
        }
    }
}

/// Scalar reductions a device computes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reduction {
    /// `<a, a>`
    Norm2,
    /// Sum of all elements.
    Sum,
    /// `<a, b>`, conjugating `a` for complex buffers.
    Dot,
}

/// Real-valued projection of a complex element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Part {
    Real,
    Imag,
    Magnitude,
    /// Argument in radians, `atan2(im, re)`.
    Phase,
}
