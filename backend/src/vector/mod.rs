//! User-facing vector types.
//!
//! Each vector owns a host buffer and, when created on a device, a device
//! buffer plus the dirty flags tracking which copy is authoritative. The
//! presence of that device half is the backend tag: operations whose
//! operands all live on the vector's device run native kernels, all other
//! combinations run the [`crate::reference`] kernels on host buffers.

mod buffer;
mod cplx;
mod cplx2d;
mod cplx3d;
mod real;

pub(crate) use buffer::{Buffer, Route};
pub use cplx::CplxVec;
pub use cplx2d::CplxVec2d;
pub use cplx3d::CplxVec3d;
pub use real::RealVec;

pub use crate::hal::layouts::Part;

use std::fmt::Display;

use itertools::Itertools;

use crate::error::{Result, VecError};

pub(crate) fn check_index(i: usize, n: usize) -> Result<()> {
    if i >= n {
        return Err(VecError::OutOfBounds {
            what: "element",
            index: i,
            limit: n,
        });
    }
    Ok(())
}

pub(crate) fn check_coord(what: &'static str, i: usize, n: usize) -> Result<()> {
    if i >= n {
        return Err(VecError::OutOfBounds { what, index: i, limit: n });
    }
    Ok(())
}

/// Product of `factors` as a word count, or
/// [`VecError::ResourceExhausted`] if the words or their bytes overflow `usize`.
pub(crate) fn checked_words(factors: &[usize]) -> Result<usize> {
    factors
        .iter()
        .try_fold(1usize, |acc, f| acc.checked_mul(*f))
        .filter(|words| words.checked_mul(size_of::<f32>()).is_some())
        .ok_or(VecError::ResourceExhausted {
            resource: "vector storage",
            requested: usize::MAX,
            available: 0,
        })
}

pub(crate) fn format_first_10<T: Display>(it: impl Iterator<Item = T>) -> String {
    it.take(10).join(", ")
}

#[cfg(test)]
mod tests {
    use super::checked_words;
    use crate::error::VecError;

    #[test]
    fn word_counts_overflow_into_resource_errors() {
        assert_eq!(checked_words(&[3, 4, 5]).unwrap(), 60);
        assert_eq!(checked_words(&[0, usize::MAX]).unwrap(), 0);
        assert!(matches!(checked_words(&[usize::MAX / 2]), Err(VecError::ResourceExhausted { .. })));
        assert!(matches!(checked_words(&[1 << 62, 2]), Err(VecError::ResourceExhausted { .. })));
        assert!(matches!(checked_words(&[3, 1 << 63]), Err(VecError::ResourceExhausted { .. })));
    }
}
