use crate::{
    error::Result,
    hal::layouts::{BackendTag, CoherenceState},
};

pub trait VectorInfos {
    /// Number of elements (complex elements for complex vectors).
    fn vector_size(&self) -> usize;

    fn backend_tag(&self) -> BackendTag;
}

/// Host/device coherence of a vector.
pub trait Coherent {
    /// Brings host and device copies in sync. Omitting this call never
    /// changes results, only when copies happen.
    ///
    /// Fails with [`crate::VecError::Consistency`] if both sides are dirty.
    fn make_coherent(&self) -> Result<()>;

    /// `None` for host-only vectors.
    fn coherence_state(&self) -> Result<Option<CoherenceState>>;
}

/// In-place FFT over all axes of a complex vector.
pub trait FourierTransform {
    /// The inverse transform is unnormalized.
    fn fft(&mut self, inverse: bool) -> Result<()>;
}
