//! Error types for vector, device and transform operations.

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, VecError>;

/// Errors surfaced by the vector engine.
///
/// Size, consistency and resource errors abort the current operation and are
/// never swallowed. [`VecError::DependencyResolution`] is only ever returned
/// from a provider probe; the registry logs it and moves on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VecError {
    /// Operand vectors disagree in length.
    #[error("vector size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Internal invariant broken: both coherence flags set, or operands
    /// from incompatible device contexts.
    #[error("consistency violation: {0}")]
    Consistency(String),

    /// Allocation of a vector, staging transfer or plan failed.
    #[error("{resource} exhausted: requested {requested} bytes, available {available} bytes")]
    ResourceExhausted {
        resource: &'static str,
        requested: usize,
        available: usize,
    },

    /// Capability not provided by the backend the vector is bound to.
    #[error("not supported: {0}")]
    Unsupported(&'static str),

    /// A transform provider cannot run because a prerequisite is missing.
    #[error("transform provider '{provider}' unavailable: missing {missing}")]
    DependencyResolution { provider: &'static str, missing: String },

    /// Every registered transform provider failed its probe.
    #[error("no transform provider available")]
    NoTransformProvider,

    /// Requested vector size is not a positive element count.
    #[error("invalid vector size: {0}")]
    InvalidSize(usize),

    /// Invalid transform shape (zero-sized axis or unsupported rank).
    #[error("invalid transform shape: {0}")]
    InvalidShape(String),

    /// Spatial placement or element index outside the destination.
    #[error("out of bounds: {what} {index} exceeds {limit}")]
    OutOfBounds {
        what: &'static str,
        index: usize,
        limit: usize,
    },

    /// Operation requires a square 2D vector.
    #[error("vector is not square: {width}x{height}")]
    NotSquare { width: usize, height: usize },

    /// The accelerator stopped accepting commands.
    #[error("device '{0}' lost")]
    DeviceLost(String),
}

impl VecError {
    pub fn consistency(msg: impl Into<String>) -> Self {
        Self::Consistency(msg.into())
    }

    /// Returns `true` for errors that indicate a bug rather than a caller
    /// or environment problem.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Consistency(_))
    }
}

/// Checks that every operand length equals `expected`.
pub(crate) fn check_sizes<I>(expected: usize, actual: I) -> Result<()>
where
    I: IntoIterator<Item = usize>,
{
    for actual in actual {
        if actual != expected {
            return Err(VecError::SizeMismatch { expected, actual });
        }
    }
    Ok(())
}
