use std::fmt;

/// Failure class of a link operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommErrorKind {
    /// Transport failure.
    Comm,
    /// Malformed or unexpected response frame.
    Packet,
    Timeout,
    /// The board rejected the request.
    Board,
    Memory,
    Logging,
}

impl fmt::Display for CommErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &str = match self {
            Self::Comm => "comm",
            Self::Packet => "packet",
            Self::Timeout => "timeout",
            Self::Board => "board",
            Self::Memory => "memory",
            Self::Logging => "logging",
        };
        f.write_str(name)
    }
}

/// Error returned by every [`crate::DeviceLink`] operation: a kind, the
/// numeric code reported by the link layer and a message.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind} error {code}: {message}")]
pub struct CommError {
    pub kind: CommErrorKind,
    pub code: i32,
    pub message: String,
}

impl CommError {
    pub fn new(kind: CommErrorKind, code: i32, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
        }
    }

    /// Whether the connection is unusable after this error. Transport,
    /// framing and timeout failures are; the others can be reported and the
    /// session continued.
    pub fn disconnect_recommended(&self) -> bool {
        matches!(self.kind, CommErrorKind::Comm | CommErrorKind::Packet | CommErrorKind::Timeout)
    }
}

pub type Result<T> = std::result::Result<T, CommError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_kinds() {
        let fatal = [CommErrorKind::Comm, CommErrorKind::Packet, CommErrorKind::Timeout];
        let recoverable = [CommErrorKind::Board, CommErrorKind::Memory, CommErrorKind::Logging];
        for kind in fatal {
            assert!(CommError::new(kind, -1, "x").disconnect_recommended());
        }
        for kind in recoverable {
            assert!(!CommError::new(kind, -1, "x").disconnect_recommended());
        }
    }

    #[test]
    fn display() {
        let err: CommError = CommError::new(CommErrorKind::Timeout, 7, "no reply");
        assert_eq!(err.to_string(), "timeout error 7: no reply");
    }
}
