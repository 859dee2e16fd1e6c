use crate::error::{Result, VecError};

/// Which copy of a device-backed vector holds the authoritative data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CoherenceState {
    Synced,
    /// Device buffer is authoritative, host buffer is stale.
    DeviceAuthoritative,
    /// Host buffer is authoritative, device buffer is stale.
    HostAuthoritative,
}

/// Copy needed to bring both sides back in sync.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transfer {
    HostToDevice,
    DeviceToHost,
}

/// Dirty-flag pair of a device-backed vector.
///
/// At most one flag may be set whenever the state is observed. Both set is
/// reported as [`VecError::Consistency`] and never resolved by picking a side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Coherence {
    device_dirty: bool,
    host_dirty: bool,
}

impl Coherence {
    /// State of a freshly allocated vector.
    pub const fn synced() -> Self {
        Self {
            device_dirty: false,
            host_dirty: false,
        }
    }

    #[cfg(test)]
    pub(crate) const fn from_flags(device_dirty: bool, host_dirty: bool) -> Self {
        Self {
            device_dirty,
            host_dirty,
        }
    }

    #[inline]
    pub fn device_dirty(self) -> bool {
        self.device_dirty
    }

    #[inline]
    pub fn host_dirty(self) -> bool {
        self.host_dirty
    }

    pub fn state(self) -> Result<CoherenceState> {
        match (self.device_dirty, self.host_dirty) {
            (false, false) => Ok(CoherenceState::Synced),
            (true, false) => Ok(CoherenceState::DeviceAuthoritative),
            (false, true) => Ok(CoherenceState::HostAuthoritative),
            (true, true) => Err(VecError::consistency(
                "changes occurred to both device and host memory",
            )),
        }
    }

    /// Transfer `make_coherent` has to run, if any.
    pub fn pending_transfer(self) -> Result<Option<Transfer>> {
        Ok(match self.state()? {
            CoherenceState::Synced => None,
            CoherenceState::DeviceAuthoritative => Some(Transfer::DeviceToHost),
            CoherenceState::HostAuthoritative => Some(Transfer::HostToDevice),
        })
    }

    /// A kernel modified the device buffer.
    pub(crate) fn device_written(&mut self) -> Result<()> {
        self.device_dirty = true;
        self.state().map(|_| ())
    }

    /// A kernel replaced the whole device buffer; host-side edits are void.
    pub(crate) fn device_overwritten(&mut self) {
        self.host_dirty = false;
        self.device_dirty = true;
    }

    /// The host buffer was handed out for writing.
    pub(crate) fn host_written(&mut self) -> Result<()> {
        self.host_dirty = true;
        self.state().map(|_| ())
    }

    /// The host buffer is about to be replaced as a whole; device-side
    /// results are void.
    pub(crate) fn host_overwritten(&mut self) {
        self.device_dirty = false;
        self.host_dirty = true;
    }

    /// Host buffer has been copied to the device.
    pub(crate) fn uploaded(&mut self) {
        self.host_dirty = false;
    }

    /// Device buffer has been copied to the host.
    pub(crate) fn downloaded(&mut self) {
        self.device_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::{Coherence, CoherenceState, Transfer};
    use crate::error::VecError;

    #[test]
    fn fresh_is_synced() {
        let c: Coherence = Coherence::synced();
        assert_eq!(c.state(), Ok(CoherenceState::Synced));
        assert_eq!(c.pending_transfer(), Ok(None));
    }

    #[test]
    fn kernel_write_then_download() {
        let mut c: Coherence = Coherence::synced();
        c.device_written().unwrap();
        assert_eq!(c.pending_transfer(), Ok(Some(Transfer::DeviceToHost)));
        c.downloaded();
        assert_eq!(c.state(), Ok(CoherenceState::Synced));
    }

    #[test]
    fn host_write_then_upload() {
        let mut c: Coherence = Coherence::synced();
        c.host_written().unwrap();
        assert_eq!(c.state(), Ok(CoherenceState::HostAuthoritative));
        assert_eq!(c.pending_transfer(), Ok(Some(Transfer::HostToDevice)));
        c.uploaded();
        assert_eq!(c.state(), Ok(CoherenceState::Synced));
    }

    #[test]
    fn both_dirty_is_reported_not_resolved() {
        let c: Coherence = Coherence::from_flags(true, true);
        assert!(matches!(c.state(), Err(VecError::Consistency(_))));
        assert!(matches!(c.pending_transfer(), Err(VecError::Consistency(_))));

        let mut c: Coherence = Coherence::synced();
        c.host_written().unwrap();
        assert!(c.device_written().is_err());
    }

    #[test]
    fn overwrite_discards_host_edits() {
        let mut c: Coherence = Coherence::synced();
        c.host_written().unwrap();
        c.device_overwritten();
        assert_eq!(c.state(), Ok(CoherenceState::DeviceAuthoritative));
    }
}
