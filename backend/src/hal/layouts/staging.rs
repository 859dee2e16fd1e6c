use crate::{
    alloc_host,
    error::{Result, VecError},
};

/// Bounded host-side transfer buffer shared by every vector of a device.
///
/// Callers hold the owning lock for the whole copy; at most one transfer
/// uses the buffer at a time.
pub struct StagingBuffer {
    data: Vec<f32>,
}

impl StagingBuffer {
    pub fn new(bytes: usize) -> Result<Self> {
        Ok(Self {
            data: alloc_host(bytes / size_of::<f32>())?,
        })
    }

    #[inline]
    pub fn capacity_bytes(&self) -> usize {
        self.data.len() * size_of::<f32>()
    }

    /// Fails with [`VecError::ResourceExhausted`] if `bytes` do not fit.
    pub fn check(&self, bytes: usize) -> Result<()> {
        if bytes > self.capacity_bytes() {
            return Err(VecError::ResourceExhausted {
                resource: "staging buffer",
                requested: bytes,
                available: self.capacity_bytes(),
            });
        }
        Ok(())
    }

    /// Copies `src` into the buffer and returns the staged region.
    pub fn stage_f32(&mut self, src: &[f32]) -> Result<&[f32]> {
        self.check(size_of_val(src))?;
        let region: &mut [f32] = &mut self.data[..src.len()];
        region.copy_from_slice(src);
        Ok(region)
    }

    /// Copies `src` into the buffer and returns the staged region.
    pub fn stage_u16(&mut self, src: &[u16]) -> Result<&[u16]> {
        self.check(size_of_val(src))?;
        let words: &mut [u16] = bytemuck::cast_slice_mut(&mut self.data[..]);
        let region: &mut [u16] = &mut words[..src.len()];
        region.copy_from_slice(src);
        Ok(region)
    }

    /// Returns a writable region of `len` floats for an incoming transfer.
    pub fn region_f32(&mut self, len: usize) -> Result<&mut [f32]> {
        self.check(len * size_of::<f32>())?;
        Ok(&mut self.data[..len])
    }
}

#[cfg(test)]
mod tests {
    use super::StagingBuffer;
    use crate::error::VecError;

    #[test]
    fn oversized_transfer_is_rejected() {
        let mut staging: StagingBuffer = StagingBuffer::new(64).unwrap();
        assert_eq!(staging.capacity_bytes(), 64);
        assert!(staging.stage_f32(&[1.0; 16]).is_ok());
        assert_eq!(
            staging.stage_f32(&[1.0; 17]).unwrap_err(),
            VecError::ResourceExhausted {
                resource: "staging buffer",
                requested: 68,
                available: 64,
            }
        );
    }

    #[test]
    fn u16_staging_packs_two_per_word() {
        let mut staging: StagingBuffer = StagingBuffer::new(16).unwrap();
        let staged: &[u16] = staging.stage_u16(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(staged, &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(staging.stage_u16(&[0; 9]).is_err());
    }
}
