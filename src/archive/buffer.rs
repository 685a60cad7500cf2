use crate::error::{PackError, Result};

/// Reusable byte buffer for staging item payloads.
///
/// Grows to exactly the requested size and never shrinks. Bytes past what
/// the current caller wrote are whatever an earlier item left behind, so the
/// logical length always comes from the item's record, never from here.
#[derive(Debug, Default)]
pub struct StagingBuffer {
    bytes: Vec<u8>,
}

impl StagingBuffer {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Pre-allocate `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut buffer = Self::new();
        buffer.ensure_capacity(capacity)?;
        Ok(buffer)
    }

    /// Grow to at least `required` bytes and return the first `required`
    pub fn ensure_capacity(&mut self, required: usize) -> Result<&mut [u8]> {
        if required > self.bytes.len() {
            let additional = required - self.bytes.len();
            self.bytes
                .try_reserve_exact(additional)
                .map_err(|e| PackError::allocation(required, e))?;
            self.bytes.resize(required, 0);
        }
        Ok(&mut self.bytes[..required])
    }

    /// First `len` bytes. Panics if `len` exceeds the current capacity.
    pub fn as_slice(&self, len: usize) -> &[u8] {
        &self.bytes[..len]
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Free the backing memory
    pub fn release(&mut self) {
        self.bytes = Vec::new();
    }
}
