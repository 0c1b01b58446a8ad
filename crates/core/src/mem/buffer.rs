//! Guest Buffer Implementation.
//!
//! This module provides the owned, zero-initialized byte store behind an address space.
//! Allocation is fallible: a host that cannot provide the requested storage yields
//! [`MemoryError::AllocationFailure`] instead of aborting the process. All accessors take
//! host offsets that the caller has already validated; out-of-range offsets return `None`
//! rather than panicking.

use crate::common::MemoryError;

/// Fixed-size, zero-initialized byte buffer.
#[derive(Debug, PartialEq, Eq)]
pub struct GuestBuffer {
    bytes: Box<[u8]>,
}

impl GuestBuffer {
    /// Allocates a zero-filled buffer of `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::AllocationFailure`] if `size` is zero or the host allocator
    /// cannot reserve the storage.
    pub fn try_zeroed(size: usize) -> Result<Self, MemoryError> {
        if size == 0 {
            return Err(MemoryError::AllocationFailure { size });
        }
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(size)
            .map_err(|_| MemoryError::AllocationFailure { size })?;
        bytes.resize(size, 0);
        Ok(Self {
            bytes: bytes.into_boxed_slice(),
        })
    }

    /// Returns a deep copy of the buffer, failing instead of aborting on allocation failure.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::AllocationFailure`] if the copy cannot be allocated.
    pub fn try_clone(&self) -> Result<Self, MemoryError> {
        let size = self.bytes.len();
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(size)
            .map_err(|_| MemoryError::AllocationFailure { size })?;
        bytes.extend_from_slice(&self.bytes);
        Ok(Self {
            bytes: bytes.into_boxed_slice(),
        })
    }

    /// Returns the size of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false`: a buffer is never allocated empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the whole buffer.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Reads `len` bytes starting at `offset`.
    pub fn read_slice(&self, offset: usize, len: usize) -> Option<&[u8]> {
        self.bytes.get(offset..offset.checked_add(len)?)
    }

    /// Copies `data` into the buffer at `offset`.
    ///
    /// # Returns
    ///
    /// `false` (and nothing written) if the range does not fit.
    pub fn write_slice(&mut self, offset: usize, data: &[u8]) -> bool {
        let Some(end) = offset.checked_add(data.len()) else {
            return false;
        };
        let Some(dest) = self.bytes.get_mut(offset..end) else {
            return false;
        };
        dest.copy_from_slice(data);
        true
    }

    /// Reads a little-endian 32-bit word at `offset`.
    pub fn read_u32_le(&self, offset: usize) -> Option<u32> {
        let word: [u8; 4] = self.read_slice(offset, 4)?.try_into().ok()?;
        Some(u32::from_le_bytes(word))
    }

    /// Writes a little-endian 32-bit word at `offset`.
    ///
    /// # Returns
    ///
    /// `false` (and nothing written) if the word does not fit.
    pub fn write_u32_le(&mut self, offset: usize, val: u32) -> bool {
        self.write_slice(offset, &val.to_le_bytes())
    }
}
