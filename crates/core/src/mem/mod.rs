//! Guest Address Space.
//!
//! This module implements the memory the guest program sees. It provides:
//! 1. **Buffer:** Fixed-size, zero-initialized backing storage ([`buffer::GuestBuffer`]).
//! 2. **Address Space:** The buffer mapped at a base virtual address, with aligned word access
//!    and bounds enforcement.
//! 3. **Regions:** Optional text/data metadata for debuggers ([`region::Region`]).
//!
//! An address space is *Live* from construction until [`AddressSpace::destroy`] (or drop);
//! afterwards every operation is rejected with [`MemoryError::NullInstance`]. Rejected
//! operations are reported to the space's [`DiagnosticSink`] and never mutate a byte.

/// Backing byte storage.
pub mod buffer;

/// Text/data region metadata.
pub mod region;

use std::fmt;
use std::sync::Arc;

use self::buffer::GuestBuffer;
use self::region::{Region, RegionKind};
use crate::common::constants::ADDRESS_LIMIT;
use crate::common::{AccessType, MemoryError, VirtAddr, WORD_SIZE};
use crate::diag::{Diagnostic, DiagnosticKind, DiagnosticSink, SharedSink, TracingSink};

/// A fixed-size byte store mapped at a base virtual address.
///
/// Virtual address `A` maps to buffer offset `A - base_vaddr`; words are little-endian.
/// The value is move-only: the buffer is released exactly once, by [`destroy`](Self::destroy)
/// or on drop. Use [`try_clone`](Self::try_clone) for an explicit deep copy.
pub struct AddressSpace {
    /// Backing storage; `None` once destroyed.
    buffer: Option<GuestBuffer>,
    /// Size in bytes, fixed at construction.
    size: usize,
    /// Virtual address of `buffer[0]`.
    base_vaddr: u32,
    text_region: Option<Region>,
    data_region: Option<Region>,
    sink: SharedSink,
}

impl AddressSpace {
    /// Creates an address space that reports diagnostics through `tracing`.
    ///
    /// # Arguments
    ///
    /// * `size` - Size of the space in bytes; must be non-zero.
    /// * `base_vaddr` - Virtual address of the first byte; must be 4-byte aligned.
    ///
    /// # Errors
    ///
    /// [`MemoryError::AllocationFailure`] for a zero size or a failed allocation,
    /// [`MemoryError::MisalignedBase`] for an unaligned base, and
    /// [`MemoryError::AddressOverflow`] if the space would extend past 4 GiB.
    pub fn new(size: usize, base_vaddr: u32) -> Result<Self, MemoryError> {
        Self::with_sink(size, base_vaddr, Arc::new(TracingSink))
    }

    /// Creates an address space at virtual address 0.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn absolute(size: usize) -> Result<Self, MemoryError> {
        Self::new(size, 0)
    }

    /// Creates an address space that reports diagnostics to `sink`.
    ///
    /// A failed construction is reported to `sink` as well.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_sink(size: usize, base_vaddr: u32, sink: SharedSink) -> Result<Self, MemoryError> {
        let buffer = Self::allocate(size, base_vaddr).map_err(|err| {
            sink.report(&Diagnostic::error(&err));
            err
        })?;
        tracing::debug!(size, base = base_vaddr, "address space created");
        Ok(Self {
            buffer: Some(buffer),
            size,
            base_vaddr,
            text_region: None,
            data_region: None,
            sink,
        })
    }

    fn allocate(size: usize, base_vaddr: u32) -> Result<GuestBuffer, MemoryError> {
        if size == 0 {
            return Err(MemoryError::AllocationFailure { size });
        }
        if !VirtAddr::new(base_vaddr).is_aligned(WORD_SIZE) {
            return Err(MemoryError::MisalignedBase { base: base_vaddr });
        }
        if base_vaddr as u64 + size as u64 > ADDRESS_LIMIT {
            return Err(MemoryError::AddressOverflow {
                base: base_vaddr,
                size,
            });
        }
        GuestBuffer::try_zeroed(size)
    }

    /// Releases the buffer and moves the space to the *Destroyed* state.
    ///
    /// # Returns
    ///
    /// `true` if the buffer was released by this call, `false` if it was already destroyed.
    pub fn destroy(&mut self) -> bool {
        let released = self.buffer.take().is_some();
        if released {
            tracing::debug!(size = self.size, base = self.base_vaddr, "address space destroyed");
        }
        released
    }

    /// Returns `true` until the space is destroyed.
    pub const fn is_live(&self) -> bool {
        self.buffer.is_some()
    }

    /// Size of the space in bytes.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Virtual address of the first byte.
    pub const fn base_vaddr(&self) -> u32 {
        self.base_vaddr
    }

    /// Exclusive end virtual address (may equal 2^32).
    pub const fn end_vaddr(&self) -> u64 {
        self.base_vaddr as u64 + self.size as u64
    }

    /// Returns `true` if an access of `width` bytes at `address` is inside the space.
    ///
    /// Alignment is not considered.
    pub const fn contains(&self, address: u32, width: usize) -> bool {
        address >= self.base_vaddr && address as u64 + width as u64 <= self.end_vaddr()
    }

    /// Read-only view of the whole buffer; `None` once destroyed.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.buffer.as_ref().map(GuestBuffer::as_slice)
    }

    /// The sink diagnostics are reported to.
    pub fn sink(&self) -> &dyn DiagnosticSink {
        self.sink.as_ref()
    }

    /// Reads a little-endian 32-bit word.
    ///
    /// # Errors
    ///
    /// Checks, in order: the space is live, `address` is 4-byte aligned, `address` is not
    /// below the base, and the word fits in the buffer. The first failing check is reported
    /// and returned; no error is ever returned as a memory value.
    pub fn read_word(&self, address: u32) -> Result<u32, MemoryError> {
        let offset = self
            .check_word(address, AccessType::Read)
            .map_err(|err| self.reject(err))?;
        self.buffer
            .as_ref()
            .and_then(|buf| buf.read_u32_le(offset))
            .ok_or_else(|| self.reject(MemoryError::NullInstance))
    }

    /// Writes a 32-bit word in little-endian byte order.
    ///
    /// # Errors
    ///
    /// Same checks as [`read_word`](Self::read_word). A rejected write leaves every byte
    /// unchanged.
    pub fn write_word(&mut self, address: u32, value: u32) -> Result<(), MemoryError> {
        let offset = self
            .check_word(address, AccessType::Write)
            .map_err(|err| self.reject(err))?;
        let written = self
            .buffer
            .as_mut()
            .is_some_and(|buf| buf.write_u32_le(offset, value));
        if written {
            Ok(())
        } else {
            Err(self.reject(MemoryError::NullInstance))
        }
    }

    /// Validates a word access without reporting, returning the buffer offset.
    pub(crate) fn check_word(&self, address: u32, access: AccessType) -> Result<usize, MemoryError> {
        if self.buffer.is_none() {
            return Err(MemoryError::NullInstance);
        }
        if !VirtAddr::new(address).is_aligned(WORD_SIZE) {
            return Err(MemoryError::UnalignedAccess {
                address,
                alignment: WORD_SIZE,
                access,
            });
        }
        let offset = VirtAddr::new(address)
            .offset_from(VirtAddr::new(self.base_vaddr))
            .ok_or_else(|| MemoryError::BelowBase {
                address,
                base: self.base_vaddr,
                access,
            })?;
        if offset
            .checked_add(WORD_SIZE as usize)
            .is_none_or(|end| end > self.size)
        {
            return Err(MemoryError::OutOfBounds {
                address,
                width: WORD_SIZE as usize,
                size: self.size,
                access,
            });
        }
        Ok(offset)
    }

    /// Reports `err` to the sink and hands it back for propagation.
    pub(crate) fn reject(&self, err: MemoryError) -> MemoryError {
        self.sink.report(&Diagnostic::error(&err));
        err
    }

    /// Mutable access to the live buffer, for the image loader.
    pub(crate) const fn buffer_mut(&mut self) -> Option<&mut GuestBuffer> {
        self.buffer.as_mut()
    }

    /// Code section metadata, if set.
    pub const fn text_region(&self) -> Option<Region> {
        self.text_region
    }

    /// Data section metadata, if set.
    pub const fn data_region(&self) -> Option<Region> {
        self.data_region
    }

    /// Records the code section. Last write wins.
    ///
    /// The region is not validated against the buffer; a region extending outside the space
    /// is accepted and reported as a warning.
    pub fn set_text_region(&mut self, base: u32, size: u32) {
        self.text_region = Some(self.checked_region(RegionKind::Text, base, size));
    }

    /// Records the data section. Last write wins; see [`set_text_region`](Self::set_text_region).
    pub fn set_data_region(&mut self, base: u32, size: u32) {
        self.data_region = Some(self.checked_region(RegionKind::Data, base, size));
    }

    fn checked_region(&self, kind: RegionKind, base: u32, size: u32) -> Region {
        let region = Region::new(base, size);
        if !region.fits_within(self.base_vaddr, self.size) {
            self.sink.report(&Diagnostic::warning(
                DiagnosticKind::RegionOutsideSpace,
                format!(
                    "{kind} region {region} extends outside address space [{:#010x}, {:#010x})",
                    self.base_vaddr,
                    self.end_vaddr()
                ),
            ));
        }
        region
    }

    /// Which recorded region, if any, contains `address`. Text takes precedence on overlap.
    pub fn region_at(&self, address: u32) -> Option<RegionKind> {
        if self.text_region.is_some_and(|r| r.contains(address)) {
            Some(RegionKind::Text)
        } else if self.data_region.is_some_and(|r| r.contains(address)) {
            Some(RegionKind::Data)
        } else {
            None
        }
    }

    /// Deep copy of a live space, sharing the same sink.
    ///
    /// # Errors
    ///
    /// [`MemoryError::NullInstance`] if the space is destroyed, or
    /// [`MemoryError::AllocationFailure`] if the copy cannot be allocated.
    pub fn try_clone(&self) -> Result<Self, MemoryError> {
        let buffer = self
            .buffer
            .as_ref()
            .ok_or(MemoryError::NullInstance)
            .and_then(GuestBuffer::try_clone)
            .map_err(|err| self.reject(err))?;
        Ok(Self {
            buffer: Some(buffer),
            size: self.size,
            base_vaddr: self.base_vaddr,
            text_region: self.text_region,
            data_region: self.data_region,
            sink: Arc::clone(&self.sink),
        })
    }
}

impl fmt::Debug for AddressSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressSpace")
            .field("live", &self.is_live())
            .field("size", &self.size)
            .field("base_vaddr", &format_args!("{:#010x}", self.base_vaddr))
            .field("text_region", &self.text_region)
            .field("data_region", &self.data_region)
            .finish_non_exhaustive()
    }
}
