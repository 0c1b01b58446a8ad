//! Guest virtual address type.
//!
//! The guest is a 32-bit machine, so every virtual address fits in a `u32`. Host-side
//! offsets into the backing buffer are `usize`; this type is the boundary between the two.
//! It provides:
//! 1. **Type Safety:** Keeps guest addresses apart from host buffer offsets.
//! 2. **Alignment Helpers:** Word alignment checks and rounding down used by the layout planner
//!    and inspector.
//! 3. **Relocation:** Translation of an address into an offset relative to a base.

use std::fmt;

/// A virtual address in the 32-bit guest address space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtAddr(pub u32);

impl VirtAddr {
    /// Creates a new virtual address from a raw 32-bit value.
    #[inline(always)]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    /// Returns the raw 32-bit address value.
    #[inline(always)]
    pub const fn val(self) -> u32 {
        self.0
    }

    /// Returns `true` if the address is a multiple of `align`.
    ///
    /// # Arguments
    ///
    /// * `align` - Alignment in bytes; must be a power of two.
    #[inline(always)]
    pub const fn is_aligned(self, align: u32) -> bool {
        self.0 & (align - 1) == 0
    }

    /// Rounds the address down to a multiple of `align` (a power of two).
    #[must_use]
    pub const fn align_down(self, align: u32) -> Self {
        Self(self.0 & !(align - 1))
    }

    /// Returns the byte offset of this address relative to `base`.
    ///
    /// # Returns
    ///
    /// `None` when the address lies below `base`.
    #[inline(always)]
    pub fn offset_from(self, base: Self) -> Option<usize> {
        self.0.checked_sub(base.0).map(|off| off as usize)
    }

    /// Adds a byte count, returning `None` on 32-bit overflow.
    pub fn checked_add(self, bytes: u32) -> Option<Self> {
        self.0.checked_add(bytes).map(Self)
    }
}

impl From<u32> for VirtAddr {
    fn from(addr: u32) -> Self {
        Self(addr)
    }
}

impl From<VirtAddr> for u32 {
    fn from(addr: VirtAddr) -> Self {
        addr.0
    }
}

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl fmt::LowerHex for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}
