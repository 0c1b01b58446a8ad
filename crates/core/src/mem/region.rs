//! Section region metadata.
//!
//! Text and data regions are bookkeeping for debuggers: they say which part of the address
//! space holds code and which holds initialized data. They never restrict accesses.

use std::fmt;

use crate::common::VirtAddr;

/// Which program section a region describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegionKind {
    /// Executable code (`.text`).
    Text,
    /// Initialized data (`.data`).
    Data,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Data => "data",
        })
    }
}

/// A `(base, size)` range of guest addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    /// First address of the region.
    pub base: VirtAddr,
    /// Length of the region in bytes.
    pub size: u32,
}

impl Region {
    /// Creates a region.
    pub const fn new(base: u32, size: u32) -> Self {
        Self {
            base: VirtAddr::new(base),
            size,
        }
    }

    /// Exclusive end address, widened so a region ending at 4 GiB is representable.
    pub const fn end(&self) -> u64 {
        self.base.val() as u64 + self.size as u64
    }

    /// Returns `true` if `address` lies inside the region.
    pub const fn contains(&self, address: u32) -> bool {
        address >= self.base.val() && (address as u64) < self.end()
    }

    /// Returns `true` if the region lies entirely within `[space_base, space_base + space_size)`.
    pub const fn fits_within(&self, space_base: u32, space_size: usize) -> bool {
        self.base.val() >= space_base && self.end() <= space_base as u64 + space_size as u64
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {:#010x})", self.base, self.end())
    }
}
