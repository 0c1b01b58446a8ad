//! Memory and loader error definitions.
//!
//! This module defines the error handling for the crate. It provides:
//! 1. **Memory Errors:** Every way a construction, word access, image load or inspection can be
//!    rejected. A rejected call never mutates the address space.
//! 2. **Loader Errors:** Failures reading program images from disk or decoding ELF files.
//!
//! Whether a rejected guest access halts the simulation, raises a trap or is only logged is
//! decided by the execution engine; these types only describe what went wrong.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::data::AccessType;

/// Reasons an address space operation was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// Operation on an address space that has been destroyed.
    #[error("address space is not initialized or has been destroyed")]
    NullInstance,

    /// Backing storage could not be obtained (zero size or host allocation failure).
    #[error("cannot allocate an address space of {size} bytes")]
    AllocationFailure {
        /// Requested size in bytes.
        size: usize,
    },

    /// Base virtual address is not word aligned.
    #[error("base address {base:#010x} is not 4-byte aligned")]
    MisalignedBase {
        /// Requested base address.
        base: u32,
    },

    /// `base + size` does not fit in the 32-bit guest address range.
    #[error("{size} bytes at base {base:#010x} exceed the 32-bit address range")]
    AddressOverflow {
        /// Requested base address.
        base: u32,
        /// Requested size in bytes.
        size: usize,
    },

    /// Word access at an address that is not a multiple of 4.
    #[error("{access} at {address:#010x} is not aligned to {alignment} bytes")]
    UnalignedAccess {
        /// Faulting address.
        address: u32,
        /// Required alignment in bytes.
        alignment: u32,
        /// Operation that was rejected.
        access: AccessType,
    },

    /// Address lies below the base virtual address.
    #[error("{access} at {address:#010x} is below base address {base:#010x}")]
    BelowBase {
        /// Faulting address.
        address: u32,
        /// Base virtual address of the space.
        base: u32,
        /// Operation that was rejected.
        access: AccessType,
    },

    /// Access would run past the end of the buffer.
    #[error("{access} of {width} bytes at {address:#010x} exceeds address space of {size} bytes")]
    OutOfBounds {
        /// Faulting address.
        address: u32,
        /// Width of the access in bytes.
        width: usize,
        /// Size of the address space in bytes.
        size: usize,
        /// Operation that was rejected.
        access: AccessType,
    },

    /// Image load called without a byte source.
    #[error("image source is absent")]
    NullSource,
}

impl MemoryError {
    /// Returns the access type of an access error, if the error describes one.
    pub const fn access(&self) -> Option<AccessType> {
        match self {
            Self::UnalignedAccess { access, .. }
            | Self::BelowBase { access, .. }
            | Self::OutOfBounds { access, .. } => Some(*access),
            _ => None,
        }
    }

    /// Returns the faulting guest address, if the error describes one.
    pub const fn address(&self) -> Option<u32> {
        match self {
            Self::UnalignedAccess { address, .. }
            | Self::BelowBase { address, .. }
            | Self::OutOfBounds { address, .. } => Some(*address),
            _ => None,
        }
    }
}

/// Failures while reading or decoding a program image.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The image file could not be read.
    #[error("could not read '{}': {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The input is not a well-formed ELF file.
    #[error("malformed ELF image: {reason}")]
    Elf {
        /// Decoder message.
        reason: String,
    },

    /// The ELF file is not a 32-bit little-endian RISC-V executable.
    #[error("unsupported ELF target: {reason}")]
    UnsupportedTarget {
        /// What did not match.
        reason: String,
    },

    /// A section does not fit in the 32-bit guest address range.
    #[error("section {name} ({size} bytes at {address:#x}) lies outside the 32-bit address range")]
    SectionOutOfRange {
        /// Section name.
        name: String,
        /// Section load address as stored in the file.
        address: u64,
        /// Section size in bytes.
        size: u64,
    },

    /// The image has no section to size an address space from.
    #[error("program image has no loadable sections")]
    NoLoadableSections,

    /// The planned address space could not be created.
    #[error(transparent)]
    Memory(#[from] MemoryError),
}

impl From<object::read::Error> for LoaderError {
    fn from(err: object::read::Error) -> Self {
        Self::Elf {
            reason: err.to_string(),
        }
    }
}
