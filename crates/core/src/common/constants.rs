//! Global Constants.
//!
//! This module defines constants used across the crate. It includes:
//! 1. **Access Constants:** Word width and the 32-bit address range limit.
//! 2. **Layout Constants:** Stack reserve placed above a loaded program.
//! 3. **Inspection Constants:** Geometry of a memory dump line.

/// Size of a guest word in bytes.
pub const WORD_SIZE: u32 = 4;

/// Number of addressable bytes in a 32-bit guest (exclusive upper bound of any address space).
pub const ADDRESS_LIMIT: u64 = 1 << 32;

/// Stack reserve placed above the highest loaded section (64 KiB).
pub const DEFAULT_STACK_SIZE: u32 = 0x1_0000;

/// Bytes rendered on a single dump line.
pub const BYTES_PER_LINE: usize = 16;

/// Bytes per visual group within a dump line.
pub const BYTES_PER_GROUP: usize = WORD_SIZE as usize;
