//! Common types shared across the address space, loader and inspector.
//!
//! This module provides the small vocabulary every other module speaks. It includes:
//! 1. **Address Types:** A strong type for 32-bit guest virtual addresses.
//! 2. **Constants:** Word size, dump geometry and layout defaults.
//! 3. **Access Kinds:** Classification of the operation that touched memory.
//! 4. **Error Handling:** Memory and loader error enums.

/// Guest virtual address type.
pub mod addr;

/// Constants used throughout the crate.
pub mod constants;

/// Memory access classification.
pub mod data;

/// Error types for memory access and image loading.
pub mod error;

pub use addr::VirtAddr;
pub use constants::WORD_SIZE;
pub use data::AccessType;
pub use error::{LoaderError, MemoryError};
