//! 32-bit RISC-V guest memory library.
//!
//! This crate implements the memory a simulated RV32 program runs in, with the following:
//! 1. **Address Space:** A fixed-size, zero-initialized byte store mapped at a base virtual
//!    address, with aligned little-endian word access and strict bounds checks.
//! 2. **Loader:** Byte-for-byte image loading with truncation on overflow, ELF and raw binary
//!    section readers, and address space sizing for a program.
//! 3. **Inspector:** Bounded hex dumps and word views for debuggers.
//! 4. **Diagnostics:** An injectable sink receiving every rejected access, truncation and load.
//! 5. **Configuration:** JSON configuration with defaults.

/// Common types and constants (addresses, access kinds, errors).
pub mod common;
/// Configuration (defaults, memory and inspector settings).
pub mod config;
/// Diagnostic events and sinks.
pub mod diag;
/// Hex dumps and word views.
pub mod inspect;
/// Image loading, section readers and layout planning.
pub mod loader;
/// Address space and backing buffer.
pub mod mem;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Error type of every address space operation.
pub use crate::common::MemoryError;
/// Guest memory; construct with `AddressSpace::new`.
pub use crate::mem::AddressSpace;
