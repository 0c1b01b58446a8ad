//! Memory Access Types.
//!
//! This module classifies the operation that touched guest memory. The classification is
//! carried in every access error; the execution engine maps it to a load or store access fault.

use std::fmt;

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessType {
    /// Word read issued by the execution engine (instruction fetch or load).
    Read,

    /// Word write issued by the execution engine (store).
    Write,

    /// Byte copy of a program image into the address space.
    Load,

    /// Read-only inspection by a debugger or dump.
    Inspect,
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Load => "image load",
            Self::Inspect => "inspect",
        })
    }
}
