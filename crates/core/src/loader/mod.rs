//! Program Image Loading.
//!
//! This module places programs into an address space. It provides:
//! 1. **Image Loading:** Byte-for-byte copies at a load address with truncation on overflow.
//! 2. **Section Readers:** ELF (`.text`/`.data` and entry point) and raw binary files.
//! 3. **Layout Planning:** Sizing an address space for an image, with a stack reserve.
//!
//! A typical ELF session reads the image, plans a layout, creates the space and loads it:
//!
//! ```no_run
//! use std::sync::Arc;
//! use rv32mem_core::diag::TracingSink;
//! use rv32mem_core::loader::{load_program, read_elf, MemoryLayout};
//!
//! # fn main() -> Result<(), rv32mem_core::common::LoaderError> {
//! let image = read_elf("program.elf")?;
//! let layout = MemoryLayout::for_image(&image, 0x1_0000)?;
//! let mut space = layout.create_space(Arc::new(TracingSink))?;
//! let report = load_program(&mut space, &image);
//! assert!(report.is_complete());
//! # Ok(())
//! # }
//! ```

/// Raw binary file reader.
pub mod binary;

/// ELF section reader.
pub mod elf;

/// Copying images into an address space.
pub mod image;

/// Address space sizing for a program image.
pub mod layout;

/// Program image types.
pub mod program;

pub use binary::load_binary;
pub use elf::{parse_elf, read_elf};
pub use image::{LoadReport, ProgramLoadReport, load_image, load_program};
pub use layout::MemoryLayout;
pub use program::{ProgramImage, Section};
