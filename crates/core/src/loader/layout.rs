//! Memory layout planning.
//!
//! Sizes an address space for a program image: the space starts at the lowest section address
//! and ends `stack_size` bytes above the highest section end, where the guest stack lives.

use super::program::{ProgramImage, Section};
use crate::common::constants::ADDRESS_LIMIT;
use crate::common::{LoaderError, MemoryError, VirtAddr, WORD_SIZE};
use crate::diag::SharedSink;
use crate::mem::AddressSpace;

/// Geometry of an address space planned for a program image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryLayout {
    /// Base virtual address (lowest section address, word aligned).
    pub base: VirtAddr,
    /// Size of the space in bytes.
    pub size: usize,
    /// Exclusive top of the stack reserve; equals `base + size`.
    pub stack_top: u64,
}

impl MemoryLayout {
    /// Plans a layout for `image` with `stack_size` bytes of stack above the program.
    ///
    /// # Arguments
    ///
    /// * `image` - Program whose present sections must fit in the space.
    /// * `stack_size` - Bytes reserved above the highest section end.
    ///
    /// # Errors
    ///
    /// [`LoaderError::NoLoadableSections`] if the image has no sections, and
    /// [`LoaderError::Memory`] wrapping [`MemoryError::AddressOverflow`] if the stack top would
    /// pass 4 GiB.
    pub fn for_image(image: &ProgramImage, stack_size: u32) -> Result<Self, LoaderError> {
        let lowest = image
            .sections()
            .map(|s| s.address)
            .min()
            .ok_or(LoaderError::NoLoadableSections)?;
        let highest_end = image.sections().map(Section::end).max().unwrap_or(0);

        let base = lowest.align_down(WORD_SIZE);
        let align = u64::from(WORD_SIZE);
        let stack_top = (highest_end + u64::from(stack_size) + align - 1) & !(align - 1);
        let span = stack_top - u64::from(base.val());

        if stack_top > ADDRESS_LIMIT {
            return Err(MemoryError::AddressOverflow {
                base: base.val(),
                size: usize::try_from(span).unwrap_or(usize::MAX),
            }
            .into());
        }
        let size = usize::try_from(span).map_err(|_| MemoryError::AllocationFailure {
            size: usize::MAX,
        })?;

        tracing::debug!(base = %base, size, stack_top, "planned memory layout");
        Ok(Self {
            base,
            size,
            stack_top,
        })
    }

    /// Initial stack pointer: the last word below the stack top.
    pub const fn initial_sp(&self) -> u32 {
        self.stack_top.saturating_sub(WORD_SIZE as u64) as u32
    }

    /// Creates an address space with this layout.
    ///
    /// # Errors
    ///
    /// Any construction error of [`AddressSpace::with_sink`].
    pub fn create_space(&self, sink: SharedSink) -> Result<AddressSpace, MemoryError> {
        AddressSpace::with_sink(self.size, self.base.val(), sink)
    }
}
