//! Program images.
//!
//! A [`ProgramImage`] is what a section reader hands to the image loader: the bytes of the
//! code and data sections with their load addresses, plus the entry point. Either section may
//! be absent.

use crate::common::VirtAddr;

/// Name given to the code section of a raw binary.
pub const TEXT_SECTION: &str = ".text";

/// Name of the initialized data section.
pub const DATA_SECTION: &str = ".data";

/// One loadable section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    /// Section name as found in the image (e.g. `.text`).
    pub name: String,
    /// Guest virtual address the section is loaded at.
    pub address: VirtAddr,
    /// Raw section contents.
    pub bytes: Vec<u8>,
}

impl Section {
    /// Creates a section.
    pub fn new(name: impl Into<String>, address: u32, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            address: VirtAddr::new(address),
            bytes,
        }
    }

    /// Length of the section in bytes.
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the section has no contents.
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Exclusive end address, widened to `u64`.
    pub fn end(&self) -> u64 {
        u64::from(self.address.val()) + self.bytes.len() as u64
    }

    /// Length as a region size. Sections never exceed the 32-bit range once read.
    pub(crate) fn region_size(&self) -> u32 {
        u32::try_from(self.bytes.len()).unwrap_or(u32::MAX)
    }
}

/// Code and data sections of a program, ready to be loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgramImage {
    /// Code section, if present.
    pub text: Option<Section>,
    /// Initialized data section, if present.
    pub data: Option<Section>,
    /// Address of the first instruction.
    pub entry: VirtAddr,
}

impl ProgramImage {
    /// Wraps a flat binary as a code-only image loaded and entered at `load_addr`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rv32mem_core::loader::ProgramImage;
    ///
    /// let image = ProgramImage::from_raw(vec![0x13, 0, 0, 0], 0x8000_0000);
    /// assert_eq!(image.entry.val(), 0x8000_0000);
    /// assert!(image.data.is_none());
    /// ```
    pub fn from_raw(bytes: Vec<u8>, load_addr: u32) -> Self {
        Self {
            text: Some(Section::new(TEXT_SECTION, load_addr, bytes)),
            data: None,
            entry: VirtAddr::new(load_addr),
        }
    }

    /// Present sections, data first (the order they are loaded in).
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.data.iter().chain(self.text.iter())
    }

    /// Returns `true` if neither section is present.
    pub const fn is_empty(&self) -> bool {
        self.text.is_none() && self.data.is_none()
    }
}
