//! ELF section reader.
//!
//! Extracts the `.text` and `.data` sections and the entry point of a 32-bit little-endian
//! RISC-V executable. Sections are located by name; a missing section is left as `None`.

use std::fs;
use std::path::Path;

use object::elf::{ELFCLASS32, ELFDATA2LSB, ELFMAG};
use object::read::elf::ElfFile32;
use object::{Architecture, Endianness, Object, ObjectSection};

use super::program::{DATA_SECTION, ProgramImage, Section, TEXT_SECTION};
use crate::common::constants::ADDRESS_LIMIT;
use crate::common::{LoaderError, VirtAddr};

/// Offset of `EI_CLASS` in `e_ident`.
const EI_CLASS: usize = 4;

/// Offset of `EI_DATA` in `e_ident`.
const EI_DATA: usize = 5;

/// Decodes an in-memory ELF file.
///
/// # Errors
///
/// [`LoaderError::Elf`] for malformed input, [`LoaderError::UnsupportedTarget`] for ELF64,
/// big-endian or non-RISC-V files, and [`LoaderError::SectionOutOfRange`] for a section that
/// does not fit below 4 GiB.
pub fn parse_elf(data: &[u8]) -> Result<ProgramImage, LoaderError> {
    check_ident(data)?;
    let file = ElfFile32::<Endianness>::parse(data)?;

    if file.architecture() != Architecture::Riscv32 {
        return Err(LoaderError::UnsupportedTarget {
            reason: format!("machine is {:?}, expected RISC-V", file.architecture()),
        });
    }

    let entry = u32::try_from(file.entry()).map_err(|_| LoaderError::Elf {
        reason: format!("entry point {:#x} exceeds 32 bits", file.entry()),
    })?;

    let image = ProgramImage {
        text: read_section(&file, TEXT_SECTION)?,
        data: read_section(&file, DATA_SECTION)?,
        entry: VirtAddr::new(entry),
    };
    tracing::debug!(
        entry = %image.entry,
        text = image.text.as_ref().map(Section::len),
        data = image.data.as_ref().map(Section::len),
        "parsed ELF image"
    );
    Ok(image)
}

/// Reads and decodes an ELF file from disk.
///
/// # Errors
///
/// [`LoaderError::Io`] if the file cannot be read, otherwise as [`parse_elf`].
pub fn read_elf(path: impl AsRef<Path>) -> Result<ProgramImage, LoaderError> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_elf(&data)
}

fn check_ident(data: &[u8]) -> Result<(), LoaderError> {
    if !data.starts_with(&ELFMAG) {
        return Err(LoaderError::Elf {
            reason: "missing ELF magic".into(),
        });
    }
    match data.get(EI_CLASS) {
        Some(&ELFCLASS32) => {}
        Some(class) => {
            return Err(LoaderError::UnsupportedTarget {
                reason: format!("ELF class {class}, expected 32-bit"),
            });
        }
        None => {
            return Err(LoaderError::Elf {
                reason: "truncated ELF identification".into(),
            });
        }
    }
    match data.get(EI_DATA) {
        Some(&ELFDATA2LSB) => Ok(()),
        Some(_) => Err(LoaderError::UnsupportedTarget {
            reason: "big-endian ELF, expected little-endian".into(),
        }),
        None => Err(LoaderError::Elf {
            reason: "truncated ELF identification".into(),
        }),
    }
}

fn read_section(file: &ElfFile32<'_, Endianness>, name: &str) -> Result<Option<Section>, LoaderError> {
    let Some(section) = file.section_by_name(name) else {
        tracing::debug!(section = name, "section not present");
        return Ok(None);
    };
    let bytes = section.data()?;
    let address = section.address();
    let size = bytes.len() as u64;

    let start = u32::try_from(address)
        .ok()
        .filter(|&start| u64::from(start) + size <= ADDRESS_LIMIT)
        .ok_or_else(|| LoaderError::SectionOutOfRange {
            name: name.to_owned(),
            address,
            size,
        })?;

    Ok(Some(Section::new(name, start, bytes.to_vec())))
}
