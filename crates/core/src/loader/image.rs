//! Image loading.
//!
//! Copies raw program bytes into a live address space. A copy that would run past the end of
//! the buffer is shortened to fit and reported as a warning; every other failure leaves the
//! space untouched.

use std::fmt;

use super::program::{ProgramImage, Section};
use crate::common::{AccessType, MemoryError, VirtAddr};
use crate::diag::{Diagnostic, DiagnosticKind};
use crate::mem::AddressSpace;

/// Outcome of a successful [`load_image`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadReport {
    /// Address the copy started at.
    pub start: VirtAddr,
    /// Bytes the caller asked to copy.
    pub requested: usize,
    /// Bytes actually copied.
    pub copied: usize,
}

impl LoadReport {
    /// Returns `true` if the copy was shortened to fit the address space.
    pub const fn truncated(&self) -> bool {
        self.copied < self.requested
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} bytes at {}", self.copied, self.requested, self.start)?;
        if self.truncated() {
            f.write_str(" (truncated)")?;
        }
        Ok(())
    }
}

/// Copies `bytes` into `space` starting at virtual address `start_addr`.
///
/// # Arguments
///
/// * `space` - Destination address space.
/// * `bytes` - Image contents; `None` models a missing source.
/// * `start_addr` - Virtual address of the first copied byte.
///
/// # Returns
///
/// A [`LoadReport`]; if the image does not fit, only the bytes up to the end of the space are
/// copied and a [`DiagnosticKind::Truncated`] warning is reported.
///
/// # Errors
///
/// Checks, in order: the space is live ([`MemoryError::NullInstance`]), a source is present
/// ([`MemoryError::NullSource`]), `start_addr` is not below the base
/// ([`MemoryError::BelowBase`]) and the start offset lies inside the buffer
/// ([`MemoryError::OutOfBounds`]). A failing check copies nothing.
///
/// # Examples
///
/// ```
/// use rv32mem_core::loader::load_image;
/// use rv32mem_core::mem::AddressSpace;
///
/// let mut space = AddressSpace::new(1024, 0x10000).unwrap();
/// let report = load_image(&mut space, Some(&[1, 2, 3, 4, 5]), 0x10000 + 1020).unwrap();
/// assert_eq!(report.copied, 4);
/// assert!(report.truncated());
/// ```
pub fn load_image(
    space: &mut AddressSpace,
    bytes: Option<&[u8]>,
    start_addr: u32,
) -> Result<LoadReport, MemoryError> {
    let (offset, bytes) = check_load(space, bytes, start_addr).map_err(|err| space.reject(err))?;

    let available = space.size() - offset;
    let copied = bytes.len().min(available);
    let chunk = &bytes[..copied];

    let written = space
        .buffer_mut()
        .is_some_and(|buf| buf.write_slice(offset, chunk));
    if !written {
        return Err(space.reject(MemoryError::NullInstance));
    }

    let report = LoadReport {
        start: VirtAddr::new(start_addr),
        requested: bytes.len(),
        copied,
    };
    if report.truncated() {
        space.sink().report(&Diagnostic::warning(
            DiagnosticKind::Truncated,
            format!(
                "image of {} bytes at {} truncated to {} bytes to fit address space of {} bytes",
                report.requested,
                report.start,
                report.copied,
                space.size()
            ),
        ));
    } else {
        space.sink().report(&Diagnostic::info(
            DiagnosticKind::Loaded,
            format!("loaded {report}"),
        ));
    }
    tracing::debug!(start = %report.start, offset, copied, requested = report.requested, "image loaded");
    Ok(report)
}

fn check_load<'a>(
    space: &AddressSpace,
    bytes: Option<&'a [u8]>,
    start_addr: u32,
) -> Result<(usize, &'a [u8]), MemoryError> {
    if !space.is_live() {
        return Err(MemoryError::NullInstance);
    }
    let bytes = bytes.ok_or(MemoryError::NullSource)?;
    let offset = VirtAddr::new(start_addr)
        .offset_from(VirtAddr::new(space.base_vaddr()))
        .ok_or_else(|| MemoryError::BelowBase {
            address: start_addr,
            base: space.base_vaddr(),
            access: AccessType::Load,
        })?;
    if offset >= space.size() {
        return Err(MemoryError::OutOfBounds {
            address: start_addr,
            width: bytes.len(),
            size: space.size(),
            access: AccessType::Load,
        });
    }
    Ok((offset, bytes))
}

/// Outcome of [`load_program`], one entry per section.
///
/// An absent section is `None`; a present one carries the result of its [`load_image`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramLoadReport {
    /// Data section load.
    pub data: Option<Result<LoadReport, MemoryError>>,
    /// Text section load.
    pub text: Option<Result<LoadReport, MemoryError>>,
    /// Entry point of the image.
    pub entry: VirtAddr,
}

impl ProgramLoadReport {
    /// Returns `true` if every present section was loaded without truncation.
    pub fn is_complete(&self) -> bool {
        [&self.data, &self.text]
            .into_iter()
            .flatten()
            .all(|res| res.as_ref().is_ok_and(|r| !r.truncated()))
    }

    /// The first error among the section loads, data first.
    pub fn first_error(&self) -> Option<&MemoryError> {
        [&self.data, &self.text]
            .into_iter()
            .flatten()
            .find_map(|res| res.as_ref().err())
    }
}

/// Loads every present section of `image` and records its text and data regions.
///
/// The data section is loaded before the text section. Region metadata is recorded for each
/// present section whether or not its copy succeeded.
pub fn load_program(space: &mut AddressSpace, image: &ProgramImage) -> ProgramLoadReport {
    let data = image.data.as_ref().map(|section| load_section(space, section));
    let text = image.text.as_ref().map(|section| load_section(space, section));

    if let Some(section) = &image.data {
        space.set_data_region(section.address.val(), section.region_size());
    }
    if let Some(section) = &image.text {
        space.set_text_region(section.address.val(), section.region_size());
    }

    ProgramLoadReport {
        data,
        text,
        entry: image.entry,
    }
}

fn load_section(space: &mut AddressSpace, section: &Section) -> Result<LoadReport, MemoryError> {
    tracing::debug!(section = %section.name, address = %section.address, len = section.len(), "loading section");
    load_image(space, Some(section.bytes.as_slice()), section.address.val())
}
