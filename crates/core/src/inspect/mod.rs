//! Memory Inspection.
//!
//! Read-only views of an address space for debuggers and the command-line front end. It
//! provides:
//! 1. **Hex Dump:** [`dump`] renders a clamped address range as 16-byte lines with an ASCII
//!    gutter, stopping after a line cap.
//! 2. **Word View:** [`word_rows`] lists aligned words with per-word errors.
//!
//! Inspection never mutates the space and never reads outside the buffer.

use std::fmt::{self, Write as _};

use crate::common::constants::{BYTES_PER_GROUP, BYTES_PER_LINE};
use crate::common::{AccessType, MemoryError, VirtAddr, WORD_SIZE};
use crate::mem::AddressSpace;
use crate::mem::region::RegionKind;

/// Width of the hex column of a full line: two digits per byte, one separator between bytes and
/// one extra between groups.
const HEX_COLUMN_WIDTH: usize =
    BYTES_PER_LINE * 3 - 1 + (BYTES_PER_LINE / BYTES_PER_GROUP - 1);

/// One rendered line of a dump.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DumpLine {
    /// Address of the first byte on the line.
    pub address: VirtAddr,
    /// Bytes on the line (at most 16).
    pub bytes: Vec<u8>,
    /// Region the first byte belongs to, if any.
    pub region: Option<RegionKind>,
}

impl fmt::Display for DumpLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hex = String::with_capacity(HEX_COLUMN_WIDTH);
        let mut ascii = String::with_capacity(self.bytes.len());
        for (i, byte) in self.bytes.iter().enumerate() {
            if i > 0 {
                hex.push(' ');
                if i % BYTES_PER_GROUP == 0 {
                    hex.push(' ');
                }
            }
            write!(hex, "{byte:02x}")?;
            ascii.push(if byte.is_ascii_graphic() || *byte == b' ' {
                char::from(*byte)
            } else {
                '.'
            });
        }
        write!(
            f,
            "{}: {hex:<width$}  |{ascii}|",
            self.address,
            width = HEX_COLUMN_WIDTH
        )?;
        if let Some(kind) = self.region {
            write!(f, " <{kind}>")?;
        }
        Ok(())
    }
}

/// A bounded rendering of an address range.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryDump {
    lines: Vec<DumpLine>,
    omitted: usize,
}

impl MemoryDump {
    /// Rendered lines, in address order.
    pub fn lines(&self) -> &[DumpLine] {
        &self.lines
    }

    /// Returns `true` if the line cap stopped the dump before the range was exhausted.
    pub const fn is_truncated(&self) -> bool {
        self.omitted > 0
    }

    /// Bytes of the clamped range that were not rendered.
    pub const fn omitted_bytes(&self) -> usize {
        self.omitted
    }

    /// Returns `true` if the dump has no lines.
    pub const fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for MemoryDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        if self.is_truncated() {
            writeln!(f, "... {} more bytes", self.omitted)?;
        }
        Ok(())
    }
}

/// Renders `[start_addr, end_addr)` of `space`, at most `max_lines` lines long.
///
/// The range is clamped to the space: a start below the base moves up to the base and an end
/// past the buffer moves down to its end. A range that is empty after clamping produces an
/// empty dump. `end_addr` is widened to `u64` so a space ending at 4 GiB can be dumped to its
/// last byte; pass [`AddressSpace::end_vaddr`] to dump through the end of the space.
///
/// # Errors
///
/// [`MemoryError::NullInstance`] for a destroyed space, [`MemoryError::OutOfBounds`] if
/// `start_addr` is at or past the end of the space, and [`MemoryError::BelowBase`] if the whole
/// range lies below the base. Errors are also reported to the space's sink.
///
/// # Examples
///
/// ```
/// use rv32mem_core::inspect::dump;
/// use rv32mem_core::mem::AddressSpace;
///
/// let mut space = AddressSpace::new(64, 0x1000).unwrap();
/// space.write_word(0x1000, 0x6c6c_6548).unwrap();
/// let out = dump(&space, 0x1000, 0x1040, 2).unwrap();
/// assert_eq!(out.lines().len(), 2);
/// assert!(out.is_truncated());
/// assert!(out.to_string().starts_with("0x00001000: 48 65 6c 6c"));
/// ```
pub fn dump(
    space: &AddressSpace,
    start_addr: u32,
    end_addr: u64,
    max_lines: usize,
) -> Result<MemoryDump, MemoryError> {
    let (offset, len) = clamp(space, start_addr, end_addr).map_err(|err| space.reject(err))?;
    let bytes = space
        .bytes()
        .and_then(|buf| buf.get(offset..offset + len))
        .ok_or_else(|| space.reject(MemoryError::NullInstance))?;

    let first = space.base_vaddr() as usize + offset;
    let lines: Vec<DumpLine> = bytes
        .chunks(BYTES_PER_LINE)
        .take(max_lines)
        .enumerate()
        .map(|(i, chunk)| {
            let address = (first + i * BYTES_PER_LINE) as u32;
            DumpLine {
                address: VirtAddr::new(address),
                bytes: chunk.to_vec(),
                region: space.region_at(address),
            }
        })
        .collect();

    let rendered: usize = lines.iter().map(|l| l.bytes.len()).sum();
    tracing::debug!(offset, len, lines = lines.len(), "memory dump");
    Ok(MemoryDump {
        lines,
        omitted: len - rendered,
    })
}

/// Clamps the requested range, returning the buffer offset and length to render.
fn clamp(space: &AddressSpace, start_addr: u32, end_addr: u64) -> Result<(usize, usize), MemoryError> {
    if !space.is_live() {
        return Err(MemoryError::NullInstance);
    }
    let base = space.base_vaddr();
    if u64::from(start_addr) >= space.end_vaddr() {
        return Err(MemoryError::OutOfBounds {
            address: start_addr,
            width: 1,
            size: space.size(),
            access: AccessType::Inspect,
        });
    }
    if start_addr < base && end_addr <= u64::from(base) {
        return Err(MemoryError::BelowBase {
            address: start_addr,
            base,
            access: AccessType::Inspect,
        });
    }
    let lo = u64::from(start_addr.max(base));
    let hi = end_addr.min(space.end_vaddr());
    let len = hi.saturating_sub(lo) as usize;
    Ok(((lo - u64::from(base)) as usize, len))
}

/// One word of the word view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordRow {
    /// Word address.
    pub address: VirtAddr,
    /// The word, or why it cannot be read.
    pub value: Result<u32, MemoryError>,
}

impl fmt::Display for WordRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Ok(word) => write!(f, "{}: {word:#010x}", self.address),
            Err(err) => write!(f, "{}: <{err}>", self.address),
        }
    }
}

/// Lists `count` consecutive words starting at `start` rounded down to a word boundary.
///
/// Unreadable words carry their error instead of a value and are not reported to the sink.
pub fn word_rows(space: &AddressSpace, start: u32, count: usize) -> Vec<WordRow> {
    let first = VirtAddr::new(start).align_down(WORD_SIZE);
    std::iter::successors(Some(first), |addr| addr.checked_add(WORD_SIZE))
        .take(count)
        .map(|address| WordRow {
            address,
            value: peek_word(space, address.val()),
        })
        .collect()
}

fn peek_word(space: &AddressSpace, address: u32) -> Result<u32, MemoryError> {
    let offset = space.check_word(address, AccessType::Inspect)?;
    space
        .bytes()
        .and_then(|buf| buf.get(offset..offset + WORD_SIZE as usize))
        .and_then(|word| word.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or(MemoryError::NullInstance)
}
