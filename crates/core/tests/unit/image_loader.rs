//! # Image Loader Tests
//!
//! Verifies byte-for-byte image copies, the truncation policy, rejected loads
//! and the text/data region metadata.

use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::harness::TestSpace;
use rv32mem_core::common::{AccessType, VirtAddr};
use rv32mem_core::diag::{DiagnosticKind, Severity};
use rv32mem_core::loader::{LoadReport, ProgramImage, Section, load_image, load_program};
use rv32mem_core::mem::region::{Region, RegionKind};
use rv32mem_core::MemoryError;

// ══════════════════════════════════════════════════════════
// 1. Copying
// ══════════════════════════════════════════════════════════

#[test]
fn test_load_copies_bytes_verbatim() {
    let mut fixture = TestSpace::new(64, 0x8000);
    let image: [u8; 9] = [0x93, 0x00, 0x10, 0x00, 0x13, 0x01, 0x20, 0x00, 0xFF];

    let report = load_image(&mut fixture.space, Some(&image[..]), 0x8010).unwrap();

    assert_eq!(
        report,
        LoadReport {
            start: VirtAddr::new(0x8010),
            requested: 9,
            copied: 9,
        }
    );
    assert!(!report.truncated());
    let bytes = fixture.space.bytes().unwrap();
    assert_eq!(&bytes[0x10..0x19], &image[..]);
    assert!(bytes[..0x10].iter().all(|&b| b == 0));
    assert!(bytes[0x19..].iter().all(|&b| b == 0));
    assert_eq!(fixture.space.read_word(0x8010), Ok(0x0010_0093));
}

#[test]
fn test_load_at_unaligned_address() {
    let mut fixture = TestSpace::new(16, 0x100);
    let _ = load_image(&mut fixture.space, Some(&[0xAA, 0xBB]), 0x103).unwrap();
    assert_eq!(fixture.space.read_word(0x100), Ok(0xAA00_0000));
    assert_eq!(fixture.space.read_word(0x104), Ok(0x0000_00BB));
}

#[test]
fn test_successful_load_reports_info() {
    let mut fixture = TestSpace::new(16, 0);
    let _ = load_image(&mut fixture.space, Some(&[1, 2, 3, 4]), 0).unwrap();
    let reported = fixture.sink.take();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].severity, Severity::Info);
    assert_eq!(reported[0].kind, DiagnosticKind::Loaded);
}

#[test]
fn test_empty_image_copies_nothing() {
    let mut fixture = TestSpace::new(16, 0);
    let report = load_image(&mut fixture.space, Some(&[]), 8).unwrap();
    assert_eq!(report.copied, 0);
    assert!(!report.truncated());
}

// ══════════════════════════════════════════════════════════
// 2. Truncation
// ══════════════════════════════════════════════════════════

#[test]
fn test_overflowing_load_is_truncated() {
    let mut fixture = TestSpace::filled(1024, 0x10000, 0xEE);
    let before = fixture.snapshot();

    let report = load_image(&mut fixture.space, Some(&[0, 1, 2, 3, 4]), 0x10000 + 1020).unwrap();

    assert_eq!(report.requested, 5);
    assert_eq!(report.copied, 4);
    assert!(report.truncated());
    let after = fixture.snapshot();
    assert_eq!(&after[1020..], &[0, 1, 2, 3]);
    assert_eq!(&after[..1020], &before[..1020]);

    let reported = fixture.sink.take();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].severity, Severity::Warning);
    assert_eq!(reported[0].kind, DiagnosticKind::Truncated);
}

#[test]
fn test_load_into_last_byte() {
    let mut fixture = TestSpace::new(8, 0x40);
    let report = load_image(&mut fixture.space, Some(&[9; 32]), 0x47).unwrap();
    assert_eq!(report.copied, 1);
    assert_eq!(fixture.space.bytes().unwrap(), &[0, 0, 0, 0, 0, 0, 0, 9]);
}

// ══════════════════════════════════════════════════════════
// 3. Rejected loads
// ══════════════════════════════════════════════════════════

#[test]
fn test_missing_source_is_rejected() {
    let mut fixture = TestSpace::new(64, 0);
    assert_eq!(load_image(&mut fixture.space, None, 0), Err(MemoryError::NullSource));
    assert_eq!(fixture.sink.count(DiagnosticKind::NullSource), 1);
}

#[rstest]
#[case::below_base(0x0FFF, DiagnosticKind::BelowBase)]
#[case::far_below_base(0, DiagnosticKind::BelowBase)]
#[case::one_past_end(0x1040, DiagnosticKind::OutOfBounds)]
#[case::far_past_end(0xFFFF_0000, DiagnosticKind::OutOfBounds)]
fn test_rejected_load_copies_nothing(#[case] start: u32, #[case] kind: DiagnosticKind) {
    let mut fixture = TestSpace::filled(64, 0x1000, 0x11);
    let before = fixture.snapshot();

    let err = load_image(&mut fixture.space, Some(&[1, 2, 3, 4]), start).unwrap_err();

    assert_eq!(DiagnosticKind::from(&err), kind);
    assert_eq!(err.access(), Some(AccessType::Load));
    assert_eq!(fixture.snapshot(), before);
    assert_eq!(fixture.sink.count(kind), 1);
}

#[test]
fn test_empty_image_past_end_is_rejected() {
    let mut fixture = TestSpace::new(16, 0);
    assert!(matches!(
        load_image(&mut fixture.space, Some(&[]), 16),
        Err(MemoryError::OutOfBounds { address: 16, width: 0, size: 16, .. })
    ));
}

// ══════════════════════════════════════════════════════════
// 4. Region metadata
// ══════════════════════════════════════════════════════════

#[test]
fn test_region_setters_last_write_wins() {
    let mut fixture = TestSpace::new(0x1000, 0x1_0000);
    fixture.space.set_text_region(0x1_0000, 0x100);
    fixture.space.set_text_region(0x1_0200, 0x80);
    fixture.space.set_data_region(0x1_0800, 0x40);

    assert_eq!(fixture.space.text_region(), Some(Region::new(0x1_0200, 0x80)));
    assert_eq!(fixture.space.data_region(), Some(Region::new(0x1_0800, 0x40)));
    assert_eq!(fixture.space.region_at(0x1_0000), None);
    assert_eq!(fixture.space.region_at(0x1_027F), Some(RegionKind::Text));
    assert_eq!(fixture.space.region_at(0x1_0280), None);
    assert_eq!(fixture.space.region_at(0x1_0800), Some(RegionKind::Data));
    assert!(fixture.sink.is_empty());
}

#[test]
fn test_region_outside_space_is_recorded_with_warning() {
    let mut fixture = TestSpace::new(0x100, 0x1000);
    fixture.space.set_text_region(0x0, 0x2000);

    assert_eq!(fixture.space.text_region(), Some(Region::new(0x0, 0x2000)));
    let reported = fixture.sink.take();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].severity, Severity::Warning);
    assert_eq!(reported[0].kind, DiagnosticKind::RegionOutsideSpace);
}

#[test]
fn test_regions_do_not_restrict_access() {
    let mut fixture = TestSpace::new(64, 0);
    fixture.space.set_text_region(0, 16);
    fixture.space.write_word(8, 0xFFFF_FFFF).unwrap();
    assert_eq!(fixture.space.read_word(8), Ok(0xFFFF_FFFF));
}

// ══════════════════════════════════════════════════════════
// 5. Program loading
// ══════════════════════════════════════════════════════════

fn program(text: &[u8], text_addr: u32, data: &[u8], data_addr: u32) -> ProgramImage {
    ProgramImage {
        text: Some(Section::new(".text", text_addr, text.to_vec())),
        data: Some(Section::new(".data", data_addr, data.to_vec())),
        entry: VirtAddr::new(text_addr),
    }
}

#[test]
fn test_load_program_places_both_sections() {
    let mut fixture = TestSpace::new(0x100, 0x1000);
    let image = program(&[0x13, 0, 0, 0], 0x1000, b"abcd", 0x1080);

    let report = load_program(&mut fixture.space, &image);

    assert!(report.is_complete());
    assert_eq!(report.first_error(), None);
    assert_eq!(report.entry, VirtAddr::new(0x1000));
    assert_eq!(fixture.space.read_word(0x1000), Ok(0x13));
    assert_eq!(fixture.space.read_word(0x1080), Ok(u32::from_le_bytes(*b"abcd")));
    assert_eq!(fixture.space.text_region(), Some(Region::new(0x1000, 4)));
    assert_eq!(fixture.space.data_region(), Some(Region::new(0x1080, 4)));
}

#[test]
fn test_load_program_loads_text_after_data() {
    let mut fixture = TestSpace::new(0x100, 0x1000);
    let image = program(&[1, 1, 1, 1], 0x1000, &[2, 2, 2, 2, 2, 2, 2, 2], 0x1000);

    let _ = load_program(&mut fixture.space, &image);

    assert_eq!(fixture.space.read_word(0x1000), Ok(0x0101_0101));
    assert_eq!(fixture.space.read_word(0x1004), Ok(0x0202_0202));
    assert_eq!(fixture.space.region_at(0x1000), Some(RegionKind::Text));
    assert_eq!(fixture.space.region_at(0x1004), Some(RegionKind::Data));
}

#[test]
fn test_load_program_skips_absent_sections() {
    let mut fixture = TestSpace::new(0x100, 0x1000);
    let image = ProgramImage::from_raw(vec![5, 0, 0, 0], 0x1010);

    let report = load_program(&mut fixture.space, &image);

    assert_eq!(report.data, None);
    assert!(report.is_complete());
    assert_eq!(fixture.space.data_region(), None);
    assert_eq!(fixture.sink.count(DiagnosticKind::NullSource), 0);
}

#[test]
fn test_load_program_reports_section_failures() {
    let mut fixture = TestSpace::new(0x100, 0x1000);
    let image = program(&[0; 8], 0x10FC, b"data", 0x0F00);

    let report = load_program(&mut fixture.space, &image);

    assert!(!report.is_complete());
    assert!(matches!(report.first_error(), Some(MemoryError::BelowBase { address: 0x0F00, .. })));
    assert!(matches!(report.text, Some(Ok(LoadReport { copied: 4, requested: 8, .. }))));
    assert_eq!(fixture.space.data_region(), Some(Region::new(0x0F00, 4)));
    assert_eq!(fixture.sink.count(DiagnosticKind::RegionOutsideSpace), 2);
}
