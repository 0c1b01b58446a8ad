//! # Diagnostics Tests
//!
//! Verifies that every rejected operation, truncation and load reaches the
//! injected sink with the right severity, and that closures work as sinks.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;

use crate::common::harness::{TestSpace, init_tracing};
use rv32mem_core::diag::{Diagnostic, DiagnosticKind, Severity, SharedSink, TracingSink};
use rv32mem_core::loader::load_image;
use rv32mem_core::mem::AddressSpace;

#[test]
fn test_severity_per_event() {
    let mut fixture = TestSpace::new(8, 0);
    let _ = fixture.space.write_word(2, 0);
    let _ = load_image(&mut fixture.space, Some(&[1; 12]), 0);
    let _ = load_image(&mut fixture.space, Some(&[1; 4]), 4);

    let severities: Vec<(Severity, DiagnosticKind)> = fixture
        .sink
        .take()
        .into_iter()
        .map(|d| (d.severity, d.kind))
        .collect();
    assert_eq!(
        severities,
        vec![
            (Severity::Error, DiagnosticKind::UnalignedAccess),
            (Severity::Warning, DiagnosticKind::Truncated),
            (Severity::Info, DiagnosticKind::Loaded),
        ]
    );
}

#[test]
fn test_successful_word_access_is_silent() {
    let mut fixture = TestSpace::new(8, 0);
    fixture.space.write_word(4, 1).unwrap();
    assert_eq!(fixture.space.read_word(4), Ok(1));
    assert!(fixture.sink.is_empty());
}

#[test]
fn test_closure_sink() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let sink: SharedSink = Arc::new(move |d: &Diagnostic| recorder.lock().unwrap().push(d.to_string()));

    let space = AddressSpace::with_sink(16, 0x100, sink).unwrap();
    let _ = space.read_word(0xFC);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0],
        "error: read at 0x000000fc is below base address 0x00000100"
    );
}

#[test]
fn test_tracing_sink_accepts_every_severity() {
    init_tracing();
    let sink = TracingSink;
    for diagnostic in [
        Diagnostic::info(DiagnosticKind::Loaded, "loaded"),
        Diagnostic::warning(DiagnosticKind::Truncated, "truncated"),
        Diagnostic::error(&rv32mem_core::MemoryError::NullSource),
    ] {
        rv32mem_core::diag::DiagnosticSink::report(&sink, &diagnostic);
    }
}

#[test]
fn test_diagnostic_display() {
    let diagnostic = Diagnostic::warning(DiagnosticKind::RegionOutsideSpace, "text region");
    assert_eq!(diagnostic.to_string(), "warning: text region");
}
