//! Diagnostic reporting.
//!
//! Every rejected access, truncated load or suspicious metadata update is reported through a
//! [`DiagnosticSink`] owned by the address space. The sink is injected at construction so a
//! debugger can capture, filter or redirect diagnostics. This module provides:
//! 1. **Events:** [`Diagnostic`] with a [`Severity`] and a [`DiagnosticKind`].
//! 2. **Sinks:** [`TracingSink`] (default, forwards to `tracing`), [`CollectingSink`] (keeps
//!    events in memory) and any `Fn(&Diagnostic)` closure.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::common::MemoryError;

/// Severity of a diagnostic event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational progress (e.g. a completed load).
    Info,
    /// The operation succeeded in a degraded way (e.g. truncation).
    Warning,
    /// The operation was rejected and had no effect.
    Error,
}

/// What a diagnostic is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Operation on a destroyed address space.
    NullInstance,
    /// Backing storage could not be allocated.
    AllocationFailure,
    /// Base address is not word aligned.
    MisalignedBase,
    /// Space does not fit in the 32-bit range.
    AddressOverflow,
    /// Unaligned word access.
    UnalignedAccess,
    /// Access below the base address.
    BelowBase,
    /// Access past the end of the buffer.
    OutOfBounds,
    /// Image load without a byte source.
    NullSource,
    /// Image load shortened to fit the buffer.
    Truncated,
    /// Region metadata extends outside the buffer.
    RegionOutsideSpace,
    /// Image bytes copied into the space.
    Loaded,
}

impl From<&MemoryError> for DiagnosticKind {
    fn from(err: &MemoryError) -> Self {
        match err {
            MemoryError::NullInstance => Self::NullInstance,
            MemoryError::AllocationFailure { .. } => Self::AllocationFailure,
            MemoryError::MisalignedBase { .. } => Self::MisalignedBase,
            MemoryError::AddressOverflow { .. } => Self::AddressOverflow,
            MemoryError::UnalignedAccess { .. } => Self::UnalignedAccess,
            MemoryError::BelowBase { .. } => Self::BelowBase,
            MemoryError::OutOfBounds { .. } => Self::OutOfBounds,
            MemoryError::NullSource => Self::NullSource,
        }
    }
}

/// A single diagnostic event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// How serious the event is.
    pub severity: Severity,
    /// What the event is about.
    pub kind: DiagnosticKind,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    /// Builds an error-level diagnostic describing a rejected operation.
    pub fn error(err: &MemoryError) -> Self {
        Self {
            severity: Severity::Error,
            kind: err.into(),
            message: err.to_string(),
        }
    }

    /// Builds a warning-level diagnostic.
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            message: message.into(),
        }
    }

    /// Builds an info-level diagnostic.
    pub fn info(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{level}: {}", self.message)
    }
}

/// Receiver of diagnostic events.
///
/// Implementors must be `Send + Sync` so one sink can be shared between the address space and
/// an observer running on another thread.
pub trait DiagnosticSink: Send + Sync {
    /// Handles one diagnostic event.
    fn report(&self, diagnostic: &Diagnostic);
}

/// Shared handle to a sink, as held by an address space.
pub type SharedSink = Arc<dyn DiagnosticSink>;

impl<F> DiagnosticSink for F
where
    F: Fn(&Diagnostic) + Send + Sync,
{
    fn report(&self, diagnostic: &Diagnostic) {
        self(diagnostic);
    }
}

/// Forwards diagnostics to the `tracing` subscriber installed by the host application.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        let kind = diagnostic.kind;
        match diagnostic.severity {
            Severity::Info => tracing::info!(?kind, "{}", diagnostic.message),
            Severity::Warning => tracing::warn!(?kind, "{}", diagnostic.message),
            Severity::Error => tracing::error!(?kind, "{}", diagnostic.message),
        }
    }
}

/// Keeps every diagnostic in memory, in arrival order.
///
/// Intended for debugger panels and tests that assert on what was reported.
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every diagnostic received so far.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    /// Removes and returns every diagnostic received so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.lock())
    }

    /// Number of diagnostics of the given kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.lock().iter().filter(|d| d.kind == kind).count()
    }

    /// Number of diagnostics received so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        // A panic while holding the lock cannot leave the vector half-updated.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        self.lock().push(diagnostic.clone());
    }
}
