//! Diagnostic records and the per-document generation-tagged set.

use std::ops::Range;

use serde::Serialize;

/// Severity attached to a diagnostic.
///
/// The compiler only reports parse failures, so every diagnostic is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The line does not parse.
    Error,
}

/// One problem reported against a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Zero-based line number.
    pub line: usize,
    /// Character columns covered, `0..` the line length.
    pub columns: Range<usize>,
    /// Severity level.
    pub severity: Severity,
    /// Compiler message.
    pub message: String,
}

impl Diagnostic {
    /// Builds an error spanning the whole of `text`, found on `line`.
    #[must_use]
    pub fn whole_line(line: usize, text: &str, message: impl Into<String>) -> Self {
        Self {
            line,
            columns: 0..text.chars().count(),
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Monotonic tag identifying one lint cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    /// Wraps a raw counter value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw counter value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Point-in-time view of a document's diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticSnapshot {
    /// Cycle the diagnostics belong to; zero before the first cycle.
    pub generation: Generation,
    /// `true` once every line of the cycle has been checked.
    pub complete: bool,
    /// Diagnostics sorted by line.
    pub diagnostics: Vec<Diagnostic>,
}

impl Default for DiagnosticSnapshot {
    fn default() -> Self {
        Self {
            generation: Generation::default(),
            complete: true,
            diagnostics: Vec::new(),
        }
    }
}

/// Diagnostics of one document, tagged with the cycle that produced them.
///
/// Starting a cycle clears the set. Results from any other cycle are
/// rejected, so a superseded cycle can never repopulate the set after a newer
/// one has cleared it.
#[derive(Debug, Default)]
pub struct DiagnosticSet {
    generation: Generation,
    pending: usize,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSet {
    /// Clears the set and starts `generation`, expecting `pending` results.
    ///
    /// Returns `false`, leaving the set untouched, when `generation` is not
    /// newer than the current one.
    pub fn begin(&mut self, generation: Generation, pending: usize) -> bool {
        if generation <= self.generation {
            return false;
        }
        self.generation = generation;
        self.pending = pending;
        self.diagnostics.clear();
        true
    }

    /// Records the result of one line check.
    ///
    /// Returns `false` when the result belongs to a stale cycle and was
    /// dropped.
    pub fn record(&mut self, generation: Generation, diagnostic: Option<Diagnostic>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.pending = self.pending.saturating_sub(1);
        if let Some(found) = diagnostic {
            self.diagnostics.push(found);
        }
        true
    }

    /// Current cycle.
    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// Returns `true` once the current cycle has no outstanding checks.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.pending == 0
    }

    /// Copies the set, sorting diagnostics by line.
    #[must_use]
    pub fn snapshot(&self) -> DiagnosticSnapshot {
        let mut diagnostics = self.diagnostics.clone();
        diagnostics.sort_by_key(|diagnostic| diagnostic.line);
        DiagnosticSnapshot {
            generation: self.generation,
            complete: self.is_complete(),
            diagnostics,
        }
    }
}
