//! Live linting for XenonCode documents.
//!
//! The compiler only checks one line at a time, so a document is linted by
//! normalising each line's indentation ([`indent`]) and checking every line
//! concurrently through a [`LineChecker`]. Edits are debounced per document
//! and every cycle is tagged with a [`Generation`], letting the
//! [`DiagnosticSet`] drop results from cycles that a newer edit superseded.

mod checker;
mod debounce;
mod diagnostics;
pub mod indent;
mod pipeline;
mod pool;

pub use checker::{CheckError, LineChecker, ProcessLineChecker};
pub use debounce::Debouncer;
pub use diagnostics::{Diagnostic, DiagnosticSet, DiagnosticSnapshot, Generation, Severity};
pub use indent::{normalize_document, normalize_line};
pub use pipeline::{LintPipeline, LintSettings};

#[cfg(test)]
mod tests;
