//! Errors raised by project store operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::naming::NamingError;

/// Failures of the filesystem operations behind the store.
///
/// Invalid names and missing files are not errors here: names are checked
/// when the typed identifiers are built, and a missing file is a
/// [`LoadOutcome::NotFound`](crate::LoadOutcome::NotFound).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The configured entry file does not satisfy the file name rule.
    #[error("entry file is not a valid source file name: {source}")]
    EntryFile {
        /// Naming rejection.
        #[source]
        source: NamingError,
    },
    /// The project root or a project directory could not be created.
    #[error("failed to create project directory '{path}': {source}")]
    CreateDirectory {
        /// Directory being created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Reading a source file failed for a reason other than absence.
    #[error("failed to read '{path}': {source}")]
    Read {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Writing or renaming a source file failed.
    #[error("failed to write '{path}': {source}")]
    Write {
        /// File being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Adjusting permissions failed.
    #[error("failed to set permissions on '{path}': {source}")]
    Permissions {
        /// Path whose mode was being changed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Enumerating a project directory failed.
    #[error("failed to list '{path}': {source}")]
    List {
        /// Directory being listed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}
