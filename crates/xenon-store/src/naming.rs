//! Name rules for projects and source files.
//!
//! Every path touched by the store or the sandbox is built from a
//! [`ProjectId`] and, for files, a [`FileName`]. Both only admit ASCII word
//! characters (`[A-Za-z0-9_]`) plus, for files, a single `.<extension>`
//! suffix, so no separator or parent reference can ever reach the
//! filesystem.

use std::fmt;

use thiserror::Error;

/// Longest accepted project identifier.
pub const MAX_PROJECT_ID_LEN: usize = 100;

/// Returns `true` when `candidate` matches `^\w{1,100}$`.
#[must_use]
pub fn is_valid_project_id(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.len() <= MAX_PROJECT_ID_LEN && is_word(candidate)
}

/// Returns `true` when `candidate` matches `^\w+\.<extension>$`.
#[must_use]
pub fn is_valid_file_name(candidate: &str, extension: &str) -> bool {
    let Some((stem, suffix)) = candidate.rsplit_once('.') else {
        return false;
    };
    !stem.is_empty() && is_word(stem) && suffix == extension
}

fn is_word(text: &str) -> bool {
    text.bytes()
        .all(|byte| byte.is_ascii_alphanumeric() || byte == b'_')
}

/// Rejections raised by the typed name constructors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NamingError {
    /// The project identifier is empty, too long, or not a word.
    #[error("invalid project identifier {value:?}")]
    InvalidProjectId {
        /// Rejected input.
        value: String,
    },
    /// The file name is not `<word>.<extension>`.
    #[error("invalid file name {value:?} for extension '{extension}'")]
    InvalidFileName {
        /// Rejected input.
        value: String,
        /// Extension the name was checked against.
        extension: String,
    },
}

/// Validated project identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(String);

impl ProjectId {
    /// Validates `candidate` as a project identifier.
    ///
    /// # Errors
    ///
    /// Returns [`NamingError::InvalidProjectId`] when the rule is not met.
    pub fn parse(candidate: &str) -> Result<Self, NamingError> {
        if is_valid_project_id(candidate) {
            Ok(Self(candidate.to_owned()))
        } else {
            Err(NamingError::InvalidProjectId {
                value: candidate.to_owned(),
            })
        }
    }

    /// Identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Validated source file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileName(String);

impl FileName {
    /// Validates `candidate` as a file name carrying `extension`.
    ///
    /// # Errors
    ///
    /// Returns [`NamingError::InvalidFileName`] when the rule is not met.
    pub fn parse(candidate: &str, extension: &str) -> Result<Self, NamingError> {
        if is_valid_file_name(candidate, extension) {
            Ok(Self(candidate.to_owned()))
        } else {
            Err(NamingError::InvalidFileName {
                value: candidate.to_owned(),
                extension: extension.to_owned(),
            })
        }
    }

    /// File name text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}
