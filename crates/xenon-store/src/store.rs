//! Filesystem-backed project store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::StoreError;
use crate::files::{self, PROJECT_DIR_MODE, SOURCE_FILE_MODE};
use crate::locks::{ProjectLock, ProjectLocks};
use crate::naming::{FileName, NamingError, ProjectId};

const STORE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::store");

/// Program served when a visitor opens the entry file of a project that has
/// never been saved.
pub const EXAMPLE_PROGRAM: &str = "; Hello World in XenonCode\n\ninit\n\tprint(\"Hello, World!\")\n";

/// Result of a load request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file exists in the project directory.
    Found(Vec<u8>),
    /// The project does not exist yet and the entry file was requested.
    Bootstrap(Vec<u8>),
    /// Nothing to serve.
    NotFound,
}

impl LoadOutcome {
    /// Bytes to answer with; empty for [`LoadOutcome::NotFound`].
    #[must_use]
    pub fn into_body(self) -> Vec<u8> {
        match self {
            Self::Found(bytes) | Self::Bootstrap(bytes) => bytes,
            Self::NotFound => Vec::new(),
        }
    }
}

/// Stores one directory of source files per project under a common root.
#[derive(Debug)]
pub struct ProjectStore {
    root: PathBuf,
    extension: String,
    entry_file: FileName,
    bootstrap: Vec<u8>,
    locks: ProjectLocks,
}

impl ProjectStore {
    /// Creates a store rooted at `root`.
    ///
    /// Nothing is created on disk until the first save.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EntryFile`] when `entry_file` is not a valid
    /// file name for `extension`.
    pub fn new(
        root: impl Into<PathBuf>,
        extension: impl Into<String>,
        entry_file: &str,
    ) -> Result<Self, StoreError> {
        let source_extension = extension.into();
        let entry = FileName::parse(entry_file, &source_extension)
            .map_err(|source| StoreError::EntryFile { source })?;
        Ok(Self {
            root: root.into(),
            extension: source_extension,
            entry_file: entry,
            bootstrap: EXAMPLE_PROGRAM.as_bytes().to_vec(),
            locks: ProjectLocks::new(),
        })
    }

    /// Replaces the built-in example program served to new projects.
    #[must_use]
    pub fn with_bootstrap(mut self, bootstrap: Vec<u8>) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Root directory holding every project.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Extension required on source file names.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Entry file name.
    #[must_use]
    pub const fn entry_file(&self) -> &FileName {
        &self.entry_file
    }

    /// Validates a project identifier.
    ///
    /// # Errors
    ///
    /// Returns [`NamingError::InvalidProjectId`] when the rule is not met.
    pub fn project_id(&self, candidate: &str) -> Result<ProjectId, NamingError> {
        ProjectId::parse(candidate)
    }

    /// Validates a file name against the configured extension.
    ///
    /// # Errors
    ///
    /// Returns [`NamingError::InvalidFileName`] when the rule is not met.
    pub fn file_name(&self, candidate: &str) -> Result<FileName, NamingError> {
        FileName::parse(candidate, &self.extension)
    }

    /// Directory holding the files of `project`.
    #[must_use]
    pub fn project_dir(&self, project: &ProjectId) -> PathBuf {
        self.root.join(project.as_str())
    }

    /// Returns `true` once the project has been saved at least once.
    #[must_use]
    pub fn exists(&self, project: &ProjectId) -> bool {
        self.project_dir(project).is_dir()
    }

    /// Lock shared by saves and runs of `project`.
    pub fn lock_for(&self, project: &ProjectId) -> ProjectLock {
        self.locks.lock_for(project)
    }

    /// Reads `file` from `project`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] when the file exists but cannot be read.
    pub fn load(&self, project: &ProjectId, file: &FileName) -> Result<LoadOutcome, StoreError> {
        let directory = self.project_dir(project);
        if !directory.is_dir() {
            if *file == self.entry_file {
                debug!(
                    target: STORE_TARGET,
                    project = project.as_str(),
                    "serving example program to new project"
                );
                return Ok(LoadOutcome::Bootstrap(self.bootstrap.clone()));
            }
            return Ok(LoadOutcome::NotFound);
        }

        let path = directory.join(file.as_str());
        match fs::read(&path) {
            Ok(bytes) => Ok(LoadOutcome::Found(bytes)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(LoadOutcome::NotFound),
            Err(source) => Err(StoreError::Read { path, source }),
        }
    }

    /// Writes `contents` to `file` in `project`, creating the project on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when a directory cannot be created, the
    /// file cannot be written, or permissions cannot be applied.
    pub fn save(
        &self,
        project: &ProjectId,
        file: &FileName,
        contents: &[u8],
    ) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|source| StoreError::CreateDirectory {
            path: self.root.clone(),
            source,
        })?;

        let directory = self.project_dir(project);
        let created =
            files::create_dir_once(&directory).map_err(|source| StoreError::CreateDirectory {
                path: directory.clone(),
                source,
            })?;
        if created {
            files::set_mode(&directory, PROJECT_DIR_MODE).map_err(|source| {
                StoreError::Permissions {
                    path: directory.clone(),
                    source,
                }
            })?;
            info!(
                target: STORE_TARGET,
                project = project.as_str(),
                "created project directory"
            );
        }

        let path = directory.join(file.as_str());
        let lock = self.lock_for(project);
        let _guard = lock.write();
        files::atomic_write(&path, contents, SOURCE_FILE_MODE)
            .map_err(|source| StoreError::Write { path, source })?;
        debug!(
            target: STORE_TARGET,
            project = project.as_str(),
            file = file.as_str(),
            bytes = contents.len(),
            "saved source file"
        );
        Ok(())
    }

    /// Source files of `project`, sorted by name.
    ///
    /// Entries that do not satisfy the file name rule are skipped. A project
    /// that was never saved has no files.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::List`] when the directory cannot be read.
    pub fn list(&self, project: &ProjectId) -> Result<Vec<FileName>, StoreError> {
        let directory = self.project_dir(project);
        let entries = match fs::read_dir(&directory) {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::List {
                    path: directory,
                    source,
                });
            }
        };

        let mut names = Vec::new();
        for item in entries {
            let entry = item.map_err(|source| StoreError::List {
                path: directory.clone(),
                source,
            })?;
            let is_file = entry.file_type().is_ok_and(|kind| kind.is_file());
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if let (true, Ok(file)) = (is_file, self.file_name(&name)) {
                names.push(file);
            }
        }
        names.sort();
        Ok(names)
    }
}
