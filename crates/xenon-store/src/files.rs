use std::fs::{self, DirBuilder};
use std::io::{self, Write};
use std::path::Path;

use tempfile::Builder;

#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};

/// Mode applied to project directories so the compiler can write next to the
/// sources whichever user it runs as.
pub(crate) const PROJECT_DIR_MODE: u32 = 0o777;

/// Mode applied to saved source files.
pub(crate) const SOURCE_FILE_MODE: u32 = 0o666;

/// Creates `directory` unless it already exists.
///
/// Returns `true` when this call created it. A concurrent creator winning the
/// race is reported as `false`, not as an error.
pub(crate) fn create_dir_once(directory: &Path) -> io::Result<bool> {
    let mut builder = DirBuilder::new();
    #[cfg(unix)]
    builder.mode(PROJECT_DIR_MODE);
    match builder.create(directory) {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(error) => Err(error),
    }
}

/// Sets the exact mode on `path`, bypassing the process umask.
pub(crate) fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
    }

    #[cfg(not(unix))]
    {
        let _ = (path, mode);
        Ok(())
    }
}

/// Writes the provided bytes to the path using an atomic persist step.
///
/// Data is flushed and fsync'd before the temporary file is renamed into
/// place so readers never observe a partially written payload. The temporary
/// name starts with a dot, which the file name rule never admits, so a
/// listing cannot pick it up.
pub(crate) fn atomic_write(path: &Path, contents: &[u8], mode: u32) -> io::Result<()> {
    let directory = path.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "target path did not have a parent directory",
        )
    })?;

    let prefix = format!(
        ".{}.",
        path.file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("xenon")
    );
    let mut file = Builder::new().prefix(&prefix).tempfile_in(directory)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    #[cfg(unix)]
    file.as_file()
        .set_permissions(fs::Permissions::from_mode(mode))?;
    #[cfg(not(unix))]
    let _ = mode;
    file.persist(path).map_err(|error| error.error)?;
    Ok(())
}
