use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Datelike, Local};
use tracing::{debug, warn};

use crate::error::StorageError;

/// Attempts made at creating the archive directory before giving up.
const MAX_DIRECTORY_ATTEMPTS: u32 = 3;

/// Progress of a single relocation, logged at each transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocationState {
    Sourced,
    DirectoryReady(PathBuf),
    Moved(PathBuf),
    Failed,
}

/// Moves files into a `<base>/<year>/<month>` archive.
pub struct Relocator {
    archive_base: PathBuf,
}

impl Relocator {
    pub fn new<P: AsRef<Path>>(archive_base: P) -> Self {
        Self {
            archive_base: archive_base.as_ref().to_path_buf(),
        }
    }

    pub fn archive_base(&self) -> &Path {
        &self.archive_base
    }

    /// Moves `source` into today's archive directory as `file_name`.
    pub fn relocate_as(&self, source: &Path, file_name: &str) -> Result<PathBuf, StorageError> {
        self.relocate_as_at(source, file_name, Local::now())
    }

    /// Like [`Relocator::relocate_as`] with an explicit clock reading.
    ///
    /// Never overwrites: an existing destination fails the move with
    /// [`StorageError::FileExists`] and the source stays where it was.
    pub fn relocate_as_at(
        &self,
        source: &Path,
        file_name: &str,
        now: DateTime<Local>,
    ) -> Result<PathBuf, StorageError> {
        let mut state = RelocationState::Sourced;
        debug!("Relocating {}: {:?}", crate::sanitize::redact_path(source), state);

        let result = self.drive(source, file_name, now, &mut state);
        if result.is_err() {
            transition(&mut state, RelocationState::Failed);
        }
        result
    }

    fn drive(
        &self,
        source: &Path,
        file_name: &str,
        now: DateTime<Local>,
        state: &mut RelocationState,
    ) -> Result<PathBuf, StorageError> {
        validate_file_name(file_name)?;

        let date_dir = archive_dir_for(&self.archive_base, now);
        ensure_directory(&date_dir)?;
        transition(state, RelocationState::DirectoryReady(date_dir.clone()));

        let destination = date_dir.join(file_name);
        move_no_clobber(source, &destination)?;
        transition(state, RelocationState::Moved(destination.clone()));

        Ok(destination)
    }
}

/// Moves `source` into the archive under `archive_base`, keeping its name.
pub fn relocate(source: &Path, archive_base: &Path) -> Result<PathBuf, StorageError> {
    let file_name = source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| StorageError::InvalidFileName(source.display().to_string()))?;

    Relocator::new(archive_base).relocate_as(source, file_name)
}

/// `<base>/<YYYY>/<full English month name>` for the given local time.
pub fn archive_dir_for(archive_base: &Path, now: DateTime<Local>) -> PathBuf {
    archive_base
        .join(now.year().to_string())
        .join(now.format("%B").to_string())
}

/// Creates `path` and any missing ancestors. Existing directories are fine.
pub fn ensure_directory(path: &Path) -> Result<(), StorageError> {
    let mut attempt = 1;
    loop {
        match fs::create_dir_all(path) {
            Ok(()) => return Ok(()),
            Err(e) if is_transient(&e) && attempt < MAX_DIRECTORY_ATTEMPTS => {
                warn!(
                    "Creating {} failed (attempt {}): {}",
                    crate::sanitize::redact_path(path),
                    attempt,
                    e
                );
                attempt += 1;
            }
            Err(source) => {
                return Err(StorageError::CreateDirectory {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
    )
}

fn transition(state: &mut RelocationState, next: RelocationState) {
    debug!("Relocation {:?} -> {:?}", state, next);
    *state = next;
}

fn validate_file_name(file_name: &str) -> Result<(), StorageError> {
    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == file_name => Ok(()),
        _ => Err(StorageError::InvalidFileName(file_name.to_string())),
    }
}

fn move_error(src: &Path, dst: &Path, source: io::Error) -> StorageError {
    StorageError::MoveFile {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source,
    }
}

/// Moves `src` to `dst`, failing if `dst` exists.
///
/// A hard link claims the destination atomically; where links are not
/// possible the file is copied into an exclusively created destination.
fn move_no_clobber(src: &Path, dst: &Path) -> Result<(), StorageError> {
    match fs::hard_link(src, dst) {
        Ok(()) => {
            if let Err(e) = fs::remove_file(src) {
                // Leave exactly the original behind
                let _ = fs::remove_file(dst);
                return Err(move_error(src, dst, e));
            }
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            Err(StorageError::FileExists(dst.to_path_buf()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(move_error(src, dst, e)),
        Err(e) => {
            debug!("Hard link unavailable ({}), copying instead", e);
            copy_no_clobber(src, dst)?;
            fs::remove_file(src).map_err(|e| {
                let _ = fs::remove_file(dst);
                move_error(src, dst, e)
            })
        }
    }
}

fn copy_no_clobber(src: &Path, dst: &Path) -> Result<(), StorageError> {
    let mut input = File::open(src).map_err(|e| move_error(src, dst, e))?;
    let source_meta = input.metadata().map_err(|e| move_error(src, dst, e))?;

    // create_new maps to O_CREAT | O_EXCL
    let mut output = match OpenOptions::new().write(true).create_new(true).open(dst) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(StorageError::FileExists(dst.to_path_buf()));
        }
        Err(e) => return Err(move_error(src, dst, e)),
    };

    let copied = io::copy(&mut input, &mut output)
        .and_then(|_| output.sync_all())
        .and_then(|_| output.metadata());

    let written = match copied {
        Ok(meta) => meta.len(),
        Err(e) => {
            drop(output);
            let _ = fs::remove_file(dst);
            return Err(move_error(src, dst, e));
        }
    };

    if written != source_meta.len() {
        drop(output);
        let _ = fs::remove_file(dst);
        return Err(StorageError::VerifyFailed {
            from: src.to_path_buf(),
            to: dst.to_path_buf(),
            expected: source_meta.len(),
            actual: written,
        });
    }

    let _ = fs::set_permissions(dst, source_meta.permissions());
    Ok(())
}
