//! Single-instance guard for pipeline runs
//!
//! The lock is a file holding the owner's pid, created with `create_new` so
//! two runs cannot both succeed. It is removed when the guard drops. On Linux
//! a lock whose pid is no longer alive (crashed run) is reclaimed.

use crate::errors::{PipelineError, PipelineResult};
use crate::logger::{self, LogTag};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub struct ProcessLock {
    path: PathBuf,
}

impl ProcessLock {
    /// Acquire the default lock file under the data directory
    pub fn acquire_default() -> PipelineResult<Self> {
        Self::acquire(crate::paths::get_lock_file_path())
    }

    pub fn acquire<P: AsRef<Path>>(path: P) -> PipelineResult<Self> {
        let path = path.as_ref().to_path_buf();

        match Self::try_create(&path) {
            Err(PipelineError::Lock { .. }) if is_stale(&path) => {
                logger::warning(
                    LogTag::System,
                    &format!("Removing stale lock file {}", path.display()),
                );
                let _ = std::fs::remove_file(&path);
                Self::try_create(&path)
            }
            other => other,
        }
    }

    fn try_create(path: &Path) -> PipelineResult<Self> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(PipelineError::Lock {
                    path: path.display().to_string(),
                })
            }
            Err(e) => {
                return Err(PipelineError::Storage(format!(
                    "Failed to create lock file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        // The guard owns the file from here on; Drop cleans up on write errors too
        let lock = Self {
            path: path.to_path_buf(),
        };
        write!(file, "{}", std::process::id()).map_err(|e| {
            PipelineError::Storage(format!("Failed to write lock file {}: {}", path.display(), e))
        })?;

        logger::debug(
            LogTag::System,
            &format!("Acquired lock {}", path.display()),
        );
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProcessLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            logger::warning(
                LogTag::System,
                &format!("Failed to remove lock file {}: {}", self.path.display(), e),
            );
        }
    }
}

#[cfg(target_os = "linux")]
fn is_stale(path: &Path) -> bool {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return false;
    };
    match contents.trim().parse::<u32>() {
        Ok(pid) => !Path::new("/proc").join(pid.to_string()).exists(),
        Err(_) => false,
    }
}

#[cfg(not(target_os = "linux"))]
fn is_stale(_path: &Path) -> bool {
    false
}
