//! Local filesystem adapter using std::fs.

use std::fs;
use std::io;
use std::path::Path;

use steprun_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{SteprunError, SteprunResult},
};
use tracing::trace;
use walkdir::WalkDir;

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }

    fn copy_dir(&self, src: &Path, dest: &Path) -> SteprunResult<()> {
        for entry in WalkDir::new(src) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(src).to_path_buf();
                ApplicationError::FilesystemError {
                    path,
                    reason: format!("Failed to walk directory: {e}"),
                }
            })?;

            let relative = entry
                .path()
                .strip_prefix(src)
                .map_err(|_| ApplicationError::FilesystemError {
                    path: entry.path().to_path_buf(),
                    reason: "entry outside of copied directory".into(),
                })?;
            let target = dest.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)
                    .map_err(|e| map_io_error(&target, e, "create directory"))?;
            } else {
                trace!(from = %entry.path().display(), to = %target.display(), "copy");
                fs::copy(entry.path(), &target)
                    .map_err(|e| map_io_error(&target, e, "copy file"))?;
            }
        }

        Ok(())
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> SteprunResult<()> {
        fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn read_to_string(&self, path: &Path) -> SteprunResult<String> {
        fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn write_file(&self, path: &Path, content: &str) -> SteprunResult<()> {
        fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn copy(&self, src: &Path, dest: &Path) -> SteprunResult<()> {
        let metadata = fs::metadata(src).map_err(|e| map_io_error(src, e, "read metadata"))?;

        if metadata.is_dir() {
            self.copy_dir(src, dest)
        } else {
            fs::copy(src, dest)
                .map(|_| ())
                .map_err(|e| map_io_error(dest, e, "copy file"))
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> SteprunResult<()> {
        fs::rename(from, to).map_err(|e| map_io_error(from, e, "rename"))
    }

    fn symlink(&self, target: &Path, link: &Path) -> SteprunResult<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(target, link)
                .map_err(|e| map_io_error(link, e, "create symlink"))
        }
        #[cfg(windows)]
        {
            let resolved = link.parent().map_or_else(|| target.to_path_buf(), |p| p.join(target));
            let result = if resolved.is_dir() {
                std::os::windows::fs::symlink_dir(target, link)
            } else {
                std::os::windows::fs::symlink_file(target, link)
            };
            result.map_err(|e| map_io_error(link, e, "create symlink"))
        }
    }

    fn exists(&self, path: &Path) -> bool {
        // dangling symlinks count as existing
        path.exists() || fs::symlink_metadata(path).is_ok()
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> SteprunError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}
