//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use steprun_core::{
    application::{ApplicationError, ports::Filesystem},
    error::SteprunResult,
};

/// In-memory filesystem for testing.
///
/// Clones share the same tree, so a test can keep a handle after moving
/// one into a service.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, String>,
    directories: BTreeSet<PathBuf>,
    symlinks: BTreeMap<PathBuf, PathBuf>,
}

impl MemoryFilesystemInner {
    fn add_dirs(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            self.directories.insert(current.clone());
        }
    }

    fn parent_exists(&self, path: &Path) -> bool {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.directories.contains(parent),
            _ => true,
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
            || self.directories.contains(path)
            || self.symlinks.contains_key(path)
    }
}

fn missing(path: &Path, reason: &str) -> ApplicationError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file, creating its parents (testing helper).
    pub fn with_file(self, path: impl AsRef<Path>, content: &str) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            let path = path.as_ref();
            if let Some(parent) = path.parent() {
                inner.add_dirs(parent);
            }
            inner.files.insert(path.to_path_buf(), content.to_string());
        }
        self
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: impl AsRef<Path>) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path.as_ref()).cloned()
    }

    pub fn is_dir(&self, path: impl AsRef<Path>) -> bool {
        self.inner
            .read()
            .is_ok_and(|inner| inner.directories.contains(path.as_ref()))
    }

    /// Target of a symlink created through the port.
    pub fn symlink_target(&self, link: impl AsRef<Path>) -> Option<PathBuf> {
        let inner = self.inner.read().ok()?;
        inner.symlinks.get(link.as_ref()).cloned()
    }

    /// List all files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn read(&self) -> SteprunResult<RwLockReadGuard<'_, MemoryFilesystemInner>> {
        Ok(self
            .inner
            .read()
            .map_err(|_| ApplicationError::LockPoisoned("memory filesystem"))?)
    }

    fn write(&self) -> SteprunResult<RwLockWriteGuard<'_, MemoryFilesystemInner>> {
        Ok(self
            .inner
            .write()
            .map_err(|_| ApplicationError::LockPoisoned("memory filesystem"))?)
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> SteprunResult<()> {
        self.write()?.add_dirs(path);
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> SteprunResult<String> {
        let inner = self.read()?;
        let content = inner
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| missing(path, "No such file"))?;
        Ok(content)
    }

    fn write_file(&self, path: &Path, content: &str) -> SteprunResult<()> {
        let mut inner = self.write()?;

        if !inner.parent_exists(path) {
            return Err(missing(path, "Parent directory does not exist").into());
        }

        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn copy(&self, src: &Path, dest: &Path) -> SteprunResult<()> {
        let mut inner = self.write()?;

        if let Some(content) = inner.files.get(src).cloned() {
            if !inner.parent_exists(dest) {
                return Err(missing(dest, "Parent directory does not exist").into());
            }
            inner.files.insert(dest.to_path_buf(), content);
            return Ok(());
        }

        if !inner.directories.contains(src) {
            return Err(missing(src, "No such file or directory").into());
        }

        let dirs: Vec<PathBuf> = inner
            .directories
            .iter()
            .filter_map(|d| d.strip_prefix(src).ok().map(|rel| dest.join(rel)))
            .collect();
        let files: Vec<(PathBuf, String)> = inner
            .files
            .iter()
            .filter_map(|(p, c)| p.strip_prefix(src).ok().map(|rel| (dest.join(rel), c.clone())))
            .collect();

        for dir in dirs {
            inner.add_dirs(&dir);
        }
        inner.files.extend(files);
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> SteprunResult<()> {
        let mut inner = self.write()?;

        if !inner.parent_exists(to) {
            return Err(missing(to, "Parent directory does not exist").into());
        }

        if let Some(content) = inner.files.remove(from) {
            inner.files.insert(to.to_path_buf(), content);
            return Ok(());
        }

        if !inner.directories.contains(from) {
            return Err(missing(from, "No such file or directory").into());
        }

        let moved_dirs: Vec<PathBuf> = inner
            .directories
            .iter()
            .filter(|d| d.starts_with(from))
            .cloned()
            .collect();
        for dir in moved_dirs {
            inner.directories.remove(&dir);
            if let Ok(rel) = dir.strip_prefix(from) {
                inner.add_dirs(&to.join(rel));
            }
        }

        let moved_files: Vec<PathBuf> = inner
            .files
            .keys()
            .filter(|p| p.starts_with(from))
            .cloned()
            .collect();
        for file in moved_files {
            if let (Some(content), Ok(rel)) = (inner.files.remove(&file), file.strip_prefix(from)) {
                inner.files.insert(to.join(rel), content);
            }
        }

        Ok(())
    }

    fn symlink(&self, target: &Path, link: &Path) -> SteprunResult<()> {
        let mut inner = self.write()?;

        if inner.exists(link) {
            return Err(missing(link, "File exists").into());
        }

        inner
            .symlinks
            .insert(link.to_path_buf(), target.to_path_buf());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.read().is_ok_and(|inner| inner.exists(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_requires_parent() {
        let fs = MemoryFilesystem::new();
        assert!(fs.write_file(Path::new("/a/b.txt"), "x").is_err());

        fs.create_dir_all(Path::new("/a")).unwrap();
        fs.write_file(Path::new("/a/b.txt"), "x").unwrap();
        assert_eq!(fs.read_file("/a/b.txt").as_deref(), Some("x"));
    }

    #[test]
    fn copies_directory_trees() {
        let fs = MemoryFilesystem::new()
            .with_file("/tpl/a.txt", "a")
            .with_file("/tpl/sub/b.txt", "b");

        fs.copy(Path::new("/tpl"), Path::new("/out")).unwrap();

        assert_eq!(fs.read_file("/out/a.txt").as_deref(), Some("a"));
        assert_eq!(fs.read_file("/out/sub/b.txt").as_deref(), Some("b"));
        assert!(fs.is_dir("/out/sub"));
        // source untouched
        assert!(fs.exists(Path::new("/tpl/a.txt")));
    }

    #[test]
    fn renames_directories() {
        let fs = MemoryFilesystem::new().with_file("/old/x/y.txt", "y");

        fs.rename(Path::new("/old"), Path::new("/new")).unwrap();

        assert!(!fs.exists(Path::new("/old")));
        assert_eq!(fs.read_file("/new/x/y.txt").as_deref(), Some("y"));
    }

    #[test]
    fn records_symlinks() {
        let fs = MemoryFilesystem::new().with_file("/a/real", "");
        fs.symlink(Path::new("real"), Path::new("/a/link")).unwrap();

        assert_eq!(fs.symlink_target("/a/link"), Some(PathBuf::from("real")));
        assert!(fs.symlink(Path::new("real"), Path::new("/a/link")).is_err());
    }

    #[test]
    fn clones_share_state() {
        let fs = MemoryFilesystem::new();
        let handle = fs.clone();
        fs.create_dir_all(Path::new("/d")).unwrap();
        assert!(handle.exists(Path::new("/d")));
    }
}
