use std::io;
use std::path::{Path, PathBuf};

/// Filesystem operations the package installer needs.
/// Abstracted so installs can be exercised against an in-memory tree.
pub trait FileSystem {
    fn dir_exists(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
    /// Copy `source` to `dest`, overwriting an existing file
    fn copy_file(&self, source: &Path, dest: &Path) -> io::Result<()>;
    fn list_files(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
    fn list_dirs(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}

/// [`FileSystem`] over `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl StdFileSystem {
    fn entries(path: &Path, want_dirs: bool) -> io::Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() == want_dirs {
                entries.push(entry.path());
            }
        }
        entries.sort();
        Ok(entries)
    }
}

impl FileSystem for StdFileSystem {
    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn copy_file(&self, source: &Path, dest: &Path) -> io::Result<()> {
        std::fs::copy(source, dest).map(|_| ())
    }

    fn list_files(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        Self::entries(path, false)
    }

    fn list_dirs(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        Self::entries(path, true)
    }
}
