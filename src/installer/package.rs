use super::fs::FileSystem;
use crate::error::{BridgeError, Result};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Unity writes a `.meta` sidecar next to every asset; those are regenerated
/// by the editor in the target project and must not be copied.
const META_SUFFIX: &str = ".meta";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed { files_copied: usize },
    /// Target directory existed already; nothing was copied
    AlreadyPresent,
}

/// Copies a packaged asset directory into a Unity project
pub struct PackageInstaller<F> {
    fs: F,
}

impl<F: FileSystem> PackageInstaller<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    pub fn install(&self, source: &Path, target: &Path) -> Result<InstallOutcome> {
        if !self.fs.dir_exists(source) {
            error!("Install source directory not found: {}", source.display());
            return Err(BridgeError::InstallSourceMissing(
                source.display().to_string(),
            ));
        }

        if self.fs.dir_exists(target) {
            warn!(
                "Install target already exists, skipping install: {}",
                target.display()
            );
            return Ok(InstallOutcome::AlreadyPresent);
        }

        match self.copy_dir_recursive(source, target) {
            Ok(files_copied) => {
                info!(
                    "Installed {} files to: {}",
                    files_copied,
                    target.display()
                );
                Ok(InstallOutcome::Installed { files_copied })
            }
            Err(e) => {
                error!("Failed to install assets to {}: {}", target.display(), e);
                Err(BridgeError::Install(format!("{}: {}", target.display(), e)))
            }
        }
    }

    fn copy_dir_recursive(&self, source_dir: &Path, target_dir: &Path) -> io::Result<usize> {
        self.fs.create_dir_all(target_dir)?;
        let mut copied = 0;

        for file in self.fs.list_files(source_dir)? {
            if file.to_string_lossy().ends_with(META_SUFFIX) {
                continue;
            }
            let Some(name) = file.file_name() else {
                continue;
            };
            let dest = normalize_path(&target_dir.join(name));
            self.fs.copy_file(&file, &dest)?;
            copied += 1;
        }

        for dir in self.fs.list_dirs(source_dir)? {
            let Some(name) = dir.file_name() else {
                continue;
            };
            let dest = normalize_path(&target_dir.join(name));
            copied += self.copy_dir_recursive(&dir, &dest)?;
        }

        Ok(copied)
    }
}

/// Forward slashes only, matching how Unity spells asset paths on every platform
pub fn normalize_path(path: &Path) -> PathBuf {
    PathBuf::from(path.to_string_lossy().replace('\\', "/"))
}
