//! Installs the bridge's packaged assets into a Unity project.

pub mod fs;
pub mod package;

pub use fs::{FileSystem, StdFileSystem};
pub use package::{normalize_path, InstallOutcome, PackageInstaller};
