//! Discovery of scheme files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use termscheme_scheme::SchemeFormat;

/// Supplies candidate scheme files to the manager.
///
/// Each list is ordered by priority: when two files share a base name, the
/// earlier one wins. Locators are `Send` so a manager can live behind a lock
/// shared between threads.
pub trait SchemeLocator: Send {
    /// Paths of key/value `.colorscheme` files.
    fn modern_scheme_paths(&self) -> Vec<PathBuf>;

    /// Paths of legacy `.schema` files.
    fn legacy_scheme_paths(&self) -> Vec<PathBuf>;

    /// Whether `path` may be modified or deleted.
    fn is_writable(&self, path: &Path) -> bool;

    /// Directory new and modified schemes are saved to.
    fn writable_dir(&self) -> Option<PathBuf>;
}

/// Locator over a writable user directory and read-only system directories.
#[derive(Debug, Clone, Default)]
pub struct DirectoryLocator {
    user_dir: Option<PathBuf>,
    system_dirs: Vec<PathBuf>,
}

impl DirectoryLocator {
    pub fn new(user_dir: Option<PathBuf>, system_dirs: Vec<PathBuf>) -> Self {
        Self {
            user_dir,
            system_dirs,
        }
    }

    /// Search order: user directory first, then system directories.
    fn search_dirs(&self) -> impl Iterator<Item = &PathBuf> {
        self.user_dir.iter().chain(self.system_dirs.iter())
    }

    fn list(&self, format: SchemeFormat) -> Vec<PathBuf> {
        self.search_dirs()
            .flat_map(|dir| list_dir(dir, format))
            .collect()
    }
}

impl SchemeLocator for DirectoryLocator {
    fn modern_scheme_paths(&self) -> Vec<PathBuf> {
        self.list(SchemeFormat::Modern)
    }

    fn legacy_scheme_paths(&self) -> Vec<PathBuf> {
        self.list(SchemeFormat::Legacy)
    }

    fn is_writable(&self, path: &Path) -> bool {
        self.user_dir
            .as_ref()
            .is_some_and(|dir| path.parent() == Some(dir.as_path()))
    }

    fn writable_dir(&self) -> Option<PathBuf> {
        self.user_dir.clone()
    }
}

/// Files of `format` directly inside `dir`, sorted by file name.
fn list_dir(dir: &Path, format: SchemeFormat) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(), // Missing or unreadable directory
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && SchemeFormat::from_path(path) == Some(format))
        .collect();
    paths.sort();
    paths
}
