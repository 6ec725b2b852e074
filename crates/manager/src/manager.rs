//! Scheme directory: discovery, lazy loading, caching and persistence.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use termscheme_scheme::{
    load_scheme, scheme_name, write_modern, ColorScheme, SchemeFormat, MODERN_EXTENSION,
};

use crate::locator::{DirectoryLocator, SchemeLocator};

/// Built-in scheme shared by every manager.
static DEFAULT_SCHEME: OnceLock<Arc<ColorScheme>> = OnceLock::new();

fn built_in_scheme() -> &'static Arc<ColorScheme> {
    DEFAULT_SCHEME.get_or_init(|| Arc::new(ColorScheme::built_in()))
}

/// Where a cached scheme came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemeOrigin {
    /// File in the writable user directory
    User(PathBuf),
    /// File in a read-only system directory
    Bundled(PathBuf),
    /// File loaded with [`SchemeManager::load_custom_color_scheme`]
    Imported(PathBuf),
    /// Created by the application, not saved yet
    Memory,
}

#[derive(Debug)]
struct CachedScheme {
    scheme: Arc<ColorScheme>,
    origin: SchemeOrigin,
    dirty: bool,
}

/// Manages the color schemes available to terminal displays.
///
/// Schemes are loaded from disk the first time they are requested and
/// cached afterwards. Cached schemes are shared as `Arc<ColorScheme>` and
/// never mutated in place: [`SchemeManager::update_color_scheme`] publishes
/// a modified copy and marks it for saving. Modified schemes are written by
/// [`SchemeManager::flush`] or [`SchemeManager::shutdown`].
pub struct SchemeManager {
    locator: Box<dyn SchemeLocator>,
    schemes: HashMap<String, CachedScheme>,
    have_loaded_all: bool,
}

impl SchemeManager {
    /// Create a manager. No scheme is loaded until requested.
    pub fn new(locator: impl SchemeLocator + 'static) -> Self {
        Self {
            locator: Box::new(locator),
            schemes: HashMap::new(),
            have_loaded_all: false,
        }
    }

    /// Create a manager over a user directory and system directories.
    pub fn with_directories(user_dir: Option<PathBuf>, system_dirs: Vec<PathBuf>) -> Self {
        Self::new(DirectoryLocator::new(user_dir, system_dirs))
    }

    /// The built-in scheme. Always available, never read from disk.
    pub fn default_color_scheme(&self) -> Arc<ColorScheme> {
        Arc::clone(built_in_scheme())
    }

    /// Find a scheme by name, loading it from disk on first request.
    ///
    /// An empty name returns the default scheme. Returns `None` if no
    /// scheme file with that name exists or it cannot be read.
    pub fn find_color_scheme(&mut self, name: &str) -> Option<Arc<ColorScheme>> {
        if name.is_empty() {
            return Some(self.default_color_scheme());
        }

        if let Some(cached) = self.schemes.get(name) {
            return Some(Arc::clone(&cached.scheme));
        }

        let Some(path) = self.find_color_scheme_path(name) else {
            log::debug!("Color scheme '{}' not found", name);
            return None;
        };

        let scheme = self.load_from_path(&path)?;
        let origin = self.origin_for(path);
        Some(self.insert(name.to_string(), scheme, origin, false))
    }

    /// All available schemes, sorted by name.
    ///
    /// The first call reads every scheme file found by the locator, which
    /// may be slow. Later calls only read the cache.
    pub fn all_color_schemes(&mut self) -> Vec<Arc<ColorScheme>> {
        if !self.have_loaded_all {
            self.load_all_color_schemes();
        }

        let mut names: Vec<&String> = self.schemes.keys().collect();
        names.sort();
        names
            .into_iter()
            .map(|name| Arc::clone(&self.schemes[name].scheme))
            .collect()
    }

    /// Delete a scheme.
    ///
    /// User schemes lose their file; imported and unsaved schemes are only
    /// dropped from the cache. Returns `false` for unknown names, the
    /// built-in default and schemes in read-only directories.
    pub fn delete_color_scheme(&mut self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }

        let origin = match self.schemes.get(name) {
            Some(cached) => cached.origin.clone(),
            None => match self.find_color_scheme_path(name) {
                Some(path) => self.origin_for(path),
                None => return false,
            },
        };

        match origin {
            SchemeOrigin::Bundled(path) => {
                log::warn!(
                    "Cannot delete read-only color scheme '{}' ({})",
                    name,
                    path.display()
                );
                false
            }
            SchemeOrigin::User(path) => match fs::remove_file(&path) {
                Ok(()) => {
                    self.schemes.remove(name);
                    log::info!("Deleted color scheme '{}' ({})", name, path.display());
                    true
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    self.schemes.remove(name);
                    true
                }
                Err(e) => {
                    log::error!("Failed to delete {}: {}", path.display(), e);
                    false
                }
            },
            SchemeOrigin::Imported(_) | SchemeOrigin::Memory => {
                self.schemes.remove(name);
                true
            }
        }
    }

    /// Load a `.colorscheme` or `.schema` file from an arbitrary path.
    ///
    /// The scheme becomes available under the file's base name, replacing
    /// any cached scheme with that name.
    pub fn load_custom_color_scheme(&mut self, path: &Path) -> bool {
        let Some(name) = scheme_name(path).filter(|name| !name.is_empty()) else {
            log::warn!("Cannot derive a scheme name from {}", path.display());
            return false;
        };

        let Some(scheme) = self.load_from_path(path) else {
            return false;
        };

        if let Some(existing) = self.schemes.get(&name) {
            log::warn!(
                "Color scheme '{}' from {} replaces the one from {:?}",
                name,
                path.display(),
                existing.origin
            );
            if existing.dirty {
                log::warn!("Unsaved changes to color scheme '{}' were discarded", name);
            }
        }

        let origin = if self.locator.is_writable(path) {
            SchemeOrigin::User(path.to_path_buf())
        } else {
            SchemeOrigin::Imported(path.to_path_buf())
        };
        self.insert(name, scheme, origin, false);
        true
    }

    /// Publish a scheme created by the application under its name.
    ///
    /// The scheme is marked modified and saved on the next flush. Returns
    /// `None` if the name is empty or is not a plain file name.
    pub fn add_color_scheme(&mut self, scheme: ColorScheme) -> Option<Arc<ColorScheme>> {
        let name = scheme.name().to_string();
        if !is_valid_scheme_name(&name) {
            log::warn!("Refusing to add a color scheme named '{}'", name);
            return None;
        }

        // Keep saving to the same file when overwriting a user scheme
        let origin = match self.schemes.get(&name).map(|cached| &cached.origin) {
            Some(SchemeOrigin::User(path)) => SchemeOrigin::User(path.clone()),
            _ => SchemeOrigin::Memory,
        };
        Some(self.insert(name, scheme, origin, true))
    }

    /// Modify a scheme.
    ///
    /// `update` receives a copy of the current scheme; the result replaces
    /// it in the cache and is marked modified. Handles obtained earlier keep
    /// seeing the old version. The default scheme cannot be modified.
    pub fn update_color_scheme<F>(&mut self, name: &str, update: F) -> Option<Arc<ColorScheme>>
    where
        F: FnOnce(&mut ColorScheme),
    {
        if name.is_empty() {
            return None;
        }

        let current = self.find_color_scheme(name)?;
        let mut scheme = ColorScheme::clone(&current);
        update(&mut scheme);
        scheme.set_name(name);

        let cached = self.schemes.get_mut(name)?;
        cached.scheme = Arc::new(scheme);
        cached.dirty = true;
        Some(Arc::clone(&cached.scheme))
    }

    /// Whether `name` has modifications that are not saved yet.
    pub fn is_dirty(&self, name: &str) -> bool {
        self.schemes.get(name).is_some_and(|cached| cached.dirty)
    }

    pub fn dirty_count(&self) -> usize {
        self.schemes.values().filter(|cached| cached.dirty).count()
    }

    /// Origin of a cached scheme.
    pub fn origin(&self, name: &str) -> Option<&SchemeOrigin> {
        self.schemes.get(name).map(|cached| &cached.origin)
    }

    /// Whether `name` is cached.
    pub fn contains(&self, name: &str) -> bool {
        self.schemes.contains_key(name)
    }

    /// Number of cached schemes, not counting the default.
    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }

    /// Save every modified scheme.
    ///
    /// Schemes are written in the key/value format: user schemes to their
    /// own file, others to `<name>.colorscheme` in the writable directory.
    /// Returns the number of schemes written.
    pub fn flush(&mut self) -> Result<usize> {
        let writable_dir = self.locator.writable_dir();
        let mut written = 0;
        let mut failed = Vec::new();

        for (name, cached) in self.schemes.iter_mut().filter(|(_, cached)| cached.dirty) {
            let target = match (&cached.origin, &writable_dir) {
                (SchemeOrigin::User(path), _)
                    if SchemeFormat::from_path(path) == Some(SchemeFormat::Modern) =>
                {
                    Some(path.clone())
                }
                (_, Some(dir)) => scheme_file_in(dir, name),
                (_, None) => None,
            };
            let Some(path) = target.filter(|path| self.locator.is_writable(path)) else {
                log::error!("No writable location to save color scheme '{}'", name);
                failed.push(name.clone());
                continue;
            };

            match write_scheme(&path, &cached.scheme) {
                Ok(()) => {
                    log::info!("Saved color scheme '{}' to {}", name, path.display());
                    cached.origin = SchemeOrigin::User(path);
                    cached.dirty = false;
                    written += 1;
                }
                Err(e) => {
                    log::error!("{:#}", e);
                    failed.push(name.clone());
                }
            }
        }

        if failed.is_empty() {
            Ok(written)
        } else {
            failed.sort();
            Err(anyhow::anyhow!(
                "Failed to save color schemes: {}",
                failed.join(", ")
            ))
        }
    }

    /// Save modified schemes and release the manager.
    pub fn shutdown(mut self) -> Result<usize> {
        self.flush()
    }

    /// Path of the scheme file for `name`, key/value files first.
    fn find_color_scheme_path(&self, name: &str) -> Option<PathBuf> {
        let matches = |path: &PathBuf| scheme_name(path).as_deref() == Some(name);

        self.locator
            .modern_scheme_paths()
            .into_iter()
            .find(matches)
            .or_else(|| self.locator.legacy_scheme_paths().into_iter().find(matches))
    }

    fn load_all_color_schemes(&mut self) {
        let paths = self
            .locator
            .modern_scheme_paths()
            .into_iter()
            .chain(self.locator.legacy_scheme_paths());

        let mut loaded = 0;
        let mut seen = HashSet::new();
        for path in paths {
            let Some(name) = scheme_name(&path) else {
                continue;
            };
            // Only the first file of a name counts, as in find_color_scheme
            if !seen.insert(name.clone()) || self.schemes.contains_key(&name) {
                continue;
            }
            if let Some(scheme) = self.load_from_path(&path) {
                let origin = self.origin_for(path);
                self.insert(name, scheme, origin, false);
                loaded += 1;
            }
        }

        log::debug!("Loaded {} color schemes", loaded);
        self.have_loaded_all = true;
    }

    fn load_from_path(&self, path: &Path) -> Option<ColorScheme> {
        match load_scheme(path) {
            Ok(scheme) => Some(scheme),
            Err(e) => {
                log::warn!("Failed to load color scheme: {}", e);
                None
            }
        }
    }

    fn origin_for(&self, path: PathBuf) -> SchemeOrigin {
        if self.locator.is_writable(&path) {
            SchemeOrigin::User(path)
        } else {
            SchemeOrigin::Bundled(path)
        }
    }

    fn insert(
        &mut self,
        name: String,
        mut scheme: ColorScheme,
        origin: SchemeOrigin,
        dirty: bool,
    ) -> Arc<ColorScheme> {
        scheme.set_name(name.clone());
        let scheme = Arc::new(scheme);
        self.schemes.insert(
            name,
            CachedScheme {
                scheme: Arc::clone(&scheme),
                origin,
                dirty,
            },
        );
        scheme
    }
}

impl Drop for SchemeManager {
    fn drop(&mut self) {
        let dirty = self.dirty_count();
        if dirty > 0 {
            log::warn!("{} modified color scheme(s) dropped without saving", dirty);
        }
    }
}

/// Whether `name` can be used as a file name inside the scheme directory.
fn is_valid_scheme_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    single && !name.contains(['/', '\\'])
}

/// `<dir>/<name>.colorscheme`, if that stays directly inside `dir`.
fn scheme_file_in(dir: &Path, name: &str) -> Option<PathBuf> {
    if !is_valid_scheme_name(name) {
        return None;
    }
    let path = dir.join(format!("{}.{}", name, MODERN_EXTENSION));
    (path.parent() == Some(dir)).then_some(path)
}

fn write_scheme(path: &Path, scheme: &ColorScheme) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, write_modern(scheme))
        .with_context(|| format!("Failed to write color scheme {}", path.display()))?;
    Ok(())
}
