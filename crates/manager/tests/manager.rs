use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;

use tempfile::TempDir;
use termscheme_manager::{SchemeManager, SchemeOrigin};
use termscheme_scheme::{ColorEntry, RandomizationRange, Rgb, BACKGROUND_INDEX};

const SOLARIZED: &str = "\
[General]
Description=Solarized
Opacity=0.9

[Color0]
Color=131,148,150

[Color1]
Color=0,43,54
MaxRandomValue=10
";

const LEGACY: &str = "\
title Old Style
color 0 24 240 24 0 0
color 1 0 0 0 1 0
";

struct Dirs {
    user: TempDir,
    system: TempDir,
}

impl Dirs {
    fn new() -> Self {
        Self {
            user: TempDir::new().unwrap(),
            system: TempDir::new().unwrap(),
        }
    }

    fn manager(&self) -> SchemeManager {
        SchemeManager::with_directories(
            Some(self.user.path().to_path_buf()),
            vec![self.system.path().to_path_buf()],
        )
    }
}

fn write(dir: &Path, file_name: &str, content: &str) -> PathBuf {
    let path = dir.join(file_name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_default_scheme_identity() {
    let dirs = Dirs::new();
    let mut manager = dirs.manager();

    let a = manager.default_color_scheme();
    let b = manager.find_color_scheme("").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.name(), "Default");
    assert!(a.is_default_table());
}

#[test]
fn test_find_caches_loaded_scheme() {
    let dirs = Dirs::new();
    write(dirs.system.path(), "Solarized.colorscheme", SOLARIZED);
    let mut manager = dirs.manager();

    let first = manager.find_color_scheme("Solarized").unwrap();
    let second = manager.find_color_scheme("Solarized").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.name(), "Solarized");
    assert_eq!(first.description(), "Solarized");
    assert_eq!(first.opacity(), 0.9);
    assert!(first.randomized_background_color());
    assert_eq!(manager.len(), 1);
    assert_eq!(
        manager.origin("Solarized"),
        Some(&SchemeOrigin::Bundled(
            dirs.system.path().join("Solarized.colorscheme")
        ))
    );
}

#[test]
fn test_user_dir_shadows_system_dir() {
    let dirs = Dirs::new();
    write(dirs.system.path(), "Shared.colorscheme", "[General]\nDescription=system\n");
    write(dirs.user.path(), "Shared.colorscheme", "[General]\nDescription=user\n");
    let mut manager = dirs.manager();

    let scheme = manager.find_color_scheme("Shared").unwrap();
    assert_eq!(scheme.description(), "user");
    assert!(matches!(manager.origin("Shared"), Some(SchemeOrigin::User(_))));
}

#[test]
fn test_legacy_scheme_found_without_modern_file() {
    let dirs = Dirs::new();
    write(dirs.system.path(), "Old.schema", LEGACY);
    let mut manager = dirs.manager();

    let scheme = manager.find_color_scheme("Old").unwrap();
    assert_eq!(scheme.description(), "Old Style");
    assert_eq!(scheme.foreground_color(), Rgb::new(24, 240, 24));
    assert!(scheme.base_table()[BACKGROUND_INDEX].transparent);
}

#[test]
fn test_unknown_scheme_not_found() {
    let dirs = Dirs::new();
    let mut manager = dirs.manager();

    assert!(manager.find_color_scheme("DoesNotExist").is_none());
    assert!(manager.is_empty());
}

#[test]
fn test_all_color_schemes_sorted_by_name() {
    let dirs = Dirs::new();
    write(dirs.user.path(), "Zenburn.colorscheme", "[General]\nDescription=Z\n");
    write(dirs.system.path(), "Alpha.colorscheme", "[General]\nDescription=A\n");
    write(dirs.system.path(), "Middle.schema", LEGACY);
    write(dirs.system.path(), "README.txt", "not a scheme");
    let mut manager = dirs.manager();

    let names: Vec<String> = manager
        .all_color_schemes()
        .iter()
        .map(|scheme| scheme.name().to_string())
        .collect();
    assert_eq!(names, vec!["Alpha", "Middle", "Zenburn"]);

    // Cached handles are reused
    let alpha = manager.find_color_scheme("Alpha").unwrap();
    assert!(Arc::ptr_eq(&alpha, &manager.all_color_schemes()[0]));
}

#[test]
fn test_load_custom_color_scheme() {
    let dirs = Dirs::new();
    let elsewhere = TempDir::new().unwrap();
    let path = write(elsewhere.path(), "myscheme.colorscheme", SOLARIZED);
    let mut manager = dirs.manager();

    assert!(manager.load_custom_color_scheme(&path));
    let scheme = manager.find_color_scheme("myscheme").unwrap();
    assert_eq!(scheme.description(), "Solarized");
    assert_eq!(manager.origin("myscheme"), Some(&SchemeOrigin::Imported(path)));
}

#[test]
fn test_load_custom_color_scheme_rejects_bad_paths() {
    let dirs = Dirs::new();
    let elsewhere = TempDir::new().unwrap();
    let wrong_ext = write(elsewhere.path(), "scheme.toml", "x = 1");
    let mut manager = dirs.manager();

    assert!(!manager.load_custom_color_scheme(&wrong_ext));
    assert!(!manager.load_custom_color_scheme(&elsewhere.path().join("missing.colorscheme")));
    assert!(manager.is_empty());
}

#[test]
fn test_load_custom_color_scheme_replaces_cached() {
    let dirs = Dirs::new();
    write(dirs.system.path(), "Twin.colorscheme", "[General]\nDescription=first\n");
    let elsewhere = TempDir::new().unwrap();
    let path = write(elsewhere.path(), "Twin.colorscheme", "[General]\nDescription=second\n");
    let mut manager = dirs.manager();

    let old = manager.find_color_scheme("Twin").unwrap();
    assert!(manager.load_custom_color_scheme(&path));
    let new = manager.find_color_scheme("Twin").unwrap();

    assert_eq!(old.description(), "first");
    assert_eq!(new.description(), "second");
    assert_eq!(manager.len(), 1);
}

#[test]
fn test_delete_unknown_or_default_returns_false() {
    let dirs = Dirs::new();
    write(dirs.system.path(), "Kept.colorscheme", SOLARIZED);
    let mut manager = dirs.manager();
    manager.find_color_scheme("Kept").unwrap();

    assert!(!manager.delete_color_scheme("Unknown"));
    assert!(!manager.delete_color_scheme(""));
    assert!(!manager.delete_color_scheme("Default"));
    assert_eq!(manager.len(), 1);
}

#[test]
fn test_delete_bundled_scheme_refused() {
    let dirs = Dirs::new();
    let path = write(dirs.system.path(), "Bundled.colorscheme", SOLARIZED);
    let mut manager = dirs.manager();

    assert!(!manager.delete_color_scheme("Bundled"));
    assert!(path.exists());
    assert!(manager.find_color_scheme("Bundled").is_some());
}

#[test]
fn test_delete_user_scheme_removes_file() {
    let dirs = Dirs::new();
    let path = write(dirs.user.path(), "Mine.colorscheme", SOLARIZED);
    let mut manager = dirs.manager();
    let handle = manager.find_color_scheme("Mine").unwrap();

    assert!(manager.delete_color_scheme("Mine"));
    assert!(!path.exists());
    assert!(!manager.contains("Mine"));
    assert!(manager.find_color_scheme("Mine").is_none());
    // Handles already given out stay valid
    assert_eq!(handle.description(), "Solarized");
}

#[test]
fn test_delete_imported_scheme_keeps_source() {
    let dirs = Dirs::new();
    let elsewhere = TempDir::new().unwrap();
    let path = write(elsewhere.path(), "Guest.colorscheme", SOLARIZED);
    let mut manager = dirs.manager();
    assert!(manager.load_custom_color_scheme(&path));

    assert!(manager.delete_color_scheme("Guest"));
    assert!(path.exists());
    assert!(!manager.contains("Guest"));
}

#[test]
fn test_update_publishes_new_version_and_flush_saves() {
    let dirs = Dirs::new();
    write(dirs.system.path(), "Editable.colorscheme", SOLARIZED);
    let mut manager = dirs.manager();

    let before = manager.find_color_scheme("Editable").unwrap();
    let after = manager
        .update_color_scheme("Editable", |scheme| {
            scheme.set_description("Edited");
            scheme
                .set_color_table_entry(0, ColorEntry::plain(Rgb::new(1, 2, 3)))
                .unwrap();
        })
        .unwrap();

    assert_eq!(before.description(), "Solarized");
    assert_eq!(after.description(), "Edited");
    assert!(!Arc::ptr_eq(&before, &after));
    assert!(manager.is_dirty("Editable"));
    assert_eq!(manager.dirty_count(), 1);

    assert_eq!(manager.flush().unwrap(), 1);
    assert!(!manager.is_dirty("Editable"));

    // Saved into the user directory, the bundled file is untouched
    let saved = dirs.user.path().join("Editable.colorscheme");
    assert!(saved.exists());
    assert_eq!(manager.origin("Editable"), Some(&SchemeOrigin::User(saved)));
    let bundled = fs::read_to_string(dirs.system.path().join("Editable.colorscheme")).unwrap();
    assert_eq!(bundled, SOLARIZED);

    let mut reopened = dirs.manager();
    let reloaded = reopened.find_color_scheme("Editable").unwrap();
    assert_eq!(reloaded.description(), "Edited");
    assert_eq!(reloaded.foreground_color(), Rgb::new(1, 2, 3));
    assert_eq!(
        reloaded.randomization_range(BACKGROUND_INDEX),
        Some(RandomizationRange::new(0, 0, 10))
    );
}

#[test]
fn test_update_default_scheme_refused() {
    let dirs = Dirs::new();
    let mut manager = dirs.manager();

    assert!(manager.update_color_scheme("", |scheme| scheme.set_opacity(0.5)).is_none());
    assert_eq!(manager.default_color_scheme().opacity(), 1.0);
}

#[test]
fn test_add_and_shutdown_persists() {
    let dirs = Dirs::new();
    let mut manager = dirs.manager();

    let mut scheme = termscheme_scheme::ColorScheme::new();
    scheme.set_name("Created");
    scheme.set_description("Made at runtime");
    scheme
        .set_randomization_range(BACKGROUND_INDEX, 20, 0, 0)
        .unwrap();
    scheme.set_randomized_background_color(true);

    let added = manager.add_color_scheme(scheme).unwrap();
    assert_eq!(added.name(), "Created");
    assert_eq!(manager.origin("Created"), Some(&SchemeOrigin::Memory));
    assert_eq!(manager.shutdown().unwrap(), 1);

    let path = dirs.user.path().join("Created.colorscheme");
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("Description=Made at runtime"));

    let mut reopened = dirs.manager();
    let reloaded = reopened.find_color_scheme("Created").unwrap();
    assert!(reloaded.randomized_background_color());
    assert_eq!(
        reloaded.randomization_range(BACKGROUND_INDEX),
        Some(RandomizationRange::new(20, 0, 0))
    );
}

#[test]
fn test_flush_with_nothing_dirty() {
    let dirs = Dirs::new();
    write(dirs.system.path(), "Clean.colorscheme", SOLARIZED);
    let mut manager = dirs.manager();
    manager.find_color_scheme("Clean").unwrap();

    assert_eq!(manager.flush().unwrap(), 0);
    assert!(fs::read_dir(dirs.user.path()).unwrap().next().is_none());
}

#[test]
fn test_non_utf8_scheme_is_found() {
    let dirs = Dirs::new();
    fs::write(
        dirs.user.path().join("Latin.colorscheme"),
        b"[General]\nDescription=Caf\xe9\n\n[Color0]\nColor=1,2,3\n",
    )
    .unwrap();
    write(dirs.user.path(), "Latin.schema", LEGACY);
    let mut manager = dirs.manager();

    let found = manager.find_color_scheme("Latin").unwrap();
    assert_eq!(found.foreground_color(), Rgb::new(1, 2, 3));

    let mut fresh = dirs.manager();
    let listed = fresh.all_color_schemes();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].foreground_color(), Rgb::new(1, 2, 3));
}

#[test]
fn test_add_rejects_names_escaping_the_directory() {
    let root = TempDir::new().unwrap();
    let user = root.path().join("user");
    fs::create_dir(&user).unwrap();
    let mut manager = SchemeManager::with_directories(Some(user.clone()), Vec::new());

    for name in ["../escaped", "a/b", "..", "."] {
        let mut scheme = termscheme_scheme::ColorScheme::new();
        scheme.set_name(name);
        assert!(manager.add_color_scheme(scheme).is_none(), "{name:?} accepted");
    }

    assert_eq!(manager.flush().unwrap(), 0);
    assert!(!root.path().join("escaped.colorscheme").exists());
    assert!(!user.join("a").exists());
    assert!(fs::read_dir(&user).unwrap().next().is_none());
}

#[test]
fn test_manager_shared_behind_a_lock() {
    let dirs = Dirs::new();
    write(dirs.system.path(), "Shared.colorscheme", SOLARIZED);
    let manager = Arc::new(Mutex::new(dirs.manager()));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || manager.lock().unwrap().find_color_scheme("Shared"))
        })
        .collect();
    let found: Vec<Arc<termscheme_scheme::ColorScheme>> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().unwrap())
        .collect();

    assert!(found.iter().all(|scheme| Arc::ptr_eq(scheme, &found[0])));
    assert_eq!(manager.lock().unwrap().len(), 1);
}
