//! Recursive filesystem searches.
//!
//! Pure functions: they return the best match or `None` and never log.
//! Sibling entries are listed in file-name order, so results are stable
//! across filesystems.

use std::cmp::Ordering;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::validate::is_executable;

/// Sibling traversal policy for the depth-first search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOrder {
    /// Visit siblings in listing order; first match wins
    FirstEncountered,
    /// Visit siblings in reverse listing order before recursing
    ///
    /// Used for the compiler toolchain searches, where the newest versioned
    /// directory sorts last.
    ReverseSiblings,
}

impl SearchOrder {
    fn compare(self, a: &DirEntry, b: &DirEntry) -> Ordering {
        match self {
            SearchOrder::FirstEncountered => a.file_name().cmp(b.file_name()),
            SearchOrder::ReverseSiblings => b.file_name().cmp(a.file_name()),
        }
    }
}

/// Depth-first pre-order walk below `root`, excluding `root` itself
fn walk(root: &Path, order: SearchOrder) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(true)
        .sort_by(move |a, b| order.compare(a, b))
        .into_iter()
        .filter_map(Result::ok)
}

fn name_matches(name: &OsStr, target: &str) -> bool {
    name.to_string_lossy().eq_ignore_ascii_case(target)
}

/// Find an executable file named `file_name` (case-insensitive) below `root`
///
/// Returns the absolute path of the first match in the traversal `order`,
/// or `None` when `root` is missing or nothing matches.
pub fn find_executable(root: &Path, file_name: &str, order: SearchOrder) -> Option<PathBuf> {
    if !root.is_dir() {
        return None;
    }
    walk(root, order)
        .filter(|entry| entry.file_type().is_file())
        .find(|entry| name_matches(entry.file_name(), file_name) && is_executable(entry.path()))
        .map(DirEntry::into_path)
}

/// Find the first file below `root` whose lowercased name is one of `names`
///
/// Used for the interpreter search, which accepts any file with the right
/// name regardless of permissions.
pub fn find_named_file(root: &Path, names: &[&str]) -> Option<PathBuf> {
    if !root.is_dir() {
        return None;
    }
    walk(root, SearchOrder::FirstEncountered)
        .filter(|entry| entry.file_type().is_file())
        .find(|entry| {
            let lower = entry.file_name().to_string_lossy().to_lowercase();
            names.iter().any(|n| *n == lower)
        })
        .map(DirEntry::into_path)
}

/// Climb from `start` through its ancestors to a directory named `Espressif`
///
/// The comparison is case-insensitive and includes `start` itself.
pub fn climb_to_espressif(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.file_name().is_some_and(|n| name_matches(n, "Espressif")))
        .filter(|dir| dir.exists())
        .map(Path::to_path_buf)
}

/// Immediate subdirectories of `parent` in listing order
pub fn subdirectories(parent: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(parent) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}
