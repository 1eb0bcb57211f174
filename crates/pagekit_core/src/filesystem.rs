use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::config::ScanSection;
use crate::runtime::normalize_for_display;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub file_names: Vec<String>,
    pub excluded_dirs: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::from_config(&ScanSection::default())
    }
}

impl ScanOptions {
    pub fn from_config(scan: &ScanSection) -> Self {
        Self {
            file_names: scan
                .file_names
                .iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
            excluded_dirs: scan
                .excluded_dirs
                .iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }

    fn is_page_file(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_file()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.file_names.iter().any(|candidate| candidate == name))
    }

    /// Directory-name substrings are matched against the path below the root,
    /// so a root that itself lives under e.g. `/srv/data` still gets scanned.
    fn is_excluded(&self, root: &Path, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        let relative = relative_display(root, entry.path());
        self.excluded_dirs
            .iter()
            .any(|excluded| relative.contains(excluded.as_str()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageFile {
    #[serde(skip)]
    pub path: PathBuf,
    pub relative_path: String,
}

/// Enumerate page files below `root`, sorted by relative path.
///
/// Unreadable directories are treated as empty and symlinks are not followed.
pub fn scan_page_files(root: &Path, options: &ScanOptions) -> Vec<PageFile> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !options.is_excluded(root, entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                debug!(%error, "skipping unreadable path during scan");
                continue;
            }
        };
        if !options.is_page_file(&entry) {
            continue;
        }
        files.push(PageFile {
            relative_path: relative_display(root, entry.path()),
            path: entry.into_path(),
        });
    }

    files.sort_by(|left, right| left.relative_path.cmp(&right.relative_path));
    files
}

fn relative_display(root: &Path, path: &Path) -> String {
    normalize_for_display(path.strip_prefix(root).unwrap_or(path))
}
