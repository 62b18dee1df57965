use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::remote::EntryKind;
// Local tree enumeration for mirroring

/// A file or directory below the walked root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEntry {
    /// Path relative to the walk root
    pub relative_path: PathBuf,
    /// Path as found on disk (root joined with `relative_path`)
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl LocalEntry {
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Exclusion patterns applied while walking
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pub exclude_files: Vec<String>,
    pub exclude_dirs: Vec<String>,
}

impl FileFilter {
    pub fn new(exclude_files: &[String], exclude_dirs: &[String]) -> Self {
        Self {
            exclude_files: exclude_files.to_vec(),
            exclude_dirs: exclude_dirs.to_vec(),
        }
    }

    /// Check if a file should be included
    fn should_include_file(&self, path: &Path) -> bool {
        let filename = path.file_name().unwrap_or_default().to_string_lossy();
        !self
            .exclude_files
            .iter()
            .any(|pattern| glob_match(pattern, &filename))
    }

    /// Check if a directory should be included. Any matching component of
    /// the relative path excludes the whole subtree.
    fn should_include_dir(&self, relative: &Path) -> bool {
        for pattern in &self.exclude_dirs {
            for component in relative.components() {
                if let Some(component_str) = component.as_os_str().to_str() {
                    if glob_match(pattern, component_str) {
                        return false;
                    }
                }
            }
        }
        true
    }
}

/// Simple glob matching (supports * wildcards)
fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    if pattern.contains('*') {
        if pattern.starts_with('*') && pattern.ends_with('*') {
            let middle = &pattern[1..pattern.len() - 1];
            return text.contains(middle);
        } else if let Some(suffix) = pattern.strip_prefix('*') {
            return text.ends_with(suffix);
        } else if let Some(prefix) = pattern.strip_suffix('*') {
            return text.starts_with(prefix);
        }
    }

    pattern == text
}

/// Depth-first view of a local directory. Every call to [`LocalTree::entries`]
/// starts a fresh walk.
#[derive(Debug, Clone)]
pub struct LocalTree {
    root: PathBuf,
    filter: FileFilter,
}

impl LocalTree {
    pub fn new(root: impl Into<PathBuf>, filter: FileFilter) -> Self {
        Self {
            root: root.into(),
            filter,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily yield every entry below the root, each directory before its
    /// descendants and siblings in file-name order. The root itself is not
    /// yielded. Unreadable entries surface as `Err` and the caller decides
    /// whether to stop.
    pub fn entries(&self) -> impl Iterator<Item = io::Result<LocalEntry>> + '_ {
        let root = self.root.as_path();
        WalkDir::new(root)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| {
                // Skip excluded directories entirely - this prevents walking into them
                if e.file_type().is_dir() {
                    match e.path().strip_prefix(root) {
                        Ok(rel) => self.filter.should_include_dir(rel),
                        Err(_) => true,
                    }
                } else {
                    self.filter.should_include_file(e.path())
                }
            })
            .map(move |res| {
                let entry = res.map_err(io::Error::from)?;
                let relative_path = entry
                    .path()
                    .strip_prefix(root)
                    .map_err(|_| {
                        io::Error::other(format!(
                            "{} is outside walk root {}",
                            entry.path().display(),
                            root.display()
                        ))
                    })?
                    .to_path_buf();
                let kind = if entry.file_type().is_dir() {
                    EntryKind::Directory
                } else {
                    EntryKind::File
                };
                Ok(LocalEntry {
                    relative_path,
                    path: entry.into_path(),
                    kind,
                })
            })
    }
}
