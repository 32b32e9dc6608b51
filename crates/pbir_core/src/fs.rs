use std::io::{Error, ErrorKind, Result};
use std::path::{Path, PathBuf};

/// Kind of a directory entry returned by [`FileSystem::read_dir`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
}

/// One entry in a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name without any path components
    pub name: String,
    /// File or directory
    pub kind: EntryKind,
}

impl DirEntry {
    /// Construct a file entry
    pub fn file(name: impl Into<String>) -> Self {
        DirEntry {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    /// Construct a directory entry
    pub fn directory(name: impl Into<String>) -> Self {
        DirEntry {
            name: name.into(),
            kind: EntryKind::Directory,
        }
    }
}

/// Abstraction over the directory source a report is scanned from.
/// Allows for different implementations: real filesystem, in-memory
/// (for WASM hosts and tests), etc.
pub trait FileSystem {
    /// Reads file content as UTF-8 text (for parsing PBIR JSON)
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Overwrites an existing file with new content (for saving edits).
    /// Implementations must not leave a partially written file open.
    fn write_file(&self, path: &Path, content: &str) -> Result<()>;

    /// Lists the immediate entries of a directory with their kinds
    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntry>>;

    /// Checks if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Checks if a path is a directory
    fn is_dir(&self, path: &Path) -> bool;
}

// Blanket implementation for references to FileSystem
impl<T: FileSystem> FileSystem for &T {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        (*self).read_to_string(path)
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        (*self).write_file(path, content)
    }

    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntry>> {
        (*self).read_dir(dir)
    }

    fn exists(&self, path: &Path) -> bool {
        (*self).exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        (*self).is_dir(path)
    }
}

// ============================================================================
// RealFileSystem - Only available on non-WASM targets
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
use std::fs;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Copy)]
/// This is a simple filesystem implementation that simply maps to std::fs methods
pub struct RealFileSystem;

#[cfg(not(target_arch = "wasm32"))]
impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path)
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        fs::write(path, content)
    }

    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

// ============================================================================
// InMemoryFileSystem - Available on all targets, including WASM
// ============================================================================

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// An in-memory filesystem implementation
/// Useful for WASM hosts where real filesystem access is not available
/// Also useful for testing
#[derive(Clone, Default)]
pub struct InMemoryFileSystem {
    /// Files stored as path -> content
    files: Arc<RwLock<HashMap<PathBuf, String>>>,
    /// Directories that exist (implicitly created when files are added)
    directories: Arc<RwLock<HashSet<PathBuf>>>,
}

impl InMemoryFileSystem {
    /// Create a new empty in-memory filesystem
    pub fn new() -> Self {
        Self {
            files: Arc::new(RwLock::new(HashMap::new())),
            directories: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Create a filesystem pre-populated with files
    pub fn with_files(entries: Vec<(PathBuf, String)>) -> Self {
        let fs = Self::new();
        {
            let mut files = fs.files.write().unwrap();
            let mut dirs = fs.directories.write().unwrap();

            for (path, content) in entries {
                Self::insert_parents(&mut dirs, &path);
                files.insert(path, content);
            }
        }
        fs
    }

    /// Load files from a list of (path_string, content) tuples.
    /// Convenience method for host interop.
    pub fn load_from_entries(entries: Vec<(String, String)>) -> Self {
        let entries: Vec<(PathBuf, String)> = entries
            .into_iter()
            .map(|(path, content)| (PathBuf::from(path), content))
            .collect();
        Self::with_files(entries)
    }

    /// Export all files as (path_string, content) tuples
    pub fn export_entries(&self) -> Vec<(String, String)> {
        let files = self.files.read().unwrap();
        files
            .iter()
            .map(|(path, content)| (path.to_string_lossy().to_string(), content.clone()))
            .collect()
    }

    fn insert_parents(dirs: &mut HashSet<PathBuf>, path: &Path) {
        let mut current = path;
        while let Some(parent) = current.parent() {
            if !parent.as_os_str().is_empty() {
                dirs.insert(parent.to_path_buf());
            }
            current = parent;
        }
    }

    /// Helper to normalize paths (remove . and .. components where possible)
    fn normalize_path(path: &Path) -> PathBuf {
        let mut components = Vec::new();
        for component in path.components() {
            use std::path::Component;
            match component {
                Component::CurDir => {} // Skip "."
                Component::ParentDir => {
                    if !components.is_empty() {
                        components.pop();
                    }
                }
                c => components.push(c),
            }
        }
        components.iter().collect()
    }
}

impl FileSystem for InMemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let normalized = Self::normalize_path(path);
        let files = self.files.read().unwrap();
        files
            .get(&normalized)
            .cloned()
            .ok_or_else(|| Error::new(ErrorKind::NotFound, format!("File not found: {:?}", path)))
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        let normalized = Self::normalize_path(path);

        {
            let mut dirs = self.directories.write().unwrap();
            Self::insert_parents(&mut dirs, &normalized);
        }

        let mut files = self.files.write().unwrap();
        files.insert(normalized, content.to_string());
        Ok(())
    }

    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntry>> {
        let normalized = Self::normalize_path(dir);
        let files = self.files.read().unwrap();
        let dirs = self.directories.read().unwrap();

        if !dirs.contains(&normalized) {
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("Directory not found: {:?}", dir),
            ));
        }

        let mut entries = Vec::new();
        for path in files.keys() {
            if let Some(parent) = path.parent()
                && parent == normalized
                && let Some(name) = path.file_name()
            {
                entries.push(DirEntry::file(name.to_string_lossy()));
            }
        }
        for path in dirs.iter() {
            if let Some(parent) = path.parent()
                && parent == normalized
                && let Some(name) = path.file_name()
            {
                entries.push(DirEntry::directory(name.to_string_lossy()));
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn exists(&self, path: &Path) -> bool {
        let normalized = Self::normalize_path(path);
        let files = self.files.read().unwrap();
        let dirs = self.directories.read().unwrap();
        files.contains_key(&normalized) || dirs.contains(&normalized)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let normalized = Self::normalize_path(path);
        let dirs = self.directories.read().unwrap();
        dirs.contains(&normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_fs_basic_operations() {
        let fs = InMemoryFileSystem::new();

        fs.write_file(Path::new("report/page.json"), "{}").unwrap();
        assert_eq!(
            fs.read_to_string(Path::new("report/page.json")).unwrap(),
            "{}"
        );

        assert!(fs.exists(Path::new("report/page.json")));
        assert!(!fs.exists(Path::new("report/visual.json")));
        assert!(fs.is_dir(Path::new("report")));
    }

    #[test]
    fn test_in_memory_fs_read_dir_kinds() {
        let fs = InMemoryFileSystem::new();

        fs.write_file(Path::new("root/page.json"), "{}").unwrap();
        fs.write_file(Path::new("root/visuals/v1/visual.json"), "{}")
            .unwrap();

        let entries = fs.read_dir(Path::new("root")).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.contains(&DirEntry::file("page.json")));
        assert!(entries.contains(&DirEntry::directory("visuals")));
    }

    #[test]
    fn test_in_memory_fs_read_dir_missing() {
        let fs = InMemoryFileSystem::new();
        assert!(fs.read_dir(Path::new("nope")).is_err());
    }

    #[test]
    fn test_in_memory_fs_path_normalization() {
        let fs = InMemoryFileSystem::new();

        fs.write_file(Path::new("dir/visual.json"), "{}").unwrap();

        assert!(fs.exists(Path::new("dir/visual.json")));
        assert!(fs.exists(Path::new("dir/./visual.json")));
        assert!(fs.exists(Path::new("dir/subdir/../visual.json")));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_real_fs_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let fs = RealFileSystem;
        let file = tmp.path().join("page.json");

        fs.write_file(&file, "{\"displayName\":\"Overview\"}")
            .unwrap();
        assert_eq!(
            fs.read_to_string(&file).unwrap(),
            "{\"displayName\":\"Overview\"}"
        );

        let entries = fs.read_dir(tmp.path()).unwrap();
        assert_eq!(entries, vec![DirEntry::file("page.json")]);
    }
}
