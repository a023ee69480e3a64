//! Filesystem walker for enumerating the files of a sync root

use crate::error::StorageError;
use std::collections::HashSet;
use std::path::PathBuf;
use walkdir::{DirEntry, WalkDir};

/// A regular file found under the sync root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size: u64,
}

/// Filesystem walker configuration
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Whether to follow symbolic links (default: false)
    pub follow_symlinks: bool,
    /// Path component names to skip entirely (none by default)
    pub ignore_patterns: Vec<String>,
    /// Absolute paths to skip, such as the manifest when it lives inside the root
    pub excluded_paths: HashSet<PathBuf>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            ignore_patterns: Vec::new(),
            excluded_paths: HashSet::new(),
        }
    }
}

/// Filesystem walker
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given root path
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: WalkerConfig::default(),
        }
    }

    /// Create a walker with custom configuration
    pub fn with_config(root: PathBuf, config: WalkerConfig) -> Self {
        Self { root, config }
    }

    /// Collect every regular file under the root.
    ///
    /// Entries come back sorted by path so logs are reproducible; callers
    /// must not depend on the order for correctness.
    pub fn walk(&self) -> Result<Vec<FileEntry>, StorageError> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .into_iter()
            .filter_entry(|entry| !self.should_ignore(entry));

        for entry in walker {
            let entry = entry.map_err(|e| StorageError::Walk(e.to_string()))?;

            if !entry.file_type().is_file() {
                // Directories, and symlinks when not following them
                continue;
            }

            let path = entry.path().to_path_buf();
            if self.config.excluded_paths.contains(&path) {
                continue;
            }

            let metadata = entry
                .metadata()
                .map_err(|e| StorageError::Walk(format!("{:?}: {}", path, e)))?;

            files.push(FileEntry {
                path,
                size: metadata.len(),
            });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    fn should_ignore(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        self.config
            .ignore_patterns
            .iter()
            .any(|pattern| pattern.as_str() == name)
    }
}
