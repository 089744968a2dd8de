//! Where the tools read and write the shared data files

use celeste_core::{locate_data_dir, locate_data_file, writable_data_path};
use std::path::{Path, PathBuf};

/// Data file locations.
///
/// The default follows the distribution lookup (working directory, then the
/// executable directory). A fixed directory is used by tests and by
/// `--data-dir`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataFiles {
    dir: Option<PathBuf>,
}

impl DataFiles {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Existing file to read, if any
    pub fn existing(&self, name: &str) -> Option<PathBuf> {
        match &self.dir {
            Some(dir) => Some(dir.join(name)).filter(|p| p.is_file()),
            None => locate_data_file(name),
        }
    }

    /// Existing directory, or the plain path when nothing was found
    pub fn directory(&self, name: &str) -> PathBuf {
        match &self.dir {
            Some(dir) => dir.join(name),
            None => locate_data_dir(name).unwrap_or_else(|| PathBuf::from(name)),
        }
    }

    /// File to write
    pub fn writable(&self, name: &str) -> PathBuf {
        match &self.dir {
            Some(dir) => dir.join(name),
            None => writable_data_path(name),
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_dir_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let files = DataFiles::in_dir(dir.path());
        assert!(files.existing("a.json").is_none());
        std::fs::write(dir.path().join("a.json"), "[]").unwrap();
        assert_eq!(files.existing("a.json"), Some(dir.path().join("a.json")));
        assert_eq!(files.writable("b.json"), dir.path().join("b.json"));
    }
}
