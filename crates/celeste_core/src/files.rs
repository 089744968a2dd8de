//! Lookup of the data files that ship at the distribution root

use std::path::{Path, PathBuf};

/// Find a data file by name.
///
/// Checks the working directory first, then the directory holding the
/// executable and finally its parent (covers `target/<profile>/` layouts).
/// Returns `None` when no candidate exists. Found paths are absolute, so
/// they mean the same thing to the asset server as to `std::fs`.
pub fn locate_data_file(name: impl AsRef<Path>) -> Option<PathBuf> {
    let name = name.as_ref();
    candidates(name).into_iter().find(|p| p.is_file())
}

/// Find an asset directory the same way as [`locate_data_file`]
pub fn locate_data_dir(name: impl AsRef<Path>) -> Option<PathBuf> {
    let name = name.as_ref();
    candidates(name).into_iter().find(|p| p.is_dir())
}

/// `path` joined onto the working directory unless it is already absolute
pub fn absolute_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Path the tools write data files to: always relative to the working directory.
pub fn writable_data_path(name: impl AsRef<Path>) -> PathBuf {
    name.as_ref().to_path_buf()
}

fn candidates(name: &Path) -> Vec<PathBuf> {
    if name.is_absolute() {
        return vec![name.to_path_buf()];
    }
    let mut out = vec![absolute_path(name)];
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        out.push(exe_dir.join(name));
        if let Some(parent) = exe_dir.parent() {
            out.push(parent.join(name));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_path_is_only_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("enemy_spawns.json");
        std::fs::write(&file, "[]").unwrap();

        assert_eq!(locate_data_file(&file), Some(file.clone()));
        assert_eq!(locate_data_file(dir.path().join("missing.json")), None);
    }

    #[test]
    fn test_dirs_and_files_are_told_apart() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(locate_data_dir(dir.path()), Some(dir.path().to_path_buf()));
        assert_eq!(locate_data_file(dir.path()), None);
    }

    #[test]
    fn test_found_relative_dir_is_absolute() {
        // Tests run from the crate root, which holds `src/`
        let found = locate_data_dir("src").unwrap();
        assert!(found.is_absolute());
        assert_eq!(found, std::env::current_dir().unwrap().join("src"));
        assert!(locate_data_file("Cargo.toml").unwrap().is_absolute());
    }

    #[test]
    fn test_absolute_path_keeps_absolute_input() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(absolute_path(dir.path()), dir.path().to_path_buf());
        assert!(absolute_path("assets/sprites").ends_with("assets/sprites"));
        assert!(absolute_path("assets/sprites").is_absolute());
    }

    #[test]
    fn test_writable_path_is_relative_to_cwd() {
        assert_eq!(
            writable_data_path("editor_blueprint.json"),
            PathBuf::from("editor_blueprint.json")
        );
    }
}
