use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Finds `name` inside `dir`, first by exact name and then by a
/// case-insensitive scan. Game data ships with inconsistent casing.
pub(crate) fn resolve_case_insensitive(dir: &Path, name: &str) -> Option<PathBuf> {
    let exact = dir.join(name);
    if exact.exists() {
        return Some(exact);
    }

    let entries = fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let file_name = entry.file_name();
        if file_name
            .to_str()
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
        {
            return Some(entry.path());
        }
    }
    None
}

/// Removes a directory tree. A missing directory counts as removed.
pub(crate) fn remove_tree(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(error),
    }
}
