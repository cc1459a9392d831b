//! Filesystem utilities.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};

/// Ensure a directory exists, creating it if necessary. Tolerates another
/// process creating the same directory concurrently.
pub fn ensure_dir(path: &Path) -> Result<()> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e).with_context(|| format!("failed to create directory: {}", path.display())),
    }
}

/// Write `contents` to `path` unless the file already holds exactly those
/// bytes. Returns whether a write happened.
///
/// Downstream build tools key off mtime, so an unchanged file must keep its
/// timestamp. Replacement goes through a temporary file in the same
/// directory plus a rename, so concurrent readers never observe a partial
/// file.
pub fn write_if_changed(path: &Path, contents: &[u8]) -> Result<bool> {
    match fs::read(path) {
        Ok(existing) if existing == contents => return Ok(false),
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read file: {}", path.display()))
        }
    }

    let dir = path
        .parent()
        .ok_or_else(|| anyhow!("path has no parent directory: {}", path.display()))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(contents)
        .with_context(|| format!("failed to write file: {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("failed to replace file: {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_new_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.txt");

        assert!(write_if_changed(&path, b"hello").unwrap());
        assert_eq!(fs::read(&path).unwrap(), b"hello");
    }

    #[test]
    fn skips_identical_contents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.txt");

        assert!(write_if_changed(&path, b"hello").unwrap());
        let mtime = fs::metadata(&path).unwrap().modified().unwrap();

        assert!(!write_if_changed(&path, b"hello").unwrap());
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), mtime);
    }

    #[test]
    fn rewrites_differing_contents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.txt");

        assert!(write_if_changed(&path, b"hello").unwrap());
        assert!(write_if_changed(&path, b"world").unwrap());
        assert_eq!(fs::read(&path).unwrap(), b"world");
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("a/b/c");

        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }
}
