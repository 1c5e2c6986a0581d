//! Whole-file replacement through a sibling temp file.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::error::PapertraderError;

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `contents` to `path` so readers see either the old file or the new
/// one, never a partial write.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), PapertraderError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PapertraderError::storage(parent, e))?;
    }

    let temp = temp_path(path);
    let file = File::create(&temp).map_err(|e| PapertraderError::storage(&temp, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents)
        .and_then(|_| writer.flush())
        .map_err(|e| PapertraderError::storage(&temp, e))?;
    drop(writer);

    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(PapertraderError::storage(path, e));
    }
    Ok(())
}

/// Finish an in-memory CSV writer and hand back its bytes.
pub fn csv_bytes(writer: csv::Writer<Vec<u8>>, path: &Path) -> Result<Vec<u8>, PapertraderError> {
    writer
        .into_inner()
        .map_err(|e| PapertraderError::storage(path, e.error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_parent_dirs_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        write_atomic(&path, b"first\n").unwrap();
        write_atomic(&path, b"second\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second\n");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn temp_path_is_a_sibling() {
        let temp = temp_path(Path::new("/data/portfolio.csv"));
        assert_eq!(temp, PathBuf::from("/data/portfolio.csv.tmp"));
    }

    #[test]
    fn unwritable_target_is_storage_error() {
        let dir = TempDir::new().unwrap();
        // A directory in the way of the rename target.
        let path = dir.path().join("blocked");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("inner"), b"x").unwrap();

        let err = write_atomic(&path, b"data").unwrap_err();
        assert!(matches!(err, PapertraderError::Storage { .. }));
    }
}
