//! Directory inspection used for the on-disk data size report.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::AppResult;

/// Maps every regular file under `dir` to its size in bytes.
///
/// # Errors
///
/// Returns an error when the walk cannot read an entry's metadata.
pub fn walk(dir: &Path) -> AppResult<BTreeMap<PathBuf, u64>> {
    let mut files = BTreeMap::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(into_io)?;
        if entry.file_type().is_file() {
            let metadata = entry.metadata().map_err(into_io)?;
            files.insert(entry.into_path(), metadata.len());
        }
    }
    Ok(files)
}

/// Total size of `dir`, same as `du -sb`.
///
/// # Errors
///
/// Returns an error when the walk fails.
pub fn size(dir: &Path) -> AppResult<u64> {
    Ok(walk(dir)?.values().sum())
}

fn into_io(err: walkdir::Error) -> crate::error::AppError {
    err.into_io_error()
        .unwrap_or_else(|| std::io::Error::other("directory walk failed"))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_sums_every_file_in_the_tree() -> AppResult<()> {
        let dir = tempfile::TempDir::new()?;
        std::fs::write(dir.path().join("a.log"), vec![0_u8; 100])?;
        std::fs::create_dir(dir.path().join("wal"))?;
        std::fs::write(dir.path().join("wal").join("0001"), vec![0_u8; 24])?;

        let files = walk(dir.path())?;
        assert_eq!(files.len(), 2);
        assert_eq!(size(dir.path())?, 124);
        Ok(())
    }

    #[test]
    fn empty_directory_has_zero_size() -> AppResult<()> {
        let dir = tempfile::TempDir::new()?;
        assert_eq!(size(dir.path())?, 0);
        Ok(())
    }
}
