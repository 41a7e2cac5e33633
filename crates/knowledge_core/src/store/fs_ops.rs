//! File helpers shared by the repository.
//!
//! Every helper attaches the offending path to its error.

use super::{StoreError, StoreResult};
use crate::model::article::ArticleMetadata;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub(crate) fn ensure_dir(path: &Path) -> StoreResult<()> {
    fs::create_dir_all(path).map_err(|source| io_error(path, source))
}

pub(crate) fn read_text(path: &Path) -> StoreResult<String> {
    fs::read_to_string(path).map_err(|source| io_error(path, source))
}

/// Reads a file, mapping "not found" to `None`.
pub(crate) fn read_text_if_exists(path: &Path) -> StoreResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(io_error(path, source)),
    }
}

pub(crate) fn write_text(path: &Path, content: &str) -> StoreResult<()> {
    let mut file = fs::File::create(path).map_err(|source| io_error(path, source))?;
    file.write_all(content.as_bytes())
        .map_err(|source| io_error(path, source))
}

pub(crate) fn read_metadata(path: &Path) -> StoreResult<ArticleMetadata> {
    let raw = read_text(path)?;
    serde_json::from_str(&raw).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the sidecar as 2-space indented JSON with non-ASCII text kept as-is.
pub(crate) fn write_metadata(path: &Path, metadata: &ArticleMetadata) -> StoreResult<()> {
    let json = serde_json::to_string_pretty(metadata).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_text(path, &json)
}

/// Lists `*.json` files directly under `dir` in directory order.
pub(crate) fn list_json_files(dir: &Path) -> StoreResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|source| io_error(dir, source))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| io_error(dir, source))?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    Ok(files)
}

fn io_error(path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::{list_json_files, read_text_if_exists, write_text};
    use tempfile::tempdir;

    #[test]
    fn read_text_if_exists_returns_none_for_missing_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.md");
        assert_eq!(read_text_if_exists(&missing).unwrap(), None);
    }

    #[test]
    fn list_json_files_ignores_other_extensions() {
        let dir = tempdir().unwrap();
        write_text(&dir.path().join("a.json"), "{}").unwrap();
        write_text(&dir.path().join("b.txt"), "x").unwrap();
        write_text(&dir.path().join("c.json.bak"), "x").unwrap();

        let files = list_json_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.json"));
    }
}
