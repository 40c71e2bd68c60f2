//! Directory scanning
//!
//! Recursive file enumeration with relative paths and optional glob
//! filtering, plus flat listing by extension.

use crate::error::{IoResultExt, Result, SetupError};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A regular file found under a scanned root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Relative path from the scanned root
    pub relative_path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

/// Result of scanning a directory tree
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Files in path order
    pub files: Vec<FileEntry>,
    /// Total size of all files
    pub total_size: u64,
    /// Entries that could not be read
    pub errors: Vec<String>,
}

/// Build a GlobSet from patterns
///
/// `*` and `?` never match `/`, so `*.css` only matches top-level files.
pub fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| {
                SetupError::InvalidPattern(format!("Invalid glob pattern '{}': {}", pattern, e))
            })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| SetupError::InvalidPattern(format!("Failed to build glob set: {}", e)))
}

/// Recursively list regular files under `root`, sorted by path
///
/// When `filter` is given, only files whose relative path matches are kept.
pub fn scan_files(root: &Path, filter: Option<&GlobSet>) -> Result<ScanResult> {
    if !root.is_dir() {
        return Err(SetupError::SourceAssetMissing(root.to_path_buf()));
    }

    let mut result = ScanResult::default();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                result.errors.push(err.to_string());
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let relative_path = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();

        if let Some(filter) = filter {
            if !filter.is_match(&relative_path) {
                continue;
            }
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        result.total_size += size;
        result.files.push(FileEntry {
            path: entry.path().to_path_buf(),
            relative_path,
            size,
        });
    }

    Ok(result)
}

/// List files with the given extension directly inside `dir`, sorted by path
pub fn list_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir).with_path(dir)? {
        let path = entry.with_path(dir)?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(extension) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("Scripts")).unwrap();
        std::fs::create_dir_all(dir.path().join("Templates/Daily")).unwrap();
        std::fs::write(dir.path().join("Scripts/path.js"), "module.exports = {}").unwrap();
        std::fs::write(dir.path().join("Templates/new.md"), "# New").unwrap();
        std::fs::write(dir.path().join("Templates/Daily/daily.md"), "# Daily").unwrap();
        std::fs::write(dir.path().join("theme.css"), "body {}").unwrap();
        dir
    }

    #[test]
    fn test_scan_files_recursive_sorted() {
        let dir = create_test_dir();
        let result = scan_files(dir.path(), None).unwrap();

        let relative: Vec<_> = result
            .files
            .iter()
            .map(|f| f.relative_path.to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            relative,
            vec![
                "Scripts/path.js",
                "Templates/Daily/daily.md",
                "Templates/new.md",
                "theme.css"
            ]
        );
        assert!(result.errors.is_empty());
        assert!(result.total_size > 0);
    }

    #[test]
    fn test_scan_files_with_filter() {
        let dir = create_test_dir();
        let filter = build_globset(&["*.css"]).unwrap();
        let result = scan_files(dir.path(), Some(&filter)).unwrap();

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].relative_path, PathBuf::from("theme.css"));
    }

    #[test]
    fn test_filter_does_not_cross_directories() {
        let dir = create_test_dir();
        std::fs::create_dir_all(dir.path().join("old")).unwrap();
        std::fs::write(dir.path().join("old/archived.css"), "body {}").unwrap();

        let filter = build_globset(&["*.css"]).unwrap();
        let result = scan_files(dir.path(), Some(&filter)).unwrap();
        let relative: Vec<_> = result.files.iter().map(|f| f.relative_path.clone()).collect();
        assert_eq!(relative, vec![PathBuf::from("theme.css")]);

        let nested = build_globset(&["**/*.css"]).unwrap();
        assert_eq!(scan_files(dir.path(), Some(&nested)).unwrap().files.len(), 2);
    }

    #[test]
    fn test_scan_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = scan_files(&dir.path().join("CssSnippets"), None).unwrap_err();
        assert!(matches!(err, SetupError::SourceAssetMissing(_)));
    }

    #[test]
    fn test_invalid_glob() {
        assert!(matches!(
            build_globset(&["[unclosed"]),
            Err(SetupError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_list_files_with_extension() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("c.txt"), "").unwrap();
        std::fs::write(dir.path().join("b.md"), "").unwrap();
        std::fs::write(dir.path().join("a.md"), "").unwrap();
        std::fs::create_dir_all(dir.path().join("nested.md")).unwrap();

        let files = list_files_with_extension(dir.path(), "md").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
    }
}
