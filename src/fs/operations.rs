//! File operations
//!
//! Metadata-preserving copies, recursive directory copies, and
//! atomic writes used by the synchronizer and the settings builder.

use crate::error::{IoResultExt, Result, SetupError};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use walkdir::WalkDir;

/// Ensure the parent directory of `path` exists
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_path(parent)?;
        }
    }
    Ok(())
}

/// Copy a file, preserving permissions and timestamps
pub fn copy_file_preserving(source: &Path, dest: &Path) -> Result<u64> {
    ensure_parent(dest)?;

    let src_file = File::open(source).with_path(source)?;
    let dst_file = File::create(dest).with_path(dest)?;

    let mut reader = BufReader::new(src_file);
    let mut writer = BufWriter::new(dst_file);

    let bytes_copied =
        std::io::copy(&mut reader, &mut writer).map_err(|e| SetupError::io(source, e))?;

    writer.flush().with_path(dest)?;
    drop(writer);

    preserve_attributes(source, dest)?;

    Ok(bytes_copied)
}

/// Copy permissions and access/modification times from `source` to `dest`
pub fn preserve_attributes(source: &Path, dest: &Path) -> Result<()> {
    let metadata = std::fs::metadata(source).with_path(source)?;
    std::fs::set_permissions(dest, metadata.permissions()).with_path(dest)?;

    if let Ok(mtime) = metadata.modified() {
        if let Err(e) = filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(mtime)) {
            tracing::warn!("Failed to preserve modification time on {:?}: {}", dest, e);
        }
    }

    if let Ok(atime) = metadata.accessed() {
        if let Err(e) = filetime::set_file_atime(dest, filetime::FileTime::from_system_time(atime)) {
            tracing::warn!("Failed to preserve access time on {:?}: {}", dest, e);
        }
    }

    Ok(())
}

/// Recursively copy a directory, returning the number of files copied
pub fn copy_dir_recursive(source: &Path, dest: &Path) -> Result<usize> {
    let mut copied = 0;

    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            SetupError::io(path, e.into())
        })?;

        let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).with_path(&target)?;
        } else if entry.file_type().is_file() {
            copy_file_preserving(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Remove a file or directory
pub fn remove_path(path: &Path) -> Result<()> {
    if path.is_dir() {
        std::fs::remove_dir_all(path).with_path(path)?;
    } else {
        std::fs::remove_file(path).with_path(path)?;
    }
    Ok(())
}

/// Write `contents` to `path` through a temporary sibling file and a rename
///
/// An existing file keeps its permissions.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    ensure_parent(path)?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir).with_path(dir)?;
    tmp.write_all(contents).with_path(tmp.path())?;
    tmp.as_file().sync_all().with_path(tmp.path())?;
    if let Ok(existing) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .with_path(tmp.path())?;
    }
    tmp.persist(path).map_err(|e| SetupError::io(path, e.error))?;

    Ok(())
}
