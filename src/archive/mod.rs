//! # Deterministic Archive Builder
//!
//! This module produces the reproducible `.tgz` artifacts that accompany an
//! application image. The output bytes are a pure function of the tree's
//! relative paths, file contents and per-file executable bits: entry
//! timestamps are pinned to a fixed instant, ownership is pinned to
//! `0:0`, modes are normalized to `0755`/`0644`, and entries are emitted in
//! sorted-path order (directories first). Neither the wall clock, the source
//! filesystem's metadata, nor directory enumeration order can influence the
//! result, so two builds over byte-identical trees yield byte-identical
//! archives.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::{Compression, GzBuilder};
use tar::{Builder, EntryType, Header};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::PackError;

/// The instant stamped on every archive entry and on the gzip header:
/// 2020-01-01T00:00:00Z.
pub const PINNED_MTIME: u64 = 1_577_836_800;

const MODE_DIR: u32 = 0o755;
const MODE_EXECUTABLE: u32 = 0o755;
const MODE_REGULAR: u32 = 0o644;

/// Build a reproducible gzip-compressed tarball of the tree rooted at
/// `root`, writing it to `destination` (created or truncated).
///
/// Entry names are relative to the *parent* of `root`, so the archive
/// unpacks into a single top-level directory named after the root. The
/// destination's parent directory must already exist. On failure the
/// destination contents are undefined and the caller should treat the
/// archive as not produced.
pub fn build(root: &Path, destination: &Path) -> Result<(), PackError> {
    let metadata = fs::metadata(root).map_err(|e| PackError::Io {
        source: e,
        path: root.to_path_buf(),
    })?;
    if !metadata.is_dir() {
        return Err(PackError::Io {
            source: io::Error::new(io::ErrorKind::InvalidInput, "archive root is not a directory"),
            path: root.to_path_buf(),
        });
    }

    let directories = collect_sorted(root, EntryKind::Directory)?;
    let files = collect_sorted(root, EntryKind::RegularFile)?;

    let output = File::create(destination).map_err(|e| PackError::Io {
        source: e,
        path: destination.to_path_buf(),
    })?;
    let buffered = BufWriter::new(output);
    let gzip = GzBuilder::new()
        .mtime(PINNED_MTIME as u32)
        .write(buffered, Compression::best());
    let mut tar = Builder::new(gzip);

    for directory in &directories {
        append_directory(&mut tar, root, directory)?;
    }
    for file in &files {
        append_file(&mut tar, root, file)?;
    }

    // Teardown in reverse order of construction. If one of these steps
    // fails the remaining layers are still completed by their Drop impls,
    // and the first failure is the one reported.
    let gzip = tar
        .into_inner()
        .map_err(|e| PackError::Archive(format!("tar finish: {}", e)))?;
    let buffered = gzip
        .finish()
        .map_err(|e| PackError::Archive(format!("gzip finish: {}", e)))?;
    let mut output = buffered
        .into_inner()
        .map_err(|e| PackError::Archive(format!("sink flush: {}", e)))?;
    output.flush().map_err(|e| PackError::Io {
        source: e,
        path: destination.to_path_buf(),
    })?;
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Directory,
    RegularFile,
}

/// Walk `root` and return every entry of the requested kind, sorted
/// byte-wise lexicographically by path. Symlinks and other special files
/// are skipped.
fn collect_sorted(root: &Path, kind: EntryKind) -> Result<Vec<PathBuf>, PackError> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| root.to_path_buf());
            PackError::Io {
                source: e.into(),
                path,
            }
        })?;

        let file_type = entry.file_type();
        if file_type.is_symlink() || !(file_type.is_dir() || file_type.is_file()) {
            warn!(path = %entry.path().display(), "skipping non-regular entry");
            continue;
        }

        let is_dir = file_type.is_dir();
        if (kind == EntryKind::Directory) == is_dir {
            paths.push(entry.into_path());
        }
    }
    paths.sort_by(|a, b| {
        a.as_os_str()
            .as_encoded_bytes()
            .cmp(b.as_os_str().as_encoded_bytes())
    });
    Ok(paths)
}

/// Archive entry name: the path relative to the parent of the root.
fn entry_name(root: &Path, path: &Path) -> Result<PathBuf, PackError> {
    let base = root.parent().unwrap_or(root);
    let relative = path
        .strip_prefix(base)
        .map_err(|_| PackError::StripPrefix {
            prefix: base.to_path_buf(),
            path: path.to_path_buf(),
        })?;
    Ok(relative.to_path_buf())
}

fn pinned_header(entry_type: EntryType, size: u64, mode: u32) -> Header {
    // GNU headers so that names beyond the legacy 100-character limit are
    // written as long-name extension entries.
    let mut header = Header::new_gnu();
    header.set_entry_type(entry_type);
    header.set_size(size);
    header.set_mode(mode);
    header.set_mtime(PINNED_MTIME);
    header.set_uid(0);
    header.set_gid(0);
    header
}

fn append_directory<W: Write>(
    tar: &mut Builder<W>,
    root: &Path,
    directory: &Path,
) -> Result<(), PackError> {
    let name = entry_name(root, directory)?;
    debug!(entry = %name.display(), "tar");

    let mut header = pinned_header(EntryType::Directory, 0, MODE_DIR);
    tar.append_data(&mut header, &name, io::empty())
        .map_err(|e| PackError::Io {
            source: e,
            path: directory.to_path_buf(),
        })
}

fn append_file<W: Write>(tar: &mut Builder<W>, root: &Path, file: &Path) -> Result<(), PackError> {
    let name = entry_name(root, file)?;
    debug!(entry = %name.display(), "tar");

    let metadata = fs::metadata(file).map_err(|e| PackError::Io {
        source: e,
        path: file.to_path_buf(),
    })?;
    let mode = if is_executable(&metadata, file) {
        MODE_EXECUTABLE
    } else {
        MODE_REGULAR
    };

    let mut header = pinned_header(EntryType::Regular, metadata.len(), mode);
    let source = File::open(file).map_err(|e| PackError::Io {
        source: e,
        path: file.to_path_buf(),
    })?;
    tar.append_data(&mut header, &name, source)
        .map_err(|e| PackError::Io {
            source: e,
            path: file.to_path_buf(),
        })
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata, _path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata, path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
            .as_deref(),
        Some("exe" | "bat" | "cmd" | "com")
    )
}
