//! Supported-media rules and the derived-output path marker
//!
//! Centralizes three path-level decisions shared by the watcher, the queues,
//! and the compositor:
//! - which file extensions are accepted for upload at all,
//! - which of those the compositor can actually decode and overlay,
//! - how compositor outputs are named, so they can be filtered out of the
//!   watch stream instead of re-entering the upload pipeline forever.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// File extensions accepted for upload (lowercase, without the dot)
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "png", "jpeg", "jpg", "tiff", "raw", "heic", "heif", "gif", "bmp", "webp", "svg", "mp4",
];

/// Subset of supported extensions the compositor can decode and re-encode
///
/// Video, vector, and camera-raw formats pass through uncomposited.
const COMPOSITABLE_EXTENSIONS: &[&str] = &["png", "jpeg", "jpg", "tiff", "gif", "bmp", "webp"];

/// Marker appended to the file stem of a compositor output
///
/// `photo.jpg` becomes `photo_framed.jpg`. The watcher filters any path whose
/// stem carries this marker so derived files never generate new add events.
const DERIVED_MARKER: &str = "_framed";

/// Lowercased extension of a path, if any
fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(OsStr::to_str)
        .map(str::to_lowercase)
}

/// Returns true if the path's extension is in the supported upload set
pub fn is_supported(path: &Path) -> bool {
    extension_of(path)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Returns true if the compositor can decode and overlay this file
pub fn is_compositable(path: &Path) -> bool {
    extension_of(path)
        .map(|ext| COMPOSITABLE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Returns true if the path names a compositor output
pub fn is_derived_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(OsStr::to_str)
        .map(|stem| stem.ends_with(DERIVED_MARKER))
        .unwrap_or(false)
}

/// Builds the derived output path for a compositor result
///
/// Inserts the marker before the extension, keeping the source extension so
/// the encoder format stays the same: `/p/photo.jpg` -> `/p/photo_framed.jpg`.
pub fn derived_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or_default();
    let mut name = format!("{stem}{DERIVED_MARKER}");
    if let Some(ext) = source.extension().and_then(OsStr::to_str) {
        name.push('.');
        name.push_str(ext);
    }
    source.with_file_name(name)
}
