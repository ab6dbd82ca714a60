//! File discovery module for finding video files to check.
//!
//! Only the top level of the given directory is scanned; subdirectories are
//! never entered. A file qualifies when its extension matches one of
//! [`VIDEO_EXTENSIONS`] case-insensitively.

use crate::error::{CoreResult, directory_error};

use std::path::{Path, PathBuf};

/// Extensions (without the dot) treated as video files.
pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "avi", "mkv", "mov", "flv"];

/// Returns true when `path` has one of the accepted video extensions.
///
/// Only the name is inspected; the file does not need to exist.
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// Finds the video files directly inside `input_dir`.
///
/// Returned paths are absolute (the directory is canonicalized first) and
/// sorted by file name so that dispatch order is deterministic. Directories
/// named like videos (`clips.mp4/`) are skipped.
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - the matching files; empty if nothing matched
/// * `Err(CoreError::Directory)` - the directory is missing, not a directory,
///   or cannot be read
///
/// # Examples
///
/// ```rust,no_run
/// use vidcheck_core::find_video_files;
/// use std::path::Path;
///
/// let files = find_video_files(Path::new("/path/to/videos")).unwrap();
/// if files.is_empty() {
///     println!("Nothing to check");
/// }
/// ```
pub fn find_video_files(input_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let dir = input_dir
        .canonicalize()
        .map_err(|e| directory_error(input_dir, e))?;
    let read_dir = std::fs::read_dir(&dir).map_err(|e| directory_error(&dir, e))?;

    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    return None;
                }
            };
            let path = entry.path();

            if !path.is_file() || !is_video_file(&path) {
                return None;
            }
            Some(path)
        })
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    log::debug!("Found {} video file(s) in {}", files.len(), dir.display());
    Ok(files)
}
