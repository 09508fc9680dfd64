use std::path::{Path, PathBuf};

use sjbuild_shared::{log::warn, walkdir::WalkDir};

use crate::{Error, Result};

/// Recursively collects all files below `asset_dir` whose file name matches at
/// least one of the given patterns. Patterns are file name globs in which `*`
/// matches any run of characters, e.g. `*.png`.
///
/// Directories are visited in lexicographical order so that the result is the
/// same on every run. A file that matches several patterns appears once per
/// matching pattern. Entries that cannot be read are skipped with a warning.
pub fn discover(asset_dir: &Path, patterns: &[impl AsRef<str>]) -> Result<Vec<PathBuf>> {
    if !asset_dir.is_dir() {
        return Err(Error::AssetDirNotFound(asset_dir.to_owned()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(asset_dir).sort_by_file_name() {
        let Ok(entry) = entry else {
            warn!(
                "Failed to read directory entry in WalkDir {:?}: {}",
                entry,
                entry.as_ref().unwrap_err()
            );
            continue;
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Some(file_name) = entry.file_name().to_str() else {
            warn!("Skipping file with a non-UTF-8 name: {}", entry.path().display());
            continue;
        };

        for pattern in patterns {
            if matches_pattern(pattern.as_ref(), file_name) {
                files.push(entry.path().to_owned());
            }
        }
    }
    Ok(files)
}

/// Returns whether `file_name` matches `pattern`. On Windows the comparison
/// ignores case because the filesystems there do the same.
fn matches_pattern(pattern: &str, file_name: &str) -> bool {
    if cfg!(windows) {
        matches_wildcard(&pattern.to_lowercase(), &file_name.to_lowercase())
    } else {
        matches_wildcard(pattern, file_name)
    }
}

/// Matches `name` against `pattern` where `*` matches any substring, including
/// the empty one. Backtracks to the most recent `*` on a mismatch.
fn matches_wildcard(pattern: &str, name: &str) -> bool {
    let pattern = pattern.as_bytes();
    let name = name.as_bytes();
    let mut pattern_index = 0;
    let mut name_index = 0;
    let mut backtrack = None;
    while name_index < name.len() {
        if pattern_index < pattern.len() && pattern[pattern_index] == name[name_index] && pattern[pattern_index] != b'*' {
            pattern_index += 1;
            name_index += 1;
        } else if pattern_index < pattern.len() && pattern[pattern_index] == b'*' {
            backtrack = Some((pattern_index, name_index));
            pattern_index += 1;
        } else if let Some((star_pattern_index, star_name_index)) = backtrack {
            pattern_index = star_pattern_index + 1;
            name_index = star_name_index + 1;
            backtrack = Some((star_pattern_index, star_name_index + 1));
        } else {
            return false;
        }
    }
    while pattern_index < pattern.len() && pattern[pattern_index] == b'*' {
        pattern_index += 1;
    }
    pattern_index == pattern.len()
}
