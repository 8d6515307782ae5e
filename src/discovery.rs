//! Expansion of input path patterns to a concrete file list.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Expand glob patterns to the files they match.
///
/// Patterns are expanded in the order given and matches keep glob order, so
/// the result is the discovery order used for reporting. Directories are
/// skipped and a path matched by several patterns is listed once, at its
/// first position.
pub fn expand_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let entries = glob::glob(pattern).map_err(|e| {
            Error::Configuration(format!("invalid input pattern `{pattern}`: {e}"))
        })?;

        for entry in entries {
            let path = entry.map_err(|e| Error::Io(e.into()))?;
            if !path.is_file() {
                continue;
            }
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    Ok(files)
}
