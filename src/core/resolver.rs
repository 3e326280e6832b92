//! Vendor-root resolution and well-known include location.
//!
//! A vendor root is the nearest ancestor `vendor/` directory of a package,
//! found by walking upward until the filesystem root. The well-known
//! schema-description file must be locatable under the configured trailing
//! include directories before any compilation starts.

use std::path::{Path, PathBuf};

/// Directory name marking a local copy of external dependencies.
pub const VENDOR_DIR: &str = "vendor";

/// Canonical name of the schema-description file every descriptor set carries.
pub const DESCRIPTOR_PROTO: &str = "google/protobuf/descriptor.proto";

/// Walk upward from `dir` looking for the closest `vendor` directory.
///
/// Returns `Ok(None)` when the walk reaches the filesystem root without a hit.
/// A candidate that exists but is not a directory is skipped and the walk
/// continues. A stat failure for any reason other than non-existence is an
/// error naming the candidate.
pub fn closest_vendor_dir(dir: &Path) -> Result<Option<PathBuf>, String> {
    let mut current = dir.to_path_buf();

    loop {
        let candidate = current.join(VENDOR_DIR);
        match std::fs::metadata(&candidate) {
            Ok(meta) if meta.is_dir() => return Ok(Some(candidate)),
            Ok(_) => {} // exists but is not a directory; keep walking
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(format!("cannot stat {}: {}", candidate.display(), e));
            }
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return Ok(None),
        }
    }
}

/// Locate the schema-description file under the given search directories.
/// Failure lists every directory searched.
pub fn locate_descriptor_proto(search: &[PathBuf]) -> Result<PathBuf, String> {
    for dir in search {
        let candidate = dir.join(DESCRIPTOR_PROTO);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    let searched: Vec<String> = search.iter().map(|d| d.display().to_string()).collect();
    Err(format!(
        "{} not found (looked in: [{}])",
        DESCRIPTOR_PROTO,
        searched.join(", ")
    ))
}
