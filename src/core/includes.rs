//! Ordered include-path construction.
//!
//! The compiler resolves imports by linear directory search, so the include list
//! decides which same-named file wins when roots shadow each other. The list is
//! assembled through named stages in fixed order — before, vendor, packages,
//! roots, after — one method per stage, so call sites cannot scramble the
//! precedence.

use super::types::IncludeConfig;
use std::path::{Path, PathBuf};

/// Build the include search path for one package.
///
/// `roots` are the import roots (equivalent search roots, in order) and `vendor`
/// is the package's resolved vendor root, if any.
pub fn build_include_path(
    includes: &IncludeConfig,
    roots: &[PathBuf],
    vendor: Option<&Path>,
) -> Vec<PathBuf> {
    IncludeStages::new()
        .before(&includes.before)
        .vendor(vendor, &includes.vendored, &includes.packages)
        .packages(&includes.packages, roots)
        .roots(roots)
        .after(&includes.after)
        .finish()
}

/// Ordered include sequence under construction. Stages append in call order;
/// the stage methods are the only way paths enter the list.
struct IncludeStages {
    dirs: Vec<PathBuf>,
}

impl IncludeStages {
    fn new() -> Self {
        IncludeStages { dirs: Vec::new() }
    }

    /// Stage 1: configured `before` entries, verbatim.
    fn before(mut self, dirs: &[PathBuf]) -> Self {
        self.dirs.extend(dirs.iter().cloned());
        self
    }

    /// Stage 2: vendored entries and package entries joined under the vendor
    /// root, then the vendor root itself. Without a resolved vendor root,
    /// configured vendored entries are skipped with a warning.
    fn vendor(mut self, vendor: Option<&Path>, vendored: &[String], packages: &[String]) -> Self {
        match vendor {
            Some(root) => {
                for entry in vendored {
                    self.dirs.push(root.join(entry));
                }
                for entry in packages {
                    self.dirs.push(root.join(entry));
                }
                self.dirs.push(root.to_path_buf());
            }
            None => {
                if !vendored.is_empty() {
                    eprintln!("ignoring vendored includes: vendor directory not found");
                }
            }
        }
        self
    }

    /// Stage 3: each package entry expanded under every import root,
    /// entry-major, root-minor.
    fn packages(mut self, entries: &[String], roots: &[PathBuf]) -> Self {
        for entry in entries {
            for root in roots {
                self.dirs.push(root.join(entry));
            }
        }
        self
    }

    /// Stage 4: every import root, in order.
    fn roots(mut self, roots: &[PathBuf]) -> Self {
        self.dirs.extend(roots.iter().cloned());
        self
    }

    /// Stage 5: configured `after` entries, verbatim.
    fn after(mut self, dirs: &[PathBuf]) -> Self {
        self.dirs.extend(dirs.iter().cloned());
        self
    }

    fn finish(self) -> Vec<PathBuf> {
        self.dirs
    }
}
