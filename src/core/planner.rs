//! Invocation planning — one compiler invocation per discovered package.
//!
//! Combines package metadata, the assembled include path, and any per-prefix
//! override into an immutable `Invocation`. When the package falls under a
//! configured descriptor prefix, a private temp file is allocated for the
//! descriptor blob; its guard travels with the plan so the blob is removed on
//! every exit path, parse failures included.

use super::overrides::OverrideIndex;
use super::types::{Config, ProtoPackage};
use crate::compiler::Invocation;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A planned invocation plus the descriptor temp-file guard, when one was
/// requested. Consumed exactly once by the executor.
#[derive(Debug)]
pub struct Planned {
    pub invocation: Invocation,
    pub relative_path: String,
    pub descriptor_temp: Option<NamedTempFile>,
}

/// Plan the invocation for one package.
///
/// The package's path relative to `output_dir` keys override lookup and
/// descriptor-prefix matching; a package outside the output root is a fatal
/// planning error.
pub fn plan(
    pkg: &ProtoPackage,
    includes: Vec<PathBuf>,
    config: &Config,
    output_dir: &Path,
    overrides: &OverrideIndex,
    descriptor_prefixes: &[String],
) -> Result<Planned, String> {
    let relative_path = relative_to(output_dir, &pkg.dir)?;

    let mut generator = config.generator.clone();
    let mut plugins = config.plugins.clone();

    if let Some(hit) = overrides.lookup(&relative_path) {
        if let Some(ref g) = hit.generator {
            if !g.is_empty() {
                generator = g.clone();
            }
        }
        if let Some(ref p) = hit.plugins {
            plugins = p.clone();
        }
    }

    let want_descriptor = descriptor_prefixes
        .iter()
        .any(|prefix| path_has_prefix(&relative_path, prefix));

    let descriptor_temp = if want_descriptor {
        let temp = tempfile::Builder::new()
            .prefix("descriptors.pb-")
            .tempfile()
            .map_err(|e| format!("cannot create descriptor temp file: {}", e))?;
        Some(temp)
    } else {
        None
    };

    let invocation = Invocation {
        program: config.compiler.clone(),
        generator,
        import_path: pkg.import_path.clone(),
        package_map: config.packages.clone(),
        plugins,
        files: pkg.files.clone(),
        output_dir: output_dir.to_path_buf(),
        includes,
        descriptor_out: descriptor_temp.as_ref().map(|t| t.path().to_path_buf()),
    };

    Ok(Planned {
        invocation,
        relative_path,
        descriptor_temp,
    })
}

/// `/`-separated path of `dir` relative to `base`; "." when they are equal.
/// A `dir` outside `base` is an error.
fn relative_to(base: &Path, dir: &Path) -> Result<String, String> {
    let rel = dir.strip_prefix(base).map_err(|_| {
        format!(
            "package {} is not under output root {}",
            dir.display(),
            base.display()
        )
    })?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        Ok(".".to_string())
    } else {
        Ok(parts.join("/"))
    }
}

/// Segment-boundary prefix test: `api/v1` is under `api`, `apifoo` is not.
pub(crate) fn path_has_prefix(path: &str, prefix: &str) -> bool {
    path == prefix || path.starts_with(&format!("{}/", prefix))
}
