//! Configuration schema for protoforge.toml.
//!
//! Defines the TOML types for the generator selection, include-path groups,
//! per-prefix overrides, and descriptor-set targets. All types derive
//! Deserialize; tables whose order matters use IndexMap.

use indexmap::IndexMap;
use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration — how every discovered package gets compiled.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Schema version (must be "1")
    pub version: String,

    /// Default generator name, emitted as `--<generator>_out`
    pub generator: String,

    /// Compiler binary to invoke
    #[serde(default = "default_compiler")]
    pub compiler: String,

    /// Default plugin list passed to the generator
    #[serde(default)]
    pub plugins: Vec<String>,

    /// Import-path remapping, emitted as `M<file>=<package>` generator params
    #[serde(default)]
    pub packages: IndexMap<String, String>,

    /// Include search path groups
    #[serde(default)]
    pub includes: IncludeConfig,

    /// Per-prefix generator/plugin overrides
    #[serde(default)]
    pub overrides: Vec<OverrideRule>,

    /// Descriptor-set targets, one accumulated set per prefix
    #[serde(default)]
    pub descriptors: Vec<DescriptorTarget>,
}

fn default_compiler() -> String {
    "protoc".to_string()
}

/// Include directory groups, assembled in fixed precedence order:
/// before, vendored (under the resolved vendor root), packages, import roots, after.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncludeConfig {
    /// Directories searched before everything else
    #[serde(default)]
    pub before: Vec<PathBuf>,

    /// Subpaths joined under the package's nearest vendor root
    #[serde(default)]
    pub vendored: Vec<String>,

    /// Subpaths joined under the vendor root and under every import root
    #[serde(default)]
    pub packages: Vec<String>,

    /// Directories searched last (well-known include locations)
    #[serde(default)]
    pub after: Vec<PathBuf>,
}

/// Replaces the default generator and/or plugins for packages whose path relative
/// to the output root exactly matches one of the listed prefixes.
#[derive(Debug, Clone, Deserialize)]
pub struct OverrideRule {
    /// Relative package paths this rule applies to
    pub prefixes: Vec<String>,

    /// Replacement generator name; empty or absent leaves the default
    #[serde(default)]
    pub generator: Option<String>,

    /// Replacement plugin list; a present-but-empty list means "no plugins",
    /// absent leaves the default
    #[serde(default)]
    pub plugins: Option<Vec<String>>,
}

/// One descriptor-set output: packages under `prefix` contribute their emitted
/// descriptors, merged and written to `target` at the end of the run.
#[derive(Debug, Clone, Deserialize)]
pub struct DescriptorTarget {
    /// Relative path prefix selecting contributing packages
    pub prefix: String,

    /// Output file for the merged set
    pub target: PathBuf,

    /// File names excluded from the merged output
    #[serde(default)]
    pub ignore_files: Vec<String>,
}

/// A discovered package: a directory of schema source files under an import root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoPackage {
    /// Directory holding the files
    pub dir: PathBuf,

    /// `/`-separated path relative to the import root ("." for the root itself)
    pub import_path: String,

    /// Schema source files, sorted
    pub files: Vec<PathBuf>,
}
