//! Build execution — the orchestration loop.
//!
//! For each discovered package: resolve the vendor root, assemble the include
//! path, plan the invocation, run the compiler, and feed any emitted descriptor
//! blob into every prefix-matching descriptor set. Packages run strictly
//! sequentially in discovery order; descriptor sets are flushed once after the
//! last package.

use super::discovery;
use super::includes;
use super::overrides::OverrideIndex;
use super::planner::{self, Planned};
use super::resolver;
use super::types::Config;
use crate::compiler::Termination;
use crate::descriptor::{wire, DescriptorSet};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Configuration for a build run.
pub struct BuildConfig<'a> {
    pub config: &'a Config,
    /// Import roots, in search order
    pub roots: &'a [PathBuf],
    /// Root the compiler writes generated files under; package paths are keyed
    /// relative to it
    pub output_dir: &'a Path,
    /// Package path filters (empty = everything)
    pub paths: &'a [String],
    /// Print planned commands without executing anything
    pub dry_run: bool,
    /// Suppress routine output; failed commands are still re-logged
    pub quiet: bool,
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct BuildSummary {
    /// Packages planned (and, outside dry-run, compiled)
    pub packages: usize,
    /// Descriptor-set files written
    pub written: Vec<PathBuf>,
}

/// Why a run stopped.
#[derive(Debug)]
pub enum BuildError {
    /// The compiler exited non-zero; the orchestrator must exit with the same
    /// code.
    Compiler(i32),
    /// Local failure — configuration, discovery, I/O, launch, or signal.
    Fatal(String),
}

impl From<String> for BuildError {
    fn from(message: String) -> Self {
        BuildError::Fatal(message)
    }
}

/// Execute the build loop.
pub fn build(cfg: &BuildConfig) -> Result<BuildSummary, BuildError> {
    let packages = discovery::discover(cfg.roots, cfg.paths)?;

    // The schema-description file must be locatable before anything runs.
    resolver::locate_descriptor_proto(&cfg.config.includes.after)?;

    let overrides = OverrideIndex::build(&cfg.config.overrides);

    // One set per configured prefix, in configuration order. A prefix listed
    // twice keeps its first position; the later target wins.
    let mut sets: IndexMap<String, (PathBuf, DescriptorSet)> = IndexMap::new();
    for target in &cfg.config.descriptors {
        sets.insert(
            target.prefix.clone(),
            (
                target.target.clone(),
                DescriptorSet::new(
                    &target.ignore_files,
                    wire::name_only_entry(resolver::DESCRIPTOR_PROTO),
                ),
            ),
        );
    }
    let descriptor_prefixes: Vec<String> = sets.keys().cloned().collect();

    for pkg in &packages {
        let vendor = resolver::closest_vendor_dir(&pkg.dir)?;
        let include_path =
            includes::build_include_path(&cfg.config.includes, cfg.roots, vendor.as_deref());

        let Planned {
            invocation,
            relative_path,
            descriptor_temp,
        } = planner::plan(
            pkg,
            include_path,
            cfg.config,
            cfg.output_dir,
            &overrides,
            &descriptor_prefixes,
        )?;

        let command_line = invocation.command_line();
        if !cfg.quiet {
            println!("{}", command_line);
        }
        if cfg.dry_run {
            continue;
        }

        match invocation.run().map_err(BuildError::Fatal)? {
            Termination::Exited(0) => {}
            Termination::Exited(code) => {
                if cfg.quiet {
                    eprintln!("{}", command_line);
                }
                return Err(BuildError::Compiler(code));
            }
            Termination::Signaled => {
                if cfg.quiet {
                    eprintln!("{}", command_line);
                }
                return Err(BuildError::Fatal(format!(
                    "{} terminated by signal",
                    invocation.program
                )));
            }
        }

        if let Some(temp) = descriptor_temp {
            let blob = std::fs::read(temp.path()).map_err(|e| {
                format!("cannot read descriptor blob {}: {}", temp.path().display(), e)
            })?;
            let entries = wire::parse_set(&blob)?;
            for (prefix, (_, set)) in sets.iter_mut() {
                if planner::path_has_prefix(&relative_path, prefix) {
                    set.add(entries.iter().cloned());
                }
            }
            // temp guard drops here; the blob is removed whether or not the
            // parse above succeeded
        }
    }

    let mut written = Vec::new();
    for (target, set) in sets.values() {
        if set.write_target(target)? {
            written.push(target.clone());
        }
    }

    Ok(BuildSummary {
        packages: packages.len(),
        written,
    })
}
