//! CLI subcommands — init, validate, build.

use crate::core::executor::{self, BuildConfig, BuildError};
use crate::core::parser;
use crate::core::types::Config;
use clap::Subcommand;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter protoforge.toml
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Validate protoforge.toml without running the compiler
    Validate {
        /// Path to protoforge.toml
        #[arg(short, long, default_value = "protoforge.toml")]
        file: PathBuf,
    },

    /// Compile every discovered package and flush descriptor sets
    Build {
        /// Path to protoforge.toml
        #[arg(short, long, default_value = "protoforge.toml")]
        file: PathBuf,

        /// Import root(s), in search order (default: current directory)
        #[arg(short, long)]
        root: Vec<PathBuf>,

        /// Output root for generated files (default: first import root)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print planned commands without running them
        #[arg(long)]
        dry_run: bool,

        /// Suppress routine output
        #[arg(long)]
        quiet: bool,

        /// Restrict the build to packages at or under these relative paths
        paths: Vec<String>,
    },
}

/// Why a command failed. The compiler variant carries the external process's
/// exit status so `main` can terminate with exactly that code.
#[derive(Debug)]
pub enum CliError {
    Compiler(i32),
    Message(String),
}

impl From<String> for CliError {
    fn from(message: String) -> Self {
        CliError::Message(message)
    }
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), CliError> {
    match cmd {
        Commands::Init { path } => Ok(cmd_init(&path)?),
        Commands::Validate { file } => Ok(cmd_validate(&file)?),
        Commands::Build {
            file,
            root,
            output,
            dry_run,
            quiet,
            paths,
        } => cmd_build(&file, root, output, dry_run, quiet, &paths),
    }
}

fn cmd_init(path: &Path) -> Result<(), String> {
    let config_path = path.join("protoforge.toml");
    if config_path.exists() {
        return Err(format!("{} already exists", config_path.display()));
    }

    let template = r#"version = "1"
generator = "rust"
plugins = []

[includes]
before = ["."]
after = ["/usr/local/include", "/usr/include"]
"#;
    std::fs::write(&config_path, template)
        .map_err(|e| format!("cannot write {}: {}", config_path.display(), e))?;

    println!("Initialized protoforge project at {}", path.display());
    println!("  Created: {}", config_path.display());
    Ok(())
}

fn cmd_validate(file: &Path) -> Result<(), String> {
    let config = parser::parse_config_file(file)?;
    let errors = parser::validate_config(&config);

    if errors.is_empty() {
        println!(
            "OK: generator {} ({} override rule(s), {} descriptor set(s))",
            config.generator,
            config.overrides.len(),
            config.descriptors.len()
        );
        Ok(())
    } else {
        for e in &errors {
            eprintln!("  ERROR: {}", e);
        }
        Err(format!("{} validation error(s)", errors.len()))
    }
}

fn cmd_build(
    file: &Path,
    roots: Vec<PathBuf>,
    output: Option<PathBuf>,
    dry_run: bool,
    quiet: bool,
    paths: &[String],
) -> Result<(), CliError> {
    let config = parse_and_validate(file)?;

    let roots = if roots.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        roots
    };
    let output_dir = output.unwrap_or_else(|| roots[0].clone());

    let summary = executor::build(&BuildConfig {
        config: &config,
        roots: &roots,
        output_dir: &output_dir,
        paths,
        dry_run,
        quiet,
    })
    .map_err(|e| match e {
        BuildError::Compiler(code) => CliError::Compiler(code),
        BuildError::Fatal(message) => CliError::Message(message),
    })?;

    if !quiet {
        if dry_run {
            println!("Dry run — no invocations executed.");
        }
        println!("Built {} package(s).", summary.packages);
        for target in &summary.written {
            println!("  wrote {}", target.display());
        }
    }
    Ok(())
}

/// Parse and validate a protoforge config file, listing errors if invalid.
fn parse_and_validate(file: &Path) -> Result<Config, String> {
    let config = parser::parse_config_file(file)?;
    let errors = parser::validate_config(&config);
    if errors.is_empty() {
        return Ok(config);
    }
    for e in &errors {
        eprintln!("  ERROR: {}", e);
    }
    Err("validation failed".to_string())
}
