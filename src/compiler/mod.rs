//! External compiler boundary — command serialization and execution.
//!
//! An `Invocation` is built once per package by the planner and consumed exactly
//! once here. The command follows protoc conventions: `-I` include flags in
//! search order, a single `--<generator>_out` flag carrying plugin/import-path/
//! remapping params, and optional descriptor emission flags.

use indexmap::IndexMap;
use std::path::PathBuf;
use std::process::Command;

/// One planned compiler run. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Compiler binary
    pub program: String,
    /// Generator name for the `--<generator>_out` flag
    pub generator: String,
    /// Package import path, passed through as a generator param
    pub import_path: String,
    /// `M<file>=<package>` remapping params
    pub package_map: IndexMap<String, String>,
    /// Effective plugin list
    pub plugins: Vec<String>,
    /// Input files, in package order
    pub files: Vec<PathBuf>,
    /// Generated-output root
    pub output_dir: PathBuf,
    /// Include directories, in search order
    pub includes: Vec<PathBuf>,
    /// Descriptor blob destination, when descriptor emission was requested
    pub descriptor_out: Option<PathBuf>,
}

/// How the external process ended. Launch failure is an `Err` from [`Invocation::run`],
/// not a termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Normal exit with the process's own status code
    Exited(i32),
    /// Killed by a signal; no status code to proxy
    Signaled,
}

impl Termination {
    pub fn success(&self) -> bool {
        matches!(self, Termination::Exited(0))
    }
}

impl Invocation {
    /// Serialize into argv form.
    pub fn command(&self) -> Vec<String> {
        let mut args = vec![self.program.clone()];

        for include in &self.includes {
            args.push("-I".to_string());
            args.push(include.display().to_string());
        }

        let mut params = Vec::new();
        if !self.plugins.is_empty() {
            params.push(format!("plugins={}", self.plugins.join("+")));
        }
        params.push(format!("import_path={}", self.import_path));
        for (file, package) in &self.package_map {
            params.push(format!("M{}={}", file, package));
        }
        args.push(format!(
            "--{}_out={}:{}",
            self.generator,
            params.join(","),
            self.output_dir.display()
        ));

        if let Some(ref descriptor_out) = self.descriptor_out {
            args.push("--include_imports".to_string());
            args.push(format!("--descriptor_set_out={}", descriptor_out.display()));
        }

        for file in &self.files {
            args.push(file.display().to_string());
        }

        args
    }

    /// The command as one printable line.
    pub fn command_line(&self) -> String {
        self.command().join(" ")
    }

    /// Execute the compiler with inherited stdio and report how it ended.
    /// Failing to launch at all (binary missing, not executable) is an error.
    pub fn run(&self) -> Result<Termination, String> {
        run_argv(&self.command())
    }
}

fn run_argv(argv: &[String]) -> Result<Termination, String> {
    let status = Command::new(&argv[0])
        .args(&argv[1..])
        .status()
        .map_err(|e| format!("failed to launch {}: {}", argv[0], e))?;

    match status.code() {
        Some(code) => Ok(Termination::Exited(code)),
        None => Ok(Termination::Signaled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_invocation() -> Invocation {
        Invocation {
            program: "protoc".to_string(),
            generator: "rust".to_string(),
            import_path: "api/v1".to_string(),
            package_map: IndexMap::new(),
            plugins: vec![],
            files: vec![PathBuf::from("api/v1/a.proto")],
            output_dir: PathBuf::from("/out"),
            includes: vec![PathBuf::from("/inc1"), PathBuf::from("/inc2")],
            descriptor_out: None,
        }
    }

    #[test]
    fn test_command_shape() {
        let argv = make_invocation().command();
        assert_eq!(
            argv,
            vec![
                "protoc",
                "-I",
                "/inc1",
                "-I",
                "/inc2",
                "--rust_out=import_path=api/v1:/out",
                "api/v1/a.proto",
            ]
        );
    }

    #[test]
    fn test_command_with_plugins_and_package_map() {
        let mut invocation = make_invocation();
        invocation.plugins = vec!["grpc".to_string(), "stream".to_string()];
        invocation
            .package_map
            .insert("shared/base.proto".to_string(), "crate::base".to_string());

        let argv = invocation.command();
        assert!(argv.contains(
            &"--rust_out=plugins=grpc+stream,import_path=api/v1,Mshared/base.proto=crate::base:/out"
                .to_string()
        ));
    }

    #[test]
    fn test_command_with_descriptor_out() {
        let mut invocation = make_invocation();
        invocation.descriptor_out = Some(PathBuf::from("/tmp/descriptors.pb-x"));

        let argv = invocation.command();
        let line = invocation.command_line();
        assert!(argv.contains(&"--include_imports".to_string()));
        assert!(argv.contains(&"--descriptor_set_out=/tmp/descriptors.pb-x".to_string()));
        // Descriptor flags come after the _out flag, before the files.
        assert!(line.ends_with("--include_imports --descriptor_set_out=/tmp/descriptors.pb-x api/v1/a.proto"));
    }

    #[test]
    fn test_run_success() {
        let argv = vec!["sh".to_string(), "-c".to_string(), "exit 0".to_string()];
        assert_eq!(run_argv(&argv).unwrap(), Termination::Exited(0));
        assert!(run_argv(&argv).unwrap().success());
    }

    #[test]
    fn test_run_reports_exact_exit_code() {
        let argv = vec!["sh".to_string(), "-c".to_string(), "exit 2".to_string()];
        assert_eq!(run_argv(&argv).unwrap(), Termination::Exited(2));
    }

    #[test]
    fn test_run_signaled() {
        let argv = vec!["sh".to_string(), "-c".to_string(), "kill -9 $$".to_string()];
        assert_eq!(run_argv(&argv).unwrap(), Termination::Signaled);
    }

    #[test]
    fn test_run_launch_failure() {
        let argv = vec!["/nonexistent/compiler-binary".to_string()];
        let err = run_argv(&argv).unwrap_err();
        assert!(err.contains("failed to launch"));
    }
}
