//! protoforge CLI — build orchestrator for schema compilers.

use clap::Parser;
use protoforge::cli::CliError;

#[derive(Parser, Debug)]
#[command(
    name = "protoforge",
    version,
    about = "Build orchestrator for schema compilers — vendored include resolution, per-prefix generator overrides, stable descriptor sets"
)]
struct Cli {
    #[command(subcommand)]
    command: protoforge::cli::Commands,
}

fn main() {
    let cli = Cli::parse();
    match protoforge::cli::dispatch(cli.command) {
        Ok(()) => {}
        // The external compiler failed; terminate with exactly its status.
        Err(CliError::Compiler(code)) => std::process::exit(code),
        Err(CliError::Message(e)) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
