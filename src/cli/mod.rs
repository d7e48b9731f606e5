//! CLI module for pystep
//!
//! ## Commands
//!
//! - `emit <FILE|->` - Generate Python source from a JSON step document
//! - `constructs` - List the built-in constructs
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use crate::config::{EmitConfig, EmptyBodyPolicy, Indent, LineEnding, MAX_INDENT_WIDTH};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Generate Python source from structured step documents
#[derive(Parser, Debug)]
#[command(name = "pystep")]
#[command(version = VERSION)]
#[command(about = "Generate Python source from structured step documents", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate Python source from a JSON step document
    Emit(EmitArgs),

    /// List the built-in constructs
    Constructs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct EmitArgs {
    /// JSON step document (`-` reads stdin)
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Spaces per indentation level
    #[arg(
        long,
        value_name = "N",
        default_value_t = 4,
        value_parser = clap::value_parser!(u16).range(1..=MAX_INDENT_WIDTH as i64),
        conflicts_with = "tabs"
    )]
    pub indent: u16,

    /// Indent with tabs
    #[arg(long)]
    pub tabs: bool,

    /// Terminate lines with CRLF
    #[arg(long)]
    pub crlf: bool,

    /// Fail on empty block bodies instead of inserting `pass`
    #[arg(long = "reject-empty")]
    pub reject_empty: bool,

    /// Write to OUT instead of stdout
    #[arg(short, long, value_name = "OUT")]
    pub output: Option<PathBuf>,
}

impl EmitArgs {
    /// Emission settings selected by the flags.
    pub fn config(&self) -> EmitConfig {
        EmitConfig::new()
            .with_indent(if self.tabs { Indent::Tabs } else { Indent::Spaces(usize::from(self.indent)) })
            .with_line_ending(if self.crlf { LineEnding::CrLf } else { LineEnding::Lf })
            .with_empty_body(if self.reject_empty {
                EmptyBodyPolicy::Reject
            } else {
                EmptyBodyPolicy::InsertPass
            })
            .with_trailing_newline(true)
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Emit(args) => commands::emit(&args),
        Command::Constructs => commands::list_constructs(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_emit_defaults() {
        let cli = Cli::try_parse_from(["pystep", "emit", "steps.json"]).unwrap();
        let Command::Emit(args) = cli.command else {
            panic!("Expected Emit command");
        };
        assert_eq!(args.input, PathBuf::from("steps.json"));
        assert_eq!(args.config(), EmitConfig::new().with_trailing_newline(true));
    }

    #[test]
    fn test_cli_parse_emit_flags() {
        let cli = Cli::try_parse_from([
            "pystep",
            "emit",
            "-",
            "--indent",
            "2",
            "--crlf",
            "--reject-empty",
            "-o",
            "out.py",
        ])
        .unwrap();
        let Command::Emit(args) = cli.command else {
            panic!("Expected Emit command");
        };
        let config = args.config();
        assert_eq!(config.indent, Indent::Spaces(2));
        assert_eq!(config.line_ending, LineEnding::CrLf);
        assert_eq!(config.empty_body, EmptyBodyPolicy::Reject);
        assert_eq!(args.output, Some(PathBuf::from("out.py")));
    }

    #[test]
    fn test_cli_parse_tabs() {
        let cli = Cli::try_parse_from(["pystep", "emit", "a.json", "--tabs"]).unwrap();
        let Command::Emit(args) = cli.command else {
            panic!("Expected Emit command");
        };
        assert_eq!(args.config().indent, Indent::Tabs);
    }

    #[test]
    fn test_cli_indent_conflicts_with_tabs() {
        assert!(Cli::try_parse_from(["pystep", "emit", "a.json", "--tabs", "--indent", "2"]).is_err());
    }

    #[test]
    fn test_cli_rejects_indent_out_of_range() {
        assert!(Cli::try_parse_from(["pystep", "emit", "a.json", "--indent", "0"]).is_err());
        assert!(Cli::try_parse_from(["pystep", "emit", "a.json", "--indent", "17"]).is_err());
        assert!(Cli::try_parse_from(["pystep", "emit", "a.json", "--indent", "16"]).is_ok());
    }

    #[test]
    fn test_cli_parse_constructs() {
        let cli = Cli::try_parse_from(["pystep", "constructs"]).unwrap();
        assert!(matches!(cli.command, Command::Constructs));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["pystep"]).is_err());
    }
}
