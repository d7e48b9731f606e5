//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use pystep_syntax::tags::CONSTRUCTS;

use super::{CliError, CliResult, EmitArgs, ExitCode};
use crate::emitter::Emitter;

/// Read the step document from a file, or from stdin for `-`.
fn read_input(path: &Path) -> CliResult<String> {
    if path == Path::new("-") {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .map_err(|e| CliError::failure(format!("Error reading stdin: {}", e)))?;
        return Ok(source);
    }
    fs::read_to_string(path).map_err(|e| CliError::failure(format!("Error reading {}: {}", path.display(), e)))
}

/// Render a JSON step document given as text.
pub fn render_document(source: &str, args: &EmitArgs) -> CliResult<String> {
    Emitter::new()
        .with_config(args.config())
        .generate_str(source)
        .map_err(|e| CliError::failure(format!("error: {}", e)))
}

/// `pystep emit`
pub fn emit(args: &EmitArgs) -> CliResult<ExitCode> {
    let source = read_input(&args.input)?;
    let output = render_document(&source, args)?;

    match &args.output {
        Some(out) => {
            fs::write(out, output).map_err(|e| CliError::failure(format!("Error writing {}: {}", out.display(), e)))?;
            tracing::info!(path = %out.display(), "wrote generated source");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(output.as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(|e| CliError::failure(format!("Error writing stdout: {}", e)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// One row of the `constructs` listing.
fn construct_row(canonical: &str, kind: &str, summary: &str, aliases: &[&str]) -> String {
    let mut row = format!("{:<20} {:<7} {}", canonical, kind, summary);
    if !aliases.is_empty() {
        row.push_str(&format!(" (aliases: {})", aliases.join(", ")));
    }
    row
}

/// `pystep constructs`
pub fn list_constructs() -> CliResult<ExitCode> {
    let mut stdout = io::stdout().lock();
    for info in CONSTRUCTS {
        writeln!(
            stdout,
            "{}",
            construct_row(info.canonical, info.kind.as_str(), info.summary, info.aliases)
        )
        .map_err(|e| CliError::failure(format!("Error writing stdout: {}", e)))?;
    }
    Ok(ExitCode::SUCCESS)
}
