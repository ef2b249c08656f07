//! # Solast
// CLI for the Solidity parser: JSON AST output, syntax validation, and
// pragma version detection.

use clap::{Args, Parser};
use std::process;

mod commands;
mod diagnostics;

#[derive(Parser)]
#[clap(name = "solast", version, about = "Solidity AST parser")]
enum App {
  /// Parses a Solidity file and prints the syntax tree as JSON
  Parse(ParseOptions),

  /// Checks a Solidity file for syntax errors
  Validate {
    /// The file to check, or `-` for stdin
    file: Option<String>,
  },

  /// Detects the Solidity version from a file's pragma directive
  #[clap(name = "version-detect")]
  VersionDetect {
    /// The file to inspect, or `-` for stdin
    file: Option<String>,
  },
}

#[derive(Args)]
struct ParseOptions {
  /// The file to parse, or `-` for stdin
  file: Option<String>,

  /// Include line/column location information on every node
  #[clap(long)]
  loc: bool,
  /// Include byte range information on every node
  #[clap(long)]
  range: bool,
  /// Collect errors and keep parsing instead of stopping at the first one
  #[clap(long)]
  tolerant: bool,
  /// Print compact JSON instead of pretty printing
  #[clap(long)]
  compact: bool,

  /// Write the output to a file instead of stdout
  #[clap(short, long)]
  output: Option<String>,
}

fn main() -> process::ExitCode {
  let result = match App::parse() {
    App::Parse(options) => commands::parse(&options),
    App::Validate { file } => commands::validate(file.as_deref()),
    App::VersionDetect { file } => commands::version_detect(file.as_deref()),
  };

  match result {
    Ok(()) => process::ExitCode::SUCCESS,
    Err(()) => process::ExitCode::FAILURE,
  }
}
