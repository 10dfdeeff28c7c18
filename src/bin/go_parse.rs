//! Lexing and parsing: syntax errors and recognized constructs
//!
//! Usage: go_parse [--json] [--report] [--max-errors N] <file.go>

use go_analyzer::cli::{self, Mode};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    cli::main(Mode::Parse)
}
