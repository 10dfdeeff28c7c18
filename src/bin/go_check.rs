//! Full analysis: lexing, parsing and semantic checks with the symbol table
//!
//! Usage: go_check [--json] [--report] [--max-errors N] <file.go>

use go_analyzer::cli::{self, Mode};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    cli::main(Mode::Check)
}
