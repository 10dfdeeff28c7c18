//! Lexical analysis only: token listing and lex errors
//!
//! Usage: go_lex [--json] [--report] [--max-errors N] <file.go>

use go_analyzer::cli::{self, Mode};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    cli::main(Mode::Lex)
}
