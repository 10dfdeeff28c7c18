//! Shared command-line driver for the `go_lex`, `go_parse` and `go_check` binaries
//!
//! Usage: `<binary> [--json] [--report] [--max-errors N] <file.go>`
//!
//! Exit codes: 0 when the phases run found no errors, 1 when they did, 2 when
//! the command line is wrong or the file cannot be read.

use crate::config::{parse_max_errors, Config, OutputFormat};
use crate::diagnostics::Diagnostics;
use crate::pipeline::{analyze_with_config, parse_with_config, tokenize_with_config};
use crate::report;
use log::debug;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// How far through the pipeline a binary goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Lex,
    Parse,
    Check,
}

impl Mode {
    pub fn program(self) -> &'static str {
        match self {
            Mode::Lex => "go_lex",
            Mode::Parse => "go_parse",
            Mode::Check => "go_check",
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub path: PathBuf,
    pub format: OutputFormat,
    /// Print the full report instead of only the error lines
    pub report: bool,
    /// `Some(None)` lifts the cap
    pub max_errors: Option<Option<usize>>,
}

pub fn usage(mode: Mode) -> String {
    format!("Usage: {} [--json] [--report] [--max-errors N] <file.go>", mode.program())
}

pub fn parse_args<I, S>(mode: Mode, args: I) -> Result<CliArgs, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut path = None;
    let mut format = OutputFormat::Text;
    let mut report = false;
    let mut max_errors = None;

    let mut args = args.into_iter().map(Into::into);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => format = OutputFormat::Json,
            "--report" => report = true,
            "--max-errors" => {
                let value = args
                    .next()
                    .ok_or_else(|| CliError::Usage("--max-errors needs a value".to_string()))?;
                let parsed = parse_max_errors(&value)
                    .ok_or_else(|| CliError::Usage(format!("invalid --max-errors value: {}", value)))?;
                max_errors = Some(parsed);
            }
            flag if flag.starts_with("--") => {
                return Err(CliError::Usage(format!("unknown option {}\n{}", flag, usage(mode))));
            }
            _ if path.is_some() => {
                return Err(CliError::Usage(format!("expected a single file\n{}", usage(mode))));
            }
            _ => path = Some(PathBuf::from(arg)),
        }
    }

    let path = path.ok_or_else(|| CliError::Usage(usage(mode)))?;
    Ok(CliArgs {
        path,
        format,
        report,
        max_errors,
    })
}

/// Run one binary's work, writing the report to `out`; returns the exit code
pub fn run(mode: Mode, args: &CliArgs, config: Config, out: &mut impl Write) -> Result<u8, CliError> {
    let mut config = config;
    config.format = args.format;
    if let Some(max_errors) = args.max_errors {
        config.analyzer.max_errors = max_errors;
    }

    let source = fs::read_to_string(&args.path).map_err(|source| CliError::Read {
        path: args.path.clone(),
        source,
    })?;
    debug!("{}: read {} bytes from {}", mode.program(), source.len(), args.path.display());

    let (text, diagnostics): (String, Diagnostics) = match mode {
        Mode::Lex => {
            let output = tokenize_with_config(&source, &config.analyzer);
            (render(&output, &config, args.report, report::lex_report)?, output.diagnostics())
        }
        Mode::Parse => {
            let output = parse_with_config(&source, &config.analyzer);
            (render(&output, &config, args.report, report::parse_report)?, output.diagnostics())
        }
        Mode::Check => {
            let output = analyze_with_config(&source, &config.analyzer);
            (render(&output, &config, args.report, report::analysis_report)?, output.diagnostics())
        }
    };

    let text = match (config.format, args.report) {
        (OutputFormat::Text, false) => report::diagnostic_lines(&diagnostics),
        _ => text,
    };
    out.write_all(text.as_bytes())?;
    if config.format == OutputFormat::Json {
        writeln!(out)?;
    }
    out.flush()?;

    Ok(if diagnostics.is_empty() { 0 } else { 1 })
}

fn render<T: serde::Serialize>(
    output: &T,
    config: &Config,
    full: bool,
    text_report: fn(&T) -> String,
) -> Result<String, CliError> {
    Ok(match config.format {
        OutputFormat::Json => report::to_json(output)?,
        OutputFormat::Text if full => text_report(output),
        OutputFormat::Text => String::new(),
    })
}

/// Entry point shared by the binaries
pub fn main(mode: Mode) -> ExitCode {
    let args = match parse_args(mode, env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::from(2);
        }
    };

    let stdout = io::stdout();
    match run(mode, &args, Config::from_env(), &mut stdout.lock()) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{}: {}", mode.program(), err);
            ExitCode::from(2)
        }
    }
}
