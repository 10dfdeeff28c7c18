//! Runtime configuration shared by the library entry points and binaries

use crate::semantic::AnalyzerConfig;
use log::warn;
use std::env;

/// Environment variable overriding the per-phase error cap; `0` disables it
pub const MAX_ERRORS_ENV: &str = "GO_ANALYZER_MAX_ERRORS";

/// How reports are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub analyzer: AnalyzerConfig,
    pub format: OutputFormat,
}

impl Config {
    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup(MAX_ERRORS_ENV) {
            match parse_max_errors(&raw) {
                Some(max_errors) => config.analyzer.max_errors = max_errors,
                None => warn!("ignoring {}={:?}: not a number", MAX_ERRORS_ENV, raw),
            }
        }
        config
    }

    pub fn max_errors(&self) -> Option<usize> {
        self.analyzer.max_errors
    }
}

/// `Some(None)` means no cap
pub(crate) fn parse_max_errors(raw: &str) -> Option<Option<usize>> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Some(None),
        Ok(n) => Some(Some(n)),
        Err(_) => None,
    }
}
