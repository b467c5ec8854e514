//! cancelcheck CLI
//!
//! Command-line host for the cancellation-detection backend. It plays the
//! role of an instrumentation host: it sets the backend up, configures it,
//! and feeds operations through the dispatch table.
//!
//! # Usage
//!
//! ```bash
//! # Backend name, version and default thresholds
//! cancelcheck info
//!
//! # Check a single operation
//! cancelcheck eval add 1.0000001 -1.0 --threshold-binary64 20
//!
//! # Replay a JSON trace of operations
//! cancelcheck replay trace.json --config thresholds.json --format json
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use cancelcheck_core::host::abort_process;
use cancelcheck_core::prelude::*;

pub mod eval;
pub mod ops;
pub mod replay;

/// cancelcheck Command Line Interface
#[derive(Parser, Debug)]
#[command(name = "cancelcheck")]
#[command(author, version, about = "Detect catastrophic cancellation in floating-point operations")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a single operation through the backend
    Eval(eval::EvalArgs),

    /// Replay a JSON trace of operations through the backend
    Replay(replay::ReplayArgs),

    /// Display backend information
    Info,
}

/// Threshold options shared by `eval` and `replay`.
///
/// Values are forwarded verbatim to the backend's command-line entry point,
/// which logs and ignores invalid ones.
#[derive(Args, Debug, Clone, Default)]
pub struct ThresholdOptions {
    /// Cancellation threshold for binary32
    #[arg(long, value_name = "THRESHOLD", allow_hyphen_values = true)]
    pub threshold_binary32: Option<String>,

    /// Cancellation threshold for binary64
    #[arg(long, value_name = "THRESHOLD", allow_hyphen_values = true)]
    pub threshold_binary64: Option<String>,

    /// JSON configuration record applied before the threshold options
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ThresholdOptions {
    /// Backend argv for the options that were given.
    #[must_use]
    pub fn to_argv(&self) -> Vec<String> {
        let mut argv = vec![env!("CARGO_PKG_NAME").to_string()];
        if let Some(value) = &self.threshold_binary32 {
            argv.push(format!("--threshold-binary32={value}"));
        }
        if let Some(value) = &self.threshold_binary64 {
            argv.push(format!("--threshold-binary64={value}"));
        }
        argv
    }
}

/// Output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Set up, configure and activate a backend that reports to `handler`.
///
/// # Errors
///
/// Fails if the configuration file cannot be loaded or the backend rejects
/// the forwarded options.
pub fn start_backend<H: CancellationHandler + 'static>(
    handler: Arc<H>,
    options: &ThresholdOptions,
) -> Result<(Backend, BackendInterface)> {
    let services = HostServices::builder()
        .panic(abort_process)
        .output(Box::new(std::io::stderr()))
        .cancellation_handler(handler)
        .with_std_primitives()
        .arg_parser(ClapArgParser)
        .build()
        .context("backend setup failed")?;

    let mut backend = Backend::pre_init(services);

    if let Some(path) = &options.config {
        let conf = CheckCancellationConf::from_json(path)
            .with_context(|| format!("loading {}", path.display()))?;
        tracing::info!(path = %path.display(), "applying configuration record");
        backend.configure(&conf);
    }

    backend
        .cli(&options.to_argv())
        .context("invalid threshold options")?;

    let table = backend.init();
    Ok((backend, table))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argv_forwards_raw_values() {
        let options = ThresholdOptions {
            threshold_binary32: Some("-5".into()),
            threshold_binary64: Some("20".into()),
            config: None,
        };
        assert_eq!(
            options.to_argv(),
            vec![
                "cancelcheck-cli".to_string(),
                "--threshold-binary32=-5".to_string(),
                "--threshold-binary64=20".to_string(),
            ]
        );
    }

    #[test]
    fn start_backend_applies_config_then_options() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf.json");
        CheckCancellationConf {
            threshold_b32: 3,
            threshold_b64: 9,
        }
        .to_json(&path)
        .unwrap();

        let options = ThresholdOptions {
            threshold_binary32: None,
            threshold_binary64: Some("12".into()),
            config: Some(path),
        };
        let (backend, table) =
            start_backend(Arc::new(CancellationRecorder::new()), &options).unwrap();
        assert_eq!(backend.state(), BackendState::Active);
        assert_eq!(backend.thresholds().threshold_b32, 3);
        assert_eq!(backend.thresholds().threshold_b64, 12);
        assert!(table.add_double.is_some());
    }

    #[test]
    fn cli_parses_eval() {
        let cli = Cli::try_parse_from([
            "cancelcheck",
            "eval",
            "sub",
            "1.0000001",
            "1.0",
            "--threshold-binary64",
            "20",
        ])
        .unwrap();
        match cli.command {
            Commands::Eval(args) => {
                assert_eq!(args.operands, vec![1.000_000_1, 1.0]);
                assert_eq!(args.thresholds.threshold_binary64.as_deref(), Some("20"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
