//! `eval` subcommand: one operation through the backend.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use cancelcheck_core::prelude::*;

use crate::ops::{run_operation, Operation, PrecisionArg};
use crate::{start_backend, OutputFormat, ThresholdOptions};

/// Arguments for the eval command
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Operation to perform
    #[arg(value_enum)]
    pub op: Operation,

    /// Operands: two for add/sub/mul/div, three for fma
    #[arg(num_args = 2..=3, allow_negative_numbers = true, required = true)]
    pub operands: Vec<f64>,

    /// Precision of the operation
    #[arg(short, long, value_enum, default_value = "binary64")]
    pub precision: PrecisionArg,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub thresholds: ThresholdOptions,
}

/// Outcome of one evaluated operation.
#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    /// Operation performed
    pub op: Operation,
    /// Precision used
    pub precision: PrecisionKind,
    /// Result, widened to binary64
    pub result: f64,
    /// Threshold in force for the precision
    pub threshold: u32,
    /// Event raised by the backend, if any
    pub event: Option<CancellationEvent>,
}

/// Evaluate one operation and build its report.
///
/// # Errors
///
/// Fails on backend setup errors or an operand count mismatch.
pub fn evaluate(args: &EvalArgs) -> Result<EvalReport> {
    let recorder = Arc::new(CancellationRecorder::new());
    let (backend, table) = start_backend(recorder.clone(), &args.thresholds)?;
    let precision = PrecisionKind::from(args.precision);

    let result = run_operation(&table, backend.context(), args.op, precision, &args.operands)?;
    let report = EvalReport {
        op: args.op,
        precision,
        result,
        threshold: backend.thresholds().get(precision),
        event: recorder.events().first().copied(),
    };
    backend.finalize();
    Ok(report)
}

/// Execute the eval command.
///
/// # Errors
///
/// See [`evaluate`].
pub fn execute(args: EvalArgs) -> Result<()> {
    let report = evaluate(&args)?;
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_report(&report),
    }
    Ok(())
}

fn print_report(report: &EvalReport) {
    println!(
        "{:?} ({}) = {:e}",
        report.op, report.precision, report.result
    );
    match report.event {
        Some(event) => println!(
            "{} {} bits cancelled (threshold {})",
            "CANCELLATION".red().bold(),
            event.cancelled_bits,
            report.threshold
        ),
        None => println!(
            "{} below threshold {}",
            "ok".green(),
            report.threshold
        ),
    }
}
