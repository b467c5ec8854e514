//! `replay` subcommand: run a recorded trace of operations through the backend.
//!
//! A trace is a JSON array of operations:
//!
//! ```json
//! [
//!   { "op": "add", "precision": "binary64", "a": 1.0000001, "b": -1.0 },
//!   { "op": "fma", "precision": "binary32", "a": 2.0, "b": 3.0, "c": -5.9 }
//! ]
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use tabled::{settings::Style, Table, Tabled};

use cancelcheck_core::prelude::*;

use crate::ops::{run_operation, Operation};
use crate::{start_backend, OutputFormat, ThresholdOptions};

/// Arguments for the replay command
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Trace file (JSON array of operations)
    #[arg(value_name = "TRACE")]
    pub trace: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub thresholds: ThresholdOptions,
}

/// One recorded operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Operation kind
    pub op: Operation,
    /// Precision the operation runs at
    pub precision: PrecisionKind,
    /// First operand
    pub a: f64,
    /// Second operand
    pub b: f64,
    /// Addend, fma only
    #[serde(default)]
    pub c: Option<f64>,
}

impl TraceEntry {
    fn operands(&self) -> Vec<f64> {
        let mut operands = vec![self.a, self.b];
        operands.extend(self.c);
        operands
    }
}

/// Load a trace file.
///
/// # Errors
///
/// Fails if the file cannot be read or is not a JSON array of entries.
pub fn load_trace(path: &Path) -> Result<Vec<TraceEntry>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

/// Per-precision outcome of a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrecisionReport {
    /// Operations replayed at this precision
    pub operations: u64,
    /// Threshold in force
    pub threshold: u32,
    /// Events and worst cancellation
    #[serde(flatten)]
    pub summary: PrecisionSummary,
}

/// Replay outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// Trace file replayed
    pub trace: PathBuf,
    /// Binary32 then binary64
    pub precisions: Vec<PrecisionReport>,
}

impl ReplayReport {
    /// Events across both precisions.
    #[must_use]
    pub fn total_events(&self) -> u64 {
        self.precisions.iter().map(|p| p.summary.events).sum()
    }
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Precision")]
    precision: String,
    #[tabled(rename = "Threshold")]
    threshold: u32,
    #[tabled(rename = "Operations")]
    operations: u64,
    #[tabled(rename = "Events")]
    events: u64,
    #[tabled(rename = "Max bits")]
    max_bits: String,
}

impl From<&PrecisionReport> for SummaryRow {
    fn from(report: &PrecisionReport) -> Self {
        Self {
            precision: report.summary.precision.to_string(),
            threshold: report.threshold,
            operations: report.operations,
            events: report.summary.events,
            max_bits: report
                .summary
                .max_cancelled_bits
                .map_or_else(|| "-".to_string(), |bits| bits.to_string()),
        }
    }
}

/// Replay `entries` through a freshly started backend.
///
/// # Errors
///
/// Fails on backend setup errors or a malformed entry.
pub fn replay(
    trace: &Path,
    entries: &[TraceEntry],
    thresholds: &ThresholdOptions,
) -> Result<ReplayReport> {
    let stats = Arc::new(CancellationStats::new());
    let (backend, table) = start_backend(stats.clone(), thresholds)?;

    let (mut ops_b32, mut ops_b64) = (0u64, 0u64);
    for (index, entry) in entries.iter().enumerate() {
        run_operation(
            &table,
            backend.context(),
            entry.op,
            entry.precision,
            &entry.operands(),
        )
        .with_context(|| format!("trace entry {index}"))?;
        match entry.precision {
            PrecisionKind::Binary32 => ops_b32 += 1,
            PrecisionKind::Binary64 => ops_b64 += 1,
        }
    }
    tracing::debug!(operations = entries.len(), events = stats.total(), "replay finished");

    let limits = backend.thresholds();
    let precisions = [
        (PrecisionKind::Binary32, ops_b32),
        (PrecisionKind::Binary64, ops_b64),
    ]
    .into_iter()
    .map(|(kind, operations)| PrecisionReport {
        operations,
        threshold: limits.get(kind),
        summary: stats.summary(kind),
    })
    .collect();
    backend.finalize();

    Ok(ReplayReport {
        trace: trace.to_path_buf(),
        precisions,
    })
}

/// Execute the replay command.
///
/// # Errors
///
/// See [`load_trace`] and [`replay`].
pub fn execute(args: ReplayArgs) -> Result<()> {
    let entries = load_trace(&args.trace)?;
    let report = replay(&args.trace, &entries, &args.thresholds)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => {
            let rows: Vec<SummaryRow> = report.precisions.iter().map(SummaryRow::from).collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
            let total = report.total_events();
            if total > 0 {
                println!("{} {} cancellation event(s)", "WARNING".yellow().bold(), total);
            } else {
                println!("{}", "No cancellation detected".green());
            }
        }
    }
    Ok(())
}
