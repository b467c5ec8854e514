//! Command-line configuration adapter.
//!
//! Option values are captured as raw strings and validated here, not by the
//! parser: an invalid threshold is logged and ignored, it never aborts.
//! An option may be repeated; every occurrence is applied in order, so the
//! last valid value wins.

use clap::{ArgAction, Parser};

use crate::config::{KEY_THRESHOLD_B32, KEY_THRESHOLD_B64};
use crate::error::{BackendError, BackendResult};
use crate::host::ParseLongFn;
use crate::precision::PrecisionKind;

/// Raw threshold options as they appeared on the command line.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "interflop-checkcancellation")]
pub struct ThresholdArgs {
    /// Select cancellation threshold for binary32
    #[arg(
        long = "threshold-binary32",
        value_name = "THRESHOLD",
        allow_hyphen_values = true,
        action = ArgAction::Append
    )]
    pub threshold_binary32: Vec<String>,

    /// Select cancellation threshold for binary64
    #[arg(
        long = "threshold-binary64",
        value_name = "THRESHOLD",
        allow_hyphen_values = true,
        action = ArgAction::Append
    )]
    pub threshold_binary64: Vec<String>,
}

impl ThresholdArgs {
    /// Every raw value with its precision: binary32 occurrences first, each
    /// option in command-line order.
    pub fn values(&self) -> impl Iterator<Item = (PrecisionKind, &str)> + '_ {
        let b32 = self
            .threshold_binary32
            .iter()
            .map(|raw| (PrecisionKind::Binary32, raw.as_str()));
        let b64 = self
            .threshold_binary64
            .iter()
            .map(|raw| (PrecisionKind::Binary64, raw.as_str()));
        b32.chain(b64)
    }
}

/// Argument-parsing primitive supplied by the host.
///
/// `args` follows `argv` conventions: the first element is the program name.
pub trait ArgParser: Send + Sync {
    /// Extract the threshold options from `args`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::CommandLine`] if `args` is malformed.
    fn parse(&self, args: &[String]) -> BackendResult<ThresholdArgs>;
}

/// [`ArgParser`] backed by `clap`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClapArgParser;

impl ArgParser for ClapArgParser {
    fn parse(&self, args: &[String]) -> BackendResult<ThresholdArgs> {
        ThresholdArgs::try_parse_from(args).map_err(|e| BackendError::CommandLine(e.to_string()))
    }
}

/// Option key for a precision.
#[must_use]
pub const fn option_key(precision: PrecisionKind) -> &'static str {
    match precision {
        PrecisionKind::Binary32 => KEY_THRESHOLD_B32,
        PrecisionKind::Binary64 => KEY_THRESHOLD_B64,
    }
}

/// Validate a raw threshold: a strictly positive integer that fits in `u32`.
///
/// # Errors
///
/// Returns [`BackendError::InvalidThreshold`] for non-numeric, zero, negative
/// or out-of-range input.
pub fn parse_threshold(
    precision: PrecisionKind,
    raw: &str,
    parse_long: ParseLongFn,
) -> BackendResult<u32> {
    let option = option_key(precision);
    match parse_long(raw) {
        Some(val) if val > 0 => {
            u32::try_from(val).map_err(|_| BackendError::invalid_threshold(option, raw))
        }
        _ => Err(BackendError::invalid_threshold(option, raw)),
    }
}
