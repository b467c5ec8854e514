//! Host-side operation runner.
//!
//! Computes the arithmetic result the way an instrumentation host would,
//! then calls the matching dispatch-table entry.

use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use cancelcheck_core::prelude::*;

/// Intercepted operation kind.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// a + b
    Add,
    /// a - b
    Sub,
    /// a * b
    Mul,
    /// a / b
    Div,
    /// a * b + c, single rounding
    Fma,
}

impl Operation {
    /// Number of operands the operation takes.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Fma => 3,
            _ => 2,
        }
    }
}

/// Precision selector for the command line.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PrecisionArg {
    /// IEEE-754 binary32
    Binary32,
    /// IEEE-754 binary64
    #[default]
    Binary64,
}

impl From<PrecisionArg> for PrecisionKind {
    fn from(val: PrecisionArg) -> Self {
        match val {
            PrecisionArg::Binary32 => PrecisionKind::Binary32,
            PrecisionArg::Binary64 => PrecisionKind::Binary64,
        }
    }
}

fn missing(name: &'static str) -> anyhow::Error {
    anyhow!("dispatch table has no `{name}` entry")
}

/// Run one operation at `precision`, returning the result widened to `f64`.
///
/// Operands are rounded to binary32 first when `precision` is binary32.
///
/// # Errors
///
/// Fails if `operands` does not match the operation's arity.
pub fn run_operation(
    table: &BackendInterface,
    ctx: &CheckCancellationContext,
    op: Operation,
    precision: PrecisionKind,
    operands: &[f64],
) -> Result<f64> {
    if operands.len() != op.arity() {
        bail!(
            "{op:?} takes {} operands, got {}",
            op.arity(),
            operands.len()
        );
    }
    let (a, b) = (operands[0], operands[1]);
    let c = operands.get(2).copied().unwrap_or_default();

    match precision {
        PrecisionKind::Binary64 => {
            let mut r = 0.0_f64;
            match op {
                Operation::Add => {
                    r = a + b;
                    table.add_double.ok_or_else(|| missing("add_double"))?(a, b, &mut r, ctx);
                }
                Operation::Sub => {
                    r = a - b;
                    table.sub_double.ok_or_else(|| missing("sub_double"))?(a, b, &mut r, ctx);
                }
                Operation::Mul => {
                    table.mul_double.ok_or_else(|| missing("mul_double"))?(a, b, &mut r, ctx);
                }
                Operation::Div => {
                    table.div_double.ok_or_else(|| missing("div_double"))?(a, b, &mut r, ctx);
                }
                Operation::Fma => {
                    r = a.mul_add(b, c);
                    table.fma_double.ok_or_else(|| missing("fma_double"))?(a, b, c, &mut r, ctx);
                }
            }
            Ok(r)
        }
        PrecisionKind::Binary32 => {
            let (a, b, c) = (a as f32, b as f32, c as f32);
            let mut r = 0.0_f32;
            match op {
                Operation::Add => {
                    r = a + b;
                    table.add_float.ok_or_else(|| missing("add_float"))?(a, b, &mut r, ctx);
                }
                Operation::Sub => {
                    r = a - b;
                    table.sub_float.ok_or_else(|| missing("sub_float"))?(a, b, &mut r, ctx);
                }
                Operation::Mul => {
                    table.mul_float.ok_or_else(|| missing("mul_float"))?(a, b, &mut r, ctx);
                }
                Operation::Div => {
                    table.div_float.ok_or_else(|| missing("div_float"))?(a, b, &mut r, ctx);
                }
                Operation::Fma => {
                    r = a.mul_add(b, c);
                    table.fma_float.ok_or_else(|| missing("fma_float"))?(a, b, c, &mut r, ctx);
                }
            }
            Ok(f64::from(r))
        }
    }
}
