//! Fixed dispatch table handed to the instrumentation host.
//!
//! Add, sub and fma receive the result the host already computed in `res`,
//! run the cancellation check and leave `res` untouched. Mul and div are
//! plain arithmetic with no check: their result exponent is a sum/difference
//! of operand exponents, not a subtractive cancellation.

use std::fmt;

use crate::context::CheckCancellationContext;
use crate::evaluator::check_cancellation;

/// Binary operation entry point.
pub type BinaryOp<T> = fn(a: T, b: T, res: &mut T, ctx: &CheckCancellationContext);

/// Fused multiply-add entry point.
pub type TernaryOp<T> = fn(a: T, b: T, c: T, res: &mut T, ctx: &CheckCancellationContext);

/// Comparison entry point (never provided by this backend).
pub type CmpOp<T> = fn(a: T, b: T, res: &mut bool, ctx: &CheckCancellationContext);

/// Precision-cast entry point (never provided by this backend).
pub type CastOp = fn(a: f64, res: &mut f32, ctx: &CheckCancellationContext);

/// Function-pointer record, one slot per intercepted operation.
#[derive(Clone, Copy)]
pub struct BackendInterface {
    pub add_float: Option<BinaryOp<f32>>,
    pub sub_float: Option<BinaryOp<f32>>,
    pub mul_float: Option<BinaryOp<f32>>,
    pub div_float: Option<BinaryOp<f32>>,
    pub cmp_float: Option<CmpOp<f32>>,
    pub add_double: Option<BinaryOp<f64>>,
    pub sub_double: Option<BinaryOp<f64>>,
    pub mul_double: Option<BinaryOp<f64>>,
    pub div_double: Option<BinaryOp<f64>>,
    pub cmp_double: Option<CmpOp<f64>>,
    pub cast_double_to_float: Option<CastOp>,
    pub fma_float: Option<TernaryOp<f32>>,
    pub fma_double: Option<TernaryOp<f64>>,
}

impl BackendInterface {
    /// The table for this backend.
    #[must_use]
    pub const fn checkcancellation() -> Self {
        Self {
            add_float: Some(add_float),
            sub_float: Some(sub_float),
            mul_float: Some(mul_float),
            div_float: Some(div_float),
            cmp_float: None,
            add_double: Some(add_double),
            sub_double: Some(sub_double),
            mul_double: Some(mul_double),
            div_double: Some(div_double),
            cmp_double: None,
            cast_double_to_float: None,
            fma_float: Some(fma_float),
            fma_double: Some(fma_double),
        }
    }

    /// Number of populated entries.
    #[must_use]
    pub fn implemented(&self) -> usize {
        [
            self.add_float.is_some(),
            self.sub_float.is_some(),
            self.mul_float.is_some(),
            self.div_float.is_some(),
            self.cmp_float.is_some(),
            self.add_double.is_some(),
            self.sub_double.is_some(),
            self.mul_double.is_some(),
            self.div_double.is_some(),
            self.cmp_double.is_some(),
            self.cast_double_to_float.is_some(),
            self.fma_float.is_some(),
            self.fma_double.is_some(),
        ]
        .into_iter()
        .filter(|&present| present)
        .count()
    }
}

impl fmt::Debug for BackendInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendInterface")
            .field("implemented", &self.implemented())
            .finish_non_exhaustive()
    }
}

pub fn add_float(a: f32, b: f32, res: &mut f32, ctx: &CheckCancellationContext) {
    check_cancellation(a, b, *res, ctx);
}

pub fn sub_float(a: f32, b: f32, res: &mut f32, ctx: &CheckCancellationContext) {
    check_cancellation(a, b, *res, ctx);
}

pub fn mul_float(a: f32, b: f32, res: &mut f32, _ctx: &CheckCancellationContext) {
    *res = a * b;
}

pub fn div_float(a: f32, b: f32, res: &mut f32, _ctx: &CheckCancellationContext) {
    *res = a / b;
}

pub fn fma_float(a: f32, b: f32, c: f32, res: &mut f32, ctx: &CheckCancellationContext) {
    check_cancellation(a * b, c, *res, ctx);
}

pub fn add_double(a: f64, b: f64, res: &mut f64, ctx: &CheckCancellationContext) {
    check_cancellation(a, b, *res, ctx);
}

pub fn sub_double(a: f64, b: f64, res: &mut f64, ctx: &CheckCancellationContext) {
    check_cancellation(a, b, *res, ctx);
}

pub fn mul_double(a: f64, b: f64, res: &mut f64, _ctx: &CheckCancellationContext) {
    *res = a * b;
}

pub fn div_double(a: f64, b: f64, res: &mut f64, _ctx: &CheckCancellationContext) {
    *res = a / b;
}

pub fn fma_double(a: f64, b: f64, c: f64, res: &mut f64, ctx: &CheckCancellationContext) {
    check_cancellation(a * b, c, *res, ctx);
}
