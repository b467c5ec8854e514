//! Exponent-difference cancellation estimate.
//!
//! For `r = a ± b` the estimate is `max(e(a), e(b)) - e(r)` where `e` is the
//! stored exponent field. When it reaches the configured threshold for the
//! precision, the context's handler is notified. NaN and infinity are not
//! filtered: hosts that forward them may see spurious events.

use crate::context::CheckCancellationContext;
use crate::handler::CancellationEvent;
use crate::precision::Precision;

/// Estimated number of cancelled bits from three exponent fields.
///
/// Negative when the result outgrew both operands.
#[inline]
#[must_use]
pub fn cancelled_bits(ea: u32, eb: u32, er: u32) -> i32 {
    let emax = ea.max(eb);
    // Exponent fields are at most 11 bits wide, both casts are lossless.
    emax as i32 - er as i32
}

/// Signed comparison against an unsigned threshold.
///
/// A negative estimate never reaches any threshold, including zero.
#[inline]
#[must_use]
pub fn meets_threshold(cancelled: i32, threshold: u32) -> bool {
    i64::from(cancelled) >= i64::from(threshold)
}

/// Evaluate `a`, `b` and result `r` and notify the handler if needed.
///
/// Returns the event that was delivered, if any.
#[inline]
pub fn check_cancellation<P: Precision>(
    a: P,
    b: P,
    r: P,
    ctx: &CheckCancellationContext,
) -> Option<CancellationEvent> {
    let cancelled = cancelled_bits(a.exponent_field(), b.exponent_field(), r.exponent_field());
    if !meets_threshold(cancelled, ctx.threshold::<P>()) {
        return None;
    }
    let event = CancellationEvent {
        precision: P::KIND,
        cancelled_bits: cancelled,
    };
    ctx.notify(event);
    Some(event)
}
