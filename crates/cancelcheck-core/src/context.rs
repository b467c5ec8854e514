//! Per-instance threshold store.
//!
//! One [`CheckCancellationContext`] exists per backend instance. It is written
//! during the configuration phase and only read once interception starts, so
//! the hot path takes no locks.

use std::fmt;
use std::sync::Arc;

use crate::config::CheckCancellationConf;
use crate::handler::{CancellationEvent, CancellationHandler};
use crate::precision::{Precision, PrecisionKind};

/// The two per-precision thresholds, in cancelled bits.
///
/// Zero means every non-negative cancellation is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThresholdConfig {
    /// Threshold applied to binary32 operations.
    pub threshold_b32: u32,
    /// Threshold applied to binary64 operations.
    pub threshold_b64: u32,
}

impl ThresholdConfig {
    /// Threshold for the given precision.
    #[inline]
    #[must_use]
    pub const fn get(&self, precision: PrecisionKind) -> u32 {
        match precision {
            PrecisionKind::Binary32 => self.threshold_b32,
            PrecisionKind::Binary64 => self.threshold_b64,
        }
    }

    /// Overwrite the threshold for one precision.
    pub fn set(&mut self, precision: PrecisionKind, threshold: u32) {
        match precision {
            PrecisionKind::Binary32 => self.threshold_b32 = threshold,
            PrecisionKind::Binary64 => self.threshold_b64 = threshold,
        }
    }
}

impl From<CheckCancellationConf> for ThresholdConfig {
    fn from(conf: CheckCancellationConf) -> Self {
        Self {
            threshold_b32: conf.threshold_b32,
            threshold_b64: conf.threshold_b64,
        }
    }
}

/// Opaque handle passed by the host on every intercepted operation.
pub struct CheckCancellationContext {
    thresholds: ThresholdConfig,
    handler: Arc<dyn CancellationHandler>,
}

impl CheckCancellationContext {
    /// Zero-initialized context bound to `handler`.
    pub(crate) fn new(handler: Arc<dyn CancellationHandler>) -> Self {
        Self {
            thresholds: ThresholdConfig::default(),
            handler,
        }
    }

    /// Current thresholds.
    #[must_use]
    pub fn thresholds(&self) -> ThresholdConfig {
        self.thresholds
    }

    /// Threshold that applies to values of type `P`.
    #[inline]
    #[must_use]
    pub fn threshold<P: Precision>(&self) -> u32 {
        self.thresholds.get(P::KIND)
    }

    pub(crate) fn set_threshold(&mut self, precision: PrecisionKind, threshold: u32) {
        self.thresholds.set(precision, threshold);
    }

    /// Replace both thresholds in one assignment.
    pub(crate) fn replace_thresholds(&mut self, thresholds: ThresholdConfig) {
        self.thresholds = thresholds;
    }

    #[inline]
    pub(crate) fn notify(&self, event: CancellationEvent) {
        self.handler.on_cancellation(event);
    }
}

impl fmt::Debug for CheckCancellationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckCancellationContext")
            .field("thresholds", &self.thresholds)
            .finish_non_exhaustive()
    }
}
