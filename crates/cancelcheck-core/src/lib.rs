//! # cancelcheck-core
//!
//! Floating-point backend that detects catastrophic cancellation in
//! operations handed to it by an instrumentation host.
//!
//! For every intercepted addition, subtraction and fused multiply-add the
//! backend estimates the number of significant bits lost from the stored
//! exponent fields of the operands and the result:
//!
//! ```text
//! cancelled = max(e(a), e(b)) - e(r)
//! ```
//!
//! and notifies a host-supplied [`CancellationHandler`] when the estimate
//! reaches the configured per-precision threshold. Multiplication and
//! division are passed through unchecked. The arithmetic result is never
//! altered.
//!
//! - **Lifecycle**: [`Backend`] (`pre_init` → `cli`/`configure` → `init` →
//!   `finalize`).
//! - **Dispatch**: [`BackendInterface`], a fixed table of entry points that
//!   take the [`CheckCancellationContext`] handle.
//! - **Collaborators**: [`HostServices`], validated at construction.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use cancelcheck_core::prelude::*;
//! use cancelcheck_core::host::abort_process;
//!
//! let recorder = Arc::new(CancellationRecorder::new());
//! let services = HostServices::builder()
//!     .panic(abort_process)
//!     .output(Box::new(std::io::sink()))
//!     .cancellation_handler(recorder.clone())
//!     .with_std_primitives()
//!     .build()
//!     .unwrap();
//!
//! let mut backend = Backend::pre_init(services);
//! backend.configure(&CheckCancellationConf { threshold_b32: 10, threshold_b64: 20 });
//! let table = backend.init();
//!
//! let (a, b) = (1.000_000_1_f64, -1.0_f64);
//! let mut r = a + b;
//! (table.add_double.unwrap())(a, b, &mut r, backend.context());
//! assert!(recorder.events()[0].cancelled_bits >= 20);
//! ```

#![forbid(unsafe_code)]

pub mod backend;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod handler;
pub mod host;
pub mod interface;
pub mod logger;
pub mod precision;

pub use backend::{Backend, BackendState};
pub use cli::{ArgParser, ClapArgParser, ThresholdArgs};
pub use config::CheckCancellationConf;
pub use context::{CheckCancellationContext, ThresholdConfig};
pub use error::{BackendError, BackendResult, ConfigError};
pub use evaluator::{cancelled_bits, check_cancellation, meets_threshold};
pub use handler::{
    CancellationEvent, CancellationHandler, CancellationRecorder, CancellationStats,
    PrecisionSummary,
};
pub use host::{HostServices, HostServicesBuilder};
pub use interface::BackendInterface;
pub use precision::{exponent_field, Precision, PrecisionKind};

/// Name reported to the host.
pub const BACKEND_NAME: &str = "interflop-checkcancellation";

/// Crate version, reported to the host as the backend version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convenient re-exports for hosts.
///
/// ```rust
/// use cancelcheck_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backend::{Backend, BackendState};
    pub use crate::cli::ClapArgParser;
    pub use crate::config::CheckCancellationConf;
    pub use crate::context::{CheckCancellationContext, ThresholdConfig};
    pub use crate::error::{BackendError, BackendResult};
    pub use crate::handler::{
        CancellationEvent, CancellationHandler, CancellationRecorder, CancellationStats,
        PrecisionSummary,
    };
    pub use crate::host::HostServices;
    pub use crate::interface::BackendInterface;
    pub use crate::precision::{Precision, PrecisionKind};
}
