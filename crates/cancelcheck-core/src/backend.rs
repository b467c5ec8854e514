//! Backend lifecycle.
//!
//! ```text
//! Uninitialized ──pre_init──▶ Initialized ──cli / configure──▶ Configured
//!                                  │                               │
//!                                  └──────────── init ─────────────┴──▶ Active
//! ```
//!
//! [`Backend::pre_init`] is the only constructor, so an instance that exists
//! has already been given every collaborator it needs. Configuration is
//! expected to finish before [`Backend::init`] hands out the dispatch table;
//! reconfiguring an active backend is logged, not prevented.

use std::fmt;

use crate::cli::{option_key, parse_threshold, ArgParser};
use crate::config::{CheckCancellationConf, SILENT_LOAD_ENV};
use crate::context::{CheckCancellationContext, ThresholdConfig};
use crate::error::{BackendError, BackendResult};
use crate::host::{EqIgnoreCaseFn, HostServices, HostServicesBuilder, PanicFn, ParseLongFn};
use crate::interface::BackendInterface;
use crate::logger::BackendLogger;
use crate::precision::PrecisionKind;
use crate::{BACKEND_NAME, VERSION};

/// Lifecycle position of a [`Backend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    /// Context allocated and zeroed.
    Initialized,
    /// At least one configuration step ran.
    Configured,
    /// Dispatch table handed out.
    Active,
}

impl BackendState {
    /// Lowercase state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Configured => "configured",
            Self::Active => "active",
        }
    }
}

impl fmt::Display for BackendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cancellation-checking backend instance.
pub struct Backend {
    context: CheckCancellationContext,
    logger: BackendLogger,
    panic: PanicFn,
    parse_long: ParseLongFn,
    eq_ignore_case: EqIgnoreCaseFn,
    arg_parser: Option<Box<dyn ArgParser>>,
    state: BackendState,
}

impl Backend {
    /// Backend name reported to the host.
    #[must_use]
    pub fn name() -> &'static str {
        BACKEND_NAME
    }

    /// Backend version reported to the host.
    #[must_use]
    pub fn version() -> &'static str {
        VERSION
    }

    /// Set up a backend from validated collaborators.
    ///
    /// Both thresholds start at zero.
    #[must_use]
    pub fn pre_init(services: HostServices) -> Self {
        let HostServices {
            panic,
            output,
            handler,
            parse_long,
            eq_ignore_case,
            arg_parser,
        } = services;
        tracing::debug!(backend = BACKEND_NAME, "backend initialized");
        Self {
            context: CheckCancellationContext::new(handler),
            logger: BackendLogger::new(BACKEND_NAME, output),
            panic,
            parse_long,
            eq_ignore_case,
            arg_parser,
            state: BackendState::Initialized,
        }
    }

    /// Validate `builder` and set up a backend from it.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::MissingCapability`] if a required collaborator
    /// is absent. The host is expected to abort on it.
    pub fn try_pre_init(builder: HostServicesBuilder) -> BackendResult<Self> {
        Ok(Self::pre_init(builder.build()?))
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> BackendState {
        self.state
    }

    /// Opaque handle to pass to every dispatch-table entry.
    #[must_use]
    pub fn context(&self) -> &CheckCancellationContext {
        &self.context
    }

    /// Current thresholds.
    #[must_use]
    pub fn thresholds(&self) -> ThresholdConfig {
        self.context.thresholds()
    }

    /// Configure from command-line style arguments (`args[0]` is the program).
    ///
    /// Invalid threshold values are logged and leave that threshold as it
    /// was; the other option is still applied. A repeated option is applied
    /// once per occurrence, so the last valid value wins.
    ///
    /// Calls the host panic hook if no argument parser was supplied.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::CommandLine`] if the parser rejects `args`.
    pub fn cli(&mut self, args: &[String]) -> BackendResult<()> {
        let Some(parser) = self.arg_parser.as_ref() else {
            (self.panic)(&BackendError::ParserUnavailable.to_string());
        };
        let parsed = parser.parse(args)?;
        self.enter_configuration();
        for (precision, raw) in parsed.values() {
            match parse_threshold(precision, raw, self.parse_long) {
                Ok(threshold) => {
                    tracing::debug!(option = option_key(precision), threshold, "threshold set");
                    self.context.set_threshold(precision, threshold);
                }
                Err(e) => self.logger.error(format_args!("{e}")),
            }
        }
        Ok(())
    }

    /// Overwrite both thresholds from `conf`, without validation.
    pub fn configure(&mut self, conf: &CheckCancellationConf) {
        self.enter_configuration();
        self.context.replace_thresholds(ThresholdConfig::from(*conf));
        tracing::debug!(
            threshold_b32 = conf.threshold_b32,
            threshold_b64 = conf.threshold_b64,
            "backend configured"
        );
    }

    /// Finish setup: print the load banner and return the dispatch table.
    ///
    /// The banner is skipped when [`SILENT_LOAD_ENV`] is `True`
    /// (case-insensitive).
    pub fn init(&mut self) -> BackendInterface {
        if !self.silent_load_requested() {
            self.print_information_header();
        }
        self.state = BackendState::Active;
        tracing::debug!(backend = BACKEND_NAME, "backend active");
        BackendInterface::checkcancellation()
    }

    /// Tear down. The backend owns nothing beyond its context.
    pub fn finalize(self) {
        tracing::debug!(backend = BACKEND_NAME, state = %self.state, "backend finalized");
    }

    fn enter_configuration(&mut self) {
        if self.state == BackendState::Active {
            self.logger.warning(format_args!(
                "reconfiguring an active backend; concurrent operations may observe either thresholds"
            ));
            return;
        }
        self.state = BackendState::Configured;
    }

    fn silent_load_requested(&self) -> bool {
        std::env::var(SILENT_LOAD_ENV)
            .map(|value| (self.eq_ignore_case)(&value, "True"))
            .unwrap_or(false)
    }

    pub(crate) fn print_information_header(&self) {
        let thresholds = self.context.thresholds();
        self.logger.info(format_args!("load backend with:"));
        self.logger.info(format_args!(
            "{} = {}",
            option_key(PrecisionKind::Binary32),
            thresholds.threshold_b32
        ));
        self.logger.info(format_args!(
            "{} = {}",
            option_key(PrecisionKind::Binary64),
            thresholds.threshold_b64
        ));
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("state", &self.state)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
