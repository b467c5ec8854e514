//! Collaborators the host must inject at construction time.
//!
//! Every capability the backend relies on is passed in explicitly through
//! [`HostServicesBuilder`]. [`HostServicesBuilder::build`] refuses to produce
//! a [`HostServices`] if a required capability is absent, so a backend can
//! never reach a state where it discovers a missing primitive mid-run.
//!
//! Memory for the context comes from Rust's global allocator; hosts that need
//! a specific allocator install it with `#[global_allocator]`.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use cancelcheck_core::handler::CancellationRecorder;
//! use cancelcheck_core::host::{abort_process, HostServices};
//!
//! let services = HostServices::builder()
//!     .panic(abort_process)
//!     .output(Box::new(std::io::sink()))
//!     .cancellation_handler(Arc::new(CancellationRecorder::new()))
//!     .with_std_primitives()
//!     .build()
//!     .expect("all capabilities supplied");
//! assert!(!services.has_arg_parser());
//! ```

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use crate::cli::ArgParser;
use crate::error::{BackendError, BackendResult};
use crate::handler::CancellationHandler;

/// Unrecoverable-error hook. Must not return.
pub type PanicFn = fn(&str) -> !;

/// String-to-integer primitive. `None` on any parse failure.
pub type ParseLongFn = fn(&str) -> Option<i64>;

/// Case-insensitive string equality primitive.
pub type EqIgnoreCaseFn = fn(&str, &str) -> bool;

/// Capability names, as reported in [`BackendError::MissingCapability`].
pub mod capability {
    /// Panic/abort hook.
    pub const PANIC: &str = "panic";
    /// Formatted diagnostic output stream.
    pub const OUTPUT: &str = "output";
    /// Cancellation handler callback.
    pub const CANCELLATION_HANDLER: &str = "cancellation_handler";
    /// String-to-integer parsing.
    pub const PARSE_LONG: &str = "parse_long";
    /// Case-insensitive string comparison.
    pub const EQ_IGNORE_CASE: &str = "eq_ignore_case";
}

/// Validated set of host collaborators.
pub struct HostServices {
    pub(crate) panic: PanicFn,
    pub(crate) output: Box<dyn Write + Send>,
    pub(crate) handler: Arc<dyn CancellationHandler>,
    pub(crate) parse_long: ParseLongFn,
    pub(crate) eq_ignore_case: EqIgnoreCaseFn,
    pub(crate) arg_parser: Option<Box<dyn ArgParser>>,
}

impl HostServices {
    /// Start building a set of collaborators.
    #[must_use]
    pub fn builder() -> HostServicesBuilder {
        HostServicesBuilder::default()
    }

    /// Returns `true` if the host supplied an argument parser.
    #[must_use]
    pub fn has_arg_parser(&self) -> bool {
        self.arg_parser.is_some()
    }
}

impl fmt::Debug for HostServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostServices")
            .field("arg_parser", &self.has_arg_parser())
            .finish_non_exhaustive()
    }
}

/// Builder for [`HostServices`].
#[derive(Default)]
pub struct HostServicesBuilder {
    panic: Option<PanicFn>,
    output: Option<Box<dyn Write + Send>>,
    handler: Option<Arc<dyn CancellationHandler>>,
    parse_long: Option<ParseLongFn>,
    eq_ignore_case: Option<EqIgnoreCaseFn>,
    arg_parser: Option<Box<dyn ArgParser>>,
}

impl HostServicesBuilder {
    /// Hook invoked on unrecoverable errors.
    #[must_use]
    pub fn panic(mut self, panic: PanicFn) -> Self {
        self.panic = Some(panic);
        self
    }

    /// Stream receiving the backend's formatted diagnostics.
    #[must_use]
    pub fn output(mut self, output: Box<dyn Write + Send>) -> Self {
        self.output = Some(output);
        self
    }

    /// Receiver of cancellation events.
    #[must_use]
    pub fn cancellation_handler<H: CancellationHandler + 'static>(mut self, handler: Arc<H>) -> Self {
        self.handler = Some(handler as Arc<dyn CancellationHandler>);
        self
    }

    /// String-to-integer primitive.
    #[must_use]
    pub fn parse_long(mut self, parse_long: ParseLongFn) -> Self {
        self.parse_long = Some(parse_long);
        self
    }

    /// Case-insensitive comparison primitive.
    #[must_use]
    pub fn eq_ignore_case(mut self, eq_ignore_case: EqIgnoreCaseFn) -> Self {
        self.eq_ignore_case = Some(eq_ignore_case);
        self
    }

    /// Argument parser enabling [`Backend::cli`](crate::backend::Backend::cli).
    #[must_use]
    pub fn arg_parser<A: ArgParser + 'static>(mut self, parser: A) -> Self {
        self.arg_parser = Some(Box::new(parser));
        self
    }

    /// Fill the string primitives with standard-library implementations.
    #[must_use]
    pub fn with_std_primitives(self) -> Self {
        self.parse_long(std_parse_long).eq_ignore_case(std_eq_ignore_case)
    }

    /// Validate and freeze the collaborator set.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::MissingCapability`] naming the first required
    /// capability that was not supplied.
    pub fn build(self) -> BackendResult<HostServices> {
        let missing = BackendError::missing_capability;
        Ok(HostServices {
            panic: self.panic.ok_or_else(|| missing(capability::PANIC))?,
            output: self.output.ok_or_else(|| missing(capability::OUTPUT))?,
            handler: self
                .handler
                .ok_or_else(|| missing(capability::CANCELLATION_HANDLER))?,
            parse_long: self.parse_long.ok_or_else(|| missing(capability::PARSE_LONG))?,
            eq_ignore_case: self
                .eq_ignore_case
                .ok_or_else(|| missing(capability::EQ_IGNORE_CASE))?,
            arg_parser: self.arg_parser,
        })
    }
}

/// Panic hook that logs the message and aborts the process.
pub fn abort_process(message: &str) -> ! {
    tracing::error!("{message}");
    std::process::abort()
}

/// Strict decimal parse: surrounding whitespace and a sign are allowed,
/// trailing garbage is rejected.
#[must_use]
pub fn std_parse_long(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

/// ASCII case-insensitive equality.
#[must_use]
pub fn std_eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ClapArgParser;
    use crate::handler::CancellationRecorder;

    fn test_panic(message: &str) -> ! {
        panic!("{message}")
    }

    fn complete() -> HostServicesBuilder {
        HostServices::builder()
            .panic(test_panic)
            .output(Box::new(std::io::sink()))
            .cancellation_handler(Arc::new(CancellationRecorder::new()))
            .with_std_primitives()
    }

    fn missing_name(result: BackendResult<HostServices>) -> &'static str {
        match result {
            Err(BackendError::MissingCapability { capability }) => capability,
            other => panic!("expected MissingCapability, got {other:?}"),
        }
    }

    #[test]
    fn complete_set_builds() {
        let services = complete().build().unwrap();
        assert!(!services.has_arg_parser());
        let services = complete().arg_parser(ClapArgParser).build().unwrap();
        assert!(services.has_arg_parser());
    }

    #[test]
    fn each_missing_capability_is_named() {
        let b = HostServices::builder()
            .output(Box::new(std::io::sink()))
            .cancellation_handler(Arc::new(CancellationRecorder::new()))
            .with_std_primitives();
        assert_eq!(missing_name(b.build()), capability::PANIC);

        let b = HostServices::builder()
            .panic(test_panic)
            .cancellation_handler(Arc::new(CancellationRecorder::new()))
            .with_std_primitives();
        assert_eq!(missing_name(b.build()), capability::OUTPUT);

        let b = HostServices::builder()
            .panic(test_panic)
            .output(Box::new(std::io::sink()))
            .with_std_primitives();
        assert_eq!(missing_name(b.build()), capability::CANCELLATION_HANDLER);

        let b = HostServices::builder()
            .panic(test_panic)
            .output(Box::new(std::io::sink()))
            .cancellation_handler(Arc::new(CancellationRecorder::new()))
            .eq_ignore_case(std_eq_ignore_case);
        assert_eq!(missing_name(b.build()), capability::PARSE_LONG);

        let b = HostServices::builder()
            .panic(test_panic)
            .output(Box::new(std::io::sink()))
            .cancellation_handler(Arc::new(CancellationRecorder::new()))
            .parse_long(std_parse_long);
        assert_eq!(missing_name(b.build()), capability::EQ_IGNORE_CASE);
    }

    #[test]
    fn std_parse_long_is_strict_decimal() {
        assert_eq!(std_parse_long("7"), Some(7));
        assert_eq!(std_parse_long(" 42 "), Some(42));
        assert_eq!(std_parse_long("-5"), Some(-5));
        assert_eq!(std_parse_long("+3"), Some(3));
        assert_eq!(std_parse_long("abc"), None);
        assert_eq!(std_parse_long(""), None);
        assert_eq!(std_parse_long("12abc"), None);
    }

    #[test]
    fn std_eq_ignore_case_matches_true() {
        assert!(std_eq_ignore_case("True", "true"));
        assert!(std_eq_ignore_case("TRUE", "True"));
        assert!(!std_eq_ignore_case("1", "True"));
    }
}
