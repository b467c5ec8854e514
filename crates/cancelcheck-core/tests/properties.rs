//! Property tests for the exponent-difference estimate and the dispatch
//! policy.

use std::sync::Arc;

use cancelcheck_core::prelude::*;
use cancelcheck_core::{cancelled_bits, exponent_field};
use proptest::prelude::*;

fn test_panic(message: &str) -> ! {
    panic!("{message}")
}

fn active_backend(conf: CheckCancellationConf) -> (Backend, BackendInterface, Arc<CancellationRecorder>) {
    let recorder = Arc::new(CancellationRecorder::new());
    let mut backend = Backend::pre_init(
        HostServices::builder()
            .panic(test_panic)
            .output(Box::new(std::io::sink()))
            .cancellation_handler(recorder.clone())
            .with_std_primitives()
            .build()
            .unwrap(),
    );
    backend.configure(&conf);
    let table = backend.init();
    (backend, table, recorder)
}

/// Finite, non-NaN binary64 value with the given exponent field.
fn f64_with_field(field: u32, mantissa: u64, negative: bool) -> f64 {
    let sign = u64::from(negative) << 63;
    f64::from_bits(sign | (u64::from(field) << 52) | (mantissa & ((1 << 52) - 1)))
}

fn f32_with_field(field: u32, mantissa: u32) -> f32 {
    f32::from_bits((field << 23) | (mantissa & ((1 << 23) - 1)))
}

proptest! {
    #[test]
    fn extraction_returns_raw_field_binary64(field in 0u32..=2046, mantissa: u64, negative: bool) {
        prop_assert_eq!(exponent_field(f64_with_field(field, mantissa, negative)), field);
    }

    #[test]
    fn extraction_returns_raw_field_binary32(field in 0u32..=254, mantissa: u32) {
        prop_assert_eq!(exponent_field(f32_with_field(field, mantissa)), field);
    }

    #[test]
    fn handler_fires_iff_threshold_met(
        ea in 0u32..=2046,
        eb in 0u32..=2046,
        er in 0u32..=2046,
        threshold in 0u32..=2100,
    ) {
        let (backend, table, recorder) = active_backend(CheckCancellationConf {
            threshold_b32: 0,
            threshold_b64: threshold,
        });
        let (a, b) = (f64_with_field(ea, 1, false), f64_with_field(eb, 3, true));
        let mut r = f64_with_field(er, 5, false);
        (table.add_double.unwrap())(a, b, &mut r, backend.context());

        let cancelled = i64::from(ea.max(eb)) - i64::from(er);
        let expected = cancelled >= i64::from(threshold);
        prop_assert_eq!(!recorder.is_empty(), expected);
        if expected {
            prop_assert_eq!(i64::from(recorder.events()[0].cancelled_bits), cancelled);
        }
    }

    #[test]
    fn boundary_fires_and_one_below_does_not(emax in 1u32..=2046, threshold in 1u32..=64) {
        prop_assume!(threshold <= emax);
        let er_at = emax - threshold;
        prop_assert_eq!(cancelled_bits(emax, 0, er_at), threshold as i32);

        let (backend, table, recorder) = active_backend(CheckCancellationConf {
            threshold_b32: threshold,
            threshold_b64: threshold,
        });
        let a = f64_with_field(emax, 0, false);
        let mut at = f64_with_field(er_at, 0, false);
        (table.sub_double.unwrap())(a, a, &mut at, backend.context());
        prop_assert_eq!(recorder.len(), 1);

        let mut below = f64_with_field(er_at + 1, 0, false);
        (table.sub_double.unwrap())(a, a, &mut below, backend.context());
        prop_assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn mul_and_div_never_notify(a: f64, b: f64, x: f32, y: f32) {
        let (backend, table, recorder) = active_backend(CheckCancellationConf::default());
        let ctx = backend.context();

        let mut r64 = 0.0;
        (table.mul_double.unwrap())(a, b, &mut r64, ctx);
        (table.div_double.unwrap())(a, b, &mut r64, ctx);
        let mut r32 = 0.0;
        (table.mul_float.unwrap())(x, y, &mut r32, ctx);
        (table.div_float.unwrap())(x, y, &mut r32, ctx);
        (table.mul_double.unwrap())(1.000_000_1, -1.0, &mut r64, ctx);

        prop_assert!(recorder.is_empty());
    }

    #[test]
    fn negative_estimate_never_fires(field in 0u32..=2045) {
        let (backend, table, recorder) = active_backend(CheckCancellationConf::default());
        let a = f64_with_field(field, 0, false);
        let mut r = f64_with_field(field + 1, 0, false);
        (table.add_double.unwrap())(a, a, &mut r, backend.context());
        prop_assert!(recorder.is_empty());
    }
}
