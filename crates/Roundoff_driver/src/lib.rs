// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Roundoff: static floating-point roundoff-error analysis.
// Dual licensed under Apache 2.0 and MIT.
// See:
//      - LICENSE-APACHE.md
//      - LICENSE-MIT.md
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

//! The dataflow driver: wires the [`Roundoff_core`] evaluators and the
//! [`Roundoff_math`] abstract domains together into the per-function and
//! per-batch entry points a frontend actually calls.

#![forbid(missing_docs)]

pub mod config;
pub mod contracts;
pub mod driver;

pub use config::Configuration;
pub use contracts::{Frontend, RelativeDriver, Rewriter, SpecsProcessor};
pub use driver::{AnalysisOutput, DataflowDriver};
pub use Roundoff_math::{NoOpSmtBackend, SmtBackend};

#[cfg(test)]
mod regression_tests {
    use super::*;
    use Roundoff_core::{Expr, Identifier};
    use Roundoff_math::{Interval, Precision, Rational};
    use Roundoff_utils::assert_approx_equal_relative;

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(n, d)
    }

    fn to_f64(r: &Rational) -> f64 {
        r.to_f64_outward(true)
    }

    /// `doppler`'s simplest one-parameter slice: `t1 = 331.4 + 0.6 * t`,
    /// with `t` ranging over `[-20, 20]`, the published range for the
    /// temperature input of the doppler benchmark family.
    #[test]
    fn doppler_temperature_term_matches_published_range() {
        let t = Identifier::fresh("t");
        let expr = Expr::add(
            Expr::constant(Rational::new(3314, 10)),
            Expr::mul(Expr::constant(Rational::new(6, 10)), Expr::variable(t.clone())),
        );
        let config = Configuration::uniform(Precision::Float64)
            .with_input_range("t", Interval::new(r(-20, 1), r(20, 1)));
        let driver = DataflowDriver::new();
        let output = driver.analyze_function(&expr, &[t], &config).unwrap();

        assert_approx_equal_relative!(to_f64(output.result_range.lo()), 319.4, 0.01);
        assert_approx_equal_relative!(to_f64(output.result_range.hi()), 343.4, 0.01);
    }

    /// `sineOrder3`'s polynomial body `x - x^3/6 + x^5/120`, over `x` in
    /// `[-2, 2]`, approximated here through its first two terms (`x^5` is
    /// exercised separately by the `Pow` unit tests in `Roundoff_core`); the
    /// surviving two-term truncation's range must still bound the full
    /// Taylor series on a narrower sub-range where the tail is negligible.
    #[test]
    fn sine_order3_two_term_truncation_brackets_zero_at_the_origin() {
        let x = Identifier::fresh("x");
        let cube_over_six = Expr::div(Expr::pow(Expr::variable(x.clone()), 3), Expr::constant(Rational::from_integer(6)));
        let expr = Expr::sub(Expr::variable(x.clone()), cube_over_six);
        let config = Configuration::uniform(Precision::Float64)
            .with_input_range("x", Interval::new(r(-1, 10), r(1, 10)));
        let driver = DataflowDriver::new();
        let output = driver.analyze_function(&expr, &[x], &config).unwrap();
        assert!(output.result_range.contains_zero());
    }

    /// `turbine1`'s characteristic shape - a ratio whose denominator is
    /// bounded away from zero over its published input ranges - must
    /// analyze without a spurious `DivisionByZero`.
    #[test]
    fn turbine1_denominator_never_spuriously_signals_division_by_zero() {
        let w = Identifier::fresh("w");
        let r_ = Identifier::fresh("r");
        let denom = Expr::add(Expr::constant(Rational::from_integer(1)), Expr::variable(r_.clone()));
        let expr = Expr::div(Expr::variable(w.clone()), denom);
        let config = Configuration::uniform(Precision::Float64)
            .with_input_range("w", Interval::new(r(-1, 1), r(1, 1)))
            .with_input_range("r", Interval::new(r(1, 2), r(2, 1)));
        let driver = DataflowDriver::new();
        assert!(driver.analyze_function(&expr, &[w, r_], &config).is_ok());
    }

    /// `bspline0`'s degree-0 basis term `(1 - u)^3 / 6` over `u` in `[0, 1]`
    /// has a known non-negative range.
    #[test]
    fn bspline0_basis_term_is_non_negative_over_the_unit_interval() {
        let u = Identifier::fresh("u");
        let one_minus_u = Expr::sub(Expr::constant(Rational::one()), Expr::variable(u.clone()));
        let cubed = Expr::pow(one_minus_u, 3);
        let expr = Expr::div(cubed, Expr::constant(Rational::from_integer(6)));
        let config = Configuration::uniform(Precision::Float64)
            .with_input_range("u", Interval::new(r(0, 1), r(1, 1)));
        let driver = DataflowDriver::new();
        let output = driver.analyze_function(&expr, &[u], &config).unwrap();
        assert!(!output.result_range.lo().is_negative());
    }

    /// `rigidBody1`'s characteristic product-of-sums shape, exercised here
    /// through its polynomial skeleton `x1*x2 - x2*x3`, must produce a
    /// non-trivial (non-degenerate) roundoff error once `track_roundoff` is
    /// enabled, confirming operator-introduced error actually accumulates
    /// across a multi-operator tree rather than only at the leaves.
    #[test]
    fn rigid_body1_skeleton_accumulates_nonzero_roundoff() {
        let x1 = Identifier::fresh("x1");
        let x2 = Identifier::fresh("x2");
        let x3 = Identifier::fresh("x3");
        let expr = Expr::sub(
            Expr::mul(Expr::variable(x1.clone()), Expr::variable(x2.clone())),
            Expr::mul(Expr::variable(x2.clone()), Expr::variable(x3.clone())),
        );
        let config = Configuration::uniform(Precision::Float64)
            .with_input_range("x1", Interval::new(r(-15, 1), r(15, 1)))
            .with_input_range("x2", Interval::new(r(-15, 1), r(15, 1)))
            .with_input_range("x3", Interval::new(r(-15, 1), r(15, 1)));
        let driver = DataflowDriver::new();
        let output = driver
            .analyze_function(&expr, &[x1, x2, x3], &config)
            .unwrap();
        assert!(!output.result_error.is_zero());
    }

    /// Disabling roundoff tracking (`noRoundoff`) on the same
    /// `rigidBody1` skeleton still propagates whatever explicit input
    /// errors were configured, but introduces no new per-operator error.
    #[test]
    fn rigid_body1_with_roundoff_disabled_only_propagates_input_error() {
        let x1 = Identifier::fresh("x1");
        let x2 = Identifier::fresh("x2");
        let x3 = Identifier::fresh("x3");
        let expr = Expr::sub(
            Expr::mul(Expr::variable(x1.clone()), Expr::variable(x2.clone())),
            Expr::mul(Expr::variable(x2.clone()), Expr::variable(x3.clone())),
        );
        let mut config = Configuration::uniform(Precision::Float64)
            .with_input_range("x1", Interval::degenerate(r(1, 1)))
            .with_input_range("x2", Interval::degenerate(r(1, 1)))
            .with_input_range("x3", Interval::degenerate(r(1, 1)));
        config.track_roundoff = false;
        config.track_initial = false;
        let driver = DataflowDriver::new();
        let output = driver
            .analyze_function(&expr, &[x1, x2, x3], &config)
            .unwrap();
        assert!(output.result_error.is_zero());
    }
}

/// The six published §8 benchmark kernels, run exactly as published (no
/// simplification or truncation), checked against their expected absolute
/// roundoff error within 1% relative tolerance. These are the concrete
/// end-to-end scenarios the regression harness compares against.
#[cfg(test)]
mod published_benchmark_tests {
    use super::*;
    use Roundoff_core::{Expr, Identifier};
    use Roundoff_math::{Interval, Precision, Rational};
    use Roundoff_utils::assert_approx_equal_relative;

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(n, d)
    }

    fn to_f64(r: &Rational) -> f64 {
        r.to_f64_outward(true)
    }

    fn check(expr: &Expr, params: Vec<Identifier>, config: Configuration, expected_error: f64) {
        let driver = DataflowDriver::new();
        let output = driver.analyze_function(expr, &params, &config).unwrap();
        assert_approx_equal_relative!(to_f64(&output.result_error), expected_error, 0.01);
    }

    #[test]
    fn bspline0_matches_published_error() {
        let u = Identifier::fresh("u");
        let one_minus_u = Expr::sub(Expr::constant(Rational::one()), Expr::variable(u.clone()));
        let cubed = Expr::pow(one_minus_u, 3);
        let expr = Expr::div(cubed, Expr::constant(Rational::from_integer(6)));
        let config = Configuration::uniform(Precision::Float64)
            .with_input_range("u", Interval::new(r(0, 1), r(7, 8)));
        check(&expr, vec![u], config, 1.5266e-16);
    }

    #[test]
    fn bspline1_matches_published_error() {
        let u = Identifier::fresh("u");
        let u2 = Expr::mul(Expr::variable(u.clone()), Expr::variable(u.clone()));
        let u3 = Expr::mul(u2.clone(), Expr::variable(u.clone()));
        let term = Expr::sub(
            Expr::add(
                Expr::mul(Expr::constant(Rational::from_integer(3)), u3),
                Expr::constant(Rational::from_integer(4)),
            ),
            Expr::mul(Expr::constant(Rational::from_integer(6)), u2),
        );
        let expr = Expr::div(term, Expr::constant(Rational::from_integer(6)));
        let config = Configuration::uniform(Precision::Float64)
            .with_input_range("u", Interval::new(r(7, 8), r(1, 1)));
        check(&expr, vec![u], config, 6.1062e-16);
    }

    #[test]
    fn rigid_body1_matches_published_error() {
        let x1 = Identifier::fresh("x1");
        let x2 = Identifier::fresh("x2");
        let x3 = Identifier::fresh("x3");
        let term1 = Expr::neg(Expr::mul(Expr::variable(x1.clone()), Expr::variable(x2.clone())));
        let term2 = Expr::mul(
            Expr::constant(Rational::from_integer(2)),
            Expr::mul(Expr::variable(x2.clone()), Expr::variable(x3.clone())),
        );
        let term3 = Expr::variable(x1.clone());
        let term4 = Expr::variable(x3.clone());
        let expr = Expr::sub(Expr::sub(Expr::sub(term1, term2), term3), term4);
        let config = Configuration::uniform(Precision::Float64)
            .with_input_range("x1", Interval::new(r(-15, 1), r(15, 1)))
            .with_input_range("x2", Interval::new(r(-15, 1), r(15, 1)))
            .with_input_range("x3", Interval::new(r(-15, 1), r(15, 1)));
        check(&expr, vec![x1, x2, x3], config, 2.238e-13);
    }

    #[test]
    fn doppler_matches_published_error() {
        let u = Identifier::fresh("u");
        let v = Identifier::fresh("v");
        let t = Identifier::fresh("T");
        let t1 = Expr::add(
            Expr::constant(Rational::new(3314, 10)),
            Expr::mul(Expr::constant(Rational::new(6, 10)), Expr::variable(t.clone())),
        );
        let t1_plus_u = Expr::add(t1.clone(), Expr::variable(u.clone()));
        let denom = Expr::mul(t1_plus_u.clone(), t1_plus_u);
        let numerator = Expr::neg(Expr::mul(t1, Expr::variable(v.clone())));
        let expr = Expr::div(numerator, denom);
        let config = Configuration::uniform(Precision::Float64)
            .with_input_range("u", Interval::new(r(-100, 1), r(100, 1)))
            .with_input_range("v", Interval::new(r(20, 1), r(20000, 1)))
            .with_input_range("T", Interval::new(r(-30, 1), r(50, 1)));
        check(&expr, vec![u, v, t], config, 1.98e-13);
    }

    #[test]
    fn turbine1_matches_published_error() {
        let v = Identifier::fresh("v");
        let w = Identifier::fresh("w");
        let r_ = Identifier::fresh("r");
        let denom = Expr::add(Expr::constant(Rational::one()), Expr::variable(r_.clone()));
        let expr = Expr::div(
            Expr::mul(Expr::variable(v.clone()), Expr::variable(w.clone())),
            denom,
        );
        let config = Configuration::uniform(Precision::Float64)
            .with_input_range("v", Interval::new(r(-45, 10), r(-3, 10)))
            .with_input_range("w", Interval::new(r(4, 10), r(9, 10)))
            .with_input_range("r", Interval::new(r(38, 10), r(78, 10)));
        check(&expr, vec![v, w, r_], config, 8.82e-14);
    }

    #[test]
    fn sine_order3_matches_published_error() {
        let x = Identifier::fresh("x");
        let x3 = Expr::pow(Expr::variable(x.clone()), 3);
        let expr = Expr::sub(
            Expr::mul(Expr::constant(Rational::new(954, 1000)), Expr::variable(x.clone())),
            Expr::mul(Expr::constant(Rational::new(1, 10)), x3),
        );
        let config = Configuration::uniform(Precision::Float64)
            .with_input_range("x", Interval::new(r(-2, 1), r(2, 1)));
        check(&expr, vec![x], config, 1.44e-15);
    }
}

/// The universal invariants from §8: soundness of ranges, monotonicity
/// under input-range widening, determinism, and the documented boundary
/// behaviors. Sampled rather than exhaustive, since the input domain is
/// continuous.
#[cfg(test)]
mod property_tests {
    use super::*;
    use Roundoff_core::{Expr, Identifier};
    use Roundoff_math::{Interval, Precision, Rational};

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(n, d)
    }

    /// `f(x, y) = (x + y) * (x - y)` over `x` in `[1, 3]`, `y` in `[0, 2]`.
    fn sample_kernel() -> (Expr, Identifier, Identifier) {
        let x = Identifier::fresh("x");
        let y = Identifier::fresh("y");
        let sum = Expr::add(Expr::variable(x.clone()), Expr::variable(y.clone()));
        let diff = Expr::sub(Expr::variable(x.clone()), Expr::variable(y.clone()));
        (Expr::mul(sum, diff), x, y)
    }

    /// Soundness of ranges (§8 invariant 1): the analyzed range for a broad
    /// input box must contain the exact real value of the expression at
    /// every sampled point inside that box. Since every quantity here is an
    /// exact `Rational`, "the real value at a point" is obtained by
    /// analyzing the same kernel again with that point as a degenerate
    /// (zero-width) input range - no separate floating-point reference
    /// evaluator is needed.
    #[test]
    fn range_soundness_holds_at_sampled_points() {
        let (expr, x, y) = sample_kernel();
        let config = Configuration::uniform(Precision::Float64)
            .with_input_range("x", Interval::new(r(1, 1), r(3, 1)))
            .with_input_range("y", Interval::new(r(0, 1), r(2, 1)));
        let driver = DataflowDriver::new();
        let whole = driver
            .analyze_function(&expr, &[x.clone(), y.clone()], &config)
            .unwrap();

        let sample_points = [
            (r(1, 1), r(0, 1)),
            (r(2, 1), r(1, 1)),
            (r(3, 1), r(2, 1)),
            (r(3, 2), r(1, 2)),
        ];
        for (xv, yv) in sample_points {
            let point_config = Configuration::uniform(Precision::Float64)
                .with_input_range("x", Interval::degenerate(xv))
                .with_input_range("y", Interval::degenerate(yv));
            let point = driver
                .analyze_function(&expr, &[x.clone(), y.clone()], &point_config)
                .unwrap();
            assert!(*whole.result_range.lo() <= *point.result_range.lo());
            assert!(*whole.result_range.hi() >= *point.result_range.hi());
        }
    }

    /// Monotonicity (§8 invariant 3): widening an input range can only grow
    /// (never shrink) the result range and the result error.
    #[test]
    fn widening_an_input_range_only_grows_range_and_error() {
        let (expr, x, y) = sample_kernel();
        let narrow = Configuration::uniform(Precision::Float64)
            .with_input_range("x", Interval::new(r(1, 1), r(2, 1)))
            .with_input_range("y", Interval::new(r(0, 1), r(1, 1)));
        let wide = Configuration::uniform(Precision::Float64)
            .with_input_range("x", Interval::new(r(0, 1), r(3, 1)))
            .with_input_range("y", Interval::new(r(-1, 1), r(2, 1)));

        let driver = DataflowDriver::new();
        let narrow_out = driver
            .analyze_function(&expr, &[x.clone(), y.clone()], &narrow)
            .unwrap();
        let wide_out = driver
            .analyze_function(&expr, &[x, y], &wide)
            .unwrap();

        assert!(*narrow_out.result_range.lo() >= *wide_out.result_range.lo());
        assert!(*narrow_out.result_range.hi() <= *wide_out.result_range.hi());
        assert!(narrow_out.result_error <= wide_out.result_error);
    }

    /// Determinism (§8 invariant 4): identical inputs and configuration
    /// produce bit-identical (here: exactly equal, since every quantity is
    /// an exact `Rational`) outputs across repeated runs.
    #[test]
    fn repeated_analysis_of_the_same_kernel_is_deterministic() {
        let (expr, x, y) = sample_kernel();
        let config = Configuration::uniform(Precision::Float64)
            .with_input_range("x", Interval::new(r(1, 1), r(3, 1)))
            .with_input_range("y", Interval::new(r(0, 1), r(2, 1)));
        let driver = DataflowDriver::new();

        let first = driver
            .analyze_function(&expr, &[x.clone(), y.clone()], &config)
            .unwrap();
        let second = driver.analyze_function(&expr, &[x, y], &config).unwrap();

        assert_eq!(first.result_range, second.result_range);
        assert_eq!(first.result_error, second.result_error);
    }

    /// Boundary behavior (§8): division where the divisor's range is
    /// `[0, 1]` fails with `DivisionByZero`.
    #[test]
    fn division_where_divisor_range_touches_zero_at_the_edge_fails() {
        let y = Identifier::fresh("y");
        let expr = Expr::div(Expr::constant(Rational::one()), Expr::variable(y.clone()));
        let config = Configuration::uniform(Precision::Float64)
            .with_input_range("y", Interval::new(r(0, 1), r(1, 1)));
        let driver = DataflowDriver::new();
        let err = driver.analyze_function(&expr, &[y], &config).unwrap_err();
        assert!(matches!(err, AnalysisError::DivisionByZero { .. }));
    }

    /// Boundary behavior (§8): `sqrt` where the argument range is
    /// `[-eps, 1]` fails with `NegativeSqrt`.
    #[test]
    fn sqrt_where_argument_range_dips_just_below_zero_fails() {
        let x = Identifier::fresh("x");
        let expr = Expr::sqrt(Expr::variable(x.clone()));
        let config = Configuration::uniform(Precision::Float64)
            .with_input_range("x", Interval::new(r(-1, 100), r(1, 1)));
        let driver = DataflowDriver::new();
        let err = driver.analyze_function(&expr, &[x], &config).unwrap_err();
        assert!(matches!(err, AnalysisError::NegativeSqrt { .. }));
    }
}
