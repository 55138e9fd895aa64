// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Roundoff: static floating-point roundoff-error analysis.
// Dual licensed under Apache 2.0 and MIT.
// See:
//      - LICENSE-APACHE.md
//      - LICENSE-MIT.md
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

//! The top-level entry point: §4.1-4.5's data-flow, wired end to end over
//! one kernel ([`DataflowDriver::analyze_function`]) or a batch of them run
//! across a bounded worker pool ([`DataflowDriver::analyze_all`]).

use crate::config::Configuration;
use rayon::prelude::*;
use std::collections::HashMap;
use std::rc::Rc;
use Roundoff_core::{Env, Expr, Identifier};
use Roundoff_enums::{ErrorMethod, RangeMethod};
use Roundoff_error::{AnalysisError, AnalysisResult};
use Roundoff_math::{AbstractDomain, AffineForm, Interval, NoOpSmtBackend, Rational, SmtBackend, SmtRange};

/// One kernel's full analysis result: its final range and roundoff error,
/// plus every intermediate node's range and error for reporting.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    /// The worst-case absolute roundoff error of the kernel's result.
    pub result_error: Rational,
    /// The real-valued range of the kernel's result.
    pub result_range: Interval,
    /// Every sub-expression's real-valued range, keyed by node id.
    pub interm_ranges: HashMap<u64, Interval>,
    /// Every sub-expression's worst-case absolute roundoff error, collapsed
    /// to a plain magnitude regardless of which error domain computed it.
    pub interm_errors: HashMap<u64, Rational>,
}

/// Runs the range and roundoff analyses described by a [`Configuration`]
/// over one kernel at a time, dispatching on `range_method`/`error_method`
/// to the concrete abstract domain each selects.
#[derive(Debug, Default)]
pub struct DataflowDriver {
    smt_backend: Option<Box<dyn SmtBackend>>,
}

impl DataflowDriver {
    /// A driver with no SMT backend: the `smt` range method falls back to
    /// the unrefined interval it started from.
    pub fn new() -> Self {
        Self { smt_backend: None }
    }

    /// A driver that refines `smt`-method ranges with the given backend.
    pub fn with_smt_backend(backend: Box<dyn SmtBackend>) -> Self {
        Self {
            smt_backend: Some(backend),
        }
    }

    /// Analyzes one kernel: `expr`'s free variables must be exactly
    /// `params`, in the order their input ranges should be looked up under
    /// `config.input_ranges` (keyed by [`Identifier::name`]).
    pub fn analyze_function(
        &self,
        expr: &Expr,
        params: &[Identifier],
        config: &Configuration,
    ) -> AnalysisResult<AnalysisOutput> {
        log::debug!(
            "analyze_function: {} parameter(s), range_method={:?}, error_method={:?}",
            params.len(),
            config.range_method,
            config.error_method
        );

        let input_errors = self.resolve_input_errors(params, config);

        let (result_range, node_ranges) = self.eval_ranges(expr, params, config)?;

        let (result_error, interm_errors) = match config.error_method {
            ErrorMethod::Interval => {
                self.eval_errors::<Interval>(expr, params, config, &input_errors, &node_ranges)?
            }
            ErrorMethod::Affine => {
                self.eval_errors::<AffineForm>(expr, params, config, &input_errors, &node_ranges)?
            }
        };

        log::info!(
            "analyze_function: result range {}, result error {}",
            result_range,
            result_error
        );

        self.check_overflow(&result_range, config);

        let interm_ranges = node_ranges
            .into_iter()
            .map(|(id, range)| (id.raw(), range))
            .collect();

        Ok(AnalysisOutput {
            result_error,
            result_range,
            interm_ranges,
            interm_errors,
        })
    }

    /// Analyzes every `(expr, params)` pair in `kernels` against one shared
    /// `config`, dispatched across rayon's global bounded worker pool. The
    /// returned vector preserves `kernels`' order; a per-kernel failure is
    /// logged and carried in its own slot rather than aborting the batch.
    pub fn analyze_all(
        &self,
        kernels: &[(Expr, Vec<Identifier>)],
        config: &Configuration,
    ) -> Vec<AnalysisResult<AnalysisOutput>> {
        kernels
            .par_iter()
            .map(|(expr, params)| {
                self.analyze_function(expr, params, config).map_err(|err| {
                    log::warn!("analyze_all: kernel failed: {err}");
                    err
                })
            })
            .collect()
    }

    /// §4.5 step 1's four cases, keyed on `(track_initial, track_roundoff)`:
    /// both set fills *missing* errors from precision; only `track_initial`
    /// leaves missing errors at zero; only `track_roundoff` recomputes
    /// *every* input error from precision, explicit values included; neither
    /// leaves every input error at zero.
    fn resolve_input_errors(
        &self,
        params: &[Identifier],
        config: &Configuration,
    ) -> HashMap<u64, Rational> {
        params
            .iter()
            .map(|ident| {
                let from_precision = || self.precision_error(ident, config);
                let error = match (config.track_initial, config.track_roundoff) {
                    (true, true) => config
                        .input_errors
                        .get(ident.name())
                        .cloned()
                        .unwrap_or_else(from_precision),
                    (true, false) => config
                        .input_errors
                        .get(ident.name())
                        .cloned()
                        .unwrap_or_else(Rational::zero),
                    (false, true) => from_precision(),
                    (false, false) => Rational::zero(),
                };
                (ident.id(), error)
            })
            .collect()
    }

    fn precision_error(&self, ident: &Identifier, config: &Configuration) -> Rational {
        let range = config
            .input_ranges
            .get(ident.name())
            .cloned()
            .unwrap_or_else(|| Interval::degenerate(Rational::zero()));
        let precision = config.precision_of(ident.name());
        if config.cheated {
            precision.abs_roundoff_cheated(&range)
        } else {
            precision.abs_roundoff(&range)
        }
    }

    fn eval_ranges(
        &self,
        expr: &Expr,
        params: &[Identifier],
        config: &Configuration,
    ) -> AnalysisResult<(Interval, HashMap<Roundoff_core::NodeId, Interval>)> {
        match config.range_method {
            RangeMethod::Interval => {
                let env = Self::range_env::<Interval>(params, config);
                let (range, map) = Roundoff_core::eval_range(expr, &env)?;
                Ok((range, map))
            }
            RangeMethod::Affine => {
                let env = Self::range_env::<AffineForm>(params, config);
                let (range, map) = Roundoff_core::eval_range(expr, &env)?;
                let map = map.into_iter().map(|(id, v)| (id, v.to_interval())).collect();
                Ok((range.to_interval(), map))
            }
            RangeMethod::Smt => {
                let env = Self::range_env::<SmtRange>(params, config);
                let (range, map) = Roundoff_core::eval_range(expr, &env)?;
                let refined = self.refine(&range);
                let map = map.into_iter().map(|(id, v)| (id, v.to_interval())).collect();
                Ok((refined, map))
            }
        }
    }

    /// Advisory-only (§7): on backend timeout/failure, logs an
    /// `AnalysisError::SmtTimeout` and degrades to the unrefined interval
    /// rather than failing the analysis.
    fn refine(&self, range: &SmtRange) -> Interval {
        match &self.smt_backend {
            Some(backend) => match range.refine(backend.as_ref(), "<kernel>") {
                Ok(refined) => refined.interval().clone(),
                Err(timeout) => {
                    log::warn!("analyze_function: {timeout}");
                    range.interval().clone()
                }
            },
            None => NoOpSmtBackend
                .refine(range.interval(), range.constraints())
                .expect("NoOpSmtBackend::refine is infallible"),
        }
    }

    fn eval_errors<E: AbstractDomain>(
        &self,
        expr: &Expr,
        params: &[Identifier],
        config: &Configuration,
        input_errors: &HashMap<u64, Rational>,
        node_ranges: &HashMap<Roundoff_core::NodeId, Interval>,
    ) -> AnalysisResult<(Rational, HashMap<u64, Rational>)> {
        let env = params.iter().fold(Env::<E>::empty(), |env, ident| {
            let err = input_errors.get(&ident.id()).cloned().unwrap_or_else(Rational::zero);
            Env::bind(&env, ident.id(), E::symmetric(&err))
        });

        let precision_map: Roundoff_core::PrecisionMap = params
            .iter()
            .filter_map(|ident| {
                config
                    .precision_map
                    .get(ident.name())
                    .map(|precision| (ident.id(), *precision))
            })
            .collect();

        let mut evaluator = Roundoff_core::RoundoffEvaluator::<E>::new(
            node_ranges,
            precision_map,
            config.default_precision,
            config.constants_precision,
            config.track_roundoff,
            config.cheated,
        );
        let error = evaluator.evaluate(expr, &env)?;
        let map = evaluator.into_intermediate_map();
        let interm_errors = map
            .into_iter()
            .map(|(id, v)| (id.raw(), v.to_interval().max_abs()))
            .collect();
        Ok((error.to_interval().max_abs(), interm_errors))
    }

    /// Advisory-only (§7): if `result_range`'s `maxAbs` exceeds
    /// `config.default_precision`'s largest finite magnitude, logs a
    /// warning rather than failing the analysis. `Fixed(n)` has no ceiling
    /// of its own and is never flagged.
    fn check_overflow(&self, result_range: &Interval, config: &Configuration) {
        if let Some(max_finite) = config.default_precision.max_finite() {
            let max_abs = result_range.max_abs();
            if max_abs > max_finite {
                let overflow = AnalysisError::Overflow {
                    function: "<kernel>".to_string(),
                    precision: format!("{:?}", config.default_precision),
                    max_abs: max_abs.to_f64_outward(true),
                };
                log::warn!("analyze_function: {overflow}");
            }
        }
    }

    fn range_env<T: AbstractDomain>(params: &[Identifier], config: &Configuration) -> Rc<Env<T>> {
        params.iter().fold(Env::<T>::empty(), |env, ident| {
            let range = config
                .input_ranges
                .get(ident.name())
                .cloned()
                .unwrap_or_else(|| Interval::degenerate(Rational::zero()));
            Env::bind(&env, ident.id(), T::from_interval(&range))
        })
    }

}
