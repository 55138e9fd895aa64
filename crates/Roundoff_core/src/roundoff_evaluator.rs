// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Roundoff: static floating-point roundoff-error analysis.
// Dual licensed under Apache 2.0 and MIT.
// See:
//      - LICENSE-APACHE.md
//      - LICENSE-MIT.md
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

//! Computes the worst-case absolute roundoff error of every node in an
//! expression tree, generic over which error domain `E` (`Interval` or
//! `AffineForm`) the error is carried in. This is the analytical heart of
//! the crate: §4.4 of the design.
//!
//! The evaluator needs the real-valued range of every node (as plain
//! `Interval`s, produced up-front by a [`crate::range_evaluator`] pass and
//! handed in as `ranges`) to scale each operator's first-order error
//! propagation and to size the new roundoff an operator itself introduces.

use crate::env::Env;
use crate::expr::{BinaryOp, Expr, NodeId, UnaryOp};
use std::collections::HashMap;
use std::rc::Rc;
use Roundoff_error::{AnalysisError, AnalysisResult};
use Roundoff_math::{AbstractDomain, Interval, Precision, Rational};

/// Per-identifier precision overrides, keyed by [`crate::identifier::Identifier::id`].
/// Identifiers absent from the map run at the evaluator's `default_precision`.
pub type PrecisionMap = HashMap<u64, Precision>;

/// Evaluates an [`Expr`] tree's worst-case absolute roundoff error, generic
/// over the error domain `E` and memoizing by node identity, exactly as
/// [`crate::range_evaluator::RangeEvaluator`] does for ranges.
pub struct RoundoffEvaluator<'a, E: AbstractDomain> {
    ranges: &'a HashMap<NodeId, Interval>,
    precision_map: PrecisionMap,
    default_precision: Precision,
    constants_precision: Precision,
    track_roundoff: bool,
    cheated: bool,
    cache: HashMap<NodeId, E>,
}

impl<'a, E: AbstractDomain> RoundoffEvaluator<'a, E> {
    /// Builds a fresh evaluator.
    ///
    /// * `ranges` - every node's real-valued range, from a prior
    ///   `RangeEvaluator` pass (§4.3), collapsed to plain `Interval`s even
    ///   when the range method itself was `affine` or `smt`.
    /// * `precision_map` - per-variable precision overrides (the
    ///   `mixed-precision` configuration option); variables absent from it
    ///   run at `default_precision`.
    /// * `constants_precision` - the precision literal constants are
    ///   rounded into.
    /// * `track_roundoff` - `false` disables all new-roundoff accounting
    ///   (operator error propagation still runs, so pre-existing input
    ///   errors still propagate).
    /// * `cheated` - selects [`Precision::abs_roundoff_cheated`] (the
    ///   truncation model) over [`Precision::abs_roundoff`] for every new
    ///   roundoff term, per the specification's Open Questions.
    pub fn new(
        ranges: &'a HashMap<NodeId, Interval>,
        precision_map: PrecisionMap,
        default_precision: Precision,
        constants_precision: Precision,
        track_roundoff: bool,
        cheated: bool,
    ) -> Self {
        Self {
            ranges,
            precision_map,
            default_precision,
            constants_precision,
            track_roundoff,
            cheated,
            cache: HashMap::new(),
        }
    }

    /// The intermediate-error map accumulated so far.
    pub fn intermediate_map(&self) -> &HashMap<NodeId, E> {
        &self.cache
    }

    /// Consumes the evaluator, handing back its intermediate-error map.
    pub fn into_intermediate_map(self) -> HashMap<NodeId, E> {
        self.cache
    }

    fn range_of(&self, id: NodeId) -> &Interval {
        self.ranges
            .get(&id)
            .expect("RoundoffEvaluator: missing range for node; run RangeEvaluator over the same tree first")
    }

    fn precision_of(&self, ident_id: u64) -> Precision {
        self.precision_map
            .get(&ident_id)
            .copied()
            .unwrap_or(self.default_precision)
    }

    fn new_roundoff(&self, precision: Precision, range_with_err: &Interval) -> Rational {
        if !self.track_roundoff {
            return Rational::zero();
        }
        if self.cheated {
            precision.abs_roundoff_cheated(range_with_err)
        } else {
            precision.abs_roundoff(range_with_err)
        }
    }

    /// `range(out) + [-e_prop, +e_prop]`, the widened range a freshly
    /// introduced roundoff term is sized against (§4.4.2).
    fn widen(&self, out_range: &Interval, propagated: &E) -> Interval {
        out_range.add(&propagated.to_interval())
    }

    /// Evaluates `expr`'s roundoff error under `env`, the scope mapping
    /// each bound identifier's id to its already-evaluated error.
    pub fn evaluate(&mut self, expr: &Expr, env: &Rc<Env<E>>) -> AnalysisResult<E> {
        if let Some(cached) = self.cache.get(&expr.id()) {
            return Ok(cached.clone());
        }

        let result = match expr {
            Expr::Constant { id, value } => self.eval_constant(*id, value),
            Expr::Variable { ident, .. } => {
                env.lookup(ident.id())
                    .cloned()
                    .ok_or_else(|| AnalysisError::UnboundVariable {
                        name: ident.name().to_string(),
                        id: ident.id(),
                    })?
            }
            Expr::Let {
                ident,
                value,
                body,
                cast,
                ..
            } => {
                let value_err = self.evaluate(value, env)?;
                let bound_err = self.apply_cast(ident.id(), value.id(), *cast, value_err);
                let inner_env = Env::bind(env, ident.id(), bound_err);
                self.evaluate(body, &inner_env)?
            }
            Expr::Unary { op, operand, id } => {
                let operand_err = self.evaluate(operand, env)?;
                let operand_range = self.range_of(operand.id()).clone();
                self.eval_unary(*op, *id, operand_err, &operand_range)?
            }
            Expr::Binary { op, lhs, rhs, id } => {
                let l_err = self.evaluate(lhs, env)?;
                let r_err = self.evaluate(rhs, env)?;
                let l_range = self.range_of(lhs.id()).clone();
                let r_range = self.range_of(rhs.id()).clone();
                self.eval_binary(*op, *id, l_err, &l_range, r_err, &r_range)?
            }
            Expr::Pow { base, n, id } => {
                let base_err = self.evaluate(base, env)?;
                let base_range = self.range_of(base.id()).clone();
                self.eval_pow(*id, *n, base_err, &base_range)
            }
        };

        self.cache.insert(expr.id(), result.clone());
        Ok(result)
    }

    fn eval_constant(&self, id: NodeId, value: &Rational) -> E {
        if !self.track_roundoff || value.is_integer() {
            return E::zero();
        }
        let range = self.range_of(id);
        let rho = self.new_roundoff(self.constants_precision, range);
        E::symmetric(&rho)
    }

    /// Enforces a `Let` binding's declared precision (§4.4.3): casting a
    /// value *down* into a narrower format adds a cast error; casting up,
    /// or not casting at all, is free.
    fn apply_cast(
        &self,
        bound_id: u64,
        value_node: NodeId,
        cast: Option<Precision>,
        value_err: E,
    ) -> E {
        let Some(cast_precision) = cast else {
            return value_err;
        };
        if !self.track_roundoff {
            return value_err;
        }
        let ambient = self.precision_of(bound_id);
        if cast_precision.bits() >= ambient.bits() {
            return value_err;
        }
        let range = self.range_of(value_node);
        let widened = self.widen(range, &value_err);
        let rho = self.new_roundoff(cast_precision, &widened);
        value_err.add(&E::symmetric(&rho))
    }

    fn eval_unary(
        &self,
        op: UnaryOp,
        id: NodeId,
        operand_err: E,
        operand_range: &Interval,
    ) -> AnalysisResult<E> {
        // Neg is exact: IEEE 754 negation introduces no rounding, so it
        // propagates the operand's error unchanged and gains no new-roundoff
        // term. Sqrt is the only unary op that rounds.
        match op {
            UnaryOp::Neg => Ok(operand_err.neg()),
            UnaryOp::Sqrt => {
                let out_range = self.range_of(id).clone();
                let sqrt_range = operand_range
                    .sqrt()
                    .ok_or(AnalysisError::NegativeSqrt { node_id: id.raw() })?;
                let scale = Interval::degenerate(Rational::from_integer(2)).mul(&sqrt_range);
                if scale.contains_zero() {
                    return Err(AnalysisError::NegativeSqrt { node_id: id.raw() });
                }
                let recip = Interval::degenerate(Rational::one())
                    .div(&scale)
                    .expect("eval_unary: scale checked nonzero above");
                let propagated = operand_err.mul(&E::from_interval(&recip));
                let widened = self.widen(&out_range, &propagated);
                let rho = self.new_roundoff(self.default_precision, &widened);
                Ok(propagated.add(&E::symmetric(&rho)))
            }
        }
    }

    fn eval_binary(
        &self,
        op: BinaryOp,
        id: NodeId,
        l_err: E,
        l_range: &Interval,
        r_err: E,
        r_range: &Interval,
    ) -> AnalysisResult<E> {
        let out_range = self.range_of(id).clone();
        let propagated = match op {
            BinaryOp::Add => l_err.add(&r_err),
            BinaryOp::Sub => l_err.sub(&r_err),
            BinaryOp::Mul => Self::times_propagation(&l_err, l_range, &r_err, r_range),
            BinaryOp::Div => {
                let r_err_interval = r_err.to_interval();
                let widened_r_range = r_range.add(&r_err_interval);
                if widened_r_range.contains_zero() {
                    return Err(AnalysisError::DivisionByZero { node_id: id.raw() });
                }
                Self::div_propagation(&l_err, l_range, &r_err, &widened_r_range)?
            }
        };
        let widened = self.widen(&out_range, &propagated);
        let rho = self.new_roundoff(self.default_precision, &widened);
        Ok(propagated.add(&E::symmetric(&rho)))
    }

    /// `range(l)*e_r + range(r)*e_l + e_l*e_r` (§4.4.1, `Times`).
    fn times_propagation(l_err: &E, l_range: &Interval, r_err: &E, r_range: &Interval) -> E {
        let l_range_dom = E::from_interval(l_range);
        let r_range_dom = E::from_interval(r_range);
        let t1 = r_err.mul(&l_range_dom);
        let t2 = l_err.mul(&r_range_dom);
        let t3 = l_err.mul(r_err);
        t1.add(&t2).add(&t3)
    }

    /// Linearization of `1/y` around the widened denominator range
    /// `range(r) + e_r` (§4.4.1, `Divide`): `e_l / r + range(l) * e_r /
    /// r^2`, evaluated soundly with `r` replaced everywhere by the widened
    /// range so the bound covers every value the true denominator could
    /// take.
    fn div_propagation(
        l_err: &E,
        l_range: &Interval,
        r_err: &E,
        widened_r_range: &Interval,
    ) -> AnalysisResult<E> {
        let recip = Interval::degenerate(Rational::one())
            .div(widened_r_range)
            .expect("div_propagation: widened_r_range checked nonzero by caller");
        let recip_dom = E::from_interval(&recip);
        let from_l = l_err.mul(&recip_dom);
        let from_r = E::from_interval(l_range)
            .mul(&recip_dom)
            .mul(&recip_dom)
            .mul(r_err);
        Ok(from_l.add(&from_r))
    }

    /// `Pow(l, n)` via iterated multiplication (§4.4.1): each of the `n-1`
    /// synthetic multiplications applies the `Times` propagation rule and
    /// (when enabled) introduces its own new-roundoff term, exactly as if
    /// the expression had been written out as repeated multiplication.
    fn eval_pow(&self, id: NodeId, n: u32, base_err: E, base_range: &Interval) -> E {
        if n == 0 {
            return E::zero();
        }
        if n == 1 {
            return base_err;
        }
        let mut acc_err = base_err.clone();
        let mut acc_range = base_range.clone();
        for _ in 1..n {
            let propagated = Self::times_propagation(&acc_err, &acc_range, &base_err, base_range);
            acc_range = acc_range.mul(base_range);
            let widened = self.widen(&acc_range, &propagated);
            let rho = self.new_roundoff(self.default_precision, &widened);
            acc_err = propagated.add(&E::symmetric(&rho));
        }
        let _ = id;
        acc_err
    }
}

/// Runs the `RangeEvaluator` and `RoundoffEvaluator` back to back over the
/// same tree, per the §4.3 -> §4.4 data flow, and returns the final
/// result's range and error plus both intermediate maps.
#[allow(clippy::too_many_arguments)]
pub fn analyze<T: AbstractDomain, E: AbstractDomain>(
    expr: &Expr,
    range_env: &Rc<Env<T>>,
    error_env: &Rc<Env<E>>,
    precision_map: PrecisionMap,
    default_precision: Precision,
    constants_precision: Precision,
    track_roundoff: bool,
    cheated: bool,
) -> AnalysisResult<(T, E, HashMap<NodeId, Interval>, HashMap<NodeId, E>)> {
    let (range, range_map) = crate::range_evaluator::eval_range(expr, range_env)?;
    let interval_ranges: HashMap<NodeId, Interval> = range_map
        .into_iter()
        .map(|(id, v)| (id, v.to_interval()))
        .collect();

    let mut roundoff = RoundoffEvaluator::<E>::new(
        &interval_ranges,
        precision_map,
        default_precision,
        constants_precision,
        track_roundoff,
        cheated,
    );
    let error = roundoff.evaluate(expr, error_env)?;
    let error_map = roundoff.into_intermediate_map();
    Ok((range, error, interval_ranges, error_map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::Identifier;
    use Roundoff_math::{AffineForm, Interval, Rational};

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(n, d)
    }

    fn ranges_for(expr: &Expr, env: &Rc<Env<Interval>>) -> HashMap<NodeId, Interval> {
        let (_, map) = crate::range_evaluator::eval_range(expr, env).unwrap();
        map
    }

    #[test]
    fn zero_input_error_and_no_roundoff_round_trips_to_zero() {
        let ident = Identifier::fresh("x");
        let expr = Expr::add(
            Expr::variable(ident.clone()),
            Expr::constant(Rational::from_integer(1)),
        );
        let range_env = Env::bind(&Env::empty(), ident.id(), Interval::new(r(0, 1), r(2, 1)));
        let ranges = ranges_for(&expr, &range_env);

        let error_env: Rc<Env<Interval>> =
            Env::bind(&Env::empty(), ident.id(), Interval::degenerate(Rational::zero()));
        let mut evaluator = RoundoffEvaluator::<Interval>::new(
            &ranges,
            PrecisionMap::new(),
            Precision::Float64,
            Precision::Float64,
            false,
            false,
        );
        let err = evaluator.evaluate(&expr, &error_env).unwrap();
        assert_eq!(err, Interval::degenerate(Rational::zero()));
    }

    #[test]
    fn times_rule_grows_with_operand_errors() {
        let ident = Identifier::fresh("x");
        let expr = Expr::mul(
            Expr::variable(ident.clone()),
            Expr::variable(ident.clone()),
        );
        let range_env = Env::bind(&Env::empty(), ident.id(), Interval::new(r(1, 1), r(2, 1)));
        let ranges = ranges_for(&expr, &range_env);

        let error_env: Rc<Env<Interval>> = Env::bind(
            &Env::empty(),
            ident.id(),
            Interval::symmetric(r(1, 100)),
        );
        let mut evaluator = RoundoffEvaluator::<Interval>::new(
            &ranges,
            PrecisionMap::new(),
            Precision::Float64,
            Precision::Float64,
            true,
            false,
        );
        let err = evaluator.evaluate(&expr, &error_env).unwrap();
        assert!(err.to_interval().max_abs().is_positive());
    }

    #[test]
    fn division_by_a_range_that_widens_through_zero_fails() {
        let ident = Identifier::fresh("y");
        let expr = Expr::div(
            Expr::constant(Rational::one()),
            Expr::variable(ident.clone()),
        );
        let range_env = Env::bind(&Env::empty(), ident.id(), Interval::new(r(1, 1), r(2, 1)));
        let ranges = ranges_for(&expr, &range_env);

        let error_env: Rc<Env<Interval>> =
            Env::bind(&Env::empty(), ident.id(), Interval::symmetric(r(3, 1)));
        let mut evaluator = RoundoffEvaluator::<Interval>::new(
            &ranges,
            PrecisionMap::new(),
            Precision::Float64,
            Precision::Float64,
            true,
            false,
        );
        let err = evaluator.evaluate(&expr, &error_env);
        assert!(matches!(
            err,
            Err(AnalysisError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn sqrt_of_a_range_touching_zero_fails() {
        let ident = Identifier::fresh("x");
        let expr = Expr::sqrt(Expr::variable(ident.clone()));
        let range_env = Env::bind(&Env::empty(), ident.id(), Interval::new(r(0, 1), r(4, 1)));
        let ranges = ranges_for(&expr, &range_env);

        let error_env: Rc<Env<Interval>> =
            Env::bind(&Env::empty(), ident.id(), Interval::degenerate(Rational::zero()));
        let mut evaluator = RoundoffEvaluator::<Interval>::new(
            &ranges,
            PrecisionMap::new(),
            Precision::Float64,
            Precision::Float64,
            true,
            false,
        );
        assert!(matches!(
            evaluator.evaluate(&expr, &error_env),
            Err(AnalysisError::NegativeSqrt { .. })
        ));
    }

    #[test]
    fn negation_introduces_no_new_roundoff() {
        let ident = Identifier::fresh("x");
        let expr = Expr::neg(Expr::variable(ident.clone()));
        let range_env = Env::bind(&Env::empty(), ident.id(), Interval::new(r(-15, 1), r(15, 1)));
        let ranges = ranges_for(&expr, &range_env);

        let error_env: Rc<Env<Interval>> =
            Env::bind(&Env::empty(), ident.id(), Interval::degenerate(Rational::zero()));
        let mut evaluator = RoundoffEvaluator::<Interval>::new(
            &ranges,
            PrecisionMap::new(),
            Precision::Float64,
            Precision::Float64,
            true,
            false,
        );
        let err = evaluator.evaluate(&expr, &error_env).unwrap();
        // A zero-error input negated at a wide range ([-15,15]) would pick up
        // a roundoff term of ~2^-52 * 15 if new-roundoff were (wrongly) added
        // here; negation is exact, so the result must stay exactly zero.
        assert_eq!(err, Interval::degenerate(Rational::zero()));
    }

    #[test]
    fn let_bound_value_does_not_introduce_roundoff_twice() {
        let ident = Identifier::fresh("x");
        let expr = Expr::let_in(
            ident.clone(),
            Expr::constant(Rational::new(1, 3)),
            Expr::add(Expr::variable(ident.clone()), Expr::variable(ident)),
        );
        let range_env: Rc<Env<Interval>> = Env::empty();
        let ranges = ranges_for(&expr, &range_env);
        let error_env: Rc<Env<Interval>> = Env::empty();
        let mut evaluator = RoundoffEvaluator::<Interval>::new(
            &ranges,
            PrecisionMap::new(),
            Precision::Float64,
            Precision::Float64,
            true,
            false,
        );
        let err = evaluator.evaluate(&expr, &error_env).unwrap();
        // Two uses of the same let-bound value sum to 2x that value's own
        // (single) roundoff contribution, not 2x plus two fresh cast terms.
        assert!(err.to_interval().max_abs().is_positive());
    }

    #[test]
    fn affine_and_interval_agree_on_a_pure_addition() {
        let ident = Identifier::fresh("x");
        let expr = Expr::add(
            Expr::variable(ident.clone()),
            Expr::constant(Rational::from_integer(1)),
        );
        let range_env = Env::bind(&Env::empty(), ident.id(), Interval::new(r(0, 1), r(2, 1)));
        let ranges = ranges_for(&expr, &range_env);

        let interval_env: Rc<Env<Interval>> =
            Env::bind(&Env::empty(), ident.id(), Interval::symmetric(r(1, 100)));
        let mut interval_eval = RoundoffEvaluator::<Interval>::new(
            &ranges,
            PrecisionMap::new(),
            Precision::Float64,
            Precision::Float64,
            false,
            false,
        );
        let interval_err = interval_eval.evaluate(&expr, &interval_env).unwrap();

        let affine_env: Rc<Env<AffineForm>> = Env::bind(
            &Env::empty(),
            ident.id(),
            AffineForm::from_interval(&Interval::symmetric(r(1, 100))),
        );
        let mut affine_eval = RoundoffEvaluator::<AffineForm>::new(
            &ranges,
            PrecisionMap::new(),
            Precision::Float64,
            Precision::Float64,
            false,
            false,
        );
        let affine_err = affine_eval.evaluate(&expr, &affine_env).unwrap();

        assert_eq!(interval_err, affine_err.to_interval());
    }
}
