// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Roundoff: static floating-point roundoff-error analysis.
// Dual licensed under Apache 2.0 and MIT.
// See:
//      - LICENSE-APACHE.md
//      - LICENSE-MIT.md
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

//! Computes the real-valued range of every node in an expression tree,
//! generic over which [`AbstractDomain`] the range is carried in.

use crate::env::Env;
use crate::expr::{BinaryOp, Expr, NodeId, UnaryOp};
use std::collections::HashMap;
use std::rc::Rc;
use Roundoff_error::{AnalysisError, AnalysisResult};
use Roundoff_math::AbstractDomain;

/// Evaluates an [`Expr`] tree's real-valued range, memoizing by node
/// identity (see [`NodeId`]) rather than by structural equality.
pub struct RangeEvaluator<T: AbstractDomain> {
    cache: HashMap<NodeId, T>,
}

impl<T: AbstractDomain> Default for RangeEvaluator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: AbstractDomain> RangeEvaluator<T> {
    /// A fresh evaluator with an empty memoization cache.
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// The intermediate-result map accumulated so far: every node reached by
    /// [`RangeEvaluator::evaluate`], keyed by node identity per §4.3.
    pub fn intermediate_map(&self) -> &HashMap<NodeId, T> {
        &self.cache
    }

    /// Consumes the evaluator, handing back its intermediate-result map.
    pub fn into_intermediate_map(self) -> HashMap<NodeId, T> {
        self.cache
    }

    /// Evaluates `expr`'s range under `env`, the scope mapping each bound
    /// identifier's id to its already-evaluated range.
    pub fn evaluate(&mut self, expr: &Expr, env: &Rc<Env<T>>) -> AnalysisResult<T> {
        if let Some(cached) = self.cache.get(&expr.id()) {
            return Ok(cached.clone());
        }

        let result = match expr {
            Expr::Constant { value, .. } => {
                T::from_interval(&Roundoff_math::Interval::degenerate(value.clone()))
            }
            Expr::Variable { ident, .. } => {
                env.lookup(ident.id())
                    .cloned()
                    .ok_or_else(|| AnalysisError::UnboundVariable {
                        name: ident.name().to_string(),
                        id: ident.id(),
                    })?
            }
            Expr::Let {
                ident, value, body, ..
            } => {
                let bound_value = self.evaluate(value, env)?;
                let inner_env = Env::bind(env, ident.id(), bound_value);
                self.evaluate(body, &inner_env)?
            }
            Expr::Unary { op, operand, id } => {
                let v = self.evaluate(operand, env)?;
                match op {
                    UnaryOp::Neg => v.neg(),
                    UnaryOp::Sqrt => v.sqrt(id.raw())?,
                }
            }
            Expr::Binary { op, lhs, rhs, id } => {
                let l = self.evaluate(lhs, env)?;
                let r = self.evaluate(rhs, env)?;
                match op {
                    BinaryOp::Add => l.add(&r),
                    BinaryOp::Sub => l.sub(&r),
                    BinaryOp::Mul => l.mul(&r),
                    BinaryOp::Div => l.div(&r, id.raw())?,
                }
            }
            Expr::Pow { base, n, .. } => {
                let b = self.evaluate(base, env)?;
                b.pow(*n)
            }
        };

        self.cache.insert(expr.id(), result.clone());
        Ok(result)
    }
}

/// `evalRange<T>(expr, env) -> (T, Map[NodeId, T])` from §4.3: evaluates
/// `expr`'s range under `env` and hands back both the result and the
/// per-node intermediate-range map in one call, for callers (the
/// `DataflowDriver`) that need both.
pub fn eval_range<T: AbstractDomain>(
    expr: &Expr,
    env: &Rc<Env<T>>,
) -> AnalysisResult<(T, HashMap<NodeId, T>)> {
    let mut evaluator = RangeEvaluator::new();
    let result = evaluator.evaluate(expr, env)?;
    Ok((result, evaluator.into_intermediate_map()))
}
