// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Roundoff: static floating-point roundoff-error analysis.
// Dual licensed under Apache 2.0 and MIT.
// See:
//      - LICENSE-APACHE.md
//      - LICENSE-MIT.md
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

//! The capability trait shared by every abstract domain the evaluators in
//! `Roundoff_core` are generic over.
//!
//! Rather than dispatch dynamically on which domain is in use, the
//! evaluators are monomorphized over a type parameter bounded by
//! [`AbstractDomain`] - the same static-parameterization shape used
//! elsewhere in this codebase for per-quantity capability traits, so that a
//! new range representation can be added by implementing one trait, with no
//! change to the expression-tree evaluators themselves.

use crate::affine::AffineForm;
use crate::interval::Interval;
use crate::rational::Rational;
use crate::smt::SmtRange;
use Roundoff_error::{AnalysisError, AnalysisResult};

/// A numeric domain capable of representing the range of a real-valued
/// quantity and propagating it through the arithmetic operators this
/// analysis supports.
pub trait AbstractDomain: Clone + std::fmt::Debug {
    /// Lifts a plain interval into this domain.
    fn from_interval(range: &Interval) -> Self;

    /// The smallest interval enclosing every value this domain's value can
    /// take.
    fn to_interval(&self) -> Interval;

    /// The exact value `0`.
    fn zero() -> Self;

    /// The value `+/-(r)`, for `r >= 0`.
    fn symmetric(r: &Rational) -> Self;

    /// Addition.
    fn add(&self, other: &Self) -> Self;

    /// Subtraction.
    fn sub(&self, other: &Self) -> Self;

    /// Negation.
    fn neg(&self) -> Self;

    /// Multiplication.
    fn mul(&self, other: &Self) -> Self;

    /// Division. `node_id` identifies the expression-tree node performing
    /// the division, so a zero divisor range can be reported as a typed
    /// `DivisionByZero` at the right place in the tree.
    fn div(&self, other: &Self, node_id: u64) -> AnalysisResult<Self>;

    /// Square root. `node_id` identifies the expression-tree node, for the
    /// same reason as [`AbstractDomain::div`].
    fn sqrt(&self, node_id: u64) -> AnalysisResult<Self>;

    /// Integer power.
    fn pow(&self, n: u32) -> Self;
}

impl AbstractDomain for Interval {
    fn from_interval(range: &Interval) -> Self {
        range.clone()
    }

    fn to_interval(&self) -> Interval {
        self.clone()
    }

    fn zero() -> Self {
        Interval::degenerate(Rational::zero())
    }

    fn symmetric(r: &Rational) -> Self {
        Interval::symmetric(r.clone())
    }

    fn add(&self, other: &Self) -> Self {
        Interval::add(self, other)
    }

    fn sub(&self, other: &Self) -> Self {
        Interval::sub(self, other)
    }

    fn neg(&self) -> Self {
        Interval::neg(self)
    }

    fn mul(&self, other: &Self) -> Self {
        Interval::mul(self, other)
    }

    fn div(&self, other: &Self, node_id: u64) -> AnalysisResult<Self> {
        Interval::div(self, other).ok_or(AnalysisError::DivisionByZero { node_id })
    }

    fn sqrt(&self, node_id: u64) -> AnalysisResult<Self> {
        Interval::sqrt(self).ok_or(AnalysisError::NegativeSqrt { node_id })
    }

    fn pow(&self, n: u32) -> Self {
        Interval::pow(self, n)
    }
}

impl AbstractDomain for AffineForm {
    fn from_interval(range: &Interval) -> Self {
        AffineForm::from_interval(range)
    }

    fn to_interval(&self) -> Interval {
        AffineForm::to_interval(self)
    }

    fn zero() -> Self {
        AffineForm::constant(Rational::zero())
    }

    fn symmetric(r: &Rational) -> Self {
        AffineForm::from_interval(&Interval::symmetric(r.clone()))
    }

    fn add(&self, other: &Self) -> Self {
        AffineForm::add(self, other)
    }

    fn sub(&self, other: &Self) -> Self {
        AffineForm::sub(self, other)
    }

    fn neg(&self) -> Self {
        AffineForm::neg(self)
    }

    fn mul(&self, other: &Self) -> Self {
        AffineForm::mul(self, other)
    }

    fn div(&self, other: &Self, node_id: u64) -> AnalysisResult<Self> {
        AffineForm::div(self, other).map_err(|_| AnalysisError::DivisionByZero { node_id })
    }

    fn sqrt(&self, node_id: u64) -> AnalysisResult<Self> {
        AffineForm::sqrt(self).map_err(|_| AnalysisError::NegativeSqrt { node_id })
    }

    fn pow(&self, n: u32) -> Self {
        AffineForm::pow(self, n)
    }
}

impl AbstractDomain for SmtRange {
    fn from_interval(range: &Interval) -> Self {
        SmtRange::from_interval(range.clone())
    }

    fn to_interval(&self) -> Interval {
        SmtRange::interval(self).clone()
    }

    fn zero() -> Self {
        SmtRange::from_interval(Interval::degenerate(Rational::zero()))
    }

    fn symmetric(r: &Rational) -> Self {
        SmtRange::from_interval(Interval::symmetric(r.clone()))
    }

    fn add(&self, other: &Self) -> Self {
        SmtRange::add(self, other)
    }

    fn sub(&self, other: &Self) -> Self {
        SmtRange::sub(self, other)
    }

    fn neg(&self) -> Self {
        SmtRange::neg(self)
    }

    fn mul(&self, other: &Self) -> Self {
        SmtRange::mul(self, other)
    }

    fn div(&self, other: &Self, node_id: u64) -> AnalysisResult<Self> {
        SmtRange::div(self, other).ok_or(AnalysisError::DivisionByZero { node_id })
    }

    fn sqrt(&self, node_id: u64) -> AnalysisResult<Self> {
        SmtRange::sqrt(self).ok_or(AnalysisError::NegativeSqrt { node_id })
    }

    fn pow(&self, n: u32) -> Self {
        SmtRange::pow(self, n)
    }
}
