// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Roundoff: static floating-point roundoff-error analysis.
// Dual licensed under Apache 2.0 and MIT.
// See:
//      - LICENSE-APACHE.md
//      - LICENSE-MIT.md
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

//! Affine arithmetic forms `x0 + sum_i coeff_i * eps_i`, `eps_i in [-1, 1]`.
//!
//! Linear operations (`+`, `-`, scaling) combine forms exactly, preserving
//! whatever correlation the shared noise symbols encode. Non-linear
//! operations (`*`, `/`, `sqrt`) cannot be represented exactly in this form,
//! so each one introduces exactly one fresh noise symbol whose coefficient is
//! a sound bound on the linearization error.

use crate::interval::Interval;
use crate::rational::Rational;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

static NEXT_NOISE_ID: AtomicU64 = AtomicU64::new(1);

/// Allocates a fresh, globally unique noise-symbol id.
///
/// Every non-linear operation performed anywhere in the analysis calls this
/// exactly once, so noise symbols never collide across sibling
/// sub-expressions evaluated independently (e.g. on separate `rayon`
/// workers).
pub fn fresh_noise_id() -> u64 {
    NEXT_NOISE_ID.fetch_add(1, AtomicOrdering::Relaxed)
}

/// An affine form `x0 + sum_i coeff_i * eps_i`.
///
/// Terms are kept sorted by noise-symbol id with no zero coefficients, so
/// that two forms built from the same symbols line up for term-by-term
/// merging during `add`/`sub`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffineForm {
    x0: Rational,
    terms: Vec<(u64, Rational)>,
}

impl AffineForm {
    /// A form with no noise terms: an exactly-known constant.
    pub fn constant(x0: Rational) -> Self {
        Self {
            x0,
            terms: Vec::new(),
        }
    }

    /// Lifts an interval into a form with one fresh noise symbol: center
    /// plus `+/- radius`.
    pub fn from_interval(interval: &Interval) -> Self {
        let x0 = interval.midpoint();
        let radius = interval.radius();
        let terms = if radius.is_zero() {
            Vec::new()
        } else {
            vec![(fresh_noise_id(), radius)]
        };
        Self { x0, terms }
    }

    /// The smallest interval containing every value this form can take:
    /// `x0 +/- sum_i |coeff_i|`.
    pub fn to_interval(&self) -> Interval {
        let radius = self
            .terms
            .iter()
            .fold(Rational::zero(), |acc, (_, c)| &acc + &c.abs());
        Interval::new(&self.x0 - &radius, &self.x0 + &radius)
    }

    fn merge_terms(
        a: &[(u64, Rational)],
        b: &[(u64, Rational)],
        combine: impl Fn(Option<&Rational>, Option<&Rational>) -> Rational,
    ) -> Vec<(u64, Rational)> {
        let mut out = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() || j < b.len() {
            let (id, coeff) = match (a.get(i), b.get(j)) {
                (Some((ia, ca)), Some((ib, cb))) if ia == ib => {
                    i += 1;
                    j += 1;
                    (*ia, combine(Some(ca), Some(cb)))
                }
                (Some((ia, ca)), Some((ib, _))) if ia < ib => {
                    i += 1;
                    (*ia, combine(Some(ca), None))
                }
                (Some((ia, _)), Some((ib, cb))) if ia > ib => {
                    j += 1;
                    (*ib, combine(None, Some(cb)))
                }
                (Some((ia, ca)), None) => {
                    i += 1;
                    (*ia, combine(Some(ca), None))
                }
                (None, Some((ib, cb))) => {
                    j += 1;
                    (*ib, combine(None, Some(cb)))
                }
                _ => unreachable!(),
            };
            if !coeff.is_zero() {
                out.push((id, coeff));
            }
        }
        out
    }

    /// Exact addition: noise terms merge by id.
    pub fn add(&self, other: &Self) -> Self {
        let terms = Self::merge_terms(&self.terms, &other.terms, |a, b| {
            let za = Rational::zero();
            let zb = Rational::zero();
            a.unwrap_or(&za) + b.unwrap_or(&zb)
        });
        Self {
            x0: &self.x0 + &other.x0,
            terms,
        }
    }

    /// Exact negation.
    pub fn neg(&self) -> Self {
        Self {
            x0: -&self.x0,
            terms: self.terms.iter().map(|(id, c)| (*id, -c)).collect(),
        }
    }

    /// Exact subtraction.
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Exact scaling by a constant rational.
    pub fn scale(&self, k: &Rational) -> Self {
        Self {
            x0: self.x0.mul(k),
            terms: self
                .terms
                .iter()
                .map(|(id, c)| (*id, c.mul(k)))
                .collect(),
        }
    }

    fn radius_sum(&self) -> Rational {
        self.terms
            .iter()
            .fold(Rational::zero(), |acc, (_, c)| &acc + &c.abs())
    }

    /// Affine multiplication (Stolfi's rule).
    ///
    /// The linear part of the product is exact: `x0*y0 + sum_i (x0*b_i +
    /// y0*a_i) * eps_i`. What is dropped is the `(sum_i a_i*eps_i) * (sum_i
    /// b_i*eps_i)` cross term, which this rule bounds conservatively by
    /// `radius(self) * radius(other)` and folds into one fresh noise symbol,
    /// rather than trying to track which `eps_i*eps_j` products came from
    /// where.
    pub fn mul(&self, other: &Self) -> Self {
        let linear_terms = Self::merge_terms(&self.terms, &other.terms, |a, b| {
            let za = Rational::zero();
            let zb = Rational::zero();
            let ai = a.unwrap_or(&za);
            let bi = b.unwrap_or(&zb);
            &self.x0.mul(bi) + &other.x0.mul(ai)
        });
        let mut terms = linear_terms;
        let cross_bound = self.radius_sum().mul(&other.radius_sum());
        if !cross_bound.is_zero() {
            terms.push((fresh_noise_id(), cross_bound));
        }
        Self {
            x0: self.x0.mul(&other.x0),
            terms,
        }
    }

    /// Affine division. `Err` when the divisor's range contains zero.
    ///
    /// Uses a min-range linearization of `y -> 1/y` over the divisor's
    /// range: the chord slope `alpha = -1/(a*b)` through the range's two
    /// endpoints `[a, b]` is exact (`1/y` is a Mobius transform, so the
    /// chord through its endpoints has this slope in closed form), and the
    /// residual `1/y - alpha*y` is monotone over `[a, b]` (its derivative
    /// `alpha - f'(y)` does not change sign there), so evaluating it at the
    /// two endpoints bounds it everywhere in between.
    pub fn div(&self, other: &Self) -> Result<Self, DivisionByZero> {
        let y_range = other.to_interval();
        if y_range.contains_zero() {
            return Err(DivisionByZero);
        }
        let (a, b) = (y_range.lo().clone(), y_range.hi().clone());
        let negative = a.is_negative();
        let (a_abs, b_abs) = if negative {
            (-&b, -&a)
        } else {
            (a.clone(), b.clone())
        };
        let reciprocal = Self::reciprocal_linearization(&a_abs, &b_abs, other);
        let reciprocal = if negative {
            reciprocal.neg()
        } else {
            reciprocal
        };
        Ok(self.mul(&reciprocal))
    }

    /// Builds the affine form for `1/y` given `other`'s range is `[a, b]`
    /// with `0 < a <= b`.
    fn reciprocal_linearization(a: &Rational, b: &Rational, other: &Self) -> Self {
        if a == b {
            let recip = Rational::one()
                .checked_div(a)
                .expect("reciprocal_linearization: a > 0");
            return Self::constant(recip);
        }
        let ab = a.mul(b);
        let alpha = -&Rational::one()
            .checked_div(&ab)
            .expect("reciprocal_linearization: a*b > 0");
        let recip_a = Rational::one().checked_div(a).expect("a > 0");
        let recip_b = Rational::one().checked_div(b).expect("b > 0");
        let r_hi = &recip_a - &alpha.mul(a);
        let r_lo = &recip_b - &alpha.mul(b);
        let beta = (&r_hi + &r_lo)
            .checked_div(&Rational::from_integer(2))
            .expect("division by 2 never fails");
        let radius = (&r_hi - &r_lo)
            .checked_div(&Rational::from_integer(2))
            .expect("division by 2 never fails")
            .abs();

        let linear = other.scale(&alpha);
        let mut form = Self {
            x0: &linear.x0 + &beta,
            terms: linear.terms,
        };
        if !radius.is_zero() {
            form.terms.push((fresh_noise_id(), radius));
        }
        form
    }

    /// Affine square root. `Err` when the range's lower bound is negative.
    ///
    /// `sqrt` has no closed rational form, so this lifts the already-sound
    /// [`Interval::sqrt`] enclosure `[slo, shi]` and builds the chord
    /// between `(a, slo)` and `(b, shi)` as the linear part. Since both the
    /// true `sqrt` and the chord stay within `[slo, shi]` across the whole
    /// domain, their difference is bounded by the enclosure's own width,
    /// which becomes the fresh noise term's coefficient - a looser bound
    /// than a tight Chebyshev fit, but one that never needs an irrational
    /// coefficient.
    pub fn sqrt(&self) -> Result<Self, NegativeSqrt> {
        let range = self.to_interval();
        let sqrt_range = range.sqrt().ok_or(NegativeSqrt)?;
        let (a, b) = (range.lo().clone(), range.hi().clone());
        let (slo, shi) = (sqrt_range.lo().clone(), sqrt_range.hi().clone());

        if a == b {
            return Ok(Self::constant(slo));
        }

        let alpha = (&shi - &slo)
            .checked_div(&(&b - &a))
            .expect("sqrt: a != b, checked above");
        let beta = &slo - &alpha.mul(&a);
        let width = &shi - &slo;

        let scaled_terms: Vec<(u64, Rational)> = self
            .terms
            .iter()
            .map(|(id, c)| (*id, c.mul(&alpha)))
            .collect();
        let mut form = Self {
            x0: &(alpha.mul(&self.x0)) + &beta,
            terms: scaled_terms,
        };
        if !width.is_zero() {
            form.terms.push((fresh_noise_id(), width.abs()));
        }
        Ok(form)
    }

    /// Integer power via repeated affine multiplication.
    pub fn pow(&self, n: u32) -> Self {
        if n == 0 {
            return Self::constant(Rational::one());
        }
        let mut acc = self.clone();
        for _ in 1..n {
            acc = acc.mul(self);
        }
        acc
    }
}

/// Raised when an affine division's divisor range contains zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivisionByZero;

/// Raised when an affine square root's range has a negative lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegativeSqrt;
