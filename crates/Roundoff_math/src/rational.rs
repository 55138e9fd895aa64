// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Roundoff: static floating-point roundoff-error analysis.
// Dual licensed under Apache 2.0 and MIT.
// See:
//      - LICENSE-APACHE.md
//      - LICENSE-MIT.md
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

//! Arbitrary-precision exact rational arithmetic.
//!
//! Every quantity that flows through the analysis - literal constants, input
//! ranges, interval endpoints, affine-form coefficients - is carried as a
//! [`Rational`] rather than an `f64`, so that the analysis of roundoff error
//! never itself introduces roundoff error.

use num::BigInt;
use num::BigRational;
use num::traits::{One, Signed, Zero};
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

/// An exact rational number `p / q`, `q > 0`, kept in lowest terms by
/// [`num::rational::Ratio`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rational(BigRational);

impl Rational {
    /// The exact rational zero.
    #[inline]
    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    /// The exact rational one.
    #[inline]
    pub fn one() -> Self {
        Self(BigRational::one())
    }

    /// Builds a rational from a numerator and a strictly positive
    /// denominator. Panics if `denom` is zero - unlike the arithmetic
    /// operators below, construction from raw parts is not a place the
    /// analysis expects to see a zero denominator.
    pub fn new(numer: i64, denom: i64) -> Self {
        assert!(denom != 0, "Rational::new: zero denominator");
        Self(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    /// Builds a rational equal to the integer `n`.
    #[inline]
    pub fn from_integer(n: i64) -> Self {
        Self(BigRational::from_integer(BigInt::from(n)))
    }

    /// Lifts an `f64` into an exact rational with the same value. `f64` is
    /// itself a ratio of integers (mantissa over a power of two), so this
    /// conversion is exact, never approximate.
    pub fn from_f64(x: f64) -> Self {
        BigRational::from_float(x)
            .map(Self)
            .unwrap_or_else(Self::zero)
    }

    /// Builds `2^k` for any integer `k`, exactly.
    pub fn exp2(k: i64) -> Self {
        if k >= 0 {
            Self(BigRational::from_integer(BigInt::from(2).pow(k as u32)))
        } else {
            Self(BigRational::new(
                BigInt::one(),
                BigInt::from(2).pow((-k) as u32),
            ))
        }
    }

    /// Outward-rounded conversion to `f64`: `Up` never returns a value
    /// smaller than the true rational, `Down` never returns a value larger.
    /// Used only at presentation boundaries (summaries, demos); the analysis
    /// itself stays exact until this point.
    pub fn to_f64_outward(&self, round_up: bool) -> f64 {
        let x = self.to_f64_nearest();
        if round_up {
            if Self::from_f64(x) < *self {
                Self::next_float_up(x)
            } else {
                x
            }
        } else if Self::from_f64(x) > *self {
            Self::next_float_down(x)
        } else {
            x
        }
    }

    fn to_f64_nearest(&self) -> f64 {
        let numer: f64 = self.0.numer().to_string().parse().unwrap_or(0.0);
        let denom: f64 = self.0.denom().to_string().parse().unwrap_or(1.0);
        numer / denom
    }

    /// The next representable `f64` strictly above `x` (sign-aware: bit
    /// patterns of negative floats decrease as the value increases).
    fn next_float_up(x: f64) -> f64 {
        if x.is_nan() || x == f64::INFINITY {
            return x;
        }
        if x == 0.0 {
            return f64::from_bits(1);
        }
        if x > 0.0 {
            f64::from_bits(x.to_bits() + 1)
        } else {
            f64::from_bits(x.to_bits() - 1)
        }
    }

    /// The next representable `f64` strictly below `x`.
    fn next_float_down(x: f64) -> f64 {
        if x.is_nan() || x == f64::NEG_INFINITY {
            return x;
        }
        if x == 0.0 {
            return -f64::from_bits(1);
        }
        if x > 0.0 {
            f64::from_bits(x.to_bits() - 1)
        } else {
            f64::from_bits(x.to_bits() + 1)
        }
    }

    /// Absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// `true` if this rational is exactly zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `true` if this rational is strictly negative.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// `true` if this rational is strictly positive.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    /// `true` if this rational has denominator `1`.
    ///
    /// Used as a deliberately conservative exact-representability check for
    /// literal constants (§4.4): integers up to a format's mantissa width
    /// round exactly, so treating every non-integer literal as possibly
    /// inexact only ever over-counts roundoff, never under-counts it.
    #[inline]
    pub fn is_integer(&self) -> bool {
        self.0.is_integer()
    }

    /// Checked division: `None` when `rhs` is zero. Everywhere this analysis
    /// divides one quantity by another it knows the node identity of the
    /// division, so the typed `DivisionByZero` failure is raised by the
    /// caller (which has that context), not here.
    pub fn checked_div(&self, rhs: &Self) -> Option<Self> {
        if rhs.is_zero() {
            None
        } else {
            Some(Self(&self.0 / &rhs.0))
        }
    }

    /// Multiplication. Total: there is no rational pair whose product is
    /// undefined.
    #[inline]
    pub fn mul(&self, rhs: &Self) -> Self {
        Self(&self.0 * &rhs.0)
    }

    /// The larger of two rationals.
    pub fn max(&self, other: &Self) -> Self {
        if self.0 >= other.0 {
            self.clone()
        } else {
            other.clone()
        }
    }

    /// The smaller of two rationals.
    pub fn min(&self, other: &Self) -> Self {
        if self.0 <= other.0 {
            self.clone()
        } else {
            other.clone()
        }
    }

    /// A sound enclosure `[lower, upper]` of `sqrt(self)`, for `self >= 0`.
    ///
    /// Uses Newton's method seeded above the root (`max(self, 1)` always
    /// over-estimates `sqrt(self)` for `self >= 0`) so every iterate stays a
    /// valid upper bound; `self / upper` is then a valid lower bound, since
    /// for `y >= sqrt(r) > 0`, `r / y <= sqrt(r) <= y`. A fixed iteration
    /// count keeps the evaluator deterministic and keeps this from ever
    /// touching `f64` or an irrational value directly.
    pub fn sqrt_bounds(&self) -> (Self, Self) {
        if self.is_zero() {
            return (Self::zero(), Self::zero());
        }
        debug_assert!(!self.is_negative(), "sqrt_bounds: negative argument");

        const ITERATIONS: u32 = 40;
        let one = Self::one();
        let mut y = self.max(&one);
        for _ in 0..ITERATIONS {
            // y_{n+1} = (y_n + r / y_n) / 2
            let quotient = self
                .checked_div(&y)
                .expect("sqrt_bounds: iterate is never zero");
            y = Self(&(&y.0 + &quotient.0) / BigInt::from(2));
        }
        let lower = self
            .checked_div(&y)
            .expect("sqrt_bounds: upper iterate is never zero");
        (lower, y)
    }
}

impl Add for Rational {
    type Output = Rational;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Add for &Rational {
    type Output = Rational;
    fn add(self, rhs: Self) -> Self::Output {
        Rational(&self.0 + &rhs.0)
    }
}

impl Sub for Rational {
    type Output = Rational;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sub for &Rational {
    type Output = Rational;
    fn sub(self, rhs: Self) -> Self::Output {
        Rational(&self.0 - &rhs.0)
    }
}

impl Neg for Rational {
    type Output = Rational;
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Neg for &Rational {
    type Output = Rational;
    fn neg(self) -> Self::Output {
        Rational(-self.0.clone())
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_integer() {
            write!(f, "{}", self.0.numer())
        } else {
            write!(f, "{}/{}", self.0.numer(), self.0.denom())
        }
    }
}

impl Serialize for Rational {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}/{}", self.0.numer(), self.0.denom()))
    }
}

struct RationalVisitor;

impl<'de> Visitor<'de> for RationalVisitor {
    type Value = Rational;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a rational formatted as \"numer/denom\" or a plain integer")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        match value.split_once('/') {
            Some((numer, denom)) => {
                let numer = BigInt::from_str(numer).map_err(de::Error::custom)?;
                let denom = BigInt::from_str(denom).map_err(de::Error::custom)?;
                if denom.is_zero() {
                    return Err(de::Error::custom("Rational: zero denominator"));
                }
                Ok(Rational(BigRational::new(numer, denom)))
            }
            None => {
                let numer = BigInt::from_str(value).map_err(de::Error::custom)?;
                Ok(Rational(BigRational::from_integer(numer)))
            }
        }
    }
}

impl<'de> Deserialize<'de> for Rational {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(RationalVisitor)
    }
}
