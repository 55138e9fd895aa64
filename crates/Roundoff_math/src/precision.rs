// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Roundoff: static floating-point roundoff-error analysis.
// Dual licensed under Apache 2.0 and MIT.
// See:
//      - LICENSE-APACHE.md
//      - LICENSE-MIT.md
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

//! Finite-precision number formats and the roundoff bound each one implies
//! for a given result range.

use crate::interval::Interval;
use crate::rational::Rational;
use serde::{Deserialize, Serialize};

/// A finite-precision number format a real-valued quantity is eventually
/// rounded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Precision {
    /// IEEE 754 binary32, 24-bit mantissa.
    Float32,
    /// IEEE 754 binary64, 53-bit mantissa.
    Float64,
    /// A double-double pair, ~106 significant bits.
    DoubleDouble,
    /// A fixed-point format with `n` fractional bits.
    Fixed(u32),
}

impl Precision {
    /// Unit roundoff `u`: half the gap between `1` and the next
    /// representable value above it. Exact, expressed as a power of two.
    ///
    /// For `Fixed(n)` this is `2^-(n-1)`, the truncation-model bound on a
    /// format with `n` fractional bits - not `2^-n` - so that
    /// `abs_roundoff` matches the fixed-point rule directly.
    pub fn unit_roundoff(&self) -> Rational {
        match self {
            Precision::Float32 => Rational::exp2(-24),
            Precision::Float64 => Rational::exp2(-53),
            Precision::DoubleDouble => Rational::exp2(-105),
            Precision::Fixed(n) => Rational::exp2(-(*n as i64 - 1)),
        }
    }

    /// The smallest positive magnitude representable without loss in this
    /// format's subnormal range, used as an additive floor on the roundoff
    /// bound near zero. Fixed-point formats have no subnormal range, so this
    /// is zero for them.
    pub fn denormal_threshold(&self) -> Rational {
        match self {
            Precision::Float32 => Rational::exp2(-149),
            Precision::Float64 => Rational::exp2(-1074),
            Precision::DoubleDouble => Rational::exp2(-1074),
            Precision::Fixed(_) => Rational::zero(),
        }
    }

    /// Significand width, used only to order precisions against each other
    /// for the mixed-precision cast rule (§4.4.3): casting from a narrower
    /// format to a wider one is free, the reverse direction adds a cast
    /// error.
    pub fn bits(&self) -> u32 {
        match self {
            Precision::Float32 => 24,
            Precision::Float64 => 53,
            Precision::DoubleDouble => 105,
            Precision::Fixed(n) => *n,
        }
    }

    /// The conservative (rounding-model) absolute roundoff bound for a
    /// quantity whose real-valued range is `range`: `u * maxAbs(range) +
    /// denormal_threshold`.
    pub fn abs_roundoff(&self, range: &Interval) -> Rational {
        let scaled = self.unit_roundoff().mul(&range.max_abs());
        &scaled + &self.denormal_threshold()
    }

    /// The truncation-model absolute roundoff bound: `u * maxAbs(range)`,
    /// without the denormal floor. Less conservative than
    /// [`Precision::abs_roundoff`]; selected per-call via the `cheated`
    /// flag on a `RoundoffEvaluator`, rather than as a distinct `Precision`
    /// variant, since it changes the rounding model, not the format.
    pub fn abs_roundoff_cheated(&self, range: &Interval) -> Rational {
        match self {
            Precision::Fixed(_) => self.abs_roundoff(range),
            _ => self.unit_roundoff().mul(&range.max_abs()),
        }
    }

    /// The largest finite magnitude this format can represent, exactly, as
    /// a `Rational`: `(2^bits - 1) * 2^(max_exponent - bits + 1)` for the
    /// IEEE formats. `None` for `Fixed(n)`, which this analysis models as a
    /// truncating format with no overflow ceiling of its own - overflow of
    /// the surrounding accumulator, if any, is a concern for the format it
    /// is eventually stored in.
    ///
    /// Used only for the advisory `Overflow` check (§7): a result range
    /// whose `maxAbs` exceeds this is logged as a warning, never as a
    /// failure.
    pub fn max_finite(&self) -> Option<Rational> {
        match self {
            Precision::Float32 => Some(
                (&Rational::exp2(24) - &Rational::one()).mul(&Rational::exp2(127 - 23)),
            ),
            Precision::Float64 | Precision::DoubleDouble => Some(
                (&Rational::exp2(53) - &Rational::one()).mul(&Rational::exp2(1023 - 52)),
            ),
            Precision::Fixed(_) => None,
        }
    }
}
