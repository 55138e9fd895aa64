// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Roundoff: static floating-point roundoff-error analysis.
// Dual licensed under Apache 2.0 and MIT.
// See:
//      - LICENSE-APACHE.md
//      - LICENSE-MIT.md
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

//! Small configuration enums shared across the workspace.

#![forbid(missing_docs)]

use serde::{Deserialize, Serialize};

/// Which abstract domain the `RangeEvaluator` is instantiated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeMethod {
    /// Plain interval arithmetic.
    Interval,
    /// Affine-arithmetic forms (tracks correlation between sub-expressions).
    Affine,
    /// Interval arithmetic refined by an external SMT solver.
    Smt,
}

impl Default for RangeMethod {
    #[inline]
    fn default() -> Self {
        Self::Interval
    }
}

/// Which abstract domain the `RoundoffEvaluator` is instantiated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorMethod {
    /// Plain interval arithmetic over the error quantity.
    Interval,
    /// Affine-arithmetic forms over the error quantity.
    Affine,
}

impl Default for ErrorMethod {
    #[inline]
    fn default() -> Self {
        Self::Affine
    }
}
