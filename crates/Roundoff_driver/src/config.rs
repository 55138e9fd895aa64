// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Roundoff: static floating-point roundoff-error analysis.
// Dual licensed under Apache 2.0 and MIT.
// See:
//      - LICENSE-APACHE.md
//      - LICENSE-MIT.md
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

//! The per-function `Configuration` from §3, and the enumerated
//! configuration options from §6.
//!
//! `Configuration` is `serde`-(de)serializable (§10.3) so a caller can load
//! a `mixed-precision` override map from any source it likes without this
//! crate taking on a parsing dependency of its own - parsing the file is
//! the Frontend's job, per §1's "only their contracts matter" boundary.

use Roundoff_enums::{ErrorMethod, RangeMethod};
use Roundoff_math::{Interval, Precision, Rational};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-function analysis configuration, assembled by the out-of-scope
/// `SpecsProcessor` collaborator and handed to [`crate::driver::DataflowDriver`].
///
/// Input maps are keyed by the source-level variable name (matching
/// `Identifier::name`), since a `Configuration` is typically constructed
/// before - or independently of - the expression tree whose parameters it
/// describes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    /// Every parameter's real-valued input range. Total over the function's
    /// parameters.
    pub input_ranges: HashMap<String, Interval>,

    /// Explicit per-parameter input errors. Entries missing here are filled
    /// in by [`crate::driver::DataflowDriver`] according to `track_initial`
    /// / `track_roundoff`, per §4.5 step 1.
    #[serde(default)]
    pub input_errors: HashMap<String, Rational>,

    /// Per-variable precision overrides (the `mixed-precision` option).
    /// Variables absent here run at `default_precision`.
    #[serde(default)]
    pub precision_map: HashMap<String, Precision>,

    /// The uniform default precision (the `precision` option).
    pub default_precision: Precision,

    /// The precision literal constants are rounded into.
    pub constants_precision: Precision,

    /// Which abstract domain computes the real-valued range.
    #[serde(default)]
    pub range_method: RangeMethod,

    /// Which abstract domain computes the roundoff error.
    #[serde(default)]
    pub error_method: ErrorMethod,

    /// `false` is the `noInitialErrors` option: do not seed missing input
    /// errors from input ranges even when `track_roundoff` is also set.
    #[serde(default = "default_true")]
    pub track_initial: bool,

    /// `false` is the `noRoundoff` option: disable per-operator roundoff
    /// accounting entirely (propagation of pre-existing errors still runs).
    #[serde(default = "default_true")]
    pub track_roundoff: bool,

    /// Selects [`Precision::abs_roundoff_cheated`] (truncation model) over
    /// [`Precision::abs_roundoff`] (rounding model) for every new roundoff
    /// term, per the specification's Open Questions.
    #[serde(default)]
    pub cheated: bool,
}

fn default_true() -> bool {
    true
}

impl Configuration {
    /// A configuration that tracks both initial and operator-introduced
    /// roundoff, at a uniform `precision`, using `interval` ranges and
    /// `affine` errors - the defaults the six §8 regression scenarios are
    /// published against.
    pub fn uniform(precision: Precision) -> Self {
        Self {
            input_ranges: HashMap::new(),
            input_errors: HashMap::new(),
            precision_map: HashMap::new(),
            default_precision: precision,
            constants_precision: precision,
            range_method: RangeMethod::Interval,
            error_method: ErrorMethod::Affine,
            track_initial: true,
            track_roundoff: true,
            cheated: false,
        }
    }

    /// Adds (or replaces) one parameter's input range.
    pub fn with_input_range(mut self, name: impl Into<String>, range: Interval) -> Self {
        self.input_ranges.insert(name.into(), range);
        self
    }

    /// Adds (or replaces) one parameter's explicit input error.
    pub fn with_input_error(mut self, name: impl Into<String>, error: Rational) -> Self {
        self.input_errors.insert(name.into(), error);
        self
    }

    /// Adds (or replaces) one parameter's precision override.
    pub fn with_precision_override(mut self, name: impl Into<String>, precision: Precision) -> Self {
        self.precision_map.insert(name.into(), precision);
        self
    }

    /// The precision a named variable runs at: its override if present,
    /// otherwise `default_precision`.
    pub fn precision_of(&self, name: &str) -> Precision {
        self.precision_map
            .get(name)
            .copied()
            .unwrap_or(self.default_precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_configuration_defaults_to_interval_range_affine_error() {
        let cfg = Configuration::uniform(Precision::Float64);
        assert_eq!(cfg.range_method, RangeMethod::Interval);
        assert_eq!(cfg.error_method, ErrorMethod::Affine);
        assert!(cfg.track_initial && cfg.track_roundoff);
    }

    #[test]
    fn precision_override_takes_priority_over_default() {
        let cfg = Configuration::uniform(Precision::Float64)
            .with_precision_override("x", Precision::Float32);
        assert_eq!(cfg.precision_of("x"), Precision::Float32);
        assert_eq!(cfg.precision_of("y"), Precision::Float64);
    }
}
