// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Roundoff: static floating-point roundoff-error analysis.
// Dual licensed under Apache 2.0 and MIT.
// See:
//      - LICENSE-APACHE.md
//      - LICENSE-MIT.md
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

//! The error taxonomy shared by every crate in the workspace.
//!
//! All fallible operations in `Roundoff_math` and `Roundoff_core` return
//! `Result<T, AnalysisError>`. There is exactly one error type in the
//! workspace; collaborators add context (function name, node id) as they
//! bubble a failure upward, they never wrap it in a second enum.

#![forbid(missing_docs)]

use thiserror::Error;

/// Every way an analysis can fail.
///
/// `DivisionByZero` and `NegativeSqrt` are recoverable by the driver (it may
/// subdivide the offending input's range and retry). `UnboundVariable` and
/// `UnsupportedOperator` indicate a programming error in the caller and are
/// always fatal. `Overflow` and `SmtTimeout` are advisory: the driver logs
/// them and keeps the (degraded, for `SmtTimeout`) result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// A division whose divisor range (or divisor range widened by its
    /// roundoff error) contains zero.
    #[error("division by zero: divisor range contains 0 at node {node_id}")]
    DivisionByZero {
        /// Identity of the `Divide` node that triggered the failure.
        node_id: u64,
    },

    /// A `sqrt` whose argument range's lower bound is negative.
    #[error("negative sqrt: argument range has a negative lower bound at node {node_id}")]
    NegativeSqrt {
        /// Identity of the `Sqrt` node that triggered the failure.
        node_id: u64,
    },

    /// An expression referenced a variable absent from the input map.
    #[error("unbound variable: {name} (id {id})")]
    UnboundVariable {
        /// Name hint of the missing identifier.
        name: String,
        /// Globally unique id of the missing identifier.
        id: u64,
    },

    /// An operator outside the defined expression-language grammar.
    #[error("unsupported operator encountered at node {node_id}")]
    UnsupportedOperator {
        /// Identity of the offending node.
        node_id: u64,
    },

    /// The computed result range exceeds the target precision's largest
    /// finite magnitude. Advisory only — not a failure of the analyzer.
    #[error("result range for {function} may overflow {precision} (maxAbs = {max_abs})")]
    Overflow {
        /// Name of the function being analyzed.
        function: String,
        /// Name of the precision the overflow check was performed against.
        precision: String,
        /// The result range's `maxAbs`, as an `f64` (outward rounded).
        max_abs: f64,
    },

    /// The SMT backend did not return a refined range in time; the driver
    /// degrades to the unrefined interval result.
    #[error("SMT backend timed out refining {function}, degrading to interval range")]
    SmtTimeout {
        /// Name of the function being analyzed.
        function: String,
    },
}

/// Convenience alias used throughout the workspace.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
