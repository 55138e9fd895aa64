// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Roundoff: static floating-point roundoff-error analysis.
// Dual licensed under Apache 2.0 and MIT.
// See:
//      - LICENSE-APACHE.md
//      - LICENSE-MIT.md
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

//! Minimal contracts for the collaborators named in §1's architecture but
//! left out of scope by the Non-goals: a source `Frontend`, a
//! `SpecsProcessor` that turns annotations into a [`crate::config::Configuration`],
//! a `Rewriter` that produces mixed-precision variants of a kernel, and a
//! `RelativeDriver` that runs the delta/epsilon relative-error encoding.
//!
//! This crate does not implement any of them - only the contract each one
//! must satisfy to plug into [`crate::driver::DataflowDriver`], per §10.5.
//! [`Roundoff_math::SmtBackend`] is re-exported here for the same reason:
//! the driver depends on the trait, never on a concrete solver.

use Roundoff_core::{Expr, Identifier};

pub use Roundoff_math::{NoOpSmtBackend, SmtBackend};

/// Parses a source file into one or more analyzable kernels.
///
/// Out of scope: this crate receives an already-parsed [`Expr`] and an
/// explicit parameter list: it never reads source text itself.
pub trait Frontend {
    /// One parsed kernel: its body and its ordered parameter list.
    type Kernel;

    /// Parses `source`, returning every kernel it defines.
    fn parse(&self, source: &str) -> Result<Vec<Self::Kernel>, String>;
}

/// Turns a kernel's in-source annotations (`@pre`, `@rnd`, ...) into a
/// [`crate::config::Configuration`] the driver can run with.
pub trait SpecsProcessor<K> {
    /// Builds the configuration a kernel's own annotations describe.
    fn process(&self, kernel: &K) -> crate::config::Configuration;
}

/// Produces one or more mixed-precision variants of a kernel, each a
/// candidate the driver can analyze and compare against an accuracy target.
pub trait Rewriter {
    /// A single candidate precision assignment, one entry per parameter
    /// identifier.
    type Variant;

    /// Generates candidate variants of `expr`, whose free variables are
    /// exactly `params`.
    fn rewrite(&self, expr: &Expr, params: &[Identifier]) -> Vec<Self::Variant>;
}

/// Runs the delta/epsilon relative-error encoding described in §4.6:
/// rewrites a kernel in terms of `fresh_delta`/`fresh_epsilon` auxiliary
/// identifiers standing for per-operation relative perturbations, then
/// analyzes the rewritten tree for a relative- rather than absolute-error
/// bound.
pub trait RelativeDriver {
    /// The relative-error bound produced for the given kernel.
    type Bound;

    /// Runs the relative-error analysis over `expr`.
    fn analyze_relative(&self, expr: &Expr, params: &[Identifier]) -> Self::Bound;
}
