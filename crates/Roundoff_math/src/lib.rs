// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Roundoff: static floating-point roundoff-error analysis.
// Dual licensed under Apache 2.0 and MIT.
// See:
//      - LICENSE-APACHE.md
//      - LICENSE-MIT.md
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

//! Exact arithmetic and the abstract numeric domains the analysis ranges
//! and roundoff errors are computed in: [`rational::Rational`],
//! [`interval::Interval`], [`affine::AffineForm`], [`precision::Precision`],
//! and [`smt::SmtRange`], unified behind the [`domain::AbstractDomain`]
//! capability trait.

#![forbid(missing_docs)]

pub mod affine;
pub mod domain;
pub mod interval;
pub mod precision;
pub mod rational;
pub mod smt;

pub use affine::{fresh_noise_id, AffineForm};
pub use domain::AbstractDomain;
pub use interval::Interval;
pub use precision::Precision;
pub use rational::Rational;
pub use smt::{Constraint, NoOpSmtBackend, SmtBackend, SmtRange};
