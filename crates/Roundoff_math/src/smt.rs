// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Roundoff: static floating-point roundoff-error analysis.
// Dual licensed under Apache 2.0 and MIT.
// See:
//      - LICENSE-APACHE.md
//      - LICENSE-MIT.md
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

//! Interval ranges carrying polynomial side-constraints, for optional
//! refinement by an external SMT backend.
//!
//! Everyday arithmetic on an [`SmtRange`] is plain interval arithmetic; the
//! constraint list is carried along unevaluated, for a driver to hand to an
//! [`SmtBackend`] at the end of an analysis in an attempt to tighten the
//! range beyond what interval arithmetic alone can prove.

use crate::interval::Interval;
use Roundoff_error::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};

/// An opaque polynomial constraint, passed verbatim to an [`SmtBackend`].
/// This crate never parses or interprets the constraint text itself - that
/// is the backend's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint(pub String);

/// An interval range together with whatever polynomial constraints were
/// accumulated on the path that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmtRange {
    interval: Interval,
    constraints: Vec<Constraint>,
}

impl SmtRange {
    /// Lifts a plain interval into a constraint-free range.
    pub fn from_interval(interval: Interval) -> Self {
        Self {
            interval,
            constraints: Vec::new(),
        }
    }

    /// The interval bound, ignoring any unrefined constraints.
    pub fn interval(&self) -> &Interval {
        &self.interval
    }

    /// The constraints accumulated so far.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Appends a constraint without touching the interval bound.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    fn union_constraints(&self, other: &Self) -> Vec<Constraint> {
        let mut out = self.constraints.clone();
        for c in &other.constraints {
            if !out.contains(c) {
                out.push(c.clone());
            }
        }
        out
    }

    /// Asks `backend` to refine this range's interval bound using its
    /// constraints. On timeout or any backend error, the caller is expected
    /// to degrade to the unrefined interval and log an `SmtTimeout` advisory
    /// rather than fail the whole analysis.
    pub fn refine(&self, backend: &dyn SmtBackend, function: &str) -> AnalysisResult<Self> {
        match backend.refine(&self.interval, &self.constraints) {
            Ok(interval) => Ok(Self {
                interval,
                constraints: self.constraints.clone(),
            }),
            Err(_) => Err(AnalysisError::SmtTimeout {
                function: function.to_string(),
            }),
        }
    }

    pub(crate) fn add(&self, other: &Self) -> Self {
        Self {
            interval: self.interval.add(&other.interval),
            constraints: self.union_constraints(other),
        }
    }

    pub(crate) fn sub(&self, other: &Self) -> Self {
        Self {
            interval: self.interval.sub(&other.interval),
            constraints: self.union_constraints(other),
        }
    }

    pub(crate) fn neg(&self) -> Self {
        Self {
            interval: self.interval.neg(),
            constraints: self.constraints.clone(),
        }
    }

    pub(crate) fn mul(&self, other: &Self) -> Self {
        Self {
            interval: self.interval.mul(&other.interval),
            constraints: self.union_constraints(other),
        }
    }

    pub(crate) fn div(&self, other: &Self) -> Option<Self> {
        let interval = self.interval.div(&other.interval)?;
        Some(Self {
            interval,
            constraints: self.union_constraints(other),
        })
    }

    pub(crate) fn sqrt(&self) -> Option<Self> {
        Some(Self {
            interval: self.interval.sqrt()?,
            constraints: self.constraints.clone(),
        })
    }

    pub(crate) fn pow(&self, n: u32) -> Self {
        Self {
            interval: self.interval.pow(n),
            constraints: self.constraints.clone(),
        }
    }
}

/// The external collaborator that refines an [`SmtRange`]'s interval bound
/// using its accumulated constraints. Satisfying an actual SMT query is out
/// of scope for this analysis; this trait is the seam at which a real
/// backend (an SMT solver binding, or a remote solver service) is expected
/// to be plugged in.
pub trait SmtBackend: Send + Sync {
    /// Attempts to tighten `interval` given `constraints`. Returns the
    /// original interval, or a strictly tighter sound enclosure of it. `Err`
    /// signals the backend could not answer in time, which callers treat as
    /// an `SmtTimeout` advisory rather than a hard failure.
    fn refine(&self, interval: &Interval, constraints: &[Constraint]) -> Result<Interval, ()>;
}

/// A backend that never refines anything: returns the interval unchanged.
/// The default when no real SMT backend is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpSmtBackend;

impl SmtBackend for NoOpSmtBackend {
    fn refine(&self, interval: &Interval, _constraints: &[Constraint]) -> Result<Interval, ()> {
        Ok(interval.clone())
    }
}
