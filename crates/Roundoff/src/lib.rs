//! Roundoff: static floating-point roundoff-error analysis for real-valued
//! numeric kernels.
//!
//! Dual licensed under Apache 2.0 and MIT.
//!
//! See:
//! - LICENSE-APACHE.md
//! - LICENSE-MIT.md
//!
//! # Installation
//!
//! In your Rust project's root directory, simply run:
//!
//! ```bash
//! cargo add Roundoff
//! ```
//!
//! This will add the latest version to your project.
//!
//! If you require a specific version, add the following to your Cargo.toml file:
//!
//! ```toml
//! [dependencies]
//! Roundoff = "*"
//! ```
//!
//! replacing `"*"` with the version number you require, such as `"0.1.0"`.

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// GLOBAL SETTINGS
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

// Strictly enforce documentation.
#![forbid(missing_docs)]
//
// When writing mathematical equations in documentation, Clippy suggests to
// put backticks inside the LaTeX block. This suppresses that behavior.
#![allow(clippy::doc_markdown)]
//
// Allow snake case.
// Much of this library is named after the mathematical notation of the
// papers it implements.
#![allow(non_snake_case)]
//
// Strictly enforce SAFETY comments.
// There is no unsafe code currently, but for anyone to add any, it must be
// documented with a SAFETY comment.
#![forbid(clippy::undocumented_unsafe_blocks)]

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// ROUNDOFF MODULES
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// The Roundoff prelude.
pub mod prelude {
    pub use Roundoff_core::*;
    pub use Roundoff_driver::*;
    pub use Roundoff_enums::*;
    pub use Roundoff_error::*;
    pub use Roundoff_math::*;
    pub use Roundoff_utils::*;
}

/// The `core` module: the expression tree and the range/roundoff
/// evaluators that walk it.
pub mod core {
    pub use Roundoff_core::*;
}

/// The `driver` module: the dataflow driver wiring the evaluators and
/// abstract domains together into per-function and per-batch entry points.
pub mod driver {
    pub use Roundoff_driver::*;
}

/// The `enums` module: the small configuration enumerations (`RangeMethod`,
/// `ErrorMethod`) shared across the crate.
pub mod enums {
    pub use Roundoff_enums::*;
}

/// The `error` module.
pub mod error {
    pub use Roundoff_error::*;
}

/// The `math` module: exact rational arithmetic and the interval, affine
/// and SMT-backed abstract domains.
pub mod math {
    pub use Roundoff_math::*;
}

/// The `utils` module.
#[macro_use]
pub mod utils {
    pub use Roundoff_utils::*;
}
