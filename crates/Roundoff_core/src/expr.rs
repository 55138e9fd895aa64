// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Roundoff: static floating-point roundoff-error analysis.
// Dual licensed under Apache 2.0 and MIT.
// See:
//      - LICENSE-APACHE.md
//      - LICENSE-MIT.md
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

//! The numeric-kernel expression tree, and the node-identity scheme the
//! evaluators memoize against.

use crate::identifier::Identifier;
use Roundoff_math::Precision;
use Roundoff_math::Rational;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// A stable integer assigned to an expression-tree node at construction
/// time. Evaluators key their memoization caches on this, not on structural
/// equality of the subtree, so that two syntactically identical
/// sub-expressions appearing at different points in the tree (which do
/// *not* share a cache entry, because floating-point evaluation is not
/// referentially transparent once roundoff is involved) are evaluated
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    fn fresh() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw integer, for embedding in `AnalysisError` variants.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation. Exact: IEEE 754 negation introduces no rounding.
    Neg,
    /// Square root.
    Sqrt,
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
}

/// A real-valued numeric-kernel expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// An exact literal constant.
    Constant { id: NodeId, value: Rational },
    /// A reference to a bound variable.
    Variable { id: NodeId, ident: Identifier },
    /// `let ident [: cast] = value in body`.
    ///
    /// `cast`, when present, is a mixed-precision override: the value is
    /// rounded to `cast` once, at the binding site, rather than at the
    /// ambient precision the rest of the function runs at.
    Let {
        id: NodeId,
        ident: Identifier,
        value: Box<Expr>,
        body: Box<Expr>,
        cast: Option<Precision>,
    },
    /// A unary operator applied to an operand.
    Unary {
        id: NodeId,
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// A binary operator applied to two operands.
    Binary {
        id: NodeId,
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Integer exponentiation `base^n`.
    Pow { id: NodeId, base: Box<Expr>, n: u32 },
}

impl Expr {
    /// A literal constant.
    pub fn constant(value: Rational) -> Self {
        Self::Constant {
            id: NodeId::fresh(),
            value,
        }
    }

    /// A reference to `ident`.
    pub fn variable(ident: Identifier) -> Self {
        Self::Variable {
            id: NodeId::fresh(),
            ident,
        }
    }

    /// `let ident = value in body`, at the ambient precision.
    pub fn let_in(ident: Identifier, value: Expr, body: Expr) -> Self {
        Self::Let {
            id: NodeId::fresh(),
            ident,
            value: Box::new(value),
            body: Box::new(body),
            cast: None,
        }
    }

    /// `let ident: cast = value in body`, rounding `value` to `cast` once
    /// at the binding site.
    pub fn let_cast(ident: Identifier, cast: Precision, value: Expr, body: Expr) -> Self {
        Self::Let {
            id: NodeId::fresh(),
            ident,
            value: Box::new(value),
            body: Box::new(body),
            cast: Some(cast),
        }
    }

    /// `-operand`.
    pub fn neg(operand: Expr) -> Self {
        Self::Unary {
            id: NodeId::fresh(),
            op: UnaryOp::Neg,
            operand: Box::new(operand),
        }
    }

    /// `sqrt(operand)`.
    pub fn sqrt(operand: Expr) -> Self {
        Self::Unary {
            id: NodeId::fresh(),
            op: UnaryOp::Sqrt,
            operand: Box::new(operand),
        }
    }

    /// `lhs + rhs`.
    pub fn add(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Add, lhs, rhs)
    }

    /// `lhs - rhs`.
    pub fn sub(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Sub, lhs, rhs)
    }

    /// `lhs * rhs`.
    pub fn mul(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Mul, lhs, rhs)
    }

    /// `lhs / rhs`.
    pub fn div(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Div, lhs, rhs)
    }

    fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Binary {
            id: NodeId::fresh(),
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// `base^n`.
    pub fn pow(base: Expr, n: u32) -> Self {
        Self::Pow {
            id: NodeId::fresh(),
            base: Box::new(base),
            n,
        }
    }

    /// This node's identity.
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Constant { id, .. }
            | Expr::Variable { id, .. }
            | Expr::Let { id, .. }
            | Expr::Unary { id, .. }
            | Expr::Binary { id, .. }
            | Expr::Pow { id, .. } => *id,
        }
    }
}
