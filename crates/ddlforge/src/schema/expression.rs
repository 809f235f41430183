//! Structured expressions for column defaults and check predicates.
//!
//! Defaults and check conditions are kept as trees, never as raw SQL text, so
//! each dialect renders them through its normal expression path (identifier
//! quoting included) instead of patching strings after the fact.

use serde::{Deserialize, Serialize};

/// A scalar literal inside an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    /// SQL NULL.
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Integer(i64),
    /// Floating-point literal.
    Float(f64),
    /// String literal (stored unescaped).
    Text(String),
    /// Symbolic keyword (e.g. `current_timestamp`), rendered upper-cased with
    /// dashes replaced by spaces.
    Keyword(String),
}

/// A dialect-neutral expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// A scalar literal.
    Scalar(Scalar),
    /// A reference to an identifier (column name), quoted on render.
    Identifier(String),
    /// A function call.
    Call {
        /// Function name, rendered as-is (lowercase by convention).
        name: String,
        /// Ordered arguments.
        args: Vec<Expression>,
    },
    /// An operator application: infix for two or more operands, prefix for
    /// exactly one.
    Op {
        /// Operator token (`>=`, `and`, `not`, ...).
        op: String,
        /// Ordered operands.
        args: Vec<Expression>,
    },
}

impl Expression {
    /// An integer literal.
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Self::Scalar(Scalar::Integer(value))
    }

    /// A float literal.
    #[must_use]
    pub fn float(value: f64) -> Self {
        Self::Scalar(Scalar::Float(value))
    }

    /// A string literal.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::Text(value.into()))
    }

    /// A boolean literal.
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }

    /// A symbolic keyword such as `current_timestamp` or `now`.
    #[must_use]
    pub fn keyword(name: impl Into<String>) -> Self {
        Self::Scalar(Scalar::Keyword(name.into()))
    }

    /// An identifier reference.
    #[must_use]
    pub fn identifier(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    /// A function call.
    #[must_use]
    pub fn call(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Self::Call {
            name: name.into(),
            args,
        }
    }

    /// An operator application.
    #[must_use]
    pub fn op(op: impl Into<String>, args: Vec<Expression>) -> Self {
        Self::Op {
            op: op.into(),
            args,
        }
    }

    /// Collects the identifier names referenced anywhere in this expression.
    pub fn referenced_identifiers(&self, out: &mut std::collections::BTreeSet<String>) {
        match self {
            Self::Scalar(_) => {}
            Self::Identifier(name) => {
                out.insert(name.clone());
            }
            Self::Call { args, .. } | Self::Op { args, .. } => {
                for arg in args {
                    arg.referenced_identifiers(out);
                }
            }
        }
    }
}
