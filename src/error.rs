use crate::parser::ParseError;
use thiserror::Error;

/// Failures raised while turning an expression tree into a rule group.
/// Each variant names the construct that could not be handled.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("Unsupported node type: {0}")]
    UnsupportedNode(String),

    #[error("Unsupported SQL operator: {0}")]
    UnsupportedOperator(String),

    #[error("Unsupported function: {0}")]
    UnsupportedFunction(String),

    #[error("Unsupported expression node: {0}")]
    UnsupportedExpression(String),

    #[error("Unsupported value node: {0}")]
    UnsupportedValue(String),

    #[error("Unsupported unary operator: {0}")]
    UnsupportedUnaryOperator(String),

    /// Syntax errors from the AST provider, passed through untouched.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

pub type Result<T> = std::result::Result<T, TransformError>;
