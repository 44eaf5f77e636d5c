//! Turns an expression tree into a rule-group tree.
//!
//! ```text
//! build(node?)
//!   ├─ None → empty AND group
//!   └─ classify(node) → into_group()
//!        ├─ Logical AND/OR       → build_group() (left, right), never flattened
//!        ├─ Paren                → classify(inner)
//!        ├─ Binary / Unary       → leaf_shape() → build_leaf()
//!        │    ├─ BETWEEN          → Range
//!        │    ├─ IN / NOT IN      → Membership
//!        │    ├─ IS [NOT] NULL,
//!        │    │  IS NOT-over-NULL,
//!        │    │  unary IS [NOT] NULL → NullTest
//!        │    └─ other comparison → Comparison
//!        └─ anything else        → UnsupportedNode
//! ```

use crate::ast::{BinaryOp, LogicalOp, Node, UnaryOp};
use crate::error::{Result, TransformError};
use crate::fields::{FieldDescriptor, FieldResolver};
use crate::rules::{Combinator, Operator, Rule, RuleGroup, RuleOrGroup, RuleValue};
use crate::serializer::ExpressionSerializer;
use crate::value::ValueExtractor;
use tracing::trace;

/// Canonical form of a leaf condition. Every provider encoding of a null
/// test collapses into [`LeafShape::NullTest`] before a rule is built.
#[derive(Debug, Clone, Copy, PartialEq)]
enum LeafShape<'n> {
    Comparison { operator: Operator, value: &'n Node },
    Range { low: &'n Node, high: &'n Node },
    Membership { operator: Operator, members: &'n [Node] },
    NullTest { operator: Operator },
}

#[derive(Debug, Clone, Copy)]
pub struct RuleBuilder<'a> {
    serializer: ExpressionSerializer<'a>,
    values: ValueExtractor<'a>,
}

impl<'a> RuleBuilder<'a> {
    pub fn new(fields: Option<&'a [FieldDescriptor]>) -> Self {
        let serializer = ExpressionSerializer::new(FieldResolver::new(fields));
        Self {
            serializer,
            values: ValueExtractor::new(serializer),
        }
    }

    /// Builds the root group. An absent node yields the empty AND group and
    /// a bare leaf is wrapped in a one-element AND group.
    pub fn build(&self, node: Option<&Node>) -> Result<RuleGroup> {
        match node {
            None => Ok(RuleGroup::empty()),
            Some(node) => Ok(self.classify(node)?.into_group()),
        }
    }

    /// Classifies a single node into a group or a leaf rule.
    pub fn classify(&self, node: &Node) -> Result<RuleOrGroup> {
        trace!(kind = node.kind(), "classifying node");

        match node {
            Node::Logical { op, left, right } => {
                Ok(RuleOrGroup::Group(self.build_group(*op, left, right)?))
            }
            Node::Paren(inner) => self.classify(inner),
            Node::Binary { op, left, right } => {
                let shape = binary_shape(*op, right)?;
                Ok(RuleOrGroup::Rule(self.build_leaf(left, shape)?))
            }
            Node::Unary { op, expr } => {
                let shape = unary_shape(*op)?;
                Ok(RuleOrGroup::Rule(self.build_leaf(expr, shape)?))
            }
            other => Err(TransformError::UnsupportedNode(other.kind().to_string())),
        }
    }

    fn build_group(&self, op: LogicalOp, left: &Node, right: &Node) -> Result<RuleGroup> {
        let combinator = match op {
            LogicalOp::And => Combinator::And,
            LogicalOp::Or => Combinator::Or,
        };
        Ok(RuleGroup {
            combinator,
            rules: vec![self.classify(left)?, self.classify(right)?],
        })
    }

    fn build_leaf(&self, subject: &Node, shape: LeafShape<'_>) -> Result<Rule> {
        let field = self.serializer.serialize(subject, false)?;

        let (operator, value) = match shape {
            LeafShape::Comparison { operator, value } => {
                (operator, RuleValue::Scalar(self.values.scalar(value)?))
            }
            LeafShape::Range { low, high } => (
                Operator::Between,
                RuleValue::Range(self.values.scalar(low)?, self.values.scalar(high)?),
            ),
            LeafShape::Membership { operator, members } => {
                (operator, RuleValue::List(self.values.scalars(members)?))
            }
            LeafShape::NullTest { operator } => (operator, RuleValue::Null),
        };

        Ok(Rule { field, operator, value })
    }
}

fn binary_shape(op: BinaryOp, right: &Node) -> Result<LeafShape<'_>> {
    match op {
        BinaryOp::Between => match right {
            Node::List(bounds) => match bounds.as_slice() {
                [low, high] => Ok(LeafShape::Range { low, high }),
                _ => Err(TransformError::UnsupportedValue(right.kind().to_string())),
            },
            other => Err(TransformError::UnsupportedValue(other.kind().to_string())),
        },
        BinaryOp::In | BinaryOp::NotIn => match right {
            Node::List(members) => Ok(LeafShape::Membership {
                operator: if op == BinaryOp::In { Operator::In } else { Operator::NotIn },
                members,
            }),
            other => Err(TransformError::UnsupportedValue(other.kind().to_string())),
        },
        BinaryOp::Is | BinaryOp::IsNot => null_test_shape(op == BinaryOp::IsNot, right),
        _ => Ok(LeafShape::Comparison {
            operator: comparison_operator(op)?,
            value: right,
        }),
    }
}

/// `IS NULL`, `IS NOT NULL`, and `IS` against a `NOT`-wrapped null.
fn null_test_shape(negated: bool, right: &Node) -> Result<LeafShape<'static>> {
    let negated = match right {
        Node::Null => negated,
        Node::Unary { op: UnaryOp::Not, expr } if matches!(expr.as_ref(), Node::Null) => !negated,
        other => return Err(TransformError::UnsupportedValue(other.kind().to_string())),
    };

    let operator = if negated { Operator::NotNull } else { Operator::Null };
    Ok(LeafShape::NullTest { operator })
}

fn unary_shape(op: UnaryOp) -> Result<LeafShape<'static>> {
    match op {
        UnaryOp::IsNull => Ok(LeafShape::NullTest { operator: Operator::Null }),
        UnaryOp::IsNotNull => Ok(LeafShape::NullTest { operator: Operator::NotNull }),
        UnaryOp::Not | UnaryOp::Minus => {
            Err(TransformError::UnsupportedUnaryOperator(op.to_string()))
        }
    }
}

/// Maps a SQL comparison token to its canonical rule operator.
fn comparison_operator(op: BinaryOp) -> Result<Operator> {
    match op {
        BinaryOp::Eq => Ok(Operator::Eq),
        BinaryOp::NotEq | BinaryOp::LtGt => Ok(Operator::NotEq),
        BinaryOp::Gt => Ok(Operator::Gt),
        BinaryOp::Lt => Ok(Operator::Lt),
        BinaryOp::GtEq => Ok(Operator::Gte),
        BinaryOp::LtEq => Ok(Operator::Lte),
        BinaryOp::Like => Ok(Operator::Like),
        BinaryOp::NotLike => Ok(Operator::NotLike),
        other => Err(TransformError::UnsupportedOperator(other.to_string())),
    }
}
