//! Right-hand operand extraction.
//!
//! Every context (direct comparison, BETWEEN bounds, IN members) uses the
//! same rule: literals keep their native type with quotes stripped, function
//! calls and CASE expressions become their literal-mode SQL string.

use crate::ast::Node;
use crate::error::{Result, TransformError};
use crate::rules::Scalar;
use crate::serializer::ExpressionSerializer;

#[derive(Debug, Clone, Copy)]
pub struct ValueExtractor<'a> {
    serializer: ExpressionSerializer<'a>,
}

impl<'a> ValueExtractor<'a> {
    pub fn new(serializer: ExpressionSerializer<'a>) -> Self {
        Self { serializer }
    }

    pub fn scalar(&self, node: &Node) -> Result<Scalar> {
        match node {
            Node::String(value) => Ok(Scalar::String(value.clone())),
            Node::Number(number) => Ok(Scalar::Number(number.clone())),
            Node::Bool(value) => Ok(Scalar::Bool(*value)),
            Node::Function { .. } | Node::Case { .. } => {
                Ok(Scalar::String(self.serializer.literal(node)?))
            }
            Node::Paren(inner) => self.scalar(inner),
            other => Err(TransformError::UnsupportedValue(other.kind().to_string())),
        }
    }

    pub fn scalars(&self, nodes: &[Node]) -> Result<Vec<Scalar>> {
        nodes.iter().map(|node| self.scalar(node)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, WhenBranch};
    use crate::fields::FieldResolver;
    use serde_json::Number;

    fn extractor() -> ValueExtractor<'static> {
        ValueExtractor::new(ExpressionSerializer::new(FieldResolver::default()))
    }

    #[test]
    fn test_literals_keep_native_type() {
        let x = extractor();
        assert_eq!(x.scalar(&Node::number(10)).unwrap(), Scalar::from(10i64));
        assert_eq!(
            x.scalar(&Node::Number(Number::from_f64(2.5).unwrap())).unwrap(),
            Scalar::Number(Number::from_f64(2.5).unwrap())
        );
        assert_eq!(x.scalar(&Node::string("John%")).unwrap(), Scalar::from("John%"));
        assert_eq!(x.scalar(&Node::Bool(false)).unwrap(), Scalar::Bool(false));
    }

    #[test]
    fn test_parenthesized_literal_is_unwrapped() {
        let node = Node::Paren(Box::new(Node::number(7)));
        assert_eq!(extractor().scalar(&node).unwrap(), Scalar::from(7i64));
    }

    #[test]
    fn test_function_becomes_sql_string() {
        let node = Node::Function {
            name: "ifnull".to_string(),
            args: vec![Node::column("bonus"), Node::string("none")],
        };
        assert_eq!(extractor().scalar(&node).unwrap(), Scalar::from("IFNULL(bonus, 'none')"));
    }

    #[test]
    fn test_case_becomes_sql_string() {
        let node = Node::Case {
            operand: None,
            branches: vec![WhenBranch {
                condition: Node::binary(BinaryOp::Gt, Node::column("a"), Node::number(1)),
                result: Node::string("hi"),
            }],
            default: None,
        };
        assert_eq!(
            extractor().scalar(&node).unwrap(),
            Scalar::from("CASE WHEN (a > 1) THEN 'hi' END")
        );
    }

    #[test]
    fn test_unsupported_values() {
        let x = extractor();
        assert_eq!(
            x.scalar(&Node::column("other")),
            Err(TransformError::UnsupportedValue("column_ref".to_string()))
        );
        assert_eq!(
            x.scalar(&Node::Null),
            Err(TransformError::UnsupportedValue("null".to_string()))
        );
        let arithmetic = Node::binary(BinaryOp::Plus, Node::number(1), Node::number(2));
        assert_eq!(
            x.scalar(&arithmetic),
            Err(TransformError::UnsupportedValue("binary_expr".to_string()))
        );
    }

    #[test]
    fn test_scalars_preserve_order_and_types() {
        let nodes = vec![Node::string("USA"), Node::number(3), Node::Bool(true)];
        assert_eq!(
            extractor().scalars(&nodes).unwrap(),
            vec![Scalar::from("USA"), Scalar::from(3i64), Scalar::Bool(true)]
        );
    }
}
