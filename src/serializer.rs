//! Renders sub-expressions back into canonical SQL fragments.
//!
//! A rule only has a flat `(field, operator, value)` shape, so anything richer
//! than a bare column on the left, or a function / CASE on the right, travels
//! as a re-parsable SQL string produced here.
//!
//! Rendering rules:
//!
//! | node                  | output                                   |
//! |-----------------------|------------------------------------------|
//! | column                | resolved field name, never quoted        |
//! | string                | bare, or `'quoted'` in literal mode      |
//! | number                | numeric text                             |
//! | boolean / null        | `TRUE`, `FALSE`, `NULL`                  |
//! | binary / logical      | `(left op right)`, operands as literals  |
//! | `COALESCE` / `IFNULL` | `NAME(arg, ...)`, arguments as literals  |
//! | CASE                  | `CASE WHEN c THEN r ... [ELSE e] END`    |

use crate::ast::{BinaryOp, Node, UnaryOp, WhenBranch};
use crate::error::{Result, TransformError};
use crate::fields::FieldResolver;

/// Function names that may appear inside a serialized expression.
const SUPPORTED_FUNCTIONS: [&str; 2] = ["COALESCE", "IFNULL"];

#[derive(Debug, Clone, Copy)]
pub struct ExpressionSerializer<'a> {
    fields: FieldResolver<'a>,
}

impl<'a> ExpressionSerializer<'a> {
    pub fn new(fields: FieldResolver<'a>) -> Self {
        Self { fields }
    }

    /// Serializes `node`. With `as_literal` set, string leaves are
    /// single-quoted; nested operands are always rendered in literal mode.
    pub fn serialize(&self, node: &Node, as_literal: bool) -> Result<String> {
        match node {
            Node::Column(column) => Ok(self.fields.resolve_column(column)),
            Node::String(value) if as_literal => Ok(quote(value)),
            Node::String(value) => Ok(value.clone()),
            Node::Number(number) => Ok(number.to_string()),
            Node::Bool(true) => Ok("TRUE".to_string()),
            Node::Bool(false) => Ok("FALSE".to_string()),
            Node::Null => Ok("NULL".to_string()),
            Node::Paren(inner) => self.serialize(inner, as_literal),
            Node::Binary { op, left, right } => self.serialize_binary(*op, left, right),
            Node::Logical { op, left, right } => Ok(format!(
                "({} {} {})",
                self.literal(left)?,
                op,
                self.literal(right)?
            )),
            Node::Unary { op, expr } => self.serialize_unary(*op, expr),
            Node::Function { name, args } => self.serialize_function(name, args),
            Node::Case { operand, branches, default } => {
                self.serialize_case(operand.as_deref(), branches, default.as_deref())
            }
            Node::List(_) | Node::Cast { .. } => {
                Err(TransformError::UnsupportedExpression(node.kind().to_string()))
            }
        }
    }

    /// Shorthand for literal-mode serialization.
    pub fn literal(&self, node: &Node) -> Result<String> {
        self.serialize(node, true)
    }

    fn serialize_binary(&self, op: BinaryOp, left: &Node, right: &Node) -> Result<String> {
        let left = self.literal(left)?;

        match op {
            BinaryOp::Between | BinaryOp::NotBetween => match right {
                Node::List(bounds) if bounds.len() == 2 => Ok(format!(
                    "({} {} {} AND {})",
                    left,
                    op,
                    self.literal(&bounds[0])?,
                    self.literal(&bounds[1])?
                )),
                other => Err(TransformError::UnsupportedExpression(other.kind().to_string())),
            },
            BinaryOp::In | BinaryOp::NotIn => match right {
                Node::List(items) => Ok(format!("({} {} ({}))", left, op, self.join_literals(items)?)),
                other => Err(TransformError::UnsupportedExpression(other.kind().to_string())),
            },
            _ => Ok(format!("({} {} {})", left, op, self.literal(right)?)),
        }
    }

    fn serialize_unary(&self, op: UnaryOp, expr: &Node) -> Result<String> {
        let inner = self.literal(expr)?;
        Ok(match op {
            UnaryOp::Not => format!("NOT {}", inner),
            UnaryOp::Minus => format!("-{}", inner),
            UnaryOp::IsNull | UnaryOp::IsNotNull => format!("({} {})", inner, op),
        })
    }

    fn serialize_function(&self, name: &str, args: &[Node]) -> Result<String> {
        let name = name.to_ascii_uppercase();
        if !SUPPORTED_FUNCTIONS.contains(&name.as_str()) {
            return Err(TransformError::UnsupportedFunction(name));
        }
        Ok(format!("{}({})", name, self.join_literals(args)?))
    }

    fn serialize_case(
        &self,
        operand: Option<&Node>,
        branches: &[WhenBranch],
        default: Option<&Node>,
    ) -> Result<String> {
        let mut sql = String::from("CASE");

        if let Some(operand) = operand {
            sql.push(' ');
            sql.push_str(&self.literal(operand)?);
        }

        for branch in branches {
            sql.push_str(" WHEN ");
            sql.push_str(&self.literal(&branch.condition)?);
            sql.push_str(" THEN ");
            sql.push_str(&self.literal(&branch.result)?);
        }

        if let Some(default) = default {
            sql.push_str(" ELSE ");
            sql.push_str(&self.literal(default)?);
        }

        sql.push_str(" END");
        Ok(sql)
    }

    fn join_literals(&self, nodes: &[Node]) -> Result<String> {
        let parts = nodes
            .iter()
            .map(|node| self.literal(node))
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(", "))
    }
}

/// Single-quotes a string, doubling embedded quotes.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ColumnRef, LogicalOp};
    use crate::fields::FieldDescriptor;

    fn serializer() -> ExpressionSerializer<'static> {
        ExpressionSerializer::new(FieldResolver::default())
    }

    fn case_when(condition: Node, result: Node, default: Option<Node>) -> Node {
        Node::Case {
            operand: None,
            branches: vec![WhenBranch { condition, result }],
            default: default.map(Box::new),
        }
    }

    #[test]
    fn test_string_quoting_follows_literal_flag() {
        let s = serializer();
        assert_eq!(s.serialize(&Node::string("A"), false).unwrap(), "A");
        assert_eq!(s.serialize(&Node::string("A"), true).unwrap(), "'A'");
        assert_eq!(s.serialize(&Node::string("O'Brien"), true).unwrap(), "'O''Brien'");
    }

    #[test]
    fn test_scalars_are_never_quoted() {
        let s = serializer();
        assert_eq!(s.literal(&Node::number(42)).unwrap(), "42");
        assert_eq!(s.literal(&Node::number(-3)).unwrap(), "-3");
        assert_eq!(s.literal(&Node::Bool(true)).unwrap(), "TRUE");
        assert_eq!(s.literal(&Node::Bool(false)).unwrap(), "FALSE");
        assert_eq!(s.literal(&Node::Null).unwrap(), "NULL");
        assert_eq!(s.literal(&Node::column("price")).unwrap(), "price");
    }

    #[test]
    fn test_nested_arithmetic() {
        let node = Node::binary(
            BinaryOp::Multiply,
            Node::Paren(Box::new(Node::binary(
                BinaryOp::Plus,
                Node::column("field1"),
                Node::column("field2"),
            ))),
            Node::number(2),
        );
        assert_eq!(serializer().serialize(&node, false).unwrap(), "((field1 + field2) * 2)");
    }

    #[test]
    fn test_case_with_else() {
        let node = case_when(
            Node::binary(BinaryOp::Gt, Node::column("field1"), Node::number(10)),
            Node::string("A"),
            Some(Node::string("B")),
        );
        assert_eq!(
            serializer().serialize(&node, false).unwrap(),
            "CASE WHEN (field1 > 10) THEN 'A' ELSE 'B' END"
        );
    }

    #[test]
    fn test_case_without_else_omits_clause() {
        let node = case_when(
            Node::binary(BinaryOp::Eq, Node::column("tier"), Node::string("gold")),
            Node::number(1),
            None,
        );
        assert_eq!(
            serializer().literal(&node).unwrap(),
            "CASE WHEN (tier = 'gold') THEN 1 END"
        );
    }

    #[test]
    fn test_simple_case_keeps_operand() {
        let node = Node::Case {
            operand: Some(Box::new(Node::column("tier"))),
            branches: vec![WhenBranch { condition: Node::number(1), result: Node::string("gold") }],
            default: Some(Box::new(Node::string("other"))),
        };
        assert_eq!(
            serializer().literal(&node).unwrap(),
            "CASE tier WHEN 1 THEN 'gold' ELSE 'other' END"
        );
    }

    #[test]
    fn test_coalesce_and_ifnull() {
        let s = serializer();
        let coalesce = Node::Function {
            name: "coalesce".to_string(),
            args: vec![Node::column("field2"), Node::column("field3"), Node::string("default")],
        };
        assert_eq!(s.serialize(&coalesce, false).unwrap(), "COALESCE(field2, field3, 'default')");

        let ifnull = Node::Function {
            name: "IfNull".to_string(),
            args: vec![Node::column("score"), Node::number(0)],
        };
        assert_eq!(s.serialize(&ifnull, false).unwrap(), "IFNULL(score, 0)");
    }

    #[test]
    fn test_case_inside_coalesce() {
        let node = Node::Function {
            name: "COALESCE".to_string(),
            args: vec![
                Node::column("discounted_price"),
                case_when(
                    Node::binary(BinaryOp::Eq, Node::column("field1"), Node::string("electronics")),
                    Node::number(100),
                    Some(Node::number(50)),
                ),
            ],
        };
        assert_eq!(
            serializer().literal(&node).unwrap(),
            "COALESCE(discounted_price, CASE WHEN (field1 = 'electronics') THEN 100 ELSE 50 END)"
        );
    }

    #[test]
    fn test_unknown_function_is_rejected() {
        let node = Node::Function { name: "myfunc".to_string(), args: vec![Node::column("a")] };
        assert_eq!(
            serializer().literal(&node),
            Err(TransformError::UnsupportedFunction("MYFUNC".to_string()))
        );
    }

    #[test]
    fn test_cast_and_bare_list_are_rejected() {
        let cast = Node::Cast { expr: Box::new(Node::column("a")), target: "CHAR".to_string() };
        assert_eq!(
            serializer().literal(&cast),
            Err(TransformError::UnsupportedExpression("cast".to_string()))
        );
        assert_eq!(
            serializer().literal(&Node::List(vec![Node::number(1)])),
            Err(TransformError::UnsupportedExpression("expr_list".to_string()))
        );
    }

    #[test]
    fn test_predicates_inside_expressions() {
        let s = serializer();
        let between = Node::binary(
            BinaryOp::Between,
            Node::column("score"),
            Node::List(vec![Node::number(1), Node::number(5)]),
        );
        assert_eq!(s.literal(&between).unwrap(), "(score BETWEEN 1 AND 5)");

        let in_list = Node::binary(
            BinaryOp::NotIn,
            Node::column("status"),
            Node::List(vec![Node::string("a"), Node::string("b")]),
        );
        assert_eq!(s.literal(&in_list).unwrap(), "(status NOT IN ('a', 'b'))");

        let logical = Node::logical(
            LogicalOp::Or,
            Node::binary(BinaryOp::Is, Node::column("a"), Node::Null),
            Node::unary(UnaryOp::IsNotNull, Node::column("b")),
        );
        assert_eq!(s.literal(&logical).unwrap(), "((a IS NULL) OR (b IS NOT NULL))");

        let negated = Node::unary(UnaryOp::Not, Node::unary(UnaryOp::Minus, Node::column("x")));
        assert_eq!(s.literal(&negated).unwrap(), "NOT -x");
    }

    #[test]
    fn test_columns_resolve_through_descriptors() {
        let fields = vec![FieldDescriptor::new("price")];
        let s = ExpressionSerializer::new(FieldResolver::new(Some(fields.as_slice())));
        let qualified = Node::Column(ColumnRef {
            table: Some("p".to_string()),
            column: "price".to_string(),
        });
        assert_eq!(s.literal(&qualified).unwrap(), "price");
    }
}
