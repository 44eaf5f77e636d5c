//! 由 [`AstProvider`](crate::provider::AstProvider) 产出的表达式树
//!
//! `IS NULL` / `IS NOT NULL` 可以编码为 [`Node::Unary`]
//! ([`UnaryOp::IsNull`] / [`UnaryOp::IsNotNull`])，也可以编码为
//! [`Node::Binary`] ([`BinaryOp::Is`] / [`BinaryOp::IsNot`]) 右侧为
//! [`Node::Null`]，右侧的 `Null` 还可能被 `NOT` 包裹。

use serde_json::Number;
use std::fmt;

/// WHERE 子句中的一个表达式节点
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// 逻辑运算, 例如：`left AND right`, `left OR right`
    Logical { op: LogicalOp, left: Box<Node>, right: Box<Node> },
    /// 比较、成员测试与算术运算；`BETWEEN` 和 `IN` 的右侧为 [`Node::List`]
    Binary { op: BinaryOp, left: Box<Node>, right: Box<Node> },
    Unary { op: UnaryOp, expr: Box<Node> },
    /// 使用括号分组的表达式
    Paren(Box<Node>),
    Column(ColumnRef),
    Number(Number),
    String(String),
    Bool(bool),
    Null,
    /// `IN` 之后的 `(a, b, ...)`，或 `BETWEEN` 的 `low AND high`
    List(Vec<Node>),
    Function { name: String, args: Vec<Node> },
    Case {
        operand: Option<Box<Node>>,
        branches: Vec<WhenBranch>,
        default: Option<Box<Node>>,
    },
    Cast { expr: Box<Node>, target: String },
}

impl Node {
    /// 节点类型名称，用于错误信息
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Logical { .. } => "logical_expr",
            Node::Binary { .. } => "binary_expr",
            Node::Unary { .. } => "unary_expr",
            Node::Paren(_) => "paren",
            Node::Column(_) => "column_ref",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::Bool(_) => "bool",
            Node::Null => "null",
            Node::List(_) => "expr_list",
            Node::Function { .. } => "function",
            Node::Case { .. } => "case",
            Node::Cast { .. } => "cast",
        }
    }

    pub fn column(name: impl Into<String>) -> Self {
        Node::Column(ColumnRef { table: None, column: name.into() })
    }

    pub fn string(value: impl Into<String>) -> Self {
        Node::String(value.into())
    }

    pub fn number(value: impl Into<Number>) -> Self {
        Node::Number(value.into())
    }

    pub fn binary(op: BinaryOp, left: Node, right: Node) -> Self {
        Node::Binary { op, left: Box::new(left), right: Box::new(right) }
    }

    pub fn logical(op: LogicalOp, left: Node, right: Node) -> Self {
        Node::Logical { op, left: Box::new(left), right: Box::new(right) }
    }

    pub fn unary(op: UnaryOp, expr: Node) -> Self {
        Node::Unary { op, expr: Box::new(expr) }
    }
}

/// 列引用, 例如：`score`, `t.score`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
}

/// CASE 表达式中的一个 `WHEN ... THEN ...` 分支
#[derive(Debug, Clone, PartialEq)]
pub struct WhenBranch {
    pub condition: Node,
    pub result: Node,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,         // =
    NotEq,      // !=
    LtGt,       // <>
    Gt,         // >
    Lt,         // <
    GtEq,       // >=
    LtEq,       // <=
    Like,       // LIKE
    NotLike,    // NOT LIKE
    Between,    // BETWEEN
    NotBetween, // NOT BETWEEN
    In,         // IN
    NotIn,      // NOT IN
    Is,         // IS
    IsNot,      // IS NOT
    Plus,       // +
    Minus,      // -
    Multiply,   // *
    Divide,     // /
    Modulo,     // %
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    IsNull,
    IsNotNull,
    Not,
    Minus,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        })
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "!=",
            BinaryOp::LtGt => "<>",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
            BinaryOp::GtEq => ">=",
            BinaryOp::LtEq => "<=",
            BinaryOp::Like => "LIKE",
            BinaryOp::NotLike => "NOT LIKE",
            BinaryOp::Between => "BETWEEN",
            BinaryOp::NotBetween => "NOT BETWEEN",
            BinaryOp::In => "IN",
            BinaryOp::NotIn => "NOT IN",
            BinaryOp::Is => "IS",
            BinaryOp::IsNot => "IS NOT",
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
        })
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::IsNull => "IS NULL",
            UnaryOp::IsNotNull => "IS NOT NULL",
            UnaryOp::Not => "NOT",
            UnaryOp::Minus => "-",
        })
    }
}
