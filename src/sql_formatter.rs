//! Renders a rule group back into SQL using sea-query.
//!
//! Used to check that a transformed tree still reads as the condition it came
//! from. Plain identifiers become quoted columns; serialized expression fields
//! are passed through verbatim as custom expressions.
//!
//! A string value that reads back as a whole `COALESCE`/`IFNULL` call or a
//! `CASE` expression was produced from an expression operand and is emitted
//! unquoted. A string literal whose text happens to be such an expression is
//! indistinguishable in the rule tree and is emitted the same way.

use crate::ast::Node;
use crate::provider::{AstProvider, SqlWhereParser};
use crate::rules::{Combinator, Operator, Rule, RuleGroup, RuleOrGroup, RuleValue, Scalar};
use sea_query::{Asterisk, Cond, Condition, Expr, Iden, PostgresQueryBuilder, SelectStatement, SimpleExpr, Value};
use thiserror::Error;

/// Table name used when the caller does not pick one.
pub const DEFAULT_TABLE: &str = "dummy";

/// Represents a table identifier for sea-query
#[derive(Debug, Clone)]
pub struct TableName(pub String);

impl Iden for TableName {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        let _ = s.write_str(&self.0);
    }
}

/// Column identifier wrapper
#[derive(Debug, Clone)]
pub struct ColumnName(pub String);

impl Iden for ColumnName {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        let _ = s.write_str(&self.0);
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// The rule's value does not have the shape its operator needs.
    #[error("operator {operator} cannot take value {value}")]
    ValueShape { operator: Operator, value: String },
}

/// Formats rule groups as `SELECT * FROM "<table>" WHERE ...`
#[derive(Debug, Clone)]
pub struct SqlFormatter {
    table: String,
}

impl Default for SqlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlFormatter {
    pub fn new() -> Self {
        Self::with_table(DEFAULT_TABLE)
    }

    pub fn with_table(table: impl Into<String>) -> Self {
        Self { table: table.into() }
    }

    /// Full SELECT statement; an empty group produces no WHERE clause.
    pub fn format(&self, group: &RuleGroup) -> Result<String, FormatError> {
        let mut select = SelectStatement::new();
        select.column(Asterisk).from(TableName(self.table.clone()));

        if !group.is_empty() {
            select.cond_where(self.group_condition(group)?);
        }

        Ok(select.to_string(PostgresQueryBuilder))
    }

    /// Only the condition text after `WHERE`; empty for an empty group.
    pub fn format_where(&self, group: &RuleGroup) -> Result<String, FormatError> {
        let sql = self.format(group)?;
        Ok(sql
            .split_once(" WHERE ")
            .map(|(_, condition)| condition.to_string())
            .unwrap_or_default())
    }

    fn group_condition(&self, group: &RuleGroup) -> Result<Condition, FormatError> {
        let mut condition = match group.combinator {
            Combinator::And => Cond::all(),
            Combinator::Or => Cond::any(),
        };

        for item in &group.rules {
            condition = match item {
                RuleOrGroup::Group(nested) => condition.add(self.group_condition(nested)?),
                RuleOrGroup::Rule(rule) => condition.add(self.rule_expr(rule)?),
            };
        }

        Ok(condition)
    }

    fn rule_expr(&self, rule: &Rule) -> Result<SimpleExpr, FormatError> {
        let subject = if is_plain_identifier(&rule.field) {
            Expr::col(ColumnName(rule.field.clone()))
        } else {
            Expr::expr(Expr::cust(rule.field.clone()))
        };

        let expr = match (rule.operator, &rule.value) {
            (Operator::Eq, RuleValue::Scalar(v)) => subject.eq(operand(v)),
            (Operator::NotEq, RuleValue::Scalar(v)) => subject.ne(operand(v)),
            (Operator::Gt, RuleValue::Scalar(v)) => subject.gt(operand(v)),
            (Operator::Lt, RuleValue::Scalar(v)) => subject.lt(operand(v)),
            (Operator::Gte, RuleValue::Scalar(v)) => subject.gte(operand(v)),
            (Operator::Lte, RuleValue::Scalar(v)) => subject.lte(operand(v)),
            (Operator::Like, RuleValue::Scalar(v)) => subject.like(scalar_text(v)),
            (Operator::NotLike, RuleValue::Scalar(v)) => subject.not_like(scalar_text(v)),
            (Operator::Between, RuleValue::Range(low, high)) => {
                subject.between(operand(low), operand(high))
            }
            (Operator::In, RuleValue::List(values)) => subject.is_in(values.iter().map(operand)),
            (Operator::NotIn, RuleValue::List(values)) => {
                subject.is_not_in(values.iter().map(operand))
            }
            (Operator::Null, RuleValue::Null) => subject.is_null(),
            (Operator::NotNull, RuleValue::Null) => subject.is_not_null(),
            (operator, value) => {
                return Err(FormatError::ValueShape {
                    operator,
                    value: format!("{:?}", value),
                })
            }
        };

        Ok(expr)
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_plain_identifier(field: &str) -> bool {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Right-hand operand: serialized function / CASE values stay SQL,
/// everything else is bound as a value.
fn operand(scalar: &Scalar) -> SimpleExpr {
    match scalar {
        Scalar::String(text) if is_serialized_expression(text) => Expr::cust(text.clone()),
        _ => to_value(scalar).into(),
    }
}

fn is_serialized_expression(text: &str) -> bool {
    matches!(
        SqlWhereParser.parse_where(text),
        Ok(Some(Node::Function { .. } | Node::Case { .. }))
    )
}

/// Convert a rule scalar to sea-query Value
fn to_value(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::String(s) => Value::String(Some(Box::new(s.clone()))),
        Scalar::Bool(b) => Value::Bool(Some(*b)),
        Scalar::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::BigInt(Some(i))
            } else if let Some(u) = n.as_u64() {
                Value::BigUnsigned(Some(u))
            } else {
                Value::Double(n.as_f64())
            }
        }
    }
}

fn scalar_text(scalar: &Scalar) -> String {
    match scalar {
        Scalar::String(s) => s.clone(),
        Scalar::Number(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    }
}
