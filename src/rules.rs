//! Rule-group tree handed to query-builder UIs.
//!
//! Serializes to the JSON shape those UIs consume:
//!
//! ```json
//! { "combinator": "and",
//!   "rules": [ { "field": "score", "operator": "between", "value": [50, 100] } ] }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleGroup {
    pub combinator: Combinator,
    pub rules: Vec<RuleOrGroup>,
}

impl RuleGroup {
    /// The "no condition" group produced for an absent WHERE clause.
    pub fn empty() -> Self {
        Self { combinator: Combinator::And, rules: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleGroup {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RuleOrGroup {
    Group(RuleGroup),
    Rule(Rule),
}

impl RuleOrGroup {
    /// Wraps a bare leaf into a one-element AND group; groups pass through.
    pub fn into_group(self) -> RuleGroup {
        match self {
            RuleOrGroup::Group(group) => group,
            RuleOrGroup::Rule(rule) => RuleGroup {
                combinator: Combinator::And,
                rules: vec![RuleOrGroup::Rule(rule)],
            },
        }
    }
}

impl From<Rule> for RuleOrGroup {
    fn from(rule: Rule) -> Self {
        RuleOrGroup::Rule(rule)
    }
}

impl From<RuleGroup> for RuleOrGroup {
    fn from(group: RuleGroup) -> Self {
        RuleOrGroup::Group(group)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub field: String,
    pub operator: Operator,
    pub value: RuleValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    And,
    Or,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Combinator::And => "and",
            Combinator::Or => "or",
        })
    }
}

/// Canonical operator tokens, independent of the SQL spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "like")]
    Like,
    #[serde(rename = "notLike")]
    NotLike,
    #[serde(rename = "between")]
    Between,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "notIn")]
    NotIn,
    #[serde(rename = "null")]
    Null,
    #[serde(rename = "notNull")]
    NotNull,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Lte => "<=",
            Operator::Gte => ">=",
            Operator::Like => "like",
            Operator::NotLike => "notLike",
            Operator::Between => "between",
            Operator::In => "in",
            Operator::NotIn => "notIn",
            Operator::Null => "null",
            Operator::NotNull => "notNull",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single literal on the right-hand side of a rule. Serialized SQL
/// fragments (function calls, CASE) travel as [`Scalar::String`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(Number),
    String(String),
    Bool(bool),
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RuleValue {
    /// Null tests carry no value.
    Null,
    Scalar(Scalar),
    /// `BETWEEN low AND high`, in source order.
    Range(Scalar, Scalar),
    /// `IN` / `NOT IN` members, in source order.
    List(Vec<Scalar>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(field: &str, operator: Operator, value: RuleValue) -> Rule {
        Rule { field: field.to_string(), operator, value }
    }

    #[test]
    fn test_rule_json_shape() {
        let group = RuleGroup {
            combinator: Combinator::Or,
            rules: vec![
                rule("score", Operator::Between, RuleValue::Range(50i64.into(), 100i64.into())).into(),
                rule("country", Operator::NotIn, RuleValue::List(vec!["USA".into(), "Canada".into()])).into(),
                rule("field1", Operator::NotNull, RuleValue::Null).into(),
                rule("active", Operator::Eq, RuleValue::Scalar(true.into())).into(),
            ],
        };

        assert_eq!(
            serde_json::to_value(&group).unwrap(),
            json!({
                "combinator": "or",
                "rules": [
                    { "field": "score", "operator": "between", "value": [50, 100] },
                    { "field": "country", "operator": "notIn", "value": ["USA", "Canada"] },
                    { "field": "field1", "operator": "notNull", "value": null },
                    { "field": "active", "operator": "=", "value": true },
                ]
            })
        );
    }

    #[test]
    fn test_operator_tokens_match_serde_names() {
        let all = [
            Operator::Eq, Operator::NotEq, Operator::Lt, Operator::Gt, Operator::Lte,
            Operator::Gte, Operator::Like, Operator::NotLike, Operator::Between,
            Operator::In, Operator::NotIn, Operator::Null, Operator::NotNull,
        ];
        for op in all {
            assert_eq!(serde_json::to_value(op).unwrap(), json!(op.as_str()));
        }
    }

    #[test]
    fn test_into_group_wraps_leaf() {
        let leaf = rule("field1", Operator::Gt, RuleValue::Scalar(10i64.into()));
        let group = RuleOrGroup::from(leaf.clone()).into_group();
        assert_eq!(group.combinator, Combinator::And);
        assert_eq!(group.rules, vec![RuleOrGroup::Rule(leaf)]);
    }

    #[test]
    fn test_into_group_keeps_group() {
        let inner = RuleGroup {
            combinator: Combinator::Or,
            rules: vec![rule("a", Operator::Eq, RuleValue::Scalar(1i64.into())).into()],
        };
        assert_eq!(RuleOrGroup::from(inner.clone()).into_group(), inner);
    }

    #[test]
    fn test_empty_group() {
        let group = RuleGroup::default();
        assert!(group.is_empty());
        assert_eq!(
            serde_json::to_value(&group).unwrap(),
            json!({ "combinator": "and", "rules": [] })
        );
    }
}
