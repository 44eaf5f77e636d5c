//! Converts SQL `WHERE` clauses into rule-group trees for query-builder UIs.
//!
//! ```text
//! "field1 > 10 AND name LIKE 'A%'"
//!   └─ AstProvider (Lexer → Parser)  → ast::Node
//!        └─ RuleBuilder              → rules::RuleGroup
//!             ├─ ExpressionSerializer  (fields for compound left sides)
//!             ├─ ValueExtractor        (right-hand values)
//!             └─ FieldResolver         (column names)
//! ```
//!
//! ```
//! use where_rule_group::{transform, FieldDescriptor};
//!
//! let fields = vec![FieldDescriptor::new("score")];
//! let group = transform("score BETWEEN 50 AND 100", Some(fields.as_slice())).unwrap();
//! assert_eq!(
//!     serde_json::to_string(&group).unwrap(),
//!     r#"{"combinator":"and","rules":[{"field":"score","operator":"between","value":[50,100]}]}"#
//! );
//! ```

pub mod ast;
pub mod config;
pub mod error;
pub mod fields;
pub mod lexer;
pub mod parser;
pub mod provider;
pub mod rule_builder;
pub mod rules;
pub mod serializer;
pub mod sql_formatter;
pub mod token;
pub mod value;

pub use error::TransformError;
pub use fields::FieldDescriptor;
pub use provider::{AstProvider, SqlWhereParser};
pub use rules::{Combinator, Operator, Rule, RuleGroup, RuleOrGroup, RuleValue, Scalar};

use ast::Node;
use rule_builder::RuleBuilder;
use tracing::debug;

/// Transforms WHERE-clause text with the built-in parser.
///
/// Blank input yields the empty AND group. Any unsupported construct fails
/// the whole call; parser errors are returned as [`TransformError::Parse`].
pub fn transform(
    where_clause: &str,
    fields: Option<&[FieldDescriptor]>,
) -> Result<RuleGroup, TransformError> {
    transform_with(&SqlWhereParser, where_clause, fields)
}

/// Same as [`transform`] with a caller-supplied [`AstProvider`].
/// The provider is not consulted for blank input.
pub fn transform_with<P: AstProvider + ?Sized>(
    provider: &P,
    where_clause: &str,
    fields: Option<&[FieldDescriptor]>,
) -> Result<RuleGroup, TransformError> {
    if where_clause.trim().is_empty() {
        debug!("blank where clause, returning empty rule group");
        return Ok(RuleGroup::empty());
    }

    debug!(len = where_clause.len(), "transforming where clause");
    let node = provider.parse_where(where_clause)?;
    transform_node(node.as_ref(), fields)
}

/// Transforms an already-parsed expression tree.
pub fn transform_node(
    node: Option<&Node>,
    fields: Option<&[FieldDescriptor]>,
) -> Result<RuleGroup, TransformError> {
    RuleBuilder::new(fields).build(node)
}
