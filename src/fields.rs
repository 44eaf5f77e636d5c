//! Column-name resolution against caller-supplied field descriptors.

use crate::ast::ColumnRef;
use serde::{Deserialize, Serialize};

/// A field the caller knows about. Only `name` takes part in resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), label: None }
    }

    pub fn with_label(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self { name: name.into(), label: Some(label.into()) }
    }
}

/// Maps raw column identifiers to canonical field names.
///
/// Matching is exact and case-sensitive. Unknown columns, or any column when
/// no descriptors were supplied, keep their raw identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldResolver<'a> {
    descriptors: Option<&'a [FieldDescriptor]>,
}

impl<'a> FieldResolver<'a> {
    pub fn new(descriptors: Option<&'a [FieldDescriptor]>) -> Self {
        Self { descriptors }
    }

    pub fn lookup(&self, name: &str) -> Option<&'a FieldDescriptor> {
        self.descriptors?.iter().find(|field| field.name == name)
    }

    pub fn resolve(&self, name: &str) -> String {
        match self.lookup(name) {
            Some(field) => field.name.clone(),
            None => name.to_string(),
        }
    }

    /// Resolves on the bare column name; an unmatched qualified column keeps
    /// its `table.` prefix.
    pub fn resolve_column(&self, column: &ColumnRef) -> String {
        if let Some(field) = self.lookup(&column.column) {
            return field.name.clone();
        }
        match &column.table {
            Some(table) => format!("{}.{}", table, column.column),
            None => column.column.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptors() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::with_label("field1", "Field 1"),
            FieldDescriptor::new("score"),
        ]
    }

    #[test]
    fn test_resolves_known_field() {
        let fields = descriptors();
        let resolver = FieldResolver::new(Some(fields.as_slice()));
        assert_eq!(resolver.resolve("field1"), "field1");
        assert_eq!(resolver.lookup("field1").and_then(|f| f.label.as_deref()), Some("Field 1"));
    }

    #[test]
    fn test_unknown_field_keeps_raw_name() {
        let fields = descriptors();
        let resolver = FieldResolver::new(Some(fields.as_slice()));
        assert_eq!(resolver.resolve("discounted_price"), "discounted_price");
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let fields = descriptors();
        let resolver = FieldResolver::new(Some(fields.as_slice()));
        assert!(resolver.lookup("Score").is_none());
        assert_eq!(resolver.resolve("Score"), "Score");
    }

    #[test]
    fn test_without_descriptors() {
        let resolver = FieldResolver::default();
        assert!(resolver.lookup("field1").is_none());
        assert_eq!(resolver.resolve("field1"), "field1");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let fields = descriptors();
        let resolver = FieldResolver::new(Some(fields.as_slice()));
        let once = resolver.resolve("score");
        assert_eq!(resolver.resolve(&once), once);
    }

    #[test]
    fn test_qualified_column() {
        let fields = descriptors();
        let resolver = FieldResolver::new(Some(fields.as_slice()));

        let known = ColumnRef { table: Some("t".to_string()), column: "score".to_string() };
        assert_eq!(resolver.resolve_column(&known), "score");

        let unknown = ColumnRef { table: Some("t".to_string()), column: "other".to_string() };
        assert_eq!(resolver.resolve_column(&unknown), "t.other");
    }

    #[test]
    fn test_descriptor_json() {
        let parsed: Vec<FieldDescriptor> =
            serde_json::from_str(r#"[{"name":"a","label":"A"},{"name":"b"}]"#).unwrap();
        assert_eq!(parsed, vec![FieldDescriptor::with_label("a", "A"), FieldDescriptor::new("b")]);
    }
}
