//! Source of expression trees for the transformer.

use crate::ast::Node;
use crate::lexer::Lexer;
use crate::parser::{ParseError, Parser};

/// Parses WHERE-clause text into an expression tree.
///
/// Returns `Ok(None)` when the text holds no expression. Implementations are
/// called through `&self` and must not rely on state kept between calls.
pub trait AstProvider {
    fn parse_where(&self, where_clause: &str) -> Result<Option<Node>, ParseError>;
}

/// The built-in provider: [`Lexer`] followed by [`Parser`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlWhereParser;

impl AstProvider for SqlWhereParser {
    fn parse_where(&self, where_clause: &str) -> Result<Option<Node>, ParseError> {
        let tokens: Vec<_> = Lexer::new(where_clause).collect();
        Parser::new(&tokens).parse()
    }
}

impl<P: AstProvider + ?Sized> AstProvider for &P {
    fn parse_where(&self, where_clause: &str) -> Result<Option<Node>, ParseError> {
        (**self).parse_where(where_clause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;

    #[test]
    fn test_builtin_provider() {
        let node = SqlWhereParser.parse_where("a = 1").unwrap();
        assert_eq!(
            node,
            Some(Node::binary(BinaryOp::Eq, Node::column("a"), Node::number(1)))
        );
    }

    #[test]
    fn test_builtin_provider_empty() {
        assert_eq!(SqlWhereParser.parse_where("  ").unwrap(), None);
    }

    #[test]
    fn test_provider_through_reference() {
        fn parse_with<P: AstProvider>(provider: P, text: &str) -> Result<Option<Node>, ParseError> {
            provider.parse_where(text)
        }
        let provider = SqlWhereParser;
        assert!(parse_with(&provider, "a = ").is_err());
    }
}
