//! The token definition for the WHERE-clause language.

/// A token is a single unit of the language, with a specific kind and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}

/// The kind of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    // Keywords
    And,     // "AND"
    Or,      // "OR"
    Not,     // "NOT"
    In,      // "IN"
    Is,      // "IS"
    Null,    // "NULL"
    Between, // "BETWEEN"
    Like,    // "LIKE"
    Case,    // "CASE"
    When,    // "WHEN"
    Then,    // "THEN"
    Else,    // "ELSE"
    End,     // "END"
    True,    // "TRUE"
    False,   // "FALSE"
    Cast,    // "CAST"
    As,      // "AS"

    // Literals
    Identifier(&'a str),
    QuotedIdentifier(&'a str), // Content of "..." or `...`, without the quotes
    String(&'a str),           // Content of '...', `''` escapes still in place
    Number(&'a str),           // The raw digits, e.g. "10" or "1.5"

    // Punctuation
    LParen, // (
    RParen, // )
    Comma,  // ,
    Dot,    // .

    // Operators
    Eq,      // =
    NotEq,   // !=
    LtGt,    // <>
    Gt,      // >
    Lt,      // <
    Gte,     // >=
    Lte,     // <=
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %

    // Special
    Illegal, // An illegal/unknown character or an unterminated literal
}

/// Represents a span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// The starting byte offset.
    pub start: usize,
    /// The ending byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
