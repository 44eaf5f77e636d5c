//! WHERE 子句的语法分析器
//!
//! ## 解析流程图
//!
//! ```text
//! parse()
//!   ├─ 空输入 → None
//!   └─ parse_expression()
//!        └─ parse_or_expression()
//!             ├─ parse_and_expression()
//!             │    ├─ parse_not_expression()
//!             │    │    └─ parse_predicate()
//!             │    │         ├─ parse_additive()
//!             │    │         │    └─ parse_multiplicative()
//!             │    │         │         └─ parse_unary()
//!             │    │         │              └─ parse_primary()
//!             │    │         │                   ├─ "(" → 括号表达式 (递归调用parse_expression)
//!             │    │         │                   ├─ 字面值 / 列引用 / 函数调用
//!             │    │         │                   ├─ "CASE" → parse_case()
//!             │    │         │                   └─ "CAST" → parse_cast()
//!             │    │         │
//!             │    │         ├─ 比较运算符 / [NOT] LIKE → 右侧 parse_additive()
//!             │    │         ├─ [NOT] IN → 值列表
//!             │    │         ├─ [NOT] BETWEEN → low AND high
//!             │    │         └─ IS [NOT] → NULL / TRUE / FALSE
//!             │    │
//!             │    └─ 遇到AND时，继续解析右侧NOT表达式
//!             │
//!             └─ 遇到OR时，继续解析右侧AND表达式
//! ```
//!
//! ## 语法优先级（从高到低）
//!
//! 1. **括号分组** `(expression)`
//! 2. **一元负号** `-expression`
//! 3. **乘除取模** `*`, `/`, `%`
//! 4. **加减** `+`, `-`
//! 5. **谓词** `=`, `!=`, `<>`, `<`, `>`, `<=`, `>=`, `LIKE`, `IN`, `BETWEEN`, `IS`
//! 6. **NOT操作** `NOT expression`
//! 7. **AND操作** `expr1 AND expr2`
//! 8. **OR操作** `expr1 OR expr2`
//!
//! AND 与 OR 均为左结合：`a AND b AND c` 解析为 `(a AND b) AND c`。
//!
//! ## 空值检查的编码
//!
//! `x IS NULL` 解析为 `Binary { op: Is, right: Null }`，
//! `x IS NOT NULL` 解析为 `Binary { op: IsNot, right: Null }`。
//!
//! ## 嵌套深度
//!
//! 括号、函数参数、CASE、NOT 与一元正负号都会递归；嵌套超过
//! [`MAX_NESTING_DEPTH`] 层时返回 `ParseError`，不会耗尽栈空间。

use crate::ast::{BinaryOp, ColumnRef, LogicalOp, Node, UnaryOp, WhenBranch};
use crate::token::{Span, Token, TokenKind};
use serde_json::Number;
use thiserror::Error;

/// 允许的最大嵌套层数
pub const MAX_NESTING_DEPTH: usize = 128;

pub struct Parser<'a> {
    tokens: &'a [Token<'a>],
    position: usize,
    depth: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Option<Span>,
}

impl ParseError {
    fn new(message: String, span: Option<Span>) -> Self {
        Self { message, span }
    }

    fn at_position(message: String, span: Span) -> Self {
        Self { message, span: Some(span) }
    }
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    /// 在加深一层嵌套的情况下执行 `f`，超过上限时报错
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            let message = format!("Expression nesting exceeds maximum depth of {}", MAX_NESTING_DEPTH);
            return Err(match self.peek() {
                Some(token) => ParseError::at_position(message, token.span),
                None => ParseError::new(message, None),
            });
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// 返回当前 token，不推进位置
    fn peek(&self) -> Option<&'a Token<'a>> {
        self.tokens.get(self.position)
    }

    /// 返回当前 token 之后的 token，不推进位置
    fn peek_next(&self) -> Option<&'a Token<'a>> {
        self.tokens.get(self.position + 1)
    }

    /// 返回当前 token 并推进位置
    fn advance(&mut self) -> Option<&'a Token<'a>> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    /// 期望特定类型的 token 并推进，否则返回错误
    fn expect(&mut self, expected: TokenKind) -> Result<&'a Token<'a>, ParseError> {
        match self.peek() {
            Some(token) if std::mem::discriminant(&token.kind) == std::mem::discriminant(&expected) => {
                self.position += 1;
                Ok(token)
            }
            Some(token) => Err(ParseError::at_position(
                format!("Expected {:?}, but found {:?}", expected, token.kind),
                token.span,
            )),
            None => Err(ParseError::new(
                format!("Expected {:?}, but reached end of input", expected),
                None,
            )),
        }
    }

    /// 检查当前 token 是否匹配给定类型
    fn match_token(&self, kind: &TokenKind) -> bool {
        self.peek()
            .is_some_and(|token| std::mem::discriminant(&token.kind) == std::mem::discriminant(kind))
    }

    /// 解析整个输入；没有任何 token 时返回 `None`
    pub fn parse(&mut self) -> Result<Option<Node>, ParseError> {
        if self.peek().is_none() {
            return Ok(None);
        }

        let expr = self.parse_expression()?;

        if let Some(token) = self.peek() {
            return Err(ParseError::at_position(
                format!("Unexpected token: {:?}", token.kind),
                token.span,
            ));
        }

        Ok(Some(expr))
    }

    fn parse_expression(&mut self) -> Result<Node, ParseError> {
        self.nested(Self::parse_or_expression)
    }

    /// 解析OR表达式 (最低优先级)
    ///
    /// 语法: `and_expr (OR and_expr)*`
    fn parse_or_expression(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_and_expression()?;

        while self.match_token(&TokenKind::Or) {
            self.advance(); // 消费 OR
            let right = self.parse_and_expression()?;
            left = Node::logical(LogicalOp::Or, left, right);
        }

        Ok(left)
    }

    /// 解析AND表达式
    ///
    /// 语法: `not_expr (AND not_expr)*`
    fn parse_and_expression(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_not_expression()?;

        while self.match_token(&TokenKind::And) {
            self.advance(); // 消费 AND
            let right = self.parse_not_expression()?;
            left = Node::logical(LogicalOp::And, left, right);
        }

        Ok(left)
    }

    /// 解析NOT表达式
    ///
    /// 语法: `NOT* predicate`
    fn parse_not_expression(&mut self) -> Result<Node, ParseError> {
        if self.match_token(&TokenKind::Not) {
            self.advance(); // 消费 NOT
            let expr = self.nested(Self::parse_not_expression)?; // 允许 NOT 链式调用
            Ok(Node::unary(UnaryOp::Not, expr))
        } else {
            self.parse_predicate()
        }
    }

    /// 解析谓词：比较、LIKE、IN、BETWEEN、IS
    fn parse_predicate(&mut self) -> Result<Node, ParseError> {
        let left = self.parse_additive()?;

        let Some(token) = self.peek() else {
            return Ok(left);
        };

        let op = match &token.kind {
            TokenKind::Eq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::NotEq,
            TokenKind::LtGt => BinaryOp::LtGt,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::Gte => BinaryOp::GtEq,
            TokenKind::Lte => BinaryOp::LtEq,
            TokenKind::Like => BinaryOp::Like,
            TokenKind::In => BinaryOp::In,
            TokenKind::Between => BinaryOp::Between,
            TokenKind::Is => return self.parse_is(left),
            TokenKind::Not => match self.peek_next().map(|t| &t.kind) {
                Some(TokenKind::Like) => BinaryOp::NotLike,
                Some(TokenKind::In) => BinaryOp::NotIn,
                Some(TokenKind::Between) => BinaryOp::NotBetween,
                _ => return Ok(left),
            },
            _ => return Ok(left),
        };

        if matches!(op, BinaryOp::NotLike | BinaryOp::NotIn | BinaryOp::NotBetween) {
            self.advance(); // 消费 NOT
        }
        self.advance(); // 消费运算符

        let right = match op {
            BinaryOp::In | BinaryOp::NotIn => self.parse_value_list()?,
            BinaryOp::Between | BinaryOp::NotBetween => self.parse_between_bounds()?,
            _ => self.parse_additive()?,
        };

        Ok(Node::binary(op, left, right))
    }

    /// `IS [NOT] NULL`, `IS [NOT] TRUE`, `IS [NOT] FALSE`
    fn parse_is(&mut self, left: Node) -> Result<Node, ParseError> {
        self.advance(); // 消费 IS
        let op = if self.match_token(&TokenKind::Not) {
            self.advance(); // 消费 NOT
            BinaryOp::IsNot
        } else {
            BinaryOp::Is
        };

        let right = match self.advance() {
            Some(Token { kind: TokenKind::Null, .. }) => Node::Null,
            Some(Token { kind: TokenKind::True, .. }) => Node::Bool(true),
            Some(Token { kind: TokenKind::False, .. }) => Node::Bool(false),
            Some(token) => {
                return Err(ParseError::at_position(
                    format!("Expected NULL, TRUE or FALSE after IS, but found {:?}", token.kind),
                    token.span,
                ))
            }
            None => {
                return Err(ParseError::new(
                    "Expected NULL, TRUE or FALSE after IS, but reached end of input".to_string(),
                    None,
                ))
            }
        };

        Ok(Node::binary(op, left, right))
    }

    /// 解析 IN 之后的值列表 `(v1, v2, ...)`，至少包含一个值
    fn parse_value_list(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenKind::LParen)?;
        let values = self.parse_comma_separated()?;
        self.expect(TokenKind::RParen)?;
        Ok(Node::List(values))
    }

    /// 解析 BETWEEN 之后的 `low AND high`
    fn parse_between_bounds(&mut self) -> Result<Node, ParseError> {
        let low = self.parse_additive()?;
        self.expect(TokenKind::And)?;
        let high = self.parse_additive()?;
        Ok(Node::List(vec![low, high]))
    }

    fn parse_comma_separated(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut items = vec![self.parse_expression()?];
        while self.match_token(&TokenKind::Comma) {
            self.advance(); // 消费 ,
            items.push(self.parse_expression()?);
        }
        Ok(items)
    }

    /// 语法: `multiplicative ((+|-) multiplicative)*`
    fn parse_additive(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Plus) => BinaryOp::Plus,
                Some(TokenKind::Minus) => BinaryOp::Minus,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Node::binary(op, left, right);
        }

        Ok(left)
    }

    /// 语法: `unary ((*|/|%) unary)*`
    fn parse_multiplicative(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Star) => BinaryOp::Multiply,
                Some(TokenKind::Slash) => BinaryOp::Divide,
                Some(TokenKind::Percent) => BinaryOp::Modulo,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Node::binary(op, left, right);
        }

        Ok(left)
    }

    /// 一元负号；紧跟数字时直接折叠为负数字面值
    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        match self.peek() {
            Some(minus) if minus.kind == TokenKind::Minus => {
                self.advance(); // 消费 -
                if let Some(Token { kind: TokenKind::Number(text), span }) = self.peek() {
                    self.advance();
                    let span = Span::new(minus.span.start, span.end);
                    return Ok(Node::Number(parse_number(text, true, span)?));
                }
                let expr = self.nested(Self::parse_unary)?;
                Ok(Node::unary(UnaryOp::Minus, expr))
            }
            Some(plus) if plus.kind == TokenKind::Plus => {
                self.advance(); // 一元正号没有语义
                self.nested(Self::parse_unary)
            }
            _ => self.parse_primary(),
        }
    }

    /// 解析基础表达式 (最高优先级)
    ///
    /// 支持的表达式类型:
    /// - `(expression)` - 括号表达式
    /// - 数字、字符串、TRUE/FALSE、NULL 字面值
    /// - `column`, `table.column`, `"quoted column"` - 列引用
    /// - `name(arg, ...)` - 函数调用
    /// - `CASE ... END`, `CAST(expr AS type)`
    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        let Some(token) = self.advance() else {
            return Err(ParseError::new(
                "Expected expression, but reached end of input".to_string(),
                None,
            ));
        };

        match &token.kind {
            TokenKind::LParen => {
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(Node::Paren(Box::new(expr)))
            }
            TokenKind::Number(text) => Ok(Node::Number(parse_number(text, false, token.span)?)),
            TokenKind::String(raw) => Ok(Node::String(raw.replace("''", "'"))),
            TokenKind::True => Ok(Node::Bool(true)),
            TokenKind::False => Ok(Node::Bool(false)),
            TokenKind::Null => Ok(Node::Null),
            TokenKind::Case => self.parse_case(),
            TokenKind::Cast => self.parse_cast(),
            TokenKind::Identifier(name) => {
                if self.match_token(&TokenKind::LParen) {
                    self.advance(); // 消费 (
                    self.parse_function(name)
                } else {
                    self.parse_column(name)
                }
            }
            TokenKind::QuotedIdentifier(name) => self.parse_column(name),
            other => Err(ParseError::at_position(
                format!("Expected expression, but found {:?}", other),
                token.span,
            )),
        }
    }

    /// 列引用，可带表名前缀 `table.column`
    fn parse_column(&mut self, first: &str) -> Result<Node, ParseError> {
        if !self.match_token(&TokenKind::Dot) {
            return Ok(Node::column(first));
        }
        self.advance(); // 消费 .

        match self.advance() {
            Some(Token { kind: TokenKind::Identifier(column) | TokenKind::QuotedIdentifier(column), .. }) => {
                Ok(Node::Column(ColumnRef {
                    table: Some(first.to_string()),
                    column: column.to_string(),
                }))
            }
            Some(token) => Err(ParseError::at_position(
                format!("Expected column name after '.', but found {:?}", token.kind),
                token.span,
            )),
            None => Err(ParseError::new(
                "Expected column name after '.', but reached end of input".to_string(),
                None,
            )),
        }
    }

    /// 函数调用的参数列表；开始的 `(` 已经被消费
    fn parse_function(&mut self, name: &str) -> Result<Node, ParseError> {
        let args = if self.match_token(&TokenKind::RParen) {
            Vec::new()
        } else {
            self.parse_comma_separated()?
        };
        self.expect(TokenKind::RParen)?;

        Ok(Node::Function { name: name.to_string(), args })
    }

    /// `CASE [operand] WHEN c THEN r ... [ELSE e] END`；CASE 已经被消费
    fn parse_case(&mut self) -> Result<Node, ParseError> {
        let operand = if self.match_token(&TokenKind::When) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        let mut branches = Vec::new();
        while self.match_token(&TokenKind::When) {
            self.advance(); // 消费 WHEN
            let condition = self.parse_expression()?;
            self.expect(TokenKind::Then)?;
            let result = self.parse_expression()?;
            branches.push(WhenBranch { condition, result });
        }

        if branches.is_empty() {
            // 至少需要一个 WHEN 分支
            self.expect(TokenKind::When)?;
        }

        let default = if self.match_token(&TokenKind::Else) {
            self.advance(); // 消费 ELSE
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        self.expect(TokenKind::End)?;

        Ok(Node::Case { operand, branches, default })
    }

    /// `CAST(expr AS type[(n[, m])])`；CAST 已经被消费
    fn parse_cast(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenKind::LParen)?;
        let expr = self.parse_expression()?;
        self.expect(TokenKind::As)?;

        let mut target = match self.advance() {
            Some(Token { kind: TokenKind::Identifier(name), .. }) => name.to_ascii_uppercase(),
            Some(token) => {
                return Err(ParseError::at_position(
                    format!("Expected type name after AS, but found {:?}", token.kind),
                    token.span,
                ))
            }
            None => {
                return Err(ParseError::new(
                    "Expected type name after AS, but reached end of input".to_string(),
                    None,
                ))
            }
        };

        if self.match_token(&TokenKind::LParen) {
            self.advance(); // 消费 (
            let mut params = Vec::new();
            loop {
                match self.advance() {
                    Some(Token { kind: TokenKind::Number(n), .. }) => params.push(*n),
                    Some(token) => {
                        return Err(ParseError::at_position(
                            format!("Expected type parameter, but found {:?}", token.kind),
                            token.span,
                        ))
                    }
                    None => {
                        return Err(ParseError::new(
                            "Expected type parameter, but reached end of input".to_string(),
                            None,
                        ))
                    }
                }
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
                self.advance(); // 消费 ,
            }
            self.expect(TokenKind::RParen)?;
            target = format!("{}({})", target, params.join(", "));
        }

        self.expect(TokenKind::RParen)?;

        Ok(Node::Cast { expr: Box::new(expr), target })
    }
}

/// 将数字文本转换为 JSON 数字：能表示为 i64 或 u64 的保持整数，否则按浮点数处理
fn parse_number(text: &str, negative: bool, span: Span) -> Result<Number, ParseError> {
    let literal = if negative {
        format!("-{}", text)
    } else {
        text.to_string()
    };

    if let Ok(n) = literal.parse::<i64>() {
        return Ok(Number::from(n));
    }

    if let Ok(n) = literal.parse::<u64>() {
        return Ok(Number::from(n));
    }

    literal
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| ParseError::at_position(format!("Invalid number literal: {}", literal), span))
}
