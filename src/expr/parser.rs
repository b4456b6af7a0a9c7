use super::lexer::{Token, TokenKind, tokenize};
use super::{BinaryOp, Expr, ExprError, UnaryOp};
use crate::env::Value;

/// Deepest allowed nesting of parentheses and unary operators
const MAX_DEPTH: usize = 256;

/// Parse a guard expression into an AST
pub fn parse(input: &str) -> Result<Expr, ExprError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.len(),
        depth: 0,
    };

    let expr = parser.parse_or()?;
    if let Some(token) = parser.peek() {
        return Err(ExprError::new("unexpected trailing input", token.offset));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn offset(&self) -> usize {
        self.peek().map(|t| t.offset).unwrap_or(self.end)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), ExprError> {
        match self.peek_kind() {
            Some(k) if *k == kind => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(ExprError::new(format!("expected {what}"), self.offset())),
        }
    }

    /// Run `f` one nesting level deeper, failing past `MAX_DEPTH`
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, ExprError>) -> Result<T, ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::new("expression nested too deeply", self.offset()));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_and()?;
        while self.peek_kind() == Some(&TokenKind::OrOr) {
            self.pos += 1;
            let rhs = self.parse_and()?;
            lhs = Expr::binary(BinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_comparison()?;
        while self.peek_kind() == Some(&TokenKind::AndAnd) {
            self.pos += 1;
            let rhs = self.parse_comparison()?;
            lhs = Expr::binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExprError> {
        let lhs = self.parse_unary()?;
        let op = match self.peek_kind() {
            Some(TokenKind::EqEq) => BinaryOp::Eq,
            Some(TokenKind::NotEq) => BinaryOp::Ne,
            Some(TokenKind::Lt) => BinaryOp::Lt,
            Some(TokenKind::Le) => BinaryOp::Le,
            Some(TokenKind::Gt) => BinaryOp::Gt,
            Some(TokenKind::Ge) => BinaryOp::Ge,
            _ => return Ok(lhs),
        };
        self.pos += 1;
        let rhs = self.parse_unary()?;
        Ok(Expr::binary(op, lhs, rhs))
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        match self.peek_kind() {
            Some(TokenKind::Bang) => {
                self.pos += 1;
                let inner = self.nested(Self::parse_unary)?;
                Ok(Expr::Unary(UnaryOp::Not, Box::new(inner)))
            }
            Some(TokenKind::Minus) => {
                self.pos += 1;
                let inner = self.nested(Self::parse_unary)?;
                Ok(Expr::Unary(UnaryOp::Neg, Box::new(inner)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let offset = self.offset();
        let Some(token) = self.advance() else {
            return Err(ExprError::new("expected expression", offset));
        };

        match token.kind {
            TokenKind::Number(n) => Ok(Expr::Literal(Value::Number(n))),
            TokenKind::Str(s) => Ok(Expr::Literal(Value::String(s))),
            TokenKind::LParen => {
                let inner = self.nested(Self::parse_or)?;
                self.expect(TokenKind::RParen, "`)`")?;
                Ok(inner)
            }
            TokenKind::Ident(name) => match name.as_str() {
                "true" => Ok(Expr::Literal(Value::Bool(true))),
                "false" => Ok(Expr::Literal(Value::Bool(false))),
                "null" => Ok(Expr::Literal(Value::Null)),
                "undefined" => Ok(Expr::Literal(Value::Undefined)),
                "defined" => self.parse_defined(),
                _ => Ok(Expr::Ident(name)),
            },
            _ => Err(ExprError::new("expected expression", offset)),
        }
    }

    /// `defined(NAME)` or `defined NAME`
    fn parse_defined(&mut self) -> Result<Expr, ExprError> {
        let parenthesized = self.peek_kind() == Some(&TokenKind::LParen);
        if parenthesized {
            self.pos += 1;
        }

        let offset = self.offset();
        let name = match self.advance().map(|t| t.kind) {
            Some(TokenKind::Ident(name)) => name,
            _ => return Err(ExprError::new("expected identifier after `defined`", offset)),
        };

        if parenthesized {
            self.expect(TokenKind::RParen, "`)`")?;
        }
        Ok(Expr::Defined(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Expr {
        Expr::Ident(name.to_string())
    }

    #[test]
    fn test_precedence() {
        let expr = parse("A || B && C").unwrap();
        assert_eq!(
            expr,
            Expr::binary(BinaryOp::Or, ident("A"), Expr::binary(BinaryOp::And, ident("B"), ident("C")))
        );
    }

    #[test]
    fn test_parentheses() {
        let expr = parse("(A || B) && C").unwrap();
        assert_eq!(
            expr,
            Expr::binary(BinaryOp::And, Expr::binary(BinaryOp::Or, ident("A"), ident("B")), ident("C"))
        );
    }

    #[test]
    fn test_comparison_binds_tighter_than_and() {
        let expr = parse("MODE == 'dev' && !TEST").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::And,
                Expr::binary(BinaryOp::Eq, ident("MODE"), Expr::Literal(Value::from("dev"))),
                Expr::Unary(UnaryOp::Not, Box::new(ident("TEST"))),
            )
        );
    }

    #[test]
    fn test_defined_forms() {
        assert_eq!(parse("defined(DEV)").unwrap(), Expr::Defined("DEV".to_string()));
        assert_eq!(parse("defined DEV").unwrap(), Expr::Defined("DEV".to_string()));
        assert!(parse("defined(1)").is_err());
    }

    #[test]
    fn test_keywords() {
        assert_eq!(parse("true").unwrap(), Expr::Literal(Value::Bool(true)));
        assert_eq!(parse("undefined").unwrap(), Expr::Literal(Value::Undefined));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse("").unwrap_err().message, "expected expression");
        assert_eq!(parse("A &&").unwrap_err().column, 4);
        assert_eq!(parse("(A").unwrap_err().message, "expected `)`");
        assert_eq!(parse("A B").unwrap_err().column, 2);
        assert!(parse("A == == B").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}A{}", "(".repeat(5000), ")".repeat(5000));
        let err = parse(&deep).unwrap_err();
        assert_eq!(err.message, "expression nested too deeply");
        assert_eq!(err.column, MAX_DEPTH + 1);

        let negations = format!("{}A", "!".repeat(5000));
        assert_eq!(parse(&negations).unwrap_err().message, "expression nested too deeply");

        let shallow = format!("{}A{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse(&shallow).unwrap(), ident("A"));
        assert_eq!(parse("!!!A").unwrap(), Expr::Unary(
            UnaryOp::Not,
            Box::new(Expr::Unary(UnaryOp::Not, Box::new(Expr::Unary(UnaryOp::Not, Box::new(ident("A")))))),
        ));
    }
}
