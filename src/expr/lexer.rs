use super::ExprError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Number(f64),
    Str(String),
    AndAnd,
    OrOr,
    Bang,
    Minus,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    LParen,
    RParen,
}

/// A token and the byte offset it starts at
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.'
}

/// Split a guard expression into tokens
pub fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let kind = match c {
            '(' => {
                chars.next();
                TokenKind::LParen
            }
            ')' => {
                chars.next();
                TokenKind::RParen
            }
            '-' => {
                chars.next();
                TokenKind::Minus
            }
            '&' | '|' => {
                chars.next();
                match chars.next() {
                    Some((_, n)) if n == c => {
                        if c == '&' {
                            TokenKind::AndAnd
                        } else {
                            TokenKind::OrOr
                        }
                    }
                    _ => return Err(ExprError::new(format!("expected `{c}{c}`"), offset)),
                }
            }
            '!' | '=' => {
                chars.next();
                let eq = chars.next_if(|&(_, n)| n == '=').is_some();
                // `===` and `!==` are accepted as aliases
                if eq {
                    chars.next_if(|&(_, n)| n == '=');
                }
                match (c, eq) {
                    ('!', false) => TokenKind::Bang,
                    ('!', true) => TokenKind::NotEq,
                    ('=', true) => TokenKind::EqEq,
                    _ => return Err(ExprError::new("assignment is not allowed in a condition", offset)),
                }
            }
            '<' | '>' => {
                chars.next();
                let eq = chars.next_if(|&(_, n)| n == '=').is_some();
                match (c, eq) {
                    ('<', false) => TokenKind::Lt,
                    ('<', true) => TokenKind::Le,
                    ('>', false) => TokenKind::Gt,
                    _ => TokenKind::Ge,
                }
            }
            '"' | '\'' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                while let Some((_, n)) = chars.next() {
                    match n {
                        '\\' => {
                            if let Some((_, escaped)) = chars.next() {
                                text.push(escaped);
                            }
                        }
                        _ if n == c => {
                            closed = true;
                            break;
                        }
                        _ => text.push(n),
                    }
                }
                if !closed {
                    return Err(ExprError::new("unterminated string literal", offset));
                }
                TokenKind::Str(text)
            }
            c if c.is_ascii_digit() => {
                let hex = input[offset..].starts_with("0x") || input[offset..].starts_with("0X");
                let mut end = offset;
                while let Some(&(i, n)) = chars.peek() {
                    // exponent sign, as in `1e-5`
                    let signed_exponent =
                        !hex && (n == '-' || n == '+') && matches!(input[..i].chars().last(), Some('e' | 'E'));
                    if n.is_ascii_alphanumeric() || n == '.' || n == '_' || signed_exponent {
                        end = i + n.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let text = &input[offset..end];
                TokenKind::Number(parse_number(text).ok_or_else(|| {
                    ExprError::new(format!("invalid number `{text}`"), offset)
                })?)
            }
            c if is_ident_start(c) => {
                let mut end = offset;
                while let Some(&(i, n)) = chars.peek() {
                    if is_ident_char(n) {
                        end = i + n.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                TokenKind::Ident(input[offset..end].to_string())
            }
            other => return Err(ExprError::new(format!("unexpected character `{other}`"), offset)),
        };

        tokens.push(Token { kind, offset });
    }

    Ok(tokens)
}

fn parse_number(text: &str) -> Option<f64> {
    let cleaned = text.replace('_', "");
    if let Some(hex) = cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).ok().map(|n| n as f64);
    }
    cleaned.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).expect("Failed to tokenize").into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("!a && b || c"),
            vec![
                TokenKind::Bang,
                TokenKind::Ident("a".to_string()),
                TokenKind::AndAnd,
                TokenKind::Ident("b".to_string()),
                TokenKind::OrOr,
                TokenKind::Ident("c".to_string()),
            ]
        );
        assert_eq!(kinds("== === != !=="), vec![TokenKind::EqEq, TokenKind::EqEq, TokenKind::NotEq, TokenKind::NotEq]);
        assert_eq!(kinds("< <= > >="), vec![TokenKind::Lt, TokenKind::Le, TokenKind::Gt, TokenKind::Ge]);
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            kinds("'dev' \"it's\" 42 0x10 1.5"),
            vec![
                TokenKind::Str("dev".to_string()),
                TokenKind::Str("it's".to_string()),
                TokenKind::Number(42.0),
                TokenKind::Number(16.0),
                TokenKind::Number(1.5),
            ]
        );
    }

    #[test]
    fn test_exponent() {
        assert_eq!(
            kinds("1e-5 2.5E+3 1e3"),
            vec![TokenKind::Number(1e-5), TokenKind::Number(2500.0), TokenKind::Number(1000.0)]
        );
        // hex digits are not exponents
        assert_eq!(
            kinds("0x1e-1"),
            vec![TokenKind::Number(30.0), TokenKind::Minus, TokenKind::Number(1.0)]
        );
    }

    #[test]
    fn test_dotted_identifier() {
        assert_eq!(kinds("process.env.DEV"), vec![TokenKind::Ident("process.env.DEV".to_string())]);
    }

    #[test]
    fn test_offsets() {
        let tokens = tokenize("a  && b").unwrap();
        assert_eq!(tokens[1].offset, 3);
        assert_eq!(tokens[2].offset, 6);
    }

    #[test]
    fn test_errors() {
        assert_eq!(tokenize("a & b").unwrap_err().column, 2);
        assert!(tokenize("a = b").is_err());
        assert!(tokenize("'open").is_err());
        assert!(tokenize("1x").is_err());
        assert!(tokenize("a # b").is_err());
    }
}
