//! Tokenizer for arithmetic expressions.

use super::number::Number;
use super::ArithError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(Number),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    LParen,
    RParen,
}

impl TokenKind {
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Plus => "+".into(),
            Self::Minus => "-".into(),
            Self::Star => "*".into(),
            Self::DoubleStar => "**".into(),
            Self::Slash => "/".into(),
            Self::DoubleSlash => "//".into(),
            Self::Percent => "%".into(),
            Self::LParen => "(".into(),
            Self::RParen => ")".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) position: usize,
}

/// Split an expression into tokens. Byte positions are kept for error messages.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, ArithError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if !c.is_ascii() {
            // Unicode whitespace passed the alphabet check.
            let ch = input[i..].chars().next().unwrap_or(' ');
            i += ch.len_utf8();
            continue;
        }

        let position = i;
        let kind = match c {
            b'0'..=b'9' | b'.' => {
                let (number, len) = lex_number(&input[i..], position)?;
                i += len;
                tokens.push(Token {
                    kind: TokenKind::Number(number),
                    position,
                });
                continue;
            }
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'%' => TokenKind::Percent,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'*' if bytes.get(i + 1) == Some(&b'*') => {
                i += 1;
                TokenKind::DoubleStar
            }
            b'*' => TokenKind::Star,
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i += 1;
                TokenKind::DoubleSlash
            }
            b'/' => TokenKind::Slash,
            other => {
                return Err(ArithError::UnexpectedToken {
                    found: (other as char).to_string(),
                    position,
                })
            }
        };
        i += 1;
        tokens.push(Token { kind, position });
    }

    Ok(tokens)
}

fn lex_number(src: &str, position: usize) -> Result<(Number, usize), ArithError> {
    let bytes = src.as_bytes();
    let int_len = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    let mut len = int_len;
    let mut is_float = false;

    if bytes.get(len) == Some(&b'.') {
        is_float = true;
        len += 1;
        len += bytes[len..].iter().take_while(|b| b.is_ascii_digit()).count();
    }

    let literal = &src[..len];
    if literal == "." {
        return Err(ArithError::UnexpectedToken {
            found: ".".into(),
            position,
        });
    }

    if is_float {
        let value = literal
            .parse::<f64>()
            .map_err(|_| ArithError::UnexpectedToken {
                found: literal.to_string(),
                position,
            })?;
        return Ok((Number::Float(value), len));
    }

    if literal.len() > 1 && literal.starts_with('0') && literal.bytes().any(|b| b != b'0') {
        return Err(ArithError::LeadingZeros { position });
    }
    let value = literal
        .parse::<i64>()
        .map_err(|_| ArithError::Overflow("integer literal too large"))?;
    Ok((Number::Int(value), len))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn distinguishes_single_and_double_operators() {
        assert_eq!(
            kinds("2**3//4*5/6"),
            vec![
                TokenKind::Number(Number::Int(2)),
                TokenKind::DoubleStar,
                TokenKind::Number(Number::Int(3)),
                TokenKind::DoubleSlash,
                TokenKind::Number(Number::Int(4)),
                TokenKind::Star,
                TokenKind::Number(Number::Int(5)),
                TokenKind::Slash,
                TokenKind::Number(Number::Int(6)),
            ]
        );
    }

    #[test]
    fn lexes_float_forms() {
        assert_eq!(kinds("1."), vec![TokenKind::Number(Number::Float(1.0))]);
        assert_eq!(kinds(".5"), vec![TokenKind::Number(Number::Float(0.5))]);
        assert_eq!(kinds("007.25"), vec![TokenKind::Number(Number::Float(7.25))]);
    }

    #[test]
    fn lone_dot_is_rejected() {
        assert!(matches!(
            tokenize("1 + ."),
            Err(ArithError::UnexpectedToken { position: 4, .. })
        ));
    }

    #[test]
    fn leading_zeros_are_rejected_for_integers() {
        assert_eq!(tokenize("012"), Err(ArithError::LeadingZeros { position: 0 }));
        assert_eq!(kinds("000"), vec![TokenKind::Number(Number::Int(0))]);
    }

    #[test]
    fn huge_integer_literal_overflows() {
        assert_eq!(
            tokenize("99999999999999999999"),
            Err(ArithError::Overflow("integer literal too large"))
        );
    }

    #[test]
    fn records_positions() {
        let tokens = tokenize("12 +  3").unwrap();
        let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 3, 6]);
    }
}
