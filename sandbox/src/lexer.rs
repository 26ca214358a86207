use std::ops::Range;

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(f64),
    StringLit(String),
    True,
    False,
    Null,

    Ident(String),

    // Keywords
    TypeOf,
    Const,
    Let,
    Var,
    Return,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,         // =
    EqEq,       // ==
    EqEqEq,     // ===
    BangEq,     // !=
    BangEqEq,   // !==
    Gt,
    Lt,
    GtEq,
    LtEq,
    AmpAmp,     // &&
    PipePipe,   // ||
    Bang,       // !
    Question,   // ?
    Colon,      // :
    Comma,
    Dot,
    Arrow,      // =>
    Semicolon,

    // Grouping
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: Range<usize>,
}

/// Split `source` into tokens. Byte spans index into `source`.
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, ParseError> {
    let chars: Vec<char> = source.chars().collect();
    let len = chars.len();
    let mut tokens = Vec::new();
    let mut i = 0;

    // Map character indices to byte offsets
    let byte_pos: Vec<usize> = {
        let mut bp = Vec::with_capacity(len + 1);
        let mut offset = 0;
        for c in &chars {
            bp.push(offset);
            offset += c.len_utf8();
        }
        bp.push(offset);
        bp
    };

    while i < len {
        let start = i;
        let c = chars[i];

        let token = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }

            // String literal, either quote style
            '"' | '\'' => {
                let quote = c;
                i += 1;
                let mut s = String::new();
                loop {
                    if i >= len {
                        return Err(ParseError::new(
                            "Invalid or unexpected token",
                            byte_pos[start]..byte_pos[len],
                        )
                        .with_note("string literal is never closed"));
                    }
                    match chars[i] {
                        ch if ch == quote => {
                            i += 1;
                            break;
                        }
                        '\\' if i + 1 < len => {
                            s.push(match chars[i + 1] {
                                'n' => '\n',
                                't' => '\t',
                                'r' => '\r',
                                '0' => '\0',
                                other => other,
                            });
                            i += 2;
                        }
                        ch => {
                            s.push(ch);
                            i += 1;
                        }
                    }
                }
                Token::StringLit(s)
            }

            // Numbers, including a leading-dot fraction like .5
            '0'..='9' => lex_number(&chars, &mut i),
            '.' if i + 1 < len && chars[i + 1].is_ascii_digit() => lex_number(&chars, &mut i),

            // Identifiers and keywords
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                while i < len && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$') {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                match ident.as_str() {
                    "true" => Token::True,
                    "false" => Token::False,
                    "null" => Token::Null,
                    "typeof" => Token::TypeOf,
                    "const" => Token::Const,
                    "let" => Token::Let,
                    "var" => Token::Var,
                    "return" => Token::Return,
                    _ => Token::Ident(ident),
                }
            }

            // Operators that may be one, two or three characters long
            '=' => {
                i += 1;
                if i < len && chars[i] == '=' {
                    i += 1;
                    if i < len && chars[i] == '=' {
                        i += 1;
                        Token::EqEqEq
                    } else {
                        Token::EqEq
                    }
                } else if i < len && chars[i] == '>' {
                    i += 1;
                    Token::Arrow
                } else {
                    Token::Eq
                }
            }
            '!' => {
                i += 1;
                if i < len && chars[i] == '=' {
                    i += 1;
                    if i < len && chars[i] == '=' {
                        i += 1;
                        Token::BangEqEq
                    } else {
                        Token::BangEq
                    }
                } else {
                    Token::Bang
                }
            }
            '>' => {
                i += 1;
                if i < len && chars[i] == '=' {
                    i += 1;
                    Token::GtEq
                } else {
                    Token::Gt
                }
            }
            '<' => {
                i += 1;
                if i < len && chars[i] == '=' {
                    i += 1;
                    Token::LtEq
                } else {
                    Token::Lt
                }
            }
            '&' if i + 1 < len && chars[i + 1] == '&' => {
                i += 2;
                Token::AmpAmp
            }
            '|' if i + 1 < len && chars[i + 1] == '|' => {
                i += 2;
                Token::PipePipe
            }

            // Single-character tokens
            '+' => { i += 1; Token::Plus }
            '-' => { i += 1; Token::Minus }
            '*' => { i += 1; Token::Star }
            '/' => { i += 1; Token::Slash }
            '%' => { i += 1; Token::Percent }
            '?' => { i += 1; Token::Question }
            ':' => { i += 1; Token::Colon }
            ',' => { i += 1; Token::Comma }
            '.' => { i += 1; Token::Dot }
            ';' => { i += 1; Token::Semicolon }
            '(' => { i += 1; Token::LParen }
            ')' => { i += 1; Token::RParen }
            '[' => { i += 1; Token::LBracket }
            ']' => { i += 1; Token::RBracket }
            '{' => { i += 1; Token::LBrace }
            '}' => { i += 1; Token::RBrace }

            other => {
                return Err(ParseError::new(
                    format!("Invalid or unexpected token '{}'", other),
                    byte_pos[start]..byte_pos[start + 1],
                ));
            }
        };

        tokens.push(Spanned {
            token,
            span: byte_pos[start]..byte_pos[i],
        });
    }

    Ok(tokens)
}

fn lex_number(chars: &[char], i: &mut usize) -> Token {
    let start = *i;
    let len = chars.len();
    while *i < len && (chars[*i].is_ascii_digit() || chars[*i] == '.') {
        // Stop before a second dot so `1..2` style input surfaces as a parse error
        if chars[*i] == '.' && chars[start..*i].contains(&'.') {
            break;
        }
        *i += 1;
    }
    if *i < len && (chars[*i] == 'e' || chars[*i] == 'E') {
        let mut j = *i + 1;
        if j < len && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if j < len && chars[j].is_ascii_digit() {
            while j < len && chars[j].is_ascii_digit() {
                j += 1;
            }
            *i = j;
        }
    }
    let text: String = chars[start..*i].iter().collect();
    Token::Number(text.parse::<f64>().unwrap_or(f64::NAN))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn distinguishes_equality_operators() {
        assert_eq!(
            kinds("a = b == c === d => e"),
            vec![
                Token::Ident("a".into()),
                Token::Eq,
                Token::Ident("b".into()),
                Token::EqEq,
                Token::Ident("c".into()),
                Token::EqEqEq,
                Token::Ident("d".into()),
                Token::Arrow,
                Token::Ident("e".into()),
            ]
        );
    }

    #[test]
    fn numbers_and_member_access() {
        assert_eq!(
            kinds("1.5e3 .25 x.y"),
            vec![
                Token::Number(1500.0),
                Token::Number(0.25),
                Token::Ident("x".into()),
                Token::Dot,
                Token::Ident("y".into()),
            ]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(kinds(r#"'it\'s' "a\nb""#), vec![
            Token::StringLit("it's".into()),
            Token::StringLit("a\nb".into()),
        ]);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = tokenize("'abc").unwrap_err();
        assert_eq!(err.span, 0..4);
    }

    #[test]
    fn spans_are_byte_offsets() {
        let tokens = tokenize("'é' + x").unwrap();
        assert_eq!(tokens[0].span, 0..4);
        assert_eq!(tokens[2].span, 7..8);
    }
}
