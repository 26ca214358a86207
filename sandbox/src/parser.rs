use std::ops::Range;
use std::rc::Rc;

use crate::ast::{
    ArrowFunction, BinaryOperator, DeclarationKind, Expr, Statement, UnaryOperator,
};
use crate::error::ParseError;
use crate::lexer::{self, Spanned, Token};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a single statement: an expression, a declaration or an assignment.
/// A trailing semicolon is allowed.
pub fn parse(source: &str) -> Result<Statement, ParseError> {
    let tokens = lexer::tokenize(source)?;
    let mut parser = ExprParser::new(tokens, source);

    let statement = parser.parse_statement()?;
    parser.eat(&Token::Semicolon);
    if !parser.at_end() {
        return Err(parser.error_here("Unexpected token"));
    }
    Ok(statement)
}

/// Parse a standalone expression.
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    match parse(source)? {
        Statement::Expression(expr) => Ok(expr),
        _ => Err(ParseError::new("expected an expression", 0..source.len())),
    }
}

// ---------------------------------------------------------------------------
// Pratt parser
// ---------------------------------------------------------------------------

struct ExprParser<'a> {
    tokens: Vec<Spanned>,
    pos: usize,
    source: &'a str,
    depth: usize,
}

/// Deepest expression nesting accepted; matches the evaluator's call depth.
const MAX_NESTING: usize = 256;

// Binding powers (precedence). Higher = tighter binding.
// Left bp, right bp. For left-assoc: right = left + 1. For right-assoc: right = left.
const BP_CONDITIONAL: u8 = 2;     // ? :
const BP_OR: u8 = 4;              // ||
const BP_AND: u8 = 6;             // &&
const BP_EQUALITY: u8 = 8;        // === !== == !=
const BP_COMPARISON: u8 = 10;     // < > <= >=
const BP_ADDITIVE: u8 = 12;       // + -
const BP_MULTIPLICATIVE: u8 = 14; // * / %
const BP_UNARY: u8 = 16;          // ! - + typeof
const BP_POSTFIX: u8 = 18;        // calls, member access

impl<'a> ExprParser<'a> {
    fn new(tokens: Vec<Spanned>, source: &'a str) -> Self {
        ExprParser {
            tokens,
            pos: 0,
            source,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Span of the next token, or an empty span at end of input.
    fn current_span(&self) -> Range<usize> {
        match self.tokens.get(self.pos) {
            Some(t) => t.span.clone(),
            None => self.source.len()..self.source.len(),
        }
    }

    /// End offset of the most recently consumed token.
    fn previous_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|p| self.tokens.get(p))
            .map_or(0, |t| t.span.end)
    }

    fn error_here(&self, msg: &str) -> ParseError {
        if self.at_end() {
            ParseError::new("Unexpected end of input", self.current_span())
        } else {
            ParseError::new(msg, self.current_span())
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<Range<usize>, ParseError> {
        match self.tokens.get(self.pos) {
            Some(t) if t.token == token => {
                let span = t.span.clone();
                self.pos += 1;
                Ok(span)
            }
            _ => Err(self
                .error_here("Unexpected token")
                .with_note(format!("expected {}", what))),
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self
                .error_here("Unexpected token")
                .with_note("expected an identifier")),
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let kind = match self.peek() {
            Some(Token::Const) => Some(DeclarationKind::Const),
            Some(Token::Let) => Some(DeclarationKind::Let),
            Some(Token::Var) => Some(DeclarationKind::Var),
            _ => None,
        };
        if let Some(kind) = kind {
            self.advance();
            let name = self.expect_ident()?;
            self.expect(Token::Eq, "'='")?;
            let value = self.parse_expr(0)?;
            return Ok(Statement::Declaration { kind, name, value });
        }

        // global.name = expr
        if let (Some(Token::Ident(g)), Some(Token::Dot), Some(Token::Ident(_)), Some(Token::Eq)) =
            (self.peek(), self.peek_at(1), self.peek_at(2), self.peek_at(3))
            && g == "global"
        {
            self.pos += 2;
            let name = self.expect_ident()?;
            self.pos += 1;
            let value = self.parse_expr(0)?;
            return Ok(Statement::GlobalAssignment { name, value });
        }

        // name = expr (single `=`, not `==`)
        if let (Some(Token::Ident(_)), Some(Token::Eq)) = (self.peek(), self.peek_at(1)) {
            let name = self.expect_ident()?;
            self.pos += 1;
            let value = self.parse_expr(0)?;
            return Ok(Statement::Assignment { name, value });
        }

        Ok(Statement::Expression(self.parse_expr(0)?))
    }

    // ------------------------------------------------------------------
    // Pratt parser core
    // ------------------------------------------------------------------

    fn parse_expr(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::new(
                "expression nested too deeply",
                self.current_span(),
            ));
        }
        self.depth += 1;
        let result = self.parse_operators(min_bp);
        self.depth -= 1;
        result
    }

    fn parse_operators(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let start = self.current_span().start;
        let mut left = self.parse_prefix()?;

        loop {
            let Some(token) = self.peek() else { break };

            // Postfix: calls, member and computed access
            if matches!(token, Token::LParen | Token::Dot | Token::LBracket) {
                if BP_POSTFIX < min_bp {
                    break;
                }
                left = self.parse_postfix(left, start)?;
                continue;
            }

            let Some((l_bp, r_bp)) = infix_bp(token) else { break };
            if l_bp < min_bp {
                break;
            }

            // Special case: conditional operator (?)
            if *token == Token::Question {
                self.advance();
                let true_branch = self.parse_expr(0)?;
                self.expect(Token::Colon, "':' in conditional expression")?;
                let false_branch = self.parse_expr(r_bp)?;
                left = Expr::Conditional {
                    condition: Box::new(left),
                    true_branch: Box::new(true_branch),
                    false_branch: Box::new(false_branch),
                };
                continue;
            }

            let Some(op) = self.advance() else { break };
            let right = self.parse_expr(r_bp)?;

            let operator = match op.token {
                Token::Plus => BinaryOperator::Addition,
                Token::Minus => BinaryOperator::Subtraction,
                Token::Star => BinaryOperator::Multiplication,
                Token::Slash => BinaryOperator::Division,
                Token::Percent => BinaryOperator::Modulo,
                Token::EqEqEq => BinaryOperator::StrictEquality,
                Token::BangEqEq => BinaryOperator::StrictInequality,
                Token::EqEq => BinaryOperator::LooseEquality,
                Token::BangEq => BinaryOperator::LooseInequality,
                Token::Gt => BinaryOperator::GreaterThan,
                Token::Lt => BinaryOperator::LessThan,
                Token::GtEq => BinaryOperator::GreaterThanOrEqual,
                Token::LtEq => BinaryOperator::LessThanOrEqual,
                Token::AmpAmp => BinaryOperator::LogicalAnd,
                Token::PipePipe => BinaryOperator::LogicalOr,
                _ => return Err(ParseError::new("Unexpected token", op.span)),
            };

            left = Expr::BinaryOperation {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_postfix(&mut self, object: Expr, start: usize) -> Result<Expr, ParseError> {
        let Some(token) = self.advance() else {
            return Ok(object);
        };
        match token.token {
            Token::LParen => {
                let arguments = self.parse_list(Token::RParen, "')'")?;
                Ok(Expr::Call {
                    callee: Box::new(object),
                    arguments,
                    span: start..self.previous_end(),
                })
            }
            Token::Dot => {
                // Keywords are valid property names: `x.return`, `S.null`
                let property = match self.advance() {
                    Some(Spanned { token: Token::Ident(name), .. }) => name,
                    Some(Spanned { token, span }) => keyword_name(&token)
                        .map(str::to_string)
                        .ok_or_else(|| ParseError::new("Unexpected token", span))?,
                    None => return Err(self.error_here("Unexpected end of input")),
                };
                Ok(Expr::Member {
                    object: Box::new(object),
                    property,
                    span: start..self.previous_end(),
                })
            }
            Token::LBracket => {
                let index = self.parse_expr(0)?;
                self.expect(Token::RBracket, "']'")?;
                Ok(Expr::Index {
                    object: Box::new(object),
                    index: Box::new(index),
                    span: start..self.previous_end(),
                })
            }
            _ => Err(ParseError::new("Unexpected token", token.span)),
        }
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        if self.is_arrow_function() {
            return self.parse_arrow_function();
        }

        let token = self
            .advance()
            .ok_or_else(|| self.error_here("Unexpected end of input"))?;

        match token.token {
            // Literals
            Token::Number(n) => Ok(Expr::NumberLiteral(n)),
            Token::StringLit(s) => Ok(Expr::StringLiteral(s)),
            Token::True => Ok(Expr::BooleanLiteral(true)),
            Token::False => Ok(Expr::BooleanLiteral(false)),
            Token::Null => Ok(Expr::NullLiteral),

            Token::Ident(name) => Ok(match name.as_str() {
                "undefined" => Expr::UndefinedLiteral,
                _ => Expr::Variable(name, token.span),
            }),

            // Unary operators
            Token::Bang => self.parse_unary(UnaryOperator::LogicalNot),
            Token::Minus => self.parse_unary(UnaryOperator::Negation),
            Token::Plus => self.parse_unary(UnaryOperator::Plus),
            Token::TypeOf => self.parse_unary(UnaryOperator::TypeOf),

            // Parenthesized expression
            Token::LParen => {
                let expr = self.parse_expr(0)?;
                self.expect(Token::RParen, "')'")?;
                Ok(expr)
            }

            Token::LBracket => Ok(Expr::ArrayLiteral(
                self.parse_list(Token::RBracket, "']'")?,
            )),

            Token::LBrace => self.parse_object_literal(),

            _ => Err(ParseError::new("Unexpected token", token.span)),
        }
    }

    fn parse_unary(&mut self, operator: UnaryOperator) -> Result<Expr, ParseError> {
        let operand = self.parse_expr(BP_UNARY)?;
        Ok(Expr::UnaryOperation {
            operator,
            operand: Box::new(operand),
        })
    }

    /// Comma-separated expressions up to `close`. A trailing comma is allowed.
    fn parse_list(&mut self, close: Token, what: &str) -> Result<Vec<Expr>, ParseError> {
        let mut items = Vec::new();
        loop {
            if self.eat(&close) {
                return Ok(items);
            }
            items.push(self.parse_expr(0)?);
            if !self.eat(&Token::Comma) {
                self.expect(close, what)?;
                return Ok(items);
            }
        }
    }

    fn parse_object_literal(&mut self) -> Result<Expr, ParseError> {
        let mut entries = Vec::new();
        loop {
            if self.eat(&Token::RBrace) {
                break;
            }
            let key = match self.advance() {
                Some(Spanned { token: Token::Ident(name), .. }) => name,
                Some(Spanned { token: Token::StringLit(s), .. }) => s,
                Some(Spanned { token: Token::Number(n), .. }) => {
                    crate::runtime_value::format_number(n)
                }
                Some(Spanned { token, span }) => keyword_name(&token)
                    .map(str::to_string)
                    .ok_or_else(|| ParseError::new("Unexpected token", span))?,
                None => return Err(self.error_here("Unexpected end of input")),
            };
            let value = if self.eat(&Token::Colon) {
                self.parse_expr(0)?
            } else {
                // Shorthand property: `{x}`
                Expr::Variable(key.clone(), self.current_span())
            };
            entries.push((key, value));
            if !self.eat(&Token::Comma) {
                self.expect(Token::RBrace, "'}'")?;
                break;
            }
        }
        Ok(Expr::ObjectLiteral(entries))
    }

    // ------------------------------------------------------------------
    // Arrow functions
    // ------------------------------------------------------------------

    /// Check whether the upcoming tokens start an arrow function:
    /// `x =>`, `() =>` or `(a, b) =>`.
    fn is_arrow_function(&self) -> bool {
        match self.peek() {
            Some(Token::Ident(_)) => self.peek_at(1) == Some(&Token::Arrow),
            Some(Token::LParen) => {
                let mut offset = 1;
                loop {
                    match self.peek_at(offset) {
                        Some(Token::RParen) => {
                            return self.peek_at(offset + 1) == Some(&Token::Arrow);
                        }
                        Some(Token::Ident(_)) => {
                            offset += 1;
                            match self.peek_at(offset) {
                                Some(Token::Comma) => offset += 1,
                                Some(Token::RParen) => {}
                                _ => return false,
                            }
                        }
                        _ => return false,
                    }
                }
            }
            _ => false,
        }
    }

    fn parse_arrow_function(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span().start;
        let mut params = Vec::new();

        if self.eat(&Token::LParen) {
            while !self.eat(&Token::RParen) {
                params.push(self.expect_ident()?);
                self.eat(&Token::Comma);
            }
        } else {
            params.push(self.expect_ident()?);
        }
        self.expect(Token::Arrow, "'=>'")?;

        let body = if self.peek() == Some(&Token::LBrace) && self.peek_at(1) == Some(&Token::Return) {
            // Block body limited to a single `return e;`
            self.pos += 2;
            let body = self.parse_expr(0)?;
            self.eat(&Token::Semicolon);
            self.expect(Token::RBrace, "'}'")?;
            body
        } else if self.peek() == Some(&Token::LBrace) && self.peek_at(1) == Some(&Token::RBrace) {
            // `x => {}` is an empty block, not an empty object
            self.pos += 2;
            Expr::UndefinedLiteral
        } else if self.peek() == Some(&Token::LBrace) {
            return Err(self
                .error_here("Unexpected token")
                .with_note("block-bodied functions may only contain a single return statement"));
        } else {
            // Arrow bodies bind looser than anything but the comma
            self.parse_expr(BP_CONDITIONAL)?
        };

        let end = self.previous_end();
        Ok(Expr::Arrow(Rc::new(ArrowFunction {
            params,
            body,
            source: self.source[start..end].to_string(),
        })))
    }
}

/// Infix binding powers: returns (left_bp, right_bp) or None if not infix.
fn infix_bp(token: &Token) -> Option<(u8, u8)> {
    match token {
        Token::Question => Some((BP_CONDITIONAL, BP_CONDITIONAL)),
        Token::PipePipe => Some((BP_OR, BP_OR + 1)),
        Token::AmpAmp => Some((BP_AND, BP_AND + 1)),
        Token::EqEqEq | Token::BangEqEq | Token::EqEq | Token::BangEq => {
            Some((BP_EQUALITY, BP_EQUALITY + 1))
        }
        Token::Gt | Token::Lt | Token::GtEq | Token::LtEq => {
            Some((BP_COMPARISON, BP_COMPARISON + 1))
        }
        Token::Plus | Token::Minus => Some((BP_ADDITIVE, BP_ADDITIVE + 1)),
        Token::Star | Token::Slash | Token::Percent => {
            Some((BP_MULTIPLICATIVE, BP_MULTIPLICATIVE + 1))
        }
        _ => None,
    }
}

fn keyword_name(token: &Token) -> Option<&'static str> {
    match token {
        Token::True => Some("true"),
        Token::False => Some("false"),
        Token::Null => Some("null"),
        Token::TypeOf => Some("typeof"),
        Token::Const => Some("const"),
        Token::Let => Some("let"),
        Token::Var => Some("var"),
        Token::Return => Some("return"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse_expression("1 + 2 * 3").unwrap();
        let Expr::BinaryOperation { operator, right, .. } = expr else {
            panic!("expected binary operation");
        };
        assert_eq!(operator, BinaryOperator::Addition);
        assert!(matches!(
            *right,
            Expr::BinaryOperation { operator: BinaryOperator::Multiplication, .. }
        ));
    }

    #[test]
    fn arrow_function_keeps_its_source() {
        let expr = parse_expression("(a, b) => a + b").unwrap();
        let Expr::Arrow(function) = expr else {
            panic!("expected arrow function");
        };
        assert_eq!(function.params, vec!["a", "b"]);
        assert_eq!(function.source, "(a, b) => a + b");
    }

    #[test]
    fn arrow_function_body_stops_at_argument_comma() {
        let expr = parse_expression("S.map(x => x + 1, [1])").unwrap();
        let Expr::Call { arguments, .. } = expr else {
            panic!("expected call");
        };
        assert_eq!(arguments.len(), 2);
    }

    #[test]
    fn parenthesised_expression_is_not_an_arrow() {
        assert!(matches!(
            parse_expression("(x)").unwrap(),
            Expr::Variable(..)
        ));
    }

    #[test]
    fn global_assignment_statement() {
        let statement = parse("global.sqrt = n => n").unwrap();
        assert!(matches!(
            statement,
            Statement::GlobalAssignment { ref name, .. } if name == "sqrt"
        ));
    }

    #[test]
    fn declaration_with_trailing_semicolon() {
        assert!(matches!(
            parse("const x = 1;").unwrap(),
            Statement::Declaration { kind: DeclarationKind::Const, .. }
        ));
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let err = parse("1 2").unwrap_err();
        assert_eq!(err.message, "Unexpected token");
        assert_eq!(err.span, 2..3);
    }

    #[test]
    fn deep_nesting_is_rejected_before_the_stack_runs_out() {
        let source = format!("{}1{}", "[".repeat(3000), "]".repeat(3000));
        let err = parse(&source).unwrap_err();
        assert_eq!(err.message, "expression nested too deeply");
        assert_eq!(err.span, 256..257);

        let shallow = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert!(parse(&shallow).is_ok());
    }

    #[test]
    fn missing_operand_reports_end_of_input() {
        let err = parse("1 +").unwrap_err();
        assert_eq!(err.message, "Unexpected end of input");
    }
}
