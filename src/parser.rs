//! Converts laid-out token trees to an AST.
//!
//! The parser is a top-down operator-precedence (Pratt) parser.
//! A single driver ([`Parser::parse`]) is shared by every syntactic category;
//! each category is a [`Grammar`] that says what a token means when it begins a form
//! (its null denotation) and when it continues one (its left denotation).
//!
//! This module provides:
//! - [`parse_declarations`], [`parse_statements`], [`parse_expression`], [`parse_type`]:
//!   entry points that parse a whole token sequence as one category.
//! - [`Parser`]: The struct that holds the cursor and drives the grammars.
//! - [`Grammar`]: The interface each syntactic category implements.

mod binding;
mod decl;
mod expr;
mod stmt;
mod types;

use std::fmt::Display;

use crate::ast::{Declaration, Expression, Name, Statement, Type};
use crate::err::{CompileErr, FullErr, Phase};
use crate::location::Location;
use crate::token::{BlockKind, Reserved, Token, TokenKind};

pub use binding::{BindingGrammar, ReferenceGrammar};
pub use decl::DeclarationGrammar;
pub use expr::{binary_operators, binding_power, ExpressionGrammar};
pub use stmt::StatementGrammar;
pub use types::TypeGrammar;

/// Parses a sequence of laid-out tokens into the declarations of a program.
///
/// `loc` is the location of the whole input. Errors at the end of the input point to its end.
///
/// # Example
/// ```
/// use tern_lang::{lexer, layout, parser, source_span};
///
/// let code = "def main() () {\n  return ()\n}";
/// let tokens = layout::layout(lexer::lex(code).unwrap()).unwrap();
/// let decls = parser::parse_declarations(source_span(code), &tokens).unwrap();
/// assert_eq!(decls.len(), 1);
/// ```
pub fn parse_declarations(loc: Location, tokens: &[Token]) -> ParseResult<Vec<Declaration>> {
    Parser::new(loc, tokens).expect_sequence(|p| p.parse(&DeclarationGrammar, 0))
}

/// Parses a sequence of laid-out tokens into statements.
pub fn parse_statements(loc: Location, tokens: &[Token]) -> ParseResult<Vec<Statement>> {
    Parser::new(loc, tokens).expect_sequence(|p| p.parse(&StatementGrammar, 0))
}

/// Parses a sequence of laid-out tokens into a single expression.
pub fn parse_expression(loc: Location, tokens: &[Token]) -> ParseResult<Expression> {
    let mut p = Parser::new(loc, tokens);
    let e = p.parse(&ExpressionGrammar, 0)?;
    p.expect_end()?;

    Ok(e)
}

/// Parses a sequence of laid-out tokens into a single type.
pub fn parse_type(loc: Location, tokens: &[Token]) -> ParseResult<Type> {
    let mut p = Parser::new(loc, tokens);
    let t = p.parse(&TypeGrammar, 0)?;
    p.expect_end()?;

    Ok(t)
}

/// What the parser ran into when it did not find what it expected.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Found {
    /// A token that does not fit the grammar here.
    Token {
        /// The class of the token.
        kind: TokenKind,
        /// The text of the token.
        text: String,
    },
    /// An expression of the wrong shape (e.g. `3 = x`).
    Expression(&'static str),
    /// The end of the whole input.
    EndOfInput,
    /// The end of the enclosing block.
    EndOfBlock,
}

fn describe_kind(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Block      => "block",
        TokenKind::Comma      => "comma",
        TokenKind::Identifier => "identifier",
        TokenKind::Number     => "number",
        TokenKind::Operator   => "operator",
        TokenKind::Reserved   => "reserved word",
        TokenKind::Semicolon  => "semicolon",
    }
}

impl Display for Found {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Found::Token { kind, text } => write!(f, "found the {} \"{text}\"", describe_kind(*kind)),
            Found::Expression(desc)     => write!(f, "found {desc}"),
            Found::EndOfInput           => write!(f, "reached the end of the input"),
            Found::EndOfBlock           => write!(f, "reached the end of the block"),
        }
    }
}

/// An error that occurs in the parsing process.
///
/// The parser does not recover: the first token that does not fit is reported.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParseErr {
    /// A description of what would have fit (e.g. `"an expression"`).
    pub expected: String,
    /// What was there instead.
    pub found: Found,
}
/// A [`ParseErr`] with its location.
pub type ParseError = FullErr<ParseErr>;
/// A [`Result`] type for operations in the parsing process.
pub type ParseResult<T> = Result<T, ParseError>;

impl CompileErr for ParseErr {
    fn phase(&self) -> Phase {
        Phase::Parse
    }
}
impl Display for ParseErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "The parser expected {} but {}.", self.expected, self.found)
    }
}
impl std::error::Error for ParseErr {}

/// A syntactic category, described by the meaning of each token within it.
pub trait Grammar {
    /// What the grammar produces.
    type Output;

    /// A description of the category for error messages (e.g. `"an expression"`).
    fn expected(&self) -> &'static str;

    /// Parse a form beginning with `token`, which has already been consumed.
    fn null_denotation<'t>(&self, p: &mut Parser<'t>, token: &'t Token) -> ParseResult<Self::Output>;

    /// If `token` (not yet consumed) can continue a form to its left,
    /// how tightly it binds and how it combines with that form.
    fn left_denotation<'t>(&self, _p: &Parser<'t>, _token: &'t Token) -> Option<LeftDenotation<'t, Self::Output>> {
        None
    }
}

/// The meaning of a token that continues an already parsed form.
pub struct LeftDenotation<'t, T> {
    /// The left binding power. The token only continues the form if this exceeds the
    /// caller's minimum binding power.
    pub lbp: u8,
    /// Combines the form to the left with whatever the token introduces.
    /// Called after the token is consumed.
    pub apply: Box<dyn FnOnce(&mut Parser<'t>, T) -> ParseResult<T> + 't>,
}

impl<'t, T> LeftDenotation<'t, T> {
    /// Create a left denotation.
    pub fn new(lbp: u8, apply: impl FnOnce(&mut Parser<'t>, T) -> ParseResult<T> + 't) -> Self {
        Self { lbp, apply: Box::new(apply) }
    }
}

/// The struct that walks a sequence of sibling tokens and drives the grammars over it.
///
/// The interiors of block tokens are parsed by child parsers (see [`Parser::within`]).
pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    /// Where errors at the end of the tokens are reported.
    end: Location,
    /// What the end of the tokens is called in errors.
    end_found: Found,
    /// Labels of the loops enclosing the current position, innermost last.
    loops: Vec<Option<Name>>,
}

impl<'t> Parser<'t> {
    /// Create a parser over the tokens of an input spanning `loc`.
    pub fn new(loc: Location, tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            end: loc.end_point(),
            end_found: Found::EndOfInput,
            loops: vec![],
        }
    }

    /// Parse one form of the grammar, continuing it with tokens binding tighter than `rbp`.
    pub fn parse<G: Grammar>(&mut self, g: &G, rbp: u8) -> ParseResult<G::Output> {
        let token = self.expect_token(g.expected())?;
        self.continue_from(g, token, rbp)
    }

    /// Like [`Parser::parse`], but with the first token already consumed.
    pub fn continue_from<G: Grammar>(&mut self, g: &G, token: &'t Token, rbp: u8) -> ParseResult<G::Output> {
        let mut left = g.null_denotation(self, token)?;

        while let Some(next) = self.peek() {
            match g.left_denotation(self, next) {
                Some(ld) if ld.lbp > rbp => {
                    self.pos += 1;
                    left = (ld.apply)(self, left)?;
                },
                _ => break
            }
        }

        Ok(left)
    }

    /// Look at the next token without consuming it.
    pub fn peek(&self) -> Option<&'t Token> {
        self.peek_nth(0)
    }

    /// Look at the token `n` after the next one without consuming anything.
    pub fn peek_nth(&self, n: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + n)
    }

    /// Consume the next token.
    pub fn advance(&mut self) -> Option<&'t Token> {
        let t = self.peek()?;
        self.pos += 1;
        Some(t)
    }

    /// Whether every token has been consumed.
    pub fn is_done(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Whether `token` directly follows the previously consumed token, with no space between.
    pub fn adjacent(&self, token: &Token) -> bool {
        self.pos.checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(false, |prev| prev.loc.end() == token.loc.start())
    }

    /// Create an error for an unexpected token, or for the end of the tokens if `None`.
    pub fn unexpected(&self, expected: impl Into<String>, token: Option<&Token>) -> ParseError {
        let expected = expected.into();
        match token {
            Some(t) => {
                let found = Found::Token { kind: t.kind, text: t.text.clone() };
                ParseErr { expected, found }.at(t.loc)
            },
            None => ParseErr { expected, found: self.end_found.clone() }.at(self.end),
        }
    }

    /// Create an error for an expression of the wrong shape.
    pub fn misshapen<D>(&self, expected: impl Into<String>, e: &Expression<D>) -> ParseError {
        ParseErr { expected: expected.into(), found: Found::Expression(e.kind.describe()) }.at(e.loc)
    }

    /// Consume the next token, erroring if there is none.
    pub fn expect_token(&mut self, expected: &str) -> ParseResult<&'t Token> {
        self.advance().ok_or_else(|| self.unexpected(expected, None))
    }

    /// Consume the next token, erroring if it does not satisfy the predicate.
    pub fn expect(&mut self, expected: &str, pred: impl Fn(&Token) -> bool) -> ParseResult<&'t Token> {
        match self.peek() {
            Some(t) if pred(t) => {
                self.pos += 1;
                Ok(t)
            },
            t => Err(self.unexpected(expected, t)),
        }
    }

    /// If the next token satisfies the predicate, consume and return it.
    pub fn match_token(&mut self, pred: impl Fn(&Token) -> bool) -> Option<&'t Token> {
        let t = self.peek().filter(|t| pred(t))?;
        self.pos += 1;
        Some(t)
    }

    /// Expect that every token has been consumed.
    pub fn expect_end(&self) -> ParseResult<()> {
        match self.peek() {
            None => Ok(()),
            t => Err(self.unexpected(self.end_name(), t)),
        }
    }

    fn end_name(&self) -> &'static str {
        match self.end_found {
            Found::EndOfInput => "the end of the input",
            _ => "the end of the block",
        }
    }

    /// Parse the interior of a block token with a child parser.
    ///
    /// The child must consume the whole interior.
    pub fn within<R>(&mut self, block: &'t Token, f: impl FnOnce(&mut Parser<'t>) -> ParseResult<R>) -> ParseResult<R> {
        let end = match block.block_kind() {
            Some(BlockKind::Do) => block.loc.end_point(),
            _ => block.loc.last_char(),
        };

        let mut child = Parser {
            tokens: &block.children,
            pos: 0,
            end,
            end_found: Found::EndOfBlock,
            loops: std::mem::take(&mut self.loops),
        };

        let result = f(&mut child).and_then(|r| child.expect_end().map(|_| r));
        self.loops = child.loops;

        result
    }

    /// Parse items separated by semicolons until every token is consumed.
    pub fn expect_sequence<R>(&mut self, mut f: impl FnMut(&mut Parser<'t>) -> ParseResult<R>) -> ParseResult<Vec<R>> {
        let mut items = vec![];

        while !self.is_done() {
            items.push(f(self)?);

            if !self.is_done() {
                let expected = format!("a semicolon or {}", self.end_name());
                self.expect(&expected, |t| t.kind == TokenKind::Semicolon)?;
            }
        }

        Ok(items)
    }

    /// Parse items separated by commas until every token is consumed.
    ///
    /// Also reports whether any comma appeared, which distinguishes `(a)` from `(a,)`.
    pub fn expect_list<R>(&mut self, mut f: impl FnMut(&mut Parser<'t>) -> ParseResult<R>) -> ParseResult<(Vec<R>, bool)> {
        let mut items = vec![];
        let mut comma = false;

        while !self.is_done() {
            items.push(f(self)?);

            if !self.is_done() {
                let expected = format!("a comma or {}", self.end_name());
                self.expect(&expected, |t| t.kind == TokenKind::Comma)?;
                comma = true;
            }
        }

        Ok((items, comma))
    }

    /// Consume a `{ }` or `do` block token.
    pub fn expect_body(&mut self) -> ParseResult<&'t Token> {
        self.expect("a { } or do block", |t| t.is_block(BlockKind::Brace) || t.is_block(BlockKind::Do))
    }

    /// Consume an `else`, also consuming a `;` layout placed before it.
    pub fn match_else(&mut self) -> Option<&'t Token> {
        let is_else = |t: &Token| t.reserved() == Some(Reserved::Else);

        match (self.peek(), self.peek_nth(1)) {
            (Some(t), _) if is_else(t) => self.advance(),
            (Some(semi), Some(t)) if semi.kind == TokenKind::Semicolon && is_else(t) => {
                self.pos += 1;
                self.advance()
            },
            _ => None
        }
    }

    /// Run `f` with a loop labeled `label` enclosing it.
    pub fn in_loop<R>(&mut self, label: Option<Name>, f: impl FnOnce(&mut Parser<'t>) -> ParseResult<R>) -> ParseResult<R> {
        self.loops.push(label);
        let result = f(self);
        self.loops.pop();

        result
    }

    /// How many loops a `break` with the given label skips past, if such a loop encloses it.
    ///
    /// A bare `break` exits the innermost loop. The innermost loop with a matching label wins.
    pub fn break_depth(&self, label: Option<&str>) -> Option<usize> {
        match label {
            None if self.loops.is_empty() => None,
            None => Some(0),
            Some(l) => self.loops.iter().rev().position(|m| m.as_deref() == Some(l)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_parse_fail, parse_tokens};

    #[test]
    fn error_messages() {
        let err = ParseErr {
            expected: String::from("an expression"),
            found: Found::Token { kind: TokenKind::Reserved, text: String::from("else") },
        };
        assert_eq!(err.to_string(), "The parser expected an expression but found the reserved word \"else\".");

        let err = ParseErr { expected: String::from("a type"), found: Found::EndOfBlock };
        assert_eq!(err.to_string(), "The parser expected a type but reached the end of the block.");
    }

    #[test]
    fn end_of_input() {
        assert_parse_fail(
            "let x =",
            "@1,8,1,8 The parser expected an expression but reached the end of the input."
        );
        assert_parse_fail(
            "def f() () { return }",
            "@1,21,1,22 The parser expected an expression but reached the end of the block."
        );
    }

    #[test]
    fn loop_stack() {
        let tokens = parse_tokens("");
        let mut p = Parser::new(Location::point((1, 1)), &tokens);
        assert_eq!(p.break_depth(None), None);

        p.in_loop(Some(String::from("outer")), |p| {
            p.in_loop(None, |p| {
                assert_eq!(p.break_depth(None), Some(0));
                assert_eq!(p.break_depth(Some("outer")), Some(1));
                assert_eq!(p.break_depth(Some("inner")), None);
                Ok(())
            })
        }).unwrap();

        assert!(p.loops.is_empty());
    }
}
