//! The offside rule: turns indentation into explicit statement and block structure.
//!
//! Layout rewrites the token tree produced by the [lexer][crate::lexer]:
//! - In a *statement run* (the top level, and the interior of `{ }` and `do` blocks),
//!   a token that begins a line exactly at the run's semicolon column starts a new
//!   statement, so an implicit `;` is inserted before it.
//! - A `do` token takes the following sibling tokens that are indented past the
//!   semicolon column as its interior.
//! - The interiors of `( )`, `[ ]` and backtick groups are transparent: no semicolons
//!   are inserted there, but they must close before the statement they are in ends.
//!
//! Violations of these rules are [lexical errors][LexErr].

use std::iter::Peekable;

use crate::err::CompileErr;
use crate::lexer::{LexErr, LexResult};
use crate::location::Location;
use crate::token::{BlockKind, Token, TokenKind};

/// Lay out a lexed token tree.
///
/// # Example
/// ```
/// use tern_lang::lexer::lex;
/// use tern_lang::layout::layout;
///
/// let tokens = layout(lex("a = 1\nb = 2").unwrap()).unwrap();
/// let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
/// assert_eq!(texts, ["a", "=", "1", ";", "b", "=", "2"]);
/// ```
pub fn layout(tokens: Vec<Token>) -> LexResult<Vec<Token>> {
    let column = tokens.first().map_or(1, |t| t.loc.start_col);

    Offside { column, limit: None }.statements(tokens)
}

/// The rules in force for one run of sibling tokens.
struct Offside {
    /// The semicolon column of the enclosing statement run.
    column: usize,
    /// If the run is the interior of a `do` block, the column at or left of which that
    /// implicit region ends.
    limit: Option<usize>,
}

impl Offside {
    /// Lay out a statement run.
    fn statements(&self, tokens: Vec<Token>) -> LexResult<Vec<Token>> {
        let mut out = vec![];
        let mut permit_semi = false;
        let mut prev_row: Option<usize> = None;
        let mut rest = tokens.into_iter().peekable();

        while let Some(tok) = rest.next() {
            let begins_line = prev_row.map_or(false, |r| tok.loc.start_row > r);
            if begins_line && permit_semi && tok.loc.start_col == self.column {
                out.push(Token::semicolon(Location::point(tok.loc.start())));
                permit_semi = false;
            }

            let tok = match tok.kind {
                TokenKind::Block => self.block(tok, &mut rest)?,
                _ => tok
            };
            prev_row = Some(tok.loc.end_row);

            match tok.kind {
                TokenKind::Semicolon if !permit_semi => {},
                TokenKind::Semicolon => {
                    out.push(tok);
                    permit_semi = false;
                },
                _ => {
                    out.push(tok);
                    permit_semi = true;
                }
            }
        }

        if matches!(out.last(), Some(t) if t.kind == TokenKind::Semicolon) {
            out.pop();
        }
        Ok(out)
    }

    /// Lay out the interior of a bracket group.
    fn transparent(&self, tokens: Vec<Token>) -> LexResult<Vec<Token>> {
        let mut out = vec![];
        let mut rest = tokens.into_iter().peekable();

        while let Some(tok) = rest.next() {
            let tok = match tok.kind {
                TokenKind::Block => self.block(tok, &mut rest)?,
                _ => tok
            };
            out.push(tok);
        }

        Ok(out)
    }

    /// Lay out a block token. A `do` block takes its interior from `rest`.
    fn block<I>(&self, tok: Token, rest: &mut Peekable<I>) -> LexResult<Token>
        where I: Iterator<Item=Token>
    {
        match tok.block_kind() {
            Some(BlockKind::Brace) => {
                self.check_brace(&tok)?;

                let column = tok.children.first().map_or(self.column, |t| t.loc.start_col);
                let children = Offside { column, limit: None }.statements(tok.children)?;

                Ok(Token { children, ..tok })
            },
            Some(BlockKind::Do) => {
                let mut region = tok.children;
                region.extend(self.take_region(tok.loc.end_row, rest));

                let loc = region.last().map_or(tok.loc, |t| tok.loc + t.loc);
                let column = region.first()
                    .map_or(self.column, |t| t.loc.start_col.max(self.column));
                let children = Offside { column, limit: Some(self.column) }.statements(region)?;

                Ok(Token::block(tok.text, loc, children))
            },
            _ => {
                self.check_brackets(&tok)?;
                let children = self.transparent(tok.children)?;

                Ok(Token { children, ..tok })
            }
        }
    }

    /// Take the sibling tokens that do not begin a line at or left of the semicolon column.
    fn take_region<I>(&self, mut prev_row: usize, rest: &mut Peekable<I>) -> Vec<Token>
        where I: Iterator<Item=Token>
    {
        let mut region = vec![];

        while let Some(t) = rest.next_if(|t| !(t.loc.start_row > prev_row && t.loc.start_col <= self.column)) {
            prev_row = t.loc.end_row;
            region.push(t);
        }

        region
    }

    /// An explicit brace can only be closed by its `}`.
    fn check_brace(&self, tok: &Token) -> LexResult<()> {
        let close = tok.loc.last_char();
        if close.start_row <= tok.loc.start_row {
            return Ok(());
        }

        match self.limit {
            Some(limit) if close.start_col <= limit => Err(LexErr::ImplicitlyClosedBrace.at(close)),
            _ if close.start_col < self.column => Err(LexErr::BraceLeftOfColumn.at(close)),
            _ => Ok(())
        }
    }

    /// A bracket group must close before the statement containing it ends.
    fn check_brackets(&self, tok: &Token) -> LexResult<()> {
        let mut prev_row = tok.loc.start_row;
        for child in &tok.children {
            if child.loc.start_row > prev_row && child.loc.start_col <= self.column {
                Err(LexErr::StatementEndedInBrackets.at(child.loc))?;
            }
            prev_row = child.loc.end_row;
        }

        let close = tok.loc.last_char();
        if close.start_row > tok.loc.start_row && close.start_col <= self.column {
            Err(LexErr::StatementEndedBeforeCloser.at(close))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::test_utils::{assert_layout, assert_layout_fail};

    #[test]
    fn implicit_semicolons() {
        assert_layout("a = 1\nb = 2", "a = 1 ; b = 2");
        assert_layout("f x\n  y\ng", "f x y ; g");
        assert_layout("a;;b;", "a ; b");
        assert_layout(";a", "a");

        let tokens = layout(lex("a\nb").unwrap()).unwrap();
        assert_eq!(tokens[1].loc, Location::new(2, 1, 2, 1));
    }

    #[test]
    fn do_regions() {
        assert_layout("def foo() () do forever do", "def foo ( ) ( ) do< forever do< > >");
        assert_layout(
            "def f() () do\n  a = 1\n  b = 2\nc",
            "def f ( ) ( ) do< a = 1 ; b = 2 > ; c"
        );
        assert_layout(
            "forever do\n  if x do\n    break\n  y",
            "forever do< if x do< break > ; y >"
        );

        let tokens = layout(lex("def f() () do\n  a = 1\n  b = 2\nc").unwrap()).unwrap();
        assert_eq!(tokens[4].loc, Location::new(1, 12, 3, 8));
    }

    #[test]
    fn braces() {
        assert_layout("def f() () {\n  a\n  b\n}", "def f ( ) ( ) { a ; b }");
        assert_layout("{\n  x = 1;\n}\ny", "{ x = 1 } ; y");
    }

    #[test]
    fn brackets_are_transparent() {
        assert_layout("f (a\n  , b)", "f ( a , b )");
        assert_layout("x = f (do\n  a\n  b)", "x = f ( do< a ; b > )");
    }

    #[test]
    fn layout_errors() {
        assert_layout_fail(
            "{\n    x = {\n      1\n  }\n}",
            LexErr::BraceLeftOfColumn,
            Location::new(4, 3, 4, 4)
        );
        assert_layout_fail(
            "f do {\n  x\n}",
            LexErr::ImplicitlyClosedBrace,
            Location::new(3, 1, 3, 2)
        );
        assert_layout_fail(
            "x = f(a,\nb)",
            LexErr::StatementEndedInBrackets,
            Location::new(2, 1, 2, 2)
        );
        assert_layout_fail(
            "x = f(\n  a\n)",
            LexErr::StatementEndedBeforeCloser,
            Location::new(3, 1, 3, 2)
        );
    }
}
