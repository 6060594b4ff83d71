use crate::ast::{Declaration, Expression, Statement, Type};
use crate::layout::layout;
use crate::lexer::{lex, LexErr};
use crate::location::Location;
use crate::err::CompileErr;
use crate::parser::{self, ParseResult};
use crate::source_span;
use crate::token::{BlockKind, Token, TokenKind};

/// The kind and text of each top-level token.
pub fn shape(tokens: &[Token]) -> Vec<(TokenKind, &str)> {
    tokens.iter().map(|t| (t.kind, t.text.as_str())).collect()
}

pub fn assert_lex(src: &str, expected: &[(TokenKind, &str)]) {
    let tokens = lex(src).unwrap_or_else(|e| panic!("lexing {src:?} failed: {}", e.machine_msg()));
    assert_eq!(shape(&tokens), expected, "lexing {src:?}");
}

pub fn assert_lex_fail(src: &str, err: LexErr, loc: Location) {
    match lex(src) {
        Ok(tokens) => panic!("lexing {src:?} should fail, but got {}", sketch(&tokens)),
        Err(e) => assert_eq!(e, err.at(loc), "lexing {src:?}"),
    }
}

/// A compact rendering of a token tree: leaves are their text, blocks are their
/// opener, their children, and their closer (`do<` and `>` for `do` blocks).
pub fn sketch(tokens: &[Token]) -> String {
    tokens.iter()
        .map(|t| match t.block_kind() {
            None => t.text.clone(),
            Some(kind) => {
                let (open, close) = match kind {
                    BlockKind::Do => (String::from("do<"), String::from(">")),
                    k => (k.opener().to_string(), k.closer().map(String::from).unwrap_or_default()),
                };

                match sketch(&t.children).as_str() {
                    ""    => format!("{open} {close}"),
                    inner => format!("{open} {inner} {close}"),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn assert_layout(src: &str, expected: &str) {
    assert_eq!(sketch(&parse_tokens(src)), expected, "laying out {src:?}");
}

pub fn assert_layout_fail(src: &str, err: LexErr, loc: Location) {
    match lex(src).and_then(layout) {
        Ok(tokens) => panic!("laying out {src:?} should fail, but got {}", sketch(&tokens)),
        Err(e) => assert_eq!(e, err.at(loc), "laying out {src:?}"),
    }
}

/// Lex and lay out a string.
pub fn parse_tokens(src: &str) -> Vec<Token> {
    lex(src).and_then(layout)
        .unwrap_or_else(|e| panic!("could not lay out {src:?}: {}", e.machine_msg()))
}

fn parsed<T>(src: &str, f: impl FnOnce(Location, &[Token]) -> ParseResult<T>) -> T {
    f(source_span(src), &parse_tokens(src))
        .unwrap_or_else(|e| panic!("could not parse {src:?}: {}", e.machine_msg()))
}

pub fn parse_decls(src: &str) -> Vec<Declaration> {
    parsed(src, parser::parse_declarations)
}

pub fn parse_stmts(src: &str) -> Vec<Statement> {
    parsed(src, parser::parse_statements)
}

pub fn parse_expr(src: &str) -> Expression {
    parsed(src, parser::parse_expression)
}

pub fn parse_type_str(src: &str) -> Type {
    parsed(src, parser::parse_type)
}

/// Parse an expression and print it back.
pub fn show_expr(src: &str) -> String {
    parse_expr(src).to_string()
}

fn assert_fails<T: std::fmt::Debug>(src: &str, result: ParseResult<T>, expected: &str) {
    match result {
        Ok(t) => panic!("parsing {src:?} should fail, but got {t:?}"),
        Err(e) => assert_eq!(e.machine_msg(), expected, "parsing {src:?}"),
    }
}

/// Assert that parsing a program fails with the given machine-form error.
pub fn assert_parse_fail(src: &str, expected: &str) {
    assert_fails(src, parser::parse_declarations(source_span(src), &parse_tokens(src)), expected);
}

/// Assert that parsing a sequence of statements fails with the given machine-form error.
pub fn assert_stmt_fail(src: &str, expected: &str) {
    assert_fails(src, parser::parse_statements(source_span(src), &parse_tokens(src)), expected);
}
