//! Converts source text into a tree of tokens.
//!
//! In a general sense, lexing is performed by reading the string,
//! and repeatedly matching specific token patterns until the entire string is consumed.
//! Bracket pairs are matched here too, so the result is a tree: every bracketed group
//! becomes one [`TokenKind::Block`] token holding its lexed interior.
//!
//! This module provides:
//! - [`lex`]: A utility function that opaquely does the lexing from string to tokens.
//! - [`LexErr`]: The errors of the lexical phase, which includes [layout].
//!
//! [layout]: crate::layout

use std::fmt::Display;

use crate::err::{CompileErr, FullErr, Phase};
use crate::location::{Cursor, Location};
use crate::token::{is_implicit_block_keyword, BlockKind, Reserved, Token, TokenKind};

/// Convert a string and lex it into a tree of tokens.
///
/// The tokens are not yet laid out; see [`layout`][crate::layout::layout].
///
/// # Example
/// ```
/// use tern_lang::lexer::lex;
/// use tern_lang::token::TokenKind;
///
/// let tokens = lex("-a, b").unwrap();
/// let kinds: Vec<_> = tokens.iter().map(|t| (t.kind, t.text.as_str())).collect();
/// assert_eq!(kinds, [
///     (TokenKind::Reserved, "negate"),
///     (TokenKind::Identifier, "a"),
///     (TokenKind::Comma, ","),
///     (TokenKind::Identifier, "b"),
/// ]);
/// ```
pub fn lex(source: &str) -> LexResult<Vec<Token>> {
    let mut lx = Lexer::new(source);
    let tokens = lx.lex_run(false)?;

    match lx.peek() {
        None => Ok(tokens),
        Some(_) => Err(lx.stuck(false)),
    }
}

/// An error that occurs in the lexing or layout process.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum LexErr {
    /// A raw tab character anywhere in the source.
    Tab,
    /// A bracket or backtick was never closed (e.g. `( ...`).
    Unclosed(BlockKind),
    /// A closer appeared with no matching opener (e.g. `... )`).
    UnmatchedCloser(char),
    /// A character that starts no token.
    Unrecognized(char),

    /// An explicit `{ }` block was cut off by the end of an implicit region or of the input.
    ImplicitlyClosedBrace,
    /// The `}` of an explicit block was dedented past its enclosing semicolon column.
    BraceLeftOfColumn,
    /// A line inside a bracket group was dedented to or past the semicolon column.
    StatementEndedInBrackets,
    /// The closer of a bracket group was dedented to or past the semicolon column.
    StatementEndedBeforeCloser,
}
/// A [`LexErr`] with its location.
pub type LexicalError = FullErr<LexErr>;
/// A [`Result`] type for operations in the lexing process.
pub type LexResult<T> = Result<T, LexicalError>;

impl CompileErr for LexErr {
    fn phase(&self) -> Phase {
        Phase::Lexical
    }
}

impl Display for LexErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexErr::Tab                        => write!(f, "Tab characters are not allowed; indent with spaces."),
            LexErr::Unclosed(kind)             => write!(f, "Unclosed {}.", kind.opener()),
            LexErr::UnmatchedCloser(c)         => write!(f, "Unmatched closing bracket {c}."),
            LexErr::Unrecognized(c)            => write!(f, "Unrecognized token {c}."),
            LexErr::ImplicitlyClosedBrace      => write!(f, "The parser can't implicitly close an explicit brace."),
            LexErr::BraceLeftOfColumn          => write!(f, "The closing }} must be at or to the right of the semicolon column of its enclosing block."),
            LexErr::StatementEndedInBrackets   => write!(f, "The statement ended before all brackets were closed."),
            LexErr::StatementEndedBeforeCloser => write!(f, "The statement ended before you closed the brackets."),
        }
    }
}
impl std::error::Error for LexErr {}

/// Character classes that are treated differently in the lexer
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
enum CharClass {
    /// Starts or continues an identifier (`A-Z`, `a-z`, `_`)
    Letter,
    /// `0-9`
    Digit,
    /// One of `!$%&*+-./:<=>?@\^|~`
    Operator,
    /// `,` or `;`
    Separator,
    /// `(`, `[`, `{`, or a backtick
    Opener,
    /// `)`, `]`, or `}`
    Closer,
    /// space, `\r`, `\n`
    Whitespace,
    /// `#`
    Comment,
    /// `\t`, which is always an error
    Tab,
}

impl CharClass {
    fn of(c: char) -> Option<Self> {
        match c {
            'A'..='Z' | 'a'..='z' | '_' => Some(Self::Letter),
            '0'..='9' => Some(Self::Digit),
            '!' | '$' | '%' | '&' | '*' | '+' | '-' | '.' | '/' | ':'
            | '<' | '=' | '>' | '?' | '@' | '\\' | '^' | '|' | '~' => Some(Self::Operator),
            ',' | ';' => Some(Self::Separator),
            '(' | '[' | '{' | '`' => Some(Self::Opener),
            ')' | ']' | '}' => Some(Self::Closer),
            ' ' | '\r' | '\n' => Some(Self::Whitespace),
            '#' => Some(Self::Comment),
            '\t' => Some(Self::Tab),
            _ => None
        }
    }
}

fn is_ident_continue(c: char) -> bool {
    matches!(CharClass::of(c), Some(CharClass::Letter | CharClass::Digit))
}

/// The struct that performs the lexing process.
///
/// All of the lexer's state lives in its cursor fields; nothing is shared between lexers.
struct Lexer {
    /// The characters of the source.
    chars: Vec<char>,
    /// The offset of the next character to read.
    index: usize,
    /// The position of the next character to read.
    cursor: Cursor,
    /// Whether the next token is separated from the previous one
    /// (by whitespace, a comment, a separator, or the start of a block).
    separated: bool,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            index: 0,
            cursor: (1, 1),
            separated: true,
        }
    }

    fn peek(&self) -> Option<char> {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.chars.get(self.index + n).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.index += 1;

        let (row, col) = self.cursor;
        self.cursor = match c {
            '\n' => (row + 1, 1),
            _    => (row, col + 1),
        };

        Some(c)
    }

    /// Consume characters while they match the predicate.
    fn take_while(&mut self, f: impl Fn(char) -> bool) -> String {
        let mut buf = String::new();
        while let Some(c) = self.peek().filter(|&c| f(c)) {
            buf.push(c);
            self.next();
        }
        buf
    }

    fn loc_from(&self, start: Cursor) -> Location {
        Location::between(start, self.cursor)
    }

    /// The error for a character no token pattern could consume.
    fn stuck(&self, in_backtick: bool) -> LexicalError {
        let loc = Location::one(self.cursor);
        match self.peek() {
            Some(c @ (')' | ']' | '}')) => LexErr::UnmatchedCloser(c).at(loc),
            Some('`') if in_backtick => LexErr::UnmatchedCloser('`').at(loc),
            Some(c) => LexErr::Unrecognized(c).at(loc),
            None => LexErr::Unrecognized(' ').at(loc),
        }
    }

    /// Skip whitespace and comments. Tabs are rejected here.
    fn skip_blank(&mut self) -> LexResult<()> {
        while let Some(c) = self.peek() {
            match CharClass::of(c) {
                Some(CharClass::Whitespace) => { self.next(); },
                Some(CharClass::Comment) => self.skip_comment()?,
                Some(CharClass::Tab) => Err(LexErr::Tab.at(Location::one(self.cursor)))?,
                _ => break
            }
            self.separated = true;
        }

        Ok(())
    }

    /// Skip a comment up to, not including, its newline.
    fn skip_comment(&mut self) -> LexResult<()> {
        while let Some(c) = self.peek() {
            match c {
                '\n' => break,
                '\t' => Err(LexErr::Tab.at(Location::one(self.cursor)))?,
                _ => { self.next(); }
            }
        }

        Ok(())
    }

    /// Lex tokens until a closer, an unrecognized character, or the end of input.
    ///
    /// The stopping character is not consumed.
    fn lex_run(&mut self, in_backtick: bool) -> LexResult<Vec<Token>> {
        let mut tokens = vec![];

        loop {
            self.skip_blank()?;
            let Some(c) = self.peek() else { break };
            let start = self.cursor;

            let token = match CharClass::of(c) {
                Some(CharClass::Opener) if c == '`' && in_backtick => break,
                Some(CharClass::Opener) => self.lex_block(c, in_backtick)?,
                Some(CharClass::Letter) => self.lex_ident(start),
                Some(CharClass::Digit) => self.lex_number(start),
                Some(CharClass::Operator) => {
                    let negative_number = c == '-'
                        && self.separated
                        && matches!(self.peek_nth(1).and_then(CharClass::of), Some(CharClass::Digit));

                    if negative_number {
                        self.lex_number(start)
                    } else {
                        self.lex_operator(start)
                    }
                },
                Some(CharClass::Separator) => {
                    self.next();
                    self.separated = true;
                    let kind = if c == ',' { TokenKind::Comma } else { TokenKind::Semicolon };
                    Token::new(kind, c, self.loc_from(start))
                },
                _ => break
            };

            tokens.push(token);
        }

        Ok(tokens)
    }

    fn lex_block(&mut self, opener: char, in_backtick: bool) -> LexResult<Token> {
        let start = self.cursor;
        let kind = match opener {
            '(' => BlockKind::Paren,
            '[' => BlockKind::Square,
            '{' => BlockKind::Brace,
            _   => BlockKind::Backtick,
        };
        let closer = kind.closer();

        self.next();
        self.separated = true;

        let children = self.lex_run(in_backtick || kind == BlockKind::Backtick)?;

        match self.peek() {
            Some(c) if Some(c) == closer => { self.next(); },
            None if kind == BlockKind::Brace => Err(LexErr::ImplicitlyClosedBrace.at(Location::one(start)))?,
            None => Err(LexErr::Unclosed(kind).at(Location::one(start)))?,
            Some(_) => Err(self.stuck(in_backtick || kind == BlockKind::Backtick))?,
        }

        self.separated = false;
        Ok(Token::block(opener, self.loc_from(start), children))
    }

    fn lex_ident(&mut self, start: Cursor) -> Token {
        let word = self.take_while(is_ident_continue);
        let loc = self.loc_from(start);
        self.separated = false;

        if is_implicit_block_keyword(&word) {
            Token::block(word, loc, vec![])
        } else if Reserved::keyword(&word).is_some() {
            Token::new(TokenKind::Reserved, word, loc)
        } else {
            Token::new(TokenKind::Identifier, word, loc)
        }
    }

    fn lex_number(&mut self, start: Cursor) -> Token {
        let mut text = String::new();
        if self.peek() == Some('-') {
            self.next();
            text.push('-');
        }
        text += &self.take_while(|c| c.is_ascii_digit());

        self.separated = false;
        Token::new(TokenKind::Number, text, self.loc_from(start))
    }

    fn lex_operator(&mut self, start: Cursor) -> Token {
        let was_separated = self.separated;
        let op = self.take_while(|c| CharClass::of(c) == Some(CharClass::Operator));
        let loc = self.loc_from(start);
        self.separated = false;

        let attached = matches!(
            self.peek().and_then(CharClass::of),
            Some(CharClass::Letter | CharClass::Opener)
        );

        match Reserved::prefix_of(&op) {
            Some(prefix) if was_separated && attached => {
                Token::new(TokenKind::Reserved, prefix.as_str(), loc)
            },
            _ if op == ":" => Token::new(TokenKind::Reserved, Reserved::AsType.as_str(), loc),
            _ => Token::new(TokenKind::Operator, op, loc),
        }
    }
}
