//! The tokens that the source text is lexed into.
//!
//! See [`Token`] for more information.

use std::collections::BTreeMap;
use std::fmt::Display;

use once_cell::sync::Lazy;

use crate::location::{Location, Spanned};

/// The class of a [`Token`].
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum TokenKind {
    /// A bracketed group, a backtick infix group, or an implicit `do` block.
    /// Its interior is held in [`Token::children`].
    Block,
    /// `,`
    Comma,
    /// A name (e.g. `abcd`, `a_b`, `a1`)
    Identifier,
    /// A decimal literal, possibly negative (e.g. `12`, `-3`)
    Number,
    /// A run of operator characters (e.g. `+`, `<=`, `->`)
    Operator,
    /// A keyword, or a prefix keyword produced by the lexer (see [`Reserved`]).
    Reserved,
    /// `;`, either literal or inserted by layout.
    Semicolon,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TokenKind::Block      => "Block",
            TokenKind::Comma      => "Comma",
            TokenKind::Identifier => "Identifier",
            TokenKind::Number     => "Number",
            TokenKind::Operator   => "Operator",
            TokenKind::Reserved   => "Reserved",
            TokenKind::Semicolon  => "Semicolon",
        })
    }
}

macro_rules! define_reserved {
    ($($id:ident: $ex:literal),*) => {
        /// The reserved words of the language.
        ///
        /// Only the keywords (see [`Reserved::keyword`]) can be written in source.
        /// The others are produced by the lexer when it reclassifies a prefix operator.
        #[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
        pub enum Reserved {
            $(
                #[allow(missing_docs)] $id
            ),*
        }

        impl Reserved {
            /// The text of this reserved word.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$id => $ex),*
                }
            }

            /// Look up a reserved word by its text.
            pub fn from_text(s: &str) -> Option<Self> {
                match s {
                    $($ex => Some(Self::$id)),*,
                    _ => None
                }
            }
        }
    };
}

define_reserved! {
    Break:     "break",
    Def:       "def",
    Else:      "else",
    Forever:   "forever",
    If:        "if",
    Let:       "let",
    Return:    "return",
    Var:       "var",
    Negate:    "negate",
    ValueAt:   "valueAt",
    AddressOf: "addressOf",
    AsType:    "asType"
}

static KEYWORDS: Lazy<BTreeMap<&'static str, Reserved>> = Lazy::new(|| {
    [
        Reserved::Break, Reserved::Def, Reserved::Else, Reserved::Forever,
        Reserved::If, Reserved::Let, Reserved::Return, Reserved::Var,
    ]
    .into_iter()
    .map(|r| (r.as_str(), r))
    .collect()
});

impl Reserved {
    /// If the identifier text is a keyword, return it.
    ///
    /// Prefix keywords (`negate`, `valueAt`, ...) are not keywords:
    /// typing them in source produces an identifier.
    pub fn keyword(s: &str) -> Option<Self> {
        KEYWORDS.get(s).copied()
    }

    /// The prefix keyword the lexer rewrites an operator into
    /// when it is directly attached to its operand.
    pub fn prefix_of(op: &str) -> Option<Self> {
        match op {
            "-" => Some(Reserved::Negate),
            "*" => Some(Reserved::ValueAt),
            "&" => Some(Reserved::AddressOf),
            _ => None
        }
    }
}

impl Display for Reserved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kinds of [`TokenKind::Block`] tokens.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum BlockKind {
    /// `( ... )`
    Paren,
    /// `[ ... ]`
    Square,
    /// `{ ... }`
    Brace,
    /// `` ` ... ` ``
    Backtick,
    /// `do ...`, delimited by indentation.
    Do,
}

/// The word that opens an implicit block.
pub const DO_KEYWORD: &str = "do";

/// Whether an identifier's text is the implicit block keyword.
pub fn is_implicit_block_keyword(s: &str) -> bool {
    s == DO_KEYWORD
}

impl BlockKind {
    /// Identify a block from its opener text.
    pub fn from_opener(s: &str) -> Option<Self> {
        match s {
            "(" => Some(BlockKind::Paren),
            "[" => Some(BlockKind::Square),
            "{" => Some(BlockKind::Brace),
            "`" => Some(BlockKind::Backtick),
            s if is_implicit_block_keyword(s) => Some(BlockKind::Do),
            _ => None
        }
    }

    /// The opener text of this block.
    pub fn opener(&self) -> &'static str {
        match self {
            BlockKind::Paren    => "(",
            BlockKind::Square   => "[",
            BlockKind::Brace    => "{",
            BlockKind::Backtick => "`",
            BlockKind::Do       => DO_KEYWORD,
        }
    }

    /// The closing character of this block, if it has one.
    pub fn closer(&self) -> Option<char> {
        match self {
            BlockKind::Paren    => Some(')'),
            BlockKind::Square   => Some(']'),
            BlockKind::Brace    => Some('}'),
            BlockKind::Backtick => Some('`'),
            BlockKind::Do       => None,
        }
    }

    /// Statement blocks get semicolons inserted by layout.
    /// The other blocks are transparent to it.
    pub fn is_statement_block(&self) -> bool {
        matches!(self, BlockKind::Brace | BlockKind::Do)
    }
}

/// A lexed token.
///
/// Tokens form a tree: a [`TokenKind::Block`] holds its lexed interior in `children`,
/// and every other token has no children.
#[derive(PartialEq, Eq, Debug, Clone, Hash)]
pub struct Token {
    /// Where this token is in the source. For a block, from its opener through its closer.
    pub loc: Location,
    /// The text of the token. For a block, its opener.
    pub text: String,
    /// The class of the token.
    pub kind: TokenKind,
    /// The interior of a block.
    pub children: Vec<Token>,
}

impl Token {
    /// Create a leaf token.
    pub fn new(kind: TokenKind, text: impl Into<String>, loc: Location) -> Self {
        Token { loc, text: text.into(), kind, children: vec![] }
    }

    /// Create a block token.
    pub fn block(text: impl Into<String>, loc: Location, children: Vec<Token>) -> Self {
        Token { loc, text: text.into(), kind: TokenKind::Block, children }
    }

    /// Create a semicolon token.
    pub fn semicolon(loc: Location) -> Self {
        Token::new(TokenKind::Semicolon, ";", loc)
    }

    /// Whether this token is a given kind with the given text.
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    /// If this token is a reserved word, which one.
    pub fn reserved(&self) -> Option<Reserved> {
        match self.kind {
            TokenKind::Reserved => Reserved::from_text(&self.text),
            _ => None
        }
    }

    /// If this token is a block, which kind.
    pub fn block_kind(&self) -> Option<BlockKind> {
        match self.kind {
            TokenKind::Block => BlockKind::from_opener(&self.text),
            _ => None
        }
    }

    /// Whether this token is a block of the given kind.
    pub fn is_block(&self, kind: BlockKind) -> bool {
        self.block_kind() == Some(kind)
    }

    /// The textual dump of this token tree: `(Token @r,c,r,c text Kind children...)`.
    pub fn dump(&self) -> String {
        self.to_string()
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(Token {} {} {}", self.loc, self.text, self.kind)?;
        if !self.children.is_empty() {
            f.write_str(" ")?;
            for child in &self.children {
                write!(f, "{child}")?;
            }
        }
        f.write_str(")")
    }
}

impl Spanned for Token {
    fn loc(&self) -> Location {
        self.loc
    }
}

/// Dump a sequence of tokens, one after another.
pub fn dump_all(tokens: &[Token]) -> String {
    tokens.iter().map(Token::dump).collect()
}

/// Whether a number literal's text denotes a strictly positive value.
///
/// `"0"` and any negative literal are not positive.
pub fn is_positive(number: &str) -> bool {
    number != "0" && !number.starts_with('-')
}
