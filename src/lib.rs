#![warn(missing_docs)]

//! The front end of the Tern compiler.
//!
//! # Parsing
//!
//! Source text becomes a validated AST in four stages, each its own module:
//! - [`lexer`]: characters to a tree of tokens, with bracket groups as block tokens.
//! - [`layout`]: the offside rule, which turns indentation into statement separators
//!   and `do` block boundaries.
//! - [`parser`]: laid-out tokens to an AST ([`ast`]), by precedence climbing.
//! - [`check`]: well-formedness checks over the AST.
//!
//! [`compile`] runs every stage in order. Each stage fails fast with the first error it
//! finds; errors from any stage convert into one [`Diagnostic`][`err::Diagnostic`].
//!
//! # Example
//! ```
//! let src = "def main(u: ()) Int32 do\n  return 0";
//! let decls = tern_lang::compile(src).unwrap();
//! assert_eq!(decls.len(), 1);
//!
//! let err = tern_lang::compile("def main(u: ()) Int32 do\n  f u").unwrap_err();
//! assert_eq!(
//!     err.machine_msg(),
//!     "@1,1,2,6 The function may reach the end of control flow without returning a value."
//! );
//! ```

pub mod ast;
pub mod check;
pub mod display;
pub mod err;
pub mod layout;
pub mod lexer;
pub mod location;
pub mod parser;
pub mod token;

#[cfg(test)]
mod test_utils;

use ast::Declaration;
use err::Diagnostic;
use location::Location;

/// The location spanning all of a source string, from its first character to its end.
pub fn source_span(source: &str) -> Location {
    let end = source.chars().fold((1, 1), |(row, col), c| match c {
        '\n' => (row + 1, 1),
        _    => (row, col + 1),
    });

    Location::between((1, 1), end)
}

/// Options for running the whole front end over a program.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Pipeline {
    /// Whether the program must have a well-formed `main` function.
    pub require_main: bool,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self { require_main: true }
    }
}

impl Pipeline {
    /// Lex, lay out, parse, and check a program.
    pub fn run(&self, source: &str) -> Result<Vec<Declaration>, Diagnostic> {
        let span = source_span(source);

        let tokens = layout::layout(lexer::lex(source)?)?;
        let decls = parser::parse_declarations(span, &tokens)?;

        check::check_functions_return(&decls)?;
        if self.require_main {
            check::check_main_exists(span, &decls)?;
        }

        Ok(decls)
    }
}

/// Run the whole front end over a program with the default [`Pipeline`].
pub fn compile(source: &str) -> Result<Vec<Declaration>, Diagnostic> {
    Pipeline::default().run(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::err::Phase;

    #[test]
    fn source_spans() {
        assert_eq!(source_span(""), Location::new(1, 1, 1, 1));
        assert_eq!(source_span("ab\ncde"), Location::new(1, 1, 2, 4));
        assert_eq!(source_span("ab\n"), Location::new(1, 1, 2, 1));
    }

    #[test]
    fn pipeline_phases() {
        let phase = |src: &str| compile(src).map(|_| ()).map_err(|e| e.phase);

        assert_eq!(phase("def main(u: ()) Int32 { return 0 }"), Ok(()));
        assert_eq!(phase("def main\t"), Err(Phase::Lexical));
        assert_eq!(phase("def main(u: ()) Int32 { return 0"), Err(Phase::Lexical));
        assert_eq!(phase("def main(u: ()) Int32"), Err(Phase::Parse));
        assert_eq!(phase("def main() () { return () }"), Err(Phase::WellFormedness));
        assert_eq!(phase("def other() () { return () }"), Err(Phase::WellFormedness));
    }

    #[test]
    fn main_can_be_optional() {
        let lenient = Pipeline { require_main: false };
        assert!(lenient.run("def other() () { return () }").is_ok());
        assert!(lenient.run("def other() () { f x }").is_err());
    }
}
