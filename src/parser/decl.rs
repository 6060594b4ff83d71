//! The grammar of top-level declarations.
//!
//! ```text
//! declaration = "def" name "(" [reference ("," reference)*] ")" type body
//!             | "let" bindings
//! ```

use crate::ast::{Declaration, DeclarationKind};
use crate::token::{BlockKind, Reserved, Token, TokenKind};

use super::binding::expect_bindings;
use super::stmt::statements_in;
use super::{Grammar, ParseResult, Parser, ReferenceGrammar, TypeGrammar};

/// Parses declarations.
pub struct DeclarationGrammar;

impl DeclarationGrammar {
    fn def<'t>(&self, p: &mut Parser<'t>, token: &'t Token) -> ParseResult<Declaration> {
        let name = p.expect("a function name", |t| t.kind == TokenKind::Identifier)?;

        let params = p.expect("a parameter list", |t| t.is_block(BlockKind::Paren))?;
        let (args, _) = p.within(params, |p| p.expect_list(|p| p.parse(&ReferenceGrammar, 0)))?;

        let return_type = p.parse(&TypeGrammar, 0)?;
        let block = p.expect_body()?;
        let body = statements_in(p, block)?;

        let kind = DeclarationKind::Def { name: name.text.clone(), args, return_type, body };
        Ok(Declaration { loc: token.loc + block.loc, kind })
    }
}

impl Grammar for DeclarationGrammar {
    type Output = Declaration;

    fn expected(&self) -> &'static str {
        "a declaration"
    }

    fn null_denotation<'t>(&self, p: &mut Parser<'t>, token: &'t Token) -> ParseResult<Declaration> {
        match token.reserved() {
            Some(Reserved::Def) => self.def(p, token),
            Some(Reserved::Let) => {
                let bindings = expect_bindings(p)?;
                let loc = bindings.last().map_or(token.loc, |b| token.loc + b.loc);
                Ok(Declaration { loc, kind: DeclarationKind::GlobalLet(bindings) })
            },
            _ => Err(p.unexpected(self.expected(), Some(token))),
        }
    }
}
