//! The grammars of introduced names.
//!
//! ```text
//! reference = ["var"] name [":" type] ;
//! binding   = reference ("," reference)* "=" expression ;
//! bindings  = binding ("," binding)* ;
//! ```

use crate::ast::{Binding, Reference, Type, TypeKind};
use crate::token::{Reserved, Token, TokenKind};

use super::{ExpressionGrammar, Grammar, LeftDenotation, ParseResult, Parser, TypeGrammar};

/// Binding power of a reference's `:` annotation.
const ANNOTATION_BP: u8 = 1;

/// Parses a name being introduced, with its optional annotation.
pub struct ReferenceGrammar;

impl Grammar for ReferenceGrammar {
    type Output = Reference;

    fn expected(&self) -> &'static str {
        "a name"
    }

    fn null_denotation<'t>(&self, p: &mut Parser<'t>, token: &'t Token) -> ParseResult<Reference> {
        let (mutable, name) = match token.kind {
            TokenKind::Identifier => (false, token),
            TokenKind::Reserved if token.reserved() == Some(Reserved::Var) => {
                (true, p.expect(self.expected(), |t| t.kind == TokenKind::Identifier)?)
            },
            _ => Err(p.unexpected(self.expected(), Some(token)))?,
        };

        Ok(Reference {
            loc: token.loc + name.loc,
            mutable,
            name: name.text.clone(),
            declared_type: Type::new(TypeKind::Unknown, name.loc.end_point()),
        })
    }

    fn left_denotation<'t>(&self, _p: &Parser<'t>, token: &'t Token) -> Option<LeftDenotation<'t, Reference>> {
        if token.reserved() != Some(Reserved::AsType) {
            return None;
        }

        Some(LeftDenotation::new(ANNOTATION_BP, |p, r: Reference| {
            let declared_type = p.parse(&TypeGrammar, 0)?;
            Ok(Reference { loc: r.loc + declared_type.loc, declared_type, ..r })
        }))
    }
}

/// Parses one binding of a `let`.
pub struct BindingGrammar;

impl Grammar for BindingGrammar {
    type Output = Binding;

    fn expected(&self) -> &'static str {
        "a binding"
    }

    fn null_denotation<'t>(&self, p: &mut Parser<'t>, token: &'t Token) -> ParseResult<Binding> {
        let mut names = vec![p.continue_from(&ReferenceGrammar, token, 0)?];
        while p.match_token(|t| t.kind == TokenKind::Comma).is_some() {
            names.push(p.parse(&ReferenceGrammar, 0)?);
        }

        p.expect("an equals sign", |t| t.is(TokenKind::Operator, "="))?;
        let value = p.parse(&ExpressionGrammar, 0)?;

        Ok(Binding { loc: token.loc + value.loc, names, value })
    }
}

/// Parse the comma-separated bindings of a `let`.
pub(super) fn expect_bindings(p: &mut Parser<'_>) -> ParseResult<Vec<Binding>> {
    let mut bindings = vec![p.parse(&BindingGrammar, 0)?];
    while p.match_token(|t| t.kind == TokenKind::Comma).is_some() {
        bindings.push(p.parse(&BindingGrammar, 0)?);
    }

    Ok(bindings)
}

#[cfg(test)]
mod tests {
    use crate::ast::{DeclarationKind, Ground, Modality, TypeKind};
    use crate::test_utils::{assert_parse_fail, parse_decls};

    #[test]
    fn references_and_bindings() {
        let decls = parse_decls("let a, var b: var Int8 = t, c = 1");
        let DeclarationKind::GlobalLet(bindings) = &decls[0].kind else { panic!("expected a global let") };
        assert_eq!(bindings.len(), 2);

        let [a, b] = &bindings[0].names[..] else { panic!("expected two names") };
        assert_eq!((a.name.as_str(), a.mutable), ("a", false));
        assert_eq!(a.declared_type.kind, TypeKind::Unknown);

        assert_eq!((b.name.as_str(), b.mutable), ("b", true));
        assert_eq!(b.declared_type.kind, TypeKind::Ground(Ground::Int8));
        assert_eq!(b.declared_type.modality, Modality::Mutable);
        assert_eq!(b.loc.to_string(), "@1,8,1,23");

        assert_eq!(bindings[1].names[0].name, "c");
        assert_eq!(decls[0].loc.to_string(), "@1,1,1,34");
    }

    #[test]
    fn binding_errors() {
        assert_parse_fail(
            "let 3 = x",
            "@1,5,1,6 The parser expected a name but found the number \"3\"."
        );
        assert_parse_fail(
            "let a b = x",
            "@1,7,1,8 The parser expected an equals sign but found the identifier \"b\"."
        );
    }
}
