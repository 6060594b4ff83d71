//! The grammar of type annotations.
//!
//! ```text
//! type = ground | "_" | "var" type | "*" type | "(" [type ("," type)*] ")"
//!      | "[" [number | name] "]" type | type "->" type
//! ```

use crate::ast::{Ground, Modality, Nat, Type, TypeKind};
use crate::token::{BlockKind, Reserved, Token, TokenKind};

use super::{Grammar, LeftDenotation, ParseResult, Parser};

/// Binding power of `->`, which is right-associative.
const ARROW_BP: u8 = 1;

/// Parses type annotations.
pub struct TypeGrammar;

impl Grammar for TypeGrammar {
    type Output = Type;

    fn expected(&self) -> &'static str {
        "a type"
    }

    fn null_denotation<'t>(&self, p: &mut Parser<'t>, token: &'t Token) -> ParseResult<Type> {
        let prefix_operand = |p: &mut Parser<'t>| p.parse(self, ARROW_BP);

        match token.kind {
            TokenKind::Identifier if token.text == "_" => Ok(Type::new(TypeKind::Unknown, token.loc)),
            TokenKind::Identifier => match Ground::from_name(&token.text) {
                Some(g) => Ok(Type::new(TypeKind::Ground(g), token.loc)),
                None => Err(p.unexpected(self.expected(), Some(token))),
            },

            TokenKind::Reserved if token.reserved() == Some(Reserved::Var) => {
                let inner = prefix_operand(p)?;
                Ok(Type { loc: token.loc + inner.loc, modality: Modality::Mutable, kind: inner.kind })
            },
            _ if is_pointer_prefix(token) => {
                let inner = prefix_operand(p)?;
                let loc = token.loc + inner.loc;
                Ok(Type::new(TypeKind::Ptr(Box::new(inner)), loc))
            },

            TokenKind::Block => match token.block_kind() {
                Some(BlockKind::Paren) => {
                    let (mut members, comma) = p.within(token, |p| p.expect_list(|p| p.parse(self, 0)))?;

                    if members.is_empty() {
                        Ok(Type::new(TypeKind::Ground(Ground::Unit), token.loc))
                    } else if members.len() == 1 && !comma {
                        let inner = members.remove(0);
                        Ok(Type { loc: token.loc, ..inner })
                    } else {
                        Ok(Type::new(TypeKind::Tuple(members), token.loc))
                    }
                },
                Some(BlockKind::Square) => {
                    let size = p.within(token, expect_nat)?;
                    let element = prefix_operand(p)?;
                    let loc = token.loc + element.loc;

                    Ok(Type::new(TypeKind::Buffer(size, Box::new(element)), loc))
                },
                _ => Err(p.unexpected(self.expected(), Some(token))),
            },

            _ => Err(p.unexpected(self.expected(), Some(token))),
        }
    }

    fn left_denotation<'t>(&self, _p: &Parser<'t>, token: &'t Token) -> Option<LeftDenotation<'t, Type>> {
        if !token.is(TokenKind::Operator, "->") {
            return None;
        }

        Some(LeftDenotation::new(ARROW_BP, |p, domain: Type| {
            let codomain = p.parse(&TypeGrammar, ARROW_BP - 1)?;
            let loc = domain.loc + codomain.loc;

            Ok(Type::new(TypeKind::Arrow(Box::new(domain), Box::new(codomain)), loc))
        }))
    }
}

/// `*T`, whether or not the lexer reclassified the `*`.
fn is_pointer_prefix(token: &Token) -> bool {
    token.reserved() == Some(Reserved::ValueAt) || token.is(TokenKind::Operator, "*")
}

/// The size of a buffer: a number, a name, or nothing.
fn expect_nat(p: &mut Parser<'_>) -> ParseResult<Nat> {
    match p.advance() {
        None => Ok(Nat::Unknown),
        Some(t) if t.kind == TokenKind::Number => Ok(Nat::Literal(t.text.clone())),
        Some(t) if t.kind == TokenKind::Identifier => Ok(Nat::External(t.text.clone())),
        Some(t) => Err(p.unexpected("a buffer size", Some(t))),
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Ground, Modality, Nat, TypeKind};
    use crate::test_utils::{assert_parse_fail, parse_type_str};

    #[test]
    fn ground_and_unit() {
        assert_eq!(parse_type_str("Int32").kind, TypeKind::Ground(Ground::Int32));
        assert_eq!(parse_type_str("()").kind, TypeKind::Ground(Ground::Unit));
        assert_eq!(parse_type_str("(Boolean)").kind, TypeKind::Ground(Ground::Boolean));
        assert_eq!(parse_type_str("_").kind, TypeKind::Unknown);
    }

    #[test]
    fn modality() {
        let t = parse_type_str("var ()");
        assert_eq!(t.modality, Modality::Mutable);
        assert_eq!(t.kind, TypeKind::Ground(Ground::Unit));
        assert_eq!(t.loc.to_string(), "@1,1,1,7");
    }

    #[test]
    fn arrows_are_right_associative() {
        let t = parse_type_str("Int8 -> UInt8 -> Unit");
        let TypeKind::Arrow(dom, cod) = t.kind else { panic!("expected an arrow") };
        assert_eq!(dom.kind, TypeKind::Ground(Ground::Int8));
        assert!(matches!(cod.kind, TypeKind::Arrow(_, _)));
    }

    #[test]
    fn compound_types() {
        let t = parse_type_str("[4] *Int64");
        let TypeKind::Buffer(Nat::Literal(n), elem) = t.kind else { panic!("expected a buffer") };
        assert_eq!(n, "4");
        assert!(matches!(elem.kind, TypeKind::Ptr(_)));

        let t = parse_type_str("[n] (Int8, var Int16)");
        let TypeKind::Buffer(Nat::External(n), elem) = t.kind else { panic!("expected a buffer") };
        assert_eq!(n, "n");
        let TypeKind::Tuple(members) = elem.kind else { panic!("expected a tuple") };
        assert_eq!(members[1].modality, Modality::Mutable);

        assert!(matches!(parse_type_str("[] Int8").kind, TypeKind::Buffer(Nat::Unknown, _)));
    }

    #[test]
    fn bad_types() {
        assert_parse_fail(
            "def f() Int128 {}",
            "@1,9,1,15 The parser expected a type but found the identifier \"Int128\"."
        );
    }
}
