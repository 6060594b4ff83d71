//! The grammar of expressions.
//!
//! Binding powers, loosest first:
//!
//! | form                          | lbp |
//! |-------------------------------|-----|
//! | `&&` `\|\|`                   | 2   |
//! | `<` `>` `<=` `>=` `==` `!=`   | 3   |
//! | `+` `-`, backtick infix calls | 5   |
//! | `*` `/` `%`                   | 6   |
//! | `: Type`                      | 11  |
//! | application by juxtaposition  | 12  |
//! | `a[i]`, `f(a, b)`             | 13  |
//!
//! Binary operators are left-associative. Prefix forms (`-x`, `*p`, `&x`) take their
//! operand at binding power 11, so they bind looser than application: `-f x` is `-(f x)`.

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::ast::{Expression, ExpressionKind, LValue};
use crate::token::{BlockKind, Reserved, Token, TokenKind};

use super::{Grammar, LeftDenotation, ParseResult, Parser, TypeGrammar};

const BACKTICK_BP: u8 = 5;
const AS_TYPE_BP: u8 = 11;
const PREFIX_BP: u8 = 11;
const APPLY_BP: u8 = 12;
const POSTFIX_BP: u8 = 13;

static BINARY_OPERATORS: Lazy<IndexMap<&'static str, u8>> = Lazy::new(|| {
    [
        ("&&", 2), ("||", 2),
        ("<", 3), (">", 3), ("<=", 3), (">=", 3), ("==", 3), ("!=", 3),
        ("+", 5), ("-", 5),
        ("*", 6), ("/", 6), ("%", 6),
    ]
    .into_iter()
    .collect()
});

/// The left binding power of a binary operator, if it is one.
pub fn binding_power(op: &str) -> Option<u8> {
    BINARY_OPERATORS.get(op).copied()
}

/// Every binary operator with its binding power, loosest first.
pub fn binary_operators() -> impl Iterator<Item=(&'static str, u8)> {
    BINARY_OPERATORS.iter().map(|(&op, &bp)| (op, bp))
}

/// Parses expressions.
pub struct ExpressionGrammar;

fn apply(function: Expression, args: Vec<Expression>, untuple: bool) -> Expression {
    let loc = args.last().map_or(function.loc, |a| function.loc + a.loc);
    let kind = ExpressionKind::Apply { function: Box::new(function), args, untuple };

    Expression::new(kind, loc)
}

fn variable(token: &Token) -> Expression {
    Expression::new(ExpressionKind::Variable(token.text.clone()), token.loc)
}

/// Whether a token (not adjacent to the previous one, for brackets) can begin an argument.
fn starts_argument(p: &Parser<'_>, token: &Token) -> bool {
    match token.kind {
        TokenKind::Identifier | TokenKind::Number => true,
        TokenKind::Reserved => matches!(
            token.reserved(),
            Some(Reserved::Negate | Reserved::ValueAt | Reserved::AddressOf)
        ),
        TokenKind::Block => match token.block_kind() {
            Some(BlockKind::Paren | BlockKind::Square) => !p.adjacent(token),
            _ => false
        },
        _ => false
    }
}

impl ExpressionGrammar {
    fn prefix<'t>(&self, p: &mut Parser<'t>, token: &'t Token, prefix: Reserved) -> ParseResult<Expression> {
        let operand = p.parse(self, PREFIX_BP)?;
        let loc = token.loc + operand.loc;

        match prefix {
            Reserved::ValueAt => Ok(Expression::new(ExpressionKind::ValueAt(Box::new(operand)), loc)),
            Reserved::AddressOf => {
                let target = LValue::try_from(operand)
                    .map_err(|e| p.misshapen("an assignable expression", &e))?;
                Ok(Expression::new(ExpressionKind::AddressOf(Box::new(target)), loc))
            },
            _ => Ok(apply(variable(token), vec![operand], false)),
        }
    }

    /// `if c { a } else { b }`
    fn if_expression<'t>(&self, p: &mut Parser<'t>, token: &'t Token) -> ParseResult<Expression> {
        let cond = p.parse(self, 0)?;

        let then_block = p.expect_body()?;
        let then = p.within(then_block, |p| p.parse(self, 0))?;

        if p.match_else().is_none() {
            return Err(p.unexpected("an else branch", p.peek()));
        }
        let else_block = p.expect_body()?;
        let otherwise = p.within(else_block, |p| p.parse(self, 0))?;

        let kind = ExpressionKind::IfE {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        };
        Ok(Expression::new(kind, token.loc + else_block.loc))
    }

    /// `f a b`: collects every juxtaposed argument into one application.
    fn juxtaposition<'t>(token: &'t Token) -> LeftDenotation<'t, Expression> {
        LeftDenotation::new(APPLY_BP, move |p, function| {
            let mut args = vec![p.continue_from(&ExpressionGrammar, token, APPLY_BP)?];

            while let Some(next) = p.peek().filter(|t| starts_argument(p, t)) {
                p.advance();
                args.push(p.continue_from(&ExpressionGrammar, next, APPLY_BP)?);
            }

            Ok(apply(function, args, false))
        })
    }
}

impl Grammar for ExpressionGrammar {
    type Output = Expression;

    fn expected(&self) -> &'static str {
        "an expression"
    }

    fn null_denotation<'t>(&self, p: &mut Parser<'t>, token: &'t Token) -> ParseResult<Expression> {
        match token.kind {
            TokenKind::Identifier => Ok(variable(token)),
            TokenKind::Number => Ok(Expression::new(ExpressionKind::Number(token.text.clone()), token.loc)),

            TokenKind::Reserved => match token.reserved() {
                Some(r @ (Reserved::Negate | Reserved::ValueAt | Reserved::AddressOf)) => self.prefix(p, token, r),
                Some(Reserved::If) => self.if_expression(p, token),
                _ => Err(p.unexpected(self.expected(), Some(token))),
            },

            TokenKind::Block => match token.block_kind() {
                Some(BlockKind::Paren) => {
                    let (mut elems, comma) = p.within(token, |p| p.expect_list(|p| p.parse(self, 0)))?;

                    if elems.len() == 1 && !comma {
                        Ok(elems.remove(0).relocated(token.loc))
                    } else {
                        Ok(Expression::new(ExpressionKind::Tuple(elems), token.loc))
                    }
                },
                Some(BlockKind::Square) => {
                    let (elems, _) = p.within(token, |p| p.expect_list(|p| p.parse(self, 0)))?;
                    Ok(Expression::new(ExpressionKind::BufferLiteral(elems), token.loc))
                },
                _ => Err(p.unexpected(self.expected(), Some(token))),
            },

            _ => Err(p.unexpected(self.expected(), Some(token))),
        }
    }

    fn left_denotation<'t>(&self, p: &Parser<'t>, token: &'t Token) -> Option<LeftDenotation<'t, Expression>> {
        match token.kind {
            TokenKind::Operator => {
                let bp = binding_power(&token.text)?;

                Some(LeftDenotation::new(bp, move |p, left| {
                    let right = p.parse(&ExpressionGrammar, bp)?;
                    Ok(apply(variable(token), vec![left, right], false))
                }))
            },

            TokenKind::Reserved if token.reserved() == Some(Reserved::AsType) => {
                Some(LeftDenotation::new(AS_TYPE_BP, |p, left: Expression| {
                    let ty = p.parse(&TypeGrammar, 0)?;
                    let loc = left.loc + ty.loc;
                    Ok(Expression::new(ExpressionKind::AsType(Box::new(left), ty), loc))
                }))
            },

            TokenKind::Block => match token.block_kind() {
                Some(BlockKind::Backtick) => Some(LeftDenotation::new(BACKTICK_BP, move |p, left: Expression| {
                    let function = p.within(token, |p| p.parse(&ExpressionGrammar, 0))?;
                    let right = p.parse(&ExpressionGrammar, BACKTICK_BP)?;

                    let loc = left.loc + right.loc;
                    Ok(apply(function, vec![left, right], false).relocated(loc))
                })),
                Some(BlockKind::Square) if p.adjacent(token) => Some(LeftDenotation::new(POSTFIX_BP, move |p, base: Expression| {
                    let offset = p.within(token, |p| p.parse(&ExpressionGrammar, 0))?;
                    let loc = base.loc + token.loc;

                    let kind = ExpressionKind::Index { base: Box::new(base), offset: Box::new(offset) };
                    Ok(Expression::new(kind, loc))
                })),
                Some(BlockKind::Paren) if p.adjacent(token) => Some(LeftDenotation::new(POSTFIX_BP, move |p, function: Expression| {
                    let (args, _) = p.within(token, |p| p.expect_list(|p| p.parse(&ExpressionGrammar, 0)))?;
                    let loc = function.loc + token.loc;

                    Ok(apply(function, args, true).relocated(loc))
                })),
                _ if starts_argument(p, token) => Some(Self::juxtaposition(token)),
                _ => None
            },

            _ if starts_argument(p, token) => Some(Self::juxtaposition(token)),
            _ => None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{LValueKind, TypeKind};
    use crate::test_utils::{assert_parse_fail, parse_expr, show_expr};

    #[test]
    fn precedence() {
        assert_eq!(show_expr("a + b * c - d"), "((a + (b * c)) - d)");
        assert_eq!(show_expr("a < b && c == d"), "((a < b) && (c == d))");
        assert_eq!(show_expr("a - b - c"), "((a - b) - c)");
        assert_eq!(show_expr("(a + b) * c"), "((a + b) * c)");
    }

    #[test]
    fn application() {
        assert_eq!(show_expr("f a b + g c"), "((f a b) + (g c))");
        assert_eq!(show_expr("f a[0] (b, c)"), "(f a[0] (b, c))");
        assert_eq!(show_expr("f(a, b)"), "f(a, b)");
        assert_eq!(show_expr("f(a)(b)"), "f(a)(b)");
        assert_eq!(show_expr("-f x"), "(negate (f x))");
        assert_eq!(show_expr("a `max` b + 1"), "((max a b) + 1)");
        assert_eq!(show_expr("a `max` b `min` c"), "(min (max a b) c)");
        assert_eq!(show_expr("a + b `max` c * d"), "(max (a + b) (c * d))");
    }

    #[test]
    fn explicit_call_untuples() {
        let e = parse_expr("f(a, b)");
        let ExpressionKind::Apply { args, untuple, .. } = e.kind else { panic!("expected an application") };
        assert!(untuple);
        assert_eq!(args.len(), 2);
        assert_eq!(e.loc.to_string(), "@1,1,1,8");

        let e = parse_expr("f (a, b)");
        let ExpressionKind::Apply { args, untuple, .. } = e.kind else { panic!("expected an application") };
        assert!(!untuple);
        assert!(matches!(&args[..], [Expression { kind: ExpressionKind::Tuple(_), .. }]));
    }

    #[test]
    fn prefix_forms() {
        let e = parse_expr("&a[i]");
        let ExpressionKind::AddressOf(target) = e.kind else { panic!("expected an address-of") };
        assert!(matches!(target.kind, LValueKind::IndexL { .. }));

        assert_eq!(show_expr("*p + 1"), "(*p + 1)");
        assert!(matches!(parse_expr("*p").kind, ExpressionKind::ValueAt(_)));
    }

    #[test]
    fn atoms() {
        assert_eq!(parse_expr("()").kind, ExpressionKind::Tuple(vec![]));
        assert_eq!(parse_expr("(x)").loc.to_string(), "@1,1,1,4");
        assert!(matches!(parse_expr("(x,)").kind, ExpressionKind::Tuple(ref v) if v.len() == 1));
        assert!(matches!(parse_expr("[1, 2, 3]").kind, ExpressionKind::BufferLiteral(ref v) if v.len() == 3));
        assert_eq!(parse_expr("-12").kind, ExpressionKind::Number(String::from("-12")));
    }

    #[test]
    fn ascription_and_conditionals() {
        let e = parse_expr("f x : Int32");
        let ExpressionKind::AsType(inner, ty) = e.kind else { panic!("expected an ascription") };
        assert!(matches!(inner.kind, ExpressionKind::Apply { .. }));
        assert!(matches!(ty.kind, TypeKind::Ground(_)));

        assert_eq!(show_expr("if a < b { a } else { b }"), "if (a < b) { a } else { b }");
        assert_eq!(parse_expr("if c { 1 } else { 2 }").loc.to_string(), "@1,1,1,22");
    }

    #[test]
    fn operator_table() {
        assert_eq!(binding_power("*"), Some(6));
        assert_eq!(binding_power("="), None);
        assert_eq!(binary_operators().next(), Some(("&&", 2)));
    }

    #[test]
    fn expression_errors() {
        assert_parse_fail(
            "def f() () { x = &(3) }",
            "@1,19,1,22 The parser expected an assignable expression but found a number."
        );
        assert_parse_fail(
            "let x = if c { 1 }",
            "@1,19,1,19 The parser expected an else branch but reached the end of the input."
        );
    }
}
