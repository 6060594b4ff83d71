//! The grammar of statements.
//!
//! ```text
//! statement = "if" expr body [";"] ["else" (body | statement)]
//!           | "forever" [name] body
//!           | "break" [name]
//!           | "let" bindings
//!           | "return" expr
//!           | body
//!           | expr "=" expr
//!           | expr ;
//! ```

use crate::ast::{Expression, ExpressionKind, LValue, Statement, StatementKind};
use crate::token::{BlockKind, Reserved, Token, TokenKind};

use super::binding::expect_bindings;
use super::{ExpressionGrammar, Grammar, ParseResult, Parser};

/// Parses statements.
pub struct StatementGrammar;

/// Parse the interior of a `{ }` or `do` block as a sequence of statements.
pub(super) fn statements_in<'t>(p: &mut Parser<'t>, block: &'t Token) -> ParseResult<Vec<Statement>> {
    p.within(block, |p| p.expect_sequence(|p| p.parse(&StatementGrammar, 0)))
}

impl StatementGrammar {
    fn if_statement<'t>(&self, p: &mut Parser<'t>, token: &'t Token) -> ParseResult<Statement> {
        let cond = p.parse(&ExpressionGrammar, 0)?;
        let then_block = p.expect_body()?;
        let then = statements_in(p, then_block)?;

        let mut loc = token.loc + then_block.loc;
        let otherwise = match p.match_else() {
            None => vec![],
            Some(_) => match p.match_token(|t| t.reserved() == Some(Reserved::If)) {
                Some(chained) => {
                    let s = self.if_statement(p, chained)?;
                    loc += s.loc;
                    vec![s]
                },
                None => {
                    let else_block = p.expect_body()?;
                    loc += else_block.loc;
                    statements_in(p, else_block)?
                }
            }
        };

        Ok(Statement { loc, kind: StatementKind::IfS { cond, then, otherwise } })
    }

    fn forever<'t>(&self, p: &mut Parser<'t>, token: &'t Token) -> ParseResult<Statement> {
        let label = p.match_token(|t| t.kind == TokenKind::Identifier)
            .map(|t| t.text.clone());
        let block = p.expect_body()?;

        let body = p.in_loop(label.clone(), |p| statements_in(p, block))?;
        Ok(Statement { loc: token.loc + block.loc, kind: StatementKind::Forever { label, body } })
    }

    fn break_statement<'t>(&self, p: &mut Parser<'t>, token: &'t Token) -> ParseResult<Statement> {
        match p.match_token(|t| t.kind == TokenKind::Identifier) {
            None => {
                let depth = p.break_depth(None)
                    .ok_or_else(|| p.unexpected("a loop around this break", Some(token)))?;
                Ok(Statement { loc: token.loc, kind: StatementKind::Break(depth) })
            },
            Some(label) => {
                let depth = p.break_depth(Some(&label.text))
                    .ok_or_else(|| p.unexpected("the label of an enclosing loop", Some(label)))?;
                Ok(Statement { loc: token.loc + label.loc, kind: StatementKind::Break(depth) })
            }
        }
    }

    /// An assignment or a call, which both begin with an expression.
    fn assign_or_call<'t>(&self, p: &mut Parser<'t>, token: &'t Token) -> ParseResult<Statement> {
        let e = p.continue_from(&ExpressionGrammar, token, 0)?;

        if p.match_token(|t| t.is(TokenKind::Operator, "=")).is_some() {
            let value = p.parse(&ExpressionGrammar, 0)?;
            let loc = e.loc + value.loc;
            let target = LValue::try_from(e)
                .map_err(|bad| p.misshapen("an assignable expression", &bad))?;

            return Ok(Statement { loc, kind: StatementKind::Assign(target, value) });
        }

        match p.peek() {
            None => {},
            Some(t) if t.kind == TokenKind::Semicolon => {},
            t => return Err(p.unexpected("an equals sign or the end of the statement", t)),
        }

        match e {
            Expression { loc, kind: ExpressionKind::Apply { function, args, untuple }, .. } => {
                Ok(Statement { loc, kind: StatementKind::Call { function: *function, args, untuple } })
            },
            e => Err(p.misshapen("a function call", &e)),
        }
    }
}

impl Grammar for StatementGrammar {
    type Output = Statement;

    fn expected(&self) -> &'static str {
        "a statement"
    }

    fn null_denotation<'t>(&self, p: &mut Parser<'t>, token: &'t Token) -> ParseResult<Statement> {
        match token.reserved() {
            Some(Reserved::If) => return self.if_statement(p, token),
            Some(Reserved::Forever) => return self.forever(p, token),
            Some(Reserved::Break) => return self.break_statement(p, token),
            Some(Reserved::Let) => {
                let bindings = expect_bindings(p)?;
                let loc = bindings.last().map_or(token.loc, |b| token.loc + b.loc);
                return Ok(Statement { loc, kind: StatementKind::Let(bindings) });
            },
            Some(Reserved::Return) => {
                let value = p.parse(&ExpressionGrammar, 0)?;
                return Ok(Statement { loc: token.loc + value.loc, kind: StatementKind::Return(value) });
            },
            Some(Reserved::Negate | Reserved::ValueAt | Reserved::AddressOf) => {},
            Some(_) => return Err(p.unexpected(self.expected(), Some(token))),
            None => {},
        }

        match token.block_kind() {
            Some(BlockKind::Brace | BlockKind::Do) => {
                let body = statements_in(p, token)?;
                Ok(Statement { loc: token.loc, kind: StatementKind::Nested(body) })
            },
            _ => self.assign_or_call(p, token)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{LValueKind, StatementKind};
    use crate::test_utils::{assert_stmt_fail, parse_stmts};

    #[test]
    fn assignments_and_calls() {
        let stmts = parse_stmts("x = 1; (a, b) = t\n*p = f x\na[0] = 2\nprint x\nf(a, b)");
        let kinds: Vec<_> = stmts.iter().map(|s| &s.kind).collect();

        let [
            StatementKind::Assign(x, _),
            StatementKind::Assign(ab, _),
            StatementKind::Assign(p, _),
            StatementKind::Assign(a0, _),
            StatementKind::Call { untuple: false, .. },
            StatementKind::Call { untuple: true, args, .. },
        ] = &kinds[..] else { panic!("unexpected statements: {stmts:?}") };

        assert!(matches!(x.kind, LValueKind::Direct(ref n) if n == "x"));
        assert!(matches!(ab.kind, LValueKind::TupleL(ref v) if v.len() == 2));
        assert!(matches!(p.kind, LValueKind::Indirect(_)));
        assert!(matches!(a0.kind, LValueKind::IndexL { .. }));
        assert_eq!(args.len(), 2);

        assert_eq!(stmts[2].loc.to_string(), "@2,1,2,9");
    }

    #[test]
    fn conditionals() {
        let stmts = parse_stmts("if c do\n  f x\nelse do\n  g y\nh z");
        assert_eq!(stmts.len(), 2);
        let StatementKind::IfS { then, otherwise, .. } = &stmts[0].kind else { panic!("expected an if") };
        assert_eq!((then.len(), otherwise.len()), (1, 1));
        assert_eq!(stmts[0].loc.to_string(), "@1,1,4,6");

        let stmts = parse_stmts("if a { f x } else if b { g y } else { h z }");
        let StatementKind::IfS { otherwise, .. } = &stmts[0].kind else { panic!("expected an if") };
        assert!(matches!(&otherwise[..], [s] if matches!(s.kind, StatementKind::IfS { .. })));
        assert_eq!(stmts[0].loc.to_string(), "@1,1,1,44");

        let stmts = parse_stmts("if c { return x }");
        let StatementKind::IfS { otherwise, .. } = &stmts[0].kind else { panic!("expected an if") };
        assert!(otherwise.is_empty());
    }

    #[test]
    fn loops_and_breaks() {
        let stmts = parse_stmts("forever outer do\n  forever do\n    break outer\n  break");
        let StatementKind::Forever { label, body } = &stmts[0].kind else { panic!("expected a loop") };
        assert_eq!(label.as_deref(), Some("outer"));

        let StatementKind::Forever { label: None, body: inner } = &body[0].kind else { panic!("expected a loop") };
        assert_eq!(inner[0].kind, StatementKind::Break(1));
        assert_eq!(body[1].kind, StatementKind::Break(0));
    }

    #[test]
    fn nested_blocks() {
        let stmts = parse_stmts("{ let a = 1; f a }\ndo\n  return a");
        assert!(matches!(&stmts[0].kind, StatementKind::Nested(b) if b.len() == 2));
        assert!(matches!(&stmts[1].kind, StatementKind::Nested(b) if b.len() == 1));
    }

    #[test]
    fn statement_errors() {
        assert_stmt_fail(
            "break",
            "@1,1,1,6 The parser expected a loop around this break but found the reserved word \"break\"."
        );
        assert_stmt_fail(
            "forever { break nope }",
            "@1,17,1,21 The parser expected the label of an enclosing loop but found the identifier \"nope\"."
        );
        assert_stmt_fail(
            "x",
            "@1,1,1,2 The parser expected a function call but found a variable."
        );
        assert_stmt_fail(
            "f 1 2 = 3",
            "@1,1,1,6 The parser expected an assignable expression but found a function application."
        );
        assert_stmt_fail(
            "f x else",
            "@1,5,1,9 The parser expected an equals sign or the end of the statement but found the reserved word \"else\"."
        );
        assert_stmt_fail(
            "else",
            "@1,1,1,5 The parser expected a statement but found the reserved word \"else\"."
        );
    }
}
