//! Reachability of the end of each function body.
//!
//! A statement list is summarized by its *escape code*, found by scanning it backwards:
//! - `0`: control may run off the end of the list,
//! - negative: the list always returns (or loops forever),
//! - `k > 0`: the last reachable exit is a `break` leaving `k` loops,
//!   counting the loop immediately containing the list.
//!
//! Both branches of an `if` are assumed reachable, so the larger code wins.

use crate::ast::{Declaration, DeclarationKind, Statement, StatementKind};
use crate::err::CompileErr;

use super::{CheckErr, CheckResult};

trait EscapeCode {
    fn escape_code(&self) -> isize;
}

impl<D> EscapeCode for [Statement<D>] {
    fn escape_code(&self) -> isize {
        // statements before an exit are unreachable
        self.iter().rev()
            .map(EscapeCode::escape_code)
            .find(|&code| code != 0)
            .unwrap_or(0)
    }
}

impl<D> EscapeCode for Statement<D> {
    fn escape_code(&self) -> isize {
        match &self.kind {
            StatementKind::Return(_) => -1,
            StatementKind::Break(depth) => *depth as isize + 1,
            StatementKind::Forever { body, .. } => match body.escape_code() {
                code if code <= 0 => -1,
                1 => 0,
                code => code - 1,
            },
            StatementKind::IfS { then, otherwise, .. } => {
                then.escape_code().max(otherwise.escape_code())
            },
            StatementKind::Nested(body) => body.escape_code(),
            StatementKind::Assign(_, _)
            | StatementKind::Call { .. }
            | StatementKind::Let(_) => 0,
        }
    }
}

/// Check that no function body can reach its end without returning a value.
///
/// The error is located at the first offending `def`.
pub fn check_functions_return<D>(decls: &[Declaration<D>]) -> CheckResult<()> {
    for decl in decls {
        let DeclarationKind::Def { body, .. } = &decl.kind else { continue };

        match body.escape_code() {
            code if code < 0 => {},
            0 => Err(CheckErr::MayFallThrough.at(decl.loc))?,
            _ => Err(CheckErr::BreakEscapesFunction.at(decl.loc))?,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{parse_decls, parse_stmts};

    fn code(src: &str) -> isize {
        parse_stmts(src).escape_code()
    }

    #[test]
    fn escape_codes() {
        assert_eq!(code("a = 5"), 0);
        assert_eq!(code("return ()\na = 5"), -1);
        assert_eq!(code("a = 5\nreturn ()"), -1);
        assert_eq!(code("forever do\n  a = 1"), -1);
        assert_eq!(code("forever do\n  break\na = 1"), 0);
        assert_eq!(code("forever outer do\n  forever do\n    break outer"), 0);
        assert_eq!(code("forever do\n  forever do\n    break\n  return ()"), -1);
        assert_eq!(code("{ return () }"), -1);
        assert_eq!(code("if c { return () }"), 0);
        assert_eq!(code("if c { return () } else { return () }"), -1);
    }

    #[test]
    fn breaks_out_of_branches() {
        let src = "forever outer do\n  forever do\n    if c { break outer } else { return () }\n";
        let stmts = parse_stmts(src);

        let StatementKind::Forever { body, .. } = &stmts[0].kind else { panic!("expected a loop") };
        assert_eq!(body.escape_code(), 1);
        assert_eq!(stmts.escape_code(), 0);
    }

    #[test]
    fn functions() {
        assert_eq!(check_functions_return(&parse_decls("def main() () { return () }")), Ok(()));
        assert_eq!(check_functions_return(&parse_decls("def foo() () do forever do")), Ok(()));

        let err = check_functions_return(&parse_decls("def ok() () { return 1 }\ndef foo() () { a = 5 }"))
            .unwrap_err();
        assert_eq!(err.machine_msg(), "@2,1,2,23 The function may reach the end of control flow without returning a value.");
        assert_eq!(err.phase(), crate::err::Phase::WellFormedness);
    }

    #[test]
    fn escaping_break_is_internal() {
        use crate::ast::{Ground, Type, TypeKind};
        use crate::location::Location;

        let loc = Location::new(1, 1, 1, 10);
        let decl: Declaration = Declaration {
            loc,
            kind: DeclarationKind::Def {
                name: String::from("f"),
                args: vec![],
                return_type: Type::new(TypeKind::Ground(Ground::Unit), loc),
                body: vec![Statement { loc, kind: StatementKind::Break(0) }],
            },
        };

        let err = check_functions_return(&[decl]).unwrap_err();
        assert_eq!(err.err(), &CheckErr::BreakEscapesFunction);
        assert_eq!(err.phase(), crate::err::Phase::Internal);
    }
}
