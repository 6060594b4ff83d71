//! The shape of the program's entry point.

use crate::ast::{Declaration, DeclarationKind, Ground};
use crate::err::CompileErr;
use crate::location::Location;

use super::{CheckErr, CheckResult};

/// Check that a function named `main` exists, and that every such function
/// takes one immutable `()` and returns an immutable `Int32`.
///
/// `loc` is where a missing `main` is reported, usually the span of the whole program.
/// Several well-formed `main`s are not an error here.
pub fn check_main_exists<D>(loc: Location, decls: &[Declaration<D>]) -> CheckResult<()> {
    let mut found = false;

    for decl in decls {
        let DeclarationKind::Def { name, args, return_type, .. } = &decl.kind else { continue };
        if name != "main" {
            continue;
        }
        found = true;

        if !return_type.is_immutable_ground(Ground::Int32) {
            Err(CheckErr::MainReturnType.at(decl.loc))?;
        }
        match &args[..] {
            [arg] if !arg.mutable && arg.declared_type.is_immutable_ground(Ground::Unit) => {},
            _ => Err(CheckErr::MainArgument.at(decl.loc))?,
        }
    }

    match found {
        true  => Ok(()),
        false => Err(CheckErr::MainMissing.at(loc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_span;
    use crate::test_utils::parse_decls;

    fn check(src: &str) -> Result<(), String> {
        check_main_exists(source_span(src), &parse_decls(src)).map_err(|e| e.machine_msg())
    }

    #[test]
    fn well_formed_main() {
        assert_eq!(check("def main(a: ()) Int32 {}"), Ok(()));
        assert_eq!(check("def helper() () {}\ndef main(u: ()) Int32 { return 0 }"), Ok(()));
        assert_eq!(check("def main(a: ()) Int32 {}\ndef main(b: ()) Int32 {}"), Ok(()));
    }

    #[test]
    fn missing_main() {
        assert_eq!(
            check("def foo() () {}\nlet main = 3"),
            Err(String::from("@1,1,2,13 A function named main must exist."))
        );
    }

    #[test]
    fn malformed_main() {
        assert_eq!(
            check("def main() () {}"),
            Err(String::from("@1,1,1,17 main() must return an immutable Int32."))
        );
        assert_eq!(
            check("def main(a: var ()) Int32 {}"),
            Err(String::from("@1,1,1,29 main() must take one immutable () argument."))
        );
        assert_eq!(
            check("def main(var a: ()) Int32 {}"),
            Err(String::from("@1,1,1,29 main() must take one immutable () argument."))
        );
        assert_eq!(
            check("def main(a: (), b: ()) Int32 {}"),
            Err(String::from("@1,1,1,32 main() must take one immutable () argument."))
        );
        assert_eq!(
            check("def main() var Int32 {}"),
            Err(String::from("@1,1,1,24 main() must return an immutable Int32."))
        );
    }
}
