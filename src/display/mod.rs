//! Source rendering of the AST.
//!
//! Every node implements [`Display`], printing source text that parses back into the same
//! tree (up to locations). Compound expressions are fully parenthesized, and blocks are
//! printed as indented `{ }` blocks, one statement per line.
//!
//! A whole program is printed with [`ProgramDisplay`].

use std::fmt::{Display, Formatter};

mod ast;

pub use self::ast::ProgramDisplay;

fn fmt_list<D: Display>(f: &mut Formatter<'_>, elems: &[D]) -> std::fmt::Result {
    if let Some((tail, head)) = elems.split_last() {
        for el in head {
            write!(f, "{el}, ")?;
        }

        write!(f, "{tail}")
    } else {
        Ok(())
    }
}

/// A parenthesized list, with a trailing comma if it has exactly one element.
fn fmt_tuple<D: Display>(f: &mut Formatter<'_>, elems: &[D]) -> std::fmt::Result {
    write!(f, "(")?;
    fmt_list(f, elems)?;
    if elems.len() == 1 {
        write!(f, ",")?;
    }
    write!(f, ")")
}

fn fmt_mapped_list<'e, T, F>(f: &mut Formatter<'_>, elems: &'e [T], sep: &str, map: F) -> std::fmt::Result
    where F: Fn(&mut Formatter<'_>, &'e T) -> std::fmt::Result
{
    if let Some((tail, head)) = elems.split_last() {
        for el in head {
            map(f, el)?;
            write!(f, "{sep}")?;
        }

        map(f, tail)
    } else {
        Ok(())
    }
}

/// Indents every line of a rendered block body inside braces.
struct BlockDisplay<S>(S);
impl<S: Display> Display for BlockDisplay<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let buf = self.0.to_string();

        if buf.is_empty() {
            write!(f, "{{}}")
        } else {
            writeln!(f, "{{")?;

            for line in buf.lines() {
                writeln!(f, "{:4}{line}", "")?;
            }

            write!(f, "}}")
        }
    }
}
