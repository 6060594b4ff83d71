//! Well-formedness checks over a parsed program.
//!
//! These run after parsing and before any later pass. Each is a pure walk over the AST
//! that stops at the first violation:
//! - [`check_functions_return`]: every function provably returns a value.
//! - [`check_main_exists`]: the program has an entry point of the right shape.

mod main_exists;
mod returns;

use std::fmt::Display;

use crate::err::{CompileErr, FullErr, Phase};

pub use main_exists::check_main_exists;
pub use returns::check_functions_return;

/// An error raised by a well-formedness check.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CheckErr {
    /// A function body may run off its end without a `return`.
    MayFallThrough,
    /// No function is named `main`.
    MainMissing,
    /// `main` does not return an immutable `Int32`.
    MainReturnType,
    /// `main` does not take exactly one immutable `()`.
    MainArgument,
    /// A `break` escaped the function it was written in.
    ///
    /// The parser resolves every `break` against an enclosing loop, so this is an internal error.
    BreakEscapesFunction,
}
/// A [`CheckErr`] with its location.
pub type CheckError = FullErr<CheckErr>;
/// A [`Result`] type for the well-formedness checks.
pub type CheckResult<T> = Result<T, CheckError>;

impl CompileErr for CheckErr {
    fn phase(&self) -> Phase {
        match self {
            CheckErr::BreakEscapesFunction => Phase::Internal,
            _ => Phase::WellFormedness,
        }
    }
}
impl Display for CheckErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckErr::MayFallThrough => write!(f, "The function may reach the end of control flow without returning a value."),
            CheckErr::MainMissing => write!(f, "A function named main must exist."),
            CheckErr::MainReturnType => write!(f, "main() must return an immutable Int32."),
            CheckErr::MainArgument => write!(f, "main() must take one immutable () argument."),
            CheckErr::BreakEscapesFunction => write!(f, "A break escaped its enclosing function."),
        }
    }
}
impl std::error::Error for CheckErr {}
