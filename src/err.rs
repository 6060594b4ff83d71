//! Underlying core behind the diagnostics of the compiler front end.
//!
//! This module unifies the several different types of errors output by the other modules.
//! Every phase's error type (e.g. [`LexErr`]) implements the [`CompileErr`] trait to report
//! which [`Phase`] raised it and the message of the error.
//!
//! [`FullErr`] pairs such an error with the [`Location`] it occurred at and does the work
//! of rendering it. The renderings are:
//! - [`FullErr::machine_msg`]: `@r,c,r,c message`, used by golden tests,
//! - [`FullErr::human_msg`]: `<Phase> error at (r,c)-(r,c).  message`,
//! - [`FullErr::full_msg`]: the human form followed by the offending source text.
//!
//! [`LexErr`]: crate::lexer::LexErr

use std::fmt::Display;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::location::{Location, Spanned};

/// The phase of compilation that raised an error.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum Phase {
    /// Malformed characters, unbalanced brackets, offside-rule violations.
    Lexical,
    /// A token that does not fit the grammar.
    Parse,
    /// Control-flow and entry-point violations.
    WellFormedness,
    /// Reserved for the type checker.
    Type,
    /// An invariant the compiler believed unreachable was violated.
    Internal,
}

impl Phase {
    const ALL: [Phase; 5] = [Phase::Lexical, Phase::Parse, Phase::WellFormedness, Phase::Type, Phase::Internal];

    fn name(&self) -> &'static str {
        match self {
            Phase::Lexical        => "Lexical",
            Phase::Parse          => "Parse",
            Phase::WellFormedness => "Well-formedness check",
            Phase::Type           => "Type",
            Phase::Internal       => "Internal compiler",
        }
    }
}
impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that can be reported by the compiler front end.
///
/// This trait requires that the struct provides the phase of the error and
/// the message of the error (in Display).
/// Implementing these enables functionality to designate *where* an error occurred and to produce
/// a formatted error message.
pub trait CompileErr: Display + Sized {
    /// The phase that raised this error.
    fn phase(&self) -> Phase;

    /// Designate that this error occurred at a specific location.
    fn at(self, loc: Location) -> FullErr<Self> {
        FullErr::new(self, loc)
    }
}

impl<E: CompileErr> CompileErr for &E {
    fn phase(&self) -> Phase {
        (*self).phase()
    }
}

/// An error that has an associated location.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct FullErr<E: CompileErr> {
    pub(crate) err: E,
    loc: Location,
}

impl<E: CompileErr> FullErr<E> {
    fn new(err: E, loc: Location) -> Self {
        Self { err, loc }
    }

    /// The underlying error.
    pub fn err(&self) -> &E {
        &self.err
    }

    /// The phase that raised the error.
    pub fn phase(&self) -> Phase {
        self.err.phase()
    }

    /// The message of the error, without its location.
    pub fn message(&self) -> String {
        self.err.to_string()
    }

    /// `@r,c,r,c message`
    pub fn machine_msg(&self) -> String {
        format!("{} {}", self.loc, self.err)
    }

    /// `<Phase> error at (r,c)-(r,c).  message`
    pub fn human_msg(&self) -> String {
        format!("{} error at {}.  {}", self.phase(), self.loc.human(), self.err)
    }

    /// Get a String designating where the error occurred,
    /// the message associated with the error,
    /// and a pointer to the text of the source that caused the error.
    pub fn full_msg(&self, src: &str) -> String {
        let mut lines = vec![self.human_msg(), String::new()];
        lines.extend(display_pointer(src, self.loc));

        lines.join("\n")
    }

    /// Map the inner error to another error.
    pub fn map<F: CompileErr>(self, f: impl FnOnce(E) -> F) -> FullErr<F> {
        FullErr { err: f(self.err), loc: self.loc }
    }

    /// Cast the inner error to another error.
    pub fn cast_err<F: CompileErr + From<E>>(self) -> FullErr<F> {
        self.map(F::from)
    }
}

impl<E: CompileErr> Spanned for FullErr<E> {
    fn loc(&self) -> Location {
        self.loc
    }
}

impl<E: CompileErr> Display for FullErr<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.human_msg())
    }
}
impl<E: CompileErr + std::fmt::Debug> std::error::Error for FullErr<E> {}

impl<E: CompileErr + PartialEq> PartialEq<E> for FullErr<E> {
    fn eq(&self, other: &E) -> bool {
        &self.err == other
    }
}

/// Get line from original text (1-based). Missing lines are empty.
fn get_line(orig_txt: &str, row: usize) -> &str {
    orig_txt.lines().nth(row.saturating_sub(1)).unwrap_or("")
}

fn display_pointer(orig_txt: &str, loc: Location) -> Vec<String> {
    let Location { start_row, start_col, end_row, end_col } = loc;
    let start_cno = start_col.saturating_sub(1);

    if start_row == end_row {
        let code = get_line(orig_txt, start_row);
        let width = end_col.saturating_sub(start_col);

        let ptr = match width {
            0 | 1 => " ".repeat(start_cno) + "^",
            w     => " ".repeat(start_cno) + &"~".repeat(w),
        };

        vec![code.to_string(), ptr]
    } else {
        // after start pointer, ~ until you get to the end of the line
        let start_code = get_line(orig_txt, start_row);
        let start_ptr = " ".repeat(start_cno)
            + "^"
            + &"~".repeat(start_code.len().saturating_sub(start_col));

        // ~ before the end pointer
        let end_code = get_line(orig_txt, end_row);
        let end_ptr = "~".repeat(end_col.saturating_sub(2)) + "^";

        vec![start_code.to_string(), start_ptr, end_code.to_string(), end_ptr]
    }
}

/// An internal compiler error: an invariant the front end believed unreachable was violated.
///
/// Never used for conditions a user can trigger.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct InternalErr(pub String);

impl CompileErr for InternalErr {
    fn phase(&self) -> Phase {
        Phase::Internal
    }
}
impl Display for InternalErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
impl std::error::Error for InternalErr {}

/// Raise an internal compiler error at the given location.
pub fn ice(loc: Location, msg: impl Into<String>) -> FullErr<InternalErr> {
    InternalErr(msg.into()).at(loc)
}

/// A type-erased error: a phase, a location, and a message.
///
/// This is what callers of the whole pipeline receive, and what golden tests compare against.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Diagnostic {
    /// The phase that raised the error.
    pub phase: Phase,
    /// Where the error occurred.
    pub loc: Location,
    /// The message, without location or phase.
    pub message: String,
}

impl Diagnostic {
    /// `@r,c,r,c message`
    pub fn machine_msg(&self) -> String {
        format!("{} {}", self.loc, self.message)
    }

    /// `<Phase> error at (r,c)-(r,c).  message`
    pub fn human_msg(&self) -> String {
        format!("{} error at {}.  {}", self.phase, self.loc.human(), self.message)
    }

    /// The human form followed by the offending source text, as in [`FullErr::full_msg`].
    pub fn full_msg(&self, src: &str) -> String {
        let mut lines = vec![self.human_msg(), String::new()];
        lines.extend(display_pointer(src, self.loc));

        lines.join("\n")
    }

    /// Parse the machine form (`@r,c,r,c message`), which does not record a phase.
    pub fn from_machine(phase: Phase, s: &str) -> Option<Diagnostic> {
        static MACHINE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"^(@\d+,\d+,\d+,\d+) (.*)$").unwrap()
        });

        let caps = MACHINE.captures(s.trim_end())?;
        let loc = caps[1].parse().ok()?;

        Some(Diagnostic { phase, loc, message: caps[2].to_string() })
    }
}

impl<E: CompileErr> From<FullErr<E>> for Diagnostic {
    fn from(err: FullErr<E>) -> Self {
        Diagnostic { phase: err.phase(), loc: err.loc, message: err.message() }
    }
}
impl Spanned for Diagnostic {
    fn loc(&self) -> Location {
        self.loc
    }
}
impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.human_msg())
    }
}
impl std::error::Error for Diagnostic {}

/// An error that occurs when reading a location or diagnostic back from its text form.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct MalformedDiagnostic(pub String);
impl Display for MalformedDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed diagnostic {:?}", self.0)
    }
}
impl std::error::Error for MalformedDiagnostic {}

/// Parses the machine form `@r,c,r,c`.
impl FromStr for Location {
    type Err = MalformedDiagnostic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        static LOC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@(\d+),(\d+),(\d+),(\d+)$").unwrap());

        let malformed = || MalformedDiagnostic(s.to_string());
        let caps = LOC.captures(s).ok_or_else(malformed)?;
        let num = |i: usize| caps[i].parse::<usize>().map_err(|_| malformed());

        Ok(Location::new(num(1)?, num(2)?, num(3)?, num(4)?))
    }
}

/// Parses the human form `<Phase> error at (r,c)-(r,c).  message`.
impl FromStr for Diagnostic {
    type Err = MalformedDiagnostic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        static HUMAN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"^(.+) error at \((\d+),(\d+)\)-\((\d+),(\d+)\)\.  (.*)$").unwrap()
        });

        let malformed = || MalformedDiagnostic(s.to_string());
        let caps = HUMAN.captures(s.trim_end()).ok_or_else(malformed)?;
        let phase = Phase::ALL.into_iter()
            .find(|p| p.name() == &caps[1])
            .ok_or_else(malformed)?;
        let num = |i: usize| caps[i].parse::<usize>().map_err(|_| malformed());

        Ok(Diagnostic {
            phase,
            loc: Location::new(num(2)?, num(3)?, num(4)?, num(5)?),
            message: caps[6].to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_both_forms() {
        let err = ice(Location::new(1, 1, 1, 23), "unreachable block kind");

        assert_eq!(err.machine_msg(), "@1,1,1,23 unreachable block kind");
        assert_eq!(err.human_msg(), "Internal compiler error at (1,1)-(1,23).  unreachable block kind");
    }

    #[test]
    fn diagnostic_round_trips_through_text() {
        let diag = Diagnostic {
            phase: Phase::WellFormedness,
            loc: Location::new(2, 3, 4, 5),
            message: String::from("A function named main must exist."),
        };

        assert_eq!(diag.human_msg().parse::<Diagnostic>(), Ok(diag.clone()));
        assert_eq!(Diagnostic::from_machine(Phase::WellFormedness, &diag.machine_msg()), Some(diag));
        assert!("@1,2,3 nope".parse::<Location>().is_err());
    }

    #[test]
    fn pointer_under_source() {
        let err = ice(Location::new(1, 5, 1, 8), "here");
        assert_eq!(err.full_msg("abc def ghi"), [
            "Internal compiler error at (1,5)-(1,8).  here",
            "",
            "abc def ghi",
            "    ~~~",
        ].join("\n"));
    }
}
