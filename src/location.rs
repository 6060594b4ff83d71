//! This module holds utilities useful for handling source locations.
//!
//! The main items here are the [`Location`] struct, which holds a half-open span of
//! characters, and the [`Spanned`] trait, which indicates that a struct has a location.

use std::fmt::Display;
use std::ops::{Add, AddAssign};

/// Indicates a specific character in given code: `(row, column)`, both 1-based.
pub type Cursor = (usize, usize);

/// A half-open span of source text, `(start_row, start_col)` up to `(end_row, end_col)`.
///
/// Rows and columns are 1-based and `end_col` is one past the last character,
/// so a one-character token at the start of a file is `@1,1,1,2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    /// Row of the first character.
    pub start_row: usize,
    /// Column of the first character.
    pub start_col: usize,
    /// Row of the last character.
    pub end_row: usize,
    /// Column one past the last character.
    pub end_col: usize,
}

impl Location {
    /// Creates a new location.
    pub fn new(start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> Location {
        debug_assert!(
            start_row < end_row || (start_row == end_row && start_col <= end_col),
            "location must not end before it starts"
        );

        Location { start_row, start_col, end_row, end_col }
    }

    /// Creates a new location between two cursors.
    pub fn between((start_row, start_col): Cursor, (end_row, end_col): Cursor) -> Location {
        Location::new(start_row, start_col, end_row, end_col)
    }

    /// Creates a new location covering a single character.
    pub fn one((row, col): Cursor) -> Location {
        Location::new(row, col, row, col + 1)
    }

    /// Creates a new zero-width location at a cursor.
    pub fn point((row, col): Cursor) -> Location {
        Location::new(row, col, row, col)
    }

    /// The first position of the location.
    pub fn start(&self) -> Cursor {
        (self.start_row, self.start_col)
    }

    /// The position one past the end of the location.
    pub fn end(&self) -> Cursor {
        (self.end_row, self.end_col)
    }

    /// The location of the last character within this location.
    ///
    /// For a block token this is its closing bracket.
    pub fn last_char(&self) -> Location {
        Location::new(self.end_row, self.end_col.saturating_sub(1).max(1), self.end_row, self.end_col)
    }

    /// A zero-width location at the end of this location.
    pub fn end_point(&self) -> Location {
        Location::point(self.end())
    }

    /// Merges two locations into one that covers both of them.
    ///
    /// Locations are contiguous, so merging them will
    /// also cover all text between the two locations.
    pub fn span(a: Location, b: Location) -> Location {
        let start = a.start().min(b.start());
        let end = a.end().max(b.end());

        Location::between(start, end)
    }

    /// Human-readable form: `(r,c)-(r,c)`.
    pub fn human(&self) -> String {
        format!("({},{})-({},{})", self.start_row, self.start_col, self.end_row, self.end_col)
    }
}

/// Machine-readable form: `@r,c,r,c`.
impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{},{},{},{}", self.start_row, self.start_col, self.end_row, self.end_col)
    }
}

impl Add for Location {
    type Output = Location;

    fn add(self, rhs: Self) -> Self::Output {
        Location::span(self, rhs)
    }
}
impl AddAssign for Location {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Trait indicating that an item has a location.
pub trait Spanned {
    /// Gets the location of this item.
    fn loc(&self) -> Location;
}
impl Spanned for Location {
    fn loc(&self) -> Location {
        *self
    }
}
impl<S: Spanned> Spanned for &S {
    fn loc(&self) -> Location {
        (*self).loc()
    }
}
