//! The components of the AST generated through the [parser][`crate::parser`] module.
//!
//! Every node carries the [`Location`] of exactly the source text it was parsed from.
//! Expressions additionally carry a decoration slot (`D`), which is `()` as produced by the
//! parser and is reserved for later passes to annotate the tree.
//!
//! A full program is a sequence of [`Declaration`]s.
//!
//! # Further notes
//!
//! Typically, an AST should not be defined manually because it is painful.
//! Instead, [`crate::lexer`], [`crate::layout`] and [`crate::parser`] should be used to
//! create one from a string.

use crate::location::{Location, Spanned};

/// A variable, function, or label name.
pub type Name = String;

/// An expression.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Expression<D = ()> {
    /// The source text of the expression.
    pub loc: Location,
    /// What kind of expression this is.
    pub kind: ExpressionKind<D>,
    /// Data attached by later passes.
    pub decoration: D,
}

/// The kinds of [`Expression`].
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum ExpressionKind<D = ()> {
    /// `&x`, `&a[0]`
    AddressOf(Box<LValue<D>>),

    /// A function application.
    ///
    /// Juxtaposition (`f a b`) and binary operators (`a + b`, as `(+) a b`) produce
    /// curried applications. An explicit call with parentheses (`f(a, b)`) sets
    /// `untuple`, signalling that the arguments were written as one parenthesized list.
    Apply {
        /// The function being applied.
        function: Box<Expression<D>>,
        /// The arguments, in order.
        args: Vec<Expression<D>>,
        /// Whether the arguments came from an explicit `( )` list.
        untuple: bool,
    },

    /// `x : Int32`
    AsType(Box<Expression<D>>, Type),

    /// `[a, b, c]`
    BufferLiteral(Vec<Expression<D>>),

    /// `if c { a } else { b }`
    IfE {
        /// The condition.
        cond: Box<Expression<D>>,
        /// The value if the condition holds.
        then: Box<Expression<D>>,
        /// The value otherwise.
        otherwise: Box<Expression<D>>,
    },

    /// `a[i]`
    Index {
        /// The indexed expression.
        base: Box<Expression<D>>,
        /// The offset.
        offset: Box<Expression<D>>,
    },

    /// A number literal, kept as its source text.
    Number(String),

    /// `()`, `(a, b)`
    Tuple(Vec<Expression<D>>),

    /// `*p`
    ValueAt(Box<Expression<D>>),

    /// `x`
    Variable(Name),
}

impl Expression {
    /// Create an undecorated expression.
    pub fn new(kind: ExpressionKind, loc: Location) -> Self {
        Expression { loc, kind, decoration: () }
    }
}

impl<D> Expression<D> {
    /// The same expression, covering a different part of the source (e.g. its parentheses).
    pub fn relocated(self, loc: Location) -> Self {
        Expression { loc, ..self }
    }
}

impl<D> ExpressionKind<D> {
    /// A short description of the kind of expression, for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            ExpressionKind::AddressOf(_)     => "an address-of expression",
            ExpressionKind::Apply { .. }     => "a function application",
            ExpressionKind::AsType(_, _)     => "a type ascription",
            ExpressionKind::BufferLiteral(_) => "a buffer literal",
            ExpressionKind::IfE { .. }       => "an if expression",
            ExpressionKind::Index { .. }     => "an index expression",
            ExpressionKind::Number(_)        => "a number",
            ExpressionKind::Tuple(_)         => "a tuple",
            ExpressionKind::ValueAt(_)       => "a dereference",
            ExpressionKind::Variable(_)      => "a variable",
        }
    }
}

/// The target of an assignment or `&`.
///
/// This is the subset of expressions that denote a place in memory.
/// See the [`TryFrom<Expression>`] implementation for the mapping.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct LValue<D = ()> {
    /// The source text of the target.
    pub loc: Location,
    /// What kind of target this is.
    pub kind: LValueKind<D>,
}

/// The kinds of [`LValue`].
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum LValueKind<D = ()> {
    /// `x`
    Direct(Name),
    /// `a[i]`
    IndexL {
        /// The indexed place.
        base: Box<LValue<D>>,
        /// The offset.
        offset: Box<Expression<D>>,
    },
    /// `*p`
    Indirect(Box<Expression<D>>),
    /// `(a, b)`
    TupleL(Vec<LValue<D>>),
}

/// Converts an expression into the place it denotes.
///
/// A variable is a direct place, an index of a place is a place, a dereference is an
/// indirect place, and a tuple of places is a place. Otherwise, the first part of the
/// expression that is not a place is returned as the error.
impl<D> TryFrom<Expression<D>> for LValue<D> {
    type Error = Expression<D>;

    fn try_from(value: Expression<D>) -> Result<Self, Self::Error> {
        let Expression { loc, kind, decoration } = value;

        let kind = match kind {
            ExpressionKind::Variable(name) => LValueKind::Direct(name),
            ExpressionKind::Index { base, offset } => {
                let base = LValue::try_from(*base)?;
                LValueKind::IndexL { base: Box::new(base), offset }
            },
            ExpressionKind::ValueAt(address) => LValueKind::Indirect(address),
            ExpressionKind::Tuple(parts) => {
                let parts = parts.into_iter()
                    .map(LValue::try_from)
                    .collect::<Result<_, _>>()?;
                LValueKind::TupleL(parts)
            },
            kind => return Err(Expression { loc, kind, decoration }),
        };

        Ok(LValue { loc, kind })
    }
}

/// A statement.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Statement<D = ()> {
    /// The source text of the statement.
    pub loc: Location,
    /// What kind of statement this is.
    pub kind: StatementKind<D>,
}

/// The kinds of [`Statement`].
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum StatementKind<D = ()> {
    /// `a = 1`, `(a, b) = t`, `*p = 3`
    Assign(LValue<D>, Expression<D>),

    /// `break`, `break outer`
    ///
    /// The depth is the number of loops between this `break` and the loop it exits:
    /// `0` exits the innermost loop.
    Break(usize),

    /// A function application in statement position: `print x`, `f(a, b)`
    Call {
        /// The function being called.
        function: Expression<D>,
        /// The arguments, in order.
        args: Vec<Expression<D>>,
        /// Whether the arguments came from an explicit `( )` list.
        untuple: bool,
    },

    /// `forever { ... }`, `forever outer do ...`
    Forever {
        /// The label `break` statements can name.
        label: Option<Name>,
        /// The loop body.
        body: Vec<Statement<D>>,
    },

    /// `if c { ... } else { ... }`
    ///
    /// An absent `else` is an empty false branch.
    IfS {
        /// The condition.
        cond: Expression<D>,
        /// Run if the condition holds.
        then: Vec<Statement<D>>,
        /// Run otherwise.
        otherwise: Vec<Statement<D>>,
    },

    /// `let a = 1, b: Int8 = 2`
    Let(Vec<Binding<D>>),

    /// A bare `{ ... }` or `do` block.
    Nested(Vec<Statement<D>>),

    /// `return x`
    Return(Expression<D>),
}

/// A top-level declaration.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Declaration<D = ()> {
    /// The source text of the declaration.
    pub loc: Location,
    /// What kind of declaration this is.
    pub kind: DeclarationKind<D>,
}

/// The kinds of [`Declaration`].
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum DeclarationKind<D = ()> {
    /// `def name(args) ReturnType { body }`
    Def {
        /// The function name.
        name: Name,
        /// The parameters.
        args: Vec<Reference>,
        /// The declared return type.
        return_type: Type,
        /// The function body.
        body: Vec<Statement<D>>,
    },
    /// `let a = 1` at the top level.
    GlobalLet(Vec<Binding<D>>),
}

/// A name being introduced, with its declared type: `x`, `var x`, `x: Int32`.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Reference {
    /// The source text of the reference, including its annotation.
    pub loc: Location,
    /// Whether the name was introduced with `var`.
    pub mutable: bool,
    /// The name.
    pub name: Name,
    /// The annotation, or [`TypeKind::Unknown`] if it was elided.
    pub declared_type: Type,
}

/// `a, b = value`
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Binding<D = ()> {
    /// The source text of the binding.
    pub loc: Location,
    /// The names being bound.
    pub names: Vec<Reference>,
    /// The value bound to them.
    pub value: Expression<D>,
}

/// Whether a value of a type may be modified.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Modality {
    #[allow(missing_docs)] Immutable,
    #[allow(missing_docs)] Mutable,
}

/// A type annotation.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Type {
    /// The source text of the type.
    pub loc: Location,
    /// Whether the type was marked `var`.
    pub modality: Modality,
    /// What kind of type this is.
    pub kind: TypeKind,
}

/// The kinds of [`Type`].
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum TypeKind {
    /// A primitive scalar type.
    Ground(Ground),
    /// `A -> B`
    Arrow(Box<Type>, Box<Type>),
    /// `[n] T`
    Buffer(Nat, Box<Type>),
    /// `*T`
    Ptr(Box<Type>),
    /// `(A, B)`
    Tuple(Vec<Type>),
    /// `_`, or an elided annotation.
    Unknown,
}

impl Type {
    /// An immutable type.
    pub fn new(kind: TypeKind, loc: Location) -> Self {
        Type { loc, modality: Modality::Immutable, kind }
    }

    /// Whether this type is the given ground type and is immutable.
    pub fn is_immutable_ground(&self, ground: Ground) -> bool {
        self.modality == Modality::Immutable && self.kind == TypeKind::Ground(ground)
    }
}

macro_rules! define_grounds {
    ($($id:ident: $ex:literal),*) => {
        /// The primitive scalar types.
        #[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
        pub enum Ground {
            $(
                #[allow(missing_docs)] $id
            ),*
        }

        impl Ground {
            /// Look up a ground type by its name.
            pub fn from_name(s: &str) -> Option<Self> {
                match s {
                    $($ex => Some(Self::$id)),*,
                    _ => None
                }
            }

            /// The name of the ground type.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$id => $ex),*
                }
            }
        }
    }
}

define_grounds! {
    Boolean: "Boolean",
    Int8:    "Int8",
    Int16:   "Int16",
    Int32:   "Int32",
    Int64:   "Int64",
    UInt8:   "UInt8",
    UInt16:  "UInt16",
    UInt32:  "UInt32",
    UInt64:  "UInt64",
    Unit:    "Unit"
}

/// The size of a buffer type.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum Nat {
    /// `[4]`
    Literal(String),
    /// `[]`
    Unknown,
    /// `[n]`, a size named elsewhere.
    External(Name),
}

macro_rules! impl_spanned {
    ($($t:ident$(<$d:ident>)?),*) => {
        $(
            impl$(<$d>)? Spanned for $t$(<$d>)? {
                fn loc(&self) -> Location {
                    self.loc
                }
            }
        )*
    }
}
impl_spanned!(Expression<D>, LValue<D>, Statement<D>, Declaration<D>, Binding<D>, Reference, Type);

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, loc: Location) -> Expression {
        Expression::new(ExpressionKind::Variable(name.to_string()), loc)
    }

    #[test]
    fn lvalue_shapes() {
        let l = Location::new(1, 1, 1, 2);
        let index = Expression::new(ExpressionKind::Index {
            base: Box::new(var("a", l)),
            offset: Box::new(Expression::new(ExpressionKind::Number(String::from("0")), l)),
        }, l);
        let tuple = Expression::new(ExpressionKind::Tuple(vec![var("b", l), index]), l);

        let lv = LValue::try_from(tuple).unwrap();
        let LValueKind::TupleL(parts) = lv.kind else { panic!("expected a tuple target") };
        assert_eq!(parts[0].kind, LValueKind::Direct(String::from("b")));
        assert!(matches!(&parts[1].kind, LValueKind::IndexL { base, .. } if base.kind == LValueKind::Direct(String::from("a"))));
    }

    #[test]
    fn non_lvalues_rejected() {
        let l = Location::new(1, 1, 1, 2);
        let num = Expression::new(ExpressionKind::Number(String::from("3")), l);
        assert_eq!(LValue::try_from(num.clone()), Err(num.clone()));

        let bad_index = Expression::new(ExpressionKind::Index {
            base: Box::new(num.clone()),
            offset: Box::new(num),
        }, l);
        assert!(LValue::try_from(bad_index).is_err());
    }

    #[test]
    fn ground_names() {
        assert_eq!(Ground::from_name("UInt16"), Some(Ground::UInt16));
        assert_eq!(Ground::from_name("Int128"), None);
        assert_eq!(Ground::Int32.name(), "Int32");
    }
}
