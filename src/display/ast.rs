use std::fmt::{Display, Formatter};

use crate::ast::*;
use crate::parser::binding_power;

use super::*;

/// Prints the declarations of a program, separated by blank lines.
pub struct ProgramDisplay<'a, D = ()>(pub &'a [Declaration<D>]);

impl<D> Display for ProgramDisplay<'_, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        fmt_mapped_list(f, self.0, "\n\n", |f, d| write!(f, "{d}"))
    }
}

impl<D> Display for Declaration<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            DeclarationKind::Def { name, args, return_type, body } => {
                write!(f, "def {name}(")?;
                fmt_list(f, args)?;
                write!(f, ") {return_type} {}", BlockDisplay(StatementsDisplay::new(body, vec![])))
            },
            DeclarationKind::GlobalLet(bindings) => {
                write!(f, "let ")?;
                fmt_list(f, bindings)
            },
        }
    }
}

impl Display for Reference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let Reference { mutable, name, declared_type, .. } = self;

        if *mutable {
            write!(f, "var ")?;
        }
        write!(f, "{name}")?;

        match declared_type {
            Type { kind: TypeKind::Unknown, modality: Modality::Immutable, .. } => Ok(()),
            t => write!(f, ": {t}"),
        }
    }
}

impl<D> Display for Binding<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        fmt_list(f, &self.names)?;
        write!(f, " = {}", self.value)
    }
}

/// Statements, one per line.
///
/// `loops` holds the labels of the loops enclosing the statements, innermost last,
/// so that a `break` can be printed with the label of the loop it exits.
struct StatementsDisplay<'a, D> {
    stmts: &'a [Statement<D>],
    loops: Vec<Option<&'a str>>,
}

impl<'a, D> StatementsDisplay<'a, D> {
    fn new(stmts: &'a [Statement<D>], loops: Vec<Option<&'a str>>) -> Self {
        Self { stmts, loops }
    }

    fn block(&self, stmts: &'a [Statement<D>]) -> BlockDisplay<StatementsDisplay<'a, D>> {
        BlockDisplay(StatementsDisplay::new(stmts, self.loops.clone()))
    }

    fn fmt_stmt(&self, f: &mut Formatter<'_>, stmt: &'a Statement<D>) -> std::fmt::Result {
        match &stmt.kind {
            StatementKind::Assign(target, value) => write!(f, "{target} = {value}"),
            StatementKind::Break(depth) => match self.loops.iter().rev().nth(*depth) {
                Some(Some(label)) if *depth > 0 => write!(f, "break {label}"),
                _ => write!(f, "break"),
            },
            StatementKind::Call { function, args, untuple } => {
                fmt_apply(f, function, args, *untuple, false)
            },
            StatementKind::Forever { label, body } => {
                let mut loops = self.loops.clone();
                loops.push(label.as_deref());

                write!(f, "forever ")?;
                if let Some(label) = label {
                    write!(f, "{label} ")?;
                }
                write!(f, "{}", BlockDisplay(StatementsDisplay::new(body, loops)))
            },
            StatementKind::IfS { cond, then, otherwise } => {
                write!(f, "if {cond} {}", self.block(then))?;
                if !otherwise.is_empty() {
                    write!(f, " else {}", self.block(otherwise))?;
                }
                Ok(())
            },
            StatementKind::Let(bindings) => {
                write!(f, "let ")?;
                fmt_list(f, bindings)
            },
            StatementKind::Nested(body) => write!(f, "{}", self.block(body)),
            StatementKind::Return(value) => write!(f, "return {value}"),
        }
    }
}

impl<D> Display for StatementsDisplay<'_, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        fmt_mapped_list(f, self.stmts, "\n", |f, s| self.fmt_stmt(f, s))
    }
}

impl<D> Display for Statement<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        StatementsDisplay::new(std::slice::from_ref(self), vec![]).fmt(f)
    }
}

/// Whether an expression must be parenthesized to be juxtaposed, indexed, or called.
fn is_open<D>(e: &Expression<D>) -> bool {
    match &e.kind {
        ExpressionKind::AddressOf(_) | ExpressionKind::IfE { .. } | ExpressionKind::ValueAt(_) => true,
        ExpressionKind::Number(n) => n.starts_with('-'),
        _ => false
    }
}

/// An expression in a position that binds tightly.
struct Operand<'a, D>(&'a Expression<D>);
impl<D> Display for Operand<'_, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match is_open(self.0) {
            true  => write!(f, "({})", self.0),
            false => write!(f, "{}", self.0),
        }
    }
}

/// The operand of `*`, which only reads as a dereference when a name or a bracket follows it.
struct Pointee<'a, D>(&'a Expression<D>);
impl<D> Display for Pointee<'_, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match starts_with_number(self.0) {
            true  => write!(f, "({})", self.0),
            false => write!(f, "{}", Operand(self.0)),
        }
    }
}

/// Whether an expression prints with a number as its first character.
fn starts_with_number<D>(e: &Expression<D>) -> bool {
    match &e.kind {
        ExpressionKind::Number(_) => true,
        ExpressionKind::Index { base, .. }
        | ExpressionKind::Apply { function: base, untuple: true, .. } => !is_open(base) && starts_with_number(base),
        _ => false
    }
}

/// Prints an application.
///
/// Binary operators print infix. Other curried applications print as `f a b`,
/// wrapped in parentheses if `parens` is set.
fn fmt_apply<D>(f: &mut Formatter<'_>, function: &Expression<D>, args: &[Expression<D>], untuple: bool, parens: bool) -> std::fmt::Result {
    if untuple {
        write!(f, "{}(", Operand(function))?;
        fmt_list(f, args)?;
        return write!(f, ")");
    }

    if parens {
        write!(f, "(")?;
    }
    match (&function.kind, args) {
        (ExpressionKind::Variable(op), [left, right]) if binding_power(op).is_some() => {
            write!(f, "{left} {op} {right}")?;
        },
        _ => {
            write!(f, "{}", Operand(function))?;
            for arg in args {
                write!(f, " {}", Operand(arg))?;
            }
        }
    }
    if parens {
        write!(f, ")")?;
    }

    Ok(())
}

impl<D> Display for Expression<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ExpressionKind::AddressOf(target) => match target.kind {
                LValueKind::Indirect(_) => write!(f, "&({target})"),
                _ => write!(f, "&{target}"),
            },
            ExpressionKind::Apply { function, args, untuple } => fmt_apply(f, function, args, *untuple, true),
            ExpressionKind::AsType(e, t) => write!(f, "({e} : {t})"),
            ExpressionKind::BufferLiteral(elems) => {
                write!(f, "[")?;
                fmt_list(f, elems)?;
                write!(f, "]")
            },
            ExpressionKind::IfE { cond, then, otherwise } => write!(f, "if {cond} {{ {then} }} else {{ {otherwise} }}"),
            ExpressionKind::Index { base, offset } => write!(f, "{}[{offset}]", Operand(base)),
            ExpressionKind::Number(n) => write!(f, "{n}"),
            ExpressionKind::Tuple(elems) => fmt_tuple(f, elems),
            ExpressionKind::ValueAt(e) => write!(f, "*{}", Pointee(e)),
            ExpressionKind::Variable(name) => write!(f, "{name}"),
        }
    }
}

impl<D> Display for LValue<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            LValueKind::Direct(name) => write!(f, "{name}"),
            LValueKind::IndexL { base, offset } => match base.kind {
                LValueKind::Indirect(_) => write!(f, "({base})[{offset}]"),
                _ => write!(f, "{base}[{offset}]"),
            },
            LValueKind::Indirect(e) => write!(f, "*{}", Pointee(e)),
            LValueKind::TupleL(parts) => fmt_tuple(f, parts),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (self.modality, &self.kind) {
            (Modality::Mutable, k @ TypeKind::Arrow(_, _)) => write!(f, "var ({k})"),
            (Modality::Mutable, k) => write!(f, "var {k}"),
            (Modality::Immutable, k) => write!(f, "{k}"),
        }
    }
}

/// A type on the left of an arrow, or after `*` (if `after_star` is set).
struct TypeOperand<'a> {
    ty: &'a Type,
    after_star: bool,
}
impl Display for TypeOperand<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (self.ty.modality, &self.ty.kind) {
            (Modality::Immutable, TypeKind::Arrow(_, _)) => write!(f, "({})", self.ty),
            (Modality::Immutable, TypeKind::Ptr(_)) if self.after_star => write!(f, "({})", self.ty),
            _ => write!(f, "{}", self.ty),
        }
    }
}

impl Display for TypeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeKind::Ground(Ground::Unit) => write!(f, "()"),
            TypeKind::Ground(g) => write!(f, "{}", g.name()),
            TypeKind::Arrow(dom, cod) => write!(f, "{} -> {cod}", TypeOperand { ty: dom, after_star: false }),
            TypeKind::Buffer(size, elem) => match elem.kind {
                TypeKind::Arrow(_, _) => write!(f, "[{size}] ({elem})"),
                _ => write!(f, "[{size}] {elem}"),
            },
            TypeKind::Ptr(pointee) => write!(f, "*{}", TypeOperand { ty: pointee, after_star: true }),
            TypeKind::Tuple(members) => fmt_tuple(f, members),
            TypeKind::Unknown => write!(f, "_"),
        }
    }
}

impl Display for Nat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Nat::Literal(n) => write!(f, "{n}"),
            Nat::Unknown => Ok(()),
            Nat::External(name) => write!(f, "{name}"),
        }
    }
}
