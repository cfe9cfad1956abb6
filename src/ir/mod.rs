/*!
ir/mod.rs - the intermediate representation: value operands, statements,
and the invariants that every backend may assume hold once `validate`
has accepted a sequence.

This module performs no interpretation of its own. It is the contract
between the lifter (`crate::lifter`) and every backend (`crate::interpreter`
today, a native-code backend tomorrow).
*/

use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::IrError;

/// A label key. Appears only as the target of control-flow statements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named 8-bit CPU register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Reg {
    A,
    X,
    Y,
}

/// A single status-register bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Flag {
    C,
    Z,
    I,
    D,
    B,
    V,
    N,
}

/// Bit width of a value operand, fixed by its variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Bit1,
    Bit8,
}

/// A value operand referenced by an IR statement.
///
/// Every variant has a fixed width (1 or 8 bits, see [`Value::width`]) and a
/// fixed readable/writable designation enforced by how statements use it,
/// not by the type itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// Immediate byte; read-only.
    Constant(u8),
    /// A named CPU register.
    Register(Reg),
    /// The 8-bit stack pointer.
    StackPointer,
    /// A single status bit, stored/compared as 0/1.
    Flag(Flag),
    /// The packed processor-status byte (bit 5 always reads as 1).
    AllFlags,
    /// Effective address = `base` plus optional index register, wrapped to
    /// 8 bits when `zero_page_wrap`, else 16 bits.
    Memory {
        base: u16,
        index: Option<Reg>,
        zero_page_wrap: bool,
    },
    /// `post_index = false`: indexed-indirect `(zp,X)`.
    /// `post_index = true`: indirect-indexed `(zp),Y`.
    IndirectMemory { zp: u8, post_index: bool },
    /// Scratch local scoped to one compiled method; lifter temporaries only.
    Variable(u32),
}

impl Value {
    pub fn width(&self) -> Width {
        match self {
            Value::Flag(_) => Width::Bit1,
            _ => Width::Bit8,
        }
    }
}

/// Unary operators over a single 8-bit operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnaryOp {
    BitwiseNot,
}

/// Binary operators. Arithmetic is unsigned modulo 256; comparisons yield
/// 0 or 1; shifts shift by the rhs and yield 0 for shifts of >= 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BinaryOp {
    Add,
    Subtract,
    And,
    Or,
    Xor,
    ShiftLeft,
    ShiftRight,
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,
}

/// One statement of a compiled method. A method is an ordered sequence of
/// these, addressed by a statement program counter at execution time.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Stmt {
    Copy { src: Value, dst: Value },
    Unary { op: UnaryOp, src: Value, dst: Value },
    Binary { op: BinaryOp, lhs: Value, rhs: Value, dst: Value },
    Label(Identifier),
    JumpIfZero { src: Value, target: Identifier },
    JumpIfNotZero { src: Value, target: Identifier },
    Jump(Identifier),
    PushStackValue(Value),
    PopStackValue(Value),
    CallMethod(u16),
    /// Like `CallMethod`, but the 16-bit target isn't known until runtime:
    /// `(hi << 8) | lo`. Used by `RTS`/`RTI`, whose target comes off the
    /// stack rather than out of the instruction bytes, and is free to have
    /// been rewritten in place (the stack-redirection trick).
    CallMethodDynamic { hi: Value, lo: Value },
    /// Ask the driver for permission to continue; on a positive answer,
    /// transfer to `fallback` as if by `CallMethod` without executing the
    /// statements that follow.
    PollForRecompilation(u16),
    /// Ask the HAL for a pending interrupt vector; if non-zero, service it
    /// and transfer to the vector's target, pushing `fallback` as the
    /// return address.
    PollForInterrupt(u16),
}

impl Stmt {
    /// Exhaustive, hand-written visitor over the `Value` operands a
    /// statement contains. `max_variable_index` and similar queries are
    /// built on top of this rather than duplicating the traversal.
    pub fn visit_values<'a>(&'a self, f: &mut dyn FnMut(&'a Value)) {
        match self {
            Stmt::Copy { src, dst } => {
                f(src);
                f(dst);
            }
            Stmt::Unary { src, dst, .. } => {
                f(src);
                f(dst);
            }
            Stmt::Binary { lhs, rhs, dst, .. } => {
                f(lhs);
                f(rhs);
                f(dst);
            }
            Stmt::JumpIfZero { src, .. } => f(src),
            Stmt::JumpIfNotZero { src, .. } => f(src),
            Stmt::PushStackValue(v) => f(v),
            Stmt::PopStackValue(v) => f(v),
            Stmt::CallMethodDynamic { hi, lo } => {
                f(hi);
                f(lo);
            }
            Stmt::Label(_)
            | Stmt::Jump(_)
            | Stmt::CallMethod(_)
            | Stmt::PollForRecompilation(_)
            | Stmt::PollForInterrupt(_) => {}
        }
    }

    /// Mutable counterpart of [`Stmt::visit_values`], used by backends that
    /// rewrite operands in place (e.g. resolving `Variable` indices).
    pub fn visit_values_mut(&mut self, f: &mut dyn FnMut(&mut Value)) {
        match self {
            Stmt::Copy { src, dst } => {
                f(src);
                f(dst);
            }
            Stmt::Unary { src, dst, .. } => {
                f(src);
                f(dst);
            }
            Stmt::Binary { lhs, rhs, dst, .. } => {
                f(lhs);
                f(rhs);
                f(dst);
            }
            Stmt::JumpIfZero { src, .. } => f(src),
            Stmt::JumpIfNotZero { src, .. } => f(src),
            Stmt::PushStackValue(v) => f(v),
            Stmt::PopStackValue(v) => f(v),
            Stmt::CallMethodDynamic { hi, lo } => {
                f(hi);
                f(lo);
            }
            Stmt::Label(_)
            | Stmt::Jump(_)
            | Stmt::CallMethod(_)
            | Stmt::PollForRecompilation(_)
            | Stmt::PollForInterrupt(_) => {}
        }
    }

    fn jump_target(&self) -> Option<&Identifier> {
        match self {
            Stmt::JumpIfZero { target, .. } => Some(target),
            Stmt::JumpIfNotZero { target, .. } => Some(target),
            Stmt::Jump(target) => Some(target),
            _ => None,
        }
    }
}

/// Highest `Variable` index referenced anywhere in `stmts`, or `None` if the
/// sequence uses no scratch locals. Used by the generator to size the
/// method's scratch frame.
pub fn max_variable_index(stmts: &[Stmt]) -> Option<u32> {
    let mut max = None;
    for stmt in stmts {
        stmt.visit_values(&mut |v| {
            if let Value::Variable(idx) = v {
                max = Some(max.map_or(*idx, |m: u32| m.max(*idx)));
            }
        });
    }
    max
}

/// Checks label uniqueness, reachable-label existence, and variable-density
/// invariants over a method body. A `true`-returning `validate` (i.e. `Ok`)
/// is the generator's precondition for success.
pub fn validate(stmts: &[Stmt]) -> Result<(), IrError> {
    let mut defined: HashSet<&Identifier> = HashSet::new();
    for stmt in stmts {
        if let Stmt::Label(id) = stmt {
            if !defined.insert(id) {
                return Err(IrError::DuplicateLabel(id.clone()));
            }
        }
    }
    for stmt in stmts {
        if let Some(target) = stmt.jump_target() {
            if !defined.contains(target) {
                return Err(IrError::UndefinedLabel(target.clone()));
            }
        }
    }

    let mut used: HashSet<u32> = HashSet::new();
    for stmt in stmts {
        stmt.visit_values(&mut |v| {
            if let Value::Variable(idx) = v {
                used.insert(*idx);
            }
        });
    }
    if !used.is_empty() {
        let max = *used.iter().max().unwrap();
        for idx in 0..=max {
            if !used.contains(&idx) {
                return Err(IrError::NonDenseVariables { missing: idx, max });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_empty() {
        assert!(validate(&[]).is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_label() {
        let stmts = vec![
            Stmt::Label(Identifier::new("l0")),
            Stmt::Label(Identifier::new("l0")),
        ];
        assert_eq!(
            validate(&stmts),
            Err(IrError::DuplicateLabel(Identifier::new("l0")))
        );
    }

    #[test]
    fn validate_rejects_undefined_label() {
        let stmts = vec![Stmt::Jump(Identifier::new("nowhere"))];
        assert_eq!(
            validate(&stmts),
            Err(IrError::UndefinedLabel(Identifier::new("nowhere")))
        );
    }

    #[test]
    fn validate_rejects_non_dense_variables() {
        let stmts = vec![Stmt::Copy {
            src: Value::Constant(1),
            dst: Value::Variable(2),
        }];
        assert_eq!(
            validate(&stmts),
            Err(IrError::NonDenseVariables { missing: 0, max: 2 })
        );
    }

    #[test]
    fn max_variable_index_tracks_highest_used() {
        let stmts = vec![
            Stmt::Copy {
                src: Value::Variable(0),
                dst: Value::Variable(1),
            },
            Stmt::Binary {
                op: BinaryOp::Add,
                lhs: Value::Variable(1),
                rhs: Value::Constant(1),
                dst: Value::Variable(3),
            },
        ];
        assert_eq!(max_variable_index(&stmts), Some(3));
    }

    #[test]
    fn max_variable_index_none_without_variables() {
        let stmts = vec![Stmt::Copy {
            src: Value::Constant(1),
            dst: Value::Register(Reg::A),
        }];
        assert_eq!(max_variable_index(&stmts), None);
    }
}
