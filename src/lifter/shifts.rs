/*!
shifts.rs - ASL/LSR/ROL/ROR opcode family, on either `Register(A)`
(accumulator addressing) or a memory operand.

The carry-out bit is captured before the shift overwrites `C`, and for the
rotate variants the carry-in (the *old* `C`, captured before it is
overwritten) is merged back into the shifted result as an
already-computed `old_C_in_bit0_or_bit7`, which only exists if
the lifter saves it first.
*/

use crate::ir::{BinaryOp, Flag, Stmt, Value};
use crate::lifter::T0;

const T1: Value = Value::Variable(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ShiftKind {
    Asl,
    Lsr,
    Rol,
    Ror,
}

pub(super) fn shift(kind: ShiftKind, operand: Value) -> Vec<Stmt> {
    let dst = operand.clone();
    let mut stmts = Vec::new();
    match kind {
        ShiftKind::Asl => {
            stmts.push(bit7_into(&operand, T0));
            stmts.push(Stmt::Copy { src: T0, dst: Value::Flag(Flag::C) });
            stmts.push(Stmt::Binary {
                op: BinaryOp::ShiftLeft,
                lhs: operand,
                rhs: Value::Constant(1),
                dst: dst.clone(),
            });
        }
        ShiftKind::Lsr => {
            stmts.push(Stmt::Copy { src: operand.clone(), dst: Value::Flag(Flag::C) });
            stmts.push(Stmt::Binary {
                op: BinaryOp::ShiftRight,
                lhs: operand,
                rhs: Value::Constant(1),
                dst: dst.clone(),
            });
        }
        ShiftKind::Rol => {
            stmts.push(Stmt::Copy { src: Value::Flag(Flag::C), dst: T0 });
            stmts.push(bit7_into(&operand, T1));
            stmts.push(Stmt::Copy { src: T1, dst: Value::Flag(Flag::C) });
            stmts.push(Stmt::Binary {
                op: BinaryOp::ShiftLeft,
                lhs: operand,
                rhs: Value::Constant(1),
                dst: dst.clone(),
            });
            stmts.push(Stmt::Binary { op: BinaryOp::Or, lhs: dst.clone(), rhs: T0, dst: dst.clone() });
        }
        ShiftKind::Ror => {
            stmts.push(Stmt::Copy { src: Value::Flag(Flag::C), dst: T0 });
            stmts.push(Stmt::Copy { src: operand.clone(), dst: Value::Flag(Flag::C) });
            stmts.push(Stmt::Binary {
                op: BinaryOp::ShiftRight,
                lhs: operand,
                rhs: Value::Constant(1),
                dst: dst.clone(),
            });
            stmts.push(Stmt::Binary { op: BinaryOp::ShiftLeft, lhs: T0, rhs: Value::Constant(7), dst: T0 });
            stmts.push(Stmt::Binary { op: BinaryOp::Or, lhs: dst.clone(), rhs: T0, dst: dst.clone() });
        }
    }
    stmts.push(Stmt::Binary {
        op: BinaryOp::Equals,
        lhs: dst.clone(),
        rhs: Value::Constant(0),
        dst: Value::Flag(Flag::Z),
    });
    stmts.push(Stmt::Binary {
        op: BinaryOp::GreaterThanOrEqualTo,
        lhs: dst,
        rhs: Value::Constant(0x80),
        dst: Value::Flag(Flag::N),
    });
    stmts
}

fn bit7_into(src: &Value, tmp: Value) -> Stmt {
    Stmt::Binary {
        op: BinaryOp::ShiftRight,
        lhs: src.clone(),
        rhs: Value::Constant(7),
        dst: tmp,
    }
}
