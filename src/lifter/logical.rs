/*!
logical.rs - AND/ORA/EOR/BIT opcode family.

`BIT` is the one instruction in this family that does not write the
accumulator: N and V come from bits 7 and 6 of the memory operand, not
from the AND result. Bit extraction is expressed as a right shift
followed by a copy into a 1-bit flag destination, which truncates to the
low bit per the IR's width-truncation invariant.
*/

use crate::ir::{BinaryOp, Flag, Reg, Stmt, Value};
use crate::lifter::T0;

/// `AND`/`ORA`/`EOR`: `A <- A op src`; Z/N from the result.
pub(super) fn bitwise(op: BinaryOp, src: Value) -> Vec<Stmt> {
    let a = Value::Register(Reg::A);
    vec![
        Stmt::Binary { op, lhs: a.clone(), rhs: src, dst: a.clone() },
        Stmt::Binary {
            op: BinaryOp::Equals,
            lhs: a.clone(),
            rhs: Value::Constant(0),
            dst: Value::Flag(Flag::Z),
        },
        Stmt::Binary {
            op: BinaryOp::GreaterThanOrEqualTo,
            lhs: a,
            rhs: Value::Constant(0x80),
            dst: Value::Flag(Flag::N),
        },
    ]
}

/// `BIT`: `Z` from `A & src == 0`; `N`/`V` from bits 7/6 of `src`. `A` is
/// left untouched.
pub(super) fn bit(src: Value) -> Vec<Stmt> {
    vec![
        Stmt::Binary {
            op: BinaryOp::And,
            lhs: Value::Register(Reg::A),
            rhs: src.clone(),
            dst: T0,
        },
        Stmt::Binary {
            op: BinaryOp::Equals,
            lhs: T0,
            rhs: Value::Constant(0),
            dst: Value::Flag(Flag::Z),
        },
        Stmt::Binary {
            op: BinaryOp::ShiftRight,
            lhs: src.clone(),
            rhs: Value::Constant(7),
            dst: T0,
        },
        Stmt::Copy { src: T0, dst: Value::Flag(Flag::N) },
        Stmt::Binary {
            op: BinaryOp::ShiftRight,
            lhs: src,
            rhs: Value::Constant(6),
            dst: T0,
        },
        Stmt::Copy { src: T0, dst: Value::Flag(Flag::V) },
    ]
}
