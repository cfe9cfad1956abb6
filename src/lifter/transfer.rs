/*!
transfer.rs - register transfers (TAX/TAY/TXA/TYA/TSX/TXS) and the stack
opcode family (PHA/PLA/PHP/PLP).

Groups transfers and stack ops as one handler; `php`/`plp`'s B-flag
handling restores the live B and bit-5 values exactly as popped rather
than clearing B unconditionally (see DESIGN.md).
*/

use crate::ir::{BinaryOp, Flag, Stmt, Value};
use crate::lifter::T0;

const BREAK_AND_UNUSED_MASK: u8 = 0b0011_0000;
const BREAK_BIT: u8 = 0b0001_0000;

/// `TAX`/`TAY`/`TXA`/`TYA`/`TSX`: copy, then (if `update_flags`) set Z/N
/// from the destination. `TXS` passes `update_flags = false` — it is the
/// one transfer with no flag side effects.
pub(super) fn transfer(src: Value, dst: Value, update_flags: bool) -> Vec<Stmt> {
    let mut stmts = vec![Stmt::Copy { src, dst: dst.clone() }];
    if update_flags {
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
    }
    stmts
}

/// `PHA`: push the given register/value verbatim.
pub(super) fn push(src: Value) -> Vec<Stmt> {
    vec![Stmt::PushStackValue(src)]
}

/// `PHP`: push `P` with the B bit forced set in the stack image (the
/// live status byte is left untouched).
pub(super) fn push_status() -> Vec<Stmt> {
    vec![
        Stmt::Copy { src: Value::AllFlags, dst: T0 },
        Stmt::Binary {
            op: BinaryOp::Or,
            lhs: T0,
            rhs: Value::Constant(BREAK_BIT),
            dst: T0,
        },
        Stmt::PushStackValue(T0),
    ]
}

/// `PLA`: pop into `A`; Z/N from the popped value.
pub(super) fn pull_a() -> Vec<Stmt> {
    vec![
        Stmt::PopStackValue(Value::Register(crate::ir::Reg::A)),
        Stmt::Binary {
            op: BinaryOp::Equals,
            lhs: Value::Register(crate::ir::Reg::A),
            rhs: Value::Constant(0),
            dst: Value::Flag(Flag::Z),
        },
        Stmt::Binary {
            op: BinaryOp::GreaterThanOrEqualTo,
            lhs: Value::Register(crate::ir::Reg::A),
            rhs: Value::Constant(0x80),
            dst: Value::Flag(Flag::N),
        },
    ]
}

/// `PLP`: pop `P`, but bits 4 (B) and 5 (unused) of the popped byte are
/// ignored — they keep whatever the live status byte already had.
pub(super) fn pull_status() -> Vec<Stmt> {
    let t1 = Value::Variable(1);
    vec![
        Stmt::PopStackValue(T0),
        Stmt::Binary {
            op: BinaryOp::And,
            lhs: T0,
            rhs: Value::Constant(!BREAK_AND_UNUSED_MASK),
            dst: T0,
        },
        Stmt::Binary {
            op: BinaryOp::And,
            lhs: Value::AllFlags,
            rhs: Value::Constant(BREAK_AND_UNUSED_MASK),
            dst: t1.clone(),
        },
        Stmt::Binary {
            op: BinaryOp::Or,
            lhs: T0,
            rhs: t1,
            dst: Value::AllFlags,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Reg, validate};

    #[test]
    fn txs_has_no_flag_statements() {
        let stmts = transfer(Value::Register(Reg::X), Value::StackPointer, false);
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn tax_updates_zn() {
        let stmts = transfer(Value::Register(Reg::A), Value::Register(Reg::X), true);
        assert_eq!(stmts.len(), 3);
    }

    #[test]
    fn push_status_sets_break_bit_only_in_image() {
        let stmts = push_status();
        validate(&stmts).unwrap();
        assert!(matches!(stmts.last(), Some(Stmt::PushStackValue(_))));
    }

    #[test]
    fn pull_status_uses_dense_variables() {
        validate(&pull_status()).unwrap();
    }
}
