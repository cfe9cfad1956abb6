/*!
incdec.rs - INC/DEC/INX/DEX/INY/DEY opcode family. No effect on C or V.
*/

use crate::ir::{BinaryOp, Flag, Stmt, Value};

pub(super) fn step(target: Value, op: BinaryOp) -> Vec<Stmt> {
    debug_assert!(matches!(op, BinaryOp::Add | BinaryOp::Subtract));
    vec![
        Stmt::Binary { op, lhs: target.clone(), rhs: Value::Constant(1), dst: target.clone() },
        Stmt::Binary {
            op: BinaryOp::Equals,
            lhs: target.clone(),
            rhs: Value::Constant(0),
            dst: Value::Flag(Flag::Z),
        },
        Stmt::Binary {
            op: BinaryOp::GreaterThanOrEqualTo,
            lhs: target,
            rhs: Value::Constant(0x80),
            dst: Value::Flag(Flag::N),
        },
    ]
}
