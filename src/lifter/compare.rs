/*!
compare.rs - CMP/CPX/CPY opcode family. The register is never written; V
is unaffected.
*/

use crate::ir::{BinaryOp, Flag, Reg, Stmt, Value};
use crate::lifter::T0;

pub(super) fn compare(reg: Reg, src: Value) -> Vec<Stmt> {
    let reg = Value::Register(reg);
    vec![
        Stmt::Binary { op: BinaryOp::Subtract, lhs: reg.clone(), rhs: src.clone(), dst: T0 },
        Stmt::Binary {
            op: BinaryOp::GreaterThanOrEqualTo,
            lhs: reg.clone(),
            rhs: src.clone(),
            dst: Value::Flag(Flag::C),
        },
        Stmt::Binary { op: BinaryOp::Equals, lhs: reg, rhs: src, dst: Value::Flag(Flag::Z) },
        Stmt::Binary { op: BinaryOp::ShiftRight, lhs: T0, rhs: Value::Constant(7), dst: T0 },
        Stmt::Copy { src: T0, dst: Value::Flag(Flag::N) },
    ]
}
