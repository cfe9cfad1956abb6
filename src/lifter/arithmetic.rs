/*!
arithmetic.rs - ADC/SBC opcode family, including the BCD decimal-mode path.

`D` is a runtime flag, not something the lifter can resolve at lift time,
so the lowering contains a genuine runtime branch between the binary and
decimal paths rather than picking one statically. Z/N/V are always taken
from the binary result (the documented MOS 6502 quirk, preserved here
rather than "fixed"), so they are computed once, ahead of the branch, and
committed in both arms.

`SBC` is lowered as `ADC` over the bitwise complement of the operand
(`SBC` is defined as `ADC(A, ~src, C)` in both modes), which is why
the shared lowering lives in [`adc_like`] and both public entry points are
thin wrappers around it.
*/

use crate::ir::{BinaryOp, Flag, Identifier, Reg, Stmt, UnaryOp, Value};

// Scratch locals. Reused across every ADC/SBC site in a method, the same
// way every other family reuses `Variable(0)` as its one temporary — see
// `lifter::T0`. ADC/SBC needs more than one live value at a time (the
// binary result, its carry/overflow bits, and the whole BCD nibble
// pipeline), so it claims a larger, but still fixed, block of indices.
const A_OLD: Value = Value::Variable(0);
const SUM1: Value = Value::Variable(1);
const C1: Value = Value::Variable(2);
const SUM2: Value = Value::Variable(3);
const C2: Value = Value::Variable(4);
const CARRY_BIN: Value = Value::Variable(5);
const V1: Value = Value::Variable(6);
const V2: Value = Value::Variable(7);
const V3: Value = Value::Variable(8);
const V4: Value = Value::Variable(9);
const V_BIN: Value = Value::Variable(10);
const Z_BIN: Value = Value::Variable(11);
const N_BIN: Value = Value::Variable(12);
const AL: Value = Value::Variable(13);
const SL: Value = Value::Variable(14);
const LO_SUM: Value = Value::Variable(15);
const LO_GT9: Value = Value::Variable(16);
const HI_A: Value = Value::Variable(17);
const HI_SRC: Value = Value::Variable(18);
const BCD: Value = Value::Variable(19);
const HI_GT99: Value = Value::Variable(20);
const DEC_CARRY: Value = Value::Variable(21);
const NOT_SRC: Value = Value::Variable(22);

pub(super) fn adc(src: Value, addr: u16) -> Vec<Stmt> {
    adc_like(src, addr, "adc")
}

pub(super) fn sbc(src: Value, addr: u16) -> Vec<Stmt> {
    let mut stmts = vec![Stmt::Unary { op: UnaryOp::BitwiseNot, src, dst: NOT_SRC }];
    stmts.extend(adc_like(NOT_SRC, addr, "sbc"));
    stmts
}

fn label(addr: u16, tag: &str, suffix: &str) -> Identifier {
    Identifier::new(format!("__{tag}_{addr:04X}_{suffix}"))
}

/// Shared ADC lowering. `src` is already the effective operand to add
/// (the complement, for `SBC`); `tag` disambiguates the labels `adc`
/// lowers from the ones `sbc` lowers at the same address.
fn adc_like(src: Value, addr: u16, tag: &str) -> Vec<Stmt> {
    let a = Value::Register(Reg::A);
    let label_decimal = label(addr, tag, "decimal");
    let label_finalize = label(addr, tag, "finalize");
    let label_lo_done = label(addr, tag, "lo_done");
    let label_no_carry = label(addr, tag, "no_carry");
    let label_carry_done = label(addr, tag, "carry_done");

    let mut s = Vec::new();

    // --- binary result, unconditionally (Z/N/V always come from here) ---
    s.push(Stmt::Copy { src: a.clone(), dst: A_OLD });
    s.push(Stmt::Binary { op: BinaryOp::Add, lhs: a.clone(), rhs: src.clone(), dst: SUM1 });
    s.push(Stmt::Binary { op: BinaryOp::LessThan, lhs: SUM1, rhs: a.clone(), dst: C1 });
    s.push(Stmt::Binary { op: BinaryOp::Add, lhs: SUM1, rhs: Value::Flag(Flag::C), dst: SUM2 });
    s.push(Stmt::Binary { op: BinaryOp::LessThan, lhs: SUM2, rhs: SUM1, dst: C2 });
    s.push(Stmt::Binary { op: BinaryOp::Or, lhs: C1, rhs: C2, dst: CARRY_BIN });
    s.push(Stmt::Binary { op: BinaryOp::Xor, lhs: A_OLD, rhs: SUM2, dst: V1 });
    s.push(Stmt::Binary { op: BinaryOp::Xor, lhs: src.clone(), rhs: SUM2, dst: V2 });
    s.push(Stmt::Binary { op: BinaryOp::And, lhs: V1, rhs: V2, dst: V3 });
    s.push(Stmt::Binary { op: BinaryOp::And, lhs: V3, rhs: Value::Constant(0x80), dst: V4 });
    s.push(Stmt::Binary { op: BinaryOp::NotEquals, lhs: V4, rhs: Value::Constant(0), dst: V_BIN });
    s.push(Stmt::Binary { op: BinaryOp::Equals, lhs: SUM2, rhs: Value::Constant(0), dst: Z_BIN });
    s.push(Stmt::Binary { op: BinaryOp::GreaterThanOrEqualTo, lhs: SUM2, rhs: Value::Constant(0x80), dst: N_BIN });

    // --- pick binary or decimal commit ---
    s.push(Stmt::JumpIfNotZero { src: Value::Flag(Flag::D), target: label_decimal.clone() });
    s.push(Stmt::Copy { src: SUM2, dst: a.clone() });
    s.push(Stmt::Copy { src: CARRY_BIN, dst: Value::Flag(Flag::C) });
    s.push(Stmt::Jump(label_finalize.clone()));

    // --- decimal (BCD) path: nibble-wise add-with-carry and 6-adjustment ---
    s.push(Stmt::Label(label_decimal));
    s.push(Stmt::Binary { op: BinaryOp::And, lhs: A_OLD, rhs: Value::Constant(0x0F), dst: AL });
    s.push(Stmt::Binary { op: BinaryOp::And, lhs: src.clone(), rhs: Value::Constant(0x0F), dst: SL });
    s.push(Stmt::Binary { op: BinaryOp::Add, lhs: AL, rhs: SL, dst: LO_SUM });
    s.push(Stmt::Binary { op: BinaryOp::Add, lhs: LO_SUM, rhs: Value::Flag(Flag::C), dst: LO_SUM });
    s.push(Stmt::Binary { op: BinaryOp::GreaterThan, lhs: LO_SUM, rhs: Value::Constant(9), dst: LO_GT9 });
    s.push(Stmt::JumpIfZero { src: LO_GT9, target: label_lo_done.clone() });
    s.push(Stmt::Binary { op: BinaryOp::Add, lhs: LO_SUM, rhs: Value::Constant(6), dst: LO_SUM });
    s.push(Stmt::Binary { op: BinaryOp::And, lhs: LO_SUM, rhs: Value::Constant(0x0F), dst: LO_SUM });
    s.push(Stmt::Binary { op: BinaryOp::Add, lhs: LO_SUM, rhs: Value::Constant(0x10), dst: LO_SUM });
    s.push(Stmt::Label(label_lo_done));
    s.push(Stmt::Binary { op: BinaryOp::And, lhs: A_OLD, rhs: Value::Constant(0xF0), dst: HI_A });
    s.push(Stmt::Binary { op: BinaryOp::And, lhs: src, rhs: Value::Constant(0xF0), dst: HI_SRC });
    s.push(Stmt::Binary { op: BinaryOp::Add, lhs: HI_A, rhs: HI_SRC, dst: BCD });
    s.push(Stmt::Binary { op: BinaryOp::Add, lhs: BCD, rhs: LO_SUM, dst: BCD });
    s.push(Stmt::Binary { op: BinaryOp::GreaterThan, lhs: BCD, rhs: Value::Constant(0x99), dst: HI_GT99 });
    s.push(Stmt::JumpIfZero { src: HI_GT99, target: label_no_carry.clone() });
    s.push(Stmt::Binary { op: BinaryOp::Add, lhs: BCD, rhs: Value::Constant(0x60), dst: BCD });
    s.push(Stmt::Copy { src: Value::Constant(1), dst: DEC_CARRY });
    s.push(Stmt::Jump(label_carry_done.clone()));
    s.push(Stmt::Label(label_no_carry));
    s.push(Stmt::Copy { src: Value::Constant(0), dst: DEC_CARRY });
    s.push(Stmt::Label(label_carry_done));
    s.push(Stmt::Copy { src: BCD, dst: a });
    s.push(Stmt::Copy { src: DEC_CARRY, dst: Value::Flag(Flag::C) });

    // --- flags common to both arms ---
    s.push(Stmt::Label(label_finalize));
    s.push(Stmt::Copy { src: Z_BIN, dst: Value::Flag(Flag::Z) });
    s.push(Stmt::Copy { src: N_BIN, dst: Value::Flag(Flag::N) });
    s.push(Stmt::Copy { src: V_BIN, dst: Value::Flag(Flag::V) });

    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::validate;

    #[test]
    fn adc_lowering_validates() {
        validate(&adc(Value::Constant(0x34), 0x8000)).unwrap();
    }

    #[test]
    fn sbc_lowering_validates() {
        validate(&sbc(Value::Constant(0x02), 0x8010)).unwrap();
    }

    #[test]
    fn adc_and_sbc_at_same_address_use_disjoint_labels() {
        let mut stmts = adc(Value::Constant(1), 0x9000);
        stmts.extend(sbc(Value::Constant(1), 0x9000));
        validate(&stmts).unwrap();
    }

    #[test]
    fn sbc_complements_before_reusing_adc() {
        let stmts = sbc(Value::Constant(0x02), 0x8010);
        assert!(matches!(
            stmts[0],
            Stmt::Unary { op: UnaryOp::BitwiseNot, dst: NOT_SRC, .. }
        ));
    }
}
