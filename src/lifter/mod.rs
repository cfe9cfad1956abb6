/*!
lifter/mod.rs - C2: maps one decoded 6502 instruction to an ordered IR
sequence.

The mnemonic-to-IR mapping is data-driven rather than class-hierarchical:
`lift` is a single match on [`Mnemonic`] that delegates to a small
per-family module, one module per instruction family.
Each family function is a pure `(operands..) -> Vec<Stmt>`; none of them
touch a `Hal` or a `Driver`.
*/

mod arithmetic;
mod branches;
mod compare;
mod control_flow;
mod flags;
mod incdec;
mod load_store;
mod logical;
mod shifts;
pub mod table;
mod transfer;

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::LifterError;
use crate::ir::{Identifier, Reg, Stmt, Value};

/// One scratch local used as the lifter's single per-instruction temporary.
pub(crate) const T0: Value = Value::Variable(0);

/// The closed set of documented 6502 mnemonics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs,
    Clc, Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny,
    Jmp, Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror,
    Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
}

/// The closed set of documented 6502 addressing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndexedIndirect,
    IndirectIndexed,
    Relative,
}

/// One decoded 6502 instruction, as the (out-of-scope) disassembler would
/// hand it to the lifter. `target_address` is populated by the
/// disassembler for every control-flow opcode (branches, `JMP`, `JSR`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisassembledInstruction {
    pub opcode: u8,
    pub bytes: Vec<u8>,
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    pub cpu_address: Option<u16>,
    pub target_address: Option<u16>,
}

impl DisassembledInstruction {
    /// Address of the instruction immediately following this one, derived
    /// from `cpu_address` and the instruction's encoded length.
    fn next_address(&self) -> Option<u16> {
        self.cpu_address
            .map(|addr| addr.wrapping_add(self.bytes.len() as u16))
    }
}

/// Label table (`addr -> name`) consulted when the lifter emits a branch
/// or call target.
#[derive(Debug, Default, Clone)]
pub struct LiftContext {
    pub labels: HashMap<u16, String>,
}

impl LiftContext {
    pub fn new(labels: HashMap<u16, String>) -> Self {
        Self { labels }
    }

    /// Resolve a 6502 address to the `Identifier` a jump/call to it should
    /// use, falling back to a canonical name when the label table has no
    /// entry (the entry point of a not-yet-discovered routine, say).
    pub fn label_for(&self, addr: u16) -> Identifier {
        match self.labels.get(&addr) {
            Some(name) => Identifier::new(name.clone()),
            None => Identifier::new(format!("L_{addr:04X}")),
        }
    }
}

/// Decodes a raw opcode byte and lifts it in one step, giving
/// [`LifterError::UnsupportedOpcode`] its only call site: `lift`'s own
/// `lift_body` match is exhaustive over the closed [`Mnemonic`] enum and
/// can never fail this way, since by the time an instruction reaches it,
/// something has already decoded the opcode successfully.
pub fn lift_opcode(bytes: &[u8], cpu_address: u16, ctx: &LiftContext) -> Result<Vec<Stmt>, LifterError> {
    let opcode = *bytes.first().ok_or(LifterError::TypeMismatch)?;
    let (mnemonic, mode, len) = table::decode(opcode).ok_or(LifterError::UnsupportedOpcode(opcode))?;
    let bytes = bytes.get(..len as usize).ok_or(LifterError::TypeMismatch)?.to_vec();
    let target_address = resolve_target_address(mnemonic, mode, &bytes, cpu_address);
    let instr = DisassembledInstruction { opcode, bytes, mnemonic, mode, cpu_address: Some(cpu_address), target_address };
    lift(&instr, ctx)
}

/// Computes `target_address` for the instructions whose target is fully
/// determined by their own bytes (relative branches, absolute `JMP`/`JSR`).
/// Indirect `JMP`'s target depends on a memory read this module has no
/// access to, and is left for the disassembler to resolve, as elsewhere.
fn resolve_target_address(mnemonic: Mnemonic, mode: AddressingMode, bytes: &[u8], cpu_address: u16) -> Option<u16> {
    match mode {
        AddressingMode::Relative => {
            let offset = *bytes.get(1)? as i8;
            Some(cpu_address.wrapping_add(bytes.len() as u16).wrapping_add(offset as i16 as u16))
        }
        AddressingMode::Absolute if matches!(mnemonic, Mnemonic::Jmp | Mnemonic::Jsr) => {
            let lo = *bytes.get(1)? as u16;
            let hi = *bytes.get(2)? as u16;
            Some(lo | (hi << 8))
        }
        _ => None,
    }
}

/// Lift one decoded instruction to its IR sequence.
pub fn lift(instr: &DisassembledInstruction, ctx: &LiftContext) -> Result<Vec<Stmt>, LifterError> {
    let mut stmts = lift_body(instr, ctx)?;
    if may_write_compiled_code(instr.mnemonic, instr.mode) {
        let fallback = instr
            .next_address()
            .ok_or(LifterError::MissingTarget {
                cpu_address: instr.cpu_address,
            })?;
        stmts.push(Stmt::PollForRecompilation(fallback));
    }
    Ok(stmts)
}

fn lift_body(instr: &DisassembledInstruction, ctx: &LiftContext) -> Result<Vec<Stmt>, LifterError> {
    use Mnemonic::*;
    match instr.mnemonic {
        Lda => Ok(load_store::load(Reg::A, operand(instr)?)),
        Ldx => Ok(load_store::load(Reg::X, operand(instr)?)),
        Ldy => Ok(load_store::load(Reg::Y, operand(instr)?)),
        Sta => Ok(load_store::store(Reg::A, operand(instr)?)),
        Stx => Ok(load_store::store(Reg::X, operand(instr)?)),
        Sty => Ok(load_store::store(Reg::Y, operand(instr)?)),

        Tax => Ok(transfer::transfer(Value::Register(Reg::A), Value::Register(Reg::X), true)),
        Tay => Ok(transfer::transfer(Value::Register(Reg::A), Value::Register(Reg::Y), true)),
        Txa => Ok(transfer::transfer(Value::Register(Reg::X), Value::Register(Reg::A), true)),
        Tya => Ok(transfer::transfer(Value::Register(Reg::Y), Value::Register(Reg::A), true)),
        Tsx => Ok(transfer::transfer(Value::StackPointer, Value::Register(Reg::X), true)),
        Txs => Ok(transfer::transfer(Value::Register(Reg::X), Value::StackPointer, false)),

        Pha => Ok(transfer::push(Value::Register(Reg::A))),
        Php => Ok(transfer::push_status()),
        Pla => Ok(transfer::pull_a()),
        Plp => Ok(transfer::pull_status()),

        Clc => Ok(flags::set_flag(crate::ir::Flag::C, false)),
        Sec => Ok(flags::set_flag(crate::ir::Flag::C, true)),
        Cli => Ok(flags::set_flag(crate::ir::Flag::I, false)),
        Sei => Ok(flags::set_flag(crate::ir::Flag::I, true)),
        Cld => Ok(flags::set_flag(crate::ir::Flag::D, false)),
        Sed => Ok(flags::set_flag(crate::ir::Flag::D, true)),
        Clv => Ok(flags::set_flag(crate::ir::Flag::V, false)),

        And => Ok(logical::bitwise(crate::ir::BinaryOp::And, operand(instr)?)),
        Ora => Ok(logical::bitwise(crate::ir::BinaryOp::Or, operand(instr)?)),
        Eor => Ok(logical::bitwise(crate::ir::BinaryOp::Xor, operand(instr)?)),
        Bit => Ok(logical::bit(operand(instr)?)),

        Asl => Ok(shifts::shift(shifts::ShiftKind::Asl, operand_rmw(instr)?)),
        Lsr => Ok(shifts::shift(shifts::ShiftKind::Lsr, operand_rmw(instr)?)),
        Rol => Ok(shifts::shift(shifts::ShiftKind::Rol, operand_rmw(instr)?)),
        Ror => Ok(shifts::shift(shifts::ShiftKind::Ror, operand_rmw(instr)?)),

        Inc => Ok(incdec::step(operand_rmw(instr)?, crate::ir::BinaryOp::Add)),
        Dec => Ok(incdec::step(operand_rmw(instr)?, crate::ir::BinaryOp::Subtract)),
        Inx => Ok(incdec::step(Value::Register(Reg::X), crate::ir::BinaryOp::Add)),
        Dex => Ok(incdec::step(Value::Register(Reg::X), crate::ir::BinaryOp::Subtract)),
        Iny => Ok(incdec::step(Value::Register(Reg::Y), crate::ir::BinaryOp::Add)),
        Dey => Ok(incdec::step(Value::Register(Reg::Y), crate::ir::BinaryOp::Subtract)),

        Cmp => Ok(compare::compare(Reg::A, operand(instr)?)),
        Cpx => Ok(compare::compare(Reg::X, operand(instr)?)),
        Cpy => Ok(compare::compare(Reg::Y, operand(instr)?)),

        Adc => {
            let addr = instr.cpu_address.ok_or(LifterError::MissingTarget { cpu_address: None })?;
            Ok(arithmetic::adc(operand(instr)?, addr))
        }
        Sbc => {
            let addr = instr.cpu_address.ok_or(LifterError::MissingTarget { cpu_address: None })?;
            Ok(arithmetic::sbc(operand(instr)?, addr))
        }

        Bcc => branches::branch(crate::ir::Flag::C, false, instr, ctx),
        Bcs => branches::branch(crate::ir::Flag::C, true, instr, ctx),
        Bne => branches::branch(crate::ir::Flag::Z, false, instr, ctx),
        Beq => branches::branch(crate::ir::Flag::Z, true, instr, ctx),
        Bpl => branches::branch(crate::ir::Flag::N, false, instr, ctx),
        Bmi => branches::branch(crate::ir::Flag::N, true, instr, ctx),
        Bvc => branches::branch(crate::ir::Flag::V, false, instr, ctx),
        Bvs => branches::branch(crate::ir::Flag::V, true, instr, ctx),

        Jmp => control_flow::jmp(instr),
        Jsr => control_flow::jsr(instr),
        Rts => Ok(control_flow::rts()),
        Rti => Ok(control_flow::rti()),
        Brk => Ok(control_flow::brk(instr)),
        Nop => Ok(Vec::new()),
    }
}

/// Decode the effective-memory-cell operand for the instructions that read
/// or write through one. Not called for
/// `Implied`/`Relative`/`Indirect` modes, which are handled by their own
/// mnemonic family.
fn operand(instr: &DisassembledInstruction) -> Result<Value, LifterError> {
    use AddressingMode::*;
    let b = &instr.bytes;
    let byte1 = || b.get(1).copied().ok_or(LifterError::TypeMismatch);
    let word = || -> Result<u16, LifterError> {
        let lo = *b.get(1).ok_or(LifterError::TypeMismatch)? as u16;
        let hi = *b.get(2).ok_or(LifterError::TypeMismatch)? as u16;
        Ok(lo | (hi << 8))
    };
    Ok(match instr.mode {
        Immediate => Value::Constant(byte1()?),
        ZeroPage => Value::Memory { base: byte1()? as u16, index: None, zero_page_wrap: true },
        ZeroPageX => Value::Memory { base: byte1()? as u16, index: Some(Reg::X), zero_page_wrap: true },
        ZeroPageY => Value::Memory { base: byte1()? as u16, index: Some(Reg::Y), zero_page_wrap: true },
        Absolute => Value::Memory { base: word()?, index: None, zero_page_wrap: false },
        AbsoluteX => Value::Memory { base: word()?, index: Some(Reg::X), zero_page_wrap: false },
        AbsoluteY => Value::Memory { base: word()?, index: Some(Reg::Y), zero_page_wrap: false },
        IndexedIndirect => Value::IndirectMemory { zp: byte1()?, post_index: false },
        IndirectIndexed => Value::IndirectMemory { zp: byte1()?, post_index: true },
        Accumulator => Value::Register(Reg::A),
        Implied | Indirect | Relative => return Err(LifterError::TypeMismatch),
    })
}

/// Like [`operand`], but for the read-modify-write family (`ASL`/`LSR`/
/// `ROL`/`ROR`/`INC`/`DEC`), which additionally allows `Accumulator` mode.
fn operand_rmw(instr: &DisassembledInstruction) -> Result<Value, LifterError> {
    operand(instr)
}

/// Cross-cutting policy: emit `PollForRecompilation` after any
/// non-branch instruction that could have written to memory hosting
/// compiled code.
fn may_write_compiled_code(mnemonic: Mnemonic, mode: AddressingMode) -> bool {
    use Mnemonic::*;
    match mnemonic {
        Sta | Stx | Sty | Pha | Php => true,
        Asl | Lsr | Rol | Ror | Inc | Dec => mode != AddressingMode::Accumulator,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instr(opcode: u8, bytes: Vec<u8>, mnemonic: Mnemonic, mode: AddressingMode, cpu_address: u16) -> DisassembledInstruction {
        DisassembledInstruction {
            opcode,
            bytes,
            mnemonic,
            mode,
            cpu_address: Some(cpu_address),
            target_address: None,
        }
    }

    #[test]
    fn lda_immediate_lowers_to_copy_and_flags() {
        let i = instr(0xA9, vec![0xA9, 0x42], Mnemonic::Lda, AddressingMode::Immediate, 0x8000);
        let ctx = LiftContext::default();
        let stmts = lift(&i, &ctx).unwrap();
        assert!(matches!(stmts[0], Stmt::Copy { .. }));
        assert_eq!(stmts.len(), 3);
    }

    #[test]
    fn sta_absolute_emits_recompile_poll() {
        let i = instr(0x8D, vec![0x8D, 0x00, 0x40], Mnemonic::Sta, AddressingMode::Absolute, 0x8000);
        let ctx = LiftContext::default();
        let stmts = lift(&i, &ctx).unwrap();
        assert_eq!(stmts.last(), Some(&Stmt::PollForRecompilation(0x8003)));
    }

    #[test]
    fn asl_accumulator_has_no_recompile_poll() {
        let i = instr(0x0A, vec![0x0A], Mnemonic::Asl, AddressingMode::Accumulator, 0x8000);
        let ctx = LiftContext::default();
        let stmts = lift(&i, &ctx).unwrap();
        assert!(!stmts.iter().any(|s| matches!(s, Stmt::PollForRecompilation(_))));
    }

    #[test]
    fn nop_lowers_to_nothing() {
        let i = instr(0xEA, vec![0xEA], Mnemonic::Nop, AddressingMode::Implied, 0x8000);
        let ctx = LiftContext::default();
        assert!(lift(&i, &ctx).unwrap().is_empty());
    }

    #[test]
    fn jmp_without_target_fails() {
        let i = instr(0x4C, vec![0x4C, 0x00, 0x90], Mnemonic::Jmp, AddressingMode::Absolute, 0x8000);
        let ctx = LiftContext::default();
        assert_eq!(
            lift(&i, &ctx),
            Err(LifterError::MissingTarget { cpu_address: Some(0x8000) })
        );
    }

    #[test]
    fn lift_is_deterministic() {
        let i = instr(0x69, vec![0x69, 0x10], Mnemonic::Adc, AddressingMode::Immediate, 0x8000);
        let ctx = LiftContext::default();
        assert_eq!(lift(&i, &ctx), lift(&i, &ctx));
    }

    #[test]
    fn lift_opcode_rejects_an_undocumented_byte() {
        let ctx = LiftContext::default();
        assert_eq!(lift_opcode(&[0x02], 0x8000, &ctx), Err(LifterError::UnsupportedOpcode(0x02)));
    }

    #[test]
    fn lift_opcode_rejects_a_truncated_instruction() {
        let ctx = LiftContext::default();
        assert_eq!(lift_opcode(&[0x6D, 0x00], 0x8000, &ctx), Err(LifterError::TypeMismatch));
    }

    #[test]
    fn lift_opcode_resolves_a_branch_target_from_its_own_bytes() {
        let ctx = LiftContext::default();
        // BNE with a +$05 offset: target = 0x8000 + 2 + 5.
        let stmts = lift_opcode(&[0xD0, 0x05], 0x8000, &ctx).unwrap();
        assert!(!stmts.is_empty());
    }

    #[test]
    fn lift_opcode_resolves_a_jsr_target_from_its_own_bytes() {
        let ctx = LiftContext::default();
        let stmts = lift_opcode(&[0x20, 0x34, 0x12], 0x8000, &ctx).unwrap();
        assert!(stmts.iter().any(|s| matches!(s, Stmt::CallMethod(0x1234))));
    }
}
