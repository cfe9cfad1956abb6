/*!
control_flow.rs - JMP/JSR/RTS/RTI/BRK.

`JMP` and `JSR` target addresses the lifter can read straight off
`target_address` (resolved ahead of time by the, out-of-scope,
disassembler — including the indirect-JMP page-wraparound quirk, which is
a property of how that pointer dereference is computed, not of how the
lifter dispatches once it already has an address; see `DESIGN.md`).

`RTS`/`RTI` cannot: their target comes off the stack at runtime, and may
have been rewritten in place before the return executes (the
stack-redirection trick), so they lower to
`Stmt::CallMethodDynamic` instead of a literal `CallMethod`.

`BRK` doesn't push anything itself: it sets `B` and hands off to
`PollForInterrupt`, which owns pushing the return address (and, by
extension, the status byte an interrupt entry always pushes) — the only
thing BRK contributes over a hardware IRQ/NMI is that `B` reads back as 1.
*/

use crate::error::LifterError;
use crate::ir::{Flag, Stmt, Value};
use crate::lifter::DisassembledInstruction;

const T0: Value = Value::Variable(0);
const T1: Value = Value::Variable(1);
const T2: Value = Value::Variable(2);
const T3: Value = Value::Variable(3);
const T4: Value = Value::Variable(4);

pub(super) fn jmp(instr: &DisassembledInstruction) -> Result<Vec<Stmt>, LifterError> {
    let target = instr
        .target_address
        .ok_or(LifterError::MissingTarget { cpu_address: instr.cpu_address })?;
    Ok(vec![Stmt::CallMethod(target)])
}

pub(super) fn jsr(instr: &DisassembledInstruction) -> Result<Vec<Stmt>, LifterError> {
    let addr = instr.cpu_address.ok_or(LifterError::MissingTarget { cpu_address: None })?;
    let target = instr
        .target_address
        .ok_or(LifterError::MissingTarget { cpu_address: Some(addr) })?;
    // JSR pushes the address of its own last byte (return_addr - 1); RTS
    // adds the 1 back on return.
    let ret = addr.wrapping_add(2);
    let hi = (ret >> 8) as u8;
    let lo = (ret & 0xFF) as u8;
    Ok(vec![
        Stmt::PushStackValue(Value::Constant(hi)),
        Stmt::PushStackValue(Value::Constant(lo)),
        Stmt::CallMethod(target),
    ])
}

pub(super) fn rts() -> Vec<Stmt> {
    vec![
        Stmt::PopStackValue(T0), // lo, pushed last by JSR
        Stmt::PopStackValue(T1), // hi
        Stmt::Binary { op: crate::ir::BinaryOp::Add, lhs: T0, rhs: Value::Constant(1), dst: T2 },
        Stmt::Binary { op: crate::ir::BinaryOp::Equals, lhs: T2, rhs: Value::Constant(0), dst: T3 },
        Stmt::Binary { op: crate::ir::BinaryOp::Add, lhs: T1, rhs: T3, dst: T4 },
        Stmt::CallMethodDynamic { hi: T4, lo: T2 },
    ]
}

pub(super) fn rti() -> Vec<Stmt> {
    vec![
        Stmt::PopStackValue(T0),
        Stmt::Copy { src: T0, dst: Value::AllFlags },
        Stmt::PopStackValue(T1), // lo
        Stmt::PopStackValue(T2), // hi
        Stmt::CallMethodDynamic { hi: T2, lo: T1 },
    ]
}

pub(super) fn brk(instr: &DisassembledInstruction) -> Vec<Stmt> {
    let fallback = instr.cpu_address.unwrap_or(0).wrapping_add(2);
    vec![
        Stmt::Copy { src: Value::Constant(1), dst: Value::Flag(Flag::B) },
        Stmt::PollForInterrupt(fallback),
    ]
}
