/*!
branches.rs - conditional branch family (BCC/BCS/BNE/BEQ/BPL/BMI/BVC/BVS).

A 6502 relative branch's range keeps its target almost always inside the
routine that contains it, so branches lower to local `Jump`-family
statements addressed by `Identifier`, not to `CallMethod` dispatch. The
method generator labels every instruction's entry point as it concatenates
a routine, which is what makes these labels resolvable.
*/

use crate::error::LifterError;
use crate::ir::{Flag, Stmt, Value};
use crate::lifter::{DisassembledInstruction, LiftContext};

/// `branch_when` is the flag value that *takes* the branch: `true` for
/// BCS/BEQ/BMI/BVS, `false` for BCC/BNE/BPL/BVC.
pub(super) fn branch(
    flag: Flag,
    branch_when: bool,
    instr: &DisassembledInstruction,
    ctx: &LiftContext,
) -> Result<Vec<Stmt>, LifterError> {
    let target_addr = instr
        .target_address
        .ok_or(LifterError::MissingTarget { cpu_address: instr.cpu_address })?;
    let target = ctx.label_for(target_addr);
    let src = Value::Flag(flag);
    Ok(vec![if branch_when {
        Stmt::JumpIfNotZero { src, target }
    } else {
        Stmt::JumpIfZero { src, target }
    }])
}
