/*!
interpreter.rs - C4: the reference execution backend. Walks a [`Method`]'s
statements with an explicit statement program counter, reading and writing
operands through a [`Hal`] and re-entering the [`Driver`] for every
control transfer. A native-code backend is explicitly out of scope; this
is the only backend the core ships.
*/

use tracing::trace;

use crate::driver::Driver;
use crate::error::DispatchError;
use crate::hal::{Hal, IRQ_VECTOR};
use crate::ir::{BinaryOp, Flag, Reg, Stmt, UnaryOp, Value};
use crate::method::Method;

/// Runs `method` to completion against `driver`/`hal`, re-entering `driver`
/// synchronously for every `CallMethod`-family statement. A `JMP`'s
/// lowering is a single trailing `CallMethod`, so a tail transfer and a
/// call-then-return look identical to this loop; see `DESIGN.md` for the
/// recursion-depth consequence of that choice.
pub fn run(method: &Method, driver: &mut Driver, hal: &mut dyn Hal) -> Result<(), DispatchError> {
    let mut scratch = vec![0u8; method.scratch_len as usize];
    let mut pc = 0usize;
    while pc < method.stmts.len() {
        match &method.stmts[pc] {
            Stmt::Copy { src, dst } => {
                let v = read(src, hal, &scratch);
                write(dst, v, hal, &mut scratch, driver);
                pc += 1;
            }
            Stmt::Unary { op, src, dst } => {
                let v = apply_unary(*op, read(src, hal, &scratch));
                write(dst, v, hal, &mut scratch, driver);
                pc += 1;
            }
            Stmt::Binary { op, lhs, rhs, dst } => {
                let l = read(lhs, hal, &scratch);
                let r = read(rhs, hal, &scratch);
                write(dst, apply_binary(*op, l, r), hal, &mut scratch, driver);
                pc += 1;
            }
            Stmt::Label(_) => pc += 1,
            Stmt::JumpIfZero { src, target } => {
                pc = if read(src, hal, &scratch) == 0 { resolve(method, target)? } else { pc + 1 };
            }
            Stmt::JumpIfNotZero { src, target } => {
                pc = if read(src, hal, &scratch) != 0 { resolve(method, target)? } else { pc + 1 };
            }
            Stmt::Jump(target) => pc = resolve(method, target)?,
            Stmt::PushStackValue(v) => {
                hal.push(read(v, hal, &scratch));
                pc += 1;
            }
            Stmt::PopStackValue(v) => {
                let popped = hal.pop();
                write(v, popped, hal, &mut scratch, driver);
                pc += 1;
            }
            Stmt::CallMethod(target) => {
                trace!(target = format_args!("${target:04X}"), "CallMethod");
                driver.invoke(*target, hal)?;
                pc += 1;
            }
            Stmt::CallMethodDynamic { hi, lo } => {
                let addr = (read(hi, hal, &scratch) as u16) << 8 | read(lo, hal, &scratch) as u16;
                trace!(target = format_args!("${addr:04X}"), "CallMethodDynamic (RTS/RTI)");
                driver.invoke(addr, hal)?;
                pc += 1;
            }
            Stmt::PollForRecompilation(fallback) => {
                // Asks the HAL's own write-tracking first, then falls back
                // to the driver's per-entry registry — only the driver
                // knows the exact span of the method currently running.
                if hal.poll_recompile() || !driver.is_registered(method.entry) {
                    trace!(entry = format_args!("${:04X}", method.entry), fallback = format_args!("${fallback:04X}"), "method invalidated, redirecting");
                    return driver.invoke(*fallback, hal);
                }
                pc += 1;
            }
            Stmt::PollForInterrupt(fallback) => {
                // BRK always services at the fixed IRQ/BRK vector; a
                // HAL-asserted interrupt carries its own vector (`$FFFA`
                // for NMI, `$FFFE` for IRQ) so distinct sources can be
                // routed to distinct handlers.
                let vector = if hal.read_flag(Flag::B) { IRQ_VECTOR } else { hal.poll_interrupt() };
                if vector != 0 {
                    return service_interrupt(*fallback, vector, driver, hal);
                }
                pc += 1;
            }
        }
    }
    Ok(())
}

fn resolve(method: &Method, target: &crate::ir::Identifier) -> Result<usize, DispatchError> {
    // `Generator::generate` already rejected undefined labels, so a lookup
    // miss here would mean the method outlived the IR it was built from.
    Ok(*method.labels.get(target).expect("validated method references an indexed label"))
}

fn service_interrupt(fallback: u16, vector: u16, driver: &mut Driver, hal: &mut dyn Hal) -> Result<(), DispatchError> {
    hal.push((fallback >> 8) as u8);
    hal.push((fallback & 0xFF) as u8);
    let status = hal.read_status();
    hal.push(status);
    hal.write_flag(Flag::I, true);
    let lo = hal.read_memory(vector) as u16;
    let hi = hal.read_memory(vector.wrapping_add(1)) as u16;
    driver.invoke((hi << 8) | lo, hal)
}

fn effective_address(value: &Value, hal: &dyn Hal) -> u16 {
    match value {
        Value::Memory { base, index, zero_page_wrap } => {
            let offset = index.map_or(0, |r| hal.read_register(r)) as u16;
            let raw = base.wrapping_add(offset);
            if *zero_page_wrap { raw & 0xFF } else { raw }
        }
        Value::IndirectMemory { zp, post_index } => {
            if *post_index {
                let ptr = *zp as u16;
                let lo = hal.read_memory(ptr) as u16;
                let hi = hal.read_memory((ptr.wrapping_add(1)) & 0xFF) as u16;
                let base = (hi << 8) | lo;
                base.wrapping_add(hal.read_register(Reg::Y) as u16)
            } else {
                let ptr = zp.wrapping_add(hal.read_register(Reg::X)) as u16;
                let lo = hal.read_memory(ptr) as u16;
                let hi = hal.read_memory((ptr.wrapping_add(1)) & 0xFF) as u16;
                (hi << 8) | lo
            }
        }
        _ => unreachable!("effective_address called on a non-memory value"),
    }
}

fn read(value: &Value, hal: &dyn Hal, scratch: &[u8]) -> u8 {
    match value {
        Value::Constant(c) => *c,
        Value::Register(r) => hal.read_register(*r),
        Value::StackPointer => hal.read_stack_pointer(),
        Value::Flag(f) => hal.read_flag(*f) as u8,
        Value::AllFlags => hal.read_status(),
        Value::Memory { .. } | Value::IndirectMemory { .. } => hal.read_memory(effective_address(value, hal)),
        Value::Variable(i) => scratch[*i as usize],
    }
}

/// Writes `v` to `dst`. Flag destinations truncate to the low bit per the
/// IR's width-truncation invariant; a memory write that the HAL
/// reports as landing on compiled code is relayed to the driver so it can
/// invalidate any method overlapping that address.
fn write(dst: &Value, v: u8, hal: &mut dyn Hal, scratch: &mut [u8], driver: &mut Driver) {
    match dst {
        Value::Constant(_) => debug_assert!(false, "Constant is never a write destination"),
        Value::Register(r) => hal.write_register(*r, v),
        Value::StackPointer => hal.write_stack_pointer(v),
        Value::Flag(f) => hal.write_flag(*f, v & 1 != 0),
        Value::AllFlags => hal.write_status(v),
        Value::Memory { .. } | Value::IndirectMemory { .. } => {
            let addr = effective_address(dst, hal);
            if hal.write_memory(addr, v) {
                driver.note_code_write(addr);
            }
        }
        Value::Variable(i) => scratch[*i as usize] = v,
    }
}

fn apply_unary(op: UnaryOp, src: u8) -> u8 {
    match op {
        UnaryOp::BitwiseNot => !src,
    }
}

fn apply_binary(op: BinaryOp, lhs: u8, rhs: u8) -> u8 {
    match op {
        BinaryOp::Add => lhs.wrapping_add(rhs),
        BinaryOp::Subtract => lhs.wrapping_sub(rhs),
        BinaryOp::And => lhs & rhs,
        BinaryOp::Or => lhs | rhs,
        BinaryOp::Xor => lhs ^ rhs,
        BinaryOp::ShiftLeft => if rhs >= 8 { 0 } else { lhs << rhs },
        BinaryOp::ShiftRight => if rhs >= 8 { 0 } else { lhs >> rhs },
        BinaryOp::Equals => (lhs == rhs) as u8,
        BinaryOp::NotEquals => (lhs != rhs) as u8,
        BinaryOp::GreaterThan => (lhs > rhs) as u8,
        BinaryOp::GreaterThanOrEqualTo => (lhs >= rhs) as u8,
        BinaryOp::LessThan => (lhs < rhs) as u8,
        BinaryOp::LessThanOrEqualTo => (lhs <= rhs) as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::TestHal;
    use crate::method::{Generator, GeneratorOptions};

    fn run_stmts(stmts: Vec<Stmt>) -> TestHal {
        let mut hal = TestHal::new();
        let mut driver = Driver::new(|addr| Err(DispatchError::UnmappedTarget(addr)));
        let method = Generator::new(GeneratorOptions::default()).generate(0x8000, 0x8000..0x8001, stmts).unwrap();
        driver.register_method(method);
        driver.invoke(0x8000, &mut hal).unwrap();
        hal
    }

    #[test]
    fn copy_constant_into_register() {
        let hal = run_stmts(vec![Stmt::Copy { src: Value::Constant(0x42), dst: Value::Register(Reg::A) }]);
        assert_eq!(hal.read_register(Reg::A), 0x42);
    }

    #[test]
    fn flag_write_truncates_to_low_bit() {
        let hal = run_stmts(vec![Stmt::Copy { src: Value::Constant(0xFE), dst: Value::Flag(Flag::C) }]);
        assert!(!hal.read_flag(Flag::C));
    }

    #[test]
    fn jump_if_zero_skips_forward() {
        let stmts = vec![
            Stmt::JumpIfZero { src: Value::Constant(0), target: crate::ir::Identifier::new("skip") },
            Stmt::Copy { src: Value::Constant(0xFF), dst: Value::Register(Reg::A) },
            Stmt::Label(crate::ir::Identifier::new("skip")),
        ];
        let hal = run_stmts(stmts);
        assert_eq!(hal.read_register(Reg::A), 0);
    }

    #[test]
    fn shift_by_eight_or_more_yields_zero() {
        assert_eq!(apply_binary(BinaryOp::ShiftLeft, 0xFF, 8), 0);
        assert_eq!(apply_binary(BinaryOp::ShiftRight, 0xFF, 9), 0);
    }
}
