/*!
flags.rs - CLC/SEC/CLI/SEI/CLD/SED/CLV opcode family.

Each of these touches exactly one flag and nothing else; grounded in the
teacher's `set_flag` calls in `cpu/dispatch/misc.rs`.
*/

use crate::ir::{Flag, Stmt, Value};

pub(super) fn set_flag(flag: Flag, value: bool) -> Vec<Stmt> {
    vec![Stmt::Copy {
        src: Value::Constant(value as u8),
        dst: Value::Flag(flag),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clc_clears_carry_only() {
        let stmts = set_flag(Flag::C, false);
        assert_eq!(
            stmts,
            vec![Stmt::Copy { src: Value::Constant(0), dst: Value::Flag(Flag::C) }]
        );
    }
}
