/*!
error.rs - the wire-visible error taxonomies: lifting errors, IR
validation errors, and dispatch errors. None of these are recovered
inside the core; they propagate outward via `Result` to the embedding
host.

There is no `HalError`: every `Hal` method addresses memory with a `u16`,
so "address out of the 64 KiB range" is unrepresentable rather than a
runtime condition a HAL needs an error variant to report (see
`DESIGN.md`).
*/

use thiserror::Error;

use crate::ir::Identifier;

/// Failure while lifting one disassembled instruction to IR.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifterError {
    /// A branch, `JMP`, or `JSR` instruction had no resolved target address.
    /// The external disassembler is expected to always populate this for
    /// control-flow opcodes; its absence is a contract violation.
    #[error("instruction at {cpu_address:?} is missing a resolved target address")]
    MissingTarget { cpu_address: Option<u16> },
    /// The opcode byte does not correspond to a documented 6502 instruction.
    #[error("unsupported opcode ${0:02X}")]
    UnsupportedOpcode(u8),
    /// An operand had an addressing mode the mnemonic does not support, or
    /// a width mismatch was detected while constructing the IR.
    #[error("operand type mismatch")]
    TypeMismatch,
}

/// Failure while validating an IR sequence.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IrError {
    #[error("label {0} is defined more than once")]
    DuplicateLabel(Identifier),
    #[error("label {0} is referenced but never defined")]
    UndefinedLabel(Identifier),
    #[error("variable indices must be dense from 0: {missing} is unused but {max} is referenced")]
    NonDenseVariables { missing: u32, max: u32 },
}

/// Failure while dispatching control flow between compiled methods.
/// Surfaces out of `Driver::invoke`/`Driver::register`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no method registered for entry address ${0:04X}")]
    UnmappedTarget(u16),
    /// The IR of a method under `register` failed validation.
    #[error(transparent)]
    InvalidIr(#[from] IrError),
    /// The IR of a method under `register` failed lifting.
    #[error(transparent)]
    Lift(#[from] LifterError),
}
