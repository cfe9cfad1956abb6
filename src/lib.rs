#![doc = r#"
recomp6502: a static recompiler core for 6502 machine code.

Turns disassembled instructions into an architecture-neutral IR
(`ir`), lowers individual instructions to that IR (`lifter`), compiles
concatenated IR into callable units (`method`), executes them against a
host-supplied hardware abstraction (`hal`, `interpreter`), and dispatches
control flow between compiled units while handling self-modifying code
(`driver`).

Modules:
- ir: value/statement model and the validation every backend relies on
- error: the error taxonomies surfaced by each of the above
- lifter: one decoded instruction -> an IR sequence
- hal: the hardware-abstraction seam (registers, flags, memory, stack)
- method: compiled, callable IR plus its scratch-frame/label bookkeeping
- interpreter: the reference execution backend
- driver: the entry-address -> method table and its dispatch rules

Disassembly itself is out of scope: every entry point here consumes
already-decoded instructions or already-lifted IR.
"#]

pub mod driver;
pub mod error;
pub mod hal;
pub mod interpreter;
pub mod ir;
pub mod lifter;
pub mod method;

pub use driver::Driver;
pub use hal::{Hal, TestHal};
pub use method::{Generator, GeneratorOptions, Method};
