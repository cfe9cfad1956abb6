/*!
method.rs - a compiled method: validated IR plus the bookkeeping the
interpreter needs to execute it without re-deriving it on every call.
`Generator` is the one place that runs `ir::validate`,
sizes the scratch frame, and indexes labels to statement offsets.
*/

use std::collections::HashMap;
use std::ops::Range;

use crate::error::DispatchError;
use crate::ir::{self, Identifier, Stmt};

/// Tuning knobs for method generation. `scratch_surplus` pads the scratch
/// frame beyond what the IR's own `Variable` indices require, leaving
/// headroom for a future backend that wants extra working locals without
/// renumbering the lifter's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub scratch_surplus: u32,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self { scratch_surplus: 4 }
    }
}

/// A compiled, callable unit: one routine's worth of lowered IR, keyed by
/// its entry address and covering the span of original 6502 bytes it was
/// lifted from (the range the driver watches for self-modification).
pub struct Method {
    pub entry: u16,
    pub span: Range<u16>,
    pub(crate) stmts: Vec<Stmt>,
    pub(crate) scratch_len: u32,
    pub(crate) labels: HashMap<Identifier, usize>,
}

impl Method {
    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }
}

/// Turns a lifted, concatenated instruction sequence into a [`Method`].
pub struct Generator {
    options: GeneratorOptions,
}

impl Generator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    /// Validates `stmts`, sizes the scratch frame from the highest
    /// `Variable` index referenced, and indexes every `Label`
    /// to its statement offset for O(1) jump resolution at run time.
    pub fn generate(&self, entry: u16, span: Range<u16>, stmts: Vec<Stmt>) -> Result<Method, DispatchError> {
        ir::validate(&stmts)?;
        let scratch_len = ir::max_variable_index(&stmts).map_or(0, |m| m + 1) + self.options.scratch_surplus;
        let labels = index_labels(&stmts);
        Ok(Method { entry, span, stmts, scratch_len, labels })
    }
}

fn index_labels(stmts: &[Stmt]) -> HashMap<Identifier, usize> {
    stmts
        .iter()
        .enumerate()
        .filter_map(|(i, s)| match s {
            Stmt::Label(id) => Some((id.clone(), i)),
            _ => None,
        })
        .collect()
}
