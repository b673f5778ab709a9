//! IR optimization passes.
//!
//! Every pass is guarded by a flag and preserves the observable semantics
//! of the program. The caller maps an [`OptLevel`] to an [`OptFlags`]
//! configuration once; the passes themselves read only the flags, and there
//! is no process-wide optimization state.

mod cse;
mod dce;
mod fold;
mod strength;
mod tailcall;

pub use cse::common_subexpression_elimination;
pub use dce::dead_code_elimination;
pub use fold::constant_folding;
pub use strength::strength_reduction;
pub use tailcall::tail_call_elimination;

use log::debug;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::ir::{Instr, IrProgram, Operand, Value};

/// Optimizer invariant violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptError {
    /// Constant folding met a division whose divisor folds to zero.
    #[error("division by zero in constant expression")]
    DivisionByZero,
}

/// Optimization level selected on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OptLevel {
    #[default]
    None,
    O1,
    O2,
    O3,
}

impl OptLevel {
    /// The pass configuration this level stands for.
    pub fn flags(self) -> OptFlags {
        match self {
            OptLevel::None => OptFlags::default(),
            OptLevel::O1 => OptFlags {
                constant_folding: true,
                dead_code_elimination: true,
                ..OptFlags::default()
            },
            OptLevel::O2 => OptFlags {
                constant_folding: true,
                dead_code_elimination: true,
                common_subexpression: true,
                strength_reduction: true,
                tail_call: true,
                ..OptFlags::default()
            },
            OptLevel::O3 => OptFlags {
                constant_folding: true,
                dead_code_elimination: true,
                common_subexpression: true,
                strength_reduction: true,
                tail_call: true,
                loop_unrolling: true,
                inline_functions: true,
            },
        }
    }
}

/// Which passes to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OptFlags {
    pub constant_folding: bool,
    pub dead_code_elimination: bool,
    pub common_subexpression: bool,
    /// Accepted but currently a no-op; the pass is future work.
    pub loop_unrolling: bool,
    pub strength_reduction: bool,
    pub tail_call: bool,
    /// Accepted but currently a no-op; the pass is future work.
    pub inline_functions: bool,
}

/// Run the enabled passes over `program`, in a fixed order.
pub fn optimize(program: &mut IrProgram, flags: OptFlags) -> Result<(), OptError> {
    if flags.constant_folding {
        let changed = constant_folding(program)?;
        debug!("constant folding: changed={changed}");
    }
    if flags.dead_code_elimination {
        let removed = dead_code_elimination(program);
        debug!("dead code elimination: removed {removed} instructions");
    }
    if flags.common_subexpression {
        let changed = common_subexpression_elimination(program);
        debug!("common subexpression elimination: changed={changed}");
    }
    if flags.strength_reduction {
        let changed = strength_reduction(program);
        debug!("strength reduction: changed={changed}");
    }
    if flags.loop_unrolling {
        debug!("loop unrolling: not implemented, skipped");
    }
    if flags.tail_call {
        let changed = tail_call_elimination(program);
        debug!("tail call elimination: changed={changed}");
    }
    if flags.inline_functions {
        debug!("function inlining: not implemented, skipped");
    }
    Ok(())
}

/// Map from temporaries to the constant they are defined as.
///
/// Only temps participate: they are single-assignment by construction, so
/// one definition speaks for every use. Named locals can be reassigned and
/// are deliberately excluded.
pub(crate) fn constant_defs(instructions: &[Instr]) -> FxHashMap<Operand, i64> {
    let mut consts = FxHashMap::default();
    for instr in instructions {
        if let Instr::Assign {
            dest: dest @ Operand::Temp(_),
            src: Value::Imm(value),
        } = instr
        {
            consts.insert(*dest, *value);
        }
    }
    consts
}

/// Resolve an operand to a compile-time constant if possible.
///
/// Temps resolve through the definition map; a name that is itself a
/// decimal literal (possible only in hand-built IR) parses directly.
pub(crate) fn operand_constant(consts: &FxHashMap<Operand, i64>, operand: Operand) -> Option<i64> {
    if let Some(&value) = consts.get(&operand) {
        return Some(value);
    }
    match operand {
        Operand::Name(name) => name.as_str().parse().ok(),
        Operand::Temp(_) => None,
    }
}
