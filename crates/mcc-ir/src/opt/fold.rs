//! Constant folding.

use rustc_hash::FxHashMap;

use crate::ir::{BinOp, Instr, IrProgram, Operand, Value};
use crate::opt::OptError;

/// Fold arithmetic over known constants, iterating to a fixed point.
///
/// An `ASSIGN t <- imm` defines the temp `t` as a known constant; any
/// arithmetic instruction whose sources are both known rewrites in place
/// to an `ASSIGN` of the computed value, which may in turn feed later
/// folds. Arithmetic is two's-complement 64-bit. A division whose divisor
/// folds to zero is a compile-time error rather than a silent wrap.
///
/// Returns whether anything changed. Running the pass twice produces the
/// same program as running it once: after the first fixed point, no
/// instruction has two constant sources left unfolded.
pub fn constant_folding(program: &mut IrProgram) -> Result<bool, OptError> {
    let mut changed_ever = false;
    loop {
        let mut changed = false;
        // Definitions are seen before uses within one forward pass, so the
        // map is built incrementally while rewriting.
        let mut consts: FxHashMap<Operand, i64> = FxHashMap::default();

        for i in 0..program.instructions.len() {
            match program.instructions[i] {
                Instr::Assign {
                    dest: dest @ Operand::Temp(_),
                    src: Value::Imm(value),
                } => {
                    consts.insert(dest, value);
                }
                Instr::Bin { op, dest, lhs, rhs } => {
                    let (Some(&left), Some(&right)) = (consts.get(&lhs), consts.get(&rhs))
                    else {
                        continue;
                    };
                    let result = evaluate(op, left, right)?;
                    program.instructions[i] = Instr::Assign {
                        dest,
                        src: Value::Imm(result),
                    };
                    if matches!(dest, Operand::Temp(_)) {
                        consts.insert(dest, result);
                    }
                    changed = true;
                }
                Instr::Shr { dest, src, amount } => {
                    let Some(&value) = consts.get(&src) else {
                        continue;
                    };
                    let result = value.wrapping_shr(amount);
                    program.instructions[i] = Instr::Assign {
                        dest,
                        src: Value::Imm(result),
                    };
                    if matches!(dest, Operand::Temp(_)) {
                        consts.insert(dest, result);
                    }
                    changed = true;
                }
                _ => {}
            }
        }

        changed_ever |= changed;
        if !changed {
            return Ok(changed_ever);
        }
    }
}

fn evaluate(op: BinOp, left: i64, right: i64) -> Result<i64, OptError> {
    Ok(match op {
        BinOp::Add => left.wrapping_add(right),
        BinOp::Sub => left.wrapping_sub(right),
        BinOp::Mul => left.wrapping_mul(right),
        BinOp::Div => {
            if right == 0 {
                return Err(OptError::DivisionByZero);
            }
            left.wrapping_div(right)
        }
    })
}
