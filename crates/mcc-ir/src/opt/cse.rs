//! Common-subexpression elimination.

use crate::ir::{Instr, IrProgram, Operand, Value};

/// Rewrite repeated computations into copies of the first result.
///
/// For each arithmetic instruction, scan forward for later instructions
/// with the same opcode and identical sources and replace them with an
/// `ASSIGN` from the first destination. The scan is linear and ignores
/// block boundaries, which is sound for temps (single-assignment) but not
/// for named operands that get reassigned in between, so the scan stops
/// at any instruction that redefines either source or the first
/// destination (`PARAM` rebinds its name and counts as a redefinition).
/// It also stops at the next function entry: identical local names in
/// different functions are different variables in different frames.
pub fn common_subexpression_elimination(program: &mut IrProgram) -> bool {
    let mut changed = false;

    for i in 0..program.instructions.len() {
        let Instr::Bin { op, dest, lhs, rhs } = program.instructions[i] else {
            continue;
        };
        // A computation that overwrites its own source has no reusable
        // result.
        if dest == lhs || dest == rhs {
            continue;
        }

        for j in i + 1..program.instructions.len() {
            if let Instr::Bin {
                op: later_op,
                dest: later_dest,
                lhs: later_lhs,
                rhs: later_rhs,
            } = program.instructions[j]
            {
                if later_op == op && later_lhs == lhs && later_rhs == rhs {
                    program.instructions[j] = Instr::Assign {
                        dest: later_dest,
                        src: Value::Operand(dest),
                    };
                    changed = true;
                    if later_dest == lhs || later_dest == rhs {
                        break;
                    }
                    continue;
                }
            }

            // A redefinition of a source (or of the cached result)
            // invalidates every later occurrence of this expression.
            let redefined = match program.instructions[j] {
                Instr::Label(label) if label.is_entry() => break,
                Instr::Param { name } => Some(Operand::Name(name)),
                ref other => other.dest(),
            };
            if let Some(defined) = redefined {
                if defined == lhs || defined == rhs || defined == dest {
                    break;
                }
            }
        }
    }

    changed
}
