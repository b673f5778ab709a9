//! Strength reduction.

use crate::ir::{BinOp, Instr, IrProgram};
use crate::opt::{constant_defs, operand_constant};

/// Replace expensive operations by cheaper equivalents:
///
/// - `MUL t <- a, 2` becomes `ADD t <- a, a`;
/// - `DIV t <- a, 2` becomes `SHR t <- a, 1` (arithmetic shift).
///
/// The literal 2 is recognized through the constant-definition map: in
/// generated IR a constant operand is always a temp assigned an immediate.
/// Operands that are not known constants leave the instruction unchanged.
pub fn strength_reduction(program: &mut IrProgram) -> bool {
    let consts = constant_defs(&program.instructions);
    let mut changed = false;

    for instr in &mut program.instructions {
        let Instr::Bin { op, dest, lhs, rhs } = *instr else {
            continue;
        };
        if operand_constant(&consts, rhs) != Some(2) {
            continue;
        }
        match op {
            BinOp::Mul => {
                *instr = Instr::Bin {
                    op: BinOp::Add,
                    dest,
                    lhs,
                    rhs: lhs,
                };
                changed = true;
            }
            BinOp::Div => {
                *instr = Instr::Shr {
                    dest,
                    src: lhs,
                    amount: 1,
                };
                changed = true;
            }
            BinOp::Add | BinOp::Sub => {}
        }
    }

    changed
}
