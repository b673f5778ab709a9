//! Per-function stack frame layout.

use indexmap::IndexMap;
use mcc_ir::{Instr, Operand};

/// Maps every operand of one function to its `%rbp`-relative slot.
///
/// Slots are handed out in first-appearance order, 8 bytes each, growing
/// downward from `-8(%rbp)`. Insertion order makes the layout (and
/// therefore the emitted text) deterministic for a given instruction
/// sequence.
#[derive(Debug, Default)]
pub struct StackFrame {
    slots: IndexMap<Operand, i32>,
}

impl StackFrame {
    /// Scan one function's instructions and assign a slot to every
    /// distinct temp and named local, including parameters.
    pub fn build(instructions: &[Instr]) -> Self {
        let mut frame = StackFrame::default();
        for instr in instructions {
            match *instr {
                Instr::Bin { dest, lhs, rhs, .. } | Instr::Compare { dest, lhs, rhs, .. } => {
                    frame.reserve(dest);
                    frame.reserve(lhs);
                    frame.reserve(rhs);
                }
                Instr::Shr { dest, src, .. } => {
                    frame.reserve(dest);
                    frame.reserve(src);
                }
                Instr::Assign { dest, src } => {
                    frame.reserve(dest);
                    if let mcc_ir::Value::Operand(src) = src {
                        frame.reserve(src);
                    }
                }
                Instr::JumpZ { cond, .. } | Instr::JumpNz { cond, .. } => frame.reserve(cond),
                Instr::Call { dest, .. } => frame.reserve(dest),
                Instr::Arg { value } => frame.reserve(value),
                Instr::Param { name } => frame.reserve(Operand::Name(name)),
                Instr::Return { value } => frame.reserve(value),
                Instr::Load { dest, addr } => {
                    frame.reserve(dest);
                    frame.reserve(addr);
                }
                Instr::Store { addr, value } => {
                    frame.reserve(addr);
                    frame.reserve(value);
                }
                Instr::Label(_) | Instr::Jump(_) => {}
            }
        }
        frame
    }

    fn reserve(&mut self, operand: Operand) {
        let next = -8 * (self.slots.len() as i32 + 1);
        self.slots.entry(operand).or_insert(next);
    }

    /// The slot of `operand`, as a `%rbp` displacement.
    pub fn offset(&self, operand: Operand) -> i32 {
        // Every operand of the function was reserved by `build`; a miss
        // can only mean the frame and the instructions are out of sync.
        debug_assert!(self.slots.contains_key(&operand));
        self.slots.get(&operand).copied().unwrap_or(0)
    }

    /// Total bytes to reserve: 8 per distinct operand.
    pub fn size(&self) -> i32 {
        8 * self.slots.len() as i32
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcc_ir::{lower_program, IrProgram};
    use mcc_par::parse;
    use mcc_util::Symbol;

    fn lower(source: &str) -> IrProgram {
        lower_program(&parse(source).unwrap())
    }

    #[test]
    fn slots_are_assigned_in_first_appearance_order() {
        let ir = lower("int main() { int x = 1; int y = 2; return x + y; }");
        let frame = StackFrame::build(&ir.instructions);
        // t0, x, t1, y, t2: five distinct operands.
        assert_eq!(frame.slot_count(), 5);
        assert_eq!(frame.size(), 40);
        assert_eq!(frame.offset(mcc_ir::Operand::Temp(0)), -8);
        assert_eq!(
            frame.offset(mcc_ir::Operand::Name(Symbol::intern("x"))),
            -16
        );
    }

    #[test]
    fn repeated_uses_share_one_slot() {
        let ir = lower("int main() { int x = 1; x = x + x; return x; }");
        let frame = StackFrame::build(&ir.instructions);
        // t0, x, t1: x appears many times but owns one slot.
        assert_eq!(frame.slot_count(), 3);
    }

    #[test]
    fn parameters_get_slots() {
        let ir = lower("int f(int a, int b) { return a; }");
        let frame = StackFrame::build(&ir.instructions);
        assert_eq!(
            frame.offset(mcc_ir::Operand::Name(Symbol::intern("a"))),
            -8
        );
        assert_eq!(
            frame.offset(mcc_ir::Operand::Name(Symbol::intern("b"))),
            -16
        );
    }
}
