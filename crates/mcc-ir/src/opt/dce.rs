//! Dead-code elimination via basic-block reachability.

use crate::cfg::{build_blocks, mark_reachable};
use crate::ir::IrProgram;

/// Delete every instruction that sits in a block unreachable from the
/// program entry, compacting the stream.
///
/// Block indices refer to the pre-compaction stream and are discarded
/// afterwards; any later pass that needs blocks rebuilds them.
///
/// Returns the number of instructions removed.
pub fn dead_code_elimination(program: &mut IrProgram) -> usize {
    let mut blocks = build_blocks(program);
    if blocks.is_empty() {
        return 0;
    }
    mark_reachable(program, &mut blocks);

    let mut keep = vec![false; program.instructions.len()];
    for block in blocks.iter() {
        if block.reachable {
            for slot in &mut keep[block.start..=block.end] {
                *slot = true;
            }
        }
    }

    let before = program.instructions.len();
    let mut index = 0;
    program.instructions.retain(|_| {
        let kept = keep[index];
        index += 1;
        kept
    });
    before - program.instructions.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Instr, Label, Operand, Value};
    use crate::lower_program;
    use mcc_par::parse;
    use mcc_util::Symbol;

    #[test]
    fn reachable_code_is_untouched() {
        let mut program = lower_program(
            &parse("int main() { int n = 2; while (n > 0) { n = n - 1; } return n; }").unwrap(),
        );
        let before = program.clone();
        assert_eq!(dead_code_elimination(&mut program), 0);
        assert_eq!(program, before);
    }

    #[test]
    fn orphan_blocks_are_deleted() {
        let mut program = IrProgram::new();
        let main = Symbol::intern("main");
        let t0 = program.new_temp();
        program.push(Instr::Label(Label::entry(main)));
        program.push(Instr::Assign {
            dest: t0,
            src: Value::Imm(7),
        });
        program.push(Instr::Return { value: t0 });
        // Unreachable tail: a labeled block nothing jumps to.
        let orphan = program.new_label();
        let t1 = program.new_temp();
        program.push(Instr::Label(orphan));
        program.push(Instr::Assign {
            dest: t1,
            src: Value::Imm(9),
        });
        program.push(Instr::Return { value: t1 });

        let removed = dead_code_elimination(&mut program);
        assert_eq!(removed, 3);
        assert_eq!(
            program.instructions,
            vec![
                Instr::Label(Label::entry(main)),
                Instr::Assign {
                    dest: t0,
                    src: Value::Imm(7)
                },
                Instr::Return { value: t0 },
            ]
        );
    }

    #[test]
    fn jump_targets_stay_reachable() {
        // while-loop shape: every block is reachable, including the ones
        // only reached through jumps.
        let mut program = lower_program(
            &parse("int main() { int i = 0; while (i < 3) { i = i + 1; } return i; }").unwrap(),
        );
        let len = program.len();
        assert_eq!(dead_code_elimination(&mut program), 0);
        assert_eq!(program.len(), len);
    }

    #[test]
    fn empty_program_is_a_no_op() {
        let mut program = IrProgram::new();
        assert_eq!(dead_code_elimination(&mut program), 0);
    }

    #[test]
    fn whole_functions_survive_after_a_returning_predecessor() {
        let mut program = lower_program(
            &parse("int f(int n) { return n; } int main() { return f(3); }").unwrap(),
        );
        assert_eq!(dead_code_elimination(&mut program), 0);
        assert!(program
            .instructions
            .iter()
            .any(|i| matches!(i, Instr::Label(l) if l.is_entry()
                && l.name == Symbol::intern("main"))));
    }
}
