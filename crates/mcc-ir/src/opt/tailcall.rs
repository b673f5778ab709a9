//! Tail-call elimination.

use crate::ir::{Instr, IrProgram, Label};

/// Rewrite self-recursive tail calls into jumps to the function entry.
///
/// A candidate is a `CALL f` where `f` is the enclosing function (tracked
/// by the most recent entry label) immediately followed by `RETURN` of the
/// call's destination. The call becomes a `JUMP` to the entry label and
/// the `RETURN` is deleted: the jumped-to `PARAM` moves re-bind the
/// parameters from the staged arguments, and whichever `RETURN` the
/// re-entered body reaches yields the same value the deleted one would
/// have.
///
/// A call whose result feeds further computation, or whose result is not
/// the returned value, is not in tail position and stays.
pub fn tail_call_elimination(program: &mut IrProgram) -> bool {
    let mut current_entry: Option<Label> = None;
    let mut changed = false;
    let mut i = 0;

    while i < program.instructions.len() {
        match program.instructions[i] {
            Instr::Label(label) if label.is_entry() => {
                current_entry = Some(label);
            }
            Instr::Call { dest, func, .. } => {
                let Some(entry) = current_entry else {
                    i += 1;
                    continue;
                };
                let recursive = func == entry.name;
                let returns_result = matches!(
                    program.instructions.get(i + 1),
                    Some(Instr::Return { value }) if *value == dest
                );
                if recursive && returns_result {
                    program.instructions[i] = Instr::Jump(entry);
                    program.instructions.remove(i + 1);
                    changed = true;
                }
            }
            _ => {}
        }
        i += 1;
    }

    changed
}
