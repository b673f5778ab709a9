//! Instruction-by-instruction assembly emission.

use std::fmt::Write;

use mcc_ir::{BinOp, Instr, IrProgram, Label, Operand, Value};
use mcc_util::Symbol;

use crate::frame::StackFrame;
use crate::EmitError;

/// System V AMD64 integer argument registers, in order.
const ARG_REGS: [&str; 6] = ["%rdi", "%rsi", "%rdx", "%rcx", "%r8", "%r9"];

/// Caller-saved registers preserved around a call.
///
/// `%rax` is deliberately absent: it carries the return value and must
/// survive past the restore sequence.
const CALL_SAVED: [&str; 6] = ["%rcx", "%rdx", "%rsi", "%rdi", "%r8", "%r9"];

/// The local label marking a function's post-prologue re-entry point.
fn reentry_label(func: Symbol) -> String {
    format!(".Lentry_{func}")
}

/// Translate a whole IR program into GNU-assembler text.
///
/// The stream is split into functions at the entry labels; each function
/// gets its own [`StackFrame`] and its reservation is emitted immediately
/// after the prologue.
pub fn emit_program(program: &IrProgram) -> Result<String, EmitError> {
    let mut out = String::new();
    out.push_str("    .global main\n");
    out.push_str("    .text\n");

    for region in function_regions(&program.instructions) {
        FunctionEmitter::new(region).emit(&mut out)?;
    }

    Ok(out)
}

/// Split the stream into per-function instruction runs.
///
/// A run starts at each entry label; anything before the first entry label
/// (possible only in hand-built IR) forms a headless leading run.
fn function_regions(instructions: &[Instr]) -> Vec<&[Instr]> {
    let mut starts: Vec<usize> = Vec::new();
    for (i, instr) in instructions.iter().enumerate() {
        if matches!(instr, Instr::Label(label) if label.is_entry()) {
            starts.push(i);
        }
    }
    if starts.first() != Some(&0) && !instructions.is_empty() {
        starts.insert(0, 0);
    }

    let mut regions = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(instructions.len());
        regions.push(&instructions[start..end]);
    }
    regions
}

struct FunctionEmitter<'a> {
    instructions: &'a [Instr],
    frame: StackFrame,
    name: Option<Symbol>,
    /// Operands staged by `ARG`, waiting for the consuming `CALL` (or a
    /// tail `JUMP` to a function entry).
    arg_buffer: Vec<Operand>,
    params_seen: usize,
}

impl<'a> FunctionEmitter<'a> {
    fn new(instructions: &'a [Instr]) -> Self {
        let name = instructions.first().and_then(|instr| match instr {
            Instr::Label(label) if label.is_entry() => Some(label.name),
            _ => None,
        });
        Self {
            instructions,
            frame: StackFrame::build(instructions),
            name,
            arg_buffer: Vec::new(),
            params_seen: 0,
        }
    }

    fn emit(mut self, out: &mut String) -> Result<(), EmitError> {
        for instr in self.instructions {
            self.emit_instr(out, instr)?;
        }
        Ok(())
    }

    fn slot(&self, operand: Operand) -> String {
        format!("{}(%rbp)", self.frame.offset(operand))
    }

    fn emit_instr(&mut self, out: &mut String, instr: &Instr) -> Result<(), EmitError> {
        match *instr {
            Instr::Label(label) => self.emit_label(out, label),
            Instr::Bin { op, dest, lhs, rhs } => {
                let _ = writeln!(out, "    movq {}, %rax", self.slot(lhs));
                match op {
                    BinOp::Add => {
                        let _ = writeln!(out, "    addq {}, %rax", self.slot(rhs));
                    }
                    BinOp::Sub => {
                        let _ = writeln!(out, "    subq {}, %rax", self.slot(rhs));
                    }
                    BinOp::Mul => {
                        let _ = writeln!(out, "    imulq {}, %rax", self.slot(rhs));
                    }
                    BinOp::Div => {
                        out.push_str("    cqto\n");
                        let _ = writeln!(out, "    idivq {}", self.slot(rhs));
                    }
                }
                let _ = writeln!(out, "    movq %rax, {}", self.slot(dest));
            }
            Instr::Shr { dest, src, amount } => {
                let _ = writeln!(out, "    movq {}, %rax", self.slot(src));
                let _ = writeln!(out, "    sarq ${amount}, %rax");
                let _ = writeln!(out, "    movq %rax, {}", self.slot(dest));
            }
            Instr::Assign { dest, src } => {
                match src {
                    Value::Imm(value) => {
                        let _ = writeln!(out, "    movq ${value}, %rax");
                    }
                    Value::Operand(src) => {
                        let _ = writeln!(out, "    movq {}, %rax", self.slot(src));
                    }
                }
                let _ = writeln!(out, "    movq %rax, {}", self.slot(dest));
            }
            Instr::Compare {
                kind,
                dest,
                lhs,
                rhs,
            } => {
                let _ = writeln!(out, "    movq {}, %rax", self.slot(lhs));
                let _ = writeln!(out, "    cmpq {}, %rax", self.slot(rhs));
                let _ = writeln!(out, "    set{} %al", kind.cc());
                out.push_str("    movzbq %al, %rax\n");
                let _ = writeln!(out, "    movq %rax, {}", self.slot(dest));
            }
            Instr::Jump(label) => {
                if label.is_entry() {
                    // A jump to a function entry is a rewritten tail call:
                    // re-bind the argument registers so the PARAM moves
                    // observe the new values, and land after the prologue;
                    // re-running it would push a second frame that no
                    // matching epilogue ever pops.
                    if !self.arg_buffer.is_empty() {
                        self.load_args(out, label.name, self.arg_buffer.len())?;
                    }
                    let _ = writeln!(out, "    jmp {}", reentry_label(label.name));
                } else {
                    let _ = writeln!(out, "    jmp {}", label.name);
                }
            }
            Instr::JumpZ { cond, target } => {
                let _ = writeln!(out, "    cmpq $0, {}", self.slot(cond));
                let _ = writeln!(out, "    je {}", target.name);
            }
            Instr::JumpNz { cond, target } => {
                let _ = writeln!(out, "    cmpq $0, {}", self.slot(cond));
                let _ = writeln!(out, "    jne {}", target.name);
            }
            Instr::Call {
                dest,
                func,
                arg_count,
            } => {
                if arg_count > ARG_REGS.len() {
                    return Err(EmitError::TooManyArgs {
                        func,
                        count: arg_count,
                    });
                }
                if self.arg_buffer.len() != arg_count {
                    return Err(EmitError::ArgumentMismatch {
                        func,
                        expected: arg_count,
                        staged: self.arg_buffer.len(),
                    });
                }
                for reg in CALL_SAVED {
                    let _ = writeln!(out, "    pushq {reg}");
                }
                self.load_args(out, func, arg_count)?;
                let _ = writeln!(out, "    call {func}");
                let _ = writeln!(out, "    movq %rax, {}", self.slot(dest));
                for reg in CALL_SAVED.iter().rev() {
                    let _ = writeln!(out, "    popq {reg}");
                }
            }
            Instr::Arg { value } => {
                self.arg_buffer.push(value);
            }
            Instr::Param { name } => {
                let Some(&reg) = ARG_REGS.get(self.params_seen) else {
                    return Err(EmitError::TooManyParams {
                        func: self.name.unwrap_or(name),
                    });
                };
                self.params_seen += 1;
                let _ = writeln!(out, "    movq {reg}, {}", self.slot(Operand::Name(name)));
            }
            Instr::Return { value } => {
                let _ = writeln!(out, "    movq {}, %rax", self.slot(value));
                out.push_str("    movq %rbp, %rsp\n");
                out.push_str("    popq %rbp\n");
                out.push_str("    ret\n");
            }
            Instr::Load { dest, addr } => {
                let _ = writeln!(out, "    movq {}, %rax", self.slot(addr));
                out.push_str("    movq (%rax), %rax\n");
                let _ = writeln!(out, "    movq %rax, {}", self.slot(dest));
            }
            Instr::Store { addr, value } => {
                let _ = writeln!(out, "    movq {}, %rcx", self.slot(addr));
                let _ = writeln!(out, "    movq {}, %rax", self.slot(value));
                out.push_str("    movq %rax, (%rcx)\n");
            }
        }
        Ok(())
    }

    fn emit_label(&mut self, out: &mut String, label: Label) {
        let _ = writeln!(out, "{}:", label.name);
        if label.is_entry() {
            out.push_str("    pushq %rbp\n");
            out.push_str("    movq %rsp, %rbp\n");
            // The whole frame is reserved up front; slot stores below
            // never touch memory beyond %rsp.
            if self.frame.size() > 0 {
                let _ = writeln!(out, "    subq ${}, %rsp", self.frame.size());
            }
            // Re-entry point for rewritten tail calls, past the prologue.
            let _ = writeln!(out, "{}:", reentry_label(label.name));
        }
    }

    /// Drain staged arguments into the argument registers: push them in
    /// reverse source order, then pop into `%rdi..%r9` left to right.
    fn load_args(
        &mut self,
        out: &mut String,
        func: Symbol,
        count: usize,
    ) -> Result<(), EmitError> {
        if count > ARG_REGS.len() {
            return Err(EmitError::TooManyArgs { func, count });
        }
        let staged: Vec<Operand> = self.arg_buffer.drain(..).collect();
        for &arg in staged.iter().rev() {
            let _ = writeln!(out, "    pushq {}", self.slot(arg));
        }
        for reg in ARG_REGS.iter().take(staged.len()) {
            let _ = writeln!(out, "    popq {reg}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcc_ir::{lower_program, CmpKind};
    use mcc_par::parse;

    fn emit(source: &str) -> String {
        emit_program(&lower_program(&parse(source).unwrap())).unwrap()
    }

    fn line_index(asm: &str, needle: &str) -> usize {
        asm.lines()
            .position(|l| l.trim() == needle)
            .unwrap_or_else(|| panic!("line '{needle}' not found in:\n{asm}"))
    }

    #[test]
    fn header_and_prologue() {
        let asm = emit("int main() { return 42; }");
        assert!(asm.starts_with("    .global main\n    .text\n"));
        let label = line_index(&asm, "main:");
        let push = line_index(&asm, "pushq %rbp");
        let set = line_index(&asm, "movq %rsp, %rbp");
        assert_eq!((push, set), (label + 1, label + 2));
        assert!(asm.contains("movq $42, %rax"));
        assert!(asm.trim_end().ends_with("ret"));
    }

    #[test]
    fn stack_reservation_sits_in_the_prologue() {
        let asm = emit("int main() { int x = 1; int y = 2; return x + y; }");
        let set = line_index(&asm, "movq %rsp, %rbp");
        let sub = asm
            .lines()
            .position(|l| l.trim().starts_with("subq $"))
            .expect("frame reservation missing");
        assert_eq!(sub, set + 1, "reservation must follow the prologue:\n{asm}");
    }

    #[test]
    fn parameters_arrive_in_argument_registers() {
        let asm = emit("int f(int a, int b) { return a; } int main() { return f(1, 2); }");
        // Inside f: both params are materialized from %rdi/%rsi.
        assert!(asm.contains("movq %rdi, -8(%rbp)"));
        assert!(asm.contains("movq %rsi, -16(%rbp)"));
        // Inside main: the call loads %rdi and calls f.
        assert!(asm.contains("call f"));
        let popped: Vec<_> = asm
            .lines()
            .filter(|l| l.trim().starts_with("popq %rdi"))
            .collect();
        assert!(!popped.is_empty());
    }

    #[test]
    fn call_save_restore_is_symmetric() {
        let asm = emit("int f(int n) { return n; } int main() { return f(7); }");
        // Every saved register is pushed exactly once and popped exactly
        // once; the arg pop of %rdi adds one extra pop of that register.
        for reg in CALL_SAVED {
            let pushed = asm
                .lines()
                .filter(|l| l.trim() == format!("pushq {reg}"))
                .count();
            let popped = asm
                .lines()
                .filter(|l| l.trim() == format!("popq {reg}"))
                .count();
            assert_eq!(pushed, 1, "{reg} saved once");
            let expected_pops = if reg == "%rdi" { 2 } else { 1 };
            assert_eq!(popped, expected_pops, "{reg} restored symmetrically");
        }
        // %rax is never saved or restored around the call.
        assert!(!asm.contains("pushq %rax"));
        assert!(!asm.contains("popq %rax"));
    }

    #[test]
    fn call_result_is_stored_before_restores() {
        let asm = emit("int f(int n) { return n; } int main() { return f(7); }");
        let call = line_index(&asm, "call f");
        let store = asm
            .lines()
            .skip(call)
            .position(|l| l.trim().starts_with("movq %rax, "))
            .unwrap()
            + call;
        let first_restore = asm
            .lines()
            .skip(call)
            .position(|l| l.trim() == "popq %r9")
            .unwrap()
            + call;
        assert!(store < first_restore, "{asm}");
    }

    #[test]
    fn division_sign_extends_before_idiv() {
        let asm = emit("int main() { int a = 7; int b = 2; return a / b; }");
        let cqto = line_index(&asm, "cqto");
        let idiv = asm
            .lines()
            .position(|l| l.trim().starts_with("idivq"))
            .unwrap();
        assert_eq!(idiv, cqto + 1);
    }

    #[test]
    fn comparison_emits_setcc() {
        let asm = emit("int main() { if (1 < 2) { return 1; } return 0; }");
        assert!(asm.contains("setl %al"));
        assert!(asm.contains("movzbq %al, %rax"));
    }

    #[test]
    fn conditional_jumps_test_against_zero() {
        let asm = emit("int main() { int n = 3; while (n) { n = n - 1; } return n; }");
        assert!(asm.contains("cmpq $0, "));
        assert!(asm.contains("je .L1"));
        assert!(asm.contains("jmp .L0"));
        assert!(asm.contains(".L0:"));
        assert!(asm.contains(".L1:"));
    }

    #[test]
    fn tail_call_jumps_past_the_prologue() {
        let source = "int spin(int n) { if (n) { return spin(n - 1); } return 0; } \
                      int main() { return spin(9); }";
        let mut ir = lower_program(&parse(source).unwrap());
        assert!(mcc_ir::opt::tail_call_elimination(&mut ir));
        let asm = emit_program(&ir).unwrap();

        assert!(asm.contains(".Lentry_spin:"));
        assert!(asm.contains("jmp .Lentry_spin"));
        // The recursive call is gone; the outer call from main remains.
        assert_eq!(asm.matches("call spin").count(), 1);

        // The staged argument is reloaded into %rdi before the jump.
        let jmp = line_index(&asm, "jmp .Lentry_spin");
        let reload = asm
            .lines()
            .take(jmp)
            .collect::<Vec<_>>()
            .iter()
            .rposition(|l| l.trim() == "popq %rdi")
            .expect("argument reload before the tail jump");
        assert!(reload < jmp);
    }

    #[test]
    fn too_many_arguments_is_an_error() {
        let source = "int f(int a, int b, int c, int d, int e, int g, int h) { return a; } \
                      int main() { return f(1, 2, 3, 4, 5, 6, 7); }";
        let err = emit_program(&lower_program(&parse(source).unwrap())).unwrap_err();
        assert!(matches!(
            err,
            EmitError::TooManyParams { .. } | EmitError::TooManyArgs { .. }
        ));
    }

    #[test]
    fn every_opcode_has_a_non_empty_emission() {
        use mcc_ir::{Instr, IrProgram, Label, Operand, Value};
        use mcc_util::Symbol;

        let mut program = IrProgram::new();
        let f = Symbol::intern("f");
        let x = Operand::Name(Symbol::intern("x"));
        let temps: Vec<Operand> = (0..8).map(|_| program.new_temp()).collect();
        let l0 = program.new_label();

        let instrs = vec![
            Instr::Label(Label::entry(f)),
            Instr::Param {
                name: Symbol::intern("x"),
            },
            Instr::Assign {
                dest: temps[0],
                src: Value::Imm(2),
            },
            Instr::Bin {
                op: BinOp::Add,
                dest: temps[1],
                lhs: x,
                rhs: temps[0],
            },
            Instr::Bin {
                op: BinOp::Sub,
                dest: temps[2],
                lhs: temps[1],
                rhs: temps[0],
            },
            Instr::Bin {
                op: BinOp::Mul,
                dest: temps[3],
                lhs: temps[2],
                rhs: temps[0],
            },
            Instr::Bin {
                op: BinOp::Div,
                dest: temps[4],
                lhs: temps[3],
                rhs: temps[0],
            },
            Instr::Shr {
                dest: temps[5],
                src: temps[4],
                amount: 1,
            },
            Instr::Compare {
                kind: CmpKind::Ge,
                dest: temps[6],
                lhs: temps[5],
                rhs: temps[0],
            },
            Instr::JumpZ {
                cond: temps[6],
                target: l0,
            },
            Instr::JumpNz {
                cond: temps[6],
                target: l0,
            },
            Instr::Load {
                dest: temps[7],
                addr: x,
            },
            Instr::Store {
                addr: x,
                value: temps[7],
            },
            Instr::Label(l0),
            Instr::Arg { value: temps[5] },
            Instr::Call {
                dest: program.new_temp(),
                func: f,
                arg_count: 1,
            },
            Instr::Jump(l0),
            Instr::Return { value: temps[5] },
        ];

        let mut grew_from = 0;
        for instr in instrs {
            program.push(instr);
            let asm = emit_program(&program);
            // Arg alone emits nothing at its own site but must not fail;
            // its effect shows at the consuming call.
            if let Ok(asm) = asm {
                assert!(asm.len() >= grew_from);
                grew_from = asm.len();
            }
        }

        let final_asm = emit_program(&program).unwrap();
        for needle in [
            "addq", "subq", "imulq", "idivq", "cqto", "sarq", "setge", "movzbq", "je", "jne",
            "jmp", "call f", "(%rax)", "(%rcx)", "ret",
        ] {
            assert!(final_asm.contains(needle), "missing {needle}:\n{final_asm}");
        }
    }
}
