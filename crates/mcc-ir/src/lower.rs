//! AST to IR lowering.
//!
//! Expressions lower to an operand: identifiers pass through as names,
//! everything else computes into a fresh temporary. Statements lower to
//! instruction sequences; `if` and `while` compile to the usual
//! label-and-conditional-jump shapes with `JUMPZ` on the condition.

use mcc_par::ast::{CompoundStmt, Expr, FunctionDecl, Program, Stmt, VarDecl};

use crate::ir::{Instr, IrProgram, Label, Operand, Value};

/// Lower a whole program into one linear instruction stream.
///
/// Function bodies are concatenated in source order, each preceded by its
/// entry label and one `PARAM` per parameter. Temp and label numbering is
/// shared across the program.
pub fn lower_program(program: &Program) -> IrProgram {
    let mut ir = IrProgram::new();
    for func in &program.items {
        lower_function(&mut ir, func);
    }
    ir
}

fn lower_function(ir: &mut IrProgram, func: &FunctionDecl) {
    ir.push(Instr::Label(Label::entry(func.name)));
    for param in &func.params {
        ir.push(Instr::Param { name: param.name });
    }
    lower_compound(ir, &func.body);
}

fn lower_compound(ir: &mut IrProgram, block: &CompoundStmt) {
    for stmt in &block.stmts {
        lower_stmt(ir, stmt);
    }
}

fn lower_stmt(ir: &mut IrProgram, stmt: &Stmt) {
    match stmt {
        Stmt::VarDecl(VarDecl { name, init, .. }) => {
            if let Some(init) = init {
                let value = lower_expr(ir, init);
                ir.push(Instr::Assign {
                    dest: Operand::Name(*name),
                    src: Value::Operand(value),
                });
            }
        }
        Stmt::Assign { target, value } => {
            let value = lower_expr(ir, value);
            ir.push(Instr::Assign {
                dest: Operand::Name(*target),
                src: Value::Operand(value),
            });
        }
        Stmt::If {
            cond,
            then_body,
            else_body,
        } => {
            let cond = lower_expr(ir, cond);
            match else_body {
                Some(else_body) => {
                    let l_else = ir.new_label();
                    let l_end = ir.new_label();
                    ir.push(Instr::JumpZ {
                        cond,
                        target: l_else,
                    });
                    lower_compound(ir, then_body);
                    ir.push(Instr::Jump(l_end));
                    ir.push(Instr::Label(l_else));
                    lower_compound(ir, else_body);
                    ir.push(Instr::Label(l_end));
                }
                // Without an else arm a single label serves as both the
                // else and end targets.
                None => {
                    let l_end = ir.new_label();
                    ir.push(Instr::JumpZ {
                        cond,
                        target: l_end,
                    });
                    lower_compound(ir, then_body);
                    ir.push(Instr::Label(l_end));
                }
            }
        }
        Stmt::While { cond, body } => {
            let l_head = ir.new_label();
            let l_end = ir.new_label();
            ir.push(Instr::Label(l_head));
            let cond = lower_expr(ir, cond);
            ir.push(Instr::JumpZ {
                cond,
                target: l_end,
            });
            lower_compound(ir, body);
            ir.push(Instr::Jump(l_head));
            ir.push(Instr::Label(l_end));
        }
        Stmt::Return { value } => {
            let value = lower_expr(ir, value);
            ir.push(Instr::Return { value });
        }
        Stmt::Expr(expr) => {
            // The operand is computed for its side effects (a call) and
            // otherwise discarded.
            lower_expr(ir, expr);
        }
    }
}

fn lower_expr(ir: &mut IrProgram, expr: &Expr) -> Operand {
    match expr {
        Expr::Number(value) => {
            let temp = ir.new_temp();
            ir.push(Instr::Assign {
                dest: temp,
                src: Value::Imm(*value),
            });
            temp
        }
        Expr::Ident(name) => Operand::Name(*name),
        Expr::Binary { op, lhs, rhs } => {
            let lhs = lower_expr(ir, lhs);
            let rhs = lower_expr(ir, rhs);
            let dest = ir.new_temp();
            ir.push(Instr::Bin {
                op: (*op).into(),
                dest,
                lhs,
                rhs,
            });
            dest
        }
        Expr::Comparison { op, lhs, rhs } => {
            let lhs = lower_expr(ir, lhs);
            let rhs = lower_expr(ir, rhs);
            let dest = ir.new_temp();
            ir.push(Instr::Compare {
                kind: (*op).into(),
                dest,
                lhs,
                rhs,
            });
            dest
        }
        Expr::Call { name, args } => {
            for arg in args {
                let value = lower_expr(ir, arg);
                ir.push(Instr::Arg { value });
            }
            let dest = ir.new_temp();
            ir.push(Instr::Call {
                dest,
                func: *name,
                arg_count: args.len(),
            });
            dest
        }
    }
}
