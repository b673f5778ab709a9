//! Read-only AST printers.
//!
//! Two renderings exist: [`dump`] writes the indent-tree used by the
//! driver's phase output, and [`to_source`] un-parses the tree back into
//! surface syntax (re-parsing its output yields a structurally identical
//! AST, modulo parenthesization).

use std::fmt::Write;

use crate::ast::{CompoundStmt, Expr, FunctionDecl, Program, Stmt, VarDecl};

/// Render the diagnostic tree view of a program.
pub fn dump(program: &Program) -> String {
    let mut out = String::new();
    out.push_str("Program\n");
    for func in &program.items {
        dump_function(&mut out, func, 1);
    }
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn dump_function(out: &mut String, func: &FunctionDecl, depth: usize) {
    indent(out, depth);
    let _ = writeln!(out, "Function: {}", func.name);

    indent(out, depth + 1);
    out.push_str("Parameters:\n");
    for param in &func.params {
        indent(out, depth + 2);
        let _ = writeln!(out, "VarDecl: {} (type: {})", param.name, param.type_name);
    }

    indent(out, depth + 1);
    out.push_str("Body:\n");
    dump_compound(out, &func.body, depth + 2);
}

fn dump_compound(out: &mut String, block: &CompoundStmt, depth: usize) {
    for stmt in &block.stmts {
        dump_stmt(out, stmt, depth);
    }
}

fn dump_stmt(out: &mut String, stmt: &Stmt, depth: usize) {
    match stmt {
        Stmt::VarDecl(VarDecl {
            name,
            type_name,
            init,
        }) => {
            indent(out, depth);
            let _ = writeln!(out, "VarDecl: {name} (type: {type_name})");
            if let Some(init) = init {
                dump_expr(out, init, depth + 1);
            }
        }
        Stmt::Assign { target, value } => {
            indent(out, depth);
            let _ = writeln!(out, "Assignment: {target}");
            dump_expr(out, value, depth + 1);
        }
        Stmt::If {
            cond,
            then_body,
            else_body,
        } => {
            indent(out, depth);
            out.push_str("If\n");
            indent(out, depth + 1);
            out.push_str("Condition:\n");
            dump_expr(out, cond, depth + 2);
            indent(out, depth + 1);
            out.push_str("Then:\n");
            dump_compound(out, then_body, depth + 2);
            if let Some(else_body) = else_body {
                indent(out, depth + 1);
                out.push_str("Else:\n");
                dump_compound(out, else_body, depth + 2);
            }
        }
        Stmt::While { cond, body } => {
            indent(out, depth);
            out.push_str("While\n");
            indent(out, depth + 1);
            out.push_str("Condition:\n");
            dump_expr(out, cond, depth + 2);
            indent(out, depth + 1);
            out.push_str("Body:\n");
            dump_compound(out, body, depth + 2);
        }
        Stmt::Return { value } => {
            indent(out, depth);
            out.push_str("Return\n");
            dump_expr(out, value, depth + 1);
        }
        Stmt::Expr(expr) => dump_expr(out, expr, depth),
    }
}

fn dump_expr(out: &mut String, expr: &Expr, depth: usize) {
    indent(out, depth);
    match expr {
        Expr::Number(value) => {
            let _ = writeln!(out, "Number: {value}");
        }
        Expr::Ident(name) => {
            let _ = writeln!(out, "Identifier: {name}");
        }
        Expr::Binary { op, lhs, rhs } => {
            let _ = writeln!(out, "BinaryOp: {}", op.symbol());
            dump_expr(out, lhs, depth + 1);
            dump_expr(out, rhs, depth + 1);
        }
        Expr::Comparison { op, lhs, rhs } => {
            let _ = writeln!(out, "Comparison: {}", op.symbol());
            dump_expr(out, lhs, depth + 1);
            dump_expr(out, rhs, depth + 1);
        }
        Expr::Call { name, args } => {
            let _ = writeln!(out, "FunctionCall: {name}");
            indent(out, depth + 1);
            out.push_str("Arguments:\n");
            for arg in args {
                dump_expr(out, arg, depth + 2);
            }
        }
    }
}

/// Un-parse a program back into surface syntax.
pub fn to_source(program: &Program) -> String {
    let mut out = String::new();
    for func in &program.items {
        write_function(&mut out, func);
    }
    out
}

fn write_function(out: &mut String, func: &FunctionDecl) {
    let _ = write!(out, "int {}(", func.name);
    for (i, param) in func.params.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{} {}", param.type_name, param.name);
    }
    out.push_str(") {\n");
    write_compound(out, &func.body, 1);
    out.push_str("}\n");
}

fn write_compound(out: &mut String, block: &CompoundStmt, depth: usize) {
    for stmt in &block.stmts {
        write_stmt(out, stmt, depth);
    }
}

fn write_stmt(out: &mut String, stmt: &Stmt, depth: usize) {
    indent(out, depth * 2);
    match stmt {
        Stmt::VarDecl(VarDecl {
            name,
            type_name,
            init,
        }) => {
            let _ = write!(out, "{type_name} {name}");
            if let Some(init) = init {
                out.push_str(" = ");
                write_expr(out, init);
            }
            out.push_str(";\n");
        }
        Stmt::Assign { target, value } => {
            let _ = write!(out, "{target} = ");
            write_expr(out, value);
            out.push_str(";\n");
        }
        Stmt::If {
            cond,
            then_body,
            else_body,
        } => {
            out.push_str("if (");
            write_expr(out, cond);
            out.push_str(") {\n");
            write_compound(out, then_body, depth + 1);
            indent(out, depth * 2);
            out.push('}');
            if let Some(else_body) = else_body {
                out.push_str(" else {\n");
                write_compound(out, else_body, depth + 1);
                indent(out, depth * 2);
                out.push('}');
            }
            out.push('\n');
        }
        Stmt::While { cond, body } => {
            out.push_str("while (");
            write_expr(out, cond);
            out.push_str(") {\n");
            write_compound(out, body, depth + 1);
            indent(out, depth * 2);
            out.push_str("}\n");
        }
        Stmt::Return { value } => {
            out.push_str("return ");
            write_expr(out, value);
            out.push_str(";\n");
        }
        Stmt::Expr(expr) => {
            write_expr(out, expr);
            out.push_str(";\n");
        }
    }
}

fn write_expr(out: &mut String, expr: &Expr) {
    match expr {
        Expr::Number(value) => {
            let _ = write!(out, "{value}");
        }
        Expr::Ident(name) => {
            let _ = write!(out, "{name}");
        }
        // Fully parenthesized so the rendered text re-parses to the same
        // shape regardless of precedence.
        Expr::Binary { op, lhs, rhs } => {
            out.push('(');
            write_expr(out, lhs);
            let _ = write!(out, " {} ", op.symbol());
            write_expr(out, rhs);
            out.push(')');
        }
        Expr::Comparison { op, lhs, rhs } => {
            out.push('(');
            write_expr(out, lhs);
            let _ = write!(out, " {} ", op.symbol());
            write_expr(out, rhs);
            out.push(')');
        }
        Expr::Call { name, args } => {
            let _ = write!(out, "{name}(");
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(out, arg);
            }
            out.push(')');
        }
    }
}
