//! The two-pass analyzer.

use mcc_par::ast::{CompoundStmt, Expr, FunctionDecl, Program, Stmt, VarDecl};
use mcc_util::{Symbol, ID_MAIN};

use crate::symtab::{SymbolKind, SymbolTable};
use crate::SemanticError;

/// Walks a program, building the symbol table and checking scope rules.
///
/// After a successful [`Analyzer::analyze`] every scope has been exited and
/// [`Analyzer::table`] only holds the scope-0 function symbols until
/// [`Analyzer::finish`] consumes the analyzer.
pub struct Analyzer {
    table: SymbolTable,
    current_function: Option<Symbol>,
    has_return: bool,
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            table: SymbolTable::new(),
            current_function: None,
            has_return: false,
        }
    }

    /// The table in its current state (used by the driver's phase dump).
    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    /// Consume the analyzer, releasing the symbol table.
    pub fn finish(self) -> SymbolTable {
        self.table
    }

    pub fn analyze(&mut self, program: &Program) -> Result<(), SemanticError> {
        // Pass 1: register every function at scope 0. Forward references
        // between functions are legal because of this pass.
        for func in &program.items {
            self.declare_function(func)?;
        }

        // Pass 2: analyze each body in its own scope.
        for func in &program.items {
            self.analyze_function(func)?;
        }

        Ok(())
    }

    fn declare_function(&mut self, func: &FunctionDecl) -> Result<(), SemanticError> {
        if self.table.lookup(func.name).is_some() {
            return Err(SemanticError::Redeclaration(func.name));
        }
        let param_types = func.params.iter().map(|p| p.type_name).collect();
        self.table.insert(
            func.name,
            Symbol::intern("function"),
            SymbolKind::Function { param_types },
        );
        Ok(())
    }

    fn analyze_function(&mut self, func: &FunctionDecl) -> Result<(), SemanticError> {
        self.current_function = Some(func.name);
        self.has_return = false;

        self.table.enter_scope();
        for param in &func.params {
            if self
                .table
                .lookup(param.name)
                .is_some_and(|s| s.scope_level == self.table.current_scope())
            {
                self.table.exit_scope();
                return Err(SemanticError::Redeclaration(param.name));
            }
            self.table
                .insert(param.name, param.type_name, SymbolKind::Variable);
        }

        let result = self.analyze_compound(&func.body);
        self.table.exit_scope();
        self.current_function = None;
        result?;

        // `main` may fall off the end; everything else must return.
        if !self.has_return && func.name != ID_MAIN {
            return Err(SemanticError::MissingReturn(func.name));
        }
        Ok(())
    }

    fn analyze_compound(&mut self, block: &CompoundStmt) -> Result<(), SemanticError> {
        self.table.enter_scope();
        let result = block
            .stmts
            .iter()
            .try_for_each(|stmt| self.analyze_stmt(stmt));
        self.table.exit_scope();
        result
    }

    fn analyze_stmt(&mut self, stmt: &Stmt) -> Result<(), SemanticError> {
        match stmt {
            Stmt::VarDecl(VarDecl {
                name,
                type_name,
                init,
            }) => {
                if self.table.lookup(*name).is_some() {
                    return Err(SemanticError::Redeclaration(*name));
                }
                self.table.insert(*name, *type_name, SymbolKind::Variable);
                if let Some(init) = init {
                    self.analyze_expr(init)?;
                }
                Ok(())
            }
            Stmt::Assign { target, value } => {
                match self.table.lookup(*target) {
                    Some(sym) if !sym.kind.is_function() => {}
                    // A function name is not an assignable variable.
                    _ => return Err(SemanticError::UndefinedVariable(*target)),
                }
                self.analyze_expr(value)
            }
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                self.analyze_expr(cond)?;
                self.analyze_compound(then_body)?;
                if let Some(else_body) = else_body {
                    self.analyze_compound(else_body)?;
                }
                Ok(())
            }
            Stmt::While { cond, body } => {
                self.analyze_expr(cond)?;
                self.analyze_compound(body)
            }
            Stmt::Return { value } => {
                if self.current_function.is_none() {
                    return Err(SemanticError::ReturnOutsideFunction);
                }
                self.has_return = true;
                self.analyze_expr(value)
            }
            Stmt::Expr(expr) => self.analyze_expr(expr),
        }
    }

    fn analyze_expr(&mut self, expr: &Expr) -> Result<(), SemanticError> {
        match expr {
            Expr::Number(_) => Ok(()),
            Expr::Ident(name) => match self.table.lookup(*name) {
                Some(sym) if !sym.kind.is_function() => Ok(()),
                _ => Err(SemanticError::UndefinedVariable(*name)),
            },
            Expr::Binary { lhs, rhs, .. } | Expr::Comparison { lhs, rhs, .. } => {
                self.analyze_expr(lhs)?;
                self.analyze_expr(rhs)
            }
            Expr::Call { name, args } => {
                let expected = match self.table.lookup(*name) {
                    Some(sym) => match &sym.kind {
                        SymbolKind::Function { param_types } => param_types.len(),
                        SymbolKind::Variable => {
                            return Err(SemanticError::UndefinedFunction(*name))
                        }
                    },
                    None => return Err(SemanticError::UndefinedFunction(*name)),
                };
                if args.len() != expected {
                    return Err(SemanticError::ArityMismatch {
                        name: *name,
                        expected,
                        found: args.len(),
                    });
                }
                args.iter().try_for_each(|arg| self.analyze_expr(arg))
            }
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}
