//! The scoped symbol table.
//!
//! Symbols live on one flat stack in declaration order, each tagged with
//! the scope level it was declared at. Lookup scans newest-to-oldest so
//! inner declarations shadow outer ones, and leaving a scope truncates the
//! tail of the stack; the table is never edited in the middle.

use std::fmt;

use mcc_util::Symbol;

/// What a name refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function {
        /// Parameter type names, in declaration order.
        param_types: Vec<Symbol>,
    },
}

impl SymbolKind {
    pub fn is_function(&self) -> bool {
        matches!(self, SymbolKind::Function { .. })
    }
}

/// One declared name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolInfo {
    pub name: Symbol,
    pub ty: Symbol,
    pub scope_level: u32,
    pub kind: SymbolKind,
}

/// Stack-discipline symbol table with a current-scope counter.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<SymbolInfo>,
    current_scope: u32,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_scope(&self) -> u32 {
        self.current_scope
    }

    /// Declare `name` at the current scope.
    pub fn insert(&mut self, name: Symbol, ty: Symbol, kind: SymbolKind) {
        self.symbols.push(SymbolInfo {
            name,
            ty,
            scope_level: self.current_scope,
            kind,
        });
    }

    /// Find the innermost declaration of `name`, if any.
    pub fn lookup(&self, name: Symbol) -> Option<&SymbolInfo> {
        self.symbols.iter().rev().find(|s| s.name == name)
    }

    pub fn enter_scope(&mut self) {
        self.current_scope += 1;
    }

    /// Drop every symbol declared at the current level, then decrement it.
    pub fn exit_scope(&mut self) {
        while self
            .symbols
            .last()
            .is_some_and(|s| s.scope_level == self.current_scope)
        {
            self.symbols.pop();
        }
        self.current_scope = self.current_scope.saturating_sub(1);
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SymbolInfo> {
        self.symbols.iter()
    }
}

/// Column view used by the driver's phase output.
impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<20} | {:<10} | {:<10} | {}",
            "Name", "Type", "Scope", "Category"
        )?;
        writeln!(f, "{}", "-".repeat(60))?;
        for sym in &self.symbols {
            writeln!(
                f,
                "{:<20} | {:<10} | {:<10} | {}",
                sym.name.as_str(),
                sym.ty.as_str(),
                sym.scope_level,
                if sym.kind.is_function() {
                    "Function"
                } else {
                    "Variable"
                },
            )?;
        }
        Ok(())
    }
}
