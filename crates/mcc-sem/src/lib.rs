//! mcc-sem - Semantic analysis.
//!
//! Validates a parsed program against the scoping rules and builds the
//! symbol table along the way. Analysis runs in two passes: the first
//! registers every function at scope 0 (so forward references work), the
//! second walks each function body inside its own scope. The analyzer is
//! fail-fast; the first violation aborts the stage.

mod analysis;
mod symtab;

pub use analysis::Analyzer;
pub use symtab::{SymbolInfo, SymbolKind, SymbolTable};

use mcc_util::Symbol;
use thiserror::Error;

/// A scoping or call-shape violation.
///
/// The rendered form is `<SubKind>: <detail>`, which the driver prefixes
/// with the stage name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("Redeclaration: {0}")]
    Redeclaration(Symbol),

    #[error("UndefinedVariable: {0}")]
    UndefinedVariable(Symbol),

    #[error("UndefinedFunction: {0}")]
    UndefinedFunction(Symbol),

    #[error("ArityMismatch: {name} expects {expected} arguments, got {found}")]
    ArityMismatch {
        name: Symbol,
        expected: usize,
        found: usize,
    },

    #[error("ReturnOutsideFunction")]
    ReturnOutsideFunction,

    #[error("MissingReturn: {0}")]
    MissingReturn(Symbol),
}
