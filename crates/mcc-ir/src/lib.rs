//! mcc-ir - Three-address intermediate representation.
//!
//! This crate owns the middle of the pipeline: the IR data model
//! ([`ir`]), lowering from the AST ([`lower`]), basic-block construction
//! and reachability ([`cfg`]), and the semantics-preserving rewrite passes
//! ([`opt`]).
//!
//! The IR is an untyped, linear instruction stream. Temporaries are
//! single-assignment by construction of the lowering, which several
//! optimizer passes rely on; named locals may be reassigned freely.

pub mod cfg;
pub mod ir;
pub mod lower;
pub mod opt;

pub use cfg::{build_blocks, mark_reachable, BasicBlock, BlockId};
pub use ir::{BinOp, CmpKind, Instr, IrProgram, Label, Operand, Value};
pub use lower::lower_program;
pub use opt::{optimize, OptError, OptFlags, OptLevel};
