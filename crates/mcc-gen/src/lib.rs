//! mcc-gen - x86-64 System V assembly emission.
//!
//! Maps the optimized IR to GNU-assembler text. The register discipline is
//! deliberately naive: every operand lives in a stack slot, `%rax` is the
//! working register, and each instruction loads, computes, and stores.
//! Frames are sized per function by pre-scanning the function's
//! instructions for distinct operands ([`frame`]), and the reservation is
//! part of the prologue.

mod emit;
mod frame;

pub use emit::emit_program;
pub use frame::StackFrame;

use mcc_util::Symbol;
use thiserror::Error;

/// Emission failure.
///
/// The instruction set itself is fully mapped; errors come from the
/// register-only argument scheme and from IR the generator would never
/// produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    /// More call arguments than argument registers.
    #[error("call to {func} passes {count} arguments; at most 6 are supported")]
    TooManyArgs { func: Symbol, count: usize },

    /// More parameters than argument registers.
    #[error("function {func} declares more than 6 parameters")]
    TooManyParams { func: Symbol },

    /// A `CALL`'s argument count disagrees with the staged `ARG`s.
    #[error("call to {func} expects {expected} staged arguments, found {staged}")]
    ArgumentMismatch {
        func: Symbol,
        expected: usize,
        staged: usize,
    },
}
