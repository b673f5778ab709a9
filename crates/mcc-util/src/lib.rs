//! mcc-util - Foundation types shared by every compiler stage.
//!
//! Two small pieces of infrastructure live here:
//!
//! - [`Symbol`]: a 4-byte handle to a globally interned string, used for
//!   identifiers, keywords, and IR operand names. Comparison is an integer
//!   compare; the same name costs one allocation program-wide.
//! - [`IndexVec`]: a vector indexed by a dedicated id type, so block ids,
//!   for example, cannot be confused with plain `usize` offsets.

pub mod index_vec;
pub mod symbol;

pub use index_vec::{Idx, IndexVec};
pub use symbol::{Symbol, ID_MAIN, KW_ELSE, KW_IF, KW_INT, KW_RETURN, KW_WHILE};
