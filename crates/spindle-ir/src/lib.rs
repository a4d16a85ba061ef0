//! Spindle intermediate representation.
//!
//! An arena-based imperative IR for sparse-tensor kernels. Expressions live
//! in a per-function [`Arena`] and are referenced by [`Handle`]; a handle is
//! the node's identity, which is what the C back end's rename map and the
//! storage layer's mode variable maps key on.

pub mod arena;
mod display;
mod error;
mod expr;
mod func;
mod stmt;
pub mod visit;

pub use arena::{Arena, Handle};
pub use display::dump_function;
pub use error::IrError;
pub use expr::{BinOp, Expr, ScalarType};
pub use func::Function;
pub use stmt::{LoopKind, Stmt};
pub use visit::Visitor;
