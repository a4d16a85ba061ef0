//! Error types for the Spindle IR.

/// Errors that can occur when constructing or validating IR.
#[derive(Debug, thiserror::Error)]
pub enum IrError {
    /// A handle index is out of bounds for its arena.
    #[error("handle index {index} out of bounds (arena size: {size})")]
    BadHandle { index: usize, size: usize },

    /// A function parameter does not refer to a `Var` node.
    #[error("{slot} [{index}] of function '{func}' is not a variable")]
    NotAVariable {
        func: String,
        slot: &'static str,
        index: usize,
    },

    /// The same variable appears twice in a function's parameter list.
    #[error("duplicate parameter '{name}' in function '{func}'")]
    DuplicateParameter { func: String, name: String },
}
