//! Functions: named kernels with typed parameter lists.

use std::collections::HashSet;

use crate::arena::{Arena, Handle};
use crate::error::IrError;
use crate::expr::Expr;
use crate::stmt::Stmt;

/// An IR function.
///
/// `inputs` and `outputs` must refer to `Var` nodes in `exprs`; outputs are
/// appended after inputs in the emitted parameter list. The front end marks
/// writable buffers as pointer variables before handing the function over.
#[derive(Clone, Debug)]
pub struct Function {
    /// Emitted C function name.
    pub name: String,
    /// Read-only parameters.
    pub inputs: Vec<Handle<Expr>>,
    /// Writable parameters, appended after the inputs.
    pub outputs: Vec<Handle<Expr>>,
    /// Expression arena for this function.
    pub exprs: Arena<Expr>,
    /// The function body.
    pub body: Stmt,
}

impl Function {
    /// Creates an empty function with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            exprs: Arena::new(),
            body: Stmt::empty(),
        }
    }

    /// Checks the parameter-list invariants: every input/output handle is
    /// valid, refers to a `Var`, and appears exactly once.
    pub fn validate(&self) -> Result<(), IrError> {
        let mut seen = HashSet::new();
        for (slot, handles) in [("input", &self.inputs), ("output", &self.outputs)] {
            for &h in handles {
                let expr = self.exprs.try_get(h).ok_or(IrError::BadHandle {
                    index: h.index(),
                    size: self.exprs.len(),
                })?;
                let (name, _, _) = expr.as_var().ok_or_else(|| IrError::NotAVariable {
                    func: self.name.clone(),
                    slot,
                    index: h.index(),
                })?;
                if !seen.insert(h) {
                    return Err(IrError::DuplicateParameter {
                        func: self.name.clone(),
                        name: name.to_owned(),
                    });
                }
            }
        }
        Ok(())
    }
}
