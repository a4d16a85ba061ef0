//! Statements: side effects and control flow over arena expressions.

use crate::arena::Handle;
use crate::expr::Expr;

/// How a loop should be emitted.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum LoopKind {
    /// Plain sequential loop.
    Serial,
    /// Declared parallel; currently emitted as a serial header.
    Parallel,
    /// Emitted with a clang loop-hint pragma.
    Vectorized,
    /// Declared reduction; currently emitted as a serial header.
    Reduction,
}

/// A statement in the kernel IR.
///
/// Statements form an owned tree; expressions inside them are referenced by
/// handle into the enclosing function's arena.
#[derive(Clone, Debug)]
pub enum Stmt {
    /// A sequence of statements.
    Block(Vec<Stmt>),
    /// Write `base[index] = value` through a buffer variable.
    Store {
        base: Handle<Expr>,
        index: Handle<Expr>,
        value: Handle<Expr>,
    },
    /// Assign a value to a scalar variable.
    Assign {
        var: Handle<Expr>,
        value: Handle<Expr>,
    },
    /// Conditional branch.
    IfThenElse {
        cond: Handle<Expr>,
        then_body: Box<Stmt>,
        else_body: Option<Box<Stmt>>,
    },
    /// Counted loop: `for (var = start; var < end; var += increment)`.
    For {
        var: Handle<Expr>,
        start: Handle<Expr>,
        end: Handle<Expr>,
        increment: Handle<Expr>,
        kind: LoopKind,
        vec_width: u32,
        body: Box<Stmt>,
    },
    /// Condition-controlled loop.
    While {
        cond: Handle<Expr>,
        kind: LoopKind,
        vec_width: u32,
        body: Box<Stmt>,
    },
}

impl Stmt {
    /// The empty statement (an empty block).
    pub fn empty() -> Self {
        Self::Block(Vec::new())
    }

    /// Returns `true` if this is a block with no statements.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Block(stmts) if stmts.is_empty())
    }

    /// Builds a serial `For` loop.
    pub fn serial_for(
        var: Handle<Expr>,
        start: Handle<Expr>,
        end: Handle<Expr>,
        increment: Handle<Expr>,
        body: Stmt,
    ) -> Self {
        Self::For {
            var,
            start,
            end,
            increment,
            kind: LoopKind::Serial,
            vec_width: 0,
            body: Box::new(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::expr::ScalarType;

    #[test]
    fn empty_statement() {
        assert!(Stmt::empty().is_empty());
        assert!(!Stmt::Block(vec![Stmt::empty()]).is_empty());
    }

    #[test]
    fn build_if_statement() {
        let mut exprs: Arena<Expr> = Arena::new();
        let cond = exprs.int(1);
        let stmt = Stmt::IfThenElse {
            cond,
            then_body: Box::new(Stmt::empty()),
            else_body: None,
        };
        if let Stmt::IfThenElse { else_body, .. } = &stmt {
            assert!(else_body.is_none());
        } else {
            panic!("expected IfThenElse");
        }
    }

    #[test]
    fn build_serial_for() {
        let mut exprs: Arena<Expr> = Arena::new();
        let i = exprs.var("i", ScalarType::Int);
        let zero = exprs.int(0);
        let n = exprs.int(4);
        let one = exprs.int(1);
        let stmt = Stmt::serial_for(i, zero, n, one, Stmt::empty());
        if let Stmt::For {
            kind, vec_width, ..
        } = stmt
        {
            assert_eq!(kind, LoopKind::Serial);
            assert_eq!(vec_width, 0);
        } else {
            panic!("expected For");
        }
    }
}
