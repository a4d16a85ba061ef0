//! Structural traversal of kernel IR.
//!
//! [`Visitor`] has one hook per expression and statement variant. Every hook
//! defaults to pre-order, left-to-right recursion over the node's children,
//! so an override sees a node before any of its descendants and may call the
//! matching `walk_*` function to continue below it. Traversals that must
//! handle every variant exhaustively use `match` directly (see the C back
//! end's printer).

use crate::arena::Handle;
use crate::expr::Expr;
use crate::func::Function;
use crate::stmt::Stmt;

/// A stateful IR visitor with overridable per-variant hooks.
#[allow(unused_variables)]
pub trait Visitor {
    /// Dispatches on the expression's variant.
    fn visit_expr(&mut self, func: &Function, expr: Handle<Expr>) {
        dispatch_expr(self, func, expr);
    }

    /// Dispatches on the statement's variant.
    fn visit_stmt(&mut self, func: &Function, stmt: &Stmt) {
        dispatch_stmt(self, func, stmt);
    }

    fn visit_var(&mut self, func: &Function, expr: Handle<Expr>) {}

    fn visit_int_imm(&mut self, func: &Function, expr: Handle<Expr>) {}

    fn visit_float_imm(&mut self, func: &Function, expr: Handle<Expr>) {}

    fn visit_double_imm(&mut self, func: &Function, expr: Handle<Expr>) {}

    fn visit_binary(&mut self, func: &Function, expr: Handle<Expr>) {
        walk_binary(self, func, expr);
    }

    fn visit_load(&mut self, func: &Function, expr: Handle<Expr>) {
        walk_load(self, func, expr);
    }

    fn visit_call(&mut self, func: &Function, expr: Handle<Expr>) {
        walk_call(self, func, expr);
    }

    fn visit_cast(&mut self, func: &Function, expr: Handle<Expr>) {
        walk_cast(self, func, expr);
    }

    fn visit_block(&mut self, func: &Function, stmts: &[Stmt]) {
        walk_block(self, func, stmts);
    }

    fn visit_store(&mut self, func: &Function, stmt: &Stmt) {
        walk_store(self, func, stmt);
    }

    fn visit_assign(&mut self, func: &Function, stmt: &Stmt) {
        walk_assign(self, func, stmt);
    }

    fn visit_if(&mut self, func: &Function, stmt: &Stmt) {
        walk_if(self, func, stmt);
    }

    fn visit_for(&mut self, func: &Function, stmt: &Stmt) {
        walk_for(self, func, stmt);
    }

    fn visit_while(&mut self, func: &Function, stmt: &Stmt) {
        walk_while(self, func, stmt);
    }
}

/// Routes an expression to its per-variant hook.
pub fn dispatch_expr<V: Visitor + ?Sized>(v: &mut V, func: &Function, expr: Handle<Expr>) {
    match func.exprs[expr] {
        Expr::Var { .. } => v.visit_var(func, expr),
        Expr::IntImm(_) => v.visit_int_imm(func, expr),
        Expr::FloatImm(_) => v.visit_float_imm(func, expr),
        Expr::DoubleImm(_) => v.visit_double_imm(func, expr),
        Expr::Binary { .. } => v.visit_binary(func, expr),
        Expr::Load { .. } => v.visit_load(func, expr),
        Expr::Call { .. } => v.visit_call(func, expr),
        Expr::Cast { .. } => v.visit_cast(func, expr),
    }
}

/// Routes a statement to its per-variant hook.
pub fn dispatch_stmt<V: Visitor + ?Sized>(v: &mut V, func: &Function, stmt: &Stmt) {
    match stmt {
        Stmt::Block(stmts) => v.visit_block(func, stmts),
        Stmt::Store { .. } => v.visit_store(func, stmt),
        Stmt::Assign { .. } => v.visit_assign(func, stmt),
        Stmt::IfThenElse { .. } => v.visit_if(func, stmt),
        Stmt::For { .. } => v.visit_for(func, stmt),
        Stmt::While { .. } => v.visit_while(func, stmt),
    }
}

pub fn walk_binary<V: Visitor + ?Sized>(v: &mut V, func: &Function, expr: Handle<Expr>) {
    if let Expr::Binary { left, right, .. } = func.exprs[expr] {
        v.visit_expr(func, left);
        v.visit_expr(func, right);
    }
}

pub fn walk_load<V: Visitor + ?Sized>(v: &mut V, func: &Function, expr: Handle<Expr>) {
    if let Expr::Load { base, index } = func.exprs[expr] {
        v.visit_expr(func, base);
        v.visit_expr(func, index);
    }
}

pub fn walk_call<V: Visitor + ?Sized>(v: &mut V, func: &Function, expr: Handle<Expr>) {
    if let Expr::Call { ref args, .. } = func.exprs[expr] {
        for &arg in args {
            v.visit_expr(func, arg);
        }
    }
}

pub fn walk_cast<V: Visitor + ?Sized>(v: &mut V, func: &Function, expr: Handle<Expr>) {
    if let Expr::Cast { value, .. } = func.exprs[expr] {
        v.visit_expr(func, value);
    }
}

pub fn walk_block<V: Visitor + ?Sized>(v: &mut V, func: &Function, stmts: &[Stmt]) {
    for s in stmts {
        v.visit_stmt(func, s);
    }
}

pub fn walk_store<V: Visitor + ?Sized>(v: &mut V, func: &Function, stmt: &Stmt) {
    if let Stmt::Store { base, index, value } = *stmt {
        v.visit_expr(func, base);
        v.visit_expr(func, index);
        v.visit_expr(func, value);
    }
}

pub fn walk_assign<V: Visitor + ?Sized>(v: &mut V, func: &Function, stmt: &Stmt) {
    if let Stmt::Assign { var, value } = *stmt {
        v.visit_expr(func, var);
        v.visit_expr(func, value);
    }
}

pub fn walk_if<V: Visitor + ?Sized>(v: &mut V, func: &Function, stmt: &Stmt) {
    if let Stmt::IfThenElse {
        cond,
        ref then_body,
        ref else_body,
    } = *stmt
    {
        v.visit_expr(func, cond);
        v.visit_stmt(func, then_body);
        if let Some(e) = else_body {
            v.visit_stmt(func, e);
        }
    }
}

pub fn walk_for<V: Visitor + ?Sized>(v: &mut V, func: &Function, stmt: &Stmt) {
    if let Stmt::For {
        var,
        start,
        end,
        increment,
        ref body,
        ..
    } = *stmt
    {
        v.visit_expr(func, var);
        v.visit_expr(func, start);
        v.visit_expr(func, end);
        v.visit_expr(func, increment);
        v.visit_stmt(func, body);
    }
}

pub fn walk_while<V: Visitor + ?Sized>(v: &mut V, func: &Function, stmt: &Stmt) {
    if let Stmt::While { cond, ref body, .. } = *stmt {
        v.visit_expr(func, cond);
        v.visit_stmt(func, body);
    }
}
