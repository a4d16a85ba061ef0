//! Display implementations and text dump for debugging.

use std::fmt;

use crate::arena::Handle;
use crate::expr::{BinOp, Expr, ScalarType};
use crate::func::Function;
use crate::stmt::{LoopKind, Stmt};

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Double => "double",
        })
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::And => "&&",
            Self::Or => "||",
        })
    }
}

impl fmt::Display for LoopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Serial => "serial",
            Self::Parallel => "parallel",
            Self::Vectorized => "vectorized",
            Self::Reduction => "reduction",
        })
    }
}

fn format_expr(handle: Handle<Expr>, func: &Function) -> String {
    match &func.exprs[handle] {
        Expr::Var { name, ty, is_ptr } => {
            let star = if *is_ptr { "*" } else { "" };
            format!("{name}: {ty}{star}")
        }
        Expr::IntImm(v) => format!("{v}"),
        Expr::FloatImm(v) => format!("{v}f"),
        Expr::DoubleImm(v) => format!("{v}"),
        Expr::Binary { op, left, right } => format!("{left:?} {op} {right:?}"),
        Expr::Load { base, index } => format!("{base:?}[{index:?}]"),
        Expr::Call { name, args } => {
            let args: Vec<_> = args.iter().map(|h| format!("{h:?}")).collect();
            format!("{name}({})", args.join(", "))
        }
        Expr::Cast { ty, value } => format!("({ty}) {value:?}"),
    }
}

fn write_stmt(out: &mut String, func: &Function, stmt: &Stmt, indent: usize) {
    let pad = " ".repeat(indent);
    match stmt {
        Stmt::Block(stmts) => {
            for s in stmts {
                write_stmt(out, func, s, indent);
            }
        }
        Stmt::Store { base, index, value } => {
            out.push_str(&format!("{pad}Store {base:?}[{index:?}] = {value:?}\n"));
        }
        Stmt::Assign { var, value } => {
            out.push_str(&format!("{pad}Assign {var:?} = {value:?}\n"));
        }
        Stmt::IfThenElse {
            cond,
            then_body,
            else_body,
        } => {
            out.push_str(&format!("{pad}If ({cond:?}) {{\n"));
            write_stmt(out, func, then_body, indent + 2);
            if let Some(e) = else_body {
                out.push_str(&format!("{pad}}} else {{\n"));
                write_stmt(out, func, e, indent + 2);
            }
            out.push_str(&format!("{pad}}}\n"));
        }
        Stmt::For {
            var,
            start,
            end,
            increment,
            kind,
            body,
            ..
        } => {
            out.push_str(&format!(
                "{pad}For[{kind}] {var:?} in {start:?}..{end:?} step {increment:?} {{\n"
            ));
            write_stmt(out, func, body, indent + 2);
            out.push_str(&format!("{pad}}}\n"));
        }
        Stmt::While {
            cond, kind, body, ..
        } => {
            out.push_str(&format!("{pad}While[{kind}] ({cond:?}) {{\n"));
            write_stmt(out, func, body, indent + 2);
            out.push_str(&format!("{pad}}}\n"));
        }
    }
}

/// Produces a human-readable text dump of a [`Function`] for debugging.
pub fn dump_function(func: &Function) -> String {
    let mut out = String::new();

    let params: Vec<_> = func
        .inputs
        .iter()
        .chain(func.outputs.iter())
        .map(|&h| format!("{h:?} {}", format_expr(h, func)))
        .collect();
    out.push_str(&format!("fn {}({}) {{\n", func.name, params.join(", ")));

    if !func.exprs.is_empty() {
        out.push_str("  Expressions:\n");
        for (handle, _) in func.exprs.iter() {
            out.push_str(&format!("    {handle:?} {}\n", format_expr(handle, func)));
        }
    }

    if !func.body.is_empty() {
        out.push_str("  Body:\n");
        write_stmt(&mut out, func, &func.body, 4);
    }

    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_scalar_type() {
        assert_eq!(format!("{}", ScalarType::Int), "int");
        assert_eq!(format!("{}", ScalarType::Double), "double");
    }

    #[test]
    fn display_bin_op() {
        assert_eq!(format!("{}", BinOp::Add), "+");
        assert_eq!(format!("{}", BinOp::Le), "<=");
        assert_eq!(format!("{}", BinOp::And), "&&");
    }

    #[test]
    fn dump_empty_function() {
        let f = Function::new("noop");
        let dump = dump_function(&f);
        assert!(dump.starts_with("fn noop()"));
    }

    #[test]
    fn dump_annotates_handles() {
        let mut f = Function::new("copy");
        let a = f.exprs.ptr("A", crate::expr::ScalarType::Double);
        f.inputs.push(a);
        let dump = dump_function(&f);
        assert!(dump.contains("[0] A: double*"));
    }
}
