//! The printer: IR functions to C99 text.

use std::collections::HashMap;
use std::fmt::Write;

use spindle_ir::visit::Visitor;
use spindle_ir::{Expr, Function, Handle, LoopKind, ScalarType, Stmt};

use crate::NameGenerator;

fn c_type(ty: ScalarType, is_ptr: bool) -> String {
    let base = match ty {
        ScalarType::Int => "int",
        ScalarType::Float => "float",
        ScalarType::Double => "double",
    };
    if is_ptr {
        format!("{base}*")
    } else {
        base.to_owned()
    }
}

fn vectorize_pragma(width: u32) -> String {
    if width == 0 {
        "#pragma clang loop interleave(enable) vectorize(enable)".to_owned()
    } else {
        format!("#pragma clang loop interleave(enable) vectorize_width({width})")
    }
}

/// Pre-pass: collects every `Var` reachable from the body, in pre-order.
/// Parameters are seeded with their source names; every other variable gets a
/// generated identifier on first sight.
struct FindVars<'a> {
    names: &'a NameGenerator,
    rename: HashMap<Handle<Expr>, String>,
    decls: Vec<Handle<Expr>>,
}

impl Visitor for FindVars<'_> {
    fn visit_var(&mut self, func: &Function, expr: Handle<Expr>) {
        if !self.rename.contains_key(&expr) {
            let (name, _, _) = func.exprs[expr].as_var().expect("dispatched on Var");
            self.rename.insert(expr, self.names.unique(name));
            self.decls.push(expr);
        }
    }
}

struct Printer<'a> {
    func: &'a Function,
    rename: &'a HashMap<Handle<Expr>, String>,
    out: String,
    indent: usize,
}

impl Printer<'_> {
    fn pad(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    fn var_name(&self, expr: Handle<Expr>) -> &str {
        self.rename.get(&expr).unwrap_or_else(|| {
            let (name, _, _) = self.func.exprs[expr]
                .as_var()
                .expect("rename map is keyed by Var handles");
            panic!(
                "variable '{name}' {expr:?} not resolved in function '{}'",
                self.func.name
            )
        })
    }

    fn expr(&mut self, expr: Handle<Expr>) {
        match &self.func.exprs[expr] {
            Expr::Var { .. } => {
                let name = self.var_name(expr).to_owned();
                self.out.push_str(&name);
            }
            Expr::IntImm(v) => {
                let _ = write!(self.out, "{v}");
            }
            Expr::FloatImm(v) => {
                let _ = write!(self.out, "{v:?}f");
            }
            Expr::DoubleImm(v) => {
                let _ = write!(self.out, "{v:?}");
            }
            Expr::Binary { op, left, right } => {
                let (op, left, right) = (*op, *left, *right);
                self.out.push('(');
                self.expr(left);
                let _ = write!(self.out, " {op} ");
                self.expr(right);
                self.out.push(')');
            }
            Expr::Load { base, index } => {
                let (base, index) = (*base, *index);
                self.expr(base);
                self.out.push('[');
                self.expr(index);
                self.out.push(']');
            }
            Expr::Call { name, args } => {
                let name = name.clone();
                let args = args.clone();
                let _ = write!(self.out, "{name}(");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(*arg);
                }
                self.out.push(')');
            }
            Expr::Cast { ty, value } => {
                let (ty, value) = (*ty, *value);
                let _ = write!(self.out, "({})", c_type(ty, false));
                self.expr(value);
            }
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(stmts) => {
                for s in stmts {
                    self.stmt(s);
                }
            }
            Stmt::Store { base, index, value } => {
                self.pad();
                self.expr(*base);
                self.out.push('[');
                self.expr(*index);
                self.out.push_str("] = ");
                self.expr(*value);
                self.out.push_str(";\n");
            }
            Stmt::Assign { var, value } => {
                self.pad();
                self.expr(*var);
                self.out.push_str(" = ");
                self.expr(*value);
                self.out.push_str(";\n");
            }
            Stmt::IfThenElse {
                cond,
                then_body,
                else_body,
            } => {
                self.pad();
                self.out.push_str("if (");
                self.expr(*cond);
                self.out.push_str(") {\n");
                self.indent += 1;
                self.stmt(then_body);
                self.indent -= 1;
                self.pad();
                if let Some(e) = else_body {
                    self.out.push_str("} else {\n");
                    self.indent += 1;
                    self.stmt(e);
                    self.indent -= 1;
                    self.pad();
                }
                self.out.push_str("}\n");
            }
            Stmt::For {
                var,
                start,
                end,
                increment,
                kind,
                vec_width,
                body,
            } => {
                if *kind == LoopKind::Vectorized {
                    self.pad();
                    self.out.push_str(&vectorize_pragma(*vec_width));
                    self.out.push('\n');
                }
                self.pad();
                self.out.push_str("for (");
                self.expr(*var);
                self.out.push_str(" = ");
                self.expr(*start);
                self.out.push_str("; ");
                self.expr(*var);
                self.out.push_str(" < ");
                self.expr(*end);
                self.out.push_str("; ");
                self.expr(*var);
                self.out.push_str(" += ");
                self.expr(*increment);
                self.out.push_str(") {\n");
                self.indent += 1;
                self.stmt(body);
                self.indent -= 1;
                self.pad();
                self.out.push_str("}\n");
            }
            Stmt::While {
                cond,
                kind,
                vec_width,
                body,
            } => {
                if *kind == LoopKind::Vectorized {
                    self.pad();
                    self.out.push_str(&vectorize_pragma(*vec_width));
                    self.out.push('\n');
                }
                self.pad();
                self.out.push_str("while (");
                self.expr(*cond);
                self.out.push_str(") {\n");
                self.indent += 1;
                self.stmt(body);
                self.indent -= 1;
                self.pad();
                self.out.push_str("}\n");
            }
        }
    }
}

pub(crate) fn emit_function(func: &Function, names: &NameGenerator) -> String {
    let mut finder = FindVars {
        names,
        rename: HashMap::new(),
        decls: Vec::new(),
    };

    // Parameters keep their source names verbatim.
    for (slot, handles) in [("input", &func.inputs), ("output", &func.outputs)] {
        for &h in handles {
            let expr = func
                .exprs
                .try_get(h)
                .unwrap_or_else(|| panic!("{slot} {h:?} of function '{}' is dangling", func.name));
            let (name, _, _) = expr.as_var().unwrap_or_else(|| {
                panic!("{slot} {h:?} of function '{}' is not a variable", func.name)
            });
            if finder.rename.insert(h, name.to_owned()).is_some() {
                panic!("duplicate parameter '{name}' in function '{}'", func.name);
            }
        }
    }
    finder.visit_stmt(func, &func.body);

    let mut out = String::new();
    let _ = write!(out, "int {}(", func.name);
    for (i, &h) in func.inputs.iter().chain(func.outputs.iter()).enumerate() {
        let (name, ty, is_ptr) = func.exprs[h].as_var().expect("checked above");
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{} {name}", c_type(ty, is_ptr));
    }
    out.push_str(") {\n");

    for &h in &finder.decls {
        let (_, ty, is_ptr) = func.exprs[h].as_var().expect("decls hold Var handles");
        let _ = writeln!(out, "  {} {};", c_type(ty, is_ptr), finder.rename[&h]);
    }

    let mut printer = Printer {
        func,
        rename: &finder.rename,
        out,
        indent: 1,
    };
    printer.stmt(&func.body);
    let mut out = printer.out;

    out.push_str("  return 0;\n}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use spindle_ir::BinOp;

    #[test]
    fn c_type_mapping() {
        assert_eq!(c_type(ScalarType::Int, false), "int");
        assert_eq!(c_type(ScalarType::Float, false), "float");
        assert_eq!(c_type(ScalarType::Double, true), "double*");
    }

    #[test]
    fn pragma_forms() {
        assert_eq!(
            vectorize_pragma(0),
            "#pragma clang loop interleave(enable) vectorize(enable)"
        );
        assert_eq!(
            vectorize_pragma(8),
            "#pragma clang loop interleave(enable) vectorize_width(8)"
        );
    }

    #[test]
    fn nested_control_flow_indents_two_spaces() {
        let names = NameGenerator::new();
        let mut f = Function::new("nest");
        let x = f.exprs.var("x", ScalarType::Int);
        let zero = f.exprs.int(0);
        let ten = f.exprs.int(10);
        let one = f.exprs.int(1);
        let cond = f.exprs.binary(BinOp::Lt, x, ten);
        f.body = Stmt::Block(vec![Stmt::For {
            var: x,
            start: zero,
            end: ten,
            increment: one,
            kind: LoopKind::Serial,
            vec_width: 0,
            body: Box::new(Stmt::IfThenElse {
                cond,
                then_body: Box::new(Stmt::Assign {
                    var: x,
                    value: zero,
                }),
                else_body: None,
            }),
        }]);
        let text = emit_function(&f, &names);
        assert!(text.contains("\n  for ("));
        assert!(text.contains("\n    if ("));
        assert!(text.contains("\n      _x_0 = 0;"));
    }

    #[test]
    fn literals_print_as_c() {
        let names = NameGenerator::new();
        let mut f = Function::new("lits");
        let x = f.exprs.var("x", ScalarType::Double);
        let d = f.exprs.append(Expr::DoubleImm(1.0));
        f.body = Stmt::Block(vec![Stmt::Assign { var: x, value: d }]);
        let text = emit_function(&f, &names);
        assert!(text.contains("= 1.0;"), "double literal must keep its point");
    }

    #[test]
    fn call_and_cast_expressions() {
        let names = NameGenerator::new();
        let mut f = Function::new("callcast");
        let x = f.exprs.var("x", ScalarType::Int);
        let d = f.exprs.append(Expr::DoubleImm(2.5));
        let cast = f.exprs.append(Expr::Cast {
            ty: ScalarType::Int,
            value: d,
        });
        let call = f.exprs.append(Expr::Call {
            name: "abs".into(),
            args: vec![cast],
        });
        f.body = Stmt::Block(vec![Stmt::Assign { var: x, value: call }]);
        let text = emit_function(&f, &names);
        assert!(text.contains("= abs((int)2.5);"));
    }
}
