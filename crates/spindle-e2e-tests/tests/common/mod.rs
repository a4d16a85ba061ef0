use std::sync::Arc;

use spindle_backend_c::{CodeGen, NameGenerator};
use spindle_ir::{Function, LoopKind, ScalarType, Stmt};

/// A code generator with a fresh counter, for deterministic emitted names.
#[allow(dead_code)]
pub fn fresh_codegen() -> CodeGen {
    CodeGen::with_names(Arc::new(NameGenerator::new()))
}

/// Builds `int copy(double* A, double* B)` copying four doubles.
#[allow(dead_code)]
pub fn copy_kernel(kind: LoopKind, vec_width: u32) -> Function {
    let mut f = Function::new("copy");
    let a = f.exprs.ptr("A", ScalarType::Double);
    let b = f.exprs.ptr("B", ScalarType::Double);
    let i = f.exprs.var("i", ScalarType::Int);
    let zero = f.exprs.int(0);
    let n = f.exprs.int(4);
    let one = f.exprs.int(1);
    let load = f.exprs.load(a, i);
    f.inputs.push(a);
    f.outputs.push(b);
    f.body = Stmt::Block(vec![Stmt::For {
        var: i,
        start: zero,
        end: n,
        increment: one,
        kind,
        vec_width,
        body: Box::new(Stmt::Store {
            base: b,
            index: i,
            value: load,
        }),
    }]);
    f.validate().expect("copy kernel must validate");
    f
}

/// The line index of `needle` in `text`, for adjacency assertions.
#[allow(dead_code)]
pub fn line_of(text: &str, needle: &str) -> usize {
    text.lines()
        .position(|l| l.contains(needle))
        .unwrap_or_else(|| panic!("no line containing {needle:?} in:\n{text}"))
}
