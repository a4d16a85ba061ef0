//! Full-pipeline scenarios: emit C, compile with `cc`, load, and dispatch.

mod common;

use common::{copy_kernel, fresh_codegen};
use spindle_ir::{Function, LoopKind, ScalarType, Stmt};
use spindle_jit::Module;
use spindle_storage::compressed::{CRD_VAR, POS_VAR};
use spindle_storage::dense::SIZE_VAR;
use spindle_storage::{dense, sparse, values, Dimension};

#[test]
fn compile_load_and_resolve_symbol() {
    let text = fresh_codegen().compile(&copy_kernel(LoopKind::Serial, 0));
    let mut module = Module::new(text);
    module.compile().expect("emitted C must be accepted by cc");

    let f = module.get_func("copy").expect("symbol 'copy' must resolve");
    assert!(!f.is_null());

    let err = module.get_func("missing").unwrap_err();
    assert!(err.to_string().contains("'missing'"));
}

#[test]
fn dense_copy_runs_end_to_end() {
    let text = fresh_codegen().compile(&copy_kernel(LoopKind::Serial, 0));
    let mut module = Module::new(text);
    module.compile().unwrap();

    let copy: unsafe extern "C" fn(*const f64, *mut f64) -> i32 =
        unsafe { std::mem::transmute(module.get_func("copy").unwrap()) };

    let a = [1.0, 2.0, 3.0, 4.0];
    let mut b = [0.0f64; 4];
    let rc = unsafe { copy(a.as_ptr(), b.as_mut_ptr()) };
    assert_eq!(rc, 0);
    assert_eq!(b, a);
}

#[test]
fn vectorized_copy_still_compiles_and_runs() {
    let text = fresh_codegen().compile(&copy_kernel(LoopKind::Vectorized, 8));
    assert!(text.contains("#pragma clang loop interleave(enable) vectorize_width(8)"));

    let mut module = Module::new(text);
    module.compile().unwrap();
    let copy: unsafe extern "C" fn(*const f64, *mut f64) -> i32 =
        unsafe { std::mem::transmute(module.get_func("copy").unwrap()) };

    let a = [5.0, 6.0, 7.0, 8.0];
    let mut b = [0.0f64; 4];
    assert_eq!(unsafe { copy(a.as_ptr(), b.as_mut_ptr()) }, 0);
    assert_eq!(b, a);
}

/// Lowers a row-sum kernel over CSR storage by hand, the way the lowering
/// pass does: the outer loop comes from the dense root's coordinate bounds,
/// the inner loop from the compressed level's position bounds.
///
/// ```c
/// int rowsum(int N, int* pos, int* crd, double* vals, double* out) {
///     for (i = 0; i < N; i += 1)
///         for (p = pos[i]; p < pos[i + 1]; p += 1)
///             out[i] = out[i] + vals[p];
///     return 0;
/// }
/// ```
fn build_rowsum() -> Function {
    let mut f = Function::new("rowsum");
    let n = f.exprs.var("N", ScalarType::Int);
    let pos = f.exprs.ptr("pos", ScalarType::Int);
    let crd = f.exprs.ptr("crd", ScalarType::Int);
    let vals = f.exprs.ptr("vals", ScalarType::Double);
    let out = f.exprs.ptr("out", ScalarType::Double);
    f.inputs.extend([n, pos, crd, vals]);
    f.outputs.push(out);

    let tensor = f.exprs.ptr("A", ScalarType::Double);
    let schema = dense(sparse(values()));
    let mut storage = schema.bind(
        tensor,
        &[Dimension::Dynamic(Some("N".into())), Dimension::Fixed(4)],
    );
    let (root_id, inner_id) = {
        let mut ids = storage.modes().map(|(id, _)| id);
        let root = ids.next().unwrap();
        let inner = ids.next().unwrap();
        (root, inner)
    };
    storage.mode_mut(root_id).add_var(&f.exprs, SIZE_VAR, n);
    storage.mode_mut(inner_id).add_var(&f.exprs, POS_VAR, pos);
    storage.mode_mut(inner_id).add_var(&f.exprs, CRD_VAR, crd);

    let i = f.exprs.var("i", ScalarType::Int);
    let p = f.exprs.var("p", ScalarType::Int);

    let root = storage.mode(root_id);
    let outer = root
        .mode_type()
        .format()
        .coord_iter(&mut f.exprs, &[i], root)
        .expect("dense root iterates by coordinate");

    let inner_mode = storage.mode(inner_id);
    let inner = inner_mode
        .mode_type()
        .format()
        .pos_iter(&mut f.exprs, i, inner_mode)
        .expect("compressed level iterates by position");

    let one = f.exprs.int(1);
    let cur = f.exprs.load(out, i);
    let val = f.exprs.load(vals, p);
    let sum = f.exprs.add(cur, val);
    let body = Stmt::Store {
        base: out,
        index: i,
        value: sum,
    };
    let inner_loop = Stmt::serial_for(p, inner.begin, inner.end, one, body);
    f.body = Stmt::Block(vec![Stmt::serial_for(
        i,
        outer.begin,
        outer.end,
        one,
        inner_loop,
    )]);
    f.validate().expect("rowsum kernel must validate");
    f
}

#[test]
fn csr_rowsum_built_from_mode_fragments_runs() {
    let f = build_rowsum();
    let text = fresh_codegen().compile(&f);
    assert!(text.contains("pos[_i_"));

    let mut module = Module::new(text);
    module.compile().unwrap();
    let rowsum: unsafe extern "C" fn(i32, *const i32, *const i32, *const f64, *mut f64) -> i32 =
        unsafe { std::mem::transmute(module.get_func("rowsum").unwrap()) };

    // 2x4 CSR matrix: row 0 holds {1.5, 2.5}, row 1 holds {4.0}.
    let pos = [0i32, 2, 3];
    let crd = [0i32, 3, 1];
    let vals = [1.5f64, 2.5, 4.0];
    let mut out = [0.0f64; 2];
    let rc = unsafe {
        rowsum(
            2,
            pos.as_ptr(),
            crd.as_ptr(),
            vals.as_ptr(),
            out.as_mut_ptr(),
        )
    };
    assert_eq!(rc, 0);
    assert_eq!(out, [4.0, 4.0]);
}
