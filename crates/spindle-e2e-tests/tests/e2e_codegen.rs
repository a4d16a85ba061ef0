//! Emission scenarios: dense copy text, vectorize pragma placement, and
//! identity-based renaming.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use common::{copy_kernel, fresh_codegen, line_of};
use spindle_backend_c::{CodeGen, NameGenerator};
use spindle_ir::{Function, LoopKind, ScalarType, Stmt};

#[test]
fn dense_copy_emits_canonical_loop() {
    let text = fresh_codegen().compile(&copy_kernel(LoopKind::Serial, 0));
    assert!(text.contains("int copy(double* A, double* B) {"));
    assert!(text.contains("for (_i_0 = 0; _i_0 < 4; _i_0 += 1) {"));
    assert!(text.contains("B[_i_0] = A[_i_0];"));
    assert!(text.trim_end().ends_with('}'));
    assert!(text.contains("  return 0;"));
}

#[test]
fn vectorize_pragma_immediately_precedes_header() {
    let text = fresh_codegen().compile(&copy_kernel(LoopKind::Vectorized, 8));
    let pragma = line_of(
        &text,
        "#pragma clang loop interleave(enable) vectorize_width(8)",
    );
    let header = line_of(&text, "for (");
    assert_eq!(header, pragma + 1);
}

#[test]
fn two_internal_vars_named_t_get_distinct_identifiers() {
    let mut f = Function::new("twins");
    let t0 = f.exprs.var("t", ScalarType::Int);
    let t1 = f.exprs.var("t", ScalarType::Int);
    let zero = f.exprs.int(0);
    let sum = f.exprs.add(t0, t1);
    f.body = Stmt::Block(vec![
        Stmt::Assign {
            var: t0,
            value: zero,
        },
        Stmt::Assign {
            var: t1,
            value: zero,
        },
        Stmt::Assign { var: t0, value: sum },
    ]);
    let text = fresh_codegen().compile(&f);

    // Both declared, each matching _t_<n>, and each use site resolves to its
    // own declarer.
    assert!(text.contains("int _t_0;"));
    assert!(text.contains("int _t_1;"));
    assert!(text.contains("_t_0 = 0;"));
    assert!(text.contains("_t_1 = 0;"));
    assert!(text.contains("_t_0 = (_t_0 + _t_1);"));
}

#[test]
fn same_identity_prints_to_same_name_within_a_function() {
    let text = fresh_codegen().compile(&copy_kernel(LoopKind::Serial, 0));
    // The loop variable appears in the header three times and in both
    // subscripts, always under one name.
    assert_eq!(text.matches("_i_0").count(), 6);
    assert!(!text.contains("_i_1"));
}

proptest! {
    /// Rename uniqueness: parameters keep their names, and all emitted
    /// variable names are pairwise distinct regardless of source-name
    /// collisions.
    #[test]
    fn emitted_names_are_pairwise_distinct(names in prop::collection::vec("[a-z]{1,3}", 1..12)) {
        let mut f = Function::new("kernel");
        let a = f.exprs.ptr("A", ScalarType::Double);
        f.inputs.push(a);
        let zero = f.exprs.int(0);
        let mut stmts = Vec::new();
        let mut vars = Vec::new();
        for name in &names {
            let v = f.exprs.var(name.as_str(), ScalarType::Int);
            vars.push(v);
            stmts.push(Stmt::Assign { var: v, value: zero });
        }
        f.body = Stmt::Block(stmts);

        let gen = Arc::new(NameGenerator::new());
        let text = CodeGen::with_names(gen).compile(&f);

        let mut emitted = HashSet::new();
        prop_assert!(emitted.insert("A".to_owned()));
        for (idx, name) in names.iter().enumerate() {
            let expected = format!("_{name}_{idx}");
            prop_assert!(
                text.contains(&format!("int {};", expected)),
                "missing declaration for {}",
                expected
            );
            prop_assert!(emitted.insert(expected), "name emitted twice");
        }
        prop_assert!(text.contains("double* A"));
    }
}
