//! Singleton (fixed) mode format: exactly one coordinate per parent.

use spindle_ir::{Arena, Expr, Handle, Stmt};

use crate::format::{IterBounds, ModeCaps, ModeFormat, Resolved};
use crate::mode::Mode;

/// Variable-map key for the coordinate array.
pub const CRD_VAR: &str = "crd";

/// Singleton levels store one coordinate per parent position, so child
/// positions coincide with parent positions and the level is branchless:
/// iteration degenerates to the single range `[p_prev, p_prev + 1)`.
#[derive(Debug)]
pub struct SingletonFormat;

impl ModeFormat for SingletonFormat {
    fn name(&self) -> &str {
        "singleton"
    }

    fn caps(&self) -> ModeCaps {
        ModeCaps {
            full: false,
            ordered: true,
            unique: true,
            branchless: true,
            compact: true,
            coord_val_iter: false,
            coord_pos_iter: true,
            locate: false,
            insert: false,
            append: true,
        }
    }

    fn array(&self, i: usize, mode: &Mode) -> Option<Handle<Expr>> {
        (i == 0).then(|| mode.var(CRD_VAR))
    }

    fn pos_iter(
        &self,
        exprs: &mut Arena<Expr>,
        p_prev: Handle<Expr>,
        _mode: &Mode,
    ) -> Option<IterBounds> {
        let one = exprs.int(1);
        let end = exprs.add(p_prev, one);
        Some(IterBounds {
            setup: Stmt::empty(),
            begin: p_prev,
            end,
        })
    }

    fn pos_access(
        &self,
        exprs: &mut Arena<Expr>,
        p: Handle<Expr>,
        _coords: &[Handle<Expr>],
        mode: &Mode,
    ) -> Option<Resolved> {
        let coord = exprs.load(mode.var(CRD_VAR), p);
        let found = exprs.int(1);
        Some(Resolved {
            setup: Stmt::empty(),
            result: coord,
            found,
        })
    }

    fn append_coord(
        &self,
        _exprs: &mut Arena<Expr>,
        p: Handle<Expr>,
        coord: Handle<Expr>,
        mode: &Mode,
    ) -> Option<Stmt> {
        Some(Stmt::Store {
            base: mode.var(CRD_VAR),
            index: p,
            value: coord,
        })
    }

    fn append_edges(
        &self,
        _exprs: &mut Arena<Expr>,
        _p_prev: Handle<Expr>,
        _p_begin: Handle<Expr>,
        _p_end: Handle<Expr>,
        _mode: &Mode,
    ) -> Option<Stmt> {
        // Child positions equal parent positions; no edge array exists.
        Some(Stmt::empty())
    }

    fn append_init_edges(
        &self,
        _exprs: &mut Arena<Expr>,
        _p_prev_begin: Handle<Expr>,
        _p_prev_end: Handle<Expr>,
        _mode: &Mode,
    ) -> Option<Stmt> {
        Some(Stmt::empty())
    }

    fn append_init_level(
        &self,
        _exprs: &mut Arena<Expr>,
        _sz_prev: Handle<Expr>,
        _sz: Handle<Expr>,
        _mode: &Mode,
    ) -> Option<Stmt> {
        Some(Stmt::empty())
    }

    fn append_finalize_level(
        &self,
        _exprs: &mut Arena<Expr>,
        _sz_prev: Handle<Expr>,
        _sz: Handle<Expr>,
        _mode: &Mode,
    ) -> Option<Stmt> {
        Some(Stmt::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::ModeType;
    use crate::mode::{Dimension, ModeId, TensorStorage};
    use spindle_ir::{BinOp, ScalarType};

    fn singleton_mode() -> (Arena<Expr>, TensorStorage) {
        let mut exprs: Arena<Expr> = Arena::new();
        let tensor = exprs.ptr("A", ScalarType::Double);
        let mut storage = TensorStorage::new(tensor);
        storage.push_mode(Dimension::Fixed(8), ModeType::compressed());
        let id = storage.push_mode(Dimension::Fixed(8), ModeType::singleton());
        let crd = exprs.ptr("A2_crd", ScalarType::Int);
        storage.mode_mut(id).add_var(&exprs, CRD_VAR, crd);
        (exprs, storage)
    }

    #[test]
    fn pos_iter_is_single_entry_range() {
        let (mut exprs, storage) = singleton_mode();
        let mode = storage.mode(ModeId(1));
        let p_prev = exprs.var("p", ScalarType::Int);
        let bounds = SingletonFormat.pos_iter(&mut exprs, p_prev, mode).unwrap();
        assert_eq!(bounds.begin, p_prev);
        assert!(matches!(
            exprs[bounds.end],
            Expr::Binary { op: BinOp::Add, .. }
        ));
    }

    #[test]
    fn branchless_and_compact() {
        let caps = SingletonFormat.caps();
        assert!(caps.branchless);
        assert!(caps.compact);
        assert!(!caps.full);
    }

    #[test]
    fn append_edges_is_noop() {
        let (mut exprs, storage) = singleton_mode();
        let mode = storage.mode(ModeId(1));
        let p = exprs.var("p", ScalarType::Int);
        let stmt = SingletonFormat
            .append_edges(&mut exprs, p, p, p, mode)
            .unwrap();
        assert!(stmt.is_empty());
    }
}
