//! Replicated mode format: one coordinate list shared by every parent.

use spindle_ir::{Arena, Expr, Handle, Stmt};

use crate::format::{IterBounds, ModeCaps, ModeFormat, Resolved};
use crate::mode::Mode;

/// Variable-map key for the shared coordinate array.
pub const CRD_VAR: &str = "crd";
/// Variable-map key for the number of shared coordinates.
pub const NUM_VAR: &str = "num";

/// Replicated levels store the coordinate list once and replicate it under
/// every parent, so every parent iterates the same range `[0, num)`. Because
/// parents overlap in storage, positions of consecutive parents are not
/// contiguous and the format is not compact.
#[derive(Debug)]
pub struct ReplicatedFormat;

impl ModeFormat for ReplicatedFormat {
    fn name(&self) -> &str {
        "replicated"
    }

    fn caps(&self) -> ModeCaps {
        ModeCaps {
            full: false,
            ordered: true,
            unique: true,
            branchless: false,
            compact: false,
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
        _p_prev: Handle<Expr>,
        mode: &Mode,
    ) -> Option<IterBounds> {
        let begin = exprs.int(0);
        Some(IterBounds {
            setup: Stmt::empty(),
            begin,
            end: mode.var(NUM_VAR),
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
        // The coordinate list is shared; there is no per-parent edge array.
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
        exprs: &mut Arena<Expr>,
        _sz_prev: Handle<Expr>,
        _sz: Handle<Expr>,
        mode: &Mode,
    ) -> Option<Stmt> {
        let zero = exprs.int(0);
        Some(Stmt::Assign {
            var: mode.var(NUM_VAR),
            value: zero,
        })
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
