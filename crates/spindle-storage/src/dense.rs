//! Dense mode format: every coordinate in the extent is materialized.

use spindle_ir::{Arena, Expr, Handle, Stmt};

use crate::format::{IterBounds, ModeCaps, ModeFormat, Resolved};
use crate::mode::{Dimension, Mode};

/// Variable-map key for the extent of a dynamically sized dense mode.
pub const SIZE_VAR: &str = "size";

/// Dense levels store no coordinates; a position is computed directly from
/// the parent position and the coordinate, so iteration is by coordinate and
/// random access always succeeds.
#[derive(Debug)]
pub struct DenseFormat;

impl DenseFormat {
    fn extent(&self, exprs: &mut Arena<Expr>, mode: &Mode) -> Handle<Expr> {
        match *mode.dim() {
            Dimension::Fixed(n) => exprs.int(n as i64),
            Dimension::Dynamic(_) => mode.var(SIZE_VAR),
        }
    }
}

impl ModeFormat for DenseFormat {
    fn name(&self) -> &str {
        "dense"
    }

    fn caps(&self) -> ModeCaps {
        ModeCaps {
            full: true,
            ordered: true,
            unique: true,
            branchless: false,
            compact: true,
            coord_val_iter: true,
            coord_pos_iter: false,
            locate: true,
            insert: true,
            append: false,
        }
    }

    fn array(&self, i: usize, mode: &Mode) -> Option<Handle<Expr>> {
        (i == 0 && mode.has_var(SIZE_VAR)).then(|| mode.var(SIZE_VAR))
    }

    fn coord_iter(
        &self,
        exprs: &mut Arena<Expr>,
        _coords: &[Handle<Expr>],
        mode: &Mode,
    ) -> Option<IterBounds> {
        let begin = exprs.int(0);
        let end = self.extent(exprs, mode);
        Some(IterBounds {
            setup: Stmt::empty(),
            begin,
            end,
        })
    }

    fn coord_access(
        &self,
        exprs: &mut Arena<Expr>,
        p_prev: Handle<Expr>,
        coords: &[Handle<Expr>],
        mode: &Mode,
    ) -> Option<Resolved> {
        self.locate(exprs, p_prev, coords, mode)
    }

    fn locate(
        &self,
        exprs: &mut Arena<Expr>,
        p_prev: Handle<Expr>,
        coords: &[Handle<Expr>],
        mode: &Mode,
    ) -> Option<Resolved> {
        let coord = *coords.last()?;
        let extent = self.extent(exprs, mode);
        let scaled = exprs.mul(p_prev, extent);
        let pos = exprs.add(scaled, coord);
        let found = exprs.int(1);
        Some(Resolved {
            setup: Stmt::empty(),
            result: pos,
            found,
        })
    }

    fn insert_coord(
        &self,
        _exprs: &mut Arena<Expr>,
        _p: Handle<Expr>,
        _coords: &[Handle<Expr>],
        _mode: &Mode,
    ) -> Option<Stmt> {
        // Coordinates are implicit; the value lands at the computed position.
        Some(Stmt::empty())
    }

    fn size(&self, exprs: &mut Arena<Expr>, mode: &Mode) -> Option<Handle<Expr>> {
        Some(self.extent(exprs, mode))
    }

    fn insert_init_coords(
        &self,
        _exprs: &mut Arena<Expr>,
        _p_begin: Handle<Expr>,
        _p_end: Handle<Expr>,
        _mode: &Mode,
    ) -> Option<Stmt> {
        Some(Stmt::empty())
    }

    fn insert_init_level(
        &self,
        _exprs: &mut Arena<Expr>,
        _sz_prev: Handle<Expr>,
        _sz: Handle<Expr>,
        _mode: &Mode,
    ) -> Option<Stmt> {
        Some(Stmt::empty())
    }

    fn insert_finalize_level(
        &self,
        _exprs: &mut Arena<Expr>,
        _sz_prev: Handle<Expr>,
        _sz: Handle<Expr>,
        _mode: &Mode,
    ) -> Option<Stmt> {
        Some(Stmt::empty())
    }
}
