//! Compressed (sparse) mode format: explicit position and coordinate arrays.

use spindle_ir::{Arena, BinOp, Expr, Handle, ScalarType, Stmt};

use crate::format::{IterBounds, ModeCaps, ModeFormat, Resolved};
use crate::mode::Mode;

/// Variable-map key for the position-bounds array.
pub const POS_VAR: &str = "pos";
/// Variable-map key for the coordinate array.
pub const CRD_VAR: &str = "crd";

/// Compressed levels store the nonzero coordinates of each parent in a
/// `crd` array; `pos[k]..pos[k + 1]` bounds the children of parent `k`.
/// Append builds the level in two phases: per-parent child counts in `pos`,
/// then a prefix sum at finalize.
#[derive(Debug)]
pub struct CompressedFormat;

impl ModeFormat for CompressedFormat {
    fn name(&self) -> &str {
        "compressed"
    }

    fn caps(&self) -> ModeCaps {
        ModeCaps {
            full: false,
            ordered: true,
            unique: true,
            branchless: false,
            compact: true,
            coord_val_iter: false,
            coord_pos_iter: true,
            locate: false,
            insert: false,
            append: true,
        }
    }

    fn array(&self, i: usize, mode: &Mode) -> Option<Handle<Expr>> {
        match i {
            0 => Some(mode.var(POS_VAR)),
            1 => Some(mode.var(CRD_VAR)),
            _ => None,
        }
    }

    fn pos_iter(
        &self,
        exprs: &mut Arena<Expr>,
        p_prev: Handle<Expr>,
        mode: &Mode,
    ) -> Option<IterBounds> {
        let pos = mode.var(POS_VAR);
        let begin = exprs.load(pos, p_prev);
        let one = exprs.int(1);
        let next = exprs.add(p_prev, one);
        let end = exprs.load(pos, next);
        Some(IterBounds {
            setup: Stmt::empty(),
            begin,
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
        let crd = mode.var(CRD_VAR);
        let coord = exprs.load(crd, p);
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
        exprs: &mut Arena<Expr>,
        p_prev: Handle<Expr>,
        p_begin: Handle<Expr>,
        p_end: Handle<Expr>,
        mode: &Mode,
    ) -> Option<Stmt> {
        // pos[p_prev + 1] = child count; finalize turns counts into bounds.
        let one = exprs.int(1);
        let slot = exprs.add(p_prev, one);
        let count = exprs.sub(p_end, p_begin);
        Some(Stmt::Store {
            base: mode.var(POS_VAR),
            index: slot,
            value: count,
        })
    }

    fn append_init_edges(
        &self,
        exprs: &mut Arena<Expr>,
        p_prev_begin: Handle<Expr>,
        p_prev_end: Handle<Expr>,
        mode: &Mode,
    ) -> Option<Stmt> {
        let pos = mode.var(POS_VAR);
        let p = exprs.var("p", ScalarType::Int);
        let one = exprs.int(1);
        let slot = exprs.add(p, one);
        let zero = exprs.int(0);
        let step = exprs.int(1);
        Some(Stmt::serial_for(
            p,
            p_prev_begin,
            p_prev_end,
            step,
            Stmt::Store {
                base: pos,
                index: slot,
                value: zero,
            },
        ))
    }

    fn append_init_level(
        &self,
        exprs: &mut Arena<Expr>,
        _sz_prev: Handle<Expr>,
        _sz: Handle<Expr>,
        mode: &Mode,
    ) -> Option<Stmt> {
        let zero = exprs.int(0);
        let zero_val = exprs.int(0);
        Some(Stmt::Store {
            base: mode.var(POS_VAR),
            index: zero,
            value: zero_val,
        })
    }

    fn append_finalize_level(
        &self,
        exprs: &mut Arena<Expr>,
        sz_prev: Handle<Expr>,
        _sz: Handle<Expr>,
        mode: &Mode,
    ) -> Option<Stmt> {
        // In-place prefix sum: pos[p] += pos[p - 1] for p in 1..=sz_prev.
        let pos = mode.var(POS_VAR);
        let p = exprs.var("p", ScalarType::Int);
        let start = exprs.int(1);
        let one = exprs.int(1);
        let end = exprs.add(sz_prev, one);
        let step = exprs.int(1);
        let cur = exprs.load(pos, p);
        let prev_slot = exprs.sub(p, one);
        let prev = exprs.load(pos, prev_slot);
        let sum = exprs.binary(BinOp::Add, cur, prev);
        Some(Stmt::serial_for(
            p,
            start,
            end,
            step,
            Stmt::Store {
                base: pos,
                index: p,
                value: sum,
            },
        ))
    }
}
