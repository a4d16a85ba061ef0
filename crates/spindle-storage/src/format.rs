//! Mode-format trait and registry.
//!
//! A mode format describes how one tensor dimension is physically encoded and
//! answers queries that produce IR fragments for a single mode during
//! lowering. Formats are capability records: the boolean bits in [`ModeCaps`]
//! are the contract, the trait methods are the implementation, and callers
//! must gate every query on the matching bit. `None` from a query whose bit is
//! set is a contract violation on the format's side.

use std::fmt;
use std::sync::Arc;

use spindle_ir::{Arena, Expr, Handle, Stmt};

use crate::compressed::CompressedFormat;
use crate::dense::DenseFormat;
use crate::mode::Mode;
use crate::replicated::ReplicatedFormat;
use crate::singleton::SingletonFormat;
use crate::values::ValuesFormat;

/// Capability bits of a mode format.
///
/// The five property bits are design contracts, not hints: `full` lets
/// callers skip presence checks, `ordered` legalizes binary search, `unique`
/// removes dedup steps, `branchless` lets inner iteration fuse into the
/// parent's, and `compact` guarantees `pos_end[k] == pos_begin[k + 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModeCaps {
    pub full: bool,
    pub ordered: bool,
    pub unique: bool,
    pub branchless: bool,
    pub compact: bool,
    /// Supports iteration by coordinate (`coord_iter` / `coord_access`).
    pub coord_val_iter: bool,
    /// Supports iteration by position range (`pos_iter` / `pos_access`).
    pub coord_pos_iter: bool,
    /// Supports random access (`locate`).
    pub locate: bool,
    /// Supports the insert protocol.
    pub insert: bool,
    /// Supports the append protocol.
    pub append: bool,
}

/// Setup code plus the half-open bounds of a mode's iteration loop.
#[derive(Clone, Debug)]
pub struct IterBounds {
    pub setup: Stmt,
    pub begin: Handle<Expr>,
    pub end: Handle<Expr>,
}

/// Setup code plus the two results of an access query: the resolved position
/// (or coordinate, for `pos_access`) and a found flag.
#[derive(Clone, Debug)]
pub struct Resolved {
    pub setup: Stmt,
    pub result: Handle<Expr>,
    pub found: Handle<Expr>,
}

/// A pluggable encoding for one tensor dimension.
///
/// Every query takes the [`Mode`] instance, so implementations may read the
/// mode's variable map, and the enclosing function's expression arena, so
/// fragments can allocate nodes. Default implementations return `None`
/// ("not supported"); a format overrides exactly the queries its capability
/// bits advertise.
#[allow(unused_variables)]
pub trait ModeFormat: fmt::Debug + Send + Sync {
    /// Format name, unique within a registry (e.g. "compressed").
    fn name(&self) -> &str;

    /// The capability bits of this format.
    fn caps(&self) -> ModeCaps;

    /// The `i`-th physical array backing the mode, if defined.
    fn array(&self, i: usize, mode: &Mode) -> Option<Handle<Expr>> {
        None
    }

    /// Iterate the mode by coordinate. Valid when `coord_val_iter`.
    fn coord_iter(
        &self,
        exprs: &mut Arena<Expr>,
        coords: &[Handle<Expr>],
        mode: &Mode,
    ) -> Option<IterBounds> {
        None
    }

    /// Resolve a coordinate to a position. Pairs with `coord_iter`.
    fn coord_access(
        &self,
        exprs: &mut Arena<Expr>,
        p_prev: Handle<Expr>,
        coords: &[Handle<Expr>],
        mode: &Mode,
    ) -> Option<Resolved> {
        None
    }

    /// Iterate the mode by position range. Valid when `coord_pos_iter`.
    fn pos_iter(
        &self,
        exprs: &mut Arena<Expr>,
        p_prev: Handle<Expr>,
        mode: &Mode,
    ) -> Option<IterBounds> {
        None
    }

    /// Resolve a position back to its coordinate. Pairs with `pos_iter`.
    fn pos_access(
        &self,
        exprs: &mut Arena<Expr>,
        p: Handle<Expr>,
        coords: &[Handle<Expr>],
        mode: &Mode,
    ) -> Option<Resolved> {
        None
    }

    /// Random access from (parent position, coordinate) to a child position.
    /// Valid when `locate`.
    fn locate(
        &self,
        exprs: &mut Arena<Expr>,
        p_prev: Handle<Expr>,
        coords: &[Handle<Expr>],
        mode: &Mode,
    ) -> Option<Resolved> {
        None
    }

    /// Record a coordinate at a position. Insert protocol.
    fn insert_coord(
        &self,
        exprs: &mut Arena<Expr>,
        p: Handle<Expr>,
        coords: &[Handle<Expr>],
        mode: &Mode,
    ) -> Option<Stmt> {
        None
    }

    /// The mode's extent as an expression. Insert protocol.
    fn size(&self, exprs: &mut Arena<Expr>, mode: &Mode) -> Option<Handle<Expr>> {
        None
    }

    /// Initialize coordinate storage for positions `[p_begin, p_end)`.
    fn insert_init_coords(
        &self,
        exprs: &mut Arena<Expr>,
        p_begin: Handle<Expr>,
        p_end: Handle<Expr>,
        mode: &Mode,
    ) -> Option<Stmt> {
        None
    }

    /// Level initialization before inserts.
    fn insert_init_level(
        &self,
        exprs: &mut Arena<Expr>,
        sz_prev: Handle<Expr>,
        sz: Handle<Expr>,
        mode: &Mode,
    ) -> Option<Stmt> {
        None
    }

    /// Level finalization after inserts.
    fn insert_finalize_level(
        &self,
        exprs: &mut Arena<Expr>,
        sz_prev: Handle<Expr>,
        sz: Handle<Expr>,
        mode: &Mode,
    ) -> Option<Stmt> {
        None
    }

    /// Append a coordinate at a position. Append protocol.
    fn append_coord(
        &self,
        exprs: &mut Arena<Expr>,
        p: Handle<Expr>,
        coord: Handle<Expr>,
        mode: &Mode,
    ) -> Option<Stmt> {
        None
    }

    /// Record the child position range `[p_begin, p_end)` of parent `p_prev`.
    fn append_edges(
        &self,
        exprs: &mut Arena<Expr>,
        p_prev: Handle<Expr>,
        p_begin: Handle<Expr>,
        p_end: Handle<Expr>,
        mode: &Mode,
    ) -> Option<Stmt> {
        None
    }

    /// Initialize edge storage for parents `[p_prev_begin, p_prev_end)`.
    fn append_init_edges(
        &self,
        exprs: &mut Arena<Expr>,
        p_prev_begin: Handle<Expr>,
        p_prev_end: Handle<Expr>,
        mode: &Mode,
    ) -> Option<Stmt> {
        None
    }

    /// Level initialization before appends.
    fn append_init_level(
        &self,
        exprs: &mut Arena<Expr>,
        sz_prev: Handle<Expr>,
        sz: Handle<Expr>,
        mode: &Mode,
    ) -> Option<Stmt> {
        None
    }

    /// Level finalization after appends.
    fn append_finalize_level(
        &self,
        exprs: &mut Arena<Expr>,
        sz_prev: Handle<Expr>,
        sz: Handle<Expr>,
        mode: &Mode,
    ) -> Option<Stmt> {
        None
    }
}

/// A cheap value handle to an immutable mode format.
///
/// Compared by format name; cloning shares the underlying record.
#[derive(Clone)]
pub struct ModeType(Arc<dyn ModeFormat>);

impl ModeType {
    /// Wraps a format implementation.
    pub fn new(format: impl ModeFormat + 'static) -> Self {
        Self(Arc::new(format))
    }

    /// The format's name.
    pub fn name(&self) -> &str {
        self.0.name()
    }

    /// The format's capability bits.
    pub fn caps(&self) -> ModeCaps {
        self.0.caps()
    }

    /// The underlying format record.
    pub fn format(&self) -> &dyn ModeFormat {
        &*self.0
    }

    /// Built-in dense format.
    pub fn dense() -> Self {
        Self::new(DenseFormat)
    }

    /// Built-in compressed (sparse) format.
    pub fn compressed() -> Self {
        Self::new(CompressedFormat)
    }

    /// Built-in singleton (fixed) format.
    pub fn singleton() -> Self {
        Self::new(SingletonFormat)
    }

    /// Built-in replicated format.
    pub fn replicated() -> Self {
        Self::new(ReplicatedFormat)
    }

    /// Built-in terminal values format.
    pub fn values() -> Self {
        Self::new(ValuesFormat)
    }
}

impl PartialEq for ModeType {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for ModeType {}

impl fmt::Debug for ModeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModeType({})", self.name())
    }
}

impl fmt::Display for ModeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Registry of available mode formats, keyed by name.
pub struct FormatRegistry {
    formats: Vec<ModeType>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            formats: Vec::new(),
        }
    }

    /// Creates a registry pre-populated with the built-in formats.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.register(ModeType::dense());
        reg.register(ModeType::compressed());
        reg.register(ModeType::singleton());
        reg.register(ModeType::replicated());
        reg.register(ModeType::values());
        reg
    }

    /// Registers a format. Panics on a duplicate name.
    pub fn register(&mut self, mode_type: ModeType) {
        assert!(
            self.find(mode_type.name()).is_none(),
            "mode format '{}' registered twice",
            mode_type.name()
        );
        self.formats.push(mode_type);
    }

    /// Finds a format by name.
    pub fn find(&self, name: &str) -> Option<ModeType> {
        self.formats.iter().find(|f| f.name() == name).cloned()
    }

    /// Lists all registered format names.
    pub fn list_names(&self) -> Vec<&str> {
        self.formats.iter().map(|f| f.name()).collect()
    }
}
