//! Modes, mode packs, and bound tensor storage.
//!
//! A [`Mode`] is one dimension of one tensor at one level of its storage
//! tree. Modes and packs are owned by a [`TensorStorage`] arena and refer to
//! each other by index, so the pack back-reference carries no ownership.

use std::collections::BTreeMap;

use spindle_ir::{Arena, Expr, Handle};

use crate::format::ModeType;

/// The abstract extent of one tensor dimension.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum Dimension {
    /// Extent known at schema time.
    Fixed(u64),
    /// Extent known only at run time, optionally named.
    Dynamic(Option<String>),
}

/// A unique identifier for a mode within its [`TensorStorage`].
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ModeId(pub u32);

/// A unique identifier for a pack within its [`TensorStorage`].
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct PackId(pub u32);

/// One dimension of one tensor at one level of the storage tree.
///
/// The variable map is open-vocabulary: keys are data attached by the
/// lowering pass (position bounds, coordinate arrays), not a closed set.
/// Built-in formats publish the keys they read as constants.
#[derive(Clone, Debug)]
pub struct Mode {
    tensor: Handle<Expr>,
    dim: Dimension,
    level: usize,
    mode_type: ModeType,
    parent_type: Option<ModeType>,
    pack: PackId,
    pack_loc: usize,
    vars: BTreeMap<String, Handle<Expr>>,
}

impl Mode {
    /// The variable of the tensor this mode belongs to.
    pub fn tensor(&self) -> Handle<Expr> {
        self.tensor
    }

    /// The mode's abstract extent.
    pub fn dim(&self) -> &Dimension {
        &self.dim
    }

    /// Depth in the storage tree; the root mode is level 0.
    pub fn level(&self) -> usize {
        self.level
    }

    /// The mode's format.
    pub fn mode_type(&self) -> &ModeType {
        &self.mode_type
    }

    /// The parent level's format, `None` at the root.
    pub fn parent_type(&self) -> Option<&ModeType> {
        self.parent_type.as_ref()
    }

    /// The pack this mode lives in.
    pub fn pack(&self) -> PackId {
        self.pack
    }

    /// This mode's position within its pack.
    pub fn pack_loc(&self) -> usize {
        self.pack_loc
    }

    /// Returns `true` if a lowering variable is attached under `key`.
    pub fn has_var(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Looks up a lowering variable. Panics if `key` is absent.
    pub fn var(&self, key: &str) -> Handle<Expr> {
        *self
            .vars
            .get(key)
            .unwrap_or_else(|| panic!("mode at level {} has no variable '{key}'", self.level))
    }

    /// Attaches a lowering variable. Panics if the handle is not a `Var`.
    pub fn add_var(&mut self, exprs: &Arena<Expr>, key: impl Into<String>, var: Handle<Expr>) {
        let key = key.into();
        assert!(
            exprs.try_get(var).is_some_and(Expr::is_var),
            "non-variable {var:?} assigned to mode variable '{key}'"
        );
        self.vars.insert(key, var);
    }
}

/// An ordered group of modes at one level that share physical arrays.
#[derive(Clone, Debug)]
pub struct ModePack {
    members: Vec<ModeId>,
}

impl ModePack {
    /// The modes in this pack, in order.
    pub fn members(&self) -> &[ModeId] {
        &self.members
    }

    /// The number of member modes.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the pack has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// The result of binding a storage schema to one tensor: a chain of modes at
/// consecutive levels, grouped into packs.
#[derive(Clone, Debug)]
pub struct TensorStorage {
    tensor: Handle<Expr>,
    modes: Vec<Mode>,
    packs: Vec<ModePack>,
}

impl TensorStorage {
    /// Creates storage for `tensor` with no modes yet.
    pub fn new(tensor: Handle<Expr>) -> Self {
        Self {
            tensor,
            modes: Vec::new(),
            packs: Vec::new(),
        }
    }

    /// Appends a mode at the next level, in a fresh singleton pack.
    ///
    /// This is the default grouping; schema binding uses nothing else.
    pub fn push_mode(&mut self, dim: Dimension, mode_type: ModeType) -> ModeId {
        let pack_id = PackId(self.packs.len() as u32);
        self.packs.push(ModePack {
            members: Vec::new(),
        });
        self.push_mode_in_pack(dim, mode_type, pack_id)
    }

    /// Appends a mode at the next level, joining an existing pack.
    ///
    /// Advanced groupings use this to fuse co-iterated modes that share
    /// physical arrays into one pack.
    pub fn push_mode_in_pack(
        &mut self,
        dim: Dimension,
        mode_type: ModeType,
        pack: PackId,
    ) -> ModeId {
        let level = self.modes.len();
        let parent_type = self.modes.last().map(|m| m.mode_type.clone());
        let mode_id = ModeId(level as u32);
        let members = &mut self.packs[pack.0 as usize].members;
        let pack_loc = members.len();
        members.push(mode_id);
        self.modes.push(Mode {
            tensor: self.tensor,
            dim,
            level,
            mode_type,
            parent_type,
            pack,
            pack_loc,
            vars: BTreeMap::new(),
        });
        mode_id
    }

    /// The bound tensor's variable.
    pub fn tensor(&self) -> Handle<Expr> {
        self.tensor
    }

    /// The tensor's order (number of non-terminal modes).
    pub fn order(&self) -> usize {
        self.modes.len().saturating_sub(1)
    }

    /// All modes, root first.
    pub fn modes(&self) -> impl Iterator<Item = (ModeId, &Mode)> {
        self.modes
            .iter()
            .enumerate()
            .map(|(i, m)| (ModeId(i as u32), m))
    }

    /// All packs.
    pub fn packs(&self) -> impl Iterator<Item = (PackId, &ModePack)> {
        self.packs
            .iter()
            .enumerate()
            .map(|(i, p)| (PackId(i as u32), p))
    }

    /// The mode with the given id.
    pub fn mode(&self, id: ModeId) -> &Mode {
        &self.modes[id.0 as usize]
    }

    /// Mutable access to a mode, for lowering-time variable attachment.
    pub fn mode_mut(&mut self, id: ModeId) -> &mut Mode {
        &mut self.modes[id.0 as usize]
    }

    /// The pack with the given id.
    pub fn pack(&self, id: PackId) -> &ModePack {
        &self.packs[id.0 as usize]
    }

    /// The `i`-th physical array of a pack: the first member mode whose
    /// format defines array `i` wins.
    pub fn pack_array(&self, id: PackId, i: usize) -> Option<Handle<Expr>> {
        self.pack(id)
            .members
            .iter()
            .find_map(|&m| {
                let mode = self.mode(m);
                mode.mode_type().format().array(i, mode)
            })
    }
}
