//! Tensor storage schemas and the mode-format algebra.
//!
//! A tensor's storage is described per dimension by a mode format (dense,
//! compressed, singleton, replicated) and composed into a tree schema
//! (`dense(sparse(values()))`). Formats are capability records that answer
//! per-mode queries with IR fragments; the lowering pass walks the bound
//! modes root to leaves and stitches the fragments into loop nests.

pub mod compressed;
pub mod dense;
pub mod format;
pub mod mode;
pub mod replicated;
pub mod singleton;
pub mod tree;
pub mod values;

pub use compressed::CompressedFormat;
pub use dense::DenseFormat;
pub use format::{FormatRegistry, IterBounds, ModeCaps, ModeFormat, ModeType, Resolved};
pub use mode::{Dimension, Mode, ModeId, ModePack, PackId, TensorStorage};
pub use replicated::ReplicatedFormat;
pub use singleton::SingletonFormat;
pub use tree::{dense, fixed, replicated, sparse, values, SchemaParseError, TreeLevel};
pub use values::ValuesFormat;
