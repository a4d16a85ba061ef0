//! C99 back end for Spindle kernels.
//!
//! [`CodeGen`] prints IR functions as standards-conforming C99. Variables are
//! renamed by node identity: inputs and outputs keep their source names
//! verbatim, every other variable gets a fresh `_<name>_<counter>` identifier
//! from a [`NameGenerator`]. The default generator is process-wide, so
//! identifiers stay unique when several functions are emitted into one
//! compilation unit; tests inject a fresh generator for determinism.

mod codegen;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use spindle_ir::Function;

/// An atomically incremented source of unique C identifiers.
#[derive(Debug, Default)]
pub struct NameGenerator {
    next: AtomicU64,
}

impl NameGenerator {
    /// Creates a generator starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `_<base>_<n>` for the next counter value `n`.
    ///
    /// The leading underscore keeps renamed identifiers from colliding with
    /// C keywords.
    pub fn unique(&self, base: &str) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("_{base}_{n}")
    }
}

fn global_names() -> Arc<NameGenerator> {
    static GLOBAL: OnceLock<Arc<NameGenerator>> = OnceLock::new();
    GLOBAL.get_or_init(|| Arc::new(NameGenerator::new())).clone()
}

/// Prints IR functions as C99 text.
pub struct CodeGen {
    names: Arc<NameGenerator>,
}

impl Default for CodeGen {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGen {
    /// Creates a code generator backed by the process-wide name counter.
    pub fn new() -> Self {
        Self {
            names: global_names(),
        }
    }

    /// Creates a code generator with an explicit name source.
    pub fn with_names(names: Arc<NameGenerator>) -> Self {
        Self { names }
    }

    /// Emits one function.
    ///
    /// Panics on parameter-list invariant violations (non-variable or
    /// duplicate inputs/outputs); these are programmer errors in the IR
    /// producer.
    pub fn compile(&self, func: &Function) -> String {
        let text = codegen::emit_function(func, &self.names);
        log::debug!("emitted {} bytes of C for '{}'", text.len(), func.name);
        text
    }

    /// Emits several functions into one compilation unit.
    pub fn compile_all<'a>(&self, funcs: impl IntoIterator<Item = &'a Function>) -> String {
        funcs
            .into_iter()
            .map(|f| self.compile(f))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
