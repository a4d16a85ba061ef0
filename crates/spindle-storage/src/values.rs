//! Values mode format: the terminal level holding numeric data.

use spindle_ir::{Expr, Handle};

use crate::format::{ModeCaps, ModeFormat};
use crate::mode::Mode;

/// Variable-map key for the value array.
pub const VALS_VAR: &str = "vals";

/// The terminal level of every storage tree. It has no iteration or
/// construction capabilities of its own; the lowering pass reads and writes
/// the value array at positions produced by the level above.
#[derive(Debug)]
pub struct ValuesFormat;

impl ModeFormat for ValuesFormat {
    fn name(&self) -> &str {
        "values"
    }

    fn caps(&self) -> ModeCaps {
        ModeCaps::default()
    }

    fn array(&self, i: usize, mode: &Mode) -> Option<Handle<Expr>> {
        (i == 0).then(|| mode.var(VALS_VAR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_capabilities() {
        let caps = ValuesFormat.caps();
        assert!(!caps.coord_val_iter);
        assert!(!caps.coord_pos_iter);
        assert!(!caps.locate);
        assert!(!caps.insert);
        assert!(!caps.append);
    }
}
