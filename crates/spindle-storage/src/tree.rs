//! Tree-format schema DSL.
//!
//! A storage schema is a rooted chain of tree levels, e.g.
//! `dense(sparse(values()))` for CSR. The chain has length = tensor order + 1
//! and always terminates in `values()`. The compact textual form and the
//! parser round-trip exactly.

use std::fmt;
use std::str::FromStr;

use spindle_ir::{Expr, Handle};

use crate::format::ModeType;
use crate::mode::{Dimension, TensorStorage};

/// One level of a storage schema. Non-terminals uniquely own their sublevel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeLevel {
    /// Terminal level holding numeric data.
    Values,
    Dense(Box<TreeLevel>),
    Sparse(Box<TreeLevel>),
    Fixed(Box<TreeLevel>),
    Replicated(Box<TreeLevel>),
}

/// Terminal values level.
pub fn values() -> TreeLevel {
    TreeLevel::Values
}

/// Dense level over `sub`.
pub fn dense(sub: TreeLevel) -> TreeLevel {
    TreeLevel::Dense(Box::new(sub))
}

/// Sparse (compressed) level over `sub`.
pub fn sparse(sub: TreeLevel) -> TreeLevel {
    TreeLevel::Sparse(Box::new(sub))
}

/// Fixed (singleton) level over `sub`.
pub fn fixed(sub: TreeLevel) -> TreeLevel {
    TreeLevel::Fixed(Box::new(sub))
}

/// Replicated level over `sub`.
pub fn replicated(sub: TreeLevel) -> TreeLevel {
    TreeLevel::Replicated(Box::new(sub))
}

impl TreeLevel {
    /// The level's schema keyword.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Values => "values",
            Self::Dense(_) => "dense",
            Self::Sparse(_) => "sparse",
            Self::Fixed(_) => "fixed",
            Self::Replicated(_) => "replicated",
        }
    }

    /// The sublevel, `None` at the terminal.
    pub fn sublevel(&self) -> Option<&TreeLevel> {
        match self {
            Self::Values => None,
            Self::Dense(sub) | Self::Sparse(sub) | Self::Fixed(sub) | Self::Replicated(sub) => {
                Some(sub)
            }
        }
    }

    /// The tensor order this schema stores (chain length minus the terminal).
    pub fn order(&self) -> usize {
        let mut order = 0;
        let mut level = self;
        while let Some(sub) = level.sublevel() {
            order += 1;
            level = sub;
        }
        order
    }

    /// The mode format implementing this level.
    pub fn mode_type(&self) -> ModeType {
        match self {
            Self::Values => ModeType::values(),
            Self::Dense(_) => ModeType::dense(),
            Self::Sparse(_) => ModeType::compressed(),
            Self::Fixed(_) => ModeType::singleton(),
            Self::Replicated(_) => ModeType::replicated(),
        }
    }

    /// Indented one-level-per-line rendering.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        let mut level = Some(self);
        let mut depth = 0;
        while let Some(l) = level {
            for _ in 0..depth {
                out.push_str("  ");
            }
            out.push_str(l.keyword());
            out.push('\n');
            level = l.sublevel();
            depth += 1;
        }
        out
    }

    /// Binds this schema to a tensor variable with the given dimensions,
    /// producing one mode per level in singleton packs.
    ///
    /// Panics if `dims.len()` differs from the schema's order.
    pub fn bind(&self, tensor: Handle<Expr>, dims: &[Dimension]) -> TensorStorage {
        assert_eq!(
            dims.len(),
            self.order(),
            "schema of order {} bound to {} dimensions",
            self.order(),
            dims.len()
        );
        let mut storage = TensorStorage::new(tensor);
        let mut level = self;
        let mut depth = 0;
        loop {
            let dim = match level {
                Self::Values => Dimension::Dynamic(None),
                _ => dims[depth].clone(),
            };
            storage.push_mode(dim, level.mode_type());
            match level.sublevel() {
                Some(sub) => level = sub,
                None => break,
            }
            depth += 1;
        }
        storage
    }
}

impl fmt::Display for TreeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sublevel() {
            Some(sub) => write!(f, "{}({sub})", self.keyword()),
            None => write!(f, "{}()", self.keyword()),
        }
    }
}

/// Errors from parsing the compact schema form.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SchemaParseError {
    /// A name that is not one of the five level keywords.
    #[error("unknown tree level '{name}' at offset {offset}")]
    UnknownLevel { name: String, offset: usize },

    /// A missing punctuation character.
    #[error("expected '{expected}' at offset {offset}")]
    Expected { expected: char, offset: usize },

    /// A missing level keyword.
    #[error("expected a level name at offset {offset}")]
    ExpectedName { offset: usize },

    /// Input after the closing parenthesis of the root level.
    #[error("trailing input at offset {offset}")]
    TrailingInput { offset: usize },
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn skip_ws(&mut self) {
        while self.src[self.pos..].starts_with(|c: char| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn ident(&mut self) -> Result<&'a str, SchemaParseError> {
        self.skip_ws();
        let start = self.pos;
        let rest = &self.src[start..];
        let len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(SchemaParseError::ExpectedName { offset: start });
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn expect(&mut self, expected: char) -> Result<(), SchemaParseError> {
        self.skip_ws();
        if self.src[self.pos..].starts_with(expected) {
            self.pos += expected.len_utf8();
            Ok(())
        } else {
            Err(SchemaParseError::Expected {
                expected,
                offset: self.pos,
            })
        }
    }

    fn level(&mut self) -> Result<TreeLevel, SchemaParseError> {
        self.skip_ws();
        let start = self.pos;
        let name = self.ident()?;
        self.expect('(')?;
        let level = match name {
            "values" => TreeLevel::Values,
            "dense" => TreeLevel::Dense(Box::new(self.level()?)),
            "sparse" => TreeLevel::Sparse(Box::new(self.level()?)),
            "fixed" => TreeLevel::Fixed(Box::new(self.level()?)),
            "replicated" => TreeLevel::Replicated(Box::new(self.level()?)),
            _ => {
                return Err(SchemaParseError::UnknownLevel {
                    name: name.to_owned(),
                    offset: start,
                })
            }
        };
        self.expect(')')?;
        Ok(level)
    }
}

impl FromStr for TreeLevel {
    type Err = SchemaParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser::new(s);
        let level = parser.level()?;
        parser.skip_ws();
        if parser.pos != s.len() {
            return Err(SchemaParseError::TrailingInput { offset: parser.pos });
        }
        Ok(level)
    }
}
