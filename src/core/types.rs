//! core::types
//!
//! Strong types for core lattice concepts.
//!
//! # Types
//!
//! - [`NodeId`] - Dense, append-only node identifier (0 is the root)
//! - [`NodeName`] - Validated, path-addressable node name
//! - [`Preference`] - Explicit selection preference stored on a node
//! - [`SelectionState`] - Derived tri-state selection of a subtree
//!
//! # Validation
//!
//! Names are validated at construction time so that every node in a
//! lattice can be reached by a path expression.
//!
//! # Examples
//!
//! ```
//! use sil::core::types::{NodeId, NodeName};
//!
//! let name = NodeName::new("blk-1").unwrap();
//! assert_eq!(name.as_str(), "blk-1");
//! assert!(NodeId::ROOT.is_root());
//!
//! // Names that could never be addressed by a path are rejected
//! assert!(NodeName::new("").is_err());
//! assert!(NodeName::new("a/b").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid node name: {0}")]
    InvalidNodeName(String),

    #[error("invalid node id: {0}")]
    InvalidNodeId(String),
}

/// Identifier of a node within a single lattice.
///
/// Ids are assigned sequentially and never reused during the lifetime of a
/// lattice. They are only meaningful for the lattice that issued them; use
/// paths to address nodes across structural rebuilds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    /// The implicit root node present in every lattice.
    pub const ROOT: NodeId = NodeId(0);

    /// Create an id from a raw arena index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The raw arena index.
    pub const fn index(self) -> usize {
        self.0
    }

    /// Whether this is the root id.
    pub const fn is_root(self) -> bool {
        self.0 == 0
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl std::str::FromStr for NodeId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<usize>()
            .map(Self)
            .map_err(|_| TypeError::InvalidNodeId(s.to_string()))
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated node name.
///
/// Names are not required to be unique among siblings, but they must be
/// usable as a single path segment:
/// - Cannot be empty (an empty segment means "any depth" in a path)
/// - Cannot contain `/` (the path separator)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeName(String);

impl NodeName {
    /// Create a new validated node name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidNodeName` if the name is empty or contains `/`.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidNodeName(
                "node name cannot be empty".into(),
            ));
        }
        if name.contains('/') {
            return Err(TypeError::InvalidNodeName(format!(
                "node name cannot contain '/': {name}"
            )));
        }
        Ok(())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NodeName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<NodeName> for String {
    fn from(name: NodeName) -> Self {
        name.0
    }
}

impl AsRef<str> for NodeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An explicit preference recorded by `Select`/`Deselect`.
///
/// Absence of a preference (`Option::None`) means "no explicit choice".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    Selected,
    Deselected,
}

impl Preference {
    /// Build a preference from the boolean form used in selection maps.
    pub fn from_bool(selected: bool) -> Self {
        if selected {
            Preference::Selected
        } else {
            Preference::Deselected
        }
    }

    /// The boolean form used in selection maps.
    pub fn as_bool(self) -> bool {
        matches!(self, Preference::Selected)
    }
}

/// Derived tri-state selection of a node and its tree descendants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    #[default]
    NotSelected,
    Selected,
    PartiallySelected,
}

impl SelectionState {
    /// Checkbox-style marker used when rendering a tree.
    pub fn marker(self) -> &'static str {
        match self {
            SelectionState::NotSelected => "[ ]",
            SelectionState::Selected => "[x]",
            SelectionState::PartiallySelected => "[-]",
        }
    }
}

impl std::fmt::Display for SelectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SelectionState::NotSelected => "not-selected",
            SelectionState::Selected => "selected",
            SelectionState::PartiallySelected => "partially-selected",
        };
        write!(f, "{s}")
    }
}
