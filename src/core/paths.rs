//! core::paths
//!
//! Path expressions used to address lattice nodes.
//!
//! # Grammar
//!
//! Paths are `/`-separated segments and must start with `/`:
//!
//! - `/a/b` - fully qualified: `a` is a child of the root, `b` a child of `a`
//! - `//b` - search: `b` may be any descendant of the root
//! - `/a//b` - `b` may be any descendant of `a` (zero or more levels between)
//! - `/` - the root itself
//!
//! A trailing `/` is ignored and runs of empty segments collapse into one
//! "any depth" marker.
//!
//! # Example
//!
//! ```
//! use sil::core::paths::{NodePath, Step};
//!
//! let path = NodePath::parse("/World//UK").unwrap();
//! assert_eq!(
//!     path.steps(),
//!     &[Step::Child("World".into()), Step::Descendant("UK".into())]
//! );
//! assert!(!path.is_qualified());
//! assert!(NodePath::parse("World/UK").is_err());
//! ```

use thiserror::Error;

/// Errors from path parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("path is empty")]
    Empty,

    #[error("path must start with '/': {0}")]
    NotAbsolute(String),
}

/// One resolution step of a parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Match an immediate child with this name
    Child(String),
    /// Match a descendant at any depth with this name
    Descendant(String),
}

impl Step {
    /// The name this step matches.
    pub fn name(&self) -> &str {
        match self {
            Step::Child(name) | Step::Descendant(name) => name,
        }
    }
}

/// A parsed path expression.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodePath {
    steps: Vec<Step>,
}

impl NodePath {
    /// The path naming the root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a path expression.
    ///
    /// # Errors
    ///
    /// Returns `PathError::Empty` for an empty string and
    /// `PathError::NotAbsolute` when the path does not start with `/`.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }
        let rest = path
            .strip_prefix('/')
            .ok_or_else(|| PathError::NotAbsolute(path.to_string()))?;

        let mut steps = Vec::new();
        let mut any_depth = false;
        for segment in rest.split('/') {
            if segment.is_empty() {
                any_depth = true;
                continue;
            }
            let name = segment.to_string();
            steps.push(if any_depth {
                Step::Descendant(name)
            } else {
                Step::Child(name)
            });
            any_depth = false;
        }

        Ok(Self { steps })
    }

    /// Build a fully-qualified path from plain segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            steps: segments
                .into_iter()
                .map(|s| Step::Child(s.into()))
                .collect(),
        }
    }

    /// Resolution steps, left to right.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// True when the path names the root.
    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// True when the path contains no "any depth" step.
    pub fn is_qualified(&self) -> bool {
        self.steps.iter().all(|s| matches!(s, Step::Child(_)))
    }
}

impl std::str::FromStr for NodePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for NodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "/");
        }
        for step in &self.steps {
            match step {
                Step::Child(name) => write!(f, "/{name}")?,
                Step::Descendant(name) => write!(f, "//{name}")?,
            }
        }
        Ok(())
    }
}
