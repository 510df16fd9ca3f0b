//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Example
//!
//! ```toml
//! [limits]
//! max_nodes = 100000
//!
//! [snapshot]
//! indent = 4
//! ```
//!
//! # Validation
//!
//! Values are validated after parsing so a loaded config can be applied
//! without further checks.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Default number of spaces per nesting level in snapshots.
pub const DEFAULT_INDENT: usize = 2;

/// Largest accepted snapshot indent.
pub const MAX_INDENT: usize = 16;

/// Lattice configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LatticeConfig {
    /// Structural limits
    pub limits: LimitsConfig,

    /// Snapshot formatting
    pub snapshot: SnapshotConfig,
}

impl LatticeConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()?;
        self.snapshot.validate()
    }

    /// Effective node cap, if any.
    pub fn max_nodes(&self) -> Option<usize> {
        self.limits.max_nodes
    }

    /// Effective snapshot indent.
    pub fn indent(&self) -> usize {
        self.snapshot.indent.unwrap_or(DEFAULT_INDENT)
    }
}

/// Structural limits.
///
/// `max_nodes` counts the root. Lattices describing more partitions than a
/// user could reasonably pick from should be capped here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum number of nodes, root included
    pub max_nodes: Option<usize>,
}

impl LimitsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_nodes == Some(0) {
            return Err(ConfigError::InvalidValue(
                "limits.max_nodes must be at least 1 (the root)".into(),
            ));
        }
        Ok(())
    }
}

/// Snapshot formatting.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotConfig {
    /// Spaces per nesting level (default: 2)
    pub indent: Option<usize>,
}

impl SnapshotConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self.indent {
            Some(indent) if indent > MAX_INDENT => Err(ConfigError::InvalidValue(format!(
                "snapshot.indent must be at most {MAX_INDENT}, got {indent}"
            ))),
            _ => Ok(()),
        }
    }
}
