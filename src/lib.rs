//! sil - subset inclusion lattice
//!
//! A hierarchy of named nodes with tri-state selection: partitions of a
//! dataset (bases, zones, families, blocks) are added as paths, callers
//! select or deselect any of them, and every node reports whether its
//! subtree is wholly, partly or not at all selected.
//!
//! # Architecture
//!
//! - [`core`] - Node store, path resolver, selection engine and snapshots
//! - [`cli`] - The `sil` command-line interface over snapshot files
//! - [`ui`] - Terminal output
//!
//! # Invariants
//!
//! 1. Every non-root node has exactly one parent
//! 2. Cross-links never participate in tri-state aggregation
//! 3. Only explicit preferences are stored or serialized
//! 4. A rejected snapshot leaves the lattice untouched

pub mod cli;
pub mod core;
pub mod ui;
