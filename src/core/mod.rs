//! core
//!
//! Core domain types and operations for the subset inclusion lattice.
//!
//! # Modules
//!
//! - [`types`] - Strong types: NodeId, NodeName, Preference, SelectionState
//! - [`graph`] - Append-only node arena with tree edges and cross-links
//! - [`paths`] - Path grammar (`/a/b`, `//b`, `/a//b`)
//! - [`resolve`] - Path lookup and on-demand creation
//! - [`selection`] - Tri-state derivation and path-keyed selections
//! - [`observer`] - Structure and selection listeners
//! - [`lattice`] - The lattice facade tying the above together
//! - [`snapshot`] - XML snapshot encoding, decoding and merging
//! - [`hierarchy`] - Base/zone/family adapter
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Nodes are never removed; ids are stable for the lifetime of a lattice
//! - Derived state is computed on demand, never stored
//! - Failed operations leave the lattice unchanged

pub mod config;
pub mod graph;
pub mod hierarchy;
pub mod lattice;
pub mod observer;
pub mod paths;
pub mod resolve;
pub mod selection;
pub mod snapshot;
pub mod types;
