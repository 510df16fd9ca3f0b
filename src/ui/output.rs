//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! Diagnostics go to stderr so stdout stays pipeable.

use crate::core::lattice::Lattice;
use crate::core::types::NodeId;
use std::fmt::Display;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the lattice as an indented tree, one node per line.
///
/// Each line starts with the node's selection marker; cross-links are
/// appended as `-> <path>`.
pub fn format_tree(lattice: &Lattice) -> String {
    let graph = lattice.graph();
    let states = lattice.selection_states();

    let mut lines = Vec::with_capacity(graph.len());
    for id in graph.subtree(NodeId::ROOT) {
        let marker = states
            .get(id.index())
            .copied()
            .unwrap_or_default()
            .marker();
        let indent = "  ".repeat(graph.depth(id));
        let name = graph.name(id).unwrap_or_default();

        let mut line = format!("{marker} {indent}{name}");
        for target in graph.cross_links(id) {
            if let Some(path) = graph.path_of(target) {
                line.push_str(" -> ");
                line.push_str(&path);
            }
        }
        lines.push(line);
    }
    lines.join("\n")
}
