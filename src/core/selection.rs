//! core::selection
//!
//! Derived tri-state selection.
//!
//! # Rules
//!
//! The state of a node is a pure function of the explicit preferences of
//! the node and its tree descendants (its subtree):
//!
//! - `NotSelected` if no node of the subtree is explicitly Selected
//! - `Selected` if every node of the subtree is explicitly Selected
//! - `PartiallySelected` otherwise
//!
//! Selecting a container does not cascade to its descendants. Cross-linked
//! nodes never take part in aggregation; they are evaluated under their own
//! tree ancestry.
//!
//! States are recomputed on every read and never stored.

use super::graph::NodeGraph;
use super::types::{NodeId, Preference, SelectionState};
use std::collections::BTreeMap;

/// Explicit preferences keyed by fully-qualified path.
///
/// Paths survive structural rebuilds where node ids may shift.
pub type Selection = BTreeMap<String, bool>;

/// Running summary of a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Coverage {
    any_selected: bool,
    all_selected: bool,
}

impl Coverage {
    fn of(preference: Option<Preference>) -> Self {
        let selected = preference == Some(Preference::Selected);
        Self {
            any_selected: selected,
            all_selected: selected,
        }
    }

    fn absorb(&mut self, child: Coverage) {
        self.any_selected |= child.any_selected;
        self.all_selected &= child.all_selected;
    }

    fn state(self) -> SelectionState {
        match (self.any_selected, self.all_selected) {
            (false, _) => SelectionState::NotSelected,
            (true, true) => SelectionState::Selected,
            (true, false) => SelectionState::PartiallySelected,
        }
    }
}

/// Tri-state of a single node. Invalid ids are `NotSelected`.
pub fn state_of(graph: &NodeGraph, id: NodeId) -> SelectionState {
    if !graph.contains(id) {
        return SelectionState::NotSelected;
    }
    let mut coverage = Coverage::of(graph.preference(id));
    for node in graph.descendants(id) {
        coverage.absorb(Coverage::of(graph.preference(node)));
        if coverage.any_selected && !coverage.all_selected {
            break;
        }
    }
    coverage.state()
}

/// Tri-state of every node, indexed by id, computed bottom-up in one pass.
pub fn all_states(graph: &NodeGraph) -> Vec<SelectionState> {
    let mut coverage: Vec<Coverage> = graph
        .ids()
        .map(|id| Coverage::of(graph.preference(id)))
        .collect();

    // Reverse pre-order visits every child before its parent.
    for id in graph.subtree(NodeId::ROOT).into_iter().rev() {
        if let Some(parent) = graph.parent(id) {
            let child = coverage[id.index()];
            coverage[parent.index()].absorb(child);
        }
    }

    coverage.into_iter().map(Coverage::state).collect()
}

/// The explicit preferences of `graph` as a path-keyed map.
pub fn explicit_selection(graph: &NodeGraph) -> Selection {
    graph
        .ids()
        .filter_map(|id| {
            let preference = graph.preference(id)?;
            let path = graph.path_of(id)?;
            Some((path, preference.as_bool()))
        })
        .collect()
}
