//! core::resolve
//!
//! Path resolver: turns parsed [`NodePath`]s into node ids.
//!
//! # Matching
//!
//! Read-only resolution explores candidates depth-first in insertion order
//! and backtracks when a later step fails, so the first result is the first
//! node (in pre-order) for which the whole path matches. When sibling names
//! collide, first match wins.
//!
//! Mutating resolution creates whatever is missing. It is only used after a
//! read-only lookup failed.

use super::graph::NodeGraph;
use super::paths::{NodePath, Step};
use super::types::{NodeId, NodeName, TypeError};
use std::collections::HashSet;

/// First node matching `path`, if any. Never creates nodes.
pub fn find_first(graph: &NodeGraph, path: &NodePath) -> Option<NodeId> {
    Matcher::new(graph, path.steps(), true).run().into_iter().next()
}

/// Every node matching `path`, in discovery order and without duplicates.
pub fn find_all(graph: &NodeGraph, path: &NodePath) -> Vec<NodeId> {
    Matcher::new(graph, path.steps(), false).run()
}

/// A point in the search: `node` has matched every step before `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum State {
    /// Match `steps[step]` against the children of `node`.
    At { node: NodeId, step: usize },
    /// Look for `steps[step]` anywhere strictly below `node`.
    Below { node: NodeId, step: usize },
}

/// Depth-first search over (node, step) states.
///
/// Each state is expanded at most once, so a lookup costs
/// O(nodes x steps) however often names repeat.
struct Matcher<'g, 'p> {
    graph: &'g NodeGraph,
    steps: &'p [Step],
    first_only: bool,
}

impl<'g, 'p> Matcher<'g, 'p> {
    fn new(graph: &'g NodeGraph, steps: &'p [Step], first_only: bool) -> Self {
        Self {
            graph,
            steps,
            first_only,
        }
    }

    fn named(&self, node: NodeId, step: usize) -> bool {
        self.graph.name(node) == Some(self.steps[step].name())
    }

    fn run(self) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut reported: HashSet<NodeId> = HashSet::new();
        let mut expanded: HashSet<State> = HashSet::new();
        let mut stack = vec![State::At {
            node: NodeId::ROOT,
            step: 0,
        }];

        while let Some(state) = stack.pop() {
            if !expanded.insert(state) {
                continue;
            }
            match state {
                State::At { node, step } if step == self.steps.len() => {
                    if reported.insert(node) {
                        found.push(node);
                        if self.first_only {
                            break;
                        }
                    }
                }
                State::At { node, step } => match self.steps[step] {
                    Step::Child(_) => {
                        // Reversed so the first child is popped first.
                        for &child in self.graph.children(node).iter().rev() {
                            if self.named(child, step) {
                                stack.push(State::At {
                                    node: child,
                                    step: step + 1,
                                });
                            }
                        }
                    }
                    Step::Descendant(_) => stack.push(State::Below { node, step }),
                },
                State::Below { node, step } => {
                    // A child is tried as the match before its own subtree,
                    // which keeps discovery in pre-order.
                    for &child in self.graph.children(node).iter().rev() {
                        stack.push(State::Below { node: child, step });
                        if self.named(child, step) {
                            stack.push(State::At {
                                node: child,
                                step: step + 1,
                            });
                        }
                    }
                }
            }
        }
        found
    }
}

/// Outcome of a mutating resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// The node the full path resolved to
    pub id: NodeId,
    /// Nodes created along the way, parents before children
    pub created: Vec<NodeId>,
}

/// Resolve `path`, creating every missing node.
///
/// An existing full match is returned untouched. Otherwise the path is
/// walked greedily (first matching child, or first matching descendant for
/// a search step) and each unmatched step becomes a new direct child of the
/// current node, so the path always resolves afterwards.
///
/// `can_create` is consulted before each creation and may veto it (used for
/// node-count limits); a veto leaves already-created nodes in place.
pub fn resolve_or_create<F, E>(
    graph: &mut NodeGraph,
    path: &NodePath,
    mut can_create: F,
) -> Result<Resolved, E>
where
    F: FnMut(&NodeGraph) -> Result<(), E>,
    E: From<TypeError>,
{
    if let Some(id) = find_first(graph, path) {
        return Ok(Resolved {
            id,
            created: Vec::new(),
        });
    }

    let mut current = NodeId::ROOT;
    let mut created = Vec::new();
    for step in path.steps() {
        let existing = match step {
            Step::Child(name) => graph.find_child(current, name),
            Step::Descendant(name) => graph.find_descendant(current, name),
        };
        current = match existing {
            Some(id) => id,
            None => {
                can_create(graph)?;
                let name = NodeName::new(step.name())?;
                let id = graph
                    .add_node(name, current)
                    .ok_or_else(|| TypeError::InvalidNodeId(current.to_string()))?;
                created.push(id);
                id
            }
        };
    }

    Ok(Resolved {
        id: current,
        created,
    })
}
