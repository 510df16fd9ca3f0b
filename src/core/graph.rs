//! core::graph
//!
//! Node store: the arena that owns every node of a lattice.
//!
//! # Architecture
//!
//! The lattice is a DAG where:
//! - Nodes live in an append-only `Vec`, indexed by [`NodeId`]
//! - Tree edges are a parent pointer plus an ordered children list
//! - Cross-links are extra edges from a "cause" node to "effect" nodes
//! - Root is node 0, always present and unnamed
//!
//! # Invariants
//!
//! - Exactly one node (the root) has no parent
//! - Tree edges form a tree; a node's parent is fixed at creation
//! - A children list never holds duplicates
//! - Cross-links are not part of the tree and may form cycles

use super::types::{NodeId, NodeName, Preference};
use std::collections::BTreeSet;

/// Name reported for the root node.
pub const ROOT_NAME: &str = "/";

/// A single node in the arena.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Node {
    /// `None` only for the root
    pub(crate) name: Option<NodeName>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) cross_links: BTreeSet<NodeId>,
    pub(crate) preference: Option<Preference>,
}

impl Node {
    fn root() -> Self {
        Self::default()
    }

    fn child(name: NodeName, parent: NodeId) -> Self {
        Self {
            name: Some(name),
            parent: Some(parent),
            ..Self::default()
        }
    }
}

/// The node arena.
///
/// Lookups by id are O(1) and never panic: invalid ids yield `None` or an
/// empty slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeGraph {
    nodes: Vec<Node>,
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeGraph {
    /// Create a graph holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::root()],
        }
    }

    /// Build a graph directly from nodes. Callers must uphold the invariants.
    pub(crate) fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root exists in every graph.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` names a node of this graph.
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// All node ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Append a new node as the last child of `parent`.
    ///
    /// Returns `None` if `parent` does not exist. Names are not deduplicated.
    pub fn add_node(&mut self, name: NodeName, parent: NodeId) -> Option<NodeId> {
        if !self.contains(parent) {
            return None;
        }
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::child(name, parent));
        self.nodes[parent.index()].children.push(id);
        Some(id)
    }

    /// Drop every node created after the arena held `len` nodes.
    ///
    /// Only used to undo a multi-node creation that failed part way; the
    /// root is never dropped.
    pub(crate) fn rollback_to(&mut self, len: usize) {
        let len = len.max(1);
        if len >= self.nodes.len() {
            return;
        }
        self.nodes.truncate(len);
        for node in &mut self.nodes {
            node.children.retain(|c| c.index() < len);
            node.cross_links.retain(|c| c.index() < len);
        }
    }

    /// Record a cross-link `src -> dst`.
    ///
    /// Returns `None` if either id is invalid, otherwise whether the link is new.
    /// Cycles are not checked.
    pub fn add_cross_link(&mut self, src: NodeId, dst: NodeId) -> Option<bool> {
        if !self.contains(dst) {
            return None;
        }
        self.node_mut(src).map(|node| node.cross_links.insert(dst))
    }

    /// Tree children in insertion order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Tree parent; `None` for the root or an invalid id.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Tree parent together with the position of `id` among its children.
    pub fn parent_with_index(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let index = self.children(parent).iter().position(|c| *c == id)?;
        Some((parent, index))
    }

    /// Node name; the root reports [`ROOT_NAME`].
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id)
            .map(|n| n.name.as_ref().map(NodeName::as_str).unwrap_or(ROOT_NAME))
    }

    /// Direct cross-link targets of `id`, in ascending id order.
    pub fn cross_links(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .into_iter()
            .flat_map(|n| n.cross_links.iter().copied())
    }

    /// Whether a cross-link `src -> dst` exists.
    pub fn has_cross_link(&self, src: NodeId, dst: NodeId) -> bool {
        self.node(src)
            .map(|n| n.cross_links.contains(&dst))
            .unwrap_or(false)
    }

    /// First child of `parent` named `name`.
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|c| self.name(*c) == Some(name))
    }

    /// First descendant of `ancestor` (pre-order) named `name`.
    pub fn find_descendant(&self, ancestor: NodeId, name: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(ancestor).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if self.name(current) == Some(name) {
                return Some(current);
            }
            stack.extend(self.children(current).iter().rev().copied());
        }
        None
    }

    /// Explicit preference of a node.
    pub fn preference(&self, id: NodeId) -> Option<Preference> {
        self.node(id).and_then(|n| n.preference)
    }

    /// Store an explicit preference. Returns true iff the stored value changed.
    pub fn set_preference(&mut self, id: NodeId, preference: Option<Preference>) -> bool {
        match self.node_mut(id) {
            Some(node) if node.preference != preference => {
                node.preference = preference;
                true
            }
            _ => false,
        }
    }

    /// Drop every explicit preference. Returns true if any was set.
    pub fn clear_preferences(&mut self) -> bool {
        let mut changed = false;
        for node in &mut self.nodes {
            changed |= node.preference.take().is_some();
        }
        changed
    }

    /// All tree descendants of `id` in pre-order, excluding `id` itself.
    ///
    /// Cross-links are not followed.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();

        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }

        result
    }

    /// `id` followed by its tree descendants in pre-order.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut result = vec![id];
        result.extend(self.descendants(id));
        result
    }

    /// Ancestors from immediate parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.parent(id);

        while let Some(parent) = current {
            result.push(parent);
            current = self.parent(parent);
        }

        result
    }

    /// Depth below the root (root is 0).
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).len()
    }

    /// Fully-qualified path of a node, e.g. `/base/blk-1`. The root is `/`.
    pub fn path_of(&self, id: NodeId) -> Option<String> {
        if !self.contains(id) {
            return None;
        }
        if id.is_root() {
            return Some(ROOT_NAME.to_string());
        }

        let mut chain: Vec<NodeId> = self.ancestors(id);
        chain.pop(); // root
        chain.reverse();
        chain.push(id);

        let mut path = String::new();
        for node in chain {
            path.push('/');
            path.push_str(self.name(node).unwrap_or_default());
        }
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> NodeName {
        NodeName::new(s).unwrap()
    }

    /// root -> Europe -> {UK, EU}
    fn europe() -> (NodeGraph, NodeId, NodeId, NodeId) {
        let mut graph = NodeGraph::new();
        let europe = graph.add_node(name("Europe"), NodeId::ROOT).unwrap();
        let uk = graph.add_node(name("UK"), europe).unwrap();
        let eu = graph.add_node(name("EU"), europe).unwrap();
        (graph, europe, uk, eu)
    }

    #[test]
    fn new_graph_has_only_root() {
        let graph = NodeGraph::new();
        assert_eq!(graph.len(), 1);
        assert!(graph.contains(NodeId::ROOT));
        assert_eq!(graph.parent(NodeId::ROOT), None);
        assert_eq!(graph.name(NodeId::ROOT), Some(ROOT_NAME));
        assert!(graph.children(NodeId::ROOT).is_empty());
    }

    #[test]
    fn ids_are_sequential() {
        let (_, europe, uk, eu) = europe();
        assert_eq!(europe, NodeId::new(1));
        assert_eq!(uk, NodeId::new(2));
        assert_eq!(eu, NodeId::new(3));
    }

    #[test]
    fn add_node_with_unknown_parent_fails() {
        let mut graph = NodeGraph::new();
        assert_eq!(graph.add_node(name("x"), NodeId::new(7)), None);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn add_node_does_not_deduplicate() {
        let mut graph = NodeGraph::new();
        let a = graph.add_node(name("dup"), NodeId::ROOT).unwrap();
        let b = graph.add_node(name("dup"), NodeId::ROOT).unwrap();
        assert_ne!(a, b);
        assert_eq!(graph.find_child(NodeId::ROOT, "dup"), Some(a));
    }

    #[test]
    fn parent_with_index_matches_children_order() {
        let (graph, europe, uk, eu) = europe();
        assert_eq!(graph.parent_with_index(uk), Some((europe, 0)));
        assert_eq!(graph.parent_with_index(eu), Some((europe, 1)));
        assert_eq!(graph.parent_with_index(NodeId::ROOT), None);
        assert_eq!(graph.parent_with_index(NodeId::new(99)), None);
    }

    #[test]
    fn invalid_ids_yield_sentinels() {
        let graph = NodeGraph::new();
        let bogus = NodeId::new(42);
        assert!(graph.children(bogus).is_empty());
        assert_eq!(graph.parent(bogus), None);
        assert_eq!(graph.name(bogus), None);
        assert_eq!(graph.path_of(bogus), None);
        assert!(graph.subtree(bogus).is_empty());
    }

    #[test]
    fn cross_links_are_not_children() {
        let (mut graph, europe, uk, eu) = europe();
        assert_eq!(graph.add_cross_link(uk, eu), Some(true));
        assert_eq!(graph.add_cross_link(uk, eu), Some(false));
        assert!(graph.has_cross_link(uk, eu));
        assert!(graph.children(uk).is_empty());
        assert_eq!(graph.cross_links(uk).collect::<Vec<_>>(), vec![eu]);
        assert_eq!(graph.descendants(europe), vec![uk, eu]);
    }

    #[test]
    fn cross_link_with_invalid_id_is_rejected() {
        let (mut graph, _, uk, _) = europe();
        assert_eq!(graph.add_cross_link(uk, NodeId::new(50)), None);
        assert_eq!(graph.add_cross_link(NodeId::new(50), uk), None);
        assert_eq!(graph.cross_links(uk).count(), 0);
    }

    #[test]
    fn cyclic_cross_links_are_accepted() {
        let (mut graph, europe, uk, _) = europe();
        assert_eq!(graph.add_cross_link(uk, europe), Some(true));
        assert_eq!(graph.add_cross_link(europe, uk), Some(true));
        assert_eq!(graph.descendants(europe).len(), 2);
    }

    #[test]
    fn descendants_are_preorder() {
        let mut graph = NodeGraph::new();
        let a = graph.add_node(name("a"), NodeId::ROOT).unwrap();
        let b = graph.add_node(name("b"), NodeId::ROOT).unwrap();
        let a1 = graph.add_node(name("a1"), a).unwrap();
        let b1 = graph.add_node(name("b1"), b).unwrap();
        let a2 = graph.add_node(name("a2"), a).unwrap();

        assert_eq!(graph.descendants(NodeId::ROOT), vec![a, a1, a2, b, b1]);
        assert_eq!(graph.subtree(a), vec![a, a1, a2]);
    }

    #[test]
    fn path_of_joins_names() {
        let (graph, europe, uk, _) = europe();
        assert_eq!(graph.path_of(NodeId::ROOT).as_deref(), Some("/"));
        assert_eq!(graph.path_of(europe).as_deref(), Some("/Europe"));
        assert_eq!(graph.path_of(uk).as_deref(), Some("/Europe/UK"));
        assert_eq!(graph.depth(uk), 2);
    }

    #[test]
    fn set_preference_reports_change() {
        let (mut graph, europe, _, _) = europe();
        assert!(graph.set_preference(europe, Some(Preference::Selected)));
        assert!(!graph.set_preference(europe, Some(Preference::Selected)));
        assert!(graph.set_preference(europe, Some(Preference::Deselected)));
        assert!(!graph.set_preference(NodeId::new(77), Some(Preference::Selected)));

        assert!(graph.clear_preferences());
        assert!(!graph.clear_preferences());
        assert_eq!(graph.preference(europe), None);
    }
}
