//! core::lattice
//!
//! The subset inclusion lattice.
//!
//! [`Lattice`] ties the node store, path resolver, selection engine and
//! snapshot format together behind one API:
//!
//! - Construction: [`Lattice::add_node`], [`Lattice::add_node_at_path`],
//!   [`Lattice::add_cross_link`]
//! - Queries: [`Lattice::find_node`], [`Lattice::children`],
//!   [`Lattice::parent`], [`Lattice::node_name`]
//! - Selection: [`Lattice::select`], [`Lattice::select_path`],
//!   [`Lattice::select_all`], [`Lattice::clear_selections`],
//!   [`Lattice::selection`], [`Lattice::set_selection`],
//!   [`Lattice::selection_state`]
//! - Persistence: [`Lattice::serialize`], [`Lattice::deserialize`],
//!   [`Lattice::merge`], [`Lattice::deep_copy`]
//!
//! # Example
//!
//! ```
//! use sil::core::lattice::Lattice;
//! use sil::core::types::SelectionState;
//!
//! let mut lattice = Lattice::new();
//! lattice.add_node_at_path("/base/blk-1/Grid").unwrap();
//! lattice.add_node_at_path("/base/blk-1/bc-1").unwrap();
//!
//! lattice.select_path("/base/blk-1").unwrap();
//! lattice.deselect_path("/base/blk-1/Grid").unwrap();
//!
//! assert_eq!(
//!     lattice.selection_state_at("/base/blk-1"),
//!     SelectionState::PartiallySelected
//! );
//! assert_eq!(lattice.selection().len(), 2);
//! ```
//!
//! # Ids versus paths
//!
//! Node ids are stable for the lifetime of a lattice but not across
//! rebuilds. To carry a selection over to a rebuilt structure, capture
//! [`Lattice::selection`] first, rebuild, then replay it with
//! [`Lattice::set_selection`].

use super::config::LatticeConfig;
use super::config::schema::DEFAULT_INDENT;
use super::graph::NodeGraph;
use super::observer::{ListenerId, Observers};
use super::paths::{NodePath, PathError};
use super::resolve;
use super::selection::{self, Selection};
use super::snapshot::{self, MergeSummary, SnapshotError};
use super::types::{NodeId, NodeName, Preference, SelectionState, TypeError};
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Errors from lattice operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LatticeError {
    #[error("unknown node id {0}")]
    UnknownNode(NodeId),

    #[error(transparent)]
    InvalidName(#[from] TypeError),

    #[error(transparent)]
    InvalidPath(#[from] PathError),

    #[error("path '{0}' is not fully qualified; node creation needs a '/' path without '//'")]
    AmbiguousPath(String),

    #[error("node limit of {limit} reached")]
    CapacityExceeded { limit: usize },
}

/// Fails when `graph` cannot take one more node under `limit`.
pub(crate) fn check_capacity(limit: Option<usize>, graph: &NodeGraph) -> Result<(), LatticeError> {
    match limit {
        Some(limit) if graph.len() >= limit => Err(LatticeError::CapacityExceeded { limit }),
        _ => Ok(()),
    }
}

/// A subset inclusion lattice.
///
/// Single-threaded; listeners run synchronously on the mutating call.
#[derive(Debug)]
pub struct Lattice {
    graph: NodeGraph,
    max_nodes: Option<usize>,
    indent: usize,
    generation: u64,
    observers: Observers,
}

impl Default for Lattice {
    fn default() -> Self {
        Self::new()
    }
}

/// Clones structure and preferences. Listeners are not carried over.
impl Clone for Lattice {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            max_nodes: self.max_nodes,
            indent: self.indent,
            generation: self.generation,
            observers: Observers::new(),
        }
    }
}

impl Lattice {
    /// Create a lattice holding only the root, with default configuration.
    pub fn new() -> Self {
        Self {
            graph: NodeGraph::new(),
            max_nodes: None,
            indent: DEFAULT_INDENT,
            generation: 0,
            observers: Observers::new(),
        }
    }

    /// Create a root-only lattice honoring `config`.
    pub fn with_config(config: &LatticeConfig) -> Self {
        Self {
            max_nodes: config.max_nodes(),
            indent: config.indent(),
            ..Self::new()
        }
    }

    /// Reset to a root-only lattice. Configuration and listeners are kept.
    pub fn initialize(&mut self) {
        self.graph = NodeGraph::new();
        debug!("lattice initialized");
        self.structure_changed();
        self.selection_changed(NodeId::ROOT);
    }

    /// Read-only view of the node store.
    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    /// Always false: the root exists in every lattice.
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Whether `id` names a node of this lattice.
    pub fn contains(&self, id: NodeId) -> bool {
        self.graph.contains(id)
    }

    /// Counter bumped on every structural or selection change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    /// Register a listener fired whenever nodes or edges are added.
    pub fn on_structure_changed(&mut self, listener: impl FnMut() + 'static) -> ListenerId {
        self.observers.add_structure(listener)
    }

    /// Register a listener fired with the affected node whenever a
    /// preference changes.
    pub fn on_selection_changed(
        &mut self,
        listener: impl FnMut(NodeId) + 'static,
    ) -> ListenerId {
        self.observers.add_selection(listener)
    }

    /// Unregister a listener. Returns false if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.observers.remove(id)
    }

    fn structure_changed(&mut self) {
        self.generation += 1;
        self.observers.structure_changed();
    }

    fn selection_changed(&mut self, node: NodeId) {
        self.generation += 1;
        self.observers.selection_changed(node);
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Append a node named `name` as the last child of `parent`.
    ///
    /// Names are not deduplicated; use [`Lattice::add_node_at_path`] for
    /// idempotent creation.
    ///
    /// # Errors
    ///
    /// - `UnknownNode` if `parent` does not exist
    /// - `InvalidName` if `name` is empty or contains `/`
    /// - `CapacityExceeded` if the configured node limit is reached
    pub fn add_node(&mut self, name: &str, parent: NodeId) -> Result<NodeId, LatticeError> {
        let name = NodeName::new(name)?;
        if !self.graph.contains(parent) {
            return Err(LatticeError::UnknownNode(parent));
        }
        check_capacity(self.max_nodes, &self.graph)?;

        let id = self
            .graph
            .add_node(name, parent)
            .ok_or(LatticeError::UnknownNode(parent))?;
        debug!(%id, %parent, "node added");
        self.structure_changed();
        Ok(id)
    }

    /// Create every missing node along a fully-qualified path and return
    /// the id of the last one. Existing paths are returned unchanged.
    ///
    /// # Errors
    ///
    /// - `InvalidPath` if `path` does not start with `/`
    /// - `AmbiguousPath` if `path` contains a `//` search step
    /// - `CapacityExceeded` if the configured node limit is reached; no
    ///   node is created in that case
    pub fn add_node_at_path(&mut self, path: &str) -> Result<NodeId, LatticeError> {
        let parsed = NodePath::parse(path)?;
        // A trailing `//` parses to no search step but is still a search.
        if !parsed.is_qualified() || path.contains("//") {
            return Err(LatticeError::AmbiguousPath(path.to_string()));
        }
        self.resolve_or_create(&parsed)
    }

    /// Record that `dst` is cross-linked from `src`.
    ///
    /// Returns `Ok(true)` when the link is new and `Ok(false)` when it
    /// already existed. Cycles are not checked.
    ///
    /// # Errors
    ///
    /// Returns `UnknownNode` if either id is invalid; nothing changes.
    pub fn add_cross_link(&mut self, src: NodeId, dst: NodeId) -> Result<bool, LatticeError> {
        for id in [src, dst] {
            if !self.graph.contains(id) {
                return Err(LatticeError::UnknownNode(id));
            }
        }
        let added = self.graph.add_cross_link(src, dst).unwrap_or(false);
        if added {
            debug!(%src, %dst, "cross-link added");
            self.structure_changed();
        }
        Ok(added)
    }

    fn resolve_or_create(&mut self, path: &NodePath) -> Result<NodeId, LatticeError> {
        let before = self.graph.len();
        let limit = self.max_nodes;
        match resolve::resolve_or_create(&mut self.graph, path, |g: &NodeGraph| {
            check_capacity(limit, g)
        }) {
            Ok(resolved) => {
                if !resolved.created.is_empty() {
                    debug!(%path, created = resolved.created.len(), "path materialized");
                    self.structure_changed();
                }
                Ok(resolved.id)
            }
            Err(err) => {
                self.graph.rollback_to(before);
                warn!(%path, error = %err, "path could not be materialized");
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// First node matching `path`. Never creates nodes.
    ///
    /// Returns `None` for unmatched or unparsable paths.
    pub fn find_node(&self, path: &str) -> Option<NodeId> {
        let parsed = NodePath::parse(path).ok()?;
        resolve::find_first(&self.graph, &parsed)
    }

    /// Every node matching `path`, in discovery order.
    pub fn find_nodes(&self, path: &str) -> Vec<NodeId> {
        match NodePath::parse(path) {
            Ok(parsed) => resolve::find_all(&self.graph, &parsed),
            Err(_) => Vec::new(),
        }
    }

    /// Tree children in insertion order; empty for leaves and invalid ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.graph.children(id)
    }

    /// Tree parent; `None` for the root and invalid ids.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.graph.parent(id)
    }

    /// Tree parent plus the index of `id` within the parent's children.
    pub fn parent_with_index(&self, id: NodeId) -> Option<(NodeId, usize)> {
        self.graph.parent_with_index(id)
    }

    /// Node name; `"/"` for the root, `None` for invalid ids.
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.graph.name(id)
    }

    /// Fully-qualified path of a node.
    pub fn node_path(&self, id: NodeId) -> Option<String> {
        self.graph.path_of(id)
    }

    /// Direct cross-link targets of `id`.
    pub fn cross_links(&self, id: NodeId) -> Vec<NodeId> {
        self.graph.cross_links(id).collect()
    }

    /// Explicit preference of a node, if any.
    pub fn preference(&self, id: NodeId) -> Option<Preference> {
        self.graph.preference(id)
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Mark a node selected. Returns true iff its preference changed.
    ///
    /// Invalid ids return false. Descendants are not touched.
    pub fn select(&mut self, id: NodeId) -> bool {
        self.apply(id, Preference::Selected)
    }

    /// Mark a node deselected. Returns true iff its preference changed.
    pub fn deselect(&mut self, id: NodeId) -> bool {
        self.apply(id, Preference::Deselected)
    }

    fn apply(&mut self, id: NodeId, preference: Preference) -> bool {
        if !self.graph.set_preference(id, Some(preference)) {
            return false;
        }
        trace!(%id, ?preference, "preference changed");
        self.selection_changed(id);
        true
    }

    /// Select the node at `path`, creating it first if needed.
    ///
    /// # Errors
    ///
    /// `InvalidPath` for paths not starting with `/`, `CapacityExceeded`
    /// when creation hits the node limit.
    pub fn select_path(&mut self, path: &str) -> Result<bool, LatticeError> {
        self.apply_path(path, Preference::Selected)
    }

    /// Deselect the node at `path`, creating it first if needed.
    pub fn deselect_path(&mut self, path: &str) -> Result<bool, LatticeError> {
        self.apply_path(path, Preference::Deselected)
    }

    fn apply_path(&mut self, path: &str, preference: Preference) -> Result<bool, LatticeError> {
        let parsed = NodePath::parse(path)?;
        let id = self.resolve_or_create(&parsed)?;
        Ok(self.apply(id, preference))
    }

    /// Select every existing node matching `pattern`. Never creates nodes.
    ///
    /// Returns true iff at least one preference changed.
    pub fn select_all(&mut self, pattern: &str) -> bool {
        self.apply_all(pattern, Preference::Selected)
    }

    /// Deselect every existing node matching `pattern`.
    pub fn deselect_all(&mut self, pattern: &str) -> bool {
        self.apply_all(pattern, Preference::Deselected)
    }

    fn apply_all(&mut self, pattern: &str, preference: Preference) -> bool {
        let mut changed = false;
        for id in self.find_nodes(pattern) {
            changed |= self.apply(id, preference);
        }
        changed
    }

    /// Drop every explicit preference. Always notifies once, with the root.
    pub fn clear_selections(&mut self) {
        let had_any = self.graph.clear_preferences();
        debug!(had_any, "selections cleared");
        self.selection_changed(NodeId::ROOT);
    }

    /// Explicit preferences recorded since the last reset, keyed by path.
    ///
    /// Derived states are not included.
    pub fn selection(&self) -> Selection {
        selection::explicit_selection(&self.graph)
    }

    /// Replay a path-keyed selection, creating missing nodes.
    ///
    /// # Errors
    ///
    /// All paths are parsed before anything changes, so `InvalidPath`
    /// leaves the lattice untouched. `CapacityExceeded` stops the replay at
    /// the first path that cannot be created.
    pub fn set_selection(&mut self, selection: &Selection) -> Result<(), LatticeError> {
        let parsed = selection
            .iter()
            .map(|(path, selected)| Ok((NodePath::parse(path)?, *selected)))
            .collect::<Result<Vec<_>, LatticeError>>()?;

        for (path, selected) in parsed {
            let id = self.resolve_or_create(&path)?;
            self.apply(id, Preference::from_bool(selected));
        }
        Ok(())
    }

    /// Derived tri-state of a node. Invalid ids are `NotSelected`.
    pub fn selection_state(&self, id: NodeId) -> SelectionState {
        selection::state_of(&self.graph, id)
    }

    /// Derived tri-state of the node at `path`. Never creates nodes;
    /// unmatched paths are `NotSelected`.
    pub fn selection_state_at(&self, path: &str) -> SelectionState {
        self.find_node(path)
            .map(|id| self.selection_state(id))
            .unwrap_or_default()
    }

    /// Derived tri-state of every node, indexed by id.
    pub fn selection_states(&self) -> Vec<SelectionState> {
        selection::all_states(&self.graph)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Encode structure, cross-links and preferences as a snapshot.
    pub fn serialize(&self) -> Result<String, SnapshotError> {
        snapshot::write_snapshot(&self.graph, self.indent)
    }

    /// Replace structure and preferences with a snapshot.
    ///
    /// # Errors
    ///
    /// Any malformed input is rejected and the lattice is left exactly as
    /// it was.
    pub fn deserialize(&mut self, text: &str) -> Result<(), SnapshotError> {
        let graph = snapshot::read_snapshot(text, self.max_nodes).inspect_err(|err| {
            warn!(error = %err, "snapshot rejected");
        })?;
        debug!(nodes = graph.len(), "snapshot loaded");
        self.graph = graph;
        self.structure_changed();
        self.selection_changed(NodeId::ROOT);
        Ok(())
    }

    /// Merge a snapshot into this lattice. See [`Lattice::merge`].
    pub fn merge_str(&mut self, text: &str) -> Result<MergeSummary, SnapshotError> {
        let source = snapshot::read_snapshot(text, None)?;
        Ok(self.merge_graph(&source)?)
    }

    /// Add nodes, cross-links and preferences from `other` that are absent
    /// here, matching nodes by path.
    ///
    /// Existing nodes, edges and preferences are never modified.
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` if the result would exceed the node limit; the
    /// lattice is unchanged in that case.
    pub fn merge(&mut self, other: &Lattice) -> Result<MergeSummary, LatticeError> {
        self.merge_graph(&other.graph)
    }

    fn merge_graph(&mut self, source: &NodeGraph) -> Result<MergeSummary, LatticeError> {
        let outcome = snapshot::merge_graph(&mut self.graph, source, self.max_nodes)?;
        let summary = outcome.summary;
        debug!(
            nodes = summary.nodes_added,
            links = summary.links_added,
            preferences = summary.preferences_adopted,
            "merged"
        );
        if summary.nodes_added > 0 || summary.links_added > 0 {
            self.structure_changed();
        }
        for id in outcome.adopted {
            self.selection_changed(id);
        }
        Ok(summary)
    }

    /// Replace structure and preferences with an independent copy of
    /// `other`'s. Configuration and listeners of `self` are kept.
    pub fn deep_copy(&mut self, other: &Lattice) {
        self.graph = other.graph.clone();
        debug!(nodes = self.graph.len(), "deep copy");
        self.structure_changed();
        self.selection_changed(NodeId::ROOT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// root -> Europe -> {UK, EU}
    fn europe() -> Lattice {
        let mut lattice = Lattice::new();
        let europe = lattice.add_node("Europe", NodeId::ROOT).unwrap();
        lattice.add_node("UK", europe).unwrap();
        lattice.add_node("EU", europe).unwrap();
        lattice
    }

    #[derive(Default)]
    struct Recorder {
        structure: Rc<RefCell<usize>>,
        selection: Rc<RefCell<Vec<NodeId>>>,
    }

    impl Recorder {
        fn attach(lattice: &mut Lattice) -> Self {
            let recorder = Recorder::default();
            let s = Rc::clone(&recorder.structure);
            lattice.on_structure_changed(move || *s.borrow_mut() += 1);
            let n = Rc::clone(&recorder.selection);
            lattice.on_selection_changed(move |id| n.borrow_mut().push(id));
            recorder
        }

        fn structure(&self) -> usize {
            *self.structure.borrow()
        }

        fn selection(&self) -> Vec<NodeId> {
            self.selection.borrow().clone()
        }
    }

    #[test]
    fn add_node_rejects_unknown_parent() {
        let mut lattice = Lattice::new();
        assert_eq!(
            lattice.add_node("x", NodeId::new(5)),
            Err(LatticeError::UnknownNode(NodeId::new(5)))
        );
        assert_eq!(lattice.len(), 1);
    }

    #[test]
    fn add_node_rejects_unaddressable_names() {
        let mut lattice = Lattice::new();
        assert!(matches!(
            lattice.add_node("a/b", NodeId::ROOT),
            Err(LatticeError::InvalidName(_))
        ));
        assert!(lattice.add_node("", NodeId::ROOT).is_err());
    }

    #[test]
    fn add_node_at_path_rejects_search_paths() {
        let mut lattice = Lattice::new();
        assert_eq!(
            lattice.add_node_at_path("//Block0"),
            Err(LatticeError::AmbiguousPath("//Block0".into()))
        );
        assert!(matches!(
            lattice.add_node_at_path("/Assembly//Block0"),
            Err(LatticeError::AmbiguousPath(_))
        ));
        assert!(matches!(
            lattice.add_node_at_path("Assembly"),
            Err(LatticeError::InvalidPath(_))
        ));
        assert_eq!(lattice.len(), 1);

        lattice.add_node_at_path("/a").unwrap();
        for path in ["//", "/a//", "/b//"] {
            assert_eq!(
                lattice.add_node_at_path(path),
                Err(LatticeError::AmbiguousPath(path.into()))
            );
        }
        assert_eq!(lattice.len(), 2);
    }

    #[test]
    fn add_node_at_path_is_idempotent() {
        let mut lattice = Lattice::new();
        let a = lattice.add_node_at_path("/base/blk-1").unwrap();
        let b = lattice.add_node_at_path("/base/blk-1").unwrap();
        assert_eq!(a, b);
        assert_eq!(lattice.len(), 3);
    }

    #[test]
    fn cross_link_validation() {
        let mut lattice = europe();
        assert_eq!(lattice.add_cross_link(NodeId::new(2), NodeId::new(3)), Ok(true));
        assert_eq!(lattice.add_cross_link(NodeId::new(2), NodeId::new(3)), Ok(false));
        assert_eq!(
            lattice.add_cross_link(NodeId::new(2), NodeId::new(30)),
            Err(LatticeError::UnknownNode(NodeId::new(30)))
        );
        assert_eq!(lattice.cross_links(NodeId::new(2)), vec![NodeId::new(3)]);
    }

    #[test]
    fn select_is_idempotent() {
        let mut lattice = europe();
        let recorder = Recorder::attach(&mut lattice);
        let uk = lattice.find_node("/Europe/UK").unwrap();

        assert!(lattice.select(uk));
        assert!(!lattice.select(uk));
        assert_eq!(recorder.selection(), vec![uk]);
        assert_eq!(recorder.structure(), 0);
    }

    #[test]
    fn select_invalid_id_is_noop() {
        let mut lattice = europe();
        assert!(!lattice.select(NodeId::new(100)));
        assert!(!lattice.deselect(NodeId::new(100)));
        assert!(lattice.selection().is_empty());
    }

    #[test]
    fn select_path_creates_missing_nodes() {
        let mut lattice = europe();
        let recorder = Recorder::attach(&mut lattice);

        assert_eq!(lattice.select_path("/Asia/Japan"), Ok(true));
        assert!(lattice.find_node("/Asia/Japan").is_some());
        assert_eq!(recorder.structure(), 1);
        assert_eq!(recorder.selection().len(), 1);
    }

    #[test]
    fn add_node_fires_structure_only() {
        let mut lattice = Lattice::new();
        let recorder = Recorder::attach(&mut lattice);
        lattice.add_node("a", NodeId::ROOT).unwrap();
        assert_eq!(recorder.structure(), 1);
        assert!(recorder.selection().is_empty());
    }

    #[test]
    fn removed_listener_stops_receiving() {
        let mut lattice = Lattice::new();
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        let id = lattice.on_structure_changed(move || *c.borrow_mut() += 1);
        lattice.add_node("a", NodeId::ROOT).unwrap();
        assert!(lattice.remove_listener(id));
        lattice.add_node("b", NodeId::ROOT).unwrap();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn select_all_hits_every_match() {
        let mut lattice = Lattice::new();
        lattice.add_node_at_path("/a/Grid").unwrap();
        lattice.add_node_at_path("/b/Grid").unwrap();
        let len = lattice.len();

        assert!(lattice.select_all("//Grid"));
        assert!(!lattice.select_all("//Grid"));
        assert!(!lattice.select_all("//Missing"));
        assert!(!lattice.select_all("not-a-path"));
        assert_eq!(lattice.len(), len);
        assert_eq!(lattice.selection().len(), 2);

        assert!(lattice.deselect_all("/a/Grid"));
        assert_eq!(lattice.selection().get("/a/Grid"), Some(&false));
    }

    #[test]
    fn clear_selections_always_notifies() {
        let mut lattice = europe();
        let recorder = Recorder::attach(&mut lattice);
        lattice.clear_selections();
        assert_eq!(recorder.selection(), vec![NodeId::ROOT]);

        lattice.select_path("/Europe").unwrap();
        lattice.clear_selections();
        assert!(lattice.selection().is_empty());
        for id in lattice.graph().ids() {
            assert_eq!(lattice.selection_state(id), SelectionState::NotSelected);
        }
    }

    #[test]
    fn set_selection_rejects_bad_paths_atomically() {
        let mut lattice = europe();
        let mut selection = Selection::new();
        selection.insert("/Europe".into(), true);
        selection.insert("Europe/UK".into(), true);

        assert!(matches!(
            lattice.set_selection(&selection),
            Err(LatticeError::InvalidPath(_))
        ));
        assert!(lattice.selection().is_empty());
    }

    #[test]
    fn selection_state_at_unknown_path() {
        let lattice = europe();
        let len = lattice.len();
        assert_eq!(
            lattice.selection_state_at("//Nowhere"),
            SelectionState::NotSelected
        );
        assert_eq!(lattice.len(), len);
    }

    #[test]
    fn node_limit_applies_to_every_creation_path() {
        let config = LatticeConfig {
            limits: crate::core::config::LimitsConfig { max_nodes: Some(3) },
            ..LatticeConfig::default()
        };
        let mut lattice = Lattice::with_config(&config);
        lattice.add_node("a", NodeId::ROOT).unwrap();

        // two nodes needed, one allowed: nothing is created
        assert_eq!(
            lattice.add_node_at_path("/b/c"),
            Err(LatticeError::CapacityExceeded { limit: 3 })
        );
        assert_eq!(lattice.len(), 2);
        assert!(lattice.find_node("/b").is_none());

        lattice.select_path("/b").unwrap();
        assert_eq!(
            lattice.add_node("d", NodeId::ROOT),
            Err(LatticeError::CapacityExceeded { limit: 3 })
        );
    }

    #[test]
    fn deserialize_failure_leaves_lattice_untouched() {
        let mut lattice = europe();
        lattice.select_path("/Europe/UK").unwrap();
        let recorder = Recorder::attach(&mut lattice);
        let before = lattice.serialize().unwrap();
        let generation = lattice.generation();

        assert!(lattice.deserialize("<lattice><node/></lattice>").is_err());
        assert_eq!(lattice.serialize().unwrap(), before);
        assert_eq!(lattice.generation(), generation);
        assert_eq!(recorder.structure(), 0);
    }

    #[test]
    fn deserialize_replaces_everything() {
        let mut source = europe();
        source.select_path("/Europe/EU").unwrap();
        let xml = source.serialize().unwrap();

        let mut target = Lattice::new();
        target.add_node_at_path("/Other").unwrap();
        target.deserialize(&xml).unwrap();

        assert!(target.find_node("/Other").is_none());
        assert_eq!(target.selection(), source.selection());
        assert_eq!(target.graph(), source.graph());
    }

    #[test]
    fn merge_from_lattice_and_string() {
        let mut a = Lattice::new();
        a.add_node_at_path("/base/blk-1").unwrap();
        let mut b = Lattice::new();
        b.add_node_at_path("/base/blk-2").unwrap();
        b.select_path("/base/blk-2").unwrap();

        let summary = a.merge(&b).unwrap();
        assert_eq!(summary.nodes_added, 1);
        assert_eq!(summary.preferences_adopted, 1);

        let mut c = Lattice::new();
        let summary = c.merge_str(&a.serialize().unwrap()).unwrap();
        assert_eq!(summary.nodes_added, 3);
        assert_eq!(c.selection(), a.selection());
    }

    #[test]
    fn deep_copy_is_independent() {
        let mut source = europe();
        let mut copy = Lattice::new();
        copy.deep_copy(&source);
        source.select_path("/Europe").unwrap();

        assert!(copy.selection().is_empty());
        assert_eq!(copy.len(), source.len());

        let cloned = source.clone();
        source.add_node_at_path("/Extra").unwrap();
        assert!(cloned.find_node("/Extra").is_none());
    }

    #[test]
    fn initialize_resets_to_root() {
        let mut lattice = europe();
        lattice.select_path("/Europe").unwrap();
        lattice.initialize();
        assert_eq!(lattice.len(), 1);
        assert!(lattice.selection().is_empty());
    }

    #[test]
    fn generation_tracks_changes() {
        let mut lattice = Lattice::new();
        let g0 = lattice.generation();
        lattice.add_node_at_path("/a").unwrap();
        let g1 = lattice.generation();
        assert!(g1 > g0);
        lattice.add_node_at_path("/a").unwrap();
        assert_eq!(lattice.generation(), g1);
        lattice.select_path("/a").unwrap();
        assert!(lattice.generation() > g1);
    }
}
