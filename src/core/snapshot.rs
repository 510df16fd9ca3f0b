//! core::snapshot
//!
//! Textual snapshots of a lattice and merging.
//!
//! # Format
//!
//! ```xml
//! <lattice version="1">
//!   <node id="1" name="Europe" state="1" links="4">
//!     <node id="2" name="UK"/>
//!   </node>
//! </lattice>
//! ```
//!
//! - The document element stands for the root and may carry `state` and `links`
//! - `id` and `name` are required on every `node`; ids must be dense `0..n`
//! - `state` is `1` (selected) or `0` (deselected); absent means no preference
//! - `links` lists cross-link target ids separated by spaces
//! - Children appear in insertion order, so output is deterministic
//!
//! Reading never touches an existing lattice: a complete graph is assembled
//! first and only swapped in by the caller on success.

use super::graph::{Node, NodeGraph};
use super::lattice::{check_capacity, LatticeError};
use super::types::{NodeId, NodeName, Preference};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeSet;
use thiserror::Error;

/// Document element name.
pub const ROOT_ELEMENT: &str = "lattice";

/// Element name of every non-root node.
pub const NODE_ELEMENT: &str = "node";

/// Current format version.
pub const FORMAT_VERSION: &str = "1";

/// Errors from snapshot operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("malformed snapshot XML: {0}")]
    Xml(String),

    #[error("invalid snapshot: {0}")]
    Invalid(String),

    #[error("unsupported snapshot version '{0}', supported: {FORMAT_VERSION}")]
    UnsupportedVersion(String),

    #[error("failed to write snapshot: {0}")]
    Write(String),

    #[error(transparent)]
    Lattice(#[from] LatticeError),
}

/// Counts reported by a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Nodes created in the target
    pub nodes_added: usize,
    /// Cross-links created in the target
    pub links_added: usize,
    /// Preferences copied onto target nodes that had none
    pub preferences_adopted: usize,
}

impl MergeSummary {
    /// True when the merge changed nothing.
    pub fn is_empty(&self) -> bool {
        *self == MergeSummary::default()
    }
}

/// Merge result including the nodes whose preference was adopted.
#[derive(Debug, Clone, Default)]
pub(crate) struct MergeOutcome {
    pub(crate) summary: MergeSummary,
    pub(crate) adopted: Vec<NodeId>,
}

// ============================================================================
// Writing
// ============================================================================

/// Encode `graph` as a snapshot. `indent` is spaces per level (0 for one line).
pub fn write_snapshot(graph: &NodeGraph, indent: usize) -> Result<String, SnapshotError> {
    let mut writer = if indent == 0 {
        Writer::new(Vec::new())
    } else {
        Writer::new_with_indent(Vec::new(), b' ', indent)
    };

    let mut root = BytesStart::new(ROOT_ELEMENT);
    root.push_attribute(("version", FORMAT_VERSION));
    push_selection_attributes(&mut root, graph, NodeId::ROOT);
    write_tree(&mut writer, graph, root)?;

    String::from_utf8(writer.into_inner()).map_err(|e| SnapshotError::Write(e.to_string()))
}

fn push_selection_attributes(elem: &mut BytesStart<'_>, graph: &NodeGraph, id: NodeId) {
    if let Some(preference) = graph.preference(id) {
        elem.push_attribute(("state", state_value(preference)));
    }
    let links: Vec<String> = graph.cross_links(id).map(|l| l.to_string()).collect();
    if !links.is_empty() {
        elem.push_attribute(("links", links.join(" ").as_str()));
    }
}

/// Write `root` and everything below it.
///
/// Iterative so that arbitrarily deep chains cannot exhaust the stack.
fn write_tree(
    writer: &mut Writer<Vec<u8>>,
    graph: &NodeGraph,
    root: BytesStart<'_>,
) -> Result<(), SnapshotError> {
    if graph.children(NodeId::ROOT).is_empty() {
        return emit(writer, Event::Empty(root));
    }
    emit(writer, Event::Start(root))?;

    // (open element, index of its next child to write)
    let mut open: Vec<(NodeId, usize)> = vec![(NodeId::ROOT, 0)];
    while let Some((id, cursor)) = open.last_mut() {
        let Some(&child) = graph.children(*id).get(*cursor) else {
            let tag = if id.is_root() { ROOT_ELEMENT } else { NODE_ELEMENT };
            open.pop();
            emit(writer, Event::End(BytesEnd::new(tag)))?;
            continue;
        };
        *cursor += 1;

        let mut node = BytesStart::new(NODE_ELEMENT);
        node.push_attribute(("id", child.to_string().as_str()));
        node.push_attribute(("name", graph.name(child).unwrap_or_default()));
        push_selection_attributes(&mut node, graph, child);
        if graph.children(child).is_empty() {
            emit(writer, Event::Empty(node))?;
        } else {
            emit(writer, Event::Start(node))?;
            open.push((child, 0));
        }
    }
    Ok(())
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), SnapshotError> {
    writer
        .write_event(event)
        .map_err(|e| SnapshotError::Write(e.to_string()))
}

fn state_value(preference: Preference) -> &'static str {
    match preference {
        Preference::Selected => "1",
        Preference::Deselected => "0",
    }
}

// ============================================================================
// Reading
// ============================================================================

/// One element of the document, in document order.
#[derive(Debug)]
struct Record {
    id: NodeId,
    parent: Option<NodeId>,
    name: Option<NodeName>,
    preference: Option<Preference>,
    links: Vec<NodeId>,
}

/// Decode a snapshot into a fresh graph.
///
/// # Errors
///
/// Returns an error for malformed XML, unknown elements or attributes,
/// missing, duplicate or out-of-range ids, dangling cross-links, an
/// unsupported version, or more nodes than `max_nodes`.
pub fn read_snapshot(text: &str, max_nodes: Option<usize>) -> Result<NodeGraph, SnapshotError> {
    let mut reader = Reader::from_str(text);
    let mut records: Vec<Record> = Vec::new();
    let mut open: Vec<NodeId> = Vec::new();
    let mut root_done = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| SnapshotError::Xml(e.to_string()))?;
        match event {
            Event::Start(e) => {
                let id = open_element(&e, &open, root_done, &mut records)?;
                open.push(id);
            }
            Event::Empty(e) => {
                open_element(&e, &open, root_done, &mut records)?;
                root_done |= open.is_empty();
            }
            Event::End(_) => {
                open.pop();
                root_done |= open.is_empty();
            }
            Event::Text(t) => {
                if !t.iter().all(u8::is_ascii_whitespace) {
                    return Err(SnapshotError::Invalid("unexpected text content".into()));
                }
            }
            Event::CData(_) => {
                return Err(SnapshotError::Invalid("unexpected CDATA section".into()));
            }
            Event::Eof => break,
            // declarations, comments, processing instructions, doctype
            _ => {}
        }
    }

    if !root_done {
        return Err(SnapshotError::Invalid(format!(
            "missing or unterminated <{ROOT_ELEMENT}> element"
        )));
    }

    assemble(records, max_nodes)
}

fn open_element(
    elem: &BytesStart<'_>,
    open: &[NodeId],
    root_done: bool,
    records: &mut Vec<Record>,
) -> Result<NodeId, SnapshotError> {
    let tag = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
    let parent = open.last().copied();
    let is_root = parent.is_none();

    if is_root && (root_done || !records.is_empty()) {
        return Err(SnapshotError::Invalid(format!(
            "unexpected element <{tag}> after the document element"
        )));
    }
    let expected = if is_root { ROOT_ELEMENT } else { NODE_ELEMENT };
    if tag != expected {
        return Err(SnapshotError::Invalid(format!(
            "unexpected element <{tag}>, expected <{expected}>"
        )));
    }

    let mut id = None;
    let mut name = None;
    let mut preference = None;
    let mut links = Vec::new();

    for attr in elem.attributes() {
        let attr = attr.map_err(|e| SnapshotError::Xml(e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| SnapshotError::Xml(e.to_string()))?;
        match (attr.key.as_ref(), is_root) {
            (b"version", true) => {
                if value != FORMAT_VERSION {
                    return Err(SnapshotError::UnsupportedVersion(value.into_owned()));
                }
            }
            (b"id", false) => id = Some(parse_id(&value)?),
            (b"name", false) => {
                name = Some(
                    NodeName::new(value.into_owned())
                        .map_err(|e| SnapshotError::Invalid(e.to_string()))?,
                )
            }
            (b"state", _) => preference = Some(parse_state(&value)?),
            (b"links", _) => links = parse_links(&value)?,
            (key, _) => {
                return Err(SnapshotError::Invalid(format!(
                    "unknown attribute '{}' on <{tag}>",
                    String::from_utf8_lossy(key)
                )))
            }
        }
    }

    let id = match (is_root, id) {
        (true, _) => NodeId::ROOT,
        (false, Some(id)) => id,
        (false, None) => {
            return Err(SnapshotError::Invalid("node without 'id' attribute".into()))
        }
    };
    if !is_root && name.is_none() {
        return Err(SnapshotError::Invalid(format!(
            "node {id} without 'name' attribute"
        )));
    }

    records.push(Record {
        id,
        parent,
        name,
        preference,
        links,
    });
    Ok(id)
}

fn parse_id(value: &str) -> Result<NodeId, SnapshotError> {
    value
        .parse::<NodeId>()
        .map_err(|e| SnapshotError::Invalid(e.to_string()))
}

fn parse_state(value: &str) -> Result<Preference, SnapshotError> {
    match value {
        "1" => Ok(Preference::Selected),
        "0" => Ok(Preference::Deselected),
        other => Err(SnapshotError::Invalid(format!(
            "invalid state '{other}', expected 0 or 1"
        ))),
    }
}

fn parse_links(value: &str) -> Result<Vec<NodeId>, SnapshotError> {
    value.split_whitespace().map(parse_id).collect()
}

fn assemble(records: Vec<Record>, max_nodes: Option<usize>) -> Result<NodeGraph, SnapshotError> {
    let count = records.len();
    if let Some(limit) = max_nodes {
        if count > limit {
            return Err(LatticeError::CapacityExceeded { limit }.into());
        }
    }

    let mut slots: Vec<Option<Node>> = vec![None; count];
    for record in records {
        let index = record.id.index();
        if index >= count {
            return Err(SnapshotError::Invalid(format!(
                "node id {} out of range for {count} nodes",
                record.id
            )));
        }
        if slots[index].is_some() {
            return Err(SnapshotError::Invalid(format!(
                "duplicate node id {}",
                record.id
            )));
        }
        if let Some(bad) = record.links.iter().find(|l| l.index() >= count) {
            return Err(SnapshotError::Invalid(format!(
                "node {} links to unknown node {bad}",
                record.id
            )));
        }

        // Parents precede children in document order.
        if let Some(parent) = record.parent {
            match slots.get_mut(parent.index()).and_then(Option::as_mut) {
                Some(node) => node.children.push(record.id),
                None => {
                    return Err(SnapshotError::Invalid(format!(
                        "node {} has no parent in the document",
                        record.id
                    )))
                }
            }
        }

        slots[index] = Some(Node {
            name: record.name,
            parent: record.parent,
            children: Vec::new(),
            cross_links: record.links.into_iter().collect::<BTreeSet<_>>(),
            preference: record.preference,
        });
    }

    let nodes = slots
        .into_iter()
        .map(|slot| slot.ok_or_else(|| SnapshotError::Invalid("missing node id".into())))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(NodeGraph::from_nodes(nodes))
}

// ============================================================================
// Merging
// ============================================================================

/// Merge `source` into `target` by path equality.
///
/// Nodes absent from `target` are created (in `source` pre-order), cross-links
/// are copied edge by edge, and preferences are adopted only for target nodes
/// without one. Existing nodes, edges and preferences are left untouched.
/// On error `target` is unchanged.
pub(crate) fn merge_graph(
    target: &mut NodeGraph,
    source: &NodeGraph,
    max_nodes: Option<usize>,
) -> Result<MergeOutcome, LatticeError> {
    let mut staged = target.clone();
    let mut mapping: Vec<Option<NodeId>> = vec![None; source.len()];
    let mut outcome = MergeOutcome::default();

    for id in source.subtree(NodeId::ROOT) {
        let mapped = match source.parent(id) {
            None => NodeId::ROOT,
            Some(parent) => {
                let Some(parent) = mapping[parent.index()] else {
                    continue;
                };
                let name = source.name(id).unwrap_or_default();
                match staged.find_child(parent, name) {
                    Some(existing) => existing,
                    None => {
                        check_capacity(max_nodes, &staged)?;
                        let new = staged
                            .add_node(NodeName::new(name)?, parent)
                            .ok_or(LatticeError::UnknownNode(parent))?;
                        outcome.summary.nodes_added += 1;
                        new
                    }
                }
            }
        };
        mapping[id.index()] = Some(mapped);

        if staged.preference(mapped).is_none() {
            if let Some(preference) = source.preference(id) {
                staged.set_preference(mapped, Some(preference));
                outcome.adopted.push(mapped);
            }
        }
    }

    for src in source.ids() {
        for dst in source.cross_links(src) {
            if let (Some(Some(a)), Some(Some(b))) =
                (mapping.get(src.index()), mapping.get(dst.index()))
            {
                if staged.add_cross_link(*a, *b) == Some(true) {
                    outcome.summary.links_added += 1;
                }
            }
        }
    }

    outcome.summary.preferences_adopted = outcome.adopted.len();
    *target = staged;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> NodeName {
        NodeName::new(s).unwrap()
    }

    /// root -> Europe -> {UK, EU}, Europe selected, EU deselected, UK -> EU link
    fn europe() -> NodeGraph {
        let mut graph = NodeGraph::new();
        let europe = graph.add_node(name("Europe"), NodeId::ROOT).unwrap();
        let uk = graph.add_node(name("UK"), europe).unwrap();
        let eu = graph.add_node(name("EU"), europe).unwrap();
        graph.set_preference(europe, Some(Preference::Selected));
        graph.set_preference(eu, Some(Preference::Deselected));
        graph.add_cross_link(uk, eu);
        graph
    }

    #[test]
    fn writes_nested_elements() {
        let xml = write_snapshot(&europe(), 2).unwrap();
        assert!(xml.trim_start().starts_with("<lattice version=\"1\">"));
        assert!(xml.contains("<node id=\"1\" name=\"Europe\" state=\"1\">"));
        assert!(xml.contains("<node id=\"2\" name=\"UK\" links=\"3\"/>"));
        assert!(xml.contains("<node id=\"3\" name=\"EU\" state=\"0\"/>"));
        assert!(xml.trim_end().ends_with("</lattice>"));
    }

    #[test]
    fn empty_lattice_is_single_element() {
        let xml = write_snapshot(&NodeGraph::new(), 2).unwrap();
        assert_eq!(xml.trim(), "<lattice version=\"1\"/>");
    }

    #[test]
    fn output_is_deterministic() {
        let graph = europe();
        assert_eq!(
            write_snapshot(&graph, 2).unwrap(),
            write_snapshot(&graph, 2).unwrap()
        );
    }

    #[test]
    fn read_restores_identical_graph() {
        let graph = europe();
        for indent in [0, 2, 4] {
            let xml = write_snapshot(&graph, indent).unwrap();
            assert_eq!(read_snapshot(&xml, None).unwrap(), graph);
        }
    }

    #[test]
    fn names_are_escaped() {
        let mut graph = NodeGraph::new();
        graph
            .add_node(name("a<b & \"c\""), NodeId::ROOT)
            .unwrap();
        let xml = write_snapshot(&graph, 0).unwrap();
        assert!(!xml.contains("a<b"));
        assert_eq!(read_snapshot(&xml, None).unwrap(), graph);
    }

    #[test]
    fn root_preference_and_links_roundtrip() {
        let mut graph = europe();
        graph.set_preference(NodeId::ROOT, Some(Preference::Selected));
        graph.add_cross_link(NodeId::ROOT, NodeId::new(2));
        let xml = write_snapshot(&graph, 2).unwrap();
        assert!(xml.trim_start().starts_with("<lattice version=\"1\" state=\"1\" links=\"2\">"));
        assert_eq!(read_snapshot(&xml, None).unwrap(), graph);
    }

    #[test]
    fn accepts_declaration_and_comments() {
        let xml = r#"<?xml version="1.0"?>
            <!-- saved selection -->
            <lattice version="1">
              <node id="1" name="base"/>
            </lattice>"#;
        let graph = read_snapshot(xml, None).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.name(NodeId::new(1)), Some("base"));
    }

    #[test]
    fn rejects_malformed_input() {
        let cases = [
            "",
            "not xml at all",
            "<lattice version=\"1\">",
            "<lattice version=\"2\"/>",
            "<other/>",
            "<lattice><zone id=\"1\" name=\"a\"/></lattice>",
            "<lattice><node name=\"a\"/></lattice>",
            "<lattice><node id=\"1\"/></lattice>",
            "<lattice><node id=\"1\" name=\"a/b\"/></lattice>",
            "<lattice><node id=\"2\" name=\"a\"/></lattice>",
            "<lattice><node id=\"1\" name=\"a\"/><node id=\"1\" name=\"b\"/></lattice>",
            "<lattice><node id=\"1\" name=\"a\" state=\"yes\"/></lattice>",
            "<lattice><node id=\"1\" name=\"a\" links=\"9\"/></lattice>",
            "<lattice><node id=\"1\" name=\"a\" color=\"red\"/></lattice>",
            "<lattice><node id=\"1\" name=\"a\">text</node></lattice>",
            "<lattice/><lattice/>",
        ];
        for case in cases {
            assert!(read_snapshot(case, None).is_err(), "accepted: {case}");
        }
    }

    #[test]
    fn enforces_node_limit() {
        let xml = write_snapshot(&europe(), 0).unwrap();
        assert_eq!(
            read_snapshot(&xml, Some(3)),
            Err(SnapshotError::Lattice(LatticeError::CapacityExceeded {
                limit: 3
            }))
        );
        assert!(read_snapshot(&xml, Some(4)).is_ok());
    }

    #[test]
    fn merge_adds_missing_nodes_only() {
        let mut target = NodeGraph::new();
        let europe_t = target.add_node(name("Europe"), NodeId::ROOT).unwrap();
        target.add_node(name("UK"), europe_t).unwrap();

        let outcome = merge_graph(&mut target, &europe(), None).unwrap();
        assert_eq!(outcome.summary.nodes_added, 1);
        assert_eq!(outcome.summary.links_added, 1);
        assert_eq!(target.len(), 4);
        assert_eq!(target.find_child(europe_t, "EU"), Some(NodeId::new(3)));
    }

    #[test]
    fn merge_keeps_existing_preferences() {
        let mut target = NodeGraph::new();
        let europe_t = target.add_node(name("Europe"), NodeId::ROOT).unwrap();
        target.set_preference(europe_t, Some(Preference::Deselected));

        let outcome = merge_graph(&mut target, &europe(), None).unwrap();
        assert_eq!(target.preference(europe_t), Some(Preference::Deselected));
        // only EU's preference is new
        assert_eq!(outcome.summary.preferences_adopted, 1);
        assert_eq!(outcome.adopted.len(), 1);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut target = NodeGraph::new();
        let source = europe();
        merge_graph(&mut target, &source, None).unwrap();
        let again = merge_graph(&mut target, &source, None).unwrap();
        assert!(again.summary.is_empty());
        assert_eq!(target, source);
    }

    #[test]
    fn merge_over_limit_leaves_target_unchanged() {
        let mut target = NodeGraph::new();
        target.add_node(name("Other"), NodeId::ROOT).unwrap();
        let before = target.clone();

        let result = merge_graph(&mut target, &europe(), Some(3));
        assert_eq!(result.err(), Some(LatticeError::CapacityExceeded { limit: 3 }));
        assert_eq!(target, before);
    }

    #[test]
    fn very_deep_chain_round_trips() {
        let mut graph = NodeGraph::new();
        let mut current = NodeId::ROOT;
        for _ in 0..50_000 {
            current = graph.add_node(name("n"), current).unwrap();
        }
        graph.set_preference(current, Some(Preference::Selected));

        let xml = write_snapshot(&graph, 0).unwrap();
        assert!(xml.ends_with("</node></lattice>"));
        assert_eq!(read_snapshot(&xml, None).unwrap(), graph);
    }
}
