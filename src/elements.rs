//! Cytoscape element construction from normalized gate rows.
//!
//! The serialized shapes here are the contract with the browser renderer
//! and the leaf filter: a node record is `{data: {...}, classes: "..."}`,
//! an edge record is `{data: {id, source, target}}`, and the discriminator
//! is the presence of a `source` field. Renaming any field breaks both
//! consumers.

use serde::{Deserialize, Serialize};

use crate::sources::NormalizedGate;

/// Display payload of a node element. Absent attributes serialize as
/// `null`; the renderer enumerates every key on every node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub id: String,
    pub label: String,
    pub panel: Option<String>,
    pub primary_markers: Option<String>,
    pub biological_role: Option<String>,
    pub x_marker_desc: Option<String>,
    pub y_marker_desc: Option<String>,
    pub node_size: Option<String>,
    pub node_colour: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeElement {
    pub data: NodeData,
    /// Space-separated style classes; empty when the row has no panel.
    pub classes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    pub id: String,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeElement {
    pub data: EdgeData,
}

/// A single graph element in the renderer's flat element list.
///
/// Untagged: `Edge` must be tried first on deserialization, since a node's
/// data lacks `source`/`target` and an edge's data lacks `label`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Element {
    Edge(EdgeElement),
    Node(NodeElement),
}

impl Element {
    pub fn id(&self) -> &str {
        match self {
            Element::Edge(e) => &e.data.id,
            Element::Node(n) => &n.data.id,
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self, Element::Node(_))
    }
}

/// Convert normalized rows into the flat element list: one node per row in
/// input order, then one edge per (parent, child) pair in input order.
pub fn build(rows: &[NormalizedGate]) -> Vec<Element> {
    let mut elements: Vec<Element> = rows
        .iter()
        .map(|row| Element::Node(node_element(row)))
        .collect();
    elements.extend(
        rows.iter()
            .filter_map(edge_element)
            .map(Element::Edge),
    );
    elements
}

fn node_element(row: &NormalizedGate) -> NodeElement {
    let classes = match &row.panel {
        Some(panel) if !panel.is_empty() => panel_class(panel),
        _ => String::new(),
    };

    NodeElement {
        data: NodeData {
            id: row.id.clone(),
            label: row.label.clone(),
            panel: row.panel.clone(),
            primary_markers: row.primary_markers.clone(),
            biological_role: row.biological_role.clone(),
            x_marker_desc: row.x_marker_desc.clone(),
            y_marker_desc: row.y_marker_desc.clone(),
            node_size: row.node_size.clone(),
            node_colour: row.node_colour.clone(),
        },
        classes,
    }
}

/// Edges exist only for rows with a parent; edge ids repeat only if a
/// (parent, child) pair repeats, which the normalizer's id uniqueness
/// rules out.
fn edge_element(row: &NormalizedGate) -> Option<EdgeElement> {
    let parent = row.parent_id.as_ref()?;
    Some(EdgeElement {
        data: EdgeData {
            id: format!("{}->{}", parent, row.id),
            source: parent.clone(),
            target: row.id.clone(),
        },
    })
}

/// Sanitized style class for a panel name: anything outside
/// `[A-Za-z0-9_-]` becomes `_`.
pub fn panel_class(panel: &str) -> String {
    let safe: String = panel
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("panel-{}", safe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodes_precede_edges() {
        let rows = vec![
            NormalizedGate::bare("root/A".to_string(), None, "A".to_string()),
            NormalizedGate::bare(
                "root/A/B".to_string(),
                Some("root/A".to_string()),
                "B".to_string(),
            ),
        ];
        let elements = build(&rows);

        assert_eq!(elements.len(), 3);
        assert!(elements[0].is_node());
        assert!(elements[1].is_node());
        match &elements[2] {
            Element::Edge(e) => {
                assert_eq!(e.data.id, "root/A->root/A/B");
                assert_eq!(e.data.source, "root/A");
                assert_eq!(e.data.target, "root/A/B");
            }
            other => panic!("expected edge, got {:?}", other),
        }
    }

    #[test]
    fn test_no_edge_for_root_children() {
        let rows = vec![NormalizedGate::bare("root/A".to_string(), None, "A".to_string())];
        let elements = build(&rows);

        assert_eq!(elements.len(), 1);
        assert!(elements[0].is_node());
    }

    #[test]
    fn test_panel_class_sanitized() {
        assert_eq!(panel_class("Tv2"), "panel-Tv2");
        assert_eq!(panel_class("Tv2 panel/β"), "panel-Tv2_panel__");
        assert_eq!(panel_class("a_b-c"), "panel-a_b-c");
    }

    #[test]
    fn test_classes_from_panel() {
        let mut row = NormalizedGate::bare("root/A".to_string(), None, "A".to_string());
        row.panel = Some("Tv2".to_string());
        let elements = build(&[row]);

        match &elements[0] {
            Element::Node(n) => assert_eq!(n.classes, "panel-Tv2"),
            other => panic!("expected node, got {:?}", other),
        }
    }

    #[test]
    fn test_serialized_shape_matches_renderer_contract() {
        let rows = vec![
            NormalizedGate::bare("root/A".to_string(), None, "A".to_string()),
            NormalizedGate::bare(
                "root/A/B".to_string(),
                Some("root/A".to_string()),
                "B".to_string(),
            ),
        ];
        let elements = build(&rows);

        let node = serde_json::to_value(&elements[0]).unwrap();
        assert_eq!(node["data"]["id"], "root/A");
        assert_eq!(node["data"]["label"], "A");
        assert!(node["data"]["panel"].is_null());
        assert_eq!(node["classes"], "");
        assert!(node["data"].get("source").is_none());

        let edge = serde_json::to_value(&elements[2]).unwrap();
        assert_eq!(edge["data"]["source"], "root/A");
        assert_eq!(edge["data"]["target"], "root/A/B");
        assert!(edge.get("classes").is_none());
    }

    #[test]
    fn test_untagged_round_trip() {
        let rows = vec![
            NormalizedGate::bare("root/A".to_string(), None, "A".to_string()),
            NormalizedGate::bare(
                "root/A/B".to_string(),
                Some("root/A".to_string()),
                "B".to_string(),
            ),
        ];
        let elements = build(&rows);

        let json = serde_json::to_string(&elements).unwrap();
        let parsed: Vec<Element> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, elements);
    }
}
