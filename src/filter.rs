//! Leaf detection and removal over a Cytoscape element list.
//!
//! A leaf is a node that is never an edge source in the current list.
//! Filtering is a single pass: hiding the current leaves can expose their
//! parents as new leaves, which only a subsequent call would remove. The
//! toggle flag that drives repeated calls lives with the UI, not here.

use std::collections::HashSet;

use crate::elements::Element;

/// Compute the leaf set of `elements` and return the reduced list (leaf
/// nodes and their incident edges removed) plus the sorted leaf ids.
///
/// When `keep_root` is set the literal id `root` is exempt from
/// leaf-hiding even when it has no children, which covers the
/// single-population tree. Pure: `elements` is never mutated.
pub fn filter_leaves(elements: &[Element], keep_root: bool) -> (Vec<Element>, Vec<String>) {
    let mut node_ids: HashSet<&str> = HashSet::new();
    let mut sources: HashSet<&str> = HashSet::new();

    for element in elements {
        match element {
            Element::Node(n) => {
                node_ids.insert(n.data.id.as_str());
            }
            Element::Edge(e) => {
                sources.insert(e.data.source.as_str());
            }
        }
    }

    let mut leaves: HashSet<&str> = node_ids.difference(&sources).copied().collect();
    if keep_root {
        leaves.remove("root");
    }

    // Kept nodes first, then kept edges, preserving builder order
    let mut reduced: Vec<Element> = Vec::with_capacity(elements.len());
    reduced.extend(
        elements
            .iter()
            .filter(|el| match el {
                Element::Node(n) => !leaves.contains(n.data.id.as_str()),
                Element::Edge(_) => false,
            })
            .cloned(),
    );
    reduced.extend(
        elements
            .iter()
            .filter(|el| match el {
                Element::Edge(e) => {
                    !leaves.contains(e.data.source.as_str())
                        && !leaves.contains(e.data.target.as_str())
                }
                Element::Node(_) => false,
            })
            .cloned(),
    );

    let mut leaf_ids: Vec<String> = leaves.into_iter().map(str::to_string).collect();
    leaf_ids.sort();

    (reduced, leaf_ids)
}
