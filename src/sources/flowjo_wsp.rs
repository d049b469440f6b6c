//! FlowJo workspace source.
//!
//! Extracts per-group gating trees from a `.wsp` workspace XML. Gate
//! identifiers use the workspace scheme: underscore-joined path segments
//! anchored at the literal `root` gate (e.g. `root_Lymphocytes_CD3+`),
//! with the last segment as the display label. Workspaces carry no display
//! metadata, so those attributes stay absent.

use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashSet;
use std::path::Path;

use super::{GateSource, NormalizedGate, SchemaError};

pub struct FlowJoWspSource;

impl GateSource for FlowJoWspSource {
    fn format_name(&self) -> &str {
        "flowjo_wsp"
    }

    fn can_parse(&self, path: &Path) -> bool {
        if path.extension().map(|e| e == "wsp").unwrap_or(false) {
            return true;
        }
        let Ok(content) = std::fs::read_to_string(path) else { return false };
        content.trim_start().starts_with("<?xml") && content.contains("<Workspace")
    }

    fn parse(&self, path: &Path) -> Result<Vec<NormalizedGate>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read workspace: {}", path.display()))?;
        let groups = extract_group_paths(&content)?;
        gates_from_groups(&groups)
    }
}

/// Walk the workspace XML and collect, per analysis group, the nested
/// population paths in document order. Every `<Population>` under a
/// `<GroupNode>` contributes its full path; elements outside groups
/// (per-sample gating) are ignored.
fn extract_group_paths(xml: &str) -> Result<Vec<(String, Vec<Vec<String>>)>> {
    let mut reader = Reader::from_str(xml);

    let mut groups: Vec<(String, Vec<Vec<String>>)> = Vec::new();
    let mut group_depth = 0usize;
    let mut path: Vec<String> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .with_context(|| "Malformed workspace XML")?;
        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"GroupNode" => {
                    let name = attr(&e, "name")?
                        .unwrap_or_else(|| format!("group-{}", groups.len() + 1));
                    groups.push((name, Vec::new()));
                    group_depth += 1;
                    path.clear();
                }
                b"Population" if group_depth > 0 => {
                    path.push(attr(&e, "name")?.unwrap_or_default());
                    if let Some((_, paths)) = groups.last_mut() {
                        paths.push(path.clone());
                    }
                }
                _ => {}
            },
            Event::Empty(e) => {
                // Self-closing population: a childless gate
                if e.local_name().as_ref() == b"Population" && group_depth > 0 {
                    let mut full = path.clone();
                    full.push(attr(&e, "name")?.unwrap_or_default());
                    if let Some((_, paths)) = groups.last_mut() {
                        paths.push(full);
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"GroupNode" => {
                    group_depth = group_depth.saturating_sub(1);
                    path.clear();
                }
                b"Population" if group_depth > 0 => {
                    path.pop();
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(groups)
}

fn attr(e: &BytesStart, name: &str) -> Result<Option<String>> {
    Ok(match e.try_get_attribute(name)? {
        Some(a) => Some(a.unescape_value()?.into_owned()),
        None => None,
    })
}

/// Convert the per-group paths into normalized rows with underscore-joined
/// ids, de-duplicated across groups (first occurrence wins, matching the
/// CSV path's uniqueness invariant).
fn gates_from_groups(groups: &[(String, Vec<Vec<String>>)]) -> Result<Vec<NormalizedGate>> {
    if groups.is_empty() {
        return Err(SchemaError::EmptyWorkspace.into());
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut gates = Vec::new();

    // Every group's tree is anchored at the literal root gate
    seen.insert("root".to_string());
    gates.push(NormalizedGate::bare("root".to_string(), None, "root".to_string()));

    for (group, paths) in groups {
        log::debug!("Group '{}': {} gate paths", group, paths.len());
        for segments in paths {
            let mut parts: Vec<String> = vec!["root".to_string()];
            parts.extend(
                segments
                    .iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
            );
            if parts.len() < 2 {
                continue;
            }

            let id = parts.join("_");
            if !seen.insert(id.clone()) {
                continue;
            }

            let parent_id = parts[..parts.len() - 1].join("_");
            let label = parts[parts.len() - 1].clone();
            gates.push(NormalizedGate::bare(id, Some(parent_id), label));
        }
    }

    log::info!("Parsed {} gates from {} workspace groups", gates.len(), groups.len());
    Ok(gates)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_WSP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Workspace version="20.0">
  <Groups>
    <GroupNode name="All Samples">
      <Group name="All Samples"/>
      <Subpopulations>
        <Population name="Lymphocytes">
          <Gate/>
          <Subpopulations>
            <Population name="CD3+">
              <Gate/>
            </Population>
            <Population name="CD19+"/>
          </Subpopulations>
        </Population>
      </Subpopulations>
    </GroupNode>
    <GroupNode name="Compensation">
      <Subpopulations>
        <Population name="Lymphocytes"/>
      </Subpopulations>
    </GroupNode>
  </Groups>
</Workspace>"#;

    #[test]
    fn test_extract_group_paths() {
        let groups = extract_group_paths(SAMPLE_WSP).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "All Samples");
        assert_eq!(
            groups[0].1,
            vec![
                vec!["Lymphocytes".to_string()],
                vec!["Lymphocytes".to_string(), "CD3+".to_string()],
                vec!["Lymphocytes".to_string(), "CD19+".to_string()],
            ]
        );
        assert_eq!(groups[1].1, vec![vec!["Lymphocytes".to_string()]]);
    }

    #[test]
    fn test_underscore_ids_rooted_at_root() {
        let groups = extract_group_paths(SAMPLE_WSP).unwrap();
        let gates = gates_from_groups(&groups).unwrap();

        let ids: Vec<&str> = gates.iter().map(|g| g.id.as_str()).collect();
        // Duplicate Lymphocytes from the second group is dropped
        assert_eq!(
            ids,
            vec![
                "root",
                "root_Lymphocytes",
                "root_Lymphocytes_CD3+",
                "root_Lymphocytes_CD19+",
            ]
        );

        assert_eq!(gates[0].parent_id, None);
        assert_eq!(gates[1].parent_id, Some("root".to_string()));
        assert_eq!(gates[2].parent_id, Some("root_Lymphocytes".to_string()));
        assert_eq!(gates[2].label, "CD3+");
        assert_eq!(gates[2].panel, None);
    }

    #[test]
    fn test_workspace_without_groups_is_schema_error() {
        let groups = extract_group_paths("<Workspace><SampleList/></Workspace>").unwrap();
        let err = gates_from_groups(&groups).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SchemaError>(),
            Some(SchemaError::EmptyWorkspace)
        ));
    }

    #[test]
    fn test_segment_whitespace_trimmed() {
        let groups = vec![(
            "g".to_string(),
            vec![
                vec![" Lymphocytes ".to_string()],
                vec![" Lymphocytes ".to_string(), " CD3+ ".to_string()],
            ],
        )];
        let gates = gates_from_groups(&groups).unwrap();

        assert_eq!(gates[2].id, "root_Lymphocytes_CD3+");
        assert_eq!(gates[2].label, "CD3+");
    }
}
