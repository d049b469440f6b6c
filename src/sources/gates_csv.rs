//! Gates CSV source.
//!
//! Format: CSV with required `node` and `parent` columns plus optional
//! display columns. The `parent` reference is path-like
//! (`Lymphocytes/CD3+`), already encoding the full ancestor chain; a blank
//! or missing parent means the root.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

use super::{GateSource, NormalizedGate, SchemaError, REQUIRED_COLUMNS};

/// Optional display columns, carried through unvalidated. A column missing
/// from the source is synthesized as absent on every row.
const OPTIONAL_COLUMNS: [&str; 7] = [
    "panel",
    "primary_markers",
    "Biological role",
    "X marker description",
    "Y marker description",
    "node_size",
    "node_colour",
];

pub struct GatesCsvSource;

impl GateSource for GatesCsvSource {
    fn format_name(&self) -> &str {
        "gates_csv"
    }

    fn can_parse(&self, path: &Path) -> bool {
        if path.extension().map(|e| e == "csv").unwrap_or(false) {
            return true;
        }
        let Ok(content) = std::fs::read_to_string(path) else { return false };
        let first_line = content.lines().next().unwrap_or("");
        let fields: Vec<&str> = first_line.split(',').map(str::trim).collect();
        REQUIRED_COLUMNS.iter().all(|c| fields.contains(c))
    }

    fn parse(&self, path: &Path) -> Result<Vec<NormalizedGate>> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open gates CSV: {}", path.display()))?;

        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| column(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns(missing).into());
        }

        // Unwraps cannot fail past the missing-column check above
        let node_idx = column("node").unwrap();
        let parent_idx = column("parent").unwrap();
        let optional_idx: Vec<Option<usize>> =
            OPTIONAL_COLUMNS.iter().map(|c| column(c)).collect();

        let mut seen: HashSet<String> = HashSet::new();
        let mut gates = Vec::new();
        let mut dropped = 0usize;

        for record in reader.records() {
            let record = record?;

            let node = record.get(node_idx).unwrap_or("").to_string();
            let parent = resolve_parent(record.get(parent_idx).unwrap_or(""));

            // The parent field already encodes the ancestor path; id is one
            // level of concatenation, never a recursive resolution.
            let id = if parent == "root" {
                format!("root/{}", node)
            } else {
                format!("{}/{}", parent, node)
            };

            // First occurrence wins; later collisions are silently dropped
            if !seen.insert(id.clone()) {
                dropped += 1;
                continue;
            }

            let parent_id = if parent == "root" { None } else { Some(parent) };

            let field = |idx: Option<usize>| {
                idx.and_then(|i| record.get(i))
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            };

            gates.push(NormalizedGate {
                id,
                parent_id,
                label: node,
                panel: field(optional_idx[0]),
                primary_markers: field(optional_idx[1]),
                biological_role: field(optional_idx[2]),
                x_marker_desc: field(optional_idx[3]),
                y_marker_desc: field(optional_idx[4]),
                node_size: field(optional_idx[5]),
                node_colour: field(optional_idx[6]),
            });
        }

        if dropped > 0 {
            log::debug!("Dropped {} rows with duplicate gate ids", dropped);
        }
        log::info!("Parsed {} gates from {}", gates.len(), path.display());
        Ok(gates)
    }
}

/// Blank or whitespace-only parents mean the root sentinel; whitespace
/// around path separators is human noise ("A / B" == "A/B").
fn resolve_parent(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "root".to_string();
    }
    trimmed
        .split('/')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("/")
}
