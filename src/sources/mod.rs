//! Input adapters for gating-tree sources.
//!
//! Two independent ingestion paths produce the same normalized row shape:
//! the gates CSV (one row per population with a path-like parent reference)
//! and the FlowJo `.wsp` workspace XML. Each lives behind the [`GateSource`]
//! trait and is selected automatically by [`load_gates()`] based on
//! [`can_parse()`].
//!
//! [`can_parse()`]: GateSource::can_parse

mod flowjo_wsp;
mod gates_csv;

use std::path::Path;

use thiserror::Error;

pub use flowjo_wsp::FlowJoWspSource;
pub use gates_csv::GatesCsvSource;

/// Columns every gates table must carry.
pub const REQUIRED_COLUMNS: [&str; 2] = ["node", "parent"];

/// Fatal input-schema problems, surfaced at load time with no partial load.
///
/// This is the only input validation performed: malformed individual values
/// (non-numeric sizes, unknown colours, empty labels) pass through untouched
/// and are the renderer's problem.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The gates table lacks one or more required columns.
    #[error("gates table is missing required columns: {0:?}")]
    MissingColumns(Vec<String>),
    /// The workspace XML contains no gating groups.
    #[error("workspace contains no gating groups")]
    EmptyWorkspace,
}

/// One gating population, keyed by its full path from the root.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedGate {
    /// Full path from the root. Unique across the normalized set
    /// (first occurrence wins on collision).
    pub id: String,
    /// Parent's full path; `None` only for children of the root sentinel.
    pub parent_id: Option<String>,
    /// Display name shown on the rendered node.
    pub label: String,
    // Display attributes, pass-through and unvalidated. Absent means the
    // source column was missing or the field was empty.
    pub panel: Option<String>,
    pub primary_markers: Option<String>,
    pub biological_role: Option<String>,
    pub x_marker_desc: Option<String>,
    pub y_marker_desc: Option<String>,
    pub node_size: Option<String>,
    pub node_colour: Option<String>,
}

impl NormalizedGate {
    /// Row with no display metadata (workspace sources carry none).
    pub fn bare(id: String, parent_id: Option<String>, label: String) -> Self {
        NormalizedGate {
            id,
            parent_id,
            label,
            panel: None,
            primary_markers: None,
            biological_role: None,
            x_marker_desc: None,
            y_marker_desc: None,
            node_size: None,
            node_colour: None,
        }
    }
}

/// Trait for parsing one gating-tree source format.
///
/// Each implementation handles one file format and is selected automatically
/// via [`load_gates()`] based on [`can_parse()`](GateSource::can_parse).
pub trait GateSource {
    /// Human-readable name of the format (e.g., "gates_csv").
    fn format_name(&self) -> &str;

    /// Check if this source can handle the given file (peek at header/content).
    fn can_parse(&self, path: &Path) -> bool;

    /// Parse the file into normalized gate rows.
    fn parse(&self, path: &Path) -> anyhow::Result<Vec<NormalizedGate>>;
}

fn all_sources() -> Vec<Box<dyn GateSource>> {
    vec![Box::new(GatesCsvSource), Box::new(FlowJoWspSource)]
}

/// Try all registered sources and parse with the first that matches.
pub fn load_gates(path: &Path) -> anyhow::Result<Vec<NormalizedGate>> {
    for source in all_sources() {
        if source.can_parse(path) {
            log::info!("Detected gating source format: {}", source.format_name());
            return source.parse(path);
        }
    }
    anyhow::bail!("No source adapter found for gating file: {}", path.display())
}
