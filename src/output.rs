//! Element list persistence.

use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::elements::{self, Element};
use crate::sources;

/// The authoritative element list, computed once at load time.
///
/// Derived views (the pruned list served on toggle) are recomputed from
/// `elements` on demand and never written back; after construction this is
/// read-only.
#[derive(Debug, Clone)]
pub struct ElementSet {
    /// Source file the elements were built from
    pub source: PathBuf,
    /// Flat node/edge list in renderer order
    pub elements: Vec<Element>,
}

impl ElementSet {
    /// Load a gating source and build the element list. This is the
    /// explicit initialization call; lifecycle belongs to the caller.
    pub fn load(path: &Path) -> Result<Self> {
        let gates = sources::load_gates(path)?;
        let elements = elements::build(&gates);

        let nodes = elements.iter().filter(|el| el.is_node()).count();
        log::info!(
            "Built {} elements ({} nodes, {} edges) from {}",
            elements.len(),
            nodes,
            elements.len() - nodes,
            path.display()
        );

        Ok(ElementSet {
            source: path.to_path_buf(),
            elements,
        })
    }
}

/// Write the element list as JSON, optionally gzipped. Returns the path
/// actually written (a `.json.gz` extension is appended when compressing).
pub fn write_elements(
    set: &ElementSet,
    path: &Path,
    compact: bool,
    gzip: bool,
) -> Result<PathBuf> {
    let output_path = if gzip && !path.extension().map(|e| e == "gz").unwrap_or(false) {
        path.with_extension("json.gz")
    } else {
        path.to_path_buf()
    };

    let file = File::create(&output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;

    if gzip {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        write_json(&set.elements, &mut encoder, compact)?;
        encoder.finish()?;
    } else {
        write_json(&set.elements, BufWriter::new(file), compact)?;
    }

    log::info!("Elements written to: {}", output_path.display());
    Ok(output_path)
}

fn write_json<W: Write>(elements: &[Element], writer: W, compact: bool) -> Result<()> {
    if compact {
        serde_json::to_writer(writer, elements)?;
    } else {
        serde_json::to_writer_pretty(writer, elements)?;
    }
    Ok(())
}
