//! gatescope: interactive graph viewer for flow-cytometry gating hierarchies
//!
//! Reads a gating tree from a gates CSV (or a FlowJo .wsp workspace),
//! builds the Cytoscape node/edge element list, writes it as JSON, and can
//! serve an interactive browser viewer.

use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;

mod config;
mod elements;
mod filter;
mod output;
#[cfg(feature = "serve")]
mod serve;
mod sources;
mod styles;

use crate::config::ViewerConfig;
use crate::output::ElementSet;

/// Visualize flow-cytometry gating hierarchies as interactive graphs
#[derive(Parser, Debug)]
#[command(name = "gatescope")]
#[command(version)]
#[command(about = "Render a gating tree as an interactive node-link diagram")]
struct Args {
    /// Input gating tree: gates CSV or FlowJo workspace (.wsp)
    #[arg(short, long)]
    input: PathBuf,

    /// Output JSON file with Cytoscape elements
    #[arg(short, long, default_value = "elements.json")]
    output: PathBuf,

    /// Use compact JSON (no pretty-printing, smaller file size)
    #[arg(long)]
    compact: bool,

    /// Compress output with gzip (.json.gz)
    #[arg(long)]
    gzip: bool,

    /// Viewer configuration YAML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start a web server with the interactive viewer
    #[cfg(feature = "serve")]
    #[arg(long)]
    serve: bool,

    /// Port for the web server (default: 8765, or the config file's port)
    #[cfg(feature = "serve")]
    #[arg(long)]
    port: Option<u16>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    info!("gatescope v{}", env!("CARGO_PKG_VERSION"));

    let viewer_config = match &args.config {
        Some(path) => ViewerConfig::from_yaml(path)?,
        None => ViewerConfig::default(),
    };

    let set = ElementSet::load(&args.input)?;

    // Auto-detect gzip from output extension
    let use_gzip = args.gzip || args.output.extension().map(|e| e == "gz").unwrap_or(false);
    output::write_elements(&set, &args.output, args.compact, use_gzip)?;

    #[cfg(feature = "serve")]
    if args.serve {
        let port = args.port.or(viewer_config.port).unwrap_or(8765);
        serve::start_server(&set, &viewer_config, port)?;
    }

    #[cfg(not(feature = "serve"))]
    let _ = viewer_config;

    Ok(())
}
