//! Viewer configuration
//!
//! Optional YAML configuration for the interactive viewer. Everything
//! defaults, so running without a config file is the common case.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Viewer settings loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Initial Cytoscape layout: "cose" or "breadthfirst"
    #[serde(default = "default_layout")]
    pub layout: String,

    /// Start with leaf populations hidden
    #[serde(default)]
    pub hide_leaves: bool,

    /// Port for the web server (the --port flag wins)
    #[serde(default)]
    pub port: Option<u16>,

    /// Panel name -> node colour overrides merged into the stylesheet
    #[serde(default)]
    pub panel_colours: HashMap<String, String>,
}

fn default_layout() -> String {
    "cose".to_string()
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            layout: default_layout(),
            hide_leaves: false,
            port: None,
            panel_colours: HashMap::new(),
        }
    }
}

impl ViewerConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ViewerConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml() {
        let yaml = r##"
layout: breadthfirst
hide_leaves: true

panel_colours:
  Tv2: "#1f4f7f"
"##;
        let config: ViewerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.layout, "breadthfirst");
        assert!(config.hide_leaves);
        assert_eq!(config.port, None);
        assert_eq!(config.panel_colours.get("Tv2"), Some(&"#1f4f7f".to_string()));
    }

    #[test]
    fn test_defaults() {
        let config: ViewerConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.layout, "cose");
        assert!(!config.hide_leaves);
        assert!(config.panel_colours.is_empty());
    }
}
