//! Static style and layout tables for the Cytoscape renderer.
//!
//! Pure data: the rendering collaborator interprets these, the core never
//! does. Unparseable style values (bad colours, non-numeric sizes) are the
//! renderer's to ignore.

use serde_json::{json, Value};

use crate::config::ViewerConfig;
use crate::elements::panel_class;

/// Base stylesheet plus per-panel colour overrides from the viewer config.
pub fn stylesheet(config: &ViewerConfig) -> Value {
    let mut rules = vec![
        // Base nodes
        json!({
            "selector": "node",
            "style": {
                "label": "data(label)",
                "text-wrap": "wrap",
                "text-max-width": 120,
                "font-size": 12,
                "background-color": "#A0C4FF",
                "border-width": 1,
                "border-color": "#333",
                "width": "mapData(node_size, 0, 10, 20, 60)",
                "height": "mapData(node_size, 0, 10, 20, 60)"
            }
        }),
        // If node_colour is set in data, prefer it
        json!({
            "selector": "node[node_colour]",
            "style": { "background-color": "data(node_colour)" }
        }),
    ];

    for (panel, colour) in &config.panel_colours {
        rules.push(json!({
            "selector": format!(".{}", panel_class(panel)),
            "style": { "background-color": colour }
        }));
    }

    rules.push(json!({
        "selector": "edge",
        "style": {
            "curve-style": "bezier",
            "target-arrow-shape": "vee",
            "line-color": "#bbb",
            "target-arrow-color": "#bbb",
            "width": 1
        }
    }));
    rules.push(json!({
        "selector": ":selected",
        "style": {
            "border-width": 3,
            "border-color": "#FFB703",
            "line-color": "#FFB703",
            "target-arrow-color": "#FFB703"
        }
    }));

    Value::Array(rules)
}

/// Layout options handed to the renderer. Anything unrecognized falls back
/// to the force-directed default.
pub fn layout_options(name: &str) -> Value {
    if name == "breadthfirst" {
        return json!({
            "name": "breadthfirst",
            "directed": true,
            "spacingFactor": 1.15,
            "padding": 30,
            "animate": false
        });
    }
    // default: cose
    json!({
        "name": "cose",
        "directed": true,
        "padding": 50,
        "animate": false,
        "randomize": false,
        "nodeOverlap": 1,
        "nodeRepulsion": 20000
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_rules_present() {
        let rules = stylesheet(&ViewerConfig::default());
        let rules = rules.as_array().unwrap();

        assert_eq!(rules[0]["selector"], "node");
        assert_eq!(rules[1]["selector"], "node[node_colour]");
        assert!(rules.iter().any(|r| r["selector"] == "edge"));
        assert!(rules.iter().any(|r| r["selector"] == ":selected"));
    }

    #[test]
    fn test_panel_colour_override_rule() {
        let mut config = ViewerConfig::default();
        config
            .panel_colours
            .insert("Tv2".to_string(), "#1f4f7f".to_string());

        let rules = stylesheet(&config);
        let rule = rules
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["selector"] == ".panel-Tv2")
            .expect("panel override rule");
        assert_eq!(rule["style"]["background-color"], "#1f4f7f");
    }

    #[test]
    fn test_layout_fallback_is_cose() {
        assert_eq!(layout_options("breadthfirst")["name"], "breadthfirst");
        assert_eq!(layout_options("cose")["name"], "cose");
        assert_eq!(layout_options("spiral")["name"], "cose");
    }
}
