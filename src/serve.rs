//! Web server for the interactive gating-tree viewer
//!
//! Serves the element list with an embedded Cytoscape.js page for exploring
//! the gating hierarchy in a browser. Layout, rendering, image export, and
//! all UI state (the leaf toggle included) belong to the page; the server
//! only hands over data.

use anyhow::Result;
use tiny_http::{Header, Response, Server};

use crate::config::ViewerConfig;
use crate::filter::filter_leaves;
use crate::output::ElementSet;
use crate::styles;

/// Start the web server with the Cytoscape viewer.
pub fn start_server(set: &ElementSet, config: &ViewerConfig, port: u16) -> Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let server =
        Server::http(&addr).map_err(|e| anyhow::anyhow!("Failed to start server: {}", e))?;

    let url = format!("http://localhost:{}", port);
    log::info!("Viewer running at {}", url);
    log::info!("Press Ctrl+C to stop");

    if let Err(e) = webbrowser::open(&url) {
        log::warn!("Could not open browser: {}. Please open {} manually.", e, url);
    }

    let elements_json = serde_json::to_string(&set.elements)?;
    let stylesheet_json = serde_json::to_string(&styles::stylesheet(config))?;
    let html = generate_viewer_html(set, config)?;

    for request in server.incoming_requests() {
        let path = request.url().to_string();

        let response = match path.as_str() {
            "/" | "/index.html" => Response::from_string(html.as_str())
                .with_header(Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap()),
            "/elements.json" => Response::from_string(elements_json.as_str())
                .with_header(Header::from_bytes("Content-Type", "application/json").unwrap()),
            "/elements/pruned.json" => {
                // Derived, disposable view: recomputed per request, the
                // authoritative list is never replaced
                let (reduced, leaf_ids) = filter_leaves(&set.elements, true);
                let json = serde_json::to_string(&serde_json::json!({
                    "elements": reduced,
                    "leaf_ids": leaf_ids
                }))?;
                Response::from_string(json)
                    .with_header(Header::from_bytes("Content-Type", "application/json").unwrap())
            }
            "/stylesheet.json" => Response::from_string(stylesheet_json.as_str())
                .with_header(Header::from_bytes("Content-Type", "application/json").unwrap()),
            _ => Response::from_string("Not found").with_status_code(404),
        };

        let _ = request.respond(response);
    }

    Ok(())
}

/// Build the viewer page around the CDN-loaded Cytoscape.js.
fn generate_viewer_html(set: &ElementSet, config: &ViewerConfig) -> Result<String> {
    let layouts = serde_json::to_string(&serde_json::json!({
        "cose": styles::layout_options("cose"),
        "breadthfirst": styles::layout_options("breadthfirst")
    }))?;

    let title = set
        .source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "gating tree".to_string());

    Ok(VIEWER_TEMPLATE
        .replace("__TITLE__", &title)
        .replace("__LAYOUTS__", &layouts)
        .replace("__INITIAL_LAYOUT__", &config.layout)
        .replace("__START_HIDDEN__", if config.hide_leaves { "true" } else { "false" }))
}

const VIEWER_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>gatescope - __TITLE__</title>
    <script src="https://unpkg.com/cytoscape@3.30.2/dist/cytoscape.min.js"></script>
    <style>
        body { margin: 0; font-family: system-ui, sans-serif; display: flex; flex-direction: column; height: 100vh; }
        #toolbar { padding: 8px 12px; background: #1f4f7f; color: #fff; display: flex; gap: 12px; align-items: center; }
        #toolbar h1 { font-size: 16px; margin: 0 12px 0 0; font-weight: 600; }
        #toolbar select, #toolbar button { font-size: 13px; padding: 4px 8px; }
        #content { display: flex; flex: 1; min-height: 0; }
        #cy { flex: 1; }
        #metadata { width: 280px; border-left: 1px solid #ccc; padding: 12px; overflow-y: auto; font-size: 13px; }
        #metadata div { margin-bottom: 6px; }
        #leaf-count { font-size: 12px; opacity: 0.8; }
    </style>
</head>
<body>
    <div id="toolbar">
        <h1>gatescope - __TITLE__</h1>
        <label>Layout:
            <select id="layout-select">
                <option value="cose">cose</option>
                <option value="breadthfirst">breadthfirst</option>
            </select>
        </label>
        <button id="toggle-leaves">Hide leaves</button>
        <button id="export-png">Export PNG</button>
        <span id="leaf-count"></span>
    </div>
    <div id="content">
        <div id="cy"></div>
        <div id="metadata">Click a node to see details.</div>
    </div>

    <script>
        const LAYOUTS = __LAYOUTS__;
        const START_HIDDEN = __START_HIDDEN__;

        let cy = null;
        let authoritative = null;
        let leavesHidden = false;

        function currentLayout() {
            const name = document.getElementById('layout-select').value;
            return LAYOUTS[name] || LAYOUTS['cose'];
        }

        function showMetadata(data) {
            const fields = [
                ['label', 'Population'],
                ['panel', 'Panel'],
                ['primary_markers', 'Markers'],
                ['biological_role', 'Biological role'],
                ['x_marker_desc', 'X marker desc'],
                ['y_marker_desc', 'Y marker desc'],
                ['id', 'Full path (unique id)'],
            ];
            const panel = document.getElementById('metadata');
            panel.innerHTML = '';
            for (const [key, label] of fields) {
                const value = data[key];
                if (!value) continue;
                const row = document.createElement('div');
                const strong = document.createElement('strong');
                strong.textContent = label + ': ';
                row.appendChild(strong);
                row.appendChild(document.createTextNode(String(value)));
                panel.appendChild(row);
            }
            if (!panel.hasChildNodes()) {
                panel.textContent = 'Click a node to see details.';
            }
        }

        function render(elements) {
            cy.elements().remove();
            cy.add(elements);
            cy.layout(currentLayout()).run();
        }

        async function toggleLeaves() {
            const button = document.getElementById('toggle-leaves');
            const counter = document.getElementById('leaf-count');
            if (leavesHidden) {
                render(authoritative);
                leavesHidden = false;
                button.textContent = 'Hide leaves';
                counter.textContent = '';
                return;
            }
            const resp = await fetch('/elements/pruned.json');
            const pruned = await resp.json();
            render(pruned.elements);
            leavesHidden = true;
            button.textContent = 'Show leaves';
            counter.textContent = pruned.leaf_ids.length + ' leaves hidden';
        }

        function exportPng() {
            const link = document.createElement('a');
            link.href = cy.png({ full: true, scale: 2 });
            link.download = 'gating-tree.png';
            link.click();
        }

        async function init() {
            const [elementsResp, styleResp] = await Promise.all([
                fetch('/elements.json'),
                fetch('/stylesheet.json'),
            ]);
            authoritative = await elementsResp.json();
            const stylesheet = await styleResp.json();

            const select = document.getElementById('layout-select');
            if (LAYOUTS['__INITIAL_LAYOUT__']) {
                select.value = '__INITIAL_LAYOUT__';
            }

            cy = cytoscape({
                container: document.getElementById('cy'),
                elements: authoritative,
                style: stylesheet,
                layout: currentLayout(),
            });

            cy.on('tap', 'node', evt => showMetadata(evt.target.data()));

            select.addEventListener('change', () => cy.layout(currentLayout()).run());
            document.getElementById('toggle-leaves').addEventListener('click', toggleLeaves);
            document.getElementById('export-png').addEventListener('click', exportPng);

            if (START_HIDDEN) {
                await toggleLeaves();
            }
        }

        init();
    </script>
</body>
</html>
"##;
