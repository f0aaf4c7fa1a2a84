//! Initialize a stamp project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub fn run(yes: bool) -> Result<()> {
    tracing::info!("Initializing stamp...");

    init_project(Path::new("."), yes)?;

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'stamp build' to build the site.");

    Ok(())
}

/// Write starter files into `root`, keeping existing ones unless `overwrite`.
fn init_project(root: &Path, overwrite: bool) -> Result<()> {
    let files = [
        ("stamp.toml", DEFAULT_CONFIG),
        ("index.html", DEFAULT_INDEX),
        ("config.example.js", DEFAULT_CONFIG_EXAMPLE),
    ];

    for (name, content) in files {
        let path = root.join(name);
        if path.exists() && !overwrite {
            tracing::warn!("{} already exists. Use --yes to overwrite.", name);
            continue;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", name))?;
        tracing::info!("Created {}", name);
    }

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# stamp configuration

[site]
# HTML template the secret is injected into
template = "index.html"

# Output directory for the built site
output = "dist"

# The script block is inserted in front of the first occurrence of this text
marker = '<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>'

[inject]
# Environment variable read at build time
env = "GITHUB_TOKEN"

# Global set in the page: window.<variable>
variable = "VERCEL_GITHUB_TOKEN"

[copy]
# Copied into the output directory when present
files = ["config.example.js"]
"#;

const DEFAULT_INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Check-ins</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
</head>
<body>
  <div id="map"></div>
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
</body>
</html>
"#;

const DEFAULT_CONFIG_EXAMPLE: &str = r#"// GitHub API configuration (EXAMPLE)
// 1. Copy this file to config.js
// 2. Add your GitHub Personal Access Token
// 3. Keep config.js out of version control

window.GITHUB_CONFIG = {
  owner: '',
  repo: '',
  path: 'checkins.json',
  token: '',
  apiUrl: 'https://api.github.com'
};
"#;
