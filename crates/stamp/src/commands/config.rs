//! stamp.toml loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use stamp_static::{BuildConfig, DEFAULT_COPY_FILES, DEFAULT_MARKER, DEFAULT_VARIABLE};

/// Configuration file structure (stamp.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub inject: InjectConfig,
    #[serde(default)]
    pub copy: CopyConfig,
}

#[derive(Debug, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_template")]
    pub template: String,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_marker")]
    pub marker: String,
}

#[derive(Debug, Deserialize)]
pub struct InjectConfig {
    /// Environment variable holding the secret
    #[serde(default = "default_env")]
    pub env: String,
    /// Global assigned in the page
    #[serde(default = "default_variable")]
    pub variable: String,
}

#[derive(Debug, Deserialize)]
pub struct CopyConfig {
    #[serde(default = "default_copy_files")]
    pub files: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            template: default_template(),
            output: default_output(),
            marker: default_marker(),
        }
    }
}

impl Default for InjectConfig {
    fn default() -> Self {
        Self {
            env: default_env(),
            variable: default_variable(),
        }
    }
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            files: default_copy_files(),
        }
    }
}

fn default_template() -> String {
    "index.html".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}
fn default_env() -> String {
    "GITHUB_TOKEN".to_string()
}
fn default_variable() -> String {
    DEFAULT_VARIABLE.to_string()
}
fn default_copy_files() -> Vec<String> {
    DEFAULT_COPY_FILES.iter().map(|f| f.to_string()).collect()
}

impl ConfigFile {
    /// Turn the file settings into a build config rooted at `root`.
    pub fn into_build_config(self, root: PathBuf, secret: String) -> BuildConfig {
        BuildConfig {
            root,
            template: PathBuf::from(self.site.template),
            output_dir: PathBuf::from(self.site.output),
            marker: self.site.marker,
            variable: self.inject.variable,
            secret,
            copy_files: self.copy.files.into_iter().map(PathBuf::from).collect(),
        }
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    tracing::debug!("No config at {}, using defaults", path.display());
    Ok(ConfigFile::default())
}

/// Directory relative paths in the config file resolve against.
pub fn project_root(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
