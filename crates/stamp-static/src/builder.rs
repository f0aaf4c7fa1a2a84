//! Site builder.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::copy::{copy_auxiliary, same_file, DEFAULT_COPY_FILES};
use crate::inject::{injection_hazards, ScriptInjector, DEFAULT_MARKER, DEFAULT_VARIABLE};

/// Configuration for a single build.
#[derive(Clone)]
pub struct BuildConfig {
    /// Project root; relative paths below resolve against it
    pub root: PathBuf,

    /// HTML template to inject into
    pub template: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Text the script block is inserted in front of
    pub marker: String,

    /// Global variable assigned by the script block
    pub variable: String,

    /// Value published to the page, embedded verbatim
    pub secret: String,

    /// Auxiliary files copied into the output directory if present
    pub copy_files: Vec<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            template: PathBuf::from("index.html"),
            output_dir: PathBuf::from("dist"),
            marker: DEFAULT_MARKER.to_string(),
            variable: DEFAULT_VARIABLE.to_string(),
            secret: String::new(),
            copy_files: DEFAULT_COPY_FILES.iter().map(PathBuf::from).collect(),
        }
    }
}

// Keeps the secret out of debug logs.
impl fmt::Debug for BuildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildConfig")
            .field("root", &self.root)
            .field("template", &self.template)
            .field("output_dir", &self.output_dir)
            .field("marker", &self.marker)
            .field("variable", &self.variable)
            .field("secret", &if self.secret.is_empty() { "" } else { "***" })
            .field("copy_files", &self.copy_files)
            .finish()
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Written HTML file
    pub output_file: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Whether the marker was found and the block inserted
    pub injected: bool,

    /// Auxiliary files copied
    pub copied: Vec<PathBuf>,

    /// Auxiliary files not found
    pub skipped: Vec<PathBuf>,

    /// Total build time in milliseconds
    pub duration_ms: u64,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Failed to read template: {path}: {message}")]
    ReadError { path: String, message: String },

    #[error("Failed to render script block: {0}")]
    RenderError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),

    #[error("Failed to copy {path}: {message}")]
    CopyError { path: String, message: String },
}

/// Builds the output directory from a template and a secret.
pub struct SiteBuilder {
    config: BuildConfig,
    injector: ScriptInjector,
}

impl SiteBuilder {
    /// Create a new site builder.
    pub fn new(config: BuildConfig) -> Self {
        let injector = ScriptInjector::new(config.variable.clone());
        Self { config, injector }
    }

    /// Run the build.
    ///
    /// The template is read before anything is written, so a missing
    /// template leaves the output directory untouched. An output file that
    /// would land on the template itself is refused.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        tracing::info!(
            "Secret for window.{} available: {}",
            self.injector.variable(),
            if self.config.secret.is_empty() { "no" } else { "yes" }
        );
        for hazard in injection_hazards(&self.config.secret) {
            tracing::warn!("Secret is embedded unescaped and {}", hazard);
        }

        let template_path = self.resolve(&self.config.template);
        let html = read_template(&template_path)?;

        let injection = self
            .injector
            .inject(&html, &self.config.marker, &self.config.secret)?;
        if !injection.injected {
            tracing::warn!(
                "Marker not found in {}; writing template unchanged",
                template_path.display()
            );
        }

        let output_dir = self.resolve(&self.config.output_dir);
        let file_name = template_path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("index.html"));
        let output_file = output_dir.join(file_name);

        if same_file(&template_path, &output_file) {
            return Err(BuildError::WriteError(format!(
                "{}: output would overwrite the template",
                output_file.display()
            )));
        }

        // Ensure output directory exists
        fs::create_dir_all(&output_dir)
            .map_err(|e| BuildError::WriteError(format!("{}: {}", output_dir.display(), e)))?;

        fs::write(&output_file, &injection.html)
            .map_err(|e| BuildError::WriteError(format!("{}: {}", output_file.display(), e)))?;
        tracing::debug!("Wrote {}", output_file.display());

        let report = copy_auxiliary(&self.config.root, &output_dir, &self.config.copy_files)?;

        Ok(BuildResult {
            output_file,
            output_dir,
            injected: injection.injected,
            copied: report.copied,
            skipped: report.skipped,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.config.root.join(path)
    }
}

fn read_template(path: &Path) -> Result<String, BuildError> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => BuildError::TemplateNotFound(path.display().to_string()),
        _ => BuildError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
</head>
<body>
  <div id="map"></div>
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<script src="app.js"></script>
</body>
</html>
"#;

    fn project(page: &str) -> tempfile::TempDir {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("index.html"), page).unwrap();
        temp
    }

    fn config(root: &Path, secret: &str) -> BuildConfig {
        BuildConfig {
            root: root.to_path_buf(),
            secret: secret.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn builds_simple_site() {
        let temp = project(PAGE);
        fs::write(temp.path().join("config.example.js"), "window.GITHUB_CONFIG = {};").unwrap();

        let result = SiteBuilder::new(config(temp.path(), "ghp_123")).build().unwrap();

        assert!(result.injected);
        assert_eq!(result.output_file, temp.path().join("dist/index.html"));
        assert_eq!(result.copied, vec![PathBuf::from("config.example.js")]);

        let html = fs::read_to_string(&result.output_file).unwrap();
        assert!(html.contains(
            "window.VERCEL_GITHUB_TOKEN = 'ghp_123';\n</script>\n<script src=\"https://unpkg.com/leaflet@1.9.4/dist/leaflet.js\"></script>"
        ));
        assert!(temp.path().join("dist/config.example.js").exists());
    }

    #[test]
    fn template_is_not_modified() {
        let temp = project(PAGE);

        SiteBuilder::new(config(temp.path(), "tok")).build().unwrap();

        assert_eq!(fs::read_to_string(temp.path().join("index.html")).unwrap(), PAGE);
    }

    #[test]
    fn output_matches_template_outside_block() {
        let temp = project(PAGE);
        let builder = SiteBuilder::new(config(temp.path(), "tok"));

        let result = builder.build().unwrap();
        let html = fs::read_to_string(&result.output_file).unwrap();

        let block = ScriptInjector::default().render_block("tok").unwrap();
        assert_eq!(html.replacen(&format!("{}\n", block), "", 1), PAGE);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let temp = project(PAGE);
        let builder = SiteBuilder::new(config(temp.path(), "tok"));

        let first = builder.build().unwrap();
        let first_html = fs::read_to_string(&first.output_file).unwrap();
        let second = builder.build().unwrap();
        let second_html = fs::read_to_string(&second.output_file).unwrap();

        assert_eq!(first_html, second_html);
        assert_eq!(second_html.matches("window.VERCEL_GITHUB_TOKEN").count(), 1);
    }

    #[test]
    fn missing_auxiliary_file_is_skipped() {
        let temp = project(PAGE);

        let result = SiteBuilder::new(config(temp.path(), "")).build().unwrap();

        assert!(temp.path().join("dist").is_dir());
        assert!(result.copied.is_empty());
        assert_eq!(result.skipped, vec![PathBuf::from("config.example.js")]);
    }

    #[test]
    fn missing_template_fails_without_output() {
        let temp = tempdir().unwrap();

        let err = SiteBuilder::new(config(temp.path(), "tok")).build().unwrap_err();

        assert!(matches!(err, BuildError::TemplateNotFound(_)));
        assert!(!temp.path().join("dist/index.html").exists());
        assert!(!temp.path().join("dist").exists());
    }

    #[test]
    fn special_characters_are_kept_verbatim() {
        let temp = project(PAGE);
        let secret = r#"ab'c"d<e>&f\g"#;

        let result = SiteBuilder::new(config(temp.path(), secret)).build().unwrap();
        let html = fs::read_to_string(&result.output_file).unwrap();

        assert!(html.contains(&format!("window.VERCEL_GITHUB_TOKEN = '{}';", secret)));
    }

    #[test]
    fn page_without_marker_is_copied_unchanged() {
        let temp = project("<html><body></body></html>");

        let result = SiteBuilder::new(config(temp.path(), "tok")).build().unwrap();

        assert!(!result.injected);
        assert_eq!(
            fs::read_to_string(&result.output_file).unwrap(),
            "<html><body></body></html>"
        );
    }

    #[test]
    fn custom_paths_and_variable() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("web")).unwrap();
        fs::write(temp.path().join("web/page.html"), "<head><!-- inject --></head>").unwrap();

        let result = SiteBuilder::new(BuildConfig {
            root: temp.path().to_path_buf(),
            template: PathBuf::from("web/page.html"),
            output_dir: PathBuf::from("public"),
            marker: "<!-- inject -->".to_string(),
            variable: "API_KEY".to_string(),
            secret: "k".to_string(),
            copy_files: vec![],
        })
        .build()
        .unwrap();

        assert_eq!(result.output_file, temp.path().join("public/page.html"));
        let html = fs::read_to_string(&result.output_file).unwrap();
        assert!(html.contains("window.API_KEY = 'k';\n</script>\n<!-- inject -->"));
    }

    #[test]
    fn refuses_to_overwrite_template() {
        let temp = project(PAGE);

        let err = SiteBuilder::new(BuildConfig {
            output_dir: PathBuf::from("."),
            ..config(temp.path(), "tok")
        })
        .build()
        .unwrap_err();

        assert!(matches!(err, BuildError::WriteError(_)));
        assert_eq!(fs::read_to_string(temp.path().join("index.html")).unwrap(), PAGE);
    }

    #[test]
    fn refuses_template_reached_through_other_path() {
        let temp = project(PAGE);
        fs::create_dir_all(temp.path().join("sub")).unwrap();

        let err = SiteBuilder::new(BuildConfig {
            output_dir: PathBuf::from("sub/.."),
            ..config(temp.path(), "tok")
        })
        .build()
        .unwrap_err();

        assert!(matches!(err, BuildError::WriteError(_)));
        assert_eq!(fs::read_to_string(temp.path().join("index.html")).unwrap(), PAGE);
    }

    #[test]
    fn debug_output_hides_secret() {
        let rendered = format!("{:?}", config(Path::new("."), "ghp_secret"));

        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains("***"));
    }
}
