//! Script block injection.
//!
//! The block is rendered with minijinja and spliced into the page in front of
//! the marker. The secret is never escaped: whatever the environment holds
//! lands in the page as-is. Use [`injection_hazards`] to find out whether a
//! given value can break out of the generated script.

use std::fmt;

use minijinja::{context, AutoEscape, Environment};

use crate::builder::BuildError;

/// Default global variable assigned by the injected block.
pub const DEFAULT_VARIABLE: &str = "VERCEL_GITHUB_TOKEN";

/// Default marker the block is inserted in front of.
pub const DEFAULT_MARKER: &str =
    r#"<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>"#;

/// Result of splicing the block into a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    /// Page content after injection
    pub html: String,

    /// Whether the marker was found
    pub injected: bool,
}

/// Something in a secret that lets it escape the injected script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hazard {
    /// Terminates the single-quoted string literal
    SingleQuote,
    /// Starts a JS escape sequence
    Backslash,
    /// Line breaks are not allowed inside a single-quoted literal
    LineBreak,
    /// `</` can close the surrounding script element
    ClosingTag,
    /// `<!--` switches the script element into escaped parsing
    CommentOpen,
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Hazard::SingleQuote => "contains a single quote that ends the JS string",
            Hazard::Backslash => "contains a backslash that starts a JS escape",
            Hazard::LineBreak => "contains a line break inside the JS string",
            Hazard::ClosingTag => "contains `</`, which can close the script element",
            Hazard::CommentOpen => "contains `<!--`, which changes how the script element is parsed",
        };
        f.write_str(msg)
    }
}

/// Renders and inserts the script block that publishes the secret.
pub struct ScriptInjector {
    env: Environment<'static>,
    variable: String,
}

impl ScriptInjector {
    /// Create an injector assigning `window.<variable>`.
    pub fn new(variable: impl Into<String>) -> Self {
        let mut env = Environment::new();
        // The secret must reach the page byte for byte.
        env.set_auto_escape_callback(|_| AutoEscape::None);

        Self {
            env,
            variable: variable.into(),
        }
    }

    /// Name of the global variable the block assigns.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Render the script block for `secret`.
    pub fn render_block(&self, secret: &str) -> Result<String, BuildError> {
        self.env
            .render_str(
                SCRIPT_BLOCK,
                context! {
                    variable => &self.variable,
                    secret => secret,
                },
            )
            .map_err(|e| BuildError::RenderError(e.to_string()))
    }

    /// Insert the block in front of the first occurrence of `marker`.
    ///
    /// Later occurrences are left alone. A page without the marker comes
    /// back unchanged with `injected` set to false.
    pub fn inject(&self, html: &str, marker: &str, secret: &str) -> Result<Injection, BuildError> {
        let Some(at) = html.find(marker).filter(|_| !marker.is_empty()) else {
            return Ok(Injection {
                html: html.to_string(),
                injected: false,
            });
        };

        let block = self.render_block(secret)?;

        let mut out = String::with_capacity(html.len() + block.len() + 1);
        out.push_str(&html[..at]);
        out.push_str(&block);
        out.push('\n');
        out.push_str(&html[at..]);

        Ok(Injection {
            html: out,
            injected: true,
        })
    }
}

impl Default for ScriptInjector {
    fn default() -> Self {
        Self::new(DEFAULT_VARIABLE)
    }
}

/// List the ways `secret` can break out of the injected block.
pub fn injection_hazards(secret: &str) -> Vec<Hazard> {
    let mut hazards = Vec::new();

    if secret.contains('\'') {
        hazards.push(Hazard::SingleQuote);
    }
    if secret.contains('\\') {
        hazards.push(Hazard::Backslash);
    }
    if secret.contains(['\n', '\r']) {
        hazards.push(Hazard::LineBreak);
    }
    if secret.contains("</") {
        hazards.push(Hazard::ClosingTag);
    }
    if secret.contains("<!--") {
        hazards.push(Hazard::CommentOpen);
    }

    hazards
}

const SCRIPT_BLOCK: &str = "
<script>
  // Injected by build script for Vercel deployment
  window.{{ variable }} = '{{ secret }}';
</script>";
