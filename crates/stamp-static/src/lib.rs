//! Build-time script injection for static sites.
//!
//! Reads an HTML template, inserts a script block that publishes a secret
//! from the build environment, writes the page to an output directory and
//! copies auxiliary files next to it.

pub mod builder;
pub mod copy;
pub mod inject;

pub use builder::{BuildConfig, BuildError, BuildResult, SiteBuilder};
pub use copy::{copy_auxiliary, CopyReport, DEFAULT_COPY_FILES};
pub use inject::{injection_hazards, Hazard, Injection, ScriptInjector, DEFAULT_MARKER, DEFAULT_VARIABLE};
