//! Configuration loading and types for areagen.
//!
//! This module handles all aspects of configuration:
//! - Type definitions for config structures (`types`)
//! - Loading configs from files and the environment (`load`)
//! - Validation of the loaded config (`RootConfig::validate`)

mod load;
mod types;

use std::collections::HashMap;
use std::path::Path;

pub use load::DEFAULT_CONFIG_FILE;
pub use types::{AreaConfig, AreaTemplate, CalloutConfig, MarkdownConfig, RootConfig, ThemeConfig};

use crate::build::markdown::parse_extensions;
use crate::build::{normalize, resolve};

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to encode config file path as a unicode string: {0}")]
    EncodePath(std::path::PathBuf),

    #[error("failed to deserialize config: {0}")]
    Deserialize(#[from] ::config::ConfigError),

    #[error("failed to get current working directory: {0}")]
    CwdFailure(std::io::Error),

    #[error("{0}")]
    Validation(String),
}

// =============================================================================
// Validation
// =============================================================================

impl RootConfig {
    /// Check the invariants serde can't express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen: HashMap<String, &str> = HashMap::new();
        for area in &self.areas {
            if area.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "area names must not be empty".to_string(),
                ));
            }
            if let Some(previous) = seen.insert(area.name.to_lowercase(), &area.name) {
                return Err(ConfigError::Validation(format!(
                    "duplicate area '{}' (already defined as '{}')",
                    area.name, previous
                )));
            }
            if let Some(index) = &area.index
                && !(index.starts_with('/') && index.ends_with('/'))
            {
                return Err(ConfigError::Validation(format!(
                    "index route '{}' of area '{}' must start and end with '/'",
                    index, area.name
                )));
            }
        }

        if self.feed.enabled && self.area(&self.feed.area).is_none() {
            return Err(ConfigError::Validation(format!(
                "feed area '{}' is not in the area table",
                self.feed.area
            )));
        }

        parse_extensions(&self.markdown).map_err(|e| ConfigError::Validation(e.to_string()))?;

        Ok(())
    }

    /// Check that replacing the output directory can't remove the project or
    /// any of its content.
    ///
    /// The output directory must not be the project directory or one of its
    /// parents, and must neither contain nor sit inside the content root.
    pub fn validate_output(&self, base_path: &Path) -> Result<(), ConfigError> {
        let project = normalize(base_path);
        let content = normalize(&resolve(base_path, &self.content.path));
        let output = normalize(&resolve(base_path, &self.site.output));

        if project.starts_with(&output) {
            return Err(ConfigError::Validation(format!(
                "site.output '{}' would replace the project directory",
                self.site.output.display()
            )));
        }
        if output.starts_with(&content) || content.starts_with(&output) {
            return Err(ConfigError::Validation(format!(
                "site.output '{}' overlaps the content directory '{}'",
                self.site.output.display(),
                self.content.path.display()
            )));
        }
        Ok(())
    }
}
