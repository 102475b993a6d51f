//! Configuration loading from files.
//!
//! The YAML file is layered with `AREAGEN_*` environment variables, using
//! `__` to separate nested keys (`AREAGEN_SITE__URL=https://example.com`).

use std::path::Path;

use super::{ConfigError, RootConfig};

pub const DEFAULT_CONFIG_FILE: &str = "areagen.yaml";

impl RootConfig {
    /// Load the config from the command line argument, defaulting to `areagen.yaml`
    pub async fn load_from_arg(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config_file = config_file.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        let config_file = if config_file.is_relative() {
            std::env::current_dir()
                .map_err(ConfigError::CwdFailure)?
                .join(config_file)
        } else {
            config_file.to_path_buf()
        };

        Self::load_from_file(&config_file).await
    }

    /// Load and validate the config from a file path
    pub async fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let path_str = path
            .as_os_str()
            .to_str()
            .ok_or_else(|| ConfigError::EncodePath(path.to_path_buf()))?;

        let config = ::config::Config::builder()
            .add_source(::config::File::new(path_str, ::config::FileFormat::Yaml))
            .add_source(
                ::config::Environment::with_prefix("AREAGEN")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<RootConfig>()?;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AreaTemplate;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_load_fixture_config() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/site/areagen.yaml");
        let config = RootConfig::load_from_file(&path).await.unwrap();

        assert_eq!(config.site.title, "Fixture Standards");
        assert_eq!(config.site.url.as_deref(), Some("https://standards.example.com"));
        assert_eq!(config.areas.len(), 3);

        let blog = config.area("Blog").unwrap();
        assert_eq!(blog.template, AreaTemplate::BlogPost);
        assert_eq!(config.home.callouts.len(), 1);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = RootConfig::load_from_file(Path::new("/no/such/areagen.yaml")).await;
        assert!(matches!(result, Err(ConfigError::Deserialize(_))));
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_config() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("areagen.yaml");
        std::fs::write(
            &path,
            "areas:\n  - name: CSS\n  - name: css\nfeed:\n  enabled: false\n",
        )
        .unwrap();

        let result = RootConfig::load_from_file(&path).await;
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
