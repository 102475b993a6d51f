use std::path::{Path, PathBuf};

use crate::{
    CleanArgs,
    build::{base_path_from_config, resolve, staging_dir},
    config::{DEFAULT_CONFIG_FILE, RootConfig},
};

pub async fn run(args: &CleanArgs) -> Result<(), anyhow::Error> {
    // Determine the config file path
    let config_path = args
        .config_file
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.into());
    let config_path = if config_path.is_relative() {
        std::env::current_dir()?.join(&config_path)
    } else {
        config_path
    };

    let config = RootConfig::load_from_arg(Some(config_path.as_path())).await?;

    // Get the base path for resolving relative paths
    let base_path = base_path_from_config(&config_path);
    config.validate_output(&base_path)?;

    for path in targets(&base_path, &config) {
        if !path.exists() {
            continue;
        }
        if args.dry_run {
            println!("Would delete {}", path.display());
        } else {
            tokio::fs::remove_dir_all(&path).await?;
            println!("Deleted {}", path.display());
        }
    }

    Ok(())
}

/// The generated site and any staging directory a failed build left behind.
fn targets(base_path: &Path, config: &RootConfig) -> [PathBuf; 2] {
    let output_dir = resolve(base_path, &config.site.output);
    let staging = staging_dir(&output_dir);
    [output_dir, staging]
}
