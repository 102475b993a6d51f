use crate::{
    BuildArgs,
    build::{Builder, base_path_from_config},
    config::{DEFAULT_CONFIG_FILE, RootConfig},
};

pub async fn run(args: &BuildArgs) -> Result<(), anyhow::Error> {
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

    let builder = Builder::new(config, base_path);
    let result = builder.build().await?;

    println!(
        "Built site to {} ({} pages from {} documents, {} static files)",
        result.output_dir.display(),
        result.pages,
        result.documents,
        result.static_files
    );
    if let Some(feed) = &result.feed {
        println!("Wrote feed to {}", feed.display());
    }

    Ok(())
}
