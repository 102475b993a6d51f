use std::path::Path;

use crate::{
    InitArgs,
    config::{CalloutConfig, DEFAULT_CONFIG_FILE, RootConfig},
};

const WELCOME_POST: &str = "---
title: Welcome
area: Blog
date: 2021-01-01
description: The first post on the new standards site.
---

This site is generated from the markdown files under `content/`.
";

const CSS_OVERVIEW: &str = "---
title: Overview
area: CSS
section: Get Started
---

# CSS

Start writing the CSS standards here.
";

pub async fn run(args: &InitArgs) -> Result<(), anyhow::Error> {
    let path = if args.path.is_relative() {
        std::env::current_dir()?.join(&args.path)
    } else {
        args.path.clone()
    };

    if !path.exists() {
        if args.create {
            tokio::fs::create_dir_all(&path).await?;
            println!("Created directory {path}", path = path.display());
        } else {
            return Err(anyhow::anyhow!(
                "Directory does not exist: {path}",
                path = path.display()
            ));
        }
    }

    let config_file = path.join(DEFAULT_CONFIG_FILE);
    if config_file.exists() {
        return Err(anyhow::anyhow!(
            "Config file already exists: {config_file}",
            config_file = config_file.display()
        ));
    }

    println!("Initializing project in {}", path.display());

    let default_config = default_config();
    let config_text = serde_yaml::to_string(&default_config)?;
    tokio::fs::write(&config_file, config_text).await?;

    println!(
        "Created config file {config_file}",
        config_file = config_file.display()
    );

    let content_dir = path.join(&default_config.content.path);
    write_if_missing(&content_dir.join("blog/welcome.md"), WELCOME_POST).await?;
    write_if_missing(&content_dir.join("css/index.md"), CSS_OVERVIEW).await?;
    println!("Created sample content in {}", content_dir.display());

    Ok(())
}

fn default_config() -> RootConfig {
    let mut config = RootConfig::default();
    config.site.url = Some("https://example.com".into());
    config.home.callouts = vec![CalloutConfig {
        name: "Get Started".into(),
        area: "CSS".into(),
        section: "Get Started".into(),
    }];
    config
}

async fn write_if_missing(path: &Path, contents: &str) -> Result<(), anyhow::Error> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}
