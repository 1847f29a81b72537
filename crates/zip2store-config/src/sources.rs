// Configuration source loading
//
// Priority order:
// 1. Config file path from ZIP2STORE_CONFIG
// 2. Inline config content from ZIP2STORE_CONFIG_CONTENT
// 3. Default config files (./config.toml, ./.zip2store.toml)
// 4. Built-in defaults

use crate::RuntimeConfig;
use anyhow::{Context, Result};
use std::env;
use std::path::Path;

pub fn load_config() -> Result<RuntimeConfig> {
    if let Ok(path) = env::var("ZIP2STORE_CONFIG") {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {path}"))?;
        return parse_config(&content)
            .with_context(|| format!("failed to parse config file: {path}"));
    }

    if let Ok(content) = env::var("ZIP2STORE_CONFIG_CONTENT") {
        return parse_config(&content)
            .context("failed to parse inline config from ZIP2STORE_CONFIG_CONTENT");
    }

    for path in &["./config.toml", "./.zip2store.toml"] {
        if Path::new(path).exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file: {path}"))?;
            return parse_config(&content)
                .with_context(|| format!("failed to parse config file: {path}"));
        }
    }

    let config = RuntimeConfig::default();
    config.validate()?;
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<RuntimeConfig> {
    let config: RuntimeConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}
