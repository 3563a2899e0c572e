use crate::config::{MergerConfig, MergerConfigFile};
use crate::error::{MergerError, Result};
use std::path::Path;

pub async fn parse_config_from_file(path: impl AsRef<Path>) -> Result<MergerConfig> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path).await?;

    let extension = path.extension().and_then(|s| s.to_str());

    match extension {
        Some("yaml") | Some("yml") => parse_yaml(&contents),
        Some("toml") => parse_toml(&contents),
        Some("json") => parse_json(&contents),
        _ => Err(MergerError::InvalidConfig(
            "Unsupported file format. Use .yaml, .yml, .toml, or .json".to_string(),
        )),
    }
}

pub fn parse_config_from_str(content: &str, format: &str) -> Result<MergerConfig> {
    match format.to_lowercase().as_str() {
        "yaml" | "yml" => parse_yaml(content),
        "toml" => parse_toml(content),
        "json" => parse_json(content),
        _ => Err(MergerError::InvalidConfig(format!(
            "Unsupported format: {}",
            format
        ))),
    }
}

fn parse_yaml(content: &str) -> Result<MergerConfig> {
    let config: MergerConfig =
        serde_yaml::from_str(content).map_err(|e| MergerError::InvalidConfig(e.to_string()))?;
    config.validate().map_err(MergerError::InvalidConfig)?;
    Ok(config)
}

fn parse_toml(content: &str) -> Result<MergerConfig> {
    let file: MergerConfigFile =
        toml::from_str(content).map_err(|e| MergerError::InvalidConfig(e.to_string()))?;
    file.merger.validate().map_err(MergerError::InvalidConfig)?;
    Ok(file.merger)
}

fn parse_json(content: &str) -> Result<MergerConfig> {
    let config: MergerConfig =
        serde_json::from_str(content).map_err(|e| MergerError::InvalidConfig(e.to_string()))?;
    config.validate().map_err(MergerError::InvalidConfig)?;
    Ok(config)
}
