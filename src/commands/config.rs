use colored::*;
use eyre::{Context, Result};
use std::fs;

use personakit::config::{Config, LogLevel};

use crate::cli::{ConfigAction, OutputFormat};

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Get { key } => get(&key, config),
        ConfigAction::Set { key, value } => set(&key, &value, config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "personakit Configuration".bold());
            println!();

            println!("{}:", "paths".cyan());
            println!("  data: {}", config.paths.data.display());
            println!();

            println!("{}:", "storage".cyan());
            println!("  key: {}", config.storage.key);
            println!("  quota_bytes: {}", config.storage.quota_bytes);
            println!();

            println!("{}:", "session".cyan());
            println!("  default_persona: {}", config.session.default_persona);
            println!("  theme_color: {}", config.session.theme_color);
            println!();

            println!("{}: {}", "log_level".cyan(), config.log_level.as_filter());
        }
    }

    Ok(())
}

fn lookup(key: &str, config: &Config) -> Option<String> {
    match key {
        "paths.data" => Some(config.paths.data.display().to_string()),
        "storage.key" => Some(config.storage.key.clone()),
        "storage.quota_bytes" => Some(config.storage.quota_bytes.to_string()),
        "session.default_persona" => Some(config.session.default_persona.clone()),
        "session.theme_color" => Some(config.session.theme_color.clone()),
        "log_level" | "log-level" => Some(config.log_level.as_filter().to_string()),
        _ => None,
    }
}

fn get(key: &str, config: &Config) -> Result<()> {
    match lookup(key, config) {
        Some(v) => println!("{}", v),
        None => eyre::bail!("Unknown config key: {}", key),
    }

    Ok(())
}

fn set(key: &str, value: &str, config: &Config) -> Result<()> {
    println!("{} Setting {} = {}", "→".blue(), key.cyan(), value.green());

    let mut new_config = config.clone();

    match key {
        "paths.data" => new_config.paths.data = value.into(),
        "storage.key" => new_config.storage.key = value.to_string(),
        "storage.quota_bytes" => {
            new_config.storage.quota_bytes = value.parse().context("Invalid byte count")?;
        }
        "session.default_persona" => new_config.session.default_persona = value.to_string(),
        "session.theme_color" => new_config.session.theme_color = value.to_string(),
        "log_level" | "log-level" => {
            new_config.log_level = value.parse::<LogLevel>().map_err(|e| eyre::eyre!(e))?;
        }
        _ => {
            eyre::bail!("Unknown config key: {}", key);
        }
    }

    let config_path = Config::personakit_dir().join("personakit.yaml");
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let yaml_str = serde_yaml::to_string(&new_config).context("Failed to serialize config")?;
    fs::write(&config_path, yaml_str).context("Failed to write config file")?;

    println!("  {} Saved to {}", "✓".green(), config_path.display());

    Ok(())
}
