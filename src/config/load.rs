use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::Config;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "LABEL_SYNC_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("could not determine the config directory")]
    NoConfigDir,
}

/// `config.yml` in the platform config directory.
pub fn default_path() -> Result<PathBuf, ConfigLoadError> {
    let dirs = directories::ProjectDirs::from("", "", "label-sync")
        .ok_or(ConfigLoadError::NoConfigDir)?;
    Ok(dirs.config_dir().join("config.yml"))
}

/// Read, parse and validate a config file.
pub fn load(path: &Path) -> Result<Config, ConfigLoadError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config =
        serde_yaml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    validate(&config)?;
    Ok(config)
}

/// Shape checks serde cannot express. Taxonomy checks belong to the resolver.
pub fn validate(config: &Config) -> Result<(), ConfigLoadError> {
    let mut names = HashSet::new();
    for project in &config.projects {
        if project.name.trim().is_empty() {
            return Err(ConfigLoadError::Invalid(
                "project name must not be empty".to_string(),
            ));
        }
        if !names.insert(project.name.as_str()) {
            return Err(ConfigLoadError::Invalid(format!(
                "project `{}` is listed more than once",
                project.name
            )));
        }
        if matches!(&project.colors, Some(colors) if colors.is_empty()) {
            return Err(ConfigLoadError::Invalid(format!(
                "project `{}` has an empty color palette",
                project.name
            )));
        }
    }
    Ok(())
}
