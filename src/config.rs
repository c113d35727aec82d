use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_RULE_ROW_LIMIT: usize = 50;
pub const DEFAULT_SEARCH_LIMIT: usize = 20;
pub const DEFAULT_SEARCH_PER_TYPE_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RelgraphConfig {
    pub database: Option<String>,
    /// Max rows fetched per relationship rule
    pub rule_row_limit: Option<usize>,
    /// Search result limit when the caller gives none
    pub search_limit: Option<usize>,
    /// Max rows fetched per entity type in one search
    pub search_per_type_limit: Option<usize>,
}

impl RelgraphConfig {
    /// Config with every value spelled out, as written by `relgraph init`
    pub fn with_defaults() -> Self {
        Self {
            database: Some(default_database_path().display().to_string()),
            rule_row_limit: Some(DEFAULT_RULE_ROW_LIMIT),
            search_limit: Some(DEFAULT_SEARCH_LIMIT),
            search_per_type_limit: Some(DEFAULT_SEARCH_PER_TYPE_LIMIT),
        }
    }

    pub fn settings(&self) -> Result<EngineSettings> {
        let settings = EngineSettings {
            rule_row_limit: self.rule_row_limit.unwrap_or(DEFAULT_RULE_ROW_LIMIT),
            search_limit: self.search_limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
            search_per_type_limit: self.search_per_type_limit.unwrap_or(DEFAULT_SEARCH_PER_TYPE_LIMIT),
        };
        settings.validate()?;
        Ok(settings)
    }
}

/// Limits the query engine runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub rule_row_limit: usize,
    pub search_limit: usize,
    pub search_per_type_limit: usize,
}

impl EngineSettings {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("rule_row_limit", self.rule_row_limit),
            ("search_limit", self.search_limit),
            ("search_per_type_limit", self.search_per_type_limit),
        ] {
            if value == 0 {
                return Err(Error::Validation(format!("{} must be greater than zero", name)));
            }
        }
        Ok(())
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            rule_row_limit: DEFAULT_RULE_ROW_LIMIT,
            search_limit: DEFAULT_SEARCH_LIMIT,
            search_per_type_limit: DEFAULT_SEARCH_PER_TYPE_LIMIT,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("relgraph.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("relgraph.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<RelgraphConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: RelgraphConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &RelgraphConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
