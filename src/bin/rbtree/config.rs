use super::ui::Theme;
use super::OutputFormat;
use clap::ValueEnum;
use paged_rbtree::tree::TreeOptions;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings read from `config.toml`.
#[derive(Debug, Default)]
pub struct CliConfig {
    path: Option<PathBuf>,
    data: RawConfig,
    format: Option<OutputFormat>,
    theme: Option<Theme>,
}

impl CliConfig {
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = explicit.or_else(default_config_path);
        let data = match path.as_ref() {
            Some(config_path) if config_path.exists() => read_file(config_path)?,
            _ => RawConfig::default(),
        };
        let format = parse_value("output.format", data.output.format.as_deref())?;
        let theme = parse_value("output.theme", data.output.theme.as_deref())?;
        Ok(Self {
            path,
            data,
            format,
            theme,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn tree_options(&self) -> TreeOptions {
        let section = &self.data.tree;
        let mut opts = TreeOptions::new();
        if let Some(shift) = section.row_shift {
            opts = opts.row_shift(shift);
        }
        if let Some(rows) = section.initial_rows {
            opts = opts.initial_rows(rows);
        }
        if let Some(rows) = section.max_rows {
            opts = opts.max_rows(rows);
        }
        opts
    }

    pub fn format(&self) -> Option<OutputFormat> {
        self.format
    }

    pub fn theme(&self) -> Option<Theme> {
        self.theme
    }

    pub fn log_level(&self) -> Option<&str> {
        self.data.log.level.as_deref()
    }
}

fn parse_value<T: ValueEnum>(key: &'static str, raw: Option<&str>) -> Result<Option<T>, ConfigError> {
    match raw {
        Some(value) => T::from_str(value, true)
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key,
                value: value.to_string(),
            }),
        None => Ok(None),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    tree: TreeSection,
    #[serde(default)]
    output: OutputSection,
    #[serde(default)]
    log: LogSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TreeSection {
    row_shift: Option<u32>,
    initial_rows: Option<usize>,
    max_rows: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OutputSection {
    format: Option<String>,
    theme: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LogSection {
    level: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read CLI config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse CLI config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("config value {key} = '{value}' is invalid")]
    InvalidValue { key: &'static str, value: String },
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("paged-rbtree").join("config.toml"))
}

fn read_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
