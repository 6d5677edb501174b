use catgraph::{CostPolicy, GraphOptions};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::CostPolicyArg;

/// Settings read from the optional TOML config file.
#[derive(Debug, Default)]
pub struct CliConfig {
    path: Option<PathBuf>,
    data: RawConfig,
}

impl CliConfig {
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = explicit.or_else(default_config_path);
        let data = match path.as_ref() {
            Some(config_path) if config_path.exists() => read_file(config_path)?,
            _ => RawConfig::default(),
        };
        Ok(Self { path, data })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.data.graph.language.as_deref()
    }

    pub fn source(&self) -> &SourceSection {
        &self.data.source
    }

    /// Graph options from the file, with command line values taking precedence.
    pub fn graph_options(
        &self,
        policy: Option<CostPolicyArg>,
        uniform_cost: Option<f64>,
        reject_self_loops: bool,
    ) -> Result<GraphOptions, ConfigError> {
        let graph = &self.data.graph;
        let policy = match policy {
            Some(arg) => arg,
            None => match graph.cost_policy.as_deref() {
                Some("uniform") | None => CostPolicyArg::Uniform,
                Some("log-membership") => CostPolicyArg::LogMembership,
                Some(other) => {
                    return Err(ConfigError::InvalidCostPolicy {
                        value: other.to_string(),
                    })
                }
            },
        };
        let cost_policy = match policy {
            CostPolicyArg::Uniform => {
                CostPolicy::Uniform(uniform_cost.or(graph.uniform_cost).unwrap_or(1.0))
            }
            CostPolicyArg::LogMembership => CostPolicy::LogMembership,
        };
        Ok(GraphOptions::new()
            .cost_policy(cost_policy)
            .reject_self_loops(reject_self_loops || graph.reject_self_loops.unwrap_or(false)))
    }
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

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    graph: GraphSection,
    #[serde(default)]
    source: SourceSection,
}

#[derive(Debug, Default, Deserialize)]
struct GraphSection {
    language: Option<String>,
    cost_policy: Option<String>,
    uniform_cost: Option<f64>,
    reject_self_loops: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SourceSection {
    pub categories: Option<PathBuf>,
    pub edges: Option<PathBuf>,
    pub pages: Option<PathBuf>,
    pub snapshot: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("cost_policy '{value}' is invalid (expected uniform or log-membership)")]
    InvalidCostPolicy { value: String },
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("catgraph").join("config.toml"))
}
