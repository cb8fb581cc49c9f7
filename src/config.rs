use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".keysiftrc.json";

/// Route fragment of the source-listing endpoint the payload calls before it
/// needs the key.
pub const DEFAULT_ROUTE_MARKER: &str = "/embed-1/v2/e-1/getSources?id=";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub ignores: Vec<String>,
    /// Maximum distance (in bytes) between two neighbouring arrays for them
    /// to be paired by proximity.
    #[serde(default = "default_proximity_threshold")]
    pub proximity_threshold: usize,
    /// Arrays with this many elements or fewer are discarded as noise.
    #[serde(default = "default_min_array_len")]
    pub min_array_len: usize,
    #[serde(default = "default_min_key_len")]
    pub min_key_len: usize,
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,
    /// Exact number of calls the last-resort shape scan looks for.
    #[serde(default = "default_nine_call_arity")]
    pub nine_call_arity: usize,
    #[serde(default = "default_route_marker")]
    pub route_marker: String,
    #[serde(default)]
    pub strategies: StrategyToggles,
}

/// Enabled state of each strategy in the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyToggles {
    #[serde(default = "enabled")]
    pub call_concatenation: bool,
    #[serde(default = "enabled")]
    pub api_trace: bool,
    #[serde(default = "enabled")]
    pub crypto_trace: bool,
    #[serde(default = "enabled")]
    pub fallback: bool,
    #[serde(default = "enabled")]
    pub array_indirection: bool,
}

fn enabled() -> bool {
    true
}

fn default_proximity_threshold() -> usize {
    1000
}

fn default_min_array_len() -> usize {
    10
}

fn default_min_key_len() -> usize {
    10
}

fn default_max_call_depth() -> usize {
    10
}

fn default_nine_call_arity() -> usize {
    9
}

fn default_route_marker() -> String {
    DEFAULT_ROUTE_MARKER.to_string()
}

impl Default for StrategyToggles {
    fn default() -> Self {
        Self {
            call_concatenation: true,
            api_trace: true,
            crypto_trace: true,
            fallback: true,
            array_indirection: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignores: Vec::new(),
            proximity_threshold: default_proximity_threshold(),
            min_array_len: default_min_array_len(),
            min_key_len: default_min_key_len(),
            max_call_depth: default_max_call_depth(),
            nine_call_arity: default_nine_call_arity(),
            route_marker: default_route_marker(),
            strategies: StrategyToggles::default(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if a threshold is zero, the route marker is empty, or
    /// any glob pattern in `ignores` is invalid.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        if self.proximity_threshold == 0 {
            bail!("'proximityThreshold' must be at least 1");
        }
        if self.min_array_len == 0 {
            bail!("'minArrayLen' must be at least 1");
        }
        if self.max_call_depth == 0 {
            bail!("'maxCallDepth' must be at least 1");
        }
        if self.min_key_len == 0 {
            bail!("'minKeyLen' must be at least 1");
        }
        // A single call is not a concatenation.
        if self.nine_call_arity < 2 {
            bail!("'nineCallArity' must be at least 2");
        }
        if self.route_marker.trim().is_empty() {
            bail!("'routeMarker' must not be empty");
        }

        Ok(())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
