//! Configuration loading for regraph.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.regraph/config.toml`)
//! 3. User config (`~/.regraph/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The compiler runs with the defaults when no
//! config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FailOpen, RegraphError, Result};
use crate::graph::{CleanupOptions, DEFAULT_ROOT};

/// Main configuration struct for regraph.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Graph cleanup configuration.
    pub cleanup: CleanupConfig,
    /// Output formatting configuration.
    pub output: OutputConfig,
    /// Input reading configuration.
    pub input: InputConfig,
}

/// Graph cleanup configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CleanupConfig {
    /// Name of the root region absent state providers resolve to.
    pub root: String,
    /// Regions that are never merged or pruned.
    pub keep_regions: Vec<String>,
    /// Drop always-satisfied branches that sit next to other alternatives.
    pub strip_empty_branches: bool,
    /// Remove regions left without locations or exits.
    pub prune_dead_regions: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.to_string(),
            keep_regions: Vec::new(),
            strip_empty_branches: true,
            prune_dead_regions: true,
        }
    }
}

/// Output formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print the exported JSON.
    pub pretty: bool,
    /// Write a `.dot` file next to the JSON output when `--dot` is not given.
    pub dot: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            dot: false,
        }
    }
}

/// Input reading configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Largest input document accepted, in megabytes.
    pub max_file_size_mb: u64,
}

/// Smallest accepted `max_file_size_mb`.
pub const MIN_FILE_SIZE_MB: u64 = 1;

/// Largest accepted `max_file_size_mb`.
pub const MAX_FILE_SIZE_MB: u64 = 4096;

impl InputConfig {
    /// Check if a size limit is within range.
    pub fn is_valid_file_size_mb(value: u64) -> bool {
        (MIN_FILE_SIZE_MB..=MAX_FILE_SIZE_MB).contains(&value)
    }

    /// The size limit in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 64,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Project config (`.regraph/config.toml` in cwd or an ancestor)
    /// 3. User config (`~/.regraph/config.toml`)
    /// 4. Defaults
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `~/.regraph/config.toml`.
    fn load_user_config() -> Option<Config> {
        let config_path = regraph_home()?.join("config.toml");
        if !config_path.exists() {
            return None;
        }
        Some(Self::load_from_file(&config_path).fail_open_default("loading user config"))
    }

    /// Load project config from `.regraph/config.toml`.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        let config_path = project_regraph_dir(cwd).join("config.toml");
        if !config_path.exists() {
            return None;
        }
        Some(Self::load_from_file(&config_path).fail_open_default("loading project config"))
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| RegraphError::storage(path, e))?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| RegraphError::config(format!("{}: {}", path.display(), e)))?;

        let size = config.input.max_file_size_mb;
        if !InputConfig::is_valid_file_size_mb(size) {
            let fallback = InputConfig::default().max_file_size_mb;
            tracing::warn!(
                "Invalid max_file_size_mb value '{}' in {}. Must be in [{}, {}]. Using '{}'.",
                size,
                path.display(),
                MIN_FILE_SIZE_MB,
                MAX_FILE_SIZE_MB,
                fallback
            );
            config.input.max_file_size_mb = fallback;
        }

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // REGRAPH_ROOT
        if let Ok(val) = env::var("REGRAPH_ROOT") {
            let trimmed = val.trim();
            if trimmed.is_empty() {
                tracing::warn!(
                    "Invalid REGRAPH_ROOT value '{}'. Using '{}'.",
                    val,
                    self.cleanup.root
                );
            } else {
                self.cleanup.root = trimmed.to_string();
            }
        }

        // REGRAPH_KEEP_REGIONS (comma separated, added to the configured list)
        if let Ok(val) = env::var("REGRAPH_KEEP_REGIONS") {
            for name in val.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                if !self.cleanup.keep_regions.iter().any(|k| k == name) {
                    self.cleanup.keep_regions.push(name.to_string());
                }
            }
        }

        // REGRAPH_STRIP_EMPTY
        if let Ok(val) = env::var("REGRAPH_STRIP_EMPTY") {
            match parse_bool(&val) {
                Some(b) => self.cleanup.strip_empty_branches = b,
                None => tracing::warn!(
                    "Invalid REGRAPH_STRIP_EMPTY value '{}'. Expected a boolean. Using '{}'.",
                    val,
                    self.cleanup.strip_empty_branches
                ),
            }
        }

        // REGRAPH_PRUNE_DEAD
        if let Ok(val) = env::var("REGRAPH_PRUNE_DEAD") {
            match parse_bool(&val) {
                Some(b) => self.cleanup.prune_dead_regions = b,
                None => tracing::warn!(
                    "Invalid REGRAPH_PRUNE_DEAD value '{}'. Expected a boolean. Using '{}'.",
                    val,
                    self.cleanup.prune_dead_regions
                ),
            }
        }

        // REGRAPH_PRETTY
        if let Ok(val) = env::var("REGRAPH_PRETTY") {
            match parse_bool(&val) {
                Some(b) => self.output.pretty = b,
                None => tracing::warn!(
                    "Invalid REGRAPH_PRETTY value '{}'. Expected a boolean. Using '{}'.",
                    val,
                    self.output.pretty
                ),
            }
        }

        // REGRAPH_MAX_FILE_SIZE_MB
        if let Ok(val) = env::var("REGRAPH_MAX_FILE_SIZE_MB") {
            match val.trim().parse::<u64>() {
                Ok(n) if InputConfig::is_valid_file_size_mb(n) => {
                    self.input.max_file_size_mb = n;
                }
                Ok(n) => tracing::warn!(
                    "Invalid REGRAPH_MAX_FILE_SIZE_MB value '{}'. Must be in [{}, {}]. Using '{}'.",
                    n,
                    MIN_FILE_SIZE_MB,
                    MAX_FILE_SIZE_MB,
                    self.input.max_file_size_mb
                ),
                Err(_) => tracing::warn!(
                    "Invalid REGRAPH_MAX_FILE_SIZE_MB value '{}'. Expected a positive integer. Using '{}'.",
                    val,
                    self.input.max_file_size_mb
                ),
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// The `other` config takes precedence field by field: every value of
    /// `other` that differs from the default replaces the value in `self`.
    /// Keep-lists are unioned.
    ///
    /// # Limitation
    ///
    /// A higher layer cannot set a value back to its default once a lower
    /// layer changed it, because an explicit default is indistinguishable
    /// from an omitted field.
    pub fn merge(mut self, other: Config) -> Self {
        let default_cleanup = CleanupConfig::default();
        if other.cleanup.root != default_cleanup.root {
            self.cleanup.root = other.cleanup.root;
        }
        for name in other.cleanup.keep_regions {
            if !self.cleanup.keep_regions.contains(&name) {
                self.cleanup.keep_regions.push(name);
            }
        }
        if other.cleanup.strip_empty_branches != default_cleanup.strip_empty_branches {
            self.cleanup.strip_empty_branches = other.cleanup.strip_empty_branches;
        }
        if other.cleanup.prune_dead_regions != default_cleanup.prune_dead_regions {
            self.cleanup.prune_dead_regions = other.cleanup.prune_dead_regions;
        }

        let default_output = OutputConfig::default();
        if other.output.pretty != default_output.pretty {
            self.output.pretty = other.output.pretty;
        }
        if other.output.dot != default_output.dot {
            self.output.dot = other.output.dot;
        }

        if other.input.max_file_size_mb != InputConfig::default().max_file_size_mb {
            self.input.max_file_size_mb = other.input.max_file_size_mb;
        }

        self
    }

    /// Switches for the builder's cleanup pass.
    pub fn cleanup_options(&self) -> CleanupOptions {
        CleanupOptions {
            strip_empty_branches: self.cleanup.strip_empty_branches,
            prune_dead_regions: self.cleanup.prune_dead_regions,
        }
    }

    /// Save configuration to the project config file.
    ///
    /// Writes `.regraph/config.toml` under `cwd`, creating the directory if
    /// needed. The file is written to a temp path and renamed into place.
    pub fn save_project(&self, cwd: &Path) -> Result<PathBuf> {
        let regraph_dir = cwd.join(".regraph");

        if !regraph_dir.exists() {
            fs::create_dir_all(&regraph_dir).map_err(|e| RegraphError::storage(&regraph_dir, e))?;
        }

        let config_path = regraph_dir.join("config.toml");
        let content =
            toml::to_string_pretty(self).map_err(|e| RegraphError::config(e.to_string()))?;

        let temp_path = regraph_dir.join(".config.toml.tmp");
        fs::write(&temp_path, &content).map_err(|e| RegraphError::storage(&temp_path, e))?;

        let file = fs::File::open(&temp_path).map_err(|e| RegraphError::storage(&temp_path, e))?;
        file.sync_all()
            .map_err(|e| RegraphError::storage(&temp_path, e))?;
        drop(file);

        fs::rename(&temp_path, &config_path).map_err(|e| RegraphError::storage(&config_path, e))?;

        Ok(config_path)
    }
}

/// Get the regraph home directory.
///
/// Checks `REGRAPH_HOME` first, then falls back to `~/.regraph`. An empty
/// `REGRAPH_HOME` is ignored.
pub fn regraph_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("REGRAPH_HOME") {
        if home.is_empty() {
            tracing::warn!("REGRAPH_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("REGRAPH_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".regraph"));
    }

    let fallback_path = env::temp_dir().join("regraph");
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback_path.display()
    );
    Some(fallback_path)
}

/// Get the project regraph directory for a working directory.
///
/// The nearest ancestor (including `cwd`) that already has a `.regraph/`
/// directory wins; otherwise `cwd/.regraph`.
pub fn project_regraph_dir(cwd: &Path) -> PathBuf {
    cwd.ancestors()
        .map(|ancestor| ancestor.join(".regraph"))
        .find(|dir| dir.is_dir())
        .unwrap_or_else(|| cwd.join(".regraph"))
}

/// Get the crash log path.
///
/// Returns `<regraph_home>/crash.log`.
pub fn crash_log_path() -> Option<PathBuf> {
    regraph_home().map(|h| h.join("crash.log"))
}
