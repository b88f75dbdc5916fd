//! Project configuration (restyle.toml)
//!
//! Declares the stylesheet paths, the external rebuild command and the files
//! that trigger a rebuild. Every string value supports `${VAR}` environment
//! substitution. A missing file means the defaults.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::defaults;
use crate::core::mode::SourcemapMode;
use crate::error::ConfigError;

/// Contents of `restyle.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    /// Stylesheet paths
    #[serde(default)]
    pub stylesheet: StylesheetConfig,

    /// External rebuild command
    #[serde(default)]
    pub rebuild: RebuildConfig,

    /// Trigger files
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Source and output stylesheet, relative to the project directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StylesheetConfig {
    #[serde(default = "default_source")]
    pub source: PathBuf,

    #[serde(default = "default_output")]
    pub output: PathBuf,
}

/// How to invoke the rebuild step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RebuildConfig {
    /// Executable, looked up on `PATH`
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments placed before the sourcemap mode argument
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Overrides the mode's default sourcemap handling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sourcemap: Option<SourcemapMode>,

    /// Extra environment for the rebuild step
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

/// Files that trigger a rebuild when they change
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchConfig {
    #[serde(default = "default_watch_files")]
    pub files: Vec<PathBuf>,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_source() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_SOURCE)
}

fn default_output() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_OUTPUT)
}

fn default_program() -> String {
    defaults::DEFAULT_PROGRAM.to_string()
}

fn default_args() -> Vec<String> {
    defaults::DEFAULT_ARGS.iter().map(ToString::to_string).collect()
}

fn default_watch_files() -> Vec<PathBuf> {
    defaults::DEFAULT_WATCH_FILES.iter().map(PathBuf::from).collect()
}

fn default_debounce_ms() -> u64 {
    defaults::DEFAULT_DEBOUNCE_MS
}

impl Default for StylesheetConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            output: default_output(),
        }
    }
}

impl Default for RebuildConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            sourcemap: None,
            env: BTreeMap::new(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            files: default_watch_files(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl ProjectConfig {
    /// Load configuration from a specific path
    ///
    /// Returns the defaults if the file does not exist.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config = Self::from_toml(&content).map_err(|e| match e {
            ConfigError::ParseError { error, .. } => ConfigError::ParseError {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration from TOML content
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let parse_error = |error: String| ConfigError::ParseError {
            path: PathBuf::from(defaults::CONFIG_FILE),
            error,
        };

        let mut value: toml::Value = toml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
        substitute_in_value(&mut value);

        let config: Self = value.try_into().map_err(|e: toml::de::Error| parse_error(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write configuration to a path, creating parent directories
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        let write_error = |error: String| ConfigError::WriteError {
            path: path.to_path_buf(),
            error,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
        }

        fs::write(path, self.to_toml()?).map_err(|e| write_error(e.to_string()))
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::WriteError {
            path: PathBuf::from(defaults::CONFIG_FILE),
            error: e.to_string(),
        })
    }

    /// Check values that parse but cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, message: &str| ConfigError::Invalid {
            field: field.to_string(),
            message: message.to_string(),
        };

        if self.rebuild.program.trim().is_empty() {
            return Err(invalid("rebuild.program", "must not be empty"));
        }
        if self.stylesheet.source.as_os_str().is_empty() {
            return Err(invalid("stylesheet.source", "must not be empty"));
        }
        if self.stylesheet.output.as_os_str().is_empty() {
            return Err(invalid("stylesheet.output", "must not be empty"));
        }
        if self.watch.files.is_empty() {
            return Err(invalid("watch.files", "must list at least one file"));
        }
        if self.watch.debounce_ms > defaults::MAX_DEBOUNCE_MS {
            return Err(ConfigError::Invalid {
                field: "watch.debounce_ms".to_string(),
                message: format!("must be at most {}", defaults::MAX_DEBOUNCE_MS),
            });
        }
        Ok(())
    }

    /// Sourcemap mode after applying the mode default
    pub fn sourcemap_or(&self, fallback: SourcemapMode) -> SourcemapMode {
        self.rebuild.sourcemap.unwrap_or(fallback)
    }
}

/// Substitute environment variables in a string using ${VAR} syntax.
///
/// Unset variables become the empty string.
///
/// # Examples
/// ```
/// use restyle::core::config::substitute_env_vars;
///
/// std::env::set_var("RESTYLE_DOC_VAR", "hello");
/// let result = substitute_env_vars("prefix_${RESTYLE_DOC_VAR}_suffix");
/// assert_eq!(result, "prefix_hello_suffix");
/// std::env::remove_var("RESTYLE_DOC_VAR");
/// ```
pub fn substitute_env_vars(input: &str) -> String {
    let re = env_var_pattern();
    re.replace_all(input, |caps: &regex::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_default()
    })
    .into_owned()
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("Invalid env var pattern")
    })
}

/// Recursively substitute environment variables in a TOML value
fn substitute_in_value(value: &mut toml::Value) {
    match value {
        toml::Value::String(s) => {
            *s = substitute_env_vars(s);
        }
        toml::Value::Array(arr) => {
            for item in arr.iter_mut() {
                substitute_in_value(item);
            }
        }
        toml::Value::Table(table) => {
            for (_, v) in table.iter_mut() {
                substitute_in_value(v);
            }
        }
        _ => {}
    }
}
