//! Build mode and sourcemap mode
//!
//! The build mode decides whether a failed rebuild is fatal. It is resolved
//! once by the CLI and handed to the coordinator, never read from the
//! environment inside the core.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::ConfigError;

/// Development (interactive) or production (release) build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum BuildMode {
    /// Iterative builds; rebuild failures are logged and watching continues
    #[value(alias = "dev")]
    Development,
    /// Release builds; a rebuild failure aborts the build
    #[default]
    #[value(alias = "prod")]
    Production,
}

impl BuildMode {
    /// Resolve the mode from an explicit choice, falling back to `NODE_ENV`
    ///
    /// Anything other than `NODE_ENV=development` is a production build.
    pub fn resolve(explicit: Option<Self>, node_env: Option<&str>) -> Self {
        if let Some(mode) = explicit {
            return mode;
        }
        match node_env {
            Some("development") => Self::Development,
            _ => Self::Production,
        }
    }

    /// Whether a non-zero exit of the rebuild step aborts the build
    pub fn failures_are_fatal(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Sourcemap mode used when the config does not set one
    pub fn default_sourcemap(self) -> SourcemapMode {
        match self {
            Self::Development => SourcemapMode::Inline,
            Self::Production => SourcemapMode::Disabled,
        }
    }

    /// Value exported to the rebuild step as `NODE_ENV`
    pub fn node_env(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.node_env())
    }
}

/// How the rebuild step emits sourcemaps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcemapMode {
    /// Separate `.map` file next to the output
    Enabled,
    /// No sourcemap
    Disabled,
    /// Sourcemap embedded in the output stylesheet
    Inline,
}

impl SourcemapMode {
    /// Argument passed to the rebuild step
    pub fn as_arg(self) -> &'static str {
        match self {
            Self::Enabled => "true",
            Self::Disabled => "false",
            Self::Inline => "inline",
        }
    }

    /// Whether the rebuild step writes a separate map file
    pub fn writes_map_file(self) -> bool {
        matches!(self, Self::Enabled)
    }

    /// Parse the string form used on the command line and in reports
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "true" => Ok(Self::Enabled),
            "false" => Ok(Self::Disabled),
            "inline" => Ok(Self::Inline),
            other => Err(ConfigError::InvalidSourcemap {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for SourcemapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_arg())
    }
}

/// Config form: a boolean or the string "inline"
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSourcemap {
    Flag(bool),
    Named(String),
}

impl<'de> Deserialize<'de> for SourcemapMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawSourcemap::deserialize(deserializer)? {
            RawSourcemap::Flag(true) => Ok(Self::Enabled),
            RawSourcemap::Flag(false) => Ok(Self::Disabled),
            RawSourcemap::Named(name) => Self::parse(&name).map_err(serde::de::Error::custom),
        }
    }
}

impl Serialize for SourcemapMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Enabled => serializer.serialize_bool(true),
            Self::Disabled => serializer.serialize_bool(false),
            Self::Inline => serializer.serialize_str("inline"),
        }
    }
}
