//! The external rebuild command
//!
//! Resolves the configured program and arguments into the exact process the
//! coordinator launches, and the artifact paths named in success reports.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::config::ProjectConfig;
use crate::core::mode::{BuildMode, SourcemapMode};

/// A fully resolved rebuild process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildCommand {
    /// Executable name or path
    pub program: String,
    /// Arguments, sourcemap mode last
    pub args: Vec<String>,
    /// Environment added to the inherited one
    pub env: BTreeMap<String, String>,
    /// Working directory
    pub cwd: PathBuf,
}

impl RebuildCommand {
    /// Create a command with no arguments or extra environment
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: cwd.into(),
        }
    }

    /// Append an argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add an environment variable
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Build the rebuild command for a project
    ///
    /// `NODE_ENV` is set from the mode unless the config sets it.
    pub fn from_config(config: &ProjectConfig, mode: BuildMode, project_dir: &Path) -> Self {
        let sourcemap = config.sourcemap_or(mode.default_sourcemap());

        let mut env = BTreeMap::new();
        env.insert("NODE_ENV".to_string(), mode.node_env().to_string());
        env.extend(config.rebuild.env.clone());

        let mut args = config.rebuild.args.clone();
        args.push(sourcemap.as_arg().to_string());

        Self {
            program: config.rebuild.program.clone(),
            args,
            env,
            cwd: project_dir.to_path_buf(),
        }
    }

    /// Command line for logs
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Paths written by a successful rebuild
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Separate map file, only when the sourcemap mode writes one
    pub sourcemap: Option<PathBuf>,
}

impl Artifacts {
    /// Artifacts for a project config under a mode
    pub fn from_config(config: &ProjectConfig, mode: BuildMode) -> Self {
        let sourcemap = config.sourcemap_or(mode.default_sourcemap());
        Self::new(&config.stylesheet.source, &config.stylesheet.output, sourcemap)
    }

    pub fn new(source: &Path, output: &Path, sourcemap: SourcemapMode) -> Self {
        let map = sourcemap.writes_map_file().then(|| {
            let mut name = output.as_os_str().to_owned();
            name.push(".map");
            PathBuf::from(name)
        });

        Self {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            sourcemap: map,
        }
    }
}
