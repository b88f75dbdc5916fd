//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// A project with stylesheet inputs and a restyle.toml whose rebuild
    /// step runs `script` under `sh`
    pub fn with_script(script: &str) -> Self {
        let project = Self::new();
        project.create_file("src/global.pcss", "body { margin: 0 }");
        project.create_file("src/global.css", "");
        project.create_file("postcss.config.js", "module.exports = {}");
        project.create_dir("out");
        project.create_file("restyle.toml", &sample_config(script));
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory in the test project
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Command for the restyle binary, run in this project with a clean mode
    /// environment
    pub fn restyle(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_restyle"));
        cmd.current_dir(self.path())
            .env_remove("RESTYLE_MODE")
            .env_remove("NODE_ENV")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run restyle with arguments and wait for it
    pub fn run(&self, args: &[&str]) -> Output {
        self.restyle()
            .args(args)
            .output()
            .expect("Failed to execute restyle")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// restyle.toml running `script` with `sh -c`
///
/// The script sees the sourcemap mode as `$1`.
pub fn sample_config(script: &str) -> String {
    format!(
        r#"
[stylesheet]
source = "src/global.pcss"
output = "static/global.css"

[rebuild]
program = "sh"
args = ["-c", '''{script}''', "restyle-build"]

[watch]
files = ["postcss.config.js", "src/global.css"]
debounce_ms = 50
"#
    )
}

/// Captured stdout as a string
#[allow(dead_code)]
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Captured stderr as a string
#[allow(dead_code)]
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
