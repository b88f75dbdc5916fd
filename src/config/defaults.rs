//! Default configuration values

/// Project configuration file name
pub const CONFIG_FILE: &str = "restyle.toml";

/// Stylesheet source read by the rebuild step
pub const DEFAULT_SOURCE: &str = "src/global.pcss";

/// Stylesheet written by the rebuild step
pub const DEFAULT_OUTPUT: &str = "static/global.css";

/// Program that runs the rebuild script
pub const DEFAULT_PROGRAM: &str = "node";

/// Arguments passed before the sourcemap mode argument
pub const DEFAULT_ARGS: &[&str] = &[
    "--experimental-modules",
    "--unhandled-rejections=strict",
    "build-global-css.mjs",
];

/// Files whose changes trigger a rebuild
pub const DEFAULT_WATCH_FILES: &[&str] = &["postcss.config.js", "src/global.css"];

/// Quiet period before a burst of file changes becomes one trigger
pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// Upper bound accepted for `watch.debounce_ms`
pub const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Environment variable selecting the build mode
pub const ENV_MODE: &str = "RESTYLE_MODE";

/// Environment variable consulted when no mode is given explicitly
pub const ENV_NODE_ENV: &str = "NODE_ENV";

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;
