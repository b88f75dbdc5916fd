//! Output formatting
//!
//! Global output settings, status messages, error display and the event
//! sinks that render rebuild events for humans or as NDJSON.

use std::io::Write;
use std::sync::{Arc, OnceLock};

use crossterm::style::{StyledContent, Stylize};
use crossterm::tty::IsTty;

use crate::core::events::{EventSink, RebuildEvent};

static OUTPUT: OnceLock<OutputConfig> = OnceLock::new();

/// Output settings from the global CLI flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    pub quiet: bool,
    pub json: bool,
    pub verbose: u8,
}

impl OutputConfig {
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Make this the process-wide output configuration
    ///
    /// Only the first call has an effect.
    pub fn apply_global(self) {
        if OUTPUT.set(self).is_err() {
            tracing::debug!("Output configuration already set");
        }
    }

    /// The process-wide configuration, or the default if none was applied
    pub fn current() -> Self {
        OUTPUT.get().copied().unwrap_or_default()
    }
}

/// Whether JSON output was requested
pub fn is_json() -> bool {
    OutputConfig::current().json
}

/// Whether quiet output was requested
pub fn is_quiet() -> bool {
    OutputConfig::current().quiet
}

fn human_output() -> bool {
    let config = OutputConfig::current();
    !config.quiet && !config.json
}

/// Print a success message
pub fn print_success(message: &str) {
    if human_output() {
        println!("{} {message}", paint(status::SUCCESS.green(), stdout_color()));
    }
}

/// Print an informational message
pub fn print_info(message: &str) {
    if human_output() {
        println!("{} {message}", paint(status::INFO.blue(), stdout_color()));
    }
}

/// Print a warning to stderr
pub fn print_warning(message: &str) {
    if !is_json() {
        eprintln!("{} {message}", paint(status::WARNING.yellow(), stderr_color()));
    }
}

/// Print an indented detail line
pub fn print_detail(message: &str) {
    if human_output() {
        println!("  {message}");
    }
}

/// Display an error and its causes on stderr
pub fn display_error(error: &anyhow::Error) {
    if is_json() {
        let causes: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
        let json = serde_json::json!({
            "error": error.to_string(),
            "causes": causes,
        });
        eprintln!("{json}");
        return;
    }

    let color = stderr_color();
    eprintln!("{} {error}", paint("Error:".red().bold(), color));
    for cause in error.chain().skip(1) {
        eprintln!("  {} {cause}", paint("caused by:".dark_grey(), color));
    }
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

fn stdout_color() -> bool {
    std::io::stdout().is_tty()
}

fn stderr_color() -> bool {
    std::io::stderr().is_tty()
}

fn paint(content: StyledContent<&str>, color: bool) -> String {
    if color {
        content.to_string()
    } else {
        (*content.content()).to_string()
    }
}

/// A rendered output line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Out(String),
    Err(String),
}

/// Renders rebuild events for a terminal
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    verbose: u8,
    quiet: bool,
    color: bool,
}

impl ConsoleSink {
    pub fn new(verbose: u8, quiet: bool, color: bool) -> Self {
        Self {
            verbose,
            quiet,
            color,
        }
    }

    /// Console sink for the global output settings
    pub fn from_global() -> Self {
        let config = OutputConfig::current();
        Self::new(config.verbose, config.quiet, stdout_color())
    }

    fn verbose_line(&self, message: &str) -> Vec<Line> {
        if self.verbose > 0 && !self.quiet {
            vec![Line::Out(format!(
                "{} {message}",
                paint(status::INFO.blue(), self.color)
            ))]
        } else {
            Vec::new()
        }
    }

    /// Lines printed for an event
    pub fn render(&self, event: &RebuildEvent) -> Vec<Line> {
        let failed = || paint("✗ global css".red().bold(), self.color);

        match event {
            RebuildEvent::Succeeded {
                elapsed_ms,
                source,
                output,
                sourcemap,
                ..
            } => {
                if self.quiet {
                    return Vec::new();
                }
                let map = sourcemap
                    .as_ref()
                    .map(|map| format!(" + {map}"))
                    .unwrap_or_default();
                let elapsed = format!("({elapsed_ms}ms)");
                vec![Line::Out(format!(
                    "{} ({source} → {output}{map}) {}",
                    paint("✔ global css".green().bold(), self.color),
                    paint(elapsed.as_str().dark_grey(), self.color),
                ))]
            }
            RebuildEvent::Failed { code, fatal, .. } => {
                let mut lines = Vec::new();
                // Fatal failures end the run and are reported as the error
                if !fatal {
                    lines.push(Line::Err(format!(
                        "global css builder exited with code {code}"
                    )));
                }
                lines.push(Line::Err(failed()));
                lines
            }
            RebuildEvent::SpawnFailed { message } => {
                vec![Line::Err(failed()), Line::Err(format!("  {message}"))]
            }
            RebuildEvent::Rebuilding => {
                if self.quiet {
                    return Vec::new();
                }
                vec![
                    Line::Out(String::new()),
                    Line::Out(format!(
                        "{} changed. rebuilding...",
                        paint("something".cyan().bold().italic(), self.color)
                    )),
                ]
            }
            RebuildEvent::WatchStarted { files } => {
                if self.quiet {
                    return Vec::new();
                }
                vec![Line::Out(format!(
                    "{} watching {}",
                    paint(status::INFO.blue(), self.color),
                    files.join(", ")
                ))]
            }
            RebuildEvent::FileChanged { path } => self.verbose_line(&format!("changed: {path}")),
            RebuildEvent::BuildStarted { build, command } => {
                self.verbose_line(&format!("build #{build}: {command}"))
            }
            RebuildEvent::Coalesced => self.verbose_line("change queued behind running build"),
            RebuildEvent::Shutdown => self.verbose_line("stopped watching"),
        }
    }
}

impl EventSink for ConsoleSink {
    fn emit(&self, event: &RebuildEvent) {
        for line in self.render(event) {
            match line {
                Line::Out(text) => println!("{text}"),
                Line::Err(text) => eprintln!("{text}"),
            }
        }
    }
}

/// Writes one JSON object per event to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSink;

impl EventSink for JsonSink {
    fn emit(&self, event: &RebuildEvent) {
        let mut stdout = std::io::stdout().lock();
        if writeln!(stdout, "{}", event.to_json()).and_then(|()| stdout.flush()).is_err() {
            tracing::debug!("Failed to write event to stdout");
        }
    }
}

/// Event sink for the global output settings
pub fn event_sink() -> Arc<dyn EventSink> {
    if is_json() {
        Arc::new(JsonSink)
    } else {
        Arc::new(ConsoleSink::from_global())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(verbose: u8, quiet: bool) -> ConsoleSink {
        ConsoleSink::new(verbose, quiet, false)
    }

    fn succeeded(sourcemap: Option<&str>) -> RebuildEvent {
        RebuildEvent::Succeeded {
            build: 1,
            elapsed_ms: 87,
            source: "src/global.pcss".to_string(),
            output: "static/global.css".to_string(),
            sourcemap: sourcemap.map(ToString::to_string),
        }
    }

    #[test]
    fn test_success_line() {
        let lines = plain(0, false).render(&succeeded(None));
        assert_eq!(
            lines,
            vec![Line::Out(
                "✔ global css (src/global.pcss → static/global.css) (87ms)".to_string()
            )]
        );
    }

    #[test]
    fn test_success_line_with_map_file() {
        let lines = plain(0, false).render(&succeeded(Some("static/global.css.map")));
        assert_eq!(
            lines,
            vec![Line::Out(
                "✔ global css (src/global.pcss → static/global.css + static/global.css.map) (87ms)"
                    .to_string()
            )]
        );
    }

    #[test]
    fn test_non_fatal_failure_goes_to_stderr() {
        let lines = plain(0, false).render(&RebuildEvent::Failed {
            build: 1,
            code: 2,
            fatal: false,
        });
        assert_eq!(
            lines,
            vec![
                Line::Err("global css builder exited with code 2".to_string()),
                Line::Err("✗ global css".to_string()),
            ]
        );
    }

    #[test]
    fn test_fatal_failure_leaves_message_to_error_display() {
        let lines = plain(0, false).render(&RebuildEvent::Failed {
            build: 1,
            code: 2,
            fatal: true,
        });
        assert_eq!(lines, vec![Line::Err("✗ global css".to_string())]);
    }

    #[test]
    fn test_rebuilding_has_blank_line() {
        let lines = plain(0, false).render(&RebuildEvent::Rebuilding);
        assert_eq!(
            lines,
            vec![
                Line::Out(String::new()),
                Line::Out("something changed. rebuilding...".to_string()),
            ]
        );
    }

    #[test]
    fn test_quiet_keeps_only_errors() {
        let sink = plain(0, true);
        assert!(sink.render(&succeeded(None)).is_empty());
        assert!(sink.render(&RebuildEvent::Rebuilding).is_empty());
        assert!(!sink
            .render(&RebuildEvent::SpawnFailed {
                message: "not found".to_string()
            })
            .is_empty());
    }

    #[test]
    fn test_detail_events_need_verbose() {
        let event = RebuildEvent::FileChanged {
            path: "src/global.css".to_string(),
        };
        assert!(plain(0, false).render(&event).is_empty());
        assert_eq!(
            plain(1, false).render(&event),
            vec![Line::Out("ℹ changed: src/global.css".to_string())]
        );
    }

    #[test]
    fn test_colored_output_keeps_text() {
        let lines = ConsoleSink::new(0, false, true).render(&succeeded(None));
        let Line::Out(text) = &lines[0] else {
            panic!("expected stdout line");
        };
        assert!(text.contains("✔ global css"));
        assert!(text.contains("\u{1b}["));
    }

    #[test]
    fn test_output_config_default() {
        let config = OutputConfig::default();
        assert!(!config.quiet);
        assert!(!config.json);
        assert_eq!(config.verbose, 0);
    }
}
