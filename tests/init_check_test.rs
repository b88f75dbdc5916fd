//! Integration tests for `restyle init` and `restyle check`

mod common;

use common::{stderr, stdout, TestProject};

#[test]
fn test_init_creates_default_config() {
    let project = TestProject::new();

    let output = project.run(&["init"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(project.file_exists("restyle.toml"));

    let config = project.read_file("restyle.toml");
    assert!(config.contains("src/global.pcss"));
    assert!(config.contains("build-global-css.mjs"));
    assert!(config.contains("postcss.config.js"));
    assert!(stdout(&output).contains("Created"));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let project = TestProject::new();
    project.create_file("restyle.toml", "# mine\n");

    let output = project.run(&["init"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("--force"));
    assert_eq!(project.read_file("restyle.toml"), "# mine\n");
}

#[test]
fn test_init_force_overwrites() {
    let project = TestProject::new();
    project.create_file("restyle.toml", "# mine\n");

    let output = project.run(&["init", "--force"]);

    assert!(output.status.success());
    assert!(project.read_file("restyle.toml").contains("[rebuild]"));
}

#[test]
fn test_init_respects_config_path() {
    let project = TestProject::new();

    let output = project.run(&["--config", "config/styles.toml", "init"]);

    assert!(output.status.success());
    assert!(project.file_exists("config/styles.toml"));
    assert!(!project.file_exists("restyle.toml"));
}

#[cfg(unix)]
#[test]
fn test_check_passes_for_complete_project() {
    let project = TestProject::with_script("exit 0");

    let output = project.run(&["check"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Configuration is valid"));
    assert!(out.contains("Found program"));
}

#[test]
fn test_check_reports_missing_program() {
    let project = TestProject::new();
    project.create_file(
        "restyle.toml",
        "[rebuild]\nprogram = \"restyle-no-such-program-xyz\"\n",
    );
    project.create_file("src/global.pcss", "");

    let output = project.run(&["check"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Program not found"));
}

#[test]
fn test_check_json_report() {
    let project = TestProject::new();
    project.create_file(
        "restyle.toml",
        "[rebuild]\nprogram = \"restyle-no-such-program-xyz\"\n",
    );

    let output = project.run(&["check", "--json", "--mode", "production"]);

    assert!(!output.status.success());
    let report: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("check output is not JSON");
    assert_eq!(report["config_found"], true);
    assert_eq!(report["mode"], "production");
    assert!(report["program"].is_null());
    assert_eq!(report["source_exists"], false);
    assert_eq!(report["missing_watch_files"].as_array().unwrap().len(), 2);
}

#[test]
fn test_check_rejects_bad_sourcemap_value() {
    let project = TestProject::new();
    project.create_file("restyle.toml", "[rebuild]\nsourcemap = \"external\"\n");

    let output = project.run(&["check"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("external"));
}

#[test]
fn test_no_subcommand_prints_help() {
    let project = TestProject::new();

    let output = project.run(&[]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("Usage"));
}
