use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// Environment variables that would leak host settings into a test run
const HOST_OVERRIDES: &[&str] = &[
    "TEACHMATE_API_KEY",
    "TEACHMATE_API_BASE",
    "TEACHMATE_MODELS",
    "TEACHMATE_STORE",
    "TEACHMATE_LANGUAGE",
    "RUST_LOG",
];

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// A `teachmate` invocation isolated from host configuration
///
/// Uses `config` when given and a store under `workspace`.
#[allow(dead_code)]
pub fn teachmate(workspace: &TempDir, config: Option<&PathBuf>) -> Command {
    let mut cmd = Command::cargo_bin("teachmate").expect("binary should build");
    for var in HOST_OVERRIDES {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1");
    let config = config
        .cloned()
        .unwrap_or_else(|| workspace.path().join("missing-config.yaml"));
    cmd.arg("--config")
        .arg(config)
        .arg("--storage-path")
        .arg(workspace.path().join("store"));
    cmd
}
