//! Offline tests for the sthree binary
//!
//! These exercise argument handling, configuration and exit codes without
//! contacting a storage backend.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Run sthree with an isolated config directory and no ambient credentials
fn run_sthree(args: &[&str], config_dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sthree"))
        .args(args)
        .env("STHREE_CONFIG_DIR", config_dir)
        .env("AWS_SHARED_CREDENTIALS_FILE", config_dir.join("no-credentials"))
        .env("AWS_CONFIG_FILE", config_dir.join("no-aws-config"))
        .env("AWS_EC2_METADATA_DISABLED", "true")
        .env_remove("AWS_ACCESS_KEY_ID")
        .env_remove("AWS_SECRET_ACCESS_KEY")
        .env_remove("AWS_SESSION_TOKEN")
        .env_remove("AWS_PROFILE")
        .env_remove("STHREE_ACCESS_KEY")
        .env_remove("STHREE_SECRET_KEY")
        .env_remove("STHREE_ENDPOINT")
        .env_remove("STHREE_REGION")
        .output()
        .expect("Failed to execute sthree")
}

#[test]
fn test_help_lists_commands() {
    let config_dir = TempDir::new().unwrap();
    let output = run_sthree(&["--help"], config_dir.path());
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["ls", "cat", "put", "rm", "stat", "cp", "config"] {
        assert!(stdout.contains(command), "missing {command} in help");
    }
}

#[test]
fn test_config_set_and_show_json() {
    let config_dir = TempDir::new().unwrap();

    let output = run_sthree(
        &[
            "config",
            "set",
            "--region",
            "eu-west-1",
            "--acl",
            "public-read",
        ],
        config_dir.path(),
    );
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(config_dir.path().join("config.toml").exists());

    let output = run_sthree(&["config", "show", "--json"], config_dir.path());
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["region"], "eu-west-1");
    assert_eq!(json["default_acl"], "public-read");
}

#[test]
fn test_config_set_invalid_endpoint_is_usage_error() {
    let config_dir = TempDir::new().unwrap();
    let output = run_sthree(
        &["config", "set", "--endpoint", "no scheme here"],
        config_dir.path(),
    );
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_invalid_acl_is_rejected_by_parser() {
    let config_dir = TempDir::new().unwrap();
    let output = run_sthree(
        &["put", "a.txt", "logs/a.txt", "--acl", "world-writable"],
        config_dir.path(),
    );
    assert!(!output.status.success());
}

#[test]
fn test_cat_requires_object_key() {
    let config_dir = TempDir::new().unwrap();
    let output = run_sthree(&["cat", "logs"], config_dir.path());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_half_key_pair_is_usage_error() {
    let config_dir = TempDir::new().unwrap();
    let output = run_sthree(
        &["ls", "logs", "--access-key", "only-half"],
        config_dir.path(),
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--secret-key"));
}

#[test]
fn test_unreadable_config_is_not_a_usage_error() {
    let config_dir = TempDir::new().unwrap();
    // a directory where the config file should be
    std::fs::create_dir(config_dir.path().join("config.toml")).unwrap();

    let output = run_sthree(&["ls", "logs"], config_dir.path());
    assert_eq!(output.status.code(), Some(1));
}
