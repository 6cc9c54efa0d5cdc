// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn danku() -> Command {
    let mut cmd = Command::cargo_bin("danku").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("DANKU_CONFIG")
        .env_remove("DANKU_GITHUB_API_URL")
        .env_remove("DANKU_CLOUDFLARE_API_URL");
    cmd
}

#[test]
fn config_path_prints_override() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.jsonc");

    danku()
        .arg("--config")
        .arg(&path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.jsonc"));
}

#[test]
fn config_path_reads_environment() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("from-env.jsonc");

    danku()
        .env("DANKU_CONFIG", &path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from-env.jsonc"));
}

#[test]
fn first_run_writes_default_config_and_fails() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("danku").join("config.jsonc");

    danku()
        .current_dir(temp.path())
        .arg("--config")
        .arg(&path)
        .args(["new", "acme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Created default configuration"));

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("\"deploymentTarget\""));
    assert!(!temp.path().join("acme").exists());
}

#[test]
fn invalid_config_is_reported_before_anything_runs() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.jsonc");
    std::fs::write(
        &path,
        r#"{
  // no deployment target
  "boilerplate": {},
  "deploymentTarget": {},
  "gitProvider": { "gitHub": { "token": "ghp_x" } }
}"#,
    )
    .unwrap();

    danku()
        .current_dir(temp.path())
        .arg("--config")
        .arg(&path)
        .args(["new", "acme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("validation failed"));

    assert!(!temp.path().join("acme").exists());
}

#[test]
fn config_syntax_error_is_reported() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.jsonc");
    std::fs::write(&path, "{ \"boilerplate\": ").unwrap();

    danku()
        .arg("--config")
        .arg(&path)
        .args(["config", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("parsing failed"));
}

#[test]
fn config_init_twice_needs_force() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.jsonc");

    danku()
        .arg("--config")
        .arg(&path)
        .args(["config", "init"])
        .assert()
        .success();

    danku()
        .arg("--config")
        .arg(&path)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    danku()
        .arg("--config")
        .arg(&path)
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn module_outside_sveltekit_project_fails() {
    let temp = TempDir::new().unwrap();

    danku()
        .arg("-C")
        .arg(temp.path())
        .args(["module", "analytics"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SvelteKit project"));
}
