use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

const RESOURCES: &str = r#"
resources:
  - name: my-instance
    type: compute.v1.instance
    properties:
      zone: us-central1-f
      description: null
      labels:
        category: test
  - name: my-bucket
    type: storage.v1.bucket
    properties:
      location: US
"#;

/// 設定ファイル探索がホスト環境に依存しないようにしたコマンド
fn deployflow(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("deployflow").unwrap();
    cmd.current_dir(home)
        .env("XDG_CONFIG_HOME", home)
        .env("HOME", home)
        .env_remove("DEPLOYFLOW_CONFIG_PATH")
        .env_remove("DEPLOYFLOW_PROJECT")
        .env_remove("DEPLOYFLOW_POLL_INTERVAL")
        .env_remove("DEPLOYFLOW_TIMEOUT")
        .env_remove("DEPLOYFLOW_ENDPOINT");
    cmd
}

#[test]
fn test_version() {
    let temp_dir = tempfile::tempdir().unwrap();

    deployflow(temp_dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("deployflow "));
}

#[test]
fn test_render_normalizes_resources() {
    let temp_dir = tempfile::tempdir().unwrap();
    let file = temp_dir.path().join("resources.yaml");
    fs::write(&file, RESOURCES).unwrap();

    deployflow(temp_dir.path())
        .args(["render", "-f"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("resources:"))
        .stdout(predicate::str::contains("my-instance"))
        .stdout(predicate::str::contains("zone: us-central1-f"))
        .stdout(predicate::str::contains("description").not());
}

#[test]
fn test_render_missing_file() {
    let temp_dir = tempfile::tempdir().unwrap();

    deployflow(temp_dir.path())
        .args(["render", "-f", "missing.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.yaml"));
}

#[test]
fn test_render_empty_resource_set() {
    let temp_dir = tempfile::tempdir().unwrap();
    let file = temp_dir.path().join("resources.yaml");
    fs::write(&file, "resources: []\n").unwrap();

    deployflow(temp_dir.path())
        .args(["render", "-f"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("リソースがありません"));
}

#[test]
fn test_insert_requires_project() {
    let temp_dir = tempfile::tempdir().unwrap();
    let file = temp_dir.path().join("resources.yaml");
    fs::write(&file, RESOURCES).unwrap();

    deployflow(temp_dir.path())
        .args(["insert", "my-deployment", "-f"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("DEPLOYFLOW_PROJECT"));
}

#[test]
fn test_delete_without_yes_does_nothing() {
    let temp_dir = tempfile::tempdir().unwrap();

    deployflow(temp_dir.path())
        .args(["delete", "my-deployment", "--project", "test-project"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));
}

#[test]
fn test_project_from_settings_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join("deployflow.yaml"),
        "project: from-settings\n",
    )
    .unwrap();

    deployflow(temp_dir.path())
        .args(["delete", "my-deployment"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));
}

#[test]
fn test_zero_interval_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();

    deployflow(temp_dir.path())
        .args(["delete", "my-deployment", "--yes", "--project", "p", "--interval", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--interval"));
}

#[test]
fn test_zero_interval_in_settings_file_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join("deployflow.yaml"),
        "project: p\npoll_interval_secs: 0\n",
    )
    .unwrap();

    deployflow(temp_dir.path())
        .args(["delete", "my-deployment", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("poll_interval_secs"));
}
