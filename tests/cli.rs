//! コマンドラインの統合テスト
//!
//! 外部コマンドを起動しない経路のみを検証する。

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn scm_provision(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("scm-provision").expect("binary should build");
    cmd.env_remove("SCM_PROVISION_CONFIG")
        .env_remove("SCM_PROVISION_REGISTRY")
        .env("RUST_LOG", "off")
        .arg("--no-color")
        .arg("--home")
        .arg(home);
    cmd
}

fn write_registry(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("registry.yaml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_help_lists_subcommands() {
    let temp = TempDir::new().unwrap();
    scm_provision(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("branch"))
        .stdout(predicate::str::contains("commit"))
        .stdout(predicate::str::contains("maven"));
}

#[test]
fn test_missing_registry_file_fails_with_path_context() {
    let temp = TempDir::new().unwrap();
    let registry = temp.path().join("absent.yaml");

    let output = scm_provision(temp.path())
        .arg("--registry")
        .arg(&registry)
        .args(["fetch", "--app", "1"])
        .arg(temp.path().join("src"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("Error: Configuration error"))
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["succeeded"], false);
    assert_eq!(report["soft"], false);
    assert_eq!(
        report["context"]["path"],
        registry.display().to_string().as_str()
    );
}

#[test]
fn test_unknown_application_is_reported() {
    let temp = TempDir::new().unwrap();

    let output = scm_provision(temp.path())
        .args(["fetch", "--app", "5"])
        .arg(temp.path().join("src"))
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Error: Registry error: Application 5 not found",
        ))
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["error"], "Registry error: Application 5 not found");
    assert!(report["activity"].as_array().unwrap().is_empty());
}

#[test]
fn test_plain_http_remote_is_rejected_before_fetching() {
    let temp = TempDir::new().unwrap();
    let registry = write_registry(
        temp.path(),
        "applications:\n  - id: 1\n    repository:\n      kind: git\n      url: http://example.com/app.git\n",
    );
    let dest = temp.path().join("src");

    scm_provision(temp.path())
        .arg("--registry")
        .arg(&registry)
        .args(["fetch", "--app", "1"])
        .arg(&dest)
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"soft\": true"))
        .stderr(predicate::str::diff(
            "Error: http URL used with git.insecure.enabled = FALSE\n",
        ));

    assert!(!temp.path().join(".gitconfig").exists());
}

#[test]
fn test_maven_modules_reports_detail() {
    let temp = TempDir::new().unwrap();
    let registry = write_registry(temp.path(), "applications:\n  - id: 2\n    name: app-2\n");
    let source = temp.path().join("src");
    std::fs::create_dir_all(&source).unwrap();
    std::fs::write(
        source.join("pom.xml"),
        "<project><modules><module>core</module></modules></project>",
    )
    .unwrap();

    let output = scm_provision(temp.path())
        .arg("--registry")
        .arg(&registry)
        .args(["maven", "--app", "2", "--bin-dir"])
        .arg(temp.path().join("bin"))
        .arg("modules")
        .arg(&source)
        .assert()
        .success()
        .stderr(predicate::str::is_empty())
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["succeeded"], true);
    assert_eq!(report["detail"]["action"], "modules");
    assert_eq!(report["detail"]["has_modules"], true);
}

#[test]
fn test_log_artifact_is_written() {
    let temp = TempDir::new().unwrap();
    let registry = write_registry(temp.path(), "applications:\n  - id: 2\n");
    let source = temp.path().join("src");
    std::fs::create_dir_all(&source).unwrap();
    std::fs::write(source.join("pom.xml"), "<project></project>").unwrap();
    let log = temp.path().join("logs").join("activity.log");

    scm_provision(temp.path())
        .arg("--registry")
        .arg(&registry)
        .arg("--log-artifact")
        .arg(&log)
        .args(["maven", "--app", "2", "--bin-dir"])
        .arg(temp.path().join("bin"))
        .arg("modules")
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"has_modules\": false"));

    assert!(log.exists());
}
