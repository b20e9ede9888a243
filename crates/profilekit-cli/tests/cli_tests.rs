use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PROFILES: &str = r#"
[jdb]
default = "testapp"
jacl_profile = "testapp"

["jdb:__common__"]
port = 3306

["jdb:testapp"]
database = "testapp"
host = "mysql"

["jdb:other"]
database = "users"

["mail:smtp"]
host = "smtp.example.org"
"#;

fn profilekit(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("profilekit").unwrap();
    cmd.current_dir(dir)
        .env_remove("PROFILEKIT_SOURCE")
        .env_remove("PROFILEKIT_CACHE")
        .env_remove("PROFILEKIT_LOG");
    cmd
}

fn workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("profiles.toml"), PROFILES).unwrap();
    tmp
}

#[test]
fn test_help_output() {
    let tmp = TempDir::new().unwrap();
    profilekit(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Inspect categorized configuration profiles"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_version_output() {
    let tmp = TempDir::new().unwrap();
    profilekit(tmp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_show_default_profile() {
    let tmp = workspace();
    profilekit(tmp.path())
        .args(["show", "jdb"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_name = testapp"))
        .stdout(predicate::str::contains("host = mysql"))
        .stdout(predicate::str::contains("port = 3306"));
}

#[test]
fn test_show_falls_back_to_default() {
    let tmp = workspace();
    profilekit(tmp.path())
        .args(["show", "jdb", "unknown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_name = testapp"));
}

#[test]
fn test_show_exact_unknown_fails() {
    let tmp = workspace();
    profilekit(tmp.path())
        .args(["show", "jdb", "unknown", "--exact"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(r#"Unknown profile "unknown" for "jdb""#));
}

#[test]
fn test_show_missing_default_fails() {
    let tmp = workspace();
    profilekit(tmp.path())
        .args(["show", "mail"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(r#"No default profile for "mail""#));
}

#[test]
fn test_show_json() {
    let tmp = workspace();
    let output = profilekit(tmp.path())
        .args(["show", "jdb", "other", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let profile: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(profile["_name"], "other");
    assert_eq!(profile["database"], "users");
    assert_eq!(profile["port"], 3306);
}

#[test]
fn test_list_command() {
    let tmp = workspace();
    profilekit(tmp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("jdb\n"))
        .stdout(predicate::str::contains("  jacl_profile -> testapp"))
        .stdout(predicate::str::contains("mail\n  smtp\n"));
}

#[test]
fn test_check_command() {
    let tmp = workspace();
    profilekit(tmp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 categories"))
        .stdout(predicate::str::contains("jdb: 2 profiles, 2 aliases"))
        .stdout(predicate::str::contains(r#"no default profile for "mail""#));
}

#[test]
fn test_check_invalid_source_fails() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("profiles.toml"), "[broken").unwrap();

    profilekit(tmp.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load profiles"));
}

#[test]
fn test_explicit_source_missing_fails() {
    let tmp = workspace();
    profilekit(tmp.path())
        .args(["--source", "missing.toml", "check"])
        .assert()
        .failure();
}

#[test]
fn test_source_from_environment() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("custom.toml");
    fs::write(&source, PROFILES).unwrap();

    profilekit(tmp.path())
        .env("PROFILEKIT_SOURCE", &source)
        .args(["show", "jdb", "other"])
        .assert()
        .success()
        .stdout(predicate::str::contains("database = users"));
}

#[test]
fn test_source_found_in_parent_directory() {
    let tmp = workspace();
    let nested = tmp.path().join("app").join("src");
    fs::create_dir_all(&nested).unwrap();

    profilekit(&nested)
        .args(["show", "jdb"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_name = testapp"));
}

#[test]
fn test_cache_file_written() {
    let tmp = workspace();
    let cache = tmp.path().join("cache").join("profiles.json");

    profilekit(tmp.path())
        .arg("--cache")
        .arg(&cache)
        .arg("check")
        .assert()
        .success();

    let cached: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&cache).unwrap()).unwrap();
    assert_eq!(cached["jdb"]["aliases"]["default"], "testapp");
    assert_eq!(cached["jdb"]["profiles"]["jacl_profile"]["_name"], "testapp");
}
