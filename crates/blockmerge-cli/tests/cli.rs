use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn cmd(dir: &Path) -> assert_cmd::Command {
    let mut c = cargo_bin_cmd!("blockmerge");
    c.env_remove("BLOCKMERGE_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(dir.join("absent.toml"))
        .arg("--no-color");
    c
}

/// Two blocklists and one allowlist disagreeing about `bad.com` and `x.com`.
fn write_fixture(dir: &Path) -> PathBuf {
    let lists = [
        ("s1", "blocklist", "bad.com\nx.com\n"),
        ("s2", "blocklist", "bad.com\n"),
        ("s3", "allowlist", "x.com\n"),
    ];
    let records: Vec<_> = lists
        .iter()
        .map(|(name, list_type, body)| {
            let path = dir.join(format!("{name}.txt"));
            fs::write(&path, body).unwrap();
            serde_json::json!({
                "name": name,
                "filepath": path,
                "generic_source_type": "domain",
                "list_type": list_type,
                "valid": true,
                "groups": ["mini"],
            })
        })
        .collect();

    let processed = dir.join("processed_files.json");
    fs::write(&processed, serde_json::to_vec(&records).unwrap()).unwrap();
    processed
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("resolve"));
}

#[test]
fn test_run_writes_outputs() {
    let dir = TempDir::new().unwrap();
    let processed = write_fixture(dir.path());
    let out = dir.path().join("out");

    cmd(dir.path())
        .args(["--format", "json", "run", "--checksum", "--processed"])
        .arg(&processed)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""blocked": 1"#))
        .stdout(predicate::str::contains(r#""unresolved_conflicts": 1"#));

    assert_eq!(
        fs::read_to_string(out.join("resolved/domain_blocklist.txt")).unwrap(),
        "bad.com\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("consolidated_groups/mini_domain_blocklist.txt")).unwrap(),
        "bad.com\n"
    );
    assert!(out.join("summaries/overrides.json").exists());
}

#[test]
fn test_run_pretty_reports_conflicts() {
    let dir = TempDir::new().unwrap();
    let processed = write_fixture(dir.path());

    cmd(dir.path())
        .arg("run")
        .arg("--processed")
        .arg(&processed)
        .arg("--output")
        .arg(dir.path().join("out"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Blocked entries"))
        .stdout(predicate::str::contains("1 unresolved conflicts"));
}

#[test]
fn test_resolve_prints_audit_json() {
    let dir = TempDir::new().unwrap();
    let processed = write_fixture(dir.path());

    let output = cmd(dir.path())
        .arg("resolve")
        .arg("--processed")
        .arg(&processed)
        .output()
        .unwrap();
    assert!(output.status.success());

    let audit: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = audit.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["entry"], "x.com");
    assert_eq!(rows[0]["decision"], "conflict");
    assert_eq!(rows[0]["reason"], "equal_counts");
    assert!(!dir.path().join("data").exists());
}

#[test]
fn test_missing_processed_file_fails() {
    let dir = TempDir::new().unwrap();
    cmd(dir.path())
        .arg("run")
        .arg("--processed")
        .arg(dir.path().join("nope.json"))
        .arg("--output")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading processed files"));
}

#[test]
fn test_bad_checksum_algorithm_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("blockmerge.toml");
    fs::write(&config, "[checksum]\nenabled = true\nalgorithm = \"md5\"\n").unwrap();

    cargo_bin_cmd!("blockmerge")
        .arg("--config")
        .arg(&config)
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("md5"));
}
