use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const SAMPLE: &str = "<?xml version=\"1.0\"?>\n<section TRestRun>\n</section>\n";

#[test]
fn configured_checker_binary_is_used() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("in.rml");
    let destination = dir.path().join("out.xml");
    fs::write(&source, SAMPLE).unwrap();

    let config_path = dir.path().join("rml.toml");
    fs::write(
        &config_path,
        r#"[convert.checker]
binary = "/nonexistent/bin/xmllint"
"#,
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("rml");
    cmd.arg("convert")
        .arg(&source)
        .arg(&destination)
        .arg("restManager")
        .arg("--config")
        .arg(&config_path);

    // The configured checker cannot launch: validation fails with status 1,
    // but the written output stays on disk for inspection.
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("well-formedness checker"));
    assert!(destination.exists());
}

#[test]
fn validation_can_be_disabled_by_config() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("in.rml");
    let destination = dir.path().join("out.xml");
    fs::write(&source, SAMPLE).unwrap();

    let config_path = dir.path().join("rml.toml");
    fs::write(
        &config_path,
        r#"[convert]
validate = false

[convert.checker]
binary = "/nonexistent/bin/xmllint"
"#,
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("rml");
    cmd.arg("convert")
        .arg(&source)
        .arg(&destination)
        .arg("restManager")
        .arg("--config")
        .arg(&config_path);

    cmd.assert().success();
    assert!(destination.exists());
}

#[test]
fn missing_explicit_config_file_is_an_error() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("in.rml");
    fs::write(&source, SAMPLE).unwrap();

    let mut cmd = cargo_bin_cmd!("rml");
    cmd.arg("convert")
        .arg(&source)
        .arg(dir.path().join("out.xml"))
        .arg("restManager")
        .arg("--config")
        .arg(dir.path().join("absent.toml"));

    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Failed to load configuration"));
}
