use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const FULL_FIXTURE: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\" ?>\n\
<!-- TPC readout pipeline -->\n\
\n\
<environment>\n\
<variable name=\"REST_GAIN\" value=\"120\" overwrite=\"true\"/>\n\
</environment>\n\
<globals>\n\
<parameter name=\"sampling\" value=\"3\" units=\"ns\"/>\n\
</globals>\n\
<section TRestRun name=\"run\">\n\
<parameter name=\"radius\" value=\"12.5\" units=\"mm\">\n\
<for variable=\"n\" from=\"1\" to=\"4\" step=\"1\" />\n\
<parameter name=\"loops\" value=\"done\"/>\n\
</for>\n\
</section>\n";

#[test]
fn converts_a_full_dialect_document() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("run.rml");
    let destination = dir.path().join("run.xml");
    fs::write(&source, FULL_FIXTURE).unwrap();

    let mut cmd = cargo_bin_cmd!("rml");
    cmd.arg("convert")
        .arg(&source)
        .arg(&destination)
        .arg("restManager");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Renamed section tag 'TRestRun'"))
        .stdout(predicate::str::contains(
            "Moved <environment> block into <globals>",
        ))
        .stdout(predicate::str::contains("Added root node <restManager>"));

    let written = fs::read_to_string(&destination).unwrap();
    assert!(written.starts_with("<?xml version=\"1.0\""));
    assert!(!written.contains("<environment>"));
    assert!(!written.contains("<section "));
    assert!(written.contains("<TRestRun name=\"run\">"));
    assert!(written.contains("</TRestRun>"));
    assert!(written.contains("value=\"12.5mm\"/>"));
    assert!(written.contains("<for variable=\"n\" from=\"1\" to=\"4\" step=\"1\" >"));
    assert!(written.trim_end().ends_with("</restManager>"));

    // Environment content precedes the pre-existing globals content.
    let gain = written.find("REST_GAIN").unwrap();
    let sampling = written.find("\"sampling\"").unwrap();
    assert!(written.find("<globals>").unwrap() < gain);
    assert!(gain < sampling);
}

#[test]
fn convert_is_the_default_subcommand() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("run.rml");
    let destination = dir.path().join("run.xml");
    fs::write(&source, FULL_FIXTURE).unwrap();

    let mut cmd = cargo_bin_cmd!("rml");
    cmd.arg(&source).arg(&destination).arg("restManager");

    cmd.assert().success();
    assert!(destination.exists());
}

#[test]
fn quiet_suppresses_narration() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("run.rml");
    let destination = dir.path().join("run.xml");
    fs::write(&source, FULL_FIXTURE).unwrap();

    let mut cmd = cargo_bin_cmd!("rml");
    cmd.arg("convert")
        .arg(&source)
        .arg(&destination)
        .arg("restManager")
        .arg("--quiet");

    cmd.assert().success().stdout(predicate::str::is_empty());
    assert!(destination.exists());
}

#[test]
fn json_prints_a_machine_readable_summary() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("run.rml");
    let destination = dir.path().join("run.xml");
    fs::write(&source, FULL_FIXTURE).unwrap();

    let mut cmd = cargo_bin_cmd!("rml");
    cmd.arg("convert")
        .arg(&source)
        .arg(&destination)
        .arg("restManager")
        .arg("--json");

    let output = cmd.assert().success().get_output().stdout.clone();
    let summary: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(summary["status"], "written");
    assert_eq!(summary["root_wrapped"], true);
    assert_eq!(summary["environment_moved"], true);
    assert_eq!(summary["tally"]["renamed_sections"], 1);
    assert_eq!(summary["tally"]["unit_folds"], 2);
}
