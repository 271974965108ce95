use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const GRAMMAR: &str = "\
<!ELEMENT report (header?,row*,footer)>
<!ATTLIST report id CDATA #REQUIRED>
<!ELEMENT header (#PCDATA)>
<!ELEMENT row EMPTY>
<!ELEMENT footer (#PCDATA)>
";

fn write_fixtures(dir: &TempDir, registry: &str) -> (std::path::PathBuf, std::path::PathBuf) {
    let dtd = dir.path().join("schema.dtd");
    let reg = dir.path().join("registry.json");
    fs::write(&dtd, GRAMMAR).expect("write dtd fixture");
    fs::write(&reg, registry).expect("write registry fixture");
    (dtd, reg)
}

fn cmd() -> Command {
    Command::cargo_bin("dtdsync").expect("binary builds")
}

#[test]
fn dry_run_reports_but_never_mutates_storage() {
    let dir = TempDir::new().expect("tempdir");
    let (dtd, reg) = write_fixtures(&dir, "{}");
    let before = fs::read(&reg).expect("read before");

    cmd()
        .args(["--dry-run", "--dtd"])
        .arg(&dtd)
        .arg("--registry")
        .arg(&reg)
        .assert()
        .success()
        .stdout(predicate::str::contains("would add element: report"))
        .stdout(predicate::str::contains("dry run complete"));

    let after = fs::read(&reg).expect("read after");
    assert_eq!(before, after, "dry-run must leave the registry byte-identical");
}

#[test]
fn apply_updates_registry_and_second_run_is_in_sync() {
    let dir = TempDir::new().expect("tempdir");
    let (dtd, reg) = write_fixtures(&dir, "{}");

    cmd()
        .arg("--dtd")
        .arg(&dtd)
        .arg("--registry")
        .arg(&reg)
        .assert()
        .success()
        .stdout(predicate::str::contains("added element: report"))
        .stdout(predicate::str::contains("updated"));

    let updated = fs::read_to_string(&reg).expect("read updated");
    assert!(updated.contains("\"report\""));
    assert!(updated.contains("\"children\""));

    cmd()
        .arg("--dtd")
        .arg(&dtd)
        .arg("--registry")
        .arg(&reg)
        .assert()
        .success()
        .stdout(predicate::str::contains("schemas are in sync"));
}

#[test]
fn zero_edit_apply_does_not_rewrite_the_file() {
    let dir = TempDir::new().expect("tempdir");
    // compact formatting: a rewrite would reformat it, so byte equality
    // proves no write happened
    let registry = r#"{"report":{"props":{"id":{"type":"string","required":true}},"children":["header","row","footer"]},"header":{"props":{}},"row":{"props":{}},"footer":{"props":{}}}"#;
    let (dtd, reg) = write_fixtures(&dir, registry);
    let before = fs::read(&reg).expect("read before");

    cmd()
        .arg("--dtd")
        .arg(&dtd)
        .arg("--registry")
        .arg(&reg)
        .assert()
        .success()
        .stdout(predicate::str::contains("schemas are in sync"));

    let after = fs::read(&reg).expect("read after");
    assert_eq!(before, after, "a zero-edit run must not rewrite the file");
}

#[test]
fn malformed_grammar_fails_with_diagnostic_naming_the_file() {
    let dir = TempDir::new().expect("tempdir");
    let dtd = dir.path().join("broken.dtd");
    let reg = dir.path().join("registry.json");
    fs::write(&dtd, "<!ELEMENT report (header").expect("write dtd");
    fs::write(&reg, "{}").expect("write registry");

    cmd()
        .arg("--dtd")
        .arg(&dtd)
        .arg("--registry")
        .arg(&reg)
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.dtd"))
        .stderr(predicate::str::contains("unterminated declaration"));

    // nothing was written
    assert_eq!(fs::read_to_string(&reg).expect("read registry"), "{}");
}

#[test]
fn invalid_registry_fails_before_any_write() {
    let dir = TempDir::new().expect("tempdir");
    let dtd = dir.path().join("schema.dtd");
    let reg = dir.path().join("registry.json");
    fs::write(&dtd, GRAMMAR).expect("write dtd");
    fs::write(&reg, "[1, 2, 3]").expect("write registry");

    cmd()
        .arg("--dtd")
        .arg(&dtd)
        .arg("--registry")
        .arg(&reg)
        .assert()
        .failure()
        .stderr(predicate::str::contains("registry.json"));

    assert_eq!(fs::read_to_string(&reg).expect("read registry"), "[1, 2, 3]");
}

#[test]
fn missing_grammar_file_fails() {
    let dir = TempDir::new().expect("tempdir");
    let reg = dir.path().join("registry.json");
    fs::write(&reg, "{}").expect("write registry");

    cmd()
        .arg("--dtd")
        .arg(dir.path().join("does-not-exist.dtd"))
        .arg("--registry")
        .arg(&reg)
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.dtd"));
}

#[test]
fn props_less_entry_is_reported_as_anomaly_not_missing_attributes() {
    let dir = TempDir::new().expect("tempdir");
    let (dtd, reg) = write_fixtures(
        &dir,
        r#"{"report": {"description": "legacy entry", "children": ["header", "row", "footer"]}}"#,
    );

    cmd()
        .args(["--dry-run", "--dtd"])
        .arg(&dtd)
        .arg("--registry")
        .arg(&reg)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "skipped for attribute comparison",
        ))
        .stdout(predicate::str::contains("- report"));
}
