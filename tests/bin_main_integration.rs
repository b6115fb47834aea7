use predicates::prelude::*;
use std::fs;

const JANE: &str = r#"{
    "personalInfo": { "name": "Jane Doe", "title": "Engineer", "email": "jane@example.com" },
    "experience": [{ "id": 1, "role": "Engineer", "company": "Acme", "period": "2020 - now" }],
    "skills": ["Go"],
    "template": "classic"
}"#;

#[test]
fn test_binary_writes_pdf_named_after_person() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("jane.json");
    fs::write(&input, JANE).unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("cvforge");
    cmd.arg("-p")
        .arg(&input)
        .arg("-o")
        .arg(dir.path())
        .arg("-t")
        .arg("modern");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Jane_Doe_CV.pdf"));

    let bytes = fs::read(dir.path().join("Jane_Doe_CV.pdf")).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn test_binary_writes_docx_and_preview() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("cvforge");
    cmd.arg("-s").arg(JANE).arg("-f").arg("docx").arg("-o").arg(dir.path());
    cmd.assert().success();
    let docx = fs::read(dir.path().join("Jane_Doe_CV.docx")).unwrap();
    assert!(docx.starts_with(b"PK"));

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("cvforge");
    cmd.arg("-s")
        .arg(JANE)
        .arg("-f")
        .arg("preview")
        .arg("-o")
        .arg(dir.path())
        .arg("--label")
        .arg("sectionSkills=Kenntnisse")
        .arg("-q");
    cmd.assert().success().stdout(predicate::str::is_empty());
    let html = fs::read_to_string(dir.path().join("Jane_Doe_CV.html")).unwrap();
    assert!(html.contains("KENNTNISSE"));
    assert!(html.contains("Jane Doe") || html.contains("JANE DOE"));
}

#[test]
fn test_binary_rejects_unknown_template() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("cvforge");
    cmd.arg("-s")
        .arg(JANE)
        .arg("-t")
        .arg("nonexistent")
        .arg("-o")
        .arg(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown template 'nonexistent'"));
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[test]
fn test_binary_rejects_malformed_document() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("cvforge");
    cmd.arg("-s").arg(r#"{"personalInfo":{}}"#);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Malformed document"));
}

#[test]
fn test_binary_returns_failure_when_no_input() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("cvforge");
    cmd.assert().failure();
}

#[test]
fn test_binary_prints_default_configuration() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("cvforge");
    cmd.arg("--get-default-configuration");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("[page]").and(predicate::str::contains("overflow")));
}

#[test]
fn test_binary_lists_templates() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("cvforge");
    cmd.arg("--list-templates");
    cmd.assert().success().stdout(
        predicate::str::contains("modern")
            .and(predicate::str::contains("Executive"))
            .and(predicate::str::contains("technical")),
    );
}

#[test]
fn test_binary_uses_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("cvforge.toml");
    fs::write(&config, "[page]\nsize = \"a4\"\n").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("cvforge");
    cmd.arg("-s")
        .arg(JANE)
        .arg("-c")
        .arg(&config)
        .arg("-o")
        .arg(dir.path());
    cmd.assert().success();

    let doc = lopdf::Document::load(dir.path().join("Jane_Doe_CV.pdf")).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}
