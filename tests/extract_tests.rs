use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use regcompare::{check_deps, extract_text, needs_pdftotext, ExtractError};

fn fake_tool(dir: &Path, script: &str) {
    let bin = dir.join("pdftotext");
    fs::write(&bin, script).unwrap();
    let mut perms = fs::metadata(&bin).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&bin, perms).unwrap();
}

#[test]
fn text_sources_are_read_directly() {
    let td = tempfile::tempdir().unwrap();
    let txt = td.path().join("old.txt");
    fs::write(&txt, "Pasal 1\nIsi").unwrap();
    assert!(!needs_pdftotext(&txt));
    assert_eq!(extract_text(&txt, true).unwrap(), "Pasal 1\nIsi");

    let missing = td.path().join("nope.pdf");
    assert!(matches!(extract_text(&missing, true), Err(ExtractError::FileNotFound(_))));
}

// Single test: it rewrites PATH for the whole process.
#[test]
fn pdf_sources_go_through_pdftotext() {
    let td = tempfile::tempdir().unwrap();
    let pdf = td.path().join("doc.pdf");
    fs::write(&pdf, b"%PDF-1.4\n").unwrap();
    assert!(needs_pdftotext(&pdf));

    let empty = td.path().join("empty-bin");
    fs::create_dir_all(&empty).unwrap();
    std::env::set_var("PATH", empty.display().to_string());
    let deps = check_deps();
    assert!(!deps.ok);
    assert_eq!(deps.missing, vec!["pdftotext".to_string()]);
    assert!(matches!(extract_text(&pdf, true), Err(ExtractError::ToolMissing)));

    let ok_bin = td.path().join("ok-bin");
    fs::create_dir_all(&ok_bin).unwrap();
    fake_tool(&ok_bin, "#!/bin/sh\necho 'Pasal 1 Isi'\n");
    std::env::set_var("PATH", ok_bin.display().to_string());
    assert!(check_deps().ok);
    assert_eq!(extract_text(&pdf, true).unwrap(), "Pasal 1 Isi\n");

    let locked_bin = td.path().join("locked-bin");
    fs::create_dir_all(&locked_bin).unwrap();
    fake_tool(&locked_bin, "#!/bin/sh\necho 'Command Line Error: Incorrect password' >&2\nexit 1\n");
    std::env::set_var("PATH", locked_bin.display().to_string());
    assert!(matches!(extract_text(&pdf, false), Err(ExtractError::EncryptedPdf(_))));
}
