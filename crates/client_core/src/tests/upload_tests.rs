use super::*;

#[test]
fn accepts_allowed_extensions_case_insensitively() {
    for filename in ["report.pdf", "REPORT.PDF", "notes.txt", "doc.md", "doc.Markdown"] {
        validate_extension(filename).expect(filename);
    }
}

#[test]
fn rejects_unlisted_extension_with_the_offending_suffix() {
    let err = validate_extension("report.csv").expect_err("csv must fail");
    match err {
        UploadError::UnsupportedType { extension } => assert_eq!(extension, ".csv"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_filename_without_extension() {
    let err = validate_extension("README").expect_err("must fail");
    match err {
        UploadError::UnsupportedType { extension } => assert_eq!(extension, ""),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn only_the_final_suffix_counts() {
    validate_extension("archive.backup.md").expect("final suffix allowed");
    let err = validate_extension("notes.md.bak").expect_err("must fail");
    assert!(matches!(err, UploadError::UnsupportedType { .. }));
}
