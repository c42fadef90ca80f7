//! Line roundtrip tests for the reference parser.
//!
//! Each `#[case]` is one workflow line; no shared state.

use std::path::Path;

use hashpin_core::{parse_workflow_text, scan_workflows};
use rstest::rstest;
use std::fs;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Parameterised roundtrip test
// ---------------------------------------------------------------------------

#[rstest]
#[case("tag_with_comment", "    uses: actions/checkout@v4  # checkout")]
#[case("list_item", "      - uses: actions/setup-node@v4")]
#[case("commit_with_tag_comment", "  - uses: actions/cache@1bd1e32a3bdc45362d1e726936510720a7c30a57 # v4.2.0")]
#[case("sub_path", "      - uses: github/codeql-action/upload-sarif@v3")]
#[case("branch", "      uses: some-org/some-action@main")]
#[case("tight_comment", "  - uses: a/b@v1#pinned")]
#[case("trailing_spaces", "  - uses: a/b@v1   ")]
#[case("crlf", "  - uses: a/b@v1 # old\r")]
#[case("comment_with_extra_words", "  - uses: a/b@v2 # v2.0.0 keep me")]
#[case("double_quoted", r#"      - uses: "actions/checkout@v4""#)]
#[case("double_quoted_with_comment", r#"      - uses: "actions/checkout@v4"  # pinned later"#)]
#[case("single_quoted", "      - uses: 'actions/cache@v3'")]
fn parsed_line_rebuilds_original(#[case] label: &str, #[case] line: &str) {
    let refs = parse_workflow_text(Path::new("ci.yml"), line);
    assert_eq!(refs.len(), 1, "[{label}] expected one reference");
    let r = &refs[0];

    let rebuilt = format!(
        "{}{}@{}{}{}",
        r.prefix(),
        r.repo_path,
        r.current_ref,
        r.comment_section(),
        r.suffix()
    );
    assert_eq!(rebuilt, line, "[{label}] roundtrip");
    assert_eq!(r.original_line, line, "[{label}] original line");
}

#[rstest]
#[case("name: ci")]
#[case("    run: make test")]
#[case("  uses: ./local/action")]
#[case("  uses: docker://ghcr.io/org/image@sha256:0000")]
#[case("  # uses: commented/out@v1")]
#[case("  uses: no-ref-at-all")]
fn non_reference_lines_are_ignored(#[case] line: &str) {
    assert!(parse_workflow_text(Path::new("ci.yml"), line).is_empty());
}

// ---------------------------------------------------------------------------
// Directory scan
// ---------------------------------------------------------------------------

#[test]
fn scan_reads_only_workflow_files_and_sorts_them() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("z.yml"), "  - uses: a/z@v1\n").unwrap();
    fs::write(dir.path().join("a.yaml"), "  - uses: a/a@v1\n  - uses: a/b@v2\n").unwrap();
    fs::write(dir.path().join("notes.md"), "  - uses: a/md@v1\n").unwrap();
    fs::write(dir.path().join("empty.yml"), "name: nothing\n").unwrap();
    fs::create_dir(dir.path().join("nested.yml")).unwrap();

    let outcome = scan_workflows(dir.path()).expect("scan");
    assert!(outcome.failures.is_empty());

    let files: Vec<_> = outcome.actions.iter().map(|(p, _)| p.to_path_buf()).collect();
    assert_eq!(files, vec![dir.path().join("a.yaml"), dir.path().join("z.yml")]);
    assert_eq!(outcome.actions.reference_count(), 3);

    let a = outcome.actions.get(&dir.path().join("a.yaml")).unwrap();
    assert_eq!(a[0].line_number, 1);
    assert_eq!(a[1].line_number, 2);
    assert_eq!(a[1].source_file, dir.path().join("a.yaml"));
}

#[test]
fn scan_reads_references_past_invalid_utf8() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("latin1.yml"), b"# caf\xe9\n  - uses: a/b@v1\n").unwrap();

    let outcome = scan_workflows(dir.path()).expect("scan");
    assert!(outcome.failures.is_empty());
    let refs = outcome.actions.get(&dir.path().join("latin1.yml")).unwrap();
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].line_number, 2);
    assert_eq!(refs[0].current_ref, "v1");
}

#[test]
fn scan_missing_directory_fails_with_path() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join(".github").join("workflows");
    let err = scan_workflows(&missing).expect_err("missing dir");
    assert!(err.to_string().contains("workflows"));
}
