use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const SHA: &str = "11bd71901bbe5b1630ceea73d27597364c9af683";

/// Nothing listens here, so every API call fails fast.
const DEAD_API: &str = "http://127.0.0.1:9";

fn hashpin_cmd(repo: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hashpin"));
    cmd.current_dir(repo)
        .env("GITHUB_TOKEN", "test-token")
        .env("HASHPIN_API_URL", DEAD_API)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("HASHPIN_LOG");
    cmd
}

fn repo_with(files: &[(&str, &str)]) -> TempDir {
    let repo = TempDir::new().expect("repo");
    let workflows = repo.path().join(".github/workflows");
    fs::create_dir_all(&workflows).expect("workflows dir");
    for (name, content) in files {
        fs::write(workflows.join(name), content).expect("write workflow");
    }
    repo
}

// ---------------------------------------------------------------------------
// verify
// ---------------------------------------------------------------------------

#[test]
fn verify_passes_when_everything_is_pinned() {
    let repo = repo_with(&[(
        "ci.yml",
        &format!("jobs:\n  build:\n    steps:\n      - uses: actions/checkout@{SHA} # v4.2.2\n"),
    )]);
    hashpin_cmd(repo.path())
        .arg("verify")
        .assert()
        .success()
        .stdout(contains("are pinned"));
}

#[test]
fn verify_names_every_unpinned_reference() {
    let repo = repo_with(&[
        ("a.yml", "      - uses: actions/checkout@v4\n"),
        ("b.yaml", &format!("      - uses: actions/setup-go@{SHA}\n      - uses: actions/cache@main\n")),
    ]);
    hashpin_cmd(repo.path())
        .arg("verify")
        .assert()
        .failure()
        .stdout(contains("a.yml:1 actions/checkout@v4"))
        .stdout(contains("b.yaml:2 actions/cache@main"))
        .stdout(contains("setup-go").not())
        .stderr(contains("2 unpinned"));
}

#[test]
fn verify_sees_references_in_files_with_latin1_bytes() {
    let repo = repo_with(&[]);
    fs::write(
        repo.path().join(".github/workflows/ci.yml"),
        b"# caf\xe9\n      - uses: actions/checkout@v4\n",
    )
    .unwrap();
    hashpin_cmd(repo.path())
        .arg("verify")
        .assert()
        .failure()
        .stdout(contains("ci.yml:2 actions/checkout@v4"))
        .stderr(contains("1 unpinned"));
}

#[test]
fn verify_accepts_quoted_pinned_references() {
    let repo = repo_with(&[(
        "ci.yml",
        &format!("      - uses: \"actions/checkout@{SHA}\" # v4.2.2\n      - uses: 'actions/cache@v4'\n"),
    )]);
    hashpin_cmd(repo.path())
        .arg("verify")
        .assert()
        .failure()
        .stdout(contains("ci.yml:2 actions/cache@v4"))
        .stdout(contains("actions/checkout").not());
}

#[test]
#[cfg(unix)]
fn unreadable_workflow_is_reported_once_and_fails_the_run() {
    use std::os::unix::fs::PermissionsExt;

    let repo = repo_with(&[
        ("ci.yml", &format!("      - uses: actions/checkout@{SHA}\n")),
        ("locked.yml", "      - uses: actions/cache@v4\n"),
    ]);
    let locked = repo.path().join(".github/workflows/locked.yml");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read(&locked).is_ok() {
        // Running as root: permissions do not stop the read.
        return;
    }

    let output = hashpin_cmd(repo.path())
        .args(["check", "--json"])
        .output()
        .expect("run hashpin");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("locked.yml").count(), 1, "{stderr}");
    assert!(stderr.contains("1 workflow file(s) could not be read"));

    hashpin_cmd(repo.path())
        .arg("verify")
        .assert()
        .failure()
        .stdout(contains("locked.yml"))
        .stdout(contains("are pinned").not());
}

#[test]
fn verify_fails_without_workflow_directory() {
    let repo = TempDir::new().expect("repo");
    hashpin_cmd(repo.path())
        .arg("verify")
        .assert()
        .failure()
        .stderr(contains(".github/workflows"));
}

#[test]
fn workflows_dir_flag_is_honoured() {
    let repo = TempDir::new().expect("repo");
    fs::create_dir(repo.path().join("ci")).expect("ci dir");
    fs::write(repo.path().join("ci/main.yml"), "  - uses: a/b@v1\n").expect("workflow");
    hashpin_cmd(repo.path())
        .args(["--workflows-dir", "ci", "verify"])
        .assert()
        .failure()
        .stdout(contains("a/b@v1"));
}

// ---------------------------------------------------------------------------
// check / update
// ---------------------------------------------------------------------------

#[test]
fn check_without_references_makes_no_api_calls() {
    let repo = repo_with(&[("ci.yml", "jobs:\n  build:\n    runs-on: ubuntu-latest\n")]);
    hashpin_cmd(repo.path())
        .arg("check")
        .assert()
        .success()
        .stdout(contains("No GitHub Actions found"))
        .stdout(contains("GitHub API").not());
}

#[test]
fn check_reports_unreachable_api_as_skipped() {
    let repo = repo_with(&[("ci.yml", "      - uses: actions/checkout@v4\n")]);
    hashpin_cmd(repo.path())
        .arg("check")
        .assert()
        .success()
        .stdout(contains("authenticated via GITHUB_TOKEN"))
        .stdout(contains("could not be checked"))
        .stdout(contains("ci.yml:1 actions/checkout@v4"));
}

#[test]
fn check_json_is_machine_readable() {
    let repo = repo_with(&[("ci.yml", "      - uses: actions/checkout@v4\n")]);
    let output = hashpin_cmd(repo.path())
        .args(["check", "--json"])
        .output()
        .expect("run hashpin");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["summary"]["total"], 1);
    assert_eq!(json["summary"]["skipped"], 1);
    assert_eq!(json["summary"]["unreadable"], 0);
    assert_eq!(json["references"][0]["repo"], "actions/checkout");
    assert_eq!(json["references"][0]["needs_update"], false);
}

#[test]
fn update_rejects_unknown_target_before_any_lookup() {
    let repo = repo_with(&[("ci.yml", "      - uses: actions/checkout@v4\n")]);
    hashpin_cmd(repo.path())
        .args(["update", "missing.yml", "--yes"])
        .assert()
        .failure()
        .stderr(contains("missing.yml"))
        .stdout(contains("GitHub API").not());
}

#[test]
fn update_with_nothing_resolvable_leaves_files_alone() {
    let original = "      - uses: actions/checkout@v4\n";
    let repo = repo_with(&[("ci.yml", original)]);
    hashpin_cmd(repo.path())
        .args(["update", "ci.yml", "--yes"])
        .assert()
        .success()
        .stdout(contains("No updates needed"));

    let workflows = repo.path().join(".github/workflows");
    assert_eq!(fs::read_to_string(workflows.join("ci.yml")).unwrap(), original);
    assert!(!workflows.join("ci.yml.bak").exists());
}

// ---------------------------------------------------------------------------
// install-hooks / version
// ---------------------------------------------------------------------------

#[test]
fn install_hooks_requires_git_repository() {
    let repo = TempDir::new().expect("repo");
    hashpin_cmd(repo.path())
        .arg("install-hooks")
        .assert()
        .failure()
        .stderr(contains("not in a git repository"));
}

#[test]
fn install_hooks_writes_pre_commit_and_pre_push() {
    let repo = TempDir::new().expect("repo");
    fs::create_dir(repo.path().join(".git")).expect(".git");
    hashpin_cmd(repo.path())
        .arg("install-hooks")
        .assert()
        .success()
        .stdout(contains("pre-commit"))
        .stdout(contains("pre-push"));

    assert!(repo.path().join(".git/hooks/pre-commit").is_file());
    assert!(repo.path().join(".git/hooks/pre-push").is_file());
}

#[test]
fn version_prints_build_metadata() {
    let repo = TempDir::new().expect("repo");
    hashpin_cmd(repo.path())
        .arg("version")
        .assert()
        .success()
        .stdout(contains(format!("hashpin {}", env!("CARGO_PKG_VERSION"))))
        .stdout(contains("Git commit:"))
        .stdout(contains("Build time:"));
}
