use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

fn workspace_assets() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../assets")
}

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("nickpack")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("build"));
}

#[test]
fn test_build_writes_bundle_files() {
    let out = tempfile::tempdir().unwrap();
    Command::cargo_bin("nickpack")
        .unwrap()
        .arg("build")
        .args(["--nickname", "testuser"])
        .arg("--assets")
        .arg(workspace_assets())
        .arg("--out")
        .arg(out.path())
        .assert()
        .success();

    for name in [
        "testuser_avatar.png",
        "testuser_cover_primary.png",
        "testuser_cover_secondary.png",
        "testuser_bundle.tar.gz",
    ] {
        let path = out.path().join(name);
        assert!(path.is_file(), "missing output {name}");
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}

#[test]
fn test_build_sanitizes_the_requested_nickname() {
    let out = tempfile::tempdir().unwrap();
    Command::cargo_bin("nickpack")
        .unwrap()
        .arg("build")
        .args(["--nickname", "Foo<Bar>"])
        .arg("--assets")
        .arg(workspace_assets())
        .arg("--out")
        .arg(out.path())
        .assert()
        .success();
    assert!(out.path().join("FooBar_avatar.png").is_file());
}

#[test]
fn test_build_rejects_nickname_that_sanitizes_to_empty() {
    Command::cargo_bin("nickpack")
        .unwrap()
        .arg("build")
        .args(["--nickname", "<>"])
        .arg("--assets")
        .arg(workspace_assets())
        .args(["--out", "unused"])
        .assert()
        .failure();
}
