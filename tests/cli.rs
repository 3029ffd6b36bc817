//! CLI smoke tests for the `idg` binary.

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn idg() -> Command {
    Command::cargo_bin("idg").expect("idg binary")
}

#[test]
fn help_lists_commands() {
    idg()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pipeline"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("catalog"));
}

#[test]
fn init_writes_config_with_documented_defaults() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    idg()
        .current_dir(tmp.path())
        .args(["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ideagate.toml"));

    tmp.child("ideagate.toml")
        .assert(predicate::str::contains("duplicate_check = 1.0"));

    // Re-running without --force refuses to clobber.
    idg()
        .current_dir(tmp.path())
        .args(["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    idg()
        .current_dir(tmp.path())
        .args(["init", "--force"])
        .assert()
        .success();

    tmp.close().expect("cleanup");
}

#[test]
fn catalog_lists_builtin_capabilities() {
    idg()
        .args(["catalog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("addin.select.Filter"))
        .stdout(predicate::str::contains("host.db.Transaction"));
}

#[test]
fn catalog_surfaces_shadowed_keys() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    // Two capabilities whose normalized names collide.
    let file = tmp.child("catalog.json");
    file.write_str(
        r#"[
            {"name": "Filter", "qualified_path": "addin.select.Filter",
             "description": "element filtering", "categories": []},
            {"name": "filter", "qualified_path": "host.db.Filter",
             "description": "database-side filtering", "categories": []}
        ]"#,
    )
    .expect("write catalog");

    idg()
        .args(["catalog", "--catalog"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("shadowed lookup keys:"))
        .stdout(predicate::str::contains("kept Filter over filter"));

    tmp.close().expect("cleanup");
}

#[test]
fn completions_generate_for_bash() {
    idg()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("idg"));
}
