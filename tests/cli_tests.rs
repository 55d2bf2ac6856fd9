//! End-to-end command tests driving the compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn write(dir: &Path, name: &str, text: &str) {
    fs::write(dir.join(name), text).expect("write fixture");
}

fn ninjagen(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ninjagen").expect("binary");
    cmd.current_dir(dir);
    cmd
}

#[test]
fn generates_build_file_in_working_directory() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write(
        tmp.path(),
        "project.yml",
        "targets:\n  hello:\n    kind: tool\n    sources:\n      - path: hello.cpp\n",
    );

    ninjagen(tmp.path()).assert().success();

    let ninja = fs::read_to_string(tmp.path().join("build.ninja")).expect("output");
    assert!(ninja.contains("rule compile_cpp"));
    assert!(ninja.contains("build"));
    assert!(ninja.contains("Release/Products/hello: link"));
}

#[test]
fn config_flag_selects_the_output_tree() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write(
        tmp.path(),
        "project.yml",
        "targets:\n  hello:\n    kind: tool\n    sources:\n      - path: hello.cpp\n",
    );

    ninjagen(tmp.path()).args(["--config", "Debug"]).assert().success();

    let ninja = fs::read_to_string(tmp.path().join("build.ninja")).expect("output");
    assert!(ninja.contains("Debug/Products/hello"));
    assert!(ninja.contains("Debug/Intermediates/hello/"));
}

#[test]
fn dangling_dependency_aborts_without_output() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write(
        tmp.path(),
        "project.yml",
        concat!(
            "targets:\n",
            "  app:\n",
            "    kind: tool\n",
            "    sources:\n",
            "      - path: main.cpp\n",
            "    dependencies:\n",
            "      - target: phantom\n",
            "        link: true\n",
        ),
    );

    ninjagen(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("phantom"));
    assert!(
        !tmp.path().join("build.ninja").exists(),
        "a failing run must not leave an output file",
    );
}

#[test]
fn strict_mode_rejects_cross_file_collisions() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write(
        tmp.path(),
        "project.yml",
        concat!(
            "include:\n",
            "  - extra.yml\n",
            "targets:\n",
            "  x:\n",
            "    kind: tool\n",
            "    sources:\n",
            "      - path: x.cpp\n",
        ),
    );
    write(
        tmp.path(),
        "extra.yml",
        "targets:\n  x:\n    kind: tool\n    sources:\n      - path: x.cpp\n",
    );

    ninjagen(tmp.path()).assert().success();

    ninjagen(tmp.path())
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("declared in both"));
}

#[test]
fn missing_descriptor_is_a_readable_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    ninjagen(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("project.yml"));
}

#[test]
fn positional_argument_selects_the_descriptor() {
    let tmp = tempfile::tempdir().expect("tempdir");
    fs::create_dir(tmp.path().join("sub")).expect("mkdir");
    write(
        tmp.path(),
        "sub/other.yml",
        "targets:\n  lib:\n    kind: library.static\n    sources:\n      - path: lib.cpp\n",
    );

    ninjagen(tmp.path()).arg("sub/other.yml").assert().success();

    let ninja = fs::read_to_string(tmp.path().join("build.ninja")).expect("output");
    assert!(ninja.contains("Release/Products/liblib.a: archive"));
    // Relative sources resolve against the declaring descriptor, not cwd.
    assert!(ninja.contains("sub/lib.cpp"));
}
