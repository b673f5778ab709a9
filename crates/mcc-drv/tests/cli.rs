//! CLI tests for the `mcc` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn mcc() -> Command {
    Command::cargo_bin("mcc").expect("mcc binary")
}

fn write_source(dir: &TempDir, name: &str, source: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, source).expect("write test source");
    path
}

#[test]
fn compiles_a_file_and_writes_assembly() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "ret42.c", "int main() { return 42; }");
    let output = dir.path().join("ret42.s");

    mcc().arg(&input).arg(&output).assert().success();

    let asm = std::fs::read_to_string(&output).expect("output file");
    assert!(asm.contains("main:"));
    assert!(asm.contains("movq $42, %rax"));
}

#[test]
fn phase_output_appears_on_stdout() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "in.c", "int main() { return 1; }");
    let output = dir.path().join("out.s");

    mcc()
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Phase: 1. Lexical Analysis"))
        .stdout(predicate::str::contains("Abstract Syntax Tree:"))
        .stdout(predicate::str::contains("Symbol Table:"))
        .stdout(predicate::str::contains("Intermediate Representation:"))
        .stdout(predicate::str::contains("Applied Optimizations:"))
        .stdout(predicate::str::contains("Generated Assembly:"));
}

#[test]
fn quiet_suppresses_phase_output() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "in.c", "int main() { return 1; }");
    let output = dir.path().join("out.s");

    mcc()
        .arg("--quiet")
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(output.exists());
}

#[test]
fn semantic_error_exits_nonzero_without_an_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "bad.c", "int main() { int x = y; return x; }");
    let output = dir.path().join("bad.s");

    mcc()
        .arg(&input)
        .arg(&output)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("SemanticError: UndefinedVariable: y"));
    assert!(!output.exists(), "no output file on failure");
}

#[test]
fn arity_mismatch_is_reported() {
    let dir = TempDir::new().unwrap();
    let input = write_source(
        &dir,
        "bad.c",
        "int f(int a, int b) { return a; } int main() { return f(1); }",
    );
    let output = dir.path().join("bad.s");

    mcc()
        .arg(&input)
        .arg(&output)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("SemanticError: ArityMismatch"));
}

#[test]
fn lex_error_is_reported() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "bad.c", "int main() { return 4 @ 2; }");
    let output = dir.path().join("bad.s");

    mcc()
        .arg(&input)
        .arg(&output)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("LexError: "));
}

#[test]
fn missing_input_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.s");

    mcc()
        .arg(dir.path().join("nonexistent.c"))
        .arg(&output)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("IoError: "));
}

#[test]
fn missing_arguments_fail_usage() {
    mcc().assert().failure();
}

#[test]
fn optimization_level_zero_skips_rewrites() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "in.c", "int main() { int x = 2 + 3; return x; }");
    let output = dir.path().join("out.s");

    mcc()
        .arg("-O")
        .arg("0")
        .arg("--quiet")
        .arg(&input)
        .arg(&output)
        .assert()
        .success();

    let asm = std::fs::read_to_string(&output).unwrap();
    assert!(asm.contains("addq"), "no folding at -O0");
}

#[test]
fn version_flag_prints_and_exits() {
    mcc()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mcc"));
}
