use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};

/// The binary with an isolated config dir and working directory.
fn backport(config_dir: &Path, cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("backport").unwrap();
    cmd.current_dir(cwd)
        .env("BACKPORT_CONFIG_DIR", config_dir)
        .env_remove("BACKPORT_PATCH_SERVICE_URL")
        .env_remove("BACKPORT_TAGS_ENDPOINT")
        .env_remove("BACKPORT_REPOSITORY")
        .env_remove("BACKPORT_LOG");
    cmd
}

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

struct Sandbox {
    config: TempDir,
    work: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            config: tempdir().unwrap(),
            work: tempdir().unwrap(),
        }
    }

    fn cmd(&self) -> Command {
        backport(self.config.path(), self.work.path())
    }
}

#[test]
fn apply_replaces_range_and_keeps_indentation() {
    let sandbox = Sandbox::new();
    let file = sandbox.work.path().join("lib.rs");
    fs::write(&file, "fn main() {\n    old();\n    older();\n}\n").unwrap();

    sandbox
        .cmd()
        .args(["apply", "--file", "lib.rs", "--start", "2", "--end", "3"])
        .args(["--text", "new();\nnewer();"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "fn main() {\n    new();\n    newer();\n}\n"
    );
}

#[test]
fn apply_reads_replacement_from_stdin() {
    let sandbox = Sandbox::new();
    let file = sandbox.work.path().join("notes.txt");
    fs::write(&file, "a\nb\nc").unwrap();

    sandbox
        .cmd()
        .args(["apply", "--file", "notes.txt", "--start", "2", "--end", "2"])
        .args(["--text-file", "-"])
        .write_stdin("B\n")
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&file).unwrap(), "a\nB\nc");
}

#[test]
fn apply_rejects_out_of_range_lines_without_touching_the_file() {
    let sandbox = Sandbox::new();
    let file = sandbox.work.path().join("short.txt");
    fs::write(&file, "one\ntwo").unwrap();

    let output = sandbox
        .cmd()
        .args(["apply", "--file", "short.txt", "--start", "2", "--end", "3"])
        .args(["--text", "x"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("invalid line range"));
    assert_eq!(fs::read_to_string(&file).unwrap(), "one\ntwo");
}

#[test]
fn set_token_stores_trimmed_token() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["set-token", "--token", "  ghp_example  "])
        .assert()
        .success();

    let stored = fs::read_to_string(sandbox.config.path().join("credentials.json")).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(stored["githubToken"], "ghp_example");
}

#[test]
fn set_token_rejects_blank_token() {
    let sandbox = Sandbox::new();

    let output = sandbox
        .cmd()
        .args(["set-token", "--token", "   "])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(!sandbox.config.path().join("credentials.json").exists());
}

#[test]
fn run_without_token_asks_for_one() {
    let sandbox = Sandbox::new();
    fs::write(sandbox.work.path().join("README.md"), "# demo\n").unwrap();

    let output = sandbox
        .cmd()
        .args(["run", "--demo", "--commit", "abc123", "--tag", "v1.0.0"])
        .arg("--workspace")
        .arg(sandbox.work.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("set-token"));
    assert_eq!(
        fs::read_to_string(sandbox.work.path().join("README.md")).unwrap(),
        "# demo\n"
    );
}

#[cfg(unix)]
#[test]
fn demo_run_applies_builtin_patch_after_checkout() {
    let sandbox = Sandbox::new();
    fs::write(sandbox.work.path().join("README.md"), "# demo\nbody\n").unwrap();

    // `true` accepts any arguments, standing in for a git that always succeeds.
    let config = sandbox.config.path().join("run.toml");
    fs::write(&config, "git_program = \"true\"\n").unwrap();

    sandbox
        .cmd()
        .args(["set-token", "--token", "ghp_example"])
        .assert()
        .success();

    sandbox
        .cmd()
        .arg("--config")
        .arg(&config)
        .args(["run", "--demo", "--commit", "abc123", "--tag", "v1.0.0"])
        .arg("--workspace")
        .arg(sandbox.work.path())
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(sandbox.work.path().join("README.md")).unwrap(),
        "<!-- backport demonstration patch -->\nbody\n"
    );
}
