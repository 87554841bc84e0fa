use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use plumb::{Executor, Repository};
use rstest::fixture;
use std::path::Path;

/// Fixed identity and dates so every run produces the same objects.
const GIT_ENVS: [(&str, &str); 8] = [
    ("GIT_AUTHOR_NAME", "fake_user"),
    ("GIT_AUTHOR_EMAIL", "fake_email@email.com"),
    ("GIT_AUTHOR_DATE", "2023-01-01 12:00:00 +0000"),
    ("GIT_COMMITTER_NAME", "fake_user"),
    ("GIT_COMMITTER_EMAIL", "fake_email@email.com"),
    ("GIT_COMMITTER_DATE", "2023-01-01 12:00:00 +0000"),
    ("GIT_CONFIG_NOSYSTEM", "1"),
    ("LC_ALL", "C"),
];

pub const INITIAL_FILES: [(&str, &str); 3] = [
    ("1.txt", "one"),
    ("a/2.txt", "two"),
    ("a/b/3.txt", "three"),
];

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// Three commits on `master`:
///
/// 1. "Initial commit": `1.txt`, `a/2.txt`, `a/b/3.txt`
/// 2. "Second commit": `1.txt` rewritten
/// 3. "Add script": executable `run.sh` (plus a `link` symlink on unix)
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    let dir = repository_dir.path();
    git_init(dir);

    for (path, content) in INITIAL_FILES {
        write_file(FileSpec::new(dir.join(path), content.to_string()));
    }
    git_commit_all(dir, "Initial commit");

    write_file(FileSpec::new(dir.join("1.txt"), "one, revised".to_string()));
    git_commit_all(dir, "Second commit");

    write_file(FileSpec::new(
        dir.join("run.sh"),
        "#!/bin/sh\necho run\n".to_string(),
    ));
    #[cfg(unix)]
    {
        crate::common::file::make_executable(&dir.join("run.sh"));
        std::os::unix::fs::symlink("1.txt", dir.join("link")).expect("Failed to create symlink");
    }
    git_commit_all(dir, "Add script");

    repository_dir
}

pub fn run_git_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new("git");
    cmd.current_dir(dir);
    // keep the user's global config (signing, hooks, templates) out of the fixtures
    cmd.env("HOME", dir).env("XDG_CONFIG_HOME", dir);
    cmd.envs(GIT_ENVS);
    cmd.args(args);
    cmd
}

/// Run git, assert success and return trimmed stdout.
pub fn git_output(dir: &Path, args: &[&str]) -> String {
    let output = run_git_command(dir, args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run git {:?}: {}", args, e));
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub fn git_init(dir: &Path) {
    git_output(dir, &["init", "--quiet"]);
    git_output(dir, &["symbolic-ref", "HEAD", "refs/heads/master"]);
}

/// Stage everything and commit it, returning the new commit id.
pub fn git_commit_all(dir: &Path, message: &str) -> String {
    git_output(dir, &["add", "--all"]);
    git_commit(dir, message)
}

/// Commit whatever is staged, returning the new commit id.
pub fn git_commit(dir: &Path, message: &str) -> String {
    git_output(
        dir,
        &["-c", "commit.gpgsign=false", "commit", "--quiet", "-m", message],
    );
    git_output(dir, &["rev-parse", "HEAD"])
}

pub fn open_repository(dir: &Path) -> Repository {
    Repository::open(dir, Executor::default()).expect("Failed to open repository")
}

pub fn run_plumb_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("plumb").expect("Failed to find plumb binary");
    cmd.current_dir(dir);
    cmd.env("HOME", dir).env("XDG_CONFIG_HOME", dir);
    cmd.env_remove("PLUMB_GIT_TIMEOUT_SECS");
    cmd.args(args);
    cmd
}
