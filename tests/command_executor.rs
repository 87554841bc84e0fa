use assert_fs::TempDir;
use common::command::{git_init, init_repository_dir, repository_dir};
use plumb::areas::command::{Command, RunOpts};
use plumb::config::Config;
use plumb::{ErrorKind, Executor};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;

mod common;

#[tokio::test]
async fn runs_git_and_captures_stdout() -> Result<(), Box<dyn std::error::Error>> {
    let output = Executor::default().command(&["version"]).run().await?;

    assert!(output.starts_with("git version "));

    Ok(())
}

#[tokio::test]
async fn installed_git_is_supported() -> Result<(), Box<dyn std::error::Error>> {
    let version = Executor::default().check_version().await?;

    assert!(version.major >= 1);

    Ok(())
}

#[tokio::test]
async fn missing_binary_is_a_spawn_failure() {
    let config = Config {
        git_binary: "plumb-no-such-binary".into(),
        ..Config::default()
    };

    let error = Executor::new(&config)
        .command(&["version"])
        .run()
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::SpawnFailed);
}

#[rstest]
#[tokio::test]
async fn non_zero_exit_keeps_stderr_and_code(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    git_init(repository_dir.path());

    let error = Executor::default()
        .command(&["rev-parse", "--verify"])
        .add_dynamic_arguments(["no-such-branch"])
        .run_in_dir(repository_dir.path())
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::NonZeroExit);
    assert_eq!(error.exit_code(), Some(128));
    assert!(error.stderr().is_some_and(|stderr| stderr.contains("fatal")));

    Ok(())
}

#[rstest]
#[tokio::test]
async fn option_like_dynamic_argument_is_refused_before_spawning(repository_dir: TempDir) {
    // a missing program would fail to spawn; refusing must happen first
    let error = Command::new("plumb-no-such-binary", &["log"])
        .add_dynamic_arguments(["--output=/tmp/owned"])
        .run_in_dir(repository_dir.path())
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::InvalidInput);
}

#[cfg(unix)]
#[rstest]
#[tokio::test]
async fn deadline_kills_the_process(repository_dir: TempDir) {
    let started = Instant::now();

    let error = Command::new("sleep", &["5"])
        .run_in_dir_timeout(repository_dir.path(), Duration::from_millis(200))
        .await
        .unwrap_err();

    assert!(error.is_timeout());
    assert_eq!(error.kind(), ErrorKind::Timeout);
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[cfg(unix)]
#[rstest]
#[tokio::test]
async fn executor_default_timeout_applies_to_every_run(repository_dir: TempDir) {
    let config = Config {
        git_binary: "sleep".into(),
        ..Config::default()
    }
    .with_default_timeout(Some(Duration::from_millis(200)));

    let error = Executor::new(&config)
        .command(&["5"])
        .run_in_dir(repository_dir.path())
        .await
        .unwrap_err();

    assert!(error.is_timeout());
}

#[rstest]
#[tokio::test]
async fn stdin_is_fed_and_closed(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    git_init(repository_dir.path());

    let stdout = Executor::default()
        .command(&["hash-object", "--stdin"])
        .run_with_opts(
            &RunOpts::in_dir(repository_dir.path())
                .with_timeout(Some(Duration::from_secs(10)))
                .with_stdin("hello\n"),
        )
        .await?;

    assert_eq!(
        String::from_utf8(stdout.to_vec())?.trim(),
        "ce013625030ba8dba906f756967f9e9ca394464a"
    );

    Ok(())
}

#[rstest]
#[tokio::test]
async fn pipeline_streams_stdout_into_the_sink(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut sink = Vec::new();

    Executor::default()
        .command(&["cat-file", "blob"])
        .add_dynamic_arguments(["HEAD:a/2.txt"])
        .run_in_dir_pipeline(init_repository_dir.path(), &mut sink)
        .await?;

    assert_eq!(sink, b"two");

    Ok(())
}

#[rstest]
#[tokio::test]
async fn reader_streams_and_reports_failure_on_finish(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let executor = Executor::default();

    let mut reader = executor
        .command(&["cat-file", "blob"])
        .add_dynamic_arguments(["HEAD:a/b/3.txt"])
        .spawn_reader(init_repository_dir.path())
        .await?;
    let mut content = String::new();
    reader.read_to_string(&mut content).await?;
    reader.finish().await?;
    assert_eq!(content, "three");

    let reader = executor
        .command(&["cat-file", "blob"])
        .add_dynamic_arguments(["HEAD:missing.txt"])
        .spawn_reader(init_repository_dir.path())
        .await?;
    let error = reader.finish().await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NonZeroExit);

    Ok(())
}
