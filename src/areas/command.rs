//! Subprocess execution
//!
//! A [`Command`] is a program name plus an argument vector. It is always
//! spawned with an argv array, never through a shell. Runs capture stdout and
//! stderr separately and report three distinct failures: the process could
//! not be spawned, it exited non-zero, or it outlived its deadline.
//!
//! Arguments come in two flavours:
//!
//! - trusted literals (`&'static str`) added with [`Command::add_arguments`]
//! - untrusted values added with [`Command::add_dynamic_arguments`], which
//!   must not look like options

use crate::errors::{GitError, Result};
use bytes::Bytes;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::process::{Child, ChildStderr, ChildStdout};
use tokio::task::JoinHandle;
use tracing::{Instrument, Span, debug};

/// Environment applied to every spawned process.
///
/// Locale-stable output, no credential prompts, no replace refs.
const COMMON_ENVS: [(&str, &str); 3] = [
    ("LC_ALL", "C"),
    ("GIT_TERMINAL_PROMPT", "0"),
    ("GIT_NO_REPLACE_OBJECTS", "1"),
];

const SLOW_RUN_THRESHOLD: Duration = Duration::from_secs(1);

/// Per-run options
#[derive(Debug, Clone, Default)]
pub struct RunOpts {
    /// Working directory, the current one when unset
    pub dir: Option<PathBuf>,
    /// Kill the process once this elapses
    pub timeout: Option<Duration>,
    /// Bytes written to the child's stdin, which is then closed.
    /// Without it the child reads from the null device.
    pub stdin: Option<Bytes>,
}

impl RunOpts {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        RunOpts {
            dir: Some(dir.into()),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_stdin(mut self, stdin: impl Into<Bytes>) -> Self {
        self.stdin = Some(stdin.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Command {
    program: OsString,
    args: Vec<String>,
    envs: Vec<(String, String)>,
    default_timeout: Option<Duration>,
    broken_args: Vec<String>,
    span: Span,
}

impl Command {
    pub fn new(program: impl Into<OsString>, args: &[&'static str]) -> Self {
        Command {
            program: program.into(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
            envs: Vec::new(),
            default_timeout: None,
            broken_args: Vec::new(),
            span: Span::none(),
        }
    }

    pub(crate) fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub(crate) fn with_default_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn add_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Append trusted literal arguments (options or fixed values).
    pub fn add_arguments(mut self, args: &[&'static str]) -> Self {
        self.args.extend(args.iter().map(|arg| arg.to_string()));
        self
    }

    /// Append one computed option such as `--format=zip`.
    ///
    /// Anything not starting with `-` breaks the command.
    pub fn add_option_format(mut self, option: impl Into<String>) -> Self {
        let option = option.into();
        if option.starts_with('-') {
            self.args.push(option);
        } else {
            self.broken_args.push(option);
        }
        self
    }

    /// Append untrusted values. A value starting with `-` could be read as an
    /// option, so it breaks the command instead of being passed along.
    pub fn add_dynamic_arguments<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for value in values {
            let value = value.as_ref();
            if value.starts_with('-') {
                self.broken_args.push(value.to_string());
            } else {
                self.args.push(value.to_string());
            }
        }
        self
    }

    /// Append `--` followed by `paths`, which are then never taken for options.
    pub fn add_dashes_and_list<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args.push("--".to_string());
        self.args
            .extend(paths.into_iter().map(|path| path.as_ref().to_string()));
        self
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Human readable command line for logs and error messages.
    ///
    /// Credentials in URLs are masked and absolute paths shortened.
    pub fn log_string(&self) -> String {
        std::iter::once(self.program.to_string_lossy().to_string())
            .chain(self.args.iter().map(|arg| sanitize_argument(arg)))
            .map(|arg| debug_quote(&arg))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run in the current directory and return stdout as text.
    pub async fn run(&self) -> Result<String> {
        let stdout = self.run_with_opts(&RunOpts::default()).await?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    pub async fn run_in_dir(&self, dir: impl AsRef<Path>) -> Result<String> {
        let stdout = self.run_in_dir_bytes(dir).await?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    pub async fn run_in_dir_bytes(&self, dir: impl AsRef<Path>) -> Result<Bytes> {
        self.run_with_opts(&RunOpts::in_dir(dir.as_ref())).await
    }

    /// Like [`Command::run_in_dir_bytes`] but the child is killed once
    /// `timeout` elapses, yielding [`GitError::Timeout`].
    pub async fn run_in_dir_timeout(
        &self,
        dir: impl AsRef<Path>,
        timeout: Duration,
    ) -> Result<Bytes> {
        self.run_with_opts(&RunOpts::in_dir(dir.as_ref()).with_timeout(Some(timeout)))
            .await
    }

    /// Stream stdout into `sink` as it is produced instead of buffering it.
    pub async fn run_in_dir_pipeline<W>(&self, dir: impl AsRef<Path>, sink: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        self.execute(&RunOpts::in_dir(dir.as_ref()), sink).await
    }

    pub async fn run_with_opts(&self, opts: &RunOpts) -> Result<Bytes> {
        let mut stdout = Vec::new();
        self.execute(opts, &mut stdout).await?;
        Ok(Bytes::from(stdout))
    }

    pub async fn run_pipeline_with_opts<W>(&self, opts: &RunOpts, sink: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        self.execute(opts, sink).await
    }

    /// Spawn the process and hand back its stdout as a stream.
    ///
    /// The caller reads at its own pace and calls [`PipeReader::finish`] to
    /// reap the child. Dropping the reader early kills the process.
    pub async fn spawn_reader(&self, dir: impl AsRef<Path>) -> Result<PipeReader> {
        self.check_broken()?;

        let command = self.log_string();
        let _entered = self.span.enter();
        debug!(command = %command, dir = %dir.as_ref().display(), "spawning git reader");

        let mut child = self
            .build(&RunOpts::in_dir(dir.as_ref()))
            .spawn()
            .map_err(|source| GitError::SpawnFailed {
                command: command.clone(),
                source,
            })?;
        let stdout = child.stdout.take().ok_or_else(|| missing_pipe(&command))?;
        let stderr = child.stderr.take().ok_or_else(|| missing_pipe(&command))?;

        Ok(PipeReader {
            command,
            child,
            stdout,
            stderr: tokio::spawn(drain(stderr)),
        })
    }

    fn check_broken(&self) -> Result<()> {
        match self.broken_args.first() {
            Some(argument) => Err(GitError::BrokenArgument {
                command: self.log_string(),
                argument: argument.clone(),
            }),
            None => Ok(()),
        }
    }

    fn build(&self, opts: &RunOpts) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args)
            .envs(COMMON_ENVS)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(if opts.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &opts.dir {
            cmd.current_dir(dir);
        }

        cmd
    }

    async fn execute<W>(&self, opts: &RunOpts, sink: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        self.check_broken()?;

        let command = self.log_string();
        let timeout = opts.timeout.or(self.default_timeout);
        let dir = opts
            .dir
            .as_deref()
            .map(|dir| sanitize_argument(&dir.to_string_lossy()))
            .unwrap_or_default();

        async {
            debug!(command = %command, dir = %dir, "running git command");
            let started = Instant::now();

            let mut child = self.build(opts).spawn().map_err(|source| GitError::SpawnFailed {
                command: command.clone(),
                source,
            })?;

            let outcome = match timeout {
                Some(limit) => {
                    let bounded =
                        tokio::time::timeout(limit, collect(&mut child, opts.stdin.clone(), sink))
                            .await;
                    let Ok(outcome) = bounded else {
                        // Still running: kill and reap it so no process leaks.
                        let _ = child.kill().await;
                        return Err(GitError::Timeout {
                            command: command.clone(),
                            timeout: limit,
                        });
                    };
                    outcome
                }
                None => collect(&mut child, opts.stdin.clone(), sink).await,
            };

            let elapsed = started.elapsed();
            if elapsed > SLOW_RUN_THRESHOLD {
                debug!(command = %command, ?elapsed, "slow git command");
            }

            let (status, stderr) = outcome.map_err(|source| GitError::Stream {
                command: command.clone(),
                source,
            })?;

            check_status(&command, status, &stderr)
        }
        .instrument(self.span.clone())
        .await
    }
}

/// Feed stdin, drain stdout into `sink` and stderr into a buffer, then reap.
///
/// All three pipes are serviced together so a chatty stderr can never
/// block the child while stdout is being copied.
async fn collect<W>(
    child: &mut Child,
    stdin: Option<Bytes>,
    sink: &mut W,
) -> std::io::Result<(ExitStatus, Vec<u8>)>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let stdin_pipe = child.stdin.take();
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("stdout pipe missing"))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| std::io::Error::other("stderr pipe missing"))?;

    let feed = async move {
        if let (Some(mut pipe), Some(bytes)) = (stdin_pipe, stdin) {
            // The child may exit without reading everything; that is its call.
            match pipe.write_all(&bytes).await {
                Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e),
                _ => {}
            }
            drop(pipe);
        }
        Ok(())
    };

    let mut stderr_buf = Vec::new();
    let (fed, copied, drained) = tokio::join!(
        feed,
        async {
            tokio::io::copy(&mut stdout, sink).await?;
            sink.flush().await
        },
        stderr.read_to_end(&mut stderr_buf),
    );
    fed?;
    copied?;
    drained?;

    let status = child.wait().await?;
    Ok((status, stderr_buf))
}

fn check_status(command: &str, status: ExitStatus, stderr: &[u8]) -> Result<()> {
    if status.success() {
        return Ok(());
    }

    Err(GitError::NonZeroExit {
        command: command.to_string(),
        code: status.code(),
        stderr: String::from_utf8_lossy(stderr).into_owned(),
    })
}

fn missing_pipe(command: &str) -> GitError {
    GitError::Stream {
        command: command.to_string(),
        source: std::io::Error::other("pipe missing"),
    }
}

async fn drain(mut stderr: ChildStderr) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    stderr.read_to_end(&mut buf).await?;
    Ok(buf)
}

/// Streaming view over a running child's stdout
///
/// Stderr is drained by a background task from the start, so the child never
/// stalls on a full stderr pipe while stdout is being read.
#[derive(Debug)]
pub struct PipeReader {
    command: String,
    child: Child,
    stdout: ChildStdout,
    stderr: JoinHandle<std::io::Result<Vec<u8>>>,
}

impl PipeReader {
    /// Wait for the child and surface a non-zero exit with its stderr.
    ///
    /// Unread stdout is discarded.
    pub async fn finish(mut self) -> Result<()> {
        let mut rest = tokio::io::sink();
        tokio::io::copy(&mut self.stdout, &mut rest)
            .await
            .map_err(|source| GitError::Stream {
                command: self.command.clone(),
                source,
            })?;

        let stream_error = |source: std::io::Error| GitError::Stream {
            command: self.command.clone(),
            source,
        };
        let stderr = (&mut self.stderr)
            .await
            .map_err(|e| stream_error(std::io::Error::other(e)))?
            .map_err(stream_error)?;

        let status = self
            .child
            .wait()
            .await
            .map_err(|source| GitError::Stream {
                command: self.command.clone(),
                source,
            })?;

        check_status(&self.command, status, &stderr)
    }
}

impl AsyncRead for PipeReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.stdout).poll_read(cx, buf)
    }
}

fn sanitize_argument(arg: &str) -> String {
    if let Some((scheme, rest)) = arg.split_once("://")
        && let Some((_, host)) = rest.split_once('@')
    {
        return format!("{scheme}://***@{host}");
    }

    let path = Path::new(arg);
    if path.is_absolute() {
        let base = path.file_name().map(|name| name.to_string_lossy());
        let parent = path
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy());
        return match (parent, base) {
            (Some(parent), Some(base)) => format!(".../{parent}/{base}"),
            (None, Some(base)) => format!("/{base}"),
            _ => arg.to_string(),
        };
    }

    arg.to_string()
}

fn debug_quote(arg: &str) -> String {
    if arg.contains([' ', '`', '\'', '"', '\t', '\r', '\n']) {
        format!("{arg:?}")
    } else {
        arg.to_string()
    }
}
