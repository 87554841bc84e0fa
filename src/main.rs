use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use is_terminal::IsTerminal;
use plumb::artifacts::archive::ArchiveFormat;
use plumb::commands::Session;
use plumb::config::Config;
use plumb::{Executor, Repository};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_LOG_FILTER: &str = "plumb=warn";

#[derive(Parser)]
#[command(
    name = "plumb",
    version = "0.1.0",
    about = "Read-only git plumbing over the installed git binary",
    long_about = "Resolves revisions, reads commits and trees, exports archives \
    and installs hooks by running git and parsing its output.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[arg(
        short = 'C',
        id = "repository",
        value_name = "path",
        global = true,
        default_value = ".",
        help = "Run as if started in <path>"
    )]
    repository: PathBuf,
    #[arg(long, global = true, help = "Kill any git process running longer than <secs>")]
    timeout: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(name = "show", about = "Show a commit")]
    Show {
        #[arg(index = 1, default_value = "HEAD")]
        rev: String,
    },
    #[command(name = "rev-parse", about = "Resolve a revision to a full commit id")]
    RevParse {
        #[arg(index = 1)]
        rev: String,
    },
    #[command(name = "count", about = "Count commits reachable from a revision")]
    Count {
        #[arg(index = 1)]
        rev: String,
        #[arg(index = 2, num_args = 0.., help = "Only count commits touching these paths")]
        paths: Vec<String>,
    },
    #[command(name = "ls-tree", about = "List a tree")]
    LsTree {
        #[arg(short, long, help = "Show blob sizes")]
        long: bool,
        #[arg(index = 1)]
        rev: String,
        #[arg(index = 2)]
        path: Option<String>,
    },
    #[command(name = "cat-blob", about = "Print a file as of a revision")]
    CatBlob {
        #[arg(index = 1)]
        rev: String,
        #[arg(index = 2)]
        path: String,
    },
    #[command(name = "last-commit", about = "Show the last commit that touched a path")]
    LastCommit {
        #[arg(index = 1)]
        rev: String,
        #[arg(index = 2)]
        path: String,
    },
    #[command(name = "branches", about = "List local branches")]
    Branches,
    #[command(name = "archive", about = "Export a revision as an archive")]
    Archive {
        #[arg(index = 1)]
        rev: String,
        #[arg(long, default_value = "zip", help = "zip or tar.gz")]
        format: String,
        #[arg(short, long, help = "Archive file to write")]
        output: PathBuf,
    },
    #[command(name = "set-hook", about = "Install a script as the update hook")]
    SetHook {
        #[arg(index = 1)]
        script: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();
    colored::control::set_override(std::io::stdout().is_terminal());

    let cli = Cli::parse();

    let mut config = Config::load_from_env()?;
    if let Some(seconds) = cli.timeout {
        config = config.with_default_timeout((seconds > 0).then(|| Duration::from_secs(seconds)));
    }

    let executor = Executor::new(&config);
    executor.check_version().await?;

    let repository = Repository::open(&cli.repository, executor)
        .with_context(|| format!("cannot open repository at {}", cli.repository.display()))?;
    let mut session = Session::new(repository, Box::new(tokio::io::stdout()));

    match &cli.command {
        Commands::Show { rev } => session.show(rev).await?,
        Commands::RevParse { rev } => session.rev_parse(rev).await?,
        Commands::Count { rev, paths } => session.count(rev, paths).await?,
        Commands::LsTree { long, rev, path } => {
            session.ls_tree(rev, path.as_deref(), *long).await?
        }
        Commands::CatBlob { rev, path } => session.cat_blob(rev, path).await?,
        Commands::LastCommit { rev, path } => session.last_commit(rev, path).await?,
        Commands::Branches => session.branches().await?,
        Commands::Archive {
            rev,
            format,
            output,
        } => {
            let format = format.parse::<ArchiveFormat>()?;
            session.archive(rev, format, output).await?
        }
        Commands::SetHook { script } => session.set_hook(script).await?,
    }

    session.flush().await
}
