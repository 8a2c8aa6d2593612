use std::path::PathBuf;

use anyhow::Result;
use bobber::App;
use bobber::Config;
use bobber::clients::command::RealCommandRunner;
use bobber::clients::github::CommitState;
use bobber::clients::http::CurlTransport;
use clap::Parser;
use clap::Subcommand;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "bobber")]
#[command(about = "Check out repositories and drive GitHub pull requests for CI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clone or pull a branch into a working directory
    Checkout {
        #[arg(short, long)]
        path: PathBuf,
        #[arg(short, long)]
        url: String,
        #[arg(short, long, default_value = "master")]
        branch: String,
    },
    /// Show commits of a checkout, optionally only those between two revisions
    Log {
        #[arg(short, long)]
        path: PathBuf,
        #[arg(long, requires = "to")]
        from: Option<String>,
        #[arg(long, requires = "from")]
        to: Option<String>,
    },
    /// Show the checked out commit
    Head {
        #[arg(short, long)]
        path: PathBuf,
    },
    /// Show the commit at the tip of a branch on origin
    RemoteHead {
        #[arg(short, long)]
        path: PathBuf,
        #[arg(short, long)]
        branch: String,
    },
    /// List branches on origin
    Branches {
        #[arg(short, long)]
        path: PathBuf,
    },
    /// List open pull requests
    Prs {
        #[arg(short, long)]
        url: String,
    },
    /// Show pull requests by number
    Pr {
        #[arg(short, long)]
        url: String,
        #[arg(required = true)]
        numbers: Vec<u64>,
    },
    /// Merge a pull request
    Merge {
        #[arg(short, long)]
        url: String,
        number: u64,
    },
    /// Report a build state on a commit
    Status {
        #[arg(short, long)]
        url: String,
        #[arg(short, long)]
        commit: String,
        /// pending, success, failure or error
        #[arg(short, long)]
        state: CommitState,
    },
    /// Check that a remote URL is usable
    Validate {
        #[arg(short, long)]
        url: String,
    },
    /// Print the form fields needed to configure a repository
    Elements,
}

fn setup_logging() -> Result<()> {
    let timer = tracing_subscriber::fmt::time::ChronoLocal::new("%H:%M:%S%.3f".into());
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env()?;
    tracing_subscriber::fmt()
        .with_timer(timer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let config = Config::load()?;
    let app = App::new(config, RealCommandRunner, CurlTransport);
    let stdout = &mut std::io::stdout();

    match Cli::parse().command {
        Commands::Checkout { path, url, branch } => {
            app.cmd_checkout(path, &url, &branch, stdout).await?
        }
        Commands::Log { path, from, to } => {
            let range = from.as_deref().zip(to.as_deref());
            app.cmd_log(path, range, stdout).await?
        }
        Commands::Head { path } => app.cmd_head(path, stdout).await?,
        Commands::RemoteHead { path, branch } => {
            app.cmd_remote_head(path, &branch, stdout).await?
        }
        Commands::Branches { path } => app.cmd_branches(path, stdout).await?,
        Commands::Prs { url } => app.cmd_prs(&url, stdout).await?,
        Commands::Pr { url, numbers } => app.cmd_pr(&url, &numbers, stdout).await?,
        Commands::Merge { url, number } => app.cmd_merge(&url, number, stdout).await?,
        Commands::Status { url, commit, state } => {
            app.cmd_status(&url, &commit, state, stdout).await?
        }
        Commands::Validate { url } => app.cmd_validate(&url, stdout).await?,
        Commands::Elements => app.cmd_elements(stdout)?,
    }

    Ok(())
}
