//! repos-update: bulk maintenance for many git repositories
//! Scans directory trees for repositories and updates or inspects them in parallel.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use repos_update::commands::{handle_command, RunOptions};
use repos_update::git::Operation;
use repos_update::utils::init_logging;

/// Exit code for configuration errors and unusable roots
const FATAL_EXIT_CODE: u8 = 2;

#[derive(Parser)]
#[command(name = "repos-update")]
#[command(about = "Update and inspect every git repository below a directory")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Update options used when no subcommand is given
    #[command(flatten)]
    update: UpdateArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Pull all remotes and prune stale tracking branches (default)
    Update(UpdateArgs),
    /// List repositories with uncommitted changes
    Dirty(ScanArgs),
    /// Show branch, upstream and dirty state of every repository
    Status(ScanArgs),
    /// List the remotes of every repository
    Remote(ScanArgs),
    /// List repositories without any remote
    #[command(name = "no-remote")]
    NoRemote(ScanArgs),
}

#[derive(Args, Clone)]
struct ScanArgs {
    /// Directories to scan
    #[arg(default_value = ".")]
    roots: Vec<PathBuf>,

    /// Number of repositories processed at once
    #[arg(short = 'j', long, value_parser = clap::value_parser!(u64).range(1..))]
    jobs: Option<u64>,

    /// Print only the summary line
    #[arg(short, long)]
    quiet: bool,

    /// Show absolute repository paths
    #[arg(long)]
    full_path: bool,

    /// Seconds before a single git command is abandoned
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Args, Clone)]
struct UpdateArgs {
    #[command(flatten)]
    scan: ScanArgs,

    /// Fetch and report incoming changes without merging
    #[arg(long)]
    dry_run: bool,
}

impl ScanArgs {
    fn into_options(self, operation: Operation) -> RunOptions {
        RunOptions {
            roots: self.roots,
            operation,
            quiet: self.quiet,
            full_path: self.full_path,
            jobs: self.jobs.and_then(|jobs| usize::try_from(jobs).ok()),
            timeout_secs: self.timeout,
        }
    }
}

impl UpdateArgs {
    fn into_options(self) -> RunOptions {
        let operation = Operation::Update {
            dry_run: self.dry_run,
        };
        self.scan.into_options(operation)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (verbose, options) = match cli.command {
        None => (cli.update.scan.verbose, cli.update.into_options()),
        Some(Commands::Update(args)) => (args.scan.verbose, args.into_options()),
        Some(Commands::Dirty(args)) => (args.verbose, args.into_options(Operation::Dirty)),
        Some(Commands::Status(args)) => (args.verbose, args.into_options(Operation::Status)),
        Some(Commands::Remote(args)) => (args.verbose, args.into_options(Operation::Remote)),
        Some(Commands::NoRemote(args)) => (args.verbose, args.into_options(Operation::NoRemote)),
    };

    init_logging(verbose);

    match handle_command(options).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(FATAL_EXIT_CODE)
        }
    }
}
