use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::env;
use std::path::PathBuf;
use uiprune::runner::{DEFAULT_BUILD_COMMAND, DEFAULT_COMMIT_COMMAND};
use uiprune::{logging, BuildRunner, CleanOptions, CommitPolicy, ProjectOutcome, PruneOptions};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Delete unused components/ui entries from React projects, then rebuild and commit",
    long_about = None
)]
struct Args {
    /// Directory to search for projects (defaults to current directory)
    path: Option<PathBuf>,

    /// Show what would be deleted without deleting or running commands
    #[arg(long, short = 'n')]
    dry_run: bool,

    /// Show kept entries, scan statistics and skipped projects
    #[arg(long, short)]
    verbose: bool,

    /// Do not run the install/build command
    #[arg(long)]
    no_build: bool,

    /// Do not run the commit command
    #[arg(long)]
    no_commit: bool,

    /// When to commit relative to the build result
    #[arg(long, value_enum, default_value_t = CommitPolicy::Always)]
    commit_policy: CommitPolicy,

    /// Shell command that installs dependencies and builds
    #[arg(long, default_value = DEFAULT_BUILD_COMMAND)]
    build_cmd: String,

    /// Shell command that commits the result
    #[arg(long, default_value = DEFAULT_COMMIT_COMMAND)]
    commit_cmd: String,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let start = match args.path {
        Some(path) => {
            if !path.is_dir() {
                bail!("{} is not a directory", path.display());
            }
            path
        }
        None => env::current_dir().context("Failed to determine current directory")?,
    };

    let options = CleanOptions {
        prune: PruneOptions {
            dry_run: args.dry_run,
            verbose: args.verbose,
        },
        runner: BuildRunner {
            build_command: args.build_cmd,
            commit_command: args.commit_cmd,
            run_build: !args.no_build,
            run_commit: !args.no_commit,
            policy: args.commit_policy,
        },
    };

    let summary = uiprune::run(&start, &options);

    for (root, outcome) in &summary.projects {
        if let ProjectOutcome::Cleaned(report) = outcome {
            println!("{}", format!("Project: {}", root.display()).bold());
            if let Some(build) = &report.build {
                println!("  Build: {}", build.build);
                println!("  Commit: {}", build.commit);
            }
        }
    }

    summary.print(args.dry_run);

    Ok(())
}
