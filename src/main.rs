use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use nastools::commands::{
    dir_tree, download_url, fix_unsplit_cue, move_completed, DownloadOptions, MoveOptions,
};
use nastools::models::ScriptOptions;

/// nastools - housekeeping for a music NAS
#[derive(Parser)]
#[command(name = "nastools")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to nastools.toml in the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split single-file cue/audio images into per-track files
    FixUnsplitCue {
        /// Folder to scan recursively
        folder_path: PathBuf,

        /// Skip directories left with a __temp_split folder by an earlier run
        #[arg(short, long)]
        ignore_failed: bool,

        /// Answer yes to every confirmation
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },

    /// Move finished albums into the artist-organized library
    MoveCompleted {
        /// Folder holding finished album folders
        #[arg(long)]
        source_dir: Option<PathBuf>,

        /// Library root
        #[arg(long)]
        target_dir: Option<PathBuf>,

        /// Copy each album here before moving it
        #[arg(long)]
        backup_dir: Option<PathBuf>,

        /// Print the plan without moving anything
        #[arg(long)]
        dry_run: bool,

        /// Confirm each move and ask for unknown artists
        #[arg(long)]
        interactive: bool,
    },

    /// Print a directory tree
    DirTree {
        /// Root of the tree
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Deepest level to show (root's children are level 1)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Include entries starting with a dot
        #[arg(long)]
        show_hidden: bool,

        /// Include files, not just directories
        #[arg(long)]
        show_files: bool,

        /// Glob pattern of names to leave out (repeatable)
        #[arg(long)]
        exclude: Vec<String>,
    },

    /// Download a URL with retries
    Download {
        /// http(s) URL to fetch
        url: String,

        /// Destination directory (created if missing)
        #[arg(long)]
        dest: Option<PathBuf>,

        /// Referer header
        #[arg(long)]
        referer: Option<String>,

        /// Cookie header
        #[arg(long)]
        cookie: Option<String>,

        /// User-Agent header
        #[arg(long)]
        ua: Option<String>,

        /// Retries after the first attempt
        #[arg(long)]
        retries: Option<u32>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
}

/// Dispatch a command; `Ok(false)` means it ran but reported failures
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let working_dir = std::env::current_dir().context("cannot determine the current directory")?;
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::FixUnsplitCue {
            folder_path,
            ignore_failed,
            yes,
        } => {
            let options = ScriptOptions {
                ignore_failed,
                assume_yes: yes,
            };
            let summary = fix_unsplit_cue(&working_dir, config_path, &folder_path, options)?;
            Ok(!summary.has_failures())
        }

        Commands::MoveCompleted {
            source_dir,
            target_dir,
            backup_dir,
            dry_run,
            interactive,
        } => {
            let options = MoveOptions {
                source_dir,
                target_dir,
                backup_dir,
                dry_run,
                interactive,
            };
            let summary = move_completed(&working_dir, config_path, options)?;
            Ok(!summary.has_failures())
        }

        Commands::DirTree {
            path,
            max_depth,
            show_hidden,
            show_files,
            exclude,
        } => {
            dir_tree(&path, max_depth, show_hidden, show_files, &exclude)?;
            Ok(true)
        }

        Commands::Download {
            url,
            dest,
            referer,
            cookie,
            ua,
            retries,
            timeout,
        } => {
            let options = DownloadOptions {
                url: url.clone(),
                dest,
                referer,
                cookie,
                user_agent: ua,
                retries,
                timeout,
            };
            download_url(&working_dir, config_path, options)
                .await
                .with_context(|| format!("download of {} failed", url))?;
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .init();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
