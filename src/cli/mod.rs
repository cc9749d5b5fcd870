//! CLI mode for netgraph-dl - discovers and downloads repository datasets.

mod progress;

use std::env;
use std::path::PathBuf;

use crate::{
    AppConfig, Discovery, Downloader, Error, Registry, Repository, SessionStats, build_client,
};

use progress::{CliProgress, print_repository_summary, print_summary};

const DEFAULT_REGISTRY: &str = "repositories.json";

/// Which repositories to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoSelection {
    /// Every repository in the registry.
    All,
    /// A single repository id.
    One(String),
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    /// Root output directory.
    pub output_dir: PathBuf,
    /// Repositories to download.
    pub repo: RepoSelection,
    /// Registry JSON file.
    pub registry: PathBuf,
    /// Application config file, if given explicitly.
    pub config: Option<PathBuf>,
    /// Re-enable TLS certificate verification.
    pub verify_tls: bool,
    /// Concurrent file downloads override.
    pub parallel: Option<usize>,
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print usage, listing the repositories of the given registry.
    Help {
        /// Registry JSON file.
        registry: PathBuf,
    },
    /// Download.
    Run(CliArgs),
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

/// Parses command-line arguments (without the program name).
///
/// # Errors
///
/// Returns a message describing the first invalid or missing argument.
pub fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut output_dir = None;
    let mut repo = None;
    let mut registry = PathBuf::from(DEFAULT_REGISTRY);
    let mut config = None;
    let mut verify_tls = false;
    let mut parallel = None;
    let mut help = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-odir" => {
                i += 1;
                output_dir = Some(PathBuf::from(value(args, i, "-odir")?));
            }
            "-repo" => {
                i += 1;
                repo = Some(match value(args, i, "-repo")? {
                    "all" => RepoSelection::All,
                    id => RepoSelection::One(id.to_string()),
                });
            }
            "--registry" => {
                i += 1;
                registry = PathBuf::from(value(args, i, "--registry")?);
            }
            "--config" => {
                i += 1;
                config = Some(PathBuf::from(value(args, i, "--config")?));
            }
            "--verify-tls" => verify_tls = true,
            "-p" | "--parallel" => {
                i += 1;
                let raw = value(args, i, "--parallel")?;
                parallel = Some(
                    raw.parse()
                        .map_err(|_| format!("invalid --parallel value: {raw}"))?,
                );
            }
            "-h" | "--help" => help = true,
            other => return Err(format!("Unknown option: {other}")),
        }
        i += 1;
    }

    if help {
        return Ok(Command::Help { registry });
    }

    Ok(Command::Run(CliArgs {
        output_dir: output_dir.ok_or("-odir is required")?,
        repo: repo.ok_or("-repo is required")?,
        registry,
        config,
        verify_tls,
        parallel,
    }))
}

/// Prints usage, listing the configured repositories when the registry loads.
pub fn print_usage(registry: Option<&Registry>) {
    eprintln!("Usage: netgraph-dl -odir <path> -repo <id|all> [OPTIONS]");
    eprintln!();
    eprintln!("Downloader for network data sets.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -odir <path>        Output directory (required)");
    eprintln!("  -repo <id|all>      Repository to download (required)");
    eprintln!("  --registry <file>   Repository registry (default: {DEFAULT_REGISTRY})");
    eprintln!("  --config <file>     Config file (default: {})", AppConfig::default_path().display());
    eprintln!("  --verify-tls        Verify TLS certificates");
    eprintln!("  -p, --parallel <N>  Concurrent file downloads (default: 1)");
    eprintln!("  -h, --help          Show this help");

    if let Some(registry) = registry.filter(|r| !r.is_empty()) {
        eprintln!();
        eprintln!("Repositories:");
        for repository in registry.iter() {
            eprintln!(
                "  {:<15}Download from {}",
                repository.name, repository.entry_url
            );
        }
    }
}

/// Runs the CLI download mode.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, an output directory
/// cannot be created, or the selected repository cannot be discovered.
pub async fn run() -> crate::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(Command::Run(cli)) => cli,
        Ok(Command::Help { registry }) => {
            print_usage(Registry::load(&registry).ok().as_ref());
            return Ok(());
        }
        Err(message) => {
            eprintln!("Error: {message}");
            eprintln!();
            print_usage(None);
            std::process::exit(1);
        }
    };

    let total = run_with(cli).await?;
    print_summary(&total);
    Ok(())
}

/// Downloads the repositories selected by `cli` into `<output_dir>/<id>`.
///
/// With [`RepoSelection::All`] a repository whose landing page cannot be
/// fetched is logged and skipped; local I/O errors always abort the run.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, an output directory
/// cannot be created, or the selected repository cannot be discovered.
pub async fn run_with(cli: CliArgs) -> crate::Result<SessionStats> {
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
    let mut config = AppConfig::load(&config_path)?;
    if cli.verify_tls {
        config.http.accept_invalid_certs = false;
    }
    if let Some(parallel) = cli.parallel {
        config.download = config.download.with_concurrent_files(parallel);
    }

    let registry = Registry::load(&cli.registry)?;
    let repositories: Vec<&Repository> = match &cli.repo {
        RepoSelection::All => registry.iter().collect(),
        RepoSelection::One(id) => vec![registry.get(id)?],
    };
    let keep_going = cli.repo == RepoSelection::All;

    std::fs::create_dir_all(&cli.output_dir)?;

    let client = build_client(&config.http)?;
    let downloader = Downloader::new(client.clone(), config.download);
    let progress = CliProgress::new();
    let mut total = SessionStats::new();

    for repository in repositories {
        let output_dir = cli.output_dir.join(&repository.name);
        std::fs::create_dir_all(&output_dir)?;

        log::info!("Downloading {} networks.", repository.name);
        let discovery = Discovery::new(repository.clone(), client.clone());
        match downloader
            .download_repository(&discovery, &output_dir, &progress)
            .await
        {
            Ok(stats) => {
                print_repository_summary(&repository.name, &stats);
                total.merge(&stats);
            }
            Err(e) if keep_going && !matches!(e, Error::Io(_)) => {
                log::error!("Could not discover {}: {e}", repository.name);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(total)
}
