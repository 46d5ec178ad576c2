use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use runtime_installer::config::InstallerConfig;
use runtime_installer::endpoints::Endpoints;
use runtime_installer::fetch::HttpFetcher;
use runtime_installer::{InstallOutcome, Installer, Layer, Runtime};

#[derive(Parser)]
#[command(name = "runtime-installer")]
#[command(version, about = "Resolve, download and unpack language runtimes")]
struct Cli {
    /// JSON config file (defaults to $XDG_CONFIG_HOME/runtime-installer/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Install a runtime tarball, resolving the version from its catalog
    Install {
        runtime: Runtime,
        /// Exact version or constraint such as "2.x.x" or ">=3.1"; highest when omitted
        #[arg(long)]
        version: Option<String>,
        #[arg(long)]
        target: PathBuf,
    },
    /// Install an SDK zip at a fixed version
    InstallSdk {
        #[arg(long)]
        version: String,
        #[arg(long)]
        target: PathBuf,
    },
    /// Print the version a specifier resolves to
    Resolve {
        runtime: Runtime,
        #[arg(long)]
        version: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    let config =
        InstallerConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let fetcher = HttpFetcher::new(&config.user_agent).context("Failed to create HTTP client")?;
    let installer = Installer::new(fetcher, Endpoints::new(&config.endpoints, &config.os));

    match cli.command {
        Command::Install {
            runtime,
            version,
            target,
        } => {
            let mut layer = Layer::open(&target)?;
            let outcome = installer
                .install_by_specifier(runtime, version.as_deref().unwrap_or(""), &mut layer)
                .with_context(|| format!("Failed to install {runtime}"))?;
            report(runtime.as_str(), &outcome);
        }
        Command::InstallSdk { version, target } => {
            let mut layer = Layer::open(&target)?;
            let outcome = installer
                .install_fixed(&version, &mut layer)
                .with_context(|| format!("Failed to install SDK {version}"))?;
            report("sdk", &outcome);
        }
        Command::Resolve { runtime, version } => {
            let resolved = installer
                .resolve_version(runtime, version.as_deref().unwrap_or(""))
                .with_context(|| format!("Failed to resolve {runtime} version"))?;
            println!("{resolved}");
        }
    }

    Ok(())
}

fn report(name: &str, outcome: &InstallOutcome) {
    match outcome {
        InstallOutcome::Installed(version) => println!("Installed {name} {version}"),
        InstallOutcome::AlreadyInstalled(version) => {
            println!("{name} {version} is already installed")
        }
    }
}

/// Log to stderr, or to `log_file` when given. The returned guard flushes the
/// file writer on drop.
fn init_logging(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let Some(log_file) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let file_name = log_file
        .file_name()
        .context("Log file path has no file name")?;
    let dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(Some(guard))
}
