//! `cubent` — compiles Cubent sources into a Minecraft datapack (spec §6).
//!
//! Cubent does one thing, so unlike `faxt`'s subcommand surface
//! (`init`/`build`/`convert`), this CLI is a single flat argument struct.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use cubent_drv::{Config, DriverError, Session, StaticVersionInfoProvider, VersionSpec};
use cubent_util::span::SourceMap;
use cubent_util::Handler;

#[derive(ClapParser, Debug)]
#[command(name = "cubent", author, version, about = "Compiles Cubent sources into a Minecraft datapack")]
struct Cli {
    /// Output directory for the assembled datapack
    out: PathBuf,

    /// Target engine version ("latest" or "M.N[.P]")
    version: String,

    /// Pack icon (falls back to a bundled default if omitted or unreadable)
    #[arg(short, long)]
    icon: Option<PathBuf>,

    /// Datapack description written into pack.mcmeta
    #[arg(short, long, default_value = cubent_drv::DEFAULT_DESCRIPTION)]
    description: String,

    /// Source directory to compile; repeatable, at least one required
    #[arg(short, long = "source", required = true)]
    sources: Vec<PathBuf>,

    /// Emit debug-level diagnostics
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose { EnvFilter::new("debug") } else { EnvFilter::new("info") };
    let subscriber = tracing_subscriber::fmt::layer().with_target(false).without_time();
    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}

/// Turns the raw CLI args into a [`Config`], the one place this binary
/// uses `anyhow` rather than `DriverError` — nothing downstream of here
/// needs to distinguish "bad CLI input" from "compile failed".
fn build_config(cli: Cli) -> anyhow::Result<Config> {
    let version = VersionSpec::parse(&cli.version)
        .ok_or_else(|| anyhow::anyhow!("invalid engine version '{}', expected \"latest\" or \"M.N[.P]\"", cli.version))?;

    Ok(Config {
        out: cli.out,
        version,
        icon: cli.icon,
        description: cli.description,
        sources: cli.sources,
        verbose: cli.verbose,
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let config = match build_config(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let provider = StaticVersionInfoProvider::new();
    let session = Session::new(config, &provider);

    let handler = Handler::new();
    let mut sources = SourceMap::new();

    match session.compile(&handler, &mut sources) {
        Ok(()) => {
            let warnings = handler.diagnostics().iter().filter(|d| d.level == cubent_util::Level::Warning).count();
            if warnings > 0 {
                eprint!("{}", handler.render(&sources));
            }
            println!("Compiled datapack with {warnings} warning(s)");
            ExitCode::SUCCESS
        }
        Err(DriverError::CompileFailed(count)) => {
            eprint!("{}", handler.render(&sources));
            eprintln!("Error: compilation failed with {count} error(s)");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
