//! Region Manager Entry Point

use clap::{Parser, Subcommand};
use splitroute_common::logging;
use splitroute_regionmgr::output::OutputWriter;
use splitroute_regionmgr::{CachedSource, HttpSource, Pipeline, RegionConfig, Result, ScopeKey};
use splitroute_types::IpAddress;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "regionmgr")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (missing file means defaults)
    #[arg(short = 'c', long, default_value = "regionmgr.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    /// Remove the cached delegation dump before running
    #[arg(long)]
    clear_cache: bool,

    /// Scope to compute, e.g. CN-ipv4 (repeatable, overrides the config)
    #[arg(short = 's', long = "scope")]
    scopes: Vec<ScopeKey>,

    /// Output directory (overrides the config)
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// Delegation dump URL (overrides the config)
    #[arg(long)]
    url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute every scope and write the CIDR list files (default)
    Generate,
    /// Report whether an address is domestic or overseas for each scope
    Check {
        /// IPv4 or IPv6 address
        address: IpAddress,
    },
}

fn load_config(args: &Args) -> Result<RegionConfig> {
    let mut config = RegionConfig::load_or_default(&args.config)?;
    if !args.scopes.is_empty() {
        config.scopes = args.scopes.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }
    if let Some(url) = &args.url {
        config.source.url = url.clone();
    }
    config.validate()?;
    Ok(config)
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;

    let http = HttpSource::new(config.source.url.clone(), config.timeout())?;
    let source = CachedSource::new(http, config.source.cache_path.clone(), config.cache_ttl());
    if args.clear_cache {
        source.clear()?;
    }

    let pipeline = Pipeline::new(config.scopes.iter().cloned());
    let context = pipeline.run(&source).await?;

    match args.command.unwrap_or(Command::Generate) {
        Command::Generate => {
            let writer = OutputWriter::new(config.output.dir.clone());
            let written = writer.write(&context)?;
            info!(
                files = written.len(),
                dir = %writer.dir().display(),
                "Finished writing CIDR lists"
            );
        }
        Command::Check { address } => {
            info!(address = %address, "Checking address");
            let placements = context.classify(&address);
            if placements.is_empty() {
                info!(address = %address, "No configured scope covers this address family");
            }
            for (scope, placement) in placements {
                println!("{}\t{}\t{}", address, scope, placement);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init(&args.log_level) {
        eprintln!("regionmgr: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Starting regionmgr");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("regionmgr failed: {}", e);
            if e.is_retryable() {
                warn!("The registry may be temporarily unavailable; try again later");
            }
            ExitCode::FAILURE
        }
    }
}
