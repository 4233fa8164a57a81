//! Route Synchronizer Entry Point

use clap::Parser;
use splitroute_common::logging;
use splitroute_routesync::{
    load_cidr_file, Result, RouteExeBackend, RouteSyncConfig, RouteSyncError, RouteSynchronizer,
};
use splitroute_types::IpAddress;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

/// Exit status when the tunnel never came up.
const EXIT_TUNNEL_OFFLINE: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "routesync")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (missing file means defaults)
    #[arg(short = 'c', long, default_value = "routesync.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    /// Overseas CIDR list (overrides the config)
    #[arg(short = 'f', long)]
    cidr_file: Option<PathBuf>,

    /// Route metric (overrides the config)
    #[arg(short = 'm', long)]
    metric: Option<u32>,

    /// Use this gateway instead of reading it from the route table
    #[arg(short = 'g', long)]
    gateway: Option<IpAddress>,

    /// Gateway lookups to retry while the tunnel is offline (overrides the config)
    #[arg(long)]
    offline_retries: Option<u32>,
}

fn load_config(args: &Args) -> Result<RouteSyncConfig> {
    let mut config = RouteSyncConfig::load_or_default(&args.config)?;
    if let Some(path) = &args.cidr_file {
        config.cidr_file = path.clone();
    }
    if let Some(metric) = args.metric {
        config.metric = metric;
    }
    if let Some(retries) = args.offline_retries {
        config.offline_retries = retries;
    }
    config.validate()?;
    Ok(config)
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    let blocks = load_cidr_file(&config.cidr_file)?;

    let synchronizer = RouteSynchronizer::new(RouteExeBackend::new(), config);
    let report = match args.gateway {
        Some(gateway) => {
            info!(gateway = %gateway, "Using gateway from the command line");
            synchronizer.apply(&blocks, &gateway).await?
        }
        None => synchronizer.run(&blocks).await?,
    };

    if !report.is_clean() {
        warn!(failed = report.failed, "Some route commands failed");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init(&args.log_level) {
        eprintln!("routesync: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Starting routesync");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e @ RouteSyncError::TunnelOffline) => {
            error!("{}", e);
            ExitCode::from(EXIT_TUNNEL_OFFLINE)
        }
        Err(e) => {
            error!("routesync failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
