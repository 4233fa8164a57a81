//! Route application: tunnel gateway discovery and table reprogramming.

use splitroute_types::{AddressRange, IpAddress, IpFamily};
use tracing::{debug, info, warn};

use crate::backend::{CommandOutcome, RoutingBackend};
use crate::config::RouteSyncConfig;
use crate::error::Result;
use crate::route_table::{parse_route_table, RouteTableSnapshot};

/// Returns the two /1 routes a full-tunnel VPN installs to capture all
/// traffic (0.0.0.0/1 and 128.0.0.0/1).
pub fn split_default_routes() -> Result<[AddressRange; 2]> {
    Ok([
        AddressRange::from_bits(IpFamily::V4, 0, 1)?,
        AddressRange::from_bits(IpFamily::V4, 1 << 31, 1)?,
    ])
}

/// Outcome of one apply pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Split-default routes deleted
    pub removed: usize,
    /// Block routes added
    pub added: usize,
    /// Commands that failed (either phase)
    pub failed: usize,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Reprograms the routing table through a [`RoutingBackend`].
pub struct RouteSynchronizer<B> {
    backend: B,
    config: RouteSyncConfig,
}

impl<B: RoutingBackend> RouteSynchronizer<B> {
    pub fn new(backend: B, config: RouteSyncConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Reads the route table once and extracts the tunnel gateway.
    pub async fn detect_gateway(&self) -> Result<RouteTableSnapshot> {
        let text = self.backend.list_routes().await?;
        let snapshot = parse_route_table(&text)?;
        info!(
            gateway = %snapshot.gateway,
            interface = %snapshot.interface,
            metric = snapshot.metric,
            "Found tunnel gateway"
        );
        Ok(snapshot)
    }

    /// Finds the gateway, waiting for an offline tunnel up to
    /// `offline_retries` more times before using `fallback_gateway`.
    pub async fn resolve_gateway(&self) -> Result<IpAddress> {
        let retries = self.config.offline_retries;
        let mut attempt = 0;

        loop {
            let err = match self.detect_gateway().await {
                Ok(snapshot) => return Ok(snapshot.gateway),
                Err(e) if e.is_recoverable() => e,
                Err(e) => return Err(e),
            };

            if attempt >= retries {
                return match self.config.fallback_gateway {
                    Some(gateway) => {
                        warn!(gateway = %gateway, "Tunnel still offline, using fallback gateway");
                        Ok(gateway)
                    }
                    None => Err(err),
                };
            }

            attempt += 1;
            warn!(attempt, retries, "{}", err);
            self.start_tunnel().await;
            tokio::time::sleep(self.config.retry_interval()).await;
        }
    }

    async fn start_tunnel(&self) {
        let Some(command) = &self.config.tunnel_start_command else {
            return;
        };

        info!("Restarting the tunnel");
        match self.backend.start_tunnel(command).await {
            Ok(outcome) if outcome.success() => {
                debug!(command = %outcome.command, "Tunnel start command finished")
            }
            Ok(outcome) => warn!(
                command = %outcome.command,
                exit_code = outcome.exit_code,
                output = %outcome.output,
                "Tunnel start command failed"
            ),
            Err(e) => warn!("Failed to run tunnel start command: {}", e),
        }
    }

    /// Deletes the split-default routes, then adds one route per block.
    ///
    /// Every command is independent: failures are logged and counted, and
    /// the remaining commands still run.
    pub async fn apply(&self, blocks: &[AddressRange], gateway: &IpAddress) -> Result<ApplyReport> {
        let mut report = ApplyReport::default();

        info!("Removing old routing rules");
        for route in split_default_routes()? {
            let result = self.backend.delete_route(&route).await;
            if record(&route, result) {
                report.removed += 1;
            } else {
                report.failed += 1;
            }
        }

        info!(blocks = blocks.len(), gateway = %gateway, "Injecting new routing rules");
        for block in blocks {
            let result = self.backend.add_route(block, gateway, self.config.metric).await;
            if record(block, result) {
                report.added += 1;
            } else {
                report.failed += 1;
            }
        }

        info!(
            removed = report.removed,
            added = report.added,
            failed = report.failed,
            "Finished applying routes"
        );
        Ok(report)
    }

    /// Resolves the gateway and applies `blocks` through it.
    pub async fn run(&self, blocks: &[AddressRange]) -> Result<ApplyReport> {
        let gateway = self.resolve_gateway().await?;
        self.apply(blocks, &gateway).await
    }
}

/// Logs one command result; returns true if it succeeded.
fn record(block: &AddressRange, result: Result<CommandOutcome>) -> bool {
    match result {
        Ok(outcome) if outcome.success() => {
            debug!(command = %outcome.command, "Route command succeeded");
            true
        }
        Ok(outcome) => {
            warn!(
                block = %block,
                command = %outcome.command,
                exit_code = outcome.exit_code,
                output = %outcome.output,
                "Route command failed"
            );
            false
        }
        Err(e) => {
            warn!(block = %block, "Route command could not run: {}", e);
            false
        }
    }
}
