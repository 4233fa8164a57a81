//! Routing backend capability.
//!
//! The synchronizer only needs to list routes, add one and delete one.
//! [`RouteExeBackend`] drives the `route` command; tests substitute a
//! recording backend.

use async_trait::async_trait;
use splitroute_common::shell::{self, ROUTE_CMD};
use splitroute_common::{CommonError, ExecResult};
use splitroute_types::{AddressRange, IpAddress};

use crate::error::{Result, RouteSyncError};

/// What happened when one routing command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Rendered command line, for logs.
    pub command: String,
    pub exit_code: i32,
    pub output: String,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    fn from_exec(command: String, result: ExecResult) -> Self {
        Self {
            command,
            exit_code: result.exit_code,
            output: result.combined_output(),
        }
    }
}

/// Narrow view of the host routing table.
#[async_trait]
pub trait RoutingBackend: Send + Sync {
    /// Returns the textual listing of the split-default route.
    async fn list_routes(&self) -> Result<String>;

    /// Adds a route for `block` via `gateway`.
    async fn add_route(
        &self,
        block: &AddressRange,
        gateway: &IpAddress,
        metric: u32,
    ) -> Result<CommandOutcome>;

    /// Deletes the route for `block`.
    async fn delete_route(&self, block: &AddressRange) -> Result<CommandOutcome>;

    /// Runs the configured tunnel start command.
    async fn start_tunnel(&self, command: &[String]) -> Result<CommandOutcome>;
}

/// Backend driving the Windows `route` utility.
#[derive(Debug, Clone, Default)]
pub struct RouteExeBackend;

impl RouteExeBackend {
    pub fn new() -> Self {
        Self
    }

    /// Arguments of `route print 128.0.0.0 -4`.
    pub fn list_args() -> Vec<String> {
        vec!["print".to_string(), "128.0.0.0".to_string(), "-4".to_string()]
    }

    /// Arguments of `route add <net> mask <mask> <gw> metric <m>`.
    pub fn add_args(block: &AddressRange, gateway: &IpAddress, metric: u32) -> Vec<String> {
        vec![
            "add".to_string(),
            block.network().to_string(),
            "mask".to_string(),
            block.netmask().to_string(),
            gateway.to_string(),
            "metric".to_string(),
            metric.to_string(),
        ]
    }

    /// Arguments of `route delete <net> mask <mask>`.
    pub fn delete_args(block: &AddressRange) -> Vec<String> {
        vec![
            "delete".to_string(),
            block.network().to_string(),
            "mask".to_string(),
            block.netmask().to_string(),
        ]
    }

    async fn run(program: &str, args: &[String]) -> Result<CommandOutcome> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let command = shell::render_command(program, &args);
        let result = shell::exec(program, &args).await?;
        Ok(CommandOutcome::from_exec(command, result))
    }
}

#[async_trait]
impl RoutingBackend for RouteExeBackend {
    async fn list_routes(&self) -> Result<String> {
        let outcome = Self::run(ROUTE_CMD, &Self::list_args()).await?;
        if outcome.output.is_empty() {
            return Err(RouteSyncError::invalid_output(format!(
                "'{}' printed nothing",
                outcome.command
            )));
        }
        Ok(outcome.output)
    }

    async fn add_route(
        &self,
        block: &AddressRange,
        gateway: &IpAddress,
        metric: u32,
    ) -> Result<CommandOutcome> {
        Self::run(ROUTE_CMD, &Self::add_args(block, gateway, metric)).await
    }

    async fn delete_route(&self, block: &AddressRange) -> Result<CommandOutcome> {
        Self::run(ROUTE_CMD, &Self::delete_args(block)).await
    }

    async fn start_tunnel(&self, command: &[String]) -> Result<CommandOutcome> {
        let (program, args) = command.split_first().ok_or_else(|| {
            RouteSyncError::from(CommonError::invalid_config(
                "tunnel_start_command",
                "command is empty",
            ))
        })?;
        Self::run(program, args).await
    }
}
