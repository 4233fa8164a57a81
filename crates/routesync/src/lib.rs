//! Route Synchronizer - overseas routes through a tunnel gateway
//!
//! routesync reads the tunnel's gateway from the host routing table and
//! reprograms the table so every overseas CIDR block goes through it:
//! - Route table text parsing (gateway discovery state machine)
//! - Removal of the tunnel's split-default routes
//! - Per-block route injection with a fixed metric
//! - Offline tunnel retry with an optional fallback gateway

pub mod backend;
pub mod cidr_file;
pub mod config;
pub mod error;
pub mod route_table;
pub mod sync;

pub use backend::{CommandOutcome, RouteExeBackend, RoutingBackend};
pub use cidr_file::load_cidr_file;
pub use config::RouteSyncConfig;
pub use error::{Result, RouteSyncError};
pub use route_table::{parse_route_table, RouteTableSnapshot, RouteTableState};
pub use sync::{ApplyReport, RouteSynchronizer};
