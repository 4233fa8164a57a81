//! Region Manager - per-country CIDR list generation
//!
//! regionmgr turns a regional registry delegation dump into canonical CIDR
//! lists, handling:
//! - Delegation record parsing and country/family filtering
//! - Registry download with a TTL file cache
//! - Domestic set aggregation and overseas complement computation
//! - Atomic output of one-CIDR-per-line files
//! - Address classification against the computed sets

pub mod config;
pub mod delegation;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod scope;
pub mod source;

pub use config::RegionConfig;
pub use error::{RegionError, Result};
pub use pipeline::{Pipeline, Placement, RunContext, ScopeSets};
pub use scope::ScopeKey;
pub use source::{CachedSource, DelegationSource, HttpSource};
