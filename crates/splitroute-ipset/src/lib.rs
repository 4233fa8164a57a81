//! CIDR set engine for splitroute.
//!
//! This crate turns unordered, overlapping collections of CIDR blocks into
//! canonical [`AddressSet`] values and performs set algebra over them:
//!
//! - [`AddressSet::aggregate`]: sort, merge and re-split into minimal CIDR blocks
//! - [`AddressSet::union`], [`AddressSet::difference`],
//!   [`AddressSet::symmetric_difference`], [`AddressSet::intersection`]
//! - [`AddressSet::complement_within_universe`]: everything routable that is
//!   neither reserved nor in the set
//! - [`AddressSet::contains`]: membership of a single address
//!
//! The [`reserved`] module holds the built-in special-purpose address space
//! excluded from every complement.
//!
//! # Example
//!
//! ```
//! use splitroute_ipset::{reserved, AddressSet};
//! use splitroute_types::IpFamily;
//!
//! let domestic = AddressSet::aggregate_cidrs(IpFamily::V4, ["1.0.1.0/25", "1.0.1.128/25"])?;
//! assert_eq!(domestic.to_cidr_lines(), vec!["1.0.1.0/24"]);
//!
//! let overseas = domestic.complement_within_universe(reserved::reserved(IpFamily::V4))?;
//! assert!(!overseas.contains(&"1.0.1.1".parse()?));
//! assert!(overseas.contains(&"8.8.8.8".parse()?));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
mod interval;
pub mod reserved;
mod set;

pub use error::{SetError, SetResult};
pub use set::AddressSet;
