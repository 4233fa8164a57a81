//! Address primitives shared by the splitroute crates.
//!
//! This crate provides type-safe representations of the values the range
//! engine and the route synchronizer exchange:
//!
//! - [`IpFamily`]: IPv4 or IPv6, with its bit width and registry token
//! - [`IpAddress`]: IPv4 and IPv6 addresses
//! - [`AddressRange`]: a network-aligned CIDR block (`base/len`)

mod ip;

pub use ip::{AddressRange, IpAddress, IpFamily, Ipv4Address, Ipv6Address};

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("invalid IP prefix format: {0}")]
    InvalidIpPrefix(String),

    #[error("prefix start is not aligned to its length: {0}")]
    MisalignedPrefix(String),

    #[error("invalid address family: {0} (expected ipv4 or ipv6)")]
    InvalidFamily(String),
}
