//! Registry delegation dump parsing.
//!
//! A dump line looks like
//!
//! ```text
//! apnic|CN|ipv4|1.0.1.0|256|20110414|allocated
//! apnic|CN|ipv6|2400:3200::|32|20090407|allocated
//! ```
//!
//! For IPv4 the fifth field is a host count, for IPv6 it is a prefix length.
//! Header and summary lines have a different field count and are skipped.

use splitroute_types::{AddressRange, IpAddress, IpFamily, ParseError};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, warn};

use crate::scope::ScopeKey;

const FIELD_SEPARATOR: char = '|';
const FIELD_COUNT: usize = 7;

/// One structurally valid delegation line, borrowed from the dump text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelegationRecord<'a> {
    pub registry: &'a str,
    pub country_code: &'a str,
    pub family: IpFamily,
    pub start_address: &'a str,
    pub value: &'a str,
    pub date: &'a str,
    pub status: &'a str,
}

/// A record that matched a scope but cannot be turned into a block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DelegationAnomaly {
    #[error("host count {count} for {start} is not a power of two")]
    NotPowerOfTwo { start: String, count: u64 },

    #[error("unparsable value '{value}' for {start}")]
    InvalidValue { start: String, value: String },

    #[error("unparsable start address '{start}'")]
    InvalidAddress { start: String },

    #[error("start address {start} is not {family}")]
    WrongFamily { start: String, family: IpFamily },

    #[error("start address of {cidr} is not aligned to its prefix")]
    Misaligned { cidr: String },
}

impl<'a> DelegationRecord<'a> {
    /// Splits a dump line into a record.
    ///
    /// Returns None for comments, blank lines, lines without exactly seven
    /// fields and non-address families such as `asn`.
    pub fn parse_line(line: &'a str) -> Option<Self> {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        if fields.len() != FIELD_COUNT {
            return None;
        }

        let family = IpFamily::from_token(fields[2])?;
        Some(Self {
            registry: fields[0],
            country_code: fields[1],
            family,
            start_address: fields[3],
            value: fields[4],
            date: fields[5],
            status: fields[6],
        })
    }

    /// Converts the record into the block it delegates.
    pub fn to_range(&self) -> Result<AddressRange, DelegationAnomaly> {
        let start: IpAddress =
            self.start_address
                .parse()
                .map_err(|_| DelegationAnomaly::InvalidAddress {
                    start: self.start_address.to_string(),
                })?;
        if start.family() != self.family {
            return Err(DelegationAnomaly::WrongFamily {
                start: self.start_address.to_string(),
                family: self.family,
            });
        }

        let prefix_len = match self.family {
            IpFamily::V4 => self.v4_prefix_len()?,
            IpFamily::V6 => self.v6_prefix_len()?,
        };

        AddressRange::new(start, prefix_len).map_err(|e| match e {
            ParseError::MisalignedPrefix(cidr) => DelegationAnomaly::Misaligned { cidr },
            _ => self.invalid_value(),
        })
    }

    /// IPv4 values are host counts; only exact powers of two map to a block.
    fn v4_prefix_len(&self) -> Result<u8, DelegationAnomaly> {
        let count: u64 = self.value.parse().map_err(|_| self.invalid_value())?;
        if count == 0 || !count.is_power_of_two() || count > 1u64 << 32 {
            return Err(DelegationAnomaly::NotPowerOfTwo {
                start: self.start_address.to_string(),
                count,
            });
        }
        Ok(32 - count.trailing_zeros() as u8)
    }

    /// IPv6 values are prefix lengths.
    fn v6_prefix_len(&self) -> Result<u8, DelegationAnomaly> {
        match self.value.parse::<u8>() {
            Ok(len) if len <= 128 => Ok(len),
            _ => Err(self.invalid_value()),
        }
    }

    fn invalid_value(&self) -> DelegationAnomaly {
        DelegationAnomaly::InvalidValue {
            start: self.start_address.to_string(),
            value: self.value.to_string(),
        }
    }
}

/// Blocks extracted from a dump, grouped by scope in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDelegations {
    pub ranges: BTreeMap<ScopeKey, Vec<AddressRange>>,
    /// Records that matched a scope and produced a block.
    pub matched: usize,
    /// Records that matched a scope but were skipped as anomalies.
    pub anomalies: usize,
}

/// Parses a whole dump, keeping only records selected by `scopes`.
///
/// Every requested scope is present in the result, possibly with no blocks.
pub fn parse_delegations(text: &str, scopes: &BTreeSet<ScopeKey>) -> ParsedDelegations {
    let mut parsed = ParsedDelegations {
        ranges: scopes.iter().map(|s| (s.clone(), Vec::new())).collect(),
        ..Default::default()
    };

    for (index, line) in text.lines().enumerate() {
        let Some(record) = DelegationRecord::parse_line(line) else {
            continue;
        };
        let Some(scope) = scopes
            .iter()
            .find(|s| s.matches(record.country_code, record.family))
        else {
            continue;
        };

        match record.to_range() {
            Ok(range) => {
                parsed.matched += 1;
                if let Some(ranges) = parsed.ranges.get_mut(scope) {
                    ranges.push(range);
                }
            }
            Err(anomaly) => {
                parsed.anomalies += 1;
                warn!(line = index + 1, scope = %scope, "Skipping delegation record: {}", anomaly);
            }
        }
    }

    debug!(
        matched = parsed.matched,
        anomalies = parsed.anomalies,
        "Parsed delegation dump"
    );
    parsed
}
