//! Scope keys: a (country, address family) pair such as `CN-ipv4`.

use serde::{Deserialize, Serialize};
use splitroute_types::IpFamily;
use std::fmt;
use std::str::FromStr;

use crate::error::RegionError;

/// Country plus address family selecting one set of delegation records.
///
/// Country codes are normalized to upper case so `cn-ipv4` and `CN-ipv4`
/// name the same scope.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScopeKey {
    country: String,
    family: IpFamily,
}

impl ScopeKey {
    pub fn new(country: &str, family: IpFamily) -> Result<Self, RegionError> {
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(RegionError::InvalidScope(format!("{}-{}", country, family)));
        }
        Ok(Self {
            country: country.to_ascii_uppercase(),
            family,
        })
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn family(&self) -> IpFamily {
        self.family
    }

    /// Returns true if a record's country token and family select this scope.
    pub fn matches(&self, country: &str, family: IpFamily) -> bool {
        self.family == family && self.country.eq_ignore_ascii_case(country)
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.country, self.family)
    }
}

impl FromStr for ScopeKey {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (country, family) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| RegionError::InvalidScope(s.to_string()))?;
        let family =
            IpFamily::from_token(family).ok_or_else(|| RegionError::InvalidScope(s.to_string()))?;
        Self::new(country, family).map_err(|_| RegionError::InvalidScope(s.to_string()))
    }
}

impl TryFrom<String> for ScopeKey {
    type Error = RegionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ScopeKey> for String {
    fn from(key: ScopeKey) -> Self {
        key.to_string()
    }
}
