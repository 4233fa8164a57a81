//! Pipeline orchestration: dump text to per-scope domestic and overseas sets.

use splitroute_ipset::{reserved, AddressSet};
use splitroute_types::IpAddress;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::info;

use crate::delegation::parse_delegations;
use crate::error::Result;
use crate::scope::ScopeKey;
use crate::source::DelegationSource;

/// The two canonical sets computed for one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeSets {
    /// Everything delegated to the scope's country.
    pub domestic: AddressSet,
    /// The family universe minus reserved space minus `domestic`.
    pub overseas: AddressSet,
}

/// Where an address falls relative to one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Domestic,
    Overseas,
    Reserved,
    /// Outside the routable universe (IPv6 space outside 2000::/3).
    OutsideUniverse,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Placement::Domestic => "domestic",
            Placement::Overseas => "overseas",
            Placement::Reserved => "reserved",
            Placement::OutsideUniverse => "outside universe",
        };
        f.write_str(s)
    }
}

/// Result of one run: the sets for every requested scope plus statistics.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    scopes: BTreeMap<ScopeKey, ScopeSets>,
    matched: usize,
    anomalies: usize,
}

impl RunContext {
    pub fn get(&self, scope: &ScopeKey) -> Option<&ScopeSets> {
        self.scopes.get(scope)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ScopeKey, &ScopeSets)> {
        self.scopes.iter()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Number of delegation records turned into blocks.
    pub fn matched(&self) -> usize {
        self.matched
    }

    /// Number of matching records skipped as data anomalies.
    pub fn anomalies(&self) -> usize {
        self.anomalies
    }

    /// Places `address` in every scope of its family.
    pub fn classify(&self, address: &IpAddress) -> Vec<(&ScopeKey, Placement)> {
        self.scopes
            .iter()
            .filter(|(scope, _)| scope.family() == address.family())
            .map(|(scope, sets)| {
                let placement = if sets.domestic.contains(address) {
                    Placement::Domestic
                } else if sets.overseas.contains(address) {
                    Placement::Overseas
                } else if reserved::is_reserved(address) {
                    Placement::Reserved
                } else {
                    Placement::OutsideUniverse
                };
                (scope, placement)
            })
            .collect()
    }
}

/// Computes domestic and overseas sets for a fixed list of scopes.
#[derive(Debug, Clone)]
pub struct Pipeline {
    scopes: BTreeSet<ScopeKey>,
}

impl Pipeline {
    pub fn new(scopes: impl IntoIterator<Item = ScopeKey>) -> Self {
        Self {
            scopes: scopes.into_iter().collect(),
        }
    }

    pub fn scopes(&self) -> &BTreeSet<ScopeKey> {
        &self.scopes
    }

    /// Fetches the dump from `source` and computes every scope.
    pub async fn run<S>(&self, source: &S) -> Result<RunContext>
    where
        S: DelegationSource + ?Sized,
    {
        info!(source = %source.describe(), "Loading delegation dump");
        let text = source.fetch().await?;
        self.compute(&text)
    }

    /// Computes every scope from dump text already in memory.
    pub fn compute(&self, text: &str) -> Result<RunContext> {
        let parsed = parse_delegations(text, &self.scopes);

        let mut context = RunContext {
            matched: parsed.matched,
            anomalies: parsed.anomalies,
            ..Default::default()
        };

        for (scope, ranges) in parsed.ranges {
            let family = scope.family();
            let domestic = AddressSet::aggregate(family, ranges)?;
            let overseas = domestic.complement_within_universe(reserved::reserved(family))?;
            info!(
                scope = %scope,
                domestic = domestic.len(),
                overseas = overseas.len(),
                "Computed CIDR blocks"
            );
            context.scopes.insert(scope, ScopeSets { domestic, overseas });
        }

        if context.anomalies > 0 {
            info!(anomalies = context.anomalies, "Some delegation records were skipped");
        }
        Ok(context)
    }
}
