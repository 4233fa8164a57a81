//! Canonical address sets and their algebra.

use std::fmt;

use splitroute_types::{AddressRange, IpAddress, IpFamily};

use crate::error::{SetError, SetResult};
use crate::interval::{self, Interval};

/// An ordered, family-homogeneous, canonical collection of CIDR blocks.
///
/// Ranges are sorted by start address, never overlap, and no two neighbours
/// could be merged into a shorter prefix. Values are immutable: every
/// operation returns a new set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddressSet {
    family: IpFamily,
    ranges: Vec<AddressRange>,
}

impl AddressSet {
    /// Creates an empty set of the given family.
    pub fn empty(family: IpFamily) -> Self {
        Self {
            family,
            ranges: Vec::new(),
        }
    }

    /// Returns the routable universe of a family.
    ///
    /// IPv4 is the whole space (0.0.0.0/0). IPv6 is limited to global
    /// unicast (2000::/3); nothing outside it is ever overseas traffic.
    pub fn universe(family: IpFamily) -> Self {
        let range = match family {
            IpFamily::V4 => AddressRange::from_bits(IpFamily::V4, 0, 0),
            IpFamily::V6 => AddressRange::from_bits(IpFamily::V6, 0x2000 << 112, 3),
        }
        .expect("universe block is aligned");
        Self {
            family,
            ranges: vec![range],
        }
    }

    /// Builds a canonical set from unordered, possibly overlapping blocks.
    ///
    /// # Errors
    ///
    /// Returns [`SetError::FamilyMismatch`] if any block is not of `family`.
    pub fn aggregate<I>(family: IpFamily, ranges: I) -> SetResult<Self>
    where
        I: IntoIterator<Item = AddressRange>,
    {
        let intervals = ranges
            .into_iter()
            .map(|range| {
                if range.family() != family {
                    return Err(SetError::family_mismatch(family, range.family()));
                }
                Ok(Interval::of(&range))
            })
            .collect::<SetResult<Vec<_>>>()?;

        Self::from_intervals(family, intervals)
    }

    /// Builds a canonical set from CIDR literals (`base/len` or a bare address).
    ///
    /// # Errors
    ///
    /// Returns [`SetError::InvalidRange`] for a literal with host bits set,
    /// [`SetError::Parse`] for anything that is not an address or prefix,
    /// and [`SetError::FamilyMismatch`] for a literal of the other family.
    pub fn aggregate_cidrs<I, S>(family: IpFamily, cidrs: I) -> SetResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ranges = cidrs
            .into_iter()
            .map(|cidr| cidr.as_ref().parse::<AddressRange>().map_err(SetError::from))
            .collect::<SetResult<Vec<_>>>()?;

        Self::aggregate(family, ranges)
    }

    fn from_intervals(family: IpFamily, intervals: Vec<Interval>) -> SetResult<Self> {
        let mut ranges = Vec::new();
        for iv in interval::merge(intervals) {
            interval::decompose(family, iv, &mut ranges)?;
        }
        Ok(Self { family, ranges })
    }

    /// Merged address runs of this set.
    fn intervals(&self) -> Vec<Interval> {
        interval::merge(self.ranges.iter().map(Interval::of).collect())
    }

    fn check_family(&self, other: &AddressSet) -> SetResult<()> {
        if self.family != other.family {
            return Err(SetError::family_mismatch(self.family, other.family));
        }
        Ok(())
    }

    /// Addresses in `self` or `other`.
    pub fn union(&self, other: &AddressSet) -> SetResult<Self> {
        self.check_family(other)?;
        let mut all = self.intervals();
        all.extend(other.intervals());
        Self::from_intervals(self.family, all)
    }

    /// Addresses in `self` but not in `other`.
    pub fn difference(&self, other: &AddressSet) -> SetResult<Self> {
        self.check_family(other)?;
        let rest = interval::subtract(&self.intervals(), &other.intervals());
        Self::from_intervals(self.family, rest)
    }

    /// Addresses in exactly one of `self` and `other`.
    pub fn symmetric_difference(&self, other: &AddressSet) -> SetResult<Self> {
        self.check_family(other)?;
        let (a, b) = (self.intervals(), other.intervals());
        let mut only = interval::subtract(&a, &b);
        only.extend(interval::subtract(&b, &a));
        Self::from_intervals(self.family, only)
    }

    /// Addresses in both `self` and `other`.
    pub fn intersection(&self, other: &AddressSet) -> SetResult<Self> {
        self.check_family(other)?;
        let common = interval::intersect(&self.intervals(), &other.intervals());
        Self::from_intervals(self.family, common)
    }

    /// Returns `universe(family) - reserved - self`.
    ///
    /// # Errors
    ///
    /// Returns [`SetError::FamilyMismatch`] if `reserved` is of the other family.
    pub fn complement_within_universe(&self, reserved: &AddressSet) -> SetResult<Self> {
        self.check_family(reserved)?;
        let universe = Self::universe(self.family).intervals();
        let routable = interval::subtract(&universe, &reserved.intervals());
        let rest = interval::subtract(&routable, &self.intervals());
        Self::from_intervals(self.family, rest)
    }

    /// Returns true if the address falls inside any block of the set.
    ///
    /// An address of the other family is never a member.
    pub fn contains(&self, address: &IpAddress) -> bool {
        if address.family() != self.family {
            return false;
        }
        let bits = address.to_bits();
        let idx = self.ranges.partition_point(|r| r.start() <= bits);
        idx > 0 && self.ranges[idx - 1].end() >= bits
    }

    /// Checks that a block list satisfies every set invariant.
    ///
    /// # Errors
    ///
    /// Returns [`SetError::FamilyMismatch`] for a foreign block and
    /// [`SetError::NotCanonical`] for out-of-order, overlapping or
    /// mergeable neighbours.
    pub fn validate_canonical(family: IpFamily, ranges: &[AddressRange]) -> SetResult<()> {
        if let Some(foreign) = ranges.iter().find(|r| r.family() != family) {
            return Err(SetError::family_mismatch(family, foreign.family()));
        }

        for pair in ranges.windows(2) {
            if pair[1].start() <= pair[0].end() {
                return Err(SetError::not_canonical(format!(
                    "{} overlaps or precedes {}",
                    pair[1], pair[0]
                )));
            }
        }

        let rebuilt = Self::aggregate(family, ranges.iter().copied())?;
        if rebuilt.ranges != ranges {
            let first_diff = rebuilt
                .ranges
                .iter()
                .zip(ranges)
                .find(|(want, have)| want != have)
                .map(|(want, have)| format!("{} should be {}", have, want))
                .unwrap_or_else(|| "block count differs from minimal form".to_string());
            return Err(SetError::not_canonical(first_diff));
        }
        Ok(())
    }

    pub fn family(&self) -> IpFamily {
        self.family
    }

    /// Number of CIDR blocks in the set.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[AddressRange] {
        &self.ranges
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AddressRange> {
        self.ranges.iter()
    }

    /// Number of addresses covered, saturating at `u128::MAX`.
    pub fn address_count(&self) -> u128 {
        self.ranges
            .iter()
            .map(|r| (r.end() - r.start()).saturating_add(1))
            .fold(0u128, u128::saturating_add)
    }

    /// Renders the set as one `base/len` string per block, ascending.
    pub fn to_cidr_lines(&self) -> Vec<String> {
        self.ranges.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for AddressSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for range in &self.ranges {
            writeln!(f, "{}", range)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a AddressSet {
    type Item = &'a AddressRange;
    type IntoIter = std::slice::Iter<'a, AddressRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}
