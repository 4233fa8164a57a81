//! Inclusive integer intervals and their conversion to CIDR blocks.
//!
//! Set algebra is done on merged `[lo, hi]` runs; blocks are only produced
//! at the end by [`decompose`]. Bounds are inclusive so the full IPv6 space
//! fits in a `u128`.

use splitroute_types::{AddressRange, IpFamily};

use crate::error::SetResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Interval {
    pub lo: u128,
    pub hi: u128,
}

impl Interval {
    pub fn of(range: &AddressRange) -> Self {
        Interval {
            lo: range.start(),
            hi: range.end(),
        }
    }
}

/// Sorts and coalesces overlapping or touching intervals.
pub(crate) fn merge(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.sort_unstable();

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for iv in intervals {
        match merged.last_mut() {
            Some(last) if iv.lo <= last.hi.saturating_add(1) => {
                if iv.hi > last.hi {
                    last.hi = iv.hi;
                }
            }
            _ => merged.push(iv),
        }
    }
    merged
}

/// Removes `b` from `a`. Both inputs must be merged.
pub(crate) fn subtract(a: &[Interval], b: &[Interval]) -> Vec<Interval> {
    let mut out = Vec::with_capacity(a.len());
    let mut j = 0;

    for iv in a {
        while j < b.len() && b[j].hi < iv.lo {
            j += 1;
        }

        let mut lo = iv.lo;
        let mut consumed = false;
        let mut k = j;
        while k < b.len() && b[k].lo <= iv.hi {
            if b[k].lo > lo {
                out.push(Interval {
                    lo,
                    hi: b[k].lo - 1,
                });
            }
            if b[k].hi >= iv.hi {
                consumed = true;
                break;
            }
            lo = b[k].hi + 1;
            k += 1;
        }

        if !consumed {
            out.push(Interval { lo, hi: iv.hi });
        }
    }
    out
}

/// Intersects two merged interval lists.
pub(crate) fn intersect(a: &[Interval], b: &[Interval]) -> Vec<Interval> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        let lo = a[i].lo.max(b[j].lo);
        let hi = a[i].hi.min(b[j].hi);
        if lo <= hi {
            out.push(Interval { lo, hi });
        }
        if a[i].hi < b[j].hi {
            i += 1;
        } else {
            j += 1;
        }
    }
    out
}

/// Splits one interval into the minimal list of aligned CIDR blocks.
///
/// Greedy from the low end: each step takes the largest block that is
/// aligned at the current address and does not pass the upper bound.
pub(crate) fn decompose(
    family: IpFamily,
    iv: Interval,
    out: &mut Vec<AddressRange>,
) -> SetResult<()> {
    let width = u32::from(family.bits());
    let mut lo = iv.lo;

    loop {
        let align = if lo == 0 {
            width
        } else {
            lo.trailing_zeros().min(width)
        };
        let span = iv.hi - lo;
        let fit = if span == u128::MAX {
            128
        } else {
            127 - (span + 1).leading_zeros()
        };
        let host_bits = align.min(fit);

        out.push(AddressRange::from_bits(
            family,
            lo,
            (width - host_bits) as u8,
        )?);

        let last = if host_bits >= 128 {
            u128::MAX
        } else {
            lo + ((1u128 << host_bits) - 1)
        };
        if last >= iv.hi {
            return Ok(());
        }
        lo = last + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn iv(lo: u128, hi: u128) -> Interval {
        Interval { lo, hi }
    }

    fn blocks(family: IpFamily, lo: u128, hi: u128) -> Vec<String> {
        let mut out = Vec::new();
        decompose(family, iv(lo, hi), &mut out).unwrap();
        out.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_merge_overlapping_and_adjacent() {
        let merged = merge(vec![iv(10, 20), iv(0, 5), iv(6, 8), iv(15, 30), iv(40, 41)]);
        assert_eq!(merged, vec![iv(0, 8), iv(10, 30), iv(40, 41)]);
    }

    #[test]
    fn test_merge_at_top_of_space() {
        let merged = merge(vec![iv(u128::MAX - 1, u128::MAX), iv(0, u128::MAX)]);
        assert_eq!(merged, vec![iv(0, u128::MAX)]);
    }

    #[test]
    fn test_subtract_splits_and_trims() {
        let a = vec![iv(0, 100), iv(200, 300)];
        let b = vec![iv(10, 20), iv(90, 210), iv(300, 400)];
        assert_eq!(
            subtract(&a, &b),
            vec![iv(0, 9), iv(21, 89), iv(211, 299)]
        );
    }

    #[test]
    fn test_subtract_disjoint_and_everything() {
        let a = vec![iv(0, 10)];
        assert_eq!(subtract(&a, &[iv(20, 30)]), a);
        assert!(subtract(&a, &[iv(0, 10)]).is_empty());
        assert!(subtract(&[iv(0, u128::MAX)], &[iv(0, u128::MAX)]).is_empty());
    }

    #[test]
    fn test_intersect() {
        let a = vec![iv(0, 10), iv(20, 30)];
        let b = vec![iv(5, 25)];
        assert_eq!(intersect(&a, &b), vec![iv(5, 10), iv(20, 25)]);
    }

    #[test]
    fn test_decompose_aligned_block() {
        assert_eq!(blocks(IpFamily::V4, 0x0100_0100, 0x0100_01ff), vec!["1.0.1.0/24"]);
    }

    #[test]
    fn test_decompose_unaligned_run() {
        // 10.0.0.1 - 10.0.0.6
        assert_eq!(
            blocks(IpFamily::V4, 0x0a00_0001, 0x0a00_0006),
            vec!["10.0.0.1/32", "10.0.0.2/31", "10.0.0.4/31", "10.0.0.6/32"]
        );
    }

    #[test]
    fn test_decompose_full_spaces() {
        assert_eq!(blocks(IpFamily::V4, 0, u128::from(u32::MAX)), vec!["0.0.0.0/0"]);
        assert_eq!(blocks(IpFamily::V6, 0, u128::MAX), vec!["::/0"]);
    }

    #[test]
    fn test_decompose_upper_half_v4() {
        assert_eq!(
            blocks(IpFamily::V4, 0x8000_0000, u128::from(u32::MAX)),
            vec!["128.0.0.0/1"]
        );
    }
}
