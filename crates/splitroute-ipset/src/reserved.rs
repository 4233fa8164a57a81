//! Built-in special-purpose address space.
//!
//! These blocks are never treated as overseas traffic: private-use,
//! loopback, link-local, multicast, documentation, benchmarking and the
//! IANA special-purpose registries.
//!
//! References:
//! - <https://www.iana.org/assignments/iana-ipv4-special-registry/>
//! - <https://www.iana.org/assignments/iana-ipv6-special-registry/>
//!
//! The literal lists overlap and touch (`2001::/32` sits inside
//! `2001::/23`, `224.0.0.0/4` and `240.0.0.0/4` merge). Each family's set is
//! aggregated on first use and shared read-only afterwards.

use once_cell::sync::Lazy;
use splitroute_types::{IpAddress, IpFamily};

use crate::set::AddressSet;

/// IPv4 special-purpose blocks.
pub const IPV4_RESERVED: &[&str] = &[
    "0.0.0.0/8",       // "this network" (RFC 1122)
    "10.0.0.0/8",      // private use (RFC 1918)
    "100.64.0.0/10",   // shared address space, CGN (RFC 6598)
    "127.0.0.0/8",     // loopback (RFC 1122)
    "169.254.0.0/16",  // link local (RFC 3927)
    "172.16.0.0/12",   // private use (RFC 1918)
    "192.0.0.0/24",    // IETF protocol assignments (RFC 6890)
    "192.0.2.0/24",    // TEST-NET-1 (RFC 5737)
    "192.88.99.0/24",  // deprecated 6to4 relay anycast (RFC 3068)
    "192.168.0.0/16",  // private use (RFC 1918)
    "198.18.0.0/15",   // benchmarking (RFC 2544)
    "198.51.100.0/24", // TEST-NET-2 (RFC 5737)
    "203.0.113.0/24",  // TEST-NET-3 (RFC 5737)
    "224.0.0.0/4",     // multicast (RFC 5771)
    "240.0.0.0/4",     // reserved for future use, includes broadcast
];

/// IPv6 special-purpose blocks.
pub const IPV6_RESERVED: &[&str] = &[
    "::/128",            // unspecified
    "::1/128",           // loopback
    "::ffff:0:0/96",     // IPv4-mapped
    "64:ff9b::/96",      // NAT64 well-known prefix (RFC 6052)
    "64:ff9b:1::/48",    // local-use NAT64 (RFC 8215)
    "100::/64",          // discard-only (RFC 6666)
    "2001::/23",         // IETF protocol assignments
    "2001::/32",         // TEREDO
    "2001:1::1/128",     // port control protocol anycast
    "2001:1::2/128",     // TURN anycast
    "2001:2::/48",       // benchmarking
    "2001:3::/32",       // AMT
    "2001:4:112::/48",   // AS112-v6
    "2001:5::/32",       // EID space for LISP
    "2001:10::/28",      // deprecated ORCHID
    "2001:20::/28",      // ORCHIDv2
    "2001:db8::/32",     // documentation (RFC 3849)
    "2002::/16",         // 6to4
    "2620:4f:8000::/48", // direct delegation AS112 service
    "fc00::/7",          // unique local (RFC 4193)
    "fe80::/10",         // link-scoped unicast
];

static RESERVED_V4: Lazy<AddressSet> = Lazy::new(|| build(IpFamily::V4, IPV4_RESERVED));
static RESERVED_V6: Lazy<AddressSet> = Lazy::new(|| build(IpFamily::V6, IPV6_RESERVED));

fn build(family: IpFamily, blocks: &[&str]) -> AddressSet {
    let set = AddressSet::aggregate_cidrs(family, blocks)
        .expect("built-in reserved block list must parse");
    // Aggregation sanity check.
    debug_assert!(AddressSet::validate_canonical(family, set.ranges()).is_ok());
    tracing::debug!(
        family = %family,
        literals = blocks.len(),
        blocks = set.len(),
        "Reserved address space initialized"
    );
    set
}

/// Returns the reserved set of a family.
pub fn reserved(family: IpFamily) -> &'static AddressSet {
    match family {
        IpFamily::V4 => &RESERVED_V4,
        IpFamily::V6 => &RESERVED_V6,
    }
}

/// Returns true if the address is special-purpose space.
pub fn is_reserved(address: &IpAddress) -> bool {
    reserved(address.family()).contains(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use splitroute_types::AddressRange;

    #[test]
    fn test_reserved_sets_are_canonical() {
        for family in [IpFamily::V4, IpFamily::V6] {
            let set = reserved(family);
            assert_eq!(set.family(), family);
            assert!(AddressSet::validate_canonical(family, set.ranges()).is_ok());
        }
    }

    #[test]
    fn test_reserved_literals_are_aggregated() {
        for (family, literals) in [(IpFamily::V4, IPV4_RESERVED), (IpFamily::V6, IPV6_RESERVED)] {
            let ranges: Vec<AddressRange> = literals.iter().map(|c| c.parse().unwrap()).collect();
            assert!(AddressSet::validate_canonical(family, &ranges).is_err());
            assert!(reserved(family).len() < literals.len());
            for range in &ranges {
                assert!(reserved(family).contains(&range.network()));
            }
        }
    }

    #[test]
    fn test_reserved_v4_contents() {
        let set = reserved(IpFamily::V4);
        // 224.0.0.0/4 and 240.0.0.0/4 collapse into one /3.
        assert_eq!(set.len(), 14);
        assert_eq!(set.ranges().last().unwrap().to_string(), "224.0.0.0/3");
        assert!(is_reserved(&"10.1.2.3".parse().unwrap()));
        assert!(is_reserved(&"100.127.255.255".parse().unwrap()));
        assert!(is_reserved(&"255.255.255.255".parse().unwrap()));
        assert!(!is_reserved(&"8.8.8.8".parse().unwrap()));
        assert!(!is_reserved(&"100.128.0.0".parse().unwrap()));
    }

    #[test]
    fn test_reserved_v6_absorbs_covered_blocks() {
        let set = reserved(IpFamily::V6);
        let lines = set.to_cidr_lines();
        assert!(lines.contains(&"2001::/23".to_string()));
        assert!(!lines.contains(&"2001::/32".to_string()));
        assert!(lines.contains(&"2001:db8::/32".to_string()));
        // ::/128 and ::1/128 are adjacent halves of ::/127.
        assert_eq!(lines[0], "::/127");
        assert!(is_reserved(&"fe80::1".parse().unwrap()));
        assert!(is_reserved(&"2001:db8::1".parse().unwrap()));
        assert!(!is_reserved(&"2400:3200::1".parse().unwrap()));
    }
}
