//! IP address, family and range types with safe parsing.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Address family of an address or range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IpFamily {
    #[serde(rename = "ipv4")]
    V4,
    #[serde(rename = "ipv6")]
    V6,
}

impl IpFamily {
    /// Returns the address width in bits (32 or 128).
    pub const fn bits(&self) -> u8 {
        match self {
            IpFamily::V4 => 32,
            IpFamily::V6 => 128,
        }
    }

    /// Returns the highest address of the family as an integer.
    pub const fn max_value(&self) -> u128 {
        match self {
            IpFamily::V4 => u32::MAX as u128,
            IpFamily::V6 => u128::MAX,
        }
    }

    /// Returns the token used by registry dumps ("ipv4" / "ipv6").
    pub const fn as_str(&self) -> &'static str {
        match self {
            IpFamily::V4 => "ipv4",
            IpFamily::V6 => "ipv6",
        }
    }

    /// Parses a registry family token, returning None for anything else
    /// (e.g. "asn" records).
    pub fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("ipv4") {
            Some(IpFamily::V4)
        } else if token.eq_ignore_ascii_case("ipv6") {
            Some(IpFamily::V6)
        } else {
            None
        }
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IpFamily {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IpFamily::from_token(s).ok_or_else(|| ParseError::InvalidFamily(s.to_string()))
    }
}

/// An IPv4 address wrapper with integer conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ipv4Address(Ipv4Addr);

impl Ipv4Address {
    pub const UNSPECIFIED: Self = Ipv4Address(Ipv4Addr::UNSPECIFIED);

    pub const fn new(a: u8, b: u8, c: u8, d: u8) -> Self {
        Ipv4Address(Ipv4Addr::new(a, b, c, d))
    }

    pub const fn inner(&self) -> Ipv4Addr {
        self.0
    }

    pub const fn octets(&self) -> [u8; 4] {
        self.0.octets()
    }

    pub fn to_bits(&self) -> u32 {
        u32::from(self.0)
    }

    pub fn from_bits(bits: u32) -> Self {
        Ipv4Address(Ipv4Addr::from(bits))
    }
}

impl fmt::Display for Ipv4Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Ipv4Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Ipv4Addr>()
            .map(Ipv4Address)
            .map_err(|_| ParseError::InvalidIpAddress(s.to_string()))
    }
}

impl From<Ipv4Addr> for Ipv4Address {
    fn from(addr: Ipv4Addr) -> Self {
        Ipv4Address(addr)
    }
}

impl From<Ipv4Address> for Ipv4Addr {
    fn from(addr: Ipv4Address) -> Self {
        addr.0
    }
}

/// An IPv6 address wrapper with integer conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ipv6Address(Ipv6Addr);

impl Ipv6Address {
    pub const UNSPECIFIED: Self = Ipv6Address(Ipv6Addr::UNSPECIFIED);

    #[allow(clippy::too_many_arguments)]
    pub const fn new(a: u16, b: u16, c: u16, d: u16, e: u16, f: u16, g: u16, h: u16) -> Self {
        Ipv6Address(Ipv6Addr::new(a, b, c, d, e, f, g, h))
    }

    pub const fn inner(&self) -> Ipv6Addr {
        self.0
    }

    pub const fn segments(&self) -> [u16; 8] {
        self.0.segments()
    }

    pub fn to_bits(&self) -> u128 {
        u128::from(self.0)
    }

    pub fn from_bits(bits: u128) -> Self {
        Ipv6Address(Ipv6Addr::from(bits))
    }
}

impl fmt::Display for Ipv6Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Ipv6Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Ipv6Addr>()
            .map(Ipv6Address)
            .map_err(|_| ParseError::InvalidIpAddress(s.to_string()))
    }
}

impl From<Ipv6Addr> for Ipv6Address {
    fn from(addr: Ipv6Addr) -> Self {
        Ipv6Address(addr)
    }
}

impl From<Ipv6Address> for Ipv6Addr {
    fn from(addr: Ipv6Address) -> Self {
        addr.0
    }
}

/// An IP address that can be either IPv4 or IPv6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IpAddress {
    V4(Ipv4Address),
    V6(Ipv6Address),
}

impl IpAddress {
    /// Builds an address of the given family from its integer value.
    ///
    /// For IPv4 only the low 32 bits are used.
    pub fn from_bits(family: IpFamily, bits: u128) -> Self {
        match family {
            IpFamily::V4 => IpAddress::V4(Ipv4Address::from_bits(bits as u32)),
            IpFamily::V6 => IpAddress::V6(Ipv6Address::from_bits(bits)),
        }
    }

    /// Returns the integer value of the address.
    pub fn to_bits(&self) -> u128 {
        match self {
            IpAddress::V4(addr) => u128::from(addr.to_bits()),
            IpAddress::V6(addr) => addr.to_bits(),
        }
    }

    pub const fn family(&self) -> IpFamily {
        match self {
            IpAddress::V4(_) => IpFamily::V4,
            IpAddress::V6(_) => IpFamily::V6,
        }
    }

    /// Returns true if this is an IPv4 address.
    pub const fn is_ipv4(&self) -> bool {
        matches!(self, IpAddress::V4(_))
    }

    /// Returns true if this is an IPv6 address.
    pub const fn is_ipv6(&self) -> bool {
        matches!(self, IpAddress::V6(_))
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpAddress::V4(addr) => addr.fmt(f),
            IpAddress::V6(addr) => addr.fmt(f),
        }
    }
}

impl FromStr for IpAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains(':') {
            s.parse::<Ipv6Address>().map(IpAddress::V6)
        } else {
            s.parse::<Ipv4Address>().map(IpAddress::V4)
        }
    }
}

impl From<Ipv4Address> for IpAddress {
    fn from(addr: Ipv4Address) -> Self {
        IpAddress::V4(addr)
    }
}

impl From<Ipv6Address> for IpAddress {
    fn from(addr: Ipv6Address) -> Self {
        IpAddress::V6(addr)
    }
}

impl From<Ipv4Addr> for IpAddress {
    fn from(addr: Ipv4Addr) -> Self {
        IpAddress::V4(Ipv4Address(addr))
    }
}

impl From<Ipv6Addr> for IpAddress {
    fn from(addr: Ipv6Addr) -> Self {
        IpAddress::V6(Ipv6Address(addr))
    }
}

/// Returns the mask covering the host bits of a prefix of the given length.
fn host_mask(family: IpFamily, prefix_len: u8) -> u128 {
    let host_bits = u32::from(family.bits() - prefix_len);
    if host_bits >= 128 {
        u128::MAX
    } else {
        (1u128 << host_bits) - 1
    }
}

/// A network-aligned CIDR block (e.g. 1.0.1.0/24 or 2400:3200::/32).
///
/// The start address never has host bits set; every constructor rejects
/// input that would violate this, so a value of this type is always a valid
/// block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AddressRange {
    family: IpFamily,
    start: u128,
    prefix_len: u8,
}

impl AddressRange {
    /// Creates a block from a network address and prefix length.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidIpPrefix`] if the prefix length exceeds
    /// the family width and [`ParseError::MisalignedPrefix`] if the address
    /// has host bits set.
    pub fn new(address: IpAddress, prefix_len: u8) -> Result<Self, ParseError> {
        Self::from_bits(address.family(), address.to_bits(), prefix_len)
    }

    /// Creates a block from the integer value of its start address.
    pub fn from_bits(family: IpFamily, start: u128, prefix_len: u8) -> Result<Self, ParseError> {
        if prefix_len > family.bits() {
            return Err(ParseError::InvalidIpPrefix(format!(
                "prefix length {} exceeds maximum {} for {}",
                prefix_len,
                family.bits(),
                family
            )));
        }

        if start > family.max_value() {
            return Err(ParseError::InvalidIpAddress(format!(
                "{:#x} is out of range for {}",
                start, family
            )));
        }

        if start & host_mask(family, prefix_len) != 0 {
            return Err(ParseError::MisalignedPrefix(format!(
                "{}/{}",
                IpAddress::from_bits(family, start),
                prefix_len
            )));
        }

        Ok(AddressRange {
            family,
            start,
            prefix_len,
        })
    }

    /// Creates a single-address block (/32 or /128).
    pub fn host(address: IpAddress) -> Self {
        let family = address.family();
        AddressRange {
            family,
            start: address.to_bits(),
            prefix_len: family.bits(),
        }
    }

    pub const fn family(&self) -> IpFamily {
        self.family
    }

    /// Returns the first address of the block as an integer.
    pub const fn start(&self) -> u128 {
        self.start
    }

    /// Returns the last address of the block as an integer (inclusive).
    pub fn end(&self) -> u128 {
        self.start | host_mask(self.family, self.prefix_len)
    }

    /// Returns the prefix length in bits.
    pub const fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Returns the network (first) address of the block.
    pub fn network(&self) -> IpAddress {
        IpAddress::from_bits(self.family, self.start)
    }

    /// Returns the netmask of the block, e.g. 255.255.255.0 for a /24.
    pub fn netmask(&self) -> IpAddress {
        let mask = self.family.max_value() & !host_mask(self.family, self.prefix_len);
        IpAddress::from_bits(self.family, mask)
    }

    /// Returns true if the address lies inside this block.
    pub fn contains(&self, address: &IpAddress) -> bool {
        if address.family() != self.family {
            return false;
        }
        let bits = address.to_bits();
        bits >= self.start && bits <= self.end()
    }

    /// Returns true if this is a host route (/32 for IPv4, /128 for IPv6).
    pub fn is_host_route(&self) -> bool {
        self.prefix_len == self.family.bits()
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix_len)
    }
}

impl FromStr for AddressRange {
    type Err = ParseError;

    /// Parses `base/len`; a bare address is read as a host block.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some((addr_str, len_str)) = s.rsplit_once('/') else {
            return s.parse::<IpAddress>().map(AddressRange::host);
        };

        let address: IpAddress = addr_str.parse()?;
        let prefix_len: u8 = len_str
            .parse()
            .map_err(|_| ParseError::InvalidIpPrefix(s.to_string()))?;

        AddressRange::new(address, prefix_len)
    }
}

impl TryFrom<String> for AddressRange {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AddressRange> for String {
    fn from(range: AddressRange) -> Self {
        range.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_family_tokens() {
        assert_eq!(IpFamily::from_token("ipv4"), Some(IpFamily::V4));
        assert_eq!(IpFamily::from_token("IPV6"), Some(IpFamily::V6));
        assert_eq!(IpFamily::from_token("asn"), None);
        assert_eq!(IpFamily::V6.to_string(), "ipv6");
        assert!("ipx".parse::<IpFamily>().is_err());
    }

    #[test]
    fn test_address_bits_roundtrip() {
        let v4: IpAddress = "1.0.1.0".parse().unwrap();
        assert_eq!(v4.to_bits(), 0x0100_0100);
        assert_eq!(IpAddress::from_bits(IpFamily::V4, 0x0100_0100), v4);

        let v6: IpAddress = "2400:3200::".parse().unwrap();
        assert_eq!(v6.family(), IpFamily::V6);
        assert_eq!(v6.to_bits() >> 96, 0x2400_3200);
    }

    #[test]
    fn test_range_parse() {
        let range: AddressRange = "10.0.0.0/24".parse().unwrap();
        assert_eq!(range.family(), IpFamily::V4);
        assert_eq!(range.prefix_len(), 24);
        assert_eq!(range.end() - range.start(), 255);

        let v6: AddressRange = "2001:db8::/32".parse().unwrap();
        assert_eq!(v6.family(), IpFamily::V6);
        assert_eq!(v6.prefix_len(), 32);
    }

    #[test]
    fn test_range_bare_address_is_host() {
        let range: AddressRange = "192.0.2.7".parse().unwrap();
        assert!(range.is_host_route());
        assert_eq!(range.to_string(), "192.0.2.7/32");

        let v6: AddressRange = "::1".parse().unwrap();
        assert_eq!(v6.to_string(), "::1/128");
    }

    #[test]
    fn test_range_rejects_misaligned_start() {
        assert_eq!(
            "10.0.0.1/24".parse::<AddressRange>(),
            Err(ParseError::MisalignedPrefix("10.0.0.1/24".to_string()))
        );
        assert!(matches!(
            "2001:db8::1/32".parse::<AddressRange>(),
            Err(ParseError::MisalignedPrefix(_))
        ));
    }

    #[test]
    fn test_invalid_prefix_length() {
        assert!("10.0.0.0/33".parse::<AddressRange>().is_err());
        assert!("2001:db8::/129".parse::<AddressRange>().is_err());
        assert!("10.0.0.0/abc".parse::<AddressRange>().is_err());
        assert!("not-an-address/8".parse::<AddressRange>().is_err());
    }

    #[test]
    fn test_range_full_space_bounds() {
        let all_v4: AddressRange = "0.0.0.0/0".parse().unwrap();
        assert_eq!(all_v4.prefix_len(), 0);
        assert_eq!(all_v4.end(), u128::from(u32::MAX));

        let all_v6: AddressRange = "::/0".parse().unwrap();
        assert_eq!(all_v6.end(), u128::MAX);
    }

    #[test]
    fn test_range_netmask() {
        let range: AddressRange = "128.0.0.0/1".parse().unwrap();
        assert_eq!(range.netmask().to_string(), "128.0.0.0");

        let range: AddressRange = "1.0.1.0/24".parse().unwrap();
        assert_eq!(range.netmask().to_string(), "255.255.255.0");

        let host: AddressRange = "1.2.3.4/32".parse().unwrap();
        assert_eq!(host.netmask().to_string(), "255.255.255.255");
    }

    #[test]
    fn test_range_contains() {
        let range: AddressRange = "1.0.1.0/24".parse().unwrap();
        assert!(range.contains(&"1.0.1.255".parse().unwrap()));
        assert!(!range.contains(&"1.0.2.0".parse().unwrap()));
        assert!(!range.contains(&"::1".parse().unwrap()));
    }

    #[test]
    fn test_range_ordering() {
        let mut ranges: Vec<AddressRange> = ["10.0.0.0/8", "1.0.0.0/8", "1.0.0.0/16"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        ranges.sort();
        let rendered: Vec<String> = ranges.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["1.0.0.0/8", "1.0.0.0/16", "10.0.0.0/8"]);
    }

    #[test]
    fn test_range_serde_as_string() {
        let range: AddressRange = "1.0.1.0/24".parse().unwrap();
        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(json, "\"1.0.1.0/24\"");

        let back: AddressRange = serde_json::from_str(&json).unwrap();
        assert_eq!(back, range);
        assert!(serde_json::from_str::<AddressRange>("\"1.0.1.1/24\"").is_err());
    }
}
