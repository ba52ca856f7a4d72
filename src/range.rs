use core::fmt;
use core::ops::Range;
use core::str::FromStr;
use std::net::Ipv4Addr;

#[cfg(feature = "serde1")]
use serde::{
    de::{self, Deserialize, Deserializer},
    ser::{Serialize, Serializer},
};

use crate::AddressRangeError;

/// Longest prefix length; a block of this length holds a single address.
pub const MAX_PREFIX_LEN: u8 = 32;

/// One past the last IPv4 address (`255.255.255.255`).
pub(crate) const ADDRESS_SPACE_END: u64 = 1 << 32;

/// A CIDR block of IPv4 addresses, such as `10.0.0.0/8` or a single
/// host like `192.168.1.7` (which is the same as `192.168.1.7/32`).
///
/// The block covers the half-open interval [`begin`](Self::begin)`..`[`end`](Self::end)
/// of the address space, where addresses are their big-endian `u32`
/// values widened to `u64`. The block ending at the top of the address
/// space (e.g. `0.0.0.0/0` or `255.255.255.255`) ends at exactly `2^32`.
///
/// Ranges are ordered by their first address, then by prefix length.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct AddressRange {
    network: Ipv4Addr,
    prefix_len: u8,
}

impl AddressRange {
    /// The whole address space, `0.0.0.0/0`.
    pub const ALL: AddressRange = AddressRange {
        network: Ipv4Addr::UNSPECIFIED,
        prefix_len: 0,
    };

    /// Makes the block with the given network address and prefix length.
    ///
    /// Fails if `prefix_len` is above 32, or if `network` has any bits
    /// set beyond the first `prefix_len` bits. Host bits are never
    /// silently masked off; see [`enclosing`](Self::enclosing) for that.
    ///
    /// ```
    /// use std::net::Ipv4Addr;
    /// use iprangeset::{AddressRange, AddressRangeError};
    ///
    /// let range = AddressRange::new(Ipv4Addr::new(10, 0, 0, 0), 8)?;
    /// assert_eq!(range.to_string(), "10.0.0.0/8");
    ///
    /// assert!(AddressRange::new(Ipv4Addr::new(10, 0, 0, 1), 8).is_err());
    /// # Ok::<(), AddressRangeError>(())
    /// ```
    pub fn new(network: Ipv4Addr, prefix_len: u8) -> Result<Self, AddressRangeError> {
        if prefix_len > MAX_PREFIX_LEN {
            return Err(AddressRangeError::InvalidPrefixLength(
                prefix_len.to_string(),
            ));
        }
        if u32::from(network) & !netmask(prefix_len) != 0 {
            return Err(AddressRangeError::HostBitsSet {
                network,
                prefix_len,
            });
        }
        Ok(AddressRange {
            network,
            prefix_len,
        })
    }

    /// Returns the block of the given prefix length that contains `address`.
    ///
    /// Unlike [`new`](Self::new), this clears any host bits of `address`.
    pub fn enclosing(address: Ipv4Addr, prefix_len: u8) -> Result<Self, AddressRangeError> {
        if prefix_len > MAX_PREFIX_LEN {
            return Err(AddressRangeError::InvalidPrefixLength(
                prefix_len.to_string(),
            ));
        }
        Ok(AddressRange {
            network: Ipv4Addr::from(u32::from(address) & netmask(prefix_len)),
            prefix_len,
        })
    }

    /// The first address of the block.
    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// The first address of the block, as an integer.
    pub fn begin(&self) -> u64 {
        u64::from(u32::from(self.network))
    }

    /// The first address past the end of the block, as an integer.
    ///
    /// This is at most `2^32`, which is not itself an IPv4 address.
    pub fn end(&self) -> u64 {
        self.begin() + self.len()
    }

    /// Number of addresses in the block.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        1 << (MAX_PREFIX_LEN - self.prefix_len)
    }

    /// Returns `true` if the block covers `address`.
    pub fn contains<A: Into<u32>>(&self, address: A) -> bool {
        let address: u32 = address.into();
        let address = u64::from(address);
        self.begin() <= address && address < self.end()
    }

    /// The block as a half-open range of integer addresses.
    pub fn as_range(&self) -> Range<u64> {
        self.begin()..self.end()
    }
}

impl From<Ipv4Addr> for AddressRange {
    fn from(address: Ipv4Addr) -> Self {
        AddressRange {
            network: address,
            prefix_len: MAX_PREFIX_LEN,
        }
    }
}

/// Parses `A.B.C.D` or `A.B.C.D/P`.
///
/// Every component must be plain decimal digits. A missing prefix
/// length means a single host (`/32`).
impl FromStr for AddressRange {
    type Err = AddressRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (address, prefix_len) = match s.split_once('/') {
            Some((address, prefix_len)) => (address, Some(prefix_len)),
            None => (s, None),
        };
        let network = parse_address(address)?;
        let prefix_len = match prefix_len {
            Some(prefix_len) => parse_prefix_len(prefix_len)?,
            None => MAX_PREFIX_LEN,
        };
        AddressRange::new(network, prefix_len)
    }
}

fn parse_address(s: &str) -> Result<Ipv4Addr, AddressRangeError> {
    let components: Vec<&str> = s.split('.').collect();
    if components.len() != 4 {
        return Err(AddressRangeError::InvalidFormat(s.to_string()));
    }
    let mut octets = [0u8; 4];
    for (octet, component) in octets.iter_mut().zip(components) {
        if !is_decimal(component) {
            return Err(AddressRangeError::InvalidFormat(s.to_string()));
        }
        // All digits, so the only way to fail is by being too big.
        *octet = component
            .parse()
            .map_err(|_| AddressRangeError::OctetOutOfRange(component.to_string()))?;
    }
    Ok(Ipv4Addr::from(octets))
}

fn parse_prefix_len(s: &str) -> Result<u8, AddressRangeError> {
    if !is_decimal(s) {
        return Err(AddressRangeError::InvalidFormat(s.to_string()));
    }
    match s.parse::<u8>() {
        Ok(prefix_len) if prefix_len <= MAX_PREFIX_LEN => Ok(prefix_len),
        _ => Err(AddressRangeError::InvalidPrefixLength(s.to_string())),
    }
}

fn is_decimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Bits covered by a prefix of the given length, e.g. `0xFFFFFF00` for 24.
fn netmask(prefix_len: u8) -> u32 {
    // Shift a wider value so that a zero-length prefix doesn't overflow.
    let host_bits = MAX_PREFIX_LEN - prefix_len;
    ((u64::from(u32::MAX) >> host_bits) << host_bits) as u32
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

#[cfg(feature = "serde1")]
impl Serialize for AddressRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde1")]
impl<'de> Deserialize<'de> for AddressRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(feature = "quickcheck")]
impl quickcheck::Arbitrary for AddressRange {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        use quickcheck::Arbitrary;

        let prefix_len = u8::arbitrary(g) % (MAX_PREFIX_LEN + 1);
        AddressRange {
            network: Ipv4Addr::from(u32::arbitrary(g) & netmask(prefix_len)),
            prefix_len,
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        // Shrink towards single hosts at the same address.
        let network = self.network;
        Box::new(
            (self.prefix_len + 1..=MAX_PREFIX_LEN).map(move |prefix_len| AddressRange {
                network,
                prefix_len,
            }),
        )
    }
}
