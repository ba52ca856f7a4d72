use std::net::Ipv4Addr;

use thiserror::Error;

/// Reasons a textual address range can be rejected.
///
/// These are only ever produced while constructing an [`AddressRange`];
/// once a range exists, adding it to or removing it from an
/// [`AddressSet`] cannot fail.
///
/// [`AddressRange`]: crate::AddressRange
/// [`AddressSet`]: crate::AddressSet
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressRangeError {
    /// The address part is not four dot-separated decimal components,
    /// or the prefix length is not a decimal number.
    #[error("invalid address range format: {0:?}")]
    InvalidFormat(String),

    /// One of the four components is a number above 255.
    #[error("octet out of range: {0}")]
    OctetOutOfRange(String),

    /// The prefix length is a number above 32.
    #[error("invalid prefix length: {0}")]
    InvalidPrefixLength(String),

    /// The address has bits set beyond the prefix length,
    /// so it is not the first address of its network.
    #[error("host bits set in {network}/{prefix_len}")]
    HostBitsSet { network: Ipv4Addr, prefix_len: u8 },
}
