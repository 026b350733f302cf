//! IPv4 address and CIDR notation utilities.
//!
//! Provides [`Ipv4`] struct for representing CIDR blocks in network plans,
//! along with the range checks used to validate them.

use crate::error::ConfigurationError;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Maximum length for an IPv4 subnet mask (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Addresses AWS reserves in every subnet (network, router, DNS, future use, broadcast).
pub const AWS_RESERVED_ADDRESSES: u64 = 5;

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use cfn_vpc_template::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32, ConfigurationError> {
    if len > MAX_LENGTH {
        return Err(ConfigurationError::PrefixTooLong(len));
    }
    Ok(u32::MAX.checked_shl(u32::from(MAX_LENGTH - len)).unwrap_or(0))
}

/// Get the network address for a given IP and prefix length.
pub fn cut_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr, ConfigurationError> {
    let mask = get_cidr_mask(len)?;
    Ok(Ipv4Addr::from(u32::from(addr) & mask))
}

/// Calculate the broadcast address for a given IP and prefix length.
pub fn broadcast_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr, ConfigurationError> {
    let mask = get_cidr_mask(len)?;
    Ok(Ipv4Addr::from((u32::from(addr) & mask) | !mask))
}

/// Number of addresses an AWS subnet of the given size leaves for hosts.
pub fn num_aws_hosts(len: u8) -> Result<u64, ConfigurationError> {
    if len > MAX_LENGTH {
        return Err(ConfigurationError::PrefixTooLong(len));
    }
    let total = 1u64 << (MAX_LENGTH - len);
    Ok(total.saturating_sub(AWS_RESERVED_ADDRESSES))
}

/// IPv4 address with CIDR notation support.
#[derive(Eq, Ord, PartialEq, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct Ipv4 {
    /// The IPv4 address.
    pub addr: Ipv4Addr,
    /// The subnet mask length (0-32).
    pub mask: u8,
}

impl Serialize for Ipv4 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Ipv4 {
    fn deserialize<D>(deserializer: D) -> Result<Ipv4, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ipv4::new(&s).map_err(de::Error::custom)
    }
}

impl Ipv4 {
    /// Build a block from literal octets, for compile-time plan constants.
    pub const fn from_octets(octets: [u8; 4], mask: u8) -> Ipv4 {
        Ipv4 {
            addr: Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]),
            mask,
        }
    }

    /// Create a new [`Ipv4`] from a CIDR string (e.g., "10.0.0.0/24").
    pub fn new(addr_cidr: &str) -> Result<Ipv4, ConfigurationError> {
        let addr_cidr = addr_cidr.trim();
        let invalid = |reason: String| ConfigurationError::InvalidCidr {
            value: addr_cidr.to_string(),
            reason,
        };
        let (addr, mask) = addr_cidr
            .split_once('/')
            .ok_or_else(|| invalid("expected address/mask".to_string()))?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| invalid(format!("invalid address {addr}")))?;
        let mask: u8 = mask
            .parse()
            .map_err(|_| invalid(format!("invalid subnet mask {mask}")))?;
        get_cidr_mask(mask)?;
        Ok(Ipv4 { addr, mask })
    }

    /// Get the lowest (network) address in the block.
    ///
    /// A mask longer than 32 bits behaves like /32.
    pub fn lo(&self) -> Ipv4Addr {
        cut_addr(self.addr, self.mask).unwrap_or(self.addr)
    }

    /// Get the highest (broadcast) address in the block.
    pub fn hi(&self) -> Ipv4Addr {
        broadcast_addr(self.addr, self.mask).unwrap_or(self.addr)
    }

    /// The block with host bits cleared.
    pub fn network(&self) -> Ipv4 {
        Ipv4 {
            addr: self.lo(),
            mask: self.mask,
        }
    }

    /// True when every address of `other` lies inside this block.
    pub fn contains(&self, other: &Ipv4) -> bool {
        self.lo() <= other.lo() && other.hi() <= self.hi()
    }

    /// True when the two blocks share at least one address.
    pub fn overlaps(&self, other: &Ipv4) -> bool {
        self.lo() <= other.hi() && other.lo() <= self.hi()
    }
}

impl FromStr for Ipv4 {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ipv4::new(s)
    }
}

impl std::fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}
