//! Strongly typed identifiers for clients, agents, and radio channels.
//!
//! All identifiers are `Copy + Ord + Hash` so they can be used as map keys
//! and sorted without ceremony.  `Ord` on [`AgentAddr`] is the "lowest-ordered
//! agent address" used when breaking ties between equally strong candidates.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use crate::CoreError;

// ── ClientMac ─────────────────────────────────────────────────────────────────

/// Hardware (MAC) address of a wireless station.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientMac(pub [u8; 6]);

impl ClientMac {
    #[inline]
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    #[inline]
    pub fn octets(self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for ClientMac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

impl FromStr for ClientMac {
    type Err = CoreError;

    /// Parses `aa:bb:cc:dd:ee:ff` (case-insensitive; `-` also accepted).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::Parse(format!("invalid MAC address {s:?}"));

        let mut octets = [0u8; 6];
        let mut parts  = s.trim().split([':', '-']);
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 {
                return Err(invalid());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(ClientMac(octets))
    }
}

// ── AgentAddr ─────────────────────────────────────────────────────────────────

/// Network address of an agent (the control process of one access point).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentAddr(pub IpAddr);

impl AgentAddr {
    /// Shorthand for an IPv4 agent address.
    #[inline]
    pub const fn v4(a: u8, b: u8, c: u8, d: u8) -> Self {
        Self(IpAddr::V4(Ipv4Addr::new(a, b, c, d)))
    }

    #[inline]
    pub fn ip(self) -> IpAddr {
        self.0
    }
}

impl From<IpAddr> for AgentAddr {
    fn from(ip: IpAddr) -> Self {
        Self(ip)
    }
}

impl fmt::Display for AgentAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AgentAddr {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<IpAddr>()
            .map(AgentAddr)
            .map_err(|_| CoreError::Parse(format!("invalid agent address {s:?}")))
    }
}

// ── Channel ───────────────────────────────────────────────────────────────────

/// IEEE 802.11 channel number an agent operates on.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Channel(pub u8);

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch{}", self.0)
    }
}
