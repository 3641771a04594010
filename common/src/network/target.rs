//! # Scan Target Model
//!
//! Defines the accepted inputs for a discovery pass:
//! * A CIDR block (e.g., `192.168.1.0/24`).
//! * A single IPv4 address (host), probed as a `/32`.
//! * An IPv4 range (e.g., `192.168.1.1-100`).
//! * The local LAN, detected from the selected interface.

use std::net::Ipv4Addr;
use std::str::FromStr;

use pnet::datalink::NetworkInterface;

use crate::network::interface;
use crate::network::range::{self, Ipv4Range, RangeError};

/// Target used when none is given on the command line.
pub const DEFAULT_TARGET: &str = "192.168.1.0/24";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("invalid target: {0}")]
    Unrecognized(String),
    #[error("invalid address in '{input}'")]
    Address { input: String },
    #[error("invalid prefix in '{input}'")]
    Prefix { input: String },
    #[error("invalid end of range '{input}': {reason}")]
    RangeEnd { input: String, reason: String },
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error("no viable LAN interface to derive the local network from")]
    NoLanNetwork,
}

/// Represents a distinct target to be probed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// The network of the best local LAN interface.
    Lan,
    /// A concrete run of IPv4 addresses.
    Range { ipv4_range: Ipv4Range },
}

impl FromStr for Target {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.eq_ignore_ascii_case("lan") {
            return Ok(Target::Lan);
        }

        if let Ok(addr) = s.parse::<Ipv4Addr>() {
            let ipv4_range = Ipv4Range::new(addr, addr);
            return Ok(Target::Range { ipv4_range });
        }

        if let Some(target) = parse_cidr_range(s)? {
            return Ok(target);
        }

        if let Some(target) = parse_ip_range(s)? {
            return Ok(target);
        }

        Err(TargetError::Unrecognized(s.to_string()))
    }
}

impl Target {
    /// Resolves the target to concrete addresses, consulting `interfaces` for `lan`.
    pub fn to_range(&self, interfaces: &[NetworkInterface]) -> Result<Ipv4Range, TargetError> {
        match self {
            Target::Range { ipv4_range } => Ok(*ipv4_range),
            Target::Lan => {
                let net = interface::lan_network(interfaces).ok_or(TargetError::NoLanNetwork)?;
                Ok(range::host_range(net.ip(), net.prefix())?)
            }
        }
    }
}

/// Parses CIDR notation like "192.168.1.0/24" into its host addresses.
fn parse_cidr_range(s: &str) -> Result<Option<Target>, TargetError> {
    let Some((ip_str, prefix_str)) = s.split_once('/') else {
        return Ok(None);
    };

    let ipv4_addr = ip_str.parse::<Ipv4Addr>().map_err(|_| TargetError::Address {
        input: s.to_string(),
    })?;

    let prefix = prefix_str.parse::<u8>().map_err(|_| TargetError::Prefix {
        input: s.to_string(),
    })?;

    let ipv4_range = range::host_range(ipv4_addr, prefix)?;
    Ok(Some(Target::Range { ipv4_range }))
}

/// Parses a range string like "1.1.1.1-2.2.2.2" or "1.1.1.1-50".
fn parse_ip_range(s: &str) -> Result<Option<Target>, TargetError> {
    let Some((start_str, end_str)) = s.split_once('-') else {
        return Ok(None);
    };

    let start_addr = start_str.parse::<Ipv4Addr>().map_err(|_| TargetError::Address {
        input: s.to_string(),
    })?;

    let end_addr = parse_range_end_addr(end_str, &start_addr)?;
    let ipv4_range = Ipv4Range::ordered(start_addr, end_addr)?;
    Ok(Some(Target::Range { ipv4_range }))
}

/// Handles abbreviated ends like "192.168.1.1-50" (implies 192.168.1.50)
/// and full forms like "192.168.1.1-192.168.1.255".
fn parse_range_end_addr(end_str: &str, start_addr: &Ipv4Addr) -> Result<Ipv4Addr, TargetError> {
    if let Ok(full_addr) = end_str.parse::<Ipv4Addr>() {
        return Ok(full_addr);
    }

    let range_end_err = |reason: String| TargetError::RangeEnd {
        input: end_str.to_string(),
        reason,
    };

    let partial_octets: Vec<u8> = end_str
        .split('.')
        .map(|octet_str| octet_str.parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|e| range_end_err(e.to_string()))?;

    if partial_octets.len() > 4 {
        return Err(range_end_err("too many octets".to_string()));
    }

    let mut end_octets = start_addr.octets();
    let start_index = 4 - partial_octets.len();
    end_octets[start_index..].copy_from_slice(&partial_octets);

    Ok(Ipv4Addr::from(end_octets))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
