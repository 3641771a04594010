use std::fmt;
use std::net::Ipv4Addr;

use pnet::ipnetwork::Ipv4Network;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("invalid prefix /{0}")]
    InvalidPrefix(u8),
    #[error("range start {start} is after its end {end}")]
    Reversed { start: Ipv4Addr, end: Ipv4Addr },
}

/// An inclusive, contiguous run of IPv4 addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    pub fn ordered(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Result<Self, RangeError> {
        if u32::from(start_addr) > u32::from(end_addr) {
            return Err(RangeError::Reversed {
                start: start_addr,
                end: end_addr,
            });
        }
        Ok(Self::new(start_addr, end_addr))
    }

    pub fn to_iter(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(Ipv4Addr::from)
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let addr: u32 = addr.into();
        u32::from(self.start_addr) <= addr && addr <= u32::from(self.end_addr)
    }

    pub fn len(&self) -> u64 {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        if start > end {
            0
        } else {
            u64::from(end - start) + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Ipv4Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start_addr == self.end_addr {
            write!(f, "{}", self.start_addr)
        } else {
            write!(f, "{}-{}", self.start_addr, self.end_addr)
        }
    }
}

/// Full extent of a CIDR block, network and broadcast addresses included.
pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> Result<Ipv4Range, RangeError> {
    let network = Ipv4Network::new(ip, prefix).map_err(|_| RangeError::InvalidPrefix(prefix))?;
    Ok(Ipv4Range::new(network.network(), network.broadcast()))
}

/// Addresses of a CIDR block that can belong to a host.
///
/// Network and broadcast addresses are dropped for prefixes up to /30; /31
/// and /32 blocks have no such addresses to drop.
pub fn host_range(ip: Ipv4Addr, prefix: u8) -> Result<Ipv4Range, RangeError> {
    let full = cidr_range(ip, prefix)?;
    if prefix >= 31 {
        return Ok(full);
    }
    let start = u32::from(full.start_addr) + 1;
    let end = u32::from(full.end_addr) - 1;
    Ok(Ipv4Range::new(Ipv4Addr::from(start), Ipv4Addr::from(end)))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
