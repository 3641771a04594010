//! The **abstraction** for discovery sweeps.
//!
//! Higher layers depend on [`Prober`] rather than on [`LocalScanner`]
//! directly, so a pass can be driven by a fake in tests or by another
//! strategy later.

use std::io;
use std::time::Duration;

use lanroster_common::device::Device;
use lanroster_common::network::range::Ipv4Range;
use lanroster_protocols::PacketError;

mod local;
pub mod resolver;

pub use local::LocalScanner;

/// Largest sweep accepted in one pass (a `/16`).
pub const MAX_PROBE_HOSTS: u64 = 1 << 16;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("insufficient privilege to open a raw socket on {interface}")]
    InsufficientPrivilege {
        interface: String,
        #[source]
        source: io::Error,
    },
    #[error("opening datalink channel on {interface}")]
    Channel {
        interface: String,
        #[source]
        source: io::Error,
    },
    #[error("non-ethernet channel for {0}")]
    UnsupportedChannel(String),
    #[error("no usable interface for {0}")]
    NoInterface(String),
    #[error("range {range} holds {hosts} addresses, more than a /16 sweep allows")]
    RangeTooLarge { range: Ipv4Range, hosts: u64 },
    #[error("building discovery packets")]
    Packet(#[from] PacketError),
}

impl ProbeError {
    pub fn is_privilege_error(&self) -> bool {
        matches!(self, ProbeError::InsufficientPrivilege { .. })
    }
}

/// Sends one discovery sweep and collects what answers.
pub trait Prober: Send + Sync {
    /// Probes every address of `range` once and returns the replies that
    /// arrived within `timeout`. Devices come back unnamed; the same
    /// address may appear more than once.
    fn probe(&self, range: &Ipv4Range, timeout: Duration) -> Result<Vec<Device>, ProbeError>;
}
