use std::fmt;
use std::net::Ipv4Addr;

use pnet::util::MacAddr;
use serde::{Deserialize, Serialize};

/// Display name given to devices whose reverse lookup failed.
pub const UNKNOWN_NAME: &str = "Unknown";

/// A host on the LAN, identified by its IPv4 address.
///
/// The serialized field names (`ip`, `mac`, `name`) are the registry file's
/// wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    #[serde(rename = "ip")]
    pub address: Ipv4Addr,
    #[serde(rename = "mac")]
    pub hardware_id: String,
    #[serde(rename = "name", default)]
    pub display_name: String,
}

impl Device {
    pub fn new(
        address: Ipv4Addr,
        hardware_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            address,
            hardware_id: hardware_id.into(),
            display_name: display_name.into(),
        }
    }

    /// A device straight off the wire: no name until it is resolved.
    pub fn discovered(address: Ipv4Addr, mac: MacAddr) -> Self {
        Self::new(address, mac.to_string(), String::new())
    }

    pub fn with_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.address, self.hardware_id)
    }
}
