use std::net::Ipv4Addr;

use anyhow::{Context, anyhow};

use lanroster_common::config::Config;
use lanroster_common::network::mac::{self, HardwareIdStyle};
use lanroster_core::registry::RegistryStore;

use crate::terminal::print;

/// Prints the hardware id of a saved device, ready to paste into OS tooling.
pub fn mac(address: Ipv4Addr, style: HardwareIdStyle, cfg: &Config) -> anyhow::Result<()> {
    let registry = RegistryStore::new(&cfg.registry_path);
    let devices = registry
        .load()
        .with_context(|| format!("loading {}", registry.path().display()))?;
    let device = devices
        .iter()
        .find(|d| d.address == address)
        .ok_or_else(|| anyhow!("no saved device with address {address}"))?;
    let parsed = mac::parse_hardware_id(&device.hardware_id)
        .ok_or_else(|| anyhow!("saved MAC '{}' of {address} is malformed", device.hardware_id))?;

    print::print(&mac::format_hardware_id(parsed, style));
    Ok(())
}
