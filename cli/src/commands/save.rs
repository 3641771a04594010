use std::net::Ipv4Addr;

use anyhow::{Context, bail};
use tracing::info;

use lanroster_common::config::Config;
use lanroster_common::device::Device;
use lanroster_common::network::mac::{self, HardwareIdStyle};
use lanroster_core::registry::RegistryStore;

pub fn save(address: Ipv4Addr, hardware_id: &str, name: &str, cfg: &Config) -> anyhow::Result<()> {
    let Some(parsed) = mac::parse_hardware_id(hardware_id) else {
        bail!("'{hardware_id}' is not a MAC address");
    };
    let device = Device::new(address, mac::format_hardware_id(parsed, HardwareIdStyle::Colon), name);

    let registry = RegistryStore::new(&cfg.registry_path);
    registry
        .save(device.clone())
        .with_context(|| format!("saving to {}", registry.path().display()))?;
    info!("saved {device}");
    Ok(())
}
