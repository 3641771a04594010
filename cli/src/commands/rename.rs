use std::net::Ipv4Addr;

use anyhow::Context;
use tracing::info;

use lanroster_common::config::Config;
use lanroster_core::registry::RegistryStore;

pub fn rename(address: Ipv4Addr, name: &str, cfg: &Config) -> anyhow::Result<()> {
    let registry = RegistryStore::new(&cfg.registry_path);
    let device = registry
        .rename(address, name)
        .with_context(|| format!("renaming {address} in {}", registry.path().display()))?;
    info!("{device} is now '{}'", device.display_name);
    Ok(())
}
