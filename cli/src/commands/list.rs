use anyhow::Context;

use lanroster_common::config::Config;
use lanroster_core::registry::RegistryStore;

use crate::mprint;
use crate::terminal::format::{self, Presence};
use crate::terminal::print;

pub fn list(cfg: &Config) -> anyhow::Result<()> {
    let registry = RegistryStore::new(&cfg.registry_path);
    let devices = registry
        .load()
        .with_context(|| format!("loading {}", registry.path().display()))?;

    if devices.is_empty() {
        print::print_status(format!("no saved devices in {}", registry.path().display()));
        return Ok(());
    }

    print::header("Saved Devices", cfg.quiet);
    if cfg.quiet > 0 {
        let width = format::title_width(&devices);
        for device in &devices {
            print::print(&format::compact_line(device, width));
        }
        return Ok(());
    }

    for (idx, device) in devices.iter().enumerate() {
        print::tree_head(idx, format::device_title(device));
        print::as_tree_one_level(format::device_to_details(device, Presence::Saved));
        if idx + 1 != devices.len() {
            mprint!();
        }
    }
    Ok(())
}
