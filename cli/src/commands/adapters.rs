use colored::*;

use lanroster_common::adapter::AdapterController;
use lanroster_common::config::Config;
use lanroster_core::adapter::SystemAdapters;

use crate::terminal::{colors, print};

pub fn adapters(cfg: &Config) -> anyhow::Result<()> {
    let names = SystemAdapters.list_adapters()?;
    if names.is_empty() {
        print::print_status("no usable network adapters");
        return Ok(());
    }

    print::header("Network Adapters", cfg.quiet);
    for (idx, name) in names.iter().enumerate() {
        let marker = if cfg.interface.as_deref() == Some(name.as_str()) {
            " (selected)".color(colors::ACCENT)
        } else {
            "".normal()
        };
        print::print(&format!(
            "{} {}{}",
            format!("[{idx}]").color(colors::SEPARATOR),
            name.color(colors::PRIMARY),
            marker
        ));
    }
    Ok(())
}
