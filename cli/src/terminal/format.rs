use colored::*;
use unicode_width::UnicodeWidthStr;

use lanroster_common::device::Device;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

/// Whether a listed device answered the latest sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Online,
    Offline,
    Saved,
}

pub fn device_title(device: &Device) -> &str {
    if device.display_name.is_empty() {
        "No name"
    } else {
        &device.display_name
    }
}

pub fn device_to_details(device: &Device, presence: Presence) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![
        (
            "IPv4".to_string(),
            device.address.to_string().color(colors::IPV4_ADDR),
        ),
        (
            "MAC".to_string(),
            device.hardware_id.as_str().color(colors::MAC_ADDR),
        ),
    ];

    match presence {
        Presence::Online => details.push(("Status".to_string(), "online".color(colors::ONLINE))),
        Presence::Offline => details.push(("Status".to_string(), "not seen".color(colors::OFFLINE))),
        Presence::Saved => {}
    }
    details
}

/// Width of the widest title, for one-line listings.
pub fn title_width(devices: &[Device]) -> usize {
    devices
        .iter()
        .map(|d| UnicodeWidthStr::width(device_title(d)))
        .max()
        .unwrap_or(0)
}

pub fn compact_line(device: &Device, title_width: usize) -> String {
    let title = device_title(device);
    let pad = " ".repeat(title_width.saturating_sub(UnicodeWidthStr::width(title)));
    format!(
        "{}{} {} {}",
        title.color(colors::PRIMARY),
        pad,
        format!("{:<15}", device.address).color(colors::IPV4_ADDR),
        device.hardware_id.as_str().color(colors::MAC_ADDR)
    )
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
