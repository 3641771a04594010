//! Hardware-id (MAC address) text forms.
//!
//! Probe replies and the registry use the colon form `aa:bb:cc:dd:ee:ff`.
//! OS tooling differs: some wants hyphens, some wants the twelve hex digits
//! with no separator at all.

use pnet::util::MacAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HardwareIdStyle {
    /// `aa:bb:cc:dd:ee:ff`
    #[default]
    Colon,
    /// `AA-BB-CC-DD-EE-FF`
    Hyphen,
    /// `AABBCCDDEEFF`
    Compact,
}

impl HardwareIdStyle {
    /// The convention of the platform this binary was built for.
    pub fn native() -> Self {
        if cfg!(target_os = "windows") {
            HardwareIdStyle::Compact
        } else {
            HardwareIdStyle::Colon
        }
    }
}

/// Parses a hardware id written with colons, hyphens, or no separator.
pub fn parse_hardware_id(text: &str) -> Option<MacAddr> {
    let digits: String = text
        .trim()
        .chars()
        .filter(|c| *c != ':' && *c != '-')
        .collect();

    if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let separators = text.trim().len() - digits.len();
    if separators != 0 && separators != 5 {
        return None;
    }

    let mut octets = [0u8; 6];
    for (idx, octet) in octets.iter_mut().enumerate() {
        *octet = u8::from_str_radix(&digits[idx * 2..idx * 2 + 2], 16).ok()?;
    }
    Some(MacAddr::new(
        octets[0], octets[1], octets[2], octets[3], octets[4], octets[5],
    ))
}

pub fn format_hardware_id(mac: MacAddr, style: HardwareIdStyle) -> String {
    let octets: [u8; 6] = [mac.0, mac.1, mac.2, mac.3, mac.4, mac.5];
    match style {
        HardwareIdStyle::Colon => mac.to_string(),
        HardwareIdStyle::Hyphen => octets
            .iter()
            .map(|octet| format!("{octet:02X}"))
            .collect::<Vec<String>>()
            .join("-"),
        HardwareIdStyle::Compact => octets.iter().map(|octet| format!("{octet:02X}")).collect(),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
