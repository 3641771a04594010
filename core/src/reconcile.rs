//! Combines what answered just now with what the operator saved earlier.

use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;

use lanroster_common::device::Device;

/// The merged result of one discovery pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiscoveryView {
    /// Probed devices first (saved entry preferred), then saved-only ones.
    pub devices: Vec<Device>,
    /// How many leading entries of `devices` answered this pass.
    pub scanned: usize,
}

impl DiscoveryView {
    pub fn scanned(&self) -> &[Device] {
        &self.devices[..self.scanned]
    }

    pub fn historical(&self) -> &[Device] {
        &self.devices[self.scanned..]
    }
}

/// Merges a probe result with the registry.
///
/// Every probed address appears once, in probe order, as the saved entry when
/// one exists. Saved addresses that did not answer follow in registry order.
pub fn merge(probed: &[Device], saved: &[Device]) -> Vec<Device> {
    let mut by_address: HashMap<Ipv4Addr, &Device> = HashMap::with_capacity(saved.len());
    for device in saved {
        by_address.entry(device.address).or_insert(device);
    }

    let mut emitted: HashSet<Ipv4Addr> = HashSet::with_capacity(probed.len() + saved.len());
    let mut merged: Vec<Device> = Vec::with_capacity(probed.len() + saved.len());

    for device in probed {
        if !emitted.insert(device.address) {
            continue;
        }
        let chosen = by_address.get(&device.address).copied().unwrap_or(device);
        merged.push(chosen.clone());
    }

    for device in saved {
        if emitted.insert(device.address) {
            merged.push(device.clone());
        }
    }

    merged
}

/// Keeps the first occurrence of every address.
pub fn dedup_by_address(devices: Vec<Device>) -> Vec<Device> {
    let mut seen: HashSet<Ipv4Addr> = HashSet::with_capacity(devices.len());
    devices
        .into_iter()
        .filter(|d| seen.insert(d.address))
        .collect()
}

pub fn reconcile(probed: Vec<Device>, saved: &[Device]) -> DiscoveryView {
    let probed = dedup_by_address(probed);
    let scanned = probed.len();
    DiscoveryView {
        devices: merge(&probed, saved),
        scanned,
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
