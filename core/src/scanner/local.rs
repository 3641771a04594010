//! A **local area network (LAN)** scanner.
//!
//! Discovers hosts on the same physical network with a single ARP sweep.
//!
//! This scanner requires **root privileges** (or `CAP_NET_RAW`) to construct
//! and intercept raw Layer 2 packets.

use std::collections::HashSet;
use std::io;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use pnet::datalink::{self, Channel, Config, DataLinkReceiver, NetworkInterface};
use pnet::util::MacAddr;
use tracing::{debug, info, trace, warn};

use lanroster_common::device::Device;
use lanroster_common::network::interface::{self, NetworkInterfaceExtension};
use lanroster_common::network::range::Ipv4Range;
use lanroster_protocols::{arp, ethernet};

use crate::network::channel;

use super::{MAX_PROBE_HOSTS, ProbeError, Prober};

/// Probes from a local interface, picked per range unless pinned by name.
#[derive(Debug, Clone, Default)]
pub struct LocalScanner {
    interface: Option<String>,
}

impl Prober for LocalScanner {
    fn probe(&self, range: &Ipv4Range, timeout: Duration) -> Result<Vec<Device>, ProbeError> {
        let hosts = range.len();
        if hosts > MAX_PROBE_HOSTS {
            return Err(ProbeError::RangeTooLarge {
                range: *range,
                hosts,
            });
        }

        let intf = self.select_interface(range)?;
        info!(interface = %intf.name, %range, hosts, "starting ARP sweep");
        sweep(&intf, range, timeout, datalink::channel)
    }
}

impl LocalScanner {
    pub fn new(interface: Option<String>) -> Self {
        Self { interface }
    }

    fn select_interface(&self, range: &Ipv4Range) -> Result<NetworkInterface, ProbeError> {
        let interfaces = datalink::interfaces();
        match &self.interface {
            Some(name) => interface::select_by_name(&interfaces, name)
                .cloned()
                .map_err(|reason| {
                    warn!(interface = %name, ?reason, "requested interface is not usable");
                    ProbeError::NoInterface(range.to_string())
                }),
            None => interface::select_for_range(&interfaces, range)
                .cloned()
                .ok_or_else(|| ProbeError::NoInterface(range.to_string())),
        }
    }
}

/// Where requests are sent from and which replies count.
#[derive(Debug, Clone)]
pub(crate) struct SenderConfig {
    local_mac: MacAddr,
    local_addr: Ipv4Addr,
    range: Ipv4Range,
}

impl SenderConfig {
    fn for_range(intf: &NetworkInterface, range: &Ipv4Range) -> Result<Self, ProbeError> {
        let no_interface = || ProbeError::NoInterface(range.to_string());
        let local_mac = intf.mac.ok_or_else(no_interface)?;
        let local_net = intf
            .ipv4_net_containing(range.start_addr)
            .or_else(|| intf.get_ipv4_nets().into_iter().next())
            .ok_or_else(no_interface)?;

        Ok(Self {
            local_mac,
            local_addr: local_net.ip(),
            range: *range,
        })
    }

    /// Turns a captured frame into a device if it is an ARP reply from a
    /// foreign host inside the probed range.
    fn device_from_frame(&self, bytes: &[u8]) -> Option<Device> {
        let eth_frame = ethernet::get_packet_from_u8(bytes).ok()?;
        if eth_frame.get_source() == self.local_mac {
            return None;
        }
        let reply = arp::parse_reply(&eth_frame)?;
        if reply.sender_mac == self.local_mac || !self.range.contains(reply.sender_addr) {
            trace!(addr = %reply.sender_addr, "ignoring reply outside the sweep");
            return None;
        }
        Some(Device::discovered(reply.sender_addr, reply.sender_mac))
    }
}

pub(crate) fn sweep<F>(
    intf: &NetworkInterface,
    range: &Ipv4Range,
    timeout: Duration,
    channel_opener: F,
) -> Result<Vec<Device>, ProbeError>
where
    F: FnOnce(&NetworkInterface, Config) -> io::Result<Channel>,
{
    let sender_cfg = SenderConfig::for_range(intf, range)?;
    let packets: Vec<Vec<u8>> =
        arp::create_sweep(sender_cfg.local_mac, sender_cfg.local_addr, range.to_iter())?;

    let (mut tx, mut rx) = channel::open_eth_channel(intf, channel_opener)?;

    let mut failed: usize = 0;
    for packet in &packets {
        if let Some(Err(e)) = tx.send_to(packet, None) {
            failed += 1;
            debug!("send failed: {e}");
        }
    }
    if failed > 0 {
        warn!(failed, total = packets.len(), "some ARP requests could not be sent");
    }

    let deadline = Instant::now() + timeout;
    let devices = listen_for_replies(rx.as_mut(), deadline, &sender_cfg);
    info!(replies = devices.len(), "ARP sweep finished");
    Ok(devices)
}

/// Collects replies until `deadline`. Frames still in flight afterwards are
/// never read.
fn listen_for_replies(
    rx: &mut dyn DataLinkReceiver,
    deadline: Instant,
    sender_cfg: &SenderConfig,
) -> Vec<Device> {
    let mut devices: Vec<Device> = Vec::new();
    let mut seen: HashSet<(Ipv4Addr, String)> = HashSet::new();

    while Instant::now() < deadline {
        match rx.next() {
            Ok(frame) => {
                if let Some(device) = sender_cfg.device_from_frame(frame) {
                    // Hosts often answer twice; only identical repeats are folded here.
                    if seen.insert((device.address, device.hardware_id.clone())) {
                        devices.push(device);
                    }
                }
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {}
            Err(e) => trace!("receive error: {e}"),
        }
    }
    devices
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
