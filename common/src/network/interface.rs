//! Picks the local interface a discovery sweep is sent from.

use std::net::Ipv4Addr;

use pnet::datalink::NetworkInterface;
use pnet::ipnetwork::{IpNetwork, Ipv4Network};

#[cfg(target_os = "linux")]
use linux_impl::is_wired;
#[cfg(not(target_os = "linux"))]
use fallback_impl::is_wired;

use crate::network::range::Ipv4Range;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ViabilityError {
    /// The interface is operationally down.
    IsDown,
    /// Loopback interfaces never answer ARP for the LAN.
    IsLoopback,
    /// The interface does not have a MAC address.
    NoMacAddress,
    /// The interface does not support broadcast (required for ARP).
    NotBroadcast,
    /// The interface is a point-to-point link (e.g., a VPN).
    IsPointToPoint,
    /// The interface carries no IPv4 network to source requests from.
    NoIpv4,
}

pub trait NetworkInterfaceExtension {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network>;
    /// First IPv4 network of this interface that contains `addr`.
    fn ipv4_net_containing(&self, addr: Ipv4Addr) -> Option<Ipv4Network>;
}

impl NetworkInterfaceExtension for NetworkInterface {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network> {
        self.ips
            .iter()
            .filter_map(|ip| match ip {
                IpNetwork::V4(ipv4) => Some(*ipv4),
                IpNetwork::V6(_) => None,
            })
            .collect()
    }

    fn ipv4_net_containing(&self, addr: Ipv4Addr) -> Option<Ipv4Network> {
        self.get_ipv4_nets()
            .into_iter()
            .find(|net| net.contains(addr))
    }
}

pub fn is_viable_lan_interface(interface: &NetworkInterface) -> Result<(), ViabilityError> {
    if !interface.is_up() {
        return Err(ViabilityError::IsDown);
    }
    if interface.is_loopback() {
        return Err(ViabilityError::IsLoopback);
    }
    if interface.mac.is_none() {
        return Err(ViabilityError::NoMacAddress);
    }
    if !interface.is_broadcast() {
        return Err(ViabilityError::NotBroadcast);
    }
    if interface.is_point_to_point() {
        return Err(ViabilityError::IsPointToPoint);
    }
    if interface.get_ipv4_nets().is_empty() {
        return Err(ViabilityError::NoIpv4);
    }
    Ok(())
}

/// Names of every interface that is up and not a loopback.
pub fn adapter_names(interfaces: &[NetworkInterface]) -> Vec<String> {
    interfaces
        .iter()
        .filter(|intf| intf.is_up() && !intf.is_loopback())
        .map(|intf| intf.name.clone())
        .collect()
}

/// Selects the interface to probe `range` from.
///
/// Only viable interfaces whose IPv4 network contains both ends of the range
/// qualify. Wired interfaces win over the rest when several match.
pub fn select_for_range<'a>(
    interfaces: &'a [NetworkInterface],
    range: &Ipv4Range,
) -> Option<&'a NetworkInterface> {
    let candidates: Vec<&NetworkInterface> = interfaces
        .iter()
        .filter(|intf| is_viable_lan_interface(intf).is_ok())
        .filter(|intf| {
            intf.get_ipv4_nets()
                .iter()
                .any(|net| net.contains(range.start_addr) && net.contains(range.end_addr))
        })
        .collect();

    select_best(candidates)
}

/// Selects a viable interface by name, ignoring whether it covers any range.
pub fn select_by_name<'a>(
    interfaces: &'a [NetworkInterface],
    name: &str,
) -> Result<&'a NetworkInterface, Option<ViabilityError>> {
    let intf = interfaces.iter().find(|intf| intf.name == name).ok_or(None)?;
    is_viable_lan_interface(intf).map_err(Some)?;
    Ok(intf)
}

/// The IPv4 network of the best LAN interface, used for the `lan` target.
pub fn lan_network(interfaces: &[NetworkInterface]) -> Option<Ipv4Network> {
    let candidates: Vec<&NetworkInterface> = interfaces
        .iter()
        .filter(|intf| is_viable_lan_interface(intf).is_ok())
        .collect();

    select_best(candidates)?
        .get_ipv4_nets()
        .into_iter()
        .find(|net| !net.ip().is_loopback())
}

fn select_best(candidates: Vec<&NetworkInterface>) -> Option<&NetworkInterface> {
    candidates
        .iter()
        .find(|intf| is_wired(intf))
        .or(candidates.first())
        .copied()
}

#[cfg(target_os = "linux")]
mod linux_impl {
    use super::*;
    use std::path::Path;

    pub fn is_wired(interface: &NetworkInterface) -> bool {
        let base = format!("/sys/class/net/{}", interface.name);
        Path::new(&format!("{base}/device")).exists()
            && !Path::new(&format!("{base}/wireless")).exists()
    }
}

#[cfg(not(target_os = "linux"))]
mod fallback_impl {
    use super::*;

    pub fn is_wired(interface: &NetworkInterface) -> bool {
        interface.name.starts_with('e')
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

#[cfg(test)]
mod tests {
    use super::*;
    use pnet::util::MacAddr;

    const IFF_UP: u32 = 1;
    const IFF_BROADCAST: u32 = 1 << 1;
    const IFF_LOOPBACK: u32 = 1 << 3;
    const IFF_POINTOPOINT: u32 = 1 << 4;
    const IFF_RUNNING: u32 = 1 << 6;

    fn ni(name: &str, mac: Option<MacAddr>, ips: &[IpNetwork], flags: u32) -> NetworkInterface {
        NetworkInterface {
            name: name.into(),
            description: "".into(),
            index: 1,
            mac,
            ips: ips.to_vec(),
            flags,
        }
    }

    fn v4(a: u8, b: u8, c: u8, d: u8, p: u8) -> IpNetwork {
        IpNetwork::V4(Ipv4Network::new(Ipv4Addr::new(a, b, c, d), p).unwrap())
    }

    fn mac() -> Option<MacAddr> {
        Some(MacAddr::new(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff))
    }

    fn lan0() -> NetworkInterface {
        ni(
            "lan0",
            mac(),
            &[v4(192, 168, 1, 20, 24)],
            IFF_UP | IFF_BROADCAST | IFF_RUNNING,
        )
    }

    fn lab0() -> NetworkInterface {
        ni(
            "lab0",
            mac(),
            &[v4(10, 0, 0, 5, 16)],
            IFF_UP | IFF_BROADCAST | IFF_RUNNING,
        )
    }

    fn lo() -> NetworkInterface {
        ni(
            "lo",
            Some(MacAddr::zero()),
            &[v4(127, 0, 0, 1, 8)],
            IFF_UP | IFF_LOOPBACK | IFF_RUNNING,
        )
    }

    fn tun0() -> NetworkInterface {
        ni(
            "tun0",
            None,
            &[v4(10, 8, 0, 2, 24)],
            IFF_UP | IFF_POINTOPOINT | IFF_RUNNING,
        )
    }

    #[test]
    fn viability_rejects_loopback_and_tunnels() {
        assert_eq!(is_viable_lan_interface(&lo()), Err(ViabilityError::IsLoopback));
        assert_eq!(is_viable_lan_interface(&tun0()), Err(ViabilityError::NoMacAddress));
        assert_eq!(is_viable_lan_interface(&lan0()), Ok(()));
    }

    #[test]
    fn viability_rejects_down_interface() {
        let down = ni("eth9", mac(), &[v4(192, 168, 9, 2, 24)], IFF_BROADCAST);
        assert_eq!(is_viable_lan_interface(&down), Err(ViabilityError::IsDown));
    }

    #[test]
    fn range_selects_the_covering_interface() {
        let interfaces = vec![lo(), lab0(), tun0(), lan0()];
        let range = Ipv4Range::new(Ipv4Addr::new(192, 168, 1, 1), Ipv4Addr::new(192, 168, 1, 254));
        let selected = select_for_range(&interfaces, &range).expect("lan0 covers the range");
        assert_eq!(selected.name, "lan0");

        let range = Ipv4Range::new(Ipv4Addr::new(10, 0, 3, 1), Ipv4Addr::new(10, 0, 3, 9));
        assert_eq!(select_for_range(&interfaces, &range).unwrap().name, "lab0");
    }

    #[test]
    fn range_outside_every_network_selects_nothing() {
        let interfaces = vec![lo(), lan0()];
        let range = Ipv4Range::new(Ipv4Addr::new(172, 16, 0, 1), Ipv4Addr::new(172, 16, 0, 9));
        assert!(select_for_range(&interfaces, &range).is_none());
    }

    #[test]
    fn range_straddling_a_network_boundary_selects_nothing() {
        let interfaces = vec![lan0()];
        let range = Ipv4Range::new(Ipv4Addr::new(192, 168, 1, 200), Ipv4Addr::new(192, 168, 2, 5));
        assert!(select_for_range(&interfaces, &range).is_none());
    }

    #[test]
    fn select_by_name_reports_why() {
        let interfaces = vec![lo(), lan0()];
        assert_eq!(select_by_name(&interfaces, "lan0").unwrap().name, "lan0");
        assert_eq!(
            select_by_name(&interfaces, "lo").unwrap_err(),
            Some(ViabilityError::IsLoopback)
        );
        assert_eq!(select_by_name(&interfaces, "missing").unwrap_err(), None);
    }

    #[test]
    fn lan_network_skips_loopback() {
        let interfaces = vec![lo(), lan0()];
        let net = lan_network(&interfaces).expect("lan0 is viable");
        assert_eq!(net.network(), Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(net.prefix(), 24);
    }

    #[test]
    fn adapter_names_lists_up_non_loopback() {
        let down = ni("eth9", mac(), &[], IFF_BROADCAST);
        let interfaces = vec![lo(), lan0(), down, tun0()];
        assert_eq!(adapter_names(&interfaces), vec!["lan0", "tun0"]);
    }
}
