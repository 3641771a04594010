use std::net::Ipv4Addr;

use pnet::packet::Packet;
use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::util::MacAddr;

use crate::{ARP_LEN, ETH_HDR_LEN, MIN_ETH_FRAME_NO_FCS, PacketError, ethernet};

/// Sender half of an ARP reply: who answered and with which hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpReply {
    pub sender_addr: Ipv4Addr,
    pub sender_mac: MacAddr,
}

/// Builds one broadcast "who has `dst_addr`" frame, padded to the minimum Ethernet size.
pub fn create_request(
    src_mac: MacAddr,
    src_addr: Ipv4Addr,
    dst_addr: Ipv4Addr,
) -> Result<Vec<u8>, PacketError> {
    let mut buffer = [0u8; MIN_ETH_FRAME_NO_FCS];
    ethernet::make_header(&mut buffer, src_mac, MacAddr::broadcast(), EtherTypes::Arp)?;
    request_payload(&mut buffer, src_mac, src_addr, dst_addr)?;
    Ok(Vec::from(buffer))
}

/// Builds the request frames for a whole sweep, one per target address.
pub fn create_sweep<I>(
    src_mac: MacAddr,
    src_addr: Ipv4Addr,
    targets: I,
) -> Result<Vec<Vec<u8>>, PacketError>
where
    I: IntoIterator<Item = Ipv4Addr>,
{
    targets
        .into_iter()
        .map(|dst_addr| create_request(src_mac, src_addr, dst_addr))
        .collect()
}

fn request_payload(
    buffer: &mut [u8],
    src_mac: MacAddr,
    src_addr: Ipv4Addr,
    target_addr: Ipv4Addr,
) -> Result<(), PacketError> {
    if ETH_HDR_LEN + ARP_LEN > buffer.len() {
        return Err(PacketError::ArpBuffer);
    }
    let mut arp = MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..ETH_HDR_LEN + ARP_LEN])
        .ok_or(PacketError::ArpBuffer)?;
    arp.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp.set_protocol_type(EtherTypes::Ipv4);
    arp.set_hw_addr_len(6);
    arp.set_proto_addr_len(4);
    arp.set_operation(ArpOperations::Request);
    arp.set_sender_hw_addr(src_mac);
    arp.set_target_hw_addr(MacAddr::zero());
    arp.set_sender_proto_addr(src_addr);
    arp.set_target_proto_addr(target_addr);
    Ok(())
}

/// Extracts the sender of an ARP reply. Anything else (other ethertypes,
/// requests, truncated payloads) yields `None`.
pub fn parse_reply(frame: &EthernetPacket) -> Option<ArpReply> {
    if frame.get_ethertype() != EtherTypes::Arp {
        return None;
    }
    let arp = ArpPacket::new(frame.payload())?;
    if arp.get_operation() != ArpOperations::Reply {
        return None;
    }
    Some(ArpReply {
        sender_addr: arp.get_sender_proto_addr(),
        sender_mac: arp.get_sender_hw_addr(),
    })
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
    use pnet::packet::ethernet::MutableEthernetPacket;

    fn build_mock_arp_frame(op: pnet::packet::arp::ArpOperation, payload_size: usize) -> Vec<u8> {
        let mut buffer = vec![0u8; ETH_HDR_LEN + payload_size];
        {
            let mut eth_pkt = MutableEthernetPacket::new(&mut buffer).unwrap();
            eth_pkt.set_destination(MacAddr::broadcast());
            eth_pkt.set_source(MacAddr::new(0x01, 0x02, 0x03, 0x04, 0x05, 0x06));
            eth_pkt.set_ethertype(EtherTypes::Arp);
        }
        if payload_size >= ARP_LEN {
            let mut arp_pkt =
                MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..ETH_HDR_LEN + ARP_LEN]).unwrap();
            arp_pkt.set_hardware_type(ArpHardwareTypes::Ethernet);
            arp_pkt.set_protocol_type(EtherTypes::Ipv4);
            arp_pkt.set_hw_addr_len(6);
            arp_pkt.set_proto_addr_len(4);
            arp_pkt.set_operation(op);
            arp_pkt.set_sender_hw_addr(MacAddr::new(0x01, 0x02, 0x03, 0x04, 0x05, 0x06));
            arp_pkt.set_sender_proto_addr(Ipv4Addr::new(192, 168, 1, 123));
            arp_pkt.set_target_hw_addr(MacAddr::zero());
            arp_pkt.set_target_proto_addr(Ipv4Addr::new(192, 168, 1, 1));
        }
        buffer
    }

    #[test]
    fn create_arp_request_packet() {
        let src_mac = MacAddr::new(0x01, 0x02, 0x03, 0x04, 0x05, 0x06);
        let src_addr = Ipv4Addr::new(192, 168, 1, 10);
        let dst_addr = Ipv4Addr::new(192, 168, 1, 1);

        let buffer = create_request(src_mac, src_addr, dst_addr).expect("Packet creation failed");
        assert_eq!(buffer.len(), MIN_ETH_FRAME_NO_FCS);

        let eth_packet = EthernetPacket::new(&buffer).expect("Failed to parse Ethernet packet");
        assert_eq!(eth_packet.get_destination(), MacAddr::broadcast());
        assert_eq!(eth_packet.get_source(), src_mac);
        assert_eq!(eth_packet.get_ethertype(), EtherTypes::Arp);

        let arp_packet = ArpPacket::new(eth_packet.payload()).expect("Failed to parse ARP packet");
        assert_eq!(arp_packet.get_operation(), ArpOperations::Request);
        assert_eq!(arp_packet.get_hardware_type(), ArpHardwareTypes::Ethernet);
        assert_eq!(arp_packet.get_protocol_type(), EtherTypes::Ipv4);
        assert_eq!(arp_packet.get_hw_addr_len(), 6);
        assert_eq!(arp_packet.get_proto_addr_len(), 4);
        assert_eq!(arp_packet.get_sender_hw_addr(), src_mac);
        assert_eq!(arp_packet.get_sender_proto_addr(), src_addr);
        assert_eq!(arp_packet.get_target_hw_addr(), MacAddr::zero());
        assert_eq!(arp_packet.get_target_proto_addr(), dst_addr);
    }

    #[test]
    fn sweep_creates_one_frame_per_target() {
        let targets = (1..=3).map(|host| Ipv4Addr::new(10, 0, 0, host));
        let frames =
            create_sweep(MacAddr::zero(), Ipv4Addr::new(10, 0, 0, 200), targets).unwrap();

        let asked: Vec<Ipv4Addr> = frames
            .iter()
            .map(|frame| {
                let eth = EthernetPacket::new(frame).unwrap();
                ArpPacket::new(eth.payload()).unwrap().get_target_proto_addr()
            })
            .collect();
        assert_eq!(
            asked,
            vec![
                Ipv4Addr::new(10, 0, 0, 1),
                Ipv4Addr::new(10, 0, 0, 2),
                Ipv4Addr::new(10, 0, 0, 3)
            ]
        );
    }

    #[test]
    fn request_payload_errors_when_buffer_too_small() {
        let mut small = vec![0u8; ETH_HDR_LEN + ARP_LEN - 1];
        let err = request_payload(
            &mut small,
            MacAddr::zero(),
            Ipv4Addr::new(1, 2, 3, 4),
            Ipv4Addr::new(5, 6, 7, 8),
        )
        .unwrap_err();
        assert_eq!(err, PacketError::ArpBuffer);
    }

    #[test]
    fn parse_reply_reads_sender() {
        let buffer = build_mock_arp_frame(ArpOperations::Reply, ARP_LEN);
        let frame = EthernetPacket::new(&buffer).unwrap();
        let reply = parse_reply(&frame).expect("reply should parse");
        assert_eq!(reply.sender_addr, Ipv4Addr::new(192, 168, 1, 123));
        assert_eq!(reply.sender_mac, MacAddr::new(1, 2, 3, 4, 5, 6));
    }

    #[test]
    fn parse_reply_ignores_requests() {
        let buffer = build_mock_arp_frame(ArpOperations::Request, ARP_LEN);
        let frame = EthernetPacket::new(&buffer).unwrap();
        assert!(parse_reply(&frame).is_none());
    }

    #[test]
    fn parse_reply_ignores_truncated_payload() {
        let buffer = build_mock_arp_frame(ArpOperations::Reply, 10);
        let frame = EthernetPacket::new(&buffer).unwrap();
        assert!(parse_reply(&frame).is_none());
    }

    #[test]
    fn parse_reply_ignores_other_ethertypes() {
        let mut buffer = build_mock_arp_frame(ArpOperations::Reply, ARP_LEN);
        MutableEthernetPacket::new(&mut buffer)
            .unwrap()
            .set_ethertype(EtherTypes::Ipv4);
        let frame = EthernetPacket::new(&buffer).unwrap();
        assert!(parse_reply(&frame).is_none());
    }
}
