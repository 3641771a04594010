//! Link-layer wire codec used by the discovery prober.
//!
//! Everything here is pure byte manipulation on top of `pnet::packet`; no
//! sockets are opened by this crate.

pub mod arp;
pub mod ethernet;

pub const MIN_ETH_FRAME_NO_FCS: usize = 60;
pub const ARP_LEN: usize = 28;
pub const ETH_HDR_LEN: usize = 14;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PacketError {
    #[error("buffer too small for an Ethernet header")]
    EthernetBuffer,
    #[error("buffer too small for an ARP payload")]
    ArpBuffer,
    #[error("truncated or invalid Ethernet frame (len {0})")]
    TruncatedFrame(usize),
}
