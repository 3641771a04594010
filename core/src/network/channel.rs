use std::io;
use std::time::Duration;

use pnet::datalink::{Channel, Config, DataLinkReceiver, DataLinkSender, NetworkInterface};
use tracing::debug;

use crate::scanner::ProbeError;

/// Poll interval of the receiver so the listen loop can observe its deadline.
const READ_TIMEOUT: Duration = Duration::from_millis(50);

pub type EthernetHandle = (Box<dyn DataLinkSender>, Box<dyn DataLinkReceiver>);

/// Opens a layer 2 channel with `channel_opener`, classifying failures.
///
/// A permission failure is reported as [`ProbeError::InsufficientPrivilege`]
/// so callers can ask for elevation instead of reporting an empty network.
pub fn open_eth_channel<F>(intf: &NetworkInterface, channel_opener: F) -> Result<EthernetHandle, ProbeError>
where
    F: FnOnce(&NetworkInterface, Config) -> io::Result<Channel>,
{
    match channel_opener(intf, get_config()) {
        Ok(Channel::Ethernet(tx, rx)) => {
            debug!(interface = %intf.name, "datalink channel established");
            Ok((tx, rx))
        }
        #[allow(unreachable_patterns)]
        Ok(_) => Err(ProbeError::UnsupportedChannel(intf.name.clone())),
        Err(source) if source.kind() == io::ErrorKind::PermissionDenied => {
            Err(ProbeError::InsufficientPrivilege {
                interface: intf.name.clone(),
                source,
            })
        }
        Err(source) => Err(ProbeError::Channel {
            interface: intf.name.clone(),
            source,
        }),
    }
}

fn get_config() -> Config {
    Config {
        read_timeout: Some(READ_TIMEOUT),
        ..Default::default()
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
