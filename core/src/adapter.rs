use pnet::datalink;
use tracing::{info, warn};

use lanroster_common::adapter::{AdapterController, AdapterError};
use lanroster_common::device::Device;
use lanroster_common::network::interface;
use lanroster_common::network::mac::{self, HardwareIdStyle};

/// Adapters as the OS reports them through pnet.
///
/// Reassigning a hardware id needs platform tooling this process does not
/// drive, so [`SystemAdapters::assign_hardware_id`] always refuses.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAdapters;

impl AdapterController for SystemAdapters {
    fn list_adapters(&self) -> Result<Vec<String>, AdapterError> {
        Ok(interface::adapter_names(&datalink::interfaces()))
    }

    fn assign_hardware_id(&self, _interface: &str, _hardware_id: &str) -> Result<(), AdapterError> {
        Err(AdapterError::Unsupported)
    }
}

/// Gives `interface` the hardware id of a saved `device`.
///
/// Returns the id as handed to the controller.
pub fn assign_device_hardware_id(
    controller: &dyn AdapterController,
    interface: &str,
    device: &Device,
    style: HardwareIdStyle,
) -> Result<String, AdapterError> {
    if interface.trim().is_empty() {
        return Err(AdapterError::NoInterface);
    }
    let mac = mac::parse_hardware_id(&device.hardware_id)
        .ok_or_else(|| AdapterError::InvalidHardwareId(device.hardware_id.clone()))?;
    let hardware_id = mac::format_hardware_id(mac, style);

    match controller.assign_hardware_id(interface, &hardware_id) {
        Ok(()) => {
            info!(interface, %hardware_id, "hardware id assigned");
            Ok(hardware_id)
        }
        Err(e) => {
            warn!(interface, %hardware_id, "hardware id assignment failed: {e}");
            Err(e)
        }
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
