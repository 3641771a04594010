use std::net::Ipv4Addr;
use std::sync::Arc;
use std::thread;

use lanroster_common::device::Device;
use lanroster_core::registry::RegistryStore;

/// Many writers saving distinct addresses at once lose nothing, whether they
/// share a handle or each open their own, like a `rename` racing a
/// `discover --save` would.
#[test]
fn concurrent_saves_keep_every_device() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved_devices.json");
    let shared = Arc::new(RegistryStore::new(&path));

    let handles: Vec<_> = (1..=32u8)
        .map(|last| {
            let registry = if last % 2 == 0 {
                Arc::clone(&shared)
            } else {
                Arc::new(RegistryStore::new(&path))
            };
            thread::spawn(move || {
                let device = Device::new(
                    Ipv4Addr::new(10, 0, 0, last),
                    format!("02:00:00:00:00:{last:02x}"),
                    format!("host-{last}"),
                );
                registry.save(device).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut saved: Vec<u8> = RegistryStore::new(&path)
        .load()
        .unwrap()
        .iter()
        .map(|d| d.address.octets()[3])
        .collect();
    saved.sort_unstable();
    assert_eq!(saved, (1..=32u8).collect::<Vec<_>>());
}

/// The file is plain JSON other tools can read.
#[test]
fn registry_file_is_a_json_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved_devices.json");
    let registry = RegistryStore::new(&path);
    registry
        .save(Device::new(Ipv4Addr::new(10, 0, 0, 9), "02:00:00:00:00:09", "printer"))
        .unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let entries = raw.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["ip"], "10.0.0.9");
    assert_eq!(entries[0]["name"], "printer");
}

/// Entries written by hand without a name load with an empty one.
#[test]
fn missing_name_field_loads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved_devices.json");
    std::fs::write(&path, r#"[{"ip": "10.0.0.4", "mac": "02:00:00:00:00:04"}]"#).unwrap();

    let devices = RegistryStore::new(&path).load().unwrap();
    assert_eq!(
        devices,
        vec![Device::new(Ipv4Addr::new(10, 0, 0, 4), "02:00:00:00:00:04", "")]
    );
}
