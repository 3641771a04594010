use std::net::Ipv4Addr;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use lanroster_common::device::{Device, UNKNOWN_NAME};
use lanroster_common::network::range::Ipv4Range;
use lanroster_core::discovery::{DiscoveryService, DiscoverySettings, TriggerError};
use lanroster_core::registry::RegistryStore;
use lanroster_core::scanner::resolver::NameResolver;
use lanroster_core::scanner::{ProbeError, Prober};

/// Answers with a fixed list, optionally waiting for a release signal first.
struct ScriptedProber {
    replies: Vec<Device>,
    release: Option<Mutex<Receiver<()>>>,
}

impl ScriptedProber {
    fn answering(replies: Vec<Device>) -> Self {
        Self {
            replies,
            release: None,
        }
    }

    fn held(replies: Vec<Device>) -> (Self, Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let prober = Self {
            replies,
            release: Some(Mutex::new(rx)),
        };
        (prober, tx)
    }
}

impl Prober for ScriptedProber {
    fn probe(&self, _range: &Ipv4Range, _timeout: Duration) -> Result<Vec<Device>, ProbeError> {
        if let Some(release) = &self.release {
            let _ = release.lock().unwrap().recv();
        }
        Ok(self.replies.clone())
    }
}

/// Names only the router; everything else stays unknown.
struct RouterOnly;

#[async_trait]
impl NameResolver for RouterOnly {
    async fn resolve(&self, addr: Ipv4Addr) -> String {
        if addr.octets()[3] == 1 {
            "router.lan".to_string()
        } else {
            UNKNOWN_NAME.to_string()
        }
    }
}

fn lan() -> Ipv4Range {
    Ipv4Range::new(Ipv4Addr::new(192, 168, 1, 1), Ipv4Addr::new(192, 168, 1, 254))
}

fn settings() -> DiscoverySettings {
    DiscoverySettings {
        probe_timeout: Duration::from_millis(10),
        resolve_names: true,
        max_lookups: 8,
    }
}

fn device(last: u8, name: &str) -> Device {
    Device::new(
        Ipv4Addr::new(192, 168, 1, last),
        format!("02:00:00:00:00:{last:02x}"),
        name,
    )
}

/// A saved name survives a pass where the resolver knows nothing about the
/// device, and saved devices that stayed silent are listed after the ones
/// that answered.
#[tokio::test]
async fn pass_merges_replies_with_saved_devices() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(RegistryStore::new(dir.path().join("saved_devices.json")));
    registry.save(device(20, "living room tv")).unwrap();
    registry.save(device(30, "nas")).unwrap();

    let replies = vec![device(1, ""), device(20, ""), device(1, ""), device(77, "")];
    let (service, mut reports) = DiscoveryService::new(
        Arc::new(ScriptedProber::answering(replies)),
        Arc::new(RouterOnly),
        Arc::clone(&registry),
        settings(),
    );

    service.trigger(lan()).unwrap();
    let view = reports.recv().await.unwrap().outcome.unwrap();

    assert_eq!(view.scanned, 3);
    assert_eq!(
        view.devices,
        vec![
            device(1, "router.lan"),
            device(20, "living room tv"),
            device(77, UNKNOWN_NAME),
            device(30, "nas"),
        ]
    );

    // Persisting the scanned part leaves operator names untouched.
    registry.save_all(view.scanned().iter().cloned()).unwrap();
    let saved = registry.load().unwrap();
    assert_eq!(saved.len(), 4);
    assert!(saved.contains(&device(20, "living room tv")));
    assert!(saved.contains(&device(1, "router.lan")));
}

/// A trigger while a pass is outstanding is refused; once the pass reports,
/// the next trigger goes through.
#[tokio::test]
async fn only_one_pass_runs_at_a_time() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(RegistryStore::new(dir.path().join("saved_devices.json")));
    let (prober, release) = ScriptedProber::held(vec![device(5, "")]);
    let (service, mut reports) =
        DiscoveryService::new(Arc::new(prober), Arc::new(RouterOnly), registry, settings());

    let first = service.trigger(lan()).unwrap();
    assert!(service.is_running());
    assert_eq!(service.trigger(lan()), Err(TriggerError::Busy(first)));

    release.send(()).unwrap();
    let report = reports.recv().await.unwrap();
    assert_eq!(report.pass, first);
    assert!(report.outcome.is_ok());

    release.send(()).unwrap();
    let second = service.trigger(lan()).unwrap();
    assert_eq!(second, first + 1);
    assert_eq!(reports.recv().await.unwrap().pass, second);
}

/// A broken registry file fails the pass instead of presenting an empty history.
#[tokio::test]
async fn corrupt_registry_fails_the_pass() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved_devices.json");
    std::fs::write(&path, "[{\"ip\": 12}]").unwrap();

    let (service, mut reports) = DiscoveryService::new(
        Arc::new(ScriptedProber::answering(vec![device(1, "")])),
        Arc::new(RouterOnly),
        Arc::new(RegistryStore::new(path)),
        settings(),
    );

    service.trigger(lan()).unwrap();
    let report = reports.recv().await.unwrap();
    assert!(report.outcome.is_err());
    assert!(!service.is_running());
}
