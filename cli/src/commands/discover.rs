use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use colored::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{Instrument, debug, error, info, warn};

use lanroster_common::config::Config;
use lanroster_common::network::range::Ipv4Range;
use lanroster_core::discovery::{
    DiscoveryError, DiscoveryService, DiscoverySettings, PassReport, TriggerError,
};
use lanroster_core::network;
use lanroster_core::reconcile::DiscoveryView;
use lanroster_core::registry::RegistryStore;
use lanroster_core::scanner::LocalScanner;
use lanroster_core::scanner::resolver::ReverseDnsResolver;

use crate::commands::DiscoverArgs;
use crate::mprint;
use crate::terminal::format::{self, Presence};
use crate::terminal::{colors, print, spinner};

pub async fn discover(args: DiscoverArgs, cfg: &Config) -> anyhow::Result<()> {
    let range: Ipv4Range = network::target_range(&args.target).context("resolving discovery target")?;
    let settings = DiscoverySettings::from(cfg);
    let registry = Arc::new(RegistryStore::new(&cfg.registry_path));

    let (service, mut reports) = DiscoveryService::new(
        Arc::new(LocalScanner::new(cfg.interface.clone())),
        Arc::new(ReverseDnsResolver::new(cfg.resolve_timeout)),
        Arc::clone(&registry),
        settings.clone(),
    );

    match args.every {
        None => {
            service.trigger(range)?;
            let report = next_report(&mut reports, &range, settings.probe_timeout).await?;
            let view = report.outcome.map_err(privilege_hint)?;
            discovery_ends(&view, report.elapsed, cfg);
            if args.save {
                save_scanned(registry, &view).await?;
            }
            Ok(())
        }
        Some(secs) => {
            let ctrl_c = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("cannot listen for Ctrl-C: {e}");
                    std::future::pending::<()>().await;
                }
            };
            let passes = watch(service, reports, range, secs, args.save, registry, cfg, ctrl_c).await?;
            info!("stopped after {passes} passes");
            Ok(())
        }
    }
}

async fn next_report(
    reports: &mut UnboundedReceiver<PassReport>,
    range: &Ipv4Range,
    timeout: Duration,
) -> anyhow::Result<PassReport> {
    let span = spinner::discovery_span(range, timeout);
    reports
        .recv()
        .instrument(span)
        .await
        .context("discovery service stopped without a report")
}

/// Re-triggers a pass every `secs` until `shutdown` completes and returns the
/// number of passes reported. `shutdown` is polled as one future for the
/// whole loop, so a signal that lands while a report is printed still counts.
#[allow(clippy::too_many_arguments)]
async fn watch<S>(
    service: DiscoveryService,
    mut reports: UnboundedReceiver<PassReport>,
    range: Ipv4Range,
    secs: u64,
    save: bool,
    registry: Arc<RegistryStore>,
    cfg: &Config,
    shutdown: S,
) -> anyhow::Result<u64>
where
    S: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(Duration::from_secs(secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    tokio::pin!(shutdown);
    let mut reported: u64 = 0;
    info!("discovering {range} every {secs}s, press Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = ticker.tick() => match service.trigger(range) {
                Ok(pass) => debug!(pass, "pass triggered"),
                Err(TriggerError::Busy(pass)) => warn!("pass #{pass} is still running, skipping this tick"),
            },
            Some(report) = reports.recv() => {
                reported += 1;
                match report.outcome {
                    Ok(view) => {
                        discovery_ends(&view, report.elapsed, cfg);
                        if save {
                            save_scanned(Arc::clone(&registry), &view).await?;
                        }
                    }
                    Err(DiscoveryError::Probe(e)) if e.is_privilege_error() => {
                        return Err(privilege_hint(DiscoveryError::Probe(e)));
                    }
                    Err(e) => error!("pass #{} failed: {e}", report.pass),
                }
            }
            () = &mut shutdown => {
                info!("stopping");
                return Ok(reported);
            }
        }
    }
}

fn privilege_hint(err: DiscoveryError) -> anyhow::Error {
    let needs_root = matches!(&err, DiscoveryError::Probe(e) if e.is_privilege_error());
    if needs_root && !is_root::is_root() {
        warn!("raw sockets need elevated privileges; re-run with sudo or grant CAP_NET_RAW");
    }
    anyhow::Error::new(err).context("discovery failed")
}

async fn save_scanned(registry: Arc<RegistryStore>, view: &DiscoveryView) -> anyhow::Result<()> {
    let scanned = view.scanned().to_vec();
    let count = scanned.len();
    let path = registry.path().display().to_string();
    tokio::task::spawn_blocking(move || registry.save_all(scanned))
        .await
        .context("registry task failed")?
        .with_context(|| format!("saving to {path}"))?;
    info!("saved {count} devices");
    Ok(())
}

fn discovery_ends(view: &DiscoveryView, total_time: Duration, cfg: &Config) {
    if view.devices.is_empty() {
        no_hosts_found(cfg);
        return;
    }

    print::header("Network Discovery", cfg.quiet);
    match cfg.quiet {
        0 => print_devices(view),
        1 => {
            let width = format::title_width(&view.devices);
            for device in &view.devices {
                print::print(&format::compact_line(device, width));
            }
        }
        _ => {}
    }
    print_summary(view, total_time, cfg);
}

fn no_hosts_found(cfg: &Config) {
    print::header("ZERO HOSTS DETECTED", cfg.quiet);
    if cfg.quiet == 0 {
        print::no_results();
    }
}

fn print_devices(view: &DiscoveryView) {
    for (idx, device) in view.devices.iter().enumerate() {
        let presence = if idx < view.scanned {
            Presence::Online
        } else {
            Presence::Offline
        };
        print::tree_head(idx, format::device_title(device));
        print::as_tree_one_level(format::device_to_details(device, presence));
        if idx + 1 != view.devices.len() {
            mprint!();
        }
    }
}

fn print_summary(view: &DiscoveryView, total_time: Duration, cfg: &Config) {
    let active_hosts: ColoredString = format!("{} active hosts", view.scanned).bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output = format!("Discovery Complete: {active_hosts} identified in {total_time}")
        .color(colors::TEXT_DEFAULT)
        .to_string();
    let offline = view.historical().len();

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
            if offline > 0 {
                print::centerln(&format!("{offline} saved devices not seen"));
            }
        }
        _ => {
            mprint!();
            print::print_status(&output);
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    use lanroster_common::device::Device;
    use lanroster_core::scanner::resolver::NameResolver;
    use lanroster_core::scanner::{ProbeError, Prober};
    use tokio::sync::oneshot;

    struct OneHost;

    impl Prober for OneHost {
        fn probe(&self, _range: &Ipv4Range, _timeout: Duration) -> Result<Vec<Device>, ProbeError> {
            Ok(vec![host()])
        }
    }

    struct NoNames;

    #[async_trait::async_trait]
    impl NameResolver for NoNames {
        async fn resolve(&self, _addr: Ipv4Addr) -> String {
            String::new()
        }
    }

    fn host() -> Device {
        Device::new(Ipv4Addr::new(192, 168, 1, 8), "02:00:00:00:00:08", "")
    }

    fn range() -> Ipv4Range {
        Ipv4Range::new(Ipv4Addr::new(192, 168, 1, 1), Ipv4Addr::new(192, 168, 1, 254))
    }

    fn quiet_config(registry_path: std::path::PathBuf) -> Config {
        Config {
            registry_path,
            quiet: 2,
            ..Config::default()
        }
    }

    fn service(registry: Arc<RegistryStore>) -> (DiscoveryService, UnboundedReceiver<PassReport>) {
        let settings = DiscoverySettings {
            probe_timeout: Duration::from_millis(10),
            resolve_names: false,
            max_lookups: 1,
        };
        DiscoveryService::new(Arc::new(OneHost), Arc::new(NoNames), registry, settings)
    }

    #[tokio::test]
    async fn save_scanned_persists_only_answering_devices() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(RegistryStore::new(dir.path().join("saved.json")));
        let view = DiscoveryView {
            devices: vec![host(), Device::new(Ipv4Addr::new(192, 168, 1, 9), "02:00:00:00:00:09", "old")],
            scanned: 1,
        };

        save_scanned(Arc::clone(&registry), &view).await.unwrap();

        assert_eq!(registry.load().unwrap(), vec![host()]);
    }

    #[tokio::test]
    async fn watch_honours_a_shutdown_sent_before_it_is_polled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.json");
        let registry = Arc::new(RegistryStore::new(&path));
        let (service, reports) = service(Arc::clone(&registry));
        let (stop, stopped) = oneshot::channel::<()>();
        stop.send(()).unwrap();

        let shutdown = async move {
            let _ = stopped.await;
        };
        let cfg = quiet_config(path);
        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            watch(service, reports, range(), 60, false, registry, &cfg, shutdown),
        )
        .await;

        assert!(outcome.expect("watch kept running after shutdown").is_ok());
    }

    #[tokio::test]
    async fn watch_saves_each_pass_until_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.json");
        let registry = Arc::new(RegistryStore::new(&path));
        let (service, reports) = service(Arc::clone(&registry));

        let watched = Arc::clone(&registry);
        let shutdown = async move {
            while watched.load().map(|d| d.is_empty()).unwrap_or(true) {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        };
        let cfg = quiet_config(path);
        let passes = tokio::time::timeout(
            Duration::from_secs(5),
            watch(service, reports, range(), 60, true, Arc::clone(&registry), &cfg, shutdown),
        )
        .await
        .expect("watch kept running after shutdown")
        .unwrap();

        assert_eq!(passes, 1);
        assert_eq!(registry.load().unwrap(), vec![host()]);
    }
}
