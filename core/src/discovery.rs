//! # Network Discovery Service
//!
//! Implements the core "Network Scan" use case.
//!
//! One pass probes a range, names what answered and folds the result into the
//! registry's view of the network. Passes run in the background and report
//! over a channel; at most one pass is in flight at a time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use lanroster_common::config::Config;
use lanroster_common::network::range::Ipv4Range;

use crate::reconcile::{self, DiscoveryView};
use crate::registry::{RegistryError, RegistryStore};
use crate::scanner::resolver::{self, NameResolver};
use crate::scanner::{ProbeError, Prober};

#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    pub probe_timeout: Duration,
    pub resolve_names: bool,
    pub max_lookups: usize,
}

impl From<&Config> for DiscoverySettings {
    fn from(cfg: &Config) -> Self {
        Self {
            probe_timeout: cfg.probe_timeout,
            resolve_names: !cfg.no_dns,
            max_lookups: cfg.max_lookups,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("discovery task failed: {0}")]
    Task(String),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TriggerError {
    #[error("discovery pass #{0} is still running")]
    Busy(u64),
}

/// Outcome of one pass, delivered on the service's channel.
#[derive(Debug)]
pub struct PassReport {
    pub pass: u64,
    pub range: Ipv4Range,
    pub elapsed: Duration,
    pub outcome: Result<DiscoveryView, DiscoveryError>,
}

/// Application Service for Network Discovery.
///
/// Orchestrates a pass by:
/// 1. delegating the sweep to the [`Prober`] on a blocking thread.
/// 2. naming the replies through the [`NameResolver`].
/// 3. reconciling them with the [`RegistryStore`].
pub struct DiscoveryService {
    inner: Arc<Inner>,
}

struct Inner {
    prober: Arc<dyn Prober>,
    resolver: Arc<dyn NameResolver>,
    registry: Arc<RegistryStore>,
    settings: DiscoverySettings,
    in_flight: AtomicBool,
    current_pass: AtomicU64,
    reports: mpsc::UnboundedSender<PassReport>,
}

/// Clears the in-flight flag however the pass ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl DiscoveryService {
    pub fn new(
        prober: Arc<dyn Prober>,
        resolver: Arc<dyn NameResolver>,
        registry: Arc<RegistryStore>,
        settings: DiscoverySettings,
    ) -> (Self, mpsc::UnboundedReceiver<PassReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let inner = Inner {
            prober,
            resolver,
            registry,
            settings,
            in_flight: AtomicBool::new(false),
            current_pass: AtomicU64::new(0),
            reports: tx,
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            rx,
        )
    }

    /// Starts a pass over `range` and returns its number.
    ///
    /// Must be called from within a tokio runtime. A trigger that arrives
    /// while another pass is outstanding is rejected, not queued.
    pub fn trigger(&self, range: Ipv4Range) -> Result<u64, TriggerError> {
        if self
            .inner
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(TriggerError::Busy(self.inner.current_pass.load(Ordering::Acquire)));
        }
        let pass = self.inner.current_pass.fetch_add(1, Ordering::AcqRel) + 1;

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.run_pass(pass, range).await });
        Ok(pass)
    }

    pub fn is_running(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }
}

impl Inner {
    async fn run_pass(&self, pass: u64, range: Ipv4Range) {
        let started = Instant::now();
        let outcome = {
            let _guard = InFlightGuard(&self.in_flight);
            info!(pass, %range, "discovery pass started");
            self.discover(range).await
        };

        let elapsed = started.elapsed();
        match &outcome {
            Ok(view) => info!(
                pass,
                scanned = view.scanned,
                total = view.devices.len(),
                ?elapsed,
                "discovery pass finished"
            ),
            Err(e) => warn!(pass, ?elapsed, "discovery pass failed: {e}"),
        }

        let report = PassReport {
            pass,
            range,
            elapsed,
            outcome,
        };
        if self.reports.send(report).is_err() {
            debug!(pass, "no one is listening for discovery results");
        }
    }

    async fn discover(&self, range: Ipv4Range) -> Result<DiscoveryView, DiscoveryError> {
        let prober = Arc::clone(&self.prober);
        let timeout = self.settings.probe_timeout;
        let probed = tokio::task::spawn_blocking(move || prober.probe(&range, timeout))
            .await
            .map_err(|e| DiscoveryError::Task(e.to_string()))??;

        let mut probed = reconcile::dedup_by_address(probed);
        debug!(replies = probed.len(), "probe returned");

        if self.settings.resolve_names {
            resolver::enrich(&mut probed, Arc::clone(&self.resolver), self.settings.max_lookups).await;
        }

        let registry = Arc::clone(&self.registry);
        let saved = tokio::task::spawn_blocking(move || registry.load())
            .await
            .map_err(|e| DiscoveryError::Task(e.to_string()))??;

        Ok(reconcile::reconcile(probed, &saved))
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
