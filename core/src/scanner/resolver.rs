//! Best-effort reverse name lookup.
//!
//! A lookup never fails from the caller's point of view: anything short of a
//! real name becomes [`UNKNOWN_NAME`].

use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, trace};

use lanroster_common::device::{Device, UNKNOWN_NAME};

type LookupFn = dyn Fn(IpAddr) -> io::Result<String> + Send + Sync;

#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn resolve(&self, addr: Ipv4Addr) -> String;
}

/// Reverse lookup through the system resolver, bounded by a timeout.
#[derive(Clone)]
pub struct ReverseDnsResolver {
    timeout: Duration,
    lookup: Arc<LookupFn>,
}

impl ReverseDnsResolver {
    pub fn new(timeout: Duration) -> Self {
        Self::with_lookup(timeout, |ip| dns_lookup::lookup_addr(&ip))
    }

    pub fn with_lookup<F>(timeout: Duration, lookup: F) -> Self
    where
        F: Fn(IpAddr) -> io::Result<String> + Send + Sync + 'static,
    {
        Self {
            timeout,
            lookup: Arc::new(lookup),
        }
    }
}

#[async_trait]
impl NameResolver for ReverseDnsResolver {
    async fn resolve(&self, addr: Ipv4Addr) -> String {
        let lookup = Arc::clone(&self.lookup);
        let ip = IpAddr::V4(addr);
        let task = tokio::task::spawn_blocking(move || lookup(ip));

        // The blocking lookup keeps running after a timeout and its result is
        // dropped. The thread also holds up runtime shutdown unless the
        // runtime is shut down with a deadline.
        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(Ok(name))) => usable_name(&name, addr).unwrap_or_else(unknown),
            Ok(Ok(Err(e))) => {
                trace!(%addr, "reverse lookup failed: {e}");
                unknown()
            }
            Ok(Err(e)) => {
                debug!(%addr, "lookup task failed: {e}");
                unknown()
            }
            Err(_) => {
                trace!(%addr, timeout = ?self.timeout, "reverse lookup timed out");
                unknown()
            }
        }
    }
}

fn unknown() -> String {
    UNKNOWN_NAME.to_string()
}

/// Resolvers echo the numeric address back when there is no PTR record.
fn usable_name(name: &str, addr: Ipv4Addr) -> Option<String> {
    let name = name.trim().trim_end_matches('.');
    if name.is_empty() || name.parse::<Ipv4Addr>().is_ok_and(|echo| echo == addr) {
        return None;
    }
    Some(name.to_string())
}

/// Resolves every device concurrently, at most `max_concurrent` at a time,
/// and stores the outcome in its display name.
pub async fn enrich(devices: &mut [Device], resolver: Arc<dyn NameResolver>, max_concurrent: usize) {
    let permits = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut lookups: JoinSet<(usize, String)> = JoinSet::new();

    for (idx, device) in devices.iter_mut().enumerate() {
        device.display_name = unknown();
        let resolver = Arc::clone(&resolver);
        let permits = Arc::clone(&permits);
        let addr = device.address;
        lookups.spawn(async move {
            let _permit = permits.acquire_owned().await;
            (idx, resolver.resolve(addr).await)
        });
    }

    while let Some(joined) = lookups.join_next().await {
        match joined {
            Ok((idx, name)) => {
                if let Some(device) = devices.get_mut(idx) {
                    device.display_name = name;
                }
            }
            Err(e) => debug!("name lookup task failed: {e}"),
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
