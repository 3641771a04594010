use std::path::PathBuf;
use std::time::Duration;

/// Registry file used when none is configured, relative to the working directory.
pub const DEFAULT_REGISTRY_FILE: &str = "saved_devices.json";
/// How long a sweep listens for replies.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(2_000);
/// Upper bound for a single reverse lookup.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_millis(1_000);
/// Reverse lookups allowed in flight at once.
pub const DEFAULT_MAX_LOOKUPS: usize = 32;

#[derive(Debug, Clone)]
pub struct Config {
    /// Where saved devices live.
    pub registry_path: PathBuf,
    /// Reply collection window of one discovery pass.
    pub probe_timeout: Duration,
    pub resolve_timeout: Duration,
    pub max_lookups: usize,
    /// Skips reverse lookups; discovered devices keep an empty name.
    pub no_dns: bool,
    /// Forces the sending interface instead of selecting one per range.
    pub interface: Option<String>,
    pub quiet: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_path: PathBuf::from(DEFAULT_REGISTRY_FILE),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
            max_lookups: DEFAULT_MAX_LOOKUPS,
            no_dns: false,
            interface: None,
            quiet: 0,
        }
    }
}
