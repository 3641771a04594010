//! # Device Registry
//!
//! The operator's list of remembered devices, kept as a JSON array on disk.
//!
//! Every read-modify-write cycle holds an exclusive advisory lock on a
//! sibling `.lock` file and ends with a temp-file-then-rename. Loads take the
//! same lock shared. Every handle, in this process or another, goes through
//! that one lock, so concurrent saves are never lost.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use fd_lock::RwLock;
use tracing::{debug, info};

use lanroster_common::device::Device;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to {action} {}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("registry file {} is not a valid device list", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode the device list")]
    Encode(#[source] serde_json::Error),
    #[error("no saved device with address {0}")]
    UnknownDevice(Ipv4Addr),
}

#[derive(Debug, Clone)]
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every saved device. Only a missing file is an empty registry.
    pub fn load(&self) -> Result<Vec<Device>, RegistryError> {
        let lock = match self.open_lock() {
            Ok(lock) => lock,
            Err(RegistryError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "registry directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };
        let _guard = lock
            .read()
            .map_err(|source| io_error("lock", &self.lock_path(), source))?;
        self.read()
    }

    /// Upserts `device` by address.
    pub fn save(&self, device: Device) -> Result<(), RegistryError> {
        self.save_all([device])
    }

    /// Upserts several devices in one locked cycle.
    pub fn save_all<I>(&self, devices: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = Device>,
    {
        let mut lock = self.open_lock()?;
        let _guard = lock
            .write()
            .map_err(|source| io_error("lock", &self.lock_path(), source))?;
        let mut saved = self.read()?;
        let mut added: usize = 0;
        let mut updated: usize = 0;
        for device in devices {
            if upsert(&mut saved, device) {
                updated += 1;
            } else {
                added += 1;
            }
        }
        self.write(&saved)?;
        info!(added, updated, total = saved.len(), path = %self.path.display(), "registry saved");
        Ok(())
    }

    /// Changes the display name of an already saved device.
    pub fn rename(&self, address: Ipv4Addr, name: &str) -> Result<Device, RegistryError> {
        let mut lock = self.open_lock()?;
        let _guard = lock
            .write()
            .map_err(|source| io_error("lock", &self.lock_path(), source))?;
        let mut saved = self.read()?;
        let device = saved
            .iter_mut()
            .find(|d| d.address == address)
            .ok_or(RegistryError::UnknownDevice(address))?;
        device.display_name = name.to_string();
        let renamed = device.clone();
        self.write(&saved)?;
        Ok(renamed)
    }

    /// The lock file is never removed; deleting it while held would let a
    /// second writer lock a fresh inode.
    fn open_lock(&self) -> Result<RwLock<File>, RegistryError> {
        let lock_path = self.lock_path();
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map(RwLock::new)
            .map_err(|source| io_error("open lock", &lock_path, source))
    }

    fn lock_path(&self) -> PathBuf {
        self.sibling(".lock")
    }

    fn read(&self) -> Result<Vec<Device>, RegistryError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no registry file yet");
                return Ok(Vec::new());
            }
            Err(source) => return Err(io_error("read", &self.path, source)),
        };
        serde_json::from_str(&raw).map_err(|source| RegistryError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, devices: &[Device]) -> Result<(), RegistryError> {
        let json = serde_json::to_vec_pretty(devices).map_err(RegistryError::Encode)?;
        let temp_path = self.temp_path();

        let written = File::create(&temp_path)
            .and_then(|mut file| {
                file.write_all(&json)?;
                file.sync_all()
            })
            .map_err(|source| io_error("write", &temp_path, source))
            .and_then(|()| {
                fs::rename(&temp_path, &self.path)
                    .map_err(|source| io_error("replace", &self.path, source))
            });

        if written.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        written
    }

    /// Sibling of the registry file so the final rename stays on one filesystem.
    fn temp_path(&self) -> PathBuf {
        let suffix: u32 = rand::random();
        self.sibling(&format!(".{suffix:08x}.tmp"))
    }

    /// `.<file name><ext>` next to the registry file.
    fn sibling(&self, ext: &str) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "registry".to_string());
        self.path.with_file_name(format!(".{name}{ext}"))
    }
}

fn io_error(action: &'static str, path: &Path, source: io::Error) -> RegistryError {
    RegistryError::Io {
        action,
        path: path.to_path_buf(),
        source,
    }
}

/// Replaces the first entry with the same address, or appends.
/// Returns `true` when an entry was replaced.
pub fn upsert(devices: &mut Vec<Device>, device: Device) -> bool {
    match devices.iter_mut().find(|d| d.address == device.address) {
        Some(existing) => {
            *existing = device;
            true
        }
        None => {
            devices.push(device);
            false
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
