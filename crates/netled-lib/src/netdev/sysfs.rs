//! Interfaces under `<root>/net/<name>/`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{DeviceRegistry, NetDevice, NetDeviceHandle, PacketCounters};

/// Interface backed by its sysfs directory. Attributes are re-read on
/// every call; once the directory disappears the handle reports no
/// carrier and zero counters.
pub struct SysfsNetDevice {
    name: String,
    dir: PathBuf,
}

impl SysfsNetDevice {
    pub fn new(root: &Path, name: &str) -> Self {
        SysfsNetDevice {
            name: name.to_string(),
            dir: root.join("net").join(name),
        }
    }

    fn read_u64(&self, rel: &str) -> Option<u64> {
        std::fs::read_to_string(self.dir.join(rel))
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }
}

impl NetDevice for SysfsNetDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn carrier_ok(&self) -> bool {
        // Reading carrier on an administratively down interface fails with EINVAL
        self.read_u64("carrier") == Some(1)
    }

    fn stats(&self) -> PacketCounters {
        PacketCounters {
            tx_packets: self.read_u64("statistics/tx_packets").unwrap_or(0),
            rx_packets: self.read_u64("statistics/rx_packets").unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SysfsRegistry {
    root: PathBuf,
}

impl SysfsRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SysfsRegistry { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of all interfaces currently present, sorted.
    pub fn list(&self) -> std::io::Result<Vec<String>> {
        let mut names: Vec<String> = std::fs::read_dir(self.root.join("net"))?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }

    /// A handle for `name` whether or not it exists right now.
    pub fn handle(&self, name: &str) -> NetDeviceHandle {
        Arc::new(SysfsNetDevice::new(&self.root, name))
    }
}

impl DeviceRegistry for SysfsRegistry {
    fn resolve(&self, name: &str) -> Option<NetDeviceHandle> {
        if name.is_empty() || name.contains('/') {
            return None;
        }
        if self.root.join("net").join(name).is_dir() {
            Some(self.handle(name))
        } else {
            None
        }
    }
}
