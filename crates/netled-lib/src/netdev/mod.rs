//! Network interface registry: resolves names to live handles.
//!
//! A handle is an `Arc<dyn NetDevice>`: cloning it takes a reference on the
//! interface, dropping it releases that reference.

use std::sync::Arc;

use serde::Serialize;

mod sysfs;

pub use sysfs::{SysfsNetDevice, SysfsRegistry};

/// Packet counters sampled from an interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PacketCounters {
    pub tx_packets: u64,
    pub rx_packets: u64,
}

/// A live network interface.
pub trait NetDevice: Send + Sync {
    fn name(&self) -> &str;
    /// Whether the interface currently reports carrier.
    fn carrier_ok(&self) -> bool;
    fn stats(&self) -> PacketCounters;
}

/// Shared, reference-counted interface handle.
pub type NetDeviceHandle = Arc<dyn NetDevice>;

/// Resolves interface names to handles.
pub trait DeviceRegistry: Send + Sync {
    /// `None` when no interface currently has this name.
    fn resolve(&self, name: &str) -> Option<NetDeviceHandle>;
}

/// In-memory interfaces for unit and integration tests.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    pub struct MockNetDevice {
        name: String,
        carrier: AtomicBool,
        tx_packets: AtomicU64,
        rx_packets: AtomicU64,
    }

    impl MockNetDevice {
        pub fn new(name: &str, carrier: bool) -> Arc<Self> {
            Arc::new(MockNetDevice {
                name: name.into(),
                carrier: AtomicBool::new(carrier),
                tx_packets: AtomicU64::new(0),
                rx_packets: AtomicU64::new(0),
            })
        }

        pub fn set_carrier(&self, carrier: bool) {
            self.carrier.store(carrier, Ordering::SeqCst);
        }

        pub fn set_counters(&self, tx_packets: u64, rx_packets: u64) {
            self.tx_packets.store(tx_packets, Ordering::SeqCst);
            self.rx_packets.store(rx_packets, Ordering::SeqCst);
        }
    }

    impl NetDevice for MockNetDevice {
        fn name(&self) -> &str {
            &self.name
        }

        fn carrier_ok(&self) -> bool {
            self.carrier.load(Ordering::SeqCst)
        }

        fn stats(&self) -> PacketCounters {
            PacketCounters {
                tx_packets: self.tx_packets.load(Ordering::SeqCst),
                rx_packets: self.rx_packets.load(Ordering::SeqCst),
            }
        }
    }

    /// Registry backed by a name → device map.
    #[derive(Default)]
    pub struct MockRegistry {
        devices: Mutex<HashMap<String, Arc<MockNetDevice>>>,
    }

    impl MockRegistry {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&self, dev: Arc<MockNetDevice>) {
            self.devices
                .lock()
                .unwrap()
                .insert(dev.name().to_string(), dev);
        }

        pub fn remove(&self, name: &str) -> Option<Arc<MockNetDevice>> {
            self.devices.lock().unwrap().remove(name)
        }
    }

    impl DeviceRegistry for MockRegistry {
        fn resolve(&self, name: &str) -> Option<NetDeviceHandle> {
            self.devices
                .lock()
                .unwrap()
                .get(name)
                .map(|d| Arc::clone(d) as NetDeviceHandle)
        }
    }
}
