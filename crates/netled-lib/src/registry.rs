//! Trigger registry: owns one trigger per active LED and fans lifecycle
//! events out to all of them.
//!
//! Create one at startup, [`activate`] LEDs as they are bound, feed every
//! interface event to [`dispatch`], and [`shutdown`] (or drop) on exit.
//!
//! [`activate`]: TriggerRegistry::activate
//! [`dispatch`]: TriggerRegistry::dispatch
//! [`shutdown`]: TriggerRegistry::shutdown

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{NetledError, Result};
use crate::led::Led;
use crate::netdev::DeviceRegistry;
use crate::trigger::{NetdevEvent, NetdevTrigger, NotifyOutcome};

pub struct TriggerRegistry {
    devices: Arc<dyn DeviceRegistry>,
    triggers: Mutex<BTreeMap<String, Arc<NetdevTrigger>>>,
}

impl TriggerRegistry {
    pub fn new(devices: Arc<dyn DeviceRegistry>) -> Self {
        TriggerRegistry {
            devices,
            triggers: Mutex::new(BTreeMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Arc<NetdevTrigger>>> {
        self.triggers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Activate a trigger on `led`, keyed by the LED's name.
    pub fn activate(&self, led: Arc<dyn Led>) -> Result<Arc<NetdevTrigger>> {
        let name = led.name().to_string();
        let mut triggers = self.lock();
        if triggers.contains_key(&name) {
            return Err(NetledError::Registry(format!(
                "LED \"{name}\" already has an active trigger"
            )));
        }
        let trigger = Arc::new(NetdevTrigger::new(led, Arc::clone(&self.devices))?);
        triggers.insert(name.clone(), Arc::clone(&trigger));
        log::debug!("[registry] activated {name}");
        Ok(trigger)
    }

    /// Remove the trigger for `name`. It is torn down once the last
    /// outstanding reference from [`get`](Self::get) is dropped.
    pub fn deactivate(&self, name: &str) -> Result<()> {
        let removed = self.lock().remove(name);
        match removed {
            Some(trigger) => {
                drop(trigger);
                log::debug!("[registry] deactivated {name}");
                Ok(())
            }
            None => Err(NetledError::Registry(format!(
                "no active trigger on LED \"{name}\""
            ))),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<NetdevTrigger>> {
        self.lock().get(name).cloned()
    }

    /// Names of LEDs with an active trigger, sorted.
    pub fn names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Deliver an event to every trigger. Returns how many applied it.
    ///
    /// Triggers may block while their poller finishes a run, so the map
    /// lock is released before delivery.
    pub fn dispatch(&self, event: &NetdevEvent) -> usize {
        let triggers: Vec<Arc<NetdevTrigger>> = self.lock().values().cloned().collect();
        triggers
            .iter()
            .filter(|t| t.notify(event) == NotifyOutcome::Applied)
            .count()
    }

    /// Deactivate every trigger.
    pub fn shutdown(&self) {
        let drained = std::mem::take(&mut *self.lock());
        if !drained.is_empty() {
            log::debug!("[registry] shutting down {} trigger(s)", drained.len());
        }
        drop(drained);
    }
}

impl Drop for TriggerRegistry {
    fn drop(&mut self) {
        self.shutdown();
    }
}
