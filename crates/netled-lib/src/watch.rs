//! Interface lifecycle events derived from sysfs snapshots.
//!
//! sysfs has no notification channel, so the watcher samples the set of
//! interfaces and their carrier on each poll and turns the difference into
//! the events a kernel notifier would have delivered.

use std::collections::BTreeMap;

use crate::netdev::{NetDevice, SysfsRegistry};
use crate::trigger::{EventKind, NetdevEvent};

/// Interface name → carrier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSnapshot {
    links: BTreeMap<String, bool>,
}

impl LinkSnapshot {
    pub fn capture(registry: &SysfsRegistry) -> std::io::Result<Self> {
        let mut links = BTreeMap::new();
        for name in registry.list()? {
            let carrier = registry.handle(&name).carrier_ok();
            links.insert(name, carrier);
        }
        Ok(LinkSnapshot { links })
    }

    pub fn insert(&mut self, name: &str, carrier: bool) {
        self.links.insert(name.to_string(), carrier);
    }

    pub fn carrier(&self, name: &str) -> Option<bool> {
        self.links.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// One derived lifecycle change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkChange {
    pub kind: EventKind,
    pub name: String,
}

/// Events that turn `prev` into `next`.
///
/// A new interface yields `Register`, followed by `Change` if it already
/// has carrier. A vanished one yields `Unregister`. A carrier flip on an
/// existing interface yields `Change`.
pub fn diff(prev: &LinkSnapshot, next: &LinkSnapshot) -> Vec<LinkChange> {
    let mut changes = Vec::new();
    let mut push = |kind, name: &str| {
        changes.push(LinkChange {
            kind,
            name: name.to_string(),
        })
    };

    for name in prev.links.keys() {
        if !next.links.contains_key(name) {
            push(EventKind::Unregister, name);
        }
    }
    for (name, &carrier) in &next.links {
        match prev.links.get(name) {
            None => {
                push(EventKind::Register, name);
                if carrier {
                    push(EventKind::Change, name);
                }
            }
            Some(&was) if was != carrier => push(EventKind::Change, name),
            Some(_) => {}
        }
    }
    changes
}

/// Polls a [`SysfsRegistry`] and reports lifecycle events since the last poll.
pub struct LinkWatcher {
    registry: SysfsRegistry,
    last: LinkSnapshot,
}

impl LinkWatcher {
    /// Start watching. Interfaces present now produce no events.
    pub fn new(registry: SysfsRegistry) -> std::io::Result<Self> {
        let last = LinkSnapshot::capture(&registry)?;
        Ok(LinkWatcher { registry, last })
    }

    pub fn snapshot(&self) -> &LinkSnapshot {
        &self.last
    }

    /// Sample once and return the events, each carrying a handle for the
    /// interface (a vanished one reads as having no carrier).
    pub fn poll(&mut self) -> std::io::Result<Vec<NetdevEvent>> {
        let next = LinkSnapshot::capture(&self.registry)?;
        let events = diff(&self.last, &next)
            .into_iter()
            .map(|c| NetdevEvent::new(c.kind, self.registry.handle(&c.name)))
            .collect();
        self.last = next;
        Ok(events)
    }
}
