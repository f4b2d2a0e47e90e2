//! Poll-based attach/detach watcher.
//!
//! hidapi exposes no hotplug callbacks, so the watcher re-enumerates on each
//! `poll()` and emits an event when presence of the identity flips. The first
//! poll only establishes the baseline. Subscriptions end when the watcher is
//! dropped.

use std::sync::mpsc::{channel, Receiver, Sender};

use crate::features::Result;
use crate::transport::{device_present, DeviceIdentity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotplugEvent {
    Attached,
    Detached,
}

/// Watches a single device identity for attach/detach transitions
pub struct HotplugWatcher {
    identity: DeviceIdentity,
    present: Option<bool>,
    subscribers: Vec<Sender<HotplugEvent>>,
}

impl HotplugWatcher {
    pub fn new(identity: DeviceIdentity) -> Self {
        Self {
            identity,
            present: None,
            subscribers: Vec::new(),
        }
    }

    /// Register an event receiver. Every registered receiver gets every
    /// event; dropped receivers are pruned on delivery.
    pub fn subscribe(&mut self) -> Receiver<HotplugEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    /// Re-enumerate and report a presence transition, if any occurred
    pub fn poll(&mut self) -> Result<Option<HotplugEvent>> {
        let now = device_present(&self.identity)?;
        Ok(self.observe(now))
    }

    fn observe(&mut self, now: bool) -> Option<HotplugEvent> {
        let event = match (self.present, now) {
            (Some(false), true) => Some(HotplugEvent::Attached),
            (Some(true), false) => Some(HotplugEvent::Detached),
            _ => None,
        };
        self.present = Some(now);
        if let Some(event) = event {
            self.subscribers.retain(|tx| tx.send(event).is_ok());
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY: DeviceIdentity = DeviceIdentity {
        vendor_id: 0x056A,
        product_id: 0x00A8,
    };

    #[test]
    fn first_observation_is_baseline() {
        let mut watcher = HotplugWatcher::new(IDENTITY);
        assert_eq!(watcher.observe(true), None);
        assert_eq!(watcher.observe(true), None);
    }

    #[test]
    fn transitions_emit_events() {
        let mut watcher = HotplugWatcher::new(IDENTITY);
        let rx = watcher.subscribe();
        watcher.observe(false);
        assert_eq!(watcher.observe(true), Some(HotplugEvent::Attached));
        assert_eq!(watcher.observe(true), None);
        assert_eq!(watcher.observe(false), Some(HotplugEvent::Detached));

        assert_eq!(rx.try_recv(), Ok(HotplugEvent::Attached));
        assert_eq!(rx.try_recv(), Ok(HotplugEvent::Detached));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut watcher = HotplugWatcher::new(IDENTITY);
        drop(watcher.subscribe());
        watcher.observe(false);
        watcher.observe(true);
        assert!(watcher.subscribers.is_empty());
    }
}
