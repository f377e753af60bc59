//! Notification aggregator and heartbeat.
//!
//! Level-triggered: each [`NotificationKind`] owns one slot.  Producers
//! [`mark`](NotificationFlags::mark) a slot; marking an already-dirty slot
//! replaces its payload, so a rapid double change before the publisher
//! drains collapses to the latest value.  [`drain`](NotificationFlags::drain)
//! returns every dirty slot in first-marked order and clears them all.

use log::warn;

use super::events::{Notification, NotificationKind};
use crate::sensors::MAX_SENSORS;

/// Alarm, heartbeat, status, command response, plus one door slot per
/// sensor.
pub const SLOTS: usize = MAX_SENSORS + 4;

pub type Drained = heapless::Vec<Notification, SLOTS>;

#[derive(Debug, Default)]
pub struct NotificationFlags {
    dirty: Drained,
}

impl NotificationFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the slot for `notification.kind()`, overwriting any pending
    /// payload of the same kind.
    pub fn mark(&mut self, notification: Notification) {
        let kind = notification.kind();
        if let Some(slot) = self.dirty.iter_mut().find(|n| n.kind() == kind) {
            *slot = notification;
            return;
        }
        if self.dirty.push(notification).is_err() {
            warn!("Notify: no free slot for {kind:?}, dropped");
        }
    }

    pub fn is_dirty(&self, kind: NotificationKind) -> bool {
        self.dirty.iter().any(|n| n.kind() == kind)
    }

    /// Pending notifications, oldest slot first, without clearing.
    pub fn pending(&self) -> impl Iterator<Item = &Notification> {
        self.dirty.iter()
    }

    pub fn len(&self) -> usize {
        self.dirty.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirty.is_empty()
    }

    /// Take every dirty slot and clear them.
    pub fn drain(&mut self) -> Drained {
        core::mem::take(&mut self.dirty)
    }
}

/// Fixed-period heartbeat, independent of flag state.
#[derive(Debug, Clone)]
pub struct Heartbeat {
    interval_ms: u32,
    last_ms: u64,
}

impl Heartbeat {
    /// The first beat is due one interval after boot.
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_ms: 0,
        }
    }

    /// True once per elapsed interval.  Beats stay on the fixed grid
    /// `k * interval_ms`; a poll that is several intervals late fires
    /// once and skips the missed beats.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let interval = u64::from(self.interval_ms.max(1));
        let elapsed = now_ms.saturating_sub(self.last_ms);
        if elapsed < interval {
            return false;
        }
        self.last_ms += elapsed - elapsed % interval;
        true
    }
}
