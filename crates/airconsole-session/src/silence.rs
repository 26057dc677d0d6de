//! Deferred updates for silenced controllers.
//!
//! While a round is running, updates from controllers without a player
//! number are parked here instead of being applied. The whole queue is
//! replayed when the Screen ends the round.

use airconsole_protocol::{DeviceId, DeviceRecord, DeviceUpdate};

/// One parked `update`.
#[derive(Debug, Clone, PartialEq)]
struct QueuedUpdate {
    update: Option<DeviceUpdate>,
    /// The update moved the device into this game.
    is_connect: bool,
}

/// Parked updates, grouped per device.
///
/// Devices are kept in the order their first update was parked, and each
/// device's updates in arrival order. That is also the replay order.
#[derive(Debug, Clone, Default)]
pub struct SilencedQueue {
    entries: Vec<(DeviceId, Vec<QueuedUpdate>)>,
}

impl SilencedQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks an update for `device_id`.
    pub fn push(&mut self, device_id: DeviceId, update: Option<DeviceUpdate>, is_connect: bool) {
        let entry = QueuedUpdate { update, is_connect };
        match self.entries.iter_mut().find(|(id, _)| *id == device_id) {
            Some((_, queue)) => queue.push(entry),
            None => self.entries.push((device_id, vec![entry])),
        }
    }

    /// Drops the first parked connect for `device_id` and everything
    /// parked after it. Returns `false` if no connect was parked.
    pub fn cancel_pending_connect(&mut self, device_id: DeviceId) -> bool {
        let Some(position) = self.entries.iter().position(|(id, _)| *id == device_id) else {
            return false;
        };
        let queue = &mut self.entries[position].1;
        let Some(connect) = queue.iter().position(|entry| entry.is_connect) else {
            return false;
        };

        queue.truncate(connect);
        if queue.is_empty() {
            self.entries.remove(position);
        }
        true
    }

    /// The record `device_id` would have once its parked updates are
    /// replayed: `Some(record)` for the latest parked update, `None` if
    /// nothing is parked for it.
    pub fn projected(&self, device_id: DeviceId) -> Option<Option<&DeviceRecord>> {
        self.entries
            .iter()
            .find(|(id, _)| *id == device_id)
            .and_then(|(_, queue)| queue.last())
            .map(|entry| entry.update.as_ref().map(|update| &update.record))
    }

    /// Number of updates parked for `device_id`.
    pub fn queued_for(&self, device_id: DeviceId) -> usize {
        self.entries
            .iter()
            .find(|(id, _)| *id == device_id)
            .map_or(0, |(_, queue)| queue.len())
    }

    /// Total number of parked updates.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, queue)| queue.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empties the queue, returning every parked update in replay order.
    pub fn drain(&mut self) -> Vec<(DeviceId, Option<DeviceUpdate>)> {
        std::mem::take(&mut self.entries)
            .into_iter()
            .flat_map(|(id, queue)| queue.into_iter().map(move |entry| (id, entry.update)))
            .collect()
    }
}
