//! The device directory: every known device's record, keyed by id.
//!
//! The Screen's record additionally carries the active-player order, and
//! the directory keeps a lazily built inverse of that order (device id →
//! player number). All writes that can touch the order go through methods
//! here, and each of them discards the inverse in the same call, so the
//! two can't drift apart.
//!
//! # Concurrency note
//!
//! The inverse lives in a `std::cell::OnceCell`, so `DeviceDirectory` is
//! `Send` but not `Sync`. It is owned by a single `Session`, which is
//! driven from one task.

use std::cell::OnceCell;
use std::collections::{BTreeMap, HashMap};

use airconsole_protocol::{DeviceId, DeviceRecord};
use serde_json::Value;

/// Device records keyed by id, plus the player-number cache.
///
/// A `BTreeMap` rather than a `Vec<Option<_>>`: iteration is in id order
/// (which the active-player assignment depends on) and holes cost nothing.
#[derive(Debug, Default)]
pub struct DeviceDirectory {
    slots: BTreeMap<DeviceId, DeviceRecord>,

    /// Inverse of the Screen's `players` list. Empty cell = invalidated.
    player_numbers: OnceCell<HashMap<DeviceId, usize>>,
}

impl DeviceDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a directory from the `ready` snapshot. Position `i` in
    /// `devices` becomes device id `i`; `None` entries are holes.
    pub fn from_snapshot(devices: Vec<Option<DeviceRecord>>) -> Self {
        let slots: BTreeMap<DeviceId, DeviceRecord> = devices
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| {
                let id = DeviceId(u32::try_from(index).ok()?);
                record.map(|record| (id, record))
            })
            .collect();

        if !slots.is_empty() && !slots.contains_key(&DeviceId::SCREEN) {
            tracing::warn!(
                devices = slots.len(),
                "snapshot has devices but no screen record at index 0"
            );
        }

        Self {
            slots,
            player_numbers: OnceCell::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Returns the record in slot `id`, if any.
    pub fn get(&self, id: DeviceId) -> Option<&DeviceRecord> {
        self.slots.get(&id)
    }

    /// Returns the Screen's record, if any.
    pub fn screen(&self) -> Option<&DeviceRecord> {
        self.get(DeviceId::SCREEN)
    }

    /// Returns `true` if slot `id` holds a record.
    pub fn contains(&self, id: DeviceId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Iterates over occupied slots in id order.
    pub fn iter(&self) -> impl Iterator<Item = (DeviceId, &DeviceRecord)> {
        self.slots.iter().map(|(id, record)| (*id, record))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Replaces slot `id` with `record` (or clears it for `None`) and
    /// returns the previous record. Last write wins; nothing is merged.
    pub fn replace(&mut self, id: DeviceId, record: Option<DeviceRecord>) -> Option<DeviceRecord> {
        if id.is_screen() {
            self.player_numbers.take();
        }
        match record {
            Some(record) => self.slots.insert(id, record),
            None => self.slots.remove(&id),
        }
    }

    /// Marks slot `id` as premium. Returns `false` if the slot is empty.
    pub fn mark_premium(&mut self, id: DeviceId) -> bool {
        match self.slots.get_mut(&id) {
            Some(record) => {
                record.premium = true;
                true
            }
            None => false,
        }
    }

    /// Stores `custom` as the custom state of slot `id`, creating an
    /// empty record if the slot is a hole.
    pub fn set_custom(&mut self, id: DeviceId, custom: Value) {
        self.slots.entry(id).or_default().custom = Some(custom);
    }

    // -----------------------------------------------------------------------
    // Active players
    // -----------------------------------------------------------------------

    /// The active-player order, or an empty slice if none is set.
    pub fn active_players(&self) -> &[DeviceId] {
        self.screen()
            .and_then(|screen| screen.players.as_deref())
            .unwrap_or(&[])
    }

    /// Stores a new active-player order on the Screen's record and
    /// discards the player-number cache.
    pub fn set_active_players(&mut self, players: Vec<DeviceId>) {
        self.player_numbers.take();
        self.slots.entry(DeviceId::SCREEN).or_default().players = Some(players);
    }

    /// Zero-based player number of `id`, if it is an active player.
    pub fn player_number(&self, id: DeviceId) -> Option<usize> {
        self.player_numbers
            .get_or_init(|| {
                self.active_players()
                    .iter()
                    .enumerate()
                    .map(|(number, id)| (*id, number))
                    .collect()
            })
            .get(&id)
            .copied()
    }

    /// Device id holding player number `number`, if any.
    pub fn player_device(&self, number: usize) -> Option<DeviceId> {
        self.active_players().get(number).copied()
    }
}
