//! Lifecycle manager for the fixed slot set.
//!
//! A slot holds at most one record at a time, single-writer per tick,
//! last write wins. Replacing a slot's record always preserves the
//! slot's id so the rendering backend diffs it as an update, never as a
//! remove + add.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use serde_json::Value;

use crate::slot::{LayerRecord, LayerSlot};

/// Operating on a slot that holds no record.
///
/// This is a lifecycle bug in the caller, not a recoverable data
/// condition, so it surfaces as an error instead of being swallowed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VacantSlot {
    pub slot: LayerSlot,
    pub op: &'static str,
}

impl fmt::Display for VacantSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot {} layer slot {:?}: slot is vacant", self.op, self.slot)
    }
}

impl Error for VacantSlot {}

/// One update to a slot.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerUpdate {
    /// Install a full replacement record.
    Replace(LayerRecord),
    /// Merge a property patch over the occupying record.
    Patch(BTreeMap<String, Value>),
}

#[derive(Debug, Default)]
pub struct LayerManager {
    slots: BTreeMap<LayerSlot, LayerRecord>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: LayerSlot) -> Option<&LayerRecord> {
        self.slots.get(&slot)
    }

    pub fn is_occupied(&self, slot: LayerSlot) -> bool {
        self.slots.contains_key(&slot)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Installs `record` into `slot`, replacing any occupant. The
    /// record's id is forced to the slot id.
    pub fn add(&mut self, slot: LayerSlot, record: LayerRecord) {
        self.slots.insert(slot, Self::conform(slot, record));
    }

    /// Applies an update to `slot`.
    ///
    /// A `Replace` behaves like `add` (installing into a vacant slot is
    /// fine); a `Patch` requires an occupant and constructs a new
    /// record carrying the merged properties.
    pub fn update(&mut self, slot: LayerSlot, update: LayerUpdate) -> Result<(), VacantSlot> {
        match update {
            LayerUpdate::Replace(record) => {
                self.add(slot, record);
                Ok(())
            }
            LayerUpdate::Patch(patch) => {
                let Some(current) = self.slots.get(&slot) else {
                    return Err(VacantSlot { slot, op: "patch" });
                };
                let next = current.merged(patch);
                self.slots.insert(slot, next);
                Ok(())
            }
        }
    }

    pub fn remove(&mut self, slot: LayerSlot) -> Result<LayerRecord, VacantSlot> {
        self.slots.remove(&slot).ok_or(VacantSlot { slot, op: "remove" })
    }

    /// Occupied records in canonical z-order; vacant slots are simply
    /// absent.
    pub fn layers(&self) -> Vec<&LayerRecord> {
        LayerSlot::CANONICAL
            .iter()
            .filter_map(|slot| self.slots.get(slot))
            .collect()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    fn conform(slot: LayerSlot, record: LayerRecord) -> LayerRecord {
        if record.id() == slot.id() {
            record
        } else {
            record.rebuilt_with_id(slot.id())
        }
    }
}
