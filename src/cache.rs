//! Offline mirror of calendar events.

use log::{debug, info, warn};
use serde_json::Value;

use crate::{CalError, CalendarEvent, EventId, LocalStorage, Result};

/// Slot holding the cached events.
pub const LOCAL_EVENTS_SLOT: &str = "love_calendar_local";

/// Durable, synchronous list of events kept on this device.
///
/// Holds every event written locally, including those the remote store has
/// not confirmed. Never touches the network.
#[derive(Debug, Clone)]
pub struct LocalEventCache {
    storage: LocalStorage,
}

impl LocalEventCache {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// Loads every cached event in stored order.
    ///
    /// Missing or unreadable storage yields an empty list; this never fails.
    /// Records that do not decode are skipped one by one.
    pub fn load_all(&self) -> Vec<CalendarEvent> {
        match self.read_slot() {
            Ok(slot) => slot.events,
            Err(e) => {
                warn!("Failed to read local event cache: {}", e);
                Vec::new()
            }
        }
    }

    pub fn append(&self, event: &CalendarEvent) -> Result<()> {
        let mut slot = self.read_slot()?;
        slot.events.push(event.clone());
        self.save(&slot)?;
        debug!("Appended event {} to local cache", event.id);
        Ok(())
    }

    /// Replaces the event with the same id. No-op if it is not cached.
    pub fn replace(&self, event: &CalendarEvent) -> Result<bool> {
        self.replace_id(&event.id, event)
    }

    /// Replaces the entry stored under `id` with `event`, which may carry a
    /// different id. Used when a local event receives its remote id.
    pub fn replace_id(&self, id: &EventId, event: &CalendarEvent) -> Result<bool> {
        let mut slot = self.read_slot()?;
        match slot.events.iter_mut().find(|e| &e.id == id) {
            Some(cached) => {
                *cached = event.clone();
                self.save(&slot)?;
                debug!("Replaced cached event {} with {}", id, event.id);
                Ok(true)
            }
            None => {
                debug!("Event {} not in local cache, nothing to replace", id);
                Ok(false)
            }
        }
    }

    /// Replaces the event if cached, otherwise appends it.
    pub fn upsert(&self, event: &CalendarEvent) -> Result<()> {
        if !self.replace(event)? {
            self.append(event)?;
        }
        Ok(())
    }

    /// Removes the event with the given id. Returns whether anything was removed.
    pub fn remove(&self, id: &EventId) -> Result<bool> {
        let mut slot = self.read_slot()?;
        let before = slot.events.len();
        slot.events.retain(|e| &e.id != id);
        if slot.events.len() == before {
            return Ok(false);
        }
        self.save(&slot)?;
        debug!("Removed event {} from local cache", id);
        Ok(true)
    }

    pub fn clear(&self) -> Result<()> {
        info!("Clearing local event cache");
        self.storage.remove(LOCAL_EVENTS_SLOT)
    }

    /// Reads the slot record by record.
    ///
    /// A file that is not a JSON array is copied aside before anything can
    /// overwrite it, then treated as empty. Read failures other than bad
    /// content are returned so writes never clobber a file they could not see.
    fn read_slot(&self) -> Result<CachedSlot> {
        let records = match self.storage.get_json::<Vec<Value>>(LOCAL_EVENTS_SLOT) {
            Ok(Some(records)) => records,
            Ok(None) => return Ok(CachedSlot::default()),
            Err(e @ CalError::StorageCorrupt { .. }) => {
                warn!("Ignoring local event cache: {}", e);
                self.storage.quarantine(LOCAL_EVENTS_SLOT)?;
                return Ok(CachedSlot::default());
            }
            Err(e) => return Err(e),
        };

        let mut slot = CachedSlot::default();
        for (position, record) in records.into_iter().enumerate() {
            match decode_record(record.clone()) {
                Ok(event) => slot.events.push(event),
                Err(e) => {
                    warn!("Skipping unreadable cached event #{}: {}", position, e);
                    slot.rejected.push(record);
                }
            }
        }
        debug!(
            "Loaded {} events from local cache ({} skipped)",
            slot.events.len(),
            slot.rejected.len()
        );
        Ok(slot)
    }

    fn save(&self, slot: &CachedSlot) -> Result<()> {
        let mut records = slot
            .events
            .iter()
            .map(serde_json::to_value)
            .collect::<serde_json::Result<Vec<Value>>>()?;
        records.extend(slot.rejected.iter().cloned());
        self.storage.set_json(LOCAL_EVENTS_SLOT, &records)
    }
}

#[derive(Debug, Default)]
struct CachedSlot {
    events: Vec<CalendarEvent>,
    /// Records that did not decode; written back untouched
    rejected: Vec<Value>,
}

/// Decodes one cached record. Older caches stored the id as a bare string
/// or number rather than the tagged form.
fn decode_record(mut record: Value) -> serde_json::Result<CalendarEvent> {
    let bare_id = match record.get("id") {
        Some(Value::String(raw)) => Some(EventId::parse(raw)),
        Some(Value::Number(n)) => Some(EventId::Remote(n.to_string())),
        _ => None,
    };
    if let Some(id) = bare_id {
        record["id"] = serde_json::to_value(id)?;
    }
    serde_json::from_value(record)
}
