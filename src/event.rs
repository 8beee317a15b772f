//! Core data structures for the lovecal application.
//!
//! This module contains the calendar event record and the inputs used to
//! create and modify one.
use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AccessCode, CalError, DateInput, LocalDay, Result};

/// Prefix of ids handed out before the remote store has confirmed an event.
pub const LOCAL_ID_PREFIX: &str = "local_";

/// Prefix of the built-in demonstration events.
pub const SAMPLE_ID_PREFIX: &str = "sample_";

/// Identity of an event, tagged with where it was assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "origin", content = "value", rename_all = "snake_case")]
pub enum EventId {
    /// Assigned on this device; the remote store has not confirmed the event.
    Local(String),
    /// Assigned by the remote store.
    Remote(String),
    /// Built-in demonstration event; never cached nor sent anywhere.
    Sample(String),
}

impl EventId {
    /// Generates a fresh local id: `local_<millis>_<9 random chars>`.
    pub fn new_local() -> Self {
        let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
        EventId::Local(format!(
            "{}{}_{}",
            LOCAL_ID_PREFIX,
            Utc::now().timestamp_millis(),
            suffix
        ))
    }

    /// Classifies a bare id string, as received from the command line.
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with(LOCAL_ID_PREFIX) {
            EventId::Local(raw.to_string())
        } else if raw.starts_with(SAMPLE_ID_PREFIX) {
            EventId::Sample(raw.to_string())
        } else {
            EventId::Remote(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventId::Local(id) | EventId::Remote(id) | EventId::Sample(id) => id,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, EventId::Local(_))
    }

    pub fn is_sample(&self) -> bool {
        matches!(self, EventId::Sample(_))
    }

    pub fn remote_id(&self) -> Option<&str> {
        match self {
            EventId::Remote(id) => Some(id),
            EventId::Local(_) | EventId::Sample(_) => None,
        }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of event shown on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Birthday,
    Anniversary,
    Date,
    Trip,
    First,
    Goal,
    Special,
    Memory,
}

impl EventType {
    pub const ALL: [EventType; 8] = [
        EventType::Birthday,
        EventType::Anniversary,
        EventType::Date,
        EventType::Trip,
        EventType::First,
        EventType::Goal,
        EventType::Special,
        EventType::Memory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Birthday => "birthday",
            EventType::Anniversary => "anniversary",
            EventType::Date => "date",
            EventType::Trip => "trip",
            EventType::First => "first",
            EventType::Goal => "goal",
            EventType::Special => "special",
            EventType::Memory => "memory",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = CalError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                CalError::validation(format!(
                    "unknown event type '{}' (expected one of: {})",
                    s,
                    EventType::ALL.map(|t| t.as_str()).join(", ")
                ))
            })
    }
}

/// How much an event matters, from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Importance(u8);

impl Importance {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Importance {
    fn default() -> Self {
        Importance(3)
    }
}

impl TryFrom<u8> for Importance {
    type Error = CalError;

    fn try_from(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Importance(value))
        } else {
            Err(CalError::validation(format!(
                "importance must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }
}

impl From<Importance> for u8 {
    fn from(importance: Importance) -> Self {
        importance.0
    }
}

/// Represents a single event in the calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// The day the event falls on; persisted as `YYYY-MM-DD`
    pub event_date: LocalDay,
    pub event_type: EventType,
    #[serde(default)]
    pub importance: Importance,
    #[serde(default)]
    pub repeat_yearly: bool,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub gifts: Vec<String>,
    #[serde(default)]
    pub emotions: Vec<String>,
    /// Which couple's calendar the event belongs to
    pub access_code: AccessCode,
    #[serde(default)]
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CalendarEvent {
    /// Creates a local-only event from a draft whose date was already normalized.
    pub fn from_draft(draft: EventDraft, event_date: LocalDay, access_code: AccessCode) -> Result<Self> {
        let title = validate_title(&draft.title)?;
        let importance = Importance::try_from(draft.importance)?;

        Ok(CalendarEvent {
            id: EventId::new_local(),
            title,
            description: non_empty(draft.description),
            event_date,
            event_type: draft.event_type,
            importance,
            repeat_yearly: draft.repeat_yearly,
            location: non_empty(draft.location),
            gifts: draft.gifts,
            emotions: draft.emotions,
            access_code,
            created_by: draft.created_by,
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    /// Last time the event changed, falling back to its creation time.
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }

    pub fn is_local(&self) -> bool {
        self.id.is_local()
    }
}

/// Everything needed to create an event
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    pub event_date: DateInput,
    pub event_type: EventType,
    pub importance: u8,
    pub repeat_yearly: bool,
    pub location: Option<String>,
    pub gifts: Vec<String>,
    pub emotions: Vec<String>,
    pub created_by: Option<String>,
}

impl EventDraft {
    /// A draft with the calendar form's defaults: a yearly "date" of importance 3.
    pub fn new(title: impl Into<String>, event_date: impl Into<DateInput>) -> Self {
        EventDraft {
            title: title.into(),
            description: None,
            event_date: event_date.into(),
            event_type: EventType::Date,
            importance: Importance::default().value(),
            repeat_yearly: true,
            location: None,
            gifts: Vec::new(),
            emotions: Vec::new(),
            created_by: None,
        }
    }

    pub fn with_type(mut self, event_type: EventType) -> Self {
        self.event_type = event_type;
        self
    }

    pub fn with_importance(mut self, importance: u8) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn repeat_yearly(mut self, repeat: bool) -> Self {
        self.repeat_yearly = repeat;
        self
    }
}

/// Partial modification of an event; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<DateInput>,
    pub event_type: Option<EventType>,
    pub importance: Option<u8>,
    pub repeat_yearly: Option<bool>,
    pub location: Option<String>,
    pub gifts: Option<Vec<String>>,
    pub emotions: Option<Vec<String>>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.event_date.is_none()
            && self.event_type.is_none()
            && self.importance.is_none()
            && self.repeat_yearly.is_none()
            && self.location.is_none()
            && self.gifts.is_none()
            && self.emotions.is_none()
    }

    /// Applies the patch to a copy of `event`. The date must already be normalized.
    ///
    /// Validation happens before anything is changed, so an invalid patch
    /// leaves no trace.
    pub fn apply(&self, event: &CalendarEvent, event_date: Option<LocalDay>) -> Result<CalendarEvent> {
        let title = match &self.title {
            Some(title) => Some(validate_title(title)?),
            None => None,
        };
        let importance = match self.importance {
            Some(value) => Some(Importance::try_from(value)?),
            None => None,
        };

        let mut updated = event.clone();
        if let Some(title) = title {
            updated.title = title;
        }
        if let Some(description) = &self.description {
            updated.description = non_empty(Some(description.clone()));
        }
        if let Some(day) = event_date {
            updated.event_date = day;
        }
        if let Some(event_type) = self.event_type {
            updated.event_type = event_type;
        }
        if let Some(importance) = importance {
            updated.importance = importance;
        }
        if let Some(repeat) = self.repeat_yearly {
            updated.repeat_yearly = repeat;
        }
        if let Some(location) = &self.location {
            updated.location = non_empty(Some(location.clone()));
        }
        if let Some(gifts) = &self.gifts {
            updated.gifts = gifts.clone();
        }
        if let Some(emotions) = &self.emotions {
            updated.emotions = emotions.clone();
        }
        updated.updated_at = Some(Utc::now());
        Ok(updated)
    }
}

fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CalError::validation("title is required"));
    }
    Ok(trimmed.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
