//! Remote `love_calendar` table.
//!
//! The repository only sees the [`RemoteEventStore`] trait. Two adapters are
//! provided: [`PostgrestStore`] talks to a PostgREST endpoint (the REST
//! layer Supabase exposes) and [`OfflineStore`] stands in when no remote is
//! configured.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, trace, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    to_local_day, AccessCode, CalError, CalendarEvent, EventId, EventType, Importance, Result,
};

/// Table holding calendar events.
pub const EVENTS_TABLE: &str = "love_calendar";

/// Operations the repository needs from the remote store.
///
/// Every failure is reported as [`CalError::RemoteUnavailable`].
#[async_trait]
pub trait RemoteEventStore: Send + Sync {
    /// All events for `access_code`, ordered by event date ascending.
    async fn select(&self, access_code: &AccessCode) -> Result<Vec<CalendarEvent>>;

    /// Inserts the event and returns the stored copy carrying its remote id.
    async fn insert(&self, event: &CalendarEvent) -> Result<CalendarEvent>;

    async fn update(&self, remote_id: &str, event: &CalendarEvent) -> Result<()>;

    async fn delete(&self, remote_id: &str) -> Result<()>;
}

/// Column layout used when writing a full row
#[derive(Debug, Clone, Serialize)]
pub struct RemoteRow {
    pub title: String,
    pub description: String,
    pub event_date: String,
    pub event_type: EventType,
    pub importance: u8,
    pub repeat_yearly: bool,
    pub location: String,
    pub gifts: Vec<String>,
    pub emotions: Vec<String>,
    pub secret_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&CalendarEvent> for RemoteRow {
    fn from(event: &CalendarEvent) -> Self {
        RemoteRow {
            title: event.title.clone(),
            description: event.description.clone().unwrap_or_default(),
            event_date: event.event_date.to_string(),
            event_type: event.event_type,
            importance: event.importance.value(),
            repeat_yearly: event.repeat_yearly,
            location: event.location.clone().unwrap_or_default(),
            gifts: event.gifts.clone(),
            emotions: event.emotions.clone(),
            secret_code: event.access_code.as_str().to_string(),
            created_by: event.created_by.clone(),
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

/// Columns sent on update; ownership and creation columns never change
#[derive(Debug, Clone, Serialize)]
pub struct RemoteChanges {
    pub title: String,
    pub description: String,
    pub event_date: String,
    pub event_type: EventType,
    pub importance: u8,
    pub repeat_yearly: bool,
    pub location: String,
    pub gifts: Vec<String>,
    pub emotions: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<&CalendarEvent> for RemoteChanges {
    fn from(event: &CalendarEvent) -> Self {
        let row = RemoteRow::from(event);
        RemoteChanges {
            title: row.title,
            description: row.description,
            event_date: row.event_date,
            event_type: row.event_type,
            importance: row.importance,
            repeat_yearly: row.repeat_yearly,
            location: row.location,
            gifts: row.gifts,
            emotions: row.emotions,
            updated_at: event.updated_at.unwrap_or_else(Utc::now),
        }
    }
}

/// Remote primary keys are numeric in practice but may be text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

/// A row as read back from the store. Nullable columns are tolerated.
#[derive(Debug, Clone, Deserialize)]
struct RemoteRecord {
    id: RawId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    event_date: String,
    #[serde(default)]
    event_type: Option<String>,
    #[serde(default)]
    importance: Option<i64>,
    #[serde(default)]
    repeat_yearly: Option<bool>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    gifts: Option<Vec<String>>,
    #[serde(default)]
    emotions: Option<Vec<String>>,
    secret_code: String,
    #[serde(default)]
    created_by: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<RemoteRecord> for CalendarEvent {
    type Error = CalError;

    fn try_from(record: RemoteRecord) -> Result<Self> {
        let event_type = match record.event_type.as_deref() {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Unknown event type '{}' in remote row, using 'date'", raw);
                EventType::Date
            }),
            None => EventType::Date,
        };
        let importance = record
            .importance
            .and_then(|value| u8::try_from(value).ok())
            .and_then(|value| Importance::try_from(value).ok())
            .unwrap_or_default();

        Ok(CalendarEvent {
            id: EventId::Remote(record.id.into_string()),
            title: record.title,
            description: record.description.filter(|d| !d.is_empty()),
            event_date: to_local_day(record.event_date.as_str())?,
            event_type,
            importance,
            repeat_yearly: record.repeat_yearly.unwrap_or(false),
            location: record.location.filter(|l| !l.is_empty()),
            gifts: record.gifts.unwrap_or_default(),
            emotions: record.emotions.unwrap_or_default(),
            access_code: AccessCode::new(record.secret_code),
            created_by: record.created_by,
            created_at: record.created_at.unwrap_or_else(Utc::now),
            updated_at: record.updated_at,
        })
    }
}

/// Converts fetched rows one by one, dropping (and logging) any that cannot
/// be read.
pub fn decode_rows(rows: Vec<Value>) -> Vec<CalendarEvent> {
    rows.into_iter()
        .enumerate()
        .filter_map(|(position, row)| {
            let id = row.get("id").map(Value::to_string).unwrap_or_default();
            let event = serde_json::from_value::<RemoteRecord>(row)
                .map_err(CalError::from)
                .and_then(CalendarEvent::try_from);
            match event {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!("Skipping unreadable remote row #{} (id {}): {}", position, id, e);
                    None
                }
            }
        })
        .collect()
}

/// Connection settings for a PostgREST endpoint
#[derive(Debug, Clone)]
pub struct PostgrestConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub base_url: String,
    /// Anonymous API key sent as `apikey` and bearer token
    pub api_key: String,
    pub table: String,
    pub timeout: Duration,
}

/// HTTP adapter for the `love_calendar` table behind PostgREST
pub struct PostgrestStore {
    client: Client,
    config: PostgrestConfig,
}

impl PostgrestStore {
    pub fn new(config: PostgrestConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CalError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client, config })
    }

    /// Endpoint of the configured table.
    pub fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.table
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    /// Sends a request without looking at the status.
    async fn dispatch(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        self.authorized(request)
            .send()
            .await
            .map_err(|e| CalError::remote(format!("{} failed: {}", what, e)))
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = self.dispatch(request, what).await?;
        ensure_success(response, what).await
    }

    async fn rows(&self, request: RequestBuilder, what: &str) -> Result<Vec<Value>> {
        self.send(request, what)
            .await?
            .json()
            .await
            .map_err(|e| CalError::remote(format!("{} returned unreadable rows: {}", what, e)))
    }
}

async fn ensure_success(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        trace!("{} returned {}", what, status);
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(CalError::remote(format!(
        "{} returned {}: {}",
        what,
        status,
        body.trim()
    )))
}

#[async_trait]
impl RemoteEventStore for PostgrestStore {
    async fn select(&self, access_code: &AccessCode) -> Result<Vec<CalendarEvent>> {
        let request = self.client.get(self.table_url()).query(&[
            ("select", "*".to_string()),
            ("secret_code", format!("eq.{}", access_code.as_str())),
            ("order", "event_date.asc".to_string()),
        ]);
        let rows = self.rows(request, "select").await?;

        debug!("Fetched {} remote rows", rows.len());
        Ok(decode_rows(rows))
    }

    async fn insert(&self, event: &CalendarEvent) -> Result<CalendarEvent> {
        let request = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=representation")
            .json(&[RemoteRow::from(event)]);
        let row = self
            .rows(request, "insert")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CalError::remote("insert returned no rows"))?;
        let record: RemoteRecord = serde_json::from_value(row)
            .map_err(|e| CalError::remote(format!("insert returned an unreadable row: {}", e)))?;
        CalendarEvent::try_from(record)
    }

    async fn update(&self, remote_id: &str, event: &CalendarEvent) -> Result<()> {
        let request = self
            .client
            .patch(self.table_url())
            .query(&[("id", format!("eq.{}", remote_id))])
            .json(&RemoteChanges::from(event));
        self.send(request, "update").await?;
        Ok(())
    }

    async fn delete(&self, remote_id: &str) -> Result<()> {
        let request = self
            .client
            .delete(self.table_url())
            .query(&[("id", format!("eq.{}", remote_id))]);
        let response = self.dispatch(request, "delete").await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("Remote row {} already gone", remote_id);
            return Ok(());
        }
        ensure_success(response, "delete").await?;
        Ok(())
    }
}

/// Remote store used when none is configured; every call is unavailable.
#[derive(Debug, Default, Clone)]
pub struct OfflineStore;

#[async_trait]
impl RemoteEventStore for OfflineStore {
    async fn select(&self, _access_code: &AccessCode) -> Result<Vec<CalendarEvent>> {
        Err(CalError::remote("no remote store configured"))
    }

    async fn insert(&self, _event: &CalendarEvent) -> Result<CalendarEvent> {
        Err(CalError::remote("no remote store configured"))
    }

    async fn update(&self, _remote_id: &str, _event: &CalendarEvent) -> Result<()> {
        Err(CalError::remote("no remote store configured"))
    }

    async fn delete(&self, _remote_id: &str) -> Result<()> {
        Err(CalError::remote("no remote store configured"))
    }
}
