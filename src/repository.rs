//! Calendar event repository.
//!
//! Single source of truth for the view layer. Every mutation is applied to
//! the in-memory working set and the [`LocalEventCache`] before it returns;
//! the matching remote call runs as a background task whose
//! [`SyncHandle`] the caller may await or drop.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    future::Future,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::{runtime::Handle, task::JoinHandle};

use crate::{
    sample_events, to_local_day, AccessCode, CalError, CalendarEvent, DateInput, EventDraft,
    EventId, EventPatch, EventType, LocalDay, LocalEventCache, RemoteEventStore, Result, Session,
};

/// How `load` settles a remote event that also has a cached copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// The remote copy always wins.
    #[default]
    RemoteWins,
    /// The copy with the later `updated_at` wins; ties go to the remote copy.
    LastWriterWins,
}

/// Background sync tuning
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Upper bound for one remote call
    pub timeout: Duration,
    /// Extra attempts after the first failure
    pub retries: u32,
    /// Delay before retry `n` is `n * retry_backoff`
    pub retry_backoff: Duration,
    pub conflict_policy: ConflictPolicy,
    /// Fall back to the built-in sample events when nothing else loads
    pub sample_fallback: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            timeout: Duration::from_secs(10),
            retries: 2,
            retry_backoff: Duration::from_millis(250),
            conflict_policy: ConflictPolicy::RemoteWins,
            sample_fallback: true,
        }
    }
}

/// Remote status of one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Only on this device, no push in progress
    LocalOnly,
    /// A remote insert is in flight
    Syncing,
    /// Carries a remote id
    Synced,
    /// The last insert attempt failed; the next update retries it
    SyncFailed,
}

/// Result of one background push
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Inserted { remote_id: String },
    Updated,
    Deleted,
    /// Nothing had to be sent
    Skipped,
    Failed { reason: String },
}

impl SyncOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, SyncOutcome::Failed { .. })
    }
}

/// Where the working set came from on the last `load`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Remote,
    LocalCache,
    Samples,
}

/// Handle to a background push. Dropping it lets the push run detached.
#[derive(Debug)]
pub struct SyncHandle {
    event_id: EventId,
    task: Option<JoinHandle<SyncOutcome>>,
}

impl SyncHandle {
    fn spawned(event_id: EventId, task: JoinHandle<SyncOutcome>) -> Self {
        Self {
            event_id,
            task: Some(task),
        }
    }

    fn skipped(event_id: EventId) -> Self {
        Self {
            event_id,
            task: None,
        }
    }

    /// Id of the event at the time the push was scheduled
    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }

    /// Waits for the push to finish.
    pub async fn wait(self) -> SyncOutcome {
        match self.task {
            None => SyncOutcome::Skipped,
            Some(task) => task.await.unwrap_or_else(|e| SyncOutcome::Failed {
                reason: format!("sync task aborted: {}", e),
            }),
        }
    }
}

/// Events of one year grouped for the year view
#[derive(Debug, Clone, Default)]
pub struct YearOverview {
    pub year: i32,
    pub total: usize,
    /// Month (1-12) to its events in date order; empty months are omitted
    pub by_month: BTreeMap<u32, Vec<CalendarEvent>>,
    pub by_type: BTreeMap<EventType, usize>,
}

/// State shared with background tasks. The cache lives here so that every
/// read-modify-write of the cache slot is serialized by the same lock.
struct Inner {
    events: Vec<CalendarEvent>,
    cache: LocalEventCache,
    /// Sync progress of local events; absent means `LocalOnly`
    sync: HashMap<EventId, SyncState>,
    /// Local events removed while their insert was in flight
    removed: HashSet<EventId>,
}

impl Inner {
    fn position(&self, id: &EventId) -> Option<usize> {
        self.events.iter().position(|e| &e.id == id)
    }

    fn sync_state(&self, id: &EventId) -> SyncState {
        match id {
            EventId::Remote(_) => SyncState::Synced,
            EventId::Local(_) => self.sync.get(id).copied().unwrap_or(SyncState::LocalOnly),
            EventId::Sample(_) => SyncState::LocalOnly,
        }
    }
}

fn reject_sample(id: &EventId) -> Result<()> {
    if id.is_sample() {
        return Err(CalError::validation(format!(
            "{} is a sample event and cannot be changed",
            id
        )));
    }
    Ok(())
}

fn lock_inner(state: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    state.lock().unwrap_or_else(|poisoned| {
        warn!("Calendar state lock was poisoned; continuing with last known state");
        poisoned.into_inner()
    })
}

enum Push {
    Nothing,
    Insert(CalendarEvent),
    Update(String, CalendarEvent),
    Delete(String),
}

/// Manages calendar events for one unlocked access code.
pub struct EventRepository {
    access_code: AccessCode,
    remote: Arc<dyn RemoteEventStore>,
    settings: SyncSettings,
    state: Arc<Mutex<Inner>>,
    runtime: Handle,
}

impl EventRepository {
    /// Creates a repository for an authenticated session.
    ///
    /// Must be called from within a Tokio runtime; background pushes are
    /// spawned on it.
    pub fn new(
        session: &Session,
        remote: Arc<dyn RemoteEventStore>,
        cache: LocalEventCache,
        settings: SyncSettings,
    ) -> Result<Self> {
        let access_code = session.access_code()?.clone();
        let runtime = Handle::try_current().map_err(|e| CalError::ApplicationError {
            message: format!("EventRepository needs a Tokio runtime: {}", e),
        })?;

        Ok(Self {
            access_code,
            remote,
            settings,
            state: Arc::new(Mutex::new(Inner {
                events: Vec::new(),
                cache,
                sync: HashMap::new(),
                removed: HashSet::new(),
            })),
            runtime,
        })
    }

    pub fn access_code(&self) -> &AccessCode {
        &self.access_code
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock_inner(&self.state)
    }

    /// Replaces the working set with the freshest data available.
    ///
    /// Remote events plus cached local-only events when the remote answers;
    /// otherwise the cached events for this access code; otherwise the
    /// built-in samples (when enabled).
    pub async fn load(&self) -> LoadSource {
        info!("Loading calendar events");
        let fetched =
            tokio::time::timeout(self.settings.timeout, self.remote.select(&self.access_code))
                .await
                .unwrap_or_else(|_| Err(CalError::remote("select timed out")));

        let mut inner = self.lock();
        let cached = inner.cache.load_all();

        match fetched {
            Ok(remote_events) => {
                let merged = merge_events(
                    remote_events,
                    cached,
                    &self.access_code,
                    self.settings.conflict_policy,
                );
                info!("Loaded {} events from the remote store", merged.len());
                inner.events = merged;
                LoadSource::Remote
            }
            Err(e) => {
                warn!("Remote store unavailable, using local data: {}", e);
                let cached: Vec<CalendarEvent> = cached
                    .into_iter()
                    .filter(|event| event.access_code == self.access_code)
                    .collect();

                if !cached.is_empty() || !self.settings.sample_fallback {
                    info!("Loaded {} events from the local cache", cached.len());
                    inner.events = cached;
                    LoadSource::LocalCache
                } else {
                    info!("Nothing cached locally, showing sample events");
                    inner.events = sample_events(&self.access_code, LocalDay::today().year());
                    LoadSource::Samples
                }
            }
        }
    }

    /// Creates an event locally and schedules its remote insert.
    ///
    /// The event is visible in the working set and the cache when this
    /// returns. Remote failure never fails the call.
    pub fn add(&self, draft: EventDraft) -> Result<(CalendarEvent, SyncHandle)> {
        let day = to_local_day(draft.event_date.clone())?;
        let event = CalendarEvent::from_draft(draft, day, self.access_code.clone())?;

        {
            let mut inner = self.lock();
            inner.cache.append(&event)?;
            inner.events.push(event.clone());
            inner.sync.insert(event.id.clone(), SyncState::Syncing);
        }
        info!("Added event {} on {}", event.id, event.event_date);

        let handle = self.spawn(event.id.clone(), Push::Insert(event.clone()));
        Ok((event, handle))
    }

    /// Applies `patch` to an event locally and pushes it when possible.
    ///
    /// Remote events get a remote update. Local events never do; if their
    /// last insert failed (or was never attempted) the insert is retried,
    /// and an insert already in flight sends the newer copy once it lands.
    /// Sample events are read-only.
    pub fn update(&self, id: &EventId, patch: EventPatch) -> Result<(CalendarEvent, SyncHandle)> {
        reject_sample(id)?;
        let day = match &patch.event_date {
            Some(input) => Some(to_local_day(input.clone())?),
            None => None,
        };

        let (updated, push) = {
            let mut inner = self.lock();
            let index = inner.position(id).ok_or_else(|| CalError::EventNotFound {
                id: id.to_string(),
            })?;
            let updated = patch.apply(&inner.events[index], day)?;
            inner.cache.upsert(&updated)?;
            inner.events[index] = updated.clone();

            let push = match &updated.id {
                EventId::Remote(remote_id) => Push::Update(remote_id.clone(), updated.clone()),
                EventId::Local(_) | EventId::Sample(_) => match inner.sync_state(id) {
                    SyncState::Syncing => {
                        debug!("Insert of {} in flight; it will carry this edit", id);
                        Push::Nothing
                    }
                    _ => {
                        inner.sync.insert(id.clone(), SyncState::Syncing);
                        Push::Insert(updated.clone())
                    }
                },
            };
            (updated, push)
        };
        info!("Updated event {}", id);

        let handle = self.spawn(id.clone(), push);
        Ok((updated, handle))
    }

    /// Deletes an event locally and, for remote events, remotely. Sample
    /// events cannot be deleted.
    pub fn remove(&self, id: &EventId) -> Result<SyncHandle> {
        reject_sample(id)?;
        let push = {
            let mut inner = self.lock();
            let index = inner.position(id).ok_or_else(|| CalError::EventNotFound {
                id: id.to_string(),
            })?;
            inner.cache.remove(id)?;
            inner.events.remove(index);

            match id {
                EventId::Remote(remote_id) => Push::Delete(remote_id.clone()),
                EventId::Local(_) | EventId::Sample(_) => {
                    if inner.sync_state(id) == SyncState::Syncing {
                        // the insert task deletes the row it creates
                        inner.removed.insert(id.clone());
                    } else {
                        inner.sync.remove(id);
                    }
                    Push::Nothing
                }
            }
        };
        info!("Removed event {}", id);

        Ok(self.spawn(id.clone(), push))
    }

    /// Retries the insert of every local event that is not already syncing.
    pub fn sync_pending(&self) -> Vec<SyncHandle> {
        let pending: Vec<CalendarEvent> = {
            let mut inner = self.lock();
            let pending: Vec<CalendarEvent> = inner
                .events
                .iter()
                .filter(|e| e.is_local() && inner.sync_state(&e.id) != SyncState::Syncing)
                .cloned()
                .collect();
            for event in &pending {
                inner.sync.insert(event.id.clone(), SyncState::Syncing);
            }
            pending
        };

        info!("Pushing {} local-only events", pending.len());
        pending
            .into_iter()
            .map(|event| self.spawn(event.id.clone(), Push::Insert(event)))
            .collect()
    }

    fn spawn(&self, id: EventId, push: Push) -> SyncHandle {
        let sync = SyncTask {
            remote: Arc::clone(&self.remote),
            state: Arc::clone(&self.state),
            settings: self.settings.clone(),
        };
        let task = match push {
            Push::Nothing => return SyncHandle::skipped(id),
            Push::Insert(event) => self.runtime.spawn(async move { sync.insert(event).await }),
            Push::Update(remote_id, event) => self
                .runtime
                .spawn(async move { sync.update(remote_id, event).await }),
            Push::Delete(remote_id) => self
                .runtime
                .spawn(async move { sync.delete(remote_id).await }),
        };
        SyncHandle::spawned(id, task)
    }

    pub fn get(&self, id: &EventId) -> Option<CalendarEvent> {
        self.lock().events.iter().find(|e| &e.id == id).cloned()
    }

    /// Snapshot of the working set
    pub fn all(&self) -> Vec<CalendarEvent> {
        self.lock().events.clone()
    }

    pub fn sync_state(&self, id: &EventId) -> SyncState {
        self.lock().sync_state(id)
    }

    fn filtered<F>(&self, keep: F) -> Vec<CalendarEvent>
    where
        F: Fn(&CalendarEvent) -> bool,
    {
        self.lock()
            .events
            .iter()
            .filter(|e| keep(e))
            .cloned()
            .collect()
    }

    /// Events falling on the given day, in working-set order
    pub fn events_on_day(&self, day: impl Into<DateInput>) -> Result<Vec<CalendarEvent>> {
        let day = to_local_day(day)?;
        Ok(self.filtered(|e| e.event_date == day))
    }

    pub fn todays_events(&self) -> Vec<CalendarEvent> {
        let today = LocalDay::today();
        self.filtered(|e| e.event_date == today)
    }

    /// The next `limit` events from today on, earliest first
    pub fn upcoming(&self, limit: usize) -> Vec<CalendarEvent> {
        let today = LocalDay::today();
        let mut events = self.filtered(|e| e.event_date >= today);
        events.sort_by_key(|e| e.event_date);
        events.truncate(limit);
        events
    }

    pub fn events_in_month(&self, year: i32, month: u32) -> Vec<CalendarEvent> {
        let mut events =
            self.filtered(|e| e.event_date.year() == year && e.event_date.month() == month);
        events.sort_by_key(|e| e.event_date);
        events
    }

    /// Events in the Sunday-to-Saturday week containing `day`, in date order
    pub fn events_in_week(&self, day: impl Into<DateInput>) -> Result<Vec<CalendarEvent>> {
        let start = to_local_day(day)?.week_start();
        let end = start.add_days(6);
        let mut events = self.filtered(|e| e.event_date >= start && e.event_date <= end);
        events.sort_by_key(|e| e.event_date);
        Ok(events)
    }

    pub fn events_in_year(&self, year: i32) -> Vec<CalendarEvent> {
        let mut events = self.filtered(|e| e.event_date.year() == year);
        events.sort_by_key(|e| e.event_date);
        events
    }

    pub fn count_by_type(&self, event_type: EventType, year: i32) -> usize {
        self.lock()
            .events
            .iter()
            .filter(|e| e.event_type == event_type && e.event_date.year() == year)
            .count()
    }

    pub fn year_overview(&self, year: i32) -> YearOverview {
        let events = self.events_in_year(year);
        let mut overview = YearOverview {
            year,
            total: events.len(),
            ..Default::default()
        };
        for event in events {
            *overview.by_type.entry(event.event_type).or_insert(0) += 1;
            overview
                .by_month
                .entry(event.event_date.month())
                .or_default()
                .push(event);
        }
        overview
    }
}

/// Everything a background push needs, detached from the repository.
struct SyncTask {
    remote: Arc<dyn RemoteEventStore>,
    state: Arc<Mutex<Inner>>,
    settings: SyncSettings,
}

enum FollowUp {
    None,
    Update(String, CalendarEvent),
    Delete(String),
}

impl SyncTask {
    /// Runs `call` with the configured timeout and bounded retries.
    async fn attempt<T, F, Fut>(&self, what: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.settings.retries + 1;
        let mut last_error = None;

        for attempt in 1..=attempts {
            match tokio::time::timeout(self.settings.timeout, call()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => {
                    warn!("Remote {} failed (attempt {}/{}): {}", what, attempt, attempts, e);
                    last_error = Some(e);
                }
                Err(_) => {
                    warn!(
                        "Remote {} timed out after {:?} (attempt {}/{})",
                        what, self.settings.timeout, attempt, attempts
                    );
                    last_error = Some(CalError::remote(format!("{} timed out", what)));
                }
            }
            if attempt < attempts {
                tokio::time::sleep(self.settings.retry_backoff * attempt).await;
            }
        }

        Err(last_error.unwrap_or_else(|| CalError::remote(format!("{} was not attempted", what))))
    }

    async fn insert(self, snapshot: CalendarEvent) -> SyncOutcome {
        let local_id = snapshot.id.clone();
        let result = self.attempt("insert", || self.remote.insert(&snapshot)).await;

        let stored = match result {
            Ok(stored) => stored,
            Err(e) => {
                let mut inner = lock_inner(&self.state);
                if inner.removed.remove(&local_id) {
                    inner.sync.remove(&local_id);
                } else {
                    inner.sync.insert(local_id.clone(), SyncState::SyncFailed);
                    warn!("Event {} stays local-only: {}", local_id, e);
                }
                return SyncOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let Some(remote_id) = stored.id.remote_id().map(str::to_string) else {
            error!("Remote store returned a local id for {}", local_id);
            lock_inner(&self.state)
                .sync
                .insert(local_id.clone(), SyncState::SyncFailed);
            return SyncOutcome::Failed {
                reason: "remote store returned no remote id".to_string(),
            };
        };

        let follow_up = {
            let mut inner = lock_inner(&self.state);
            inner.sync.remove(&local_id);

            if inner.removed.remove(&local_id) {
                FollowUp::Delete(remote_id.clone())
            } else if let Some(index) = inner.position(&local_id) {
                let current = inner.events[index].clone();
                let edited = current != snapshot;
                let replacement = if edited {
                    CalendarEvent {
                        id: stored.id.clone(),
                        ..current
                    }
                } else {
                    stored.clone()
                };

                if let Some(existing) = inner.position(&stored.id) {
                    // a reload already brought the remote copy in
                    if edited {
                        inner.events[existing] = replacement.clone();
                    }
                    inner.events.remove(index);
                } else {
                    inner.events[index] = replacement.clone();
                }
                if let Err(e) = inner.cache.replace_id(&local_id, &replacement) {
                    warn!("Synced {} but could not update the local cache: {}", local_id, e);
                }

                if edited {
                    FollowUp::Update(remote_id.clone(), replacement)
                } else {
                    FollowUp::None
                }
            } else {
                debug!("Event {} left the working set before its insert landed", local_id);
                FollowUp::None
            }
        };
        info!("Event {} synced as {}", local_id, remote_id);

        match follow_up {
            FollowUp::None => {}
            FollowUp::Update(id, event) => {
                if let Err(e) = self.attempt("update", || self.remote.update(&id, &event)).await {
                    warn!("Follow-up update of {} failed: {}", id, e);
                }
            }
            FollowUp::Delete(id) => {
                info!("Event {} was removed while syncing, deleting {}", local_id, id);
                if let Err(e) = self.attempt("delete", || self.remote.delete(&id)).await {
                    warn!("Follow-up delete of {} failed: {}", id, e);
                }
            }
        }

        SyncOutcome::Inserted { remote_id }
    }

    async fn update(self, remote_id: String, event: CalendarEvent) -> SyncOutcome {
        match self
            .attempt("update", || self.remote.update(&remote_id, &event))
            .await
        {
            Ok(()) => {
                debug!("Remote event {} updated", remote_id);
                SyncOutcome::Updated
            }
            Err(e) => {
                warn!("Edit of {} kept locally only: {}", remote_id, e);
                SyncOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn delete(self, remote_id: String) -> SyncOutcome {
        match self.attempt("delete", || self.remote.delete(&remote_id)).await {
            Ok(()) => {
                debug!("Remote event {} deleted", remote_id);
                SyncOutcome::Deleted
            }
            Err(e) => {
                warn!("Remote delete of {} failed: {}", remote_id, e);
                SyncOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Combines a remote fetch with the local cache.
///
/// Remote events come first in their fetched order, followed by cached
/// local-only events. Each id appears once. Only events of `access_code`
/// are kept.
pub fn merge_events(
    remote: Vec<CalendarEvent>,
    cached: Vec<CalendarEvent>,
    access_code: &AccessCode,
    policy: ConflictPolicy,
) -> Vec<CalendarEvent> {
    let cached_remote: HashMap<EventId, CalendarEvent> = match policy {
        ConflictPolicy::RemoteWins => HashMap::new(),
        ConflictPolicy::LastWriterWins => cached
            .iter()
            .filter(|e| e.id.remote_id().is_some() && &e.access_code == access_code)
            .map(|e| (e.id.clone(), e.clone()))
            .collect(),
    };

    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(remote.len() + cached.len());

    for event in remote.into_iter().filter(|e| &e.access_code == access_code) {
        if !seen.insert(event.id.clone()) {
            continue;
        }
        match cached_remote.get(&event.id) {
            Some(local) if local.last_modified() > event.last_modified() => {
                debug!("Keeping newer cached copy of {}", event.id);
                merged.push(local.clone());
            }
            _ => merged.push(event),
        }
    }

    for event in cached
        .into_iter()
        .filter(|e| e.is_local() && &e.access_code == access_code)
    {
        if seen.insert(event.id.clone()) {
            merged.push(event);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};

    fn code() -> AccessCode {
        AccessCode::new("AMOR2024")
    }

    fn event(title: &str, date: &str, id: EventId) -> CalendarEvent {
        let day: LocalDay = date.parse().unwrap();
        let mut event = CalendarEvent::from_draft(EventDraft::new(title, date), day, code()).unwrap();
        event.id = id;
        event
    }

    #[test]
    fn merge_puts_remote_first_and_dedupes() {
        let remote = vec![
            event("A", "2025-01-01", EventId::Remote("1".into())),
            event("B", "2025-02-01", EventId::Remote("2".into())),
        ];
        let cached = vec![
            event("stale B", "2025-02-01", EventId::Remote("2".into())),
            event("C", "2025-03-01", EventId::Local("local_1_abc".into())),
            event("C again", "2025-03-01", EventId::Local("local_1_abc".into())),
        ];
        let merged = merge_events(remote, cached, &code(), ConflictPolicy::RemoteWins);
        let titles: Vec<&str> = merged.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[test]
    fn merge_never_crosses_access_codes() {
        let mut foreign = event("Other couple", "2025-01-01", EventId::Remote("9".into()));
        foreign.access_code = AccessCode::new("OTHER");
        let mut foreign_local = event("Other local", "2025-01-02", EventId::Local("local_2_x".into()));
        foreign_local.access_code = AccessCode::new("OTHER");

        let merged = merge_events(vec![foreign], vec![foreign_local], &code(), ConflictPolicy::RemoteWins);
        assert!(merged.is_empty());
    }

    #[test]
    fn last_writer_wins_prefers_newer_cached_copy() {
        let mut remote = event("Remote title", "2025-01-01", EventId::Remote("1".into()));
        remote.updated_at = Some(Utc::now() - ChronoDuration::hours(2));
        let mut cached = remote.clone();
        cached.title = "Edited offline".into();
        cached.updated_at = Some(Utc::now());

        let merged = merge_events(
            vec![remote.clone()],
            vec![cached.clone()],
            &code(),
            ConflictPolicy::LastWriterWins,
        );
        assert_eq!(merged[0].title, "Edited offline");

        let merged = merge_events(vec![remote], vec![cached], &code(), ConflictPolicy::RemoteWins);
        assert_eq!(merged[0].title, "Remote title");
    }

    #[test]
    fn last_writer_wins_ties_go_to_remote() {
        let remote = event("Remote", "2025-01-01", EventId::Remote("1".into()));
        let mut cached = remote.clone();
        cached.title = "Cached".into();
        let merged = merge_events(vec![remote], vec![cached], &code(), ConflictPolicy::LastWriterWins);
        assert_eq!(merged[0].title, "Remote");
    }

    #[tokio::test]
    async fn skipped_handles_resolve_immediately() {
        let handle = SyncHandle::skipped(EventId::Local("local_1_a".into()));
        assert!(handle.is_finished());
        assert_eq!(handle.wait().await, SyncOutcome::Skipped);
    }
}
