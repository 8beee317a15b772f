//! CLI module for the lovecal application
//!
//! This module handles the command-line interface for interacting with the
//! event repository.
use std::{str::FromStr, sync::Arc};

use chrono::Local;
use console::{style, Style};
use log::{debug, info, warn};

use crate::{
    confirm, format_for_display, parse_list, preview, to_local_day, AccessCode, AccessGate,
    Anniversary, CalError, CalendarEvent, Commands, Config, EventDraft, EventId, EventPatch,
    EventRepository, EventType, LoadSource, LocalDay, LocalEventCache, LocalStorage,
    RemoteEventStore, Result, SyncHandle, SyncOutcome,
};

/// CLI Application handler - processes CLI commands and interfaces with the EventRepository
pub struct App {
    config: Config,
    storage: LocalStorage,
    remote: Arc<dyn RemoteEventStore>,
    verbose: bool,
}

impl App {
    /// Create a new CLI application with the given storage, remote store and config
    pub fn new(
        config: Config,
        storage: LocalStorage,
        remote: Arc<dyn RemoteEventStore>,
        verbose: bool,
    ) -> Self {
        Self {
            config,
            storage,
            remote,
            verbose,
        }
    }

    /// Run the CLI application with the given command
    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Unlock { code } => self.handle_unlock(&code)?,
            Commands::Lock => self.handle_lock()?,
            Commands::Types => self.handle_types(),

            Commands::List { year, month, json } => self.handle_list(year, month, json).await?,
            Commands::Day { date, json } => self.handle_day(&date, json).await?,
            Commands::Week { date } => self.handle_week(date).await?,
            Commands::Upcoming { limit, json } => self.handle_upcoming(limit, json).await?,

            Commands::Add {
                title,
                date,
                event_type,
                importance,
                description,
                location,
                gifts,
                emotions,
                once,
            } => {
                let mut draft = EventDraft::new(title, date)
                    .with_type(EventType::from_str(&event_type)?)
                    .with_importance(importance)
                    .repeat_yearly(!once);
                draft.description = description;
                draft.location = location;
                draft.gifts = parse_list(gifts);
                draft.emotions = parse_list(emotions);
                draft.created_by = self.config.author.clone();
                self.handle_add(draft).await?
            }

            Commands::Edit {
                id,
                title,
                date,
                event_type,
                importance,
                description,
                location,
                gifts,
                emotions,
                repeat,
            } => {
                let patch = EventPatch {
                    title,
                    description,
                    event_date: date.map(Into::into),
                    event_type: event_type.as_deref().map(EventType::from_str).transpose()?,
                    importance,
                    repeat_yearly: repeat,
                    location,
                    gifts: gifts.map(|g| parse_list(Some(g))),
                    emotions: emotions.map(|e| parse_list(Some(e))),
                };
                self.handle_edit(&id, patch).await?
            }

            Commands::Delete { id, force } => self.handle_delete(&id, force).await?,
            Commands::Stats { year } => self.handle_stats(year).await?,
            Commands::Sync => self.handle_sync().await?,
            Commands::Countdown => self.handle_countdown().await?,
        }

        Ok(())
    }

    fn gate(&self) -> AccessGate {
        AccessGate::new(
            AccessCode::new(self.config.access_code.clone()),
            self.storage.clone(),
        )
    }

    /// Restores the session and loads the working set.
    async fn open_repository(&self) -> Result<EventRepository> {
        let session = self.gate().restore();
        let repository = EventRepository::new(
            &session,
            Arc::clone(&self.remote),
            LocalEventCache::new(self.storage.clone()),
            self.config.sync_settings(),
        )?;

        match repository.load().await {
            LoadSource::Remote => debug!("Working set loaded from the remote store"),
            LoadSource::LocalCache => println!(
                "{}",
                style("Offline: showing events saved on this device").yellow()
            ),
            LoadSource::Samples => println!(
                "{}",
                style("Offline and nothing saved yet: showing sample events").yellow()
            ),
        }
        Ok(repository)
    }

    fn handle_unlock(&self, code: &str) -> Result<()> {
        self.gate().unlock(code)?;
        println!("{}", style("Calendar unlocked 💖").green().bold());
        Ok(())
    }

    fn handle_lock(&self) -> Result<()> {
        self.gate().lock()?;
        println!("Calendar locked on this device.");
        Ok(())
    }

    fn handle_types(&self) {
        for event_type in EventType::ALL {
            println!(
                "{:<12} {}  {}",
                event_type.as_str(),
                self.type_style(event_type).apply_to(event_type.label()),
                style(event_type.color()).dim()
            );
        }
    }

    async fn handle_list(&self, year: Option<i32>, month: Option<u32>, json: bool) -> Result<()> {
        let repository = self.open_repository().await?;
        let events = match (year, month) {
            (_, Some(month)) => {
                if !(1..=12).contains(&month) {
                    return Err(CalError::validation(format!("month must be 1-12, got {}", month)));
                }
                let year = year.unwrap_or_else(|| LocalDay::today().year());
                repository.events_in_month(year, month)
            }
            (Some(year), None) => repository.events_in_year(year),
            (None, None) => {
                let mut all = repository.all();
                all.sort_by_key(|e| e.event_date);
                all
            }
        };
        self.display_events(&events, json)
    }

    async fn handle_day(&self, date: &str, json: bool) -> Result<()> {
        let day = to_local_day(date)?;
        let repository = self.open_repository().await?;
        let events = repository.events_on_day(day)?;

        if !json {
            println!(
                "{}",
                style(format_for_display(day, &self.config.locale)).bold()
            );
        }
        self.display_events(&events, json)
    }

    async fn handle_week(&self, date: Option<String>) -> Result<()> {
        let anchor = to_local_day(date)?;
        let repository = self.open_repository().await?;
        let events = repository.events_in_week(anchor)?;
        let start = anchor.week_start();
        let today = LocalDay::today();

        for offset in 0..7 {
            let day = start.add_days(offset);
            let heading = format_for_display(day, &self.config.locale);
            if day == today {
                println!("{}", style(format!("▶ {}", heading)).bold().magenta());
            } else {
                println!("{}", style(heading).bold());
            }
            for event in events.iter().filter(|e| e.event_date == day) {
                println!("    {}", self.event_line(event));
            }
        }
        Ok(())
    }

    async fn handle_upcoming(&self, limit: usize, json: bool) -> Result<()> {
        let repository = self.open_repository().await?;
        let events = repository.upcoming(limit);
        if json {
            return self.display_events(&events, true);
        }

        if events.is_empty() {
            println!("No upcoming events.");
            return Ok(());
        }
        let today = LocalDay::today();
        for event in &events {
            let days = crate::days_between(today, event.event_date);
            let when = match days {
                0 => style("today".to_string()).green().bold(),
                1 => style("tomorrow".to_string()).green(),
                n => style(format!("in {} days", n)).cyan(),
            };
            println!("{}  {}", self.event_line(event), when);
        }
        Ok(())
    }

    async fn handle_add(&self, draft: EventDraft) -> Result<()> {
        let repository = self.open_repository().await?;
        let (event, handle) = repository.add(draft)?;
        println!(
            "Event created with ID: {}",
            style(event.id.as_str()).bold()
        );
        self.report_sync(handle).await;
        Ok(())
    }

    async fn handle_edit(&self, id: &str, patch: EventPatch) -> Result<()> {
        if patch.is_empty() {
            return Err(CalError::validation("nothing to change; pass at least one field"));
        }
        let repository = self.open_repository().await?;
        let (event, handle) = repository.update(&EventId::parse(id), patch)?;
        println!("Updated: {}", self.event_line(&event));
        self.report_sync(handle).await;
        Ok(())
    }

    async fn handle_delete(&self, id: &str, force: bool) -> Result<()> {
        let repository = self.open_repository().await?;
        let id = EventId::parse(id);
        let event = repository.get(&id).ok_or_else(|| CalError::EventNotFound {
            id: id.to_string(),
        })?;

        if !force {
            println!("You are about to delete the following event:");
            self.print_event_details(&event);
            println!("\nThis action cannot be undone!");
            if !confirm("Are you sure you want to delete this event?")? {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        let handle = repository.remove(&id)?;
        println!("Event '{}' ({}) has been deleted.", event.title, event.id);
        self.report_sync(handle).await;
        Ok(())
    }

    async fn handle_stats(&self, year: Option<i32>) -> Result<()> {
        let year = year.unwrap_or_else(|| LocalDay::today().year());
        let repository = self.open_repository().await?;
        let overview = repository.year_overview(year);

        println!("{}", style(format!("{} · {} events", year, overview.total)).bold());
        println!("{}", self.separator());
        for month in 1..=12u32 {
            let count = overview.by_month.get(&month).map_or(0, Vec::len);
            let name = LocalDay::from_ymd(year, month, 1)
                .map(|d| d.date().format("%b").to_string())
                .unwrap_or_default();
            println!("{:<4} {:>3} {}", name, count, style("♥".repeat(count)).red());
        }
        println!("{}", self.separator());
        for event_type in EventType::ALL {
            let count = repository.count_by_type(event_type, year);
            if count > 0 {
                println!(
                    "{} {}",
                    self.type_style(event_type).apply_to(event_type.label()),
                    count
                );
            }
        }
        Ok(())
    }

    async fn handle_sync(&self) -> Result<()> {
        let repository = self.open_repository().await?;
        let handles = repository.sync_pending();
        if handles.is_empty() {
            println!("Nothing to sync; every event is already stored remotely.");
            return Ok(());
        }

        let total = handles.len();
        let mut synced = 0;
        for handle in handles {
            if let SyncOutcome::Inserted { .. } = handle.wait().await {
                synced += 1;
            }
        }
        println!("Synced {} of {} local events.", synced, total);
        if synced < total {
            warn!("{} events remain on this device only", total - synced);
        }
        Ok(())
    }

    async fn handle_countdown(&self) -> Result<()> {
        let start = match &self.config.anniversary_date {
            Some(date) => to_local_day(date.as_str())?,
            None => {
                let repository = self.open_repository().await?;
                let mut anniversaries: Vec<CalendarEvent> = repository
                    .all()
                    .into_iter()
                    .filter(|e| e.event_type == EventType::Anniversary)
                    .collect();
                anniversaries.sort_by_key(|e| e.event_date);
                match anniversaries.first() {
                    Some(event) => event.event_date,
                    None => {
                        return Err(CalError::ConfigError {
                            message: "set anniversary_date in the configuration or add an anniversary event".to_string(),
                        })
                    }
                }
            }
        };

        let counter = Anniversary::new(start);
        let together = counter.time_together(Local::now().naive_local());
        let next = counter.next_anniversary(LocalDay::today());

        println!(
            "{}",
            style(format!(
                "Together since {}",
                format_for_display(start, &self.config.locale)
            ))
            .bold()
        );
        println!(
            "{} years, {} days, {} hours, {} minutes",
            together.years, together.days, together.hours, together.minutes
        );
        println!("{}", self.separator());
        if next.days_until == 0 {
            println!("{}", style("Happy anniversary! 💘").magenta().bold());
        } else {
            println!(
                "Anniversary #{} on {}: {} days to go",
                next.number,
                format_for_display(next.date, &self.config.locale),
                style(next.days_until).bold()
            );
        }
        let filled = next.progress as usize / 5;
        println!(
            "[{}{}] {}%",
            style("█".repeat(filled)).red(),
            "░".repeat(20 - filled),
            next.progress
        );
        Ok(())
    }

    /// Waits for the background push so it completes before the process exits.
    async fn report_sync(&self, handle: SyncHandle) {
        let id = handle.event_id().clone();
        match handle.wait().await {
            SyncOutcome::Inserted { remote_id } => {
                println!("{} (remote id {})", style("Synced").green(), remote_id)
            }
            SyncOutcome::Updated | SyncOutcome::Deleted => println!("{}", style("Synced").green()),
            SyncOutcome::Skipped => {
                if self.verbose {
                    println!("{}", style("Nothing to push").dim());
                }
            }
            SyncOutcome::Failed { reason } => {
                info!("Push of {} failed: {}", id, reason);
                println!(
                    "{} {}",
                    style("Saved on this device only:").yellow(),
                    reason
                );
            }
        }
    }

    /// Display events in the requested format
    fn display_events(&self, events: &[CalendarEvent], json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(events)?);
            return Ok(());
        }

        if events.is_empty() {
            println!("No events found.");
            return Ok(());
        }

        for (i, event) in events.iter().enumerate() {
            if i > 0 {
                println!("{}", self.separator());
            }
            self.print_event_details(event);
        }

        println!(
            "\nFound {} event{}",
            events.len(),
            if events.len() == 1 { "" } else { "s" }
        );
        Ok(())
    }

    fn print_event_details(&self, event: &CalendarEvent) {
        println!(
            "ID: {} | {}",
            event.id,
            format_for_display(event.event_date, &self.config.locale)
        );
        println!(
            "{} {}",
            event.event_type.icon(),
            style(&event.title).bold()
        );
        println!(
            "{}  {}",
            self.type_style(event.event_type).apply_to(event.event_type.label()),
            event.importance.hearts()
        );
        if let Some(location) = &event.location {
            println!("📍 {}", location);
        }
        if let Some(description) = &event.description {
            println!("{}", preview(description, 100));
        }
        if !event.gifts.is_empty() {
            println!("🎁 {}", style(event.gifts.join(", ")).cyan());
        }
        if !event.emotions.is_empty() {
            println!("💭 {}", style(event.emotions.join(", ")).cyan());
        }
        if event.id.is_sample() {
            println!("{}", style("sample event (read-only)").dim());
        } else if self.verbose && event.is_local() {
            println!("{}", style("not yet stored remotely").dim());
        }
    }

    fn event_line(&self, event: &CalendarEvent) -> String {
        format!(
            "{} {}  {} {}",
            event.event_date,
            event.event_type.icon(),
            style(&event.title).bold(),
            style(format!("[{}]", event.id)).dim()
        )
    }

    fn type_style(&self, event_type: EventType) -> Style {
        Style::new().color256(event_type.ansi_color())
    }

    fn separator(&self) -> String {
        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);
        "-".repeat(term_width.min(50))
    }
}
