//! Shared types for the lovecal application.
//!
//! Holds the crate-wide `Result` alias and the command-line subcommands.
use clap::Subcommand;

use crate::CalError;

/// A specialized Result type for lovecal operations.
pub type Result<T> = std::result::Result<T, CalError>;

/// Available subcommands for the lovecal application
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Unlock the calendar with the shared code
    Unlock {
        /// The shared code
        code: String,
    },

    /// Forget the remembered code on this device
    Lock,

    /// List events, optionally for one year or month
    List {
        /// Only events of this year
        #[clap(short, long)]
        year: Option<i32>,

        /// Only events of this month (1-12); needs --year or uses the current year
        #[clap(short, long)]
        month: Option<u32>,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Show the events of one day
    Day {
        /// Any recognisable date, e.g. 2025-07-10 or 10/07/2025
        date: String,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Show the week (Sunday to Saturday) containing a date
    Week {
        /// Defaults to today
        date: Option<String>,
    },

    /// Show the next events from today on
    Upcoming {
        /// Maximum number of events
        #[clap(short = 'n', long, default_value_t = 5)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Create a new event
    Add {
        /// Title of the event
        #[clap(short = 'T', long)]
        title: String,

        /// Day of the event
        #[clap(short, long)]
        date: String,

        /// Kind of event (birthday, anniversary, date, trip, first, goal, special, memory)
        #[clap(short = 't', long = "type", default_value = "date")]
        event_type: String,

        /// Importance from 1 to 5
        #[clap(short, long, default_value_t = 3)]
        importance: u8,

        /// Longer description
        #[clap(short = 'D', long)]
        description: Option<String>,

        /// Where it happens
        #[clap(short, long)]
        location: Option<String>,

        /// Gift ideas (comma-separated)
        #[clap(short, long)]
        gifts: Option<String>,

        /// Emotions (comma-separated)
        #[clap(short, long)]
        emotions: Option<String>,

        /// Do not repeat the event every year
        #[clap(long)]
        once: bool,
    },

    /// Edit an existing event
    Edit {
        /// ID of the event to edit
        id: String,

        /// New title
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// New day
        #[clap(short, long)]
        date: Option<String>,

        /// New kind of event
        #[clap(short = 't', long = "type")]
        event_type: Option<String>,

        /// New importance from 1 to 5
        #[clap(short, long)]
        importance: Option<u8>,

        /// New description
        #[clap(short = 'D', long)]
        description: Option<String>,

        /// New location
        #[clap(short, long)]
        location: Option<String>,

        /// Replace gift ideas (comma-separated)
        #[clap(short, long)]
        gifts: Option<String>,

        /// Replace emotions (comma-separated)
        #[clap(short, long)]
        emotions: Option<String>,

        /// Whether the event repeats every year
        #[clap(long)]
        repeat: Option<bool>,
    },

    /// Delete an event by ID
    Delete {
        /// ID of the event to delete
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Per-month and per-type counts for a year
    Stats {
        /// Defaults to the current year
        #[clap(short, long)]
        year: Option<i32>,
    },

    /// Push events that only exist on this device
    Sync,

    /// Time together and the countdown to the next anniversary
    Countdown,

    /// List the available event types
    Types,
}
