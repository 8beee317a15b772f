//! Shared relationship calendar library
//!
//! This library keeps a couple's calendar events on the device, mirrors them
//! to a remote table in the background, and answers calendar-view queries
//! over the merged set.

mod anniversary;
mod cache;
mod catalog;
mod cli;
mod config;
mod date;
mod errors;
mod event;
mod helper;
mod remote;
mod repository;
mod session;
mod storage;
mod types;

// Re-export key components
pub use anniversary::*;
pub use cache::*;
pub use catalog::*;
pub use cli::*;
pub use config::*;
pub use date::*;
pub use errors::*;
pub use event::*;
pub use helper::*;
pub use remote::*;
pub use repository::*;
pub use session::*;
pub use storage::*;
pub use types::*;
