//! Command-line front end.

mod app;
mod main;

pub use app::*;
pub use main::*;
