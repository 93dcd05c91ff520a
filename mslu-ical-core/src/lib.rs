//! MSLU ICal Core Library
//!
//! This library fetches class-schedule data from the MSLU timetable backend,
//! assigns absolute calendar dates to the relative day-of-week entries,
//! deduplicates teacher schedules across student groups and renders the
//! result as an iCalendar document.

pub mod cache;
pub mod client;
pub mod error;
pub mod fanout;
pub mod ics;
pub mod identity;
pub mod merge;
pub mod types;

// Re-export core types and error handling
pub use error::{Error, Result};
pub use types::*;

/// Commonly used items
pub mod prelude {
    pub use crate::{cache::*, client::*, fanout::*, ics::*, identity::*, merge::*, types::*};
}
