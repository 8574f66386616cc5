//! Data models for hourcast
//!
//! - Location: geocoded place candidates
//! - Sample/Series: hourly temperature samples ready for charting

pub mod location;
pub mod sample;

pub use location::Location;
pub use sample::{Sample, Series};
