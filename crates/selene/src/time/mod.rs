//! Civil time to UTC / Julian Day normalization.

pub mod civil;
pub mod julian;
pub mod offset;

pub use civil::{normalize, CivilDateTime, UtcInstant};
pub use julian::{CalendarDate, JulianDay, J2000_JD};
pub use offset::UtcOffset;
