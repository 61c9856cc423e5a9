pub mod aggregate;
pub mod clock;
pub mod dates;
pub mod streak;

pub use aggregate::StatsEngine;
pub use clock::{Clock, SystemClock};
#[cfg(test)]
pub use clock::FixedClock;
