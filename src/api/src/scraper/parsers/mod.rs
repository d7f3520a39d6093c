//! HTML parsers for netkeiba.com race cards and horse profiles.

pub mod horse;
pub mod past_race;
pub mod race_card;
pub mod text;

pub use horse::{CareerTotals, HorseParser};
pub use past_race::{PastRaceParser, RowPolicy};
pub use race_card::{RaceCardParser, RaceHeader, RunningStyles};
