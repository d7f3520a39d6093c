//! Horse-racing data extraction for netkeiba.com.
//!
//! Loads race cards and horse profile pages, extracts typed fields, and
//! assembles them into [`Race`] and [`Horse`] records.

pub mod cli;
pub mod config;
pub mod error;
pub mod scraper;
pub mod types;

pub use crate::error::{RowError, ScrapeError};
pub use crate::scraper::{HttpSource, Page, PageSource, RaceScraper, ScrapeOptions};
pub use crate::types::{Horse, Pedigree, Race, RaceResult, RunningStyle, Surface};
