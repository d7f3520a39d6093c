//! Web scraper module for netkeiba.com
//!
//! Provides page loading, HTML parsing, and race/horse assembly.

pub mod assembler;
pub mod loader;
pub mod parsers;

pub use assembler::{RaceScraper, ScrapeOptions};
pub use loader::{HttpSource, Page, PageSource};

/// Base URL for the NAR race site
pub const NAR_URL: &str = "https://nar.netkeiba.com";

/// Build race card URL
pub fn race_card_url(race_id: &str) -> String {
    format!("{}/race/shutuba.html?race_id={}", NAR_URL, race_id)
}

/// Accept either a page URL or a bare 12-digit race id.
pub fn race_target(input: &str) -> String {
    let input = input.trim();
    if input.len() == 12 && input.chars().all(|c| c.is_ascii_digit()) {
        race_card_url(input)
    } else {
        input.to_string()
    }
}
