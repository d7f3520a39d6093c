//! Horse profile parser for db.netkeiba.com.

use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;
use tracing::warn;

use super::past_race::{PastRaceParser, RowPolicy};
use super::text::{attr_at, element_text, select_first, select_first_of, select_within};
use crate::error::ScrapeError;
use crate::types::{
    win_percent, DistanceAptitude, Horse, Pedigree, RaceResult, RunningStyle, Surface,
    TrackConditionAptitude,
};

const NAME_SELECTORS: [&str; 2] = [
    "#db_main_box > div.db_head.fc > div.db_head_name.fc > div.horse_title > h1",
    ".horse_title h1",
];

/// Profile table holding "N戦M勝"
const PROFILE_TABLE: &str = "#db_main_box > div.db_main_deta > div > div.db_prof_area_02 > table > tbody";

const PHOTO: &str = "#db_main_box div.db_photo_box img";

/// Rows of the aptitude icon table. Row 3 (running style) is ignored in
/// favour of the race card; row 4 is growth type.
const APTITUDE_ROWS: &str = "#db_main_box > div.db_main_deta > div > div.db_prof_area_01 > div.db_prof_box > dl > dd > table > tbody";
const COURSE_ROW: usize = 1;
const DISTANCE_ROW: usize = 2;
const TRACK_CONDITION_ROW: usize = 5;

/// Aptitude gauges are drawn with a blue image for the left-hand category.
const APTITUDE_TOKEN: &str = "blue";

const PEDIGREE_TABLE: &str = "table.blood_table > tbody";

fn starts_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]+)戦").unwrap())
}

fn wins_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]+)勝").unwrap())
}

/// Starts and wins from the profile table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CareerTotals {
    pub starts: u32,
    pub wins: u32,
}

impl CareerTotals {
    pub fn losses(&self) -> u32 {
        self.starts - self.wins
    }
}

/// Parser for horse profile pages
pub struct HorseParser;

impl HorseParser {
    /// Parse a horse profile.
    ///
    /// `running_style` is left as `Unknown` and `image_url` holds the raw
    /// `src`; both are settled by the caller, which knows the race card and
    /// the page URL.
    pub fn parse(document: &Html, row_policy: RowPolicy) -> Result<Horse, ScrapeError> {
        let name = Self::parse_name(document)?;
        let totals = Self::parse_career_totals(document)?;
        let results = Self::parse_results(document, row_policy)?;

        Ok(Horse {
            image_url: attr_at(document, PHOTO, "src").filter(|src| !src.trim().is_empty()),
            name,
            starts: totals.starts,
            wins: totals.wins,
            losses: totals.losses(),
            win_percent: win_percent(totals.wins, totals.losses()),
            course_aptitude: Self::course_aptitude(document),
            distance_aptitude: Self::distance_aptitude(document),
            running_style: RunningStyle::Unknown,
            track_condition_aptitude: Self::track_condition_aptitude(document),
            pedigree: Self::parse_pedigree(document),
            results,
        })
    }

    pub fn parse_name(document: &Html) -> Result<String, ScrapeError> {
        select_first_of(document, &NAME_SELECTORS)
            .map(|h1| element_text(&h1))
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ScrapeError::extraction("horse name", "title heading not found"))
    }

    pub fn parse_career_totals(document: &Html) -> Result<CareerTotals, ScrapeError> {
        let table = select_first(document, PROFILE_TABLE)
            .ok_or_else(|| ScrapeError::extraction("career totals", "profile table not found"))?;
        let text = table.text().collect::<String>();

        let count = |re: &Regex, marker: &str| -> Result<u32, ScrapeError> {
            re.captures(&text)
                .and_then(|caps| caps[1].parse().ok())
                .ok_or_else(|| {
                    ScrapeError::extraction("career totals", format!("no count before {}", marker))
                })
        };
        let starts = count(starts_re(), "戦")?;
        let wins = count(wins_re(), "勝")?;

        if wins > starts {
            return Err(ScrapeError::extraction(
                "career totals",
                format!("{} wins from {} starts", wins, starts),
            ));
        }
        Ok(CareerTotals { starts, wins })
    }

    /// Whether the first gauge image in aptitude row `row` is the blue one.
    /// A missing image counts as not blue.
    fn aptitude_flag(document: &Html, row: usize) -> bool {
        let css = format!(
            "{} > tr:nth-child({}) > td > img:nth-child(1)",
            APTITUDE_ROWS, row
        );
        attr_at(document, &css, "src").is_some_and(|src| src.contains(APTITUDE_TOKEN))
    }

    pub fn course_aptitude(document: &Html) -> Surface {
        if Self::aptitude_flag(document, COURSE_ROW) {
            Surface::Turf
        } else {
            Surface::Dirt
        }
    }

    pub fn distance_aptitude(document: &Html) -> DistanceAptitude {
        if Self::aptitude_flag(document, DISTANCE_ROW) {
            DistanceAptitude::Sprinter
        } else {
            DistanceAptitude::Stayer
        }
    }

    pub fn track_condition_aptitude(document: &Html) -> TrackConditionAptitude {
        if Self::aptitude_flag(document, TRACK_CONDITION_ROW) {
            TrackConditionAptitude::Strong
        } else {
            TrackConditionAptitude::Weak
        }
    }

    /// Read the six pedigree cells:
    ///
    /// ```text
    /// tr1: father (rowspan 2) | paternal grandfather
    /// tr2:                      paternal grandmother
    /// tr3: mother (rowspan 2) | maternal grandfather
    /// tr4:                      maternal grandmother
    /// ```
    pub fn parse_pedigree(document: &Html) -> Pedigree {
        let cell = |row: usize, col: usize| {
            let css = format!(
                "{} > tr:nth-child({}) > td:nth-child({})",
                PEDIGREE_TABLE, row, col
            );
            match select_first(document, &css) {
                Some(td) => match select_within(&td, "a") {
                    Some(link) => element_text(&link),
                    None => element_text(&td),
                },
                None => String::new(),
            }
        };

        Pedigree {
            father: cell(1, 1),
            paternal_grandfather: cell(1, 2),
            paternal_grandmother: cell(2, 1),
            mother: cell(3, 1),
            maternal_grandfather: cell(3, 2),
            maternal_grandmother: cell(4, 1),
        }
    }

    fn parse_results(
        document: &Html,
        row_policy: RowPolicy,
    ) -> Result<Vec<RaceResult>, ScrapeError> {
        let mut results = Vec::new();
        for (row, parsed) in PastRaceParser::parse_rows(document) {
            match (parsed, row_policy) {
                (Ok(result), _) => results.push(result),
                (Err(source), RowPolicy::Abort) => {
                    return Err(ScrapeError::MalformedRow { row, source });
                }
                (Err(e), RowPolicy::Skip) => warn!("Skipping result row {}: {}", row, e),
            }
        }
        Ok(results)
    }
}
