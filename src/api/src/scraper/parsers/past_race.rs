//! Past race rows from the horse profile's results table.

use chrono::{DateTime, FixedOffset, NaiveDate};
use scraper::{ElementRef, Html};

use super::text::{element_text, first_number, select_all, select_within};
use crate::error::RowError;
use crate::types::{RaceResult, Surface, MAX_RESULTS, NON_FINISH};

/// Results table rows, newest first
pub const RESULT_ROWS: &str = "#contents > div.db_main_race.fc > div > table > tbody > tr";

/// JST, the zone race dates are published in
const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Finish cell values for horses that did not finish:
/// blank, 除外 (scratched), 中止 (void), 取消 (cancelled).
const NON_FINISH_TOKENS: [&str; 7] = ["", "除", "除外", "中", "中止", "取", "取消"];

// 0-based cell positions within a results row
const DATE_CELL: usize = 0;
const RACE_NAME_CELL: usize = 4;
const FINISH_CELL: usize = 11;
const COURSE_CELL: usize = 14;
const TRACK_CONDITION_CELL: usize = 15;
const TIME_CELL: usize = 17;

/// What to do with a result row that fails to convert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPolicy {
    /// Drop the row and keep the rest of the history.
    #[default]
    Skip,
    /// Fail the whole horse.
    Abort,
}

/// Parser for the results table on a horse page
pub struct PastRaceParser;

impl PastRaceParser {
    /// Convert the first [`MAX_RESULTS`] rows, paired with their row index.
    pub fn parse_rows(document: &Html) -> Vec<(usize, Result<RaceResult, RowError>)> {
        select_all(document, RESULT_ROWS)
            .iter()
            .take(MAX_RESULTS)
            .enumerate()
            .map(|(i, row)| (i, Self::parse_row(row)))
            .collect()
    }

    pub fn parse_row(row: &ElementRef) -> Result<RaceResult, RowError> {
        // Direct children only, so a table nested in a cell cannot shift the columns.
        let tds: Vec<ElementRef> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "td")
            .collect();
        let cells: Vec<String> = tds.iter().map(|td| element_text(td)).collect();
        let cell = |idx: usize| cells.get(idx).map(String::as_str).unwrap_or_default();

        let date = Self::parse_date(cell(DATE_CELL))?;
        let finish_position = Self::parse_finish_position(cell(FINISH_CELL))?;
        let (surface_type, distance_meters) = Self::parse_course(cell(COURSE_CELL))?;

        // Prefer the link text; the cell also carries grade icons on some pages.
        let race_name = tds
            .get(RACE_NAME_CELL)
            .and_then(|td| select_within(td, "a"))
            .map(|a| element_text(&a))
            .unwrap_or_else(|| cell(RACE_NAME_CELL).to_string());

        Ok(RaceResult {
            date,
            race_name,
            finish_position,
            surface_type,
            distance_meters,
            track_condition: cell(TRACK_CONDITION_CELL).to_string(),
            finish_time: cell(TIME_CELL).to_string(),
        })
    }

    /// Parse a "YYYY/MM/DD" race day as midnight JST.
    pub fn parse_date(text: &str) -> Result<DateTime<FixedOffset>, RowError> {
        let text = text.trim();
        let bad = || RowError::Date(text.to_string());

        let date = NaiveDate::parse_from_str(text, "%Y/%m/%d").map_err(|_| bad())?;
        let jst = FixedOffset::east_opt(JST_OFFSET_SECS).ok_or_else(bad)?;
        date.and_hms_opt(0, 0, 0)
            .and_then(|midnight| midnight.and_local_timezone(jst).single())
            .ok_or_else(bad)
    }

    /// Finish position from the leading digits, or [`NON_FINISH`] for a
    /// non-finish token.
    pub fn parse_finish_position(text: &str) -> Result<i32, RowError> {
        let token = text.trim();
        if NON_FINISH_TOKENS.contains(&token) {
            return Ok(NON_FINISH);
        }

        let digits: String = token.chars().take_while(|c| c.is_ascii_digit()).collect();
        match digits.parse::<i32>() {
            Ok(position) if position >= 1 => Ok(position),
            _ => Err(RowError::FinishPosition(token.to_string())),
        }
    }

    /// Split a course token like "ダ1400" or "芝1600m" into surface and metres.
    pub fn parse_course(token: &str) -> Result<(Surface, u32), RowError> {
        let distance =
            first_number(token).ok_or_else(|| RowError::Distance(token.trim().to_string()))?;
        Ok((Surface::from_course_token(token), distance))
    }
}
