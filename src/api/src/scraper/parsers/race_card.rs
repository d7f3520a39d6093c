//! Race card (shutuba) parser for nar.netkeiba.com.

use scraper::Html;
use std::collections::HashMap;
use tracing::warn;

use super::past_race::PastRaceParser;
use super::text::{element_text, name_key, select_all, text_at};
use crate::error::ScrapeError;
use crate::types::{RunningStyle, Surface};

const RACE_NAME: &str = "#Netkeiba_Race_Nar_Shutuba > div.Wrap.fc > div.RaceColumn01 > div > div.RaceMainColumn > div.RaceList_NameBox > div.RaceList_Item02 > div.RaceName";

/// Second span of RaceData02: the racecourse ("大井")
const RACE_TRACK: &str = "#Netkeiba_Race_Nar_Shutuba > div.Wrap.fc > div.RaceColumn01 > div > div.RaceMainColumn > div.RaceList_NameBox > div.RaceList_Item02 > div.RaceData02 > span:nth-child(2)";

/// First span of RaceData01: the course token ("ダ1400m")
const RACE_COURSE: &str = "#Netkeiba_Race_Nar_Shutuba > div.Wrap.fc > div.RaceColumn01 > div > div.RaceMainColumn > div.RaceList_NameBox > div.RaceList_Item02 > div.RaceData01 > span:nth-child(1)";

/// Horse name anchors in the entry list
pub const HORSE_LINKS: &str = ".HorseInfo > div > div > span.HorseName > a";

/// Rows of the predicted pace table, one per running style.
const RUNNING_STYLE_ROWS: &str = "#Netkeiba_Race_Nar_Shutuba > div.Wrap.fc > div.RaceColumn02 > table > tbody";

const RUNNING_STYLE_REGIONS: [(usize, RunningStyle); 4] = [
    (1, RunningStyle::FrontRunner), // 逃げ
    (2, RunningStyle::PaceSetter),  // 先行
    (3, RunningStyle::Stalker),     // 差し
    (4, RunningStyle::Closer),      // 追い込み
];

/// Running styles keyed by truncated horse name, built once per race card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunningStyles {
    by_key: HashMap<String, RunningStyle>,
}

impl RunningStyles {
    /// Record `name` under `style`. A name already present in another region
    /// is overwritten by the later region.
    pub fn insert(&mut self, name: &str, style: RunningStyle) {
        let key = name_key(name);
        if key.is_empty() {
            return;
        }
        if let Some(previous) = self.by_key.insert(key.to_string(), style) {
            if previous != style {
                warn!(
                    "Running style key {:?} matched {:?} and {:?}; keeping {:?}",
                    key, previous, style, style
                );
            }
        }
    }

    /// Style for a horse's full display name, `Unknown` on a miss.
    pub fn lookup(&self, name: &str) -> RunningStyle {
        self.by_key
            .get(name_key(name))
            .copied()
            .unwrap_or(RunningStyle::Unknown)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Race-level metadata from the card header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceHeader {
    pub name: String,
    pub track: String,
    pub surface: Surface,
    pub distance: u32,
}

/// Parser for race card pages
pub struct RaceCardParser;

impl RaceCardParser {
    pub fn parse_running_styles(document: &Html) -> RunningStyles {
        let mut styles = RunningStyles::default();
        for (row, style) in RUNNING_STYLE_REGIONS {
            let css = format!(
                "{} > tr:nth-child({}) > td > div > .UmaName",
                RUNNING_STYLE_ROWS, row
            );
            for elem in select_all(document, &css) {
                styles.insert(&element_text(&elem), style);
            }
        }
        styles
    }

    /// `href` of every horse anchor, in page order.
    ///
    /// An anchor without a usable `href` is an extraction error: the race
    /// would otherwise come back with a runner missing.
    pub fn parse_horse_links(document: &Html) -> Result<Vec<String>, ScrapeError> {
        select_all(document, HORSE_LINKS)
            .iter()
            .map(|a| match a.value().attr("href").map(str::trim) {
                Some(href) if !href.is_empty() => Ok(href.to_string()),
                _ => Err(ScrapeError::extraction(
                    "horse link",
                    format!("anchor {:?} has no href", element_text(a)),
                )),
            })
            .collect()
    }

    pub fn parse_header(document: &Html) -> Result<RaceHeader, ScrapeError> {
        let name = text_at(document, RACE_NAME);
        if name.is_empty() {
            return Err(ScrapeError::extraction("race name", "RaceName not found"));
        }

        let course = text_at(document, RACE_COURSE);
        let (surface, distance) = PastRaceParser::parse_course(&course)
            .map_err(|e| ScrapeError::extraction("race distance", e.to_string()))?;
        if distance == 0 {
            return Err(ScrapeError::extraction("race distance", "distance is zero"));
        }

        Ok(RaceHeader {
            name,
            track: text_at(document, RACE_TRACK),
            surface,
            distance,
        })
    }
}
