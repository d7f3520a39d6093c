//! Race and horse records produced by the extraction pipeline.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Finish position recorded for scratched, void, cancelled or blank results.
pub const NON_FINISH: i32 = -1;

/// Maximum number of past results kept per horse.
pub const MAX_RESULTS: usize = 10;

/// Track surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Turf,
    Dirt,
}

impl Surface {
    /// Marker that opens a dirt course token such as "ダ1400".
    pub const DIRT_MARKER: char = 'ダ';

    /// Classify a course token by its leading character.
    ///
    /// Anything not opening with the dirt marker (芝, 障, blank) is turf.
    pub fn from_course_token(token: &str) -> Self {
        if token.trim_start().starts_with(Self::DIRT_MARKER) {
            Surface::Dirt
        } else {
            Surface::Turf
        }
    }
}

/// Distance aptitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceAptitude {
    Sprinter,
    Stayer,
}

/// Aptitude on heavy going
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackConditionAptitude {
    Strong,
    Weak,
}

/// Running style assigned from the race card (逃げ, 先行, 差し, 追い込み)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunningStyle {
    FrontRunner,
    PaceSetter,
    Stalker,
    Closer,
    #[default]
    Unknown,
}

/// Six-cell pedigree. Cells missing from the page are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pedigree {
    pub father: String,
    pub paternal_grandfather: String,
    pub paternal_grandmother: String,
    pub mother: String,
    pub maternal_grandfather: String,
    pub maternal_grandmother: String,
}

/// One row of a horse's race history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceResult {
    /// Race day at midnight JST
    pub date: DateTime<FixedOffset>,
    pub race_name: String,
    /// 1-based finish, or [`NON_FINISH`]
    pub finish_position: i32,
    pub surface_type: Surface,
    pub distance_meters: u32,
    pub track_condition: String,
    pub finish_time: String,
}

/// Horse record assembled from a profile page plus the race card's running style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Horse {
    pub image_url: Option<String>,
    pub name: String,
    pub starts: u32,
    pub wins: u32,
    pub losses: u32,
    /// `None` when the horse has never started.
    pub win_percent: Option<f64>,
    pub course_aptitude: Surface,
    pub distance_aptitude: DistanceAptitude,
    pub running_style: RunningStyle,
    pub track_condition_aptitude: TrackConditionAptitude,
    pub pedigree: Pedigree,
    pub results: Vec<RaceResult>,
}

/// Win percentage over decided starts, `None` when there are none.
pub fn win_percent(wins: u32, losses: u32) -> Option<f64> {
    let total = wins + losses;
    if total == 0 {
        return None;
    }
    Some(wins as f64 / total as f64 * 100.0)
}

/// Race card with its runners in page order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub name: String,
    pub track: String,
    pub surface_type: Surface,
    pub distance_meters: u32,
    pub horses: Vec<Horse>,
}
