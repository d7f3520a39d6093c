//! Race and horse assembly.
//!
//! Loads the race card, builds the running-style lookup, then loads each
//! horse profile in card order. Any failure aborts the whole race.

use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::Url;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::loader::{load, parse_url, Page, PageSource};
use super::parsers::{HorseParser, RaceCardParser, RaceHeader, RowPolicy, RunningStyles};
use crate::error::ScrapeError;
use crate::types::{Horse, Race};

/// Options for one scraping run
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Horse pages fetched at once. 1 keeps fetches strictly sequential.
    pub max_concurrent_fetches: usize,
    pub row_policy: RowPolicy,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 1,
            row_policy: RowPolicy::Skip,
        }
    }
}

/// Everything read from a race card before any horse page is fetched
struct RaceCard {
    header: RaceHeader,
    running_styles: RunningStyles,
    horse_urls: Vec<Url>,
}

/// Race and horse assembler over a page source
pub struct RaceScraper {
    source: Arc<dyn PageSource>,
    options: ScrapeOptions,
}

impl RaceScraper {
    pub fn new(source: Arc<dyn PageSource>, options: ScrapeOptions) -> Self {
        Self { source, options }
    }

    /// Assemble a race from its card page.
    pub async fn scrape_race(&self, race_url: &str) -> Result<Race, ScrapeError> {
        let url = parse_url(race_url)?;
        let page = load(self.source.as_ref(), &url).await?;
        let card = Self::read_race_card(&page)?;

        info!(
            "Race {}: {} horses, {} with running style",
            card.header.name,
            card.horse_urls.len(),
            card.running_styles.len()
        );

        let horses = self
            .scrape_horses_at(&card.horse_urls, &card.running_styles)
            .await?;

        Ok(Race {
            name: card.header.name,
            track: card.header.track,
            surface_type: card.header.surface,
            distance_meters: card.header.distance,
            horses,
        })
    }

    /// Horse-only mode: every horse linked from a listing page, with
    /// `running_style` left `Unknown`.
    pub async fn scrape_horse_list(&self, list_url: &str) -> Result<Vec<Horse>, ScrapeError> {
        let url = parse_url(list_url)?;
        let page = load(self.source.as_ref(), &url).await?;
        let horse_urls = {
            let document = page.document();
            Self::resolve_links(&page, RaceCardParser::parse_horse_links(&document)?)?
        };

        info!("Horse list {}: {} horses", url, horse_urls.len());
        self.scrape_horses_at(&horse_urls, &RunningStyles::default())
            .await
    }

    /// Assemble one horse from its profile page.
    pub async fn scrape_horse(
        &self,
        horse_url: &Url,
        running_styles: &RunningStyles,
    ) -> Result<Horse, ScrapeError> {
        let page = load(self.source.as_ref(), horse_url).await?;
        let horse = Self::read_horse(&page, running_styles, self.options.row_policy)?;
        debug!(
            "Assembled {} ({} starts, {} results, {:?})",
            horse.name,
            horse.starts,
            horse.results.len(),
            horse.running_style
        );
        Ok(horse)
    }

    /// Fetch horses with at most `max_concurrent_fetches` in flight, keeping
    /// the order of `urls`. The first failure ends the run.
    async fn scrape_horses_at(
        &self,
        urls: &[Url],
        running_styles: &RunningStyles,
    ) -> Result<Vec<Horse>, ScrapeError> {
        stream::iter(urls)
            .map(|url| async move {
                self.scrape_horse(url, running_styles).await.map_err(|e| {
                    warn!("Failed to assemble horse at {}: {}", url, e);
                    e
                })
            })
            .buffered(self.options.max_concurrent_fetches.max(1))
            .try_collect()
            .await
    }

    fn read_race_card(page: &Page) -> Result<RaceCard, ScrapeError> {
        let document = page.document();
        let header = RaceCardParser::parse_header(&document)?;
        let running_styles = RaceCardParser::parse_running_styles(&document);
        let horse_urls = Self::resolve_links(page, RaceCardParser::parse_horse_links(&document)?)?;

        Ok(RaceCard {
            header,
            running_styles,
            horse_urls,
        })
    }

    fn read_horse(
        page: &Page,
        running_styles: &RunningStyles,
        row_policy: RowPolicy,
    ) -> Result<Horse, ScrapeError> {
        let document = page.document();
        let horse = HorseParser::parse(&document, row_policy)?;

        let running_style = running_styles.lookup(&horse.name);
        let image_url = horse
            .image_url
            .as_deref()
            .and_then(|src| page.resolve(src))
            .map(|url| url.to_string());

        Ok(Horse {
            image_url,
            running_style,
            ..horse
        })
    }

    fn resolve_links(page: &Page, hrefs: Vec<String>) -> Result<Vec<Url>, ScrapeError> {
        hrefs
            .into_iter()
            .map(|href| {
                page.resolve(&href).ok_or_else(|| ScrapeError::InvalidUrl {
                    url: href.clone(),
                    reason: format!("cannot resolve against {}", page.url()),
                })
            })
            .collect()
    }
}
