use chrono::NaiveDate;
use serde::Serialize;

pub mod aggregate;
pub mod cinema_city;
pub mod config;
pub mod enrich;
pub mod error;
pub mod feed;
pub mod labels;
pub mod omdb;
pub mod pipeline;
pub mod render;
pub mod view;

pub use error::{Error, Result};

/// Opaque venue identifier, as supplied by the caller.
pub type VenueId = String;

/// One screening as produced by a showtime source, already resolved to its
/// film title and formatted as venue-local "HH:MM".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screening {
    pub venue: VenueId,
    pub title: String,
    pub runtime_minutes: Option<u32>,
    pub time: String,
    pub tags: Vec<String>,
}

/// Ratings and plot for a title, as reported by the metadata source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub imdb_rating: Option<String>,
    pub rotten_tomatoes_rating: Option<String>,
    pub year: Option<String>,
    pub plot: Option<String>,
    pub poster_url: Option<String>,
}

impl Metadata {
    pub fn imdb_display(&self) -> &str {
        self.imdb_rating.as_deref().unwrap_or("N/A")
    }

    pub fn rotten_tomatoes_display(&self) -> &str {
        self.rotten_tomatoes_rating.as_deref().unwrap_or("N/A")
    }
}

/// The metadata source explicitly refused a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataError {
    pub message: String,
}

/// Outcome of the metadata lookup for one title.
///
/// `Absent` means the lookup never produced an answer (transport failure,
/// timeout, enrichment disabled); `NotFound` means the source answered "no".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TitleMetadata {
    Found(Metadata),
    NotFound(MetadataError),
    #[default]
    Absent,
}

/// Source of per-venue schedules for a given date.
#[async_trait::async_trait]
pub trait ShowtimeSource: Send + Sync {
    async fn fetch_schedule(
        &self,
        venue: &str,
        date: NaiveDate,
    ) -> Result<cinema_city::VenueSchedule>;
}

/// Source of rating/plot metadata, keyed by free-text title.
#[async_trait::async_trait]
pub trait MetadataSource: Send + Sync {
    async fn lookup(&self, title: &str) -> Result<omdb::OmdbResponse>;
}
