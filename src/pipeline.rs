//! One aggregation run: fetch every venue, fold, enrich, build the view.

use crate::aggregate::aggregate;
use crate::cinema_city::{CinemaCityClient, normalize_schedule};
use crate::config::Settings;
use crate::enrich::enrich;
use crate::labels::LabelTable;
use crate::omdb::OmdbClient;
use crate::view::{ViewRecord, build_view};
use crate::{Error, MetadataSource, Result, ShowtimeSource, VenueId};
use chrono::{FixedOffset, NaiveDate};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum VenueStatus {
    Loaded {
        screenings: usize,
        orphaned: usize,
        malformed: usize,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueReport {
    pub venue_id: VenueId,
    #[serde(flatten)]
    pub status: VenueStatus,
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub date: NaiveDate,
    pub venues: Vec<VenueReport>,
    pub films: Vec<ViewRecord>,
}

impl RunReport {
    pub fn failed_venues(&self) -> impl Iterator<Item = &VenueReport> {
        self.venues
            .iter()
            .filter(|v| matches!(v.status, VenueStatus::Failed { .. }))
    }
}

/// Trims ids, drops blanks and keeps only the first occurrence of each id.
pub fn normalize_venue_ids<S: AsRef<str>>(raw: &[S]) -> Vec<VenueId> {
    let mut seen = HashSet::new();
    raw.iter()
        .map(|id| id.as_ref().trim())
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.to_string()))
        .map(str::to_string)
        .collect()
}

pub struct Pipeline {
    showtimes: Arc<dyn ShowtimeSource>,
    metadata: Option<Arc<dyn MetadataSource>>,
    offset: FixedOffset,
    timeout: Duration,
    attribute_labels: LabelTable,
    venue_names: LabelTable,
}

impl Pipeline {
    pub fn new(
        showtimes: Arc<dyn ShowtimeSource>,
        metadata: Option<Arc<dyn MetadataSource>>,
        offset: FixedOffset,
        timeout: Duration,
    ) -> Self {
        Self {
            showtimes,
            metadata,
            offset,
            timeout,
            attribute_labels: LabelTable::attribute_defaults(),
            venue_names: LabelTable::default(),
        }
    }

    pub fn with_labels(mut self, attribute_labels: LabelTable, venue_names: LabelTable) -> Self {
        self.attribute_labels = attribute_labels;
        self.venue_names = venue_names;
        self
    }

    /// Wires the Cinema City and OMDb clients from `settings`. Enrichment is
    /// disabled when no OMDb API key is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let timeout = settings.request_timeout();
        let showtimes = Arc::new(CinemaCityClient::new(
            settings.showtimes_url.clone(),
            timeout,
        )?);
        let metadata: Option<Arc<dyn MetadataSource>> = match settings.omdb_api_key() {
            Some(key) => Some(Arc::new(OmdbClient::new(
                settings.omdb_url.clone(),
                key.to_string(),
                timeout,
            )?)),
            None => {
                warn!("no OMDb API key configured, skipping ratings lookup");
                None
            }
        };
        Ok(Self::new(showtimes, metadata, settings.utc_offset()?, timeout)
            .with_labels(settings.attribute_labels(), settings.venue_names()))
    }

    pub async fn run(&self, venues: &[VenueId], date: NaiveDate) -> RunReport {
        let venues = normalize_venue_ids(venues);
        info!(venues = venues.len(), %date, "fetching showtimes");

        let mut fetches = JoinSet::new();
        for (index, venue) in venues.iter().enumerate() {
            let source = Arc::clone(&self.showtimes);
            let venue = venue.clone();
            let timeout = self.timeout;
            fetches.spawn(async move {
                let outcome = match tokio::time::timeout(timeout, source.fetch_schedule(&venue, date)).await {
                    Ok(result) => result,
                    Err(_) => Err(Error::Timeout(timeout)),
                };
                (index, outcome)
            });
        }

        let mut outcomes: Vec<Option<Result<_>>> = venues.iter().map(|_| None).collect();
        while let Some(joined) = fetches.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(e) => warn!("showtime fetch task failed: {e}"),
            }
        }

        // fold in caller order regardless of completion order
        let mut reports = Vec::with_capacity(venues.len());
        let mut screenings = Vec::new();
        for (venue, outcome) in venues.iter().zip(outcomes) {
            let status = match outcome {
                Some(Ok(schedule)) => {
                    let normalized = normalize_schedule(venue, schedule, self.offset);
                    let status = VenueStatus::Loaded {
                        screenings: normalized.screenings.len(),
                        orphaned: normalized.orphaned,
                        malformed: normalized.malformed,
                    };
                    screenings.extend(normalized.screenings);
                    status
                }
                Some(Err(e)) => {
                    warn!(venue = %venue, "skipping venue: {e}");
                    VenueStatus::Failed {
                        reason: e.to_string(),
                    }
                }
                None => VenueStatus::Failed {
                    reason: "fetch task aborted".to_string(),
                },
            };
            reports.push(VenueReport {
                venue_id: venue.clone(),
                status,
            });
        }

        let aggregation = aggregate(screenings);
        info!(titles = aggregation.len(), "aggregated showtimes");

        let aggregation = match &self.metadata {
            Some(source) if !aggregation.is_empty() => {
                enrich(aggregation, Arc::clone(source), self.timeout).await
            }
            _ => aggregation,
        };

        let films = build_view(&aggregation, &venues, &self.attribute_labels, &self.venue_names);
        RunReport {
            date,
            venues: reports,
            films,
        }
    }
}
