use crate::{Error, Result, Screening, ShowtimeSource};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use reqwest::{Client, header};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";

#[derive(Debug, Default, Deserialize)]
struct ScheduleEnvelope {
    #[serde(default)]
    body: Option<VenueSchedule>,
}

/// Films and events one venue reports for one date. The API sends `null`
/// for empty lists as often as it omits them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VenueSchedule {
    #[serde(default)]
    pub films: Option<Vec<ApiFilm>>,
    #[serde(default)]
    pub events: Option<Vec<ApiEvent>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiFilm {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub length: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    #[serde(default)]
    pub film_id: Option<String>,
    #[serde(default)]
    pub event_date_time: Option<String>,
    #[serde(default)]
    pub attribute_ids: Option<Vec<String>>,
}

impl VenueSchedule {
    /// Parses the `{ "body": { "films": [...], "events": [...] } }` payload.
    pub fn from_json(body: &str) -> Result<Self> {
        let envelope: ScheduleEnvelope = serde_json::from_str(body)?;
        Ok(envelope.body.unwrap_or_default())
    }
}

/// Screenings resolved from one venue's schedule, plus what had to be dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub screenings: Vec<Screening>,
    /// Events whose film id had no film in the same response
    pub orphaned: usize,
    /// Events whose timestamp could not be parsed
    pub malformed: usize,
}

/// Resolves every event against the films of the same response and formats
/// its start as venue-local "HH:MM".
pub fn normalize_schedule(venue: &str, schedule: VenueSchedule, offset: FixedOffset) -> Normalized {
    let films_list = schedule.films.unwrap_or_default();
    let films: HashMap<&str, (&str, Option<u32>)> = films_list
        .iter()
        .filter_map(|f| match (f.id.as_deref(), f.name.as_deref()) {
            (Some(id), Some(name)) => Some((id, (name, f.length))),
            _ => {
                debug!(venue, "ignoring film without id or name");
                None
            }
        })
        .collect();

    let mut out = Normalized::default();
    for event in schedule.events.unwrap_or_default() {
        let film_id = event.film_id.as_deref().unwrap_or_default();
        let Some(&(title, runtime_minutes)) = films.get(film_id) else {
            debug!(venue, film_id, "dropping event for unknown film");
            out.orphaned += 1;
            continue;
        };
        let raw_time = event.event_date_time.as_deref().unwrap_or_default();
        let Some(time) = local_time(raw_time, offset) else {
            debug!(venue, raw = raw_time, "dropping event with unparseable time");
            out.malformed += 1;
            continue;
        };
        out.screenings.push(Screening {
            venue: venue.to_string(),
            title: title.to_string(),
            runtime_minutes,
            time,
            tags: event.attribute_ids.unwrap_or_default(),
        });
    }
    out
}

/// Wall-clock "HH:MM" for an event timestamp.
///
/// Timestamps carrying an offset are converted to `offset`; naive ones are
/// already in venue-local time and are formatted unchanged.
pub fn local_time(raw: &str, offset: FixedOffset) -> Option<String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&offset).format("%H:%M").to_string());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.format("%H:%M").to_string())
}

/// Showtime source backed by the Cinema City "quickbook" data API.
pub struct CinemaCityClient {
    client: Client,
    url_template: String,
}

impl CinemaCityClient {
    pub fn new(url_template: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url_template,
        })
    }

    pub fn schedule_url(&self, venue: &str, date: NaiveDate) -> String {
        schedule_url(&self.url_template, venue, date)
    }
}

pub fn schedule_url(template: &str, venue: &str, date: NaiveDate) -> String {
    template
        .replace("{venue}", venue)
        .replace("{date}", &date.format("%Y-%m-%d").to_string())
}

#[async_trait::async_trait]
impl ShowtimeSource for CinemaCityClient {
    async fn fetch_schedule(&self, venue: &str, date: NaiveDate) -> Result<VenueSchedule> {
        let url = self.schedule_url(venue, date);
        let resp = self
            .client
            .get(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT, "application/json,text/javascript,*/*;q=0.1")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        VenueSchedule::from_json(&body)
    }
}
