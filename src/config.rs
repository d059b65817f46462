//! Run settings: upstream endpoints, timeouts, venue time zone and the
//! display tables. Loaded from an optional TOML file, every field defaulted.

use crate::labels::LabelTable;
use crate::{Error, Result};
use chrono::FixedOffset;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SHOWTIMES_URL: &str = "https://www.cinema-city.pl/pl/data-api-service/v1/quickbook/10103/film-events/in-cinema/{venue}/at-date/{date}";
pub const DEFAULT_OMDB_URL: &str = "https://www.omdbapi.com/";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// URL template with `{venue}` and `{date}` placeholders
    pub showtimes_url: String,
    pub omdb_url: String,
    pub omdb_api_key: Option<String>,
    pub request_timeout_secs: u64,
    /// Venue wall-clock offset, e.g. "+01:00"
    pub utc_offset: String,
    pub attribute_labels: BTreeMap<String, String>,
    pub venue_names: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            showtimes_url: DEFAULT_SHOWTIMES_URL.to_string(),
            omdb_url: DEFAULT_OMDB_URL.to_string(),
            omdb_api_key: None,
            request_timeout_secs: 10,
            utc_offset: "+00:00".to_string(),
            attribute_labels: BTreeMap::new(),
            venue_names: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Reads settings from `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                Self::from_toml_str(&content)
                    .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?
            }
            None => Self::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if !self.showtimes_url.contains("{venue}") {
            return Err(Error::Config(
                "showtimes_url must contain a {venue} placeholder".to_string(),
            ));
        }
        self.utc_offset()?;
        Ok(())
    }

    pub fn utc_offset(&self) -> Result<FixedOffset> {
        self.utc_offset
            .trim()
            .parse::<FixedOffset>()
            .map_err(|e| Error::Config(format!("invalid utc_offset {:?}: {e}", self.utc_offset)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Built-in attribute labels with the configured overrides applied.
    pub fn attribute_labels(&self) -> LabelTable {
        LabelTable::attribute_defaults().with_overrides(&self.attribute_labels)
    }

    pub fn venue_names(&self) -> LabelTable {
        LabelTable::new(self.venue_names.clone())
    }

    /// API key, ignoring blank values.
    pub fn omdb_api_key(&self) -> Option<&str> {
        self.omdb_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}
