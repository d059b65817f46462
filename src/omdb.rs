//! OMDb metadata lookups.

use crate::{Error, Metadata, MetadataError, MetadataSource, Result, TitleMetadata};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const ROTTEN_TOMATOES: &str = "Rotten Tomatoes";
const NOT_AVAILABLE: &str = "N/A";

/// Raw OMDb answer. Either `Response: "True"` with the film fields, or
/// `Response: "False"` with an `Error` message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OmdbResponse {
    #[serde(rename = "Response", default)]
    pub response: Option<String>,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: Option<String>,
    #[serde(rename = "Ratings", default)]
    pub ratings: Option<Vec<OmdbRating>>,
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
    #[serde(rename = "Plot", default)]
    pub plot: Option<String>,
    #[serde(rename = "Poster", default)]
    pub poster: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OmdbRating {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl OmdbResponse {
    pub fn is_success(&self) -> bool {
        self.response
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case("true"))
    }

    /// The source explicitly answered "no match" (or refused the request).
    pub fn is_refusal(&self) -> bool {
        self.response
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case("false"))
    }
}

/// OMDb uses the literal "N/A" for unknown fields.
fn available(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != NOT_AVAILABLE)
}

fn numeric_rating(value: Option<String>) -> Option<String> {
    available(value).filter(|v| v.parse::<f32>().is_ok())
}

/// First rating whose source is Rotten Tomatoes.
pub fn rotten_tomatoes_rating(ratings: &[OmdbRating]) -> Option<String> {
    ratings
        .iter()
        .find(|r| r.source == ROTTEN_TOMATOES)
        .map(|r| r.value.clone())
}

/// Turns an OMDb answer into the metadata attached to a title.
///
/// Bodies that are neither `Response: "True"` nor `Response: "False"` are not
/// OMDb answers and come back as an error.
pub fn interpret(resp: OmdbResponse) -> Result<TitleMetadata> {
    if resp.is_refusal() {
        let message = resp
            .error
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "Unknown error".to_string());
        return Ok(TitleMetadata::NotFound(MetadataError { message }));
    }
    if !resp.is_success() {
        return Err(Error::UnexpectedResponse(format!(
            "Response field is {:?}",
            resp.response
        )));
    }

    let rotten_tomatoes_rating = resp
        .ratings
        .as_deref()
        .and_then(rotten_tomatoes_rating);

    Ok(TitleMetadata::Found(Metadata {
        imdb_rating: numeric_rating(resp.imdb_rating),
        rotten_tomatoes_rating,
        year: available(resp.year),
        plot: available(resp.plot),
        poster_url: available(resp.poster),
    }))
}

pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }
}

#[async_trait::async_trait]
impl MetadataSource for OmdbClient {
    async fn lookup(&self, title: &str) -> Result<OmdbResponse> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("apikey", self.api_key.as_str()), ("t", title)])
            .send()
            .await?;

        // OMDb reports refusals (bad key, unknown title) as JSON with
        // Response "False", sometimes alongside a 4xx status. Any other
        // non-success answer is an outage.
        let status = resp.status();
        let body = resp.text().await?;
        match serde_json::from_str::<OmdbResponse>(&body) {
            Ok(parsed) if status.is_success() || parsed.is_refusal() => Ok(parsed),
            Err(e) if status.is_success() => Err(e.into()),
            _ => Err(Error::Status {
                url: self.base_url.clone(),
                status: status.as_u16(),
            }),
        }
    }
}
