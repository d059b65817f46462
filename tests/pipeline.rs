use chrono::{FixedOffset, NaiveDate};
use cinema_showtimes::cinema_city::VenueSchedule;
use cinema_showtimes::omdb::OmdbResponse;
use cinema_showtimes::pipeline::{Pipeline, VenueStatus};
use cinema_showtimes::view::ViewRecord;
use cinema_showtimes::{
    Error, MetadataError, MetadataSource, Result, ShowtimeSource, TitleMetadata, VenueId,
};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct FakeCinemaCity {
    schedules: HashMap<String, String>,
    slow: BTreeSet<String>,
}

impl FakeCinemaCity {
    fn new() -> Self {
        Self {
            schedules: HashMap::new(),
            slow: BTreeSet::new(),
        }
    }

    fn venue(mut self, id: &str, body: serde_json::Value) -> Self {
        self.schedules.insert(id.to_string(), body.to_string());
        self
    }
}

#[async_trait::async_trait]
impl ShowtimeSource for FakeCinemaCity {
    async fn fetch_schedule(&self, venue: &str, _date: NaiveDate) -> Result<VenueSchedule> {
        if self.slow.contains(venue) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        match self.schedules.get(venue) {
            Some(body) => VenueSchedule::from_json(body),
            None => Err(Error::Status {
                url: format!("fake/{venue}"),
                status: 500,
            }),
        }
    }
}

#[derive(Default)]
struct FakeOmdb {
    answers: HashMap<String, serde_json::Value>,
    calls: Mutex<Vec<String>>,
}

impl FakeOmdb {
    fn answer(mut self, title: &str, body: serde_json::Value) -> Self {
        self.answers.insert(title.to_string(), body);
        self
    }
}

#[async_trait::async_trait]
impl MetadataSource for FakeOmdb {
    async fn lookup(&self, title: &str) -> Result<OmdbResponse> {
        self.calls.lock().unwrap().push(title.to_string());
        match self.answers.get(title) {
            Some(body) => Ok(serde_json::from_value(body.clone())?),
            None => Err(Error::Timeout(Duration::from_secs(10))),
        }
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn ids(venues: &[&str]) -> Vec<VenueId> {
    venues.iter().map(|v| v.to_string()).collect()
}

fn arkadia() -> serde_json::Value {
    json!({"body": {
        "films": [
            {"id": "5376s2r", "name": "Dune: Part Two", "length": 166},
            {"id": "7001o2r", "name": "Obscure Short"}
        ],
        "events": [
            {"filmId": "5376s2r", "eventDateTime": "2024-03-01T21:00:00", "attributeIds": ["2d", "sub-en"]},
            {"filmId": "5376s2r", "eventDateTime": "2024-03-01T09:30:00", "attributeIds": ["2d", "atmos"]},
            {"filmId": "7001o2r", "eventDateTime": "2024-03-01T17:45:00", "attributeIds": []},
            {"filmId": "ghost", "eventDateTime": "2024-03-01T12:00:00", "attributeIds": ["3d"]}
        ]
    }})
}

fn mokotow() -> serde_json::Value {
    json!({"body": {
        "films": [
            {"id": "9999x1", "name": "Dune: Part Two", "length": 166},
            {"id": "1234a", "name": "Anora", "length": 139}
        ],
        "events": [
            {"filmId": "9999x1", "eventDateTime": "2024-03-01T20:15:00", "attributeIds": ["imax", "sub-en"]},
            {"filmId": "1234a", "eventDateTime": "2024-03-01T19:00:00", "attributeIds": ["sub-pl"]}
        ]
    }})
}

fn omdb() -> FakeOmdb {
    FakeOmdb::default()
        .answer(
            "Dune: Part Two",
            json!({
                "Year": "2024",
                "Plot": "Paul Atreides unites with the Fremen.",
                "Poster": "https://img.example/dune2.jpg",
                "Ratings": [
                    {"Source": "Internet Movie Database", "Value": "8.5/10"},
                    {"Source": "Rotten Tomatoes", "Value": "92%"}
                ],
                "imdbRating": "8.5",
                "Response": "True"
            }),
        )
        .answer(
            "Obscure Short",
            json!({"Response": "False", "Error": "Movie not found!"}),
        )
}

fn pipeline(showtimes: FakeCinemaCity, metadata: Arc<FakeOmdb>) -> Pipeline {
    Pipeline::new(
        Arc::new(showtimes),
        Some(metadata as Arc<dyn MetadataSource>),
        FixedOffset::east_opt(0).unwrap(),
        Duration::from_secs(5),
    )
}

fn find<'a>(films: &'a [ViewRecord], title: &str) -> &'a ViewRecord {
    films.iter().find(|f| f.title == title).unwrap()
}

#[tokio::test]
async fn merges_venues_and_enriches_each_title_once() {
    let metadata = Arc::new(omdb());
    let showtimes = FakeCinemaCity::new()
        .venue("1088", arkadia())
        .venue("1097", mokotow());

    let report = pipeline(showtimes, metadata.clone())
        .run(&ids(&["1088", "1097"]), date())
        .await;

    let titles: Vec<&str> = report.films.iter().map(|f| f.title.as_str()).collect();
    assert_eq!(titles, vec!["Anora", "Dune: Part Two", "Obscure Short"]);

    let dune = find(&report.films, "Dune: Part Two");
    assert_eq!(dune.runtime_minutes, Some(166));
    assert_eq!(dune.venues.len(), 2);
    assert_eq!(dune.venues[0].venue_id, "1088");
    assert_eq!(dune.venues[0].times, vec!["09:30", "21:00"]);
    assert_eq!(dune.venues[1].venue_id, "1097");
    assert_eq!(dune.venues[1].times, vec!["20:15"]);

    let raw_tags: Vec<&str> = dune.format_tags.iter().map(|t| t.raw.as_str()).collect();
    assert_eq!(raw_tags, vec!["2d", "atmos", "sub-en", "imax"]);
    let labels: Vec<&str> = dune
        .format_tags
        .iter()
        .map(|t| t.display_label.as_str())
        .collect();
    assert_eq!(labels, vec!["2D", "atmos", "Subtitles: English", "IMAX"]);

    let TitleMetadata::Found(meta) = &dune.metadata else {
        panic!("expected metadata for Dune");
    };
    assert_eq!(meta.rotten_tomatoes_rating.as_deref(), Some("92%"));
    assert_eq!(meta.imdb_rating.as_deref(), Some("8.5"));

    let mut calls = metadata.calls.lock().unwrap().clone();
    calls.sort();
    assert_eq!(calls, vec!["Anora", "Dune: Part Two", "Obscure Short"]);
}

#[tokio::test]
async fn lookup_refusal_and_failure_keep_showtimes() {
    let showtimes = FakeCinemaCity::new()
        .venue("1088", arkadia())
        .venue("1097", mokotow());
    let report = pipeline(showtimes, Arc::new(omdb()))
        .run(&ids(&["1088", "1097"]), date())
        .await;

    let obscure = find(&report.films, "Obscure Short");
    assert_eq!(
        obscure.metadata,
        TitleMetadata::NotFound(MetadataError {
            message: "Movie not found!".to_string()
        })
    );
    assert_eq!(obscure.venues[0].times, vec!["17:45"]);

    // no answer configured for Anora: transport failure leaves it absent
    let anora = find(&report.films, "Anora");
    assert_eq!(anora.metadata, TitleMetadata::Absent);
    assert_eq!(anora.venues[0].times, vec!["19:00"]);
}

#[tokio::test]
async fn orphan_events_are_dropped_and_counted() {
    let showtimes = FakeCinemaCity::new().venue("1088", arkadia());
    let report = pipeline(showtimes, Arc::new(omdb()))
        .run(&ids(&["1088"]), date())
        .await;

    assert_eq!(
        report.venues[0].status,
        VenueStatus::Loaded {
            screenings: 3,
            orphaned: 1,
            malformed: 0,
        }
    );
    assert!(report
        .films
        .iter()
        .all(|f| f.format_tags.iter().all(|t| t.raw != "3d")));
}

#[tokio::test]
async fn failed_venue_is_skipped_and_reported() {
    let showtimes = FakeCinemaCity::new().venue("1097", mokotow());
    let report = pipeline(showtimes, Arc::new(omdb()))
        .run(&ids(&["1088", "1097"]), date())
        .await;

    assert!(matches!(report.venues[0].status, VenueStatus::Failed { .. }));
    assert_eq!(report.failed_venues().count(), 1);
    let titles: Vec<&str> = report.films.iter().map(|f| f.title.as_str()).collect();
    assert_eq!(titles, vec!["Anora", "Dune: Part Two"]);
    assert!(report.films.iter().all(|f| f.venues.iter().all(|v| v.venue_id == "1097")));
}

#[tokio::test]
async fn slow_venue_times_out_without_blocking_others() {
    let mut showtimes = FakeCinemaCity::new()
        .venue("1088", arkadia())
        .venue("1097", mokotow());
    showtimes.slow.insert("1088".to_string());

    let report = Pipeline::new(
        Arc::new(showtimes),
        None,
        FixedOffset::east_opt(0).unwrap(),
        Duration::from_millis(50),
    )
    .run(&ids(&["1088", "1097"]), date())
    .await;

    assert_eq!(
        report.venues[0].status,
        VenueStatus::Failed {
            reason: Error::Timeout(Duration::from_millis(50)).to_string()
        }
    );
    assert_eq!(report.films.len(), 2);
    assert!(report.films.iter().all(|f| f.metadata == TitleMetadata::Absent));
}

#[tokio::test]
async fn venue_order_does_not_change_titles_or_slots() {
    let run = |order: Vec<VenueId>| async move {
        let showtimes = FakeCinemaCity::new()
            .venue("1088", arkadia())
            .venue("1097", mokotow());
        pipeline(showtimes, Arc::new(omdb())).run(&order, date()).await
    };

    let forward = run(ids(&["1088", "1097"])).await;
    let backward = run(ids(&["1097", "1088"])).await;

    let slots = |films: &[ViewRecord]| -> BTreeMap<(String, String), Vec<String>> {
        films
            .iter()
            .flat_map(|f| {
                f.venues
                    .iter()
                    .map(move |v| ((f.title.clone(), v.venue_id.clone()), v.times.clone()))
            })
            .collect()
    };

    assert_eq!(slots(&forward.films), slots(&backward.films));
    assert_eq!(forward.films.len(), backward.films.len());
}

#[tokio::test]
async fn identical_inputs_render_identically() {
    let render = || async {
        let showtimes = FakeCinemaCity::new()
            .venue("1088", arkadia())
            .venue("1097", mokotow());
        let report = pipeline(showtimes, Arc::new(omdb()))
            .run(&ids(&["1088", "1097"]), date())
            .await;
        cinema_showtimes::render::to_json(&report).unwrap()
    };

    assert_eq!(render().await, render().await);
}

#[tokio::test]
async fn duplicate_venue_ids_contribute_once() {
    let showtimes = FakeCinemaCity::new().venue("1088", arkadia());
    let report = pipeline(showtimes, Arc::new(omdb()))
        .run(&ids(&["1088", " 1088", ""]), date())
        .await;

    assert_eq!(report.venues.len(), 1);
    let dune = find(&report.films, "Dune: Part Two");
    assert_eq!(dune.venues.len(), 1);
    assert_eq!(dune.venues[0].times, vec!["09:30", "21:00"]);
}
