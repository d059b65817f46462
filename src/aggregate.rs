//! Title aggregation: folds per-venue screenings into one record per title.
//!
//! The title string is the only identity. Film ids are scoped to a single
//! venue response, so two venues reporting the same title are merged even
//! when their ids differ.

use crate::{Screening, TitleMetadata, VenueId};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeslot {
    pub time: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedTitle {
    pub title: String,
    pub runtime_minutes: Option<u32>,
    /// Slots in the order they were received, per venue
    pub timeslots_by_venue: BTreeMap<VenueId, Vec<Timeslot>>,
    pub metadata: TitleMetadata,
}

impl AggregatedTitle {
    fn new(title: String, runtime_minutes: Option<u32>) -> Self {
        Self {
            title,
            runtime_minutes,
            timeslots_by_venue: BTreeMap::new(),
            metadata: TitleMetadata::Absent,
        }
    }
}

/// Fold state: every title seen so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    titles: BTreeMap<String, AggregatedTitle>,
}

impl Aggregation {
    /// Adds one screening, creating its title on first sight.
    pub fn merge(mut self, screening: Screening) -> Self {
        let Screening {
            venue,
            title,
            runtime_minutes,
            time,
            tags,
        } = screening;

        // runtime comes from the first occurrence only, even when absent there
        self.titles
            .entry(title)
            .or_insert_with_key(|title| AggregatedTitle::new(title.clone(), runtime_minutes))
            .timeslots_by_venue
            .entry(venue)
            .or_default()
            .push(Timeslot { time, tags });
        self
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.titles.keys().map(String::as_str)
    }

    pub fn get(&self, title: &str) -> Option<&AggregatedTitle> {
        self.titles.get(title)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Replaces the metadata of `title`. Unknown titles are ignored.
    pub fn attach(&mut self, title: &str, metadata: TitleMetadata) {
        if let Some(record) = self.titles.get_mut(title) {
            record.metadata = metadata;
        }
    }

    /// Records in ascending (byte-wise) title order.
    pub fn records(&self) -> impl Iterator<Item = &AggregatedTitle> {
        self.titles.values()
    }
}

pub fn aggregate<I>(screenings: I) -> Aggregation
where
    I: IntoIterator<Item = Screening>,
{
    screenings
        .into_iter()
        .fold(Aggregation::default(), Aggregation::merge)
}
