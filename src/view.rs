//! Presentation-ready view records built from an enriched aggregation.

use crate::aggregate::{AggregatedTitle, Aggregation, Timeslot};
use crate::labels::LabelTable;
use crate::{TitleMetadata, VenueId};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRecord {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_minutes: Option<u32>,
    pub metadata: TitleMetadata,
    pub venues: Vec<VenueView>,
    pub format_tags: Vec<FormatTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueView {
    pub venue_id: VenueId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub times: Vec<String>,
    pub slots: Vec<SlotView>,
}

impl VenueView {
    /// Display name, falling back to "Cinema <id>".
    pub fn heading(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| format!("Cinema {}", self.venue_id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotView {
    pub time: String,
    /// Display labels of the slot's attribute tags
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatTag {
    pub raw: String,
    pub display_label: String,
}

/// Builds one record per title, in ascending title order.
///
/// Venues appear in `venue_order`; venues missing from it (which a pipeline
/// run never produces) follow in id order.
pub fn build_view(
    aggregation: &Aggregation,
    venue_order: &[VenueId],
    attribute_labels: &LabelTable,
    venue_names: &LabelTable,
) -> Vec<ViewRecord> {
    aggregation
        .records()
        .map(|record| build_record(record, venue_order, attribute_labels, venue_names))
        .collect()
}

fn build_record(
    record: &AggregatedTitle,
    venue_order: &[VenueId],
    attribute_labels: &LabelTable,
    venue_names: &LabelTable,
) -> ViewRecord {
    let ordered_venues = venue_order
        .iter()
        .filter(|v| record.timeslots_by_venue.contains_key(v.as_str()))
        .chain(
            record
                .timeslots_by_venue
                .keys()
                .filter(|v| !venue_order.contains(*v)),
        );

    let mut venues = Vec::new();
    for venue in ordered_venues {
        let slots = sorted_slots(&record.timeslots_by_venue[venue]);
        if slots.is_empty() {
            continue;
        }
        venues.push((venue, slots));
    }

    let mut seen = HashSet::new();
    let format_tags = venues
        .iter()
        .flat_map(|(_, slots)| slots.iter())
        .flat_map(|slot| slot.tags.iter())
        .filter(|tag| seen.insert(tag.as_str()))
        .map(|tag| FormatTag {
            raw: tag.clone(),
            display_label: attribute_labels.label(tag).to_string(),
        })
        .collect();

    let venues = venues
        .into_iter()
        .map(|(venue, slots)| VenueView {
            venue_id: venue.clone(),
            display_name: venue_names.get(venue).map(str::to_string),
            times: slots.iter().map(|s| s.time.clone()).collect(),
            slots: slots
                .iter()
                .map(|s| SlotView {
                    time: s.time.clone(),
                    tags: s
                        .tags
                        .iter()
                        .map(|t| attribute_labels.label(t).to_string())
                        .collect(),
                })
                .collect(),
        })
        .collect();

    ViewRecord {
        title: record.title.clone(),
        runtime_minutes: record.runtime_minutes,
        metadata: record.metadata.clone(),
        venues,
        format_tags,
    }
}

/// Stable ascending sort on zero-padded "HH:MM".
fn sorted_slots(slots: &[Timeslot]) -> Vec<&Timeslot> {
    let mut sorted: Vec<&Timeslot> = slots.iter().collect();
    sorted.sort_by(|a, b| a.time.cmp(&b.time));
    sorted
}
