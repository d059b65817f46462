//! Plain renderers of a run report for the command line.

use crate::pipeline::RunReport;
use crate::{Result, TitleMetadata};

pub fn to_json(report: &RunReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Card-like listing, one block per film.
pub fn to_text(report: &RunReport) -> String {
    let mut out = String::new();
    if report.films.is_empty() {
        out.push_str("No showtimes found.\n");
    }

    for film in &report.films {
        out.push_str(&format!("{}\n", film.title));
        if let Some(length) = film.runtime_minutes {
            out.push_str(&format!("  Length: {} mins\n", length));
        }
        match &film.metadata {
            TitleMetadata::Found(meta) => {
                out.push_str(&format!(
                    "  IMDb: {}, RT: {}\n",
                    meta.imdb_display(),
                    meta.rotten_tomatoes_display()
                ));
                if let Some(ref year) = meta.year {
                    out.push_str(&format!("  Year: {}\n", year));
                }
                if let Some(ref plot) = meta.plot {
                    out.push_str(&format!("  Plot: {}\n", plot));
                }
            }
            TitleMetadata::NotFound(err) => {
                out.push_str(&format!("  OMDb Error: {}\n", err.message));
            }
            TitleMetadata::Absent => {}
        }
        for venue in &film.venues {
            out.push_str(&format!("  {}\n", venue.heading()));
            for slot in &venue.slots {
                if slot.tags.is_empty() {
                    out.push_str(&format!("    {}\n", slot.time));
                } else {
                    out.push_str(&format!("    {} ({})\n", slot.time, slot.tags.join(", ")));
                }
            }
        }
        out.push('\n');
    }

    for venue in report.failed_venues() {
        out.push_str(&format!("Cinema {} could not be loaded\n", venue.venue_id));
    }
    out
}
