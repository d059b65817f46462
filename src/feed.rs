use crate::Result;
use crate::TitleMetadata;
use crate::pipeline::RunReport;
use crate::view::ViewRecord;
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder};

/// HTML description for one film: runtime, ratings, plot, times, poster.
fn describe(film: &ViewRecord) -> String {
    let mut description_parts = Vec::new();

    if let Some(length) = film.runtime_minutes {
        description_parts.push(format!("Length: {} mins", length));
    }

    match &film.metadata {
        TitleMetadata::Found(meta) => {
            description_parts.push(format!(
                "IMDb: {}, RT: {}",
                meta.imdb_display(),
                meta.rotten_tomatoes_display()
            ));
            if let Some(ref year) = meta.year {
                description_parts.push(format!("Year: {}", year));
            }
            if let Some(ref plot) = meta.plot {
                description_parts.push(format!("Plot: {}", plot));
            }
        }
        TitleMetadata::NotFound(err) => {
            description_parts.push(format!("OMDb Error: {}", err.message));
        }
        TitleMetadata::Absent => {}
    }

    if !film.format_tags.is_empty() {
        let labels: Vec<&str> = film
            .format_tags
            .iter()
            .map(|t| t.display_label.as_str())
            .collect();
        description_parts.push(format!("Formats: {}", labels.join(", ")));
    }

    for venue in &film.venues {
        description_parts.push(format!("{}: {}", venue.heading(), venue.times.join(", ")));
    }

    if let TitleMetadata::Found(meta) = &film.metadata
        && let Some(ref poster) = meta.poster_url
    {
        description_parts.push(format!(
            "<img src=\"{}\" alt=\"{} Poster\" />",
            poster, film.title
        ));
    }

    description_parts.join("<br/>\n")
}

/// One RSS channel for the run, one item per film.
pub fn generate_rss(report: &RunReport, channel_link: &str) -> Result<String> {
    let date = report.date.format("%Y-%m-%d").to_string();
    let items: Vec<_> = report
        .films
        .iter()
        .map(|film| {
            let guid = GuidBuilder::default()
                .value(format!("{}#{}", date, film.title))
                .permalink(false)
                .build();
            ItemBuilder::default()
                .title(film.title.clone())
                .description(describe(film))
                .guid(guid)
                .build()
        })
        .collect();

    let channel = ChannelBuilder::default()
        .title(format!("Showtimes for {}", date))
        .link(channel_link)
        .description(format!("{} films across {} venues", report.films.len(), report.venues.len()))
        .items(items)
        .build();

    let mut buf = Vec::new();
    channel.write_to(&mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
}
