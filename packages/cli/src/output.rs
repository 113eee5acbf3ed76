//! Text and JSON rendering of command results.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use atx_health_inspection_models::InspectionRecord;
use atx_health_results::group::CENTER_DISTANCE_METERS;
use atx_health_results::{CameraTarget, ProximityGroups};
use atx_health_socrata::registry::DatasetConfig;
use serde::Serialize;

use crate::CliError;

/// A record with its favorite flag, as emitted in JSON mode.
#[derive(Serialize)]
struct ListedRecord<'a> {
    #[serde(flatten)]
    record: &'a InspectionRecord,
    favorite: bool,
}

impl<'a> ListedRecord<'a> {
    fn new(record: &'a InspectionRecord, favorites: &BTreeSet<String>) -> Self {
        Self {
            record,
            favorite: favorites.contains(record.favorite_id()),
        }
    }
}

const fn star(favorite: bool) -> &'static str {
    if favorite { "★" } else { " " }
}

fn record_header() -> String {
    format!(
        "{:<2}{:>5}  {:<13} {:<32} {:<28} ESTABLISHMENT",
        "", "SCORE", "DATE", "NAME", "ADDRESS"
    )
}

fn record_line(listed: &ListedRecord<'_>) -> String {
    let r = listed.record;
    format!(
        "{:<2}{:>5}  {:<13} {:<32} {:<28} {}",
        star(listed.favorite),
        r.score,
        r.readable_date(),
        r.restaurant_name,
        r.address,
        r.establishment_id
    )
}

pub fn render_records(
    records: &[InspectionRecord],
    favorites: &BTreeSet<String>,
    json: bool,
) -> Result<String, CliError> {
    let listed: Vec<ListedRecord<'_>> = records
        .iter()
        .map(|r| ListedRecord::new(r, favorites))
        .collect();

    if json {
        return Ok(serde_json::to_string_pretty(&listed)?);
    }

    let mut out = record_header();
    for l in &listed {
        out.push('\n');
        out.push_str(&record_line(l));
    }
    let _ = write!(out, "\n\n{} inspection(s)", listed.len());
    Ok(out)
}

pub fn render_nearest(
    record: Option<&InspectionRecord>,
    favorites: &BTreeSet<String>,
    json: bool,
) -> Result<String, CliError> {
    let listed = record.map(|r| ListedRecord::new(r, favorites));

    if json {
        return Ok(serde_json::to_string_pretty(&listed)?);
    }

    Ok(match listed {
        Some(l) => format!("{}\n{}", record_header(), record_line(&l)),
        None => "No nearby inspection has a map location.".to_string(),
    })
}

pub fn render_groups(
    groups: &ProximityGroups,
    camera: Option<CameraTarget>,
    json: bool,
) -> Result<String, CliError> {
    if json {
        return Ok(serde_json::to_string_pretty(&serde_json::json!({
            "camera": camera,
            "groups": groups,
        }))?);
    }

    let mut out = match camera {
        None => return Ok("No nearby inspections have a map location.".to_string()),
        Some(CameraTarget::Center(c)) => format!(
            "Map: centered on {:.5}, {:.5} at {CENTER_DISTANCE_METERS:.0} m",
            c.latitude(),
            c.longitude()
        ),
        Some(CameraTarget::Overview) => format!("Map: overview of {} addresses", groups.len()),
    };

    for group in groups {
        let _ = write!(
            out,
            "\n\n{} ({:.5}, {:.5})",
            group.address,
            group.coordinate.latitude(),
            group.coordinate.longitude()
        );
        for summary in &group.data {
            let _ = write!(
                out,
                "\n  {:>5}  {:<13} {:<32} {}",
                summary.score,
                summary.date.format("%b %-d, %Y"),
                summary.name,
                summary.establishment_id
            );
        }
    }
    Ok(out)
}

pub fn render_favorites(favorites: &BTreeSet<String>, json: bool) -> Result<String, CliError> {
    if json {
        return Ok(serde_json::to_string_pretty(favorites)?);
    }
    if favorites.is_empty() {
        return Ok("No favorites yet.".to_string());
    }
    Ok(favorites
        .iter()
        .map(|id| format!("★ {id}"))
        .collect::<Vec<_>>()
        .join("\n"))
}

pub fn render_toggle(id: &str, is_favorite: bool, json: bool) -> Result<String, CliError> {
    if json {
        return Ok(serde_json::to_string_pretty(&serde_json::json!({
            "establishmentId": id,
            "favorite": is_favorite,
        }))?);
    }
    Ok(if is_favorite {
        format!("★ Added {id} to favorites")
    } else {
        format!("Removed {id} from favorites")
    })
}

pub fn print_datasets(datasets: &[DatasetConfig], json: bool) -> Result<(), CliError> {
    if json {
        let rows: Vec<serde_json::Value> = datasets
            .iter()
            .map(|d| {
                serde_json::json!({
                    "id": d.id,
                    "name": d.name,
                    "apiUrl": d.api_url,
                    "portalUrl": d.portal_url,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{:<12} NAME", "ID");
    for d in datasets {
        println!("{:<12} {}", d.id, d.name);
        println!("{:<12} {}", "", d.api_url);
    }
    Ok(())
}
