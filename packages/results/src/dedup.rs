//! Most-recent-inspection-per-establishment filtering.

use std::collections::BTreeSet;

use atx_health_inspection_models::InspectionRecord;

/// Keeps only the latest inspection of each establishment.
///
/// Records are grouped by `establishment_id` (never by name: unrelated
/// restaurants can share one). The output is ordered by date, most recent
/// first. When an establishment has several inspections on its latest
/// date, the one that comes first in `records` is kept.
#[must_use]
pub fn filter_old_duplicates(records: &[InspectionRecord]) -> Vec<InspectionRecord> {
    let mut seen = BTreeSet::new();
    by_date_descending(records)
        .into_iter()
        .filter(|record| seen.insert(record.establishment_id.as_str()))
        .cloned()
        .collect()
}

/// Orders a full inspection history, most recent first, without dropping
/// anything. Same-day inspections keep their input order.
#[must_use]
pub fn sort_history(records: &[InspectionRecord]) -> Vec<InspectionRecord> {
    by_date_descending(records).into_iter().cloned().collect()
}

fn by_date_descending(records: &[InspectionRecord]) -> Vec<&InspectionRecord> {
    let mut sorted: Vec<&InspectionRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}
