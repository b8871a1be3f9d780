//! Tabular export of terminal batch results.

use crate::label::BatchSnapshot;

const HEADER: &[&str] = &[
    "batch_id",
    "label_id",
    "label_name",
    "beverage_type",
    "overall_status",
    "field_name",
    "field_status",
    "extracted_value",
    "found_on_image",
    "failure_reason",
    "citation",
    "images_processed",
];

/// Flattens a snapshot into CSV, one row per field result.
pub fn snapshot_to_csv(snapshot: &BatchSnapshot) -> String {
    let mut out = String::new();
    push_row(&mut out, HEADER.iter().map(|s| s.to_string()));

    for result in &snapshot.results {
        for field in &result.fields {
            let status = serde_json::to_value(field.status)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            push_row(
                &mut out,
                [
                    snapshot.batch_id.clone(),
                    result.label_id.clone(),
                    result.label_name.clone(),
                    result.beverage_type.to_string(),
                    result.overall_status.to_string(),
                    field.field_name.clone(),
                    status,
                    field.extracted_value.clone().unwrap_or_default(),
                    field
                        .found_on_image
                        .map(|i| i.to_string())
                        .unwrap_or_default(),
                    field.failure_reason.clone().unwrap_or_default(),
                    field.citation.clone().unwrap_or_default(),
                    result.images_processed.to_string(),
                ]
                .into_iter(),
            );
        }
    }

    out
}

fn push_row(out: &mut String, cells: impl Iterator<Item = String>) {
    let row = cells.map(|c| escape(&c)).collect::<Vec<_>>().join(",");
    out.push_str(&row);
    out.push_str("\r\n");
}

fn escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
