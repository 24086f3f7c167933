//! CSV export of registrations.

use std::borrow::Cow;

use crate::models::registration::Registration;

pub const HEADER: [&str; 4] = ["Name", "IITP No", "Organization", "Submission Time"];

/// Quote a field that contains a comma, quote or line break, doubling
/// embedded quotes. Other fields pass through untouched.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn row<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    fields
        .into_iter()
        .map(escape_field)
        .collect::<Vec<_>>()
        .join(",")
}

/// Render registrations as CSV: fixed header, one row per registration,
/// rows joined with CRLF. Returns `None` for an empty list so callers can
/// skip the download.
pub fn registrations_to_csv(registrations: &[Registration]) -> Option<String> {
    if registrations.is_empty() {
        log::warn!("No registrations to export");
        return None;
    }
    let mut lines = Vec::with_capacity(registrations.len() + 1);
    lines.push(row(HEADER));
    for r in registrations {
        lines.push(row([
            r.name.as_str(),
            r.iitp_no.as_str(),
            r.organization.as_str(),
            r.submission_time.as_str(),
        ]));
    }
    Some(lines.join("\r\n"))
}

/// Download file name derived from a label: lowercase ASCII alphanumerics
/// with single dashes, e.g. `"Batch 7 / March"` -> `batch-7-march.csv`.
pub fn csv_filename(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "registrations.csv".to_string()
    } else {
        format!("{slug}.csv")
    }
}
