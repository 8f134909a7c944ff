//! Output parsing — splits successful stdout into a human report and an
//! optional trailing structured dataset.
//!
//! The CLI emits a human-readable report, optionally followed by a blank
//! line and a JSON value when `--dataset` was passed. The boundary is found
//! by scanning from the end for the last `{`/`[` whose suffix parses as a
//! complete JSON value. `serde_json::from_str` rejects trailing garbage, so
//! an opener inside the real dataset never wins over the true boundary.

use crate::bridge::ParsedOutput;

/// Split stdout into report text and optional dataset.
///
/// Parse failure of a candidate segment never fails the response — the
/// gateway degrades to "no dataset" and returns the whole trimmed stdout as
/// the report. Same when `export_dataset` is false.
pub fn parse_output(stdout: &str, export_dataset: bool) -> ParsedOutput {
    let trimmed = stdout.trim();

    if !export_dataset {
        return ParsedOutput {
            report_text: trimmed.to_string(),
            dataset: None,
        };
    }

    if let Some((report, dataset)) = split_trailing_json(trimmed) {
        return ParsedOutput {
            report_text: report.trim().to_string(),
            dataset: Some(dataset),
        };
    }

    ParsedOutput {
        report_text: trimmed.to_string(),
        dataset: None,
    }
}

/// Find the last delimiter-balanced trailing segment that parses as JSON.
///
/// Candidates are `{` / `[` positions tried in reverse; the first suffix
/// that parses wholly wins, which is the latest possible boundary.
fn split_trailing_json(text: &str) -> Option<(&str, serde_json::Value)> {
    for (idx, ch) in text.char_indices().rev() {
        if ch != '{' && ch != '[' {
            continue;
        }
        let candidate = &text[idx..];
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(candidate) {
            return Some((&text[..idx], value));
        }
    }
    None
}
