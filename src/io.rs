// Module for loading the fighter statistics file. It reads the csv, checks the required headers,
// and normalizes missing cells to the placeholder token.
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::LoadError;

/// Token that stands in for every missing text cell.
pub const PLACEHOLDER: &str = "-";

/// Columns the loader cannot work without. Any others are ignored.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "name",
    "nickname",
    "significant_striking_accuracy",
    "takedown_accuracy",
    "stance",
    "date_of_birth",
];

/// One csv row exactly as it was read; every cell may be absent.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "name")]     name: Option<String>,
    #[serde(rename = "nickname")] nickname: Option<String>,
    #[serde(rename = "significant_striking_accuracy")]
                                  significant_striking_accuracy: Option<String>,
    #[serde(rename = "takedown_accuracy")]
                                  takedown_accuracy: Option<String>,
    #[serde(rename = "stance")]   stance: Option<String>,
    #[serde(rename = "date_of_birth")]
                                  date_of_birth: Option<String>,
}

/// A fighter row after missing cells were replaced by [`PLACEHOLDER`].
#[derive(Debug, Clone, PartialEq)]
pub struct FighterRecord {
    pub name: String,
    pub nickname: String,
    /// Percentage 0-100; `None` when the cell was missing or not a number.
    pub significant_striking_accuracy: Option<f64>,
    pub takedown_accuracy: Option<f64>,
    pub stance: String,
    pub date_of_birth: String,
}

impl FighterRecord {
    /// Builds a record from text cells, applying the same normalization as the loader.
    pub fn new(
        name: &str,
        nickname: &str,
        striking: &str,
        takedown: &str,
        stance: &str,
        date_of_birth: &str,
    ) -> Self {
        let cell = |s: &str| Some(s.to_string());
        Self::from_raw(RawRow {
            name: cell(name),
            nickname: cell(nickname),
            significant_striking_accuracy: cell(striking),
            takedown_accuracy: cell(takedown),
            stance: cell(stance),
            date_of_birth: cell(date_of_birth),
        })
    }

    fn from_raw(raw: RawRow) -> Self {
        Self {
            name: text_or_placeholder(raw.name),
            nickname: text_or_placeholder(raw.nickname),
            significant_striking_accuracy: parse_percentage(raw.significant_striking_accuracy),
            takedown_accuracy: parse_percentage(raw.takedown_accuracy),
            stance: text_or_placeholder(raw.stance),
            date_of_birth: text_or_placeholder(raw.date_of_birth),
        }
    }
}

fn text_or_placeholder(cell: Option<String>) -> String {
    match cell {
        Some(s) if !s.trim().is_empty() => s,
        _ => PLACEHOLDER.to_string(),
    }
}

fn parse_percentage(cell: Option<String>) -> Option<f64> {
    let text = cell?;
    let text = text.trim();
    if text.is_empty() || text == PLACEHOLDER {
        return None;
    }
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            debug!("treating non-numeric accuracy {:?} as missing", text);
            None
        }
    }
}

/// Loads every usable row from the csv file at `path`.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<FighterRecord>, LoadError> {
    let file = File::open(path.as_ref())?;
    load_csv_from_reader(file)
}

/// Same as [`load_csv`] but over any reader.
pub fn load_csv_from_reader<R: Read>(reader: R) -> Result<Vec<FighterRecord>, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b',')
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    // Grab and own the header row, trimmed so deserialization sees the same names
    let headers: StringRecord = rdr.headers()?.iter().map(str::trim).collect();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn(column));
        }
    }
    let expected_len = headers.len();

    let mut out = Vec::new();
    for result in rdr.records() {
        let raw: StringRecord = result?;
        let line = raw.position().map(|p| p.line()).unwrap_or(0);

        if raw.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        if raw.len() != expected_len {
            warn!(
                "skipping line {}: expected {} fields, found {}",
                line,
                expected_len,
                raw.len()
            );
            continue;
        }

        // Every field is optional text, so this only fails on broken encodings.
        match raw.deserialize::<RawRow>(Some(&headers)) {
            Ok(row) => out.push(FighterRecord::from_raw(row)),
            Err(e) => warn!("skipping malformed record at line {}: {}", line, e),
        }
    }

    debug!("loaded {} fighter rows", out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "name,nickname,wins,significant_striking_accuracy,takedown_accuracy,stance,date_of_birth";

    #[test]
    fn missing_cells_become_placeholders() {
        let data = format!("{HEADER}\nA,,10,55.0,,,\n");
        let recs = load_csv_from_reader(data.as_bytes()).unwrap();
        assert_eq!(recs.len(), 1);
        let r = &recs[0];
        assert_eq!(r.name, "A");
        assert_eq!(r.nickname, PLACEHOLDER);
        assert_eq!(r.significant_striking_accuracy, Some(55.0));
        assert_eq!(r.takedown_accuracy, None);
        assert_eq!(r.stance, PLACEHOLDER);
        assert_eq!(r.date_of_birth, PLACEHOLDER);
    }

    #[test]
    fn short_and_blank_lines_are_skipped() {
        let data = format!("{HEADER}\nA,x,1,50,50,Orthodox,1990-01-01\n,,,,,,\nB,y\n");
        let recs = load_csv_from_reader(data.as_bytes()).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].name, "A");
    }

    #[test]
    fn padded_headers_still_map_to_fields() {
        let data = "name, nickname , significant_striking_accuracy,takedown_accuracy ,stance,date_of_birth\n\
                    Jon Jones,Bones,58,45,Orthodox,1987-07-19\n";
        let recs = load_csv_from_reader(data.as_bytes()).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].nickname, "Bones");
        assert_eq!(recs[0].significant_striking_accuracy, Some(58.0));
        assert_eq!(recs[0].takedown_accuracy, Some(45.0));
    }

    #[test]
    fn missing_required_column_is_reported() {
        let data = "name,nickname,stance\nA,b,Orthodox\n";
        let err = load_csv_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("significant_striking_accuracy")));
    }

    #[test]
    fn non_numeric_accuracy_is_missing() {
        let r = FighterRecord::new("A", "", "n/a", "-", "Orthodox", "1990-01-01");
        assert_eq!(r.significant_striking_accuracy, None);
        assert_eq!(r.takedown_accuracy, None);
        assert_eq!(r.nickname, PLACEHOLDER);
    }
}
