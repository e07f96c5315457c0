//! CSV export of record sequences.
//!
//! # Responsibility
//! - Serialize a full list or one shard back to comma-separated text.
//! - Derive download filenames for both export kinds.
//!
//! # Invariants
//! - Column order is fixed: `firstName, phone, notes`.
//! - The header row is always emitted, even for zero records.
//! - Empty fields serialize as empty, never as a literal null marker.

use crate::model::list::Record;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Fixed export column order.
pub const EXPORT_COLUMNS: [&str; 3] = ["firstName", "phone", "notes"];

/// Export serialization failure.
///
/// Writing into an in-memory buffer cannot fail in practice; the type exists
/// so callers can propagate with `?` instead of masking the writer API.
#[derive(Debug)]
pub enum ExportError {
    Csv(csv::Error),
    NonUtf8Output,
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "csv export failed: {err}"),
            Self::NonUtf8Output => write!(f, "csv export produced non-utf8 output"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            Self::NonUtf8Output => None,
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

/// Serializes records to comma-separated text with the fixed header.
///
/// Values containing the delimiter, quotes, or line breaks are quoted per
/// standard CSV rules by the writer.
pub fn records_to_csv(records: &[Record]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(EXPORT_COLUMNS)?;
    for record in records {
        writer.write_record([
            record.first_name.as_str(),
            record.phone.as_str(),
            record.notes.as_str(),
        ])?;
    }

    let buffer = writer
        .into_inner()
        .map_err(|err| ExportError::Csv(err.into_error().into()))?;
    String::from_utf8(buffer).map_err(|_| ExportError::NonUtf8Output)
}

/// Download filename for a full-list export: the original uploaded filename.
pub fn list_export_file_name(original_name: &str) -> String {
    original_name.to_string()
}

/// Download filename for a shard export: `{agentName}-{originalFilename}`,
/// with whitespace runs in the agent name collapsed to `_`.
pub fn shard_export_file_name(agent_display_name: &str, original_name: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(agent_display_name.trim(), "_");
    format!("{collapsed}-{original_name}")
}

#[cfg(test)]
mod tests {
    use super::{list_export_file_name, records_to_csv, shard_export_file_name};
    use crate::model::list::Record;

    #[test]
    fn header_is_emitted_for_zero_records() {
        let csv = records_to_csv(&[]).unwrap();
        assert_eq!(csv, "firstName,phone,notes\n");
    }

    #[test]
    fn values_with_delimiters_are_quoted() {
        let records = vec![Record::new("Ann, Jr.", "555", "line1\nline2")];
        let csv = records_to_csv(&records).unwrap();
        assert!(csv.contains("\"Ann, Jr.\""));
        assert!(csv.contains("\"line1\nline2\""));
    }

    #[test]
    fn empty_fields_stay_empty() {
        let records = vec![Record::default()];
        let csv = records_to_csv(&records).unwrap();
        assert_eq!(csv, "firstName,phone,notes\n,,\n");
    }

    #[test]
    fn shard_file_name_collapses_whitespace() {
        assert_eq!(
            shard_export_file_name("Mary  Jane \t Smith", "leads.csv"),
            "Mary_Jane_Smith-leads.csv"
        );
        assert_eq!(list_export_file_name("leads.csv"), "leads.csv");
    }
}
