//! Tabular decoding of uploaded spreadsheets.
//!
//! # Responsibility
//! - Turn a raw byte stream plus a declared format into ordered rows of
//!   header -> cell mappings, preserving header spelling literally.
//! - Keep parsing permissive: short rows pad with empty cells, long rows
//!   truncate to the header width, fully-empty rows are skipped.
//!
//! # Invariants
//! - Decoding is a pure transform over the byte stream; no side effects.
//! - Format resolution happens before any byte is parsed.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Cursor;

pub mod normalize;

/// Declared source format of an uploaded file, resolved from the original
/// filename extension (case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-separated text.
    Csv,
    /// OOXML spreadsheet workbook.
    Xlsx,
    /// Legacy binary spreadsheet workbook.
    Xls,
}

impl SourceFormat {
    /// Resolves the format from a filename, or `None` for anything outside
    /// the three supported kinds.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let extension = name.rsplit_once('.').map(|(_, ext)| ext)?;
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
        }
    }
}

impl Display for SourceFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// One decoded data row: column header as it literally appears in row 1,
/// paired with the cell value, in source column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    columns: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(columns: Vec<(String, String)>) -> Self {
        Self { columns }
    }

    /// Case-sensitive exact lookup; first occurrence wins when the source
    /// carried duplicate headers.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| name == header)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> &[(String, String)] {
        &self.columns
    }
}

/// Decoding failure for a declared source format.
#[derive(Debug)]
pub enum DecodeError {
    /// Byte stream did not parse as comma-separated text.
    Csv(csv::Error),
    /// Byte stream did not parse as a spreadsheet workbook.
    Workbook(calamine::Error),
    /// Workbook parsed but contains no sheet to read.
    MissingSheet,
    /// Declared format is not one of the supported kinds. Raised before any
    /// parsing; reaching it past upload validation is an internal fault.
    UnsupportedFormat(String),
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "csv decode failed: {err}"),
            Self::Workbook(err) => write!(f, "workbook decode failed: {err}"),
            Self::MissingSheet => write!(f, "workbook contains no readable sheet"),
            Self::UnsupportedFormat(name) => write!(f, "unsupported source format: `{name}`"),
        }
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            Self::Workbook(err) => Some(err),
            Self::MissingSheet | Self::UnsupportedFormat(_) => None,
        }
    }
}

impl From<csv::Error> for DecodeError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<calamine::Error> for DecodeError {
    fn from(value: calamine::Error) -> Self {
        Self::Workbook(value)
    }
}

/// Decodes a byte stream using a format resolved from the filename.
///
/// # Errors
/// - `UnsupportedFormat` when the extension is not csv/xlsx/xls, raised
///   before any parsing is attempted.
pub fn decode_named(bytes: &[u8], file_name: &str) -> Result<Vec<RawRow>, DecodeError> {
    let format = SourceFormat::from_file_name(file_name)
        .ok_or_else(|| DecodeError::UnsupportedFormat(file_name.to_string()))?;
    decode(bytes, format)
}

/// Decodes a byte stream with an explicitly declared format.
///
/// Row 1 is the header; every later row maps positionally onto it.
pub fn decode(bytes: &[u8], format: SourceFormat) -> Result<Vec<RawRow>, DecodeError> {
    match format {
        SourceFormat::Csv => decode_csv(bytes),
        SourceFormat::Xlsx | SourceFormat::Xls => decode_workbook(bytes),
    }
}

fn decode_csv(bytes: &[u8]) -> Result<Vec<RawRow>, DecodeError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for entry in reader.records() {
        let record = entry?;
        let cells: Vec<String> = record.iter().map(str::to_string).collect();

        if let Some(header_row) = headers.as_deref() {
            if let Some(row) = zip_row(header_row, &cells) {
                rows.push(row);
            }
        } else {
            headers = Some(cells);
        }
    }

    Ok(rows)
}

fn decode_workbook(bytes: &[u8]) -> Result<Vec<RawRow>, DecodeError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    // Only the first sheet of the workbook is read.
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DecodeError::MissingSheet)??;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(header_row) => header_row.iter().map(cell_to_string).collect(),
        None => return Ok(Vec::new()),
    };

    let mut rows = Vec::new();
    for sheet_row in sheet_rows {
        let cells: Vec<String> = sheet_row.iter().map(cell_to_string).collect();
        if let Some(row) = zip_row(&headers, &cells) {
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Maps one data row onto the header positionally. Missing trailing cells
/// become empty strings, surplus cells are dropped. Returns `None` for rows
/// whose cells are all empty.
fn zip_row(headers: &[String], cells: &[String]) -> Option<RawRow> {
    if cells.iter().all(|cell| cell.is_empty()) {
        return None;
    }

    let columns = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let value = cells.get(index).cloned().unwrap_or_default();
            (header.clone(), value)
        })
        .collect();

    Some(RawRow::new(columns))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        Data::Float(value) => {
            // Spreadsheet numerics arrive as floats; render integral values
            // without a trailing fraction so phone-like columns stay clean.
            if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
                format!("{}", *value as i64)
            } else {
                value.to_string()
            }
        }
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => value.as_f64().to_string(),
        Data::DateTimeIso(value) | Data::DurationIso(value) => value.clone(),
        Data::Error(err) => format!("{err:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{SourceFormat, RawRow};

    #[test]
    fn format_resolution_is_case_insensitive_and_strict() {
        assert_eq!(
            SourceFormat::from_file_name("leads.CSV"),
            Some(SourceFormat::Csv)
        );
        assert_eq!(
            SourceFormat::from_file_name("book.xlsx"),
            Some(SourceFormat::Xlsx)
        );
        assert_eq!(
            SourceFormat::from_file_name("legacy.XLS"),
            Some(SourceFormat::Xls)
        );
        assert_eq!(SourceFormat::from_file_name("notes.txt"), None);
        assert_eq!(SourceFormat::from_file_name("no_extension"), None);
    }

    #[test]
    fn raw_row_lookup_is_exact_and_first_wins() {
        let row = RawRow::new(vec![
            ("Phone".to_string(), "111".to_string()),
            ("Phone".to_string(), "222".to_string()),
        ]);
        assert_eq!(row.get("Phone"), Some("111"));
        assert_eq!(row.get("phone"), None);
    }
}
