//! Record normalization over decoded rows.
//!
//! # Responsibility
//! - Map heterogeneous column spellings onto the canonical record shape.
//!
//! # Invariants
//! - Normalization is total: every decoded row yields exactly one record,
//!   even when all three canonical fields are absent.
//! - Alias candidates are evaluated in fixed priority order, exact match
//!   only; unrecognized columns are dropped silently.

use super::RawRow;
use crate::model::list::Record;

/// Accepted header spellings per canonical field, in priority order.
/// `firstName` trails the historical variants so that engine exports decode
/// back without loss.
const FIRST_NAME_ALIASES: &[&str] = &["FirstName", "firstname", "FIRSTNAME", "firstName"];
const PHONE_ALIASES: &[&str] = &["Phone", "phone", "PHONE"];
const NOTES_ALIASES: &[&str] = &["Notes", "notes", "NOTES"];

/// Normalizes one decoded row into a canonical record.
///
/// Absent fields default to the empty string. Cell values pass through
/// verbatim; normalization only resolves header spellings.
pub fn normalize_row(row: &RawRow) -> Record {
    Record {
        first_name: resolve_field(row, FIRST_NAME_ALIASES),
        phone: resolve_field(row, PHONE_ALIASES),
        notes: resolve_field(row, NOTES_ALIASES),
    }
}

/// Normalizes a decoded row sequence, preserving row order.
pub fn normalize_rows(rows: &[RawRow]) -> Vec<Record> {
    rows.iter().map(normalize_row).collect()
}

fn resolve_field(row: &RawRow, aliases: &[&str]) -> String {
    aliases
        .iter()
        .find_map(|alias| row.get(alias))
        .map(str::to_string)
        .unwrap_or_default()
}
