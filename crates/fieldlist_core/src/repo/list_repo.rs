//! List aggregate repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist one list aggregate (meta + records + shards) atomically.
//! - Serve full-aggregate, summary-only, and per-shard reads.
//!
//! # Invariants
//! - Write paths call `List::validate()` before SQL mutations.
//! - A reader never observes a partially written aggregate: `create_list`
//!   is one transaction over all three tables.
//! - Shards persist as contiguous `(start_pos, record_count)` ranges over
//!   the parent record sequence.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::list::{
    AgentId, List, ListId, ListSummary, ListValidationError, Record, Shard,
};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for aggregate persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Aggregate failed invariant checks before a write.
    Validation(ListValidationError),
    /// Underlying storage failure; transient, safe to retry the operation.
    Db(DbError),
    /// Persisted state does not parse back into a valid aggregate.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted list data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ListValidationError> for RepoError {
    fn from(value: ListValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for list aggregates.
///
/// Aggregates are immutable once created; there is no update operation.
/// Missing ids/shards on reads are `Ok(None)`.
pub trait ListRepository {
    /// Persists the whole aggregate atomically and returns its id.
    fn create_list(&self, list: &List) -> RepoResult<ListId>;
    /// Loads one full aggregate, records and shards included.
    fn get_list(&self, id: ListId) -> RepoResult<Option<List>>;
    /// Lists metadata of all aggregates, newest first, without payloads.
    fn list_summaries(&self) -> RepoResult<Vec<ListSummary>>;
    /// Loads one agent's shard within a list, if both exist.
    fn get_shard(&self, list_id: ListId, agent_id: AgentId) -> RepoResult<Option<Shard>>;
}

/// SQLite-backed list aggregate repository.
pub struct SqliteListRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteListRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ListRepository for SqliteListRepository<'_> {
    fn create_list(&self, list: &List) -> RepoResult<ListId> {
        list.validate()?;

        // Shared-borrow transaction so the same connection can back the
        // agent directory during one upload. The engine is single-caller
        // per connection, which is what unchecked_transaction requires.
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO lists (
                uuid,
                stored_file_ref,
                original_name,
                total_records,
                shard_count,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                list.id.to_string(),
                list.stored_file_ref.as_str(),
                list.original_name.as_str(),
                list.total_records as i64,
                list.shard_count as i64,
                list.created_at,
            ],
        )?;

        {
            let mut insert_record = tx.prepare(
                "INSERT INTO list_records (list_uuid, position, first_name, phone, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
            )?;
            for (position, record) in list.records.iter().enumerate() {
                insert_record.execute(params![
                    list.id.to_string(),
                    position as i64,
                    record.first_name.as_str(),
                    record.phone.as_str(),
                    record.notes.as_str(),
                ])?;
            }

            let mut insert_shard = tx.prepare(
                "INSERT INTO shards (list_uuid, shard_index, agent_uuid, start_pos, record_count)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
            )?;
            let mut start_pos = 0usize;
            for (shard_index, shard) in list.shards.iter().enumerate() {
                insert_shard.execute(params![
                    list.id.to_string(),
                    shard_index as i64,
                    shard.agent_id.to_string(),
                    start_pos as i64,
                    shard.records.len() as i64,
                ])?;
                start_pos += shard.records.len();
            }
        }

        tx.commit()?;
        Ok(list.id)
    }

    fn get_list(&self, id: ListId) -> RepoResult<Option<List>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, stored_file_ref, original_name, total_records, shard_count, created_at
             FROM lists
             WHERE uuid = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let mut list = parse_list_meta(row)?;
        list.records = self.load_records(id)?;

        for (agent_id, start_pos, record_count) in self.load_shard_ranges(id)? {
            let end = start_pos
                .checked_add(record_count)
                .filter(|end| *end <= list.records.len())
                .ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "shard range [{start_pos}, +{record_count}) exceeds {} records",
                        list.records.len()
                    ))
                })?;
            list.shards.push(Shard {
                agent_id,
                records: list.records[start_pos..end].to_vec(),
            });
        }

        list.validate()?;
        Ok(Some(list))
    }

    fn list_summaries(&self) -> RepoResult<Vec<ListSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, original_name, total_records, shard_count, created_at
             FROM lists
             ORDER BY created_at DESC, uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut summaries = Vec::new();

        while let Some(row) = rows.next()? {
            summaries.push(ListSummary {
                id: parse_uuid(row.get::<_, String>("uuid")?.as_str(), "lists.uuid")?,
                original_name: row.get("original_name")?,
                total_records: parse_count(row.get("total_records")?, "lists.total_records")?,
                shard_count: parse_count(row.get("shard_count")?, "lists.shard_count")?,
                created_at: row.get("created_at")?,
            });
        }

        Ok(summaries)
    }

    fn get_shard(&self, list_id: ListId, agent_id: AgentId) -> RepoResult<Option<Shard>> {
        let mut stmt = self.conn.prepare(
            "SELECT start_pos, record_count
             FROM shards
             WHERE list_uuid = ?1 AND agent_uuid = ?2;",
        )?;
        let mut rows = stmt.query(params![list_id.to_string(), agent_id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let start_pos = parse_count(row.get("start_pos")?, "shards.start_pos")?;
        let record_count = parse_count(row.get("record_count")?, "shards.record_count")?;

        let mut record_stmt = self.conn.prepare(
            "SELECT first_name, phone, notes
             FROM list_records
             WHERE list_uuid = ?1 AND position >= ?2 AND position < ?3
             ORDER BY position ASC;",
        )?;
        let mut record_rows = record_stmt.query(params![
            list_id.to_string(),
            start_pos as i64,
            (start_pos + record_count) as i64,
        ])?;

        let mut records = Vec::with_capacity(record_count);
        while let Some(record_row) = record_rows.next()? {
            records.push(parse_record_row(record_row)?);
        }

        if records.len() != record_count {
            return Err(RepoError::InvalidData(format!(
                "shard for agent {agent_id} declares {record_count} records but {} were stored",
                records.len()
            )));
        }

        Ok(Some(Shard { agent_id, records }))
    }
}

impl SqliteListRepository<'_> {
    fn load_records(&self, list_id: ListId) -> RepoResult<Vec<Record>> {
        let mut stmt = self.conn.prepare(
            "SELECT first_name, phone, notes
             FROM list_records
             WHERE list_uuid = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([list_id.to_string()])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }

        Ok(records)
    }

    fn load_shard_ranges(&self, list_id: ListId) -> RepoResult<Vec<(AgentId, usize, usize)>> {
        let mut stmt = self.conn.prepare(
            "SELECT agent_uuid, start_pos, record_count
             FROM shards
             WHERE list_uuid = ?1
             ORDER BY shard_index ASC;",
        )?;
        let mut rows = stmt.query([list_id.to_string()])?;
        let mut ranges = Vec::new();

        while let Some(row) = rows.next()? {
            let agent_id = parse_uuid(
                row.get::<_, String>("agent_uuid")?.as_str(),
                "shards.agent_uuid",
            )?;
            let start_pos = parse_count(row.get("start_pos")?, "shards.start_pos")?;
            let record_count = parse_count(row.get("record_count")?, "shards.record_count")?;
            ranges.push((agent_id, start_pos, record_count));
        }

        Ok(ranges)
    }
}

fn parse_list_meta(row: &Row<'_>) -> RepoResult<List> {
    Ok(List {
        id: parse_uuid(row.get::<_, String>("uuid")?.as_str(), "lists.uuid")?,
        stored_file_ref: row.get("stored_file_ref")?,
        original_name: row.get("original_name")?,
        total_records: parse_count(row.get("total_records")?, "lists.total_records")?,
        shard_count: parse_count(row.get("shard_count")?, "lists.shard_count")?,
        records: Vec::new(),
        shards: Vec::new(),
        created_at: row.get("created_at")?,
    })
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<Record> {
    Ok(Record {
        first_name: row.get("first_name")?,
        phone: row.get("phone")?,
        notes: row.get("notes")?,
    })
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn parse_count(value: i64, column: &str) -> RepoResult<usize> {
    usize::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid count `{value}` in {column}")))
}
