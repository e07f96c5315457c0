//! Contact-list ingestion and distribution engine.
//! This crate is the single source of truth for upload, partition, and
//! aggregate-persistence invariants.

pub mod db;
pub mod decode;
pub mod distribute;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use decode::normalize::{normalize_row, normalize_rows};
pub use decode::{decode, decode_named, DecodeError, RawRow, SourceFormat};
pub use distribute::{distribute, DistributeError, MAX_AGENTS_PER_LIST};
pub use export::{records_to_csv, shard_export_file_name, ExportError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::list::{
    AgentId, AgentRef, List, ListId, ListSummary, ListValidationError, Record, Shard,
};
pub use repo::agent_repo::{AgentDirectory, SqliteAgentDirectory};
pub use repo::list_repo::{ListRepository, RepoError, RepoResult, SqliteListRepository};
pub use service::export::{CsvDownload, ExportService, ExportServiceError};
pub use service::upload::{UploadError, UploadService, MAX_UPLOAD_BYTES};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
