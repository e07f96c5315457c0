//! Upload ingestion pipeline.
//!
//! # Responsibility
//! - Drive one upload through validate -> decode -> normalize -> distribute
//!   -> persist as a single synchronous operation.
//! - Guarantee staged-artifact cleanup on every exit path.
//!
//! # Invariants
//! - Any stage failure aborts the pipeline; no partial aggregate is ever
//!   persisted.
//! - The staged artifact is removed before a failure is reported, and as
//!   the final step of successful completion.
//! - Cleanup of an already-absent artifact is not an error; other cleanup
//!   failures are logged, never propagated.

use crate::decode::{self, normalize::normalize_rows, DecodeError, SourceFormat};
use crate::distribute::{distribute, DistributeError};
use crate::model::list::List;
use crate::repo::agent_repo::AgentDirectory;
use crate::repo::list_repo::{ListRepository, RepoError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::Path;
use std::time::Instant;

/// Maximum accepted upload size.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Typed rejection for one upload. Every variant is terminal; only
/// [`UploadError::is_retryable`] failures are worth retrying unchanged.
#[derive(Debug)]
pub enum UploadError {
    /// Bad file type or size; the caller must re-upload a corrected file.
    InvalidFile(String),
    /// Declared format slipped past validation unsupported; an
    /// internal-consistency fault, not a user error.
    UnsupportedFormat(String),
    /// Content did not parse as the declared format.
    Decode(DecodeError),
    /// No agents provisioned; distribution precondition unmet.
    NoAgentsAvailable,
    /// Aggregate store failure; transient, the whole upload may be retried.
    Store(RepoError),
    /// The staged artifact could not be read.
    StagedFile(io::Error),
}

impl UploadError {
    /// True for failures where retrying the identical upload can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(RepoError::Db(_)))
    }

    fn stage(&self) -> &'static str {
        match self {
            Self::InvalidFile(_) => "validate",
            Self::StagedFile(_) => "read",
            Self::UnsupportedFormat(_) | Self::Decode(_) => "decode",
            Self::NoAgentsAvailable => "distribute",
            Self::Store(_) => "persist",
        }
    }
}

impl Display for UploadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFile(reason) => write!(f, "invalid upload: {reason}"),
            Self::UnsupportedFormat(name) => {
                write!(f, "unsupported source format past validation: `{name}`")
            }
            Self::Decode(err) => write!(f, "{err}"),
            Self::NoAgentsAvailable => write!(f, "no agents available for distribution"),
            Self::Store(err) => write!(f, "{err}"),
            Self::StagedFile(err) => write!(f, "staged file unreadable: {err}"),
        }
    }
}

impl Error for UploadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::StagedFile(err) => Some(err),
            Self::InvalidFile(_) | Self::UnsupportedFormat(_) | Self::NoAgentsAvailable => None,
        }
    }
}

impl From<DecodeError> for UploadError {
    fn from(value: DecodeError) -> Self {
        match value {
            DecodeError::UnsupportedFormat(name) => Self::UnsupportedFormat(name),
            other => Self::Decode(other),
        }
    }
}

impl From<RepoError> for UploadError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

impl From<DistributeError> for UploadError {
    fn from(value: DistributeError) -> Self {
        match value {
            DistributeError::NoAgentsAvailable => Self::NoAgentsAvailable,
        }
    }
}

/// Upload pipeline facade over the aggregate store and agent directory.
pub struct UploadService<R: ListRepository, D: AgentDirectory> {
    lists: R,
    agents: D,
}

impl<R: ListRepository, D: AgentDirectory> UploadService<R, D> {
    pub fn new(lists: R, agents: D) -> Self {
        Self { lists, agents }
    }

    /// Ingests one staged upload end to end and returns the persisted list.
    ///
    /// The transport stages the file and hands over its path plus the
    /// original filename; from here the engine owns the artifact and
    /// removes it on every outcome.
    ///
    /// # Errors
    /// - See [`UploadError`]; any failure leaves no list behind.
    pub fn ingest(&self, staged_path: &Path, original_name: &str) -> Result<List, UploadError> {
        let started_at = Instant::now();
        info!("event=upload module=upload status=start file={original_name}");

        match self.run_stages(staged_path, original_name) {
            Ok(list) => {
                remove_staged_artifact(staged_path);
                info!(
                    "event=upload module=upload status=ok list_id={} records={} shards={} duration_ms={}",
                    list.id,
                    list.total_records,
                    list.shard_count,
                    started_at.elapsed().as_millis()
                );
                Ok(list)
            }
            Err(err) => {
                remove_staged_artifact(staged_path);
                warn!(
                    "event=upload module=upload status=error stage={} file={original_name} duration_ms={} error={err}",
                    err.stage(),
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    fn run_stages(&self, staged_path: &Path, original_name: &str) -> Result<List, UploadError> {
        let format = validate_upload(staged_path, original_name)?;

        let bytes = std::fs::read(staged_path).map_err(UploadError::StagedFile)?;
        let rows = decode::decode(&bytes, format)?;
        let records = normalize_rows(&rows);

        let agents = self.agents.active_agents()?;
        let shards = distribute(&records, &agents)?;

        let stored_file_ref = staged_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| staged_path.display().to_string());

        let list = List::new(stored_file_ref, original_name, records, shards);
        self.lists.create_list(&list)?;

        Ok(list)
    }
}

/// Checks declared type and size before any content is touched.
fn validate_upload(staged_path: &Path, original_name: &str) -> Result<SourceFormat, UploadError> {
    let format = SourceFormat::from_file_name(original_name).ok_or_else(|| {
        UploadError::InvalidFile(format!(
            "file type of `{original_name}` is not supported; expected csv, xlsx or xls"
        ))
    })?;

    let size_bytes = std::fs::metadata(staged_path)
        .map_err(UploadError::StagedFile)?
        .len();
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(UploadError::InvalidFile(format!(
            "file size {size_bytes} exceeds the {MAX_UPLOAD_BYTES} byte limit"
        )));
    }

    Ok(format)
}

/// Best-effort removal of the staged artifact. Absence is fine; anything
/// else is logged and swallowed.
fn remove_staged_artifact(staged_path: &Path) {
    match std::fs::remove_file(staged_path) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!(
            "event=staged_cleanup module=upload status=error path={} error={err}",
            staged_path.display()
        ),
    }
}
