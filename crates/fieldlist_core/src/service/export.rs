//! Download/export use-cases over persisted aggregates.
//!
//! # Responsibility
//! - Serve full-list and per-shard CSV downloads with their filenames.
//!
//! # Invariants
//! - Full-list downloads are named after the original uploaded filename.
//! - Shard downloads are named `{agentName}-{originalFilename}`; a missing
//!   agent identity falls back to the literal name `agent`.

use crate::export::{list_export_file_name, records_to_csv, shard_export_file_name, ExportError};
use crate::model::list::{AgentId, ListId};
use crate::repo::agent_repo::AgentDirectory;
use crate::repo::list_repo::{ListRepository, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One ready-to-serve CSV download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDownload {
    pub file_name: String,
    pub content: String,
}

/// Export use-case failure.
#[derive(Debug)]
pub enum ExportServiceError {
    Repo(RepoError),
    Format(ExportError),
}

impl Display for ExportServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Format(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ExportServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Format(err) => Some(err),
        }
    }
}

impl From<RepoError> for ExportServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ExportError> for ExportServiceError {
    fn from(value: ExportError) -> Self {
        Self::Format(value)
    }
}

/// Export facade over the aggregate store and agent directory.
pub struct ExportService<R: ListRepository, D: AgentDirectory> {
    lists: R,
    agents: D,
}

impl<R: ListRepository, D: AgentDirectory> ExportService<R, D> {
    pub fn new(lists: R, agents: D) -> Self {
        Self { lists, agents }
    }

    /// Exports the full record set of one list. `None` when the list does
    /// not exist.
    pub fn export_list(&self, id: ListId) -> Result<Option<CsvDownload>, ExportServiceError> {
        let Some(list) = self.lists.get_list(id)? else {
            return Ok(None);
        };

        Ok(Some(CsvDownload {
            file_name: list_export_file_name(&list.original_name),
            content: records_to_csv(&list.records)?,
        }))
    }

    /// Exports one agent's shard of one list. `None` when either the list
    /// or the shard does not exist.
    pub fn export_shard(
        &self,
        list_id: ListId,
        agent_id: AgentId,
    ) -> Result<Option<CsvDownload>, ExportServiceError> {
        let Some(list) = self.lists.get_list(list_id)? else {
            return Ok(None);
        };
        let Some(shard) = list.shard_for(agent_id) else {
            return Ok(None);
        };

        let agent_name = self
            .agents
            .agent_name(agent_id)?
            .unwrap_or_else(|| "agent".to_string());

        Ok(Some(CsvDownload {
            file_name: shard_export_file_name(&agent_name, &list.original_name),
            content: records_to_csv(&shard.records)?,
        }))
    }
}
