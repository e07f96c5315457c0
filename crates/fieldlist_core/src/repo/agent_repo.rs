//! Agent directory boundary.
//!
//! # Responsibility
//! - Give the distribution engine read access to active agent identities.
//! - Keep agent lifecycle ownership outside the engine; only the minimal
//!   surface the partitioner and exports consume lives here.
//!
//! # Invariants
//! - `active_agents` order is stable (created_at ASC, uuid ASC), so one
//!   distribution call never observes a reordered sequence.

use crate::model::list::{epoch_ms_now, AgentId, AgentRef};
use crate::repo::list_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection};
use uuid::Uuid;

/// Identity collaborator as seen by the engine.
pub trait AgentDirectory {
    /// All active agent identities in stable distribution order.
    fn active_agents(&self) -> RepoResult<Vec<AgentRef>>;
    /// Display name of one agent, if it still exists.
    fn agent_name(&self, id: AgentId) -> RepoResult<Option<String>>;
}

/// SQLite-backed agent directory.
pub struct SqliteAgentDirectory<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAgentDirectory<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Registers one agent and returns its stable id.
    pub fn add_agent(
        &self,
        display_name: &str,
        email: Option<&str>,
        mobile: Option<&str>,
    ) -> RepoResult<AgentId> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO agents (uuid, display_name, email, mobile, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![id.to_string(), display_name, email, mobile, epoch_ms_now()],
        )?;
        Ok(id)
    }
}

impl AgentDirectory for SqliteAgentDirectory<'_> {
    fn active_agents(&self) -> RepoResult<Vec<AgentRef>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, display_name
             FROM agents
             ORDER BY created_at ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut agents = Vec::new();

        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            let id = Uuid::parse_str(&uuid_text).map_err(|_| {
                RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in agents.uuid"))
            })?;
            agents.push(AgentRef {
                id,
                display_name: row.get("display_name")?,
            });
        }

        Ok(agents)
    }

    fn agent_name(&self, id: AgentId) -> RepoResult<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT display_name FROM agents WHERE uuid = ?1;")?;
        let mut rows = stmt.query([id.to_string()])?;

        match rows.next()? {
            Some(row) => Ok(Some(row.get("display_name")?)),
            None => Ok(None),
        }
    }
}
