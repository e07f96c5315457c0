//! Persistence boundary: list aggregates and the agent directory.

pub mod agent_repo;
pub mod list_repo;
