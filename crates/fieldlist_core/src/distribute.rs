//! Fair-remainder distribution of records across agents.
//!
//! # Responsibility
//! - Split an ordered record sequence into contiguous per-agent shards.
//!
//! # Invariants
//! - Shard records concatenated in shard order reproduce the input exactly.
//! - Shard sizes differ by at most one; the first `n mod k` agents absorb
//!   the remainder.
//! - At most [`MAX_AGENTS_PER_LIST`] agents receive a shard; agents beyond
//!   the cap are omitted entirely, never given an empty shard.

use crate::model::list::{AgentRef, Record, Shard};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Hard cap on agents used per distribution. Kept as a literal constant to
/// match historical behavior; there is deliberately no configuration surface.
pub const MAX_AGENTS_PER_LIST: usize = 5;

/// Distribution precondition failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributeError {
    /// No agents are available; the operator must provision at least one
    /// agent before retrying.
    NoAgentsAvailable,
}

impl Display for DistributeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoAgentsAvailable => write!(f, "no agents available for distribution"),
        }
    }
}

impl Error for DistributeError {}

/// Partitions `records` across up to [`MAX_AGENTS_PER_LIST`] of the given
/// agents, in agent order, by contiguous slicing.
///
/// Zero records with at least one agent is legal: every selected agent gets
/// an empty shard.
///
/// # Errors
/// - [`DistributeError::NoAgentsAvailable`] when `agents` is empty.
pub fn distribute(
    records: &[Record],
    agents: &[AgentRef],
) -> Result<Vec<Shard>, DistributeError> {
    if agents.is_empty() {
        return Err(DistributeError::NoAgentsAvailable);
    }

    let agent_count = agents.len().min(MAX_AGENTS_PER_LIST);
    let base_share = records.len() / agent_count;
    let remainder = records.len() % agent_count;

    let mut shards = Vec::with_capacity(agent_count);
    let mut cursor = 0usize;

    for (index, agent) in agents.iter().take(agent_count).enumerate() {
        let share = base_share + usize::from(index < remainder);
        let slice = &records[cursor..cursor + share];
        cursor += share;

        shards.push(Shard {
            agent_id: agent.id,
            records: slice.to_vec(),
        });
    }

    Ok(shards)
}

#[cfg(test)]
mod tests {
    use super::{distribute, DistributeError, MAX_AGENTS_PER_LIST};
    use crate::model::list::{AgentRef, Record};
    use uuid::Uuid;

    fn agents(count: usize) -> Vec<AgentRef> {
        (0..count)
            .map(|index| AgentRef {
                id: Uuid::new_v4(),
                display_name: format!("agent {index}"),
            })
            .collect()
    }

    fn records(count: usize) -> Vec<Record> {
        (0..count)
            .map(|index| Record::new(format!("name {index}"), format!("{index}"), ""))
            .collect()
    }

    #[test]
    fn empty_agent_list_is_rejected() {
        let err = distribute(&records(3), &[]).unwrap_err();
        assert_eq!(err, DistributeError::NoAgentsAvailable);
    }

    #[test]
    fn even_split_has_equal_shares() {
        let shards = distribute(&records(12), &agents(3)).unwrap();
        let sizes: Vec<usize> = shards.iter().map(|shard| shard.records.len()).collect();
        assert_eq!(sizes, vec![4, 4, 4]);
    }

    #[test]
    fn remainder_goes_to_earliest_agents() {
        let shards = distribute(&records(13), &agents(3)).unwrap();
        let sizes: Vec<usize> = shards.iter().map(|shard| shard.records.len()).collect();
        assert_eq!(sizes, vec![5, 4, 4]);
    }

    #[test]
    fn agent_cap_limits_shards_to_first_five() {
        let available = agents(8);
        let shards = distribute(&records(10), &available).unwrap();

        assert_eq!(shards.len(), MAX_AGENTS_PER_LIST);
        for (shard, agent) in shards.iter().zip(&available) {
            assert_eq!(shard.agent_id, agent.id);
        }
    }

    #[test]
    fn zero_records_yield_empty_shards_per_agent() {
        let shards = distribute(&[], &agents(2)).unwrap();
        assert_eq!(shards.len(), 2);
        assert!(shards.iter().all(|shard| shard.records.is_empty()));
    }

    #[test]
    fn concatenated_shards_reconstruct_input_for_all_small_shapes() {
        for record_count in 0..=23 {
            let input = records(record_count);
            for agent_count in 1..=7 {
                let shards = distribute(&input, &agents(agent_count)).unwrap();

                let rebuilt: Vec<_> = shards
                    .iter()
                    .flat_map(|shard| shard.records.iter().cloned())
                    .collect();
                assert_eq!(rebuilt, input, "n={record_count} k={agent_count}");

                let max = shards.iter().map(|s| s.records.len()).max().unwrap_or(0);
                let min = shards.iter().map(|s| s.records.len()).min().unwrap_or(0);
                assert!(max - min <= 1, "n={record_count} k={agent_count}");
            }
        }
    }
}
