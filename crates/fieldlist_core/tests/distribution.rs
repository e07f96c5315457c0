use fieldlist_core::{
    distribute, AgentRef, DistributeError, List, Record, MAX_AGENTS_PER_LIST,
};
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
        .map(|index| Record::new(format!("contact {index}"), format!("555-{index:04}"), ""))
        .collect()
}

#[test]
fn twelve_records_across_three_agents_split_evenly() {
    let shards = distribute(&records(12), &agents(3)).unwrap();
    let sizes: Vec<usize> = shards.iter().map(|shard| shard.records.len()).collect();
    assert_eq!(sizes, vec![4, 4, 4]);
}

#[test]
fn thirteen_records_across_three_agents_give_first_agent_the_remainder() {
    let shards = distribute(&records(13), &agents(3)).unwrap();
    let sizes: Vec<usize> = shards.iter().map(|shard| shard.records.len()).collect();
    assert_eq!(sizes, vec![5, 4, 4]);
}

#[test]
fn zero_records_with_two_agents_yield_two_empty_shards() {
    let available = agents(2);
    let shards = distribute(&[], &available).unwrap();

    let list = List::new("staged-0", "empty.csv", Vec::new(), shards);
    assert_eq!(list.total_records, 0);
    assert_eq!(list.shard_count, 2);
    assert!(list.shards.iter().all(|shard| shard.records.is_empty()));
    list.validate().unwrap();
}

#[test]
fn no_agents_fails_and_no_list_is_assembled() {
    let err = distribute(&records(4), &[]).unwrap_err();
    assert_eq!(err, DistributeError::NoAgentsAvailable);
}

#[test]
fn more_than_five_agents_only_first_five_receive_shards() {
    let available = agents(9);
    let shards = distribute(&records(17), &available).unwrap();

    assert_eq!(shards.len(), MAX_AGENTS_PER_LIST);
    for (shard, agent) in shards.iter().zip(&available) {
        assert_eq!(shard.agent_id, agent.id);
    }
    let assigned: usize = shards.iter().map(|shard| shard.records.len()).sum();
    assert_eq!(assigned, 17);
}

#[test]
fn partition_coverage_and_fairness_hold_for_all_shapes() {
    for record_count in 0..=40 {
        let input = records(record_count);
        for agent_count in 1..=6 {
            let available = agents(agent_count);
            let shards = distribute(&input, &available).unwrap();

            let effective = agent_count.min(MAX_AGENTS_PER_LIST);
            assert_eq!(shards.len(), effective);

            // Concatenation in shard order reproduces the input exactly.
            let rebuilt: Vec<Record> = shards
                .iter()
                .flat_map(|shard| shard.records.iter().cloned())
                .collect();
            assert_eq!(rebuilt, input, "n={record_count} k={agent_count}");

            // Exactly n mod k oversized shards, and they come first.
            let remainder = record_count % effective;
            let base = record_count / effective;
            for (index, shard) in shards.iter().enumerate() {
                let expected = base + usize::from(index < remainder);
                assert_eq!(
                    shard.records.len(),
                    expected,
                    "n={record_count} k={agent_count} shard={index}"
                );
            }
        }
    }
}

#[test]
fn assembled_list_satisfies_aggregate_invariants() {
    let input = records(13);
    let shards = distribute(&input, &agents(3)).unwrap();

    let list = List::new("staged-1", "leads.csv", input, shards);
    assert_eq!(list.total_records, 13);
    assert_eq!(list.shard_count, 3);
    list.validate().unwrap();
}

#[test]
fn tampered_counters_fail_validation() {
    let input = records(6);
    let shards = distribute(&input, &agents(2)).unwrap();
    let mut list = List::new("staged-2", "leads.csv", input, shards);

    list.total_records = 7;
    assert!(list.validate().is_err());

    list.total_records = 6;
    list.shards.swap(0, 1);
    assert!(list.validate().is_err());
}
