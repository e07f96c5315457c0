//! Pins the read-side JSON shapes consumed by the presentation collaborator.

use fieldlist_core::{distribute, AgentRef, List, Record};
use uuid::Uuid;

#[test]
fn list_serializes_with_the_external_camel_case_schema() {
    let records = vec![Record::new("Ann", "555", "x")];
    let agent = AgentRef {
        id: Uuid::new_v4(),
        display_name: "Agent".to_string(),
    };
    let shards = distribute(&records, &[agent]).unwrap();
    let list = List::new("staged-ref", "leads.csv", records, shards);

    let value = serde_json::to_value(&list).unwrap();
    let object = value.as_object().unwrap();

    for key in [
        "id",
        "storedFileRef",
        "originalName",
        "totalRecords",
        "records",
        "shards",
        "shardCount",
        "createdAt",
    ] {
        assert!(object.contains_key(key), "missing key {key}");
    }

    let shard = &value["shards"][0];
    assert!(shard.get("agentId").is_some());
    let record = &shard["records"][0];
    assert_eq!(record["firstName"], "Ann");
    assert_eq!(record["phone"], "555");
    assert_eq!(record["notes"], "x");
}

#[test]
fn summary_serializes_without_payload_fields() {
    let records = vec![Record::new("Ann", "555", "x")];
    let agent = AgentRef {
        id: Uuid::new_v4(),
        display_name: "Agent".to_string(),
    };
    let shards = distribute(&records, &[agent]).unwrap();
    let summary = List::new("staged-ref", "leads.csv", records, shards).summary();

    let value = serde_json::to_value(&summary).unwrap();
    let object = value.as_object().unwrap();

    assert_eq!(object.len(), 5);
    for key in [
        "id",
        "originalName",
        "totalRecords",
        "shardCount",
        "createdAt",
    ] {
        assert!(object.contains_key(key), "missing key {key}");
    }
}
