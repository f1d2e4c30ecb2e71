use super::{Message, MessageStore};
use crate::utils::ChatError;
use std::collections::HashSet;
use std::sync::Arc;

#[test]
fn test_store_new_is_empty() {
    let store = MessageStore::new();
    assert!(store.is_empty());
    assert!(store.list_all().is_empty());
    assert_eq!(store.capacity_limit(), None);
}

#[test]
fn test_append_assigns_sequential_ids() {
    let store = MessageStore::new();

    let first = store.append("alice", "hi").unwrap();
    assert_eq!(first.id, 0);
    assert_eq!(
        store.list_all(),
        vec![Message {
            id: 0,
            user: "alice".to_string(),
            content: "hi".to_string(),
        }]
    );

    let second = store.append("bob", "yo").unwrap();
    assert_eq!(second.id, 1);

    let all = store.list_all();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].user, "alice");
    assert_eq!(all[1].user, "bob");
    assert_eq!(all[1].content, "yo");
}

#[test]
fn test_store_does_not_enforce_non_empty_content() {
    let store = MessageStore::new();
    let msg = store.append("alice", "").unwrap();
    assert_eq!(msg.content, "");
}

#[test]
fn test_snapshot_is_detached_from_later_appends() {
    let store = MessageStore::new();
    store.append("alice", "one").unwrap();

    let snapshot = store.list_all();
    store.append("alice", "two").unwrap();

    assert_eq!(snapshot.len(), 1);
    assert_eq!(store.len(), 2);
}

#[test]
fn test_capacity_limit_rejects_without_consuming_id() {
    let store = MessageStore::with_capacity_limit(2);
    store.append("alice", "one").unwrap();
    store.append("alice", "two").unwrap();

    let err = store.append("alice", "three").unwrap_err();
    assert_eq!(err, ChatError::CapacityExceeded { max: 2 });
    assert_eq!(store.len(), 2);
    assert_eq!(store.list_all().last().unwrap().id, 1);
}

#[test]
fn test_concurrent_appends_keep_ids_contiguous() {
    let store = Arc::new(MessageStore::new());
    let threads = 8;
    let per_thread = 50;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..per_thread {
                    store.append(&format!("user{t}"), &format!("msg{i}")).unwrap();
                    // readers interleave with writers
                    let snapshot = store.list_all();
                    for (pos, msg) in snapshot.iter().enumerate() {
                        assert_eq!(msg.id, pos as u64);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let all = store.list_all();
    let total = threads * per_thread;
    assert_eq!(all.len(), total);

    let ids: HashSet<u64> = all.iter().map(|m| m.id).collect();
    assert_eq!(ids.len(), total);
    for (pos, msg) in all.iter().enumerate() {
        assert_eq!(msg.id, pos as u64);
    }
}

#[test]
fn test_message_wire_shape() {
    let msg = Message {
        id: 7,
        user: "carol".to_string(),
        content: "test".to_string(),
    };
    let value = serde_json::to_value(&msg).unwrap();
    assert_eq!(
        value,
        serde_json::json!({ "id": 7, "user": "carol", "content": "test" })
    );

    let missing_user = serde_json::json!({ "id": 1, "content": "x" });
    assert!(serde_json::from_value::<Message>(missing_user).is_err());
}
