use super::ChatService;
use crate::config::Settings;
use crate::hub::{Hub, ListenerState};
use crate::store::MessageStore;
use crate::utils::ChatError;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_post_and_list() {
    let service = ChatService::default();

    assert_eq!(service.post_message("alice", "hi").unwrap(), 0);
    let all = service.messages();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, 0);
    assert_eq!(all[0].user, "alice");
    assert_eq!(all[0].content, "hi");

    assert_eq!(service.post_message("bob", "yo").unwrap(), 1);
    let all = service.messages();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].user, "alice");
    assert_eq!(all[1].user, "bob");
}

#[test]
fn test_rejected_post_has_no_side_effect() {
    let service = ChatService::default();
    let mut sub = service.message_added();

    let err = service.post_message("alice", "   ").unwrap_err();
    assert!(matches!(err, ChatError::Validation(_)));
    let err = service.post_message("", "hello").unwrap_err();
    assert!(matches!(err, ChatError::Validation(_)));

    assert!(service.messages().is_empty());
    assert!(sub.try_recv().is_none());

    // the next accepted post still gets id 0
    assert_eq!(service.post_message("alice", "hello").unwrap(), 0);
}

#[test]
fn test_capacity_exceeded_is_rejected() {
    let mut settings = Settings::default();
    settings.store.max_messages = Some(1);
    let service = ChatService::from_settings(&settings);

    service.post_message("alice", "one").unwrap();
    let err = service.post_message("alice", "two").unwrap_err();
    assert_eq!(err, ChatError::CapacityExceeded { max: 1 });
    assert_eq!(service.messages().len(), 1);
}

#[test]
fn test_from_settings_applies_queue_capacity() {
    let mut settings = Settings::default();
    settings.hub.listener_queue_capacity = 5;
    let service = ChatService::from_settings(&settings);
    assert_eq!(service.hub().queue_capacity(), 5);
    assert_eq!(service.store().capacity_limit(), None);
}

#[tokio::test]
async fn test_subscriber_receives_posted_message() {
    let service = ChatService::default();
    let mut listener = service.message_added();

    let id = service.post_message("carol", "test").unwrap();

    let received = listener.recv().await.unwrap();
    assert_eq!(received.user, "carol");
    assert_eq!(received.content, "test");
    assert_eq!(received.id, id);
    assert_eq!(service.messages()[id as usize], received);

    // subscribed after the post: only visible through the query
    let mut late = service.message_added();
    assert!(late.try_recv().is_none());
    assert!(service.messages().iter().any(|m| m.content == "test"));
}

#[tokio::test]
async fn test_unsubscribed_listener_gets_nothing() {
    let service = ChatService::default();
    let mut listener = service.message_added();
    listener.unsubscribe();

    service.post_message("alice", "after").unwrap();
    assert!(listener.recv().await.is_none());
    assert_eq!(listener.state(), ListenerState::Closed);
}

#[tokio::test]
async fn test_concurrent_posts_are_contiguous_and_ordered() {
    let service = Arc::new(ChatService::default());
    let mut listener = service.message_added();
    let posters = 10;
    let per_poster = 5;

    let tasks: Vec<_> = (0..posters)
        .map(|p| {
            let service = service.clone();
            tokio::spawn(async move {
                for i in 0..per_poster {
                    service
                        .post_message(&format!("user{p}"), &format!("msg{i}"))
                        .unwrap();
                }
            })
        })
        .collect();
    futures::future::join_all(tasks).await;

    let total = posters * per_poster;
    let all = service.messages();
    assert_eq!(all.len(), total);
    let ids: HashSet<u64> = all.iter().map(|m| m.id).collect();
    assert_eq!(ids.len(), total);

    // the live stream sees every message once, in id order
    for expected in 0..total as u64 {
        let received = listener.recv().await.unwrap();
        assert_eq!(received.id, expected);
        assert_eq!(received, all[expected as usize]);
    }
    assert!(listener.try_recv().is_none());
}

#[tokio::test]
async fn test_sync_has_no_gap_under_concurrent_posts() {
    // queue large enough that the listener never overflows while unread
    let service = Arc::new(ChatService::new(MessageStore::new(), Hub::new(1024)));
    let total = 200u64;

    let poster = {
        let service = service.clone();
        tokio::spawn(async move {
            for i in 0..total {
                service.post_message("alice", &format!("m{i}")).unwrap();
                if i % 10 == 0 {
                    tokio::task::yield_now().await;
                }
            }
        })
    };

    tokio::task::yield_now().await;
    let (snapshot, mut live) = service.sync();
    poster.await.unwrap();

    let mut seen: Vec<u64> = snapshot.iter().map(|m| m.id).collect();
    while let Ok(Some(msg)) = tokio::time::timeout(Duration::from_millis(50), live.recv()).await
    {
        seen.push(msg.id);
    }

    let expected: Vec<u64> = (0..total).collect();
    assert_eq!(seen, expected);
}
